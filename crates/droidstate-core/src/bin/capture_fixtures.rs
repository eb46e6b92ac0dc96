//! Writes every golden case under `tests/golden/<case>/`: the capture
//! (`input.bin`) and the report decoded from it (`expected_report.json`).
//! Run from the workspace root.

use std::fs;
use std::path::{Path, PathBuf};

use droidstate_core::{FieldKind, PACKET_SIZE, decode_capture_file, packet_layout};

const TRUNCATED_TAIL: &[u8] = &[0xEE; 12];

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_case(&root.join("zero"), &[vec![0u8; PACKET_SIZE]])?;
    write_case(&root.join("concrete"), &[concrete_packet()])?;

    let mut frames = vec![patterned_packet(0, b"BB8-0"), patterned_packet(1000, b"BB8-1")];
    frames.push(TRUNCATED_TAIL.to_vec());
    write_case(&root.join("sequence"), &frames)?;
    Ok(())
}

fn write_case(dir: &Path, frames: &[Vec<u8>]) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;
    let input = dir.join("input.bin");
    fs::write(&input, frames.concat())
        .map_err(|err| format!("failed to write {}: {}", input.display(), err))?;

    let report = decode_capture_file(&input)
        .map_err(|err| format!("decode failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    let output = dir.join("expected_report.json");
    fs::write(&output, json).map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    println!(
        "{}: {} packet(s), {} rejected",
        dir.display(),
        report.packets.len(),
        report.rejected.len()
    );
    Ok(())
}

/// Timestamp 1.5, droid type 2, name "R2D2", first drive error state 1.
fn concrete_packet() -> Vec<u8> {
    let layout = packet_layout();
    let mut payload = vec![0u8; PACKET_SIZE];
    let (header, _) = layout.split_header();
    payload[header[0].range()].copy_from_slice(&1.5f32.to_le_bytes());
    payload[header[1].offset] = 2;
    payload[header[2].offset..header[2].offset + 4].copy_from_slice(b"R2D2");
    if let Some(field) = layout.field("drive", 0, 0) {
        payload[field.offset] = 1;
    }
    payload
}

/// Every field gets a distinct value derived from its layout position.
/// Floats stay on a 0.25 grid so they print exactly in JSON.
fn patterned_packet(seed: u32, name: &[u8]) -> Vec<u8> {
    let mut payload = vec![0u8; PACKET_SIZE];
    for (k, field) in packet_layout().fields().iter().enumerate() {
        let value = seed + k as u32;
        match field.kind {
            FieldKind::Byte => payload[field.offset] = (value % 256) as u8,
            FieldKind::Float => {
                let float = value as f32 * 0.25 - 8.0;
                payload[field.range()].copy_from_slice(&float.to_le_bytes());
            }
            FieldKind::Bytes(len) => {
                let used = name.len().min(len);
                payload[field.offset..field.offset + used].copy_from_slice(&name[..used]);
            }
        }
    }
    payload
}
