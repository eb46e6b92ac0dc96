use std::path::Path;

use thiserror::Error;

use crate::packet::{DecodeError, PACKET_SIZE, decode};
use crate::source::{CaptureFileSource, FrameEvent, FrameSource, SourceError};
use crate::{CaptureSummary, DecodeReport, RejectedFrame, make_stub_report};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Decode every frame of a recorded capture file.
pub fn decode_capture_file(path: &Path) -> Result<DecodeReport, AnalysisError> {
    let source = CaptureFileSource::open(path)?;
    decode_source(&path.display().to_string(), source)
}

/// Decode every frame of `source` into a report.
///
/// Size mismatches are recorded as rejected frames and decoding continues.
/// Layout inconsistencies abort, since every later frame would fail the
/// same way.
///
/// # Examples
/// ```
/// use droidstate_core::{MemorySource, PACKET_SIZE, decode_source};
///
/// let source = MemorySource::new(vec![vec![0u8; PACKET_SIZE], vec![0u8; 3]]);
/// let report = decode_source("udp", source)?;
/// assert_eq!(report.packets.len(), 1);
/// assert_eq!(report.rejected.len(), 1);
/// # Ok::<(), droidstate_core::AnalysisError>(())
/// ```
pub fn decode_source<S: FrameSource>(
    input_path: &str,
    mut source: S,
) -> Result<DecodeReport, AnalysisError> {
    let mut report = make_stub_report(input_path, 0);
    let mut frames_total = 0u64;
    let mut input_bytes = 0u64;

    while let Some(FrameEvent {
        index,
        offset,
        data,
    }) = source.next_frame()?
    {
        frames_total += 1;
        input_bytes += data.len() as u64;
        match decode(&data) {
            Ok(packet) => report.packets.push(packet),
            Err(err) if err.is_recoverable() => {
                log::debug!("frame {index} at offset {offset} rejected: {err}");
                report.rejected.push(RejectedFrame {
                    index,
                    offset,
                    bytes: data.len(),
                    message: err.to_string(),
                });
            }
            Err(err) => {
                log::error!("frame {index} at offset {offset}: {err}");
                return Err(AnalysisError::Decode(err));
            }
        }
    }

    report.input.bytes = input_bytes;
    report.capture_summary = Some(CaptureSummary {
        frames_total,
        frames_decoded: report.packets.len() as u64,
        frames_rejected: report.rejected.len() as u64,
        frame_bytes: PACKET_SIZE,
    });
    log::debug!(
        "{input_path}: decoded {} of {frames_total} frames",
        report.packets.len()
    );
    Ok(report)
}
