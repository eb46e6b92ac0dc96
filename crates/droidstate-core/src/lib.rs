//! DroidState core library for decoding droid telemetry packets.
//!
//! The remote controller receives one fixed-layout "large state" packet per
//! telemetry cycle: a header followed by drive control loops, IMU state,
//! command echoes, servo and battery states, packed little-endian without
//! padding. This crate turns such a buffer into a typed [`LargeStatePacket`]
//! or a [`DecodeError`] that says why it could not.
//!
//! Decoding is byte-oriented and side-effect free; all I/O is isolated in the
//! `source` module. The `analysis` layer drives a frame source through the
//! decoder and aggregates a deterministic [`DecodeReport`].
//!
//! Invariants:
//! - The assembled [`PacketLayout`] is the only source of size and order.
//! - A buffer of the wrong size never yields a partial packet.
//! - Decoded packets are immutable and own all of their records.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use droidstate_core::decode_capture_file;
//!
//! let report = decode_capture_file(Path::new("telemetry.bin"))?;
//! println!("decoded packets: {}", report.packets.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;

mod analysis;
pub mod packet;
mod source;

pub use analysis::{AnalysisError, decode_capture_file, decode_source};
pub use packet::{
    BatteryState, CommandEcho, DecodeError, DriveControlState, FieldKind, FieldSchema, ImuState,
    LargeStatePacket, LayoutField, PACKET_SIZE, PacketLayout, Section, ServoState, decode,
    packet_layout,
};
pub use source::{CaptureFileSource, FrameEvent, FrameSource, MemorySource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Decode report for one capture, in frame order.
///
/// # Examples
/// ```
/// use droidstate_core::make_stub_report;
///
/// let report = make_stub_report("telemetry.bin", 405);
/// assert_eq!(report.report_version, droidstate_core::REPORT_VERSION);
/// assert!(report.packets.is_empty());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input capture metadata.
    pub input: InputInfo,
    /// Layout the decoder validated against.
    pub layout: LayoutInfo,
    /// Frame counters (absent until a source was read).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Decoded packets in frame order.
    pub packets: Vec<LargeStatePacket>,
    /// Frames that failed with a recoverable error.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedFrame>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "droidstate").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input metadata embedded in reports.
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Bytes read from the input.
    pub bytes: u64,
}

/// Summary of the packet layout.
///
/// # Examples
/// ```
/// use droidstate_core::{LayoutInfo, PACKET_SIZE};
///
/// let info = LayoutInfo::current();
/// assert_eq!(info.packet_bytes, PACKET_SIZE);
/// assert_eq!(info.sections.len(), 5);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    /// Struct-style format string of the whole packet.
    pub descriptor: String,
    /// Expected packet size in bytes.
    pub packet_bytes: usize,
    /// Values produced by one decode pass.
    pub value_count: usize,
    /// Body sections in transmission order.
    pub sections: Vec<Section>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        let layout = packet_layout();
        Self {
            descriptor: layout.descriptor().to_string(),
            packet_bytes: layout.size(),
            value_count: layout.value_count(),
            sections: layout.sections().to_vec(),
        }
    }
}

/// Frame counters for one capture.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureSummary {
    /// Frames read from the source.
    pub frames_total: u64,
    /// Frames decoded into packets.
    pub frames_decoded: u64,
    /// Frames rejected with a recoverable error.
    pub frames_rejected: u64,
    /// Expected bytes per frame.
    pub frame_bytes: usize,
}

/// Frame that could not be decoded.
///
/// # Examples
/// ```
/// use droidstate_core::RejectedFrame;
///
/// let frame = RejectedFrame {
///     index: 2,
///     offset: 810,
///     bytes: 12,
///     message: "packet size mismatch: got 12 bytes, expected 405".to_string(),
/// };
/// assert_eq!(frame.bytes, 12);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RejectedFrame {
    /// Zero-based frame index.
    pub index: u64,
    /// Byte offset of the frame in the input.
    pub offset: u64,
    /// Frame length in bytes.
    pub bytes: usize,
    /// Human-readable decode error.
    pub message: String,
}

/// Build a stub report with base fields filled and empty aggregates.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> DecodeReport {
    DecodeReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "droidstate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        layout: LayoutInfo::current(),
        capture_summary: None,
        packets: vec![],
        rejected: vec![],
    }
}
