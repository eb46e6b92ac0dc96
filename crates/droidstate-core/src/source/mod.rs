//! Frame sources feeding raw packet buffers to the decoder.
//!
//! Delivering exactly one packet per buffer is the transport's job. Sources
//! here cover recorded captures and buffers already received by a transport.

mod capture;
mod memory;

pub use capture::CaptureFileSource;
pub use memory::MemorySource;

use thiserror::Error;

/// One raw buffer handed to the decoder.
#[derive(Debug, Clone)]
pub struct FrameEvent {
    /// Zero-based frame index within the source.
    pub index: u64,
    /// Byte offset of the frame within the source.
    pub offset: u64,
    pub data: Vec<u8>,
}

pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<FrameEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid frame length: {frame_len}")]
    InvalidFrameLength { frame_len: usize },
}
