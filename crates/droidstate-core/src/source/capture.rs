use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::packet::PACKET_SIZE;
use crate::source::{FrameEvent, FrameSource, SourceError};

/// Recorded capture of back-to-back fixed-size frames.
///
/// A truncated final frame is emitted as-is, so the decoder reports it as a
/// size mismatch instead of the source hiding it.
pub struct CaptureFileSource<R = BufReader<File>> {
    reader: R,
    frame_len: usize,
    index: u64,
    offset: u64,
    done: bool,
}

impl CaptureFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Self::open_with_frame_len(path, PACKET_SIZE)
    }

    pub fn open_with_frame_len(path: &Path, frame_len: usize) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), frame_len)
    }
}

impl<R: Read> CaptureFileSource<R> {
    pub fn from_reader(reader: R, frame_len: usize) -> Result<Self, SourceError> {
        if frame_len == 0 {
            return Err(SourceError::InvalidFrameLength { frame_len });
        }
        Ok(Self {
            reader,
            frame_len,
            index: 0,
            offset: 0,
            done: false,
        })
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }
}

impl<R: Read> FrameSource for CaptureFileSource<R> {
    fn next_frame(&mut self) -> Result<Option<FrameEvent>, SourceError> {
        if self.done {
            return Ok(None);
        }

        let mut data = Vec::with_capacity(self.frame_len);
        let filled = (&mut self.reader)
            .take(self.frame_len as u64)
            .read_to_end(&mut data)?;
        if filled == 0 {
            self.done = true;
            return Ok(None);
        }
        if filled < self.frame_len {
            self.done = true;
        }

        let event = FrameEvent {
            index: self.index,
            offset: self.offset,
            data,
        };
        self.index += 1;
        self.offset += filled as u64;
        Ok(Some(event))
    }
}
