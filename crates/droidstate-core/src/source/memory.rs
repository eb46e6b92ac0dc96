use crate::source::{FrameEvent, FrameSource, SourceError};

/// Frames already received by a transport, one buffer per packet.
pub struct MemorySource {
    frames: std::vec::IntoIter<Vec<u8>>,
    index: u64,
    offset: u64,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            frames: frames.into_iter().collect::<Vec<_>>().into_iter(),
            index: 0,
            offset: 0,
        }
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<FrameEvent>, SourceError> {
        let Some(data) = self.frames.next() else {
            return Ok(None);
        };
        let event = FrameEvent {
            index: self.index,
            offset: self.offset,
            data,
        };
        self.index += 1;
        self.offset += event.data.len() as u64;
        Ok(Some(event))
    }
}
