use super::error::DecodeError;
use super::layout::{FieldKind, LayoutField};

/// One decoded field of the flat value sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Byte(u8),
    Float(f32),
    Bytes(&'a [u8]),
}

impl Value<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Byte(_) => FieldKind::Byte,
            Value::Float(_) => FieldKind::Float,
            Value::Bytes(bytes) => FieldKind::Bytes(bytes.len()),
        }
    }
}

/// Bounds-checked access to a packet buffer.
pub struct PacketReader<'a> {
    payload: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_exact_len(&self, expected: usize) -> Result<(), DecodeError> {
        if self.payload.len() != expected {
            return Err(DecodeError::SizeMismatch {
                actual: self.payload.len(),
                expected,
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.read_slice(offset..offset + 1).map(|bytes| bytes[0])
    }

    pub fn read_f32_le(&self, offset: usize) -> Result<f32, DecodeError> {
        let bytes = self.read_slice(offset..offset + 4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.payload.get(range.clone()).ok_or_else(|| {
            DecodeError::inconsistency(
                "reader",
                format!(
                    "field at {}..{} exceeds {}-byte buffer",
                    range.start,
                    range.end,
                    self.payload.len()
                ),
            )
        })
    }

    pub fn read_field(&self, field: &LayoutField) -> Result<Value<'a>, DecodeError> {
        match field.kind {
            FieldKind::Byte => self.read_u8(field.offset).map(Value::Byte),
            FieldKind::Float => self.read_f32_le(field.offset).map(Value::Float),
            FieldKind::Bytes(_) => self.read_slice(field.range()).map(Value::Bytes),
        }
    }

    /// Decode every field in order into the flat value sequence.
    pub fn read_values(&self, fields: &[LayoutField]) -> Result<Vec<Value<'a>>, DecodeError> {
        fields.iter().map(|field| self.read_field(field)).collect()
    }
}

/// Running cursor over a flat value sequence.
///
/// Both the packet body walk and positional record construction go through
/// this cursor, so any disagreement between a schema and the assembled
/// layout surfaces as [`DecodeError::LayoutInconsistency`].
pub struct ValueCursor<'v, 'a> {
    section: &'static str,
    values: &'v [Value<'a>],
    position: usize,
}

impl<'v, 'a> ValueCursor<'v, 'a> {
    pub fn new(section: &'static str, values: &'v [Value<'a>]) -> Self {
        Self {
            section,
            values,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.values.len() - self.position
    }

    /// Slice the next `count` values and advance past them.
    pub fn take(&mut self, count: usize) -> Result<&'v [Value<'a>], DecodeError> {
        let end = self.position + count;
        let slice = self.values.get(self.position..end).ok_or_else(|| {
            DecodeError::inconsistency(
                self.section,
                format!(
                    "need {count} values at position {}, only {} left",
                    self.position,
                    self.remaining()
                ),
            )
        })?;
        self.position = end;
        Ok(slice)
    }

    fn next_value(&mut self, wanted: FieldKind) -> Result<Value<'a>, DecodeError> {
        let value = self.values.get(self.position).copied().ok_or_else(|| {
            DecodeError::inconsistency(
                self.section,
                format!("missing {} at position {}", wanted.name(), self.position),
            )
        })?;
        self.position += 1;
        Ok(value)
    }

    fn mismatch(&self, wanted: FieldKind, found: Value<'_>) -> DecodeError {
        DecodeError::inconsistency(
            self.section,
            format!(
                "expected {} at position {}, found {}",
                wanted.name(),
                self.position - 1,
                found.kind().name()
            ),
        )
    }

    pub fn next_u8(&mut self) -> Result<u8, DecodeError> {
        match self.next_value(FieldKind::Byte)? {
            Value::Byte(value) => Ok(value),
            other => Err(self.mismatch(FieldKind::Byte, other)),
        }
    }

    pub fn next_f32(&mut self) -> Result<f32, DecodeError> {
        match self.next_value(FieldKind::Float)? {
            Value::Float(value) => Ok(value),
            other => Err(self.mismatch(FieldKind::Float, other)),
        }
    }

    pub fn next_bytes<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        match self.next_value(FieldKind::Bytes(N))? {
            Value::Bytes(bytes) => bytes.try_into().map_err(|_| {
                DecodeError::inconsistency(
                    self.section,
                    format!("expected {N}-byte blob, found {} bytes", bytes.len()),
                )
            }),
            other => Err(self.mismatch(FieldKind::Bytes(N), other)),
        }
    }

    /// Require that every value was consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.position != self.values.len() {
            return Err(DecodeError::inconsistency(
                self.section,
                format!(
                    "cursor stopped at {} of {} values",
                    self.position,
                    self.values.len()
                ),
            ));
        }
        Ok(())
    }
}
