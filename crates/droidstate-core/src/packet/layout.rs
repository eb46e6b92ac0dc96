//! Wire layout of the large state packet.
//!
//! The assembled [`PacketLayout`] is the single source of truth for the
//! expected buffer size and the decode order. Per-record layouts live on the
//! schemas; this module adds the header and the fixed repetition counts.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use serde::Serialize;

use super::schema::{
    BatteryState, CommandEcho, DriveControlState, FieldSchema, ImuState, ServoState,
};

/// Wire type of a single field. All multi-byte fields are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Unsigned 8-bit integer.
    Byte,
    /// IEEE-754 single precision float.
    Float,
    /// Raw byte blob of a fixed length.
    Bytes(usize),
}

impl FieldKind {
    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            FieldKind::Byte => 1,
            FieldKind::Float => 4,
            FieldKind::Bytes(len) => len,
        }
    }

    /// Short name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::Byte => "byte",
            FieldKind::Float => "float",
            FieldKind::Bytes(_) => "bytes",
        }
    }
}

pub const DROID_NAME_LEN: usize = 16;

pub const TIMESTAMP_RANGE: Range<usize> = 0..4;
pub const DROID_TYPE_OFFSET: usize = 4;
pub const DROID_NAME_RANGE: Range<usize> = 5..5 + DROID_NAME_LEN;

pub const HEADER_SECTION: &str = "header";
pub const HEADER_FIELDS: &[FieldKind] = &[
    FieldKind::Float,
    FieldKind::Byte,
    FieldKind::Bytes(DROID_NAME_LEN),
];
pub const HEADER_LEN: usize = fields_size(HEADER_FIELDS);

pub const DRIVE_COUNT: usize = 3;
pub const IMU_COUNT: usize = 3;
pub const COMMAND_COUNT: usize = 2;
pub const SERVO_COUNT: usize = 10;
pub const BATTERY_COUNT: usize = 3;

/// One repeated record block of the packet body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Section {
    pub name: &'static str,
    pub fields: &'static [FieldKind],
    pub count: usize,
}

impl Section {
    const fn of<S: FieldSchema>(count: usize) -> Self {
        Self {
            name: S::SECTION,
            fields: S::LAYOUT,
            count,
        }
    }

    /// Bytes occupied by all repetitions of this section.
    pub const fn size(&self) -> usize {
        fields_size(self.fields) * self.count
    }
}

/// Body sections in transmission order.
pub const SECTIONS: [Section; 5] = [
    Section::of::<DriveControlState>(DRIVE_COUNT),
    Section::of::<ImuState>(IMU_COUNT),
    Section::of::<CommandEcho>(COMMAND_COUNT),
    Section::of::<ServoState>(SERVO_COUNT),
    Section::of::<BatteryState>(BATTERY_COUNT),
];

/// Total wire size of a large state packet.
pub const PACKET_SIZE: usize = HEADER_LEN + body_size(&SECTIONS);

pub const fn fields_size(fields: &[FieldKind]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += fields[i].size();
        i += 1;
    }
    total
}

const fn body_size(sections: &[Section]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < sections.len() {
        total += sections[i].size();
        i += 1;
    }
    total
}

/// A single field placed at its byte offset within the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutField {
    /// Section name (`header`, `drive`, `imu`, ...).
    pub section: &'static str,
    /// Repetition index within the section.
    pub instance: usize,
    /// Field index within one record.
    pub index: usize,
    pub kind: FieldKind,
    pub offset: usize,
}

impl LayoutField {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.kind.size()
    }
}

/// Fully assembled packet layout.
///
/// # Examples
/// ```
/// use droidstate_core::{PACKET_SIZE, packet_layout};
///
/// let layout = packet_layout();
/// assert_eq!(layout.size(), PACKET_SIZE);
/// assert!(layout.descriptor().starts_with("<fB16s2B8f"));
/// ```
#[derive(Debug, Clone)]
pub struct PacketLayout {
    fields: Vec<LayoutField>,
    size: usize,
    descriptor: String,
}

impl PacketLayout {
    fn assemble() -> Self {
        let mut layout = Self {
            fields: Vec::new(),
            size: 0,
            descriptor: String::from("<"),
        };
        layout.push_record(HEADER_SECTION, 0, HEADER_FIELDS);
        for section in &SECTIONS {
            for instance in 0..section.count {
                layout.push_record(section.name, instance, section.fields);
            }
        }
        layout
    }

    fn push_record(&mut self, section: &'static str, instance: usize, fields: &[FieldKind]) {
        for (index, kind) in fields.iter().copied().enumerate() {
            self.fields.push(LayoutField {
                section,
                instance,
                index,
                kind,
                offset: self.size,
            });
            self.size += kind.size();
        }
        self.descriptor.push_str(&format_code(fields));
    }

    /// Expected buffer size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of values produced by one flat decode pass.
    pub fn value_count(&self) -> usize {
        self.fields.len()
    }

    /// Every field in decode order.
    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }

    /// Header fields followed by the body fields.
    pub fn split_header(&self) -> (&[LayoutField], &[LayoutField]) {
        self.fields.split_at(HEADER_FIELDS.len())
    }

    /// Struct-style format string, e.g. `<fB16s2B8f...`.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn sections(&self) -> &'static [Section] {
        &SECTIONS
    }

    /// Look up one field by section, repetition and field index.
    pub fn field(&self, section: &str, instance: usize, index: usize) -> Option<&LayoutField> {
        self.fields.iter().find(|field| {
            field.section == section && field.instance == instance && field.index == index
        })
    }
}

impl fmt::Display for PacketLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}

/// Shared packet layout, assembled on first use.
pub fn packet_layout() -> &'static PacketLayout {
    static LAYOUT: OnceLock<PacketLayout> = OnceLock::new();
    LAYOUT.get_or_init(PacketLayout::assemble)
}

fn format_code(fields: &[FieldKind]) -> String {
    let mut out = String::new();
    let mut iter = fields.iter().copied().peekable();
    while let Some(kind) = iter.next() {
        let code = match kind {
            FieldKind::Byte => 'B',
            FieldKind::Float => 'f',
            FieldKind::Bytes(len) => {
                out.push_str(&format!("{len}s"));
                continue;
            }
        };
        let mut run = 1;
        while iter.peek() == Some(&kind) {
            iter.next();
            run += 1;
        }
        if run > 1 {
            out.push_str(&run.to_string());
        }
        out.push(code);
    }
    out
}
