//! Large state packet decoding.
//!
//! The packet is one flat little-endian buffer: a header (timestamp, droid
//! type, 16-byte name) followed by fixed repetitions of five record schemas.
//! Decoding follows the same layering as a protocol decoder:
//! - `schema`: record shapes and their per-record layouts
//! - `layout`: the assembled packet layout (source of truth for size/order)
//! - `reader`: bounds-checked byte access and the flat value cursor
//! - `parser`: size check, one-pass decode, structured slicing
//! - `error`: explicit, actionable errors
//!
//! Decoding is pure: no I/O, no shared mutable state. The only shared data is
//! the assembled layout, which is read-only once built.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod schema;

pub use error::DecodeError;
pub use layout::{FieldKind, LayoutField, PACKET_SIZE, PacketLayout, Section, packet_layout};
pub use parser::{LargeStatePacket, decode};
pub use schema::{BatteryState, CommandEcho, DriveControlState, FieldSchema, ImuState, ServoState};
