use serde::Serialize;

use super::error::DecodeError;
use super::layout::{
    BATTERY_COUNT, COMMAND_COUNT, DRIVE_COUNT, DROID_NAME_LEN, HEADER_FIELDS,
    HEADER_SECTION, IMU_COUNT, SERVO_COUNT, packet_layout,
};
use super::reader::{PacketReader, Value, ValueCursor};
use super::schema::{
    BatteryState, CommandEcho, DriveControlState, FieldSchema, ImuState, ServoState,
    serialize_wire_f32,
};

/// One decoded telemetry snapshot.
///
/// Built only by [`decode`]; every accessor is read-only and the packet owns
/// all of its records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargeStatePacket {
    #[serde(serialize_with = "serialize_wire_f32")]
    timestamp: f32,
    droid_type: u8,
    droid_name: [u8; DROID_NAME_LEN],
    drive: [DriveControlState; DRIVE_COUNT],
    imu: [ImuState; IMU_COUNT],
    commands: [CommandEcho; COMMAND_COUNT],
    servos: [ServoState; SERVO_COUNT],
    batteries: [BatteryState; BATTERY_COUNT],
}

impl LargeStatePacket {
    pub fn timestamp(&self) -> f32 {
        self.timestamp
    }

    pub fn droid_type(&self) -> u8 {
        self.droid_type
    }

    /// Raw name field exactly as transmitted, padding included.
    pub fn droid_name(&self) -> &[u8; DROID_NAME_LEN] {
        &self.droid_name
    }

    /// Name for display: lossy UTF-8 with trailing NULs and whitespace removed.
    pub fn droid_name_lossy(&self) -> String {
        let raw = String::from_utf8_lossy(&self.droid_name);
        raw.trim_end_matches('\0').trim().to_string()
    }

    pub fn drive(&self) -> &[DriveControlState] {
        &self.drive
    }

    pub fn imu(&self) -> &[ImuState] {
        &self.imu
    }

    pub fn commands(&self) -> &[CommandEcho] {
        &self.commands
    }

    pub fn servos(&self) -> &[ServoState] {
        &self.servos
    }

    pub fn batteries(&self) -> &[BatteryState] {
        &self.batteries
    }
}

/// Decode one complete large state packet.
///
/// # Examples
/// ```
/// use droidstate_core::{DecodeError, PACKET_SIZE, decode};
///
/// let packet = decode(&[0u8; PACKET_SIZE])?;
/// assert_eq!(packet.servos().len(), 10);
///
/// let err = decode(&[0u8; PACKET_SIZE - 1]).unwrap_err();
/// assert!(matches!(err, DecodeError::SizeMismatch { .. }));
/// # Ok::<(), DecodeError>(())
/// ```
///
/// # Errors
/// [`DecodeError::SizeMismatch`] when `buffer` is not exactly
/// [`PACKET_SIZE`](super::layout::PACKET_SIZE) bytes long.
/// [`DecodeError::LayoutInconsistency`] when the schemas and the assembled
/// layout disagree.
pub fn decode(buffer: &[u8]) -> Result<LargeStatePacket, DecodeError> {
    let layout = packet_layout();
    let reader = PacketReader::new(buffer);
    reader.require_exact_len(layout.size())?;

    let values = reader.read_values(layout.fields())?;
    let packet = assemble(&values)?;

    log::trace!(
        "decoded large state packet: type={} timestamp={}",
        packet.droid_type,
        packet.timestamp
    );
    Ok(packet)
}

/// Slice the flat value sequence into the header and every body section.
///
/// Fails with [`DecodeError::LayoutInconsistency`] unless the sequence holds
/// exactly the values the schemas ask for.
fn assemble(values: &[Value<'_>]) -> Result<LargeStatePacket, DecodeError> {
    let (header, body) = values
        .split_at_checked(HEADER_FIELDS.len())
        .ok_or_else(|| DecodeError::inconsistency(HEADER_SECTION, "header values missing"))?;

    let mut fields = ValueCursor::new(HEADER_SECTION, header);
    let timestamp = fields.next_f32()?;
    let droid_type = fields.next_u8()?;
    let droid_name = fields.next_bytes::<DROID_NAME_LEN>()?;
    fields.finish()?;

    let mut body = ValueCursor::new("body", body);
    let packet = LargeStatePacket {
        timestamp,
        droid_type,
        droid_name,
        drive: take_records(&mut body)?,
        imu: take_records(&mut body)?,
        commands: take_records(&mut body)?,
        servos: take_records(&mut body)?,
        batteries: take_records(&mut body)?,
    };
    body.finish()?;
    Ok(packet)
}

fn take_records<S: FieldSchema, const N: usize>(
    cursor: &mut ValueCursor<'_, '_>,
) -> Result<[S; N], DecodeError> {
    let mut records = Vec::with_capacity(N);
    for _ in 0..N {
        records.push(S::from_values(cursor.take(S::NUM_VALUES)?)?);
    }
    records.try_into().map_err(|records: Vec<S>| {
        DecodeError::inconsistency(
            S::SECTION,
            format!("built {} records, expected {N}", records.len()),
        )
    })
}
