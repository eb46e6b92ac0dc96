//! Record schemas carried in the packet body.
//!
//! Every schema declares its byte layout and the number of values it consumes
//! from the flat decoded sequence. Records are built by positional
//! assignment; error and mode codes are passed through untouched.

use serde::{Serialize, Serializer};

use super::error::DecodeError;
use super::layout::FieldKind::{self, Byte, Float};
use super::reader::{Value, ValueCursor};

/// Serialize a float exactly as it arrived on the wire.
///
/// Finite values stay JSON numbers. JSON has no non-finite numbers, so
/// infinities are written as `"inf"` / `"-inf"` and NaNs as `"nan:0x<bits>"`
/// with their full bit pattern.
pub(crate) fn serialize_wire_f32<S: Serializer>(
    value: &f32,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f32(*value)
    } else if value.is_nan() {
        serializer.serialize_str(&format!("nan:0x{:08x}", value.to_bits()))
    } else if value.is_sign_positive() {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_str("-inf")
    }
}

/// Fixed record shape decoded from a run of flat values.
pub trait FieldSchema: Sized {
    /// Section name used in the layout and in diagnostics.
    const SECTION: &'static str;
    /// Wire layout of one record.
    const LAYOUT: &'static [FieldKind];
    /// Values consumed from the flat sequence per record.
    const NUM_VALUES: usize;

    /// Build a record from exactly [`Self::NUM_VALUES`] values.
    fn from_values(values: &[Value<'_>]) -> Result<Self, DecodeError>;
}

/// Drive motor control loop state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriveControlState {
    pub error_state: u8,
    pub control_mode: u8,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub present_pwm: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub present_speed: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub present_pos: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub goal: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub err: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub err_i: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub err_d: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub control: f32,
}

impl FieldSchema for DriveControlState {
    const SECTION: &'static str = "drive";
    const LAYOUT: &'static [FieldKind] =
        &[Byte, Byte, Float, Float, Float, Float, Float, Float, Float, Float];
    const NUM_VALUES: usize = 10;

    fn from_values(values: &[Value<'_>]) -> Result<Self, DecodeError> {
        let mut fields = ValueCursor::new(Self::SECTION, values);
        let state = Self {
            error_state: fields.next_u8()?,
            control_mode: fields.next_u8()?,
            present_pwm: fields.next_f32()?,
            present_speed: fields.next_f32()?,
            present_pos: fields.next_f32()?,
            goal: fields.next_f32()?,
            err: fields.next_f32()?,
            err_i: fields.next_f32()?,
            err_d: fields.next_f32()?,
            control: fields.next_f32()?,
        };
        fields.finish()?;
        Ok(state)
    }
}

/// Inertial measurement state: attitude, rates and acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImuState {
    pub error_state: u8,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub r: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub p: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub h: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub dr: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub dp: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub dh: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub ax: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub ay: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub az: f32,
}

impl FieldSchema for ImuState {
    const SECTION: &'static str = "imu";
    const LAYOUT: &'static [FieldKind] =
        &[Byte, Float, Float, Float, Float, Float, Float, Float, Float, Float];
    const NUM_VALUES: usize = 10;

    fn from_values(values: &[Value<'_>]) -> Result<Self, DecodeError> {
        let mut fields = ValueCursor::new(Self::SECTION, values);
        let state = Self {
            error_state: fields.next_u8()?,
            r: fields.next_f32()?,
            p: fields.next_f32()?,
            h: fields.next_f32()?,
            dr: fields.next_f32()?,
            dp: fields.next_f32()?,
            dh: fields.next_f32()?,
            ax: fields.next_f32()?,
            ay: fields.next_f32()?,
            az: fields.next_f32()?,
        };
        fields.finish()?;
        Ok(state)
    }
}

pub const COMMAND_ECHO_LEN: usize = 7;

/// Opaque echo of a command sent to the droid, kept byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandEcho {
    pub bytes: [u8; COMMAND_ECHO_LEN],
}

impl CommandEcho {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl FieldSchema for CommandEcho {
    const SECTION: &'static str = "commands";
    const LAYOUT: &'static [FieldKind] = &[Byte; COMMAND_ECHO_LEN];
    const NUM_VALUES: usize = COMMAND_ECHO_LEN;

    fn from_values(values: &[Value<'_>]) -> Result<Self, DecodeError> {
        let mut fields = ValueCursor::new(Self::SECTION, values);
        let mut bytes = [0u8; COMMAND_ECHO_LEN];
        for byte in &mut bytes {
            *byte = fields.next_u8()?;
        }
        fields.finish()?;
        Ok(Self { bytes })
    }
}

/// Servo goal, present position and load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServoState {
    pub error_state: u8,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub goal: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub present: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub load: f32,
}

impl FieldSchema for ServoState {
    const SECTION: &'static str = "servos";
    const LAYOUT: &'static [FieldKind] = &[Byte, Float, Float, Float];
    const NUM_VALUES: usize = 4;

    fn from_values(values: &[Value<'_>]) -> Result<Self, DecodeError> {
        let mut fields = ValueCursor::new(Self::SECTION, values);
        let state = Self {
            error_state: fields.next_u8()?,
            goal: fields.next_f32()?,
            present: fields.next_f32()?,
            load: fields.next_f32()?,
        };
        fields.finish()?;
        Ok(state)
    }
}

/// Battery pack voltage and current draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryState {
    pub error_state: u8,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub voltage: f32,
    #[serde(serialize_with = "serialize_wire_f32")]
    pub current: f32,
}

impl FieldSchema for BatteryState {
    const SECTION: &'static str = "batteries";
    const LAYOUT: &'static [FieldKind] = &[Byte, Float, Float];
    const NUM_VALUES: usize = 3;

    fn from_values(values: &[Value<'_>]) -> Result<Self, DecodeError> {
        let mut fields = ValueCursor::new(Self::SECTION, values);
        let state = Self {
            error_state: fields.next_u8()?,
            voltage: fields.next_f32()?,
            current: fields.next_f32()?,
        };
        fields.finish()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::layout::fields_size;

    fn assert_schema<S: FieldSchema>(num_values: usize, wire_bytes: usize) {
        assert_eq!(S::NUM_VALUES, num_values, "{}", S::SECTION);
        assert_eq!(S::LAYOUT.len(), S::NUM_VALUES, "{}", S::SECTION);
        assert_eq!(fields_size(S::LAYOUT), wire_bytes, "{}", S::SECTION);
    }

    #[test]
    fn schemas_declare_matching_value_counts() {
        assert_schema::<DriveControlState>(10, 34);
        assert_schema::<ImuState>(10, 37);
        assert_schema::<CommandEcho>(7, 7);
        assert_schema::<ServoState>(4, 13);
        assert_schema::<BatteryState>(3, 9);
    }

    #[test]
    fn drive_control_assigns_positionally() {
        let mut values = vec![Value::Byte(4), Value::Byte(1)];
        values.extend((0..8).map(|i| Value::Float(i as f32)));
        let state = DriveControlState::from_values(&values).unwrap();
        assert_eq!(state.error_state, 4);
        assert_eq!(state.control_mode, 1);
        assert_eq!(state.present_pwm, 0.0);
        assert_eq!(state.goal, 3.0);
        assert_eq!(state.control, 7.0);
    }

    #[test]
    fn command_echo_keeps_byte_order() {
        let values: Vec<_> = (10..17).map(Value::Byte).collect();
        let echo = CommandEcho::from_values(&values).unwrap();
        assert_eq!(echo.as_bytes(), &[10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn servo_rejects_short_slice() {
        let values = [Value::Byte(0), Value::Float(1.0)];
        let err = ServoState::from_values(&values).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LayoutInconsistency {
                section: "servos",
                ..
            }
        ));
    }

    #[test]
    fn battery_rejects_extra_values() {
        let values = [
            Value::Byte(0),
            Value::Float(12.0),
            Value::Float(0.5),
            Value::Byte(9),
        ];
        let err = BatteryState::from_values(&values).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn imu_rejects_kind_drift() {
        let mut values = vec![Value::Float(0.0)];
        values.extend((0..9).map(|_| Value::Float(0.0)));
        let err = ImuState::from_values(&values).unwrap_err();
        assert!(err.to_string().contains("expected byte"));
    }

    #[test]
    fn non_finite_floats_serialize_losslessly() {
        let servo = ServoState {
            error_state: 0xFF,
            goal: f32::from_bits(0xFFFF_FFFF),
            present: f32::INFINITY,
            load: f32::NEG_INFINITY,
        };
        let value = serde_json::to_value(servo).unwrap();
        assert_eq!(value["goal"], "nan:0xffffffff");
        assert_eq!(value["present"], "inf");
        assert_eq!(value["load"], "-inf");

        let battery = BatteryState {
            error_state: 0,
            voltage: 12.5,
            current: -0.25,
        };
        let value = serde_json::to_value(battery).unwrap();
        assert_eq!(value["voltage"], 12.5);
        assert_eq!(value["current"], -0.25);
    }
}
