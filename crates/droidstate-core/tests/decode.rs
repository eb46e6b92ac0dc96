use droidstate_core::{
    DecodeError, FieldKind, LargeStatePacket, PACKET_SIZE, decode, packet_layout,
};

/// Fill every field with a value unique to its layout position.
fn patterned_buffer() -> Vec<u8> {
    let mut payload = vec![0u8; PACKET_SIZE];
    for (k, field) in packet_layout().fields().iter().enumerate() {
        match field.kind {
            FieldKind::Byte => payload[field.offset] = k as u8,
            FieldKind::Float => {
                payload[field.range()].copy_from_slice(&(k as f32 + 0.5).to_le_bytes())
            }
            FieldKind::Bytes(len) => {
                for (i, byte) in payload[field.offset..field.offset + len].iter_mut().enumerate() {
                    *byte = 0xA0 + i as u8;
                }
            }
        }
    }
    payload
}

fn position(section: &str, instance: usize, index: usize) -> usize {
    packet_layout()
        .fields()
        .iter()
        .position(|f| f.section == section && f.instance == instance && f.index == index)
        .expect("field in layout")
}

fn float_at(section: &str, instance: usize, index: usize) -> f32 {
    position(section, instance, index) as f32 + 0.5
}

fn byte_at(section: &str, instance: usize, index: usize) -> u8 {
    position(section, instance, index) as u8
}

#[test]
fn every_correct_size_buffer_has_fixed_shape() {
    for fill in [0x00u8, 0x7F, 0xFF] {
        let packet = decode(&vec![fill; PACKET_SIZE]).unwrap();
        assert_eq!(packet.drive().len(), 3);
        assert_eq!(packet.imu().len(), 3);
        assert_eq!(packet.commands().len(), 2);
        assert_eq!(packet.servos().len(), 10);
        assert_eq!(packet.batteries().len(), 3);
    }
}

#[test]
fn every_other_size_is_a_size_mismatch() {
    for len in (0..PACKET_SIZE).chain(PACKET_SIZE + 1..PACKET_SIZE * 2 + 1) {
        let err = decode(&vec![0u8; len]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::SizeMismatch {
                actual: len,
                expected: PACKET_SIZE
            }
        );
    }
}

#[test]
fn fields_land_at_named_positions() {
    let packet = decode(&patterned_buffer()).unwrap();

    assert_eq!(packet.timestamp(), float_at("header", 0, 0));
    assert_eq!(packet.droid_type(), byte_at("header", 0, 1));
    assert_eq!(packet.droid_name()[0], 0xA0);
    assert_eq!(packet.droid_name()[15], 0xAF);

    for (i, drive) in packet.drive().iter().enumerate() {
        assert_eq!(drive.error_state, byte_at("drive", i, 0));
        assert_eq!(drive.control_mode, byte_at("drive", i, 1));
        assert_eq!(drive.present_pwm, float_at("drive", i, 2));
        assert_eq!(drive.present_speed, float_at("drive", i, 3));
        assert_eq!(drive.present_pos, float_at("drive", i, 4));
        assert_eq!(drive.goal, float_at("drive", i, 5));
        assert_eq!(drive.err, float_at("drive", i, 6));
        assert_eq!(drive.err_i, float_at("drive", i, 7));
        assert_eq!(drive.err_d, float_at("drive", i, 8));
        assert_eq!(drive.control, float_at("drive", i, 9));
    }

    for (i, imu) in packet.imu().iter().enumerate() {
        assert_eq!(imu.error_state, byte_at("imu", i, 0));
        assert_eq!(imu.r, float_at("imu", i, 1));
        assert_eq!(imu.h, float_at("imu", i, 3));
        assert_eq!(imu.dh, float_at("imu", i, 6));
        assert_eq!(imu.az, float_at("imu", i, 9));
    }

    for (i, echo) in packet.commands().iter().enumerate() {
        for (j, byte) in echo.as_bytes().iter().enumerate() {
            assert_eq!(*byte, byte_at("commands", i, j));
        }
    }

    for (i, servo) in packet.servos().iter().enumerate() {
        assert_eq!(servo.error_state, byte_at("servos", i, 0));
        assert_eq!(servo.goal, float_at("servos", i, 1));
        assert_eq!(servo.present, float_at("servos", i, 2));
        assert_eq!(servo.load, float_at("servos", i, 3));
    }

    for (i, battery) in packet.batteries().iter().enumerate() {
        assert_eq!(battery.error_state, byte_at("batteries", i, 0));
        assert_eq!(battery.voltage, float_at("batteries", i, 1));
        assert_eq!(battery.current, float_at("batteries", i, 2));
    }
}

#[test]
fn second_servo_load_reads_its_byte_offset() {
    let mut payload = vec![0u8; PACKET_SIZE];
    payload[270..274].copy_from_slice(&42.25f32.to_le_bytes());
    let packet = decode(&payload).unwrap();
    assert_eq!(packet.servos()[1].load, 42.25);
    assert_eq!(packet.servos()[1].present, 0.0);
    assert_eq!(packet.servos()[2].error_state, 0);
}

/// Every float of the packet as raw bits, in layout order.
fn float_bits(packet: &LargeStatePacket) -> Vec<u32> {
    let mut bits = vec![packet.timestamp().to_bits()];
    for d in packet.drive() {
        bits.extend(
            [d.present_pwm, d.present_speed, d.present_pos, d.goal, d.err, d.err_i, d.err_d, d.control]
                .map(f32::to_bits),
        );
    }
    for i in packet.imu() {
        bits.extend([i.r, i.p, i.h, i.dr, i.dp, i.dh, i.ax, i.ay, i.az].map(f32::to_bits));
    }
    for s in packet.servos() {
        bits.extend([s.goal, s.present, s.load].map(f32::to_bits));
    }
    for b in packet.batteries() {
        bits.extend([b.voltage, b.current].map(f32::to_bits));
    }
    bits
}

#[test]
fn decoding_is_deterministic() {
    for payload in [patterned_buffer(), vec![0xFF; PACKET_SIZE]] {
        let first = decode(&payload).unwrap();
        let second = decode(&payload).unwrap();
        assert_eq!(float_bits(&first), float_bits(&second));
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}

#[test]
fn all_ones_buffer_keeps_nan_bits() {
    let packet = decode(&[0xFF; PACKET_SIZE]).unwrap();
    let bits = float_bits(&packet);
    assert_eq!(bits.len(), 1 + 3 * 8 + 3 * 9 + 10 * 3 + 3 * 2);
    assert!(bits.iter().all(|&b| b == u32::MAX));
    assert_eq!(packet.droid_type(), 0xFF);
    assert_eq!(packet.commands()[1].bytes, [0xFF; 7]);

    let value = serde_json::to_value(&packet).unwrap();
    assert_eq!(value["timestamp"], "nan:0xffffffff");
    assert_eq!(value["servos"][0]["goal"], "nan:0xffffffff");
    assert_eq!(value["batteries"][2]["current"], "nan:0xffffffff");
}

#[test]
fn infinite_floats_survive_the_report() {
    let mut payload = vec![0u8; PACKET_SIZE];
    payload[0..4].copy_from_slice(&f32::INFINITY.to_le_bytes());
    payload[270..274].copy_from_slice(&f32::NEG_INFINITY.to_le_bytes());
    let packet = decode(&payload).unwrap();
    let value = serde_json::to_value(&packet).unwrap();
    assert_eq!(value["timestamp"], "inf");
    assert_eq!(value["servos"][1]["load"], "-inf");
    assert_eq!(value["servos"][1]["goal"], 0.0);
}

#[test]
fn decode_from_many_threads() {
    let payload = patterned_buffer();
    let expected = decode(&payload).unwrap();
    let packets: Vec<LargeStatePacket> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| decode(&payload).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(packets.iter().all(|packet| *packet == expected));
}
