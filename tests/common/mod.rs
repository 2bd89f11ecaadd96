//! Shared fixtures: hand-assembled GDSII streams for integration tests.

/// One record: u16 BE total length, record type, data type, payload.
pub fn gds_record(record_type: u8, data_type: u8, payload: &[u8]) -> Vec<u8> {
    let length = (payload.len() + 4) as u16;
    let mut bytes = length.to_be_bytes().to_vec();
    bytes.push(record_type);
    bytes.push(data_type);
    bytes.extend_from_slice(payload);
    bytes
}

/// Excess-64 base-16 floating point, as the stream format defines it.
pub fn encode_real8(value: f64) -> [u8; 8] {
    if value == 0.0 {
        return [0u8; 8];
    }
    let sign = if value < 0.0 { 0x80u8 } else { 0 };
    let mut fraction = value.abs();
    let mut exponent = 0i32;
    while fraction >= 1.0 {
        fraction /= 16.0;
        exponent += 1;
    }
    while fraction < 1.0 / 16.0 {
        fraction *= 16.0;
        exponent -= 1;
    }
    let mantissa = (fraction * 2f64.powi(56)) as u64;
    let mut word = [0u8; 8];
    word[0] = sign | ((exponent + 64) as u8 & 0x7f);
    for i in 0..7 {
        word[i + 1] = ((mantissa >> (8 * (6 - i))) & 0xff) as u8;
    }
    word
}

/// A complete stream: HEADER, BGNLIB, LIBNAME, UNITS (1 µm user unit,
/// 1 nm database unit), one structure per cell, ENDLIB.
pub fn library_stream(cells: &[&str]) -> Vec<u8> {
    let mut units = encode_real8(0.001).to_vec();
    units.extend_from_slice(&encode_real8(1e-9));

    let mut stream = Vec::new();
    stream.extend(gds_record(0x00, 0x02, &600i16.to_be_bytes())); // HEADER
    stream.extend(gds_record(0x01, 0x02, &[0u8; 24])); // BGNLIB
    stream.extend(gds_record(0x02, 0x06, b"TESTLIB\0")); // LIBNAME
    stream.extend(gds_record(0x03, 0x05, &units)); // UNITS
    for name in cells {
        stream.extend(gds_record(0x05, 0x02, &[0u8; 24])); // BGNSTR
        stream.extend(gds_record(0x06, 0x06, name.as_bytes())); // STRNAME
        stream.extend(gds_record(0x07, 0x00, &[])); // ENDSTR
    }
    stream.extend(gds_record(0x04, 0x00, &[])); // ENDLIB
    stream
}
