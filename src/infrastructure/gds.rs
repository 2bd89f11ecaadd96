//! Bundled GDSII stream-format driver
//!
//! Reads the record stream directly: u16 big-endian total length, record
//! type byte, data type byte, payload. Geometry payloads are skipped by
//! length; only the records this tool consumes (HEADER, LIBNAME, UNITS,
//! structure names) are decoded. The external viewer and exporter re-read
//! the file themselves, so nothing more is needed here.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{Cell, CellLibrary, LayoutMeta};
use crate::infrastructure::error::DriverError;

/// Boundary to the component that understands the layout file format.
///
/// Everything above this trait is format-agnostic: the orchestration layer
/// sees only file metadata and cell inventories.
pub trait LayoutDriver: Send + Sync {
    /// Cheap metadata query: decode the UNITS record without reading cells.
    fn probe(&self, path: &Path) -> Result<LayoutMeta, DriverError>;

    /// Full pass: validate record framing to ENDLIB and collect the cells
    /// in file order.
    fn read(&self, path: &Path) -> Result<CellLibrary, DriverError>;
}

const RECORD_HEADER_LEN: usize = 4;

// Record types of the GDSII stream format.
const HEADER: u8 = 0x00;
const LIBNAME: u8 = 0x02;
const UNITS: u8 = 0x03;
const ENDLIB: u8 = 0x04;
const BGNSTR: u8 = 0x05;
const STRNAME: u8 = 0x06;
const ENDSTR: u8 = 0x07;

/// Data type tag for 8-byte excess-64 reals.
const DATA_TYPE_REAL8: u8 = 0x05;

/// GDSII driver reading the record stream from disk.
#[derive(Debug, Default)]
pub struct GdsDriver;

impl LayoutDriver for GdsDriver {
    fn probe(&self, path: &Path) -> Result<LayoutMeta, DriverError> {
        let mut records = open_stream(path)?;
        loop {
            let header = match records.next_header()? {
                Some(header) => header,
                None => {
                    return Err(records.malformed_at_end("stream ends before UNITS record"));
                }
            };
            match header.record_type {
                UNITS => {
                    let meta = decode_units(&mut records, &header)?;
                    debug!(
                        "probed {}: user unit {} m, database unit {} m",
                        path.display(),
                        meta.user_unit,
                        meta.db_unit
                    );
                    return Ok(meta);
                }
                ENDLIB => {
                    return Err(records.malformed_at(header.offset, "ENDLIB before UNITS record"));
                }
                _ => records.skip_payload(&header)?,
            }
        }
    }

    fn read(&self, path: &Path) -> Result<CellLibrary, DriverError> {
        let mut records = open_stream(path)?;
        let mut library: Option<CellLibrary> = None;
        let mut in_structure = false;
        let mut pending_name: Option<String> = None;

        loop {
            let header = match records.next_header()? {
                Some(header) => header,
                None => {
                    return Err(records.malformed_at_end("unexpected end of stream (missing ENDLIB)"));
                }
            };
            match header.record_type {
                LIBNAME => {
                    if library.is_some() {
                        return Err(records.malformed_at(header.offset, "duplicate LIBNAME record"));
                    }
                    let data = records.read_payload(&header)?;
                    let name = decode_text(data).ok_or_else(|| {
                        records.malformed_at(header.offset, "LIBNAME is not valid text")
                    })?;
                    library = Some(CellLibrary::new(name));
                }
                BGNSTR => {
                    if in_structure {
                        return Err(records.malformed_at(header.offset, "nested structure"));
                    }
                    if library.is_none() {
                        return Err(
                            records.malformed_at(header.offset, "structure before LIBNAME record")
                        );
                    }
                    in_structure = true;
                    pending_name = None;
                    records.skip_payload(&header)?;
                }
                STRNAME => {
                    if !in_structure {
                        return Err(records.malformed_at(header.offset, "STRNAME outside structure"));
                    }
                    if pending_name.is_some() {
                        return Err(
                            records.malformed_at(header.offset, "duplicate STRNAME in structure")
                        );
                    }
                    let data = records.read_payload(&header)?;
                    let name = decode_text(data).ok_or_else(|| {
                        records.malformed_at(header.offset, "cell name is not valid text")
                    })?;
                    if name.is_empty() {
                        return Err(records.malformed_at(header.offset, "empty cell name"));
                    }
                    pending_name = Some(name);
                }
                ENDSTR => {
                    if !in_structure {
                        return Err(records.malformed_at(header.offset, "ENDSTR outside structure"));
                    }
                    let name = pending_name.take().ok_or_else(|| {
                        records.malformed_at(header.offset, "structure without STRNAME")
                    })?;
                    if let Some(library) = library.as_mut() {
                        library
                            .push(Cell::new(name))
                            .map_err(|e| records.malformed_at(header.offset, e.to_string()))?;
                    }
                    in_structure = false;
                    records.skip_payload(&header)?;
                }
                ENDLIB => {
                    if in_structure {
                        return Err(records.malformed_at(header.offset, "ENDLIB inside structure"));
                    }
                    let library = library.ok_or_else(|| {
                        records.malformed_at(header.offset, "missing LIBNAME record")
                    })?;
                    debug!("read {} cells from {}", library.len(), path.display());
                    return Ok(library);
                }
                _ => records.skip_payload(&header)?,
            }
        }
    }
}

/// Open the file and consume the leading HEADER record.
fn open_stream(path: &Path) -> Result<RecordReader, DriverError> {
    let mut records = RecordReader::open(path)?;
    let first = records
        .next_header()?
        .ok_or_else(|| records.malformed_at(0, "empty stream"))?;
    if first.record_type != HEADER {
        return Err(records.malformed_at(first.offset, "missing HEADER record (not a GDSII stream)"));
    }
    records.skip_payload(&first)?;
    Ok(records)
}

fn decode_units(records: &mut RecordReader, header: &RecordHeader) -> Result<LayoutMeta, DriverError> {
    if header.data_type != DATA_TYPE_REAL8 {
        return Err(records.malformed_at(
            header.offset,
            format!(
                "UNITS data type 0x{:02x}, expected real8 (0x{:02x})",
                header.data_type, DATA_TYPE_REAL8
            ),
        ));
    }
    let data = records.read_payload(header)?;
    if data.len() != 16 {
        return Err(records.malformed_at(
            header.offset,
            format!("UNITS payload is {} bytes, expected 16", data.len()),
        ));
    }
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[0..8]);
    let db_per_user = decode_real8(word);
    word.copy_from_slice(&data[8..16]);
    let db_in_meters = decode_real8(word);

    let user_unit = db_in_meters / db_per_user;
    LayoutMeta::new(user_unit, db_in_meters)
        .map_err(|e| records.malformed_at(header.offset, e.to_string()))
}

/// Decode an 8-byte excess-64 real: sign bit, 7-bit base-16 exponent,
/// 56-bit fraction. value = fraction / 2^56 * 16^(exponent - 64).
fn decode_real8(word: [u8; 8]) -> f64 {
    let sign = if word[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = i32::from(word[0] & 0x7f) - 64;
    let mut fraction = 0u64;
    for &byte in &word[1..] {
        fraction = (fraction << 8) | u64::from(byte);
    }
    sign * (fraction as f64 / 2f64.powi(56)) * 16f64.powi(exponent)
}

/// Strip trailing NUL padding and decode as text.
fn decode_text(mut data: Vec<u8>) -> Option<String> {
    while data.last() == Some(&0) {
        data.pop();
    }
    String::from_utf8(data).ok()
}

struct RecordHeader {
    offset: u64,
    length: u16,
    record_type: u8,
    data_type: u8,
}

impl RecordHeader {
    fn payload_len(&self) -> usize {
        self.length as usize - RECORD_HEADER_LEN
    }
}

/// Cursor over the record stream, tracking byte offsets for diagnostics.
struct RecordReader {
    inner: BufReader<File>,
    offset: u64,
    path: PathBuf,
}

impl RecordReader {
    fn open(path: &Path) -> Result<Self, DriverError> {
        let file = File::open(path).map_err(|source| DriverError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            inner: BufReader::new(file),
            offset: 0,
            path: path.to_path_buf(),
        })
    }

    /// Next record header, or `None` at a clean end of stream (end exactly
    /// on a record boundary).
    fn next_header(&mut self) -> Result<Option<RecordHeader>, DriverError> {
        let start = self.offset;
        let mut buf = [0u8; RECORD_HEADER_LEN];
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.unreadable(e)),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(self.malformed_at(start, "truncated record header"));
        }

        let length = u16::from_be_bytes([buf[0], buf[1]]);
        if (length as usize) < RECORD_HEADER_LEN {
            return Err(self.malformed_at(
                start,
                format!("record length {} below header size", length),
            ));
        }
        self.offset += RECORD_HEADER_LEN as u64;
        Ok(Some(RecordHeader {
            offset: start,
            length,
            record_type: buf[2],
            data_type: buf[3],
        }))
    }

    fn read_payload(&mut self, header: &RecordHeader) -> Result<Vec<u8>, DriverError> {
        let mut data = vec![0u8; header.payload_len()];
        self.inner.read_exact(&mut data).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                self.malformed_at(header.offset, "record payload truncated")
            } else {
                self.unreadable(e)
            }
        })?;
        self.offset += data.len() as u64;
        Ok(data)
    }

    fn skip_payload(&mut self, header: &RecordHeader) -> Result<(), DriverError> {
        let len = header.payload_len();
        self.inner
            .seek_relative(len as i64)
            .map_err(|e| self.unreadable(e))?;
        self.offset += len as u64;
        Ok(())
    }

    fn malformed_at(&self, offset: u64, reason: impl Into<String>) -> DriverError {
        DriverError::Malformed {
            path: self.path.clone(),
            offset,
            reason: reason.into(),
        }
    }

    fn malformed_at_end(&self, reason: impl Into<String>) -> DriverError {
        self.malformed_at(self.offset, reason)
    }

    fn unreadable(&self, source: io::Error) -> DriverError {
        DriverError::Unreadable {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn record(record_type: u8, data_type: u8, payload: &[u8]) -> Vec<u8> {
        let length = (payload.len() + RECORD_HEADER_LEN) as u16;
        let mut bytes = length.to_be_bytes().to_vec();
        bytes.push(record_type);
        bytes.push(data_type);
        bytes.extend_from_slice(payload);
        bytes
    }

    /// Test-only inverse of `decode_real8`.
    fn encode_real8(value: f64) -> [u8; 8] {
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

    fn units_payload() -> Vec<u8> {
        // 0.001 database units per user unit, database unit = 1 nm
        let mut payload = encode_real8(0.001).to_vec();
        payload.extend_from_slice(&encode_real8(1e-9));
        payload
    }

    fn minimal_library(cells: &[&str]) -> Vec<u8> {
        let mut stream = Vec::new();
        stream.extend(record(HEADER, 0x02, &600i16.to_be_bytes()));
        stream.extend(record(0x01, 0x02, &[0u8; 24])); // BGNLIB timestamps
        stream.extend(record(LIBNAME, 0x06, b"TESTLIB\0"));
        stream.extend(record(UNITS, DATA_TYPE_REAL8, &units_payload()));
        for name in cells {
            stream.extend(record(BGNSTR, 0x02, &[0u8; 24]));
            stream.extend(record(STRNAME, 0x06, name.as_bytes()));
            stream.extend(record(ENDSTR, 0x00, &[]));
        }
        stream.extend(record(ENDLIB, 0x00, &[]));
        stream
    }

    fn write_stream(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    // ============================================================
    // real8 decoding
    // ============================================================

    #[test]
    fn given_reference_encoding_when_decoding_real8_then_matches_known_value() {
        // 0.001 as published in the stream-format description
        let value = decode_real8([0x3E, 0x41, 0x89, 0x37, 0x4B, 0xC6, 0xA7, 0xEF]);
        assert!((value - 0.001).abs() < 1e-15, "decoded {}", value);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(0.001)]
    #[case(1e-9)]
    #[case(0.25)]
    #[case(-2.5)]
    #[case(1024.0)]
    fn given_value_when_encoded_and_decoded_then_round_trips(#[case] value: f64) {
        let decoded = decode_real8(encode_real8(value));
        let tolerance = value.abs() * 1e-12 + 1e-300;
        assert!(
            (decoded - value).abs() <= tolerance,
            "{} decoded as {}",
            value,
            decoded
        );
    }

    #[test]
    fn given_sign_bit_when_decoding_then_value_is_negative() {
        let mut word = encode_real8(0.001);
        word[0] |= 0x80;
        assert!(decode_real8(word) < 0.0);
    }

    // ============================================================
    // probe()
    // ============================================================

    #[test]
    fn given_minimal_stream_when_probing_then_returns_units() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let path = write_stream(&temp, "chip.gds", &minimal_library(&["TOP"]));

        // Act
        let meta = GdsDriver.probe(&path).unwrap();

        // Assert
        assert!((meta.user_unit - 1e-6).abs() < 1e-18);
        assert!((meta.db_unit - 1e-9).abs() < 1e-21);
    }

    #[test]
    fn given_stream_without_units_when_probing_then_malformed() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let mut stream = Vec::new();
        stream.extend(record(HEADER, 0x02, &600i16.to_be_bytes()));
        stream.extend(record(LIBNAME, 0x06, b"TESTLIB\0"));
        stream.extend(record(ENDLIB, 0x00, &[]));
        let path = write_stream(&temp, "no_units.gds", &stream);

        // Act
        let err = GdsDriver.probe(&path).unwrap_err();

        // Assert
        assert!(matches!(err, DriverError::Malformed { .. }));
        assert!(err.to_string().contains("UNITS"));
    }

    #[test]
    fn given_text_file_when_probing_then_malformed() {
        let temp = TempDir::new().unwrap();
        let path = write_stream(&temp, "readme.txt", b"not a layout at all");

        let err = GdsDriver.probe(&path).unwrap_err();

        assert!(matches!(err, DriverError::Malformed { .. }));
    }

    #[test]
    fn given_short_garbage_when_probing_then_malformed_header() {
        let temp = TempDir::new().unwrap();
        let path = write_stream(&temp, "tiny.gds", b"no");

        let err = GdsDriver.probe(&path).unwrap_err();

        assert!(err.to_string().contains("truncated record header"));
    }

    #[test]
    fn given_missing_file_when_probing_then_unreadable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.gds");

        let err = GdsDriver.probe(&path).unwrap_err();

        assert!(matches!(err, DriverError::Unreadable { .. }));
    }

    // ============================================================
    // read()
    // ============================================================

    #[test]
    fn given_minimal_stream_when_reading_then_cells_in_file_order() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let path = write_stream(&temp, "chip.gds", &minimal_library(&["INV", "NAND2", "TOP"]));

        // Act
        let library = GdsDriver.read(&path).unwrap();

        // Assert
        assert_eq!(library.name(), "TESTLIB");
        assert_eq!(library.len(), 3);
        let names: Vec<_> = library.names().collect();
        assert_eq!(names, vec!["INV", "NAND2", "TOP"]);
        assert!(library.find("NAND2").is_some());
        assert!(library.find("XOR").is_none());
    }

    #[test]
    fn given_nul_padded_cell_name_when_reading_then_padding_stripped() {
        let temp = TempDir::new().unwrap();
        let path = write_stream(&temp, "chip.gds", &minimal_library(&["INV\0"]));

        let library = GdsDriver.read(&path).unwrap();

        assert_eq!(library.names().collect::<Vec<_>>(), vec!["INV"]);
    }

    #[test]
    fn given_truncated_stream_when_reading_then_malformed() {
        // Arrange: drop the trailing ENDLIB record
        let temp = TempDir::new().unwrap();
        let mut stream = minimal_library(&["INV"]);
        stream.truncate(stream.len() - 4);
        let path = write_stream(&temp, "cut.gds", &stream);

        // Act
        let err = GdsDriver.read(&path).unwrap_err();

        // Assert
        assert!(err.to_string().contains("missing ENDLIB"));
    }

    #[test]
    fn given_duplicate_cell_names_when_reading_then_malformed() {
        let temp = TempDir::new().unwrap();
        let path = write_stream(&temp, "dup.gds", &minimal_library(&["INV", "INV"]));

        let err = GdsDriver.read(&path).unwrap_err();

        assert!(err.to_string().contains("duplicate cell name"));
    }

    #[test]
    fn given_empty_cell_name_when_reading_then_malformed() {
        let temp = TempDir::new().unwrap();
        let path = write_stream(&temp, "empty.gds", &minimal_library(&["\0\0"]));

        let err = GdsDriver.read(&path).unwrap_err();

        assert!(err.to_string().contains("empty cell name"));
    }

    #[test]
    fn given_structure_without_name_when_reading_then_malformed() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let mut stream = Vec::new();
        stream.extend(record(HEADER, 0x02, &600i16.to_be_bytes()));
        stream.extend(record(LIBNAME, 0x06, b"TESTLIB\0"));
        stream.extend(record(UNITS, DATA_TYPE_REAL8, &units_payload()));
        stream.extend(record(BGNSTR, 0x02, &[0u8; 24]));
        stream.extend(record(ENDSTR, 0x00, &[]));
        stream.extend(record(ENDLIB, 0x00, &[]));
        let path = write_stream(&temp, "anon.gds", &stream);

        // Act
        let err = GdsDriver.read(&path).unwrap_err();

        // Assert
        assert!(err.to_string().contains("structure without STRNAME"));
    }

    #[test]
    fn given_geometry_records_when_reading_then_skipped_by_length() {
        // Arrange: an unknown record (BOUNDARY, 0x08) inside the structure
        let temp = TempDir::new().unwrap();
        let mut stream = Vec::new();
        stream.extend(record(HEADER, 0x02, &600i16.to_be_bytes()));
        stream.extend(record(LIBNAME, 0x06, b"TESTLIB\0"));
        stream.extend(record(UNITS, DATA_TYPE_REAL8, &units_payload()));
        stream.extend(record(BGNSTR, 0x02, &[0u8; 24]));
        stream.extend(record(STRNAME, 0x06, b"TOP\0"));
        stream.extend(record(0x08, 0x00, &[]));
        stream.extend(record(0x0e, 0x02, &[0x00, 0x05])); // LAYER 5
        stream.extend(record(ENDSTR, 0x00, &[]));
        stream.extend(record(ENDLIB, 0x00, &[]));
        let path = write_stream(&temp, "geo.gds", &stream);

        // Act
        let library = GdsDriver.read(&path).unwrap();

        // Assert
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["TOP"]);
    }
}
