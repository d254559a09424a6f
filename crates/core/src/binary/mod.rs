//! Little-endian primitives used by the capture format.
//!
//! [`BinaryReader`] is a plain cursor over a borrowed byte slice. Every read
//! advances the cursor by exactly the width it consumed and a short read is
//! reported as [`RiftChartError::UnexpectedEof`]; there is no recovery.
//! [`BinaryWriter`] is the encoding counterpart.

use crate::{Result, RiftChartError};

/// Sequential cursor over a byte buffer.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(RiftChartError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take::<8>()?))
    }

    /// Reads one byte; any non-zero value is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.take::<1>()?[0] != 0)
    }

    /// Reads a string prefixed by a signed byte holding its UTF-8 length.
    pub fn read_string(&mut self) -> Result<String> {
        let offset = self.pos;
        let len = self.read_i8()?;
        let len = usize::try_from(len).map_err(|_| RiftChartError::InvalidString { offset })?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| RiftChartError::InvalidString { offset })
    }

    /// Reads a count prefix, rejecting negative values.
    pub fn read_count(&mut self, field: &'static str) -> Result<usize> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| RiftChartError::NegativeCount { field, count })
    }
}

/// Growable buffer producing the same layout [`BinaryReader`] consumes.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Writes a length-prefixed string. Strings longer than 127 bytes cannot
    /// be represented by the signed length byte.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let len = i8::try_from(value.len())
            .map_err(|_| RiftChartError::msg(format!("string `{value}` exceeds 127 bytes")))?;
        self.write_i8(len);
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Writes a count prefix.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = i32::try_from(count)
            .map_err(|_| RiftChartError::msg(format!("count {count} does not fit in i32")))?;
        self.write_i32(count);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_survive_a_write_read_cycle() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(-42);
        writer.write_f64(1.00049999);
        writer.write_bool(true);
        writer.write_string("Disco Disaster").unwrap();
        writer.write_i32(i32::MAX);

        let bytes = writer.into_bytes();
        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_i32().unwrap(), -42);
        assert_eq!(reader.read_f64().unwrap(), 1.00049999);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_string().unwrap(), "Disco Disaster");
        assert_eq!(reader.read_i32().unwrap(), i32::MAX);
        assert!(reader.is_empty());
    }

    #[test]
    fn reads_advance_by_their_width() {
        let bytes = [0u8; 13];
        let mut reader = BinaryReader::new(&bytes);
        reader.read_i32().unwrap();
        assert_eq!(reader.position(), 4);
        reader.read_f64().unwrap();
        assert_eq!(reader.position(), 12);
        reader.read_bool().unwrap();
        assert_eq!(reader.position(), 13);
    }

    #[test]
    fn short_read_reports_offset() {
        let bytes = [1u8, 2, 3];
        let mut reader = BinaryReader::new(&bytes);
        let err = reader.read_i32().unwrap_err();
        assert!(matches!(
            err,
            RiftChartError::UnexpectedEof {
                offset: 0,
                needed: 4,
                available: 3
            }
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn string_length_past_end_is_rejected() {
        let bytes = [5u8, b'a', b'b'];
        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            reader.read_string(),
            Err(RiftChartError::UnexpectedEof { needed: 5, .. })
        ));
    }

    #[test]
    fn negative_string_length_is_invalid() {
        let bytes = [0xffu8, b'a'];
        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            reader.read_string(),
            Err(RiftChartError::InvalidString { offset: 0 })
        ));
    }

    #[test]
    fn empty_string_is_allowed() {
        let mut writer = BinaryWriter::new();
        writer.write_string("").unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![0]);
        assert_eq!(BinaryReader::new(&bytes).read_string().unwrap(), "");
    }

    #[test]
    fn overlong_strings_cannot_be_written() {
        let mut writer = BinaryWriter::new();
        assert!(writer.write_string(&"x".repeat(128)).is_err());
        assert!(writer.is_empty());
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(-1);
        let bytes = writer.into_bytes();
        let err = BinaryReader::new(&bytes).read_count("event").unwrap_err();
        assert!(format!("{err}").contains("negative event count"));
    }
}
