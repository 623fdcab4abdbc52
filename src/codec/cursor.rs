//! Typed primitive (un)packing over a byte buffer.
//!
//! Little-endian throughout. `BinaryWriter` owns a growable buffer and a
//! write offset; `BinaryReader` owns a borrowed view and a read offset. This
//! is the hand-rolled equivalent of the teacher's `FrameBuilder`/`FrameReader`
//! pair, generalized with the length-prefixed string/uuid/byte-array
//! primitives the wire protocol needs.

use uuid::Uuid;

/// Errors surfaced while decoding a frame. The codec never silently
/// swallows bytes: a partial or invalid frame always raises one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("truncated frame: needed {needed} more byte(s) at offset {offset}, had {available}")]
    TruncatedFrame {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid UTF-8 in string field at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("invalid UUID length {length} at offset {offset}: expected 16")]
    InvalidUuidLength { offset: usize, length: u64 },
}

/// Growable little-endian byte writer.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer, returning the finished buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn reserve_for(&mut self, extra: usize) {
        let needed = self.buf.len() + extra;
        if needed > self.buf.capacity() {
            let doubled = self.buf.capacity() * 2;
            self.buf.reserve(doubled.max(needed) - self.buf.len());
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.reserve_for(1);
        self.buf.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.reserve_for(4);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.reserve_for(8);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.reserve_for(4);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(if value { 1 } else { 0 });
    }

    pub fn write_vec2(&mut self, value: crate::util::vec2::Vec2) {
        self.write_f32(value.x);
        self.write_f32(value.y);
    }

    pub fn write_string(&mut self, value: &str) {
        let bytes = value.as_bytes();
        self.write_u64(bytes.len() as u64);
        self.reserve_for(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_byte_array(&mut self, value: &[u8]) {
        self.write_u64(value.len() as u64);
        self.reserve_for(value.len());
        self.buf.extend_from_slice(value);
    }

    /// u64 length prefix (always 16) followed by the 16 raw bytes.
    pub fn write_uuid(&mut self, value: Uuid) {
        self.write_u64(16);
        self.reserve_for(16);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// One presence byte, then the value only when `Some`.
    pub fn write_option<T>(&mut self, value: Option<T>, write_value: impl FnOnce(&mut Self, T)) {
        match value {
            Some(v) => {
                self.write_bool(true);
                write_value(self, v);
            }
            None => self.write_bool(false),
        }
    }
}

/// Bounds-checked little-endian byte reader over a borrowed slice.
#[derive(Debug)]
pub struct BinaryReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    pub fn has_remaining(&self) -> bool {
        self.offset < self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CursorError> {
        if self.offset + n > self.buf.len() {
            return Err(CursorError::TruncatedFrame {
                offset: self.offset,
                needed: n,
                available: self.buf.len() - self.offset,
            });
        }
        let slice = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, CursorError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, CursorError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn read_f32(&mut self) -> Result<f32, CursorError> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_bool(&mut self) -> Result<bool, CursorError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_vec2(&mut self) -> Result<crate::util::vec2::Vec2, CursorError> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        Ok(crate::util::vec2::Vec2::new(x, y))
    }

    pub fn read_string(&mut self) -> Result<String, CursorError> {
        let start_offset = self.offset;
        let len = self.read_u64()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CursorError::InvalidUtf8 { offset: start_offset })
    }

    pub fn read_byte_array(&mut self) -> Result<Vec<u8>, CursorError> {
        let len = self.read_u64()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    /// u64 length prefix (must equal 16) followed by 16 raw bytes.
    pub fn read_uuid(&mut self) -> Result<Uuid, CursorError> {
        let start_offset = self.offset;
        let len = self.read_u64()?;
        if len != 16 {
            return Err(CursorError::InvalidUuidLength {
                offset: start_offset,
                length: len,
            });
        }
        let bytes = self.take(16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Ok(Uuid::from_bytes(raw))
    }

    /// One presence byte, then the value only when it was `true`.
    pub fn read_option<T>(
        &mut self,
        read_value: impl FnOnce(&mut Self) -> Result<T, CursorError>,
    ) -> Result<Option<T>, CursorError> {
        if self.read_bool()? {
            Ok(Some(read_value(self)?))
        } else {
            Ok(None)
        }
    }
}
