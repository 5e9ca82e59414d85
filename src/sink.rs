//! Append-only byte buffer used to assemble container sections
//!
//! Every container is built as a set of `ByteSink` sections that are padded
//! to a format-specific boundary and then concatenated into one output sink.
//! Once a section has been appended to its parent it is never touched again.

/// Growable byte buffer with fixed-width little/big-endian writers.
#[derive(Debug, Clone, Default)]
pub struct ByteSink {
    data: Vec<u8>,
}

impl ByteSink {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Current size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn write_u8(&mut self, n: u8) {
        self.data.push(n);
    }

    pub fn write_u16(&mut self, n: u16) {
        self.data.extend_from_slice(&n.to_le_bytes());
    }

    pub fn write_u32(&mut self, n: u32) {
        self.data.extend_from_slice(&n.to_le_bytes());
    }

    pub fn write_u16_be(&mut self, n: u16) {
        self.data.extend_from_slice(&n.to_be_bytes());
    }

    pub fn write_u32_be(&mut self, n: u32) {
        self.data.extend_from_slice(&n.to_be_bytes());
    }

    /// Append raw bytes. A zero-length write is a no-op.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append the bytes of a string without a terminator.
    /// Section tags ("PAL", "CEL", ...) are written this way.
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Append a NUL-terminated string.
    pub fn write_str_z(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
    }

    /// Append another sink's contents.
    pub fn append(&mut self, other: &ByteSink) {
        self.data.extend_from_slice(&other.data);
    }

    /// Advance the size to the next multiple of `boundary`, filling with
    /// `fill`. Already-aligned sinks are left untouched.
    pub fn pad(&mut self, boundary: usize, fill: u8) {
        if boundary == 0 {
            return;
        }
        let rem = self.data.len() % boundary;
        if rem != 0 {
            self.data.resize(self.data.len() + boundary - rem, fill);
        }
    }
}
