#![deny(missing_docs)]

//! Write binary data

use std::iter;

use byteorder::ByteOrder;

use crate::error::WriteError;
use crate::size;

/// An in-memory buffer that implements `WriteContext`.
pub struct WriteBuffer {
    data: Vec<u8>,
}

/// A `WriteContext` implementation that just counts the bytes written.
pub struct WriteCounter {
    count: usize,
}

/// Trait that describes a type that can be written to a `WriteContext` in binary form with
/// dependent arguments.
pub trait WriteBinaryDep<HostType = Self> {
    /// The type of the arguments supplied to `write_dep`.
    type Args;
    /// The type of the value returned by `write_dep`.
    type Output;

    /// Write the binary representation of Self to `ctxt`.
    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        val: HostType,
        args: Self::Args,
    ) -> Result<Self::Output, WriteError>;
}

/// Trait for types that can have binary data written to them.
pub trait WriteContext {
    /// Write a slice of bytes to a `WriteContext`.
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError>;

    /// Write the specified number of zero bytes to the `WriteContext`.
    fn write_zeros(&mut self, count: usize) -> Result<(), WriteError>;

    /// The total number of bytes written so far.
    fn bytes_written(&self) -> usize;

    /// Write a `u8`.
    fn write_u8(&mut self, val: u8) -> Result<(), WriteError> {
        self.write_bytes(&[val])
    }

    /// Write an `i8`.
    fn write_i8(&mut self, val: i8) -> Result<(), WriteError> {
        self.write_bytes(&val.to_ne_bytes())
    }

    /// Write a `u16` with byte order `E`.
    fn write_u16<E: ByteOrder>(&mut self, val: u16) -> Result<(), WriteError> {
        let mut buf = [0; size::U16];
        E::write_u16(&mut buf, val);
        self.write_bytes(&buf)
    }

    /// Write an `i16` with byte order `E`.
    fn write_i16<E: ByteOrder>(&mut self, val: i16) -> Result<(), WriteError> {
        let mut buf = [0; size::I16];
        E::write_i16(&mut buf, val);
        self.write_bytes(&buf)
    }

    /// Write a `u32` with byte order `E`.
    fn write_u32<E: ByteOrder>(&mut self, val: u32) -> Result<(), WriteError> {
        let mut buf = [0; size::U32];
        E::write_u32(&mut buf, val);
        self.write_bytes(&buf)
    }

    /// Write an `i32` with byte order `E`.
    fn write_i32<E: ByteOrder>(&mut self, val: i32) -> Result<(), WriteError> {
        let mut buf = [0; size::I32];
        E::write_i32(&mut buf, val);
        self.write_bytes(&buf)
    }

    /// Write a `u64` with byte order `E`.
    fn write_u64<E: ByteOrder>(&mut self, val: u64) -> Result<(), WriteError> {
        let mut buf = [0; size::U64];
        E::write_u64(&mut buf, val);
        self.write_bytes(&buf)
    }

    /// Write an `i64` with byte order `E`.
    fn write_i64<E: ByteOrder>(&mut self, val: i64) -> Result<(), WriteError> {
        let mut buf = [0; size::I64];
        E::write_i64(&mut buf, val);
        self.write_bytes(&buf)
    }

    /// Write a native-width unsigned integer with byte order `E`.
    fn write_usize<E: ByteOrder>(&mut self, val: usize) -> Result<(), WriteError> {
        let mut buf = [0; size::USIZE];
        E::write_uint(&mut buf, val as u64, size::USIZE);
        self.write_bytes(&buf)
    }

    /// Write a native-width signed integer with byte order `E`.
    fn write_isize<E: ByteOrder>(&mut self, val: isize) -> Result<(), WriteError> {
        let mut buf = [0; size::ISIZE];
        E::write_int(&mut buf, val as i64, size::ISIZE);
        self.write_bytes(&buf)
    }

    /// Write an `f32` with byte order `E`.
    fn write_f32<E: ByteOrder>(&mut self, val: f32) -> Result<(), WriteError> {
        let mut buf = [0; size::F32];
        E::write_f32(&mut buf, val);
        self.write_bytes(&buf)
    }

    /// Write an `f64` with byte order `E`.
    fn write_f64<E: ByteOrder>(&mut self, val: f64) -> Result<(), WriteError> {
        let mut buf = [0; size::F64];
        E::write_f64(&mut buf, val);
        self.write_bytes(&buf)
    }
}

impl WriteContext for WriteBuffer {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.data.extend(data.iter());
        Ok(())
    }

    fn write_zeros(&mut self, count: usize) -> Result<(), WriteError> {
        let zeros = iter::repeat(0).take(count);
        self.data.extend(zeros);
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.data.len()
    }
}

impl WriteContext for WriteCounter {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.count += data.len();
        Ok(())
    }

    fn write_zeros(&mut self, count: usize) -> Result<(), WriteError> {
        self.count += count;
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.count
    }
}

impl WriteBuffer {
    /// Create a new, empty `WriteBuffer`
    pub fn new() -> Self {
        WriteBuffer { data: Vec::new() }
    }

    /// Retrieve a slice of the data held by this buffer
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume `self` and return the inner buffer
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        WriteBuffer::new()
    }
}

impl WriteCounter {
    /// Create a new, empty `WriteCounter`
    pub fn new() -> Self {
        WriteCounter { count: 0 }
    }
}

impl Default for WriteCounter {
    fn default() -> Self {
        WriteCounter::new()
    }
}
