#![allow(missing_docs)]

//! Read binary data
//!
//! A [ReadScope] is a view of a byte slice. Reading is done through a [ReadCtxt], which
//! tracks how far into the scope has been consumed. Multi-byte reads are parametrised
//! by a [byteorder::ByteOrder] so the same context serves every endianness.

use crate::error::ParseError;
use crate::size;
use byteorder::ByteOrder;

#[derive(Debug, Copy, Clone)]
pub struct ReadEof {}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReadScope<'a> {
    data: &'a [u8],
}

#[derive(Clone)]
pub struct ReadCtxt<'a> {
    scope: ReadScope<'a>,
    offset: usize,
}

pub trait ReadBinaryDep {
    type Args<'a>: Copy;
    type HostType<'a>: Sized; // default = Self

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        args: Self::Args<'a>,
    ) -> Result<Self::HostType<'a>, ParseError>;
}

pub trait ReadFixedSizeDep: ReadBinaryDep {
    /// The number of bytes consumed by `ReadBinaryDep::read_dep`.
    fn size(args: Self::Args<'_>) -> usize;
}

impl<'a> ReadScope<'a> {
    pub fn new(data: &'a [u8]) -> ReadScope<'a> {
        ReadScope { data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn offset(&self, offset: usize) -> ReadScope<'a> {
        let data = self.data.get(offset..).unwrap_or(&[]);
        ReadScope { data }
    }

    pub fn offset_length(&self, offset: usize, length: usize) -> Result<ReadScope<'a>, ReadEof> {
        let data = self.data.get(offset..).unwrap_or(&[]);
        if length <= data.len() {
            let data = &data[0..length];
            Ok(ReadScope { data })
        } else {
            Err(ReadEof {})
        }
    }

    pub fn ctxt(&self) -> ReadCtxt<'a> {
        ReadCtxt::new(*self)
    }
}

impl<'a> ReadCtxt<'a> {
    /// ReadCtxt is constructed by calling `ReadScope::ctxt`.
    fn new(scope: ReadScope<'a>) -> ReadCtxt<'a> {
        ReadCtxt { scope, offset: 0 }
    }

    /// The scope of the data that has not been read yet.
    pub fn scope(&self) -> ReadScope<'a> {
        self.scope.offset(self.offset)
    }

    /// The number of bytes read so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn read_dep<T: ReadBinaryDep>(
        &mut self,
        args: T::Args<'a>,
    ) -> Result<T::HostType<'a>, ParseError> {
        T::read_dep(self, args)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadEof> {
        let bytes = self.read_slice(size::U8)?;
        Ok(bytes[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ReadEof> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16<E: ByteOrder>(&mut self) -> Result<u16, ReadEof> {
        self.read_slice(size::U16).map(E::read_u16)
    }

    pub fn read_i16<E: ByteOrder>(&mut self) -> Result<i16, ReadEof> {
        self.read_slice(size::I16).map(E::read_i16)
    }

    pub fn read_u32<E: ByteOrder>(&mut self) -> Result<u32, ReadEof> {
        self.read_slice(size::U32).map(E::read_u32)
    }

    pub fn read_i32<E: ByteOrder>(&mut self) -> Result<i32, ReadEof> {
        self.read_slice(size::I32).map(E::read_i32)
    }

    pub fn read_u64<E: ByteOrder>(&mut self) -> Result<u64, ReadEof> {
        self.read_slice(size::U64).map(E::read_u64)
    }

    pub fn read_i64<E: ByteOrder>(&mut self) -> Result<i64, ReadEof> {
        self.read_slice(size::I64).map(E::read_i64)
    }

    pub fn read_f32<E: ByteOrder>(&mut self) -> Result<f32, ReadEof> {
        self.read_slice(size::F32).map(E::read_f32)
    }

    pub fn read_f64<E: ByteOrder>(&mut self) -> Result<f64, ReadEof> {
        self.read_slice(size::F64).map(E::read_f64)
    }

    /// Read a native-width unsigned integer.
    pub fn read_usize<E: ByteOrder>(&mut self) -> Result<usize, ReadEof> {
        let bytes = self.read_slice(size::USIZE)?;
        // usize is at most 64 bits wide on every supported target
        Ok(E::read_uint(bytes, size::USIZE) as usize)
    }

    /// Read a native-width signed integer.
    pub fn read_isize<E: ByteOrder>(&mut self) -> Result<isize, ReadEof> {
        let bytes = self.read_slice(size::ISIZE)?;
        Ok(E::read_int(bytes, size::ISIZE) as isize)
    }

    /// Skip over `length` bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), ReadEof> {
        self.read_slice(length).map(|_| ())
    }

    pub fn read_scope(&mut self, length: usize) -> Result<ReadScope<'a>, ReadEof> {
        let scope = self.scope.offset_length(self.offset, length)?;
        self.offset += length;
        Ok(scope)
    }

    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8], ReadEof> {
        let scope = self.read_scope(length)?;
        Ok(scope.data)
    }
}
