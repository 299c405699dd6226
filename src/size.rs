//! Definitions of the sizes of binary types.

use std::mem;

pub const U8: usize = mem::size_of::<u8>();
pub const I8: usize = mem::size_of::<i8>();
pub const U16: usize = mem::size_of::<u16>();
pub const I16: usize = mem::size_of::<i16>();
pub const U32: usize = mem::size_of::<u32>();
pub const I32: usize = mem::size_of::<i32>();
pub const U64: usize = mem::size_of::<u64>();
pub const I64: usize = mem::size_of::<i64>();
pub const USIZE: usize = mem::size_of::<usize>();
pub const ISIZE: usize = mem::size_of::<isize>();
pub const F16: usize = 2;
pub const F32: usize = mem::size_of::<f32>();
pub const F64: usize = mem::size_of::<f64>();
pub const CHAR: usize = 1;
