//! Formats for single fields.
//!
//! Each function returns a static [PackFormat] with one field and no byte order
//! annotation, ready to be combined with other formats.
//!
//! ```
//! use packman::{formats, ByteOrder, Value};
//!
//! let header = (formats::u16() + formats::u16() + formats::bytes(4))
//!     .with_byte_order(ByteOrder::Network);
//! assert_eq!(header.size(), Some(8));
//! assert_eq!(header.to_string(), "!HH4s");
//! ```

use crate::format::PackFormat;
use crate::layout::FieldCode;

pub fn u8() -> PackFormat {
    PackFormat::from(FieldCode::U8)
}

pub fn u16() -> PackFormat {
    PackFormat::from(FieldCode::U16)
}

pub fn u32() -> PackFormat {
    PackFormat::from(FieldCode::U32)
}

pub fn u64() -> PackFormat {
    PackFormat::from(FieldCode::U64)
}

/// A native-width unsigned integer.
///
/// Can only be packed and unpacked with `ByteOrder::NativeAligned`.
pub fn usize() -> PackFormat {
    PackFormat::from(FieldCode::Usize)
}

pub fn i8() -> PackFormat {
    PackFormat::from(FieldCode::I8)
}

pub fn i16() -> PackFormat {
    PackFormat::from(FieldCode::I16)
}

pub fn i32() -> PackFormat {
    PackFormat::from(FieldCode::I32)
}

pub fn i64() -> PackFormat {
    PackFormat::from(FieldCode::I64)
}

/// A native-width signed integer.
///
/// Can only be packed and unpacked with `ByteOrder::NativeAligned`.
pub fn isize() -> PackFormat {
    PackFormat::from(FieldCode::Isize)
}

/// An IEEE 754 half precision float.
#[cfg(feature = "f16")]
pub fn f16() -> PackFormat {
    PackFormat::from(FieldCode::F16)
}

pub fn f32() -> PackFormat {
    PackFormat::from(FieldCode::F32)
}

pub fn f64() -> PackFormat {
    PackFormat::from(FieldCode::F64)
}

/// A single byte, unpacked as `Value::Char`.
pub fn char() -> PackFormat {
    PackFormat::from(FieldCode::Char)
}

/// A block of `length` bytes, unpacked as `Value::Bytes`.
///
/// When packing, shorter values are padded with zeros and longer values truncated. A
/// zero length block consumes nothing and unpacks to an empty `Value::Bytes`.
pub fn bytes(length: usize) -> PackFormat {
    PackFormat::from(FieldCode::Bytes(length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ByteOrder, Value};

    #[test]
    fn test_sizes() {
        let little = |format: PackFormat| format.size_with(ByteOrder::Little);
        assert_eq!(little(u8()), Some(1));
        assert_eq!(little(i16()), Some(2));
        assert_eq!(little(u32()), Some(4));
        assert_eq!(little(i64()), Some(8));
        assert_eq!(little(f32()), Some(4));
        assert_eq!(little(f64()), Some(8));
        assert_eq!(little(char()), Some(1));
        assert_eq!(little(bytes(5)), Some(5));
        assert_eq!(little(bytes(0)), Some(0));
        assert_eq!(usize().size(), Some(std::mem::size_of::<usize>()));
    }

    #[test]
    fn test_signed_little() {
        let format = (i8() + i16() + i32()).with_byte_order(ByteOrder::Little);
        let values = [Value::I8(-1), Value::I16(-2), Value::I32(-3)];
        let packed = format.pack(&values).unwrap();
        assert_eq!(packed, [0xFF, 0xFE, 0xFF, 0xFD, 0xFF, 0xFF, 0xFF]);
        assert_eq!(format.unpack(&packed).unwrap().values(), &values);
    }

    #[test]
    fn test_floats_big() {
        let format = (f32() + f64()).with_byte_order(ByteOrder::Big);
        let packed = format.pack(&[Value::F32(1.0), Value::F64(-2.0)]).unwrap();
        assert_eq!(&packed[..4], &[0x3F, 0x80, 0, 0]);
        assert_eq!(&packed[4..], &[0xC0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[cfg(feature = "f16")]
    #[test]
    fn test_f16() {
        let format = f16().with_byte_order(ByteOrder::Big);
        let packed = format.pack(&[Value::F64(1.0)]).unwrap();
        assert_eq!(packed, [0x3C, 0x00]);
        assert_eq!(
            format.unpack(&packed).unwrap().values(),
            &[Value::F16(half::f16::from_f32(1.0))]
        );
        assert!(format.pack(&[Value::F64(1.0e6)]).is_err());
    }

    #[test]
    fn test_char() {
        let format = char() + char();
        let result = format.unpack(b"ab").unwrap();
        assert_eq!(result.values(), &[Value::Char(b'a'), Value::Char(b'b')]);
        assert!(format.pack(&[Value::Char(b'a'), Value::from(b"bc")]).is_err());
    }

    #[test]
    fn test_native_width() {
        let format = usize() + isize();
        let values = [Value::Usize(42), Value::Isize(-42)];
        let packed = format.pack(&values).unwrap();
        assert_eq!(format.unpack(&packed).unwrap().values(), &values);
        assert!(format.pack_with(&values, ByteOrder::Little).is_err());
        assert!(usize()
            .with_byte_order(ByteOrder::Little)
            .pack(&[Value::Usize(1)])
            .is_err());
    }
}
