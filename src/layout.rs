//! Layout code sequences
//!
//! A [Layout] is the low-level description of a static format: an ordered list of
//! [Field]s, each a [FieldCode] with an optional byte order tag. Byte orders are only
//! resolved when a layout is sized, described, decoded or encoded, so the same layout
//! can be shared by formats with different byte order annotations.

use std::fmt;

use byteorder::{BigEndian, LittleEndian};
use itertools::Itertools;
use num_traits::ToPrimitive;

use crate::binary::read::{ReadBinaryDep, ReadCtxt, ReadFixedSizeDep};
use crate::binary::write::{WriteBinaryDep, WriteContext};
use crate::binary::padding;
use crate::byte_order::{ByteOrder, Endian};
use crate::error::{ParseError, WriteError};
use crate::size;
#[cfg(feature = "f16")]
use crate::value::narrow_f16;
use crate::value::{narrow_f32, Value};

/// The type code of a single field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldCode {
    U8,
    U16,
    U32,
    U64,
    /// Native-width unsigned integer. Only usable with `ByteOrder::NativeAligned`.
    Usize,
    I8,
    I16,
    I32,
    I64,
    /// Native-width signed integer. Only usable with `ByteOrder::NativeAligned`.
    Isize,
    #[cfg(feature = "f16")]
    F16,
    F32,
    F64,
    Char,
    /// A block of the given number of bytes.
    Bytes(usize),
}

impl FieldCode {
    /// The number of bytes occupied by the field.
    pub const fn size(self) -> usize {
        match self {
            FieldCode::U8 => size::U8,
            FieldCode::U16 => size::U16,
            FieldCode::U32 => size::U32,
            FieldCode::U64 => size::U64,
            FieldCode::Usize => size::USIZE,
            FieldCode::I8 => size::I8,
            FieldCode::I16 => size::I16,
            FieldCode::I32 => size::I32,
            FieldCode::I64 => size::I64,
            FieldCode::Isize => size::ISIZE,
            #[cfg(feature = "f16")]
            FieldCode::F16 => size::F16,
            FieldCode::F32 => size::F32,
            FieldCode::F64 => size::F64,
            FieldCode::Char => size::CHAR,
            FieldCode::Bytes(length) => length,
        }
    }

    /// The alignment of the field under `ByteOrder::NativeAligned`.
    pub const fn alignment(self) -> usize {
        match self {
            FieldCode::Char | FieldCode::Bytes(_) => 1,
            code => code.size(),
        }
    }

    /// Whether the field can only be used with native sizes and alignment.
    pub const fn is_native_only(self) -> bool {
        matches!(self, FieldCode::Usize | FieldCode::Isize)
    }

    fn check_order(self, order: ByteOrder) -> Result<(), (FieldCode, ByteOrder)> {
        if self.is_native_only() && order.resolve() != ByteOrder::NativeAligned {
            Err((self, order))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldCode::U8 => f.write_str("B"),
            FieldCode::U16 => f.write_str("H"),
            FieldCode::U32 => f.write_str("I"),
            FieldCode::U64 => f.write_str("Q"),
            FieldCode::Usize => f.write_str("N"),
            FieldCode::I8 => f.write_str("b"),
            FieldCode::I16 => f.write_str("h"),
            FieldCode::I32 => f.write_str("i"),
            FieldCode::I64 => f.write_str("q"),
            FieldCode::Isize => f.write_str("n"),
            #[cfg(feature = "f16")]
            FieldCode::F16 => f.write_str("e"),
            FieldCode::F32 => f.write_str("f"),
            FieldCode::F64 => f.write_str("d"),
            FieldCode::Char => f.write_str("c"),
            FieldCode::Bytes(1) => f.write_str("s"),
            FieldCode::Bytes(length) => write!(f, "{}s", length),
        }
    }
}

/// A field in a layout: a type code and the byte order it was tagged with.
///
/// Fields tagged `ByteOrder::Unspecified` take their byte order from the format they
/// belong to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub code: FieldCode,
    pub order: ByteOrder,
}

/// An ordered sequence of fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Layout {
    fields: Vec<Field>,
}

impl From<FieldCode> for Layout {
    fn from(code: FieldCode) -> Self {
        Layout {
            fields: vec![Field {
                code,
                order: ByteOrder::Unspecified,
            }],
        }
    }
}

impl Layout {
    pub fn new() -> Self {
        Layout { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The number of values this layout decodes to.
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Append the fields of `other` to the fields of `self`.
    ///
    /// Untagged fields of `other` are tagged with `other_order` so that they keep
    /// resolving to it after being combined with fields from a format with a different
    /// byte order. If `other_order` is `Unspecified` they are left untagged and inherit
    /// from the combined format.
    pub fn concat(&self, other: &Layout, other_order: ByteOrder) -> Layout {
        let fields = self
            .fields
            .iter()
            .copied()
            .chain(other.fields.iter().map(|field| Field {
                code: field.code,
                order: field.order.or(other_order),
            }))
            .collect();
        Layout { fields }
    }

    /// Resolve the byte order of each field.
    ///
    /// A field uses its own tag, else the format's `annotation`, else `inherited`, else
    /// `ByteOrder::NativeAligned`. The fields returned are never `Unspecified`.
    pub fn resolved(
        &self,
        annotation: ByteOrder,
        inherited: ByteOrder,
    ) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().map(move |field| Field {
            code: field.code,
            order: field.order.or(annotation).or(inherited).resolve(),
        })
    }

    /// The number of bytes this layout occupies, including alignment padding.
    ///
    /// Returns `None` if the size does not fit in a `usize`, which can happen when field
    /// lengths come from decoded data.
    pub fn size(&self, annotation: ByteOrder, inherited: ByteOrder) -> Option<usize> {
        self.resolved(annotation, inherited).try_fold(0usize, |offset, field| {
            offset
                .checked_add(field_padding(offset, field))?
                .checked_add(FieldData::size(field.into()))
        })
    }

    /// A struct-style description of the layout, such as `@B>I3s`.
    ///
    /// A byte order symbol is emitted at the start and wherever the resolved byte order
    /// changes.
    pub fn describe(&self, annotation: ByteOrder, inherited: ByteOrder) -> String {
        let groups = self
            .resolved(annotation, inherited)
            .group_by(|field| field.order);
        let described = groups
            .into_iter()
            .map(|(order, fields)| {
                let codes = fields.map(|field| field.code).join("");
                format!("{}{}", order.symbol(), codes)
            })
            .join("");
        if described.is_empty() {
            annotation.or(inherited).resolve().symbol().to_string()
        } else {
            described
        }
    }

    /// Decode one value per field.
    ///
    /// Alignment padding is relative to the position of `ctxt` on entry.
    pub fn decode(
        &self,
        ctxt: &mut ReadCtxt<'_>,
        annotation: ByteOrder,
        inherited: ByteOrder,
    ) -> Result<Vec<Value>, ParseError> {
        let start = ctxt.position();
        let mut values = Vec::with_capacity(self.arity());
        for field in self.resolved(annotation, inherited) {
            field
                .code
                .check_order(field.order)
                .map_err(|(code, order)| ParseError::UnsupportedByteOrder { code, order })?;
            ctxt.skip(field_padding(ctxt.position() - start, field))?;
            values.push(ctxt.read_dep::<FieldData>(field.into())?);
        }
        Ok(values)
    }

    /// Encode `values`, one per field.
    ///
    /// `first_index` is the position of `values[0]` in the caller's full list of values
    /// and is only used to report errors. Alignment padding is relative to the number of
    /// bytes written to `ctxt` on entry.
    pub fn encode<C: WriteContext>(
        &self,
        ctxt: &mut C,
        values: &[Value],
        first_index: usize,
        annotation: ByteOrder,
        inherited: ByteOrder,
    ) -> Result<(), WriteError> {
        if values.len() != self.arity() {
            return Err(WriteError::ArityMismatch {
                expected: first_index + self.arity(),
                actual: first_index + values.len(),
            });
        }
        let start = ctxt.bytes_written();
        let fields = self.resolved(annotation, inherited).zip(values);
        for (index, (field, value)) in (first_index..).zip(fields) {
            field
                .code
                .check_order(field.order)
                .map_err(|(code, order)| WriteError::UnsupportedByteOrder { code, order })?;
            ctxt.write_zeros(field_padding(ctxt.bytes_written() - start, field))?;
            FieldData::write_dep(ctxt, value, (field.into(), index))?;
        }
        Ok(())
    }
}

fn field_padding(offset: usize, field: Field) -> usize {
    if field.order.is_aligned() {
        padding(offset, field.code.alignment())
    } else {
        0
    }
}

/// Arguments for reading or writing the data of a single field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldArgs {
    pub code: FieldCode,
    pub endian: Endian,
}

impl From<Field> for FieldArgs {
    fn from(field: Field) -> Self {
        FieldArgs {
            code: field.code,
            endian: field.order.endian(),
        }
    }
}

/// The data of a single field, read as a [Value].
pub enum FieldData {}

impl ReadBinaryDep for FieldData {
    type Args<'a> = FieldArgs;
    type HostType<'a> = Value;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, args: FieldArgs) -> Result<Value, ParseError> {
        match args.endian {
            Endian::Big => read_field::<BigEndian>(ctxt, args.code),
            Endian::Little => read_field::<LittleEndian>(ctxt, args.code),
        }
    }
}

impl ReadFixedSizeDep for FieldData {
    fn size(args: FieldArgs) -> usize {
        args.code.size()
    }
}

fn read_field<E: byteorder::ByteOrder>(
    ctxt: &mut ReadCtxt<'_>,
    code: FieldCode,
) -> Result<Value, ParseError> {
    let value = match code {
        FieldCode::U8 => Value::U8(ctxt.read_u8()?),
        FieldCode::U16 => Value::U16(ctxt.read_u16::<E>()?),
        FieldCode::U32 => Value::U32(ctxt.read_u32::<E>()?),
        FieldCode::U64 => Value::U64(ctxt.read_u64::<E>()?),
        FieldCode::Usize => Value::Usize(ctxt.read_usize::<E>()?),
        FieldCode::I8 => Value::I8(ctxt.read_i8()?),
        FieldCode::I16 => Value::I16(ctxt.read_i16::<E>()?),
        FieldCode::I32 => Value::I32(ctxt.read_i32::<E>()?),
        FieldCode::I64 => Value::I64(ctxt.read_i64::<E>()?),
        FieldCode::Isize => Value::Isize(ctxt.read_isize::<E>()?),
        #[cfg(feature = "f16")]
        FieldCode::F16 => Value::F16(half::f16::from_bits(ctxt.read_u16::<E>()?)),
        FieldCode::F32 => Value::F32(ctxt.read_f32::<E>()?),
        FieldCode::F64 => Value::F64(ctxt.read_f64::<E>()?),
        FieldCode::Char => Value::Char(ctxt.read_u8()?),
        FieldCode::Bytes(length) => Value::Bytes(ctxt.read_slice(length)?.to_vec()),
    };
    Ok(value)
}

impl<'v> WriteBinaryDep<&'v Value> for FieldData {
    /// The field and the index of the value, for error reporting.
    type Args = (FieldArgs, usize);
    type Output = ();

    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        value: &'v Value,
        (args, index): (FieldArgs, usize),
    ) -> Result<(), WriteError> {
        match args.endian {
            Endian::Big => write_field::<BigEndian, C>(ctxt, value, args.code, index),
            Endian::Little => write_field::<LittleEndian, C>(ctxt, value, args.code, index),
        }
    }
}

fn write_field<E: byteorder::ByteOrder, C: WriteContext>(
    ctxt: &mut C,
    value: &Value,
    code: FieldCode,
    index: usize,
) -> Result<(), WriteError> {
    let mismatch = || WriteError::TypeMismatch {
        index,
        expected: code,
        found: value.kind(),
    };
    let out_of_range = || WriteError::ValueOutOfRange { index };

    match code {
        FieldCode::U8 => ctxt.write_u8(int_value(value, Value::to_u8, mismatch, out_of_range)?),
        FieldCode::U16 => {
            ctxt.write_u16::<E>(int_value(value, Value::to_u16, mismatch, out_of_range)?)
        }
        FieldCode::U32 => {
            ctxt.write_u32::<E>(int_value(value, Value::to_u32, mismatch, out_of_range)?)
        }
        FieldCode::U64 => {
            ctxt.write_u64::<E>(int_value(value, Value::to_u64, mismatch, out_of_range)?)
        }
        FieldCode::Usize => {
            ctxt.write_usize::<E>(int_value(value, Value::to_usize, mismatch, out_of_range)?)
        }
        FieldCode::I8 => ctxt.write_i8(int_value(value, Value::to_i8, mismatch, out_of_range)?),
        FieldCode::I16 => {
            ctxt.write_i16::<E>(int_value(value, Value::to_i16, mismatch, out_of_range)?)
        }
        FieldCode::I32 => {
            ctxt.write_i32::<E>(int_value(value, Value::to_i32, mismatch, out_of_range)?)
        }
        FieldCode::I64 => {
            ctxt.write_i64::<E>(int_value(value, Value::to_i64, mismatch, out_of_range)?)
        }
        FieldCode::Isize => {
            ctxt.write_isize::<E>(int_value(value, Value::to_isize, mismatch, out_of_range)?)
        }
        #[cfg(feature = "f16")]
        FieldCode::F16 => {
            let narrowed = narrow_f16(float_value(value, mismatch)?).ok_or_else(out_of_range)?;
            ctxt.write_u16::<E>(narrowed.to_bits())
        }
        FieldCode::F32 => {
            let narrowed = narrow_f32(float_value(value, mismatch)?).ok_or_else(out_of_range)?;
            ctxt.write_f32::<E>(narrowed)
        }
        FieldCode::F64 => ctxt.write_f64::<E>(float_value(value, mismatch)?),
        FieldCode::Char => match value.as_bytes() {
            Some([byte]) => ctxt.write_u8(*byte),
            Some(_) => Err(out_of_range()),
            None => Err(mismatch()),
        },
        FieldCode::Bytes(length) => {
            let bytes = value.as_bytes().ok_or_else(mismatch)?;
            // Short values are padded with zeros, long values are truncated
            let used = bytes.len().min(length);
            ctxt.write_bytes(&bytes[..used])?;
            ctxt.write_zeros(length - used)
        }
    }
}

/// Integer fields accept any integer value that fits.
fn int_value<T>(
    value: &Value,
    convert: fn(&Value) -> Option<T>,
    mismatch: impl FnOnce() -> WriteError,
    out_of_range: impl FnOnce() -> WriteError,
) -> Result<T, WriteError> {
    if value.is_integer() {
        convert(value).ok_or_else(out_of_range)
    } else {
        Err(mismatch())
    }
}

/// Float fields accept floats and integers.
fn float_value(value: &Value, mismatch: impl FnOnce() -> WriteError) -> Result<f64, WriteError> {
    if value.is_float() || value.is_integer() {
        value.to_f64().ok_or_else(mismatch)
    } else {
        Err(mismatch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::binary::write::WriteBuffer;

    fn layout(codes: &[FieldCode]) -> Layout {
        codes.iter().fold(Layout::new(), |acc, &code| {
            acc.concat(&Layout::from(code), ByteOrder::Unspecified)
        })
    }

    #[test]
    fn test_describe() {
        let l = layout(&[FieldCode::U8, FieldCode::U32, FieldCode::Bytes(3)]);
        assert_eq!(l.describe(ByteOrder::Big, ByteOrder::Unspecified), ">BI3s");
        assert_eq!(l.describe(ByteOrder::Unspecified, ByteOrder::Unspecified), "@BI3s");
        assert_eq!(Layout::new().describe(ByteOrder::Little, ByteOrder::Unspecified), "<");

        let mixed =
            Layout::from(FieldCode::U16).concat(&Layout::from(FieldCode::U32), ByteOrder::Big);
        assert_eq!(mixed.describe(ByteOrder::Little, ByteOrder::Unspecified), "<H>I");
    }

    #[test]
    fn test_size_aligned() {
        let l = layout(&[FieldCode::U8, FieldCode::U32, FieldCode::U8]);
        assert_eq!(l.size(ByteOrder::NativeAligned, ByteOrder::Unspecified), Some(9));
        assert_eq!(l.size(ByteOrder::Native, ByteOrder::Unspecified), Some(6));
        assert_eq!(l.size(ByteOrder::Big, ByteOrder::Unspecified), Some(6));
        // The default resolution is NativeAligned
        assert_eq!(l.size(ByteOrder::Unspecified, ByteOrder::Unspecified), Some(9));
        assert_eq!(l.size(ByteOrder::Unspecified, ByteOrder::Little), Some(6));
    }

    #[test]
    fn test_size_overflow() {
        let huge = layout(&[FieldCode::Bytes(usize::MAX), FieldCode::U8]);
        assert_eq!(huge.size(ByteOrder::Big, ByteOrder::Unspecified), None);

        // Fits exactly unaligned, but alignment padding pushes it past the limit
        let padded = layout(&[FieldCode::Bytes(usize::MAX - 2), FieldCode::U16]);
        assert_eq!(padded.size(ByteOrder::Big, ByteOrder::Unspecified), Some(usize::MAX));
        assert_eq!(padded.size(ByteOrder::NativeAligned, ByteOrder::Unspecified), None);
    }

    #[test]
    fn test_concat_tags_other() {
        let a = Layout::from(FieldCode::U8);
        let b = Layout::from(FieldCode::U16);
        let tagged = a.concat(&b, ByteOrder::Big);
        assert_eq!(tagged.fields()[0].order, ByteOrder::Unspecified);
        assert_eq!(tagged.fields()[1].order, ByteOrder::Big);

        let untagged = a.concat(&b, ByteOrder::Unspecified);
        assert_eq!(untagged.fields()[1].order, ByteOrder::Unspecified);
    }

    #[test]
    fn test_decode_encode_aligned() {
        let l = layout(&[FieldCode::U8, FieldCode::U16]);
        let mut buffer = WriteBuffer::new();
        l.encode(
            &mut buffer,
            &[Value::U8(1), Value::U16(0x0203)],
            0,
            ByteOrder::NativeAligned,
            ByteOrder::Unspecified,
        )
        .unwrap();
        let expected = if cfg!(target_endian = "little") {
            [1, 0, 3, 2]
        } else {
            [1, 0, 2, 3]
        };
        assert_eq!(buffer.bytes(), &expected);

        let scope = ReadScope::new(buffer.bytes());
        let mut ctxt = scope.ctxt();
        let values = l
            .decode(&mut ctxt, ByteOrder::NativeAligned, ByteOrder::Unspecified)
            .unwrap();
        assert_eq!(values, vec![Value::U8(1), Value::U16(0x0203)]);
    }

    #[test]
    fn test_encode_errors() {
        let l = layout(&[FieldCode::U8, FieldCode::F32]);
        let mut buffer = WriteBuffer::new();
        let res = l.encode(
            &mut buffer,
            &[Value::U16(256), Value::F32(1.0)],
            0,
            ByteOrder::Big,
            ByteOrder::Unspecified,
        );
        assert_eq!(res, Err(WriteError::ValueOutOfRange { index: 0 }));

        let res = l.encode(
            &mut buffer,
            &[Value::U8(1), Value::Bytes(vec![1])],
            3,
            ByteOrder::Big,
            ByteOrder::Unspecified,
        );
        assert_eq!(
            res,
            Err(WriteError::TypeMismatch {
                index: 4,
                expected: FieldCode::F32,
                found: "bytes"
            })
        );

        let res = l.encode(&mut buffer, &[Value::U8(1)], 0, ByteOrder::Big, ByteOrder::Unspecified);
        assert_eq!(
            res,
            Err(WriteError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_bytes_padded_and_truncated() {
        let l = Layout::from(FieldCode::Bytes(3));
        let mut buffer = WriteBuffer::new();
        for value in [vec![8, 9], vec![1, 2, 3, 4]] {
            l.encode(
                &mut buffer,
                &[Value::Bytes(value)],
                0,
                ByteOrder::Big,
                ByteOrder::Unspecified,
            )
            .unwrap();
        }
        assert_eq!(buffer.bytes(), &[8, 9, 0, 1, 2, 3]);
    }

    #[test]
    fn test_native_only_fields() {
        let l = Layout::from(FieldCode::Usize);
        let data = [0u8; 16];
        let mut ctxt = ReadScope::new(&data).ctxt();
        let res = l.decode(&mut ctxt, ByteOrder::Big, ByteOrder::Unspecified);
        assert_eq!(
            res,
            Err(ParseError::UnsupportedByteOrder {
                code: FieldCode::Usize,
                order: ByteOrder::Big
            })
        );

        let mut ctxt = ReadScope::new(&data).ctxt();
        let values = l
            .decode(&mut ctxt, ByteOrder::Unspecified, ByteOrder::Unspecified)
            .unwrap();
        assert_eq!(values, vec![Value::Usize(0)]);
    }
}
