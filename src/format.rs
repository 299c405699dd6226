//! Format descriptors and their combinators
//!
//! A [PackFormat] is either *static*, a [Layout] whose size and arity are known up front,
//! or *chained*, a first stage followed by a second stage computed from the values the
//! first stage decoded. Formats are combined with `+` (static concatenation) and
//! [PackFormat::then] or `|` (dynamic chaining). Combining always builds a new format.
//!
//! ```
//! use packman::{formats, Value};
//!
//! // A length prefixed payload
//! let format = formats::u8().then(|values| {
//!     formats::bytes(values[0].as_usize().unwrap_or(0))
//! });
//!
//! let packed = format.pack(&[Value::U8(3), Value::from(b"abc")]).unwrap();
//! assert_eq!(packed, b"\x03abc");
//!
//! let result = format.unpack(b"\x03abc\xff").unwrap();
//! assert_eq!(result.values(), &[Value::U8(3), Value::from(b"abc")]);
//! assert_eq!(result.rest(), b"\xff");
//! ```

use std::fmt;
use std::ops::{Add, BitOr};
use std::sync::{Arc, OnceLock};

use log::{debug, trace};

use crate::binary::read::ReadScope;
use crate::binary::write::{WriteBuffer, WriteContext, WriteCounter};
use crate::byte_order::ByteOrder;
use crate::error::{ParseError, WriteError};
use crate::layout::{FieldCode, Layout};
use crate::result::UnpackResult;
use crate::value::Value;

/// Computes the second stage of a chained format from the values of the first.
pub type Mapper = Arc<dyn Fn(&[Value]) -> PackFormat + Send + Sync>;

/// A format descriptor.
#[derive(Clone)]
pub struct PackFormat {
    kind: FormatKind,
}

#[derive(Clone)]
enum FormatKind {
    Static(StaticFormat),
    Chained(ChainedFormat),
}

#[derive(Clone)]
struct StaticFormat {
    layout: Layout,
    byte_order: ByteOrder,
    /// Size under default resolution, computed on first use.
    size: OnceLock<Option<usize>>,
}

#[derive(Clone)]
struct ChainedFormat {
    first: Box<PackFormat>,
    mapper: Mapper,
}

impl StaticFormat {
    fn new(layout: Layout, byte_order: ByteOrder) -> Self {
        StaticFormat {
            layout,
            byte_order,
            size: OnceLock::new(),
        }
    }

    fn size_with(&self, inherited: ByteOrder) -> Option<usize> {
        if inherited.is_specified() {
            self.layout.size(self.byte_order, inherited)
        } else {
            *self
                .size
                .get_or_init(|| self.layout.size(self.byte_order, ByteOrder::Unspecified))
        }
    }

    fn describe(&self, inherited: ByteOrder) -> String {
        self.layout.describe(self.byte_order, inherited)
    }

    fn unpack<'a>(
        &self,
        data: &'a [u8],
        inherited: ByteOrder,
    ) -> Result<UnpackResult<'a>, ParseError> {
        // A size that overflows can never be satisfied
        let size = self.size_with(inherited).unwrap_or(usize::MAX);
        if data.len() < size {
            let layout = self.describe(inherited);
            debug!(
                "unpack '{}' needs {} bytes, {} available",
                layout,
                size,
                data.len()
            );
            return Err(ParseError::InsufficientData {
                requested: size,
                actual: data.len(),
                layout,
            });
        }

        let scope = ReadScope::new(data);
        let mut ctxt = scope.ctxt();
        let values = self.layout.decode(&mut ctxt, self.byte_order, inherited)?;
        let rest = ctxt.scope().data();
        Ok(UnpackResult::new(values, rest, ctxt.position()))
    }
}

impl From<FieldCode> for PackFormat {
    fn from(code: FieldCode) -> Self {
        PackFormat::from_layout(Layout::from(code), ByteOrder::Unspecified)
    }
}

impl PackFormat {
    /// A static format with the given layout and byte order annotation.
    pub fn from_layout(layout: Layout, byte_order: ByteOrder) -> Self {
        PackFormat {
            kind: FormatKind::Static(StaticFormat::new(layout, byte_order)),
        }
    }

    /// A static format with no fields.
    pub fn empty() -> Self {
        PackFormat::from_layout(Layout::new(), ByteOrder::Unspecified)
    }

    fn chained(first: PackFormat, mapper: Mapper) -> Self {
        PackFormat {
            kind: FormatKind::Chained(ChainedFormat {
                first: Box::new(first),
                mapper,
            }),
        }
    }

    /// Set the byte order annotation.
    ///
    /// Fields that were not tagged with a byte order when they were concatenated use
    /// this byte order. For a chained format the annotation is set on the first stage;
    /// second stages without an annotation of their own inherit it.
    pub fn with_byte_order(self, byte_order: ByteOrder) -> Self {
        match self.kind {
            FormatKind::Static(format) => PackFormat::from_layout(format.layout, byte_order),
            FormatKind::Chained(format) => {
                PackFormat::chained(format.first.with_byte_order(byte_order), format.mapper)
            }
        }
    }

    /// The byte order annotation.
    pub fn byte_order(&self) -> ByteOrder {
        match &self.kind {
            FormatKind::Static(format) => format.byte_order,
            FormatKind::Chained(format) => format.first.byte_order(),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.kind, FormatKind::Static(_))
    }

    /// The layout of a static format.
    pub fn static_layout(&self) -> Option<&Layout> {
        match &self.kind {
            FormatKind::Static(format) => Some(&format.layout),
            FormatKind::Chained(_) => None,
        }
    }

    /// The number of bytes a static format consumes.
    ///
    /// Chained formats only know their size once their first stage has been decoded,
    /// and return `None`. So do static formats whose size does not fit in a `usize`.
    pub fn size(&self) -> Option<usize> {
        self.size_with(ByteOrder::Unspecified)
    }

    /// The number of bytes a static format consumes when unpacked or packed with the
    /// given byte order override.
    pub fn size_with(&self, byte_order: ByteOrder) -> Option<usize> {
        match &self.kind {
            FormatKind::Static(format) => format.size_with(byte_order),
            FormatKind::Chained(_) => None,
        }
    }

    /// The number of values a static format decodes to.
    pub fn arity(&self) -> Option<usize> {
        self.static_layout().map(Layout::arity)
    }

    /// A struct-style description of a static format's layout, such as `@B>I3s`.
    pub fn layout(&self) -> Option<String> {
        match &self.kind {
            FormatKind::Static(format) => Some(format.describe(ByteOrder::Unspecified)),
            FormatKind::Chained(_) => None,
        }
    }

    /// Unpack values from the start of `data`.
    ///
    /// Fields without a byte order resolve to `ByteOrder::NativeAligned`.
    pub fn unpack<'a>(&self, data: &'a [u8]) -> Result<UnpackResult<'a>, ParseError> {
        self.unpack_with(data, ByteOrder::Unspecified)
    }

    /// Unpack values from the start of `data`, using `byte_order` for fields that have
    /// no byte order of their own and are not covered by the format's annotation.
    pub fn unpack_with<'a>(
        &self,
        data: &'a [u8],
        byte_order: ByteOrder,
    ) -> Result<UnpackResult<'a>, ParseError> {
        match &self.kind {
            FormatKind::Static(format) => format.unpack(data, byte_order),
            FormatKind::Chained(format) => {
                let first = format.first.unpack_with(data, byte_order)?;
                let second = (format.mapper)(first.values());
                trace!(
                    "chained stage: {} values decoded, {} bytes left, next {}",
                    first.values().len(),
                    first.rest().len(),
                    second
                );
                let inherited = format.first.byte_order().or(byte_order);
                let second = second.unpack_with(first.rest(), inherited)?;
                Ok(first.then(second))
            }
        }
    }

    /// Pack `values` into bytes.
    pub fn pack(&self, values: &[Value]) -> Result<Vec<u8>, WriteError> {
        self.pack_with(values, ByteOrder::Unspecified)
    }

    /// Pack `values` into bytes, using `byte_order` for fields that have no byte order
    /// of their own and are not covered by the format's annotation.
    ///
    /// Nothing is returned unless every value was packed.
    pub fn pack_with(
        &self,
        values: &[Value],
        byte_order: ByteOrder,
    ) -> Result<Vec<u8>, WriteError> {
        let mut buffer = WriteBuffer::new();
        self.pack_all(&mut buffer, values, byte_order)?;
        Ok(buffer.into_inner())
    }

    /// The number of bytes `values` pack into.
    pub fn packed_size(&self, values: &[Value]) -> Result<usize, WriteError> {
        let mut counter = WriteCounter::new();
        self.pack_all(&mut counter, values, ByteOrder::Unspecified)?;
        Ok(counter.bytes_written())
    }

    fn pack_all<C: WriteContext>(
        &self,
        ctxt: &mut C,
        values: &[Value],
        byte_order: ByteOrder,
    ) -> Result<(), WriteError> {
        let used = self.pack_into(ctxt, values, 0, byte_order)?;
        if used != values.len() {
            return Err(WriteError::ArityMismatch {
                expected: used,
                actual: values.len(),
            });
        }
        Ok(())
    }

    /// Pack a prefix of `values`, returning how many were used.
    fn pack_into<C: WriteContext>(
        &self,
        ctxt: &mut C,
        values: &[Value],
        first_index: usize,
        inherited: ByteOrder,
    ) -> Result<usize, WriteError> {
        match &self.kind {
            FormatKind::Static(format) => {
                let arity = format.layout.arity();
                let values = values.get(..arity).ok_or(WriteError::ArityMismatch {
                    expected: first_index + arity,
                    actual: first_index + values.len(),
                })?;
                format
                    .layout
                    .encode(ctxt, values, first_index, format.byte_order, inherited)?;
                Ok(arity)
            }
            FormatKind::Chained(format) => {
                let used = format.first.pack_into(ctxt, values, first_index, inherited)?;
                let (first, rest) = values.split_at(used);
                let second = (format.mapper)(first);
                trace!("chained stage: {} values packed, next {}", used, second);
                let inherited = format.first.byte_order().or(inherited);
                let more = second.pack_into(ctxt, rest, first_index + used, inherited)?;
                Ok(used + more)
            }
        }
    }

    /// Concatenate two formats.
    ///
    /// The result decodes the values of `self` followed by the values of `other`. If
    /// `other` has a byte order annotation its fields keep it, otherwise they inherit the
    /// byte order of `self`.
    pub fn concat(self, other: PackFormat) -> PackFormat {
        match (self.kind, other.kind) {
            (FormatKind::Static(a), FormatKind::Static(b)) => {
                let layout = a.layout.concat(&b.layout, b.byte_order);
                PackFormat::from_layout(layout, a.byte_order)
            }
            (FormatKind::Static(a), FormatKind::Chained(b)) => {
                // Fold `a` into the first stage, hiding its values from the mapper. Second
                // stages keep the annotation of `b`.
                let skip = a.layout.arity();
                let order = b.first.byte_order();
                let mapper = b.mapper;
                let first = PackFormat {
                    kind: FormatKind::Static(a),
                }
                .concat(*b.first);
                PackFormat::chained(
                    first,
                    Arc::new(move |values: &[Value]| {
                        let second = mapper(values.get(skip..).unwrap_or(&[]));
                        if second.byte_order().is_specified() {
                            second
                        } else {
                            second.with_byte_order(order)
                        }
                    }),
                )
            }
            (kind @ FormatKind::Chained(_), other) => {
                let other = PackFormat { kind: other };
                PackFormat::chained(
                    PackFormat { kind },
                    Arc::new(move |_: &[Value]| other.clone()),
                )
            }
        }
    }

    /// Chain a format computed from the values this format decodes.
    ///
    /// `mapper` is called with the values of `self` both when unpacking (with the values
    /// just decoded) and when packing (with the values about to be packed). It must
    /// return the same format for the same values.
    pub fn then<F>(self, mapper: F) -> PackFormat
    where
        F: Fn(&[Value]) -> PackFormat + Send + Sync + 'static,
    {
        PackFormat::chained(self, Arc::new(mapper))
    }
}

impl Default for PackFormat {
    fn default() -> Self {
        PackFormat::empty()
    }
}

impl Add for PackFormat {
    type Output = PackFormat;

    fn add(self, other: PackFormat) -> PackFormat {
        self.concat(other)
    }
}

impl<'a> Add<&'a PackFormat> for &'a PackFormat {
    type Output = PackFormat;

    fn add(self, other: &'a PackFormat) -> PackFormat {
        self.clone().concat(other.clone())
    }
}

impl<F> BitOr<F> for PackFormat
where
    F: Fn(&[Value]) -> PackFormat + Send + Sync + 'static,
{
    type Output = PackFormat;

    fn bitor(self, mapper: F) -> PackFormat {
        self.then(mapper)
    }
}

impl fmt::Display for PackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FormatKind::Static(format) => f.write_str(&format.describe(ByteOrder::Unspecified)),
            FormatKind::Chained(format) => write!(f, "{} | ...", format.first),
        }
    }
}

impl fmt::Debug for PackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackFormat({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats;

    fn length_prefixed() -> PackFormat {
        formats::u8().then(|values| formats::bytes(values[0].as_usize().unwrap_or(0)))
    }

    #[test]
    fn test_static_round_trip() {
        let format =
            (formats::u8() + formats::u32() + formats::bytes(3)).with_byte_order(ByteOrder::Big);
        let values = [Value::U8(1), Value::U32(0x0203_0405), Value::from(b"xyz")];
        let packed = format.pack(&values).unwrap();
        assert_eq!(packed, b"\x01\x02\x03\x04\x05xyz");
        let result = format.unpack(&packed).unwrap();
        assert_eq!(result.values(), &values);
        assert!(result.rest().is_empty());
        assert_eq!(format.layout().as_deref(), Some(">BI3s"));
        assert_eq!(format.size(), Some(8));
        assert_eq!(format.arity(), Some(3));
    }

    #[test]
    fn test_default_is_native_aligned() {
        let format = formats::u8() + formats::u32();
        assert_eq!(format.size(), Some(8));
        assert_eq!(format.size_with(ByteOrder::Little), Some(5));
        assert_eq!(format.layout().as_deref(), Some("@BI"));
        let packed = format.pack(&[Value::U8(1), Value::U32(2)]).unwrap();
        assert_eq!(packed.len(), 8);
        assert_eq!(&packed[1..4], &[0, 0, 0]);
    }

    #[test]
    fn test_override_only_fills_gaps() {
        let format = formats::u16().with_byte_order(ByteOrder::Big) + formats::u16();
        let packed = format
            .pack_with(&[Value::U16(1), Value::U16(2)], ByteOrder::Little)
            .unwrap();
        // The annotation covers both fields, so the override has no effect
        assert_eq!(packed, [0, 1, 0, 2]);

        let format = formats::u16();
        let packed = format.pack_with(&[Value::U16(1)], ByteOrder::Little).unwrap();
        assert_eq!(packed, [1, 0]);
        let result = format.unpack_with(&packed, ByteOrder::Big).unwrap();
        assert_eq!(result.values(), &[Value::U16(0x0100)]);
    }

    #[test]
    fn test_insufficient_data() {
        let format = formats::u32().with_byte_order(ByteOrder::Little);
        let err = format.unpack(&[1, 2]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InsufficientData {
                requested: 4,
                actual: 2,
                layout: "<I".to_string()
            }
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let format = formats::u8() + formats::u8();
        assert_eq!(
            format.pack(&[Value::U8(1), Value::U8(2), Value::U8(3)]),
            Err(WriteError::ArityMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            format.pack(&[Value::U8(1)]),
            Err(WriteError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_chained_round_trip() {
        let format =
            formats::u8() | |values: &[Value]| formats::bytes(values[0].as_usize().unwrap_or(0));
        let values = [Value::U8(3), Value::from(b"\x01\x02\x03")];
        let packed = format.pack(&values).unwrap();
        assert_eq!(packed, b"\x03\x01\x02\x03");
        let result = format.unpack(&packed).unwrap();
        assert_eq!(result.values(), &values);
        assert!(result.rest().is_empty());
        assert_eq!(format.size(), None);
        assert_eq!(format.to_string(), "@B | ...");
    }

    #[test]
    fn test_chained_second_stage_failure() {
        let format = length_prefixed();
        match format.unpack(&[5, 1, 2]) {
            Err(ParseError::InsufficientData {
                requested: 5,
                actual: 2,
                ..
            }) => {}
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_chained_stage_inherits_byte_order() {
        let format = formats::u8()
            .then(|_| formats::u16())
            .with_byte_order(ByteOrder::Big);
        let packed = format.pack(&[Value::U8(1), Value::U16(2)]).unwrap();
        assert_eq!(packed, [1, 0, 2]);
    }

    #[test]
    fn test_static_plus_chained() {
        let tail = length_prefixed();
        let format = formats::u16().with_byte_order(ByteOrder::Big) + tail;
        let values = [Value::U16(7), Value::U8(2), Value::from(b"hi")];
        let packed = format.pack(&values).unwrap();
        assert_eq!(packed, b"\x00\x07\x02hi");
        assert_eq!(format.unpack(&packed).unwrap().values(), &values);
    }

    #[test]
    fn test_static_plus_chained_keeps_tail_byte_order() {
        let tail = formats::u8()
            .then(|_| formats::u16())
            .with_byte_order(ByteOrder::Little);
        assert_eq!(tail.pack(&[Value::U8(1), Value::U16(0x0102)]).unwrap(), [1, 2, 1]);

        let format = formats::u8().with_byte_order(ByteOrder::Big) + tail;
        let values = [Value::U8(9), Value::U8(1), Value::U16(0x0102)];
        let packed = format.pack(&values).unwrap();
        assert_eq!(packed, [9, 1, 2, 1]);
        assert_eq!(format.unpack(&packed).unwrap().values(), &values);

        // An unannotated tail still follows the prefix
        let format = formats::u8().with_byte_order(ByteOrder::Big)
            + formats::u8().then(|_| formats::u16());
        assert_eq!(format.pack(&values).unwrap(), [9, 1, 1, 2]);
    }

    #[test]
    fn test_decoded_size_overflow() {
        let format = formats::u8().then(|_| formats::bytes(usize::MAX) + formats::u8());
        assert_eq!(
            format.unpack(&[0, 0]),
            Err(ParseError::InsufficientData {
                requested: usize::MAX,
                actual: 1,
                layout: format!("@{}sB", usize::MAX),
            })
        );
        assert_eq!((formats::bytes(usize::MAX) + formats::u8()).size(), None);
    }

    #[test]
    fn test_chained_plus_static() {
        let head = length_prefixed();
        let format = head + formats::char();
        let values = [Value::U8(1), Value::from(b"a"), Value::Char(b'z')];
        let packed = format.pack(&values).unwrap();
        assert_eq!(packed, b"\x01az");
        let result = format.unpack(b"\x01azrest").unwrap();
        assert_eq!(result.values(), &values);
        assert_eq!(result.rest(), b"rest");
    }

    #[test]
    fn test_packed_size() {
        let format = length_prefixed();
        assert_eq!(format.packed_size(&[Value::U8(4), Value::from(b"abcd")]), Ok(5));
    }
}
