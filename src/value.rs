//! Values that are packed into and unpacked from binary data.

use std::fmt;

use num_traits::ToPrimitive;

use crate::error::ParseError;

/// A single decoded (or to be encoded) field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    #[cfg(feature = "f16")]
    F16(half::f16),
    F32(f32),
    F64(f64),
    /// A single byte.
    Char(u8),
    /// A fixed-length block of bytes.
    Bytes(Vec<u8>),
}

impl Value {
    /// A short name for the kind of this value, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Usize(_) => "usize",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Isize(_) => "isize",
            #[cfg(feature = "f16")]
            Value::F16(_) => "f16",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Char(_) => "char",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::U8(_)
                | Value::U16(_)
                | Value::U32(_)
                | Value::U64(_)
                | Value::Usize(_)
                | Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::Isize(_)
        )
    }

    pub fn is_float(&self) -> bool {
        match self {
            #[cfg(feature = "f16")]
            Value::F16(_) => true,
            Value::F32(_) | Value::F64(_) => true,
            _ => false,
        }
    }

    /// The value as a `usize`, if it is a non-negative integer that fits.
    ///
    /// This is the usual way for a chained format to turn a decoded length into the
    /// size of the next field.
    pub fn as_usize(&self) -> Option<usize> {
        if self.is_integer() {
            self.to_usize()
        } else {
            None
        }
    }

    /// The value as a `u64`, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        self.to_u64()
    }

    /// The value as an `i64`, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.to_i64()
    }

    /// The value as an `f64`, if it is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            #[cfg(feature = "f16")]
            Value::F16(x) => Some(x.to_f64()),
            Value::F32(x) => Some(f64::from(x)),
            Value::F64(x) => Some(x),
            _ => None,
        }
    }

    /// The bytes of a `Char` or `Bytes` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Char(byte) => Some(std::slice::from_ref(byte)),
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl ToPrimitive for Value {
    fn to_i64(&self) -> Option<i64> {
        match *self {
            Value::U8(n) => Some(i64::from(n)),
            Value::U16(n) => Some(i64::from(n)),
            Value::U32(n) => Some(i64::from(n)),
            Value::U64(n) => n.to_i64(),
            Value::Usize(n) => n.to_i64(),
            Value::I8(n) => Some(i64::from(n)),
            Value::I16(n) => Some(i64::from(n)),
            Value::I32(n) => Some(i64::from(n)),
            Value::I64(n) => Some(n),
            Value::Isize(n) => n.to_i64(),
            _ => None,
        }
    }

    fn to_u64(&self) -> Option<u64> {
        match *self {
            Value::U8(n) => Some(u64::from(n)),
            Value::U16(n) => Some(u64::from(n)),
            Value::U32(n) => Some(u64::from(n)),
            Value::U64(n) => Some(n),
            Value::Usize(n) => n.to_u64(),
            Value::I8(n) => n.to_u64(),
            Value::I16(n) => n.to_u64(),
            Value::I32(n) => n.to_u64(),
            Value::I64(n) => n.to_u64(),
            Value::Isize(n) => n.to_u64(),
            _ => None,
        }
    }

    fn to_f64(&self) -> Option<f64> {
        match self.as_f64() {
            Some(x) => Some(x),
            None => self
                .to_i64()
                .and_then(|n| n.to_f64())
                .or_else(|| self.to_u64().and_then(|n| n.to_f64())),
        }
    }

    fn to_f32(&self) -> Option<f32> {
        self.to_f64().and_then(narrow_f32)
    }
}

/// Narrow to `f32`. Finite values too large to be represented give `None`.
pub(crate) fn narrow_f32(x: f64) -> Option<f32> {
    let narrowed = x as f32;
    if narrowed.is_infinite() && x.is_finite() {
        None
    } else {
        Some(narrowed)
    }
}

/// Narrow to `f16`. Finite values too large to be represented give `None`.
#[cfg(feature = "f16")]
pub(crate) fn narrow_f16(x: f64) -> Option<half::f16> {
    let narrowed = half::f16::from_f64(x);
    if narrowed.is_infinite() && x.is_finite() {
        None
    } else {
        Some(narrowed)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(n) => write!(f, "{}", n),
            Value::U16(n) => write!(f, "{}", n),
            Value::U32(n) => write!(f, "{}", n),
            Value::U64(n) => write!(f, "{}", n),
            Value::Usize(n) => write!(f, "{}", n),
            Value::I8(n) => write!(f, "{}", n),
            Value::I16(n) => write!(f, "{}", n),
            Value::I32(n) => write!(f, "{}", n),
            Value::I64(n) => write!(f, "{}", n),
            Value::Isize(n) => write!(f, "{}", n),
            #[cfg(feature = "f16")]
            Value::F16(x) => write!(f, "{}", x),
            Value::F32(x) => write!(f, "{}", x),
            Value::F64(x) => write!(f, "{}", x),
            Value::Char(byte) => write!(f, "{:?}", char::from(*byte)),
            Value::Bytes(bytes) => write!(f, "{:02x?}", bytes),
        }
    }
}

macro_rules! value_from {
    ($($host:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$host> for Value {
                fn from(value: $host) -> Self {
                    Value::$variant(value)
                }
            }
        )+
    };
}

value_from! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    f32 => F32,
    f64 => F64,
    Vec<u8> => Bytes,
}

#[cfg(feature = "f16")]
value_from! {
    half::f16 => F16,
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(bytes: [u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(bytes: &[u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

/// A Rust type that a single [Value] can be extracted as.
pub trait FromValue: Sized {
    /// Name of the type, used in diagnostics.
    const KIND: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    const KIND: &'static str = "value";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

macro_rules! int_from_value {
    ($($host:ident),+) => {
        $(
            impl FromValue for $host {
                const KIND: &'static str = stringify!($host);

                fn from_value(value: Value) -> Option<Self> {
                    if value.is_integer() {
                        <$host as num_traits::NumCast>::from(value)
                    } else {
                        None
                    }
                }
            }
        )+
    };
}

int_from_value!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl FromValue for f32 {
    const KIND: &'static str = "f32";

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64().and_then(narrow_f32)
    }
}

impl FromValue for f64 {
    const KIND: &'static str = "f64";

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }
}

#[cfg(feature = "f16")]
impl FromValue for half::f16 {
    const KIND: &'static str = "f16";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::F16(x) => Some(x),
            other => other.as_f64().and_then(narrow_f16),
        }
    }
}

impl FromValue for Vec<u8> {
    const KIND: &'static str = "bytes";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => Some(bytes),
            Value::Char(byte) => Some(vec![byte]),
            _ => None,
        }
    }
}

macro_rules! try_from_value {
    ($($host:ty),+) => {
        $(
            impl TryFrom<Value> for $host {
                type Error = ParseError;

                fn try_from(value: Value) -> Result<Self, ParseError> {
                    let found = value.kind();
                    <$host as FromValue>::from_value(value).ok_or(ParseError::UnexpectedValue {
                        index: 0,
                        expected: <$host as FromValue>::KIND,
                        found,
                    })
                }
            }
        )+
    };
}

try_from_value!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, Vec<u8>);

#[cfg(feature = "f16")]
try_from_value!(half::f16);

/// A collection of Rust values that a sequence of decoded [Value]s can be extracted as.
///
/// Implemented for `Vec<Value>` and for tuples of up to eight [FromValue] types.
pub trait FromValues: Sized {
    fn from_values(values: Vec<Value>) -> Result<Self, ParseError>;
}

impl FromValues for Vec<Value> {
    fn from_values(values: Vec<Value>) -> Result<Self, ParseError> {
        Ok(values)
    }
}

fn take<T: FromValue>(
    values: &mut impl Iterator<Item = (usize, Value)>,
    expected: usize,
    actual: usize,
) -> Result<T, ParseError> {
    let (index, value) = values
        .next()
        .ok_or(ParseError::UnexpectedArity { expected, actual })?;
    let found = value.kind();
    T::from_value(value).ok_or(ParseError::UnexpectedValue {
        index,
        expected: T::KIND,
        found,
    })
}

macro_rules! tuple_from_values {
    ($count:expr; $($name:ident),+) => {
        impl<$($name: FromValue),+> FromValues for ($($name,)+) {
            fn from_values(values: Vec<Value>) -> Result<Self, ParseError> {
                let actual = values.len();
                if actual != $count {
                    return Err(ParseError::UnexpectedArity {
                        expected: $count,
                        actual,
                    });
                }
                let mut values = values.into_iter().enumerate();
                Ok(($(take::<$name>(&mut values, $count, actual)?,)+))
            }
        }
    };
}

tuple_from_values!(1; A);
tuple_from_values!(2; A, B);
tuple_from_values!(3; A, B, C);
tuple_from_values!(4; A, B, C, D);
tuple_from_values!(5; A, B, C, D, E);
tuple_from_values!(6; A, B, C, D, E, F);
tuple_from_values!(7; A, B, C, D, E, F, G);
tuple_from_values!(8; A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_primitive_range() {
        assert_eq!(Value::U16(300).to_u8(), None);
        assert_eq!(Value::U16(200).to_u8(), Some(200));
        assert_eq!(Value::I8(-1).to_u32(), None);
        assert_eq!(Value::I64(-5).to_i16(), Some(-5));
        assert_eq!(Value::F32(1.5).to_i64(), None);
        assert_eq!(Value::U32(3).to_f64(), Some(3.0));
    }

    #[test]
    fn test_as_usize() {
        assert_eq!(Value::U8(3).as_usize(), Some(3));
        assert_eq!(Value::I32(-3).as_usize(), None);
        assert_eq!(Value::F64(3.0).as_usize(), None);
        assert_eq!(Value::Bytes(vec![3]).as_usize(), None);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(u16::try_from(Value::U8(9)), Ok(9));
        assert_eq!(Vec::<u8>::try_from(Value::Char(b'q')), Ok(vec![b'q']));
        assert_eq!(
            i8::try_from(Value::F32(1.0)),
            Err(ParseError::UnexpectedValue {
                index: 0,
                expected: "i8",
                found: "f32"
            })
        );
    }

    #[test]
    fn test_float_narrowing() {
        assert_eq!(f32::try_from(Value::F64(0.25)), Ok(0.25));
        assert_eq!(
            f32::try_from(Value::F64(1.0e300)),
            Err(ParseError::UnexpectedValue {
                index: 0,
                expected: "f32",
                found: "f64"
            })
        );
        assert_eq!(f32::try_from(Value::F64(f64::INFINITY)), Ok(f32::INFINITY));
        assert_eq!(Value::F64(-1.0e300).to_f32(), None);
    }

    #[test]
    fn test_from_values_tuple() {
        let values = vec![Value::U8(3), Value::Bytes(vec![1, 2, 3]), Value::F32(0.5)];
        let (n, bytes, x): (u32, Vec<u8>, f64) = FromValues::from_values(values).unwrap();
        assert_eq!(n, 3);
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(x, 0.5);
    }

    #[test]
    fn test_from_values_errors() {
        let res = <(u8, u8)>::from_values(vec![Value::U8(1)]);
        assert_eq!(
            res,
            Err(ParseError::UnexpectedArity {
                expected: 2,
                actual: 1
            })
        );

        let res = <(u8, u8)>::from_values(vec![Value::U8(1), Value::Bytes(vec![])]);
        assert_eq!(
            res,
            Err(ParseError::UnexpectedValue {
                index: 1,
                expected: "u8",
                found: "bytes"
            })
        );

        let res = <(u8,)>::from_values(vec![Value::U16(256)]);
        assert!(matches!(res, Err(ParseError::UnexpectedValue { index: 0, .. })));
    }
}
