//! The result of unpacking data.

use crate::error::ParseError;
use crate::value::{FromValues, Value};

/// Values decoded by [PackFormat::unpack](crate::PackFormat::unpack), along with the
/// part of the input that was not consumed.
///
/// `rest` is always a suffix of the unpacked buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackResult<'a> {
    values: Vec<Value>,
    rest: &'a [u8],
    consumed: usize,
}

impl<'a> UnpackResult<'a> {
    pub(crate) fn new(values: Vec<Value>, rest: &'a [u8], consumed: usize) -> Self {
        UnpackResult {
            values,
            rest,
            consumed,
        }
    }

    /// Join the results of two consecutive stages.
    pub(crate) fn then(self, next: UnpackResult<'a>) -> Self {
        let mut values = self.values;
        values.extend(next.values);
        UnpackResult {
            values,
            rest: next.rest,
            consumed: self.consumed + next.consumed,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a [u8] {
        self.rest
    }

    /// The number of bytes of the input that were consumed.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Split into the decoded values and the remainder.
    pub fn separate(self) -> (Vec<Value>, &'a [u8]) {
        (self.values, self.rest)
    }

    /// The decoded values followed by the remainder as a final `Value::Bytes`.
    ///
    /// ```
    /// use packman::formats;
    /// use packman::Value;
    ///
    /// let format = formats::u8() + formats::u8();
    /// let spliced = format.unpack(&[1, 2, 3]).unwrap().splice();
    /// assert_eq!(spliced, vec![Value::U8(1), Value::U8(2), Value::Bytes(vec![3])]);
    /// ```
    pub fn splice(self) -> Vec<Value> {
        let mut values = self.values;
        values.push(Value::Bytes(self.rest.to_vec()));
        values
    }

    /// Extract the decoded values as Rust values, returning them with the remainder.
    ///
    /// ```
    /// use packman::formats;
    ///
    /// let format = formats::u8().then(|values| {
    ///     formats::bytes(values[0].as_usize().unwrap_or(0))
    /// });
    /// let ((length, payload), rest): ((u8, Vec<u8>), _) =
    ///     format.unpack(b"\x03abcd").unwrap().into_tuple().unwrap();
    /// assert_eq!(length, 3);
    /// assert_eq!(payload, b"abc");
    /// assert_eq!(rest, b"d");
    /// ```
    pub fn into_tuple<T: FromValues>(self) -> Result<(T, &'a [u8]), ParseError> {
        let values = T::from_values(self.values)?;
        Ok((values, self.rest))
    }
}
