#![warn(rust_2018_idioms)]

//! Declarative packing and unpacking of binary data.
//!
//! Formats are described with [PackFormat] values built from the constructors in
//! [formats] and combined with `+` for fixed layouts or [PackFormat::then] (`|`) when a
//! later part of the layout depends on values decoded earlier.
//!
//! ```
//! use packman::{formats, ByteOrder, Value};
//!
//! let record = (formats::u16() + formats::i32()).with_byte_order(ByteOrder::Little);
//! let packed = record.pack(&[Value::U16(7), Value::I32(-1)]).unwrap();
//! assert_eq!(packed, [7, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
//!
//! let (values, rest) = record.unpack(&packed).unwrap().separate();
//! assert_eq!(values, [Value::U16(7), Value::I32(-1)]);
//! assert!(rest.is_empty());
//! ```

/// Reading and writing of binary data.
pub mod binary;
pub mod byte_order;
pub mod error;
pub mod format;
pub mod formats;
pub mod layout;
pub mod result;
pub mod size;
pub mod value;

pub use crate::byte_order::ByteOrder;
pub use crate::format::PackFormat;
pub use crate::result::UnpackResult;
pub use crate::value::Value;
