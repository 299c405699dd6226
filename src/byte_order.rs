//! Byte order and alignment modes.
//!
//! A [ByteOrder] is attached to a format as an annotation, or to individual fields once
//! formats with different annotations have been concatenated. It is resolved to a
//! concrete [Endian] and an alignment flag only when data is actually packed or unpacked.

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidByteOrder;

/// Endianness and alignment convention applied to multi-byte fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    /// No opinion. Inherits from the enclosing format, or resolves to `NativeAligned`.
    #[default]
    Unspecified,
    /// Native endianness, no alignment.
    Native,
    /// Native endianness, fields aligned to their natural alignment.
    NativeAligned,
    Little,
    Big,
    /// Network byte order (big-endian).
    Network,
}

/// A resolved endianness.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endian = Endian::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endian = Endian::Big;
}

impl ByteOrder {
    /// Every byte order a caller may select.
    pub const SELECTABLE: [ByteOrder; 5] = [
        ByteOrder::Native,
        ByteOrder::NativeAligned,
        ByteOrder::Little,
        ByteOrder::Big,
        ByteOrder::Network,
    ];

    /// The prefix symbol used in layout descriptions.
    ///
    /// `Unspecified` has no symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            ByteOrder::Unspecified => "",
            ByteOrder::Native => "=",
            ByteOrder::NativeAligned => "@",
            ByteOrder::Little => "<",
            ByteOrder::Big => ">",
            ByteOrder::Network => "!",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ByteOrder::Unspecified => "unspecified",
            ByteOrder::Native => "native",
            ByteOrder::NativeAligned => "native_aligned",
            ByteOrder::Little => "little",
            ByteOrder::Big => "big",
            ByteOrder::Network => "network",
        }
    }

    pub const fn is_specified(self) -> bool {
        !matches!(self, ByteOrder::Unspecified)
    }

    /// Returns `self` unless it is `Unspecified`, in which case `fallback` is returned.
    pub const fn or(self, fallback: ByteOrder) -> ByteOrder {
        match self {
            ByteOrder::Unspecified => fallback,
            order => order,
        }
    }

    /// Resolve to a concrete byte order, defaulting to `NativeAligned`.
    pub const fn resolve(self) -> ByteOrder {
        self.or(ByteOrder::NativeAligned)
    }

    /// The endianness this byte order reads and writes with.
    pub const fn endian(self) -> Endian {
        match self.resolve() {
            ByteOrder::Little => Endian::Little,
            ByteOrder::Big | ByteOrder::Network => Endian::Big,
            ByteOrder::Unspecified | ByteOrder::Native | ByteOrder::NativeAligned => {
                Endian::NATIVE
            }
        }
    }

    /// Whether fields are padded to their natural alignment.
    pub const fn is_aligned(self) -> bool {
        matches!(self.resolve(), ByteOrder::NativeAligned)
    }
}

impl FromStr for ByteOrder {
    type Err = InvalidByteOrder;

    /// Parse a byte order name (`"little"`) or symbol (`"<"`).
    ///
    /// ```
    /// use packman::ByteOrder;
    ///
    /// assert_eq!("network".parse::<ByteOrder>(), Ok(ByteOrder::Network));
    /// assert_eq!("<".parse::<ByteOrder>(), Ok(ByteOrder::Little));
    /// assert!("middle".parse::<ByteOrder>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ByteOrder::SELECTABLE
            .into_iter()
            .find(|order| s == order.name() || s == order.symbol())
            .ok_or_else(|| InvalidByteOrder(s.to_string()))
    }
}

impl TryFrom<&str> for ByteOrder {
    type Error = InvalidByteOrder;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
