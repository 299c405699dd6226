/// Read binary data
pub mod read;

/// Write binary data
pub mod write;

/// Calculate the offset at which data with the given `alignment` may start, given that
/// `offset` bytes have already been consumed.
///
/// Returns `None` if the aligned offset does not fit in a `usize`.
///
/// Example:
///
/// ```
/// use packman::binary::align;
///
/// assert_eq!(align(5, 4), Some(8));
/// assert_eq!(align(8, 4), Some(8));
/// assert_eq!(align(3, 1), Some(3));
/// assert_eq!(align(usize::MAX, 2), None);
/// ```
pub const fn align(offset: usize, alignment: usize) -> Option<usize> {
    offset.checked_add(padding(offset, alignment))
}

/// The number of padding bytes needed to bring `offset` up to `alignment`.
pub const fn padding(offset: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        0
    } else {
        (alignment - offset % alignment) % alignment
    }
}
