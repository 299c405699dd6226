use packman::{formats, PackFormat, Value};

/// A `u8` length followed by that many bytes.
pub fn length_prefixed() -> PackFormat {
    formats::u8().then(|values| formats::bytes(values[0].as_usize().unwrap_or(0)))
}

/// Pack `values`, check the bytes, then check they unpack back to `values`.
pub fn assert_round_trip(format: &PackFormat, values: &[Value], expected: &[u8]) {
    let packed = format.pack(values).expect("error packing values");
    assert_eq!(packed, expected, "packed bytes of {}", format);
    let result = format.unpack(&packed).expect("error unpacking data");
    assert_eq!(result.values(), values);
    assert!(result.rest().is_empty());
    assert_eq!(result.consumed(), packed.len());
}
