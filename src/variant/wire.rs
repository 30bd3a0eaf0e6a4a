//! Marshalled length computation.
//!
//! Mirrors the wire alignment rules closely enough to size a message
//! against [`crate::names::MAX_MESSAGE_SIZE`] without producing bytes.

use super::Variant;

/// Round `offset` up to a multiple of `align` (a power of two)
pub(crate) fn align(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}

/// Alignment of the type whose signature starts with `code`
pub(crate) fn alignment_of(code: u8) -> usize {
    match code {
        b'n' | b'q' => 2,
        b'b' | b'i' | b'u' | b's' | b'o' | b'a' => 4,
        b'x' | b't' | b'd' | b'(' | b'{' => 8,
        // y, g, v
        _ => 1,
    }
}

/// Length of a `u32`-prefixed, NUL-terminated string at `offset`
pub(crate) fn string_end(offset: usize, len: usize) -> usize {
    align(offset, 4) + 4 + len + 1
}

/// Length of a byte-prefixed, NUL-terminated signature at `offset`
pub(crate) fn signature_end(offset: usize, len: usize) -> usize {
    offset + 1 + len + 1
}

/// Offset just past `value` marshalled at `offset`
pub(crate) fn value_end(value: &Variant, offset: usize) -> usize {
    match value {
        Variant::Byte(_) => offset + 1,
        Variant::Int16(_) | Variant::UInt16(_) => align(offset, 2) + 2,
        Variant::Bool(_) | Variant::Int32(_) | Variant::UInt32(_) => align(offset, 4) + 4,
        Variant::Int64(_) | Variant::UInt64(_) | Variant::Double(_) => align(offset, 8) + 8,
        Variant::Str(s) => string_end(offset, s.len()),
        Variant::ObjectPath(p) => string_end(offset, p.as_str().len()),
        Variant::Signature(g) => signature_end(offset, g.as_str().len()),
        Variant::Variant(inner) => boxed_end(inner, offset),
        Variant::Array(array) => {
            let code = array.element().as_str().bytes().next().unwrap_or(b'y');
            let start = align(align(offset, 4) + 4, alignment_of(code));
            array.items().iter().fold(start, |off, item| value_end(item, off))
        },
        Variant::Dict(entries) => {
            let start = align(align(offset, 4) + 4, 8);
            entries.iter().fold(start, |off, (key, val)| {
                let off = string_end(align(off, 8), key.len());
                boxed_end(val, off)
            })
        },
    }
}

/// Offset just past `value` marshalled as a `v` (signature then value)
pub(crate) fn boxed_end(value: &Variant, offset: usize) -> usize {
    let sig = value.signature();
    value_end(value, signature_end(offset, sig.len()))
}

/// Marshalled length of a message body
pub(crate) fn body_len(args: &[Variant]) -> usize {
    args.iter().fold(0, |off, arg| value_end(arg, off))
}
