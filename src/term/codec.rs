//! Term codec
//!
//! Encoding and decoding of terms in the external term format.
//!
//! ## Wire Format
//!
//! ```text
//! ┌─────────────┬──────────┬──────────────────────────────┐
//! │ Version (1) │ Tag (1)  │  Body (depends on tag) ...   │
//! └─────────────┴──────────┴──────────────────────────────┘
//! ```
//!
//! The version byte is always 131. Compound bodies contain further
//! tag + body pairs, without the version byte.
//!
//! ### Encoder choices
//! - Integer 0..=255:     SMALL_INTEGER_EXT
//! - Integer in i32:      INTEGER_EXT
//! - Other integers:      SMALL_BIG_EXT
//! - Atom:                ATOM_EXT (ATOM_UTF8_EXT if not Latin-1)
//! - Tuple arity <= 255:  SMALL_TUPLE_EXT, else LARGE_TUPLE_EXT
//! - Empty list:          NIL_EXT
//! - List:                LIST_EXT + elements + NIL_EXT tail
//! - String <= 65535:     STRING_EXT, else LIST_EXT of SMALL_INTEGER_EXT
//! - Binary:              BINARY_EXT

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::value::{is_iolist, Atom, Term, MAX_ATOM_CHARS};
use crate::error::{PortError, Result};

/// Format version byte leading every encoded term
pub const VERSION: u8 = 131;

/// Deepest nesting the decoder follows
///
/// Each level costs two recursive frames; this stays well inside a 2 MiB
/// thread stack in unoptimized builds.
pub const MAX_DEPTH: usize = 128;

/// Type tags
pub mod tag {
    pub const SMALL_INTEGER_EXT: u8 = 97;
    pub const INTEGER_EXT: u8 = 98;
    pub const ATOM_EXT: u8 = 100;
    pub const SMALL_TUPLE_EXT: u8 = 104;
    pub const LARGE_TUPLE_EXT: u8 = 105;
    pub const NIL_EXT: u8 = 106;
    pub const STRING_EXT: u8 = 107;
    pub const LIST_EXT: u8 = 108;
    pub const BINARY_EXT: u8 = 109;
    pub const SMALL_BIG_EXT: u8 = 110;
    pub const LARGE_BIG_EXT: u8 = 111;
    pub const SMALL_ATOM_EXT: u8 = 115;
    pub const ATOM_UTF8_EXT: u8 = 118;
    pub const SMALL_ATOM_UTF8_EXT: u8 = 119;

    /// Marks a zlib-compressed term in place of a value tag
    pub const COMPRESSED: u8 = 80;
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a term, version byte included
pub fn encode(term: &Term) -> Result<Bytes> {
    let len = encoded_len(term)?;
    let mut buf = BytesMut::with_capacity(len);
    buf.put_u8(VERSION);
    encode_term(term, &mut buf);
    debug_assert_eq!(buf.len(), len);
    Ok(buf.freeze())
}

/// Exact number of bytes `encode` produces for `term`
///
/// Fails for terms the format cannot carry.
pub fn encoded_len(term: &Term) -> Result<usize> {
    Ok(1 + body_len(term)?)
}

fn body_len(term: &Term) -> Result<usize> {
    let len = match term {
        Term::Atom(atom) => {
            if atom.char_len() > MAX_ATOM_CHARS {
                return Err(PortError::Encode(format!(
                    "atom too long: {} characters (max {})",
                    atom.char_len(),
                    MAX_ATOM_CHARS
                )));
            }
            3 + atom_wire_len(atom)
        }
        Term::Integer(n) => integer_len(*n),
        Term::Binary(bytes) => {
            check_u32_len("binary", bytes.len())?;
            5 + bytes.len()
        }
        Term::String(bytes) => {
            if bytes.len() <= u16::MAX as usize {
                3 + bytes.len()
            } else {
                check_u32_len("string", bytes.len())?;
                // LIST_EXT header, one SMALL_INTEGER_EXT per byte, NIL tail
                5 + 2 * bytes.len() + 1
            }
        }
        Term::Tuple(elements) => {
            check_u32_len("tuple", elements.len())?;
            let header = if elements.len() <= u8::MAX as usize { 2 } else { 5 };
            header + elements_len(elements)?
        }
        Term::List(elements) => {
            if elements.is_empty() {
                1
            } else {
                check_u32_len("list", elements.len())?;
                5 + elements_len(elements)? + 1
            }
        }
    };
    Ok(len)
}

fn elements_len(elements: &[Term]) -> Result<usize> {
    elements.iter().try_fold(0usize, |acc, e| Ok(acc + body_len(e)?))
}

fn check_u32_len(what: &str, len: usize) -> Result<()> {
    if len > u32::MAX as usize {
        return Err(PortError::Encode(format!(
            "{} too large: {} elements (max {})",
            what,
            len,
            u32::MAX
        )));
    }
    Ok(())
}

fn atom_wire_len(atom: &Atom) -> usize {
    if atom.is_latin1() {
        atom.char_len()
    } else {
        atom.name().len()
    }
}

fn integer_len(n: i64) -> usize {
    if (0..=255).contains(&n) {
        2
    } else if i32::try_from(n).is_ok() {
        5
    } else {
        3 + magnitude_bytes(n.unsigned_abs())
    }
}

/// Bytes needed for `magnitude` without leading zeros
fn magnitude_bytes(magnitude: u64) -> usize {
    ((64 - magnitude.leading_zeros() as usize) + 7) / 8
}

/// Encode a term body; `body_len` has already validated it
fn encode_term(term: &Term, buf: &mut BytesMut) {
    match term {
        Term::Atom(atom) => {
            if atom.is_latin1() {
                buf.put_u8(tag::ATOM_EXT);
                buf.put_u16(atom.char_len() as u16);
                for c in atom.name().chars() {
                    buf.put_u8(c as u32 as u8);
                }
            } else {
                buf.put_u8(tag::ATOM_UTF8_EXT);
                buf.put_u16(atom.name().len() as u16);
                buf.put_slice(atom.name().as_bytes());
            }
        }
        Term::Integer(n) => encode_integer(*n, buf),
        Term::Binary(bytes) => {
            buf.put_u8(tag::BINARY_EXT);
            buf.put_u32(bytes.len() as u32);
            buf.put_slice(bytes);
        }
        Term::String(bytes) => {
            if bytes.len() <= u16::MAX as usize {
                buf.put_u8(tag::STRING_EXT);
                buf.put_u16(bytes.len() as u16);
                buf.put_slice(bytes);
            } else {
                buf.put_u8(tag::LIST_EXT);
                buf.put_u32(bytes.len() as u32);
                for &b in bytes {
                    buf.put_u8(tag::SMALL_INTEGER_EXT);
                    buf.put_u8(b);
                }
                buf.put_u8(tag::NIL_EXT);
            }
        }
        Term::Tuple(elements) => {
            if elements.len() <= u8::MAX as usize {
                buf.put_u8(tag::SMALL_TUPLE_EXT);
                buf.put_u8(elements.len() as u8);
            } else {
                buf.put_u8(tag::LARGE_TUPLE_EXT);
                buf.put_u32(elements.len() as u32);
            }
            for element in elements {
                encode_term(element, buf);
            }
        }
        Term::List(elements) => {
            if elements.is_empty() {
                buf.put_u8(tag::NIL_EXT);
                return;
            }
            buf.put_u8(tag::LIST_EXT);
            buf.put_u32(elements.len() as u32);
            for element in elements {
                encode_term(element, buf);
            }
            buf.put_u8(tag::NIL_EXT);
        }
    }
}

fn encode_integer(n: i64, buf: &mut BytesMut) {
    if (0..=255).contains(&n) {
        buf.put_u8(tag::SMALL_INTEGER_EXT);
        buf.put_u8(n as u8);
    } else if let Ok(small) = i32::try_from(n) {
        buf.put_u8(tag::INTEGER_EXT);
        buf.put_i32(small);
    } else {
        let magnitude = n.unsigned_abs();
        let digits = magnitude_bytes(magnitude);
        buf.put_u8(tag::SMALL_BIG_EXT);
        buf.put_u8(digits as u8);
        buf.put_u8(u8::from(n < 0));
        buf.put_slice(&magnitude.to_le_bytes()[..digits]);
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a complete term, version byte included
///
/// The whole input must be consumed.
pub fn decode(bytes: &[u8]) -> Result<Term> {
    let mut input = bytes;
    let version = take_u8(&mut input)?;
    if version != VERSION {
        return Err(PortError::Decode(format!(
            "bad version byte: {} (expected {})",
            version, VERSION
        )));
    }

    let term = decode_term(&mut input, 0)?;
    if input.has_remaining() {
        return Err(PortError::Decode(format!(
            "{} trailing bytes after term",
            input.remaining()
        )));
    }
    Ok(term)
}

fn decode_term(input: &mut &[u8], depth: usize) -> Result<Term> {
    if depth > MAX_DEPTH {
        return Err(PortError::Decode(format!(
            "term nested deeper than {} levels",
            MAX_DEPTH
        )));
    }

    let tag = take_u8(input)?;
    match tag {
        tag::SMALL_INTEGER_EXT => Ok(Term::Integer(take_u8(input)? as i64)),
        tag::INTEGER_EXT => {
            ensure(input, 4, "INTEGER_EXT")?;
            Ok(Term::Integer(input.get_i32() as i64))
        }
        tag::SMALL_BIG_EXT => {
            let digits = take_u8(input)? as usize;
            decode_big(input, digits)
        }
        tag::LARGE_BIG_EXT => {
            let digits = take_u32(input)? as usize;
            decode_big(input, digits)
        }
        tag::ATOM_EXT => {
            let len = take_u16(input)? as usize;
            decode_latin1_atom(input, len)
        }
        tag::SMALL_ATOM_EXT => {
            let len = take_u8(input)? as usize;
            decode_latin1_atom(input, len)
        }
        tag::ATOM_UTF8_EXT => {
            let len = take_u16(input)? as usize;
            decode_utf8_atom(input, len)
        }
        tag::SMALL_ATOM_UTF8_EXT => {
            let len = take_u8(input)? as usize;
            decode_utf8_atom(input, len)
        }
        tag::SMALL_TUPLE_EXT => {
            let arity = take_u8(input)? as usize;
            Ok(Term::Tuple(decode_elements(input, arity, depth)?))
        }
        tag::LARGE_TUPLE_EXT => {
            let arity = take_u32(input)? as usize;
            Ok(Term::Tuple(decode_elements(input, arity, depth)?))
        }
        tag::NIL_EXT => Ok(Term::nil()),
        tag::STRING_EXT => {
            let len = take_u16(input)? as usize;
            Ok(Term::String(take_bytes(input, len, "STRING_EXT")?))
        }
        tag::LIST_EXT => {
            let len = take_u32(input)? as usize;
            let elements = decode_elements(input, len, depth)?;
            let tail = decode_term(input, depth + 1)?;
            join_tail(elements, tail)
        }
        tag::BINARY_EXT => {
            let len = take_u32(input)? as usize;
            Ok(Term::Binary(take_bytes(input, len, "BINARY_EXT")?))
        }
        tag::COMPRESSED => Err(PortError::Decode(
            "compressed terms are not supported".to_string(),
        )),
        other => Err(PortError::Decode(format!("unsupported term tag: {}", other))),
    }
}

/// Attach a decoded list tail to its elements
///
/// List and string tails continue a proper list. A binary tail is kept as
/// the last element when the list is iodata, so flattening is unchanged.
/// Anything else is an improper list.
fn join_tail(mut elements: Vec<Term>, tail: Term) -> Result<Term> {
    match tail {
        Term::List(rest) => elements.extend(rest),
        Term::String(bytes) => elements.extend(bytes.into_iter().map(|b| Term::Integer(b as i64))),
        Term::Binary(bytes) if is_iolist(&elements) => elements.push(Term::Binary(bytes)),
        _ => return Err(PortError::Decode("improper list tail".to_string())),
    }
    Ok(Term::List(elements))
}

fn decode_elements(input: &mut &[u8], count: usize, depth: usize) -> Result<Vec<Term>> {
    // Every element takes at least one byte
    let mut elements = Vec::with_capacity(count.min(input.remaining()));
    for _ in 0..count {
        elements.push(decode_term(input, depth + 1)?);
    }
    Ok(elements)
}

fn decode_big(input: &mut &[u8], digits: usize) -> Result<Term> {
    ensure(input, 1 + digits, "big integer")?;
    let negative = input.get_u8() != 0;
    let raw = &input[..digits];

    let significant = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    if significant > 8 {
        return Err(PortError::Decode(format!(
            "big integer of {} bytes does not fit in 64 bits",
            significant
        )));
    }
    let mut le = [0u8; 8];
    le[..significant].copy_from_slice(&raw[..significant]);
    input.advance(digits);

    let magnitude = u64::from_le_bytes(le);
    let value = if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };
    value.map(Term::Integer).ok_or_else(|| {
        PortError::Decode(format!(
            "big integer {}{} out of 64-bit range",
            if negative { "-" } else { "" },
            magnitude
        ))
    })
}

fn decode_latin1_atom(input: &mut &[u8], len: usize) -> Result<Term> {
    if len > MAX_ATOM_CHARS {
        return Err(PortError::Decode(format!(
            "atom too long: {} characters (max {})",
            len, MAX_ATOM_CHARS
        )));
    }
    let raw = take_bytes(input, len, "atom")?;
    let name: String = raw.iter().map(|&b| b as char).collect();
    Ok(Term::Atom(Atom::new(name)))
}

fn decode_utf8_atom(input: &mut &[u8], len: usize) -> Result<Term> {
    let raw = take_bytes(input, len, "atom")?;
    let name = String::from_utf8(raw)
        .map_err(|_| PortError::Decode("atom is not valid UTF-8".to_string()))?;
    let atom = Atom::new(name);
    if atom.char_len() > MAX_ATOM_CHARS {
        return Err(PortError::Decode(format!(
            "atom too long: {} characters (max {})",
            atom.char_len(),
            MAX_ATOM_CHARS
        )));
    }
    Ok(Term::Atom(atom))
}

// -----------------------------------------------------------------------------
// Bounds-checked primitives
// -----------------------------------------------------------------------------

fn ensure(input: &[u8], needed: usize, what: &str) -> Result<()> {
    if input.remaining() < needed {
        return Err(PortError::Decode(format!(
            "truncated {}: need {} bytes, have {}",
            what,
            needed,
            input.remaining()
        )));
    }
    Ok(())
}

fn take_u8(input: &mut &[u8]) -> Result<u8> {
    ensure(input, 1, "term")?;
    Ok(input.get_u8())
}

fn take_u16(input: &mut &[u8]) -> Result<u16> {
    ensure(input, 2, "length field")?;
    Ok(input.get_u16())
}

fn take_u32(input: &mut &[u8]) -> Result<u32> {
    ensure(input, 4, "length field")?;
    Ok(input.get_u32())
}

fn take_bytes(input: &mut &[u8], len: usize, what: &str) -> Result<Vec<u8>> {
    ensure(input, len, what)?;
    let bytes = input[..len].to_vec();
    input.advance(len);
    Ok(bytes)
}
