//! Term definitions
//!
//! The generic value exchanged with the peer runtime.

use std::fmt;

/// Longest atom the runtime accepts, in characters
pub const MAX_ATOM_CHARS: usize = 255;

/// A symbolic constant, compared by its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(String);

impl Atom {
    /// Create an atom from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The atom's name
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether every character fits in Latin-1 (and so in ATOM_EXT)
    pub fn is_latin1(&self) -> bool {
        self.0.chars().all(|c| (c as u32) <= 0xFF)
    }

    /// Length in characters, the unit the runtime limits
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A decoded or to-be-encoded term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Symbolic constant
    Atom(Atom),

    /// Signed integer (small and big encodings alike)
    Integer(i64),

    /// Raw bytes carried as a binary
    Binary(Vec<u8>),

    /// Bytes carried as a character list
    String(Vec<u8>),

    /// Fixed-arity record
    Tuple(Vec<Term>),

    /// Proper list; empty is the NIL terminal
    List(Vec<Term>),
}

impl Term {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn atom(name: &str) -> Self {
        Term::Atom(Atom::new(name))
    }

    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Term::String(bytes.into())
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Term::Binary(bytes.into())
    }

    pub fn tuple(elements: Vec<Term>) -> Self {
        Term::Tuple(elements)
    }

    pub fn list(elements: Vec<Term>) -> Self {
        Term::List(elements)
    }

    /// The empty list
    pub fn nil() -> Self {
        Term::List(Vec::new())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Term::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Term]> {
        match self {
            Term::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Element `index` (0-based) of a tuple
    pub fn tuple_element(&self, index: usize) -> Option<&Term> {
        self.as_tuple().and_then(|elements| elements.get(index))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Term::List(elements) if elements.is_empty())
    }

    /// Flatten iodata into a single byte string
    ///
    /// Iodata is a binary, a string, or a possibly nested list whose
    /// elements are bytes (0..=255), binaries, strings or further lists.
    /// Returns `None` for anything else.
    pub fn to_iodata_bytes(&self) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Term::Binary(bytes) | Term::String(bytes) => out.extend_from_slice(bytes),
            Term::List(elements) => flatten_iolist(elements, &mut out)?,
            _ => return None,
        }
        Some(out)
    }
}

/// Whether `elements` is a list of bytes, binaries, strings and nested iolists
pub(crate) fn is_iolist(elements: &[Term]) -> bool {
    flatten_iolist(elements, &mut Vec::new()).is_some()
}

fn flatten_iolist(elements: &[Term], out: &mut Vec<u8>) -> Option<()> {
    for element in elements {
        match element {
            Term::Integer(n) => out.push(u8::try_from(*n).ok()?),
            Term::Binary(bytes) | Term::String(bytes) => out.extend_from_slice(bytes),
            Term::List(nested) => flatten_iolist(nested, out)?,
            _ => return None,
        }
    }
    Some(())
}

// =============================================================================
// Literal syntax
// =============================================================================

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = self.0.chars();
        let bare = matches!(chars.next(), Some('a'..='z'))
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@');
        if bare {
            return f.write_str(&self.0);
        }
        f.write_str("'")?;
        for c in self.0.chars() {
            match c {
                '\'' => f.write_str("\\'")?,
                '\\' => f.write_str("\\\\")?,
                c => write!(f, "{}", c)?,
            }
        }
        f.write_str("'")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(atom) => write!(f, "{}", atom),
            Term::Integer(n) => write!(f, "{}", n),
            Term::Binary(bytes) => {
                f.write_str("<<")?;
                if is_printable(bytes) {
                    write_quoted(f, bytes)?;
                } else {
                    write_byte_seq(f, bytes)?;
                }
                f.write_str(">>")
            }
            Term::String(bytes) => {
                if is_printable(bytes) {
                    write_quoted(f, bytes)
                } else {
                    f.write_str("[")?;
                    write_byte_seq(f, bytes)?;
                    f.write_str("]")
                }
            }
            Term::Tuple(elements) => {
                f.write_str("{")?;
                write_seq(f, elements)?;
                f.write_str("}")
            }
            Term::List(elements) => {
                f.write_str("[")?;
                write_seq(f, elements)?;
                f.write_str("]")
            }
        }
    }
}

fn is_printable(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|&b| (0x20..0x7F).contains(&b) || b == b'\n' || b == b'\t')
}

fn write_quoted(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for &b in bytes {
        match b {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            b'\n' => f.write_str("\\n")?,
            b'\t' => f.write_str("\\t")?,
            b => write!(f, "{}", b as char)?,
        }
    }
    f.write_str("\"")
}

fn write_byte_seq(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", b)?;
    }
    Ok(())
}

fn write_seq(f: &mut fmt::Formatter<'_>, elements: &[Term]) -> fmt::Result {
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", element)?;
    }
    Ok(())
}
