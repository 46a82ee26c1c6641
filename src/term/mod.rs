//! Term Module
//!
//! The generic value model shared with the peer runtime and its binary
//! encoding (the external term format).
//!
//! ## Supported Types
//! - Atoms (Latin-1 and UTF-8 forms)
//! - Integers in the 64-bit signed range (small, 32-bit and big forms)
//! - Binaries and character-list strings
//! - Tuples (small and large arity)
//! - Proper lists, with NIL as the empty list
//!
//! Floats, pids, references, maps and compressed terms are rejected.

mod codec;
mod value;

pub use codec::{decode, encode, encoded_len, tag, MAX_DEPTH, VERSION};
pub use value::{Atom, Term, MAX_ATOM_CHARS};
