//! Error types for the encode and decode paths.
//!
//! HPACK draws a line between caller contract violations, which this crate
//! surfaces as `debug_assert!`s or `Result::Err` depending on how cheaply
//! they can be checked, and protocol errors originating from peer bytes,
//! which are always a single fatal variant that ends the current header
//! block.

use std::{error, fmt, io};

/// Failures the Encoder can report.
#[derive(Debug)]
pub enum EncoderError {
    /// `encode_header`/`encode_indexed` were given a combined index that
    /// does not resolve to any static or dynamic entry.
    InvalidIndex,

    /// Writing to the destination sink failed.
    Io(io::Error),
}

impl fmt::Display for EncoderError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidIndex => write!(fmt, "index does not resolve to a table entry"),
            Self::Io(err) => write!(fmt, "failed to write encoded output: {}", err),
        }
    }
}

impl error::Error for EncoderError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for EncoderError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Failures the Decoder can report. Every variant is fatal to the current
/// header block; HPACK defines no in-block resynchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderError {
    /// Integer overflow, a short read after a length commitment, an empty
    /// header name, invalid Huffman padding, an EOS symbol on the wire, or
    /// any other violation that corrupts the byte stream itself.
    DecompressionException,

    /// An Indexed Header Field named index `0`, or an index past the end of
    /// the combined static/dynamic space.
    IllegalIndexValue,

    /// A Dynamic Table Size Update's integer could not be parsed as a
    /// well-formed 5-bit-prefixed integer.
    IllegalEncodingContextUpdate,

    /// A Dynamic Table Size Update requested a capacity larger than the
    /// decoder's own advertised maximum.
    InvalidMaxHeaderTableSize,

    /// The decoder previously lowered its advertised maximum table size and
    /// is still waiting for the encoder to acknowledge it with a Dynamic
    /// Table Size Update at the start of the next block.
    MaxHeaderTableSizeChangeRequired,
}

impl fmt::Display for DecoderError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DecompressionException => write!(fmt, "malformed HPACK byte stream"),
            Self::IllegalIndexValue => write!(fmt, "index references no table entry"),
            Self::IllegalEncodingContextUpdate => {
                write!(fmt, "malformed dynamic table size update")
            }
            Self::InvalidMaxHeaderTableSize => {
                write!(fmt, "dynamic table size update exceeds the local maximum")
            }
            Self::MaxHeaderTableSizeChangeRequired => write!(
                fmt,
                "expected a dynamic table size update at the start of this block"
            ),
        }
    }
}

impl error::Error for DecoderError {}
