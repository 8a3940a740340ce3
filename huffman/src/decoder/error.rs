use std::{error, fmt};

/// Contains error options that can be encountered while performing the
/// decoding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderError {
    /// The EOS symbol was emitted mid-stream. A correctly encoded Huffman
    /// string never contains the EOS codeword; it only ever appears as
    /// padding on the final, incomplete byte.
    EosInStream,

    /// The bits left over after the last full symbol do not form a strict
    /// prefix of the EOS codeword, or there are more than 7 of them. Either
    /// way the sender padded the stream with something other than the
    /// required `1`-bits.
    InvalidPadding,
}

impl fmt::Display for DecoderError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EosInStream => write!(fmt, "EOS symbol found before end of Huffman stream."),
            Self::InvalidPadding => write!(fmt, "Invalid Huffman padding."),
        }
    }
}

impl error::Error for DecoderError {}
