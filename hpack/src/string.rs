//! String literal encoding ([RFC 7541] section 5.2): a length-prefixed byte
//! string whose length prefix's high bit selects plain or Huffman-coded
//! content.
//!
//! [RFC 7541]: https://tools.ietf.org/html/rfc7541#section-5.2

use std::io::{self, Write};

use hpack_huffman::{decoder::Decoder as HuffmanDecoder, encoded_len, encode as huffman_encode};

use crate::error::DecoderError;
use crate::integer;

/// How the Encoder should choose between raw and Huffman-coded output for a
/// string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanPolicy {
    /// Use whichever representation is shorter (the default).
    Auto,
    /// Always Huffman-code, even if that happens to be longer.
    ForceOn,
    /// Never Huffman-code, even if that would be shorter.
    ForceOff,
}

/// Encodes `data` as an HPACK string literal and writes it to `dst`.
pub fn encode<W: Write>(data: &[u8], policy: HuffmanPolicy, mut dst: W) -> io::Result<()> {
    let use_huffman = match policy {
        HuffmanPolicy::ForceOn => true,
        HuffmanPolicy::ForceOff => false,
        HuffmanPolicy::Auto => encoded_len(data) < data.len(),
    };

    if use_huffman {
        let mut body = Vec::with_capacity(encoded_len(data));
        huffman_encode(data, &mut body)?;
        integer::encode(body.len() as u32, 0x80, 7, &mut dst)?;
        dst.write_all(&body)
    } else {
        integer::encode(data.len() as u32, 0x00, 7, &mut dst)?;
        dst.write_all(data)
    }
}

/// Result of a suspendable string literal decode attempt.
pub enum Decoded {
    Value(Vec<u8>, usize),
    Incomplete,
}

/// Attempts to decode one HPACK string literal from the start of `src`,
/// consulting `huffman` to expand Huffman-coded content.
///
/// Mirrors [`integer::decode`]'s suspend/resume contract: on
/// `Decoded::Incomplete` nothing was consumed and the caller retries the
/// same call once `src` has grown.
pub fn decode(src: &[u8], huffman: &HuffmanDecoder) -> Result<Decoded, DecoderError> {
    let prefix = match peek_prefix(src)? {
        Some(p) => p,
        None => return Ok(Decoded::Incomplete),
    };
    if !body_arrived(src, &prefix) {
        return Ok(Decoded::Incomplete);
    }
    let value = decode_body(src, huffman, &prefix)?;
    Ok(Decoded::Value(value, consumed_len(&prefix)))
}

/// A string literal's Huffman flag and length, parsed ahead of its body.
///
/// Separating this from the body lets a caller act on the length — for
/// instance, to discard an over-budget literal's bytes — without paying
/// for Huffman validation of content it will never use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringPrefix {
    is_huffman: bool,
    body_len: usize,
    prefix_consumed: usize,
}

impl StringPrefix {
    /// The literal's length in wire octets (its body only, not the length
    /// prefix itself) — what aggregate header size accounting uses.
    pub fn body_len(&self) -> usize {
        self.body_len
    }

    fn total_len(&self) -> usize {
        self.prefix_consumed + self.body_len
    }
}

/// Parses a string literal's length prefix from the start of `src`,
/// without touching its body. Returns `None` if even the prefix has not
/// fully arrived yet.
pub fn peek_prefix(src: &[u8]) -> Result<Option<StringPrefix>, DecoderError> {
    let first = match src.first() {
        Some(&b) => b,
        None => return Ok(None),
    };
    let is_huffman = first & 0x80 == 0x80;
    match integer::decode(src, 7)? {
        integer::Decoded::Value(value, prefix_consumed) => Ok(Some(StringPrefix {
            is_huffman,
            body_len: value as usize,
            prefix_consumed,
        })),
        integer::Decoded::Incomplete => Ok(None),
    }
}

/// Whether `prefix`'s body has fully arrived in `src`.
pub fn body_arrived(src: &[u8], prefix: &StringPrefix) -> bool {
    src.len() >= prefix.total_len()
}

/// Total bytes (length prefix plus body) `prefix`'s literal occupies.
pub fn consumed_len(prefix: &StringPrefix) -> usize {
    prefix.total_len()
}

/// Decodes `prefix`'s body out of `src`, expanding Huffman content.
///
/// Callers must check [`body_arrived`] first; this indexes `src` assuming
/// the body is fully present.
pub fn decode_body(
    src: &[u8],
    huffman: &HuffmanDecoder,
    prefix: &StringPrefix,
) -> Result<Vec<u8>, DecoderError> {
    let body = &src[prefix.prefix_consumed..prefix.total_len()];
    if prefix.is_huffman {
        huffman
            .decode(body)
            .map_err(|_| DecoderError::DecompressionException)
    } else {
        Ok(body.to_vec())
    }
}
