//! Provides an implementation of the [canonical Huffman] decoder.
//!
//! The decoder builds a binary trie over the 257 codewords of the
//! [RFC 7541] table once, when [`Decoder::new`] is called, and then walks
//! that trie one bit at a time, taking bits from the input eight at a time
//! (one input byte per inner loop). Whenever the walk lands on a node that
//! represents a complete codeword, the corresponding symbol is emitted and
//! the walk restarts from the root.
//!
//! Because HPACK pads the final, incomplete byte of a Huffman string with
//! `1`-bits, and the EOS codeword happens to consist entirely of `1`-bits,
//! any left-over bits at the end of the input are valid padding exactly
//! when they are themselves all `1`s and number seven or fewer; anything
//! else — a `0` bit in the padding, more than seven left-over bits, or the
//! EOS symbol appearing as a *completed* codeword before the input ends —
//! is a decompression error.
//!
//! [canonical Huffman]: https://en.wikipedia.org/wiki/Canonical_Huffman_code
//! [RFC 7541]: https://tools.ietf.org/html/rfc7541#section-5.2

mod error;

pub use error::*;

use crate::table;

struct Node {
    children: [Option<Box<Node>>; 2],
    symbol: Option<u16>,
}

impl Node {
    fn new() -> Self {
        Node {
            children: [None, None],
            symbol: None,
        }
    }
}

/// Decodes Huffman-coded byte strings using the HPACK code table.
///
/// A single `Decoder` can be reused across many `decode` calls; the trie is
/// built once and never mutated afterwards.
pub struct Decoder {
    root: Box<Node>,
}

impl Decoder {
    /// Builds the decoding trie from the canonical HPACK Huffman table.
    pub fn new() -> Self {
        let mut root = Box::new(Node::new());
        for symbol in 0..table::SYMBOL_COUNT {
            let (code, length) = table::code_for(symbol);
            let mut node = &mut root;
            for i in (0..length).rev() {
                let bit = ((code >> i) & 1) as usize;
                node = node.children[bit].get_or_insert_with(|| Box::new(Node::new()));
            }
            node.symbol = Some(symbol as u16);
        }
        Decoder { root }
    }

    /// Decodes the Huffman-coded octet string `src` into a newly allocated
    /// `Vec<u8>`.
    ///
    /// The entire buffer is treated as one Huffman-coded string, including
    /// its trailing padding.
    pub fn decode(&self, src: &[u8]) -> Result<Vec<u8>, DecoderError> {
        let mut out = Vec::with_capacity(src.len());
        let mut node: &Node = &self.root;
        let mut pending_bits: u8 = 0;
        let mut pending_all_ones = true;

        for &byte in src {
            for i in (0..8).rev() {
                let bit = ((byte >> i) & 1) as usize;
                pending_bits += 1;
                pending_all_ones &= bit == 1;

                node = match &node.children[bit] {
                    Some(next) => next,
                    None => return Err(DecoderError::InvalidPadding),
                };

                if let Some(symbol) = node.symbol {
                    if symbol as usize == table::EOS {
                        return Err(DecoderError::EosInStream);
                    }
                    out.push(symbol as u8);
                    node = &self.root;
                    pending_bits = 0;
                    pending_all_ones = true;
                }
            }
        }

        if pending_bits > 7 || (pending_bits > 0 && !pending_all_ones) {
            return Err(DecoderError::InvalidPadding);
        }

        Ok(out)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<Vec<u8>, DecoderError> {
        Decoder::new().decode(bytes)
    }

    fn valid_characters() -> Vec<(&'static [u8], Vec<u8>)> {
        vec![
            (b" ", vec![83]),       // 32
            (b"!", vec![254, 63]),  // 33
            (b"%", vec![87]),       // 37
            (b"0", vec![7]),        // 48
            (b"3", vec![103]),      // 51
            (b"A", vec![135]),      // 65
            (b"Z", vec![253]),      // 90
            (b"a", vec![31]),       // 97
            (b"z", vec![247]),      // 122
            (&[255], vec![255, 255, 251, 191]),
        ]
    }

    fn valid_literals() -> Vec<(Vec<u8>, Vec<u8>)> {
        // Real HPACK string literals and their Huffman encodings, including
        // trailing padding.
        vec![
            (b":method".to_vec(), vec![185, 73, 83, 57, 228]),
            (b":scheme".to_vec(), vec![184, 130, 78, 90, 75]),
            (
                b":authority".to_vec(),
                vec![184, 59, 83, 57, 236, 50, 125, 127],
            ),
            (b"GET".to_vec(), vec![197, 131, 127]),
            (b"http".to_vec(), vec![157, 41, 175]),
            (b":path".to_vec(), vec![185, 88, 211, 63]),
            (b"hpack-test".to_vec(), vec![158, 177, 147, 170, 201, 42, 19]),
            (b"accept".to_vec(), vec![25, 8, 90, 211]),
            (b"Accept".to_vec(), vec![132, 132, 45, 105]),
            (b"cookie".to_vec(), vec![33, 207, 212, 197]),
            (b"TE".to_vec(), vec![223, 131]),
            (
                b"!$%&A".to_vec(),
                vec![
                    0b11111110, 0b00111111, 0b11110010, 0b10101111, 0b11000100, 0b00111111,
                ],
            ),
            (b"\0\0\0".to_vec(), vec![255, 199, 254, 63, 241]),
            (
                b"www.example.com".to_vec(),
                vec![
                    0xf1, 0xe3, 0xc2, 0xe5, 0xf2, 0x3a, 0x6b, 0xa0, 0xab, 0x90, 0xf4, 0xff,
                ],
            ),
            (b"302".to_vec(), vec![0x64, 0x02]),
        ]
    }

    fn invalid_encodings() -> Vec<(Vec<u8>, DecoderError)> {
        vec![
            // EOS codeword fully present mid-stream.
            (
                vec![0b11111111, 0b11111111, 0b11111111, 0b11111111, 0b11000000],
                DecoderError::EosInStream,
            ),
            // Padding strictly longer than 7 bits.
            (vec![0b11111111, 0b11111111], DecoderError::InvalidPadding),
            // Padding that is not all ones (contains a 0 where EOS has a 1).
            (vec![0b00011111, 0b11110000], DecoderError::InvalidPadding),
        ]
    }

    /// Should decode every ASCII character's individual Huffman code, each
    /// padded to a byte boundary with `1` bits.
    #[test]
    fn decodes_characters() {
        for (data, code) in valid_characters() {
            assert_eq!(data, decode(&code).unwrap().as_slice());
        }
    }

    /// Should decode full HPACK string literals, including multi-symbol
    /// strings whose total bit length does not land on a byte boundary.
    #[test]
    fn decodes_literals() {
        for (data, code) in valid_literals() {
            assert_eq!(data, decode(&code).unwrap());
        }
    }

    /// Should reject encodings that contain the EOS symbol or use invalid
    /// padding.
    #[test]
    fn rejects_invalid_encodings() {
        for (encoding, expected) in invalid_encodings() {
            assert_eq!(Err(expected), decode(&encoding));
        }
    }

    /// Should round-trip arbitrary byte strings through the encoder and back
    /// through the decoder.
    #[test]
    fn round_trips_encoder_output() {
        let samples: Vec<&[u8]> = vec![
            b"",
            b"a",
            b"hello world",
            b"Mozilla/5.0 (Macintosh; Intel Mac OS X 10.8; rv:16.0) Gecko/20100101 Firefox/16.0",
            &[0, 1, 2, 3, 4, 5, 255, 254, 253],
        ];
        for sample in samples {
            let mut encoded = Vec::new();
            crate::encoder::encode(sample, &mut encoded).unwrap();
            assert_eq!(decode(&encoded).unwrap(), sample);
        }
    }
}
