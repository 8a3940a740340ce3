//! A canonical Huffman codec for the static code table defined by [RFC 7541]
//! Appendix B, used by the HPACK header compression format for HTTP/2.
//!
//! [RFC 7541]: https://tools.ietf.org/html/rfc7541#appendix-B

pub mod decoder;
pub mod encoder;
pub mod table;

pub use decoder::{Decoder, DecoderError};
pub use encoder::{encode, encoded_len};
