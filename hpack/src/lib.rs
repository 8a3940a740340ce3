//! An implementation of [HPACK], the header compression format used by
//! HTTP/2 ([RFC 7540]) to shrink the otherwise-repetitive header lists
//! exchanged on every request and response.
//!
//! The crate is split along the same lines as the format itself:
//!
//! * [`integer`] and [`string`] implement HPACK's two primitive wire
//!   encodings — prefixed variable-length integers and length-prefixed,
//!   optionally Huffman-coded byte strings (Huffman coding itself lives in
//!   the sibling [`hpack_huffman`] crate).
//! * [`static_table`] and [`dynamic_table`] hold, respectively, the fixed
//!   61-entry table defined by the format and the bounded FIFO each
//!   direction of a connection maintains at runtime; [`table`] addresses
//!   both through the combined index space HPACK specifies.
//! * [`encoder`] and [`decoder`] are the stateful per-direction codecs
//!   applications actually drive, each owning one [`table::Table`] that
//!   must evolve in lock-step with its peer.
//!
//! [HPACK]: https://tools.ietf.org/html/rfc7541
//! [RFC 7540]: https://tools.ietf.org/html/rfc7540

pub mod ct_eq;
pub mod decoder;
pub mod dynamic_table;
pub mod encoder;
pub mod error;
pub mod integer;
pub mod sink;
pub mod static_table;
pub mod string;
pub mod table;

pub use ct_eq::ct_eq;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{DecoderError, EncoderError};
pub use sink::HeaderSink;
