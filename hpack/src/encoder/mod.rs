//! Provides an implementation of the [HPACK] encoder.
//!
//! The encoder performs the task of data compression. It converts a header
//! name/value pair into an optimized byte sequence by applying the rules
//! defined in the [HPACK] specification.
//!
//! Per header field, the encoder runs a fixed decision procedure rather
//! than asking the caller to pick a representation: sensitive headers are
//! always emitted as **Literal Never Indexed** and kept out of the dynamic
//! table; otherwise the encoder looks for an **Indexed Header Field** match
//! in the dynamic table and then the static table, and only falls back to
//! a literal representation — indexed or inline, with or without
//! incremental indexing — when no table entry already covers the pair.
//!
//! [HPACK]: https://tools.ietf.org/html/rfc7541

use std::io::Write;

pub use crate::error::EncoderError;

use crate::string::{self, HuffmanPolicy};
use crate::table::Table;

/// Encodes header fields into HPACK's wire representation.
///
/// A single instance owns one dynamic table and is meant to live for the
/// lifetime of one direction of an HTTP/2 connection; its state (the
/// dynamic table) must evolve in lock-step with the peer's Decoder.
#[derive(Debug)]
pub struct Encoder {
    table: Table,
    use_indexing: bool,
    huffman_policy: HuffmanPolicy,
}

impl Encoder {
    /// Returns a new encoder with the given maximum dynamic table size.
    pub fn new(max_header_table_size: u32) -> Self {
        Self {
            table: Table::with_dynamic_size(max_header_table_size),
            use_indexing: true,
            huffman_policy: HuffmanPolicy::Auto,
        }
    }

    /// Controls whether a table miss is written with incremental indexing
    /// (the default) or without indexing. Exposed mainly for tests that
    /// need to pin down the representation a given header produces.
    pub fn with_indexing(mut self, use_indexing: bool) -> Self {
        self.use_indexing = use_indexing;
        self
    }

    /// Forces every string literal to be Huffman-coded regardless of which
    /// representation is shorter.
    pub fn with_huffman_forced_on(mut self) -> Self {
        self.huffman_policy = HuffmanPolicy::ForceOn;
        self
    }

    /// Forces every string literal to be written raw regardless of which
    /// representation is shorter.
    pub fn with_huffman_forced_off(mut self) -> Self {
        self.huffman_policy = HuffmanPolicy::ForceOff;
        self
    }

    pub fn max_header_table_size(&self) -> u32 {
        self.table.max_dynamic_size()
    }

    /// Encodes one header field and writes its representation to `dst`.
    ///
    /// Implements the decision procedure from [RFC 7541] section 6: a
    /// `sensitive` header is always Never Indexed and never touches the
    /// dynamic table; otherwise the encoder prefers an Indexed Header Field
    /// when the pair is already in the static or dynamic table, then falls
    /// back to a literal, indexing it only when `with_indexing(true)` (the
    /// default) and the entry is small enough to fit.
    ///
    /// [RFC 7541]: https://tools.ietf.org/html/rfc7541#section-6
    pub fn encode_header<W: Write>(
        &mut self,
        name: &[u8],
        value: &[u8],
        sensitive: bool,
        mut dst: W,
    ) -> Result<(), EncoderError> {
        if sensitive {
            return self.encode_literal(name, value, LiteralForm::NeverIndexed, &mut dst);
        }

        if self.table.max_dynamic_size() == 0 {
            return match self.table.find(name, value) {
                Some((index, true)) => self.encode_indexed(index, dst),
                _ => self.encode_literal(name, value, LiteralForm::WithoutIndexing, &mut dst),
            };
        }

        let header_size = name.len() + value.len() + crate::dynamic_table::ENTRY_OVERHEAD;
        if header_size > self.table.max_dynamic_size() as usize {
            return self.encode_literal(name, value, LiteralForm::WithoutIndexing, &mut dst);
        }

        match self.table.find(name, value) {
            Some((index, true)) => self.encode_indexed(index, dst),
            _ if self.use_indexing => {
                // The name index must be resolved against table state as it
                // stood before this header's own insertion.
                self.encode_literal(name, value, LiteralForm::WithIncrementalIndexing, &mut dst)?;
                self.table.insert(name.to_vec(), value.to_vec());
                log::trace!(
                    "inserted header into dynamic table, len={}",
                    self.table.dynamic_len()
                );
                Ok(())
            }
            _ => self.encode_literal(name, value, LiteralForm::WithoutIndexing, &mut dst),
        }
    }

    /// Encodes an Indexed Header Field pointing at combined `index`.
    ///
    /// **Indexed header field representation ([6.1.], figure 5):**
    ///
    /// ```txt
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 1 |        Index (7+)         |
    /// +---+---------------------------+
    /// ```
    ///
    /// [6.1.]: https://tools.ietf.org/html/rfc7541#section-6.1
    pub fn encode_indexed<W: Write>(&self, index: u32, dst: W) -> Result<(), EncoderError> {
        if self.table.get(index).is_none() {
            return Err(EncoderError::InvalidIndex);
        }
        crate::integer::encode(index, 0x80, 7, dst).map_err(EncoderError::from)
    }

    /// Encodes a literal header field in the representation named by
    /// `form`, referencing `name` by table index when it already appears
    /// in the combined index space and writing it inline otherwise.
    ///
    /// **Literal header field with incremental indexing ([6.2.1.], figures 6, 7):**
    ///
    /// ```txt
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |      Index (6+)       |
    /// +---+---+-----------------------+
    /// | H |     Name Length (7+)      |  (name inline only, if index == 0)
    /// +---+---------------------------+
    /// |  Name String (Length octets)  |
    /// +---+---------------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    ///
    /// **Literal header field without indexing ([6.2.2.], figures 8, 9)** and
    /// **never indexed ([6.2.3.], figures 10, 11)** share this shape, with a
    /// 4-bit name index prefix instead of 6-bit, and `0000`/`0001` leading
    /// bits instead of `01`.
    ///
    /// [6.2.1.]: https://tools.ietf.org/html/rfc7541#section-6.2.1
    /// [6.2.2.]: https://tools.ietf.org/html/rfc7541#section-6.2.2
    /// [6.2.3.]: https://tools.ietf.org/html/rfc7541#section-6.2.3
    fn encode_literal<W: Write>(
        &self,
        name: &[u8],
        value: &[u8],
        form: LiteralForm,
        mut dst: W,
    ) -> Result<(), EncoderError> {
        let name_index = self.table.find_name(name).unwrap_or(0);

        let (mask, prefix_bits) = match form {
            LiteralForm::WithIncrementalIndexing => (0x40, 6),
            LiteralForm::WithoutIndexing => (0x00, 4),
            LiteralForm::NeverIndexed => (0b0001_0000, 4),
        };
        crate::integer::encode(name_index, mask, prefix_bits, &mut dst)?;

        if name_index == 0 {
            string::encode(name, self.huffman_policy, &mut dst)?;
        }
        string::encode(value, self.huffman_policy, &mut dst).map_err(EncoderError::from)
    }

    /// Updates the maximum size of the dynamic table, evicting entries as
    /// needed, and writes a Dynamic Table Size Update instruction so the
    /// peer's decoder can stay in sync.
    ///
    /// A no-op request (the new capacity equals the current one) writes
    /// nothing: the HPACK corpus is inconsistent about whether to emit in
    /// that case, and emitting only on an actual change is the simpler,
    /// strictly-conforming choice.
    ///
    /// **Dynamic table size update ([6.3.], figure 12):**
    ///
    /// ```txt
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 1 |   Max size (5+)   |
    /// +---+---------------------------+
    /// ```
    ///
    /// [6.3.]: https://tools.ietf.org/html/rfc7541#section-6.3
    pub fn set_max_header_table_size<W: Write>(
        &mut self,
        new_cap: u32,
        dst: W,
    ) -> Result<(), EncoderError> {
        if new_cap == self.table.max_dynamic_size() {
            return Ok(());
        }
        self.table.update_max_dynamic_size(new_cap);
        log::debug!("dynamic table size update to {}", new_cap);
        crate::integer::encode(new_cap, 0b0010_0000, 5, dst).map_err(EncoderError::from)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(crate::table::DEFAULT_DYNAMIC_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralForm {
    WithIncrementalIndexing,
    WithoutIndexing,
    NeverIndexed,
}

#[cfg(test)]
mod test {
    use super::*;

    /// S1: Static-only indexed emission.
    #[test]
    fn encodes_a_static_indexed_header() {
        let mut encoder = Encoder::new(0);
        let mut dst = Vec::new();
        encoder
            .encode_header(b":method", b"GET", false, &mut dst)
            .unwrap();
        assert_eq!(dst, vec![0x82]);
    }

    /// S2: Literal with incremental indexing, static name; then a repeat
    /// encode collapses to an Indexed Header Field.
    #[test]
    fn encodes_literal_with_incremental_indexing_then_indexes_the_repeat() {
        let mut encoder = Encoder::new(4096);
        let mut dst = Vec::new();
        encoder
            .encode_header(b":authority", b"twitter.com", false, &mut dst)
            .unwrap();
        assert_eq!(
            dst,
            vec![0x41, 0x0B, 0x74, 0x77, 0x69, 0x74, 0x74, 0x65, 0x72, 0x2E, 0x63, 0x6F, 0x6D]
        );
        assert_eq!(encoder.table.dynamic_len(), 1);
        assert_eq!(encoder.table.dynamic_size(), 11 + 10 + 32);

        let mut dst2 = Vec::new();
        encoder
            .encode_header(b":authority", b"twitter.com", false, &mut dst2)
            .unwrap();
        assert_eq!(dst2, vec![0xBE]); // combined index 62 = 1 dynamic + 61 static
    }

    /// S3: Sensitive header is Never Indexed and untouched by table state.
    #[test]
    fn never_indexes_sensitive_headers() {
        let mut encoder = Encoder::new(4096);
        let mut dst = Vec::new();
        encoder
            .encode_header(b"authorization", b"Bearer xyz", true, &mut dst)
            .unwrap();
        assert_eq!(dst[0] & 0b1111_0000, 0b0001_0000);
        assert_eq!(encoder.table.dynamic_len(), 0);
    }

    /// S4: A header whose size exceeds the dynamic table's capacity is
    /// written without indexing and never inserted.
    #[test]
    fn does_not_index_a_header_too_large_to_fit() {
        let mut encoder = Encoder::new(64);
        let mut dst = Vec::new();
        encoder
            .encode_header(b"x-custom-name", b"a value too large to fit", false, &mut dst)
            .unwrap();
        assert_eq!(dst[0] & 0b1111_0000, 0);
        assert_eq!(encoder.table.dynamic_len(), 0);
    }

    /// S5: Huffman preferred when it is shorter.
    #[test]
    fn prefers_huffman_when_shorter() {
        let mut encoder = Encoder::new(4096);
        let mut dst = Vec::new();
        encoder
            .encode_header(b":authority", b"www.example.com", false, &mut dst)
            .unwrap();
        // name index 1 (:authority), with incremental indexing
        assert_eq!(dst[0], 0x41);
        assert_eq!(dst[1] & 0x80, 0x80); // value length byte's Huffman flag
    }

    #[test]
    fn disabling_indexing_always_writes_without_indexing() {
        let mut encoder = Encoder::new(4096).with_indexing(false);
        let mut dst = Vec::new();
        encoder
            .encode_header(b"x-name", b"x-value", false, &mut dst)
            .unwrap();
        assert_eq!(dst[0] & 0b1111_0000, 0);
        assert_eq!(encoder.table.dynamic_len(), 0);
    }

    #[test]
    fn emits_a_dynamic_table_size_update_only_on_change() {
        let mut encoder = Encoder::new(4096);
        let mut dst = Vec::new();
        encoder.set_max_header_table_size(4096, &mut dst).unwrap();
        assert!(dst.is_empty());

        encoder.set_max_header_table_size(100, &mut dst).unwrap();
        assert_eq!(dst[0] & 0b1110_0000, 0b0010_0000);
        assert_eq!(encoder.table.max_dynamic_size(), 100);
    }
}
