//! Provides an implementation of the [HPACK] decoder.
//!
//! The decoder is a streaming state machine: `decode` may be called with
//! however many bytes of a header block happen to be available, and
//! suspends — returning without error, ready to be called again once more
//! bytes arrive — whenever it runs out of input mid-representation. A
//! `Vec<u8>` (`pending`) accumulates whatever has been handed in but not
//! yet consumed; every sub-parser either reports a complete value and how
//! much of `pending` it used, or reports "not enough yet" without touching
//! `pending` at all, so resuming is just calling `decode` again with more
//! bytes appended.
//!
//! A literal's name and value are each read in two stages: the length
//! prefix first, then the body. This lets the decoder compare the running
//! `header_size` against the aggregate cap the instant a length becomes
//! known, and for a header that will never be stored anyway (anything but
//! incremental indexing once already over budget) skip the body's raw
//! bytes rather than pay for Huffman decoding content that is about to be
//! thrown away.
//!
//! [HPACK]: https://tools.ietf.org/html/rfc7541

use hpack_huffman::decoder::Decoder as HuffmanDecoder;

use crate::error::DecoderError;
use crate::integer::{self, Decoded as DecodedInt};
use crate::sink::HeaderSink;
use crate::string::{self, StringPrefix};
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexType {
    None,
    Incremental,
    Never,
}

/// A literal's name, once its length prefix has been parsed: either the
/// fully decoded bytes, or a marker that the bytes were never read because
/// the header was already over the aggregate size cap.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NameOutcome {
    Decoded(Vec<u8>),
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Waiting for the byte that classifies the next representation.
    ReadRepresentation,
    /// Classified as a Dynamic Table Size Update; finishing its integer.
    ReadMaxTableSize,
    /// Classified as an Indexed Header Field; finishing its integer.
    ReadIndexedHeader,
    /// A literal's name-index integer, with the representation's index type
    /// already known.
    ReadIndexedHeaderName(IndexType),
    /// A literal's name length prefix, read inline because its name index
    /// was 0. Waiting for the Huffman flag and length to become known.
    ReadNameLength(IndexType),
    /// The name's length is known; waiting for its body to fully arrive.
    /// `discard` was decided the moment the length became known, so the
    /// body is skipped unread rather than run through Huffman validation
    /// when the header is already over budget and will never be stored.
    ReadNameBody(IndexType, StringPrefix, bool),
    /// The name is resolved (indexed, decoded, or discarded); waiting for
    /// the value's length prefix to become known.
    ReadValueLength(IndexType, NameOutcome),
    /// The value's length is known; waiting for its body to fully arrive,
    /// with the same discard-without-decoding option as the name.
    ReadValueBody(IndexType, NameOutcome, StringPrefix, bool),
}

/// Decodes an HPACK header block into a sequence of header fields.
///
/// A single instance owns one dynamic table and is meant to live for the
/// lifetime of one direction of an HTTP/2 connection, evolving in
/// lock-step with the peer's [`crate::encoder::Encoder`].
pub struct Decoder {
    table: Table,
    huffman: HuffmanDecoder,
    max_header_size: usize,
    state: State,
    pending: Vec<u8>,
    header_size: usize,
    truncated: bool,
    block_started: bool,
    size_change_required: bool,
}

impl Decoder {
    /// Returns a new decoder.
    ///
    /// `max_header_size` caps the aggregate `name.len() + value.len()` the
    /// decoder will accept per block before it starts truncating; `
    /// max_header_table_size` is the local limit the peer's encoder is
    /// expected to honor for dynamic table capacity.
    pub fn new(max_header_size: usize, max_header_table_size: u32) -> Self {
        Self {
            table: Table::with_dynamic_size(max_header_table_size),
            huffman: HuffmanDecoder::new(),
            max_header_size,
            state: State::ReadRepresentation,
            pending: Vec::new(),
            header_size: 0,
            truncated: false,
            block_started: false,
            size_change_required: false,
        }
    }

    /// Feeds `src` to the decoder, driving the state machine as far as it
    /// will go and emitting completed header fields to `sink`.
    ///
    /// Returns once `src` (plus anything left over from previous calls) is
    /// exhausted mid-representation; call again with the next chunk of the
    /// block to resume.
    pub fn decode<S: HeaderSink>(&mut self, src: &[u8], sink: &mut S) -> Result<(), DecoderError> {
        self.pending.extend_from_slice(src);

        loop {
            if !self.step(sink)? {
                return Ok(());
            }
        }
    }

    /// Ends the current header block, returning whether any header was
    /// truncated for exceeding `max_header_size`, and resetting per-block
    /// state. Does not touch the dynamic table.
    pub fn end_header_block(&mut self) -> bool {
        let truncated = self.truncated;
        self.truncated = false;
        self.header_size = 0;
        self.state = State::ReadRepresentation;
        self.block_started = false;
        truncated
    }

    /// Lowers or raises the decoder's locally advertised maximum dynamic
    /// table size, shrinking the table immediately. If this is a
    /// reduction, the peer's next block must open with a Dynamic Table
    /// Size Update acknowledging it.
    pub fn set_max_header_table_size(&mut self, new_cap: u32) {
        if new_cap < self.table.max_dynamic_size() {
            self.size_change_required = true;
        }
        self.table.update_max_dynamic_size(new_cap);
    }

    /// Runs one state transition. Returns `Ok(true)` if it consumed bytes
    /// and progress can continue, `Ok(false)` if more input is needed.
    fn step<S: HeaderSink>(&mut self, sink: &mut S) -> Result<bool, DecoderError> {
        match self.state.clone() {
            State::ReadRepresentation => self.step_representation(),
            State::ReadMaxTableSize => self.step_max_table_size(),
            State::ReadIndexedHeader => self.step_indexed_header(sink),
            State::ReadIndexedHeaderName(index_type) => self.step_indexed_header_name(index_type),
            State::ReadNameLength(index_type) => self.step_name_length(index_type),
            State::ReadNameBody(index_type, prefix, discard) => {
                self.step_name_body(index_type, prefix, discard)
            }
            State::ReadValueLength(index_type, name) => self.step_value_length(index_type, name),
            State::ReadValueBody(index_type, name, prefix, discard) => {
                self.step_value_body(index_type, name, prefix, discard, sink)
            }
        }
    }

    fn step_representation(&mut self) -> Result<bool, DecoderError> {
        let first = match self.pending.first() {
            Some(&b) => b,
            None => return Ok(false),
        };

        let is_size_update = first & 0b1110_0000 == 0b0010_0000;
        if !self.block_started {
            self.block_started = true;
            if self.size_change_required && !is_size_update {
                return Err(DecoderError::MaxHeaderTableSizeChangeRequired);
            }
        }

        if first & 0x80 == 0x80 {
            self.state = State::ReadIndexedHeader;
        } else if first & 0b1100_0000 == 0b0100_0000 {
            self.state = State::ReadIndexedHeaderName(IndexType::Incremental);
        } else if is_size_update {
            self.state = State::ReadMaxTableSize;
        } else if first & 0b1111_0000 == 0b0001_0000 {
            self.state = State::ReadIndexedHeaderName(IndexType::Never);
        } else {
            // first & 0b1111_0000 == 0
            self.state = State::ReadIndexedHeaderName(IndexType::None);
        }
        Ok(true)
    }

    fn step_max_table_size(&mut self) -> Result<bool, DecoderError> {
        let (new_cap, consumed) = match integer::decode(&self.pending, 5)
            .map_err(|_| DecoderError::IllegalEncodingContextUpdate)?
        {
            DecodedInt::Value(v, c) => (v, c),
            DecodedInt::Incomplete => return Ok(false),
        };
        if new_cap > self.table.max_dynamic_size() {
            return Err(DecoderError::InvalidMaxHeaderTableSize);
        }
        self.pending.drain(..consumed);
        self.table.update_max_dynamic_size(new_cap);
        self.size_change_required = false;
        log::debug!("dynamic table size update to {}", new_cap);
        self.state = State::ReadRepresentation;
        Ok(true)
    }

    fn step_indexed_header<S: HeaderSink>(&mut self, sink: &mut S) -> Result<bool, DecoderError> {
        let (index, consumed) = match integer::decode(&self.pending, 7)? {
            DecodedInt::Value(v, c) => (v, c),
            DecodedInt::Incomplete => return Ok(false),
        };
        if index == 0 {
            return Err(DecoderError::IllegalIndexValue);
        }
        let (name, value) = self
            .table
            .get(index)
            .ok_or(DecoderError::IllegalIndexValue)?;
        self.pending.drain(..consumed);

        if name.is_empty() {
            return Err(DecoderError::DecompressionException);
        }
        sink.add_header(name, value, false);
        self.state = State::ReadRepresentation;
        Ok(true)
    }

    fn step_indexed_header_name(&mut self, index_type: IndexType) -> Result<bool, DecoderError> {
        let prefix_bits = match index_type {
            IndexType::Incremental => 6,
            IndexType::None | IndexType::Never => 4,
        };
        let (index, consumed) = match integer::decode(&self.pending, prefix_bits)? {
            DecodedInt::Value(v, c) => (v, c),
            DecodedInt::Incomplete => return Ok(false),
        };

        if index == 0 {
            self.pending.drain(..consumed);
            self.state = State::ReadNameLength(index_type);
            return Ok(true);
        }

        let (name, _) = self
            .table
            .get(index)
            .ok_or(DecoderError::IllegalIndexValue)?;
        self.pending.drain(..consumed);
        self.state = State::ReadValueLength(index_type, NameOutcome::Decoded(name));
        Ok(true)
    }

    /// Parses the name's Huffman flag and length — the point at which its
    /// contribution to `header_size` becomes known, before a single byte
    /// of its body (which may be an expensive or malformed Huffman
    /// sequence) is touched.
    fn step_name_length(&mut self, index_type: IndexType) -> Result<bool, DecoderError> {
        let prefix = match string::peek_prefix(&self.pending)? {
            Some(p) => p,
            None => return Ok(false),
        };

        self.header_size += prefix.body_len();
        if self.header_size > self.max_header_size {
            self.truncated = true;
        }
        // An entry that must still be inserted for table synchrony is
        // always read in full; only a non-indexed literal can be dropped
        // unread once the block is already over budget.
        let discard = index_type != IndexType::Incremental && self.truncated;

        self.state = State::ReadNameBody(index_type, prefix, discard);
        Ok(true)
    }

    fn step_name_body(
        &mut self,
        index_type: IndexType,
        prefix: StringPrefix,
        discard: bool,
    ) -> Result<bool, DecoderError> {
        if !string::body_arrived(&self.pending, &prefix) {
            return Ok(false);
        }

        let name = if discard {
            NameOutcome::Discarded
        } else {
            NameOutcome::Decoded(string::decode_body(&self.pending, &self.huffman, &prefix)?)
        };
        self.pending.drain(..string::consumed_len(&prefix));
        self.state = State::ReadValueLength(index_type, name);
        Ok(true)
    }

    fn step_value_length(
        &mut self,
        index_type: IndexType,
        name: NameOutcome,
    ) -> Result<bool, DecoderError> {
        let prefix = match string::peek_prefix(&self.pending)? {
            Some(p) => p,
            None => return Ok(false),
        };

        self.header_size += prefix.body_len();
        if self.header_size > self.max_header_size {
            self.truncated = true;
        }
        let discard = matches!(name, NameOutcome::Discarded)
            || (index_type != IndexType::Incremental && self.truncated);

        self.state = State::ReadValueBody(index_type, name, prefix, discard);
        Ok(true)
    }

    fn step_value_body<S: HeaderSink>(
        &mut self,
        index_type: IndexType,
        name: NameOutcome,
        prefix: StringPrefix,
        discard: bool,
        sink: &mut S,
    ) -> Result<bool, DecoderError> {
        if !string::body_arrived(&self.pending, &prefix) {
            return Ok(false);
        }

        let value = if discard {
            None
        } else {
            Some(string::decode_body(&self.pending, &self.huffman, &prefix)?)
        };
        self.pending.drain(..string::consumed_len(&prefix));

        match (index_type, name, value) {
            (IndexType::Incremental, NameOutcome::Decoded(name), Some(value)) => {
                if name.is_empty() {
                    return Err(DecoderError::DecompressionException);
                }
                // `Table::insert` already clears the dynamic table instead
                // of inserting when the entry is larger than its capacity.
                self.table.insert(name.clone(), value.clone());
                if !self.truncated {
                    sink.add_header(name, value, false);
                }
            }
            (_, NameOutcome::Decoded(name), Some(value)) => {
                if name.is_empty() {
                    return Err(DecoderError::DecompressionException);
                }
                sink.add_header(name, value, index_type == IndexType::Never);
            }
            _ => {
                // Discarded: the header was already over budget and will
                // never be stored, so its bytes were skipped unread.
            }
        }

        self.state = State::ReadRepresentation;
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn collect(decoder: &mut Decoder, bytes: &[u8]) -> Vec<(Vec<u8>, Vec<u8>, bool)> {
        let mut headers = Vec::new();
        decoder
            .decode(bytes, &mut |n: Vec<u8>, v: Vec<u8>, s: bool| headers.push((n, v, s)))
            .unwrap();
        headers
    }

    /// S1: an Indexed Header Field referencing a static entry.
    #[test]
    fn decodes_a_static_indexed_header() {
        let mut decoder = Decoder::new(4096, 4096);
        let headers = collect(&mut decoder, &[0x82]);
        assert_eq!(headers, vec![(b":method".to_vec(), b"GET".to_vec(), false)]);
        assert!(!decoder.end_header_block());
    }

    /// S2: literal with incremental indexing, static name, followed by the
    /// encoder's own re-emission as an indexed field.
    #[test]
    fn decodes_a_literal_with_incremental_indexing_then_the_follow_up_index() {
        let mut decoder = Decoder::new(4096, 4096);
        let headers = collect(
            &mut decoder,
            &[0x41, 0x0B, 0x74, 0x77, 0x69, 0x74, 0x74, 0x65, 0x72, 0x2E, 0x63, 0x6F, 0x6D],
        );
        assert_eq!(
            headers,
            vec![(b":authority".to_vec(), b"twitter.com".to_vec(), false)]
        );
        assert_eq!(decoder.table.dynamic_len(), 1);

        let headers = collect(&mut decoder, &[0xBE]);
        assert_eq!(
            headers,
            vec![(b":authority".to_vec(), b"twitter.com".to_vec(), false)]
        );
    }

    /// S3: a Literal Never Indexed header is surfaced with `sensitive=true`
    /// and does not touch the dynamic table.
    #[test]
    fn decodes_never_indexed_headers_as_sensitive() {
        let mut decoder = Decoder::new(4096, 4096);
        let mut dst = Vec::new();
        crate::integer::encode(23, 0b0001_0000, 4, &mut dst).unwrap(); // authorization
        string::encode(b"Bearer xyz", string::HuffmanPolicy::ForceOff, &mut dst).unwrap();
        let headers = collect(&mut decoder, &dst);
        assert_eq!(
            headers,
            vec![(b"authorization".to_vec(), b"Bearer xyz".to_vec(), true)]
        );
        assert_eq!(decoder.table.dynamic_len(), 0);
    }

    /// Splitting the same bytes across many `decode` calls must produce the
    /// same result as feeding them all at once.
    #[test]
    fn suspends_and_resumes_across_arbitrary_split_points() {
        let bytes = [0x41, 0x0B, 0x74, 0x77, 0x69, 0x74, 0x74, 0x65, 0x72, 0x2E, 0x63, 0x6F, 0x6D];
        let mut decoder = Decoder::new(4096, 4096);
        let mut headers = Vec::new();
        for byte in bytes.iter() {
            decoder
                .decode(&[*byte], &mut |n: Vec<u8>, v: Vec<u8>, s: bool| headers.push((n, v, s)))
                .unwrap();
        }
        assert_eq!(
            headers,
            vec![(b":authority".to_vec(), b"twitter.com".to_vec(), false)]
        );
    }

    /// Index `0` on an Indexed Header Field is a protocol error.
    #[test]
    fn rejects_a_zero_index() {
        let mut decoder = Decoder::new(4096, 4096);
        let mut sink = |_: Vec<u8>, _: Vec<u8>, _: bool| {};
        assert_eq!(
            decoder.decode(&[0x80], &mut sink),
            Err(DecoderError::IllegalIndexValue)
        );
    }

    /// An index past the combined table length is a protocol error.
    #[test]
    fn rejects_an_out_of_range_index() {
        let mut decoder = Decoder::new(4096, 4096);
        let mut sink = |_: Vec<u8>, _: Vec<u8>, _: bool| {};
        assert_eq!(
            decoder.decode(&[0xFF, 0x80, 0x01], &mut sink),
            Err(DecoderError::IllegalIndexValue)
        );
    }

    /// S6-style truncation: a block whose aggregate size exceeds the cap is
    /// reported via `end_header_block`, without surfacing the oversized
    /// header, but the dynamic table still tracks it.
    #[test]
    fn truncates_when_the_aggregate_size_cap_is_exceeded() {
        let mut decoder = Decoder::new(10, 4096);
        let mut dst = Vec::new();
        crate::integer::encode(0, 0x40, 6, &mut dst).unwrap(); // inline name, incremental
        string::encode(b"x-long-custom-name", string::HuffmanPolicy::ForceOff, &mut dst).unwrap();
        string::encode(b"a value well past the cap", string::HuffmanPolicy::ForceOff, &mut dst).unwrap();

        let headers = collect(&mut decoder, &dst);
        assert!(headers.is_empty());
        assert!(decoder.end_header_block());
    }

    /// Once a literal without indexing is already over budget on its name
    /// alone, a malformed Huffman value must be skipped unread rather than
    /// rejected: the decoder never decompresses bytes it is about to
    /// discard.
    #[test]
    fn skips_a_malformed_huffman_value_once_over_budget() {
        let mut decoder = Decoder::new(5, 4096);
        let mut dst = Vec::new();
        crate::integer::encode(0, 0x00, 4, &mut dst).unwrap(); // inline name, without indexing
        string::encode(b"x-long-name", string::HuffmanPolicy::ForceOff, &mut dst).unwrap();
        // Huffman flag set, length 5, body is the EOS-in-stream vector that
        // would otherwise fail Huffman validation.
        dst.extend_from_slice(&[0x85, 0xff, 0xff, 0xff, 0xff, 0xc0]);

        let headers = collect(&mut decoder, &dst);
        assert!(headers.is_empty());
        assert!(decoder.end_header_block());
    }

    /// When the name alone fits the budget but the value pushes the block
    /// over it, the name is still decoded (it may be needed to know where
    /// the value begins) while the value is the one that gets skipped.
    #[test]
    fn decodes_the_name_but_skips_the_value_when_only_the_value_overflows() {
        let mut decoder = Decoder::new(6, 4096);
        let mut dst = Vec::new();
        crate::integer::encode(0, 0x00, 4, &mut dst).unwrap(); // inline name, without indexing
        string::encode(b"x-name", string::HuffmanPolicy::ForceOff, &mut dst).unwrap();
        dst.extend_from_slice(&[0x85, 0xff, 0xff, 0xff, 0xff, 0xc0]); // malformed huffman value

        let headers = collect(&mut decoder, &dst);
        assert!(headers.is_empty());
        assert!(decoder.end_header_block());
    }

    /// A Dynamic Table Size Update changes capacity and never reaches the
    /// sink.
    #[test]
    fn applies_a_dynamic_table_size_update() {
        let mut decoder = Decoder::new(4096, 4096);
        let mut dst = Vec::new();
        crate::integer::encode(100, 0b0010_0000, 5, &mut dst).unwrap();
        let headers = collect(&mut decoder, &dst);
        assert!(headers.is_empty());
        assert_eq!(decoder.table.max_dynamic_size(), 100);
    }

    /// Lowering the local maximum requires the next block to begin with a
    /// size update acknowledging it.
    #[test]
    fn requires_a_size_update_at_the_start_of_the_next_block_after_a_local_reduction() {
        let mut decoder = Decoder::new(4096, 4096);
        decoder.set_max_header_table_size(100);

        let mut sink = |_: Vec<u8>, _: Vec<u8>, _: bool| {};
        assert_eq!(
            decoder.decode(&[0x82], &mut sink),
            Err(DecoderError::MaxHeaderTableSizeChangeRequired)
        );
    }
}
