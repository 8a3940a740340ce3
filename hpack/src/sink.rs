//! The decode-side listener contract.

/// Receives header fields as the [`crate::decoder::Decoder`] parses a
/// header block.
///
/// Emission is idempotent from the sink's point of view: a decoder reused
/// across header blocks may call `add_header` with the same logical header
/// more than once (e.g. an Indexed Header Field referring to a static
/// entry in every block), and a sink must tolerate that.
pub trait HeaderSink {
    fn add_header(&mut self, name: Vec<u8>, value: Vec<u8>, sensitive: bool);
}

impl<F> HeaderSink for F
where
    F: FnMut(Vec<u8>, Vec<u8>, bool),
{
    fn add_header(&mut self, name: Vec<u8>, value: Vec<u8>, sensitive: bool) {
        (self)(name, value, sensitive)
    }
}
