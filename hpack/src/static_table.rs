//! The fixed table of common header fields defined by [RFC 7541] Appendix A.
//!
//! [RFC 7541]: https://tools.ietf.org/html/rfc7541#appendix-A

/// The 61 predefined `(name, value)` pairs, in their 1-based wire order.
///
/// Entries sharing a name (e.g. the seven `:status` rows) are contiguous, a
/// property `index_by_name_value` relies on to avoid scanning the whole
/// table.
pub static ENTRIES: &[(&str, &str)] = &[
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

/// Read-only lookups over the static table.
///
/// `StaticTable` has no state of its own; it exists so that callers go
/// through the same interface as [`crate::dynamic_table::DynamicTable`] and
/// so that the combined-index bookkeeping in [`crate::table::Table`] has a
/// single place to call into.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTable;

impl StaticTable {
    /// Number of entries in the static table (always 61).
    pub fn len(&self) -> usize {
        ENTRIES.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the `(name, value)` pair at 1-based `index`, or `None` if out
    /// of range.
    pub fn get(&self, index: usize) -> Option<(&'static str, &'static str)> {
        if index == 0 {
            return None;
        }
        ENTRIES.get(index - 1).copied()
    }

    /// Returns the smallest 1-based index whose name matches `name`, or
    /// `None`.
    pub fn index_by_name(&self, name: &[u8]) -> Option<usize> {
        ENTRIES
            .iter()
            .position(|&(n, _)| n.as_bytes() == name)
            .map(|i| i + 1)
    }

    /// Returns the 1-based index of an exact `(name, value)` match, and,
    /// whenever at least one entry's name matched, the index of the first
    /// such name-only match too.
    ///
    /// The second element lets a caller fall back to a name-indexed literal
    /// representation without performing a second lookup.
    pub fn index_by_name_value(&self, name: &[u8], value: &[u8]) -> (Option<usize>, Option<usize>) {
        let mut name_index = None;
        for (i, &(n, v)) in ENTRIES.iter().enumerate() {
            if n.as_bytes() != name {
                if name_index.is_some() {
                    break; // matching names are contiguous; the run just ended
                }
                continue;
            }
            if name_index.is_none() {
                name_index = Some(i + 1);
            }
            if v.as_bytes() == value {
                return (Some(i + 1), name_index);
            }
        }
        (None, name_index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn has_sixty_one_entries() {
        assert_eq!(ENTRIES.len(), 61);
    }

    #[test]
    fn finds_indexed_name_and_value() {
        let table = StaticTable;
        assert_eq!(table.get(2), Some((":method", "GET")));
        assert_eq!(table.get(61), Some(("www-authenticate", "")));
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(62), None);
    }

    #[test]
    fn finds_name_only_index() {
        let table = StaticTable;
        assert_eq!(table.index_by_name(b":status"), Some(8)); // first of the run
        assert_eq!(table.index_by_name(b"missing-header"), None);
    }

    #[test]
    fn finds_exact_match_within_a_contiguous_name_run() {
        let table = StaticTable;
        assert_eq!(
            table.index_by_name_value(b":status", b"404"),
            (Some(13), Some(8))
        );
        assert_eq!(
            table.index_by_name_value(b":status", b"999"),
            (None, Some(8))
        );
        assert_eq!(table.index_by_name_value(b"nope", b"nope"), (None, None));
    }
}
