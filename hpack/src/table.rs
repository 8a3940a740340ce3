//! The combined static/dynamic index space HPACK headers are referenced
//! against, shared by the [`crate::encoder::Encoder`] and
//! [`crate::decoder::Decoder`].

use crate::ct_eq::ct_eq;
use crate::dynamic_table::{DynamicTable, HeaderField};
use crate::static_table::StaticTable;

/// The default dynamic table capacity an HPACK context starts with, per
/// RFC 7540's `SETTINGS_HEADER_TABLE_SIZE` default.
pub const DEFAULT_DYNAMIC_SIZE: u32 = 4096;

/// A static table plus a dynamic table, addressed through one combined
/// 1-based index space: `1..=dynamic.len()` names the dynamic table newest
/// first, and `dynamic.len()+1..=dynamic.len()+61` names the static table.
#[derive(Debug)]
pub struct Table {
    static_table: StaticTable,
    dynamic: DynamicTable,
}

impl Table {
    pub fn with_dynamic_size(max_dynamic_size: u32) -> Self {
        Self {
            static_table: StaticTable,
            dynamic: DynamicTable::with_capacity(max_dynamic_size),
        }
    }

    /// Combined table length (dynamic entries plus the 61 static entries).
    pub fn len(&self) -> usize {
        self.dynamic.len() + self.static_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dynamic_len(&self) -> usize {
        self.dynamic.len()
    }

    pub fn dynamic_size(&self) -> usize {
        self.dynamic.size()
    }

    pub fn max_dynamic_size(&self) -> u32 {
        self.dynamic.capacity() as u32
    }

    pub fn update_max_dynamic_size(&mut self, size: u32) {
        self.dynamic.set_capacity(size);
    }

    /// Returns the `(name, value)` pair at combined `index`, or `None` if
    /// `index` is `0` or past the end of the combined space.
    pub fn get(&self, index: u32) -> Option<(Vec<u8>, Vec<u8>)> {
        let index = index as usize;
        let dyn_len = self.dynamic.len();
        if index == 0 {
            return None;
        }
        if index <= dyn_len {
            let entry = self.dynamic.get(index)?;
            return Some((entry.name.clone(), entry.value.clone()));
        }
        let (name, value) = self.static_table.get(index - dyn_len)?;
        Some((name.as_bytes().to_vec(), value.as_bytes().to_vec()))
    }

    /// Inserts `(name, value)` into the dynamic table, evicting as needed.
    pub fn insert(&mut self, name: Vec<u8>, value: Vec<u8>) {
        self.dynamic.add(HeaderField::new(name, value));
    }

    /// Looks up `(name, value)` across the dynamic table (newest first) and
    /// then the static table.
    ///
    /// Returns the combined index and whether it is an exact value match
    /// (`true`) or a name-only match (`false`); `None` if neither table has
    /// an entry with a matching name.
    pub fn find(&self, name: &[u8], value: &[u8]) -> Option<(u32, bool)> {
        let mut dyn_name_index = None;
        for (i, entry) in self.dynamic.iter().enumerate() {
            if ct_eq(&entry.name, name) {
                if ct_eq(&entry.value, value) {
                    return Some(((i + 1) as u32, true));
                }
                if dyn_name_index.is_none() {
                    dyn_name_index = Some(i + 1);
                }
            }
        }

        let (static_exact, static_name) = self.static_table.index_by_name_value(name, value);
        let dyn_len = self.dynamic.len();
        if let Some(si) = static_exact {
            return Some(((dyn_len + si) as u32, true));
        }
        if let Some(di) = dyn_name_index {
            return Some((di as u32, false));
        }
        if let Some(si) = static_name {
            return Some(((dyn_len + si) as u32, false));
        }
        None
    }

    /// Returns the combined index of the newest entry whose name matches,
    /// ignoring value, or `None`. Used when a literal's name can be
    /// index-referenced even though its value will always be written
    /// inline.
    pub fn find_name(&self, name: &[u8]) -> Option<u32> {
        if let Some(i) = self.dynamic.iter().position(|entry| ct_eq(&entry.name, name)) {
            return Some((i + 1) as u32);
        }
        self.static_table
            .index_by_name(name)
            .map(|si| (self.dynamic.len() + si) as u32)
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::with_dynamic_size(DEFAULT_DYNAMIC_SIZE)
    }
}
