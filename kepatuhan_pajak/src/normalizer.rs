//! Maps the many spellings of spreadsheet headers to the canonical column names.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::config::*;
use crate::table::Table;

/// Header variants known out of the box, already in matching-key form.
const DEFAULT_ALIASES: [(&str, &str); 13] = [
    ("tmt", TMT),
    ("tgl mulai", TMT),
    ("nama op", NAMA_OP),
    ("nm unit", NM_UNIT),
    ("unit", NM_UNIT),
    ("kategori", KLASIFIKASI),
    ("klasifikasi", KLASIFIKASI),
    ("klasifikasi hiburan", KLASIFIKASI),
    ("jenis", KLASIFIKASI),
    ("status", STATUS),
    ("nama wp", NAMA_WP),
    ("wp", NAMA_WP),
    ("wajib pajak", NAMA_WP),
];

/// The mapping from matching keys to canonical column names.
///
/// The table can only grow: entries may be added but never removed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn empty() -> AliasTable {
        AliasTable {
            aliases: HashMap::new(),
        }
    }

    /// Adds an alias. The key goes through the same transform as the headers.
    pub fn with_alias(mut self, header: &str, canonical: &str) -> AliasTable {
        self.aliases
            .insert(matching_key(header), canonical.to_string());
        self
    }

    pub fn canonical_name(&self, header: &str) -> Option<&str> {
        self.aliases.get(&matching_key(header)).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        DEFAULT_ALIASES
            .iter()
            .fold(AliasTable::empty(), |t, (k, v)| t.with_alias(k, v))
    }
}

/// The form of a header used for alias lookups: trimmed, lower case,
/// without dots, underscores read as spaces.
pub fn matching_key(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace('.', "")
        .replace('_', " ")
}

/// A header not used by any column yet: `Nm Unit.1`, `Nm Unit.2`, ...
fn deduplicated(header: &str, taken: &HashSet<String>) -> String {
    (1..)
        .map(|n| format!("{}.{}", header, n))
        .find(|h| !taken.contains(h))
        .unwrap_or_else(|| header.to_string())
}

/// Renames the columns that match an alias. Other columns keep their original header.
///
/// When several headers map to the same canonical name, only the first one
/// (left to right) is renamed. A later header that is spelled exactly like a
/// canonical name already given gets a `.1` suffix, so that each canonical
/// name is carried by one column at most.
pub fn normalize_columns(table: &Table, aliases: &AliasTable) -> Table {
    let mut assigned: HashSet<String> = HashSet::new();
    let mut taken: HashSet<String> = table
        .columns()
        .iter()
        .filter_map(|c| c.name().map(String::from))
        .collect();
    let mut columns: Vec<ColumnKey> = Vec::with_capacity(table.columns().len());
    for key in table.columns() {
        let header = match key {
            ColumnKey::Name(header) => header,
            ColumnKey::Period(_) => {
                columns.push(key.clone());
                continue;
            }
        };
        let new_key = match aliases.canonical_name(header) {
            Some(canonical) if assigned.insert(canonical.to_string()) => {
                debug!("normalize_columns: {:?} -> {:?}", header, canonical);
                ColumnKey::Name(canonical.to_string())
            }
            Some(canonical) if assigned.contains(header.as_str()) => {
                let renamed = deduplicated(header, &taken);
                debug!(
                    "normalize_columns: {:?} also maps to {:?}, renamed to {:?}",
                    header, canonical, renamed
                );
                taken.insert(renamed.clone());
                ColumnKey::Name(renamed)
            }
            Some(canonical) => {
                debug!(
                    "normalize_columns: {:?} also maps to {:?}, keeping the original header",
                    header, canonical
                );
                key.clone()
            }
            None => key.clone(),
        };
        taken.extend(new_key.name().map(String::from));
        columns.push(new_key);
    }
    table.with_columns(columns)
}
