use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Field names of a CSV resource, taken once from its header line and
/// shared by every record parsed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    keys: Vec<String>,
    /// Column index each key reads its value from. A repeated name keeps
    /// its first position but takes the last column carrying it.
    columns: Vec<usize>,
}

impl Header {
    /// Split a header line on every comma and trim each name.
    /// Quotes are not interpreted here.
    pub fn parse(line: &str) -> Self {
        let mut keys: Vec<String> = Vec::new();
        let mut columns = Vec::new();

        for (col, raw) in line.split(',').enumerate() {
            let name = raw.trim();
            match keys.iter().position(|k| k == name) {
                Some(i) => columns[i] = col,
                None => {
                    keys.push(name.to_string());
                    columns.push(col);
                }
            }
        }

        Self { keys, columns }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}

/// One data row, keyed by the header. Every key of the header is present;
/// its value is `None` when the row ran out of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    header: Arc<Header>,
    values: Vec<Option<String>>,
}

/// Records in input row order.
pub type Dataset = Vec<Record>;

impl Record {
    /// Pair raw split fields with the header by position. Fields past the
    /// header width are dropped.
    pub fn from_fields(header: Arc<Header>, fields: &[&str]) -> Self {
        let values = header
            .columns
            .iter()
            .map(|&col| fields.get(col).map(|raw| clean_field(raw)))
            .collect();
        Self { header, values }
    }

    /// Value for `key`, or `None` if the key is unknown or the row was short.
    pub fn get(&self, key: &str) -> Option<&str> {
        let i = self.header.position(key)?;
        self.values[i].as_deref()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.header.position(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.header.keys.iter().map(String::as_str)
    }

    /// `(key, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.header
            .keys
            .iter()
            .zip(&self.values)
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

/// Drop every double quote, then trim.
fn clean_field(raw: &str) -> String {
    raw.replace('"', "").trim().to_string()
}
