//! Splitting a codelab into its metadata header and its body.
//!
//! The header is everything before the first top-level heading. It usually holds
//! `key: value` lines such as `id`, `summary` or `authors`.

use lazy_static::lazy_static;
use linked_hash_map::LinkedHashMap;
use regex::Regex;

lazy_static! {
    static ref FIELD: Regex =
        Regex::new(r"^\s*([A-Za-z0-9_-]+)\s*:\s*(.+?)\s*$").expect("invalid regex expression");
}

/// A document split at its first top-level heading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitDocument {
    /// Trimmed header text, possibly empty.
    pub header: String,
    /// The remaining lines, starting with the top-level heading.
    pub body: String,
    /// Zero-based line index of the first body line in the input.
    pub body_start: usize,
}

/// Returns true for `# Title` but not for `## Title` or `#Title`.
pub fn is_top_level_heading(line: &str) -> bool {
    line.starts_with("# ")
}

pub fn split_header(input: &str) -> SplitDocument {
    let lines: Vec<&str> = input.lines().collect();
    let split_at = lines
        .iter()
        .position(|l| is_top_level_heading(l))
        .unwrap_or(lines.len());

    SplitDocument {
        header: lines[..split_at].join("\n").trim().to_string(),
        body: lines[split_at..].join("\n"),
        body_start: split_at,
    }
}

/// The `key: value` pairs found in a header, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderFields {
    fields: LinkedHashMap<String, String>,
}

impl HeaderFields {
    /// Collects every field line. When a key repeats, the first value is kept.
    pub fn parse(header: &str) -> Self {
        let mut fields = LinkedHashMap::new();
        for line in header.lines() {
            if let Some(caps) = FIELD.captures(line) {
                let key = caps[1].to_string();
                if !fields.contains_key(&key) {
                    fields.insert(key, caps[2].trim().to_string());
                }
            }
        }
        HeaderFields { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The content id, or an empty string when the header has none.
    pub fn id(&self) -> &str {
        self.get("id").unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Builds the absolute prefix relative links are resolved against.
///
/// An empty id yields an empty base, which turns url rewriting into a no-op.
pub fn base_url(prefix: &str, id: &str) -> String {
    let id = id.trim().trim_matches('/');
    if id.is_empty() {
        return String::new();
    }
    let mut base = prefix.to_string();
    if !base.is_empty() && !base.ends_with('/') {
        base.push('/');
    }
    base.push_str(id);
    base.push('/');
    base
}
