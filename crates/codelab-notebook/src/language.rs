
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Languages a notebook code cell can be tagged with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Sql,
    Python,
}

lazy_static! {
    static ref SQL_KEYWORDS: Regex = Regex::new(r"(?i)\b(?:SELECT|CREATE|WITH|INSERT|UPDATE|DELETE)\b")
        .expect("invalid regex expression");
    static ref PYTHON_TOKENS: Regex =
        Regex::new(r"\bimport\b|\bdef\b|\bclass\b|\bfrom\s+\w+(?:\.\w+)*\s+import\b")
            .expect("invalid regex expression");
}

impl Language {
    /// Maps a fence info string to a language. Unknown hints yield `None`.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "sql" | "snowflake-sql" => Some(Language::Sql),
            "python" | "py" => Some(Language::Python),
            _ => None,
        }
    }

    /// Classifies a code block. The fence hint wins when recognized, otherwise the
    /// content is guessed. Anything unclassifiable is treated as python.
    pub fn detect(hint: Option<&str>, code: &str) -> Self {
        hint.and_then(Language::from_hint)
            .or_else(|| Language::guess(code))
            .unwrap_or(Language::Python)
    }

    /// Content heuristic: SQL keywords take precedence over python tokens.
    pub fn guess(code: &str) -> Option<Self> {
        let sample = code.trim();
        if SQL_KEYWORDS.is_match(sample) {
            Some(Language::Sql)
        } else if PYTHON_TOKENS.is_match(sample) {
            Some(Language::Python)
        } else {
            None
        }
    }

    /// Prefix used when naming code cells of this language.
    pub fn cell_label(&self) -> &'static str {
        match self {
            Language::Sql => "SQL - Query",
            Language::Python => "Python code",
        }
    }
}
