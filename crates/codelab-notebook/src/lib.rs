//! Converts tutorial-style markdown codelabs into notebook documents.
//!
//! A codelab consists of a metadata header, a single top-level heading and a
//! sequence of second-level sections mixing prose and fenced code. [convert]
//! turns it into a [Notebook] whose cells are uniquely named markdown and code
//! cells. The conversion is pure: reading the source and writing the result are
//! left to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The section state machine producing cells from the document body.
pub mod builder;

/// Duration line detection and canonicalization.
pub mod duration;

/// Header/body split and header fields.
pub mod header;

pub mod language;
pub mod names;

/// Notebook document types and serialization.
pub mod notebook;

/// Relative link and image rewriting.
pub mod urls;

pub use builder::UnterminatedFence;
pub use header::HeaderFields;
pub use language::Language;
pub use notebook::{Cell, KernelSpec, Notebook};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_BASE_URL_PREFIX: &str =
    "https://raw.githubusercontent.com/Snowflake-Labs/sfquickstarts/refs/heads/master/site/sfguides/src/";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConvertError {
    #[error("code fence opened on line {line} is never closed")]
    UnterminatedFence { line: usize },
}

/// Conversion settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Prefix joined with the header `id` to resolve relative urls.
    #[serde(default = "default_base_url_prefix")]
    pub base_url_prefix: String,
    #[serde(default)]
    pub kernel: KernelSpec,
    #[serde(default)]
    pub unterminated_fence: UnterminatedFence,
}

fn default_base_url_prefix() -> String {
    DEFAULT_BASE_URL_PREFIX.to_string()
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            base_url_prefix: default_base_url_prefix(),
            kernel: KernelSpec::default(),
            unterminated_fence: UnterminatedFence::default(),
        }
    }
}

/// The result of converting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub title: String,
    pub fields: HeaderFields,
    pub base_url: String,
    pub notebook: Notebook,
}

pub fn convert(input: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let split = header::split_header(input);
    let fields = HeaderFields::parse(&split.header);
    let base_url = header::base_url(&options.base_url_prefix, fields.id());

    let mut lines = split.body.lines().peekable();
    let title = lines
        .next_if(|l| header::is_top_level_heading(l))
        .map(|l| l[2..].trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let mut builder = builder::CellBuilder::new(base_url.as_str(), options.unterminated_fence)
        .with_line_offset(split.body_start + 1);
    builder.push_header(&split.header);
    lines.for_each(|line| builder.feed(line));
    let cells = builder.finish()?;

    Ok(Conversion {
        title,
        fields,
        base_url,
        notebook: Notebook::assemble(cells, options.kernel.clone()),
    })
}
