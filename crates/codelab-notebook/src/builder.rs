//! Line-driven state machine that turns a codelab body into notebook cells.
//!
//! Top-level and second-level headings open sections. Text is buffered per
//! section and flushed to a markdown cell whenever a heading, a code fence or
//! the end of input is reached. Fenced blocks become code cells named after the
//! enclosing section.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::duration::{hoist_duration, DurationState};
use crate::language::Language;
use crate::names::NameAllocator;
use crate::notebook::Cell;
use crate::urls::rewrite_urls;
use crate::ConvertError;

/// Section key used for content that precedes every heading.
pub const GLOBAL: &str = "Global";
pub const HEADER_CELL: &str = "Notebook Header";

lazy_static! {
    static ref FENCE: Regex = Regex::new(r"^```([\w-]+)?\s*$").expect("invalid regex expression");
}

/// What to do with a code fence that is still open at the end of input.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnterminatedFence {
    /// Emit the partial block as a regular code cell.
    #[default]
    Emit,
    /// Fail the conversion.
    Reject,
}

/// Returns the title of a `# ` or `## ` heading. Deeper headings are plain text.
pub fn section_title(line: &str) -> Option<&str> {
    line.strip_prefix("## ")
        .or_else(|| line.strip_prefix("# "))
        .map(str::trim)
}

#[derive(Debug)]
enum Fence {
    Outside,
    Inside {
        hint: Option<String>,
        lines: Vec<String>,
        opened_at: usize,
    },
}

/// Per-section state threaded through line processing.
#[derive(Debug, Default)]
struct Section {
    title: Option<String>,
    lines: Vec<String>,
    /// `lines[0]` is the heading that opened the section.
    has_heading: bool,
    duration: DurationState,
    flushes: usize,
}

impl Section {
    fn open(heading: &str, title: &str) -> Self {
        Section {
            title: Some(title.to_string()),
            lines: vec![heading.trim_end().to_string()],
            has_heading: true,
            ..Default::default()
        }
    }

    fn key(&self) -> &str {
        self.title.as_deref().unwrap_or(GLOBAL)
    }

    /// Runs until a duration is found or the section is first flushed.
    fn inject_duration(&mut self) {
        if self.title.is_none() || self.duration != DurationState::Unknown {
            return;
        }
        if let Some(minutes) = hoist_duration(&mut self.lines, self.has_heading) {
            self.duration = DurationState::Found(minutes);
        }
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.has_heading = false;
    }
}

/// Joins lines, dropping blank lines at either end.
fn trim_blank_lines(lines: &[String]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join("\n"),
        _ => String::new(),
    }
}

/// Builds the cell list for one document. All naming state lives here, so a
/// builder must not be reused across documents.
#[derive(Debug)]
pub struct CellBuilder {
    base_url: String,
    unterminated: UnterminatedFence,
    names: NameAllocator,
    code_counts: HashMap<(String, Language), usize>,
    cells: Vec<Cell>,
    section: Section,
    fence: Fence,
    line_no: usize,
}

impl CellBuilder {
    pub fn new(base_url: impl Into<String>, unterminated: UnterminatedFence) -> Self {
        CellBuilder {
            base_url: base_url.into(),
            unterminated,
            names: NameAllocator::new(),
            code_counts: HashMap::new(),
            cells: Vec::new(),
            section: Section::default(),
            fence: Fence::Outside,
            line_no: 0,
        }
    }

    /// Sets the number of input lines that precede the first fed line, so
    /// reported line numbers refer to the whole document.
    pub fn with_line_offset(mut self, offset: usize) -> Self {
        self.line_no = offset;
        self
    }

    /// Adds the collapsed header cell. Call before feeding the body.
    pub fn push_header(&mut self, header: &str) {
        let name = self.names.allocate(HEADER_CELL);
        let source = rewrite_urls(header, &self.base_url);
        self.cells.push(Cell::markdown(name, source, true));
    }

    pub fn feed(&mut self, line: &str) {
        self.line_no += 1;

        let fence_hint = FENCE
            .captures(line)
            .map(|c| c.get(1).map(|m| m.as_str().to_string()));

        let in_code = matches!(self.fence, Fence::Inside { .. });

        match (in_code, fence_hint) {
            (false, Some(hint)) => {
                self.section.inject_duration();
                self.flush_section();
                self.fence = Fence::Inside {
                    hint,
                    lines: Vec::new(),
                    opened_at: self.line_no,
                };
            }
            (true, Some(_)) => self.close_fence(),
            (true, None) => {
                if let Fence::Inside { lines, .. } = &mut self.fence {
                    lines.push(line.to_string());
                }
            }
            (false, None) => match section_title(line) {
                Some(title) => {
                    self.flush_section();
                    self.section = Section::open(line, title);
                }
                None => {
                    self.section.lines.push(line.to_string());
                    self.section.inject_duration();
                }
            },
        }
    }

    pub fn finish(mut self) -> Result<Vec<Cell>, ConvertError> {
        if let Fence::Inside { opened_at, .. } = self.fence {
            match self.unterminated {
                UnterminatedFence::Emit => self.close_fence(),
                UnterminatedFence::Reject => {
                    return Err(ConvertError::UnterminatedFence { line: opened_at })
                }
            }
        }
        self.flush_section();
        Ok(self.cells)
    }

    fn close_fence(&mut self) {
        let (hint, lines) = match std::mem::replace(&mut self.fence, Fence::Outside) {
            Fence::Inside { hint, lines, .. } => (hint, lines),
            Fence::Outside => return,
        };

        let code = lines.join("\n");
        let language = Language::detect(hint.as_deref(), &code);
        let key = self.section.key().to_string();

        let count = self.code_counts.entry((key.clone(), language)).or_insert(0);
        *count += 1;

        let base = format!("{} {} {}", key, language.cell_label(), count);
        let name = self.names.allocate(&base);
        self.cells.push(Cell::code(name, language, code));
    }

    fn flush_section(&mut self) {
        if self.section.title.is_some() && self.section.duration == DurationState::Unknown {
            self.section.duration = DurationState::Absent;
        }

        // Comments are stripped by the rewrite, so emptiness is judged on its output.
        let rewritten = rewrite_urls(&self.section.lines.join("\n"), &self.base_url);
        let lines: Vec<String> = rewritten.lines().map(str::to_string).collect();
        let skip = usize::from(self.section.has_heading);
        if lines.iter().skip(skip).all(|l| l.trim().is_empty()) {
            self.section.clear();
            return;
        }

        let source = trim_blank_lines(&lines);
        self.section.flushes += 1;
        let base = match self.section.flushes {
            1 => self.section.key().to_string(),
            n => format!("{} (cont. {})", self.section.key(), n),
        };
        let name = self.names.allocate(&base);
        self.cells.push(Cell::markdown(name, source, false));
        self.section.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(body: &str) -> Vec<Cell> {
        let mut builder = CellBuilder::new("", UnterminatedFence::Emit);
        body.lines().for_each(|l| builder.feed(l));
        builder.finish().unwrap()
    }

    fn names(cells: &[Cell]) -> Vec<&str> {
        cells.iter().map(Cell::name).collect()
    }

    #[test]
    fn heading_detection() {
        assert_eq!(section_title("## Step 1 "), Some("Step 1"));
        assert_eq!(section_title("# Title"), Some("Title"));
        assert_eq!(section_title("### Detail"), None);
        assert_eq!(section_title("##NoSpace"), None);
    }

    #[test]
    fn code_blocks_are_counted_per_section_and_language() {
        let cells = build("## Step 1\n```\nimport os\n```\n```\nx = 1\n```\n```sql\nselect 1\n```");
        assert_eq!(
            names(&cells),
            vec![
                "Step 1 Python code 1",
                "Step 1 Python code 2",
                "Step 1 SQL - Query 1"
            ]
        );
    }

    #[test]
    fn heading_only_buffer_is_dropped() {
        let cells = build("## Empty\n\n## Full\ntext");
        assert_eq!(names(&cells), vec!["Full"]);
        assert_eq!(cells[0].source(), "## Full\ntext");
    }

    #[test]
    fn comment_only_global_buffer_is_dropped() {
        let cells = build("<!-- ------------------------ -->\n\n## Overview\nHello");
        assert_eq!(names(&cells), vec!["Overview"]);
        assert_eq!(cells[0].source(), "## Overview\nHello");
    }

    #[test]
    fn comment_only_section_is_dropped() {
        let cells = build("## Hidden\n<!-- draft -->\n## Shown\ntext\n<!-- ---- -->");
        assert_eq!(names(&cells), vec!["Shown"]);
        assert_eq!(cells[0].source(), "## Shown\ntext");
    }

    #[test]
    fn continuation_cells_after_code() {
        let cells = build("## Step\nbefore\n```py\nx\n```\nafter\n```py\ny\n```\nend");
        assert_eq!(
            names(&cells),
            vec![
                "Step",
                "Step Python code 1",
                "Step (cont. 2)",
                "Step Python code 2",
                "Step (cont. 3)"
            ]
        );
        assert_eq!(cells[2].source(), "after");
    }

    #[test]
    fn deeper_headings_stay_in_section() {
        let cells = build("## Step\n### Detail\nmore\n#### Deeper");
        assert_eq!(names(&cells), vec!["Step"]);
        assert_eq!(cells[0].source(), "## Step\n### Detail\nmore\n#### Deeper");
    }

    #[test]
    fn content_before_any_heading_is_global() {
        let cells = build("intro text\n```\nSELECT 1\n```\n## Step\nx");
        assert_eq!(
            names(&cells),
            vec!["Global", "Global SQL - Query 1", "Step"]
        );
    }

    #[test]
    fn fence_contents_are_verbatim() {
        let cells = build("## S\n```python\n## not a heading\n<!-- kept -->\n\n```");
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].source(), "## not a heading\n<!-- kept -->\n");
        assert_eq!(names(&cells), vec!["S Python code 1"]);
    }

    #[test]
    fn duration_is_hoisted_once_per_section() {
        let cells = build("## S\nIntro\nDuration: 3\nDuration: 4");
        assert_eq!(cells[0].source(), "## S\nDuration: 3 minutes\n\nIntro\nDuration: 4");
    }

    #[test]
    fn duration_after_flush_is_not_hoisted() {
        let cells = build("## S\nIntro\n```\nx\n```\nDuration: 2\nAfter");
        assert_eq!(cells[2].source(), "Duration: 2\nAfter");
    }

    #[test]
    fn duplicate_section_titles_get_unique_names() {
        let cells = build("## Setup\na\n## Setup\nb");
        assert_eq!(names(&cells), vec!["Setup", "Setup 2"]);
    }

    #[test]
    fn unterminated_fence_is_emitted() {
        let cells = build("## S\ntext\n```sql\nSELECT 1");
        assert_eq!(names(&cells), vec!["S", "S SQL - Query 1"]);
        assert_eq!(cells[1].source(), "SELECT 1");
    }

    #[test]
    fn unterminated_fence_is_rejected() {
        let mut builder =
            CellBuilder::new("", UnterminatedFence::Reject).with_line_offset(3);
        for line in ["## S", "```", "x = 1"] {
            builder.feed(line);
        }
        match builder.finish() {
            Err(ConvertError::UnterminatedFence { line }) => assert_eq!(line, 5),
            other => panic!("expected unterminated fence error, got {:?}", other),
        }
    }

    #[test]
    fn markdown_urls_are_rewritten() {
        let mut builder = CellBuilder::new("https://x.test/lab/", UnterminatedFence::Emit);
        builder.push_header("![logo](./logo.png)");
        builder.feed("## S");
        builder.feed("[doc](./doc.md)");
        builder.feed("```");
        builder.feed("open('./data.csv')");
        builder.feed("```");
        let cells = builder.finish().unwrap();
        assert_eq!(cells[0].source(), "![logo](https://x.test/lab/logo.png)");
        assert_eq!(cells[1].source(), "## S\n[doc](https://x.test/lab/doc.md)");
        assert_eq!(cells[2].source(), "open('./data.csv')");
    }
}
