use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::duration::normalize_durations;
use crate::language::Language;

pub const NBFORMAT: i64 = 4;
pub const NBFORMAT_MINOR: i64 = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notebook {
    pub metadata: NotebookMeta,
    pub nbformat_minor: i64,
    pub nbformat: i64,
    pub cells: Vec<Cell>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NotebookMeta {
    pub kernelspec: KernelSpec,
}

/// Kernel descriptor written into the notebook metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KernelSpec {
    pub display_name: String,
    pub name: String,
}

impl Default for KernelSpec {
    fn default() -> Self {
        KernelSpec {
            display_name: "Streamlit Notebook".to_string(),
            name: "streamlit".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarkdownMeta {
    pub name: String,
    pub collapsed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CodeMeta {
    pub language: Language,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "cell_type")]
pub enum Cell {
    #[serde(rename = "markdown")]
    Markdown {
        metadata: MarkdownMeta,
        source: String,
    },
    #[serde(rename = "code")]
    Code {
        metadata: CodeMeta,
        source: String,
        execution_count: Option<i64>,
        outputs: Vec<Value>,
    },
}

impl Cell {
    pub fn markdown(name: String, source: String, collapsed: bool) -> Self {
        Cell::Markdown {
            metadata: MarkdownMeta { name, collapsed },
            source,
        }
    }

    pub fn code(name: String, language: Language, source: String) -> Self {
        Cell::Code {
            metadata: CodeMeta { language, name },
            source,
            execution_count: None,
            outputs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Cell::Markdown { metadata, .. } => &metadata.name,
            Cell::Code { metadata, .. } => &metadata.name,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Cell::Markdown { source, .. } | Cell::Code { source, .. } => source,
        }
    }

    pub fn is_markdown(&self) -> bool {
        matches!(self, Cell::Markdown { .. })
    }
}

impl Notebook {
    /// Wraps finished cells in the notebook envelope and normalizes duration
    /// lines in every markdown cell.
    pub fn assemble(cells: Vec<Cell>, kernelspec: KernelSpec) -> Self {
        let mut notebook = Notebook {
            metadata: NotebookMeta { kernelspec },
            nbformat_minor: NBFORMAT_MINOR,
            nbformat: NBFORMAT,
            cells,
        };
        notebook.normalize_durations();
        notebook
    }

    pub fn normalize_durations(&mut self) {
        for cell in self.cells.iter_mut() {
            if let Cell::Markdown { source, .. } = cell {
                *source = normalize_durations(source);
            }
        }
    }

    pub fn cell_names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(Cell::name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serialize_notebook() {
        let nb = Notebook::assemble(
            vec![
                Cell::markdown("Notebook Header".into(), "id: x".into(), true),
                Cell::code("Global SQL - Query 1".into(), Language::Sql, "SELECT 1;".into()),
            ],
            KernelSpec::default(),
        );

        let value = serde_json::to_value(&nb).unwrap();
        assert_eq!(
            value,
            json!({
                "metadata": {
                    "kernelspec": {"display_name": "Streamlit Notebook", "name": "streamlit"}
                },
                "nbformat_minor": 5,
                "nbformat": 4,
                "cells": [
                    {
                        "cell_type": "markdown",
                        "metadata": {"name": "Notebook Header", "collapsed": true},
                        "source": "id: x"
                    },
                    {
                        "cell_type": "code",
                        "metadata": {"language": "sql", "name": "Global SQL - Query 1"},
                        "source": "SELECT 1;",
                        "execution_count": null,
                        "outputs": []
                    }
                ]
            })
        );
    }

    #[test]
    fn deserialize_written_notebook() {
        let input = r#"{
            "metadata": {"kernelspec": {"display_name": "K", "name": "k"}},
            "nbformat_minor": 5,
            "nbformat": 4,
            "cells": [
                {"cell_type": "code", "metadata": {"language": "python", "name": "a"},
                 "source": "print(1)", "execution_count": null, "outputs": []}
            ]
        }"#;
        let nb: Notebook = serde_json::from_str(input).expect("Deserialization failed");
        assert_eq!(nb.cells[0].name(), "a");
        assert!(!nb.cells[0].is_markdown());
        assert_eq!(nb.metadata.kernelspec.name, "k");
    }

    #[test]
    fn assemble_normalizes_markdown_only() {
        let nb = Notebook::assemble(
            vec![
                Cell::markdown("A".into(), "Duration: 1\nGo".into(), false),
                Cell::code("B".into(), Language::Python, "Duration: 1\nx".into()),
            ],
            KernelSpec::default(),
        );
        assert_eq!(nb.cells[0].source(), "Duration: 1 minute\n\nGo");
        assert_eq!(nb.cells[1].source(), "Duration: 1\nx");
    }
}
