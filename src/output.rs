use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::{env, io};

use codelab_notebook::Notebook;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::stage::{is_stage_path, quote_identifier, split_stage_path, RegisterNotebook, StageSession};

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[\\:*?"<>|]"#).expect("invalid regex expression");
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("could not write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not serialize notebook")]
    Json(#[from] serde_json::Error),
    #[error("writing to a stage requires a session")]
    NoSession,
    #[error(transparent)]
    Stage(#[from] anyhow::Error),
}

fn io_err(path: &Path) -> impl Fn(io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn sanitize_filename(name: &str) -> String {
    let name = name.trim().replace('/', "-");
    UNSAFE_CHARS.replace_all(&name, "-").into_owned()
}

/// The explicit main file name, or one derived from the notebook title.
pub fn notebook_file_name(title: &str, main_file: Option<&str>) -> String {
    match main_file {
        Some(name) => name.to_string(),
        None => format!("{}.ipynb", sanitize_filename(title)),
    }
}

/// Serializes with a single-space indent. Non-ASCII text is written as is.
pub fn write_json<W: Write>(notebook: &Notebook, writer: W) -> Result<(), serde_json::Error> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    notebook.serialize(&mut ser)
}

fn write_file(notebook: &Notebook, path: &Path) -> Result<(), OutputError> {
    let f = File::create(path).map_err(io_err(path))?;
    let mut writer = BufWriter::new(f);
    write_json(notebook, &mut writer)?;
    writer.flush().map_err(io_err(path))
}

/// Where and how to persist a converted notebook.
#[derive(Debug, Clone, Default)]
pub struct WriteRequest<'a> {
    pub title: &'a str,
    /// Local file path or stage directory. Defaults to the current directory.
    pub destination: Option<&'a str>,
    pub main_file: Option<&'a str>,
    pub warehouse: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    Local(PathBuf),
    Stage { path: String, statement: String },
}

impl Written {
    pub fn location(&self) -> String {
        match self {
            Written::Local(path) => path.display().to_string(),
            Written::Stage { path, .. } => path.clone(),
        }
    }
}

pub fn write_notebook(
    notebook: &Notebook,
    request: &WriteRequest,
    session: Option<&dyn StageSession>,
) -> Result<Written, OutputError> {
    let file_name = notebook_file_name(request.title, request.main_file);

    match request.destination {
        Some(dest) if is_stage_path(dest) => {
            let session = session.ok_or(OutputError::NoSession)?;
            write_to_stage(notebook, request, dest.trim(), &file_name, session)
        }
        Some(dest) => {
            let path = PathBuf::from(dest);
            write_file(notebook, &path)?;
            Ok(Written::Local(path))
        }
        None => {
            let cwd = env::current_dir().map_err(io_err(Path::new(".")))?;
            let path = cwd.join(&file_name);
            write_file(notebook, &path)?;
            Ok(Written::Local(path))
        }
    }
}

/// Uploads the notebook and registers it as a notebook object.
fn write_to_stage(
    notebook: &Notebook,
    request: &WriteRequest,
    dest: &str,
    file_name: &str,
    session: &dyn StageSession,
) -> Result<Written, OutputError> {
    let tmp_dir = tempfile::tempdir().map_err(io_err(&env::temp_dir()))?;
    let local_path = tmp_dir.path().join(file_name);
    write_file(notebook, &local_path)?;

    let stage_dir = format!("{}/", dest.trim_end_matches('/'));
    session.put(&local_path, &stage_dir)?;

    let (stage_root, main_file) = split_stage_path(dest, file_name);
    let statement = RegisterNotebook {
        name: quote_identifier(&sanitize_filename(request.title)),
        stage_root,
        main_file,
        warehouse: request.warehouse.map(str::to_string),
    }
    .to_sql();
    session.execute(&statement)?;

    Ok(Written::Stage {
        path: format!("{}{}", stage_dir, file_name),
        statement,
    })
}
