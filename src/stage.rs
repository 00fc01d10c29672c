use std::path::Path;

/// Access to a remote stage and the account it belongs to.
///
/// Stage paths look like `@db.schema.stage` or `@db.schema.stage/sub/dir`.
/// Implementations wrap an authenticated session; the command line has none,
/// so stage locators only work when the library is driven by a host that does.
pub trait StageSession {
    /// Reads a stage file as text.
    fn read(&self, path: &str) -> anyhow::Result<String>;

    /// Uploads a local file into a stage directory, overwriting and uncompressed.
    fn put(&self, local_file: &Path, stage_dir: &str) -> anyhow::Result<()>;

    /// Runs a single SQL statement.
    fn execute(&self, statement: &str) -> anyhow::Result<()>;
}

pub fn is_stage_path(path: &str) -> bool {
    path.trim().starts_with('@')
}

/// Splits a stage directory into the stage root and the path of `filename`
/// relative to it.
pub fn split_stage_path(stage_path: &str, filename: &str) -> (String, String) {
    let stage_path = stage_path.trim();
    match stage_path.split_once('/') {
        Some((root, subdir)) => {
            let subdir = subdir.trim_end_matches('/');
            if subdir.is_empty() {
                (root.to_string(), filename.to_string())
            } else {
                (root.to_string(), format!("{}/{}", subdir, filename))
            }
        }
        None => (stage_path.to_string(), filename.to_string()),
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Statement registering an uploaded notebook file as a notebook object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterNotebook {
    /// Already quoted object name.
    pub name: String,
    pub stage_root: String,
    pub main_file: String,
    pub warehouse: Option<String>,
}

impl RegisterNotebook {
    pub fn to_sql(&self) -> String {
        let mut stmt = format!(
            "CREATE NOTEBOOK {} FROM '{}'\n MAIN_FILE = '{}'",
            self.name, self.stage_root, self.main_file
        );
        if let Some(warehouse) = &self.warehouse {
            stmt.push_str(&format!("\n QUERY_WAREHOUSE = {}", warehouse));
        }
        stmt.push(';');
        stmt
    }
}
