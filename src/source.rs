use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::stage::{is_stage_path, StageSession};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not fetch {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("reading from a stage requires a session")]
    NoSession,
    #[error(transparent)]
    Stage(#[from] anyhow::Error),
}

/// Where a codelab is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Local(PathBuf),
    Url(String),
    Stage(String),
}

impl Locator {
    pub fn parse(source: &str) -> Self {
        if is_stage_path(source) {
            Locator::Stage(source.trim().to_string())
        } else if source.starts_with("http://") || source.starts_with("https://") {
            Locator::Url(source.to_string())
        } else {
            Locator::Local(PathBuf::from(source))
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Local(path) => write!(f, "{}", path.display()),
            Locator::Url(url) => write!(f, "{}", url),
            Locator::Stage(path) => write!(f, "{}", path),
        }
    }
}

/// Reads the raw markdown behind `locator`.
///
/// Remote content is decoded as UTF-8, replacing invalid sequences.
pub fn read_source(
    locator: &Locator,
    session: Option<&dyn StageSession>,
) -> Result<String, SourceError> {
    match locator {
        Locator::Local(path) => fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        }),
        Locator::Url(url) => fetch_url(url),
        Locator::Stage(path) => {
            let session = session.ok_or(SourceError::NoSession)?;
            Ok(session.read(path)?)
        }
    }
}

fn fetch_url(url: &str) -> Result<String, SourceError> {
    let http_err = |source| SourceError::Http {
        url: url.to_string(),
        source,
    };

    let response = reqwest::blocking::get(url).map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().map_err(http_err)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
