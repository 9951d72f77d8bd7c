use std::{fmt, path::PathBuf};

use tracing::info;
use url::Url;

use crate::{ColumnSpec, Dataset, TableError};

/// Where a dashboard's CSV comes from: a local file or an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Path(PathBuf),
    Url(Url),
}

impl DatasetSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            _ => Self::Path(PathBuf::from(raw)),
        }
    }

    /// Reads the whole source once and checks it against `schema`.
    pub async fn load(&self, schema: &[ColumnSpec]) -> Result<Dataset, TableError> {
        let bytes = match self {
            Self::Path(path) => tokio::fs::read(path).await.map_err(|source| TableError::Io {
                path: path.clone(),
                source,
            })?,
            Self::Url(url) => fetch(url).await.map_err(|source| TableError::Fetch {
                url: url.to_string(),
                source,
            })?,
        };

        let dataset = Dataset::from_csv_reader(bytes.as_slice())?.conform(schema)?;
        info!(
            source = %self,
            rows = dataset.len(),
            columns = dataset.column_names().len(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

async fn fetch(url: &Url) -> Result<Vec<u8>, reqwest::Error> {
    let response = reqwest::get(url.clone()).await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}
