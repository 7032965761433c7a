//! YAML loading for hand-curated sample datasets.
//!
//! A dataset is either a single `.yaml` file or a directory of them; files in
//! a directory are merged in file-name order.

use crate::types::SampleDataset;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("Path not found: {0}")]
    NotFound(String),
}

/// Load a dataset from a YAML file or a directory of YAML files.
pub fn load_dataset(path: &Path) -> Result<SampleDataset, YamlError> {
    if !path.exists() {
        return Err(YamlError::NotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return load_dataset_file(path);
    }

    let mut entries: Vec<_> = std::fs::read_dir(path)
        .map_err(|e| YamlError::Io {
            path: path.display().to_string(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut dataset = SampleDataset::default();
    for entry in entries {
        dataset.merge(load_dataset_file(&entry.path())?);
    }
    Ok(dataset)
}

/// Parse a dataset from YAML text.
pub fn parse_dataset(contents: &str) -> Result<SampleDataset, serde_yml::Error> {
    serde_yml::from_str(contents)
}

fn load_dataset_file(path: &Path) -> Result<SampleDataset, YamlError> {
    let contents = std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_dataset(&contents).map_err(|e| YamlError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}
