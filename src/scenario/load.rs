use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::scenario::graph::ScenarioGraph;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8", .0.display())]
    Encoding(PathBuf),

    #[error("JSON parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and decode a scenario file. Nothing is validated here beyond JSON shape.
pub fn load_scenario(path: &Path) -> Result<ScenarioGraph, LoadError> {
    info!("Loading scenario from: {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let text = decode_utf8(&bytes).ok_or_else(|| LoadError::Encoding(path.to_path_buf()))?;
    let graph = parse_scenario(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Scenario loaded: {} nodes, start={:?}",
        graph.len(),
        graph.start_node_id()
    );
    Ok(graph)
}

pub fn parse_scenario(text: &str) -> Result<ScenarioGraph, serde_json::Error> {
    serde_json::from_str(text)
}

// serde_json rejects a leading BOM.
fn decode_utf8(bytes: &[u8]) -> Option<String> {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        return None;
    }
    debug!("Decoded {} bytes as UTF-8", bytes.len());
    Some(text.into_owned())
}
