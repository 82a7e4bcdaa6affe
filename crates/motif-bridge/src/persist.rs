//! Persistence adapter: whole-document save/load on durable storage.

use motif_common::{Error, Result};
use motif_model::ModelDocument;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Serialize `doc` as pretty JSON at `path`.
///
/// The write is atomic: content lands in a temp file next to the target and
/// is renamed over it, so a crash mid-write never leaves a truncated
/// document behind.
pub(crate) fn save_document(doc: &ModelDocument, path: &Path) -> Result<()> {
    let content = serde_json::to_vec_pretty(doc)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("model.json");
    let tmp_path = path.with_file_name(format!("{}.tmp.{}", file_name, std::process::id()));
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&content)?;
    }
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        Error::from(err)
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Model document written");
    Ok(())
}

/// Read and parse a model document.
pub(crate) fn load_document(path: &Path) -> Result<ModelDocument> {
    let content = fs::read_to_string(path)?;
    let doc: ModelDocument = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "Model document read");
    Ok(doc)
}
