use std::fs;
use std::path::{Path, PathBuf};

use super::{GridDocument, GridError};

/// Persistence seam for documents.
///
/// The pipeline reads a source document once and writes one artifact per
/// completed stage. Spreadsheet binary codecs plug in behind this trait;
/// the built-in store speaks the crate's own JSON document format.
pub trait DocumentStore {
    fn load(&self, path: &Path) -> Result<GridDocument, GridError>;
    fn save(&self, doc: &GridDocument, path: &Path) -> Result<(), GridError>;

    /// Path of the artifact produced by the given stage for a source file.
    fn artifact_path(&self, source: &Path, stage_number: u8) -> PathBuf;
}

/// JSON-backed store writing artifacts next to the configured output dir
/// as `{source_stem}-stage{N}.json`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    output_dir: PathBuf,
}

impl JsonStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl DocumentStore for JsonStore {
    fn load(&self, path: &Path) -> Result<GridDocument, GridError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if ext != "json" {
            return Err(GridError::UnsupportedFormat(format!(
                "{ext:?} — convert the workbook to the JSON document format first"
            )));
        }
        let raw = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GridError::NotFound(path.display().to_string())
            } else {
                GridError::Io(e)
            }
        })?;
        let doc = serde_json::from_str(&raw)?;
        Ok(doc)
    }

    fn save(&self, doc: &GridDocument, path: &Path) -> Result<(), GridError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(doc)?;
        fs::write(path, raw)?;
        Ok(())
    }

    fn artifact_path(&self, source: &Path, stage_number: u8) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        self.output_dir.join(format!("{stem}-stage{stage_number}.json"))
    }
}
