//! JSON stats output writer.
//!
//! Writes StatsPayload structs to JSON files with proper formatting.

use crate::aggregator::StatsPayload;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a stats payload to a JSON file.
///
/// Creates missing parent directories. Pretty-printed, since the output
/// is a developer artifact meant to be read.
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_stats(
    payload: &StatsPayload,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing stats to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, payload).map_err(OutputError::SerializationFailed)?;

    Ok(())
}

/// Read a stats payload back from a JSON file.
///
/// Used by the `validate` command and tests.
pub fn read_stats(input_path: impl AsRef<Path>) -> Result<StatsPayload, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading stats from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let payload: StatsPayload =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Stats loaded: version {}, {} call(s)",
        payload.version, payload.total_calls
    );

    Ok(payload)
}

fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::finalize;
    use crate::color::ColorPair;
    use crate::recorder::TemplateRenderRecord;
    use tempfile::NamedTempFile;

    fn sample_payload() -> StatsPayload {
        finalize(vec![
            TemplateRenderRecord {
                engine: "builtin",
                name: Some("index.html".to_string()),
                start: 0.0,
                end: 0.5,
                time_ms: 500.0,
                level: 1,
                color: ColorPair::from_background([0x80, 0, 0]),
                nodes: None,
            },
            TemplateRenderRecord {
                engine: "builtin",
                name: Some("footer.html".to_string()),
                start: 0.25,
                end: 0.4,
                time_ms: 150.0,
                level: 2,
                color: ColorPair::from_background([0, 0x80, 0]),
                nodes: None,
            },
        ])
    }

    #[test]
    fn test_write_and_read_stats() {
        let payload = sample_payload();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_stats(&payload, path).unwrap();
        let loaded = read_stats(path).unwrap();

        assert_eq!(loaded.version, payload.version);
        assert_eq!(loaded.total_calls, 2);
        assert_eq!(loaded.templates.len(), 2);
        assert_eq!(loaded.templates[0].name.as_deref(), Some("index.html"));
        assert_eq!(loaded.summary[0].name, "index.html");
    }

    #[test]
    fn test_validate_output_path_empty() {
        let result = validate_output_path(Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = validate_output_path(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/stats.json");

        write_stats(&sample_payload(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
