use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use md_viewer_protocol::FileRecord;

use crate::error::{HostError, Result};

/// Reads the whole file as UTF-8. Content is returned in full or not at all.
pub fn read_text(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| HostError::io(path, e))
}

/// Stats `path` into the record the UI displays. `file_path` echoes the input.
pub fn stat(path: &str) -> Result<FileRecord> {
    let metadata = fs::metadata(path).map_err(|e| HostError::io(path, e))?;
    let modified = metadata.modified().map_err(|e| HostError::io(path, e))?;
    let file_name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    Ok(FileRecord {
        file_name,
        file_path: path.to_string(),
        file_size: metadata.len(),
        last_modified: DateTime::<Utc>::from(modified),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_utf8_file() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "# Title\n\nbody").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        assert_eq!(read_text(&path).unwrap(), "# Title\n\nbody");
    }

    #[test]
    fn stat_reports_filesystem_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.markdown");
        fs::write(&path, "hello").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let record = stat(&path_str).unwrap();
        assert_eq!(record.file_name, "notes.markdown");
        assert_eq!(record.file_path, path_str);
        assert_eq!(record.file_size, 5);
        let expected: DateTime<Utc> = fs::metadata(&path).unwrap().modified().unwrap().into();
        assert_eq!(record.last_modified, expected);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.md").to_string_lossy().into_owned();

        let err = read_text(&path).unwrap_err();
        assert!(matches!(err, HostError::Io { .. }));
        assert!(err.to_string().starts_with(&path));
        assert!(matches!(stat(&path), Err(HostError::Io { .. })));
    }

    #[test]
    fn invalid_utf8_is_rejected_without_partial_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.md");
        fs::write(&path, [0x23, 0x20, 0xff, 0xfe]).unwrap();

        assert!(read_text(&path.to_string_lossy()).is_err());
    }
}
