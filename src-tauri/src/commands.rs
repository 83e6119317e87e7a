//! Commands reachable from the UI. Each returns an [`Envelope`] and never
//! rejects, so I/O faults stay on this side of the boundary.

use md_viewer_protocol::{DialogSelection, Envelope, FileContent, FileRecord};
use tauri::{AppHandle, Runtime};

use crate::dialog;
use crate::error::{HostError, Result};
use crate::files;

async fn blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tauri::async_runtime::spawn_blocking(task)
        .await
        .map_err(HostError::from)?
}

fn settle<T>(operation: &str, result: Result<T>) -> Envelope<T> {
    if let Err(err) = &result {
        log::error!("{operation} failed: {err}");
    }
    Envelope::from_result(result)
}

#[tauri::command]
pub async fn read_file(path: String) -> Envelope<FileContent> {
    log::info!("reading file {path}");
    let result = blocking(move || files::read_text(&path).map(|content| FileContent { content })).await;
    if let Ok(file) = &result {
        log::info!("file read, {} bytes", file.content.len());
    }
    settle("read_file", result)
}

#[tauri::command]
pub async fn get_file_info(path: String) -> Envelope<FileRecord> {
    log::info!("getting file info for {path}");
    let result = blocking(move || files::stat(&path)).await;
    if let Ok(record) = &result {
        log::debug!("file info: {record:?}");
    }
    settle("get_file_info", result)
}

#[tauri::command]
pub async fn trigger_file_dialog<R: Runtime>(app: AppHandle<R>) -> Envelope<DialogSelection> {
    log::info!("file dialog requested by UI");
    dialog::open_and_notify(&app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_stat_go_through_the_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Doc").unwrap();
        let path = path.to_string_lossy().into_owned();

        let read = tauri::async_runtime::block_on(read_file(path.clone()));
        assert_eq!(
            read,
            Envelope::Success(FileContent {
                content: "# Doc".to_string()
            })
        );

        let Envelope::Success(record) = tauri::async_runtime::block_on(get_file_info(path.clone())) else {
            panic!("expected file info");
        };
        assert_eq!(record.file_name, "doc.md");
        assert_eq!(record.file_size, 5);
    }

    #[test]
    fn missing_file_yields_failure_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.md").to_string_lossy().into_owned();

        let read = tauri::async_runtime::block_on(read_file(path.clone()));
        let wire = serde_json::to_value(&read).unwrap();
        assert_eq!(wire["success"], false);
        assert!(wire["error"].as_str().unwrap().contains("gone.md"));
        assert!(wire.get("content").is_none());
        assert!(matches!(
            tauri::async_runtime::block_on(get_file_info(path)),
            Envelope::Failure(_)
        ));
    }
}
