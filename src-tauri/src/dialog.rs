//! The "Open File" affordance. The menu item, its accelerator and the UI's
//! `trigger_file_dialog` command all end up in [`open_and_notify`].

use std::path::PathBuf;

use md_viewer_protocol::{Channel, DialogSelection, Envelope, MARKDOWN_EXTENSIONS};
use tauri::{AppHandle, Emitter, Manager, Runtime, WebviewWindow};

use crate::error::{HostError, Result};
use crate::window::{WindowTracker, MAIN_WINDOW};

async fn pick_markdown_file<R: Runtime>(window: &WebviewWindow<R>) -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Open File")
        .add_filter("Markdown Files", &MARKDOWN_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .set_parent(window)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

/// Turns the picker outcome into the command result. `notify` runs only when
/// a file was chosen, so a cancelled dialog never pushes `file-opened`.
pub fn settle_selection<F>(picked: Option<PathBuf>, notify: F) -> Envelope<DialogSelection>
where
    F: FnOnce(&str) -> Result<()>,
{
    let Some(path) = picked else {
        log::info!("file dialog was canceled");
        return Envelope::Canceled;
    };
    let file_path = path.to_string_lossy().into_owned();
    match notify(&file_path) {
        Ok(()) => Envelope::Success(DialogSelection { file_path }),
        Err(err) => {
            log::error!("could not deliver opened file {file_path}: {err}");
            Envelope::failure(err.to_string())
        }
    }
}

/// Shows the picker over the main window and pushes the chosen path to the UI.
pub async fn open_and_notify<R: Runtime>(app: &AppHandle<R>) -> Envelope<DialogSelection> {
    let phase = app.state::<WindowTracker>().phase();
    let window = match app.get_webview_window(MAIN_WINDOW) {
        Some(window) if phase.is_ready() => window,
        _ => {
            log::warn!("file dialog requested while main window is {phase:?}");
            return Envelope::failure(HostError::WindowUnavailable.to_string());
        }
    };

    let picked = pick_markdown_file(&window).await;
    settle_selection(picked, |path| {
        log::info!("sending {} with path {path}", Channel::FileOpened.name());
        app.emit_to(MAIN_WINDOW, Channel::FileOpened.name(), path.to_string())
            .map_err(HostError::from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_returns_canceled_without_notifying() {
        let mut notified = false;
        let outcome = settle_selection(None, |_| {
            notified = true;
            Ok(())
        });
        assert_eq!(outcome, Envelope::Canceled);
        assert!(!notified);
    }

    #[test]
    fn acceptance_notifies_and_returns_path() {
        let mut pushed = Vec::new();
        let outcome = settle_selection(Some(PathBuf::from("/docs/readme.md")), |path| {
            pushed.push(path.to_string());
            Ok(())
        });
        assert_eq!(
            outcome,
            Envelope::Success(DialogSelection {
                file_path: "/docs/readme.md".to_string()
            })
        );
        assert_eq!(pushed, ["/docs/readme.md"]);
    }

    #[test]
    fn failed_notification_is_reported() {
        let outcome = settle_selection(Some(PathBuf::from("/docs/a.md")), |_| {
            Err(HostError::WindowUnavailable)
        });
        assert_eq!(
            outcome,
            Envelope::Failure("main window is not available".to_string())
        );
    }
}
