use std::path::PathBuf;

/// Failures of host-side operations. The `Display` text is what the UI shows
/// once the error has been folded into an envelope.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("main window is not available")]
    WindowUnavailable,

    #[error(transparent)]
    Tauri(#[from] tauri::Error),
}

impl HostError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HostError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
