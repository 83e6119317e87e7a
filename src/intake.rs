//! Validation of files dropped onto the window.

use md_viewer_protocol::has_markdown_extension;

/// What a drag source handed us. Some sources carry in-memory content only
/// and expose no filesystem path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedItem {
    pub name: String,
    pub path: Option<String>,
}

impl DroppedItem {
    pub fn from_path(path: &str) -> Self {
        let name = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path)
            .to_string();
        Self {
            name,
            path: Some(path.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Please drop a markdown file (.md, .markdown, or .txt)")]
    UnsupportedExtension,

    #[error("Could not access file path. Please use the \"Open File\" button instead.")]
    NoPath,
}

/// Returns the path to load, or why the drop was refused.
pub fn accept_drop(item: &DroppedItem) -> Result<String, IntakeError> {
    if !has_markdown_extension(&item.name) {
        return Err(IntakeError::UnsupportedExtension);
    }
    item.path.clone().ok_or(IntakeError::NoPath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_markdown_with_path() {
        let item = DroppedItem::from_path("/home/me/docs/README.md");
        assert_eq!(item.name, "README.md");
        assert_eq!(accept_drop(&item), Ok("/home/me/docs/README.md".to_string()));
    }

    #[test]
    fn windows_paths_split_on_backslash() {
        let item = DroppedItem::from_path(r"C:\notes\todo.TXT");
        assert_eq!(item.name, "todo.TXT");
        assert!(accept_drop(&item).is_ok());
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["photo.png", "script.js", "Makefile"] {
            let item = DroppedItem::from_path(name);
            assert_eq!(accept_drop(&item), Err(IntakeError::UnsupportedExtension));
        }
    }

    #[test]
    fn pathless_drop_points_to_the_dialog() {
        let item = DroppedItem {
            name: "notes.md".to_string(),
            path: None,
        };
        let err = accept_drop(&item).unwrap_err();
        assert_eq!(err, IntakeError::NoPath);
        assert!(err.to_string().contains("Open File"));
    }
}
