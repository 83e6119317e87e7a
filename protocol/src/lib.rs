//! Wire contract between the privileged host and the webview UI.
//!
//! Everything that crosses the IPC boundary is defined here so both sides
//! agree on names and shapes: the command allow-list, the push channel, the
//! result envelope and its payloads.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Extensions accepted by the open dialog filter and by drag-and-drop.
pub const MARKDOWN_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Whether `file_name` ends in one of [`MARKDOWN_EXTENSIONS`], ignoring case.
pub fn has_markdown_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Host commands the UI may invoke. Nothing outside this list is reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    ReadFile,
    GetFileInfo,
    TriggerFileDialog,
}

impl Command {
    pub const ALL: [Command; 3] = [
        Command::ReadFile,
        Command::GetFileInfo,
        Command::TriggerFileDialog,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::ReadFile => "read_file",
            Command::GetFileInfo => "get_file_info",
            Command::TriggerFileDialog => "trigger_file_dialog",
        }
    }
}

/// Host-to-UI push channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    FileOpened,
}

impl Channel {
    pub const ALL: [Channel; 1] = [Channel::FileOpened];

    pub fn name(self) -> &'static str {
        match self {
            Channel::FileOpened => "file-opened",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }
}

/// Arguments of the commands that take a filesystem path.
#[derive(Debug, Serialize)]
pub struct PathArgs<'a> {
    pub path: &'a str,
}

/// Payload of a successful `read_file`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub content: String,
}

/// Metadata of the file currently on display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Payload of an accepted `trigger_file_dialog`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogSelection {
    pub file_path: String,
}

/// Result of every cross-boundary call.
///
/// Serialized as `{success: true, ..payload}`, `{success: false, canceled: true}`
/// or `{success: false, error}`. A failing operation is never surfaced as a
/// rejected promise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Envelope<T> {
    Success(T),
    /// The user dismissed a prompt. Not an error.
    Canceled,
    Failure(String),
}

impl<T> Envelope<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        Envelope::Failure(message.into())
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(payload) => Envelope::Success(payload),
            Err(err) => Envelope::Failure(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct WireOut<'a, T> {
    success: bool,
    #[serde(flatten)]
    payload: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    canceled: bool,
}

#[derive(Deserialize)]
struct WireIn<T> {
    success: bool,
    #[serde(flatten)]
    payload: Option<T>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    canceled: bool,
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Envelope::Success(payload) => WireOut {
                success: true,
                payload: Some(payload),
                error: None,
                canceled: false,
            },
            Envelope::Canceled => WireOut {
                success: false,
                payload: None,
                error: None,
                canceled: true,
            },
            Envelope::Failure(error) => WireOut {
                success: false,
                payload: None,
                error: Some(error.as_str()),
                canceled: false,
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let WireIn {
            success,
            payload,
            error,
            canceled,
        } = WireIn::<T>::deserialize(deserializer)?;
        if success {
            return payload
                .map(Envelope::Success)
                .ok_or_else(|| D::Error::custom("successful envelope without a payload"));
        }
        if canceled {
            return Ok(Envelope::Canceled);
        }
        Ok(Envelope::Failure(error.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn success_envelope_flattens_payload() {
        let record = FileRecord {
            file_name: "notes.md".to_string(),
            file_path: "/tmp/notes.md".to_string(),
            file_size: 42,
            last_modified: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let value = serde_json::to_value(Envelope::Success(record)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "fileName": "notes.md",
                "filePath": "/tmp/notes.md",
                "fileSize": 42,
                "lastModified": "2024-05-01T12:00:00Z",
            })
        );
    }

    #[test]
    fn canceled_and_failure_shapes() {
        let canceled = serde_json::to_value(Envelope::<DialogSelection>::Canceled).unwrap();
        assert_eq!(canceled, json!({ "success": false, "canceled": true }));

        let failed = serde_json::to_value(Envelope::<FileContent>::failure("no such file")).unwrap();
        assert_eq!(failed, json!({ "success": false, "error": "no such file" }));
    }

    #[test]
    fn decodes_host_responses() {
        let read: Envelope<FileContent> =
            serde_json::from_value(json!({ "success": true, "content": "# hi" })).unwrap();
        assert_eq!(
            read,
            Envelope::Success(FileContent {
                content: "# hi".to_string()
            })
        );

        let dialog: Envelope<DialogSelection> =
            serde_json::from_value(json!({ "success": false, "canceled": true })).unwrap();
        assert_eq!(dialog, Envelope::Canceled);

        let failed: Envelope<FileRecord> =
            serde_json::from_value(json!({ "success": false, "error": "denied" })).unwrap();
        assert_eq!(failed, Envelope::Failure("denied".to_string()));
    }

    #[test]
    fn rejects_success_without_payload() {
        let decoded = serde_json::from_value::<Envelope<FileContent>>(json!({ "success": true }));
        assert!(decoded.is_err());
    }

    #[test]
    fn allow_lists_are_fixed() {
        let commands: Vec<_> = Command::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(commands, ["read_file", "get_file_info", "trigger_file_dialog"]);
        assert_eq!(Channel::from_name("file-opened"), Some(Channel::FileOpened));
        assert_eq!(Channel::from_name("settings-updated"), None);
    }

    #[test]
    fn recognises_markdown_extensions() {
        assert!(has_markdown_extension("README.md"));
        assert!(has_markdown_extension("guide.MARKDOWN"));
        assert!(has_markdown_extension("notes.txt"));
        assert!(!has_markdown_extension("image.png"));
        assert!(!has_markdown_extension("Makefile"));
        assert!(!has_markdown_extension("archive.md.zip"));
    }
}
