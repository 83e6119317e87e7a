//! The viewer's state machine.
//!
//! Every user action and host response is a [`Msg`]. [`update`] folds it into
//! the [`ViewState`] and returns the side effects the shell has to carry out.
//! Nothing in here touches the DOM or the bridge.

use md_viewer_protocol::{DialogSelection, Envelope, FileContent, FileRecord};

use crate::export;
use crate::highlight::Highlighter;
use crate::intake::{self, DroppedItem};
use crate::keys::Shortcut;
use crate::render::MarkdownRenderer;
use crate::settings::{SettingChange, Settings, Theme};

pub const TOAST_MILLIS: u32 = 3000;

const READY: &str = "Ready";
const READ_FAILED: &str = "Failed to read file";
const INFO_FAILED: &str = "Failed to get file info";
const RENDER_FAILED: &str = "Failed to render markdown content";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DisplayState {
    #[default]
    Empty,
    Loading,
    Content {
        html: String,
    },
    Error {
        message: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modal {
    Settings,
    Help,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// Identifies one run of the load routine. Responses from any run other than
/// the active one are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub display: DisplayState,
    pub current_file: Option<FileRecord>,
    pub settings: Settings,
    pub modal: Option<Modal>,
    pub status: String,
    pub toast: Option<Toast>,
    pub active_load: Option<LoadTicket>,
    pub next_ticket: u64,
    next_toast: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ViewState {
    pub fn new(settings: Settings) -> Self {
        Self {
            display: DisplayState::Empty,
            current_file: None,
            settings,
            modal: None,
            status: READY.to_string(),
            toast: None,
            active_load: None,
            next_ticket: 1,
            next_toast: 1,
        }
    }

    pub fn has_content(&self) -> bool {
        matches!(self.display, DisplayState::Content { .. })
    }

    fn issue_ticket(&mut self) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.active_load = Some(ticket);
        ticket
    }

    fn is_active(&self, ticket: LoadTicket) -> bool {
        self.active_load == Some(ticket)
    }

    fn fail_load(&mut self, message: impl Into<String>) {
        self.active_load = None;
        self.display = DisplayState::Error {
            message: message.into(),
        };
        self.status = "Error loading file".to_string();
    }

    fn toast(&mut self, message: impl Into<String>, effects: &mut Vec<Effect>) {
        let id = self.next_toast;
        self.next_toast += 1;
        self.toast = Some(Toast {
            id,
            message: message.into(),
        });
        effects.push(Effect::ScheduleToastDismiss(id));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Msg {
    /// Open dialog from the toolbar, the drop zone or the shortcut.
    OpenRequested,
    DialogSettled(Envelope<DialogSelection>),
    /// A path pushed by the host or chosen by the user.
    LoadRequested(String),
    FileRead {
        ticket: LoadTicket,
        path: String,
        result: Envelope<FileContent>,
    },
    FileInfoReceived {
        ticket: LoadTicket,
        content: String,
        result: Envelope<FileRecord>,
    },
    Dropped(DroppedItem),
    Reset,
    Reload,
    Print,
    Export,
    CopyPath,
    Copied {
        ok: bool,
    },
    OpenModal(Modal),
    CloseModal,
    SettingChanged(SettingChange),
    SaveSettings,
    ResetSettings,
    ToggleTheme {
        prefers_dark: bool,
    },
    Shortcut(Shortcut),
    ToastExpired(u64),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    ReadFile {
        ticket: LoadTicket,
        path: String,
    },
    /// `content` rides along so it can come back in [`Msg::FileInfoReceived`].
    GetFileInfo {
        ticket: LoadTicket,
        path: String,
        content: String,
    },
    OpenDialog,
    PersistSettings(Settings),
    PersistTheme(Theme),
    CopyToClipboard(String),
    Print,
    Download {
        file_name: String,
        html: String,
    },
    ScheduleToastDismiss(u64),
}

pub fn update(
    mut state: ViewState,
    msg: Msg,
    renderer: &impl MarkdownRenderer,
) -> (ViewState, Vec<Effect>) {
    let mut effects = Vec::new();

    match msg {
        Msg::OpenRequested => effects.push(Effect::OpenDialog),

        Msg::DialogSettled(envelope) => {
            if let Envelope::Failure(error) = envelope {
                state.status = format!("Could not open file: {error}");
            }
        }

        Msg::LoadRequested(path) => {
            let ticket = state.issue_ticket();
            state.display = DisplayState::Loading;
            state.status = "Loading file...".to_string();
            effects.push(Effect::ReadFile { ticket, path });
        }

        Msg::FileRead {
            ticket,
            path,
            result,
        } => {
            if !state.is_active(ticket) {
                return (state, effects);
            }
            match result {
                Envelope::Success(FileContent { content }) => effects.push(Effect::GetFileInfo {
                    ticket,
                    path,
                    content,
                }),
                Envelope::Failure(error) if !error.is_empty() => state.fail_load(error),
                _ => state.fail_load(READ_FAILED),
            }
        }

        Msg::FileInfoReceived {
            ticket,
            content,
            result,
        } => {
            if !state.is_active(ticket) {
                return (state, effects);
            }
            let Envelope::Success(record) = result else {
                state.fail_load(INFO_FAILED);
                return (state, effects);
            };
            match renderer.render(&content) {
                Ok(html) => {
                    state.active_load = None;
                    state.current_file = Some(record);
                    state.display = DisplayState::Content { html };
                    state.status = "File loaded successfully".to_string();
                }
                Err(_) => state.fail_load(RENDER_FAILED),
            }
        }

        Msg::Dropped(item) => match intake::accept_drop(&item) {
            Ok(path) => return update(state, Msg::LoadRequested(path), renderer),
            Err(err) => state.fail_load(err.to_string()),
        },

        Msg::Reset => {
            state.active_load = None;
            state.current_file = None;
            state.display = DisplayState::Empty;
            state.status = READY.to_string();
        }

        Msg::Reload => {
            if let Some(path) = state.current_file.as_ref().map(|f| f.file_path.clone()) {
                return update(state, Msg::LoadRequested(path), renderer);
            }
        }

        Msg::Print => {
            if state.has_content() {
                effects.push(Effect::Print);
            }
        }

        Msg::Export => {
            if let DisplayState::Content { html } = &state.display {
                let file_name = state.current_file.as_ref().map(|f| f.file_name.as_str());
                let page = export::standalone_html(
                    &export::document_title(file_name),
                    html,
                    Highlighter::global().light_css(),
                );
                effects.push(Effect::Download {
                    file_name: export::download_name(file_name),
                    html: page,
                });
                state.toast("Document exported as HTML!", &mut effects);
            }
        }

        Msg::CopyPath => {
            if let Some(file) = &state.current_file {
                effects.push(Effect::CopyToClipboard(file.file_path.clone()));
            }
        }

        Msg::Copied { ok } => {
            let message = if ok {
                "File path copied to clipboard!"
            } else {
                "Failed to copy file path"
            };
            state.toast(message, &mut effects);
        }

        Msg::OpenModal(modal) => state.modal = Some(modal),
        Msg::CloseModal => state.modal = None,

        Msg::SettingChanged(change) => state.settings = state.settings.with(change),

        Msg::SaveSettings => {
            effects.push(Effect::PersistSettings(state.settings));
            state.modal = None;
            state.status = "Settings saved".to_string();
            state.toast("Settings saved successfully!", &mut effects);
        }

        Msg::ResetSettings => {
            state.settings = Settings::default();
            effects.push(Effect::PersistSettings(state.settings));
            state.status = "Settings reset to defaults".to_string();
            state.toast("Settings reset to defaults", &mut effects);
        }

        Msg::ToggleTheme { prefers_dark } => {
            let theme = state.settings.theme.toggled(prefers_dark);
            state.settings.theme = theme;
            effects.push(Effect::PersistTheme(theme));
            state.status = format!("Theme switched to {theme}");
            state.toast(format!("Theme switched to {theme} mode"), &mut effects);
        }

        Msg::Shortcut(shortcut) => {
            let msg = match shortcut {
                Shortcut::Open => Msg::OpenRequested,
                Shortcut::Print => Msg::Print,
                Shortcut::Export => Msg::Export,
                Shortcut::Escape if state.modal.is_some() => Msg::CloseModal,
                Shortcut::Escape => Msg::Reset,
            };
            return update(state, msg, renderer);
        }

        Msg::ToastExpired(id) => {
            if state.toast.as_ref().is_some_and(|toast| toast.id == id) {
                state.toast = None;
            }
        }
    }

    (state, effects)
}
