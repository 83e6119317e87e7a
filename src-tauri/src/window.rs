//! Main window lifecycle: `Initializing -> Ready -> Closed`.

use std::sync::{Mutex, PoisonError};

use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, Manager, Runtime, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;

pub const MAIN_WINDOW: &str = "main";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WindowPhase {
    #[default]
    Initializing,
    Ready,
    Closed,
}

impl WindowPhase {
    /// First paint finished.
    pub fn painted(self) -> Self {
        match self {
            WindowPhase::Initializing => WindowPhase::Ready,
            other => other,
        }
    }

    pub fn closed(self) -> Self {
        WindowPhase::Closed
    }

    /// Only a painted window can parent the file picker and receive pushes.
    pub fn is_ready(self) -> bool {
        self == WindowPhase::Ready
    }

    /// A fresh window was built after the previous one closed (macOS re-activation).
    pub fn reopened(self) -> Self {
        match self {
            WindowPhase::Closed => WindowPhase::Initializing,
            other => other,
        }
    }
}

/// Managed state holding the phase of the main window.
#[derive(Debug, Default)]
pub struct WindowTracker(Mutex<WindowPhase>);

impl WindowTracker {
    pub fn phase(&self) -> WindowPhase {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn advance(&self, transition: impl FnOnce(WindowPhase) -> WindowPhase) -> WindowPhase {
        let mut phase = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let next = transition(*phase);
        if next == *phase {
            log::debug!("main window stays {:?}", *phase);
        } else {
            log::info!("main window {:?} -> {:?}", *phase, next);
        }
        *phase = next;
        next
    }
}

/// Command-line switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub dev_tools: bool,
}

impl LaunchOptions {
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            dev_tools: args.into_iter().any(|arg| arg.as_ref() == "--dev"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Navigation {
    Internal,
    External,
    Blocked,
}

fn classify_navigation(url: &Url) -> Navigation {
    match url.scheme() {
        "tauri" | "about" => Navigation::Internal,
        "http" | "https" => match url.host_str() {
            Some("localhost") | Some("tauri.localhost") => Navigation::Internal,
            _ => Navigation::External,
        },
        "mailto" => Navigation::External,
        _ => Navigation::Blocked,
    }
}

/// Builds the main window hidden; it is shown once the page has painted.
pub fn create_main_window<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<WebviewWindow<R>> {
    log::info!("creating main window");
    let launch = *app.state::<LaunchOptions>();
    let opener = app.clone();

    let window = WebviewWindowBuilder::new(app, MAIN_WINDOW, WebviewUrl::default())
        .title("Markdown Viewer")
        .inner_size(1200.0, 800.0)
        .visible(false)
        .on_navigation(move |url| match classify_navigation(url) {
            Navigation::Internal => true,
            Navigation::External => {
                log::info!("opening {url} in the system browser");
                if let Err(err) = opener.opener().open_url(url.as_str(), None::<&str>) {
                    log::warn!("could not open {url}: {err}");
                }
                false
            }
            Navigation::Blocked => {
                log::warn!("blocked navigation to {url}");
                false
            }
        })
        .on_page_load(|window, payload| {
            if matches!(payload.event(), PageLoadEvent::Finished) {
                window.state::<WindowTracker>().advance(WindowPhase::painted);
                if let Err(err) = window.show() {
                    log::error!("could not show main window: {err}");
                }
            }
        })
        .build()?;

    if launch.dev_tools {
        log::info!("opening devtools");
        window.open_devtools();
    }
    Ok(window)
}

/// Recreates the main window after it was closed, if the app is still running.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub fn reopen_main_window<R: Runtime>(app: &AppHandle<R>) {
    let tracker = app.state::<WindowTracker>();
    if tracker.phase() != WindowPhase::Closed {
        return;
    }
    tracker.advance(WindowPhase::reopened);
    if let Err(err) = create_main_window(app) {
        log::error!("could not recreate main window: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_lifecycle() {
        let tracker = WindowTracker::default();
        assert_eq!(tracker.phase(), WindowPhase::Initializing);
        assert_eq!(tracker.advance(WindowPhase::painted), WindowPhase::Ready);
        assert_eq!(tracker.advance(WindowPhase::painted), WindowPhase::Ready);
        assert_eq!(tracker.advance(WindowPhase::closed), WindowPhase::Closed);
        assert_eq!(tracker.advance(WindowPhase::painted), WindowPhase::Closed);
        assert_eq!(tracker.advance(WindowPhase::reopened), WindowPhase::Initializing);
    }

    #[test]
    fn reopen_only_applies_after_close() {
        assert_eq!(WindowPhase::Ready.reopened(), WindowPhase::Ready);
        assert_eq!(WindowPhase::Initializing.reopened(), WindowPhase::Initializing);
    }

    #[test]
    fn only_a_painted_window_is_ready() {
        let tracker = WindowTracker::default();
        assert!(!tracker.phase().is_ready());
        tracker.advance(WindowPhase::painted);
        assert!(tracker.phase().is_ready());
        tracker.advance(WindowPhase::closed);
        assert!(!tracker.phase().is_ready());
    }

    #[test]
    fn dev_flag_enables_devtools() {
        assert!(LaunchOptions::from_args(["--dev"]).dev_tools);
        assert!(!LaunchOptions::from_args(["notes.md", "--devel"]).dev_tools);
        assert_eq!(
            LaunchOptions::from_args(Vec::<String>::new()),
            LaunchOptions::default()
        );
    }

    #[test]
    fn external_links_leave_the_webview() {
        let classify = |s: &str| classify_navigation(&Url::parse(s).unwrap());
        assert_eq!(classify("tauri://localhost/index.html"), Navigation::Internal);
        assert_eq!(classify("http://tauri.localhost/"), Navigation::Internal);
        assert_eq!(classify("http://localhost:1420/"), Navigation::Internal);
        assert_eq!(classify("https://example.com/docs"), Navigation::External);
        assert_eq!(classify("mailto:someone@example.com"), Navigation::External);
        assert_eq!(classify("file:///etc/passwd"), Navigation::Blocked);
    }
}
