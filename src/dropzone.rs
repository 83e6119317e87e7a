//! Files dragged onto the window.
//!
//! The webview swallows native drops and reports them as `tauri://drag-*`
//! events carrying filesystem paths.

use leptos::logging::error;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::bridge::subscribe;
use crate::intake::DroppedItem;

const DRAG_ENTER: &str = "tauri://drag-enter";
const DRAG_OVER: &str = "tauri://drag-over";
const DRAG_LEAVE: &str = "tauri://drag-leave";
const DRAG_DROP: &str = "tauri://drag-drop";

#[derive(Debug, Default, Deserialize)]
struct DropPayload {
    #[serde(default)]
    paths: Vec<String>,
}

/// Only the first of several dropped files is opened.
pub fn first_item(paths: &[String]) -> Option<DroppedItem> {
    paths.first().map(|path| DroppedItem::from_path(path))
}

/// Keeps `hovering` in sync with the drag state and hands every drop to
/// `on_drop`. The subscriptions live as long as the page.
pub fn install(hovering: RwSignal<bool>, on_drop: impl Fn(Vec<String>) + 'static) {
    spawn_local(async move {
        for (event, active) in [(DRAG_ENTER, true), (DRAG_OVER, true), (DRAG_LEAVE, false)] {
            match subscribe::<IgnoredAny>(event, move |_| hovering.set(active)).await {
                Ok((_, handler)) => handler.forget(),
                Err(err) => error!("could not listen on {event}: {err:?}"),
            }
        }

        let dropped = move |payload: DropPayload| {
            hovering.set(false);
            on_drop(payload.paths);
        };
        match subscribe::<DropPayload>(DRAG_DROP, dropped).await {
            Ok((_, handler)) => handler.forget(),
            Err(err) => error!("could not listen on {DRAG_DROP}: {err:?}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_path_wins() {
        let paths = vec!["/a/one.md".to_string(), "/a/two.md".to_string()];
        let item = first_item(&paths).unwrap();
        assert_eq!(item.name, "one.md");
        assert_eq!(item.path.as_deref(), Some("/a/one.md"));
    }

    #[test]
    fn empty_drop_yields_nothing() {
        assert_eq!(first_item(&[]), None);
    }
}
