use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use leptos::ev;
use leptos::logging::{error, log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use md_viewer_protocol::{Channel, FileRecord};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::bridge::Bridge;
use crate::dropzone;
use crate::format;
use crate::highlight::Highlighter;
use crate::keys::{self, KeyInput};
use crate::render::MarkdownPipeline;
use crate::settings::{self, FontSize, LineHeight, LocalStore, SettingChange, Settings, Theme};
use crate::state::{update, DisplayState, Effect as SideEffect, Modal, Msg, ViewState, TOAST_MILLIS};

fn prefers_dark() -> bool {
    window()
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false)
}

/// Feeds `msg` through [`update`] and carries out whatever it asks for.
pub fn dispatch(state: RwSignal<ViewState>, msg: Msg) {
    let effects = state
        .try_update(|current| {
            let (next, effects) = update(std::mem::take(current), msg, &MarkdownPipeline);
            *current = next;
            effects
        })
        .unwrap_or_default();
    for effect in effects {
        run_effect(state, effect);
    }
}

fn run_effect(state: RwSignal<ViewState>, effect: SideEffect) {
    let bridge = Bridge;
    match effect {
        SideEffect::ReadFile { ticket, path } => spawn_local(async move {
            log!("reading {path}");
            let result = bridge.read_file(&path).await;
            dispatch(state, Msg::FileRead { ticket, path, result });
        }),
        SideEffect::GetFileInfo {
            ticket,
            path,
            content,
        } => spawn_local(async move {
            let result = bridge.get_file_info(&path).await;
            dispatch(
                state,
                Msg::FileInfoReceived {
                    ticket,
                    content,
                    result,
                },
            );
        }),
        SideEffect::OpenDialog => spawn_local(async move {
            let result = bridge.trigger_file_dialog().await;
            dispatch(state, Msg::DialogSettled(result));
        }),
        SideEffect::PersistSettings(settings) => {
            if let Err(err) = settings::save(&LocalStore, &settings) {
                warn!("{err}");
            }
        }
        SideEffect::PersistTheme(theme) => {
            if let Err(err) = settings::save_theme(&LocalStore, theme) {
                warn!("{err}");
            }
        }
        SideEffect::CopyToClipboard(text) => spawn_local(async move {
            let ok = match write_clipboard(&text).await {
                Ok(()) => true,
                Err(err) => {
                    warn!("clipboard write failed: {err:?}");
                    false
                }
            };
            dispatch(state, Msg::Copied { ok });
        }),
        SideEffect::Print => {
            if let Err(err) = window().print() {
                error!("print failed: {err:?}");
            }
        }
        SideEffect::Download { file_name, html } => {
            if let Err(err) = download(&file_name, &html) {
                error!("export of {file_name} failed: {err:?}");
            }
        }
        SideEffect::ScheduleToastDismiss(id) => set_timeout(
            move || dispatch(state, Msg::ToastExpired(id)),
            Duration::from_millis(TOAST_MILLIS.into()),
        ),
    }
}

async fn write_clipboard(text: &str) -> Result<(), JsValue> {
    let clipboard = js_sys::Reflect::get(&window().navigator(), &JsValue::from_str("clipboard"))?;
    let write_text = js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText"))?
        .dyn_into::<js_sys::Function>()?;
    let promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))?
        .dyn_into::<js_sys::Promise>()?;
    wasm_bindgen_futures::JsFuture::from(promise).await?;
    Ok(())
}

fn download(file_name: &str, html: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(html));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("text/html");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let document = document();
    let anchor = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    web_sys::Url::revoke_object_url(&url)
}

fn apply_settings(settings: Settings) {
    let Some(root) = document().document_element() else {
        return;
    };
    let theme = settings.theme.resolve(prefers_dark());
    if let Err(err) = root.set_attribute("data-theme", theme.as_str()) {
        warn!("could not set theme: {err:?}");
    }
    if let Some(root) = root.dyn_ref::<web_sys::HtmlElement>() {
        let style = root.style();
        let variables = [
            ("--base-font-size", settings.font_size.css_value()),
            ("--base-line-height", settings.line_height.css_value()),
        ];
        for (name, value) in variables {
            if let Err(err) = style.set_property(name, value) {
                warn!("could not set {name}: {err:?}");
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn setting_select<T>(
    id: &'static str,
    options: &'static [T],
    current: impl Fn() -> T + Send + Sync + 'static,
    change: fn(T) -> SettingChange,
    state: RwSignal<ViewState>,
) -> impl IntoView
where
    T: Copy + Display + FromStr + Send + Sync + 'static,
    T::Err: Display,
{
    view! {
        <select
            id=id
            style="padding: 0.5rem; border-radius: 4px; border: 1px solid var(--border-color); background: var(--bg-secondary); color: var(--text-primary);"
            prop:value=move || current().to_string()
            on:change=move |e| {
                match event_target_value(&e).parse::<T>() {
                    Ok(value) => dispatch(state, Msg::SettingChanged(change(value))),
                    Err(err) => warn!("{err}"),
                }
            }
        >
            {options
                .iter()
                .map(|option| {
                    let value = option.to_string();
                    let label = capitalize(&value);
                    view! { <option value=value>{label}</option> }
                })
                .collect_view()}
        </select>
    }
}

fn settings_modal(state: RwSignal<ViewState>) -> impl IntoView {
    let settings = move || state.with(|s| s.settings);
    view! {
        <div class="modal-backdrop">
            <div class="modal" role="dialog" aria-labelledby="settings-title">
                <h2 id="settings-title" style="margin-top: 0;">"Settings"</h2>
                <div style="display: flex; flex-direction: column; gap: 1rem;">
                    <label for="theme-select">"Theme"</label>
                    {setting_select("theme-select", Theme::ALL, move || settings().theme, SettingChange::Theme, state)}
                    <label for="font-size-select">"Font Size"</label>
                    {setting_select("font-size-select", FontSize::ALL, move || settings().font_size, SettingChange::FontSize, state)}
                    <label for="line-height-select">"Line Height"</label>
                    {setting_select("line-height-select", LineHeight::ALL, move || settings().line_height, SettingChange::LineHeight, state)}
                </div>
                <div class="modal-actions">
                    <button on:click=move |_| dispatch(state, Msg::ResetSettings)>"Reset to Defaults"</button>
                    <button on:click=move |_| dispatch(state, Msg::CloseModal)>"Cancel"</button>
                    <button class="primary" on:click=move |_| dispatch(state, Msg::SaveSettings)>"Save"</button>
                </div>
            </div>
        </div>
    }
}

fn help_modal(state: RwSignal<ViewState>) -> impl IntoView {
    let shortcuts = [
        ("Ctrl/Cmd + O", "Open a markdown file"),
        ("Ctrl/Cmd + P", "Print the document"),
        ("Ctrl/Cmd + S", "Export as HTML"),
        ("Esc", "Close this dialog or the current file"),
    ];
    view! {
        <div class="modal-backdrop">
            <div class="modal" role="dialog" aria-labelledby="help-title">
                <h2 id="help-title" style="margin-top: 0;">"Keyboard Shortcuts"</h2>
                <table class="shortcut-table">
                    {shortcuts
                        .into_iter()
                        .map(|(keys, action)| view! {
                            <tr><td><kbd>{keys}</kbd></td><td>{action}</td></tr>
                        })
                        .collect_view()}
                </table>
                <p style="color: var(--text-muted); font-size: 0.9em;">
                    "Drop a .md, .markdown or .txt file anywhere on the window to open it."
                </p>
                <div class="modal-actions">
                    <button class="primary" on:click=move |_| dispatch(state, Msg::CloseModal)>"Close"</button>
                </div>
            </div>
        </div>
    }
}

fn file_info_bar(state: RwSignal<ViewState>, file: FileRecord) -> impl IntoView {
    view! {
        <div class="file-info">
            <div style="display: flex; flex-direction: column; min-width: 0;">
                <span class="file-name">{file.file_name}</span>
                <span class="file-meta">
                    {format::file_size(file.file_size)}
                    " · "
                    {format::last_modified(&file.last_modified)}
                </span>
                <span class="file-path" title=file.file_path.clone()>{file.file_path.clone()}</span>
            </div>
            <div class="file-actions">
                <button title="Copy path" on:click=move |_| dispatch(state, Msg::CopyPath)>"Copy Path"</button>
                <button title="Reload" on:click=move |_| dispatch(state, Msg::Reload)>"Reload"</button>
                <button title="Print (Ctrl/Cmd+P)" on:click=move |_| dispatch(state, Msg::Print)>"Print"</button>
                <button title="Export as HTML (Ctrl/Cmd+S)" on:click=move |_| dispatch(state, Msg::Export)>"Export"</button>
                <button title="Close (Esc)" on:click=move |_| dispatch(state, Msg::Reset)>"Close"</button>
            </div>
        </div>
    }
}

fn drop_zone(state: RwSignal<ViewState>, hovering: RwSignal<bool>) -> impl IntoView {
    view! {
        <div
            class=move || if hovering.get() { "drop-zone drag-over" } else { "drop-zone" }
            on:click=move |_| dispatch(state, Msg::OpenRequested)
        >
            <h2>"Drop a markdown file here"</h2>
            <p>"or click to browse (.md, .markdown, .txt)"</p>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let state = RwSignal::new(ViewState::new(settings::load(&LocalStore)));
    let hovering = RwSignal::new(false);

    let display = Memo::new(move |_| state.with(|s| s.display.clone()));
    let current_file = Memo::new(move |_| state.with(|s| s.current_file.clone()));
    let applied_settings = Memo::new(move |_| state.with(|s| s.settings));
    let modal = Memo::new(move |_| state.with(|s| s.modal));

    Effect::new(move |_| apply_settings(applied_settings.get()));

    spawn_local(async move {
        Bridge
            .on_file_opened(move |path| dispatch(state, Msg::LoadRequested(path)))
            .await;
    });

    dropzone::install(hovering, move |paths| match dropzone::first_item(&paths) {
        Some(item) => dispatch(state, Msg::Dropped(item)),
        None => warn!("drop carried no file paths"),
    });

    let on_key = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
        if let Some(shortcut) = keys::resolve(&KeyInput::from_event(&e)) {
            e.prevent_default();
            dispatch(state, Msg::Shortcut(shortcut));
        }
    });
    if let Err(err) =
        document().add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())
    {
        error!("keyboard shortcuts unavailable: {err:?}");
    }
    on_key.forget();

    let _ = window_event_listener(ev::beforeunload, |_| {
        Bridge.remove_all_listeners(Channel::FileOpened.name());
    });

    let theme_css = Highlighter::global().theme_css();

    let theme_icon = move || {
        if applied_settings.get().theme.resolve(prefers_dark()) == Theme::Dark {
            "☀"
        } else {
            "☾"
        }
    };

    let viewer = move || match display.get() {
        DisplayState::Empty => drop_zone(state, hovering).into_any(),
        DisplayState::Loading => view! {
            <div class="loading">
                <div class="spinner"></div>
                <p>"Loading..."</p>
            </div>
        }
        .into_any(),
        DisplayState::Error { message } => view! {
            <div class="error">
                <h2>"Something went wrong"</h2>
                <p>{message}</p>
                <button class="primary" on:click=move |_| dispatch(state, Msg::OpenRequested)>"Open Another File"</button>
            </div>
        }
        .into_any(),
        DisplayState::Content { html } => view! {
            <div style="display: flex; flex-direction: column; flex: 1; min-height: 0;">
                {move || current_file.get().map(|file| file_info_bar(state, file))}
                <article class="markdown-body" inner_html=html></article>
            </div>
        }
        .into_any(),
    };

    view! {
        <style>{theme_css}</style>
        <div class="app-layout">
            <header class="toolbar">
                <span class="app-title">"Markdown Viewer"</span>
                <div class="toolbar-actions">
                    <button title="Open File (Ctrl/Cmd+O)" on:click=move |_| dispatch(state, Msg::OpenRequested)>"Open File"</button>
                    <button
                        title="Toggle theme"
                        on:click=move |_| dispatch(state, Msg::ToggleTheme { prefers_dark: prefers_dark() })
                    >
                        {theme_icon}
                    </button>
                    <button title="Settings" on:click=move |_| dispatch(state, Msg::OpenModal(Modal::Settings))>"⚙"</button>
                    <button title="Keyboard shortcuts" on:click=move |_| dispatch(state, Msg::OpenModal(Modal::Help))>"?"</button>
                </div>
            </header>
            <main class="viewer">{viewer}</main>
            <footer class="status-bar">
                <span>{move || state.with(|s| s.status.clone())}</span>
            </footer>
            {move || {
                modal.get().map(|modal| match modal {
                    Modal::Settings => settings_modal(state).into_any(),
                    Modal::Help => help_modal(state).into_any(),
                })
            }}
            {move || {
                state
                    .with(|s| s.toast.clone())
                    .map(|toast| view! { <div class="toast">{toast.message}</div> })
            }}
        </div>
    }
}
