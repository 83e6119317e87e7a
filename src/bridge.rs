//! The only door from the UI to the host.
//!
//! Three commands and one push channel, all named in `md_viewer_protocol`.
//! Everything comes back as an [`Envelope`]; a rejected `invoke` promise or an
//! undecodable reply is folded into `Envelope::Failure`.

use std::cell::RefCell;
use std::collections::HashMap;

use leptos::logging::{error, log, warn};
use md_viewer_protocol::{
    Channel, Command, DialogSelection, Envelope, FileContent, FileRecord, PathArgs,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["window", "__TAURI__", "core"], catch)]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__TAURI__", "event"], catch)]
    async fn listen(
        event: &str,
        handler: &Closure<dyn FnMut(JsValue)>,
    ) -> Result<JsValue, JsValue>;
}

/// Shape of every event delivered by `listen`.
#[derive(Deserialize)]
struct EventMessage<T> {
    payload: T,
}

struct Listener {
    unlisten: js_sys::Function,
    _handler: Closure<dyn FnMut(JsValue)>,
}

thread_local! {
    static LISTENERS: RefCell<HashMap<Channel, Vec<Listener>>> = RefCell::new(HashMap::new());
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn to_args<A: Serialize>(command: Command, args: &A) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(args)
        .map_err(|err| format!("could not encode {} arguments: {err}", command.name()))
}

async fn call<T: DeserializeOwned>(command: Command, args: JsValue) -> Envelope<T> {
    match invoke(command.name(), args).await {
        Ok(reply) => serde_wasm_bindgen::from_value(reply).unwrap_or_else(|err| {
            error!("{}: undecodable reply: {err}", command.name());
            Envelope::failure(format!("Invalid response from {}", command.name()))
        }),
        Err(rejection) => {
            let message = describe(&rejection);
            error!("{} rejected: {message}", command.name());
            Envelope::Failure(message)
        }
    }
}

async fn call_with_path<T: DeserializeOwned>(command: Command, path: &str) -> Envelope<T> {
    match to_args(command, &PathArgs { path }) {
        Ok(args) => call(command, args).await,
        Err(message) => Envelope::Failure(message),
    }
}

/// Subscribes `handler` to a raw webview event and returns its unlisten function.
pub(crate) async fn subscribe<T: DeserializeOwned + 'static>(
    event: &'static str,
    mut handler: impl FnMut(T) + 'static,
) -> Result<(js_sys::Function, Closure<dyn FnMut(JsValue)>), JsValue> {
    let closure = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
        match serde_wasm_bindgen::from_value::<EventMessage<T>>(raw) {
            Ok(message) => handler(message.payload),
            Err(err) => warn!("{event}: dropping malformed payload: {err}"),
        }
    });
    let unlisten = listen(event, &closure).await?.dyn_into::<js_sys::Function>()?;
    Ok((unlisten, closure))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Bridge;

impl Bridge {
    pub async fn read_file(&self, path: &str) -> Envelope<FileContent> {
        call_with_path(Command::ReadFile, path).await
    }

    pub async fn get_file_info(&self, path: &str) -> Envelope<FileRecord> {
        call_with_path(Command::GetFileInfo, path).await
    }

    /// Opens the host's file picker. An accepted pick arrives through
    /// [`Bridge::on_file_opened`], not in the returned envelope.
    pub async fn trigger_file_dialog(&self) -> Envelope<DialogSelection> {
        call(Command::TriggerFileDialog, JsValue::NULL).await
    }

    pub async fn on_file_opened(&self, handler: impl FnMut(String) + 'static) {
        let channel = Channel::FileOpened;
        match subscribe::<String>(channel.name(), handler).await {
            Ok((unlisten, handler)) => LISTENERS.with(|listeners| {
                listeners.borrow_mut().entry(channel).or_default().push(Listener {
                    unlisten,
                    _handler: handler,
                });
            }),
            Err(err) => error!("could not listen on {}: {}", channel.name(), describe(&err)),
        }
    }

    /// Drops every handler registered on `name`. Names outside the channel
    /// list are refused.
    pub fn remove_all_listeners(&self, name: &str) {
        let Some(channel) = Channel::from_name(name) else {
            warn!("refusing to remove listeners of unknown channel {name:?}");
            return;
        };
        let removed = LISTENERS.with(|listeners| listeners.borrow_mut().remove(&channel));
        for listener in removed.unwrap_or_default() {
            if let Err(err) = listener.unlisten.call0(&JsValue::NULL) {
                warn!("unlisten {name} failed: {}", describe(&err));
            }
        }
        log!("removed listeners of {name}");
    }
}
