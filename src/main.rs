mod app;
mod bridge;
mod dropzone;
mod export;
mod format;
mod highlight;
mod intake;
mod keys;
mod render;
mod settings;
mod state;

use app::*;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(|| {
        view! {
            <App/>
        }
    })
}
