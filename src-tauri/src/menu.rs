use tauri::menu::{Menu, MenuBuilder, MenuEvent, MenuItemBuilder, SubmenuBuilder};
use tauri::{AppHandle, Runtime};

use crate::dialog;

pub const OPEN_FILE: &str = "open-file";

pub fn build<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<Menu<R>> {
    let open_file = MenuItemBuilder::with_id(OPEN_FILE, "Open File")
        .accelerator("CmdOrCtrl+O")
        .build(app)?;

    let file = SubmenuBuilder::new(app, "File")
        .item(&open_file)
        .separator()
        .quit()
        .build()?;
    let edit = SubmenuBuilder::new(app, "Edit")
        .undo()
        .redo()
        .separator()
        .cut()
        .copy()
        .paste()
        .select_all()
        .build()?;
    let view = SubmenuBuilder::new(app, "View").fullscreen().build()?;
    let window = SubmenuBuilder::new(app, "Window")
        .minimize()
        .close_window()
        .build()?;

    let mut menu = MenuBuilder::new(app);
    #[cfg(target_os = "macos")]
    {
        let app_menu = SubmenuBuilder::new(app, app.package_info().name.clone())
            .about(None)
            .separator()
            .services()
            .separator()
            .hide()
            .hide_others()
            .show_all()
            .separator()
            .quit()
            .build()?;
        menu = menu.item(&app_menu);
    }
    menu = menu.items(&[&file, &edit, &view, &window]);
    menu.build()
}

/// Menu actions are fire-and-forget: the dialog result only reaches the UI
/// through the `file-opened` push.
pub fn handle_event<R: Runtime>(app: &AppHandle<R>, event: MenuEvent) {
    if event.id().as_ref() != OPEN_FILE {
        return;
    }
    log::info!("open file requested from menu");
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let outcome = dialog::open_and_notify(&app).await;
        log::debug!("menu file dialog settled: {outcome:?}");
    });
}
