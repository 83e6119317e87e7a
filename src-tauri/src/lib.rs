mod commands;
mod dialog;
mod error;
mod files;
mod menu;
mod window;

use tauri::{Manager, RunEvent, WindowEvent};
use tauri_plugin_log::{Target, TargetKind};

use window::{LaunchOptions, WindowPhase, WindowTracker, MAIN_WINDOW};

fn log_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let launch = LaunchOptions::from_args(std::env::args().skip(1));

    let log_plugin = tauri_plugin_log::Builder::new()
        .level(log_level())
        .target(Target::new(TargetKind::Stdout))
        .build();

    let app = tauri::Builder::default()
        .plugin(log_plugin)
        .plugin(tauri_plugin_opener::init())
        .manage(launch)
        .manage(WindowTracker::default())
        .setup(|app| {
            log::info!("app is ready, creating window and menu");
            let handle = app.handle();
            let menu = menu::build(handle)?;
            app.set_menu(menu)?;
            window::create_main_window(handle)?;
            Ok(())
        })
        .on_menu_event(|app, event| menu::handle_event(app, event))
        .on_window_event(|window, event| {
            if window.label() == MAIN_WINDOW && matches!(event, WindowEvent::Destroyed) {
                window.state::<WindowTracker>().advance(WindowPhase::closed);
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::read_file,
            commands::get_file_info,
            commands::trigger_file_dialog
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app, event| {
        #[cfg(not(target_os = "macos"))]
        let _ = app;
        match event {
            // On macOS the process outlives its last window.
            #[cfg(target_os = "macos")]
            RunEvent::ExitRequested { api, code: None, .. } => {
                log::info!("all windows closed, staying alive");
                api.prevent_exit();
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen {
                has_visible_windows: false,
                ..
            } => {
                log::info!("app activated without windows");
                window::reopen_main_window(app);
            }
            RunEvent::Exit => log::info!("app is quitting"),
            _ => {}
        }
    });
}
