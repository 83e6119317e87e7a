fn main() {
    // Only these commands get generated `allow-*` permissions; the capability
    // file grants them to the main window and nothing else is invokable.
    tauri_build::try_build(tauri_build::Attributes::new().app_manifest(
        tauri_build::AppManifest::new().commands(&["read_file", "get_file_info", "trigger_file_dialog"]),
    ))
    .expect("failed to run tauri-build");
}
