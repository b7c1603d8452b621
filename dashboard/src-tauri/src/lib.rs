use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
use tauri::tray::TrayIconBuilder;
use tauri::Manager;

/// Returns the control surface's HTTP port (used by the frontend to
/// construct API URLs), mirroring the teacher's `get_kernel_port`.
#[tauri::command]
fn get_control_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8787)
}

/// Pause the Evolver's periodic tick (spec §4.12 dashboard control).
#[tauri::command]
async fn pause(port: u16) -> Result<serde_json::Value, String> {
    control_request(port, "pause").await
}

/// Resume the Evolver's periodic tick.
#[tauri::command]
async fn resume(port: u16) -> Result<serde_json::Value, String> {
    control_request(port, "resume").await
}

/// Force one generation cycle synchronously, regardless of running state.
#[tauri::command]
async fn run_once(port: u16) -> Result<serde_json::Value, String> {
    control_request(port, "run-once").await
}

/// Poll the Evolver/Budget/Router status snapshot.
#[tauri::command]
async fn status(port: u16) -> Result<serde_json::Value, String> {
    reqwest::get(format!("http://127.0.0.1:{port}/api/status"))
        .await
        .map_err(|e| e.to_string())?
        .json::<serde_json::Value>()
        .await
        .map_err(|e| e.to_string())
}

async fn control_request(port: u16, action: &str) -> Result<serde_json::Value, String> {
    let client = reqwest::Client::new();
    let admin_key = std::env::var("EVO_ADMIN_API_KEY").unwrap_or_default();
    client
        .post(format!("http://127.0.0.1:{port}/api/control/{action}"))
        .header("X-API-Key", admin_key)
        .send()
        .await
        .map_err(|e| e.to_string())?
        .json::<serde_json::Value>()
        .await
        .map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Desktop mode: bind the control surface to loopback only.
    std::env::set_var("EVO_BIND_ADDRESS", "127.0.0.1");

    let existing_cors = std::env::var("EVO_CORS_ORIGINS").unwrap_or_default();
    let tauri_origins = "tauri://localhost,http://tauri.localhost";
    let combined = if existing_cors.is_empty() {
        format!("http://localhost:1420,http://127.0.0.1:1420,{}", tauri_origins)
    } else {
        format!("{},{}", existing_cors, tauri_origins)
    };
    std::env::set_var("EVO_CORS_ORIGINS", combined);

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_notification::init())
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_window_state::Builder::new().build())
        .invoke_handler(tauri::generate_handler![
            get_control_port,
            status,
            pause,
            resume,
            run_once
        ])
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            // --- System Tray ---
            let status_item =
                MenuItem::with_id(app, "status", "Evo: Online", false, None::<&str>)?;
            let show_item = MenuItem::with_id(app, "show", "Show Dashboard", true, None::<&str>)?;
            let quit_item = MenuItem::with_id(app, "quit", "Quit Evo", true, None::<&str>)?;

            let tray_menu = Menu::with_items(
                app,
                &[
                    &status_item,
                    &PredefinedMenuItem::separator(app)?,
                    &show_item,
                    &PredefinedMenuItem::separator(app)?,
                    &quit_item,
                ],
            )?;

            TrayIconBuilder::new()
                .icon(app.default_window_icon().unwrap().clone())
                .tooltip("Evo System")
                .menu(&tray_menu)
                .show_menu_on_left_click(true)
                .on_menu_event(|app, event| match event.id.as_ref() {
                    "show" => {
                        if let Some(window) = app.get_webview_window("main") {
                            let _ = window.show();
                            let _ = window.set_focus();
                        }
                    }
                    "quit" => {
                        app.exit(0);
                    }
                    _ => {}
                })
                .build(app)?;

            // --- Launch the Evo kernel (evolution pipeline + control surface) ---
            tauri::async_runtime::spawn(async move {
                dotenvy::dotenv().ok();
                if let Err(e) = evo_core::run_kernel().await {
                    eprintln!("Failed to start Evo kernel: {}", e);
                }
            });

            Ok(())
        })
        // Intercept window close: minimize to tray instead of quitting.
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                api.prevent_close();
                let _ = window.hide();
            }
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|_app_handle, _event| {});
}
