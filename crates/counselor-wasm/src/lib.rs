use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod app;
mod backend;
mod dom;
mod storage;
mod utils;

pub use backend::FetchChatBackend;
pub use storage::LocalStorageStore;

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    wasm_logger::init(wasm_logger::Config::default());

    log::info!("Counselor WASM initialized");
}

/// Mount the chat UI against the default backend
#[wasm_bindgen]
pub fn start_app() -> Result<(), JsValue> {
    start_app_with_backend(counselor_types::DEFAULT_BACKEND_URL)
}

/// Mount the chat UI against the backend at `base_url`
#[wasm_bindgen]
pub fn start_app_with_backend(base_url: &str) -> Result<(), JsValue> {
    log::info!("Starting counselor UI against {}", base_url);
    app::CounselorApp::new(base_url)?.start()
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
