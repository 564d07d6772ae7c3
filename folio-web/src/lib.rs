/// Folio Web - browser bindings for the portfolio site
///
/// Exposes the tilt effect and the contact form to JavaScript. All state
/// handling lives in folio-core; this crate only reads the DOM, schedules
/// frames and timers, and writes styles back.

use wasm_bindgen::prelude::*;

pub mod contact;
pub mod tilt;

pub use contact::{ContactFormBinding, HttpContactTransport};
pub use tilt::TiltBinding;

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    Ok(())
}
