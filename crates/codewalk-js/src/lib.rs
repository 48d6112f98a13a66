//! WASM bindings for the codewalk widget.
//!
//! ```js
//! import init, { mount } from "codewalk-js";
//!
//! await init();
//! const walk = mount(document.getElementById("walk"), catalog, { copyAckMs: 1500 });
//! // ...
//! walk.unmount();
//! ```

mod walk;

pub use walk::*;

use tracing::Level;
use tracing::subscriber::set_global_default;
use tracing_subscriber::Registry;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    // Per-frame tracker decisions are too chatty for the console.
    let filter = EnvFilter::new("debug,codewalk::tracker=info");

    let reg = Registry::default().with(filter).with(wasm_layer);

    // A host page may already have installed a subscriber.
    let _ = set_global_default(reg);
}
