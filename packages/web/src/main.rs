//! Tradepost web frontend.
//!
//! Build and serve with Trunk:
//!
//! ```bash
//! trunk serve
//! ```

use wasm_bindgen_futures::spawn_local;

fn main() {
    tracing_wasm::set_as_global_default();

    spawn_local(async {
        match web::app::start().await {
            Ok(app) => {
                // chrome and router listeners live for the page lifetime
                std::mem::forget(app);
            }
            Err(err) => {
                tracing::error!("application failed to start: {err:#}");
            }
        }
    });
}
