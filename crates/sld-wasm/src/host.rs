//! Browser-side [`EditorHost`]: JS callbacks, `window.confirm` and an
//! anchor-click download.

use js_sys::Function;
use serde::Serialize;
use sld_core::{Edge, Node};
use sld_editor::EditorHost;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlAnchorElement;

/// Callbacks registered by the page. Each receives a single argument:
/// JSON text for the change notifications, the `data:` URL for exports.
#[derive(Default)]
pub struct JsHost {
    pub on_nodes_change: Option<Function>,
    pub on_edges_change: Option<Function>,
    pub on_image_export: Option<Function>,
}

fn call(callback: &Option<Function>, arg: &str) {
    let Some(f) = callback else {
        return;
    };
    if let Err(err) = f.call1(&JsValue::NULL, &JsValue::from_str(arg)) {
        log::error!("host callback threw: {err:?}");
    }
}

fn call_json<T: Serialize + ?Sized>(callback: &Option<Function>, value: &T) {
    if callback.is_none() {
        return;
    }
    match serde_json::to_string(value) {
        Ok(json) => call(callback, &json),
        Err(err) => log::error!("cannot serialize host notification: {err}"),
    }
}

impl EditorHost for JsHost {
    fn nodes_changed(&mut self, nodes: &[Node]) {
        call_json(&self.on_nodes_change, nodes);
    }

    fn edges_changed(&mut self, edges: &[Edge]) {
        call_json(&self.on_edges_change, edges);
    }

    fn image_exported(&mut self, data_url: &str) {
        call(&self.on_image_export, data_url);
    }

    fn save_file(&mut self, file_name: &str, data_url: &str) {
        if let Err(err) = download(file_name, data_url) {
            log::error!("download of {file_name} failed: {err:?}");
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }
}

fn download(file_name: &str, href: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(href);
    anchor.set_download(file_name);
    anchor.click();
    Ok(())
}
