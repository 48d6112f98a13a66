//! JsCodeWalk - a mounted widget handle for JavaScript.

use codewalk_browser::{Catalog, CodeWalkWidget, MountError, Section, WidgetConfig, catalog};
use serde::Deserialize;
use serde_wasm_bindgen::Deserializer;
use wasm_bindgen::prelude::*;
use web_sys::Element;

/// A widget mounted into a page element.
#[wasm_bindgen(js_name = CodeWalk)]
pub struct JsCodeWalk {
    widget: CodeWalkWidget,
}

#[wasm_bindgen(js_class = CodeWalk)]
impl JsCodeWalk {
    /// Index of the section whose code is shown.
    #[wasm_bindgen(js_name = activeIndex)]
    pub fn active_index(&self) -> usize {
        self.widget.active_index()
    }

    /// Id of the section whose code is shown.
    #[wasm_bindgen(js_name = activeId)]
    pub fn active_id(&self) -> String {
        self.widget.shell().active_section().id.to_string()
    }

    /// Whether highlighting has finished.
    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.widget.shell().is_ready()
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.widget.is_mounted()
    }

    /// Stop tracking, cancel pending work and clear the root element.
    #[wasm_bindgen]
    pub fn unmount(&self) {
        self.widget.unmount();
    }
}

/// Mount a walkthrough into `root`.
///
/// # Arguments
/// * `root` - Element whose contents the widget takes over
/// * `catalog` - Array of sections, or the same as a JSON string
/// * `config` - Optional partial config (`highlight`, `tracker`, `copyAckMs`,
///   `precompute`)
#[wasm_bindgen]
pub fn mount(
    root: &Element,
    catalog: JsValue,
    config: Option<JsValue>,
) -> Result<JsCodeWalk, JsError> {
    let catalog = parse_catalog(catalog)?;
    let config = parse_config(config)?;
    mount_with(root, catalog, config)
}

/// Mount the bundled two-section demo into `root`.
#[wasm_bindgen(js_name = mountDemo)]
pub fn mount_demo(root: &Element) -> Result<JsCodeWalk, JsError> {
    mount_with(root, catalog::demo(), WidgetConfig::default())
}

fn mount_with(
    root: &Element,
    catalog: Catalog,
    config: WidgetConfig,
) -> Result<JsCodeWalk, JsError> {
    let widget = CodeWalkWidget::mount(root, catalog, config).map_err(to_js_error)?;
    Ok(JsCodeWalk { widget })
}

fn parse_catalog(value: JsValue) -> Result<Catalog, JsError> {
    let catalog = match value.as_string() {
        Some(json) => Catalog::from_json(&json),
        None => {
            let sections = Vec::<Section>::deserialize(Deserializer::from(value))
                .map_err(|e| JsError::new(&format!("Invalid catalog: {}", e)))?;
            Catalog::new(sections)
        }
    };
    catalog.map_err(|e| to_js_error(e.into()))
}

fn parse_config(value: Option<JsValue>) -> Result<WidgetConfig, JsError> {
    match value {
        Some(v) if !v.is_undefined() && !v.is_null() => {
            WidgetConfig::deserialize(Deserializer::from(v))
                .map_err(|e| to_js_error(MountError::Config(e.to_string())))
        }
        _ => Ok(WidgetConfig::default()),
    }
}

fn to_js_error(e: MountError) -> JsError {
    JsError::new(&e.to_string())
}
