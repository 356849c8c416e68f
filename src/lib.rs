use wasm_bindgen::prelude::*;

pub mod api;
pub mod city;
pub mod config;
pub mod dom;
pub mod error;
pub mod protocol;
pub mod render;
pub mod timer;
pub mod trainer;
pub mod vdom;
pub mod view;

use config::ViewConfig;
use view::{CityView, TrainerView};

// --- LOGGING ---
#[wasm_bindgen(start)]
pub fn start() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("stickian client v{}", env!("CARGO_PKG_VERSION"));
}

// --- CITY ---

/// Handle to a mounted city view. Dropping it (or `unmount`) stops polling.
#[wasm_bindgen]
pub struct CityHandle {
    view: Option<CityView>,
}

#[wasm_bindgen]
impl CityHandle {
    pub fn unmount(&mut self) {
        self.view = None;
    }
}

#[wasm_bindgen]
pub fn mount_city(root_id: &str, config_json: Option<String>) -> Result<CityHandle, JsValue> {
    let cfg = ViewConfig::from_optional_json(config_json)?;
    let root = dom::root_element(root_id)?;
    let view = CityView::mount(root, cfg)?;
    Ok(CityHandle { view: Some(view) })
}

// --- TRAINER DEMO ---

#[wasm_bindgen]
pub struct TrainerHandle {
    view: Option<TrainerView>,
}

#[wasm_bindgen]
impl TrainerHandle {
    pub fn unmount(&mut self) {
        self.view = None;
    }
}

#[wasm_bindgen]
pub fn mount_trainer(root_id: &str, config_json: Option<String>) -> Result<TrainerHandle, JsValue> {
    let cfg = ViewConfig::from_optional_json(config_json)?;
    let root = dom::root_element(root_id)?;
    let view = TrainerView::mount(root, cfg)?;
    Ok(TrainerHandle { view: Some(view) })
}
