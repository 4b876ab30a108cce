//! Orbit view persistence between sessions.
//! Native: a single bincode file (default `./viewer_state/view.bin`).
//! Web   : window.localStorage["model_viewer_view"] = base64(bincode).

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub scale: f32,
}

pub fn encode(snapshot: &ViewSnapshot) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(snapshot)
}

pub fn decode(bytes: &[u8]) -> Result<ViewSnapshot, bincode::Error> {
    bincode::deserialize(bytes)
}

// ---------- Native FS impl ----------

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use std::fs;
    use std::path::Path;

    use crate::error::ViewerError;

    pub fn load(path: &Path) -> Option<ViewSnapshot> {
        let bytes = fs::read(path).ok()?;
        match decode(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("ignoring unreadable view state {}: {e}", path.display());
                None
            }
        }
    }

    pub fn save(path: &Path, snapshot: &ViewSnapshot) -> Result<(), ViewerError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let bytes = encode(snapshot)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

// ---------- Web localStorage impl ----------

#[cfg(target_arch = "wasm32")]
pub mod web {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use wasm_bindgen::JsValue;

    pub const STORAGE_KEY: &str = "model_viewer_view";

    pub fn load() -> Option<ViewSnapshot> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;
        let s = storage.get_item(STORAGE_KEY).ok()??;
        let bytes = STANDARD.decode(s).ok()?;
        decode(&bytes).ok()
    }

    pub fn save(snapshot: &ViewSnapshot) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or(JsValue::from_str("no window"))?;
        let storage = window.local_storage()?.ok_or(JsValue::from_str("no localStorage"))?;
        let bytes = encode(snapshot).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        storage.set_item(STORAGE_KEY, &STANDARD.encode(bytes))
    }
}

/// Stored view for this platform, if any.
pub fn load(config: &crate::config::ViewerConfig) -> Option<ViewSnapshot> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        native::load(&config.view_state_path)
    }
    #[cfg(target_arch = "wasm32")]
    {
        let _ = config;
        web::load()
    }
}

/// Best effort: failures are logged, never fatal.
pub fn save(config: &crate::config::ViewerConfig, snapshot: &ViewSnapshot) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = native::save(&config.view_state_path, snapshot) {
            log::warn!("failed to save view state to {}: {e}", config.view_state_path.display());
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        let _ = config;
        if let Err(e) = web::save(snapshot) {
            log::warn!("failed to save view state: {e:?}");
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("model_viewer_test_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn native_store_restores_saved_view() {
        let path = scratch_path("nested/view.bin");
        let snapshot = ViewSnapshot { rotation_x: 33.5, rotation_y: -12.0, scale: 2.5 };
        native::save(&path, &snapshot).unwrap();
        assert_eq!(native::load(&path), Some(snapshot));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_or_corrupt_file_loads_nothing() {
        let path = scratch_path("corrupt.bin");
        assert_eq!(native::load(&path), None);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, [1u8, 2]).unwrap();
        assert_eq!(native::load(&path), None);
        let _ = std::fs::remove_file(&path);
    }
}
