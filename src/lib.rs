//! Desktop model viewer: loads an OBJ model, draws it with wgpu and lets the
//! user orbit and zoom it with the mouse.

pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod input;
pub mod layout;
pub mod material;
pub mod mesh;
pub mod model;
pub mod obj;
pub mod orbit;
pub mod render;
pub mod shader;
pub mod texture;
pub mod types;
pub mod view_store;
pub mod viewer;
pub mod window;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use viewer::run;

cfg_if::cfg_if! {
  if #[cfg(target_arch = "wasm32")] {
      use wasm_bindgen::prelude::*;

      #[wasm_bindgen(start)]
      pub async fn start() {
          if let Err(e) = viewer::run(true, ViewerConfig::default()).await {
              log::error!("{e}");
          }
      }
  }
}
