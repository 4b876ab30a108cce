//! Crate-level error type.

use thiserror::Error;

use crate::layout::LayoutError;
use crate::obj::ObjError;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model: {0}")]
    Obj(#[from] ObjError),
    #[error("invalid vertex layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("no compatible GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("failed to create window: {0}")]
    Os(#[from] winit::error::OsError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("view state encoding failed: {0}")]
    Store(#[from] bincode::Error),
    #[error("failed to decode texture: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("platform error: {0}")]
    Platform(String),
}
