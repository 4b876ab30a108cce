use std::borrow::Cow;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}, Mutex, PoisonError};

use instant::Instant;
use log::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window as NativeWindow, WindowAttributes, WindowId};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use winit::platform::web::WindowAttributesExtWebSys;

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::input::InputEvent;
use crate::model::Model;
use crate::render::Renderer;
use crate::view_store;
use crate::window::{Window, WindowBase};

// -------- logging --------

fn init_logging(is_web: bool) {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = console_log::init_with_level(log::Level::Info);
        #[cfg(feature = "console-panic-hook")]
        console_error_panic_hook::set_once();
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use env_logger::{Builder, Env};
        let env = Env::default().filter_or("RUST_LOG", "model_viewer=info,wgpu_core=warn,wgpu_hal=warn");
        let _ = Builder::from_env(env).try_init();
    }
    debug!("init_logging: is_web={}", is_web);
}

// -------- public entry --------

pub async fn run(is_web: bool, config: ViewerConfig) -> Result<(), ViewerError> {
    init_logging(is_web);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(is_web, config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

// -------- App --------

struct Gpu {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

type GpuSlot = Arc<Mutex<Option<Result<Gpu, ViewerError>>>>;

struct App {
    is_web: bool,
    config: ViewerConfig,
    window: Window,

    // native window + surface, waiting for the device
    native: Option<Arc<NativeWindow>>,
    instance: Option<wgpu::Instance>,
    surface: Option<wgpu::Surface<'static>>,

    // async
    gpu_ready: Arc<AtomicBool>,
    pending_gpu: GpuSlot,

    fatal: Option<ViewerError>,
}

impl App {
    fn new(is_web: bool, config: ViewerConfig) -> Self {
        let mut window = Window::with_config(&config);
        if config.restore_view {
            if let Some(snapshot) = view_store::load(&config) {
                info!("restoring view {snapshot:?}");
                window.orbit_mut().restore(snapshot);
            }
        }

        Self {
            is_web,
            config,
            window,
            native: None,
            instance: None,
            surface: None,
            gpu_ready: Arc::new(AtomicBool::new(false)),
            pending_gpu: Arc::new(Mutex::new(None)),
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: ViewerError) {
        error!("{e}");
        self.window.request_close();
        self.fatal.get_or_insert(e);
        event_loop.exit();
    }

    async fn build_device_queue(adapter: wgpu::Adapter, out_slot: GpuSlot, ready: Arc<AtomicBool>) {
        let descriptor = wgpu::DeviceDescriptor {
            label: Some("Viewer Device"),
            required_limits: if cfg!(target_arch = "wasm32") {
                wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
            } else {
                wgpu::Limits::default()
            },
            ..Default::default()
        };
        let result = adapter
            .request_device(&descriptor)
            .await
            .map(|(device, queue)| {
                device.on_uncaptured_error(Box::new(|e| {
                    error!("WGPU Uncaptured Error: {e:?}");
                }));
                Gpu { adapter, device, queue }
            })
            .map_err(ViewerError::from);
        Self::deliver(&out_slot, &ready, result);
    }

    // The slot only ever holds a finished value, so a poisoned lock is still usable.
    fn deliver(out_slot: &GpuSlot, ready: &AtomicBool, result: Result<Gpu, ViewerError>) {
        *out_slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
        ready.store(true, Ordering::SeqCst);
    }

    fn take_pending(out_slot: &GpuSlot) -> Option<Result<Gpu, ViewerError>> {
        out_slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn window_attributes(&self) -> Result<WindowAttributes, ViewerError> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.title.as_str())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        if !self.is_web {
            return Ok(attributes);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let canvas = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("wasm-canvas"))
                .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
                .ok_or_else(|| ViewerError::Platform("canvas with id 'wasm-canvas' not found".to_owned()))?;
            if canvas.width() == 0 || canvas.height() == 0 {
                let w = canvas.client_width()  as u32;
                let h = canvas.client_height() as u32;
                canvas.set_width(w); canvas.set_height(h);
            }
            Ok(attributes.with_canvas(Some(canvas)))
        }
        #[cfg(not(target_arch = "wasm32"))]
        { Err(ViewerError::Platform("is_web=true but not compiling for wasm32".to_owned())) }
    }

    /// Creates the native window and surface and starts the device request.
    fn create_context(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let native = Arc::new(event_loop.create_window(self.window_attributes()?)?);

        let backends = if self.is_web {
            wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL
        } else {
            wgpu::Backends::all()
        };
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor { backends, ..Default::default() });
        let surface = instance.create_surface(Arc::clone(&native))?;

        let ready_flag = Arc::clone(&self.gpu_ready);
        let out_slot   = Arc::clone(&self.pending_gpu);

        #[cfg(target_arch = "wasm32")]
        {
            let instance = instance.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let adapter = instance.request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                }).await;
                match adapter {
                    Ok(adapter) => App::build_device_queue(adapter, out_slot, ready_flag).await,
                    Err(e) => App::deliver(&out_slot, &ready_flag, Err(e.into())),
                }
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            }))?;
            info!("adapter: {:?}", adapter.get_info());
            std::thread::spawn(move || {
                pollster::block_on(App::build_device_queue(adapter, out_slot, ready_flag));
            });
        }

        native.request_redraw();
        self.native = Some(native);
        self.instance = Some(instance);
        self.surface = Some(surface);
        Ok(())
    }

    /// Attaches the GPU side to the window once the device request finished.
    fn finalize_gpu(&mut self) -> Result<(), ViewerError> {
        if self.window.is_attached() || !self.gpu_ready.load(Ordering::SeqCst) {
            return Ok(());
        }
        let Some(result) = Self::take_pending(&self.pending_gpu) else {
            return Ok(());
        };
        let gpu = result?;
        let (Some(native), Some(surface)) = (self.native.clone(), self.surface.take()) else {
            return Ok(());
        };

        let base = WindowBase::new(native, surface, &gpu.adapter, gpu.device, gpu.queue);
        let model = self.load_model(base.device(), base.queue())?;
        let renderer = Renderer::new(&base, self.shader_source()?, model)?;
        self.window.attach(base, renderer);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load_model(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Model, ViewerError> {
        let path = &self.config.model_path;
        if !path.exists() && *path == ViewerConfig::default().model_path {
            info!("{} not found, drawing the built-in cube", path.display());
            return Model::builtin(device, queue);
        }
        info!("loading {}", path.display());
        Model::load(device, queue, path)
    }

    #[cfg(target_arch = "wasm32")]
    fn load_model(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Model, ViewerError> {
        Model::builtin(device, queue)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn shader_source(&self) -> Result<Cow<'static, str>, ViewerError> {
        Ok(crate::shader::load_source(self.config.shader_path.as_deref())?)
    }

    #[cfg(target_arch = "wasm32")]
    fn shader_source(&self) -> Result<Cow<'static, str>, ViewerError> {
        Ok(Cow::Borrowed(crate::shader::DEFAULT_SOURCE))
    }
}

// -------- winit plumbing --------

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.native.is_some() {
            return;
        }
        if let Err(e) = self.create_context(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, _el: &ActiveEventLoop) {
        if let Some(w) = &self.native {
            w.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if Some(id) != self.native.as_ref().map(|w| w.id()) { return; }

        let scale_factor = self.native.as_ref().map_or(1.0, |w| w.scale_factor());
        if let Some(input) = InputEvent::from_window_event(&event, scale_factor) {
            self.window.handle_event(input);
        }

        if matches!(event, WindowEvent::RedrawRequested) {
            if let Err(e) = self.finalize_gpu() {
                self.fail(event_loop, e);
                return;
            }
            self.window.frame(Instant::now());
        }

        if !self.window.is_running() {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _el: &ActiveEventLoop) {
        if self.fatal.is_none() {
            view_store::save(&self.config, &self.window.orbit().snapshot());
        }
        info!("viewer closed");
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn device_result_survives_a_poisoned_slot() {
        let slot: GpuSlot = Arc::new(Mutex::new(None));
        let holder = Arc::clone(&slot);
        let _ = std::thread::spawn(move || {
            let _guard = holder.lock();
            panic!("device thread died while holding the slot");
        })
        .join();
        assert!(slot.is_poisoned());

        let ready = AtomicBool::new(false);
        App::deliver(&slot, &ready, Err(ViewerError::Platform("no device".to_owned())));
        assert!(ready.load(Ordering::SeqCst));
        assert!(matches!(App::take_pending(&slot), Some(Err(ViewerError::Platform(_)))));
        assert!(App::take_pending(&slot).is_none());
    }
}
