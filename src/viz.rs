//! Render loop and cross-thread control surface

use crate::backend::{Event, RenderBackend};
use crate::config::VizConfig;
use crate::headless::HeadlessBackend;
use crate::input::{
    HandlerChain, KeyEvent, KeyHandler, MouseButton, MouseButtonEvent, MouseButtonHandler,
    MousePosHandler, ScrollHandler, WindowCtx,
};
use crate::log::LogFile;
use crate::scene::{Drawable, Handle, Scene};
use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

/// Cloneable, thread-safe handle to a visualizer.
///
/// Every method may be called from any thread, including from input handlers
/// running inside the render loop.
#[derive(Clone)]
pub struct PointVizHandle {
    inner: Arc<VizInner>,
}

struct VizInner {
    scene: Mutex<Scene>,
    running: AtomicBool,
    interrupted: AtomicBool,
    key_handlers: HandlerChain<dyn KeyHandler>,
    mouse_button_handlers: HandlerChain<dyn MouseButtonHandler>,
    scroll_handlers: HandlerChain<dyn ScrollHandler>,
    mouse_pos_handlers: HandlerChain<dyn MousePosHandler>,
    log: LogFile,
}

impl PointVizHandle {
    fn new(log: LogFile) -> Self {
        Self {
            inner: Arc::new(VizInner {
                scene: Mutex::new(Scene::new()),
                running: AtomicBool::new(false),
                interrupted: AtomicBool::new(false),
                key_handlers: HandlerChain::new(),
                mouse_button_handlers: HandlerChain::new(),
                scroll_handlers: HandlerChain::new(),
                mouse_pos_handlers: HandlerChain::new(),
                log,
            }),
        }
    }

    /// Check if the rendering loop is running.
    pub fn running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Request the rendering loop to start or stop.
    pub fn set_running(&self, state: bool) {
        self.inner.running.store(state, Ordering::SeqCst);
    }

    /// Ask a running loop to stop with [`Error::Cancelled`]. Takes effect at
    /// the next batch boundary; ignored if the loop is not running.
    pub fn interrupt(&self) {
        self.inner.interrupted.store(true, Ordering::SeqCst);
    }

    /// Upload every object again on the next frame.
    pub fn update(&self) {
        self.lock().update();
    }

    /// Lock the scene. The render loop holds this lock only while uploading,
    /// so keep the guard short-lived.
    pub fn lock(&self) -> MutexGuard<'_, Scene> {
        self.inner.scene.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add an object to the scene. Returns `false` if it was already added.
    pub fn add<T: Drawable>(&self, object: &Handle<T>) -> bool {
        self.lock().add(object)
    }

    /// Remove an object from the scene. Returns `false` if it was not there.
    pub fn remove<T: Drawable>(&self, object: &Handle<T>) -> bool {
        let removed = self.lock().remove(object);
        if !removed {
            let _ = self.inner.log.log(format!(
                "Tried to remove object {}, which is not in the scene",
                object.id()
            ));
        }
        removed
    }

    /// Add a callback for keyboard input.
    pub fn push_key_handler<F>(&self, handler: F)
    where
        F: FnMut(&PointVizHandle, &WindowCtx, KeyEvent) -> bool + Send + 'static,
    {
        self.push_boxed_key_handler(Box::new(handler));
    }

    pub fn push_boxed_key_handler(&self, handler: Box<dyn KeyHandler>) {
        self.inner.key_handlers.push(handler);
    }

    /// Add a callback for mouse button input.
    pub fn push_mouse_button_handler<F>(&self, handler: F)
    where
        F: FnMut(&PointVizHandle, &WindowCtx, MouseButtonEvent) -> bool + Send + 'static,
    {
        self.push_boxed_mouse_button_handler(Box::new(handler));
    }

    pub fn push_boxed_mouse_button_handler(&self, handler: Box<dyn MouseButtonHandler>) {
        self.inner.mouse_button_handlers.push(handler);
    }

    /// Add a callback for mouse scrolling input.
    pub fn push_scroll_handler<F>(&self, handler: F)
    where
        F: FnMut(&PointVizHandle, &WindowCtx, f64, f64) -> bool + Send + 'static,
    {
        self.push_boxed_scroll_handler(Box::new(handler));
    }

    pub fn push_boxed_scroll_handler(&self, handler: Box<dyn ScrollHandler>) {
        self.inner.scroll_handlers.push(handler);
    }

    /// Add a callback for mouse movement.
    pub fn push_mouse_pos_handler<F>(&self, handler: F)
    where
        F: FnMut(&PointVizHandle, &WindowCtx, f64, f64) -> bool + Send + 'static,
    {
        self.push_boxed_mouse_pos_handler(Box::new(handler));
    }

    pub fn push_boxed_mouse_pos_handler(&self, handler: Box<dyn MousePosHandler>) {
        self.inner.mouse_pos_handlers.push(handler);
    }

    pub fn log(&self) -> &LogFile {
        &self.inner.log
    }
}

/// Point cloud visualizer: owns the render surface and runs the loop.
///
/// The render methods must be called from the thread that created it.
/// Everything else is reachable from other threads through
/// [`PointViz::handle`].
pub struct PointViz<B: RenderBackend = HeadlessBackend> {
    handle: PointVizHandle,
    backend: B,
    ctx: WindowCtx,
    config: VizConfig,
    render_thread: thread::ThreadId,
}

impl<B: RenderBackend> PointViz<B> {
    /// Create the render surface described by `config`.
    pub fn new(config: VizConfig, log: LogFile) -> Result<Self> {
        let backend = B::create(&config).inspect_err(|e| {
            let _ = log.log(format!("Failed to create render surface: {}", e));
        })?;
        Ok(Self::with_backend(backend, config, log))
    }

    /// Wrap an already created backend.
    pub fn with_backend(backend: B, config: VizConfig, log: LogFile) -> Self {
        let _ = log.log(format!(
            "Created visualizer \"{}\" ({}x{})",
            config.name, config.window_width, config.window_height
        ));
        Self {
            handle: PointVizHandle::new(log),
            backend,
            ctx: WindowCtx::new(config.window_width, config.window_height),
            config,
            render_thread: thread::current().id(),
        }
    }

    pub fn handle(&self) -> &PointVizHandle {
        &self.handle
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn window_ctx(&self) -> &WindowCtx {
        &self.ctx
    }

    pub fn running(&self) -> bool {
        self.handle.running()
    }

    pub fn set_running(&self, state: bool) {
        self.handle.set_running(state);
    }

    pub fn update(&self) {
        self.handle.update();
    }

    pub fn lock(&self) -> MutexGuard<'_, Scene> {
        self.handle.lock()
    }

    pub fn add<T: Drawable>(&self, object: &Handle<T>) -> bool {
        self.handle.add(object)
    }

    pub fn remove<T: Drawable>(&self, object: &Handle<T>) -> bool {
        self.handle.remove(object)
    }

    /// Show or hide the render surface.
    pub fn visible(&mut self, state: bool) {
        self.backend.set_visible(state);
    }

    /// Run the rendering loop until it is stopped, the surface is closed or
    /// the loop is interrupted.
    ///
    /// The interrupt flag is checked every `check_every` iterations; an
    /// interrupt ends the loop with [`Error::Cancelled`].
    pub fn run(&mut self) -> Result<()> {
        self.check_thread("run")?;

        // interrupts raised while stopped do not apply to this run
        self.handle.inner.interrupted.store(false, Ordering::SeqCst);
        self.handle.set_running(true);
        self.backend.set_visible(true);
        let _ = self.handle.inner.log.log("Render loop started");

        let result = self.run_batches();

        self.handle.set_running(false);
        self.backend.set_visible(false);
        let log = &self.handle.inner.log;
        let _ = match &result {
            Ok(()) => log.log("Render loop stopped"),
            Err(Error::Cancelled) => log.log("Render loop cancelled"),
            Err(e) => log.log(format!("Render loop failed: {}", e)),
        };
        result
    }

    /// Run one iteration: process input events, upload changed buffers and
    /// draw a frame.
    pub fn run_once(&mut self) -> Result<()> {
        self.check_thread("run_once")?;
        self.frame()
    }

    fn run_batches(&mut self) -> Result<()> {
        let check_every = self.config.check_every.max(1);
        while self.handle.running() {
            for _ in 0..check_every {
                self.frame()?;
                if !self.handle.running() {
                    return Ok(());
                }
            }
            if self.handle.inner.interrupted.swap(false, Ordering::SeqCst) {
                return Err(Error::Cancelled);
            }
        }
        Ok(())
    }

    fn check_thread(&self, operation: &'static str) -> Result<()> {
        if thread::current().id() != self.render_thread {
            let _ = self.handle.inner.log.log(format!(
                "PointViz::{} must be called from the thread that created it",
                operation
            ));
            return Err(Error::WrongThread(operation));
        }
        Ok(())
    }

    fn frame(&mut self) -> Result<()> {
        for event in self.backend.poll_events()? {
            self.dispatch(event);
        }
        if self.backend.is_closed() {
            self.handle.set_running(false);
            return Ok(());
        }

        let viewport = (self.ctx.viewport_width, self.ctx.viewport_height);
        let frame = {
            let mut scene = self.handle.lock();
            let released = scene.pending_releases();
            let frame = scene.upload(&mut self.backend, viewport);
            if released > 0 && frame.is_ok() {
                let _ = self
                    .handle
                    .inner
                    .log
                    .log(format!("Released {} objects", released));
            }
            frame
        };

        // draw outside the scene lock so mutators only wait on the upload
        self.backend.submit_frame(&frame?)
    }

    fn dispatch(&mut self, event: Event) {
        let handle = &self.handle;
        let inner = &handle.inner;
        match event {
            Event::Key { key, action, mods } => {
                let ctx = self.ctx;
                let event = KeyEvent { key, action, mods };
                inner
                    .key_handlers
                    .dispatch(|h| h.handle(handle, &ctx, event));
            }
            Event::MouseButton {
                button,
                action,
                mods,
            } => {
                match button {
                    MouseButton::Left => self.ctx.lbutton_down = action.is_down(),
                    MouseButton::Middle => self.ctx.mbutton_down = action.is_down(),
                    MouseButton::Right => {}
                }
                let ctx = self.ctx;
                let event = MouseButtonEvent {
                    button,
                    action,
                    mods,
                };
                inner
                    .mouse_button_handlers
                    .dispatch(|h| h.handle(handle, &ctx, event));
            }
            Event::MousePos { x, y } => {
                let ctx = self.ctx;
                inner
                    .mouse_pos_handlers
                    .dispatch(|h| h.handle(handle, &ctx, x, y));
                self.ctx.mouse_x = x;
                self.ctx.mouse_y = y;
            }
            Event::Scroll { x, y } => {
                let ctx = self.ctx;
                inner
                    .scroll_handlers
                    .dispatch(|h| h.handle(handle, &ctx, x, y));
            }
            Event::Resize { width, height } => {
                self.ctx.viewport_width = width;
                self.ctx.viewport_height = if self.config.fix_aspect && self.config.window_width > 0
                {
                    (width as f64 * self.config.window_height as f64
                        / self.config.window_width as f64)
                        .round() as u32
                } else {
                    height
                };
            }
            Event::Close => handle.set_running(false),
        }
    }
}
