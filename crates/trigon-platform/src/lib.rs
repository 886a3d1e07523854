// SPDX-License-Identifier: CEPL-1.0
//! Window and event loop.
//!
//! [`run_continuous`] opens one fixed-size window and redraws it as fast as
//! the handler allows until the user closes it.

use anyhow::{Context, Result};
use tracing::{error, info};

pub use winit;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec {
            title: "trigon".to_owned(),
            width: 500,
            height: 500,
        }
    }
}

/// Creates a non-resizable window of `spec.width` x `spec.height` logical pixels.
pub fn create_window(event_loop: &ActiveEventLoop, spec: &WindowSpec) -> Result<Window> {
    let attrs = Window::default_attributes()
        .with_title(spec.title.clone())
        .with_inner_size(LogicalSize::new(spec.width, spec.height))
        .with_resizable(false);
    event_loop.create_window(attrs).context("create_window")
}

/// Drawable size in physical pixels, never zero.
pub fn framebuffer_size(window: &Window) -> (u32, u32) {
    let size = window.inner_size();
    (size.width.max(1), size.height.max(1))
}

/// Callbacks driven by [`run_continuous`].
pub trait FrameHandler {
    /// The window exists; build whatever renders into it.
    fn init(&mut self, window: &Window) -> Result<()>;

    fn frame(&mut self, window: &Window) -> Result<()>;

    fn resized(&mut self, _window: &Window, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    /// Runs once, while the window still exists.
    fn exit(&mut self);
}

/// Runs the event loop until close is requested or a callback fails.
///
/// The first callback error stops the loop and is returned once
/// [`FrameHandler::exit`] has run.
pub fn run_continuous<H: FrameHandler>(spec: WindowSpec, handler: &mut H) -> Result<()> {
    let event_loop = EventLoop::new().context("event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = Runner {
        spec,
        handler,
        window: None,
        error: None,
        finished: false,
    };
    event_loop.run_app(&mut runner)?;

    match runner.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct Runner<'h, H> {
    spec: WindowSpec,
    handler: &'h mut H,
    window: Option<Window>,
    error: Option<anyhow::Error>,
    finished: bool,
}

impl<H: FrameHandler> Runner<'_, H> {
    // Handler exit strictly before the window is dropped, at most once.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.window.is_some() {
            self.handler.exit();
        }
        self.window = None;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        error!("{e:#}");
        self.error.get_or_insert(e);
        self.finish();
        event_loop.exit();
    }
}

impl<H: FrameHandler> ApplicationHandler for Runner<'_, H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.finished {
            return;
        }
        let window = match create_window(event_loop, &self.spec) {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, e),
        };
        let (w, h) = framebuffer_size(&window);
        info!("window {:?} created ({w}x{h})", self.spec.title);

        let init = self.handler.init(&window);
        self.window = Some(window);
        match init {
            Ok(()) => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = &self.window else {
            return;
        };
        if window_id != window.id() {
            return;
        }

        let result = match event {
            WindowEvent::CloseRequested => {
                info!("close requested");
                self.finish();
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => self.handler.resized(window, size.width, size.height),
            WindowEvent::RedrawRequested => self.handler.frame(window),
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.finish();
    }
}
