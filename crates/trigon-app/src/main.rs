// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use trigon_core::init_tracing;
use trigon_platform::winit::{
    raw_window_handle::{HasDisplayHandle, HasWindowHandle},
    window::Window,
};
use trigon_platform::{framebuffer_size, run_continuous, FrameHandler, WindowSpec};
use trigon_render::{RenderOptions, RenderSize, Renderer};
use trigon_render_vk::VkRenderer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file; missing means defaults.
    #[arg(long, default_value = "trigon.toml")]
    config: PathBuf,
    /// Directory with shader.vert.spv and shader.frag.spv (overrides the config)
    #[arg(long)]
    shader_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
struct WindowCfg {
    title: String,
    width: u32,
    height: u32,
}

impl Default for WindowCfg {
    fn default() -> Self {
        let spec = WindowSpec::default();
        WindowCfg {
            title: spec.title,
            width: spec.width,
            height: spec.height,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
struct RenderCfg {
    shader_dir: PathBuf,
    frames_in_flight: Option<u32>,
    fence_timeout_ms: Option<u64>,
    validation: bool,
}

impl Default for RenderCfg {
    fn default() -> Self {
        let opts = RenderOptions::default();
        RenderCfg {
            shader_dir: opts.shader_dir,
            frames_in_flight: None,
            fence_timeout_ms: None,
            validation: opts.validation,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
struct AppCfg {
    #[serde(default)]
    window: WindowCfg,
    #[serde(default)]
    render: RenderCfg,
}

impl AppCfg {
    fn window_spec(&self) -> WindowSpec {
        WindowSpec {
            title: self.window.title.clone(),
            width: self.window.width.max(1),
            height: self.window.height.max(1),
        }
    }

    fn render_options(&self) -> RenderOptions {
        let frames_in_flight = match self.render.frames_in_flight {
            Some(0) => {
                warn!("frames_in_flight = 0 ignored; using one per swapchain image");
                None
            }
            n => n,
        };
        RenderOptions {
            shader_dir: self.render.shader_dir.clone(),
            frames_in_flight,
            fence_timeout: self.render.fence_timeout_ms.map(Duration::from_millis),
            validation: self.render.validation,
        }
    }
}

fn load_cfg(path: &Path) -> AppCfg {
    match fs::read_to_string(path) {
        Ok(s) => toml::from_str::<AppCfg>(&s).unwrap_or_else(|e| {
            warn!("{}: {e}; using defaults", path.display());
            AppCfg::default()
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} not found; using defaults", path.display());
            AppCfg::default()
        }
        Err(e) => {
            warn!("{}: {e}; using defaults", path.display());
            AppCfg::default()
        }
    }
}

struct App {
    options: RenderOptions,
    renderer: Option<VkRenderer>,
    frames: u32,
    last_fps_instant: Instant,
}

impl App {
    fn new(options: RenderOptions) -> Self {
        App {
            options,
            renderer: None,
            frames: 0,
            last_fps_instant: Instant::now(),
        }
    }
}

impl FrameHandler for App {
    fn init(&mut self, window: &Window) -> Result<()> {
        let (width, height) = framebuffer_size(window);
        let wh = window.window_handle()?;
        let dh = window.display_handle()?;
        let renderer = VkRenderer::new(&wh, &dh, RenderSize { width, height }, &self.options)?;
        self.renderer = Some(renderer);
        self.last_fps_instant = Instant::now();
        Ok(())
    }

    fn frame(&mut self, _window: &Window) -> Result<()> {
        let Some(renderer) = &mut self.renderer else {
            return Ok(());
        };
        renderer.render()?;
        self.frames = self.frames.saturating_add(1);

        let now = Instant::now();
        if now.duration_since(self.last_fps_instant).as_secs_f32() >= 1.0 {
            info!("fps ~ {}", self.frames);
            self.frames = 0;
            self.last_fps_instant = now;
        }
        Ok(())
    }

    fn resized(&mut self, _window: &Window, width: u32, height: u32) -> Result<()> {
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(RenderSize { width, height }) {
                warn!("{e:#}");
            }
        }
        Ok(())
    }

    fn exit(&mut self) {
        if let Some(renderer) = self.renderer.take() {
            match renderer.teardown() {
                Ok(()) => info!("renderer shut down"),
                Err(e) => error!("{e:#}"),
            }
        }
    }
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();
    let cfg = load_cfg(&args.config);

    let mut options = cfg.render_options();
    if let Some(dir) = args.shader_dir {
        options.shader_dir = dir;
    }

    let mut app = App::new(options);
    run_continuous(cfg.window_spec(), &mut app)
}
