use glow::HasContext;
use glitter::settings::{Profile, Settings};

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use std::ffi::{CStr, CString};
use std::num::NonZeroU32;
use thiserror::Error;
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

#[derive(Error, Debug)]
pub enum Problem {
    #[error("Event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to create window: {0}")]
    CannotCreateWindow(String),

    #[error("Failed to create the OpenGL context: {0}")]
    CannotCreateContext(#[source] glutin::error::Error),

    #[error("Failed to load OpenGL function {0}")]
    CannotLoadFunctions(String),

    #[error(transparent)]
    CannotRender(#[from] glitter::Problem),
}

// Entry points the triangle needs. Anything missing here means the driver
// handed us an unusable context.
const REQUIRED_FUNCTIONS: [&CStr; 12] = [
    c"glGetString",
    c"glViewport",
    c"glClear",
    c"glClearColor",
    c"glCreateShader",
    c"glCreateProgram",
    c"glLinkProgram",
    c"glGenVertexArrays",
    c"glGenBuffers",
    c"glBufferData",
    c"glVertexAttribPointer",
    c"glDrawArrays",
];

/// The window together with the GL surface and context drawing into it.
///
/// Fields drop in order: surface, context, then the window.
pub struct WindowContext {
    pub gl_surface: Surface<WindowSurface>,
    pub gl_context: PossiblyCurrentContext,
    pub window: Window,
}

impl WindowContext {
    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.gl_surface.resize(&self.gl_context, width, height);
        }
    }

    pub fn swap_buffers(&self) -> Result<(), glutin::error::Error> {
        self.gl_surface.swap_buffers(&self.gl_context)
    }
}

pub fn get_rendering_context(
    event_loop: &ActiveEventLoop,
    settings: &Settings,
) -> Result<(glow::Context, WindowContext), Problem> {
    let window_attributes = Window::default_attributes()
        .with_title(settings.title.clone())
        .with_decorations(true)
        .with_resizable(true)
        .with_inner_size(LogicalSize::new(settings.width, settings.height));

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_attributes(Some(window_attributes))
        .build(event_loop, ConfigTemplateBuilder::new(), pick_config)
        .map_err(|err| Problem::CannotCreateWindow(err.to_string()))?;
    let window =
        window.ok_or_else(|| Problem::CannotCreateWindow("no window was created".to_string()))?;

    let raw_window_handle = window
        .window_handle()
        .map_err(|err| Problem::CannotCreateWindow(err.to_string()))?
        .as_raw();

    let gl_display = gl_config.display();
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(
            settings.gl_version.major,
            settings.gl_version.minor,
        ))))
        .with_profile(gl_profile(settings.profile))
        .build(Some(raw_window_handle));

    let not_current_context = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
        .map_err(Problem::CannotCreateContext)?;

    let surface_attributes = window
        .build_surface_attributes(Default::default())
        .map_err(|err| Problem::CannotCreateWindow(err.to_string()))?;
    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
        .map_err(Problem::CannotCreateContext)?;

    let gl_context = not_current_context
        .make_current(&gl_surface)
        .map_err(Problem::CannotCreateContext)?;

    if settings.vsync {
        if let Err(err) =
            gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
        {
            log::warn!("Failed to enable vsync: {}", err);
        }
    }

    check_functions(&gl_display)?;

    let gl = unsafe {
        glow::Context::from_loader_function(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(&symbol),
            Err(_) => std::ptr::null(),
        })
    };

    let version = gl.version();
    log::info!(
        "OpenGL {}.{} {}",
        version.major,
        version.minor,
        version.vendor_info
    );
    log::debug!("Renderer: {}", unsafe {
        glow::HasContext::get_parameter_string(&gl, glow::RENDERER)
    });

    Ok((
        gl,
        WindowContext {
            gl_surface,
            gl_context,
            window,
        },
    ))
}

fn gl_profile(profile: Profile) -> GlProfile {
    match profile {
        Profile::Core => GlProfile::Core,
        Profile::Compatibility => GlProfile::Compatibility,
    }
}

// Multisampling is off for the triangle, so prefer the plainest config.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|accum, config| {
            if config.num_samples() < accum.num_samples() {
                config
            } else {
                accum
            }
        })
        .expect("display offered no GL configs")
}

fn check_functions(display: &Display) -> Result<(), Problem> {
    match REQUIRED_FUNCTIONS
        .iter()
        .find(|name| display.get_proc_address(name).is_null())
    {
        Some(name) => Err(Problem::CannotLoadFunctions(
            name.to_string_lossy().into_owned(),
        )),
        None => Ok(()),
    }
}
