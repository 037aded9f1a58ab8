mod context;

use context::{Problem, WindowContext};
use glitter::input::{Key, KeyState};
use glitter::{LoopEvent, RenderLoop, Settings, Triangle};
use std::rc::Rc;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    std::process::exit(exit_status(run(Settings::default())));
}

// Bootstrap failures end the process with -1; a normal close with 0.
fn exit_status(result: Result<(), Problem>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(problem) => {
            log::error!("{}", problem);
            -1
        }
    }
}

fn run(settings: Settings) -> Result<(), Problem> {
    let event_loop = EventLoop::new()?;
    let mut application = Application::new(settings);
    event_loop.run_app(&mut application)?;

    match application.problem.take() {
        Some(problem) => Err(problem),
        None => Ok(()),
    }
}

// Drop order matters: GPU resources go while the context is still alive.
struct Graphics {
    render_loop: RenderLoop<Triangle>,
    window_context: WindowContext,
}

impl Graphics {
    fn redraw(&mut self) {
        if self.render_loop.frame() {
            if let Err(err) = self.window_context.swap_buffers() {
                log::error!("Failed to swap buffers: {}", err);
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.window_context.resize(width, height);
        self.render_loop
            .handle_event(LoopEvent::Resized { width, height });
    }
}

struct Application {
    settings: Settings,
    graphics: Option<Graphics>,
    problem: Option<Problem>,
}

impl Application {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            graphics: None,
            problem: None,
        }
    }

    /// Graphics are created once, and never after a failed attempt.
    fn should_start(&self) -> bool {
        self.graphics.is_none() && self.problem.is_none()
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Problem> {
        let (gl, window_context) = context::get_rendering_context(event_loop, &self.settings)?;

        let physical_size = window_context.window.inner_size();
        log::debug!(
            "Physical size: {}x{}px",
            physical_size.width,
            physical_size.height
        );

        let context = Rc::new(gl);
        let triangle = Triangle::new(&context, &self.settings)?;

        self.graphics = Some(Graphics {
            render_loop: RenderLoop::new(triangle),
            window_context,
        });

        Ok(())
    }
}

impl ApplicationHandler for Application {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.should_start() {
            return;
        }

        if let Err(problem) = self.start(event_loop) {
            self.problem = Some(problem);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        match event {
            WindowEvent::RedrawRequested => graphics.redraw(),

            WindowEvent::Resized(physical_size) => {
                graphics.resize(physical_size.width, physical_size.height)
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(loop_event) = key_event(&event) {
                    graphics.render_loop.handle_event(loop_event);
                }
            }

            WindowEvent::Focused(focused) => {
                graphics.render_loop.handle_event(LoopEvent::Focused(focused))
            }

            WindowEvent::CloseRequested => {
                graphics.render_loop.handle_event(LoopEvent::CloseRequested)
            }

            _ => (),
        }

        if graphics.render_loop.should_close() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = self.graphics.as_ref() {
            if !graphics.render_loop.should_close() {
                graphics.window_context.window.request_redraw();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut graphics) = self.graphics.take() {
            graphics.render_loop.shutdown();
        }
    }
}

fn key_event(event: &KeyEvent) -> Option<LoopEvent> {
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };

    Some(LoopEvent::Key {
        key: key_from_code(code),
        state: key_state(event.state),
    })
}

fn key_from_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Escape => Key::Escape,
        _ => Key::Other,
    }
}

fn key_state(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Pressed,
        ElementState::Released => KeyState::Released,
    }
}
