use crate::input::{InputState, Key, KeyState};

/// The GPU side of a frame.
///
/// Implementors own their GPU resources and release them on `Drop`.
pub trait Renderer {
    /// Match the viewport to a new framebuffer size in pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Clear and draw one frame into the current framebuffer.
    fn draw(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Window and input events, already translated from the platform layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopEvent {
    Resized { width: u32, height: u32 },
    Key { key: Key, state: KeyState },
    Focused(bool),
    CloseRequested,
}

pub struct RenderLoop<R: Renderer> {
    renderer: Option<R>,
    input: InputState,
    state: LoopState,
    frame_count: u64,
}

impl<R: Renderer> RenderLoop<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer: Some(renderer),
            input: InputState::default(),
            state: LoopState::Running,
            frame_count: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn should_close(&self) -> bool {
        self.state == LoopState::Closing
    }

    pub fn set_should_close(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("Closing after {} frames", self.frame_count);
        }
        self.state = LoopState::Closing;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn handle_event(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::Resized { width, height } => {
                log::debug!("Framebuffer resized to {}x{}px", width, height);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(width, height);
                }
            }

            LoopEvent::Key { key, state } => self.input.apply_key(key, state),

            LoopEvent::Focused(false) => self.input.clear(),
            LoopEvent::Focused(true) => (),

            LoopEvent::CloseRequested => self.set_should_close(),
        }
    }

    fn process_input(&mut self) {
        if self.input.is_pressed(Key::Escape) {
            self.set_should_close();
        }
    }

    /// Run one iteration of the loop.
    ///
    /// Returns `true` if a frame was drawn and should be presented. The
    /// iteration that notices Escape still draws; the next one does not.
    pub fn frame(&mut self) -> bool {
        if self.should_close() {
            return false;
        }

        self.process_input();

        match self.renderer.as_mut() {
            Some(renderer) => {
                renderer.draw();
                self.frame_count += 1;
                true
            }
            None => false,
        }
    }

    /// Release the renderer and its GPU resources. Only the first call does
    /// anything; the context must still be current.
    pub fn shutdown(&mut self) -> bool {
        self.set_should_close();

        match self.renderer.take() {
            Some(renderer) => {
                drop(renderer);
                log::info!("Released GPU resources after {} frames", self.frame_count);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    enum Call {
        Resize(u32, u32),
        Draw,
        Drop,
    }

    struct RecordingRenderer {
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl Renderer for RecordingRenderer {
        fn resize(&mut self, width: u32, height: u32) {
            self.calls.borrow_mut().push(Call::Resize(width, height));
        }

        fn draw(&mut self) {
            self.calls.borrow_mut().push(Call::Draw);
        }
    }

    impl Drop for RecordingRenderer {
        fn drop(&mut self) {
            self.calls.borrow_mut().push(Call::Drop);
        }
    }

    fn create_test_loop() -> (RenderLoop<RecordingRenderer>, Rc<RefCell<Vec<Call>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let renderer = RecordingRenderer {
            calls: Rc::clone(&calls),
        };
        (RenderLoop::new(renderer), calls)
    }

    fn press(render_loop: &mut RenderLoop<RecordingRenderer>, key: Key) {
        render_loop.handle_event(LoopEvent::Key {
            key,
            state: KeyState::Pressed,
        });
    }

    // Drive the loop like a blocking main loop would, feeding `events` in
    // after each presented frame.
    fn run_to_completion(
        render_loop: &mut RenderLoop<RecordingRenderer>,
        mut events: Vec<Vec<LoopEvent>>,
        max_iterations: usize,
    ) -> usize {
        events.reverse();
        let mut iterations = 0;

        while !render_loop.should_close() && iterations < max_iterations {
            render_loop.frame();
            iterations += 1;

            for event in events.pop().unwrap_or_default() {
                render_loop.handle_event(event);
            }
        }

        render_loop.shutdown();
        iterations
    }

    #[test]
    fn draws_while_running() {
        let (mut render_loop, calls) = create_test_loop();

        assert!(render_loop.frame());
        assert!(render_loop.frame());

        assert_eq!(render_loop.state(), LoopState::Running);
        assert_eq!(render_loop.frame_count(), 2);
        assert_eq!(*calls.borrow(), vec![Call::Draw, Call::Draw]);
    }

    #[test]
    fn close_request_stops_the_loop() {
        let (mut render_loop, calls) = create_test_loop();
        let iterations = run_to_completion(
            &mut render_loop,
            vec![vec![], vec![LoopEvent::CloseRequested]],
            100,
        );

        assert_eq!(iterations, 2);
        assert_eq!(render_loop.state(), LoopState::Closing);
        assert!(!render_loop.frame());
        assert_eq!(*calls.borrow(), vec![Call::Draw, Call::Draw, Call::Drop]);
    }

    #[test]
    fn escape_closes_within_one_iteration() {
        let (mut render_loop, calls) = create_test_loop();

        assert!(render_loop.frame());
        press(&mut render_loop, Key::Escape);

        // The iteration that samples Escape still draws.
        assert!(render_loop.frame());
        assert!(render_loop.should_close());
        assert!(!render_loop.frame());

        assert_eq!(render_loop.frame_count(), 2);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn other_keys_keep_running() {
        let (mut render_loop, _calls) = create_test_loop();
        press(&mut render_loop, Key::Other);

        assert!(render_loop.frame());
        assert_eq!(render_loop.state(), LoopState::Running);
    }

    #[test]
    fn released_escape_does_not_close() {
        let (mut render_loop, _calls) = create_test_loop();
        press(&mut render_loop, Key::Escape);
        render_loop.handle_event(LoopEvent::Key {
            key: Key::Escape,
            state: KeyState::Released,
        });

        assert!(render_loop.frame());
        assert!(!render_loop.should_close());
    }

    #[test]
    fn focus_loss_forgets_held_escape() {
        let (mut render_loop, _calls) = create_test_loop();
        press(&mut render_loop, Key::Escape);
        render_loop.handle_event(LoopEvent::Focused(false));

        render_loop.frame();
        assert!(!render_loop.should_close());
    }

    #[test]
    fn resize_updates_the_viewport_once() {
        let (mut render_loop, calls) = create_test_loop();
        render_loop.handle_event(LoopEvent::Resized {
            width: 1024,
            height: 768,
        });

        assert_eq!(*calls.borrow(), vec![Call::Resize(1024, 768)]);
    }

    #[test]
    fn releases_resources_once_after_the_loop() {
        let (mut render_loop, calls) = create_test_loop();
        let iterations = run_to_completion(
            &mut render_loop,
            vec![vec![LoopEvent::Key {
                key: Key::Escape,
                state: KeyState::Pressed,
            }]],
            100,
        );
        assert_eq!(iterations, 2);

        assert!(!render_loop.shutdown());
        assert!(!render_loop.shutdown());

        let calls = calls.borrow();
        assert_eq!(calls.iter().filter(|call| **call == Call::Drop).count(), 1);
        assert_eq!(calls.last(), Some(&Call::Drop));
    }

    #[test]
    fn events_after_shutdown_are_ignored() {
        let (mut render_loop, calls) = create_test_loop();
        render_loop.shutdown();
        render_loop.handle_event(LoopEvent::Resized {
            width: 10,
            height: 10,
        });

        assert!(!render_loop.frame());
        assert_eq!(*calls.borrow(), vec![Call::Drop]);
    }
}
