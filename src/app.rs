//! Application window and event loop handler.
//!
//! The window is the keyboard surface of a session. Frames are stepped on
//! redraw and drawn from a snapshot. The title bar carries the running score
//! and the results message.

use crate::core::input::InputManager;
use crate::core::input::actions::{InputEvent, UIAction};
use crate::models::engine::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::models::stats::HitStats;
use crate::render::Renderer;
use crate::shared::snapshot::GameplaySnapshot;
use crate::state::game::{GameSession, SessionSignal, SessionState};
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Longest frame step fed to the session (seconds).
const MAX_FRAME_DT: f64 = 0.1;

pub struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    input: InputManager,
    session: GameSession,
    song_title: String,
    last_frame: Option<Instant>,
    shown_title: String,
}

impl App {
    pub fn new(session: GameSession, input: InputManager, song_title: &str) -> Self {
        Self {
            window: None,
            renderer: None,
            input,
            session,
            song_title: song_title.to_string(),
            last_frame: None,
            shown_title: String::new(),
        }
    }

    /// Runs the session in a window until it finishes (blocking).
    pub fn run(mut self) -> Result<HitStats, winit::error::EventLoopError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(self.session.stats().clone())
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Press(key) => self.session.press(key),
            InputEvent::Release(key) => self.session.release(key),
            InputEvent::UI(UIAction::Confirm) => {
                self.session.confirm();
            }
            InputEvent::UI(UIAction::Back) => {
                if !self.session.confirm() {
                    self.session.abort();
                }
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f64().min(MAX_FRAME_DT))
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        if self.session.update(dt) == SessionSignal::Exit {
            event_loop.exit();
            return;
        }
        let snapshot = self.session.snapshot();
        self.refresh_title(&snapshot);
        if let Some(renderer) = &mut self.renderer
            && let Err(e) = renderer.render(&snapshot)
        {
            log::error!("RENDER: Frame failed ({}), falling back to the title bar", e);
            self.renderer = None;
        }
    }

    fn refresh_title(&mut self, snapshot: &GameplaySnapshot) {
        let stats = &snapshot.hit_stats;
        let title = match snapshot.state {
            SessionState::ShowResults | SessionState::Leaving => format!(
                "{} | score {} | perfect {} good {} miss {} | {}",
                self.song_title,
                stats.score,
                stats.perfect,
                stats.good,
                stats.miss,
                snapshot.results_message.as_deref().unwrap_or(""),
            ),
            _ => format!(
                "{} | {:.1}s | score {} | perfect {} good {} miss {} | {} queued{}",
                self.song_title,
                snapshot.clock,
                stats.score,
                stats.perfect,
                stats.good,
                stats.miss,
                snapshot.remaining_notes,
                snapshot
                    .last_judgement
                    .map(|j| format!(" | {:?}", j))
                    .unwrap_or_default(),
            ),
        };
        if title != self.shown_title
            && let Some(window) = &self.window
        {
            window.set_title(&title);
            self.shown_title = title;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        log::info!("RENDER: Creating window...");
        let win_attr = Window::default_attributes()
            .with_title(format!("Engrenada Hero | {}", self.song_title))
            .with_inner_size(winit::dpi::LogicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT))
            .with_resizable(false);

        match event_loop.create_window(win_attr) {
            Ok(window) => {
                let window = Arc::new(window);
                match pollster::block_on(Renderer::new(window.clone())) {
                    Ok(renderer) => self.renderer = Some(renderer),
                    Err(e) => log::warn!("RENDER: {}, playing without graphics", e),
                }
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("RENDER: Unable to create the window: {}", e);
                self.session.abort();
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::KeyboardInput { .. } => {
                if let Some(input) = self.input.process_event(&event) {
                    self.handle_input(input);
                }
            }
            WindowEvent::CloseRequested => {
                log::info!("RENDER: Close requested");
                self.session.abort();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(*size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
