use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::{ActionStates, EdgeStates};
use super::metrics::MetricsAccumulator;
use super::{InputAction, InputEdge, InputSnapshot, Renderer, Scene, SceneWorld};

pub const SLOW_FRAME_ENV_VAR: &str = "KEYQUEST_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Key Quest".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            metrics_log_interval: Duration::from_secs(5),
            simulated_slow_frame_ms: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` with one fixed tick per redraw until
/// the window closes or Escape is pressed. Each iteration sleeps away
/// whatever is left of the tick budget after update and render.
pub fn run_app(
    config: LoopConfig,
    sprites_dir: PathBuf,
    mut scene: Box<dyn Scene>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(
        Arc::clone(&window),
        config.window_width,
        config.window_height,
        sprites_dir,
    )
    .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let tick_budget = Duration::from_secs_f64(1.0 / target_tps as f64);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(5));
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);

    let mut world = SceneWorld::default();
    scene.load(&mut world);
    info!("scene_loaded");
    info!(
        target_tps,
        tick_budget_us = tick_budget.as_micros() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let tick_start = begin_tick(slow_frame_delay);
                    let input_snapshot = input_collector.snapshot_for_tick();
                    scene.update(&input_snapshot, &mut world);

                    if let Err(error) = renderer.render_world(&world) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }

                    let work_time = tick_start.elapsed();
                    metrics_accumulator.record_tick(work_time, tick_budget);
                    metrics_accumulator.record_frame();

                    let sleep = compute_tick_sleep(work_time, tick_budget);
                    if sleep > Duration::ZERO {
                        thread::sleep(sleep);
                    }

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(Instant::now()) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            work_time_ms = snapshot.work_time_ms,
                            overrun_ticks = snapshot.overrun_ticks,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload(&mut world);
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    edges: EdgeStates,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state, key_event.repeat);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState, repeat: bool) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let is_pressed = state == ElementState::Pressed;
        if let Some(action) = action_for_key(code) {
            self.action_states.set(action, is_pressed);
            if action == InputAction::Quit && is_pressed {
                self.quit_requested = true;
            }
        }
        for edge in edges_for_key(code) {
            self.edges.handle(*edge, state, repeat);
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.edges.take_pressed(),
        )
    }
}

fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::Space | KeyCode::ArrowUp | KeyCode::KeyW => Some(InputAction::Jump),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

fn edges_for_key(code: KeyCode) -> &'static [InputEdge] {
    match code {
        KeyCode::Space => &[InputEdge::Confirm],
        KeyCode::Enter | KeyCode::NumpadEnter => &[InputEdge::Confirm, InputEdge::MenuSelect],
        KeyCode::KeyI => &[InputEdge::MenuToggle],
        KeyCode::ArrowUp => &[InputEdge::MenuUp],
        KeyCode::ArrowDown => &[InputEdge::MenuDown],
        _ => &[],
    }
}

/// Marks the start of a tick's work. The debug slow-frame delay is taken
/// after the mark so it is measured as work and can trigger overruns.
fn begin_tick(slow_frame_delay: Duration) -> Instant {
    let tick_start = Instant::now();
    if slow_frame_delay > Duration::ZERO {
        thread::sleep(slow_frame_delay);
    }
    tick_start
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn compute_tick_sleep(work_time: Duration, budget: Duration) -> Duration {
    budget.saturating_sub(work_time)
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => parse_slow_frame_ms(&value).unwrap_or_else(|| {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                value = value.as_str(),
                "invalid slow-frame env var value; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }),
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

fn parse_slow_frame_ms(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}
