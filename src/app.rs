use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::SpriteSheet;
use crate::panel::{ControlPanel, PanelAction, PanelStatus};
use crate::render::instance::{build_instances, SpriteInstance};
use crate::render::GpuState;
use crate::sim::config::{SimConfig, TICK};
use crate::sim::Simulation;

/// Max accumulated time before we clamp (a suspended laptop should not
/// replay minutes of ticks on wake).
const MAX_ACCUMULATOR: f64 = 1.0;
/// Simulation viewport, in logical pixels.
const VIEWPORT_W: f32 = 720.0;
const VIEWPORT_H: f32 = 72.0;
/// Height of the control strip under the viewport.
const PANEL_H: f32 = 80.0;
const PANEL_MARGIN: f32 = 6.0;

fn apply_action(sim: &mut Simulation, action: PanelAction) {
    log::debug!("action: {action:?}");
    match action {
        PanelAction::Treat => sim.spawn_treat(),
        PanelAction::Clean => sim.clean_all_poop(),
        PanelAction::Sleep => sim.sleep(),
        PanelAction::Wake => sim.wake(),
    }
}

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    panel: Option<ControlPanel>,

    sim: Simulation,
    sheet: SpriteSheet,

    // Fixed timestep
    last_tick_time: Option<Instant>,
    accumulator: f64,

    // Redraw bookkeeping
    last_frame_time: Option<Instant>,
    panel_repaint_at: Option<Instant>,

    // Reusable per-frame buffers
    instance_buf: Vec<SpriteInstance>,
    actions: Vec<PanelAction>,

    /// Set when window or GPU setup fails inside the event loop.
    init_error: Option<Box<dyn Error>>,
}

impl App {
    fn new() -> Self {
        let sheet = SpriteSheet::builtin();
        let config = SimConfig::new(Vec2::new(VIEWPORT_W, VIEWPORT_H));
        let sim = Simulation::new(config, sheet.frame_counts(), fastrand::Rng::new());

        Self {
            window: None,
            gpu: None,
            panel: None,
            sim,
            sheet,
            last_tick_time: None,
            accumulator: 0.0,
            last_frame_time: None,
            panel_repaint_at: None,
            instance_buf: Vec::with_capacity(64),
            actions: Vec::with_capacity(4),
            init_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        // Start hidden so the first visible frame is an actual frame.
        let attrs = WindowAttributes::default()
            .with_title("SkyPet")
            .with_inner_size(LogicalSize::new(VIEWPORT_W, VIEWPORT_H + PANEL_H))
            .with_resizable(false)
            .with_visible(false);

        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();
        log::info!(
            "Window created: {}x{} (scale {:.2})",
            size.width,
            size.height,
            window.scale_factor()
        );

        let gpu = GpuState::new(window.clone())?;
        log::info!("wgpu + sprite pipeline initialized");

        let panel = ControlPanel::new(
            &window,
            &gpu,
            [PANEL_MARGIN, VIEWPORT_H + PANEL_MARGIN],
        );

        window.set_visible(true);
        window.request_redraw();

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.panel = Some(panel);
        Ok(())
    }

    /// Run as many fixed ticks as real time allows.
    fn run_fixed_update(&mut self, now: Instant) {
        let tick_rate = TICK.as_secs_f64();
        let Some(last) = self.last_tick_time.replace(now) else {
            return;
        };

        self.accumulator += now.duration_since(last).as_secs_f64();
        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        while self.accumulator >= tick_rate {
            self.sim.update();
            self.accumulator -= tick_rate;
        }
    }

    /// Time until the next tick is due.
    fn until_next_tick(&self) -> Duration {
        Duration::from_secs_f64((TICK.as_secs_f64() - self.accumulator).max(0.0))
    }

    /// Keyboard shortcuts. Returns false when the app should quit.
    fn on_key(&mut self, event: &KeyEvent) -> bool {
        if event.state != ElementState::Pressed || event.repeat {
            return true;
        }
        let action = match &event.logical_key {
            Key::Named(NamedKey::Escape) => return false,
            Key::Character(c) => match c.to_lowercase().as_str() {
                "t" => PanelAction::Treat,
                "c" => PanelAction::Clean,
                "s" => PanelAction::Sleep,
                "w" => PanelAction::Wake,
                _ => return true,
            },
            _ => return true,
        };
        apply_action(&mut self.sim, action);
        true
    }

    fn status(&self) -> PanelStatus {
        PanelStatus {
            state: self.sim.state(),
            pet_x: self.sim.pet().pos.x,
            treats: self.sim.treat_count(),
            poops: self.sim.poop_count(),
            streak: self.sim.treat_streak(),
            ticks: self.sim.tick_count(),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        if let (Some(last), Some(panel)) = (self.last_frame_time, self.panel.as_mut()) {
            panel.record_frame(now.duration_since(last).as_secs_f64());
        }
        self.last_frame_time = Some(now);

        let status = self.status();
        let (Some(window), Some(gpu), Some(panel)) =
            (self.window.as_ref(), self.gpu.as_mut(), self.panel.as_mut())
        else {
            return;
        };

        // --- Panel UI (may queue actions) ---
        let size = window.inner_size();
        self.actions.clear();
        let panel_frame =
            panel.run_frame(window, size.width, size.height, status, &mut self.actions);
        self.panel_repaint_at = now.checked_add(panel_frame.repaint_after);

        for action in self.actions.drain(..) {
            apply_action(&mut self.sim, action);
        }

        // --- Sprites ---
        build_instances(&self.sim.scene(), &self.sheet, &mut self.instance_buf);
        gpu.update_instances(&self.instance_buf);
        panel.upload_textures(gpu);

        let Some(mut frame) = gpu.begin_frame() else {
            // Try again next tick rather than waiting for the sim to change.
            self.panel_repaint_at = now.checked_add(TICK);
            return;
        };
        gpu.draw_sprites(&mut frame.encoder, &frame.view);

        let panel_cmds = panel.prepare(gpu, &mut frame.encoder, &panel_frame);
        {
            let mut pass = GpuState::begin_panel_pass(&mut frame.encoder, &frame.view);
            panel.render(&mut pass, &panel_frame);
        }

        gpu.finish_frame(frame.encoder, frame.output, panel_cmds);
        panel.free_textures();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let now = Instant::now();
        self.run_fixed_update(now);

        let panel_due = self.panel_repaint_at.is_some_and(|at| at <= now);
        if self.sim.take_dirty() || panel_due {
            self.panel_repaint_at = None;
            window.request_redraw();
        }

        let mut wake_at = now + self.until_next_tick();
        if let Some(at) = self.panel_repaint_at {
            wake_at = wake_at.min(at);
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(wake_at));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let mut consumed = false;
        if let Some(panel) = &mut self.panel {
            let response = panel.on_window_event(&window, &event);
            if response.repaint {
                window.request_redraw();
            }
            consumed = response.consumed;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                window.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.set_scale_factor(scale_factor);
                }
                window.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                if !self.on_key(&event) {
                    log::info!("ESC pressed, exiting");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Entry point: create event loop and run.
pub fn run() -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
