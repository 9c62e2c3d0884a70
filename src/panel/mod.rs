pub mod ring;

use std::time::Duration;

use winit::window::Window;

use self::ring::RingBuffer;
use crate::pet::BehaviorState;
use crate::render::GpuState;

/// Number of frame times kept for the history strip.
const FRAME_HISTORY_LEN: usize = 120;

/// How often the frame stats line is logged (seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;

/// A button press the host should forward to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Treat,
    Clean,
    Sleep,
    Wake,
}

impl PanelAction {
    const ALL: [PanelAction; 4] = [Self::Treat, Self::Clean, Self::Sleep, Self::Wake];

    fn label(self) -> &'static str {
        match self {
            Self::Treat => "Treat",
            Self::Clean => "Clean",
            Self::Sleep => "Sleep",
            Self::Wake => "Wake",
        }
    }

    fn hint(self) -> &'static str {
        match self {
            Self::Treat => "Drop a treat (T)",
            Self::Clean => "Clean up all poop (C)",
            Self::Sleep => "Put the pet to sleep (S)",
            Self::Wake => "Wake the pet up (W)",
        }
    }
}

/// What the status line shows. Filled in by the app from simulation queries.
#[derive(Debug, Clone, Copy)]
pub struct PanelStatus {
    pub state: BehaviorState,
    pub pet_x: f32,
    pub treats: usize,
    pub poops: usize,
    pub streak: u32,
    pub ticks: u64,
}

/// Paint output of one egui pass.
pub struct PanelFrame {
    pub primitives: Vec<egui::epaint::ClippedPrimitive>,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
    /// How long egui is happy to wait before the next repaint.
    pub repaint_after: Duration,
}

/// egui texture changes not yet applied to the GPU. Uploads from a frame
/// that never reached the screen stay queued; egui sends the font atlas
/// only once.
#[derive(Default)]
struct TextureQueue {
    pending: egui::TexturesDelta,
    to_free: Vec<egui::TextureId>,
}

impl TextureQueue {
    fn defer(&mut self, delta: egui::TexturesDelta) {
        self.pending.append(delta);
    }

    /// Everything to upload now, oldest first. Frees are held back until
    /// after the frame that last used them is submitted.
    fn take_uploads(&mut self) -> Vec<(egui::TextureId, egui::epaint::ImageDelta)> {
        let delta = std::mem::take(&mut self.pending);
        self.to_free.extend(delta.free);
        delta.set
    }

    fn take_frees(&mut self) -> Vec<egui::TextureId> {
        std::mem::take(&mut self.to_free)
    }
}

/// Control strip under the sky, powered by egui.
pub struct ControlPanel {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    /// Top-left of the panel window, in points.
    anchor: [f32; 2],
    textures: TextureQueue,

    /// Rolling window of frame times (seconds).
    frame_times: RingBuffer<f64>,
    frame_time_avg: f64,
    frame_time_max: f64,

    // Periodic stats log.
    frame_count: u64,
    log_timer: f64,
    log_frame_count: u32,
    log_frame_sum: f64,
    log_frame_max: f64,
}

impl ControlPanel {
    pub fn new(window: &Window, gpu: &GpuState, anchor: [f32; 2]) -> Self {
        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::light());

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            anchor,
            textures: TextureQueue::default(),
            frame_times: RingBuffer::new(FRAME_HISTORY_LEN),
            frame_time_avg: 0.0,
            frame_time_max: 0.0,
            frame_count: 0,
            log_timer: 0.0,
            log_frame_count: 0,
            log_frame_sum: 0.0,
            log_frame_max: 0.0,
        }
    }

    /// Record the time since the previous redraw and periodically log it.
    pub fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frame_times.push(dt);

        let len = self.frame_times.len();
        let (sum, max) = self
            .frame_times
            .iter()
            .fold((0.0, 0.0f64), |(sum, max), &t| (sum + t, max.max(t)));
        self.frame_time_avg = sum / len as f64;
        self.frame_time_max = max;

        self.log_frame_count += 1;
        self.log_frame_sum += dt;
        self.log_frame_max = self.log_frame_max.max(dt);
        self.log_timer += dt;

        if self.log_timer >= STATS_LOG_INTERVAL {
            log::info!(
                "Redraws: {:.1}/s | avg: {:.1}ms | max: {:.1}ms | total frames: {}",
                self.log_frame_count as f64 / self.log_timer,
                self.log_frame_sum / self.log_frame_count as f64 * 1000.0,
                self.log_frame_max * 1000.0,
                self.frame_count,
            );
            self.log_timer = 0.0;
            self.log_frame_count = 0;
            self.log_frame_sum = 0.0;
            self.log_frame_max = 0.0;
        }
    }

    /// Forward a winit event to egui.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Run the egui frame. Button presses are appended to `actions`.
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        status: PanelStatus,
        actions: &mut Vec<PanelAction>,
    ) -> PanelFrame {
        let raw_input = self.egui_state.take_egui_input(window);

        let ui_state = UiSnapshot {
            anchor: self.anchor,
            status,
            frame_times: self.frame_times.iter().copied().collect(),
            frame_time_avg: self.frame_time_avg,
            frame_time_max: self.frame_time_max,
        };

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &ui_state, actions);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let repaint_after = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map_or(Duration::MAX, |v| v.repaint_delay);

        self.textures.defer(full_output.textures_delta);

        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        PanelFrame {
            primitives,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [screen_w, screen_h],
                pixels_per_point,
            },
            repaint_after,
        }
    }

    /// Upload queued egui textures. Needs no surface texture, so call it
    /// before acquiring one.
    pub fn upload_textures(&mut self, gpu: &GpuState) {
        for (id, image_delta) in self.textures.take_uploads() {
            self.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, id, &image_delta);
        }
    }

    /// Upload vertex and index buffers. Call before the panel render pass.
    pub fn prepare(
        &mut self,
        gpu: &GpuState,
        encoder: &mut wgpu::CommandEncoder,
        frame: &PanelFrame,
    ) -> Vec<wgpu::CommandBuffer> {
        self.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            encoder,
            &frame.primitives,
            &frame.screen_descriptor,
        )
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'static>, frame: &PanelFrame) {
        self.egui_renderer
            .render(render_pass, &frame.primitives, &frame.screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self) {
        for id in self.textures.take_frees() {
            self.egui_renderer.free_texture(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw
// ---------------------------------------------------------------------------

struct UiSnapshot {
    anchor: [f32; 2],
    status: PanelStatus,
    frame_times: Vec<f64>,
    frame_time_avg: f64,
    frame_time_max: f64,
}

fn status_line(s: &PanelStatus) -> String {
    format!(
        "{} at x {:.0} | treats: {} | poop: {} | streak: {}",
        s.state.label(),
        s.pet_x,
        s.treats,
        s.poops,
        s.streak,
    )
}

fn draw_ui(ctx: &egui::Context, s: &UiSnapshot, actions: &mut Vec<PanelAction>) {
    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgb(246, 240, 228))
        .corner_radius(6.0)
        .inner_margin(8.0);

    egui::Window::new("Controls")
        .title_bar(false)
        .fixed_pos(s.anchor)
        .resizable(false)
        .movable(false)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for action in PanelAction::ALL {
                    let button = egui::Button::new(action.label()).min_size(egui::vec2(64.0, 24.0));
                    if ui.add(button).on_hover_text(action.hint()).clicked() {
                        actions.push(action);
                    }
                }
                ui.separator();
                ui.label(egui::RichText::new(status_line(&s.status)).monospace());
            });
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "frame {:>5.1}ms avg {:>5.1}ms max | tick {}",
                        s.frame_time_avg * 1000.0,
                        s.frame_time_max * 1000.0,
                        s.status.ticks,
                    ))
                    .monospace()
                    .small(),
                );

                if s.frame_times.is_empty() {
                    return;
                }
                let scale = s.frame_time_max.max(0.2);
                let (response, painter) =
                    ui.allocate_painter(egui::vec2(240.0, 18.0), egui::Sense::hover());
                let rect = response.rect;
                let bar_width = rect.width() / FRAME_HISTORY_LEN as f32;

                for (i, &t) in s.frame_times.iter().enumerate() {
                    let h = (t / scale).min(1.0) as f32 * rect.height();
                    let x = rect.left() + i as f32 * bar_width;
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x, rect.bottom() - h),
                            egui::pos2(x + bar_width, rect.bottom()),
                        ),
                        0.0,
                        egui::Color32::from_rgb(110, 160, 210),
                    );
                }
            });
        });
}
