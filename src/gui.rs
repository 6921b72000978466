// BotConsole - gui.rs
//
// Top-level eframe::App implementation.
// Wires together all UI panels, drains the background workers each frame and
// drives the viewer's retry timer.

use crate::app::actions::{ActionManager, ActionRequest};
use crate::app::state::{AppState, FollowUp};
use crate::app::stream::StreamManager;
use crate::core::export::{export_csv, export_json};
use crate::core::model::LogEntry;
use crate::ui;
use crate::ui::panels::rate_limit::RateLimitCommand;
use crate::ui::panels::terminal::TerminalCommand;
use crate::util;
use crate::util::constants::STREAM_REPAINT_INTERVAL_MS;
use crate::util::error::ExportError;
use std::path::Path;
use std::time::{Duration, Instant};

/// Export formats offered by File > Export.
#[derive(Debug, Clone, Copy)]
enum ExportFormat {
    Csv,
    Json,
}

/// The BotConsole application.
pub struct BotConsoleApp {
    pub state: AppState,
    pub stream: StreamManager,
    pub actions: ActionManager,
}

impl BotConsoleApp {
    /// Create a new application instance with the given state.
    pub fn new(state: AppState) -> Self {
        let stream = StreamManager::new(&state.server_url);
        let actions = ActionManager::new(&state.server_url);
        Self {
            state,
            stream,
            actions,
        }
    }

    fn submit(&mut self, request: ActionRequest) {
        if matches!(request, ActionRequest::RefreshRateLimit) {
            self.state.mark_rate_limit_requested(Instant::now());
        }
        self.state.on_request_submitted(&request);
        self.actions.submit(request);
    }

    /// Apply queued stream events, then fire the retry timer if due.
    fn pump_stream(&mut self, now: Instant) -> bool {
        let events = self.stream.poll_events();
        let had_events = !events.is_empty();
        for event in events {
            self.state.viewer.handle_event(event, now, &mut self.stream);
        }
        self.state.viewer.tick(now, &mut self.stream);
        had_events
    }

    /// Apply completed action requests and run their follow-ups.
    fn pump_actions(&mut self, ctx: &egui::Context) -> bool {
        let outcomes = self.actions.poll_outcomes();
        let had_outcomes = !outcomes.is_empty();
        for outcome in outcomes {
            match self.state.apply_outcome(outcome) {
                Some(FollowUp::RefreshRateLimit) => self.submit(ActionRequest::RefreshRateLimit),
                Some(FollowUp::OpenUrl(url)) => {
                    tracing::info!(url = %url, "Opening share page");
                    ctx.open_url(egui::OpenUrl::new_tab(url));
                }
                None => {}
            }
        }
        had_outcomes
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ui::panels::notice::is_open(&self.state) {
            return;
        }
        let toggle = ctx.input_mut(|i| i.consume_key(egui::Modifiers::CTRL, egui::Key::Backtick));
        if toggle {
            self.state.viewer.toggle(&mut self.stream);
        }
        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if escape && self.state.viewer.config().visible {
            self.state.viewer.close(&mut self.stream);
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let (filter_name, ext) = match format {
            ExportFormat::Csv => ("CSV", "csv"),
            ExportFormat::Json => ("JSON", "json"),
        };
        let Some(dest) = rfd::FileDialog::new()
            .add_filter(filter_name, &[ext])
            .set_file_name(format!("botconsole-logs.{ext}"))
            .save_file()
        else {
            return;
        };

        let entries = self.state.viewer.buffer().to_vec();
        self.state.status_message = match write_export(format, &entries, &dest) {
            Ok(n) => format!("Exported {n} entries to {filter_name}."),
            Err(e) => {
                tracing::warn!(error = %e, "Export failed");
                format!("{filter_name} export failed: {e}")
            }
        };
    }

    /// Schedule the next frame so timers fire even without input.
    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if self.stream.is_active() || self.actions.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(STREAM_REPAINT_INTERVAL_MS));
        }
        let deadlines = [
            self.state.viewer.next_wakeup(),
            self.state.next_rate_limit_refresh(),
        ];
        if let Some(next) = deadlines.into_iter().flatten().min() {
            ctx.request_repaint_after(next.saturating_duration_since(now));
        }
    }
}

fn write_export(format: ExportFormat, entries: &[LogEntry], dest: &Path) -> util::error::Result<usize> {
    let file = std::fs::File::create(dest).map_err(|source| ExportError::Io {
        path: dest.to_path_buf(),
        source,
    })?;
    let written = match format {
        ExportFormat::Csv => export_csv(entries, file, dest)?,
        ExportFormat::Json => export_json(entries, file, dest)?,
    };
    tracing::info!(path = %dest.display(), entries = written, "Terminal buffer exported");
    Ok(written)
}

impl eframe::App for BotConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Background workers first so this frame shows their results.
        let had_events = self.pump_stream(now);
        let had_outcomes = self.pump_actions(ctx);
        if had_events || had_outcomes {
            ctx.request_repaint();
        }

        if self.state.rate_limit_refresh_due(now) {
            self.submit(ActionRequest::RefreshRateLimit);
        }

        self.handle_shortcuts(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let has_entries = !self.state.viewer.buffer().is_empty();
                    ui.add_enabled_ui(has_entries, |ui| {
                        ui.menu_button("Export", |ui| {
                            if ui.button("Export CSV...").clicked() {
                                self.export(ExportFormat::Csv);
                                ui.close_menu();
                            }
                            if ui.button("Export JSON...").clicked() {
                                self.export(ExportFormat::Json);
                                ui.close_menu();
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    let label = if self.state.viewer.config().visible {
                        "Hide Terminal (Ctrl+`)"
                    } else {
                        "Show Terminal (Ctrl+`)"
                    };
                    if ui.button(label).clicked() {
                        self.state.viewer.toggle(&mut self.stream);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.checkbox(&mut self.state.dark_mode, "Dark mode").changed() {
                        apply_theme(ctx, self.state.dark_mode);
                        ui.close_menu();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.state.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let conn = self.state.viewer.state();
                    let visible = self.state.viewer.config().visible;
                    let button = egui::Button::new(
                        egui::RichText::new(format!("\u{25cf} Terminal: {}", conn.label()))
                            .color(ui::theme::connection_colour(conn)),
                    )
                    .selected(visible);
                    if ui.add(button).on_hover_text("Toggle terminal (Ctrl+`)").clicked() {
                        self.state.viewer.toggle(&mut self.stream);
                    }
                    ui.separator();
                    ui.label(&self.state.status_message);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(&self.state.server_url).weak().small());
                        if self.state.debug_mode {
                            ui.label(egui::RichText::new("DEBUG").small().strong());
                        }
                    });
                });
            });

        // Central panel: status and actions
        let mut requests: Vec<ActionRequest> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if !self.state.warnings.is_empty() {
                    egui::CollapsingHeader::new(format!(
                        "\u{26a0} {} configuration warning(s)",
                        self.state.warnings.len()
                    ))
                    .default_open(false)
                    .show(ui, |ui| {
                        for w in &self.state.warnings {
                            ui.label(egui::RichText::new(w).small());
                        }
                    });
                    ui.separator();
                }

                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    match ui::panels::rate_limit::render(ui, &self.state) {
                        Some(RateLimitCommand::Retry) => requests.push(ActionRequest::RetryRateLimited),
                        Some(RateLimitCommand::Refresh) => requests.push(ActionRequest::RefreshRateLimit),
                        None => {}
                    }
                });
                ui.add_space(8.0);

                let busy = self.state.tweet_action_busy();
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    if let Some(request) = ui::panels::actions::render(ui, &mut self.state, busy) {
                        requests.push(request);
                    }
                });
            });
        });

        // Floating terminal
        match ui::panels::terminal::render(ctx, &mut self.state) {
            Some(TerminalCommand::Close) => self.state.viewer.close(&mut self.stream),
            Some(TerminalCommand::Reconnect) => self.state.viewer.reconnect(&mut self.stream),
            None => {}
        }

        // Dialogs
        if let Some(request) = ui::panels::notice::render(ctx, &mut self.state) {
            requests.push(request);
        }
        ui::panels::about::render(ctx, &mut self.state);

        for request in requests {
            self.submit(request);
        }

        self.schedule_repaint(ctx, now);
    }

    /// Called by eframe when the application window is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.viewer.close(&mut self.stream);
        tracing::info!("BotConsole exiting");
    }
}

/// Apply dark or light visuals.
pub fn apply_theme(ctx: &egui::Context, dark_mode: bool) {
    if dark_mode {
        ctx.set_visuals(egui::Visuals::dark());
    } else {
        ctx.set_visuals(egui::Visuals::light());
    }
}

/// Scale the body and button text styles to `font_size`.
pub fn apply_font_size(ctx: &egui::Context, font_size: f32) {
    ctx.style_mut(|style| {
        for (text_style, font_id) in style.text_styles.iter_mut() {
            match text_style {
                egui::TextStyle::Body | egui::TextStyle::Button | egui::TextStyle::Monospace => {
                    font_id.size = font_size;
                }
                egui::TextStyle::Heading => font_id.size = font_size * 1.4,
                egui::TextStyle::Small => font_id.size = font_size * 0.75,
                _ => {}
            }
        }
    });
}
