// BotConsole - ui/panels/terminal.rs
//
// Floating live-log terminal window.
//
// The header shows the connection status and the terminal controls; the body
// is a virtual-scrolling list (`ScrollArea::show_rows`) so only visible lines
// are laid out, whatever the buffer size.
//
// Every line is built as a LayoutJob from already-sanitised text: the level
// badge carries the level colour, the rest uses the high-contrast body colour.
// Nothing in a message is ever interpreted as markup.
//
// Controls that need the stream transport (close, reconnect) are returned to
// the caller as a `TerminalCommand`; the rest mutate the viewer directly.

use crate::app::state::AppState;
use crate::core::model::ConnectionState;
use crate::ui::theme;
use egui::text::{LayoutJob, TextFormat};

/// A control the caller must apply with the transport in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalCommand {
    Close,
    Reconnect,
}

/// Render the terminal window (if visible).
pub fn render(ctx: &egui::Context, state: &mut AppState) -> Option<TerminalCommand> {
    let config = state.viewer.config();
    if !config.visible {
        return None;
    }

    let mut command = None;
    let dark_mode = state.dark_mode;

    egui::Window::new("Live Logs")
        .id(egui::Id::new("live_log_terminal"))
        .collapsible(false)
        .title_bar(false)
        .resizable(!config.minimized)
        .default_size([theme::TERMINAL_DEFAULT_WIDTH, theme::TERMINAL_DEFAULT_HEIGHT])
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -40.0])
        .frame(egui::Frame::window(&ctx.style()).fill(theme::terminal_bg(dark_mode)))
        .show(ctx, |ui| {
            command = render_header(ui, state);
            if !state.viewer.config().minimized {
                ui.separator();
                render_body(ui, state);
            }
        });

    command
}

fn render_header(ui: &mut egui::Ui, state: &mut AppState) -> Option<TerminalCommand> {
    let mut command = None;
    let conn = state.viewer.state();
    let config = state.viewer.config();

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("\u{25cf}").color(theme::connection_colour(conn)));
        ui.label(egui::RichText::new("Live Logs").strong());
        ui.label(egui::RichText::new(conn.label()).weak());
        if state.viewer.retry_pending() {
            ui.label(
                egui::RichText::new(format!(
                    "(retry in {}s)",
                    state.viewer.retry_delay().as_secs_f32().round() as u64
                ))
                .small()
                .weak(),
            );
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .small_button("\u{2715}")
                .on_hover_text("Close terminal (Esc)")
                .clicked()
            {
                command = Some(TerminalCommand::Close);
            }
            let min_label = if config.minimized { "\u{25b2}" } else { "\u{25bc}" };
            let min_hover = if config.minimized { "Restore" } else { "Minimise" };
            if ui.small_button(min_label).on_hover_text(min_hover).clicked() {
                state.viewer.minimize();
            }
            if ui.small_button("Clear").on_hover_text("Clear terminal").clicked() {
                state.viewer.clear();
            }
            let scroll_label = if config.auto_scroll {
                "Auto-scroll: on"
            } else {
                "Auto-scroll: off"
            };
            if ui
                .selectable_label(config.auto_scroll, scroll_label)
                .on_hover_text("Follow new lines as they arrive")
                .clicked()
            {
                state.viewer.toggle_auto_scroll();
            }
            let can_reconnect = conn != ConnectionState::Connected;
            if ui
                .add_enabled(can_reconnect, egui::Button::new("Reconnect").small())
                .on_hover_text("Reconnect now")
                .clicked()
            {
                command = Some(TerminalCommand::Reconnect);
            }
            ui.label(
                egui::RichText::new(format!(
                    "{}/{}",
                    state.viewer.buffer().len(),
                    state.viewer.buffer().capacity()
                ))
                .small()
                .weak(),
            );
        });
    });

    command
}

fn render_body(ui: &mut egui::Ui, state: &mut AppState) {
    let dark_mode = state.dark_mode;
    let auto_scroll = state.viewer.config().auto_scroll;
    let scroll_now = state.viewer.take_scroll_request();

    let font = egui::FontId::monospace(theme::TERMINAL_FONT_SIZE);
    let row_height = ui.fonts(|f| f.row_height(&font)) + ui.spacing().item_spacing.y;
    let lines = state.terminal_lines();
    let total = lines.len();

    let mut area = egui::ScrollArea::both()
        .id_salt("terminal_scroll")
        .auto_shrink([false; 2])
        .stick_to_bottom(auto_scroll);
    if scroll_now {
        // Clamped to the bottom by egui.
        area = area.vertical_scroll_offset(row_height * total as f32);
    }

    area.show_rows(ui, row_height, total, |ui, row_range| {
        for line in &lines[row_range] {
            let mut job = LayoutJob::default();
            job.append(
                &format!("{} ", line.timestamp),
                0.0,
                TextFormat {
                    font_id: font.clone(),
                    color: theme::timestamp_colour(dark_mode),
                    ..Default::default()
                },
            );
            job.append(
                &format!("[{:<4}] ", line.level.short_label()),
                0.0,
                TextFormat {
                    font_id: font.clone(),
                    color: theme::level_colour(line.level, dark_mode),
                    ..Default::default()
                },
            );
            job.append(
                &line.text,
                0.0,
                TextFormat {
                    font_id: font.clone(),
                    color: if line.is_marker {
                        theme::timestamp_colour(dark_mode)
                    } else {
                        theme::terminal_text_colour(dark_mode)
                    },
                    italics: line.is_marker,
                    ..Default::default()
                },
            );
            ui.add(egui::Label::new(job).extend());
        }
    });
}
