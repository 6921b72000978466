// BotConsole - ui/panels/rate_limit.rs
//
// Rate-limit status card. The retry button is offered only when the backend
// says a retry is possible, and is disabled and relabelled while the retry
// request is in flight.

use crate::app::state::AppState;
use crate::core::rate_limit::RateLimitView;

/// What the operator asked for in this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitCommand {
    Retry,
    Refresh,
}

/// Render the rate-limit card.
pub fn render(ui: &mut egui::Ui, state: &AppState) -> Option<RateLimitCommand> {
    let mut command = None;

    ui.horizontal(|ui| {
        ui.heading("Rate limit");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let refreshing = state.rate_limit_in_flight;
            if ui
                .add_enabled(!refreshing, egui::Button::new("\u{21bb}").small())
                .on_hover_text("Refresh status")
                .clicked()
            {
                command = Some(RateLimitCommand::Refresh);
            }
            if refreshing {
                ui.spinner();
            }
        });
    });
    ui.add_space(4.0);

    match &state.rate_limit {
        RateLimitView::Loading => {
            ui.label(egui::RichText::new("Loading status\u{2026}").weak());
        }
        RateLimitView::Clear => {
            ui.label(
                egui::RichText::new("\u{2714} No rate limit issues")
                    .color(egui::Color32::from_rgb(34, 197, 94)),
            );
        }
        RateLimitView::Limited {
            count,
            can_post,
            reset_minutes,
            ..
        } => {
            ui.label(
                egui::RichText::new(format!("\u{26a0} {count} tweet(s) held back by rate limit"))
                    .color(egui::Color32::from_rgb(245, 158, 11)),
            );
            egui::Grid::new("rate_limit_grid")
                .num_columns(2)
                .spacing([12.0, 2.0])
                .show(ui, |ui| {
                    ui.label("API can post:");
                    ui.label(if *can_post { "Yes" } else { "No" });
                    ui.end_row();
                    if !can_post {
                        ui.label("Resets in:");
                        ui.label(RateLimitView::reset_label(*reset_minutes));
                        ui.end_row();
                    }
                });
        }
        RateLimitView::Failed(error) => {
            ui.label(
                egui::RichText::new(format!("Error loading status: {error}"))
                    .color(egui::Color32::from_rgb(239, 68, 68)),
            );
        }
        RateLimitView::Unreachable => {
            ui.label(
                egui::RichText::new("Error loading rate limit status")
                    .color(egui::Color32::from_rgb(239, 68, 68)),
            );
        }
    }

    if state.rate_limit.retry_available() {
        ui.add_space(6.0);
        let label = if state.retry_in_flight {
            "Retrying\u{2026}"
        } else {
            "Retry rate-limited tweets"
        };
        if ui
            .add_enabled(!state.retry_in_flight, egui::Button::new(label))
            .clicked()
        {
            command = Some(RateLimitCommand::Retry);
        }
    }

    command
}
