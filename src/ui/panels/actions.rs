// BotConsole - ui/panels/actions.rs
//
// Tweet action form: a tweet id field plus post / delete / manual post
// buttons. Post and delete only raise a confirmation; the request is sent
// once the operator accepts it (see `notice::render`).

use crate::app::actions::ActionRequest;
use crate::app::state::{AppState, PendingConfirm};

/// Render the action form. Returns a request to submit immediately.
pub fn render(ui: &mut egui::Ui, state: &mut AppState, busy: bool) -> Option<ActionRequest> {
    let mut request = None;

    ui.heading("Tweet actions");
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.label("Tweet id:");
        ui.add(
            egui::TextEdit::singleline(&mut state.tweet_id_input)
                .hint_text("e.g. 1234")
                .desired_width(160.0),
        );
    });
    ui.add_space(4.0);

    let tweet_id = state.tweet_id();
    let enabled = tweet_id.is_some() && !busy;

    ui.horizontal(|ui| {
        if ui
            .add_enabled(enabled, egui::Button::new("Post now"))
            .on_hover_text("Post via the API")
            .clicked()
        {
            if let Some(ref id) = tweet_id {
                state.pending_confirm = Some(PendingConfirm::Post {
                    tweet_id: id.clone(),
                });
            }
        }
        if ui
            .add_enabled(enabled, egui::Button::new("Manual post"))
            .on_hover_text("Open the share page in your browser")
            .clicked()
        {
            if let Some(ref id) = tweet_id {
                request = Some(ActionRequest::ManualPost {
                    tweet_id: id.clone(),
                });
            }
        }
        if ui
            .add_enabled(
                enabled,
                egui::Button::new(
                    egui::RichText::new("Delete").color(egui::Color32::from_rgb(239, 68, 68)),
                ),
            )
            .clicked()
        {
            if let Some(ref id) = tweet_id {
                state.pending_confirm = Some(PendingConfirm::Delete {
                    tweet_id: id.clone(),
                });
            }
        }
        if busy {
            ui.spinner();
        }
    });

    request
}
