// BotConsole - ui/panels/notice.rs
//
// Blocking dialogs: the notice modal (action results) and the yes/no
// confirmation modal. Both use `egui::Modal`, which dims the window and
// swallows input elsewhere until dismissed.

use crate::app::actions::ActionRequest;
use crate::app::state::{AppState, NoticeKind};

/// Whether a modal is currently shown (keyboard shortcuts are suspended).
pub fn is_open(state: &AppState) -> bool {
    state.notice.is_some() || state.pending_confirm.is_some()
}

/// Render the pending confirmation, then the notice. Returns the request to
/// send when the operator confirms.
pub fn render(ctx: &egui::Context, state: &mut AppState) -> Option<ActionRequest> {
    let accepted = render_confirm(ctx, state);
    render_notice(ctx, state);
    accepted
}

fn render_confirm(ctx: &egui::Context, state: &mut AppState) -> Option<ActionRequest> {
    let confirm = state.pending_confirm.clone()?;

    let mut answer: Option<bool> = None;
    let modal = egui::Modal::new(egui::Id::new("confirm_modal")).show(ctx, |ui| {
        ui.set_width(340.0);
        ui.heading("Confirm");
        ui.add_space(6.0);
        ui.label(confirm.question());
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("Yes").clicked() {
                answer = Some(true);
            }
            if ui.button("No").clicked() {
                answer = Some(false);
            }
        });
    });
    if modal.should_close() && answer.is_none() {
        answer = Some(false);
    }

    match answer {
        Some(true) => {
            state.pending_confirm = None;
            Some(confirm.accept())
        }
        Some(false) => {
            tracing::debug!(question = %confirm.question(), "Confirmation declined");
            state.pending_confirm = None;
            None
        }
        None => None,
    }
}

fn render_notice(ctx: &egui::Context, state: &mut AppState) {
    // A confirmation takes precedence; the notice waits behind it.
    if state.pending_confirm.is_some() {
        return;
    }
    let Some(notice) = state.notice.clone() else {
        return;
    };

    let mut dismissed = false;
    let modal = egui::Modal::new(egui::Id::new("notice_modal")).show(ctx, |ui| {
        ui.set_width(360.0);
        let colour = match notice.kind {
            NoticeKind::Success => egui::Color32::from_rgb(34, 197, 94),
            NoticeKind::Error => egui::Color32::from_rgb(239, 68, 68),
        };
        ui.label(egui::RichText::new(&notice.title).heading().color(colour));
        ui.add_space(6.0);
        ui.label(&notice.message);
        ui.add_space(10.0);
        if ui.button("OK").clicked() {
            dismissed = true;
        }
    });
    if dismissed || modal.should_close() {
        state.notice = None;
    }
}
