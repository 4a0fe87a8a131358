use eframe::egui::{self, Color32, RichText, TextStyle, Ui};

use crate::state::AppState;

pub const TITLE: &str = "Flight Delay Time Statistics";

const TITLE_COLOR: Color32 = Color32::from_rgb(0x50, 0x3D, 0x36);

// ---------------------------------------------------------------------------
// Header – title and year input
// ---------------------------------------------------------------------------

/// Render the page header. Editing the year recomputes the charts
/// before this frame's central panel draws them.
pub fn header(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(6.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(TITLE).size(30.0).strong().color(TITLE_COLOR));
    });
    ui.add_space(6.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new("Input Year: ").size(25.0));
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.year_input)
                .desired_width(100.0)
                .font(TextStyle::Heading),
        );
        if response.changed() {
            state.apply_year_input();
        }

        ui.separator();
        ui.label(state.dataset().summary());

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
    ui.add_space(6.0);
}
