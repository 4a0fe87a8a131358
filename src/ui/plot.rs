use eframe::egui::Ui;
use egui_extras::{Size, StripBuilder};
use egui_plot::{Legend, Line, Plot};

use crate::color::CarrierColors;
use crate::data::model::{DelayCause, DelaySeries};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Lay out the five charts: two rows of two, then one at 65% width.
pub fn delay_charts(ui: &mut Ui, state: &AppState) {
    let chart = |ui: &mut Ui, cause: DelayCause| {
        delay_chart(ui, state.breakdown.series(cause), &state.colors);
    };

    StripBuilder::new(ui)
        .sizes(Size::remainder(), 3)
        .vertical(|mut rows| {
            for (left, right) in [
                (DelayCause::Carrier, DelayCause::Weather),
                (DelayCause::Nas, DelayCause::Security),
            ] {
                rows.strip(|builder| {
                    builder
                        .sizes(Size::remainder(), 2)
                        .horizontal(|mut cells| {
                            cells.cell(|ui| chart(ui, left));
                            cells.cell(|ui| chart(ui, right));
                        });
                });
            }
            rows.strip(|builder| {
                builder
                    .size(Size::relative(0.65))
                    .size(Size::remainder())
                    .horizontal(|mut cells| {
                        cells.cell(|ui| chart(ui, DelayCause::LateAircraft));
                        cells.empty();
                    });
            });
        });
}

// ---------------------------------------------------------------------------
// Single chart
// ---------------------------------------------------------------------------

/// Mean delay by month, one line per carrier.
pub fn delay_chart(ui: &mut Ui, series: &DelaySeries, colors: &CarrierColors) {
    let cause = series.cause;
    ui.vertical(|ui: &mut Ui| {
        ui.strong(cause.title());
        Plot::new(cause.key())
            .legend(Legend::default())
            .x_axis_label("Month")
            .y_axis_label(cause.column())
            .include_x(1.0)
            .include_x(12.0)
            .include_y(0.0)
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(false)
            .allow_zoom(true)
            .show(ui, |plot_ui| {
                for (airline, points) in series.lines_by_airline() {
                    let line = Line::new(points)
                        .name(airline)
                        .color(colors.color_for(airline))
                        .width(1.5);
                    plot_ui.line(line);
                }
            });
    });
}
