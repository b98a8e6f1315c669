use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::model::Variant;
use crate::state::AppState;
use crate::ui::{plot, table};

/// Render the central panel: line chart, comparison bar chart, optional
/// forecast-vs-realized scatter, and the filtered-data table.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Loading dataset…");
        });
        return;
    }

    // Pause the views entirely while nothing is selected; the table is
    // never scanned in this condition.
    if state.no_selection {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(
                RichText::new("Select at least one country or aggregate in the sidebar.")
                    .heading(),
            );
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(format!(
                "{} over time ({})",
                state.charts.metric.label(),
                state.charts.variant.label()
            ));
            plot::line_chart(ui, state);
            ui.separator();

            // ---- Comparison bar chart ----
            ui.heading("Comparison across countries and regions");
            ui.horizontal(|ui: &mut Ui| {
                comparison_year_selector(ui, state);
                ui.separator();
                ui.label("Group by:");
                let mut group_by = state.charts.group_by;
                ui.radio_value(&mut group_by, crate::data::aggregate::GroupBy::Country, "Country");
                ui.radio_value(&mut group_by, crate::data::aggregate::GroupBy::Region, "Region");
                state.charts.group_by = group_by;
            });
            plot::bar_chart(ui, state);
            ui.separator();

            // ---- Forecast vs. realized scatter ----
            ui.heading("Forecast vs. realized");
            ui.checkbox(&mut state.charts.show_scatter, "Show scatter plot");
            if state.charts.show_scatter {
                if state.charts.variant != Variant::Forecast {
                    ui.label("The scatter plot is only available for forecast variables.");
                } else {
                    plot::scatter_chart(ui, state);
                }
            }
            ui.separator();

            // ---- Filtered data ----
            ui.heading("Filtered data");
            if state.visible_indices.is_empty() {
                ui.label("No rows match the current filters.");
            } else {
                table::data_table(ui, state);
            }
        });
}

/// Year combo restricted to the years present in the filtered view.
fn comparison_year_selector(ui: &mut Ui, state: &mut AppState) {
    let years = state.visible_years();
    let current = state.charts.comparison_year;
    ui.label("Comparison year:");
    egui::ComboBox::from_id_salt("comparison_year")
        .selected_text(
            current
                .map(|y| y.to_string())
                .unwrap_or_else(|| "–".to_string()),
        )
        .show_ui(ui, |ui: &mut Ui| {
            for year in years {
                if ui
                    .selectable_label(current == Some(year), year.to_string())
                    .clicked()
                {
                    state.charts.comparison_year = Some(year);
                }
            }
        });
}
