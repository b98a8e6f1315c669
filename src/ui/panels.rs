use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::{to_csv, EXPORT_FILE_NAME};
use crate::data::model::{Metric, Variant};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone the option lists so we can mutate state inside the loops.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Country multi-select ----
            let n_selected = state.selection.countries.len();
            let n_total = dataset.countries.len();
            let header = format!("Countries / aggregates  ({n_selected}/{n_total})");
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("countries")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_countries();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_countries();
                        }
                    });

                    for country in &dataset.countries {
                        let selected = state.selection.countries.contains(country);
                        let mut text = RichText::new(country);
                        if selected {
                            text = text.color(state.color_map.color_for(country));
                        }
                        let mut checked = selected;
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_country(country);
                        }
                    }
                });
            ui.separator();

            // ---- Year range ----
            ui.strong("Year range");
            let (mut min, mut max) = state.selection.year_range;
            let changed = ui
                .add(egui::Slider::new(&mut min, dataset.year_min..=dataset.year_max).text("from"))
                .changed()
                | ui.add(egui::Slider::new(&mut max, dataset.year_min..=dataset.year_max).text("to"))
                    .changed();
            if changed {
                state.set_year_range(min, max);
            }
            ui.separator();

            // ---- Region ----
            ui.strong("Region");
            let region_label = state
                .selection
                .region
                .clone()
                .unwrap_or_else(|| "All regions".to_string());
            egui::ComboBox::from_id_salt("region")
                .selected_text(region_label)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.selection.region.is_none(), "All regions")
                        .clicked()
                    {
                        state.selection.region = None;
                        state.refilter();
                    }
                    for region in &dataset.regions {
                        let active = state.selection.region.as_deref() == Some(region.as_str());
                        if ui.selectable_label(active, region).clicked() {
                            state.selection.region = Some(region.clone());
                            state.refilter();
                        }
                    }
                });
            ui.separator();

            // ---- Income group ----
            ui.strong("Income group");
            let income_label = state
                .selection
                .income_group
                .clone()
                .unwrap_or_else(|| "All income groups".to_string());
            egui::ComboBox::from_id_salt("income_group")
                .selected_text(income_label)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.selection.income_group.is_none(), "All income groups")
                        .clicked()
                    {
                        state.selection.income_group = None;
                        state.refilter();
                    }
                    for group in &dataset.income_groups {
                        let active = state.selection.income_group.as_deref() == Some(group.as_str());
                        if ui.selectable_label(active, group).clicked() {
                            state.selection.income_group = Some(group.clone());
                            state.refilter();
                        }
                    }
                });
            ui.separator();

            // ---- Variable type ----
            ui.strong("Variable type");
            ui.radio_value(&mut state.charts.variant, Variant::Forecast, "Forecasts");
            ui.radio_value(&mut state.charts.variant, Variant::Realized, "Realized values");
            ui.separator();

            // ---- Metric ----
            ui.strong("Variable");
            egui::ComboBox::from_id_salt("metric")
                .selected_text(state.charts.metric.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for metric in Metric::ALL {
                        ui.selectable_value(&mut state.charts.metric, metric, metric.label());
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("IMF WEO Forecast Dashboard");
        ui.separator();

        if let Some(dataset) = &state.dataset {
            ui.label(format!(
                "{} observations loaded, {} in view",
                dataset.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        if ui
            .add_enabled(state.can_export(), egui::Button::new("Download CSV"))
            .clicked()
        {
            export_filtered(state);
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
        }
    });
}

// ---------------------------------------------------------------------------
// CSV export dialog
// ---------------------------------------------------------------------------

/// Serialize the filtered view and write it where the user chooses.
fn export_filtered(state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    let csv_text = match to_csv(dataset, &state.visible_indices) {
        Ok(text) => text,
        Err(err) => {
            log::error!("Failed to serialize filtered view: {err:#}");
            state.status_message = Some(format!("Export failed: {err:#}"));
            return;
        }
    };

    let target = rfd::FileDialog::new()
        .set_title("Save filtered WEO data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = target {
        match std::fs::write(&path, csv_text) {
            Ok(()) => {
                log::info!(
                    "Exported {} rows to {}",
                    state.visible_indices.len(),
                    path.display()
                );
                state.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(err) => {
                log::error!("Failed to write {}: {err}", path.display());
                state.status_message = Some(format!("Export failed: {err}"));
            }
        }
    }
}
