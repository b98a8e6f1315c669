use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// Render the filtered-data grid: country, year, region, income group, and
/// the currently selected metric column.
///
/// Rows are shown sorted by (country, year); this is display order only,
/// the underlying view keeps its source order.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let metric = state.charts.metric;
    let variant = state.charts.variant;

    let mut order = state.visible_indices.clone();
    order.sort_by(|&a, &b| {
        let ra = &dataset.rows[a];
        let rb = &dataset.rows[b];
        ra.country.cmp(&rb.country).then(ra.year.cmp(&rb.year))
    });

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("Year");
            });
            header.col(|ui| {
                ui.strong("Region");
            });
            header.col(|ui| {
                ui.strong("Income group");
            });
            header.col(|ui| {
                ui.strong(format!("{} ({})", metric.label(), variant.label()));
            });
        })
        .body(|body| {
            body.rows(18.0, order.len(), |mut row| {
                let obs = &dataset.rows[order[row.index()]];
                row.col(|ui| {
                    ui.label(&obs.country);
                });
                row.col(|ui| {
                    ui.label(obs.year.to_string());
                });
                row.col(|ui| {
                    ui.label(obs.region.as_deref().unwrap_or("–"));
                });
                row.col(|ui| {
                    ui.label(obs.income_group.as_deref().unwrap_or("–"));
                });
                row.col(|ui| {
                    match obs.value(metric, variant) {
                        Some(value) => ui.label(format!("{value:.2}")),
                        None => ui.label("–"),
                    };
                });
            });
        });
}
