use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::data::aggregate::group_mean;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Line chart: metric over time, one series per selected country
// ---------------------------------------------------------------------------

/// Render the time-series line chart for the chosen metric.
pub fn line_chart(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let metric = state.charts.metric;
    let variant = state.charts.variant;

    Plot::new("line_chart")
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label("Year")
        .y_axis_label("Value (%)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for country in &state.selection.countries {
                let mut series: Vec<[f64; 2]> = state
                    .visible_indices
                    .iter()
                    .map(|&i| &dataset.rows[i])
                    .filter(|row| &row.country == country)
                    .filter_map(|row| {
                        row.value(metric, variant)
                            .map(|v| [row.year as f64, v])
                    })
                    .collect();
                if series.is_empty() {
                    continue;
                }
                series.sort_by(|a, b| a[0].total_cmp(&b[0]));

                let points: PlotPoints = series.into();
                let line = Line::new(points)
                    .name(country)
                    .color(state.color_map.color_for(country))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Bar chart: group means for the comparison year
// ---------------------------------------------------------------------------

/// Render the per-group mean bar chart for the comparison year.
pub fn bar_chart(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let Some(year) = state.charts.comparison_year else {
        ui.label("No year available in the current view.");
        return;
    };

    let means = group_mean(
        dataset,
        &state.visible_indices,
        state.charts.metric,
        state.charts.variant,
        year,
        state.charts.group_by,
    );

    // Alphabetical group order on the x-axis, one bar per group.
    let labels: Vec<String> = means.keys().cloned().collect();
    let bars: Vec<Bar> = means
        .values()
        .enumerate()
        .map(|(i, &mean)| Bar::new(i as f64, mean).width(0.6))
        .collect();

    let axis_labels = labels.clone();
    Plot::new("bar_chart")
        .height(320.0)
        .y_axis_label("Value (%)")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 0.01 || idx < 0.0 {
                return String::new();
            }
            axis_labels
                .get(idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars).name(format!(
                    "Mean {} per {} in {}",
                    state.charts.metric.label(),
                    state.charts.group_by.label(),
                    year
                )),
            );
        });
}

// ---------------------------------------------------------------------------
// Scatter chart: forecast vs. realized for the comparison year
// ---------------------------------------------------------------------------

/// Render the forecast-vs-realized scatter with a dashed 45° reference.
pub fn scatter_chart(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let Some(year) = state.charts.comparison_year else {
        ui.label("No year available in the current view.");
        return;
    };
    let metric = state.charts.metric;

    // (forecast, realized) pairs per country; rows missing either side
    // cannot be compared and are skipped.
    let mut max_value: f64 = 0.0;
    let mut per_country: Vec<(&String, Vec<[f64; 2]>)> = Vec::new();
    for country in &state.selection.countries {
        let pairs: Vec<[f64; 2]> = state
            .visible_indices
            .iter()
            .map(|&i| &dataset.rows[i])
            .filter(|row| row.year == year && &row.country == country)
            .filter_map(|row| {
                let forecast = row.value(metric, crate::data::model::Variant::Forecast)?;
                let realized = row.value(metric, crate::data::model::Variant::Realized)?;
                Some([forecast, realized])
            })
            .collect();
        for pair in &pairs {
            max_value = max_value.max(pair[0]).max(pair[1]);
        }
        if !pairs.is_empty() {
            per_country.push((country, pairs));
        }
    }

    Plot::new("scatter_chart")
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label("Forecast (%)")
        .y_axis_label("Realized (%)")
        .show(ui, |plot_ui| {
            for (country, pairs) in per_country {
                let points: PlotPoints = pairs.into();
                plot_ui.points(
                    Points::new(points)
                        .name(country)
                        .color(state.color_map.color_for(country))
                        .radius(3.0),
                );
            }

            let reference: PlotPoints = vec![[0.0, 0.0], [max_value, max_value]].into();
            plot_ui.line(
                Line::new(reference)
                    .name("45° line")
                    .color(Color32::GRAY)
                    .style(LineStyle::dashed_loose()),
            );
        });
}
