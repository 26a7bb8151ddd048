use std::path::Path;

use alviridi_dashboard::{export, Dimension};
use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

/// The dropdowns, in panel order.
const FILTERS: [(Dimension, &str); 3] = [
    (Dimension::Company, "☆ Select Company"),
    (Dimension::Country, "☆ Select Country"),
    (Dimension::Fund, "☆ Select Fund"),
];

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("ALVIRIDI DASHBOARD").strong());
    });
    ui.add_space(4.0);
    ui.separator();

    let Some(dashboard) = &state.dashboard else {
        ui.label("No dataset loaded.");
        return;
    };

    // Collect first so the selection can be changed inside the loop.
    let options: Vec<Vec<String>> = FILTERS
        .iter()
        .map(|(dim, _)| dashboard.dataset().options(*dim))
        .collect();

    for ((dim, caption), values) in FILTERS.iter().zip(&options) {
        ui.strong(*caption);
        let current = state.selection.get(*dim).map(str::to_string);
        let mut picked: Option<Option<String>> = None;
        egui::ComboBox::from_id_salt(dim.column())
            .width(ui.available_width())
            .selected_text(state.selection.label(*dim))
            .show_ui(ui, |ui: &mut Ui| {
                // The first entry is the "All …" label.
                for (i, value) in values.iter().enumerate() {
                    let choice = (i > 0).then(|| value.clone());
                    if ui.selectable_label(current == choice, value).clicked() {
                        picked = Some(choice);
                    }
                }
            });
        if let Some(choice) = picked {
            state.set_filter(*dim, choice.as_deref());
        }
        ui.add_space(6.0);
    }

    ui.separator();
    if ui.button("Reset filters").clicked() {
        state.reset_filters();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_view = state.view.is_some();
            if ui.add_enabled(has_view, egui::Button::new("Export tables…")).clicked() {
                let outcome = export_tables(state);
                report(state, outcome);
                ui.close_menu();
            }
            if ui.add_enabled(has_view, egui::Button::new("Export view JSON…")).clicked() {
                let outcome = export_view_json(state);
                report(state, outcome);
                ui.close_menu();
            }
            if ui.add_enabled(has_view, egui::Button::new("Export filtered rows…")).clicked() {
                let outcome = export_filtered_rows(state);
                report(state, outcome);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(dashboard), Some(view)) = (&state.dashboard, &state.view) {
            let source = dashboard
                .source()
                .map(display_name)
                .unwrap_or_else(|| "memory".to_string());
            ui.label(format!(
                "{source}: {} rows loaded, {} selected",
                dashboard.dataset().len(),
                view.metrics.rows
            ));
        }

        ui.separator();

        if ui.selectable_label(state.show_tables, "Data tables").clicked() {
            state.show_tables = !state.show_tables;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

pub fn metric_row(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        return;
    };
    let cards = view.metrics.cards();
    ui.columns(cards.len(), |columns: &mut [Ui]| {
        for (col, (label, value)) in columns.iter_mut().zip(cards.iter()) {
            col.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(*label).small());
                ui.label(RichText::new(value).size(18.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open fund data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

/// Show the outcome of an export in the status line; `None` means cancelled.
fn report(state: &mut AppState, outcome: Result<Option<String>>) {
    match outcome {
        Ok(Some(msg)) => state.status_message = Some(msg),
        Ok(None) => {}
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}

fn export_tables(state: &AppState) -> Result<Option<String>> {
    let (Some(view), Some(dir)) = (&state.view, rfd::FileDialog::new().pick_folder()) else {
        return Ok(None);
    };
    let written = export::write_tables(view, &dir)?;
    Ok(Some(format!(
        "Exported {} tables to {}",
        written.len(),
        dir.display()
    )))
}

fn export_view_json(state: &AppState) -> Result<Option<String>> {
    let Some(view) = &state.view else {
        return Ok(None);
    };
    let Some(path) = save_dialog("dashboard_view.json", "JSON", "json") else {
        return Ok(None);
    };
    export::write_view_json(view, &path)?;
    Ok(Some(format!("Saved view to {}", path.display())))
}

fn export_filtered_rows(state: &AppState) -> Result<Option<String>> {
    let Some(dashboard) = &state.dashboard else {
        return Ok(None);
    };
    let Some(path) = save_dialog("filtered_rows.csv", "CSV", "csv") else {
        return Ok(None);
    };
    let rows = dashboard.filtered(&state.selection);
    export::save_dataset_csv(&rows, &path)
        .with_context(|| format!("exporting {} rows", rows.len()))?;
    Ok(Some(format!("Saved {} rows to {}", rows.len(), display_name(&path))))
}

fn save_dialog(default_name: &str, filter: &str, extension: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter(filter, &[extension])
        .save_file()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
