use alviridi_dashboard::export::chart_table;
use alviridi_dashboard::EvaluatedChart;
use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

// ---------------------------------------------------------------------------
// Data table under a chart
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// The numbers behind `chart`, one row per group / point / slice.
pub fn chart_data_table(ui: &mut Ui, chart: &EvaluatedChart) {
    let (header, rows) = chart_table(chart, |v| format!("{v:.2}"));
    if rows.is_empty() {
        return;
    }

    ui.push_id(("table", chart.spec.id), |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(90.0).resizable(true), header.len())
            .header(ROW_HEIGHT + 2.0, |mut head| {
                for title in &header {
                    head.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for row in &rows {
                    body.row(ROW_HEIGHT, |mut table_row| {
                        for cell in row {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}
