use alviridi_dashboard::chart::ChartRenderer;
use alviridi_dashboard::config::DashboardConfig;
use alviridi_dashboard::dashboard::money;
use alviridi_dashboard::Tab;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::panels;
use crate::ui::plot::EguiChartRenderer;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            state: AppState::open(config),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, tabs, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.state.load_error {
                error_screen(ui, err);
            } else {
                dashboard_body(ui, &mut self.state);
            }
        });
    }
}

fn error_screen(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!("{message}\n\nOpen another file with File → Open…"))
                .color(Color32::RED)
                .size(16.0),
        );
    });
}

fn dashboard_body(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    ui.label(RichText::new(&view.caption).italics());
    ui.add_space(4.0);
    panels::metric_row(ui, state);
    ui.separator();

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }
    });
    ui.separator();

    let Some(view) = &state.view else {
        return;
    };
    let Some(tab) = view.tab(state.active_tab) else {
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(tab.title);
            if tab.tab == Tab::GlobalSouth {
                ui.label(
                    RichText::new(format!(
                        "Total Investment in Global South: {}M",
                        money(view.metrics.global_south_investment_musd)
                    ))
                    .strong(),
                );
            }

            let mut renderer = EguiChartRenderer::new(ui, state.show_tables);
            for chart in &tab.charts {
                renderer.render(chart);
            }
        });
}
