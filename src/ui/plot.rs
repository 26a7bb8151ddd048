use std::f64::consts::PI;
use std::ops::RangeInclusive;

use alviridi_dashboard::chart::{bar_layout, BarLayout, ChartKind, ChartRenderer, Orientation};
use alviridi_dashboard::data::aggregate::{AggregateTable, PieSlice, ScatterSeries};
use alviridi_dashboard::{ChartData, EvaluatedChart};
use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, GridMark, Legend, Line, LineStyle, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::color::{palette_colors, ColorMap};
use crate::ui::table;

const PLOT_HEIGHT: f32 = 320.0;
const PIE_START_DEGREES: f64 = 140.0;

// ---------------------------------------------------------------------------
// egui renderer
// ---------------------------------------------------------------------------

/// Draws evaluated charts into a `Ui`, one after the other.
pub struct EguiChartRenderer<'u> {
    ui: &'u mut Ui,
    show_table: bool,
}

impl<'u> EguiChartRenderer<'u> {
    pub fn new(ui: &'u mut Ui, show_table: bool) -> Self {
        Self { ui, show_table }
    }
}

impl ChartRenderer for EguiChartRenderer<'_> {
    type Output = ();

    fn render(&mut self, chart: &EvaluatedChart) {
        let ui = &mut *self.ui;
        ui.add_space(8.0);
        ui.strong(chart.spec.title);
        if chart.data.is_empty() {
            ui.label(RichText::new("No data for this selection").italics().weak());
        }

        match (&chart.data, chart.spec.kind) {
            (ChartData::Table(table), ChartKind::Bar(orientation)) => {
                bar_plot(ui, chart, table, orientation)
            }
            // A grouped scatter never comes out of the catalog; draw it as bars.
            (ChartData::Table(table), _) => bar_plot(ui, chart, table, Orientation::Vertical),
            (ChartData::Points(series), _) => scatter_plot(ui, chart, series),
            (ChartData::Slices(slices), _) => pie_plot(ui, chart, slices),
        }

        if self.show_table {
            table::chart_data_table(ui, chart);
        }
        ui.separator();
    }
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// Labels integer axis positions with category names. Horizontal charts list
/// the first category at the top.
fn category_formatter(
    categories: Vec<String>,
    top_down: bool,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
            return String::new();
        }
        let n = categories.len();
        let i = pos as usize;
        if i >= n {
            return String::new();
        }
        let idx = if top_down { n - 1 - i } else { i };
        categories[idx].clone()
    }
}

/// Centre offset of series `j` of `k` inside a category slot of width 0.8.
fn series_offset(j: usize, k: usize) -> (f64, f64) {
    let width = 0.8 / k as f64;
    let offset = (j as f64 - (k as f64 - 1.0) / 2.0) * width;
    (offset, width)
}

fn bar_plot(ui: &mut Ui, chart: &EvaluatedChart, table: &AggregateTable, orientation: Orientation) {
    let BarLayout { categories, series } = bar_layout(table);
    let horizontal = orientation == Orientation::Horizontal;
    let n = categories.len();
    let position = |i: usize| if horizontal { (n - 1 - i) as f64 } else { i as f64 };

    let mut charts = Vec::new();
    if series.len() == 1 && series[0].0.is_empty() {
        // No hue: one colour per category.
        let colors = ColorMap::new(chart.spec.palette, categories.iter().map(String::as_str));
        let bars = categories
            .iter()
            .zip(&series[0].1)
            .enumerate()
            .map(|(i, (cat, &value))| {
                Bar::new(position(i), value)
                    .width(0.8)
                    .name(cat)
                    .fill(colors.color_for(cat))
            })
            .collect();
        charts.push(BarChart::new(bars));
    } else {
        let colors = ColorMap::new(chart.spec.palette, series.iter().map(|(name, _)| name.as_str()));
        let k = series.len();
        for (j, (name, values)) in series.iter().enumerate() {
            let (offset, width) = series_offset(j, k);
            let bars = values
                .iter()
                .enumerate()
                .map(|(i, &value)| {
                    Bar::new(position(i) + offset, value)
                        .width(width)
                        .name(&categories[i])
                })
                .collect();
            charts.push(BarChart::new(bars).name(name).color(colors.color_for(name)));
        }
    }

    let formatter = category_formatter(categories, horizontal);
    let mut plot = Plot::new(chart.spec.id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(chart.spec.x_label)
        .y_axis_label(chart.spec.y_label)
        .allow_scroll(false);
    plot = if horizontal {
        plot.y_axis_formatter(formatter)
            .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
    } else {
        plot.x_axis_formatter(formatter)
            .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
    };

    plot.show(ui, |plot_ui| {
        for bar_chart in charts {
            let bar_chart = if horizontal {
                bar_chart.horizontal()
            } else {
                bar_chart
            };
            plot_ui.bar_chart(bar_chart);
        }
    });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn scatter_plot(ui: &mut Ui, chart: &EvaluatedChart, series: &[ScatterSeries]) {
    let colors = ColorMap::new(chart.spec.palette, series.iter().map(|s| s.name.as_str()));
    let extent = series
        .iter()
        .flat_map(|s| s.points.iter())
        .flat_map(|&[x, y]| [x, y])
        .fold(0.0_f64, f64::max);

    Plot::new(chart.spec.id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(chart.spec.x_label)
        .y_axis_label(chart.spec.y_label)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for s in series {
                plot_ui.points(
                    Points::new(s.points.clone())
                        .name(&s.name)
                        .color(colors.color_for(&s.name))
                        .radius(4.0),
                );
            }
            if chart.spec.reference_line && extent > 0.0 {
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![[0.0, 0.0], [extent, extent]]))
                        .style(LineStyle::dashed_loose())
                        .color(Color32::RED)
                        .name("Investment = Fund Size"),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

/// Angular extent of one slice, in radians, counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Wedge {
    start: f64,
    sweep: f64,
}

/// Lay slices around the circle from `start_degrees`, in slice order.
/// Slices with no share get no wedge.
fn wedges(slices: &[PieSlice], start_degrees: f64) -> Vec<Option<Wedge>> {
    let mut angle = start_degrees.to_radians();
    slices
        .iter()
        .map(|slice| {
            if slice.share <= 0.0 {
                return None;
            }
            let sweep = slice.share * 2.0 * PI;
            let wedge = Wedge { start: angle, sweep };
            angle += sweep;
            Some(wedge)
        })
        .collect()
}

/// Outline(s) of a unit-circle wedge. Split into pieces of at most a quarter
/// turn so every polygon is convex.
fn wedge_outlines(wedge: Wedge) -> Vec<Vec<[f64; 2]>> {
    const STEPS_PER_RADIAN: f64 = 24.0;
    let pieces = (wedge.sweep / (PI / 2.0)).ceil().max(1.0) as usize;
    let piece_sweep = wedge.sweep / pieces as f64;

    (0..pieces)
        .map(|p| {
            let from = wedge.start + p as f64 * piece_sweep;
            let steps = ((piece_sweep * STEPS_PER_RADIAN).ceil() as usize).max(2);
            std::iter::once([0.0, 0.0])
                .chain((0..=steps).map(|s| {
                    let a = from + piece_sweep * s as f64 / steps as f64;
                    [a.cos(), a.sin()]
                }))
                .collect()
        })
        .collect()
}

fn pie_plot(ui: &mut Ui, chart: &EvaluatedChart, slices: &[PieSlice]) {
    let colors = palette_colors(chart.spec.palette, slices.len());
    let layout = wedges(slices, PIE_START_DEGREES);

    Plot::new(chart.spec.id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            for ((slice, wedge), &color) in slices.iter().zip(&layout).zip(&colors) {
                let Some(wedge) = *wedge else {
                    continue;
                };
                for outline in wedge_outlines(wedge) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(outline))
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(&slice.label),
                    );
                }
                let mid = wedge.start + wedge.sweep / 2.0;
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                        format!("{:.1}%", slice.share * 100.0),
                    )
                    .color(Color32::BLACK),
                );
            }
        });
}
