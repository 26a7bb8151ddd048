//! Writing evaluated charts and datasets back to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::chart::{ChartData, ChartRenderer, EvaluatedChart};
use crate::dashboard::DashboardView;
use crate::data::model::{columns, Dataset};

// ---------------------------------------------------------------------------
// Chart tables as CSV
// ---------------------------------------------------------------------------

/// Renders each chart as `<dir>/<chart id>.csv`.
pub struct CsvTableWriter {
    dir: PathBuf,
}

impl CsvTableWriter {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl ChartRenderer for CsvTableWriter {
    type Output = Result<PathBuf>;

    fn render(&mut self, chart: &EvaluatedChart) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.csv", chart.spec.id));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_chart_csv(chart, file).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// One chart's data as a header plus string rows, numbers rendered by `num`.
///
/// * grouped table: one column per dimension, then one per measure
/// * scatter: series, x, y
/// * pie: label, value, share
pub fn chart_table(
    chart: &EvaluatedChart,
    num: impl Fn(f64) -> String,
) -> (Vec<String>, Vec<Vec<String>>) {
    let num = &num;
    match &chart.data {
        ChartData::Table(table) => {
            let header = table
                .dimensions
                .iter()
                .map(|d| d.column().to_string())
                .chain(table.measures.iter().map(|m| m.name.to_string()))
                .collect();
            let rows = table
                .rows
                .iter()
                .map(|row| {
                    row.key
                        .iter()
                        .cloned()
                        .chain(row.values.iter().map(|&v| num(v)))
                        .collect()
                })
                .collect();
            (header, rows)
        }
        ChartData::Points(series) => {
            let header = vec![
                chart.spec.legend_title().unwrap_or("Series").to_string(),
                chart.spec.x_label.to_string(),
                chart.spec.y_label.to_string(),
            ];
            let rows = series
                .iter()
                .flat_map(|s| {
                    s.points
                        .iter()
                        .map(move |&[x, y]| vec![s.name.clone(), num(x), num(y)])
                })
                .collect();
            (header, rows)
        }
        ChartData::Slices(slices) => {
            let header = vec!["Label".to_string(), "Value".to_string(), "Share".to_string()];
            let rows = slices
                .iter()
                .map(|slice| vec![slice.label.clone(), num(slice.value), num(slice.share)])
                .collect();
            (header, rows)
        }
    }
}

/// Write one chart's data as CSV; see [`chart_table`] for the columns.
pub fn write_chart_csv<W: Write>(chart: &EvaluatedChart, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let (header, rows) = chart_table(chart, |v| v.to_string());
    wtr.write_record(&header)?;
    for row in &rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every chart of `view` into `dir` (created if needed).
pub fn write_tables(view: &DashboardView, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut writer = CsvTableWriter::new(dir);
    let written = view
        .charts()
        .map(|chart| writer.render(chart))
        .collect::<Result<Vec<_>>>()?;
    log::info!("Exported {} chart tables to {}", written.len(), dir.display());
    Ok(written)
}

// ---------------------------------------------------------------------------
// Whole view as JSON
// ---------------------------------------------------------------------------

pub fn write_view_json(view: &DashboardView, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, view).context("serializing dashboard view")?;
    out.flush()?;
    log::info!("Exported dashboard view to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Records as CSV
// ---------------------------------------------------------------------------

/// Write records under the required column headers, loadable by
/// [`crate::data::loader::read_csv`].
pub fn write_dataset_csv<W: Write>(dataset: &Dataset, out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(columns::REQUIRED)?;
    for record in dataset.records() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// [`write_dataset_csv`] to a file path.
pub fn save_dataset_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_dataset_csv(dataset, BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {} records to {}", dataset.len(), path.display());
    Ok(())
}
