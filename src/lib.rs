//! Fund impact analytics: load a fund dataset, filter it by company, country
//! and fund, and compute the grouped tables behind every dashboard chart.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod export;

pub use chart::{ChartData, ChartSpec, EvaluatedChart, Tab, CATALOG};
pub use dashboard::{Dashboard, DashboardMetrics, DashboardView};
pub use data::error::DataLoadError;
pub use data::filter::FilterSelection;
pub use data::model::{Dataset, Dimension, NumericField, Record};
