use std::path::{Path, PathBuf};

use num_format::{Locale, ToFormattedString};
use serde::Serialize;

use crate::chart::{evaluate_tab, EvaluatedChart, Tab};
use crate::data::aggregate::stable_sum;
use crate::data::error::LoadResult;
use crate::data::filter::{self, FilterSelection};
use crate::data::loader;
use crate::data::model::{Dataset, NumericField};

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// The metric cards shown above the tabs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DashboardMetrics {
    pub fund_size_musd: f64,
    pub investment_musd: f64,
    pub capital_committed_busd: f64,
    pub fund_investments: i64,
    pub country_capital_musd: f64,
    pub theme_capital_musd: f64,
    /// The "Total Investment in Global South" figure: investment over the
    /// whole selection, whether or not a row names a Global South country.
    pub global_south_investment_musd: f64,
    pub rows: usize,
}

impl DashboardMetrics {
    /// Plain sums over `dataset`; all zero when it is empty.
    pub fn compute(dataset: &Dataset) -> Self {
        let sum = |field: NumericField| -> f64 {
            stable_sum(dataset.records().iter().map(|r| field.value(r)))
        };
        let investment = sum(NumericField::Investment);
        Self {
            fund_size_musd: sum(NumericField::FundSize),
            investment_musd: investment,
            capital_committed_busd: sum(NumericField::CapitalCommitted),
            fund_investments: dataset.records().iter().map(|r| r.fund_investments).sum(),
            country_capital_musd: sum(NumericField::CountryCapital),
            theme_capital_musd: sum(NumericField::ThemeCapital),
            global_south_investment_musd: investment,
            rows: dataset.len(),
        }
    }

    /// `(label, formatted value)` for each metric card, in display order.
    pub fn cards(&self) -> [(&'static str, String); 6] {
        [
            ("Fund Size", money(self.fund_size_musd)),
            ("Investment", money(self.investment_musd)),
            ("Total Capital Committed ($B)", money(self.capital_committed_busd)),
            (
                "Fund Investments",
                self.fund_investments.to_formatted_string(&Locale::en),
            ),
            ("Country Capital Catalyzed", money(self.country_capital_musd)),
            ("Theme Capital Catalyzed", money(self.theme_capital_musd)),
        ]
    }
}

/// `$1,234.56`, with thousands separators and two decimals.
pub fn money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as i64;
    let sign = if value < 0.0 && cents != 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

// ---------------------------------------------------------------------------
// View for one selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub tab: Tab,
    pub title: &'static str,
    pub charts: Vec<EvaluatedChart>,
}

/// Everything the UI needs to draw one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: FilterSelection,
    pub caption: String,
    pub metrics: DashboardMetrics,
    pub tabs: Vec<TabView>,
}

impl DashboardView {
    pub fn tab(&self, tab: Tab) -> Option<&TabView> {
        self.tabs.iter().find(|t| t.tab == tab)
    }

    pub fn charts(&self) -> impl Iterator<Item = &EvaluatedChart> {
        self.tabs.iter().flat_map(|t| t.charts.iter())
    }
}

// ---------------------------------------------------------------------------
// Dashboard context
// ---------------------------------------------------------------------------

/// Owns the session's dataset. Passed explicitly to whoever needs to filter
/// or aggregate; there is no process-wide copy.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Dataset,
    source: Option<PathBuf>,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            source: None,
        }
    }

    /// Load the session dataset from `path`.
    pub fn open(path: &Path) -> LoadResult<Self> {
        let dataset = loader::load_file(path)?;
        Ok(Self {
            dataset,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// File the dataset came from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The rows passing `selection`.
    pub fn filtered(&self, selection: &FilterSelection) -> Dataset {
        filter::apply(&self.dataset, selection)
    }

    /// Filter once, then compute the metrics and every chart of every tab.
    pub fn view(&self, selection: &FilterSelection) -> DashboardView {
        let filtered = self.filtered(selection);
        log::debug!(
            "Recomputing dashboard: {} of {} rows match ({selection})",
            filtered.len(),
            self.dataset.len()
        );

        let tabs = Tab::ALL
            .iter()
            .map(|&tab| TabView {
                tab,
                title: tab.title(),
                charts: evaluate_tab(tab, &filtered),
            })
            .collect();

        DashboardView {
            selection: selection.clone(),
            caption: selection.to_string(),
            metrics: DashboardMetrics::compute(&filtered),
            tabs,
        }
    }
}
