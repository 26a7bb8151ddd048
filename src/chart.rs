//! Declarative chart catalog.
//!
//! Every chart on the dashboard is a [`ChartSpec`] value in [`CATALOG`].
//! [`evaluate`] turns a spec plus a (filtered) dataset into [`ChartData`],
//! and a [`ChartRenderer`] draws or writes the result. Nothing here knows
//! about widgets or colours beyond a palette name.

use serde::Serialize;

use crate::data::aggregate::{
    aggregate_records, pie_slices, scatter_groups, scatter_rows, AggregateTable, Measure, PieSlice,
    ScatterSeries, SortOrder,
};
use crate::data::model::{Dataset, Dimension, NumericField, Record};

// ---------------------------------------------------------------------------
// Spec types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tab {
    Investment,
    Geography,
    Theme,
    Environment,
    GlobalSouth,
    FundPerformance,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Investment,
        Tab::Geography,
        Tab::Theme,
        Tab::Environment,
        Tab::GlobalSouth,
        Tab::FundPerformance,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Investment => "Investment Analysis",
            Tab::Geography => "Geographic Impact Analysis",
            Tab::Theme => "Thematic Analysis",
            Tab::Environment => "Environmental Impact Analysis",
            Tab::GlobalSouth => "Global South Investment Focus",
            Tab::FundPerformance => "Fund Performance Comparison",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Categories along x, values up.
    Vertical,
    /// Categories along y, values to the right.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Bar(Orientation),
    Scatter,
    Pie,
}

/// Named colour scheme; the renderer decides what the colours are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaletteName {
    Viridis,
    Rocket,
    Magma,
    Cubehelix,
    Crest,
    Blues,
    Reds,
    Greens,
    Coolwarm,
    Deep,
    Paired,
    Pastel,
    Set1,
    Set2,
}

/// Rows a chart looks at, applied after the dashboard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowFilter {
    All,
    /// Only rows naming at least one supported Global South country.
    HasGlobalSouthCountries,
}

impl RowFilter {
    pub fn accepts(self, record: &Record) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::HasGlobalSouthCountries => record.global_south_countries_supported.is_some(),
        }
    }
}

/// Where a chart's numbers come from.
///
/// For `Grouped` sources a second grouping dimension, or more than one
/// measure, becomes the colour series (hue) of a bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ChartSource {
    Grouped {
        group_by: &'static [Dimension],
        measures: &'static [Measure],
        sort: SortOrder,
    },
    /// One scatter point per row.
    RowPoints {
        x: NumericField,
        y: NumericField,
        hue: Dimension,
    },
    /// One scatter point per hue group, coordinates summed.
    GroupPoints {
        x: Measure,
        y: Measure,
        hue: Dimension,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Stable identifier, also the export file stem.
    pub id: &'static str,
    pub tab: Tab,
    pub title: &'static str,
    pub kind: ChartKind,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub source: ChartSource,
    pub rows: RowFilter,
    pub palette: PaletteName,
    /// Draw the `y = x` diagonal on a scatter.
    pub reference_line: bool,
}

impl ChartSpec {
    /// Legend heading for multi-series charts.
    pub fn legend_title(&self) -> Option<&'static str> {
        match self.source {
            ChartSource::Grouped { group_by, measures, .. } => {
                if measures.len() > 1 {
                    Some("Emission Scope")
                } else {
                    group_by.get(1).map(|d| d.column())
                }
            }
            ChartSource::RowPoints { hue, .. } | ChartSource::GroupPoints { hue, .. } => {
                Some(hue.column())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    Table(AggregateTable),
    Points(Vec<ScatterSeries>),
    Slices(Vec<PieSlice>),
}

impl ChartData {
    /// Nothing to draw: no groups, no points, or a pie with no mass.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Table(t) => t.is_empty(),
            ChartData::Points(series) => series.iter().all(|s| s.points.is_empty()),
            ChartData::Slices(slices) => slices.iter().all(|s| s.value == 0.0),
        }
    }
}

/// A spec together with its data for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedChart {
    pub spec: &'static ChartSpec,
    pub data: ChartData,
}

/// Compute the data behind `spec` from `dataset`.
pub fn evaluate(spec: &ChartSpec, dataset: &Dataset) -> ChartData {
    let rows = dataset.records().iter().filter(|r| spec.rows.accepts(r));
    match spec.source {
        ChartSource::Grouped {
            group_by,
            measures,
            sort,
        } => {
            let table = aggregate_records(rows, group_by, measures).sorted_by(0, sort);
            match spec.kind {
                ChartKind::Pie => ChartData::Slices(pie_slices(&table)),
                ChartKind::Bar(_) | ChartKind::Scatter => ChartData::Table(table),
            }
        }
        ChartSource::RowPoints { x, y, hue } => ChartData::Points(scatter_rows(rows, x, y, hue)),
        ChartSource::GroupPoints { x, y, hue } => ChartData::Points(scatter_groups(rows, x, y, hue)),
    }
}

/// Evaluate every catalog chart of `tab`, in catalog order.
pub fn evaluate_tab(tab: Tab, dataset: &Dataset) -> Vec<EvaluatedChart> {
    CATALOG
        .iter()
        .filter(|spec| spec.tab == tab)
        .map(|spec| EvaluatedChart {
            spec,
            data: evaluate(spec, dataset),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Bar layout
// ---------------------------------------------------------------------------

/// A grouped table rearranged as categories × colour series.
#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    /// Category labels in display order.
    pub categories: Vec<String>,
    /// `(series name, one value per category)`; a single unnamed series when
    /// the chart has no hue.
    pub series: Vec<(String, Vec<f64>)>,
}

impl BarLayout {
    /// Whether bars are coloured per series (with a legend) rather than per
    /// category.
    pub fn has_hue(&self) -> bool {
        self.series.len() > 1 || self.series.first().is_some_and(|(name, _)| !name.is_empty())
    }
}

/// Arrange `table` for a bar chart.
///
/// * several measures: categories are the rows, one series per measure
/// * two dimensions: categories are the first key part (in row order),
///   series the second (in key order); missing combinations are zero
/// * otherwise: categories are the rows, one unnamed series
pub fn bar_layout(table: &AggregateTable) -> BarLayout {
    if table.measures.len() > 1 {
        return BarLayout {
            categories: table.rows.iter().map(|r| r.key.join(" / ")).collect(),
            series: table
                .measures
                .iter()
                .enumerate()
                .map(|(j, m)| {
                    let values = table
                        .rows
                        .iter()
                        .map(|r| r.values.get(j).copied().unwrap_or_default())
                        .collect();
                    (m.name.to_string(), values)
                })
                .collect(),
        };
    }

    if table.dimensions.len() == 2 {
        let mut categories: Vec<String> = Vec::new();
        let mut hues: Vec<String> = Vec::new();
        for row in &table.rows {
            if !categories.contains(&row.key[0]) {
                categories.push(row.key[0].clone());
            }
            if !hues.contains(&row.key[1]) {
                hues.push(row.key[1].clone());
            }
        }
        hues.sort();

        let series = hues
            .into_iter()
            .map(|hue| {
                let values = categories
                    .iter()
                    .map(|cat| table.value(&[cat.as_str(), hue.as_str()], 0).unwrap_or_default())
                    .collect();
                (hue, values)
            })
            .collect();
        return BarLayout { categories, series };
    }

    let (categories, values) = table.pairs(0).into_iter().unzip();
    BarLayout {
        categories,
        series: vec![(String::new(), values)],
    }
}

/// Anything that consumes evaluated charts uniformly: the egui plots, the
/// CSV table export.
pub trait ChartRenderer {
    type Output;

    fn render(&mut self, chart: &EvaluatedChart) -> Self::Output;
}

// ---------------------------------------------------------------------------
// The catalog
// ---------------------------------------------------------------------------

const COUNTRY_CAPITAL: Measure = Measure::total(NumericField::CountryCapital);
const THEME_CAPITAL: Measure = Measure::total(NumericField::ThemeCapital);
const INVESTMENT: Measure = Measure::total(NumericField::Investment);
const FUND_SIZE: Measure = Measure::total(NumericField::FundSize);
const GS_DEALS: Measure = Measure::total(NumericField::GlobalSouthDeals);
const EMISSIONS: Measure = Measure::total(NumericField::TotalEmissions);
const SCOPES: [Measure; 3] = [
    Measure::total(NumericField::Scope1Emissions),
    Measure::total(NumericField::Scope2Emissions),
    Measure::total(NumericField::Scope3Emissions),
];

const EMISSIONS_AXIS: &str = "Total Emissions (tons of CO2e)";
const CAPITAL_CATALYZED_AXIS: &str = "Capital Catalyzed ($M)";
const CAPITAL_ATTRACTED_AXIS: &str = "Capital Attracted ($M)";
const DEALS_AXIS: &str = "Number of Deals Funded";

const fn bar(
    id: &'static str,
    tab: Tab,
    title: &'static str,
    orientation: Orientation,
    (x_label, y_label): (&'static str, &'static str),
    group_by: &'static [Dimension],
    measures: &'static [Measure],
    sort: SortOrder,
    palette: PaletteName,
) -> ChartSpec {
    ChartSpec {
        id,
        tab,
        title,
        kind: ChartKind::Bar(orientation),
        x_label,
        y_label,
        source: ChartSource::Grouped {
            group_by,
            measures,
            sort,
        },
        rows: RowFilter::All,
        palette,
        reference_line: false,
    }
}

const fn pie(
    id: &'static str,
    tab: Tab,
    title: &'static str,
    group_by: &'static [Dimension],
    measures: &'static [Measure],
    palette: PaletteName,
) -> ChartSpec {
    ChartSpec {
        id,
        tab,
        title,
        kind: ChartKind::Pie,
        x_label: "",
        y_label: "",
        source: ChartSource::Grouped {
            group_by,
            measures,
            sort: SortOrder::Key,
        },
        rows: RowFilter::All,
        palette,
        reference_line: false,
    }
}

const fn scatter(
    id: &'static str,
    tab: Tab,
    title: &'static str,
    (x_label, y_label): (&'static str, &'static str),
    source: ChartSource,
    palette: PaletteName,
) -> ChartSpec {
    ChartSpec {
        id,
        tab,
        title,
        kind: ChartKind::Scatter,
        x_label,
        y_label,
        source,
        rows: RowFilter::All,
        palette,
        reference_line: false,
    }
}

use Dimension::{Country, Fund, GlobalSouthCountries, Theme};
use Orientation::{Horizontal, Vertical};
use SortOrder::{Ascending, Descending, Key};

/// Every chart of the dashboard, tab by tab.
pub static CATALOG: &[ChartSpec] = &[
    // ---- Investment Analysis ----
    bar(
        "investment_size_vs_investment",
        Tab::Investment,
        "Fund Size vs Actual Investment",
        Vertical,
        ("Fund", "Difference (Fund Size - Investment) ($M)"),
        &[Fund],
        &[Measure::SIZE_VS_INVESTMENT],
        Key,
        PaletteName::Viridis,
    ),
    bar(
        "investment_percent_invested",
        Tab::Investment,
        "Percentage of Total Capital Committed that has been Invested",
        Vertical,
        ("Fund", "Percentage (%)"),
        &[Fund],
        &[Measure::PERCENT_INVESTED],
        Key,
        PaletteName::Rocket,
    ),
    bar(
        "investment_country_capital",
        Tab::Investment,
        "Capital Catalyzed by Country",
        Horizontal,
        (CAPITAL_CATALYZED_AXIS, "Country"),
        &[Country],
        &[COUNTRY_CAPITAL],
        Key,
        PaletteName::Magma,
    ),
    bar(
        "investment_theme_capital",
        Tab::Investment,
        "Capital Catalyzed by Theme",
        Horizontal,
        (CAPITAL_CATALYZED_AXIS, "Theme"),
        &[Theme],
        &[THEME_CAPITAL],
        Key,
        PaletteName::Cubehelix,
    ),
    scatter(
        "investment_vs_fund_size",
        Tab::Investment,
        "Investment vs Fund Size",
        ("Fund Size ($M)", "Investment ($M)"),
        ChartSource::RowPoints {
            x: NumericField::FundSize,
            y: NumericField::Investment,
            hue: Fund,
        },
        PaletteName::Deep,
    ),
    scatter(
        "investment_committed_vs_fund_investments",
        Tab::Investment,
        "Total Capital Committed vs Fund Investments",
        ("Total Capital Committed ($B)", "Fund Investments"),
        ChartSource::RowPoints {
            x: NumericField::CapitalCommitted,
            y: NumericField::FundInvestments,
            hue: Fund,
        },
        PaletteName::Paired,
    ),
    // ---- Geographic Impact Analysis ----
    bar(
        "geography_investment_by_country",
        Tab::Geography,
        "Total Investments by Country",
        Horizontal,
        ("Total Investment ($M)", "Country"),
        &[Country],
        &[INVESTMENT],
        Descending,
        PaletteName::Viridis,
    ),
    bar(
        "geography_deals_by_global_south_country",
        Tab::Geography,
        "Global South Deals Funded by Country",
        Horizontal,
        (DEALS_AXIS, "Global South Countries Supported"),
        &[GlobalSouthCountries],
        &[GS_DEALS],
        Descending,
        PaletteName::Magma,
    ),
    bar(
        "geography_capital_by_country",
        Tab::Geography,
        "Capital Catalyzed by Country",
        Horizontal,
        (CAPITAL_CATALYZED_AXIS, "Country"),
        &[Country],
        &[COUNTRY_CAPITAL],
        Descending,
        PaletteName::Cubehelix,
    ),
    bar(
        "geography_deals_by_country",
        Tab::Geography,
        "Global South Deals Funded by Country",
        Horizontal,
        (DEALS_AXIS, "Country"),
        &[Country],
        &[GS_DEALS],
        Descending,
        PaletteName::Crest,
    ),
    bar(
        "geography_capital_ranking",
        Tab::Geography,
        "Ranking Countries by Capital Catalyzed",
        Horizontal,
        (CAPITAL_CATALYZED_AXIS, "Country"),
        &[Country],
        &[COUNTRY_CAPITAL],
        Descending,
        PaletteName::Rocket,
    ),
    bar(
        "geography_capital_by_theme_in_global_south",
        Tab::Geography,
        "Capital Catalyzed by Theme in Global South Countries",
        Horizontal,
        (CAPITAL_CATALYZED_AXIS, "Global South Countries Supported"),
        &[GlobalSouthCountries, Theme],
        &[COUNTRY_CAPITAL],
        Key,
        PaletteName::Set2,
    ),
    // ---- Thematic Analysis ----
    bar(
        "theme_capital_by_theme",
        Tab::Theme,
        "Capital Attracted by Themes",
        Horizontal,
        (CAPITAL_ATTRACTED_AXIS, "Theme"),
        &[Theme],
        &[THEME_CAPITAL],
        Descending,
        PaletteName::Viridis,
    ),
    bar(
        "theme_capital_by_country",
        Tab::Theme,
        "Thematic Capital Distribution Across Countries",
        Horizontal,
        (CAPITAL_ATTRACTED_AXIS, "Country"),
        &[Country, Theme],
        &[THEME_CAPITAL],
        Key,
        PaletteName::Set2,
    ),
    ChartSpec {
        rows: RowFilter::HasGlobalSouthCountries,
        ..bar(
            "theme_capital_in_global_south",
            Tab::Theme,
            "Capital Attracted by Themes in the Global South",
            Horizontal,
            (CAPITAL_ATTRACTED_AXIS, "Theme"),
            &[Theme],
            &[THEME_CAPITAL],
            Descending,
            PaletteName::Magma,
        )
    },
    bar(
        "theme_capital_by_fund",
        Tab::Theme,
        "Capital by Theme and Fund",
        Horizontal,
        (CAPITAL_ATTRACTED_AXIS, "Fund"),
        &[Fund, Theme],
        &[THEME_CAPITAL],
        Key,
        PaletteName::Cubehelix,
    ),
    bar(
        "theme_capital_by_region",
        Tab::Theme,
        "Thematic Investment Distribution by Region",
        Horizontal,
        (CAPITAL_ATTRACTED_AXIS, "Country"),
        &[Country, Theme],
        &[THEME_CAPITAL],
        Key,
        PaletteName::Rocket,
    ),
    // ---- Environmental Impact Analysis ----
    bar(
        "environment_emissions_by_fund",
        Tab::Environment,
        "Total Emissions by Fund",
        Horizontal,
        (EMISSIONS_AXIS, "Fund"),
        &[Fund],
        &[EMISSIONS],
        Descending,
        PaletteName::Blues,
    ),
    pie(
        "environment_emissions_share_by_fund",
        Tab::Environment,
        "Proportion of Total Emissions by Fund",
        &[Fund],
        &[EMISSIONS],
        PaletteName::Blues,
    ),
    bar(
        "environment_scopes_by_fund",
        Tab::Environment,
        "Scope 1, 2, and 3 Emissions by Fund",
        Horizontal,
        ("Emissions (tons of CO2e)", "Fund"),
        &[Fund],
        &SCOPES,
        Key,
        PaletteName::Pastel,
    ),
    pie(
        "environment_emissions_share_by_scope",
        Tab::Environment,
        "Proportion of Emissions by Scope",
        &[],
        &SCOPES,
        PaletteName::Pastel,
    ),
    bar(
        "environment_emissions_by_theme",
        Tab::Environment,
        "Total Emissions by Theme",
        Horizontal,
        (EMISSIONS_AXIS, "Theme"),
        &[Theme],
        &[EMISSIONS],
        Descending,
        PaletteName::Reds,
    ),
    pie(
        "environment_emissions_share_by_theme",
        Tab::Environment,
        "Proportion of Total Emissions by Theme",
        &[Theme],
        &[EMISSIONS],
        PaletteName::Reds,
    ),
    bar(
        "environment_scopes_by_country",
        Tab::Environment,
        "Scope 1, 2, and 3 Emissions by Country",
        Horizontal,
        ("Emissions (tons of CO2e)", "Country"),
        &[Country],
        &SCOPES,
        Key,
        PaletteName::Set1,
    ),
    pie(
        "environment_emissions_share_by_country",
        Tab::Environment,
        "Proportion of Emissions by Country",
        &[Country],
        &[Measure::SCOPE_EMISSIONS],
        PaletteName::Set1,
    ),
    bar(
        "environment_emissions_by_fund_and_theme",
        Tab::Environment,
        "Emissions by Fund and Theme",
        Horizontal,
        (EMISSIONS_AXIS, "Fund"),
        &[Fund, Theme],
        &[EMISSIONS],
        Key,
        PaletteName::Coolwarm,
    ),
    // ---- Global South Investment Focus ----
    bar(
        "global_south_deals_by_country",
        Tab::GlobalSouth,
        "Total Global South Deals Funded by Country",
        Horizontal,
        (DEALS_AXIS, "Country"),
        &[Country],
        &[GS_DEALS],
        Descending,
        PaletteName::Viridis,
    ),
    bar(
        "global_south_emissions_by_country",
        Tab::GlobalSouth,
        "Total Emissions by Country in Global South",
        Horizontal,
        (EMISSIONS_AXIS, "Country"),
        &[Country],
        &[EMISSIONS],
        Key,
        PaletteName::Magma,
    ),
    scatter(
        "global_south_deals_vs_investment",
        Tab::GlobalSouth,
        "Global South Deals Funded vs Investment ($M)",
        ("Global South Deals Funded", "Investment ($M)"),
        ChartSource::RowPoints {
            x: NumericField::GlobalSouthDeals,
            y: NumericField::Investment,
            hue: Country,
        },
        PaletteName::Set2,
    ),
    bar(
        "global_south_emissions_ranking",
        Tab::GlobalSouth,
        "Total Emissions by Country in the Global South",
        Horizontal,
        (EMISSIONS_AXIS, "Country"),
        &[Country],
        &[EMISSIONS],
        Descending,
        PaletteName::Blues,
    ),
    // ---- Fund Performance Comparison ----
    ChartSpec {
        reference_line: true,
        ..scatter(
            "performance_investment_vs_fund_size",
            Tab::FundPerformance,
            "Investment vs Fund Size by Fund",
            ("Fund Size ($M)", "Investment ($M)"),
            ChartSource::GroupPoints {
                x: FUND_SIZE,
                y: INVESTMENT,
                hue: Fund,
            },
            PaletteName::Set1,
        )
    },
    bar(
        "performance_utilization_ratio",
        Tab::FundPerformance,
        "Fund Utilization Ratio",
        Horizontal,
        ("Utilization Ratio (Investment / Fund Size)", "Fund"),
        &[Fund],
        &[Measure::UTILIZATION_RATIO],
        Descending,
        PaletteName::Blues,
    ),
    bar(
        "performance_emissions_per_investment",
        Tab::FundPerformance,
        "Emissions per Investment by Fund",
        Horizontal,
        ("Emissions (tons of CO2e per $M Investment)", "Fund"),
        &[Fund],
        &[Measure::EMISSIONS_PER_INVESTMENT],
        Ascending,
        PaletteName::Reds,
    ),
    bar(
        "performance_total_emissions",
        Tab::FundPerformance,
        "Total Emissions by Fund",
        Horizontal,
        (EMISSIONS_AXIS, "Fund"),
        &[Fund],
        &[EMISSIONS],
        Descending,
        PaletteName::Greens,
    ),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn row(fund: &str, country: &str, theme: &str, gs: Option<&str>) -> Record {
        Record {
            company: "Acme".into(),
            country: country.into(),
            fund: fund.into(),
            theme: theme.into(),
            fund_size_musd: 100.0,
            investment_musd: 25.0,
            total_emissions_tco2e: 50.0,
            theme_capital_catalyzed_musd: 10.0,
            global_south_countries_supported: gs.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn chart_ids_are_unique() {
        let ids: HashSet<&str> = CATALOG.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn every_tab_has_charts() {
        for tab in Tab::ALL {
            assert!(CATALOG.iter().any(|c| c.tab == tab), "{tab:?} has no charts");
        }
    }

    #[test]
    fn kinds_match_sources() {
        for spec in CATALOG {
            let scatter_source = matches!(
                spec.source,
                ChartSource::RowPoints { .. } | ChartSource::GroupPoints { .. }
            );
            assert_eq!(spec.kind == ChartKind::Scatter, scatter_source, "{}", spec.id);
        }
    }

    #[test]
    fn every_chart_survives_an_empty_dataset() {
        let empty = Dataset::default();
        for spec in CATALOG {
            let data = evaluate(spec, &empty);
            assert!(data.is_empty(), "{} should be empty", spec.id);
        }
    }

    #[test]
    fn global_south_row_filter_drops_untagged_rows() {
        let ds = Dataset::from_records(vec![
            row("Fund I", "Kenya", "Energy", Some("Kenya")),
            row("Fund I", "Chile", "Water", None),
        ]);
        let spec = CATALOG
            .iter()
            .find(|c| c.id == "theme_capital_in_global_south")
            .unwrap();

        match evaluate(spec, &ds) {
            ChartData::Table(t) => assert_eq!(t.pairs(0), vec![("Energy".to_string(), 10.0)]),
            other => panic!("expected a table, got {other:?}"),
        }
    }

    #[test]
    fn performance_scatter_has_one_point_per_fund() {
        let ds = Dataset::from_records(vec![
            row("Fund I", "Kenya", "Energy", None),
            row("Fund I", "Chile", "Water", None),
            row("Fund II", "Chile", "Water", None),
        ]);
        let spec = CATALOG
            .iter()
            .find(|c| c.id == "performance_investment_vs_fund_size")
            .unwrap();
        assert!(spec.reference_line);

        match evaluate(spec, &ds) {
            ChartData::Points(series) => {
                assert_eq!(series.len(), 2);
                assert_eq!(series[0].points, vec![[200.0, 50.0]]);
            }
            other => panic!("expected points, got {other:?}"),
        }
    }

    #[test]
    fn two_dimension_layout_fills_missing_combinations() {
        let ds = Dataset::from_records(vec![
            row("Fund I", "Kenya", "Energy", None),
            row("Fund I", "Chile", "Water", None),
            row("Fund II", "Chile", "Energy", None),
        ]);
        let spec = CATALOG.iter().find(|c| c.id == "theme_capital_by_country").unwrap();
        let ChartData::Table(table) = evaluate(spec, &ds) else {
            panic!("expected a table");
        };
        let layout = bar_layout(&table);

        assert_eq!(layout.categories, ["Chile", "Kenya"]);
        assert!(layout.has_hue());
        assert_eq!(
            layout.series,
            vec![
                ("Energy".to_string(), vec![10.0, 10.0]),
                ("Water".to_string(), vec![10.0, 0.0]),
            ]
        );
    }

    #[test]
    fn multi_measure_layout_has_one_series_per_measure() {
        let ds = Dataset::from_records(vec![row("Fund I", "Kenya", "Energy", None)]);
        let spec = CATALOG.iter().find(|c| c.id == "environment_scopes_by_fund").unwrap();
        let ChartData::Table(table) = evaluate(spec, &ds) else {
            panic!("expected a table");
        };
        let layout = bar_layout(&table);

        assert_eq!(layout.categories, ["Fund I"]);
        assert_eq!(layout.series.len(), 3);
        assert_eq!(layout.series[0].0, "Scope 1 Emissions (tons of CO2e)");
    }

    #[test]
    fn single_series_layout_follows_sort_order() {
        let mut big = row("Fund II", "Kenya", "Energy", None);
        big.total_emissions_tco2e = 500.0;
        let ds = Dataset::from_records(vec![row("Fund I", "Kenya", "Energy", None), big]);
        let spec = CATALOG.iter().find(|c| c.id == "performance_total_emissions").unwrap();
        let ChartData::Table(table) = evaluate(spec, &ds) else {
            panic!("expected a table");
        };
        let layout = bar_layout(&table);

        assert!(!layout.has_hue());
        assert_eq!(layout.categories, ["Fund II", "Fund I"]);
        assert_eq!(layout.series[0].1, vec![500.0, 50.0]);
    }

    #[test]
    fn evaluate_tab_keeps_catalog_order() {
        let charts = evaluate_tab(Tab::FundPerformance, &Dataset::default());
        let ids: Vec<&str> = charts.iter().map(|c| c.spec.id).collect();
        assert_eq!(
            ids,
            [
                "performance_investment_vs_fund_size",
                "performance_utilization_ratio",
                "performance_emissions_per_investment",
                "performance_total_emissions",
            ]
        );
    }
}
