use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{Dataset, Dimension, NumericField, Record};

/// What a ratio evaluates to when its denominator sums to exactly zero
/// (empty selection, a fund with no size, a fund with no investment).
pub const UNDEFINED_RATIO: f64 = 0.0;

/// `numerator / denominator`, or [`UNDEFINED_RATIO`] for a zero denominator.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        UNDEFINED_RATIO
    } else {
        numerator / denominator
    }
}

// ---------------------------------------------------------------------------
// Measures
// ---------------------------------------------------------------------------

/// How a measure is derived from the per-group field sums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Expr {
    /// `sum(field)`
    Total(NumericField),
    /// `sum(f1) + sum(f2) + ...`
    Combined(&'static [NumericField]),
    /// `sum(a) - sum(b)`
    Difference(NumericField, NumericField),
    /// `factor * sum(numerator) / sum(denominator)`
    Ratio {
        numerator: NumericField,
        denominator: NumericField,
        factor: f64,
    },
}

/// A named, summed quantity plotted on a chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measure {
    pub name: &'static str,
    pub expr: Expr,
}

impl Measure {
    pub const fn total(field: NumericField) -> Self {
        Measure {
            name: field.column(),
            expr: Expr::Total(field),
        }
    }

    /// Unused fund capacity: fund size minus investment.
    pub const SIZE_VS_INVESTMENT: Measure = Measure {
        name: "Size vs Investment",
        expr: Expr::Difference(NumericField::FundSize, NumericField::Investment),
    };

    /// Investment as a percentage of committed capital. Committed capital is
    /// in billions, so `inv / (committed * 1000) * 100 = 0.1 * inv / committed`.
    pub const PERCENT_INVESTED: Measure = Measure {
        name: "Percentage Invested",
        expr: Expr::Ratio {
            numerator: NumericField::Investment,
            denominator: NumericField::CapitalCommitted,
            factor: 0.1,
        },
    };

    pub const UTILIZATION_RATIO: Measure = Measure {
        name: "Utilization Ratio",
        expr: Expr::Ratio {
            numerator: NumericField::Investment,
            denominator: NumericField::FundSize,
            factor: 1.0,
        },
    };

    pub const EMISSIONS_PER_INVESTMENT: Measure = Measure {
        name: "Emissions per Investment",
        expr: Expr::Ratio {
            numerator: NumericField::TotalEmissions,
            denominator: NumericField::Investment,
            factor: 1.0,
        },
    };

    /// Scope 1 + 2 + 3 emissions.
    pub const SCOPE_EMISSIONS: Measure = Measure {
        name: "Emissions",
        expr: Expr::Combined(&[
            NumericField::Scope1Emissions,
            NumericField::Scope2Emissions,
            NumericField::Scope3Emissions,
        ]),
    };

    /// Evaluate on a group's field sums (indexed by [`NumericField::index`]).
    fn evaluate(&self, sums: &FieldSums) -> f64 {
        let sum = |f: NumericField| sums[f.index()];
        match self.expr {
            Expr::Total(f) => sum(f),
            Expr::Combined(fields) => fields.iter().map(|&f| sum(f)).sum(),
            Expr::Difference(a, b) => sum(a) - sum(b),
            Expr::Ratio {
                numerator,
                denominator,
                factor,
            } => factor * ratio(sum(numerator), sum(denominator)),
        }
    }
}

type FieldSums = [f64; NumericField::ALL.len()];

/// Every value of every field seen in one group, summed once the group is
/// complete.
type FieldValues = [Vec<f64>; NumericField::ALL.len()];

fn add_record(values: &mut FieldValues, record: &Record) {
    for field in NumericField::ALL {
        values[field.index()].push(field.value(record));
    }
}

fn field_sums(mut values: FieldValues) -> FieldSums {
    std::array::from_fn(|i| stable_sum(std::mem::take(&mut values[i])))
}

/// Sum in ascending value order, so the result depends only on the multiset
/// of values and not on the order the rows arrived in. Zero for no values.
pub fn stable_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.into_iter().collect();
    values.sort_by(f64::total_cmp);
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

// ---------------------------------------------------------------------------
// Grouped aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    /// One value per grouping dimension.
    pub key: Vec<String>,
    /// One value per measure.
    pub values: Vec<f64>,
}

/// Result of grouping records and summing measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<Measure>,
    pub rows: Vec<AggregateRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortOrder {
    /// Lexicographic by key (the order [`aggregate`] emits).
    #[default]
    Key,
    Ascending,
    Descending,
}

/// Group `dataset` by `group_by` and sum every measure per group.
///
/// Rows lacking a key for one of the dimensions are left out. Groups come out
/// in lexicographic key order and each sum is taken with [`stable_sum`], so
/// the result does not depend on row order.
/// With an empty `group_by` the table always holds exactly one row of grand
/// totals (all zero for an empty dataset).
pub fn aggregate(dataset: &Dataset, group_by: &[Dimension], measures: &[Measure]) -> AggregateTable {
    aggregate_records(dataset.records(), group_by, measures)
}

/// [`aggregate`] over any sequence of records.
pub fn aggregate_records<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    group_by: &[Dimension],
    measures: &[Measure],
) -> AggregateTable {
    let mut groups: BTreeMap<Vec<String>, FieldValues> = BTreeMap::new();
    if group_by.is_empty() {
        groups.insert(Vec::new(), FieldValues::default());
    }

    for record in records {
        let key: Option<Vec<String>> = group_by
            .iter()
            .map(|dim| dim.value(record).map(str::to_string))
            .collect();
        let Some(key) = key else {
            continue;
        };
        add_record(groups.entry(key).or_default(), record);
    }

    let rows = groups
        .into_iter()
        .map(|(key, values)| {
            let sums = field_sums(values);
            AggregateRow {
                key,
                values: measures.iter().map(|m| m.evaluate(&sums)).collect(),
            }
        })
        .collect();

    AggregateTable {
        dimensions: group_by.to_vec(),
        measures: measures.to_vec(),
        rows,
    }
}

impl AggregateTable {
    /// Re-order rows by the values of measure `measure`. Stable, so ties keep
    /// key order.
    pub fn sorted_by(mut self, measure: usize, order: SortOrder) -> Self {
        let value = |row: &AggregateRow| row.values.get(measure).copied().unwrap_or_default();
        match order {
            SortOrder::Key => {}
            SortOrder::Ascending => self.rows.sort_by(|a, b| value(a).total_cmp(&value(b))),
            SortOrder::Descending => self.rows.sort_by(|a, b| value(b).total_cmp(&value(a))),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up the value of `measure` for an exact key.
    pub fn value(&self, key: &[&str], measure: usize) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.key.iter().map(String::as_str).eq(key.iter().copied()))
            .and_then(|row| row.values.get(measure).copied())
    }

    /// `(key, value)` pairs for one measure, keys joined with `" / "`.
    pub fn pairs(&self, measure: usize) -> Vec<(String, f64)> {
        self.rows
            .iter()
            .map(|row| {
                (
                    row.key.join(" / "),
                    row.values.get(measure).copied().unwrap_or_default(),
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Scatter points
// ---------------------------------------------------------------------------

/// One coloured series of `[x, y]` points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// One point per record, one series per `hue` value (in key order).
pub fn scatter_rows<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    x: NumericField,
    y: NumericField,
    hue: Dimension,
) -> Vec<ScatterSeries> {
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for record in records {
        if let Some(name) = hue.value(record) {
            series
                .entry(name)
                .or_default()
                .push([x.value(record), y.value(record)]);
        }
    }
    series
        .into_iter()
        .map(|(name, points)| ScatterSeries {
            name: name.to_string(),
            points,
        })
        .collect()
}

/// One point per `hue` group with both coordinates summed over the group.
pub fn scatter_groups<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    x: Measure,
    y: Measure,
    hue: Dimension,
) -> Vec<ScatterSeries> {
    aggregate_records(records, &[hue], &[x, y])
        .rows
        .into_iter()
        .map(|row| ScatterSeries {
            name: row.key.join(" / "),
            points: vec![[row.values[0], row.values[1]]],
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pie slices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Fraction of the pie in `[0, 1]`; all zero when the total is zero.
    pub share: f64,
}

/// Turn a table into pie slices.
///
/// A grouped table yields one slice per row (first measure). A grand-total
/// table (no dimensions) yields one slice per measure, which is how scope
/// 1/2/3 totals become a single pie.
pub fn pie_slices(table: &AggregateTable) -> Vec<PieSlice> {
    let labelled: Vec<(String, f64)> = if table.dimensions.is_empty() {
        let totals = table.rows.first();
        table
            .measures
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let v = totals.and_then(|r| r.values.get(i)).copied().unwrap_or_default();
                (m.name.to_string(), v)
            })
            .collect()
    } else {
        table.pairs(0)
    };

    let total = stable_sum(labelled.iter().map(|(_, v)| *v));
    labelled
        .into_iter()
        .map(|(label, value)| PieSlice {
            share: ratio(value, total),
            label,
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fund_row(fund: &str, size: f64, investment: f64) -> Record {
        Record {
            fund: fund.into(),
            fund_size_musd: size,
            investment_musd: investment,
            ..Default::default()
        }
    }

    #[test]
    fn size_vs_investment_and_utilization_per_fund() {
        let ds = Dataset::from_records(vec![fund_row("A", 100.0, 40.0), fund_row("B", 50.0, 50.0)]);
        let table = aggregate(
            &ds,
            &[Dimension::Fund],
            &[Measure::SIZE_VS_INVESTMENT, Measure::UTILIZATION_RATIO],
        );

        assert_eq!(table.value(&["A"], 0), Some(60.0));
        assert_eq!(table.value(&["B"], 0), Some(0.0));
        assert_eq!(table.value(&["A"], 1), Some(0.4));
        assert_eq!(table.value(&["B"], 1), Some(1.0));
    }

    #[test]
    fn zero_denominator_yields_sentinel() {
        let mut row = fund_row("A", 0.0, 0.0);
        row.total_emissions_tco2e = 900.0;
        let ds = Dataset::from_records(vec![row]);
        let table = aggregate(
            &ds,
            &[Dimension::Fund],
            &[Measure::EMISSIONS_PER_INVESTMENT, Measure::UTILIZATION_RATIO],
        );

        assert_eq!(table.value(&["A"], 0), Some(UNDEFINED_RATIO));
        assert_eq!(table.value(&["A"], 1), Some(UNDEFINED_RATIO));
    }

    #[test]
    fn percent_invested_converts_billions() {
        let mut row = fund_row("A", 0.0, 50.0);
        row.total_capital_committed_busd = 1.0;
        let ds = Dataset::from_records(vec![row]);
        let table = aggregate(&ds, &[Dimension::Fund], &[Measure::PERCENT_INVESTED]);

        let pct = table.value(&["A"], 0).unwrap();
        assert!((pct - 5.0).abs() < 1e-12, "got {pct}");
    }

    #[test]
    fn combined_measure_adds_scopes() {
        let row = Record {
            country: "Kenya".into(),
            scope1_emissions_tco2e: 1.0,
            scope2_emissions_tco2e: 2.0,
            scope3_emissions_tco2e: 4.0,
            ..Default::default()
        };
        let ds = Dataset::from_records(vec![row.clone(), row]);
        let table = aggregate(&ds, &[Dimension::Country], &[Measure::SCOPE_EMISSIONS]);
        assert_eq!(table.value(&["Kenya"], 0), Some(14.0));
    }

    #[test]
    fn grand_totals_on_empty_dataset_are_zero() {
        let table = aggregate(
            &Dataset::default(),
            &[],
            &[Measure::total(NumericField::Investment), Measure::UTILIZATION_RATIO],
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].values, vec![0.0, 0.0]);
    }

    #[test]
    fn grouping_skips_rows_without_a_key() {
        let mut with_gs = fund_row("A", 10.0, 5.0);
        with_gs.global_south_countries_supported = Some("Kenya".into());
        let without_gs = fund_row("B", 10.0, 7.0);
        let ds = Dataset::from_records(vec![with_gs, without_gs]);

        let table = aggregate(
            &ds,
            &[Dimension::GlobalSouthCountries],
            &[Measure::total(NumericField::Investment)],
        );
        assert_eq!(table.pairs(0), vec![("Kenya".to_string(), 5.0)]);
    }

    #[test]
    fn sorting_by_measure() {
        let ds = Dataset::from_records(vec![
            fund_row("A", 10.0, 1.0),
            fund_row("B", 10.0, 3.0),
            fund_row("C", 10.0, 2.0),
        ]);
        let table = aggregate(&ds, &[Dimension::Fund], &[Measure::total(NumericField::Investment)]);

        let desc: Vec<String> = table.clone().sorted_by(0, SortOrder::Descending).pairs(0).into_iter().map(|p| p.0).collect();
        let asc: Vec<String> = table.sorted_by(0, SortOrder::Ascending).pairs(0).into_iter().map(|p| p.0).collect();
        assert_eq!(desc, ["B", "C", "A"]);
        assert_eq!(asc, ["A", "C", "B"]);
    }

    #[test]
    fn pie_of_grand_totals_has_one_slice_per_measure() {
        let row = Record {
            scope1_emissions_tco2e: 10.0,
            scope2_emissions_tco2e: 30.0,
            scope3_emissions_tco2e: 60.0,
            ..Default::default()
        };
        let ds = Dataset::from_records(vec![row]);
        let table = aggregate(
            &ds,
            &[],
            &[
                Measure::total(NumericField::Scope1Emissions),
                Measure::total(NumericField::Scope2Emissions),
                Measure::total(NumericField::Scope3Emissions),
            ],
        );
        let slices = pie_slices(&table);

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[2].label, "Scope 3 Emissions (tons of CO2e)");
        assert!((slices[2].share - 0.6).abs() < 1e-12);
    }

    #[test]
    fn pie_with_zero_total_has_zero_shares() {
        let ds = Dataset::from_records(vec![fund_row("A", 0.0, 0.0)]);
        let table = aggregate(&ds, &[Dimension::Fund], &[Measure::total(NumericField::TotalEmissions)]);
        let slices = pie_slices(&table);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].share, 0.0);
    }

    #[test]
    fn scatter_groups_sum_per_hue() {
        let ds = Dataset::from_records(vec![
            fund_row("A", 10.0, 4.0),
            fund_row("A", 20.0, 6.0),
            fund_row("B", 5.0, 5.0),
        ]);
        let series = scatter_groups(
            ds.records(),
            Measure::total(NumericField::FundSize),
            Measure::total(NumericField::Investment),
            Dimension::Fund,
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "A");
        assert_eq!(series[0].points, vec![[30.0, 10.0]]);
    }

    #[test]
    fn stable_sum_ignores_input_order() {
        let forward = stable_sum([0.1, 0.2, 0.3]);
        assert_eq!(forward, stable_sum([0.3, 0.2, 0.1]));
        assert_eq!(forward, stable_sum([0.2, 0.3, 0.1]));
        assert_eq!(stable_sum(std::iter::empty::<f64>()), 0.0);
        assert!(stable_sum(std::iter::empty::<f64>()).is_sign_positive());
    }

    #[test]
    fn scatter_rows_keep_one_point_per_record() {
        let ds = Dataset::from_records(vec![
            fund_row("A", 10.0, 4.0),
            fund_row("A", 20.0, 6.0),
        ]);
        let series = scatter_rows(ds.records(), NumericField::FundSize, NumericField::Investment, Dimension::Fund);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![[10.0, 4.0], [20.0, 6.0]]);
    }
}
