use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names – the fixed required-column contract of the input file
// ---------------------------------------------------------------------------

pub mod columns {
    pub const COMPANY: &str = "Company Name";
    pub const COUNTRY: &str = "Country";
    pub const FUND: &str = "Fund";
    pub const THEME: &str = "Theme";
    pub const FUND_SIZE: &str = "Fund Size ($M)";
    pub const INVESTMENT: &str = "Investment ($M)";
    pub const CAPITAL_COMMITTED: &str = "Total Capital Committed ($B)";
    pub const FUND_INVESTMENTS: &str = "Fund Investments";
    pub const COUNTRY_CAPITAL: &str = "Country Capital Catalyzed ($M)";
    pub const THEME_CAPITAL: &str = "Theme Capital Catalyzed ($M)";
    pub const TOTAL_EMISSIONS: &str = "Total Emissions by Fund (tons of CO2e)";
    pub const SCOPE1_EMISSIONS: &str = "Scope 1 Emissions (tons of CO2e)";
    pub const SCOPE2_EMISSIONS: &str = "Scope 2 Emissions (tons of CO2e)";
    pub const SCOPE3_EMISSIONS: &str = "Scope 3 Emissions (tons of CO2e)";
    pub const GLOBAL_SOUTH_COUNTRIES: &str = "Global South Countries Supported";
    pub const GLOBAL_SOUTH_DEALS: &str = "Global South Deals Funded";

    /// Every column a dataset file must carry, in canonical output order.
    pub const REQUIRED: [&str; 16] = [
        COMPANY,
        COUNTRY,
        FUND,
        THEME,
        FUND_SIZE,
        INVESTMENT,
        CAPITAL_COMMITTED,
        FUND_INVESTMENTS,
        COUNTRY_CAPITAL,
        THEME_CAPITAL,
        TOTAL_EMISSIONS,
        SCOPE1_EMISSIONS,
        SCOPE2_EMISSIONS,
        SCOPE3_EMISSIONS,
        GLOBAL_SOUTH_COUNTRIES,
        GLOBAL_SOUTH_DEALS,
    ];
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// A single fund/company observation (one row of the source table).
///
/// Serialises with the original column headers so a written file can be
/// loaded back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Record {
    #[serde(rename = "Company Name")]
    pub company: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Fund")]
    pub fund: String,
    #[serde(rename = "Theme")]
    pub theme: String,
    #[serde(rename = "Fund Size ($M)")]
    pub fund_size_musd: f64,
    #[serde(rename = "Investment ($M)")]
    pub investment_musd: f64,
    #[serde(rename = "Total Capital Committed ($B)")]
    pub total_capital_committed_busd: f64,
    #[serde(rename = "Fund Investments")]
    pub fund_investments: i64,
    #[serde(rename = "Country Capital Catalyzed ($M)")]
    pub country_capital_catalyzed_musd: f64,
    #[serde(rename = "Theme Capital Catalyzed ($M)")]
    pub theme_capital_catalyzed_musd: f64,
    #[serde(rename = "Total Emissions by Fund (tons of CO2e)")]
    pub total_emissions_tco2e: f64,
    #[serde(rename = "Scope 1 Emissions (tons of CO2e)")]
    pub scope1_emissions_tco2e: f64,
    #[serde(rename = "Scope 2 Emissions (tons of CO2e)")]
    pub scope2_emissions_tco2e: f64,
    #[serde(rename = "Scope 3 Emissions (tons of CO2e)")]
    pub scope3_emissions_tco2e: f64,
    #[serde(rename = "Global South Countries Supported")]
    pub global_south_countries_supported: Option<String>,
    #[serde(rename = "Global South Deals Funded")]
    pub global_south_deals_funded: i64,
}

// ---------------------------------------------------------------------------
// Dimension – categorical fields usable as grouping keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dimension {
    Company,
    Country,
    Fund,
    Theme,
    GlobalSouthCountries,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Company,
        Dimension::Country,
        Dimension::Fund,
        Dimension::Theme,
        Dimension::GlobalSouthCountries,
    ];

    /// Source column name.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Company => columns::COMPANY,
            Dimension::Country => columns::COUNTRY,
            Dimension::Fund => columns::FUND,
            Dimension::Theme => columns::THEME,
            Dimension::GlobalSouthCountries => columns::GLOBAL_SOUTH_COUNTRIES,
        }
    }

    /// The "no constraint" entry shown at the top of a dropdown.
    pub fn all_label(self) -> &'static str {
        match self {
            Dimension::Company => "All Companies",
            Dimension::Country => "All Countries",
            Dimension::Fund => "All Funds",
            Dimension::Theme => "All Themes",
            Dimension::GlobalSouthCountries => "All Global South Countries",
        }
    }

    /// The row's key for this dimension. `None` means the row has no key
    /// and is left out of any grouping over this dimension.
    pub fn value(self, record: &Record) -> Option<&str> {
        match self {
            Dimension::Company => Some(&record.company),
            Dimension::Country => Some(&record.country),
            Dimension::Fund => Some(&record.fund),
            Dimension::Theme => Some(&record.theme),
            Dimension::GlobalSouthCountries => record.global_south_countries_supported.as_deref(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// NumericField – summable columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericField {
    FundSize,
    Investment,
    CapitalCommitted,
    FundInvestments,
    CountryCapital,
    ThemeCapital,
    TotalEmissions,
    Scope1Emissions,
    Scope2Emissions,
    Scope3Emissions,
    GlobalSouthDeals,
}

impl NumericField {
    pub const ALL: [NumericField; 11] = [
        NumericField::FundSize,
        NumericField::Investment,
        NumericField::CapitalCommitted,
        NumericField::FundInvestments,
        NumericField::CountryCapital,
        NumericField::ThemeCapital,
        NumericField::TotalEmissions,
        NumericField::Scope1Emissions,
        NumericField::Scope2Emissions,
        NumericField::Scope3Emissions,
        NumericField::GlobalSouthDeals,
    ];

    /// Position in [`NumericField::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub const fn column(self) -> &'static str {
        match self {
            NumericField::FundSize => columns::FUND_SIZE,
            NumericField::Investment => columns::INVESTMENT,
            NumericField::CapitalCommitted => columns::CAPITAL_COMMITTED,
            NumericField::FundInvestments => columns::FUND_INVESTMENTS,
            NumericField::CountryCapital => columns::COUNTRY_CAPITAL,
            NumericField::ThemeCapital => columns::THEME_CAPITAL,
            NumericField::TotalEmissions => columns::TOTAL_EMISSIONS,
            NumericField::Scope1Emissions => columns::SCOPE1_EMISSIONS,
            NumericField::Scope2Emissions => columns::SCOPE2_EMISSIONS,
            NumericField::Scope3Emissions => columns::SCOPE3_EMISSIONS,
            NumericField::GlobalSouthDeals => columns::GLOBAL_SOUTH_DEALS,
        }
    }

    /// Read the field from a record. Integer columns are widened to `f64`.
    pub fn value(self, record: &Record) -> f64 {
        match self {
            NumericField::FundSize => record.fund_size_musd,
            NumericField::Investment => record.investment_musd,
            NumericField::CapitalCommitted => record.total_capital_committed_busd,
            NumericField::FundInvestments => record.fund_investments as f64,
            NumericField::CountryCapital => record.country_capital_catalyzed_musd,
            NumericField::ThemeCapital => record.theme_capital_catalyzed_musd,
            NumericField::TotalEmissions => record.total_emissions_tco2e,
            NumericField::Scope1Emissions => record.scope1_emissions_tco2e,
            NumericField::Scope2Emissions => record.scope2_emissions_tco2e,
            NumericField::Scope3Emissions => record.scope3_emissions_tco2e,
            NumericField::GlobalSouthDeals => record.global_south_deals_funded as f64,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct values per dimension.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Vec<Record>,
    /// For each dimension, distinct keys in first-occurrence order.
    distinct: BTreeMap<Dimension, Vec<String>>,
}

impl Dataset {
    /// Build dimension indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut distinct: BTreeMap<Dimension, Vec<String>> = BTreeMap::new();

        for dim in Dimension::ALL {
            let mut seen: HashSet<&str> = HashSet::new();
            let values = distinct.entry(dim).or_default();
            for record in &records {
                if let Some(key) = dim.value(record) {
                    if seen.insert(key) {
                        values.push(key.to_string());
                    }
                }
            }
        }

        Dataset { records, distinct }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct keys of `dimension`, in the order they first appear.
    pub fn distinct(&self, dimension: Dimension) -> &[String] {
        self.distinct
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Dropdown entries for `dimension`: the "All …" sentinel followed by
    /// every distinct value.
    pub fn options(&self, dimension: Dimension) -> Vec<String> {
        std::iter::once(dimension.all_label().to_string())
            .chain(self.distinct(dimension).iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, country: &str, gs: Option<&str>) -> Record {
        Record {
            company: company.into(),
            country: country.into(),
            fund: "Fund I".into(),
            theme: "Energy".into(),
            global_south_countries_supported: gs.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn distinct_values_keep_first_occurrence_order() {
        let ds = Dataset::from_records(vec![
            row("Zeta", "Kenya", Some("Kenya")),
            row("Alpha", "India", None),
            row("Zeta", "Kenya", Some("Kenya")),
        ]);

        assert_eq!(ds.distinct(Dimension::Company), ["Zeta", "Alpha"]);
        assert_eq!(ds.distinct(Dimension::Country), ["Kenya", "India"]);
        assert_eq!(ds.distinct(Dimension::GlobalSouthCountries), ["Kenya"]);
    }

    #[test]
    fn options_start_with_sentinel() {
        let ds = Dataset::from_records(vec![row("Acme", "Chile", None)]);
        assert_eq!(ds.options(Dimension::Company), ["All Companies", "Acme"]);
        assert_eq!(ds.options(Dimension::Fund), ["All Funds", "Fund I"]);
    }

    #[test]
    fn integer_fields_widen_to_float() {
        let r = Record {
            fund_investments: 7,
            global_south_deals_funded: 3,
            ..Default::default()
        };
        assert_eq!(NumericField::FundInvestments.value(&r), 7.0);
        assert_eq!(NumericField::GlobalSouthDeals.value(&r), 3.0);
    }
}
