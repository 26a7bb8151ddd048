use std::fmt;

use serde::Serialize;

use super::model::{Dataset, Dimension, Record};

// ---------------------------------------------------------------------------
// Filter predicate: one optional exact-match constraint per dropdown
// ---------------------------------------------------------------------------

/// The company / country / fund constraints picked in the side panel.
/// `None` means "no constraint" (the "All …" entry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub company: Option<String>,
    pub country: Option<String>,
    pub fund: Option<String>,
}

impl FilterSelection {
    /// No constraints at all; [`apply`] returns the dataset unchanged.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a selection from raw dropdown strings. The "All …" sentinels and
    /// the empty string impose no constraint, so a data value equal to one of
    /// them cannot be selected this way; use [`FilterSelection::constrain`].
    pub fn from_dropdowns(company: &str, country: &str, fund: &str) -> Self {
        Self {
            company: constraint(Dimension::Company, company),
            country: constraint(Dimension::Country, country),
            fund: constraint(Dimension::Fund, fund),
        }
    }

    /// The constraint currently set for a filterable dimension.
    pub fn get(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Company => self.company.as_deref(),
            Dimension::Country => self.country.as_deref(),
            Dimension::Fund => self.fund.as_deref(),
            Dimension::Theme | Dimension::GlobalSouthCountries => None,
        }
    }

    /// Replace the constraint for a filterable dimension from a dropdown
    /// string. Non-filterable dimensions are ignored.
    pub fn set(&mut self, dimension: Dimension, value: &str) {
        self.constrain(dimension, constraint(dimension, value).as_deref());
    }

    /// Replace the constraint for a filterable dimension. `Some` is matched
    /// verbatim, even when it is empty or equals the "All …" label.
    /// Non-filterable dimensions are ignored.
    pub fn constrain(&mut self, dimension: Dimension, value: Option<&str>) {
        let slot = match dimension {
            Dimension::Company => &mut self.company,
            Dimension::Country => &mut self.country,
            Dimension::Fund => &mut self.fund,
            Dimension::Theme | Dimension::GlobalSouthCountries => return,
        };
        *slot = value.map(str::to_string);
    }

    pub fn is_unconstrained(&self) -> bool {
        self.company.is_none() && self.country.is_none() && self.fund.is_none()
    }

    /// Whether `record` passes every active constraint.
    pub fn matches(&self, record: &Record) -> bool {
        fn ok(constraint: &Option<String>, value: &str) -> bool {
            constraint.as_deref().map_or(true, |c| c == value)
        }
        ok(&self.company, &record.company)
            && ok(&self.country, &record.country)
            && ok(&self.fund, &record.fund)
    }

    /// The dropdown label for a dimension: the value, or its "All …" entry.
    pub fn label(&self, dimension: Dimension) -> &str {
        self.get(dimension).unwrap_or(dimension.all_label())
    }
}

impl fmt::Display for FilterSelection {
    /// `Analyzing: Acme in Kenya for All Funds`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Analyzing: {} in {} for {}",
            self.label(Dimension::Company),
            self.label(Dimension::Country),
            self.label(Dimension::Fund)
        )
    }
}

fn constraint(dimension: Dimension, value: &str) -> Option<String> {
    if value.is_empty() || value == dimension.all_label() {
        None
    } else {
        Some(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Applying the selection
// ---------------------------------------------------------------------------

/// Return a new dataset holding the records that pass all active constraints,
/// in their original order. The source dataset is left untouched; an empty
/// result is valid.
pub fn apply(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    if selection.is_unconstrained() {
        return dataset.clone();
    }
    let kept = dataset
        .records()
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();
    Dataset::from_records(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, country: &str, fund: &str) -> Record {
        Record {
            company: company.into(),
            country: country.into(),
            fund: fund.into(),
            ..Default::default()
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            row("Acme", "Kenya", "Fund I"),
            row("Acme", "India", "Fund II"),
            row("Beta", "Kenya", "Fund II"),
        ])
    }

    #[test]
    fn sentinels_and_empty_strings_are_unconstrained() {
        let sel = FilterSelection::from_dropdowns("All Companies", "", "All Funds");
        assert!(sel.is_unconstrained());
    }

    #[test]
    fn constraints_are_conjunctive() {
        let sel = FilterSelection::from_dropdowns("Acme", "Kenya", "All Funds");
        let out = apply(&sample(), &sel);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].fund, "Fund I");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let sel = FilterSelection::from_dropdowns("acme", "All Countries", "All Funds");
        assert!(apply(&sample(), &sel).is_empty());
    }

    #[test]
    fn set_only_touches_filterable_dimensions() {
        let mut sel = FilterSelection::all();
        sel.set(Dimension::Country, "Kenya");
        sel.set(Dimension::Theme, "Energy");
        assert_eq!(sel.get(Dimension::Country), Some("Kenya"));
        assert_eq!(sel.get(Dimension::Theme), None);

        sel.set(Dimension::Country, "All Countries");
        assert!(sel.is_unconstrained());
    }

    #[test]
    fn constrain_matches_values_that_look_like_sentinels() {
        let ds = Dataset::from_records(vec![
            row("All Companies", "Kenya", "Fund I"),
            row("Acme", "Kenya", "Fund I"),
            row("", "India", "Fund II"),
        ]);

        let mut sel = FilterSelection::all();
        sel.constrain(Dimension::Company, Some("All Companies"));
        let out = apply(&ds, &sel);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].company, "All Companies");

        sel.constrain(Dimension::Company, Some(""));
        assert_eq!(apply(&ds, &sel).records()[0].country, "India");

        sel.constrain(Dimension::Company, None);
        assert!(sel.is_unconstrained());
    }

    #[test]
    fn caption_uses_sentinels_for_open_constraints() {
        let sel = FilterSelection::from_dropdowns("Acme", "All Countries", "All Funds");
        assert_eq!(sel.to_string(), "Analyzing: Acme in All Countries for All Funds");
    }
}
