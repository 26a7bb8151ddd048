use std::path::Path;

use alviridi_dashboard::config::DashboardConfig;
use alviridi_dashboard::{Dashboard, DashboardView, Dimension, FilterSelection, Tab};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded session (None until a file loads successfully).
    pub dashboard: Option<Dashboard>,

    /// Current company / country / fund constraints.
    pub selection: FilterSelection,

    /// Metrics and charts for `selection` (cached).
    pub view: Option<DashboardView>,

    /// Tab shown in the central panel.
    pub active_tab: Tab,

    /// Whether each chart is followed by its data table.
    pub show_tables: bool,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Why the last load failed; replaces the dashboard when set.
    pub load_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dashboard: None,
            selection: FilterSelection::all(),
            view: None,
            active_tab: Tab::Investment,
            show_tables: false,
            status_message: None,
            load_error: None,
        }
    }
}

impl AppState {
    /// Initial state: try to load the configured data file.
    pub fn open(config: &DashboardConfig) -> Self {
        let mut state = Self::default();
        state.load_path(&config.data_path);
        state
    }

    /// Start a fresh session on `dashboard`, with filters reset.
    pub fn set_dashboard(&mut self, dashboard: Dashboard) {
        self.dashboard = Some(dashboard);
        self.selection = FilterSelection::all();
        self.load_error = None;
        self.refresh();
    }

    /// Load `path`, replacing the current session. On failure the previous
    /// session is dropped and only the error is kept.
    pub fn load_path(&mut self, path: &Path) {
        match Dashboard::open(path) {
            Ok(dashboard) => {
                self.status_message = Some(format!(
                    "Loaded {} rows from {}",
                    dashboard.dataset().len(),
                    path.display()
                ));
                self.set_dashboard(dashboard);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.dashboard = None;
                self.view = None;
                self.selection = FilterSelection::all();
                self.load_error = Some(format!("Error loading {}: {e}", path.display()));
                self.status_message = None;
            }
        }
    }

    /// Set one dropdown (`None` for its "All …" entry) and recompute if the
    /// selection changed.
    pub fn set_filter(&mut self, dimension: Dimension, value: Option<&str>) {
        let before = self.selection.clone();
        self.selection.constrain(dimension, value);
        if self.selection != before {
            self.refresh();
        }
    }

    /// Back to "All …" on every dropdown.
    pub fn reset_filters(&mut self) {
        if !self.selection.is_unconstrained() {
            self.selection = FilterSelection::all();
            self.refresh();
        }
    }

    /// Recompute `view` from the current selection.
    pub fn refresh(&mut self) {
        self.view = self
            .dashboard
            .as_ref()
            .map(|dashboard| dashboard.view(&self.selection));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alviridi_dashboard::{Dataset, Record};

    fn dashboard() -> Dashboard {
        let row = |country: &str, investment: f64| Record {
            company: "Acme".into(),
            country: country.into(),
            fund: "Fund I".into(),
            investment_musd: investment,
            ..Default::default()
        };
        Dashboard::new(Dataset::from_records(vec![row("Kenya", 4.0), row("India", 6.0)]))
    }

    #[test]
    fn changing_a_filter_recomputes_the_view() {
        let mut state = AppState::default();
        state.set_dashboard(dashboard());
        assert_eq!(state.view.as_ref().map(|v| v.metrics.rows), Some(2));

        state.set_filter(Dimension::Country, Some("Kenya"));
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.metrics.rows, 1);
        assert_eq!(view.metrics.investment_musd, 4.0);

        state.reset_filters();
        assert_eq!(state.view.as_ref().map(|v| v.metrics.rows), Some(2));
    }

    #[test]
    fn a_company_named_like_the_all_entry_can_be_selected() {
        let mut state = AppState::default();
        state.set_dashboard(Dashboard::new(Dataset::from_records(vec![
            Record {
                company: "All Companies".into(),
                investment_musd: 2.0,
                ..Default::default()
            },
            Record {
                company: "Acme".into(),
                investment_musd: 5.0,
                ..Default::default()
            },
        ])));

        state.set_filter(Dimension::Company, Some("All Companies"));
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.metrics.rows, 1);
        assert_eq!(view.metrics.investment_musd, 2.0);

        state.set_filter(Dimension::Company, None);
        assert_eq!(state.view.as_ref().map(|v| v.metrics.rows), Some(2));
    }

    #[test]
    fn failed_load_clears_the_session() {
        let mut state = AppState::default();
        state.set_dashboard(dashboard());

        state.load_path(Path::new("no/such/file.csv"));
        assert!(state.dashboard.is_none());
        assert!(state.view.is_none());
        assert!(state.load_error.is_some());
    }

    #[test]
    fn unsupported_extension_is_a_load_error() {
        let state = AppState::open(&DashboardConfig {
            data_path: "funds.xlsx".into(),
        });
        assert!(state.load_error.unwrap().contains("funds.xlsx"));
    }
}
