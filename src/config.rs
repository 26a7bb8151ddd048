use std::path::PathBuf;

/// File loaded when no path is given on the command line.
pub const DEFAULT_DATA_FILE: &str = "dummy_sample.csv";

/// Startup settings for the dashboard binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl DashboardConfig {
    /// Build from process arguments (program name already skipped):
    /// `[DATA_FILE]`. Extra arguments are ignored with a warning.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let config = match args.next() {
            Some(path) if !path.is_empty() => Self {
                data_path: PathBuf::from(path),
            },
            _ => Self::default(),
        };
        let extra: Vec<String> = args.collect();
        if !extra.is_empty() {
            log::warn!("Ignoring extra arguments: {extra:?}");
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_sample_file() {
        assert_eq!(
            DashboardConfig::from_args(Vec::new()).data_path,
            PathBuf::from(DEFAULT_DATA_FILE)
        );
    }

    #[test]
    fn first_argument_is_the_data_file() {
        let cfg = DashboardConfig::from_args(vec!["funds.parquet".to_string(), "x".to_string()]);
        assert_eq!(cfg.data_path, PathBuf::from("funds.parquet"));
    }
}
