use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "tssconv";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info")
}

/// Where converted documents and per-stage artifacts land by default.
pub fn default_output_dir() -> PathBuf {
    PathBuf::from("data").join("output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_scoped_to_crate() {
        assert_eq!(default_log_filter(), "tssconv=info");
    }

    #[test]
    fn output_dir_is_relative() {
        assert!(default_output_dir().is_relative());
        assert!(default_output_dir().ends_with("output"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
