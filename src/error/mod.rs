//! Error types and handling for Instrumentor
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Every error that reaches `main` is fatal: the installer propagates it out of
//! the run and the top-level handler prints it and exits. Recoverable conditions
//! never become an `InstallError` that leaves the orchestrator; they are logged
//! where they happen.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Instrumentor operations
#[derive(Error, Diagnostic, Debug)]
pub enum InstallError {
    // Discovery errors
    #[error("Could not install. There was an error discovering system info: {reason}")]
    #[diagnostic(code(instrumentor::discovery::failed))]
    DiscoveryFailed { reason: String },

    // Recipe source errors
    #[error("Could not load file {path}: {reason}")]
    #[diagnostic(
        code(instrumentor::recipe::load_failed),
        help("Check that the recipe file exists and is valid YAML")
    )]
    RecipeLoadFailed { path: String, reason: String },

    #[error("Could not fetch file {path}: {reason}")]
    #[diagnostic(
        code(instrumentor::recipe::fetch_failed),
        help("Check that the URL is correct and reachable")
    )]
    RecipeFetchFailed { path: String, reason: String },

    #[error("Could not finalize recipe {name}: {reason}")]
    #[diagnostic(code(instrumentor::recipe::invalid))]
    RecipeInvalid { name: String, reason: String },

    #[error("Could not install {name}. Error retrieving recipe: {reason}")]
    #[diagnostic(code(instrumentor::recipe::retrieval_failed))]
    RecipeRetrievalFailed { name: String, reason: String },

    #[error("Recipe {name} not found.")]
    #[diagnostic(
        code(instrumentor::recipe::not_found),
        help("Check that the recipe catalog contains a recipe with this name")
    )]
    RecipeNotFound { name: String },

    #[error("Could not install. Error retrieving recipe recommendations: {reason}")]
    #[diagnostic(code(instrumentor::recipe::recommendations_failed))]
    RecommendationsFailed { reason: String },

    #[error("Recipe catalog not available at {path}: {reason}")]
    #[diagnostic(
        code(instrumentor::catalog::unavailable),
        help("Point --catalog (or INSTRUMENTOR_CATALOG) at a directory of recipe files")
    )]
    CatalogUnavailable { path: String, reason: String },

    // Install errors
    #[error("Could not find log files to watch: {reason}")]
    #[diagnostic(code(instrumentor::logs::filter_failed))]
    LogFilterFailed { reason: String },

    #[error("Could not install {name}: {reason}")]
    #[diagnostic(code(instrumentor::install::failed))]
    InstallFailed { name: String, reason: String },

    #[error("Could not detect data from {name}.")]
    #[diagnostic(
        code(instrumentor::install::no_data),
        help("The recipe ran, but no data arrived before validation gave up")
    )]
    NoDataDetected { name: String },

    #[error("Step '{step}' failed: {reason}")]
    #[diagnostic(code(instrumentor::execution::step_failed))]
    ExecutionFailed { step: String, reason: String },

    #[error("Validation query failed: {message}")]
    #[diagnostic(code(instrumentor::validation::failed))]
    ValidationFailed { message: String },

    // Configuration errors
    #[error("Invalid profile configuration: {message}")]
    #[diagnostic(
        code(instrumentor::config::profile_invalid),
        help("Profiles are read from profiles.yaml in the configuration directory")
    )]
    ProfileInvalid { message: String },

    #[error("Failed to parse configuration: {path}: {reason}")]
    #[diagnostic(code(instrumentor::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // Status errors
    #[error("Failed to write install status to {path}: {reason}")]
    #[diagnostic(code(instrumentor::status::write_failed))]
    StatusWriteFailed { path: String, reason: String },

    // Transport errors
    #[error("HTTP request failed: {message}")]
    #[diagnostic(code(instrumentor::http::failed))]
    Http { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(instrumentor::fs::io_error))]
    IoError { message: String },

    // Command errors
    #[error("Unknown shell: {shell}")]
    #[diagnostic(
        code(instrumentor::cli::unknown_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnsupportedShell { shell: String },

    #[error("Operation cancelled")]
    #[diagnostic(code(instrumentor::cancelled))]
    Cancelled,
}

impl InstallError {
    /// Process exit status for this error when it terminates the run
    pub fn exit_code(&self) -> i32 {
        if self.is_cancellation() { 130 } else { 1 }
    }

    /// Whether this error stems from an interrupt rather than a real failure
    ///
    /// Wrapping variants only keep the cause as text, so cancellation is recognised
    /// by the cancelled message as well as by the bare variant.
    pub fn is_cancellation(&self) -> bool {
        const CANCELLED: &str = "Operation cancelled";
        match self {
            InstallError::Cancelled => true,
            InstallError::DiscoveryFailed { reason }
            | InstallError::RecommendationsFailed { reason }
            | InstallError::RecipeRetrievalFailed { reason, .. }
            | InstallError::InstallFailed { reason, .. }
            | InstallError::LogFilterFailed { reason } => reason.ends_with(CANCELLED),
            _ => false,
        }
    }
}

impl From<std::io::Error> for InstallError {
    fn from(err: std::io::Error) -> Self {
        InstallError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for InstallError {
    fn from(err: serde_yaml::Error) -> Self {
        InstallError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for InstallError {
    fn from(err: serde_json::Error) -> Self {
        InstallError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for InstallError {
    fn from(err: reqwest::Error) -> Self {
        InstallError::Http {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for InstallError {
    fn from(err: inquire::InquireError) -> Self {
        InstallError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for InstallError {
    fn from(err: url::ParseError) -> Self {
        InstallError::Http {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for InstallError {
    fn from(err: regex::Error) -> Self {
        InstallError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, InstallError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_error_display() {
        let err = InstallError::RecipeNotFound {
            name: "Logs integration".to_string(),
        };
        assert_eq!(err.to_string(), "Recipe Logs integration not found.");
    }

    #[test]
    fn test_error_code() {
        let err = InstallError::NoDataDetected {
            name: "nginx".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("instrumentor::install::no_data".to_string())
        );
    }

    test_error_contains!(
        test_discovery_failed_error,
        InstallError::DiscoveryFailed {
            reason: "no hostname".to_string()
        },
        "error discovering system info",
        "no hostname"
    );

    test_error_contains!(
        test_recipe_load_failed_error,
        InstallError::RecipeLoadFailed {
            path: "./nginx.yml".to_string(),
            reason: "missing".to_string()
        },
        "Could not load file ./nginx.yml",
        "missing"
    );

    test_error_contains!(
        test_recipe_invalid_error,
        InstallError::RecipeInvalid {
            name: "nginx".to_string(),
            reason: "empty step".to_string()
        },
        "Could not finalize recipe nginx"
    );

    test_error_contains!(
        test_install_failed_error,
        InstallError::InstallFailed {
            name: "mysql".to_string(),
            reason: "boom".to_string()
        },
        "Could not install mysql: boom"
    );

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: InstallError = io_err.into();
        assert!(matches!(err, InstallError::IoError { .. }));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str("invalid: yaml: content: [unclosed");
        let err: InstallError = parse_result.unwrap_err().into();
        assert!(matches!(err, InstallError::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_exit_code_for_cancellation() {
        assert_eq!(InstallError::Cancelled.exit_code(), 130);
        let wrapped = InstallError::InstallFailed {
            name: "nginx".to_string(),
            reason: "encountered an error while executing nginx: Operation cancelled"
                .to_string(),
        };
        assert_eq!(wrapped.exit_code(), 130);
    }

    #[test]
    fn test_exit_code_for_failures() {
        let err = InstallError::RecipeNotFound {
            name: "nginx".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
    }
}
