//! Error handling for the FoldRec CLI

use thiserror::Error;
use std::path::PathBuf;

/// Main error type for FoldRec CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid range '{input}': {message}")]
    Range { input: String, message: String },

    #[error("Invalid {what} '{input}': expected two comma-separated numbers")]
    Pair { what: String, input: String },

    #[error("Rendering error: {message}")]
    Rendering { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn range<S: Into<String>, M: Into<String>>(input: S, message: M) -> Self {
        Self::Range {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn pair<S: Into<String>>(what: S, input: S) -> Self {
        Self::Pair {
            what: what.into(),
            input: input.into(),
        }
    }

    pub fn rendering<S: Into<String>>(message: S) -> Self {
        Self::Rendering { message: message.into() }
    }
}

impl From<foldrec_render::RenderError> for CliError {
    fn from(err: foldrec_render::RenderError) -> Self {
        Self::rendering(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Record files may be JSON, CSV or TSV, optionally gzip-compressed (.gz)",
                path.display()
            ));
        }

        CliError::Range { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Ranges look like '1000000-1500000', '1M-1.5M' or 'chr1:1M-1.5M'\n\
                 • The start must be smaller than the end"
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your foldrec.toml configuration file\n\
                 • Use 'foldrec config' to print a sample configuration"
            );
        }

        CliError::Rendering { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Increase --width/--height (or --size for triangles)"
            );
        }

        CliError::Pair { .. } => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("chr1.csv"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_range_message() {
        let err = CliError::range("2M-1M", "start must be less than end");
        assert_eq!(err.to_string(), "Invalid range '2M-1M': start must be less than end");
        assert!(format_error_with_suggestions(&err).contains("1M-1.5M"));
    }

    #[test]
    fn test_render_error_conversion() {
        let err: CliError = foldrec_render::RenderError::EmptyGeometry { width: 0.0, height: 0.0 }.into();
        assert!(matches!(err, CliError::Rendering { .. }));
    }
}
