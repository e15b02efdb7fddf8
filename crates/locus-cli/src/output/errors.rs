//! Error message formatting with actionable suggestions.

use std::error::Error;

use locus_core::error::LocusError;

use super::colors::ColorSupport;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error with its suggestion and source chain
    pub fn format_error(&self, error: &LocusError) -> String {
        let mut output = self.format_simple(&error.to_string());
        output.push('\n');

        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        self.push_causes(&mut output, error.source());
        output
    }

    /// Format a boundary error, using the richer form when it wraps a [`LocusError`]
    pub fn format_anyhow(&self, error: &anyhow::Error) -> String {
        if let Some(locus) = error.chain().find_map(|cause| cause.downcast_ref::<LocusError>()) {
            let mut output = String::new();
            for context in error.chain().take_while(|cause| cause.downcast_ref::<LocusError>().is_none()) {
                output.push_str(&self.format_simple(&context.to_string()));
                output.push('\n');
            }
            output.push_str(&self.format_error(locus));
            return output;
        }

        let mut output = self.format_simple(&error.to_string());
        self.push_causes(&mut output, error.chain().nth(1));
        output
    }

    /// Format a simple error message
    pub fn format_simple(&self, message: &str) -> String {
        format!("{}: {}", self.colors.red("error"), message)
    }

    /// Format a warning message
    pub fn format_warning(&self, message: &str) -> String {
        format!("{}: {}", self.colors.yellow("warning"), message)
    }

    fn push_causes(&self, output: &mut String, mut source: Option<&(dyn Error + 'static)>) {
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            source = err.source();
        }
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn formatter() -> ErrorFormatter {
        ErrorFormatter::with_colors(ColorSupport::disabled())
    }

    #[test]
    fn test_suggestion_is_printed() {
        let error = LocusError::CircularExtends {
            chain: "a.json -> b.json -> a.json".to_string(),
        };
        let text = formatter().format_error(&error);
        assert!(text.starts_with("error: Circular extends chain detected"));
        assert!(text.contains("help: Remove the circular reference"));
    }

    #[test]
    fn test_anyhow_context_is_kept() {
        let result: Result<(), LocusError> = Err(LocusError::ConfigValidation {
            field: "installed-dir".to_string(),
            reason: "must not be empty".to_string(),
        });
        let error = result.context("Failed to load settings").unwrap_err();

        let text = formatter().format_anyhow(&error);
        assert!(text.starts_with("error: Failed to load settings\nerror: Configuration field 'installed-dir'"));
    }

    #[test]
    fn test_plain_anyhow_error() {
        let text = formatter().format_anyhow(&anyhow::anyhow!("no such project 'ghost'"));
        assert_eq!(text, "error: no such project 'ghost'");
        assert_eq!(formatter().format_warning("careful"), "warning: careful");
    }
}
