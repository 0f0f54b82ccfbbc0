//! CLI command implementations.
//!
//! Thin dispatch from parsed arguments onto the request facade.

use crate::cli::parser::{Cli, Commands};
use crate::error::{BundleError, Error, QueryError, RenderError, Result, StoreError};
use crate::facade::WwdcClient;
use crate::render::RenderFormat;

/// Executes the CLI command and returns the output to print.
///
/// # Errors
///
/// Propagates the facade's typed errors; `main` maps them to exit codes.
pub fn execute(cli: &Cli) -> Result<String> {
    let mut client = WwdcClient::new();
    if let Some(bundle) = &cli.bundle {
        client = client.with_bundle_path(bundle.clone());
    }

    match &cli.command {
        Commands::Wwdc {
            query,
            verbosity,
            format,
            limit,
            offset,
        } => client.search(query, (*verbosity).into(), (*format).into(), *limit, *offset),

        Commands::Session { id, mode, format } => {
            match client.get_session(id, (*mode).into(), (*format).into())? {
                Some(output) => Ok(output),
                // Not-found is a successful outcome, exit code 0.
                None => Ok(format!("Session not found: {id}\n")),
            }
        }

        Commands::Year {
            year,
            mode,
            format,
            limit,
        } => client.list_year(*year, (*mode).into(), (*format).into(), *limit),

        Commands::Stats { format } => client.statistics((*format).into()),
    }
}

/// Formats an error for output.
///
/// JSON format yields a structured object suitable for programmatic
/// handling; Markdown yields the plain message.
#[must_use]
pub fn format_error(error: &Error, format: RenderFormat) -> String {
    match format {
        RenderFormat::Markdown => error.to_string(),
        RenderFormat::Json => {
            let json = serde_json::json!({
                "success": false,
                "error": {
                    "type": error_type(error),
                    "message": error.to_string(),
                    "exitCode": error.exit_code(),
                }
            });
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Stable error type names for the JSON error object.
const fn error_type(error: &Error) -> &'static str {
    match error {
        Error::Bundle(e) => match e {
            BundleError::Missing { .. } => "BundleMissing",
            BundleError::KeyAbsent => "KeyAbsent",
            BundleError::KeyInvalid { .. } => "KeyInvalid",
            BundleError::DecryptionFailed { .. } => "DecryptionFailed",
            BundleError::DecompressionFailed => "DecompressionFailed",
            BundleError::IntegrityFailure => "IntegrityFailure",
            BundleError::WorkingDir { .. } => "WorkingDirFailed",
        },
        Error::Store(e) => match e {
            StoreError::OpenFailed { .. } => "DatabaseOpenFailed",
            StoreError::ExecutionFailed { .. } => "QueryExecutionFailed",
        },
        Error::Query(QueryError::Validation { .. }) => "QueryValidation",
        Error::Render(e) => match e {
            RenderError::MissingAttribution | RenderError::Json(_) => "RenderFailure",
        },
        Error::Cancelled => "Cancelled",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_format_error_markdown() {
        let err: Error = BundleError::KeyAbsent.into();
        let out = format_error(&err, RenderFormat::Markdown);
        assert!(out.contains("SOSUMI_ENCRYPTION_KEY"));
    }

    #[test]
    fn test_format_error_json_is_structured() {
        let err: Error = BundleError::Missing { searched: vec![] }.into();
        let out = format_error(&err, RenderFormat::Json);
        let doc: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        assert_eq!(doc["success"], false);
        assert_eq!(doc["error"]["type"], "BundleMissing");
        assert_eq!(doc["error"]["exitCode"], 5);
    }

    #[test]
    fn test_error_type_names() {
        let validation: Error = QueryError::Validation {
            field: "query",
            reason: "empty".to_string(),
        }
        .into();
        assert_eq!(error_type(&validation), "QueryValidation");

        let open: Error = StoreError::OpenFailed {
            detail: "not a database".to_string(),
        }
        .into();
        assert_eq!(error_type(&open), "DatabaseOpenFailed");

        let render: Error = RenderError::MissingAttribution.into();
        assert_eq!(error_type(&render), "RenderFailure");
    }
}
