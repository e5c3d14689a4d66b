//! Error handling and display for the CLI.

use archfx_api::ApiError;
use archfx_reports::ReportError;
use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("User email is required: --user")]
    EmailRequired,

    #[error("Login failed for {0}")]
    LoginFailed(String),

    #[error("Invalid query parameter '{0}', expected key=value")]
    InvalidQuery(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let api_err = err.downcast_ref::<ApiError>().or_else(|| match err.downcast_ref::<CliError>() {
        Some(CliError::Api(api_err)) => Some(api_err),
        Some(CliError::Report(ReportError::Api(api_err))) => Some(api_err),
        _ => None,
    });

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::EmailRequired => {
                eprintln!(
                    "\n{}",
                    "Hint: Run `afx --user <email> login` to authenticate.".yellow()
                );
            }
            CliError::LoginFailed(_) => {
                eprintln!(
                    "\n{}",
                    "Hint: Check the email, password and --customer.".yellow()
                );
            }
            _ => {}
        }
    }

    match api_err {
        Some(ApiError::Client { status: 401, .. }) => {
            eprintln!(
                "\n{}",
                "Hint: Your session may have expired. Run `afx login`.".yellow()
            );
        }
        Some(ApiError::Client { status: 403, .. }) => {
            eprintln!(
                "\n{}",
                "Hint: You may not have permission for this operation.".yellow()
            );
        }
        Some(ApiError::CouldNotVerifyServer(_)) => {
            eprintln!(
                "\n{}",
                "Hint: The server certificate was rejected. Check --server and --customer.".yellow()
            );
        }
        Some(ApiError::Network(_)) => {
            eprintln!(
                "\n{}",
                "Hint: Check your network connection and server domain.".yellow()
            );
        }
        _ => {}
    }
}
