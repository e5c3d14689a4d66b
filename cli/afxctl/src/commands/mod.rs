//! CLI commands.

mod auth;
mod get;
mod report;
mod slug;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{resolve_domain, Config, ServerType, DOMAIN_ENV};
use crate::output::OutputFormat;
use crate::session::{self, LoginMethod, Session, SessionSettings};

/// ArchFX Cloud CLI - inspect slugs, upload reports and query the API.
#[derive(Debug, Parser)]
#[command(name = "afx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Email used for login.
    #[arg(short = 'u', long = "user", global = true, env = "AFX_USER")]
    email: Option<String>,

    /// Server type.
    #[arg(long = "server", global = true, value_enum, default_value_t = ServerType::Prod)]
    server_type: ServerType,

    /// Customer slug: arch, stage, acme.
    #[arg(long, global = true, default_value = "arch")]
    customer: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and store the token for the customer.
    Login(auth::LoginArgs),

    /// Log out and forget the stored token.
    Logout,

    /// Show who you are logged in as.
    Whoami,

    /// Parse a slug and show its canonical form and parts.
    Slug(slug::SlugArgs),

    /// Upload a msgpack report file.
    Upload(report::UploadArgs),

    /// Decode a msgpack report file.
    Inspect(report::InspectArgs),

    /// GET an API path and print the response.
    Get(get::GetArgs),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let domain_override = std::env::var(DOMAIN_ENV).ok();
        let domain = resolve_domain(self.server_type, &self.customer, domain_override.as_deref());

        let ctx = CommandContext {
            format: self.format,
            settings: SessionSettings {
                domain,
                customer: self.customer,
                email: self.email,
                password: None,
            },
        };

        match self.command {
            Commands::Login(args) => auth::login(ctx, args).await,
            Commands::Logout => auth::logout(ctx).await,
            Commands::Whoami => auth::whoami(ctx).await,
            Commands::Slug(args) => slug::run(ctx, args),
            Commands::Upload(args) => report::upload(ctx, args).await,
            Commands::Inspect(args) => report::inspect(ctx, args),
            Commands::Get(args) => get::run(ctx, args).await,
            Commands::Version => {
                println!("afx {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub format: OutputFormat,
    pub settings: SessionSettings,
}

impl CommandContext {
    /// Connects to the server, reusing and updating stored tokens.
    pub async fn session(&self) -> Result<Session> {
        let mut config = Config::load()?;
        let session =
            session::connect(&self.settings, config.customer(&self.settings.customer)).await?;

        if session.method == LoginMethod::Refreshed {
            config.set_customer(&self.settings.customer, session.stored_section());
            config.save()?;
        }

        Ok(session)
    }

    /// Ends a session opened for one command.
    ///
    /// Password logins are logged out again; stored tokens stay valid.
    pub async fn finish(&self, mut session: Session) -> Result<()> {
        if session.method == LoginMethod::Password {
            session.api.logout().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "afx", "--user", "a@b.c", "--server", "dev", "--customer", "acme", "whoami",
        ])
        .unwrap();
        assert_eq!(cli.email.as_deref(), Some("a@b.c"));
        assert_eq!(cli.server_type, ServerType::Dev);
        assert_eq!(cli.customer, "acme");
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["afx", "slug", "d--0001"]).unwrap();
        assert_eq!(cli.server_type, ServerType::Prod);
        assert_eq!(cli.customer, "arch");
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn test_unknown_server_type_is_rejected() {
        assert!(Cli::try_parse_from(["afx", "--server", "stage", "whoami"]).is_err());
    }

    #[test]
    fn test_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["afx", "get", "org", "-u", "a@b.c", "--format", "json"])
            .unwrap();
        assert_eq!(cli.email.as_deref(), Some("a@b.c"));
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
