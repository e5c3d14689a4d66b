//! Raw API queries.

use anyhow::Result;
use clap::Args;

use crate::error::CliError;
use crate::output::print_single;

use super::CommandContext;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Path under /api/v1, e.g. `org` or `device/d--0000-0000-0000-0001`.
    path: String,

    /// Query parameter as key=value (repeatable).
    #[arg(short, long = "query")]
    query: Vec<String>,
}

fn parse_query(raw: &str) -> Result<(&str, &str), CliError> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| CliError::InvalidQuery(raw.to_string()))
}

pub async fn run(ctx: CommandContext, args: GetArgs) -> Result<()> {
    let query = args
        .query
        .iter()
        .map(|raw| parse_query(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let session = ctx.session().await?;
    let resource = query
        .into_iter()
        .fold(session.api.resource(&args.path), |resource, (key, value)| {
            resource.query(key, value)
        });

    let response = resource.get().await.map_err(CliError::from)?;
    print_single(&response);

    ctx.finish(session).await
}
