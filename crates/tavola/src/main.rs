mod cli;

use std::io;

use clap::Parser;
use cli::{DevCmd, Opts, OptsCmd};
use snafu::{FromString as _, ResultExt as _, Snafu, Whatever};
use tavola_core::token::{TokenDecodeError, TokenPayload};
use tavola_util_error::WhateverResult;
use tavola_web_ui::{Server, WebUiServerError};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_TARGET: &str = "tavola::cli";

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("WebUI Server error: {source}"))]
    WebUiServer { source: WebUiServerError },
    #[snafu(display("Token error: {source}"))]
    Token { source: TokenDecodeError },
    #[snafu(display("Output error: {source}"))]
    Output { source: serde_json::Error },
    #[snafu(display("Miscellaneous error: {source}"))]
    Whatever { source: Whatever },
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[snafu::report]
#[tokio::main]
async fn main() -> CliResult<()> {
    init_logging().context(WhateverSnafu)?;

    let opts = Opts::parse();
    let out = handle_cmd(opts).await?;
    if !out.is_null() {
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context(OutputSnafu)?
        );
    }
    Ok(())
}

async fn handle_cmd(opts: Opts) -> CliResult<serde_json::Value> {
    Ok(match opts.cmd {
        OptsCmd::WebUi(ref web_opts) => {
            let server = Server::init(web_opts.to_web_opts())
                .await
                .context(WebUiServerSnafu)?;

            info!(
                target: LOG_TARGET,
                url = %format!("http://{}", server.addr().context(WebUiServerSnafu)?),
                "Web UI ready"
            );
            server.run().await.context(WebUiServerSnafu)?;

            serde_json::Value::Null
        }
        OptsCmd::Dev(DevCmd::DecodeToken { token }) => {
            let payload = TokenPayload::decode(&token).context(TokenSnafu)?;
            let user = payload.session_user().context(TokenSnafu)?;

            serde_json::json!({
                "email": user.email,
                "role": user.role,
                "expiresAt": payload.expires_at().map(|at| at.unix_timestamp()),
            })
        }
    })
}

pub fn init_logging() -> WhateverResult<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|_| Whatever::without_source("Failed to initialize logging".to_string()))?;

    Ok(())
}
