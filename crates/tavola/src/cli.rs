use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// Command line options for the Tavola web client
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    #[command(subcommand)]
    pub cmd: OptsCmd,
}

#[derive(Debug, Subcommand)]
pub enum OptsCmd {
    /// Serve the web UI
    WebUi(WebUiOpts),

    /// Development and debugging commands
    #[command(subcommand)]
    Dev(DevCmd),
}

#[derive(Debug, Args)]
pub struct WebUiOpts {
    /// Listen address
    #[arg(long, short, default_value = "127.0.0.1:3000", env = "TAVOLA_LISTEN")]
    pub listen: String,

    /// Base URL of the backend REST API
    #[arg(long, env = "TAVOLA_API_URL")]
    pub api_url: String,

    /// Default timeout of backend calls, in milliseconds
    #[arg(long, default_value = "10000", env = "TAVOLA_API_TIMEOUT_MS")]
    pub api_timeout_ms: u64,

    /// Set SO_REUSEPORT
    #[arg(long, env = "TAVOLA_REUSEPORT")]
    pub reuseport: bool,

    /// Cors origin settings
    #[arg(long, env = "TAVOLA_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Root directory of the assets dir
    #[arg(long, env = "TAVOLA_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,
}

impl WebUiOpts {
    pub fn to_web_opts(&self) -> tavola_web_ui::Opts {
        tavola_web_ui::Opts::builder()
            .listen(self.listen.clone())
            .api_url(self.api_url.clone())
            .api_timeout(Duration::from_millis(self.api_timeout_ms))
            .maybe_cors_origin(self.cors_origin.clone())
            .maybe_assets_dir(self.assets_dir.clone())
            .reuseport(self.reuseport)
            .build()
    }
}

#[derive(Debug, Subcommand)]
pub enum DevCmd {
    /// Decode a session token and print the identity it carries
    DecodeToken {
        /// The token, as stored in the `token` cookie
        token: String,
    },
}
