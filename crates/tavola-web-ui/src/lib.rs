mod auth;
pub mod cookies;
mod error;
mod layout;
mod routes;
mod serde_util;
pub mod session;

use std::future::Future;
use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr as _;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::{ACCEPT, CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use snafu::{ResultExt as _, Snafu};
use tavola_api::{ApiClient, ApiClientError};
use tavola_util_error::FmtCompact as _;
use tokio::net::{TcpListener, TcpSocket};
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tower_cookies::CookieManagerLayer;
use tower_http::CompressionLevel;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::SizeAbove;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

pub use crate::auth::{AuthError, AuthResult, login, signup};

pub const LOG_TARGET: &str = "tavola::web-ui";

fn default_assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

#[derive(Clone, Debug, bon::Builder)]
pub struct Opts {
    #[builder(into)]
    pub listen: String,
    /// Base URL of the backend REST API
    #[builder(into)]
    pub api_url: String,
    #[builder(default = tavola_api::DEFAULT_TIMEOUT)]
    pub api_timeout: Duration,
    #[builder(into)]
    pub cors_origin: Option<String>,
    #[builder(into)]
    assets_dir: Option<PathBuf>,
    #[builder(default)]
    pub reuseport: bool,
}

impl Opts {
    pub fn assets_dir(&self) -> PathBuf {
        self.assets_dir.clone().unwrap_or_else(default_assets_dir)
    }

    pub fn cors_origin(&self, listen: SocketAddr) -> Result<HeaderValue, CorsOriginError> {
        let origin = self
            .cors_origin
            .clone()
            .unwrap_or_else(|| format!("http://{listen}"));
        HeaderValue::from_str(&origin).context(CorsOriginSnafu { origin })
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("CORS origin {origin:?} is not a valid header value"))]
pub struct CorsOriginError {
    origin: String,
    source: InvalidHeaderValue,
}

pub struct UiState {
    pub(crate) api: ApiClient,
}

pub type SharedState = Arc<UiState>;

#[derive(Debug, Snafu)]
pub enum WebUiServerError {
    #[snafu(transparent)]
    IO { source: io::Error },
    ListenAddr { source: AddrParseError },
    ApiClient { source: ApiClientError },
    Cors { source: CorsOriginError },
    #[snafu(display("Assets directory {} does not exist", path.display()))]
    AssetsMissing { path: PathBuf },
    ServerTask { source: JoinError },
}

pub type ServerResult<T> = std::result::Result<T, WebUiServerError>;

pub struct Server {
    listener: TcpListener,
    state: SharedState,
    opts: Opts,
}

impl Server {
    pub async fn init(opts: Opts) -> ServerResult<Server> {
        let listener = Self::get_listener(&opts).await?;

        let assets_dir = opts.assets_dir();
        if !assets_dir.is_dir() {
            return AssetsMissingSnafu { path: assets_dir }.fail();
        }

        let api = ApiClient::new(&opts.api_url, opts.api_timeout).context(ApiClientSnafu)?;
        let state = Arc::new(UiState { api });

        info!(target: LOG_TARGET, addr = %listener.local_addr()?, api = %opts.api_url, "Listening");
        Ok(Self {
            listener,
            state,
            opts,
        })
    }

    pub async fn get_listener(opts: &Opts) -> ServerResult<TcpListener> {
        let socket = {
            let addr = SocketAddr::from_str(&opts.listen).context(ListenAddrSnafu)?;

            let socket = if addr.is_ipv4() {
                TcpSocket::new_v4()?
            } else {
                TcpSocket::new_v6()?
            };
            if opts.reuseport {
                #[cfg(unix)]
                socket.set_reuseport(true)?;
            }
            socket.set_nodelay(true)?;

            socket.bind(addr)?;

            socket
        };

        Ok(socket.listen(1024)?)
    }

    pub fn addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> ServerResult<()> {
        self.run_until(shutdown_signal()).await
    }

    pub async fn run_until<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listen = self.addr()?;
        let router = Router::new()
            .merge(routes::route_handler(self.state.clone()))
            .nest_service("/assets", ServeDir::new(self.opts.assets_dir()))
            .layer(middleware::from_fn(routes::cache_control));

        info!(target: LOG_TARGET, "Starting server");
        axum::serve(
            self.listener,
            router
                .layer(CookieManagerLayer::new())
                .layer(cors_layer(&self.opts, listen)?)
                .layer(compression_layer())
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        Ok(())
    }
}

/// A running server, as started by [`start_ui`].
pub struct UiServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<ServerResult<()>>,
}

impl UiServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) -> ServerResult<()> {
        // The server task may already be gone, its result tells why
        let _ = self.shutdown.send(());
        self.task.await.context(ServerTaskSnafu)?
    }
}

/// Bind and start serving in a background task.
pub async fn start_ui(opts: Opts) -> ServerResult<UiServer> {
    let server = Server::init(opts).await?;
    let addr = server.addr()?;
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(server.run_until(async move {
        let _ = shutdown_rx.await;
    }));

    Ok(UiServer {
        addr,
        shutdown,
        task,
    })
}

fn compression_layer() -> CompressionLayer<SizeAbove> {
    CompressionLayer::new()
        .quality(CompressionLevel::Precise(4))
        .compress_when(SizeAbove::new(512))
}

fn cors_layer(opts: &Opts, listen: SocketAddr) -> ServerResult<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400))
        .allow_origin(opts.cors_origin(listen).context(CorsSnafu)?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD]))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(target: LOG_TARGET, err = %err.fmt_compact(), "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target: LOG_TARGET, err = %err.fmt_compact(), "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(target: LOG_TARGET, "Shutting down");
}
