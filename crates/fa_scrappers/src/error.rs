use thiserror::Error;

/// A single HTTP GET that did not produce a usable body.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid article URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("invalid listing URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("listing unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("listing could not be opened in the browser: {0}")]
    Browser(#[from] DriverError),
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("browser script failed: {0}")]
    Script(String),

    #[error("browser session already closed")]
    Closed,
}

/// Fatal, setup-level failures of one collection run.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("browser session setup failed: {0}")]
    Browser(#[from] DriverError),

    #[error(transparent)]
    Walk(#[from] WalkError),
}
