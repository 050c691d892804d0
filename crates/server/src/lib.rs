//! Signed score submission server.
//!
//! Players start a session, play, then submit a wallet-signed hit count. The
//! server checks the claim against replay, freshness, authenticity and a
//! time-based plausibility bound before signing a score receipt and ranking it.
//!
//! [`ScoreService`] is the submission pipeline; [`api::router`] exposes it over HTTP.

pub mod anticheat;
pub mod api;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod leaderboard;
pub mod logging;
pub mod rate_limit;
pub mod replay;
pub mod service;
pub mod session;

pub use api::{AppState, router};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ServerConfig, ServiceConfig};
pub use error::{Rejection, RejectionKind};
pub use service::ScoreService;
