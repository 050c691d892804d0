//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod clean;
mod keygen;
mod sign_submission;
mod tail_logs;

pub use clean::Clean;
pub use keygen::Keygen;
pub use sign_submission::SignSubmission;
pub use tail_logs::TailLogs;
