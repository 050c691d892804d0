//! # Score Submission Pipeline
//!
//! Owns every piece of shared state (sessions, used signatures, leaderboard)
//! and runs a submission through its gates in a fixed order:
//!
//! 1. signature data present
//! 2. signature not already used
//! 3. claim parses and is fresh
//! 4. claim is signed by the claimed address (signature is recorded here)
//! 5. hit count is a positive integer
//! 6. player address is well formed
//! 7. session exists and is consumed
//! 8. hit count is plausible for the session length
//! 9. receipt is signed and the score recorded
//!
//! The first failing gate ends the request.

use std::sync::Arc;
use std::time::Duration;

use types::{LeaderboardEntry, ScoreReceipt, SubmitRequest, WireText};

use crate::anticheat::AntiCheat;
use crate::clock::Clock;
use crate::config::ServiceConfig;
use crate::crypto::{RecoverableSignature, ScoreSigner, SignatureVerifier, is_address};
use crate::error::{Rejection, RejectionKind};
use crate::leaderboard::Leaderboard;
use crate::replay::ReplayGuard;
use crate::session::SessionStore;

/// Name recorded for sessions started without one.
pub const ANONYMOUS_PLAYER: &str = "Unknown";

pub struct ScoreService {
    sessions: Arc<SessionStore>,
    replay: ReplayGuard,
    anti_cheat: AntiCheat,
    verifier: SignatureVerifier,
    signer: ScoreSigner,
    leaderboard: Leaderboard,
    max_message_age: Duration,
    clock: Arc<dyn Clock>,
}

impl ScoreService {
    pub fn new(config: &ServiceConfig, signer: ScoreSigner, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.session_ttl, clock.clone())),
            replay: ReplayGuard::new(config.replay_capacity, config.replay_ttl, clock.clone()),
            anti_cheat: AntiCheat::new(config.anti_cheat),
            verifier: SignatureVerifier,
            signer,
            leaderboard: Leaderboard::new(
                config.leaderboard_size,
                config.leaderboard_cache_ttl,
                clock.clone(),
            ),
            max_message_age: config.max_message_age,
            clock,
        }
    }

    /// Starts a session and returns its id.
    pub fn start_session(&self, name: Option<String>) -> String {
        let name = name.unwrap_or_else(|| ANONYMOUS_PLAYER.to_string());
        let session_id = self.sessions.start(name.clone());
        tracing::info!(session_id = %session_id, player = %name, "Session started");
        session_id
    }

    /// Runs a submission through every gate; see the module docs for the order.
    pub fn submit(&self, request: &SubmitRequest) -> Result<ScoreReceipt, Rejection> {
        // Non-string ids read as empty and fail their own gates.
        let session_id = text_of(&request.session_id).unwrap_or_default();
        let player_address = text_of(&request.player_address).unwrap_or_default();

        self.evaluate(request, session_id, player_address)
            .inspect_err(|rejection| log_rejection(rejection, session_id, player_address))
    }

    fn evaluate(
        &self,
        request: &SubmitRequest,
        session_id: &str,
        player_address: &str,
    ) -> Result<ScoreReceipt, Rejection> {
        let (Some(message), Some(signature)) = (
            request.message.as_ref().filter(|m| m.is_present()),
            request.signature.as_ref().filter(|s| s.is_present()),
        ) else {
            return Err(Rejection::MissingSignatureData);
        };
        let signature = signature.as_str();

        // Unparseable signatures cannot have been recorded; they fail authenticity below.
        let parsed = signature.and_then(|sig| RecoverableSignature::parse(sig).ok());
        if let Some(sig) = &parsed
            && self.replay.is_seen(&sig.replay_key())
        {
            return Err(Rejection::Replay);
        }

        let message = message.as_str().ok_or(Rejection::InvalidMessageFormat)?;
        self.check_freshness(message)?;

        let authentic = match signature {
            Some(signature) => self.verifier.verify(player_address, message, signature),
            None => {
                tracing::warn!("Signature verification error: signature is not a string");
                false
            }
        };
        if !authentic {
            return Err(Rejection::InvalidSignature);
        }
        if let Some(sig) = &parsed
            && self.replay.seen_or_record(&sig.replay_key())
        {
            return Err(Rejection::Replay);
        }

        let hits = request
            .hits
            .as_ref()
            .and_then(|hits| hits.to_count())
            .ok_or(Rejection::InvalidHitsCount)?;
        let hits = u64::try_from(hits)
            .ok()
            .filter(|hits| *hits > 0)
            .ok_or(Rejection::NonPositiveHits)?;

        if !is_address(player_address) {
            return Err(Rejection::InvalidPlayerAddress);
        }

        let session = self.sessions.consume(session_id).map_err(|err| {
            tracing::debug!(error = %err, "Session lookup failed");
            Rejection::InvalidSession
        })?;

        let elapsed = self.clock.now().saturating_sub(session.started_at);
        if !self.anti_cheat.is_plausible(elapsed, hits) {
            tracing::debug!(
                hits,
                max_hits = self.anti_cheat.max_hits(elapsed),
                elapsed_ms = elapsed.as_millis() as u64,
                "Claimed hits exceed the plausible maximum"
            );
            return Err(Rejection::AntiCheat);
        }

        let score = hits;
        let timestamp = self.clock.unix_secs();
        let receipt_signature = self
            .signer
            .sign(score, player_address, timestamp)
            .map_err(|err| {
                tracing::error!(error = %err, "Failed to sign score receipt");
                Rejection::Internal
            })?;

        self.leaderboard.record(LeaderboardEntry {
            name: session.player_name.clone(),
            score,
        });
        self.leaderboard.invalidate();

        tracing::info!(
            session_id,
            player_address,
            player = %session.player_name,
            score,
            "Score accepted"
        );

        Ok(ScoreReceipt {
            score,
            timestamp,
            signature: receipt_signature,
            trusted: self.signer.trusted_identity(),
        })
    }

    /// The claim must be a JSON object whose integer `timestamp` is within
    /// `max_message_age` of the server clock, in either direction.
    fn check_freshness(&self, message: &str) -> Result<(), Rejection> {
        let claim: serde_json::Value =
            serde_json::from_str(message).map_err(|_| Rejection::InvalidMessageFormat)?;
        let timestamp = claim
            .get("timestamp")
            .and_then(serde_json::Value::as_i64)
            .ok_or(Rejection::InvalidMessageFormat)?;

        let skew = self.clock.unix_secs().abs_diff(timestamp);
        if skew > self.max_message_age.as_secs() {
            tracing::debug!(timestamp, skew, "Claim outside freshness window");
            return Err(Rejection::SignatureExpired);
        }
        Ok(())
    }

    /// Current top of the leaderboard, possibly served from the snapshot.
    pub fn leaders(&self) -> Arc<Vec<LeaderboardEntry>> {
        self.leaderboard.top()
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// EIP-55 address clients verify receipts against.
    pub fn trusted_identity(&self) -> String {
        self.signer.trusted_identity()
    }
}

fn text_of(field: &Option<WireText>) -> Option<&str> {
    field.as_ref().and_then(WireText::as_str)
}

fn log_rejection(rejection: &Rejection, session_id: &str, player_address: &str) {
    let kind = rejection.kind().as_str();
    match rejection.kind() {
        RejectionKind::AuthenticationFailure | RejectionKind::AntiCheat => tracing::warn!(
            session_id,
            player_address,
            kind,
            "Submit rejected: {}",
            rejection
        ),
        RejectionKind::Internal => tracing::error!(
            session_id,
            player_address,
            kind,
            "Submit failed: {}",
            rejection
        ),
        _ => tracing::info!(
            session_id,
            player_address,
            kind,
            "Submit rejected: {}",
            rejection
        ),
    }
}
