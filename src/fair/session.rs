//! Fair Session
//!
//! The issuer's side of one seed pair:
//!
//! ```text
//!   new(server seed, client seed) ──► publish commitment
//!            │
//!            ▼
//!   next_outcome(spec)  nonce 0, 1, 2, …  (each round recorded)
//!            │
//!            ▼
//!   reveal() ──► SessionReveal { seed, rounds } ──► audit(commitment)
//! ```
//!
//! Nothing in a session is mutated after creation except the round log and
//! the nonce cursor. Changing seeds means starting a new session.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::commitment::Commitment;
use super::deriver::{derive_outcome, Derivation, DerivedDigest};
use super::error::FairResult;
use super::outcome::{Outcome, OutcomeSpec};
use super::seed::{ClientSeed, Nonce, ServerSeed};
use super::verify::{audit_rounds, AuditReport};

/// One derived round as shown to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Nonce used.
    pub nonce: Nonce,
    /// Mapping applied.
    pub spec: OutcomeSpec,
    /// Digest shown.
    pub digest: DerivedDigest,
    /// Outcome shown.
    pub outcome: Outcome,
}

impl From<Derivation> for RoundRecord {
    fn from(d: Derivation) -> Self {
        Self {
            nonce: d.nonce,
            spec: d.spec,
            digest: d.digest,
            outcome: d.outcome,
        }
    }
}

/// Session encoding errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Binary encoding failed.
    #[error("binary encoding error: {0}")]
    Binary(#[from] bincode::Error),

    /// JSON encoding failed.
    #[error("json encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An active session. Holds the secret until [`FairSession::reveal`].
#[derive(Debug)]
pub struct FairSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    server_seed: ServerSeed,
    client_seed: ClientSeed,
    commitment: Commitment,
    next_nonce: Nonce,
    rounds: Vec<RoundRecord>,
}

impl FairSession {
    /// Start a session. The commitment is computed immediately.
    pub fn new(server_seed: ServerSeed, client_seed: ClientSeed) -> Self {
        let commitment = Commitment::new(&server_seed);
        let id = Uuid::new_v4();
        info!(session = %id, commitment = %commitment, client_seed = %client_seed, "session opened");
        Self {
            id,
            created_at: Utc::now(),
            server_seed,
            client_seed,
            commitment,
            next_nonce: Nonce::ZERO,
            rounds: Vec::new(),
        }
    }

    /// Start a session with a freshly generated server seed.
    pub fn generate(client_seed: ClientSeed) -> Self {
        Self::new(ServerSeed::generate(), client_seed)
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the session was opened.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Commitment to publish before play.
    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    /// The receiver's seed.
    pub fn client_seed(&self) -> &ClientSeed {
        &self.client_seed
    }

    /// Nonce the next round will use.
    pub fn next_nonce(&self) -> Nonce {
        self.next_nonce
    }

    /// Rounds played so far.
    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    /// Derive the next round and advance the nonce by one.
    ///
    /// On error (invalid spec) the nonce is not consumed.
    pub fn next_outcome(&mut self, spec: &OutcomeSpec) -> FairResult<Derivation> {
        let derivation = derive_outcome(&self.server_seed, &self.client_seed, self.next_nonce, spec)?;
        self.rounds.push(RoundRecord::from(derivation.clone()));
        self.next_nonce = self.next_nonce.next();
        Ok(derivation)
    }

    /// End the session and disclose the server seed.
    pub fn reveal(self) -> SessionReveal {
        info!(session = %self.id, rounds = self.rounds.len(), "session revealed");
        SessionReveal {
            session_id: self.id,
            created_at: self.created_at,
            revealed_at: Utc::now(),
            server_seed: self.server_seed,
            client_seed: self.client_seed,
            commitment: self.commitment,
            rounds: self.rounds,
        }
    }

    /// Reveal this session and open a new one with `next_seed`, keeping the
    /// client seed.
    pub fn rotate(self, next_seed: ServerSeed) -> (SessionReveal, FairSession) {
        let client_seed = self.client_seed.clone();
        let reveal = self.reveal();
        (reveal, FairSession::new(next_seed, client_seed))
    }
}

/// Everything needed to audit a finished session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReveal {
    /// Session identifier.
    pub session_id: Uuid,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
    /// When the seed was disclosed.
    pub revealed_at: DateTime<Utc>,
    /// The disclosed secret.
    pub server_seed: ServerSeed,
    /// The receiver's seed.
    pub client_seed: ClientSeed,
    /// Commitment the issuer claims to have published.
    pub commitment: Commitment,
    /// Rounds in play order.
    pub rounds: Vec<RoundRecord>,
}

impl SessionReveal {
    /// Audit against the commitment the player actually saw.
    pub fn audit(&self, published: &Commitment) -> AuditReport {
        audit_rounds(published, &self.server_seed, &self.client_seed, Nonce::ZERO, &self.rounds)
    }

    /// Audit against the commitment carried in the reveal itself.
    pub fn self_audit(&self) -> AuditReport {
        self.audit(&self.commitment)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(text: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to compact bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SessionError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from bincode bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SessionError> {
        Ok(bincode::deserialize(data)?)
    }
}
