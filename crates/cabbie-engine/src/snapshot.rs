//! Serializable game state with a BLAKE3 content hash.
//!
//! A [`GameSnapshot`] captures every entity, the trip state, the cash total
//! and the tick counter. Its `hash` is the BLAKE3 hex digest of that data
//! serialized as JSON, so two runs that reach the same state produce the same
//! hash. Determinism tests compare hashes instead of walking whole worlds.
//!
//! # What Is NOT Serialized
//!
//! - **The random generator.** Two games with equal snapshots but different
//!   seeds will pick different destinations from then on.
//! - **Camera, status line and diagnostics.** They are derived each frame.

use crate::passenger::TripState;
use crate::tick::TickLoop;
use crate::world::Entity;

// ---------------------------------------------------------------------------
// SnapshotError
// ---------------------------------------------------------------------------

/// Errors raised when checking or parsing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The stored hash does not match the stored state.
    #[error("snapshot hash mismatch: recorded {recorded} but recomputed {recomputed}")]
    HashMismatch { recorded: String, recomputed: String },
    /// The text could not be parsed as a snapshot.
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// GameSnapshot
// ---------------------------------------------------------------------------

/// The full simulation state at the end of a tick.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GameSnapshot {
    /// Ticks run so far.
    pub tick_counter: u64,
    /// Every entity in registration order.
    pub entities: Vec<Entity>,
    /// The passenger trip, if any.
    pub trip: TripState,
    /// Cash earned so far.
    pub cash: i64,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the fields above.
    pub hash: String,
}

fn compute_hash(tick_counter: u64, entities: &[Entity], trip: &TripState, cash: i64) -> String {
    #[derive(serde::Serialize)]
    struct HashableState<'a> {
        tick_counter: u64,
        entities: &'a [Entity],
        trip: &'a TripState,
        cash: i64,
    }

    let json_bytes = serde_json::to_vec(&HashableState {
        tick_counter,
        entities,
        trip,
        cash,
    })
    .expect("game state should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

impl GameSnapshot {
    /// Recompute the hash and compare it with the recorded one.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        let recomputed = compute_hash(self.tick_counter, &self.entities, &self.trip, self.cash);
        if recomputed != self.hash {
            return Err(SnapshotError::HashMismatch {
                recorded: self.hash.clone(),
                recomputed,
            });
        }
        Ok(())
    }

    /// Pretty-printed JSON, hash included.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot and check its hash.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: GameSnapshot = serde_json::from_str(json)?;
        snapshot.verify()?;
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// TickLoop snapshot methods
// ---------------------------------------------------------------------------

impl TickLoop {
    /// Copy the current state and hash it.
    pub fn capture_snapshot(&self) -> GameSnapshot {
        let game = self.game();
        let entities: Vec<Entity> = game.world().iter().cloned().collect();
        let trip = game.trip_state().clone();
        let cash = game.cash();
        let tick_counter = self.tick_count();
        let hash = compute_hash(tick_counter, &entities, &trip, cash);
        GameSnapshot {
            tick_counter,
            entities,
            trip,
            cash,
            hash,
        }
    }

    /// Shorthand for `capture_snapshot().hash`.
    pub fn state_hash(&self) -> String {
        self.capture_snapshot().hash
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
