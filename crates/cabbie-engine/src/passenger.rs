//! Passenger trips.
//!
//! ```text
//!            pick up a man
//!   Idle ─────────────────────▶ HasPassenger(trip)
//!    ▲                               │
//!    │   reach the target (Delivered) │
//!    └───────────────────────────────┤
//!    │   countdown hits zero (Expired)│
//!    └───────────────────────────────┘
//! ```
//!
//! The [`Dispatcher`] only tracks the trip itself. Spawning and removing the
//! target entity is up to the caller, which gets the ids it needs from the
//! returned [`Trip`].

use cabbie_physics::math::{lerp, Vec2};
use rand::Rng;

use crate::config::TargetConfig;
use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// Fares and destinations
// ---------------------------------------------------------------------------

/// Fare for a trip from `pickup` to `dropoff`.
///
/// Linear in Manhattan distance between the configured thresholds, not
/// clamped outside them, truncated towards zero.
pub fn cash_value_from_distance(pickup: Vec2, dropoff: Vec2, config: &TargetConfig) -> i64 {
    let distance = (dropoff.x - pickup.x).abs() + (dropoff.y - pickup.y).abs();
    let span = config.max_threshold - config.min_threshold;
    if span <= 0.0 {
        return config.min_cash as i64;
    }
    lerp(
        (distance - config.min_threshold) / span,
        config.min_cash,
        config.max_cash,
    ) as i64
}

/// Choose a destination label uniformly among `candidates`, never `current`.
///
/// # Panics
///
/// Panics if no candidate differs from `current`.
pub fn pick_destination<'a, R: Rng>(
    candidates: &'a [String],
    current: Option<&str>,
    rng: &mut R,
) -> &'a str {
    let eligible: Vec<&'a str> = candidates
        .iter()
        .map(String::as_str)
        .filter(|label| Some(*label) != current)
        .collect();
    assert!(
        !eligible.is_empty(),
        "no destination house available (candidates: {candidates:?}, current: {current:?})"
    );
    eligible[rng.gen_range(0..eligible.len())]
}

// ---------------------------------------------------------------------------
// Trip state
// ---------------------------------------------------------------------------

/// An active trip.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trip {
    /// The drop-off marker entity.
    pub target: EntityId,
    /// Label of the destination house.
    pub destination: String,
    /// Where the passenger was picked up.
    pub pickup: Vec2,
    /// Fare paid on delivery.
    pub cash_value: i64,
    /// Seconds left before the passenger gives up.
    pub remaining_sec: f64,
}

/// Whether a passenger is aboard.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TripState {
    /// Cruising; the next man touched becomes a passenger.
    Idle,
    /// A passenger is aboard and the countdown runs.
    HasPassenger(Trip),
}

/// Trip transitions reported to the caller.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TripEvent {
    /// A man got in and a target was placed.
    PickedUp {
        destination: String,
        cash_value: i64,
    },
    /// The car reached the target in time; `cash_value` was paid.
    Delivered {
        destination: String,
        cash_value: i64,
    },
    /// The countdown ran out before delivery.
    Expired {
        destination: String,
    },
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Owns the trip state and the last destination handed out.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dispatcher {
    state: TripState,
    /// Destination of the most recent trip; excluded from the next pick.
    last_destination: Option<String>,
    countdown_sec: f64,
}

impl Dispatcher {
    /// A dispatcher whose trips last `countdown_sec`.
    pub fn new(countdown_sec: f64) -> Self {
        Self {
            state: TripState::Idle,
            last_destination: None,
            countdown_sec,
        }
    }

    pub fn state(&self) -> &TripState {
        &self.state
    }

    pub fn trip(&self) -> Option<&Trip> {
        match &self.state {
            TripState::HasPassenger(trip) => Some(trip),
            TripState::Idle => None,
        }
    }

    pub fn has_passenger(&self) -> bool {
        self.trip().is_some()
    }

    pub fn last_destination(&self) -> Option<&str> {
        self.last_destination.as_deref()
    }

    /// Choose where the next passenger goes.
    ///
    /// # Panics
    ///
    /// See [`pick_destination`].
    pub fn choose_destination<R: Rng>(&mut self, candidates: &[String], rng: &mut R) -> String {
        let label = pick_destination(candidates, self.last_destination.as_deref(), rng).to_owned();
        self.last_destination = Some(label.clone());
        label
    }

    /// Begin a trip and start the countdown.
    ///
    /// # Panics
    ///
    /// Panics if a trip is already in progress.
    pub fn start_trip(
        &mut self,
        target: EntityId,
        destination: String,
        pickup: Vec2,
        cash_value: i64,
    ) -> TripEvent {
        assert!(!self.has_passenger(), "a trip is already in progress");
        tracing::info!(destination = %destination, cash_value, "passenger picked up");
        let event = TripEvent::PickedUp {
            destination: destination.clone(),
            cash_value,
        };
        self.state = TripState::HasPassenger(Trip {
            target,
            destination,
            pickup,
            cash_value,
            remaining_sec: self.countdown_sec,
        });
        event
    }

    /// Finish the trip if `target` is the current drop-off marker.
    pub fn deliver(&mut self, target: EntityId) -> Option<Trip> {
        match &self.state {
            TripState::HasPassenger(trip) if trip.target == target => {}
            _ => return None,
        }
        let TripState::HasPassenger(trip) = std::mem::replace(&mut self.state, TripState::Idle)
        else {
            return None;
        };
        tracing::info!(
            destination = %trip.destination,
            cash_value = trip.cash_value,
            "passenger delivered"
        );
        Some(trip)
    }

    /// Run the countdown. Returns the trip if it just expired.
    pub fn tick(&mut self, dt: f64) -> Option<Trip> {
        let TripState::HasPassenger(trip) = &mut self.state else {
            return None;
        };
        trip.remaining_sec -= dt;
        if trip.remaining_sec > 0.0 {
            return None;
        }
        let TripState::HasPassenger(trip) = std::mem::replace(&mut self.state, TripState::Idle)
        else {
            return None;
        };
        tracing::info!(destination = %trip.destination, "passenger gave up");
        Some(trip)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn target_config() -> TargetConfig {
        TargetConfig {
            min_threshold: 20.0,
            max_threshold: 200.0,
            min_cash: 5.0,
            max_cash: 50.0,
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // -- 1. Fares ---------------------------------------------------------------

    #[test]
    fn fare_for_hundred_units() {
        let cash = cash_value_from_distance(Vec2::ZERO, Vec2::new(60.0, -40.0), &target_config());
        assert_eq!(cash, 25);
    }

    #[test]
    fn fare_endpoints() {
        let cfg = target_config();
        assert_eq!(cash_value_from_distance(Vec2::ZERO, Vec2::new(20.0, 0.0), &cfg), 5);
        assert_eq!(cash_value_from_distance(Vec2::ZERO, Vec2::new(0.0, 200.0), &cfg), 50);
    }

    #[test]
    fn fare_is_not_clamped() {
        let cfg = target_config();
        assert_eq!(cash_value_from_distance(Vec2::ZERO, Vec2::new(380.0, 0.0), &cfg), 95);
    }

    #[test]
    fn degenerate_thresholds_pay_minimum() {
        let cfg = TargetConfig {
            max_threshold: 20.0,
            ..target_config()
        };
        assert_eq!(cash_value_from_distance(Vec2::ZERO, Vec2::new(500.0, 0.0), &cfg), 5);
    }

    // -- 2. Destinations --------------------------------------------------------

    #[test]
    fn destination_never_repeats_current() {
        let mut rng = Pcg32::seed_from_u64(7);
        let candidates = labels(&["a", "b"]);
        for _ in 0..50 {
            assert_eq!(pick_destination(&candidates, Some("a"), &mut rng), "b");
        }
    }

    #[test]
    fn destination_covers_all_candidates() {
        let mut rng = Pcg32::seed_from_u64(1);
        let candidates = labels(&["a", "b", "c"]);
        let mut seen: Vec<&str> = (0..200)
            .map(|_| pick_destination(&candidates, None, &mut rng))
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    #[should_panic(expected = "no destination house available")]
    fn only_current_destination_panics() {
        let mut rng = Pcg32::seed_from_u64(1);
        pick_destination(&labels(&["a"]), Some("a"), &mut rng);
    }

    #[test]
    fn dispatcher_remembers_last_destination() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut dispatcher = Dispatcher::new(10.0);
        let candidates = labels(&["a", "b"]);
        let first = dispatcher.choose_destination(&candidates, &mut rng);
        let second = dispatcher.choose_destination(&candidates, &mut rng);
        assert_ne!(first, second);
        assert_eq!(dispatcher.last_destination(), Some(second.as_str()));
    }

    // -- 3. State machine -------------------------------------------------------

    fn started() -> (Dispatcher, EntityId) {
        let mut dispatcher = Dispatcher::new(10.0);
        let target = EntityId::new(3, 0);
        dispatcher.start_trip(target, "a".into(), Vec2::ZERO, 12);
        (dispatcher, target)
    }

    #[test]
    fn pickup_starts_countdown() {
        let (dispatcher, target) = started();
        let trip = dispatcher.trip().unwrap();
        assert_eq!(trip.target, target);
        assert_eq!(trip.remaining_sec, 10.0);
    }

    #[test]
    #[should_panic(expected = "already in progress")]
    fn second_pickup_panics() {
        let (mut dispatcher, target) = started();
        dispatcher.start_trip(target, "b".into(), Vec2::ZERO, 1);
    }

    #[test]
    fn countdown_expires_after_configured_time() {
        let (mut dispatcher, target) = started();
        for _ in 0..39 {
            assert!(dispatcher.tick(0.25).is_none());
        }
        let expired = dispatcher.tick(0.25).unwrap();
        assert_eq!(expired.target, target);
        assert_eq!(dispatcher.state(), &TripState::Idle);
        assert!(dispatcher.tick(0.25).is_none());
    }

    #[test]
    fn delivery_requires_matching_target() {
        let (mut dispatcher, target) = started();
        assert!(dispatcher.deliver(EntityId::new(9, 0)).is_none());
        assert!(dispatcher.has_passenger());
        let trip = dispatcher.deliver(target).unwrap();
        assert_eq!(trip.cash_value, 12);
        assert!(!dispatcher.has_passenger());
        assert!(dispatcher.deliver(target).is_none());
    }

    #[test]
    fn idle_countdown_is_noop() {
        let mut dispatcher = Dispatcher::new(10.0);
        assert!(dispatcher.tick(100.0).is_none());
        assert_eq!(dispatcher.state(), &TripState::Idle);
    }
}
