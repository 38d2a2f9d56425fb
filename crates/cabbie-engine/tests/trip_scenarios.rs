//! End-to-end passenger trips on a small hand-built level.
//!
//! The car starts at rest on the line y = 266 facing right. A passenger
//! waits on the same line, and the only house sits above it so that its
//! drop-off marker lands on the line too. Holding the accelerator drives the
//! car through the pickup and then the drop-off without any steering.

use cabbie_engine::passenger::cash_value_from_distance;
use cabbie_engine::prelude::*;

const LEVEL: &str = r#"
[screen]
width = 800
height = 600
camera_move_border = 150

[general]
msg_display_time_sec = 2
passenger_time_sec = 10

[handling]
steer_rads_per_sec_low = 3.0
steer_rads_per_sec_high = 1.8
low_threshold = 40
high_threshold = 300
accel_per_sec_low = 160
accel_per_sec_high = 60
no_accel_slowing = 50
brake_per_sec = 320
grip = 400
grip_factor_when_braking = 0.4
autoreverse_hold_time_sec = 0.3

[collision]
car_bounce_factor = 0.6
house_bounce_factor = 0.5
car_box_x = -18 18
car_box_y = -8 8

[target]
min_threshold = 50
max_threshold = 1000
min_cash = 5
max_cash = 50

[sprites]
car_size = 40 20
house_size = 100 100
man_size = 16 24
target_size = 32 32
guard_size = 24 24

[level]
player_pos = 300 266
houses = a
housea_pos = 700 200
housea_start = Over there, please.
housea_win = Paid ${cash}
housea_lose = I'll walk.
men = 1
man1_pos = 400 266
destinations = a
"#;

const DT: f64 = 1.0 / 60.0;

fn settings_with(group: &str, key: &str, value: &str) -> Settings {
    let mut settings = Settings::parse(LEVEL);
    settings.set(group, key, value);
    settings
}

fn tick_loop(settings: &Settings) -> TickLoop {
    TickLoop::new(
        Game::new(GameConfig::from_settings(settings), 5),
        TickConfig {
            fixed_dt: DT,
            headless: true,
        },
    )
}

fn accelerate() -> InputFrame {
    InputFrame {
        accelerate: true,
        ..Default::default()
    }
}

/// Tick until an event matching `pred` shows up. Returns every event seen.
fn run_until(
    tick_loop: &mut TickLoop,
    max_ticks: u32,
    pred: impl Fn(&TripEvent) -> bool,
) -> Vec<TripEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        let frame = tick_loop.tick();
        let done = frame.iter().any(&pred);
        events.extend(frame);
        if done {
            return events;
        }
    }
    panic!("no matching event within {max_ticks} ticks; saw {events:?}");
}

fn target_count(game: &Game) -> usize {
    game.world()
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Target(_)))
        .count()
}

// -- 1. Pickup --------------------------------------------------------------

#[test]
fn driving_into_passenger_starts_trip() {
    let settings = Settings::parse(LEVEL);
    let mut tl = tick_loop(&settings);
    tl.set_input(accelerate());

    let events = run_until(&mut tl, 300, |e| matches!(e, TripEvent::PickedUp { .. }));
    let expected_fare = cash_value_from_distance(
        Vec2::new(400.0, 266.0),
        Vec2::new(700.0, 266.0),
        &tl.game().config().target,
    );
    assert_eq!(expected_fare, 16);
    assert_eq!(
        events,
        vec![TripEvent::PickedUp {
            destination: "a".into(),
            cash_value: expected_fare,
        }]
    );

    let game = tl.game();
    assert!(game.world().iter().all(|e| e.kind != EntityKind::Man));
    assert_eq!(target_count(game), 1);

    let trip = game.trip().unwrap();
    let target = game.world().get(trip.target).unwrap();
    assert_eq!(target.body.position, Vec2::new(700.0, 266.0));
    assert!(target.body.is_sensor());
    assert!(trip.remaining_sec < 10.0);
    assert_eq!(game.status().line2, "Over there, please.");
}

// -- 2. Delivery ------------------------------------------------------------

#[test]
fn reaching_target_pays_the_fare() {
    let settings = Settings::parse(LEVEL);
    let mut tl = tick_loop(&settings);
    tl.set_input(accelerate());

    let events = run_until(&mut tl, 600, |e| matches!(e, TripEvent::Delivered { .. }));
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        TripEvent::Delivered {
            destination: "a".into(),
            cash_value: 16,
        }
    );

    let game = tl.game();
    assert_eq!(game.cash(), 16);
    assert_eq!(game.trip_state(), &TripState::Idle);
    assert_eq!(target_count(game), 0);
    assert_eq!(game.status().line1, "");
    assert_eq!(game.status().line2, "Paid $16");
}

#[test]
fn car_passes_under_the_house_without_bouncing() {
    let settings = Settings::parse(LEVEL);
    let mut tl = tick_loop(&settings);
    tl.set_input(accelerate());
    run_until(&mut tl, 600, |e| matches!(e, TripEvent::Delivered { .. }));

    let player = tl.game().player().unwrap();
    assert!(player.body.velocity.x > 0.0);
    assert!((player.body.position.y - 266.0).abs() < 1e-6);
}

// -- 3. Expiry --------------------------------------------------------------

#[test]
fn passenger_gives_up_when_time_runs_out() {
    let settings = settings_with("general", "passenger_time_sec", "1");
    let mut tl = tick_loop(&settings);
    tl.set_input(accelerate());
    run_until(&mut tl, 300, |e| matches!(e, TripEvent::PickedUp { .. }));

    // Stop well short of the target, then let go before the gearbox flips to reverse.
    tl.set_input(InputFrame {
        brake: true,
        ..Default::default()
    });
    let mut braking_events = Vec::new();
    for _ in 0..120 {
        if tl.game().player().unwrap().body.speed() < 1e-6 {
            break;
        }
        braking_events.extend(tl.tick());
    }
    assert!(braking_events.is_empty());
    assert!(tl.game().player().unwrap().body.speed() < 1e-6);
    assert!(tl.game().player().unwrap().body.position.x < 500.0);
    tl.set_input(InputFrame::default());

    let events = run_until(&mut tl, 120, |e| matches!(e, TripEvent::Expired { .. }));
    assert_eq!(
        events,
        vec![TripEvent::Expired {
            destination: "a".into()
        }]
    );

    let game = tl.game();
    assert_eq!(game.cash(), 0);
    assert_eq!(game.trip_state(), &TripState::Idle);
    assert_eq!(target_count(game), 0);
    assert_eq!(game.status().line2, "I'll walk.");
}

#[test]
fn missing_passenger_time_uses_default_countdown() {
    let settings = Settings::parse(&LEVEL.replace("passenger_time_sec = 10", ""));
    let mut tl = tick_loop(&settings);
    tl.set_input(accelerate());
    run_until(&mut tl, 300, |e| matches!(e, TripEvent::PickedUp { .. }));
    let remaining = tl.game().trip().unwrap().remaining_sec;
    assert!((remaining - (10.0 - DT)).abs() < 1e-9);
}

// -- 4. Settings file -------------------------------------------------------

#[test]
fn level_loads_from_file() {
    let path = std::env::temp_dir().join(format!("cabbie-trip-level-{}.cfg", std::process::id()));
    std::fs::write(&path, LEVEL).unwrap();
    let settings = Settings::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let game = Game::new(GameConfig::from_settings(&settings), 0);
    let house = game.world().find_house("a").unwrap();
    assert_eq!(house.name, "house_a");
    assert_eq!(house.body.position, Vec2::new(700.0, 200.0));
}

#[test]
fn missing_settings_file_is_an_io_error() {
    let err = Settings::load("/nonexistent/cabbie/settings.cfg").unwrap_err();
    assert!(matches!(err, SettingsError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/cabbie/settings.cfg"));
}
