//! The game context: world, trips, camera, cash and status line.
//!
//! [`Game`] owns everything the simulation touches, so there is no global
//! state. One call to [`Game::update`] is one frame:
//!
//! 1. the player's controls are handed to the player car;
//! 2. the world runs its update pass;
//! 3. trigger contacts from the pass drive the trip state machine;
//! 4. the camera follows the player;
//! 5. the status line and the trip countdown run down;
//! 6. killed entities are swept.

use cabbie_physics::body::{Body, BodyRole, Rect};
use cabbie_physics::boundary::centre_bounds;
use cabbie_physics::handling::Controls;
use cabbie_physics::math::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::entity::EntityId;
use crate::passenger::{cash_value_from_distance, Dispatcher, Trip, TripEvent, TripState};
use crate::world::{Car, Driver, Entity, EntityKind, Guard, House, Target, TriggerHit, World};

// ---------------------------------------------------------------------------
// StatusMessage
// ---------------------------------------------------------------------------

/// Up to two lines of text shown for a limited time.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatusMessage {
    /// Upper line. Empty for single-line messages.
    pub line1: String,
    /// Lower line.
    pub line2: String,
    remaining_sec: f64,
}

impl StatusMessage {
    /// Show `text`, or `text` over `text2` when `text2` is not empty.
    /// Two-line messages stay up half as long again.
    fn show(&mut self, text: &str, text2: &str, display_time_sec: f64) {
        if text2.is_empty() {
            self.line1.clear();
            self.line2 = text.to_owned();
            self.remaining_sec = display_time_sec;
        } else {
            self.line1 = text.to_owned();
            self.line2 = text2.to_owned();
            self.remaining_sec = display_time_sec * 1.5;
        }
    }

    fn tick(&mut self, dt: f64) {
        if self.remaining_sec <= 0.0 {
            return;
        }
        self.remaining_sec -= dt;
        if self.remaining_sec <= 0.0 {
            self.line1.clear();
            self.line2.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.line1.is_empty() && self.line2.is_empty()
    }

    pub fn remaining_sec(&self) -> f64 {
        self.remaining_sec.max(0.0)
    }
}

// ---------------------------------------------------------------------------
// SpriteView
// ---------------------------------------------------------------------------

/// What a renderer needs to draw one entity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpriteView {
    /// Entity name, e.g. `"house_a"` or `"man 12"`.
    pub name: String,
    /// Entity type name, which picks the texture.
    pub kind: String,
    /// World position of the sprite centre.
    pub position: Vec2,
    /// Rotation in radians.
    pub facing: f64,
    pub width: f64,
    pub height: f64,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Everything one running game owns.
///
/// Built from a [`GameConfig`] and a seed; the seed drives every random
/// choice, so equal seeds and equal inputs give equal games.
pub struct Game {
    config: GameConfig,
    world: World,
    dispatcher: Dispatcher,
    camera: Camera,
    rng: Pcg32,
    player: EntityId,
    cash: i64,
    status: StatusMessage,
}

impl Game {
    /// Build the level described by `config`. `seed` drives every random choice.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let width = config.screen.width;
        let height = config.screen.height;
        let mut world = World::new(Rect::new(-width, -height, 2.0 * width, 2.0 * height));

        // Ground tiles go first so they are always processed before anything that moves.
        for x_tile in -1..=1 {
            for y_tile in -1..=1 {
                let x = width * 0.5 + f64::from(x_tile) * width;
                let y = height * 0.5 + f64::from(y_tile) * height;
                world.spawn_named(
                    format!("background ({x_tile}, {y_tile})"),
                    EntityKind::Backdrop,
                    Body::new(x, y, width, height),
                );
            }
        }

        let house_size = config.sprites.house;
        for house in &config.level.houses {
            let body = Body::new(
                house.position.x,
                house.position.y,
                house_size.width,
                house_size.height,
            )
            .with_restitution(config.collision.house_bounce_factor);
            world.spawn_named(
                format!("house_{}", house.label),
                EntityKind::House(House {
                    label: house.label.clone(),
                }),
                body,
            );
        }

        let man_size = config.sprites.man;
        for man in &config.level.men {
            let body = Body::new(
                man.position.x,
                man.position.y,
                man_size.width,
                man_size.height,
            )
            .sensor(true);
            world.spawn(EntityKind::Man, body);
        }

        let guard_size = config.sprites.guard;
        let screen = Rect::new(0.0, 0.0, width, height);
        for guard in &config.level.guards {
            let body = Body::new(
                guard.position.x,
                guard.position.y,
                guard_size.width,
                guard_size.height,
            )
            .with_velocity(guard.velocity.x, guard.velocity.y);
            let bounds = centre_bounds(&body, &screen);
            world.spawn(EntityKind::Guard(Guard { bounds }), body);
        }

        let car_size = config.sprites.car;
        let start = config.level.player_position;
        let player_body = Body::new(start.x, start.y, car_size.width, car_size.height)
            .with_role(BodyRole::Player)
            .with_restitution(config.collision.car_bounce_factor)
            .with_collision_box(config.collision.car_box(car_size));
        let player = world.spawn(EntityKind::Car(Car::new(Driver::Player)), player_body);

        tracing::info!(
            entities = world.len(),
            houses = config.level.houses.len(),
            men = config.level.men.len(),
            seed,
            "level built"
        );

        Self {
            camera: Camera::new(Vec2::new(width * 0.5, height * 0.5), width, height),
            dispatcher: Dispatcher::new(config.general.passenger_time_sec),
            rng: Pcg32::seed_from_u64(seed),
            config,
            world,
            player,
            cash: 0,
            status: StatusMessage::default(),
        }
    }

    /// Advance the game by `dt` seconds with the player's `controls`.
    pub fn update(&mut self, dt: f64, controls: Controls) -> Vec<TripEvent> {
        self.world.set_controls(self.player, controls);
        let step = self.world.update(dt, &self.config.handling);

        let mut events = Vec::new();
        for hit in step.triggers {
            let event = match hit {
                TriggerHit::Man(man) => self.pick_up(man),
                TriggerHit::Target(target) => self.drop_off(target),
            };
            events.extend(event);
        }

        if let Some(player) = self.world.get(self.player) {
            let bounds = player.body.bounds();
            self.camera.follow(
                &bounds,
                &self.world.play_area(),
                self.config.screen.camera_move_border,
            );
        }

        self.status.tick(dt);

        if let Some(trip) = self.dispatcher.tick(dt) {
            events.push(self.lose_passenger(trip));
        }

        self.world.sweep();
        events
    }

    // -- trips ----------------------------------------------------------------

    fn pick_up(&mut self, man: EntityId) -> Option<TripEvent> {
        if self.dispatcher.has_passenger() {
            return None;
        }
        let pickup = self.world.get(man)?.body.position;

        let label = self
            .dispatcher
            .choose_destination(&self.config.level.destinations, &mut self.rng);
        let house = self
            .world
            .find_house(&label)
            .unwrap_or_else(|| panic!("destination house {label:?} is not in the world"));

        let target_size = self.config.sprites.target;
        let x = house.body.position.x;
        let y = house.body.position.y + house.body.half_height() + target_size.height * 0.5;
        let cash_value = cash_value_from_distance(pickup, Vec2::new(x, y), &self.config.target);

        let body = Body::new(x, y, target_size.width, target_size.height).sensor(true);
        let target = self.world.spawn(EntityKind::Target(Target { cash_value }), body);

        if let Some(spec) = self.config.level.house(&label) {
            self.status.show(
                &spec.start_message,
                &spec.start_message2,
                self.config.general.msg_display_time_sec,
            );
        }
        self.world.kill(man);
        Some(self.dispatcher.start_trip(target, label, pickup, cash_value))
    }

    fn drop_off(&mut self, target: EntityId) -> Option<TripEvent> {
        let trip = self.dispatcher.deliver(target)?;
        if let Some(spec) = self.config.level.house(&trip.destination) {
            let message = spec.win_message.replace("{cash}", &trip.cash_value.to_string());
            self.status
                .show(&message, "", self.config.general.msg_display_time_sec);
        }
        self.cash += trip.cash_value;
        self.world.kill(target);
        Some(TripEvent::Delivered {
            destination: trip.destination,
            cash_value: trip.cash_value,
        })
    }

    fn lose_passenger(&mut self, trip: Trip) -> TripEvent {
        if let Some(spec) = self.config.level.house(&trip.destination) {
            self.status
                .show(&spec.lose_message, "", self.config.general.msg_display_time_sec);
        }
        self.world.kill(trip.target);
        TripEvent::Expired {
            destination: trip.destination,
        }
    }

    // -- rendering ------------------------------------------------------------

    /// Entities the camera can see, in draw order.
    pub fn visible_sprites(&self) -> Vec<SpriteView> {
        self.world
            .iter()
            .filter(|e| !e.is_killed() && self.camera.can_see(&e.body.bounds()))
            .map(|e| SpriteView {
                name: e.name.clone(),
                kind: e.kind.type_name().to_owned(),
                position: e.body.position,
                facing: e.body.facing,
                width: e.body.width(),
                height: e.body.height(),
            })
            .collect()
    }

    // -- accessors ------------------------------------------------------------

    /// The configuration the level was built from.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for level setup and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Id of the player car. Stable for the whole game.
    pub fn player_id(&self) -> EntityId {
        self.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.world.get(self.player)
    }

    /// Total fares collected.
    pub fn cash(&self) -> i64 {
        self.cash
    }

    /// The status line currently shown.
    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn trip_state(&self) -> &TripState {
        self.dispatcher.state()
    }

    /// The active trip, if a passenger is aboard.
    pub fn trip(&self) -> Option<&Trip> {
        self.dispatcher.trip()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
