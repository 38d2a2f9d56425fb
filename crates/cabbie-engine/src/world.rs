//! The entity registry and the per-tick update pass.
//!
//! Every object in the level is an [`Entity`]: a [`Body`] plus an
//! [`EntityKind`] saying how it behaves. The update pass walks entities in
//! registration order and dispatches on the kind:
//!
//! | kind       | per tick                                                   |
//! |------------|------------------------------------------------------------|
//! | `Car`      | handling, integrate, resolve (player only), clamp to area  |
//! | `Guard`    | integrate, reflect inside its bounds                       |
//! | everything | integrate                                                  |
//!
//! The player car only resolves against houses, cars, passengers and targets.
//! Bodies updated earlier in the pass are seen in their new state by bodies
//! updated later. Entities are never added or removed during the pass:
//! [`World::kill`] only marks an entity, and [`World::sweep`] removes marked
//! entities once the tick is over.

use cabbie_physics::body::{Body, BodyRole, Rect};
use cabbie_physics::boundary::{enforce_boundaries, reflect_within};
use cabbie_physics::handling::{apply_handling, Controls, GearState, HandlingConfig};

use crate::entity::{EntityAllocator, EntityId};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Who is driving a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Driver {
    Player,
    /// Nobody; the car only coasts to a stop.
    Parked,
}

/// A car and its driving state.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Car {
    pub driver: Driver,
    /// Forward/reverse gear and its switch timer.
    pub gear: GearState,
    /// Controls applied on the next tick. Ignored for parked cars.
    pub controls: Controls,
}

impl Car {
    /// A car in forward gear with no input.
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            gear: GearState::default(),
            controls: Controls::IDLE,
        }
    }
}

/// A house the player bounces off and may be sent to.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct House {
    /// Label used by destinations and messages.
    pub label: String,
}

/// The drop-off marker below a destination house.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Target {
    /// Fare paid on delivery.
    pub cash_value: i64,
}

/// A patrolling obstacle that bounces between the edges of its bounds.
/// Cars drive through guards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Guard {
    /// Region the guard's centre patrols.
    pub bounds: Rect,
}

/// Behaviour of an entity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum EntityKind {
    /// Ground tile. Never collides.
    Backdrop,
    Car(Car),
    House(House),
    /// A passenger waiting to be picked up.
    Man,
    /// Drop-off marker for the current trip.
    Target(Target),
    Guard(Guard),
}

impl EntityKind {
    /// Type name used when generating entity names.
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Backdrop => "background",
            EntityKind::Car(_) => "car",
            EntityKind::House(_) => "house",
            EntityKind::Man => "man",
            EntityKind::Target(_) => "target",
            EntityKind::Guard(_) => "guard",
        }
    }

    /// Whether the player car tests its corners against bodies of this kind.
    ///
    /// Backdrops and guards are scenery for the resolver: guards keep to
    /// their own reflect-at-edge rule and cars drive through them.
    pub fn is_collidable(&self) -> bool {
        !matches!(self, EntityKind::Backdrop | EntityKind::Guard(_))
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One registered object in the level.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Display and debug name, unique within a level.
    pub name: String,
    pub kind: EntityKind,
    pub body: Body,
    /// Set by [`World::kill`]; the entity is dropped at the next sweep.
    killed: bool,
}

impl Entity {
    /// Whether the entity has been marked for removal.
    pub fn is_killed(&self) -> bool {
        self.killed
    }
}

/// A trigger body the player touched during the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TriggerHit {
    /// A waiting passenger.
    Man(EntityId),
    /// A drop-off marker.
    Target(EntityId),
}

/// What happened during one update pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldStep {
    /// Trigger contacts, in the order they were found.
    pub triggers: Vec<TriggerHit>,
    /// Solid contacts the player bounced off.
    pub bounces: usize,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// All live entities plus the play area cars are kept inside.
#[derive(Debug)]
pub struct World {
    allocator: EntityAllocator,
    entities: Vec<Entity>,
    registered: usize,
    play_area: Rect,
}

impl World {
    /// An empty world whose cars are kept inside `play_area`.
    pub fn new(play_area: Rect) -> Self {
        Self {
            allocator: EntityAllocator::new(),
            entities: Vec::new(),
            registered: 0,
            play_area,
        }
    }

    pub fn play_area(&self) -> Rect {
        self.play_area
    }

    // -- registration ---------------------------------------------------------

    /// Register an entity named `"<type> <n>"`, where `n` counts registrations so far.
    pub fn spawn(&mut self, kind: EntityKind, body: Body) -> EntityId {
        let name = format!("{} {}", kind.type_name(), self.registered + 1);
        self.spawn_named(name, kind, body)
    }

    /// Register an entity with an explicit name.
    pub fn spawn_named(
        &mut self,
        name: impl Into<String>,
        kind: EntityKind,
        body: Body,
    ) -> EntityId {
        let id = self.allocator.allocate();
        let name = name.into();
        tracing::debug!(
            entity = %id,
            name = %name,
            x = body.position.x,
            y = body.position.y,
            "registered entity"
        );
        self.entities.push(Entity {
            id,
            name,
            kind,
            body,
            killed: false,
        });
        self.registered += 1;
        id
    }

    /// Mark `id` for removal at the next [`sweep`](Self::sweep).
    ///
    /// Returns `false` if the entity does not exist or was already marked.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) if !entity.killed => {
                entity.killed = true;
                true
            }
            _ => false,
        }
    }

    /// Remove every killed entity. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.entities.len();
        let allocator = &mut self.allocator;
        self.entities.retain(|entity| {
            if entity.killed {
                tracing::debug!(entity = %entity.id, name = %entity.name, "removed entity");
                allocator.free(entity.id);
                false
            } else {
                true
            }
        });
        before - self.entities.len()
    }

    // -- lookup ---------------------------------------------------------------

    /// Whether `id` is registered and not yet swept. Killed entities still count.
    pub fn contains(&self, id: EntityId) -> bool {
        self.allocator.is_live(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if !self.allocator.is_live(id) {
            return None;
        }
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if !self.allocator.is_live(id) {
            return None;
        }
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Entities in registration order, including killed ones not yet swept.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The house with the given label.
    pub fn find_house(&self, label: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| match &e.kind {
            EntityKind::House(house) => house.label == label,
            _ => false,
        })
    }

    /// Set the controls of the car with id `id`. Returns `false` if it is not a car.
    pub fn set_controls(&mut self, id: EntityId, controls: Controls) -> bool {
        match self.get_mut(id).map(|e| &mut e.kind) {
            Some(EntityKind::Car(car)) => {
                car.controls = controls;
                true
            }
            _ => false,
        }
    }

    // -- update ---------------------------------------------------------------

    /// Run one update pass over every entity.
    pub fn update(&mut self, dt: f64, handling: &HandlingConfig) -> WorldStep {
        let mut step = WorldStep::default();
        let play_area = self.play_area;

        for i in 0..self.entities.len() {
            let (before, rest) = self.entities.split_at_mut(i);
            let Some((current, after)) = rest.split_first_mut() else {
                break;
            };
            if current.killed {
                continue;
            }
            let others = before.iter().chain(after.iter());
            update_entity(current, others, play_area, handling, dt, &mut step);
        }

        step
    }
}

fn update_entity<'a>(
    entity: &mut Entity,
    others: impl Iterator<Item = &'a Entity>,
    play_area: Rect,
    handling: &HandlingConfig,
    dt: f64,
    step: &mut WorldStep,
) {
    let body = &mut entity.body;
    match &mut entity.kind {
        EntityKind::Car(car) => {
            let controls = match car.driver {
                Driver::Player => car.controls,
                Driver::Parked => Controls::IDLE,
            };
            let outcome = apply_handling(body, &mut car.gear, controls, handling, dt);
            body.integrate(dt);

            if outcome.was_moving && body.role() == BodyRole::Player {
                for other in others {
                    if other.killed || !other.kind.is_collidable() {
                        continue;
                    }
                    if !body.check_collision_with(&other.body) {
                        continue;
                    }
                    match other.kind {
                        EntityKind::Man => step.triggers.push(TriggerHit::Man(other.id)),
                        EntityKind::Target(_) => step.triggers.push(TriggerHit::Target(other.id)),
                        _ if other.body.is_sensor() => {}
                        _ => step.bounces += 1,
                    }
                }
            }

            enforce_boundaries(body, &play_area);
        }
        EntityKind::Guard(guard) => {
            body.integrate(dt);
            reflect_within(body, &guard.bounds);
        }
        EntityKind::Backdrop | EntityKind::House(_) | EntityKind::Man | EntityKind::Target(_) => {
            body.integrate(dt);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cabbie_physics::math::Vec2;

    fn world() -> World {
        World::new(Rect::new(-1000.0, -1000.0, 1000.0, 1000.0))
    }

    fn handling() -> HandlingConfig {
        HandlingConfig::default()
    }

    fn player_body(x: f64, y: f64) -> Body {
        Body::new(x, y, 40.0, 20.0).with_role(BodyRole::Player)
    }

    // -- 1. Registration --------------------------------------------------------

    #[test]
    fn generated_names_count_registrations() {
        let mut world = world();
        world.spawn_named(
            "background (0, 0)",
            EntityKind::Backdrop,
            Body::new(0.0, 0.0, 10.0, 10.0),
        );
        let man = world.spawn(EntityKind::Man, Body::new(0.0, 0.0, 10.0, 10.0));
        let car = world.spawn(
            EntityKind::Car(Car::new(Driver::Parked)),
            Body::new(0.0, 0.0, 10.0, 10.0),
        );
        assert_eq!(world.get(man).unwrap().name, "man 2");
        assert_eq!(world.get(car).unwrap().name, "car 3");
    }

    #[test]
    fn kill_is_deferred_until_sweep() {
        let mut world = world();
        let man = world.spawn(EntityKind::Man, Body::new(0.0, 0.0, 10.0, 10.0));
        assert!(world.kill(man));
        assert!(!world.kill(man));
        assert!(world.contains(man));
        assert!(world.get(man).unwrap().is_killed());

        assert_eq!(world.sweep(), 1);
        assert!(!world.contains(man));
        assert!(world.get(man).is_none());
        assert!(world.is_empty());
    }

    #[test]
    fn stale_ids_do_not_resolve_after_reuse() {
        let mut world = world();
        let first = world.spawn(EntityKind::Man, Body::new(0.0, 0.0, 10.0, 10.0));
        world.kill(first);
        world.sweep();
        let second = world.spawn(EntityKind::Man, Body::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(first.index(), second.index());
        assert!(world.get(first).is_none());
        assert!(!world.kill(first));
        assert!(world.get(second).is_some());
    }

    #[test]
    fn find_house_by_label() {
        let mut world = world();
        world.spawn_named(
            "house_a",
            EntityKind::House(House { label: "a".into() }),
            Body::new(10.0, 20.0, 50.0, 50.0),
        );
        assert_eq!(world.find_house("a").unwrap().body.position, Vec2::new(10.0, 20.0));
        assert!(world.find_house("b").is_none());
    }

    // -- 2. Player car ----------------------------------------------------------

    #[test]
    fn player_car_drives_with_its_controls() {
        let mut world = world();
        let car = world.spawn(EntityKind::Car(Car::new(Driver::Player)), player_body(0.0, 0.0));
        assert!(world.set_controls(car, Controls::new(0.0, 1.0)));
        world.update(0.5, &handling());
        let body = &world.get(car).unwrap().body;
        assert!(body.velocity.x > 0.0);
        assert!(body.position.x > 0.0);
    }

    #[test]
    fn parked_car_ignores_controls_and_coasts() {
        let mut world = world();
        let car = world.spawn(
            EntityKind::Car(Car::new(Driver::Parked)),
            Body::new(0.0, 0.0, 40.0, 20.0).with_velocity(30.0, 0.0),
        );
        world.set_controls(car, Controls::new(1.0, 1.0));
        world.update(0.1, &handling());
        let body = &world.get(car).unwrap().body;
        assert!(body.velocity.x < 30.0);
        assert_eq!(body.facing, 0.0);
    }

    #[test]
    fn set_controls_rejects_non_cars() {
        let mut world = world();
        let man = world.spawn(EntityKind::Man, Body::new(0.0, 0.0, 10.0, 10.0));
        assert!(!world.set_controls(man, Controls::IDLE));
    }

    #[test]
    fn player_bounces_off_house() {
        let mut world = world();
        world.spawn(
            EntityKind::House(House { label: "a".into() }),
            Body::new(100.0, 0.0, 100.0, 100.0).with_restitution(0.5),
        );
        let car = world.spawn(
            EntityKind::Car(Car::new(Driver::Player)),
            player_body(25.0, 0.0).with_velocity(60.0, 0.0),
        );
        let step = world.update(0.1, &handling());
        assert_eq!(step.bounces, 1);
        assert!(step.triggers.is_empty());
        let body = &world.get(car).unwrap().body;
        assert!(body.velocity.x < 0.0);
        assert!(body.right() <= 50.0 + 1e-9);
    }

    #[test]
    fn stationary_player_does_not_test_collisions() {
        let mut world = world();
        world.spawn(EntityKind::Man, Body::new(0.0, 0.0, 16.0, 24.0).sensor(true));
        world.spawn(EntityKind::Car(Car::new(Driver::Player)), player_body(0.0, 0.0));
        let step = world.update(0.1, &handling());
        assert!(step.triggers.is_empty());
    }

    #[test]
    fn touching_a_man_reports_a_trigger_without_bounce() {
        let mut world = world();
        let man = world.spawn(EntityKind::Man, Body::new(30.0, 0.0, 16.0, 24.0).sensor(true));
        let car = world.spawn(
            EntityKind::Car(Car::new(Driver::Player)),
            player_body(0.0, 0.0).with_velocity(100.0, 0.0),
        );
        let step = world.update(0.05, &handling());
        assert_eq!(step.triggers, vec![TriggerHit::Man(man)]);
        assert_eq!(step.bounces, 0);
        assert!(world.get(car).unwrap().body.velocity.x > 0.0);
    }

    #[test]
    fn killed_entities_are_skipped() {
        let mut world = world();
        let man = world.spawn(EntityKind::Man, Body::new(30.0, 0.0, 16.0, 24.0).sensor(true));
        world.spawn(
            EntityKind::Car(Car::new(Driver::Player)),
            player_body(0.0, 0.0).with_velocity(100.0, 0.0),
        );
        world.kill(man);
        let step = world.update(0.05, &handling());
        assert!(step.triggers.is_empty());
    }

    #[test]
    fn player_is_clamped_to_play_area() {
        let mut world = World::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let car = world.spawn(
            EntityKind::Car(Car::new(Driver::Player)),
            player_body(75.0, 50.0).with_velocity(200.0, 0.0),
        );
        world.update(0.1, &handling());
        let body = &world.get(car).unwrap().body;
        assert_eq!(body.right(), 100.0);
        assert_eq!(body.velocity.x, 0.0);
    }

    // -- 3. Guards --------------------------------------------------------------

    #[test]
    fn guard_reflects_inside_bounds() {
        let mut world = world();
        let guard = world.spawn(
            EntityKind::Guard(Guard {
                bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            }),
            Body::new(95.0, 50.0, 10.0, 10.0).with_velocity(100.0, 0.0),
        );
        world.update(0.1, &handling());
        let body = &world.get(guard).unwrap().body;
        assert_eq!(body.position.x, 95.0);
        assert_eq!(body.velocity.x, -100.0);
    }

    #[test]
    fn player_drives_through_guard() {
        let mut world = world();
        world.spawn(
            EntityKind::Guard(Guard {
                bounds: Rect::new(-500.0, -500.0, 500.0, 500.0),
            }),
            Body::new(30.0, 0.0, 24.0, 24.0),
        );
        let car = world.spawn(
            EntityKind::Car(Car::new(Driver::Player)),
            player_body(0.0, 0.0).with_velocity(100.0, 0.0),
        );
        let step = world.update(0.05, &handling());
        assert_eq!(step.bounces, 0);
        assert!(step.triggers.is_empty());
        let body = &world.get(car).unwrap().body;
        assert!(body.position.y.abs() < 1e-9);
        assert!(body.velocity.x > 0.0);
    }

    #[test]
    fn only_backdrops_and_guards_are_scenery() {
        let guard = EntityKind::Guard(Guard {
            bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
        });
        assert!(!guard.is_collidable());
        assert!(!EntityKind::Backdrop.is_collidable());
        assert!(EntityKind::Man.is_collidable());
        assert!(EntityKind::House(House { label: "a".into() }).is_collidable());
    }
}
