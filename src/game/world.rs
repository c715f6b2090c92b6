//! Game World
//!
//! The World owns all gameplay state and advances it one frame at a time:
//! - the entity store (player, level geometry, pickups, hazards, labels)
//! - the particle ring buffer
//! - the event queue the screen drains after each step
//!
//! One `step` runs these phases in order:
//! 1. Player steering (velocity eases toward the input direction)
//! 2. Spraying, which drains the held extinguisher and pushes the player back
//! 3. Integration and obstacle collision for the player
//! 4. Ground check (falling off sends the player back to spawn)
//! 5. Extinguisher carry, drop, pickup and free-body simulation
//! 6. Fire growth, burn damage and spreading (skipped while editing)
//! 7. Retardant particles dousing fires
//! 8. Particle ageing

use macroquad::math::{vec2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::collision::{point_in_any, resolve_circle};
use super::entity::{EntityId, EntityKind, EntityStore, FireZone, PlayerBody};
use super::event::{GameEvent, GameEvents};
use super::fire::{self, SpreadBlockers, SPREAD_START_INTENSITY};
use super::geometry::Bounds;
use super::particles::{ParticleKind, ParticlePool};
use crate::input::FrameInput;
use crate::settings::Settings;

/// Seconds after a drop before the player can pick an extinguisher up again
const PICKUP_COOLDOWN: f32 = 0.5;

/// What the player is asking for this frame
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerControls {
    /// Raw movement axis (normalised inside the step)
    pub movement: Vec2,
    /// Screen point to spray toward, if spraying
    pub spray_at: Option<Vec2>,
    pub drop: bool,
}

impl PlayerControls {
    /// Map frame input to controls. In the editor the mouse belongs to the
    /// editor, so only movement is passed through.
    pub fn from_input(input: &FrameInput, editing: bool) -> Self {
        if editing {
            return Self {
                movement: input.movement,
                ..Default::default()
            };
        }
        let spraying = input.mouse.left_down || input.spray_key;
        Self {
            movement: input.movement,
            spray_at: spraying.then_some(input.mouse.position),
            drop: input.drop,
        }
    }
}

/// Whether the round is still going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Running,
    /// Every fire is out
    Won,
    /// Health ran out
    Lost,
}

pub struct World {
    pub store: EntityStore,
    pub particles: ParticlePool,
    pub events: GameEvents,
    rng: StdRng,
    /// A level without fires can't be won by putting them out
    started_with_fires: bool,
    spray_accumulator: f32,
    pickup_cooldown: f32,
}

impl World {
    pub fn new(store: EntityStore, seed: u64) -> Self {
        let started_with_fires = store.count_fires() > 0;
        Self {
            store,
            particles: ParticlePool::new(seed),
            events: GameEvents::new(),
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            started_with_fires,
            spray_accumulator: 0.0,
            pickup_cooldown: 0.0,
        }
    }

    /// Re-evaluate the win condition baseline (after editing the level)
    pub fn rebaseline(&mut self) {
        self.started_with_fires = self.store.count_fires() > 0;
    }

    pub fn outcome(&self) -> Outcome {
        if let Some((_, player)) = self.store.player() {
            if player.health.is_depleted() {
                return Outcome::Lost;
            }
        }
        if self.started_with_fires && self.store.count_fires() == 0 {
            return Outcome::Won;
        }
        Outcome::Running
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `hazards` is false while the editor is open: fires neither grow, burn
    /// nor spread, so a level can be arranged safely.
    pub fn step(&mut self, controls: &PlayerControls, dt: f32, settings: &Settings, hazards: bool) {
        let obstacles = self.store.obstacles();
        let grounds = self.store.grounds();
        self.pickup_cooldown = (self.pickup_cooldown - dt).max(0.0);

        let player = self.store.player().map(|(id, body)| (id, body.clone()));
        if let Some((player_id, mut body)) = player {
            self.step_player(&mut body, controls, dt, settings, &obstacles, &grounds, hazards);
            self.step_extinguishers(Some(&mut body), controls, dt, settings, &obstacles);
            if hazards {
                self.step_fires(&mut body, dt, settings, &obstacles, &grounds);
            }
            if let Some(entity) = self.store.get_mut(player_id) {
                entity.kind = EntityKind::Player(body);
            }
        } else {
            self.step_extinguishers(None, controls, dt, settings, &obstacles);
        }

        self.douse_fires(settings);
        self.particles.update(dt);
    }

    fn step_player(
        &mut self,
        body: &mut PlayerBody,
        controls: &PlayerControls,
        dt: f32,
        settings: &Settings,
        obstacles: &[Bounds],
        grounds: &[Bounds],
        hazards: bool,
    ) {
        let phys = &settings.physics;

        let target = controls.movement.normalize_or_zero() * phys.max_speed;
        body.velocity = body.velocity.lerp(target, (dt * phys.acceleration).min(1.0));

        if let (Some(aim_point), Some(ext_id)) = (controls.spray_at, body.holding) {
            self.spray(body, ext_id, aim_point, dt, settings);
        }

        body.position += body.velocity * dt;
        resolve_circle(&mut body.position, &mut body.velocity, phys.player_radius, obstacles, phys.restitution);

        // Off the ground is allowed while editing; the level may be half built
        if hazards && !grounds.is_empty() && !point_in_any(body.position, grounds) {
            body.position = respawn_point(body.spawn, grounds);
            body.velocity = Vec2::ZERO;
            self.events.send(GameEvent::Fell);
            if body.health.damage(phys.fall_penalty) {
                self.events.send(GameEvent::Died);
            }
        }
    }

    fn spray(&mut self, body: &mut PlayerBody, ext_id: EntityId, aim_point: Vec2, dt: f32, settings: &Settings) {
        let aim = (aim_point - body.position).normalize_or_zero();
        if aim == Vec2::ZERO {
            return;
        }
        let Some(EntityKind::Extinguisher(ext)) = self.store.get_mut(ext_id).map(|e| &mut e.kind) else {
            return;
        };
        if ext.charge.is_empty() {
            return;
        }

        let spray = &settings.spray;
        ext.charge.drain(spray.drain_per_second * dt);
        let emptied = ext.charge.is_empty();

        self.spray_accumulator += spray.particles_per_second * dt;
        let count = self.spray_accumulator.floor();
        self.spray_accumulator -= count;

        let nozzle = body.position + aim * (settings.physics.player_radius + 4.0);
        self.particles.emit_spray(nozzle, aim, spray.speed, count as usize);
        body.velocity -= aim * spray.recoil * dt;

        if emptied {
            self.events.send(GameEvent::ChargeEmpty(ext_id));
        }
    }

    fn step_extinguishers(
        &mut self,
        mut body: Option<&mut PlayerBody>,
        controls: &PlayerControls,
        dt: f32,
        settings: &Settings,
        obstacles: &[Bounds],
    ) {
        let phys = &settings.physics;

        // Carried extinguisher may have been deleted in the editor
        if let Some(player) = body.as_deref_mut() {
            if let Some(id) = player.holding {
                if !matches!(self.store.get(id).map(|e| &e.kind), Some(EntityKind::Extinguisher(_))) {
                    player.holding = None;
                }
            }
        }

        if let Some(player) = body.as_deref_mut().filter(|_| controls.drop) {
            if let Some(id) = player.holding.take() {
                if let Some(EntityKind::Extinguisher(ext)) = self.store.get_mut(id).map(|e| &mut e.kind) {
                    let dir = player.velocity.normalize_or_zero();
                    ext.held = false;
                    ext.position = player.position;
                    ext.velocity = player.velocity + dir * phys.throw_speed;
                }
                self.pickup_cooldown = PICKUP_COOLDOWN;
                self.events.send(GameEvent::Dropped(id));
            }
        }

        let carrier = body.as_deref().map(|p| (p.position, p.velocity, p.holding));
        let friction = phys.extinguisher_friction.clamp(0.0, 1.0).powf(dt);
        let reach = phys.player_radius + phys.extinguisher_radius;
        let mut pickup = None;
        for entity in self.store.iter_mut() {
            let EntityKind::Extinguisher(ext) = &mut entity.kind else {
                continue;
            };
            if ext.held {
                if let Some((position, velocity, Some(held_id))) = carrier {
                    if held_id == entity.id {
                        ext.position = position + vec2(phys.player_radius * 0.6, 0.0);
                        ext.velocity = velocity;
                        continue;
                    }
                }
                // Nobody is carrying it any more
                ext.held = false;
            }

            ext.velocity *= friction;
            ext.position += ext.velocity * dt;
            resolve_circle(&mut ext.position, &mut ext.velocity, phys.extinguisher_radius, obstacles, phys.restitution);

            if let Some((position, _, None)) = carrier {
                if pickup.is_none() && self.pickup_cooldown <= 0.0 && ext.position.distance(position) < reach {
                    ext.held = true;
                    pickup = Some(entity.id);
                }
            }
        }

        if let (Some(id), Some(player)) = (pickup, body) {
            player.holding = Some(id);
            self.events.send(GameEvent::PickedUp(id));
        }
    }

    fn step_fires(
        &mut self,
        body: &mut PlayerBody,
        dt: f32,
        settings: &Settings,
        obstacles: &[Bounds],
        grounds: &[Bounds],
    ) {
        let cfg = &settings.fire;
        let radius = settings.physics.player_radius;
        let mut burn = 0.0;
        let mut due: Vec<(EntityId, FireZone)> = Vec::new();

        for entity in self.store.iter_mut() {
            let EntityKind::Fire(zone) = &mut entity.kind else {
                continue;
            };
            fire::grow(zone, dt, cfg.growth_rate);

            let expected = cfg.embers_per_second * zone.intensity * dt;
            let extra = (self.rng.gen::<f32>() < expected.fract()) as usize;
            self.particles.emit_embers(&zone.bounds, zone.intensity, expected.floor() as usize + extra);

            if zone.bounds.overlaps_circle(body.position, radius) {
                burn += fire::burn_damage(zone.intensity, dt, cfg.burn_rate);
            }
            if fire::tick_spread(zone, dt, cfg.spread_interval) {
                due.push((entity.id, zone.clone()));
            }
        }

        if burn > 0.0 {
            self.events.send(GameEvent::Burned { amount: burn });
            if body.health.damage(burn) {
                self.events.send(GameEvent::Died);
            }
        }

        for (from, zone) in due {
            if self.store.is_full() {
                break;
            }
            let fires = self.store.fires();
            let blockers = SpreadBlockers { obstacles, fires: &fires, grounds };
            let Some(bounds) = fire::spread_candidate(&zone, &blockers, &mut self.rng) else {
                continue;
            };
            if let Ok(to) = self.store.spawn(EntityKind::Fire(FireZone::new(bounds, SPREAD_START_INTENSITY))) {
                self.events.send(GameEvent::Spread { from, to });
            }
        }
    }

    /// Retardant particles inside a fire douse it and are used up
    fn douse_fires(&mut self, settings: &Settings) {
        let mut hits: Vec<(usize, EntityId)> = Vec::new();
        for (index, particle) in self.particles.alive() {
            if particle.kind != ParticleKind::Retardant {
                continue;
            }
            let hit = self.store.iter().find(|e| match &e.kind {
                EntityKind::Fire(zone) => zone.bounds.contains(particle.position),
                _ => false,
            });
            if let Some(entity) = hit {
                hits.push((index, entity.id));
            }
        }

        let mut out = Vec::new();
        for (index, id) in hits {
            self.particles.kill(index);
            if let Some(EntityKind::Fire(zone)) = self.store.get_mut(id).map(|e| &mut e.kind) {
                if fire::douse(zone, settings.fire.douse_per_particle) && !out.contains(&id) {
                    out.push(id);
                }
            }
        }

        for id in out {
            self.store.remove(id);
            self.events.send(GameEvent::Extinguished(id));
        }
    }
}

/// Where a fallen player reappears: the spawn point, or the middle of the
/// first ground tile if the spawn itself is off the ground
fn respawn_point(spawn: Vec2, grounds: &[Bounds]) -> Vec2 {
    if point_in_any(spawn, grounds) {
        return spawn;
    }
    grounds.first().map(|g| g.center()).unwrap_or(spawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::ExtinguisherBody;

    const DT: f32 = 1.0 / 60.0;

    fn world_with(kinds: Vec<EntityKind>) -> World {
        let mut store = EntityStore::new();
        for kind in kinds {
            store.spawn(kind).unwrap();
        }
        World::new(store, 42)
    }

    fn player(world: &World) -> &PlayerBody {
        world.store.player().unwrap().1
    }

    fn run(world: &mut World, controls: PlayerControls, frames: usize, settings: &Settings) {
        for _ in 0..frames {
            world.step(&controls, DT, settings, true);
        }
    }

    #[test]
    fn test_player_accelerates_toward_input() {
        let settings = Settings::default();
        let mut world = world_with(vec![EntityKind::Player(PlayerBody::at(vec2(200.0, 300.0)))]);
        let controls = PlayerControls { movement: vec2(1.0, 0.0), ..Default::default() };
        run(&mut world, controls, 60, &settings);
        let p = player(&world);
        assert!(p.position.x > 300.0);
        assert!(p.velocity.x <= settings.physics.max_speed + 1e-3);
        assert!(p.velocity.x > 0.9 * settings.physics.max_speed);
    }

    #[test]
    fn test_player_never_ends_inside_obstacle() {
        let settings = Settings::default();
        let wall = Bounds::new(400.0, 200.0, 100.0, 200.0);
        let mut world = world_with(vec![
            EntityKind::Player(PlayerBody::at(vec2(300.0, 300.0))),
            EntityKind::Obstacle(wall),
        ]);
        let controls = PlayerControls { movement: vec2(1.0, 0.0), ..Default::default() };
        for _ in 0..120 {
            world.step(&controls, DT, &settings, true);
            let p = player(&world);
            let d = wall.closest_point(p.position).distance(p.position);
            assert!(d >= settings.physics.player_radius - 1e-3);
        }
        assert!(player(&world).position.x < 400.0);
    }

    #[test]
    fn test_falling_off_ground_respawns() {
        let settings = Settings::default();
        let mut body = PlayerBody::at(vec2(50.0, 50.0));
        body.position = vec2(500.0, 500.0);
        let mut world = world_with(vec![
            EntityKind::Ground(Bounds::new(0.0, 0.0, 100.0, 100.0)),
            EntityKind::Player(body),
        ]);
        world.step(&PlayerControls::default(), DT, &settings, true);
        let p = player(&world);
        assert_eq!(p.position, vec2(50.0, 50.0));
        assert!(p.health.fraction() < 1.0);
        assert!(world.events.iter().any(|e| *e == GameEvent::Fell));
    }

    #[test]
    fn test_off_ground_spawn_falls_only_once() {
        let settings = Settings::default();
        let ground = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let mut world = world_with(vec![
            EntityKind::Ground(ground),
            EntityKind::Player(PlayerBody::at(vec2(500.0, 500.0))),
        ]);
        run(&mut world, PlayerControls::default(), 20, &settings);
        let p = player(&world);
        assert_eq!(p.position, ground.center());
        assert_eq!(world.events.iter().filter(|e| **e == GameEvent::Fell).count(), 1);
        assert_eq!(p.health.fraction(), 1.0 - settings.physics.fall_penalty);
        assert_eq!(world.outcome(), Outcome::Running);
    }

    #[test]
    fn test_no_falling_while_editing() {
        let settings = Settings::default();
        let mut world = world_with(vec![
            EntityKind::Ground(Bounds::new(0.0, 0.0, 100.0, 100.0)),
            EntityKind::Player(PlayerBody::at(vec2(500.0, 500.0))),
        ]);
        for _ in 0..20 {
            world.step(&PlayerControls::default(), DT, &settings, false);
        }
        let p = player(&world);
        assert_eq!(p.position, vec2(500.0, 500.0));
        assert_eq!(p.health.fraction(), 1.0);
        assert!(world.events.iter().all(|e| *e != GameEvent::Fell));
    }

    #[test]
    fn test_walking_over_extinguisher_picks_it_up_and_drop_releases() {
        let settings = Settings::default();
        let mut world = world_with(vec![
            EntityKind::Player(PlayerBody::at(vec2(100.0, 100.0))),
            EntityKind::Extinguisher(ExtinguisherBody::at(vec2(110.0, 100.0))),
        ]);
        world.step(&PlayerControls::default(), DT, &settings, true);
        let held = player(&world).holding;
        assert_eq!(held, Some(EntityId(1)));
        assert!(world.events.iter().any(|e| *e == GameEvent::PickedUp(EntityId(1))));

        let drop = PlayerControls { drop: true, ..Default::default() };
        world.step(&drop, DT, &settings, true);
        assert_eq!(player(&world).holding, None);
        // Cooldown keeps it from being grabbed straight back
        world.step(&PlayerControls::default(), DT, &settings, true);
        assert_eq!(player(&world).holding, None);
    }

    #[test]
    fn test_spraying_drains_charge_and_pushes_back() {
        let settings = Settings::default();
        let mut ext = ExtinguisherBody::at(vec2(100.0, 100.0));
        ext.held = true;
        let mut body = PlayerBody::at(vec2(100.0, 100.0));
        body.holding = Some(EntityId(1));
        let mut world = world_with(vec![EntityKind::Player(body), EntityKind::Extinguisher(ext)]);

        let controls = PlayerControls { spray_at: Some(vec2(300.0, 100.0)), ..Default::default() };
        run(&mut world, controls, 30, &settings);

        assert!(player(&world).position.x < 100.0, "recoil should push away from the aim");
        assert!(world.particles.alive().any(|(_, p)| p.kind == ParticleKind::Retardant));
        let Some(EntityKind::Extinguisher(ext)) = world.store.get(EntityId(1)).map(|e| &e.kind) else {
            panic!("extinguisher missing");
        };
        assert!(ext.charge.fraction() < 1.0);
    }

    #[test]
    fn test_spraying_puts_out_fire() {
        let mut settings = Settings::default();
        settings.fire.douse_per_particle = 0.2;
        settings.fire.growth_rate = 0.0;
        let mut ext = ExtinguisherBody::at(vec2(100.0, 100.0));
        ext.held = true;
        let mut body = PlayerBody::at(vec2(100.0, 100.0));
        body.holding = Some(EntityId(1));
        let mut world = world_with(vec![
            EntityKind::Player(body),
            EntityKind::Extinguisher(ext),
            EntityKind::Fire(FireZone::new(Bounds::new(160.0, 60.0, 120.0, 80.0), 0.5)),
        ]);
        assert_eq!(world.outcome(), Outcome::Running);

        let controls = PlayerControls { spray_at: Some(vec2(220.0, 100.0)), ..Default::default() };
        run(&mut world, controls, 120, &settings);

        assert_eq!(world.store.count_fires(), 0);
        assert!(world.events.iter().any(|e| matches!(e, GameEvent::Extinguished(EntityId(2)))));
        assert_eq!(world.outcome(), Outcome::Won);
    }

    #[test]
    fn test_standing_in_fire_burns_until_lost() {
        let mut settings = Settings::default();
        settings.fire.burn_rate = 5.0;
        let mut world = world_with(vec![
            EntityKind::Player(PlayerBody::at(vec2(100.0, 100.0))),
            EntityKind::Fire(FireZone::new(Bounds::new(80.0, 80.0, 40.0, 40.0), 1.0)),
        ]);
        run(&mut world, PlayerControls::default(), 60, &settings);
        let h = player(&world).health.fraction();
        assert_eq!(h, 0.0);
        assert_eq!(world.outcome(), Outcome::Lost);
        assert_eq!(world.events.iter().filter(|e| **e == GameEvent::Died).count(), 1);
    }

    #[test]
    fn test_hazards_paused_while_editing() {
        let settings = Settings::default();
        let mut world = world_with(vec![
            EntityKind::Player(PlayerBody::at(vec2(100.0, 100.0))),
            EntityKind::Fire(FireZone::new(Bounds::new(80.0, 80.0, 40.0, 40.0), 0.5)),
        ]);
        for _ in 0..60 {
            world.step(&PlayerControls::default(), DT, &settings, false);
        }
        assert_eq!(player(&world).health.fraction(), 1.0);
        let Some(EntityKind::Fire(zone)) = world.store.get(EntityId(1)).map(|e| &e.kind) else {
            panic!("fire missing");
        };
        assert_eq!(zone.intensity, 0.5);
    }

    #[test]
    fn test_full_fire_spreads_after_interval() {
        let mut settings = Settings::default();
        settings.fire.spread_interval = 0.5;
        let mut world = world_with(vec![
            EntityKind::Player(PlayerBody::at(vec2(600.0, 600.0))),
            EntityKind::Fire(FireZone::new(Bounds::new(100.0, 100.0, 40.0, 40.0), 1.0)),
        ]);
        run(&mut world, PlayerControls::default(), 40, &settings);
        assert_eq!(world.store.count_fires(), 2);
        assert!(world.events.iter().any(|e| matches!(e, GameEvent::Spread { from: EntityId(1), .. })));
    }

    #[test]
    fn test_spreading_stops_when_store_is_full() {
        let mut settings = Settings::default();
        settings.fire.spread_interval = 0.1;
        let mut store = EntityStore::with_capacity(2);
        store.spawn(EntityKind::Player(PlayerBody::at(vec2(600.0, 600.0)))).unwrap();
        store.spawn(EntityKind::Fire(FireZone::new(Bounds::new(100.0, 100.0, 40.0, 40.0), 1.0))).unwrap();
        let mut world = World::new(store, 7);

        run(&mut world, PlayerControls::default(), 120, &settings);
        assert_eq!(world.store.len(), 2);
        assert_eq!(world.store.count_fires(), 1);
        assert!(world.events.iter().all(|e| !matches!(e, GameEvent::Spread { .. })));
    }

    #[test]
    fn test_obstacles_box_in_a_fire() {
        let mut settings = Settings::default();
        settings.fire.spread_interval = 0.1;
        let fire = Bounds::new(100.0, 100.0, 40.0, 40.0);
        // Walls covering all four neighbouring tiles
        let walls = [
            Bounds::new(60.0, 100.0, 40.0, 40.0),
            Bounds::new(140.0, 100.0, 40.0, 40.0),
            Bounds::new(100.0, 60.0, 40.0, 40.0),
            Bounds::new(100.0, 140.0, 40.0, 40.0),
        ];
        let mut kinds = vec![
            EntityKind::Player(PlayerBody::at(vec2(600.0, 600.0))),
            EntityKind::Fire(FireZone::new(fire, 1.0)),
        ];
        kinds.extend(walls.iter().map(|w| EntityKind::Obstacle(*w)));
        let mut world = world_with(kinds);

        run(&mut world, PlayerControls::default(), 120, &settings);
        assert_eq!(world.store.count_fires(), 1);
        assert_eq!(world.store.fires(), vec![fire]);
    }

    #[test]
    fn test_controls_ignore_mouse_in_editor() {
        let mut input = FrameInput::default();
        input.mouse.left_down = true;
        input.drop = true;
        input.movement = vec2(1.0, 0.0);
        let c = PlayerControls::from_input(&input, true);
        assert!(c.spray_at.is_none());
        assert!(!c.drop);
        assert_eq!(c.movement, vec2(1.0, 0.0));
        let c = PlayerControls::from_input(&input, false);
        assert!(c.spray_at.is_some());
        assert!(c.drop);
    }
}
