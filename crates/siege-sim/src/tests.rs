//! Tests for the simulation engine, registry, weapons and damage pipeline.

mod tests {
    use glam::Vec3;
    use hecs::Entity;
    use proptest::prelude::*;

    use siege_core::commands::PlayerCommand;
    use siege_core::components::{Behavior, Ship};
    use siege_core::constants::*;
    use siege_core::enums::*;
    use siege_core::events::SimEvent;
    use siege_core::state::GameStateSnapshot;

    use crate::engine::{SimConfig, SimulationEngine};
    use crate::ledger::Ledger;
    use crate::registry::{handle_of, PoolCaps};
    use crate::schedule::{ActionQueue, ScheduledAction};
    use crate::systems::collision::in_beam_cone;
    use crate::systems::weapons::cooldown_factor;

    /// Manual doctrine and no timed spawns: only what a test stages exists.
    fn quiet_config() -> SimConfig {
        SimConfig {
            doctrine: Doctrine::Manual,
            solo_spawn_interval_secs: 1.0e6,
            formation_spawn_interval_secs: 1.0e6,
            ..Default::default()
        }
    }

    fn started(config: SimConfig) -> SimulationEngine {
        let mut engine = SimulationEngine::new(config);
        engine.queue_command(PlayerCommand::Start);
        engine.tick();
        engine
    }

    fn ship_state(engine: &SimulationEngine, entity: Entity) -> Option<Ship> {
        engine.registry().world().get::<&Ship>(entity).ok().map(|s| (*s).clone())
    }

    fn behavior_of(engine: &SimulationEngine, entity: Entity) -> Option<Behavior> {
        engine
            .registry()
            .world()
            .get::<&Behavior>(entity)
            .ok()
            .map(|b| *b)
    }

    fn alive(engine: &SimulationEngine, entity: Entity) -> bool {
        engine.registry().world().contains(entity)
    }

    fn assert_within_caps(snap: &GameStateSnapshot) {
        assert!(snap.ship_count as usize <= MAX_SHIPS, "ships over cap");
        assert!(snap.missile_count as usize <= MAX_MISSILES, "missiles over cap");
        assert!(snap.projectile_count as usize <= MAX_BEAMS, "projectiles over cap");
        assert!(snap.explosion_count as usize <= MAX_EXPLOSIONS, "explosions over cap");
        assert!(snap.formation_count as usize <= MAX_FORMATIONS, "formations over cap");
        let total = snap.ship_count + snap.missile_count + snap.projectile_count + snap.explosion_count;
        assert_eq!(
            snap.entities.len() as u32,
            total,
            "entity views should match pool counters"
        );
    }

    // ---- Determinism ----

    #[test]
    fn test_determinism_same_seed() {
        let mut engine_a = SimulationEngine::new(SimConfig {
            seed: 12345,
            ..Default::default()
        });
        let mut engine_b = SimulationEngine::new(SimConfig {
            seed: 12345,
            ..Default::default()
        });
        engine_a.queue_command(PlayerCommand::Start);
        engine_b.queue_command(PlayerCommand::Start);

        for _ in 0..900 {
            let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
            let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
            assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
        }
    }

    #[test]
    fn test_determinism_different_seeds() {
        let mut engine_a = started(SimConfig {
            seed: 111,
            ..Default::default()
        });
        let mut engine_b = started(SimConfig {
            seed: 222,
            ..Default::default()
        });

        let mut diverged = false;
        for _ in 0..400 {
            let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
            let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
            if json_a != json_b {
                diverged = true;
                break;
            }
        }
        assert!(diverged, "Different seeds should produce divergent output");
    }

    // ---- Phases ----

    #[test]
    fn test_idle_until_start() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        for _ in 0..300 {
            let snap = engine.tick();
            assert_eq!(snap.phase, SimPhase::Idle);
            assert_eq!(snap.ship_count, 0, "Nothing spawns before Start");
        }
        assert_eq!(engine.time().tick, 0, "Time should not advance while idle");
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut engine = started(SimConfig {
            doctrine: Doctrine::Manual,
            ..Default::default()
        });
        for _ in 0..200 {
            engine.tick();
        }

        engine.queue_command(PlayerCommand::Pause);
        let frozen = engine.tick();
        assert_eq!(frozen.phase, SimPhase::Paused);
        assert!(frozen.ship_count > 0, "Expected ships before pausing");
        let frozen_entities = serde_json::to_string(&frozen.entities).unwrap();

        for _ in 0..50 {
            let snap = engine.tick();
            assert_eq!(snap.time.tick, frozen.time.tick, "Time advanced while paused");
            assert_eq!(
                serde_json::to_string(&snap.entities).unwrap(),
                frozen_entities,
                "Entities moved while paused"
            );
            assert!(snap.events.is_empty(), "No events while paused");
        }

        engine.queue_command(PlayerCommand::Resume);
        let resumed = engine.tick();
        assert_eq!(resumed.phase, SimPhase::Running);
        assert_eq!(resumed.time.tick, frozen.time.tick + 1);
    }

    #[test]
    fn test_reset_tears_down_every_pool() {
        let mut engine = started(SimConfig {
            doctrine: Doctrine::Manual,
            ..Default::default()
        });
        let mut before = engine.tick();
        for _ in 0..600 {
            before = engine.tick();
        }
        assert!(!before.entities.is_empty(), "Expected live entities before reset");

        engine.queue_command(PlayerCommand::Reset);
        let snap = engine.tick();
        assert_eq!(snap.phase, SimPhase::Idle);
        assert_eq!(snap.time.tick, 0);
        assert_eq!(snap.ship_count + snap.missile_count + snap.projectile_count, 0);
        assert_eq!(snap.explosion_count, 0);
        assert_eq!(snap.formation_count, 0);
        assert!(snap.entities.is_empty());
        assert_eq!(snap.ledger.score, 0);
        assert_eq!(snap.ledger.health, snap.ledger.max_health);

        let removed = snap
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::Removed { .. }))
            .count();
        assert_eq!(
            removed,
            before.entities.len(),
            "Every live handle should get a removal event"
        );
    }

    #[test]
    fn test_reset_replays_same_siege() {
        let mut fresh = started(SimConfig::default());
        let mut replayed = started(SimConfig::default());
        for _ in 0..300 {
            replayed.tick();
        }
        replayed.queue_command(PlayerCommand::Reset);
        replayed.queue_command(PlayerCommand::Start);
        replayed.tick();

        for _ in 0..600 {
            let a = fresh.tick();
            let b = replayed.tick();
            assert_eq!(a.time.tick, b.time.tick);
            assert_eq!(a.ship_count, b.ship_count, "Ship counts diverged after reset");
            assert_eq!(a.ledger, b.ledger, "Ledger diverged after reset");
        }
    }

    // ---- Spawner & capacity ----

    #[test]
    fn test_solo_spawn_timer() {
        let mut engine = SimulationEngine::new(SimConfig {
            doctrine: Doctrine::Manual,
            formation_spawn_interval_secs: 1.0e6,
            ..Default::default()
        });
        engine.queue_command(PlayerCommand::Start);
        let mut snap = engine.tick();
        assert_eq!(snap.ship_count, 0, "No ship before the first interval");
        for _ in 1..260 {
            snap = engine.tick();
        }
        assert_eq!(snap.ship_count, 2, "One solo ship per 2 s interval");
    }

    #[test]
    fn test_ship_pool_saturates_at_capacity() {
        let mut engine = started(SimConfig {
            doctrine: Doctrine::Manual,
            solo_spawn_interval_secs: DT,
            formation_spawn_interval_secs: 1.0e6,
            ..Default::default()
        });
        let mut snap = engine.tick();
        for _ in 0..100 {
            snap = engine.tick();
            assert_within_caps(&snap);
        }
        assert_eq!(snap.ship_count as usize, MAX_SHIPS, "Pool should fill and stay full");
    }

    #[test]
    fn test_low_quality_caps_ships() {
        let mut engine = started(SimConfig {
            doctrine: Doctrine::Manual,
            solo_spawn_interval_secs: DT,
            formation_spawn_interval_secs: 0.5,
            ..Default::default()
        });
        engine.queue_command(PlayerCommand::SetQuality {
            quality: Quality::Low,
        });
        engine.tick();
        assert_eq!(
            engine.registry().caps(),
            PoolCaps::for_quality(Quality::Low),
            "SetQuality should swap the effective caps"
        );
        for _ in 0..200 {
            let snap = engine.tick();
            assert!(
                snap.ship_count as usize <= PoolCaps::for_quality(Quality::Low).ships,
                "Low quality should cap ships at {}",
                PoolCaps::for_quality(Quality::Low).ships
            );
            assert_eq!(snap.quality, Quality::Low);
        }
    }

    #[test]
    fn test_quality_caps_within_hard_limits() {
        for quality in [Quality::Low, Quality::Medium, Quality::High] {
            let caps = PoolCaps::for_quality(quality);
            assert!(caps.ships <= MAX_SHIPS);
            assert!(caps.missiles <= MAX_MISSILES);
            assert!(caps.beams <= MAX_BEAMS);
            assert!(caps.explosions <= MAX_EXPLOSIONS);
            assert!(caps.ships > FORMATION_RESERVED_SLOTS, "{quality:?} leaves no formation room");
        }
    }

    #[test]
    fn test_heavy_load_respects_caps() {
        let mut engine = started(SimConfig {
            solo_spawn_interval_secs: 0.05,
            formation_spawn_interval_secs: 0.5,
            ..Default::default()
        });
        for i in 0..1500 {
            if i % 20 == 0 {
                engine.queue_command(PlayerCommand::FireMissiles {
                    direction: Vec3::new(1.0, 0.2, (i as f32).sin()),
                    spread: MissileSpread::Cluster,
                });
            }
            let snap = engine.tick();
            assert_within_caps(&snap);
        }
    }

    #[test]
    fn test_formation_backpressure_near_capacity() {
        let mut engine = SimulationEngine::new(quiet_config());
        let park = |i: usize| {
            let angle = i as f32 * 0.15;
            Vec3::new(50.0 * angle.cos(), 10.0, 50.0 * angle.sin())
        };

        for i in 0..(MAX_SHIPS - 2) {
            engine
                .spawn_test_ship(ShipType::Fighter, park(i), Behavior::Default)
                .unwrap();
        }
        let formation = engine.spawn_test_formation(FormationArchetype::VFormation);
        assert!(formation.is_none(), "No room above the reserved margin");
        assert_eq!(engine.registry().counts().ships, MAX_SHIPS - 2);
        assert_eq!(engine.registry().formations().count(), 0, "Empty formation discarded");

        // Make room for exactly two members below the reserve.
        let victims: Vec<Entity> = engine
            .registry()
            .world()
            .query::<&Ship>()
            .iter()
            .map(|(e, _)| e)
            .take(4)
            .collect();
        for victim in victims {
            engine.registry_mut().despawn(victim).unwrap();
        }
        assert_eq!(engine.registry().counts().ships, MAX_SHIPS - 6);

        let id = engine
            .spawn_test_formation(FormationArchetype::VFormation)
            .expect("partial formation");
        let members = engine.registry().formation(id).unwrap().members.len();
        assert_eq!(members, 2, "Formation should be partial");
        assert_eq!(
            engine.registry().counts().ships,
            MAX_SHIPS - FORMATION_RESERVED_SLOTS
        );
    }

    #[test]
    fn test_formation_count_capped() {
        let mut engine = SimulationEngine::new(quiet_config());
        let mut created = 0;
        for _ in 0..(MAX_FORMATIONS + 3) {
            if engine
                .spawn_test_formation(FormationArchetype::BomberEscort)
                .is_some()
            {
                created += 1;
            }
        }
        assert!(created <= MAX_FORMATIONS);
        assert!(engine.registry().formations().count() <= MAX_FORMATIONS);
        assert!(engine.registry().counts().ships <= MAX_SHIPS);
    }

    // ---- Formations ----

    #[test]
    fn test_v_formation_spawns_five() {
        let mut engine = SimulationEngine::new(quiet_config());
        let id = engine
            .spawn_test_formation(FormationArchetype::VFormation)
            .expect("V formation");
        let formation = engine.registry().formation(id).unwrap();
        assert_eq!(formation.archetype, FormationArchetype::VFormation);
        assert_eq!(formation.members.len(), 5);
        let leaders = formation
            .members
            .iter()
            .filter(|m| m.role == FormationRole::Leader)
            .count();
        assert_eq!(leaders, 1);

        let snap = engine.tick();
        let spawned = snap
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::Spawned { .. }))
            .count();
        assert_eq!(spawned, 5, "One spawn event per member");
        assert!(snap.events.iter().any(|e| matches!(
            e,
            SimEvent::FormationSpawned { members: 5, archetype: FormationArchetype::VFormation, .. }
        )));
    }

    #[test]
    fn test_snapshot_lists_formations_with_creation_time() {
        let mut engine = started(SimConfig {
            doctrine: Doctrine::Manual,
            solo_spawn_interval_secs: 1.0e6,
            formation_spawn_interval_secs: 0.5,
            ..Default::default()
        });

        for _ in 0..60 {
            let spawned_at = engine.time().elapsed_secs;
            let snap = engine.tick();
            let Some((id, members)) = snap.events.iter().find_map(|e| match e {
                SimEvent::FormationSpawned { formation, members, .. } => Some((*formation, *members)),
                _ => None,
            }) else {
                continue;
            };

            let view = snap
                .formations
                .iter()
                .find(|f| f.id == id)
                .expect("New formation should be in the snapshot");
            assert_eq!(view.created_at_secs, spawned_at, "Creation time is the spawning tick's time");
            assert_eq!(view.members.len() as u32, members);
            for handle in &view.members {
                assert!(
                    snap.entities.iter().any(|e| e.handle == *handle),
                    "Formation members should be live entities"
                );
            }
            assert_eq!(snap.formations.len() as u32, snap.formation_count);
            return;
        }
        panic!("Expected a formation within 60 ticks");
    }

    #[test]
    fn test_pincer_groups_approach_from_opposite_sides() {
        let mut engine = SimulationEngine::new(quiet_config());
        let id = engine
            .spawn_test_formation(FormationArchetype::Pincer)
            .expect("pincer formation");
        let formation = engine.registry().formation(id).unwrap();
        assert_eq!(formation.members.len(), 2 * PINCER_GROUP_SIZE);

        let centroid = |group: u8| -> Vec3 {
            let positions: Vec<Vec3> = formation
                .members
                .iter()
                .filter(|m| m.role == FormationRole::PincerGroup(group))
                .map(|m| {
                    engine
                        .registry()
                        .world()
                        .get::<&siege_core::types::Transform>(m.entity)
                        .unwrap()
                        .position
                })
                .collect();
            positions.iter().copied().sum::<Vec3>() / positions.len() as f32
        };
        let a = centroid(0).normalize();
        let b = centroid(1).normalize();
        assert!(a.dot(b) < -0.99, "Groups should start on opposite sides");
    }

    #[test]
    fn test_pincer_member_cycles_in_engine() {
        let mut engine = started(quiet_config());
        let id = engine
            .spawn_test_formation(FormationArchetype::Pincer)
            .expect("pincer formation");
        let ship = engine.registry().formation(id).unwrap().members[0].entity;

        let phase_of = |b: Behavior| match b {
            Behavior::Pincer { phase, .. } => phase,
            other => panic!("Pincer ship changed behavior to {other:?}"),
        };
        let mut visits = vec![PincerPhase::Approach];
        for _ in 0..4000 {
            engine.tick();
            let phase = phase_of(behavior_of(&engine, ship).expect("pincer ship should survive"));
            if *visits.last().unwrap() != phase {
                visits.push(phase);
            }
        }
        assert!(visits.len() >= 5, "Expected at least one full cycle, got {visits:?}");
        for pair in visits.windows(2) {
            let expected = match pair[0] {
                PincerPhase::Approach => PincerPhase::Strafe,
                PincerPhase::Strafe => PincerPhase::Retreat,
                PincerPhase::Retreat => PincerPhase::Approach,
            };
            assert_eq!(pair[1], expected, "Phase skipped in {visits:?}");
        }
    }

    #[test]
    fn test_escorts_follow_bomber() {
        let mut engine = started(quiet_config());
        let id = engine
            .spawn_test_formation(FormationArchetype::BomberEscort)
            .expect("escort formation");
        let members = engine.registry().formation(id).unwrap().members.clone();
        let escorts = members
            .iter()
            .filter(|m| m.role == FormationRole::Escort)
            .count();
        assert!((ESCORT_MIN..=ESCORT_MAX).contains(&escorts));

        for _ in 0..100 {
            engine.tick();
        }
        let bomber = engine.registry().bomber_position(id).expect("bomber alive");
        for member in members.iter().filter(|m| m.role == FormationRole::Escort) {
            let position = engine
                .registry()
                .world()
                .get::<&siege_core::types::Transform>(member.entity)
                .unwrap()
                .position;
            let gap = position.distance(bomber);
            assert!(
                gap < ESCORT_ORBIT_RADIUS * 2.0,
                "Escort drifted {gap} from its bomber"
            );
        }
    }

    #[test]
    fn test_escort_release_is_one_way() {
        let mut engine = started(quiet_config());
        let id = engine
            .spawn_test_formation(FormationArchetype::BomberEscort)
            .expect("escort formation");
        let members = engine.registry().formation(id).unwrap().members.clone();
        let bomber = members
            .iter()
            .find(|m| m.role == FormationRole::Bomber)
            .unwrap()
            .entity;
        let escorts: Vec<(Entity, f32)> = members
            .iter()
            .filter(|m| m.role == FormationRole::Escort)
            .map(|m| (m.entity, ship_state(&engine, m.entity).unwrap().speed))
            .collect();

        engine.registry_mut().despawn(bomber).unwrap();

        for &(escort, speed) in &escorts {
            assert_eq!(behavior_of(&engine, escort), Some(Behavior::Default));
            let boosted = ship_state(&engine, escort).unwrap().speed;
            assert!((boosted - speed * ESCORT_RELEASE_SPEED_BOOST).abs() < 1e-4);
        }

        let snap = engine.tick();
        assert!(snap.events.iter().any(|e| matches!(
            e,
            SimEvent::EscortsReleased { count, .. } if *count as usize == escorts.len()
        )));

        for _ in 0..600 {
            engine.tick();
            for &(escort, _) in &escorts {
                if let Some(behavior) = behavior_of(&engine, escort) {
                    assert!(!behavior.is_escort(), "Released escort re-entered escort mode");
                }
            }
        }
    }

    // ---- Weapons ----

    #[test]
    fn test_cooldown_factors() {
        let strafing = Behavior::Pincer {
            phase: PincerPhase::Strafe,
            phase_elapsed_secs: 0.0,
        };
        let escort = Behavior::EscortProtect { orbit_angle: 0.0 };
        assert_eq!(cooldown_factor(Some(&strafing)), STRAFE_COOLDOWN_FACTOR);
        assert_eq!(cooldown_factor(Some(&escort)), ESCORT_COOLDOWN_FACTOR);
        assert_eq!(cooldown_factor(Some(&Behavior::Default)), 1.0);
        assert_eq!(cooldown_factor(None), 1.0);
    }

    #[test]
    fn test_rapid_burst_uses_scheduled_queue() {
        let mut engine = SimulationEngine::new(quiet_config());
        engine
            .spawn_test_ship(ShipType::Interceptor, Vec3::new(0.0, 0.0, -30.0), Behavior::Default)
            .unwrap();
        engine.queue_command(PlayerCommand::Start);
        let snap = engine.tick();
        assert_eq!(snap.projectile_count, 1, "First burst shot fires immediately");
        assert_eq!(engine.pending_actions(), 2, "Two follow-up shots queued");

        let mut snap = snap;
        for _ in 0..16 {
            snap = engine.tick();
        }
        assert_eq!(engine.pending_actions(), 0);
        assert_eq!(snap.projectile_count, RAPID_BURST_COUNT, "Full burst in flight");
    }

    #[test]
    fn test_plasma_charges_before_release() {
        let mut engine = SimulationEngine::new(quiet_config());
        engine
            .spawn_test_ship(ShipType::Bomber, Vec3::new(0.0, 0.0, -40.0), Behavior::Default)
            .unwrap();
        engine.queue_command(PlayerCommand::Start);
        let snap = engine.tick();
        assert_eq!(snap.projectile_count, 0, "Plasma is still charging");
        assert_eq!(engine.pending_actions(), 1);

        let mut snap = snap;
        for _ in 0..40 {
            snap = engine.tick();
        }
        assert_eq!(engine.pending_actions(), 0);
        assert_eq!(snap.projectile_count, 1, "Plasma bolt released after the charge");
    }

    #[test]
    fn test_scheduled_shot_from_dead_shooter_is_discarded() {
        let mut engine = SimulationEngine::new(quiet_config());
        let shooter = engine
            .spawn_test_ship(ShipType::Interceptor, Vec3::new(0.0, 0.0, -30.0), Behavior::Default)
            .unwrap();
        engine.queue_command(PlayerCommand::Start);
        engine.tick();
        engine.registry_mut().despawn(shooter).unwrap();

        let mut snap = engine.tick();
        for _ in 0..20 {
            snap = engine.tick();
        }
        assert_eq!(engine.pending_actions(), 0);
        assert_eq!(snap.projectile_count, 1, "Only the opening shot should exist");
    }

    #[test]
    fn test_action_queue_orders_by_due_tick_then_insertion() {
        let mut world = hecs::World::new();
        let a = world.spawn((1u8,));
        let b = world.spawn((2u8,));
        let mut queue = ActionQueue::new();
        queue.schedule(5, ScheduledAction::BurstShot { shooter: a });
        queue.schedule(3, ScheduledAction::PlasmaRelease { shooter: b });
        queue.schedule(3, ScheduledAction::BurstShot { shooter: b });

        assert!(queue.drain_due(2).is_empty());
        assert_eq!(
            queue.drain_due(4),
            vec![
                ScheduledAction::PlasmaRelease { shooter: b },
                ScheduledAction::BurstShot { shooter: b },
            ]
        );
        assert_eq!(queue.drain_due(10), vec![ScheduledAction::BurstShot { shooter: a }]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cluster_missiles_and_cooldown() {
        let mut engine = started(quiet_config());
        engine.queue_command(PlayerCommand::FireMissiles {
            direction: Vec3::X,
            spread: MissileSpread::Cluster,
        });
        let snap = engine.tick();
        assert_eq!(snap.missile_count as usize, CLUSTER_MISSILE_COUNT);

        engine.queue_command(PlayerCommand::FireMissiles {
            direction: Vec3::Z,
            spread: MissileSpread::Single,
        });
        let snap = engine.tick();
        assert_eq!(
            snap.missile_count as usize, CLUSTER_MISSILE_COUNT,
            "Launcher should still be cooling down"
        );

        for _ in 0..20 {
            engine.tick();
        }
        engine.queue_command(PlayerCommand::FireMissiles {
            direction: Vec3::Z,
            spread: MissileSpread::Single,
        });
        let snap = engine.tick();
        assert_eq!(snap.missile_count as usize, CLUSTER_MISSILE_COUNT + 1);
    }

    #[test]
    fn test_zero_direction_fire_is_noop() {
        let mut engine = started(quiet_config());
        engine.queue_command(PlayerCommand::FireMissiles {
            direction: Vec3::ZERO,
            spread: MissileSpread::Cluster,
        });
        engine.queue_command(PlayerCommand::FireBeam {
            direction: Vec3::ZERO,
        });
        let snap = engine.tick();
        assert_eq!(snap.missile_count, 0);
        assert!(snap.beam.is_none());
    }

    #[test]
    fn test_beam_expires_after_duration() {
        let mut engine = started(quiet_config());
        engine.queue_command(PlayerCommand::FireBeam { direction: Vec3::X });
        let snap = engine.tick();
        assert!(snap.beam.is_some());
        let ticks = (BEAM_DURATION_SECS / DT).ceil() as usize + 2;
        let mut snap = snap;
        for _ in 0..ticks {
            snap = engine.tick();
        }
        assert!(snap.beam.is_none(), "Beam should switch off after its duration");
    }

    // ---- Collision & damage ----

    #[test]
    fn test_ramming_costs_fixed_damage_once() {
        let mut engine = started(quiet_config());
        let ship = engine
            .spawn_test_ship(ShipType::Fighter, Vec3::new(0.0, 0.0, -7.0), Behavior::Default)
            .unwrap();
        let radius = DEFENDER_RADIUS + siege_ai::profiles::get_profile(ShipType::Fighter).radius;

        let mut collision_damage = 0.0f32;
        let mut weapon_damage = 0.0f32;
        let mut collision_events = 0;
        for _ in 0..40 {
            let snap = engine.tick();
            for event in &snap.events {
                if let SimEvent::DefenderHit { damage, source } = event {
                    match source {
                        DamageSource::Collision => {
                            collision_events += 1;
                            collision_damage += *damage;
                        }
                        DamageSource::Weapon(_) => weapon_damage += *damage,
                    }
                }
            }
            for view in &snap.entities {
                if matches!(view.kind, EntityKind::Ship { .. }) {
                    assert!(
                        view.transform.position.length() >= radius,
                        "Ship inside the defender survived the tick"
                    );
                }
            }
        }

        assert!(!alive(&engine, ship), "Rammer should be destroyed");
        assert_eq!(collision_events, 1, "Exactly one collision");
        assert_eq!(collision_damage, COLLISION_DAMAGE);
        assert_eq!(engine.ledger().collisions(), 1);
        assert_eq!(
            engine.ledger().health(),
            DEFENDER_MAX_HEALTH - COLLISION_DAMAGE - weapon_damage
        );
        assert_eq!(engine.ledger().score(), 0, "Penalty saturates at zero");
    }

    #[test]
    fn test_scoring_table_sums_to_600() {
        let mut engine = started(quiet_config());
        let targets = [
            (ShipType::Fighter, Vec3::X),
            (ShipType::Interceptor, Vec3::Z),
            (ShipType::Bomber, Vec3::NEG_X),
        ];
        let entities: Vec<(Entity, Vec3)> = targets
            .iter()
            .map(|&(ship_type, dir)| {
                let e = engine
                    .spawn_test_ship(ship_type, dir * 50.0, Behavior::Default)
                    .unwrap();
                (e, dir)
            })
            .collect();

        let mut rewards = 0u32;
        for tick in 0..1200 {
            if tick % 16 == 0 {
                if let Some(&(_, dir)) = entities.iter().find(|(e, _)| alive(&engine, *e)) {
                    engine.queue_command(PlayerCommand::FireMissiles {
                        direction: dir,
                        spread: MissileSpread::Single,
                    });
                }
            }
            let snap = engine.tick();
            for event in &snap.events {
                if let SimEvent::ShipDestroyed { reward, .. } = event {
                    rewards += *reward;
                }
            }
            if entities.iter().all(|(e, _)| !alive(&engine, *e)) {
                break;
            }
        }

        assert_eq!(engine.ledger().collisions(), 0, "No ship should reach the defender");
        assert_eq!(engine.ledger().kills(), 3);
        assert_eq!(engine.ledger().score(), 100 + 200 + 300);
        assert_eq!(rewards, 600);
    }

    #[test]
    fn test_missile_hit_flashes_and_sparks() {
        let mut engine = started(quiet_config());
        let bomber = engine
            .spawn_test_ship(ShipType::Bomber, Vec3::new(50.0, 0.0, 0.0), Behavior::Default)
            .unwrap();
        engine.queue_command(PlayerCommand::FireMissiles {
            direction: Vec3::X,
            spread: MissileSpread::Single,
        });

        let mut sparked = false;
        for _ in 0..120 {
            let snap = engine.tick();
            sparked |= snap.events.iter().any(|e| {
                matches!(
                    e,
                    SimEvent::Spawned {
                        kind: EntityKind::Explosion {
                            size: ExplosionSize::Spark
                        },
                        ..
                    }
                )
            });
            if sparked {
                let ship = ship_state(&engine, bomber).expect("bomber survives one missile");
                assert_eq!(ship.health, BOMBER_HEALTH - MISSILE_DAMAGE);
                assert!(ship.hit_flash_secs > 0.0, "Hit should flash the hull");
                let view = snap
                    .entities
                    .iter()
                    .find(|v| v.handle == handle_of(bomber))
                    .unwrap();
                assert!(view.hit_flash_secs > 0.0);
                break;
            }
        }
        assert!(sparked, "Missile never hit the bomber");
        assert_eq!(engine.ledger().score(), 0, "Non-lethal hits score nothing");
    }

    #[test]
    fn test_beam_cone_gating() {
        let mut engine = started(quiet_config());
        let at_cos = |c: f32, side: f32| Vec3::new(40.0 * c, 0.0, side * 40.0 * (1.0 - c * c).sqrt());
        let inside = engine
            .spawn_test_ship(ShipType::Bomber, at_cos(0.95, 1.0), Behavior::Default)
            .unwrap();
        let outside = engine
            .spawn_test_ship(ShipType::Bomber, at_cos(0.85, -1.0), Behavior::Default)
            .unwrap();
        engine.queue_command(PlayerCommand::FireBeam { direction: Vec3::X });

        for _ in 0..30 {
            engine.tick();
            assert_eq!(
                ship_state(&engine, outside).unwrap().health,
                BOMBER_HEALTH,
                "Ship outside the cone took beam damage"
            );
        }
        let burned = ship_state(&engine, inside).unwrap().health;
        assert!(burned < BOMBER_HEALTH, "Ship inside the cone should take damage");
    }

    #[test]
    fn test_beam_kill_scores_and_removes_in_same_tick() {
        let mut engine = started(quiet_config());
        let ship = engine
            .spawn_test_ship(ShipType::Fighter, Vec3::new(40.0, 0.0, 0.0), Behavior::Default)
            .unwrap();
        let handle = handle_of(ship);
        engine.queue_command(PlayerCommand::FireBeam { direction: Vec3::X });

        let mut kill_snapshot = None;
        for _ in 0..90 {
            let snap = engine.tick();
            let destroyed = snap.events.iter().any(|e| {
                matches!(e, SimEvent::ShipDestroyed { handle: h, ship_type: ShipType::Fighter, reward }
                    if *h == handle && *reward == FIGHTER_REWARD)
            });
            if destroyed {
                kill_snapshot = Some(snap);
                break;
            }
            assert_eq!(snap.ledger.score, 0, "No score before the kill");
        }

        let snap = kill_snapshot.expect("Beam should burn the fighter down within its duration");
        assert_eq!(snap.ledger.score, FIGHTER_REWARD, "Beam kill should score like any other");
        assert!(!alive(&engine, ship), "Killed ship should be gone in the kill tick");
        assert!(
            snap.entities.iter().all(|view| view.handle != handle),
            "Killed ship should not appear in the kill-tick snapshot"
        );
        assert!(
            snap.events
                .iter()
                .any(|e| matches!(e, SimEvent::Removed { handle: h, .. } if *h == handle)),
            "Kill tick should announce the removal"
        );
    }

    #[test]
    fn test_beam_cone_range_and_threshold() {
        assert!(in_beam_cone(Vec3::X, Vec3::new(30.0, 0.0, 0.0)));
        assert!(!in_beam_cone(Vec3::X, Vec3::new(BEAM_RANGE + 1.0, 0.0, 0.0)));
        assert!(!in_beam_cone(Vec3::X, Vec3::ZERO));
        let angle = BEAM_CONE_COS.acos();
        let edge_out = Vec3::new((angle + 0.01).cos(), 0.0, (angle + 0.01).sin()) * 20.0;
        let edge_in = Vec3::new((angle - 0.01).cos(), 0.0, (angle - 0.01).sin()) * 20.0;
        assert!(!in_beam_cone(Vec3::X, edge_out));
        assert!(in_beam_cone(Vec3::X, edge_in));
    }

    #[test]
    fn test_out_of_bounds_ship_despawned() {
        let mut engine = started(quiet_config());
        let ship = engine
            .spawn_test_ship(ShipType::Fighter, Vec3::new(0.0, 0.0, -120.0), Behavior::Default)
            .unwrap();
        let snap = engine.tick();
        assert!(!alive(&engine, ship));
        assert_eq!(snap.ship_count, 0);
        assert!(snap.events.iter().any(|e| matches!(e, SimEvent::Removed { .. })));
        assert_eq!(engine.ledger().score(), 0, "Leaving bounds is not a kill");
    }

    #[test]
    fn test_defender_defeat_stops_siege() {
        let mut engine = started(SimConfig {
            doctrine: Doctrine::Manual,
            solo_spawn_interval_secs: 0.1,
            formation_spawn_interval_secs: 1.0e6,
            defender_max_health: 1.0,
            ..Default::default()
        });

        let mut downs = 0;
        let mut snap = engine.tick();
        for _ in 0..3000 {
            snap = engine.tick();
            downs += snap
                .events
                .iter()
                .filter(|e| matches!(e, SimEvent::DefenderDown))
                .count();
            if snap.phase == SimPhase::Defeated {
                break;
            }
        }
        assert_eq!(snap.phase, SimPhase::Defeated, "Defender should fall");
        assert_eq!(downs, 1);
        assert_eq!(snap.ledger.health, 0.0);

        let ships_at_defeat = snap.ship_count;
        engine.queue_command(PlayerCommand::Start);
        engine.queue_command(PlayerCommand::FireMissiles {
            direction: Vec3::X,
            spread: MissileSpread::Cluster,
        });
        for _ in 0..200 {
            snap = engine.tick();
            assert_eq!(snap.phase, SimPhase::Defeated);
            assert!(snap.ship_count <= ships_at_defeat, "No spawns after defeat");
            assert_eq!(snap.missile_count, 0, "Fire commands ignored after defeat");
            assert_eq!(snap.ledger.health, 0.0, "Health never goes negative");
        }

        engine.queue_command(PlayerCommand::Reset);
        let snap = engine.tick();
        assert_eq!(snap.phase, SimPhase::Idle);
        assert_eq!(snap.ledger.health, 1.0);
    }

    #[test]
    fn test_auto_doctrine_kills_ships() {
        let mut engine = started(SimConfig {
            doctrine: Doctrine::Auto,
            ..quiet_config()
        });
        let ship = engine
            .spawn_test_ship(ShipType::Fighter, Vec3::new(0.0, 0.0, 45.0), Behavior::Default)
            .unwrap();
        for _ in 0..300 {
            engine.tick();
            if !alive(&engine, ship) {
                break;
            }
        }
        assert!(!alive(&engine, ship), "Auto doctrine should destroy the fighter");
        assert_eq!(engine.ledger().kills(), 1);
        assert_eq!(engine.ledger().score(), FIGHTER_REWARD);
    }

    #[test]
    fn test_manual_doctrine_holds_fire() {
        let mut engine = started(quiet_config());
        engine
            .spawn_test_ship(ShipType::Fighter, Vec3::new(0.0, 0.0, 45.0), Behavior::Default)
            .unwrap();
        for _ in 0..60 {
            let snap = engine.tick();
            assert_eq!(snap.missile_count, 0);
            assert!(snap.beam.is_none());
        }
    }

    // ---- Config & ledger ----

    #[test]
    fn test_config_validation() {
        assert!(SimConfig::default().validate().is_ok());
        let bad = SimConfig {
            solo_spawn_interval_secs: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = SimConfig {
            defender_max_health: f32::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "seed": 7, "quality": "Low" }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.quality, Quality::Low);
        assert_eq!(config.doctrine, Doctrine::Auto);
        assert_eq!(config.solo_spawn_interval_secs, SOLO_SPAWN_INTERVAL_SECS);
    }

    #[test]
    fn test_ledger_collision_penalty_and_rewards() {
        let mut ledger = Ledger::new(DEFENDER_MAX_HEALTH);
        assert_eq!(ledger.award_kill(ShipType::Bomber), BOMBER_REWARD);
        assert_eq!(ledger.record_collision(), COLLISION_DAMAGE);
        assert_eq!(ledger.score(), BOMBER_REWARD - COLLISION_SCORE_PENALTY);
        assert_eq!(ledger.health(), DEFENDER_MAX_HEALTH - COLLISION_DAMAGE);
    }

    fn command_strategy() -> impl Strategy<Value = PlayerCommand> {
        let direction = (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z));
        prop_oneof![
            Just(PlayerCommand::Start),
            Just(PlayerCommand::Pause),
            Just(PlayerCommand::Resume),
            Just(PlayerCommand::Reset),
            (direction.clone(), any::<bool>()).prop_map(|(direction, cluster)| {
                PlayerCommand::FireMissiles {
                    direction,
                    spread: if cluster {
                        MissileSpread::Cluster
                    } else {
                        MissileSpread::Single
                    },
                }
            }),
            direction.prop_map(|direction| PlayerCommand::FireBeam { direction }),
            prop_oneof![Just(Quality::Low), Just(Quality::Medium), Just(Quality::High)]
                .prop_map(|quality| PlayerCommand::SetQuality { quality }),
            prop_oneof![Just(Doctrine::Manual), Just(Doctrine::Auto)]
                .prop_map(|doctrine| PlayerCommand::SetDoctrine { doctrine }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_pools_within_capacity(
            seed in any::<u64>(),
            commands in prop::collection::vec((0u64..400, command_strategy()), 0..40),
        ) {
            let mut engine = started(SimConfig {
                seed,
                solo_spawn_interval_secs: 0.05,
                formation_spawn_interval_secs: 1.0,
                ..Default::default()
            });
            for tick in 0..400u64 {
                for (_, command) in commands.iter().filter(|(at, _)| *at == tick) {
                    engine.queue_command(command.clone());
                }
                let snap = engine.tick();
                let caps = PoolCaps::for_quality(snap.quality);
                prop_assert!(snap.ship_count as usize <= MAX_SHIPS);
                prop_assert!(snap.missile_count as usize <= MAX_MISSILES);
                prop_assert!(snap.projectile_count as usize <= MAX_BEAMS);
                prop_assert!(snap.explosion_count as usize <= MAX_EXPLOSIONS);
                prop_assert!(snap.formation_count as usize <= MAX_FORMATIONS);
                prop_assert!(snap.ledger.health >= 0.0 && snap.ledger.health <= snap.ledger.max_health);
                // Quality only limits new spawns, so the strict check holds
                // while the cap has not been lowered under a full pool.
                if snap.quality == Quality::High {
                    prop_assert!(snap.ship_count as usize <= caps.ships);
                }
                for view in snap.entities.iter().filter(|v| matches!(v.kind, EntityKind::Ship { .. })) {
                    prop_assert!(view.transform.position.length() <= DESPAWN_RADIUS + 1.0);
                }
            }
        }

        #[test]
        fn prop_ledger_health_clamped_and_monotonic(
            hits in prop::collection::vec(-20.0f32..40.0, 0..60),
        ) {
            let mut ledger = Ledger::new(DEFENDER_MAX_HEALTH);
            let mut previous = ledger.health();
            for hit in hits {
                let taken = ledger.damage_defender(hit);
                prop_assert!(taken >= 0.0);
                prop_assert!(ledger.health() >= 0.0);
                prop_assert!(ledger.health() <= previous, "health increased");
                previous = ledger.health();
            }
        }

        #[test]
        fn prop_beam_never_hits_outside_cone(
            x in -70.0f32..70.0, y in -70.0f32..70.0, z in -70.0f32..70.0,
        ) {
            let offset = Vec3::new(x, y, z);
            if in_beam_cone(Vec3::Z, offset) {
                prop_assert!(offset.normalize().dot(Vec3::Z) > BEAM_CONE_COS);
                prop_assert!(offset.length() <= BEAM_RANGE);
            }
        }
    }
}
