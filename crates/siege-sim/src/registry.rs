//! Entity registry: the hecs world plus capacity bookkeeping.
//!
//! Every spawn and despawn goes through here so pool counters, the
//! formation index and presentation events stay consistent. hecs gives
//! generational handles over reusable slots, so removing several entities
//! in one tick never invalidates the others.

use std::collections::BTreeMap;

use glam::Vec3;
use hecs::{Entity, World};

use siege_core::components::*;
use siege_core::constants::*;
use siege_core::enums::*;
use siege_core::error::{Result, SimError};
use siege_core::events::SimEvent;
use siege_core::types::{EntityHandle, FormationId, ShipId, Transform, Velocity};

use siege_ai::fsm::release_escort;
use siege_ai::profiles::get_profile;

/// Presentation handle for a hecs entity.
pub fn handle_of(entity: Entity) -> EntityHandle {
    EntityHandle(entity.to_bits().get())
}

/// Effective pool caps. Always at or below the hard `MAX_*` capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCaps {
    pub ships: usize,
    pub missiles: usize,
    pub beams: usize,
    pub explosions: usize,
}

impl PoolCaps {
    pub fn for_quality(quality: Quality) -> Self {
        let (ships, explosions) = match quality {
            Quality::Low => (16, 16),
            Quality::Medium => (28, 32),
            Quality::High => (MAX_SHIPS, MAX_EXPLOSIONS),
        };
        Self {
            ships: ships.min(MAX_SHIPS),
            missiles: MAX_MISSILES,
            beams: MAX_BEAMS,
            explosions: explosions.min(MAX_EXPLOSIONS),
        }
    }
}

/// Live entity counts per pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolCounts {
    pub ships: usize,
    pub missiles: usize,
    pub beams: usize,
    pub explosions: usize,
}

/// One member slot of a formation.
#[derive(Debug, Clone, Copy)]
pub struct FormationSlot {
    pub ship: ShipId,
    pub entity: Entity,
    pub role: FormationRole,
}

/// A formation and its current members.
#[derive(Debug, Clone)]
pub struct Formation {
    pub id: FormationId,
    pub archetype: FormationArchetype,
    pub created_at_secs: f64,
    pub members: Vec<FormationSlot>,
}

/// Everything needed to place a new ship.
#[derive(Debug, Clone, Copy)]
pub struct ShipSpawn {
    pub ship_type: ShipType,
    pub position: Vec3,
    pub speed: f32,
    pub behavior: Behavior,
    pub membership: Option<FormationMember>,
}

pub struct Registry {
    world: World,
    formations: BTreeMap<FormationId, Formation>,
    counts: PoolCounts,
    caps: PoolCaps,
    next_ship_id: u32,
    next_formation_id: u32,
    events: Vec<SimEvent>,
}

impl Registry {
    pub fn new(quality: Quality) -> Self {
        Self {
            world: World::new(),
            formations: BTreeMap::new(),
            counts: PoolCounts::default(),
            caps: PoolCaps::for_quality(quality),
            next_ship_id: 0,
            next_formation_id: 0,
            events: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for systems that update components in place.
    /// Spawning or despawning must go through the registry instead.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn counts(&self) -> PoolCounts {
        self.counts
    }

    pub fn caps(&self) -> PoolCaps {
        self.caps
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.caps = PoolCaps::for_quality(quality);
    }

    pub fn formations(&self) -> impl Iterator<Item = &Formation> {
        self.formations.values()
    }

    pub fn formation(&self, id: FormationId) -> Option<&Formation> {
        self.formations.get(&id)
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether a formation constructor may still add a ship.
    pub fn formation_has_room(&self) -> bool {
        self.counts.ships < self.caps.ships.saturating_sub(FORMATION_RESERVED_SLOTS)
    }

    /// Current position of a formation's bomber, if it is still alive.
    pub fn bomber_position(&self, formation: FormationId) -> Option<Vec3> {
        let slot = self
            .formations
            .get(&formation)?
            .members
            .iter()
            .find(|slot| slot.role == FormationRole::Bomber)?;
        self.world
            .get::<&Transform>(slot.entity)
            .ok()
            .map(|t| t.position)
    }

    // --- Spawning ---

    /// Open a new (empty) formation record.
    pub fn create_formation(
        &mut self,
        archetype: FormationArchetype,
        now_secs: f64,
    ) -> Result<FormationId> {
        if self.formations.len() >= MAX_FORMATIONS {
            return Err(SimError::PoolFull {
                pool: Pool::Formations,
                capacity: MAX_FORMATIONS,
            });
        }
        let id = FormationId(self.next_formation_id);
        self.next_formation_id += 1;
        self.formations.insert(
            id,
            Formation {
                id,
                archetype,
                created_at_secs: now_secs,
                members: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Drop a formation record that ended up with no members.
    pub fn discard_if_empty(&mut self, id: FormationId) {
        if self
            .formations
            .get(&id)
            .is_some_and(|f| f.members.is_empty())
        {
            self.formations.remove(&id);
        }
    }

    pub fn spawn_ship(&mut self, spawn: ShipSpawn) -> Result<Entity> {
        if self.counts.ships >= self.caps.ships {
            return Err(SimError::PoolFull {
                pool: Pool::Ships,
                capacity: self.caps.ships,
            });
        }

        let profile = get_profile(spawn.ship_type);
        let id = ShipId(self.next_ship_id);
        self.next_ship_id += 1;

        let transform = Transform::facing_origin(spawn.position);
        let velocity = Velocity(transform.facing * spawn.speed);
        let kind = EntityKind::Ship {
            ship_type: spawn.ship_type,
        };
        let ship = Ship {
            id,
            ship_type: spawn.ship_type,
            health: profile.health,
            max_health: profile.health,
            speed: spawn.speed,
            last_fire_secs: None,
            hit_flash_secs: 0.0,
        };

        let entity = self
            .world
            .spawn((kind, transform, velocity, ship, spawn.behavior));

        if let Some(member) = spawn.membership {
            self.world.insert_one(entity, member).ok();
            if let Some(formation) = self.formations.get_mut(&member.formation) {
                formation.members.push(FormationSlot {
                    ship: id,
                    entity,
                    role: member.role,
                });
            }
        }

        self.counts.ships += 1;
        self.announce(entity, kind, transform);
        Ok(entity)
    }

    pub fn spawn_missile(&mut self, position: Vec3, velocity: Vec3) -> Result<Entity> {
        if self.counts.missiles >= self.caps.missiles {
            return Err(SimError::PoolFull {
                pool: Pool::Missiles,
                capacity: self.caps.missiles,
            });
        }
        let transform = Transform::new(position, velocity);
        let missile = Missile {
            age_secs: 0.0,
            max_age_secs: MISSILE_TTL_SECS,
            damage: MISSILE_DAMAGE,
        };
        let kind = EntityKind::Missile;
        let entity = self
            .world
            .spawn((kind, transform, Velocity(velocity), missile));
        self.counts.missiles += 1;
        self.announce(entity, kind, transform);
        Ok(entity)
    }

    pub fn spawn_projectile(
        &mut self,
        weapon: WeaponKind,
        damage: f32,
        ttl_secs: f32,
        position: Vec3,
        velocity: Vec3,
    ) -> Result<Entity> {
        if self.counts.beams >= self.caps.beams {
            return Err(SimError::PoolFull {
                pool: Pool::Beams,
                capacity: self.caps.beams,
            });
        }
        let transform = Transform::new(position, velocity);
        let projectile = Projectile {
            weapon,
            damage,
            age_secs: 0.0,
            ttl_secs,
        };
        let kind = EntityKind::Projectile { weapon };
        let entity = self
            .world
            .spawn((kind, transform, Velocity(velocity), projectile));
        self.counts.beams += 1;
        self.announce(entity, kind, transform);
        Ok(entity)
    }

    pub fn spawn_explosion(&mut self, size: ExplosionSize, position: Vec3) -> Result<Entity> {
        if self.counts.explosions >= self.caps.explosions {
            return Err(SimError::PoolFull {
                pool: Pool::Explosions,
                capacity: self.caps.explosions,
            });
        }
        let (ttl_secs, scale) = match size {
            ExplosionSize::Spark => (SPARK_TTL_SECS, SPARK_SIZE),
            ExplosionSize::Small => (SMALL_EXPLOSION_TTL_SECS, SMALL_EXPLOSION_SIZE),
            ExplosionSize::Large => (LARGE_EXPLOSION_TTL_SECS, LARGE_EXPLOSION_SIZE),
        };
        let transform = Transform::facing_origin(position);
        let kind = EntityKind::Explosion { size };
        let entity = self.world.spawn((
            kind,
            transform,
            Explosion {
                size,
                scale,
                ttl_secs,
            },
        ));
        self.counts.explosions += 1;
        self.announce(entity, kind, transform);
        Ok(entity)
    }

    fn announce(&mut self, entity: Entity, kind: EntityKind, transform: Transform) {
        self.events.push(SimEvent::Spawned {
            handle: handle_of(entity),
            kind,
            transform,
        });
    }

    // --- Removal ---

    /// Remove an entity from every pool and index. Despawning a stale or
    /// already-removed handle is a no-op returning `EntityNotFound`.
    pub fn despawn(&mut self, entity: Entity) -> Result<()> {
        let kind = match self.world.get::<&EntityKind>(entity) {
            Ok(kind) => *kind,
            Err(_) => return Err(SimError::EntityNotFound(handle_of(entity).0)),
        };
        let membership = self.world.get::<&FormationMember>(entity).ok().map(|m| *m);

        self.world
            .despawn(entity)
            .map_err(|_| SimError::EntityNotFound(handle_of(entity).0))?;

        match kind {
            EntityKind::Ship { .. } => self.counts.ships -= 1,
            EntityKind::Missile => self.counts.missiles -= 1,
            EntityKind::Projectile { .. } => self.counts.beams -= 1,
            EntityKind::Explosion { .. } => self.counts.explosions -= 1,
        }
        self.events.push(SimEvent::Removed {
            handle: handle_of(entity),
            kind,
        });

        if let Some(member) = membership {
            self.leave_formation(entity, member);
        }
        Ok(())
    }

    fn leave_formation(&mut self, entity: Entity, member: FormationMember) {
        let Some(formation) = self.formations.get_mut(&member.formation) else {
            return;
        };
        formation.members.retain(|slot| slot.entity != entity);

        if member.role == FormationRole::Bomber {
            let escorts: Vec<Entity> = formation
                .members
                .iter()
                .filter(|slot| slot.role == FormationRole::Escort)
                .map(|slot| slot.entity)
                .collect();
            let mut released = 0u32;
            for escort in escorts {
                let query = self
                    .world
                    .query_one_mut::<(&mut Behavior, &mut Ship)>(escort);
                if let Ok((behavior, ship)) = query {
                    if behavior.is_escort() {
                        let (next, speed) = release_escort(*behavior, ship.speed);
                        *behavior = next;
                        ship.speed = speed;
                        released += 1;
                    }
                }
            }
            if released > 0 {
                tracing::debug!(formation = member.formation.0, released, "escorts released");
                self.events.push(SimEvent::EscortsReleased {
                    formation: member.formation,
                    count: released,
                });
            }
        }

        if formation.members.is_empty() {
            self.formations.remove(&member.formation);
        }
    }

    /// Full teardown: remove every entity (announcing each removal) and
    /// forget all formations. Id counters keep running so handles stay unique.
    pub fn clear(&mut self) {
        let mut live: Vec<(Entity, EntityKind)> = self
            .world
            .query::<&EntityKind>()
            .iter()
            .map(|(entity, kind)| (entity, *kind))
            .collect();
        live.sort_by_key(|(entity, _)| handle_of(*entity));
        for (entity, kind) in live {
            self.events.push(SimEvent::Removed {
                handle: handle_of(entity),
                kind,
            });
        }
        self.world.clear();
        self.formations.clear();
        self.counts = PoolCounts::default();
    }
}
