#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shot lifecycle state machine for the bubble grid.
//!
//! [`MatchOrchestrator`] is the only component that mutates the world during
//! play. Each tick it reads the aim controller, predicts trajectories, moves
//! the projectile and, once the projectile arrives, attaches it, pops matching
//! groups and drops unsupported bubbles. Every grid mutation goes through
//! [`hexpop_world::apply`] and every resulting event is forwarded to the
//! caller.

mod config;
mod magazine;

pub use config::{GridConfig, ShooterConfig};
pub use magazine::Magazine;

use std::time::Duration;

use glam::Vec2;
use hexpop_core::{
    Aim, AimController, BubbleColor, CellCoord, CollisionQuery, Command, DiscardReason,
    EntityFactory, EntityHandle, Event, FireSignal, LayoutError, LevelLayout, Occupant, Phase,
    Plane,
};
use hexpop_system_connectivity::{floating, same_color_group};
use hexpop_system_placement::resolve_target;
use hexpop_system_trajectory::{simulate, Trajectory, TrajectorySettings};
use hexpop_world::{apply, query, World};
use tracing::{debug, info, warn};

/// External services the orchestrator talks to during a tick.
pub struct Collaborators<'a> {
    /// Source of aim direction and fire transitions.
    pub aim: &'a mut dyn AimController,
    /// Owner of every renderable entity.
    pub factory: &'a mut dyn EntityFactory,
    /// Ray casting against walls and settled bubbles.
    pub collision: &'a dyn CollisionQuery,
}

/// Latest aim prediction, exposed for renderers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AimPreview {
    /// Predicted path from the launcher.
    pub trajectory: Trajectory,
    /// Cell the shot would attach to, if any.
    pub target: Option<CellCoord>,
}

#[derive(Clone, Debug)]
struct AimSession {
    preview_entity: EntityHandle,
    held: Duration,
    aim: Option<Aim>,
    preview: AimPreview,
}

#[derive(Clone, Debug)]
struct Flight {
    projectile: EntityHandle,
    color: BubbleColor,
    path: Trajectory,
    travelled: f32,
    age: Duration,
    reservation: Option<CellCoord>,
}

/// Sequences aiming, flight, attachment, matching and support checks.
#[derive(Debug)]
pub struct MatchOrchestrator {
    config: ShooterConfig,
    settings: TrajectorySettings,
    magazine: Magazine,
    phase: Phase,
    session: Option<AimSession>,
    flight: Option<Flight>,
}

impl MatchOrchestrator {
    /// Creates an idle orchestrator whose magazine is seeded from the configuration.
    #[must_use]
    pub fn new(config: ShooterConfig) -> Self {
        Self::with_magazine(config, Magazine::loaded(config.magazine_seed))
    }

    /// Creates an idle orchestrator with an explicit magazine.
    #[must_use]
    pub fn with_magazine(config: ShooterConfig, magazine: Magazine) -> Self {
        Self {
            settings: config.trajectory_settings(),
            config,
            magazine,
            phase: Phase::Idle,
            session: None,
            flight: None,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Colors waiting in the launcher.
    #[must_use]
    pub const fn magazine(&self) -> &Magazine {
        &self.magazine
    }

    /// Latest aim preview while aiming.
    #[must_use]
    pub fn preview(&self) -> Option<&AimPreview> {
        self.session.as_ref().map(|session| &session.preview)
    }

    /// Entity of the projectile currently in flight.
    #[must_use]
    pub fn projectile(&self) -> Option<EntityHandle> {
        self.flight.as_ref().map(|flight| flight.projectile)
    }

    /// Advances the shot lifecycle by `dt`.
    pub fn tick(
        &mut self,
        world: &mut World,
        collaborators: &mut Collaborators<'_>,
        dt: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let signal = collaborators.aim.take_fire_signal();
        let aim = collaborators.aim.aim();

        match self.phase {
            Phase::Idle => {
                if signal == Some(FireSignal::Pressed) {
                    self.begin_aim(world, collaborators, aim, out_events);
                }
            }
            Phase::Aiming => {
                if let Some(session) = self.session.as_mut() {
                    session.held = session.held.saturating_add(dt);
                }
                if let Some(aim) = aim {
                    self.update_preview(world, collaborators, aim);
                }
                if signal == Some(FireSignal::Released) {
                    self.release(world, collaborators.factory, out_events);
                }
            }
            Phase::InFlight => self.advance_flight(world, collaborators.factory, dt, out_events),
            Phase::Resolving => {
                // Resolution completes within the tick that entered it.
                self.set_phase(Phase::Idle, out_events);
            }
        }
    }

    /// Destroys every entity the orchestrator or the grid refers to and returns to idle.
    pub fn reset(
        &mut self,
        world: &mut World,
        factory: &mut dyn EntityFactory,
        out_events: &mut Vec<Event>,
    ) {
        if let Some(session) = self.session.take() {
            factory.destroy(session.preview_entity);
        }
        if let Some(flight) = self.flight.take() {
            self.release_reservation(world, factory, &flight, out_events);
            factory.destroy(flight.projectile);
        }

        let start = submit(world, Command::ClearGrid, factory, out_events);
        for event in &out_events[start..] {
            if let Event::CellVacated { occupant, .. } = event {
                factory.destroy(occupant.handle);
            }
        }
        self.set_phase(Phase::Idle, out_events);
    }

    /// Replaces the grid with a level layout.
    ///
    /// The layout is validated before anything is touched, so a faulty level
    /// leaves the current grid intact. Bubbles whose color the factory cannot
    /// produce are skipped.
    pub fn load_level(
        &mut self,
        world: &mut World,
        level: &LevelLayout,
        grid: &GridConfig,
        factory: &mut dyn EntityFactory,
        out_events: &mut Vec<Event>,
    ) -> Result<(), LayoutError> {
        if let Err(error) = level.validate() {
            warn!(%error, "level layout rejected");
            return Err(error);
        }
        let layout = grid.layout_with_dimensions(level.columns, level.rows)?;

        self.reset(world, factory, out_events);
        let _ = submit(world, Command::ConfigureGrid { layout }, factory, out_events);

        for (cell, color) in level.bubbles() {
            let handle = match factory.create(color, layout.grid_to_world(cell)) {
                Ok(handle) => handle,
                Err(error) => {
                    warn!(
                        %error,
                        column = cell.column(),
                        row = cell.row(),
                        "skipping level bubble"
                    );
                    continue;
                }
            };
            let occupant = Occupant::settled(handle, color);
            let _ = submit(world, Command::Occupy { cell, occupant }, factory, out_events);
        }

        info!(
            columns = level.columns,
            rows = level.rows,
            bubbles = query::occupancy_view(world).settled_count(),
            "level loaded"
        );
        Ok(())
    }

    fn set_phase(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }
        debug!(from = ?self.phase, to = ?phase, "phase changed");
        self.phase = phase;
        out_events.push(Event::PhaseChanged { phase });
    }

    fn begin_aim(
        &mut self,
        world: &World,
        collaborators: &mut Collaborators<'_>,
        aim: Option<Aim>,
        out_events: &mut Vec<Event>,
    ) {
        let color = self.magazine.current();
        let position = aim.map_or(Vec2::ZERO, |aim| aim.origin);
        let preview_entity = match collaborators.factory.create(color, position) {
            Ok(handle) => handle,
            Err(error) => {
                warn!(%error, "cannot create aim preview");
                return;
            }
        };
        collaborators.factory.set_alpha(preview_entity, 0.0);

        self.session = Some(AimSession {
            preview_entity,
            held: Duration::ZERO,
            aim: None,
            preview: AimPreview::default(),
        });
        self.set_phase(Phase::Aiming, out_events);

        if let Some(aim) = aim {
            self.update_preview(world, collaborators, aim);
        }
    }

    fn update_preview(&mut self, world: &World, collaborators: &mut Collaborators<'_>, aim: Aim) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let trajectory = simulate(
            collaborators.collision,
            aim.origin,
            aim.direction,
            &self.settings,
        );
        session.aim = Some(aim);

        match trajectory.contact {
            Some(contact) => {
                let view = query::occupancy_view(world);
                if let Some(cell) = resolve_target(&view, contact.point, contact.direction) {
                    if session.preview.target != Some(cell) {
                        let position = view.layout().grid_to_world(cell);
                        collaborators
                            .factory
                            .set_position(session.preview_entity, position);
                    }
                    session.preview.target = Some(cell);
                    collaborators
                        .factory
                        .set_alpha(session.preview_entity, self.config.preview_alpha);
                }
            }
            None => {
                session.preview.target = None;
                collaborators.factory.set_alpha(session.preview_entity, 0.0);
            }
        }
        session.preview.trajectory = trajectory;
    }

    fn release(
        &mut self,
        world: &mut World,
        factory: &mut dyn EntityFactory,
        out_events: &mut Vec<Event>,
    ) {
        let Some(session) = self.session.take() else {
            self.set_phase(Phase::Idle, out_events);
            return;
        };
        factory.destroy(session.preview_entity);

        let Some(aim) = session.aim else {
            self.cancel(out_events);
            return;
        };
        if session.held < self.config.min_aim_hold() {
            debug!(held = ?session.held, "aim released too early");
            self.cancel(out_events);
            return;
        }

        let color = self.magazine.current();
        let projectile = match factory.create(color, aim.origin) {
            Ok(handle) => handle,
            Err(error) => {
                warn!(%error, "cannot create projectile");
                self.cancel(out_events);
                return;
            }
        };
        let _ = self.magazine.advance();

        let target = session.preview.target;
        let reservation = target.and_then(|cell| {
            let occupant = Occupant::pending(projectile, color);
            let start = submit(world, Command::Occupy { cell, occupant }, factory, out_events);
            out_events[start..]
                .iter()
                .any(|event| matches!(event, Event::CellOccupied { .. }))
                .then_some(cell)
        });

        self.flight = Some(Flight {
            projectile,
            color,
            path: session.preview.trajectory,
            travelled: 0.0,
            age: Duration::ZERO,
            reservation,
        });
        out_events.push(Event::ShotFired {
            projectile,
            color,
            target,
        });
        self.set_phase(Phase::InFlight, out_events);
    }

    fn cancel(&mut self, out_events: &mut Vec<Event>) {
        out_events.push(Event::AimCancelled);
        self.set_phase(Phase::Idle, out_events);
    }

    fn advance_flight(
        &mut self,
        world: &mut World,
        factory: &mut dyn EntityFactory,
        dt: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let Some(mut flight) = self.flight.take() else {
            self.set_phase(Phase::Idle, out_events);
            return;
        };

        flight.age = flight.age.saturating_add(dt);
        if flight.age > self.config.projectile_lifetime() {
            self.discard(world, factory, &flight, DiscardReason::Expired, out_events);
            self.set_phase(Phase::Idle, out_events);
            return;
        }

        let length = flight.path.length();
        let step = self.config.shot_speed * dt.as_secs_f32();
        flight.travelled = (flight.travelled + step).min(length);
        if let Some(position) = flight.path.point_at(flight.travelled) {
            factory.set_position(flight.projectile, position);
        }

        if flight.travelled >= length {
            self.resolve(world, factory, flight, out_events);
        } else {
            self.flight = Some(flight);
        }
    }

    fn resolve(
        &mut self,
        world: &mut World,
        factory: &mut dyn EntityFactory,
        flight: Flight,
        out_events: &mut Vec<Event>,
    ) {
        self.set_phase(Phase::Resolving, out_events);
        self.release_reservation(world, factory, &flight, out_events);

        let target = flight.path.contact.map(|contact| {
            let view = query::occupancy_view(world);
            resolve_target(&view, contact.point, contact.direction)
        });

        match target {
            Some(Some(cell)) => self.attach(world, factory, &flight, cell, out_events),
            Some(None) => {
                self.discard(world, factory, &flight, DiscardReason::NoFreeCell, out_events)
            }
            None => self.discard(world, factory, &flight, DiscardReason::NoContact, out_events),
        }

        self.set_phase(Phase::Idle, out_events);
    }

    fn attach(
        &mut self,
        world: &mut World,
        factory: &mut dyn EntityFactory,
        flight: &Flight,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        let layout = *query::layout(world);
        factory.set_position(flight.projectile, layout.grid_to_world(cell));

        let occupant = Occupant::settled(flight.projectile, flight.color);
        let start = submit(world, Command::Occupy { cell, occupant }, factory, out_events);
        let attached = out_events[start..]
            .iter()
            .any(|event| matches!(event, Event::CellOccupied { .. }));
        if !attached {
            self.discard(world, factory, flight, DiscardReason::NoFreeCell, out_events);
            return;
        }
        out_events.push(Event::BubbleAttached {
            cell,
            color: flight.color,
        });

        let group = same_color_group(&query::occupancy_view(world), cell, flight.color);
        if group.len() >= self.config.min_match {
            for &member in &group {
                if let Some(occupant) = vacate_settled(world, member, factory, out_events) {
                    factory.destroy(occupant.handle);
                }
            }
            info!(color = ?flight.color, count = group.len(), "cluster popped");
            out_events.push(Event::ClusterPopped {
                color: flight.color,
                cells: group,
            });
        }

        let falling = floating(&query::occupancy_view(world));
        if falling.is_empty() {
            return;
        }
        for &cell in &falling {
            if let Some(occupant) = vacate_settled(world, cell, factory, out_events) {
                let drop = Vec2::new(0.0, self.config.drop_distance);
                factory.animate_drop(occupant.handle, layout.grid_to_world(cell) - drop);
            }
        }
        info!(count = falling.len(), "unsupported bubbles dropped");
        out_events.push(Event::BubblesDropped { cells: falling });
    }

    fn discard(
        &mut self,
        world: &mut World,
        factory: &mut dyn EntityFactory,
        flight: &Flight,
        reason: DiscardReason,
        out_events: &mut Vec<Event>,
    ) {
        warn!(projectile = flight.projectile.get(), ?reason, "shot discarded");
        self.release_reservation(world, factory, flight, out_events);
        factory.destroy(flight.projectile);
        out_events.push(Event::ShotDiscarded {
            projectile: flight.projectile,
            reason,
        });
    }

    fn release_reservation(
        &self,
        world: &mut World,
        factory: &mut dyn EntityFactory,
        flight: &Flight,
        out_events: &mut Vec<Event>,
    ) {
        let Some(cell) = flight.reservation else {
            return;
        };
        let holds_reservation = query::occupant(world, cell, Plane::Pending)
            .is_some_and(|occupant| occupant.handle == flight.projectile);
        if holds_reservation {
            let _ = submit(
                world,
                Command::Vacate {
                    cell,
                    plane: Plane::Pending,
                },
                factory,
                out_events,
            );
        }
    }
}

// Applies a command, destroys displaced entities and returns the index of the first new event.
fn submit(
    world: &mut World,
    command: Command,
    factory: &mut dyn EntityFactory,
    out_events: &mut Vec<Event>,
) -> usize {
    let start = out_events.len();
    apply(world, command, out_events);
    for event in &out_events[start..] {
        if let Event::OccupantDisplaced { occupant, .. } = event {
            factory.destroy(occupant.handle);
        }
    }
    start
}

fn vacate_settled(
    world: &mut World,
    cell: CellCoord,
    factory: &mut dyn EntityFactory,
    out_events: &mut Vec<Event>,
) -> Option<Occupant> {
    let command = Command::Vacate {
        cell,
        plane: Plane::Settled,
    };
    let start = submit(world, command, factory, out_events);
    out_events[start..].iter().find_map(|event| match event {
        Event::CellVacated { occupant, .. } => Some(*occupant),
        _ => None,
    })
}
