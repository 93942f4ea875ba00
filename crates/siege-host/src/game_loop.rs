//! Game loop thread: runs the simulation engine at the nominal tick rate and
//! hands each snapshot to the presenter.
//!
//! The engine is created inside the thread so it never crosses a thread
//! boundary. Commands arrive over an `mpsc` channel; the latest snapshot is
//! also kept in shared state for polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use siege_core::commands::PlayerCommand;
use siege_core::constants::TICK_MICROS;
use siege_core::state::GameStateSnapshot;
use siege_sim::{SimConfig, SimulationEngine};

use crate::error::HostError;
use crate::presenter::Presenter;
use crate::state::{GameLoopCommand, GameLoopHandle};

/// Nominal duration of one tick.
pub const TICK_DURATION: Duration = Duration::from_micros(TICK_MICROS);

#[derive(Debug, Clone, Default)]
pub struct LoopOptions {
    /// Stop after this many ticks. `None` runs until shutdown.
    pub max_ticks: Option<u64>,
    /// Sleep to hold `TICK_DURATION` between ticks.
    pub realtime: bool,
    /// Queued before the first tick.
    pub initial_commands: Vec<PlayerCommand>,
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop<P>(
    config: SimConfig,
    options: LoopOptions,
    presenter: P,
) -> Result<GameLoopHandle<P>, HostError>
where
    P: Presenter + Send + 'static,
{
    config.validate()?;

    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_snapshot = Arc::new(Mutex::new(None));
    let shared = Arc::clone(&latest_snapshot);

    let thread = std::thread::Builder::new()
        .name("siege-game-loop".into())
        .spawn(move || run_game_loop(config, options, presenter, cmd_rx, &shared))
        .map_err(HostError::SpawnThread)?;

    Ok(GameLoopHandle::new(cmd_tx, latest_snapshot, thread))
}

/// The game loop. Runs until the tick limit, a Shutdown command or channel
/// disconnect, then returns the presenter.
fn run_game_loop<P: Presenter>(
    config: SimConfig,
    options: LoopOptions,
    mut presenter: P,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) -> P {
    tracing::info!(seed = config.seed, max_ticks = ?options.max_ticks, "game loop starting");
    let mut engine = SimulationEngine::new(config);
    engine.queue_commands(options.initial_commands);
    let mut next_tick_time = Instant::now();
    let mut ticks = 0u64;

    'frames: loop {
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }

        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => break 'frames,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break 'frames,
            }
        }

        // 2. Advance one tick
        let snapshot = engine.tick();
        ticks += 1;

        // 3. Present
        presenter.on_snapshot(&snapshot);

        // 4. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 5. Sleep until next tick
        if options.realtime {
            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > TICK_DURATION * 2 {
                // Too far behind, reset to avoid a catch-up spiral
                next_tick_time = now;
            }
        }
    }

    tracing::info!(ticks, phase = ?engine.phase(), "game loop stopped");
    presenter.on_stop();
    presenter
}
