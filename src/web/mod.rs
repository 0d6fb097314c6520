//! Optional HTTP boundary around a running simulation.
//!
//! The simulation runs on a blocking thread and publishes a frame after every
//! tick. Placement and demolition requests are queued and applied by that
//! thread between ticks; each request waits for its own reply.

use std::{
    collections::VecDeque,
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc, oneshot},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    building::{BuildingId, BuildingKind},
    engine::{EngineBuilder, EngineSettings, TICK_SECS},
    scenario::Scenario,
    spatial::TilePos,
    world::{PlacementError, World, WorldSnapshot},
};

/// Frames kept for `/api/frames`; older ones are dropped.
const MAX_FRAMES: usize = 600;

#[derive(Clone, Serialize)]
pub struct UiFrame {
    pub snapshot: WorldSnapshot,
    pub completed: bool,
}

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub total_ticks: u64,
    pub frame: Option<UiFrame>,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlaceRequest {
    pub kind: BuildingKind,
    pub col: u32,
    pub row: u32,
}

#[derive(Debug, Clone, Copy)]
pub enum Command {
    Place(PlaceRequest),
    Demolish { col: u32, row: u32 },
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandDone {
    Placed { building: BuildingId, kind: BuildingKind },
    Demolished { kind: BuildingKind },
}

struct QueuedCommand {
    command: Command,
    reply: oneshot::Sender<Result<CommandDone, PlacementError>>,
}

/// Applies one queued command to the world.
pub fn apply_command(world: &mut World, command: Command) -> Result<CommandDone, PlacementError> {
    match command {
        Command::Place(PlaceRequest { kind, col, row }) => world
            .place_building(TilePos::new(col, row), kind)
            .map(|building| CommandDone::Placed { building, kind }),
        Command::Demolish { col, row } => world
            .demolish(TilePos::new(col, row))
            .map(|kind| CommandDone::Demolished { kind }),
    }
}

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    commands: mpsc::UnboundedSender<QueuedCommand>,
    latest_frame: Arc<Mutex<Option<UiFrame>>>,
    frames: Arc<Mutex<VecDeque<UiFrame>>>,
    total_ticks: u64,
    scenario_name: String,
    simulation_done: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub ticks: u64,
    pub snapshot_interval: u64,
    pub snapshot_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Wall-clock pause between ticks. Zero runs as fast as possible.
    pub tick_millis: u64,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        ticks,
        snapshot_interval,
        snapshot_dir,
        host,
        port,
        tick_millis,
    } = config;

    let scenario_name = scenario.name.clone();
    let mut world = scenario.build_world()?;
    let settings = EngineSettings {
        scenario_name: scenario_name.clone(),
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };
    let mut engine = EngineBuilder::new(settings).with_standard_systems().build();

    let (tx, _) = broadcast::channel::<String>(512);
    let (command_tx, mut command_rx) = mpsc::unbounded_channel::<QueuedCommand>();
    let latest_frame: Arc<Mutex<Option<UiFrame>>> = Arc::new(Mutex::new(None));
    let frames: Arc<Mutex<VecDeque<UiFrame>>> = Arc::new(Mutex::new(VecDeque::new()));
    let simulation_done = Arc::new(AtomicBool::new(false));

    let latest_for_sim = latest_frame.clone();
    let frames_for_sim = frames.clone();
    let done_for_sim = simulation_done.clone();
    let tx_for_sim = tx.clone();
    let scenario_label = scenario_name.clone();

    let publish = move |frame: UiFrame| {
        *locked(&latest_for_sim) = Some(frame.clone());
        {
            let mut guard = locked(&frames_for_sim);
            if frame.completed {
                guard.pop_back();
            }
            guard.push_back(frame.clone());
            while guard.len() > MAX_FRAMES {
                guard.pop_front();
            }
        }
        if let Ok(payload) = serde_json::to_string(&frame) {
            let _ = tx_for_sim.send(payload);
        }
    };

    let sim_handle = tokio::task::spawn_blocking(move || -> Result<()> {
        for _ in 0..ticks {
            while let Ok(queued) = command_rx.try_recv() {
                let result = apply_command(&mut world, queued.command);
                if let Err(err) = &result {
                    warn!(%err, "command rejected");
                }
                let _ = queued.reply.send(result);
            }
            engine.advance(&mut world, TICK_SECS)?;
            publish(UiFrame {
                snapshot: world.snapshot(engine.scenario_name()),
                completed: false,
            });
            if tick_millis > 0 {
                std::thread::sleep(Duration::from_millis(tick_millis));
            }
        }
        done_for_sim.store(true, Ordering::SeqCst);
        publish(UiFrame {
            snapshot: world.snapshot(engine.scenario_name()),
            completed: true,
        });
        Ok(())
    });

    let state = Arc::new(AppState {
        broadcaster: tx.clone(),
        commands: command_tx,
        latest_frame,
        frames,
        total_ticks: ticks,
        scenario_name: scenario_label.clone(),
        simulation_done,
    });

    tokio::spawn(async move {
        match sim_handle.await {
            Ok(Ok(())) => info!(scenario = %scenario_label, "simulation completed"),
            Ok(Err(err)) => error!(?err, "simulation error"),
            Err(err) => error!(?err, "simulation task failed"),
        }
    });

    let router = Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/frames", get(all_frames))
        .route("/api/events", get(stream_events))
        .route("/api/buildings", post(place_building))
        .route("/api/buildings/:col/:row", delete(demolish_building))
        .with_state(state);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, scenario = %scenario_name, "web api listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down web api");
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let frame = locked(&state.latest_frame).clone();
    Json(StateEnvelope {
        scenario: state.scenario_name.clone(),
        total_ticks: state.total_ticks,
        frame,
        completed: state.simulation_done.load(Ordering::SeqCst),
    })
}

#[derive(Serialize)]
struct FramesResponse {
    scenario: String,
    total_ticks: u64,
    completed: bool,
    frames: Vec<UiFrame>,
}

async fn all_frames(State(state): State<Arc<AppState>>) -> Json<FramesResponse> {
    let frames = locked(&state.frames).iter().cloned().collect();
    Json(FramesResponse {
        scenario: state.scenario_name.clone(),
        total_ticks: state.total_ticks,
        completed: state.simulation_done.load(Ordering::SeqCst),
        frames,
    })
}

async fn stream_events(State(state): State<Arc<AppState>>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(2)).text("keep-alive"))
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

async fn submit(state: &AppState, command: Command) -> Response {
    let (reply, outcome) = oneshot::channel();
    if state.commands.send(QueuedCommand { command, reply }).is_err() {
        return finished();
    }
    match outcome.await {
        Ok(Ok(done)) => (StatusCode::OK, Json(done)).into_response(),
        Ok(Err(err)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                error: err.to_string(),
            }),
        )
            .into_response(),
        Err(_) => finished(),
    }
}

fn finished() -> Response {
    (
        StatusCode::CONFLICT,
        Json(ErrorBody {
            error: "simulation has finished".into(),
        }),
    )
        .into_response()
}

async fn place_building(State(state): State<Arc<AppState>>, Json(request): Json<PlaceRequest>) -> Response {
    submit(&state, Command::Place(request)).await
}

async fn demolish_building(State(state): State<Arc<AppState>>, Path((col, row)): Path<(u32, u32)>) -> Response {
    submit(&state, Command::Demolish { col, row }).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        Scenario::from_yaml_str("name: web\nseed: 2\nmap:\n  rows: [GGG, GGG]\nstock:\n  money: 500\n  planks: 10\n")
            .unwrap()
            .build_world()
            .unwrap()
    }

    #[test]
    fn commands_place_and_demolish() {
        let mut world = world();
        let placed = apply_command(
            &mut world,
            Command::Place(PlaceRequest {
                kind: BuildingKind::Sawmill,
                col: 1,
                row: 1,
            }),
        )
        .unwrap();
        assert!(matches!(placed, CommandDone::Placed { kind: BuildingKind::Sawmill, .. }));

        let gone = apply_command(&mut world, Command::Demolish { col: 1, row: 1 }).unwrap();
        assert!(matches!(gone, CommandDone::Demolished { kind: BuildingKind::Sawmill }));
        assert!(apply_command(&mut world, Command::Demolish { col: 1, row: 1 }).is_err());
    }

    #[test]
    fn place_request_parses_from_json() {
        let request: PlaceRequest = serde_json::from_str(r#"{"kind":"farmers_residence","col":2,"row":0}"#).unwrap();
        assert_eq!(request.kind, BuildingKind::FarmersResidence);
        assert_eq!((request.col, request.row), (2, 0));
    }
}
