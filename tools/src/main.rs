//! thermos-runner: headless runner for THERMOS-4.
//!
//! Usage:
//!   thermos-runner --seed 12345 --seconds 600
//!   thermos-runner --seed 12345 --config data/session.json --narrator http
//!   thermos-runner --seed 12345 --ipc-mode

mod narrator;

use anyhow::Result;
use narrator::HttpNarrator;
use std::env;
use std::io::{self, BufRead, Write};
use thermos_core::{
    audio::SilentAudio,
    config::GameConfig,
    engine::GameEngine,
    event::GameEvent,
    intent::PlayerIntent,
    minigame::MiniGame,
    narrator::{CannedNarrator, Narrator},
    phase::Phase,
    rng::SeededRng,
    snapshot::SessionSnapshot,
    types::{Direction, Millis},
};
use uuid::Uuid;

/// Autopilot step outside mini-games.
const STEP_MS: Millis = 100;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Advance { ms: Millis },
    Intent { intent: PlayerIntent },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    #[serde(flatten)]
    snapshot: SessionSnapshot,
    events:   &'a [GameEvent],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let seconds = parse_arg(&args, "--seconds", 600u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = str_arg(&args, "--config");
    let narrator_kind = str_arg(&args, "--narrator").unwrap_or("canned");

    let config = match config_path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let session_id = format!("session-{}", Uuid::new_v4());

    if !ipc_mode {
        println!("THERMOS-4 thermos-runner");
        println!("  session:   {session_id}");
        println!("  seed:      {seed}");
        println!("  seconds:   {seconds}");
        println!("  config:    {}", config_path.unwrap_or("(built-in)"));
        println!("  narrator:  {narrator_kind}");
        println!();
    }

    let mut engine = GameEngine::new(
        session_id,
        config,
        Box::new(SeededRng::new(seed)),
        build_narrator(narrator_kind),
        Box::new(SilentAudio),
    )?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        let events = run_autopilot(&mut engine, seconds * 1_000);
        print_summary(&engine, &events);
    }
    Ok(())
}

fn build_narrator(kind: &str) -> Box<dyn Narrator> {
    match kind {
        "http" => match HttpNarrator::from_env() {
            Ok(n) => return Box::new(n),
            Err(e) => log::warn!("HTTP narrator unavailable ({e:#}); using canned narrator"),
        },
        "canned" => {}
        other => log::warn!("Unknown narrator '{other}'; using canned narrator"),
    }
    Box::new(CannedNarrator::new())
}

fn run_ipc_loop(engine: &mut GameEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let events = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Vec::new(),
            IpcCommand::Advance { ms } => engine.advance(ms),
            IpcCommand::Intent { intent } => engine.handle(intent),
        };
        let state = UiState { snapshot: engine.snapshot(), events: &events };
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Play the session until it ends or `budget_ms` of virtual time is spent:
/// walk to each target, capture, acknowledge, and solve every override.
fn run_autopilot(engine: &mut GameEngine, budget_ms: Millis) -> Vec<GameEvent> {
    let start = engine.clock.now_ms;
    let mut events = Vec::new();

    while engine.clock.now_ms - start < budget_ms {
        if let Some(intent) = autopilot_intent(engine) {
            events.extend(engine.handle(intent));
        }
        if engine.phase().is_terminal() {
            break;
        }
        // Timing bars need frame resolution.
        let step = match engine.minigame() {
            Some(MiniGame::Timing(_)) => engine.config().minigame.frame_period_ms,
            _ => STEP_MS,
        };
        events.extend(engine.advance(step));
    }
    events
}

fn autopilot_intent(engine: &GameEngine) -> Option<PlayerIntent> {
    match engine.phase() {
        Phase::PhotoView => Some(PlayerIntent::AcknowledgePhoto),
        Phase::MiniGame => match engine.minigame()? {
            MiniGame::Timing(m) => {
                let cfg = &engine.config().minigame;
                let center = (cfg.window_low + cfg.window_high) / 2.0;
                let margin = (cfg.window_high - cfg.window_low) / 4.0;
                ((m.marker() - center).abs() < margin).then_some(PlayerIntent::TimingTrigger)
            }
            MiniGame::Sequence(m) => {
                if !m.playback_done() || m.is_finished() {
                    return None;
                }
                m.sequence()
                    .get(m.entered().len())
                    .map(|&symbol| PlayerIntent::SequenceInput { symbol })
            }
        },
        Phase::Active if !engine.is_capturing() => {
            let target = engine.survey().target()?;
            let pos = engine.position();
            if pos.distance_to(target.pos) < engine.config().capture_range {
                return Some(PlayerIntent::Capture);
            }
            let dx = target.pos.x.round() as i32 - pos.x;
            let dy = target.pos.y.round() as i32 - pos.y;
            let direction = if dx.abs() >= dy.abs() {
                if dx > 0 { Direction::Right } else { Direction::Left }
            } else if dy > 0 {
                Direction::Down
            } else {
                Direction::Up
            };
            Some(PlayerIntent::Move { direction })
        }
        _ => None,
    }
}

fn print_summary(engine: &GameEngine, events: &[GameEvent]) {
    let count = |pred: fn(&GameEvent) -> bool| events.iter().filter(|e| pred(e)).count();
    let r = engine.resources();

    println!("=== SESSION SUMMARY ===");
    println!("  session:        {}", engine.session_id);
    println!("  virtual time:   {}", engine.clock.timestamp());
    println!("  phase:          {:?}", engine.phase());
    if let Some(cause) = engine.death_cause() {
        println!("  cause:          {}", cause.message());
    }
    println!("  position:       [{}, {}]", engine.position().x, engine.position().y);
    println!("  oxygen:         {:.1}", r.oxygen);
    println!("  energy:         {:.1}", r.energy);
    println!("  heat:           {:.1}", r.heat);
    println!(
        "  anomalies:      {}/{}",
        engine.survey().found_count(),
        engine.survey().anomalies().len()
    );
    println!("  moves:          {}", count(|e| matches!(e, GameEvent::Moved { .. })));
    println!("  missed captures: {}", count(|e| matches!(e, GameEvent::CaptureMissed { .. })));
    println!(
        "  overrides:      {} won / {} lost",
        count(|e| matches!(e, GameEvent::MiniGameResolved { success: true, .. })),
        count(|e| matches!(e, GameEvent::MiniGameResolved { success: false, .. }))
    );

    println!();
    println!("=== SURVEY ===");
    for a in engine.survey().anomalies() {
        let mark = if a.found { "x" } else { " " };
        println!("  [{mark}] {:<6} {}", a.id, a.name);
        if a.found {
            println!("         {}", a.description);
        }
    }

    println!();
    println!("=== TERMINAL ===");
    for entry in engine.terminal().entries() {
        println!("  {} {:?}: {}", entry.timestamp, entry.source, entry.message);
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
