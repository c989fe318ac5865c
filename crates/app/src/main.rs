use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use services::{AppServices, Clock, MrtSession, RecordingRouter, SessionError, load_config};
use tokio::io::{AsyncBufReadExt, BufReader};
use trainer_core::Vec3;
use trainer_core::media::SimulatedPlayer;
use trainer_core::model::{OPTION_COUNT, RoundState};
use trainer_core::unwrap::UnwrapEvent;

/// Frame time for the simulated unwrap run.
const UNWRAP_DT: f32 = 1.0 / 30.0;
/// Where the simulated participant stands while tracing edges.
const EYE: Vec3 = Vec3::new(0.6, 1.7, 3.5);

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidDataDir { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDataDir { raw } => write!(f, "invalid --data-dir value: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  trainer mrt    [--data-dir <dir>] [--config <file.json>] [--seed <n>] [--auto]");
    eprintln!("  trainer unwrap [--data-dir <dir>] [--config <file.json>] [--seed <n>]");
    eprintln!();
    eprintln!("mrt reads one option index (0-3) per line from stdin; --auto answers at random.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data-dir ./trainer-data");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRAINER_DATA_DIR, TRAINER_CONFIG, TRAINER_SEED, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Mrt,
    Unwrap,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "mrt" => Some(Self::Mrt),
            "unwrap" => Some(Self::Unwrap),
            _ => None,
        }
    }
}

struct Args {
    data_dir: PathBuf,
    config: Option<PathBuf>,
    seed: Option<u64>,
    auto: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut data_dir = std::env::var("TRAINER_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("trainer-data"), PathBuf::from);
        let mut config = std::env::var("TRAINER_CONFIG").ok().map(PathBuf::from);
        let mut seed = std::env::var("TRAINER_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());
        let mut auto = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => {
                    let value = require_value(args, "--data-dir")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDataDir { raw: value });
                    }
                    data_dir = PathBuf::from(value);
                }
                "--config" => config = Some(PathBuf::from(require_value(args, "--config")?)),
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--auto" => auto = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            data_dir,
            config,
            seed,
            auto,
        })
    }
}

fn describe_round(round: &RoundState) {
    println!("shape shown: {}", round.target());
    for (i, option) in round.options().iter().enumerate() {
        println!("  [{i}] {option}");
    }
}

async fn run_mrt(services: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mrt = services.mrt_sessions();
    let mut session = mrt.start_session().await?;
    println!("asset set: {}", session.chosen_set());

    if args.auto {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        while let Some(round) = session.current_round() {
            describe_round(round);
            let index = rng.random_range(0..OPTION_COUNT);
            mrt.tick(&mut session, rng.random_range(1.0..6.0)).await?;
            if session.is_complete() {
                break;
            }
            answer(services, &mut session, index).await?;
        }
    } else {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut last = Instant::now();
        while let Some(round) = session.current_round() {
            describe_round(round);
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let now = Instant::now();
            mrt.tick(&mut session, now.duration_since(last).as_secs_f32())
                .await?;
            last = now;
            if session.is_complete() {
                println!("time is up");
                break;
            }
            match line.trim().parse::<usize>() {
                Ok(index) => answer(services, &mut session, index).await?,
                Err(_) => eprintln!("enter an option index between 0 and {}", OPTION_COUNT - 1),
            }
        }
    }

    match session.saved() {
        Some(saved) => {
            println!(
                "saved {} session(s); next: {}",
                saved.sessions_recorded, saved.next_stage
            );
            if let Some(path) = &saved.archived_as {
                println!("results archived as {}", path.display());
            }
        }
        None => println!("session ended before results were saved"),
    }
    Ok(())
}

async fn answer(
    services: &AppServices,
    session: &mut MrtSession,
    index: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    match services.mrt_sessions().answer(session, index).await {
        Ok(answer) => {
            println!(
                "{} ({:.2}s)",
                answer.entry.correctness_label(),
                answer.entry.seconds
            );
            Ok(())
        }
        Err(SessionError::Round(err)) => {
            eprintln!("{err}");
            Ok(())
        }
        Err(SessionError::Storage(err)) => {
            eprintln!("results not saved yet, retrying on the next answer: {err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn run_unwrap(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let unwrap = services.unwrap_sessions();
    let mut player = SimulatedPlayer::new(45);
    let (mut session, events) = unwrap.start_session(&mut player)?;
    print_events(&events);

    while session.routed().is_none() {
        player.advance();
        let input = session.aim_at_next_edge(EYE);
        let events = unwrap.tick(&mut session, UNWRAP_DT, &input, EYE, &mut player);
        print_events(&events);
    }
    println!(
        "unwrap finished in {:.1}s ({} left)",
        session.timer().elapsed(),
        session.timer().display()
    );
    Ok(())
}

fn print_events(events: &[UnwrapEvent]) {
    for event in events {
        match event {
            UnwrapEvent::ShapeSpawned { name } => println!("spawned {name}"),
            UnwrapEvent::EdgeLit { shape, edge } => println!("  {shape}: edge {edge} traced"),
            UnwrapEvent::ShapeRemoved { name } => println!("{name} complete"),
            UnwrapEvent::UnwrapClipStarted { clip } | UnwrapEvent::FinaleStarted { clip } => {
                println!("playing {clip}");
            }
            UnwrapEvent::FinalChallengeStarted => println!("final challenge: build the snowman"),
            UnwrapEvent::PartArrived { name } => println!("{name} reached the desk"),
            UnwrapEvent::PartRevealed { index, name } => println!("part {index} ({name}) placed"),
            UnwrapEvent::StageRequested(stage) => println!("next: {stage}"),
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Mrt,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Mrt,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let args = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let config = load_config(args.config.as_deref())?;
    info!("results directory: {}", args.data_dir.display());
    let router = Arc::new(RecordingRouter::new());
    let services = AppServices::with_results_file(
        config,
        &args.data_dir,
        Clock::default(),
        router.clone(),
        args.seed,
    );

    match cmd {
        Command::Mrt => run_mrt(&services, &args).await?,
        Command::Unwrap => run_unwrap(&services)?,
    }
    if let Some(stage) = router.last() {
        info!("scene to load: {stage}");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
