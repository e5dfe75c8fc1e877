mod console;
mod script;

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use console::{LoggingFeedback, SimulatedTransport};
use remind_engine::time::format_clock;
use remind_engine::{
    Output, Player, SessionErrorEvent, SessionSettings, TimelineEvent, seconds_to_tl,
};
use script::{ScriptLine, parse_script};
use serde::Serialize;
use tracing::{error, info};

const USAGE: &str = "usage: remind <track-seconds> [script] [--settings <file.json>]";

#[derive(Debug, Serialize)]
struct Record<'a> {
    line: usize,
    output: &'a Output,
}

#[derive(Debug)]
struct Args {
    duration_tl: i64,
    script: Option<PathBuf>,
    settings: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(%message, "session aborted");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<(), String> {
    let args = parse_args(std::env::args().skip(1))?;
    let settings = match &args.settings {
        Some(path) => SessionSettings::load(path).map_err(|error| error.to_string())?,
        None => SessionSettings::default(),
    };

    let text = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|error| format!("failed to read {}: {error}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|error| format!("failed to read stdin: {error}"))?;
            text
        }
    };
    let lines = parse_script(&text).map_err(|error| error.to_string())?;

    let transport = SimulatedTransport::new(args.duration_tl);
    let mut player =
        Player::load(transport, LoggingFeedback, settings).map_err(|error| error.to_string())?;
    info!(
        duration_tl = args.duration_tl,
        length = %format_clock(args.duration_tl),
        events = lines.len(),
        "track loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (line, script_line) in lines {
        let outputs = match script_line {
            ScriptLine::Event(event) => handle(&mut player, event),
            ScriptLine::Tick { delta_tl } => {
                if player.transport_mut().advance(delta_tl) {
                    handle(&mut player, TimelineEvent::SegmentPlaybackCompleted)
                } else if player.transport().is_playing() {
                    player.poll().unwrap_or_else(|error| error_outputs(&error))
                } else {
                    Vec::new()
                }
            }
        };
        for output in &outputs {
            let record = serde_json::to_string(&Record { line, output })
                .map_err(|error| format!("failed to encode output: {error}"))?;
            writeln!(out, "{record}").map_err(|error| format!("failed to write: {error}"))?;
        }
    }
    Ok(())
}

fn handle(
    player: &mut Player<SimulatedTransport, LoggingFeedback>,
    event: TimelineEvent,
) -> Vec<Output> {
    player
        .handle(event)
        .unwrap_or_else(|error| error_outputs(&error))
}

fn error_outputs(error: &remind_engine::EngineError) -> Vec<Output> {
    vec![Output::Error(SessionErrorEvent::from_error(error))]
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut settings = None;
    while let Some(arg) = args.next() {
        if arg == "--settings" {
            let path = args
                .next()
                .ok_or_else(|| format!("--settings needs a path\n{USAGE}"))?;
            settings = Some(PathBuf::from(path));
        } else if arg == "-h" || arg == "--help" {
            return Err(USAGE.to_string());
        } else {
            positional.push(arg);
        }
    }

    let mut positional = positional.into_iter();
    let seconds: f64 = positional
        .next()
        .ok_or_else(|| USAGE.to_string())?
        .parse()
        .map_err(|_| format!("track length must be a number of seconds\n{USAGE}"))?;
    let script = positional.next().map(PathBuf::from);
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument `{extra}`\n{USAGE}"));
    }

    Ok(Args {
        duration_tl: seconds_to_tl(seconds),
        script,
        settings,
    })
}
