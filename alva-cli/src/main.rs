use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use alva_core::config::Config;
use alva_core::osc_client::{ConsoleBackend, NullConsole, OscConsole};
use alva_core::playback::{on_frame_change, on_playback_start, on_playback_stop, PlaybackState};
use alva_core::render;
use alva_core::show::Show;
use alva_core::timecode::{beat_grid, frame_to_timecode};
use alva_core::trigger_map::{build_trigger_maps, MapKind};
use alva_types::Frame;

const USAGE: &str = "\
usage: alva [-v|--verbose] [--config <path>] [--dry-run] <command>

commands:
  play <show.json> [--from N] [--to N]   run the show in real time
  render <show.json>                     export cues and macros to the event list
  maps <show.json>                       print the trigger maps
  send <address> <argument>              send one OSC string message
  beats <start> <end> <bpm> [fps] [beats_per_measure]";

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alva")
        .join("alva.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));
    match File::create(&log_path) {
        Ok(file) => loggers.push(WriteLogger::new(log_level, Config::default(), file)),
        Err(e) => eprintln!("alva: cannot open {}: {}", log_path.display(), e),
    }
    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("alva: logger already initialized: {}", e);
    }

    log::info!("alva starting (log level: {:?})", log_level);
}

/// Value following `flag`, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Positional arguments, with global flags and their values removed.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "--from" | "--to" => {
                iter.next();
            }
            "-v" | "--verbose" | "--dry-run" => {}
            other => out.push(other),
        }
    }
    out
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, Box<dyn Error>> {
    value
        .parse()
        .map_err(|_| format!("invalid {}: {:?}", what, value).into())
}

fn open_console(config: &Config, dry_run: bool) -> Result<Box<dyn ConsoleBackend>, Box<dyn Error>> {
    if dry_run {
        log::info!(target: "osc", "dry run, nothing will be sent");
        return Ok(Box::new(NullConsole));
    }
    let console = OscConsole::from_settings(&config.console())?;
    log::info!(target: "osc", "sending to {}", console.target());
    Ok(Box::new(console))
}

fn cmd_play(
    show_path: &Path,
    config: &Config,
    console: &dyn ConsoleBackend,
    from: Option<Frame>,
    to: Option<Frame>,
) -> Result<(), Box<dyn Error>> {
    let show = Show::load(show_path)?;
    let start = from.unwrap_or(show.frame_current);
    let end = to.unwrap_or_else(|| show.last_frame());
    let fps = show.frame_rate.value();
    if fps <= 0.0 {
        return Err(format!("unusable frame rate {}", show.frame_rate).into());
    }
    let period = Duration::from_secs_f64(1.0 / fps);

    let mut state = PlaybackState::new(config.playback(), show.frame_rate);
    if let Some(preview) = state.update_livemap_preview(&show.strips, start) {
        println!("{} ({})", state.livemap_label(), preview);
    }

    let report = on_playback_start(&mut state, console, &show.strips, start);
    let mut sent = report.sent;
    let mut failed = report.failed;

    let began = Instant::now();
    for (i, frame) in (start..=end).enumerate() {
        let deadline = began + period.mul_f64(i as f64);
        if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
        let report = on_frame_change(&mut state, console, frame);
        sent += report.sent;
        failed += report.failed;
    }

    let report = on_playback_stop(&mut state, console);
    sent += report.sent;
    failed += report.failed;
    println!(
        "played frames {}..={} ({} to {}): {} sent, {} failed",
        start,
        end,
        frame_to_timecode(start, fps),
        frame_to_timecode(end, fps),
        sent,
        failed
    );
    Ok(())
}

fn cmd_render(
    show_path: &Path,
    config: &Config,
    console: &dyn ConsoleBackend,
    dry_run: bool,
) -> Result<(), Box<dyn Error>> {
    let show = Show::load(show_path)?;
    let settings = config.render();
    let Some(plan) = render::plan(&show.strips, show.frame_rate, show.frame_current, &settings)
    else {
        return Err(format!(
            "no sound strip with a timecode clock at frame {}",
            show.frame_current
        )
        .into());
    };

    if dry_run {
        for cmd in &plan.commands {
            println!("{} {}", cmd.address, cmd.argument);
        }
        return Ok(());
    }
    let report = render::execute(&plan, console, &settings);
    println!(
        "event list {}: {} events, {} commands sent, {} failed",
        plan.event_list, plan.event_count, report.sent, report.failed
    );
    Ok(())
}

fn cmd_maps(show_path: &Path) -> Result<(), Box<dyn Error>> {
    let show = Show::load(show_path)?;
    let fps = show.frame_rate.value();
    let maps = build_trigger_maps(&show.strips);
    for kind in MapKind::LIVE.into_iter().chain([MapKind::Cue]) {
        let map = maps.get(kind);
        if map.is_empty() {
            continue;
        }
        println!("[{}]", kind.name());
        for (frame, entries) in map.iter() {
            for entry in entries {
                println!(
                    "  {:>6} {}  {:<20} {} {}",
                    frame,
                    frame_to_timecode(frame, fps),
                    entry.label,
                    entry.address,
                    entry.argument
                );
            }
        }
    }
    println!("{} entries", maps.total_entries());
    Ok(())
}

fn cmd_beats(args: &[&str]) -> Result<(), Box<dyn Error>> {
    let (start, end, bpm) = match args {
        [start, end, bpm, ..] => (
            parse_number::<Frame>(start, "start frame")?,
            parse_number::<Frame>(end, "end frame")?,
            parse_number::<u32>(bpm, "bpm")?,
        ),
        _ => return Err(USAGE.into()),
    };
    let fps = match args.get(3) {
        Some(v) => parse_number::<f64>(v, "fps")?,
        None => 30.0,
    };
    let per_measure = match args.get(4) {
        Some(v) => parse_number::<u32>(v, "beats per measure")?,
        None => 4,
    };
    for mark in beat_grid(start, end, bpm, fps, per_measure) {
        println!(
            "{:>6}..={:<6} beat {}",
            mark.frame,
            mark.frame_last,
            mark.beat_in_measure + 1
        );
    }
    Ok(())
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let config = match flag_value(args, "--config") {
        Some(path) => Config::load_with_override(Path::new(path)),
        None => Config::load(),
    };
    let from = flag_value(args, "--from")
        .map(|v| parse_number::<Frame>(v, "--from"))
        .transpose()?;
    let to = flag_value(args, "--to")
        .map(|v| parse_number::<Frame>(v, "--to"))
        .transpose()?;

    let positional = positionals(args);
    match positional.as_slice() {
        ["play", show] => {
            let console = open_console(&config, dry_run)?;
            cmd_play(Path::new(show), &config, console.as_ref(), from, to)
        }
        ["render", show] => {
            let console = open_console(&config, dry_run)?;
            cmd_render(Path::new(show), &config, console.as_ref(), dry_run)
        }
        ["maps", show] => cmd_maps(Path::new(show)),
        ["send", address, argument] => {
            let console = open_console(&config, dry_run)?;
            console.send_string(address, argument)?;
            Ok(())
        }
        ["beats", rest @ ..] => cmd_beats(rest),
        _ => Err(USAGE.into()),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("alva: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positionals_skip_flags_and_values() {
        let a = args(&["alva", "-v", "--config", "c.toml", "play", "show.json", "--from", "10"]);
        assert_eq!(positionals(&a), vec!["play", "show.json"]);
        assert_eq!(flag_value(&a, "--from"), Some("10"));
        assert_eq!(flag_value(&a, "--to"), None);
    }

    #[test]
    fn bad_numbers_are_errors() {
        assert!(parse_number::<u32>("x", "bpm").is_err());
        assert_eq!(parse_number::<i64>("-4", "frame").unwrap(), -4);
    }
}
