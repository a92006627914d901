//! Event-list export: bake macro, flash and cue maps into the console's
//! timecode event list for the song under the playhead.
//!
//! The console has no bulk-import call, so the export is a fixed sequence
//! of command lines sent with a short pause between them.

use std::thread;
use std::time::Duration;

use alva_types::{Frame, FrameRate, RenderSettings, Strip};

use crate::osc_client::ConsoleBackend;
use crate::playback::find_relevant_clock;
use crate::timecode::frame_to_timecode;
use crate::trigger_map::{build_trigger_maps, TriggerMap, TriggerMaps, NEWCMD_ADDRESS};

const BLIND_KEY_ADDRESS: &str = "/eos/key/blind";
const LIVE_KEY_ADDRESS: &str = "/eos/key/live";

/// One command in an export plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    pub address: String,
    pub argument: String,
}

impl RenderCommand {
    fn new(address: &str, argument: impl Into<String>) -> Self {
        Self {
            address: address.to_string(),
            argument: argument.into(),
        }
    }
}

/// Commands to send, and the event list they target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub event_list: u32,
    pub event_count: usize,
    pub commands: Vec<RenderCommand>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub sent: usize,
    pub failed: usize,
}

fn push_macro_events(
    lines: &mut Vec<String>,
    map: &TriggerMap,
    event_list: u32,
    fps: f64,
) {
    for (frame, entries) in map.iter() {
        for number in entries.iter().filter_map(|e| e.macro_number()) {
            push_event(lines, event_list, frame, fps, "Macro", number);
        }
    }
}

fn push_event(lines: &mut Vec<String>, event_list: u32, frame: Frame, fps: f64, action: &str, index: u32) {
    let number = lines.len() + 1;
    lines.push(format!(
        "Event {} / {} Time {} Show_Control_Action {} {} Enter",
        event_list,
        number,
        frame_to_timecode(frame, fps),
        action,
        index
    ));
}

/// Event lines for every numbered macro, flash and cue entry, numbered
/// from 1. Text-only macros have no console number and are left out.
pub fn event_lines(maps: &TriggerMaps, event_list: u32, frame_rate: FrameRate) -> Vec<String> {
    let fps = frame_rate.value();
    let mut lines = Vec::new();
    for map in [&maps.macro_start, &maps.macro_end, &maps.flash_start, &maps.flash_end] {
        push_macro_events(&mut lines, map, event_list, fps);
    }
    for (frame, entries) in maps.cue.iter() {
        for cue in entries.iter().filter_map(|e| e.argument.parse::<u32>().ok()) {
            push_event(&mut lines, event_list, frame, fps, "Cue", cue);
        }
    }
    lines
}

/// Build the export for the clock strip under `current_frame`.
///
/// Returns `None` when no sound strip with a clock number covers the frame.
pub fn plan(
    strips: &[Strip],
    frame_rate: FrameRate,
    current_frame: Frame,
    settings: &RenderSettings,
) -> Option<RenderPlan> {
    let event_list = find_relevant_clock(strips, current_frame)?;
    let lines = event_lines(&build_trigger_maps(strips), event_list, frame_rate);

    let mut commands = vec![
        RenderCommand::new(BLIND_KEY_ADDRESS, "1"),
        RenderCommand::new(BLIND_KEY_ADDRESS, "0"),
        RenderCommand::new(NEWCMD_ADDRESS, format!("Delete Event {} / Enter Enter", event_list)),
        RenderCommand::new(NEWCMD_ADDRESS, format!("Event {} / Enter Enter", event_list)),
    ];
    for batch in lines.chunks(settings.batch_size.max(1)) {
        commands.push(RenderCommand::new(NEWCMD_ADDRESS, batch.join(", ")));
    }
    commands.push(RenderCommand::new(LIVE_KEY_ADDRESS, "1"));
    commands.push(RenderCommand::new(LIVE_KEY_ADDRESS, "0"));
    commands.push(RenderCommand::new(
        NEWCMD_ADDRESS,
        format!("Snapshot {} Enter", settings.finish_snapshot),
    ));

    Some(RenderPlan {
        event_list,
        event_count: lines.len(),
        commands,
    })
}

/// Send a plan, pausing `send_delay_ms` after each command. Failures are
/// logged and counted; the export always runs to the end.
pub fn execute(plan: &RenderPlan, console: &dyn ConsoleBackend, settings: &RenderSettings) -> RenderReport {
    let mut report = RenderReport::default();
    let delay = Duration::from_millis(settings.send_delay_ms);
    log::info!(
        target: "render",
        "rendering {} events to event list {}",
        plan.event_count,
        plan.event_list
    );
    for cmd in &plan.commands {
        match console.send_string(&cmd.address, &cmd.argument) {
            Ok(()) => report.sent += 1,
            Err(e) => {
                report.failed += 1;
                log::warn!(target: "render", "failed to send {} {:?}: {}", cmd.address, cmd.argument, e);
            }
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    report
}
