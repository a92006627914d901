use alva_types::{Frame, FrameRate, PlaybackSettings, Strip};

use crate::livemap;
use crate::osc_client::ConsoleBackend;
use crate::timecode::frame_to_timecode;
use crate::trigger_map::{build_trigger_maps, TriggerMaps, NEWCMD_ADDRESS};

/// Event list of the first unmuted clock strip whose interval contains `frame`.
pub fn find_relevant_clock(strips: &[Strip], frame: Frame) -> Option<u32> {
    strips
        .iter()
        .filter(|s| s.contains(frame))
        .find_map(Strip::timecode_clock)
}

/// Set the console's internal clock to `timecode` and start it.
pub fn clock_enable_command(clock: u32, timecode: &str) -> String {
    format!(
        "Event {clock} / Internal Time {timecode} Enter, Event {clock} / Internal Enable Enter"
    )
}

pub fn clock_disable_command(clock: u32) -> String {
    format!("Event {} / Internal Disable Enter", clock)
}

/// Outcome of one handler call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireReport {
    pub sent: usize,
    pub failed: usize,
    /// The tick jumped more than one frame from the previous one.
    pub scrubbed: bool,
}

/// Strip snapshot and maps for one armed playback session.
struct Session {
    strips: Vec<Strip>,
    maps: TriggerMaps,
}

/// Everything the monitor knows about the current playback session.
///
/// Handlers take it explicitly; nothing is kept in globals. Settings and
/// frame rate are host-owned and only replaced between sessions.
pub struct PlaybackState {
    settings: PlaybackSettings,
    frame_rate: FrameRate,
    is_playing: bool,
    last_frame: Option<Frame>,
    current_frame: Frame,
    session: Option<Session>,
    livemap_cue: Option<u32>,
}

impl PlaybackState {
    pub fn new(settings: PlaybackSettings, frame_rate: FrameRate) -> Self {
        Self {
            settings,
            frame_rate,
            is_playing: false,
            last_frame: None,
            current_frame: 0,
            session: None,
            livemap_cue: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.last_frame
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: PlaybackSettings) {
        self.settings = settings;
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    /// The host changed its frame rate. Only timecode conversion reads it;
    /// flash timing is counted in frames.
    pub fn set_frame_rate(&mut self, frame_rate: FrameRate) {
        self.frame_rate = frame_rate;
    }

    /// Maps of the running session, if playback is armed and running.
    pub fn trigger_maps(&self) -> Option<&TriggerMaps> {
        self.session.as_ref().map(|s| &s.maps)
    }

    pub fn livemap_cue(&self) -> Option<u32> {
        self.livemap_cue
    }

    pub fn livemap_label(&self) -> String {
        livemap::label(self.livemap_cue)
    }

    /// Re-resolve the livemap cue while the timeline is stopped.
    ///
    /// Nothing is sent; returns the preview command for display.
    pub fn update_livemap_preview(&mut self, strips: &[Strip], frame: Frame) -> Option<String> {
        if self.is_playing {
            return None;
        }
        self.livemap_cue = livemap::resolve(strips, frame);
        self.livemap_cue.map(livemap::preview_command)
    }

    fn sync_timecode(&self, console: &dyn ConsoleBackend, report: &mut FireReport, frame: Frame) {
        let Some(session) = &self.session else {
            return;
        };
        let lagged = frame + self.settings.timecode_expected_lag.min(100) as Frame;
        match find_relevant_clock(&session.strips, lagged) {
            Some(clock) => {
                let timecode = frame_to_timecode(lagged, self.frame_rate.value());
                fire(console, report, NEWCMD_ADDRESS, &clock_enable_command(clock, &timecode));
            }
            None => log::debug!(target: "playback", "no timecode clock at frame {}", lagged),
        }
    }
}

fn fire(console: &dyn ConsoleBackend, report: &mut FireReport, address: &str, argument: &str) {
    match console.send_string(address, argument) {
        Ok(()) => {
            report.sent += 1;
            log::debug!(target: "playback", "sent {} {:?}", address, argument);
        }
        Err(e) => {
            report.failed += 1;
            log::warn!(target: "playback", "failed to send {} {:?}: {}", address, argument, e);
        }
    }
}

/// Playback started at `current_frame`.
///
/// Builds the trigger maps from `strips`, then dips the house, starts the
/// console clock and jumps to the livemap cue as configured. A disarmed
/// session builds nothing and sends nothing.
pub fn on_playback_start(
    state: &mut PlaybackState,
    console: &dyn ConsoleBackend,
    strips: &[Strip],
    current_frame: Frame,
) -> FireReport {
    let mut report = FireReport::default();
    state.is_playing = true;
    state.last_frame = None;
    state.current_frame = current_frame;

    if !state.settings.armed {
        state.session = None;
        log::info!(target: "playback", "playback started at frame {} (disarmed)", current_frame);
        return report;
    }

    state.session = Some(Session {
        strips: strips.to_vec(),
        maps: build_trigger_maps(strips),
    });
    log::info!(target: "playback", "playback started at frame {}", current_frame);

    let settings = &state.settings;
    if settings.house_down_on_play {
        fire(console, &mut report, &settings.house_prefix, &settings.house_down_argument);
    }
    if settings.sync_timecode {
        state.sync_timecode(console, &mut report, current_frame);
    }
    if state.settings.livemap_armed {
        state.livemap_cue = livemap::resolve(strips, current_frame);
        if let Some(cue) = state.livemap_cue {
            fire(console, &mut report, NEWCMD_ADDRESS, &livemap::livemap_command(cue));
        }
    }
    report
}

/// The host moved the playhead to `current_frame`.
///
/// A jump of more than one frame while playing is a scrub and re-syncs the
/// console clock. Every live entry scheduled exactly on `current_frame`
/// fires in map order; a failed send does not stop the rest.
pub fn on_frame_change(
    state: &mut PlaybackState,
    console: &dyn ConsoleBackend,
    current_frame: Frame,
) -> FireReport {
    let mut report = FireReport::default();
    report.scrubbed = state
        .last_frame
        .is_some_and(|last| (current_frame - last).abs() > 1);
    state.last_frame = Some(current_frame);
    state.current_frame = current_frame;

    if !state.is_playing {
        return report;
    }

    if report.scrubbed {
        log::info!(target: "playback", "scrub detected at frame {}", current_frame);
        if state.settings.sync_timecode {
            state.sync_timecode(console, &mut report, current_frame);
        }
    }

    if let Some(session) = &state.session {
        for (kind, entry) in session.maps.live_entries(current_frame) {
            log::debug!(
                target: "playback",
                "frame {}: {} {:?}",
                current_frame,
                kind.name(),
                entry.label
            );
            fire(console, &mut report, &entry.address, &entry.argument);
        }
    }
    report
}

/// Playback stopped. Raises the house and stops the console clock, then
/// drops the session. Calling it again is a no-op.
pub fn on_playback_stop(state: &mut PlaybackState, console: &dyn ConsoleBackend) -> FireReport {
    let mut report = FireReport::default();
    if !state.is_playing {
        return report;
    }
    state.is_playing = false;
    state.last_frame = None;

    if let Some(session) = state.session.take() {
        let settings = &state.settings;
        if settings.house_up_on_stop {
            fire(console, &mut report, &settings.house_prefix, &settings.house_up_argument);
        }
        if settings.sync_timecode {
            if let Some(clock) = find_relevant_clock(&session.strips, state.current_frame) {
                fire(console, &mut report, NEWCMD_ADDRESS, &clock_disable_command(clock));
            }
        }
    }
    log::info!(target: "playback", "playback stopped at frame {}", state.current_frame);
    report
}
