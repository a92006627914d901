//! # alva-core
//!
//! Playback-synchronized trigger engine for ETC Eos consoles. Timeline
//! strips become OSC commands that fire on exact frames while the host
//! plays its timeline.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use alva_core::config::Config;
//! use alva_core::osc_client::OscConsole;
//! use alva_core::playback::{on_frame_change, on_playback_start, on_playback_stop, PlaybackState};
//!
//! let config = Config::load();
//! let console = OscConsole::from_settings(&config.console())?;
//! let mut state = PlaybackState::new(config.playback(), show.frame_rate);
//!
//! on_playback_start(&mut state, &console, &show.strips, show.frame_current);
//! for frame in show.frame_current..show.last_frame() {
//!     on_frame_change(&mut state, &console, frame);
//! }
//! on_playback_stop(&mut state, &console);
//! ```
//!
//! ## Module Overview
//!
//! - [`osc_client`]: OSC string-message codec and the `ConsoleBackend` seam
//! - [`trigger_map`]: frame → fire-list maps built from a strip snapshot
//! - [`friends`]: offset list parsing (`"1 thru 4"`, `"(1-3)(5-7)"`)
//! - [`playback`]: the play / tick / stop handlers and `PlaybackState`
//! - [`livemap`]: nearest preceding cue lookup
//! - [`timecode`]: timecode, flash bias and tempo arithmetic
//! - [`render`]: export of maps to a console event list
//! - [`show`]: JSON show files
//! - [`config`]: TOML configuration (embedded defaults + user override)

pub mod config;
pub mod friends;
pub mod livemap;
pub mod osc_client;
pub mod playback;
pub mod render;
pub mod show;
pub mod timecode;
pub mod trigger_map;

pub use osc_client::{ConsoleBackend, ConsoleError, ConsoleResult, OscConsole};
pub use playback::{on_frame_change, on_playback_start, on_playback_stop, FireReport, PlaybackState};
pub use trigger_map::{build_trigger_maps, FireEntry, MapKind, TriggerMap, TriggerMaps};
