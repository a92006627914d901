use std::path::{Path, PathBuf};

use alva_types::{ConsoleSettings, PlaybackSettings, RenderSettings};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    console: ConsoleConfig,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    render: RenderConfig,
}

#[derive(Deserialize, Default)]
struct ConsoleConfig {
    ip_address: Option<String>,
    port: Option<u16>,
}

#[derive(Deserialize, Default)]
struct PlaybackConfig {
    armed: Option<bool>,
    livemap_armed: Option<bool>,
    house_down_on_play: Option<bool>,
    house_up_on_stop: Option<bool>,
    house_prefix: Option<String>,
    house_down_argument: Option<String>,
    house_up_argument: Option<String>,
    sync_timecode: Option<bool>,
    timecode_expected_lag: Option<u32>,
}

#[derive(Deserialize, Default)]
struct RenderConfig {
    finish_snapshot: Option<u32>,
    batch_size: Option<usize>,
    send_delay_ms: Option<u64>,
}

pub struct Config {
    console: ConsoleConfig,
    playback: PlaybackConfig,
    render: RenderConfig,
}

impl Config {
    /// Embedded defaults, overridden by the user's config file if present.
    pub fn load() -> Self {
        match user_config_path() {
            Some(path) if path.exists() => Self::load_with_override(&path),
            _ => Self::embedded(),
        }
    }

    /// Embedded defaults overridden by the file at `path`. Unreadable or
    /// malformed files are logged and ignored.
    pub fn load_with_override(path: &Path) -> Self {
        let mut config = Self::embedded();
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(user) => config.merge(user),
                Err(e) => {
                    log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                }
            },
            Err(e) => {
                log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
            }
        }
        config
    }

    /// Embedded defaults overridden by a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let user: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::embedded();
        config.merge(user);
        Ok(config)
    }

    fn embedded() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Config {
            console: base.console,
            playback: base.playback,
            render: base.render,
        }
    }

    fn merge(&mut self, user: ConfigFile) {
        merge_console(&mut self.console, user.console);
        merge_playback(&mut self.playback, user.playback);
        merge_render(&mut self.render, user.render);
    }

    pub fn console(&self) -> ConsoleSettings {
        let fallback = ConsoleSettings::default();
        ConsoleSettings {
            ip_address: self
                .console
                .ip_address
                .clone()
                .unwrap_or(fallback.ip_address),
            port: self.console.port.unwrap_or(fallback.port),
        }
    }

    pub fn playback(&self) -> PlaybackSettings {
        let fallback = PlaybackSettings::default();
        let p = &self.playback;
        PlaybackSettings {
            armed: p.armed.unwrap_or(fallback.armed),
            livemap_armed: p.livemap_armed.unwrap_or(fallback.livemap_armed),
            house_down_on_play: p.house_down_on_play.unwrap_or(fallback.house_down_on_play),
            house_up_on_stop: p.house_up_on_stop.unwrap_or(fallback.house_up_on_stop),
            house_prefix: p.house_prefix.clone().unwrap_or(fallback.house_prefix),
            house_down_argument: p
                .house_down_argument
                .clone()
                .unwrap_or(fallback.house_down_argument),
            house_up_argument: p
                .house_up_argument
                .clone()
                .unwrap_or(fallback.house_up_argument),
            sync_timecode: p.sync_timecode.unwrap_or(fallback.sync_timecode),
            // Clamped to 0..=100 frames.
            timecode_expected_lag: p
                .timecode_expected_lag
                .unwrap_or(fallback.timecode_expected_lag)
                .min(100),
        }
    }

    pub fn render(&self) -> RenderSettings {
        let fallback = RenderSettings::default();
        RenderSettings {
            finish_snapshot: self
                .render
                .finish_snapshot
                .unwrap_or(fallback.finish_snapshot)
                .clamp(1, 9999),
            batch_size: self
                .render
                .batch_size
                .unwrap_or(fallback.batch_size)
                .clamp(1, 500),
            send_delay_ms: self.render.send_delay_ms.unwrap_or(fallback.send_delay_ms),
        }
    }
}

/// `~/.config/alva/config.toml` (or the platform equivalent).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("alva").join("config.toml"))
}

fn merge_console(base: &mut ConsoleConfig, user: ConsoleConfig) {
    if user.ip_address.is_some() {
        base.ip_address = user.ip_address;
    }
    if user.port.is_some() {
        base.port = user.port;
    }
}

fn merge_playback(base: &mut PlaybackConfig, user: PlaybackConfig) {
    if user.armed.is_some() {
        base.armed = user.armed;
    }
    if user.livemap_armed.is_some() {
        base.livemap_armed = user.livemap_armed;
    }
    if user.house_down_on_play.is_some() {
        base.house_down_on_play = user.house_down_on_play;
    }
    if user.house_up_on_stop.is_some() {
        base.house_up_on_stop = user.house_up_on_stop;
    }
    if user.house_prefix.is_some() {
        base.house_prefix = user.house_prefix;
    }
    if user.house_down_argument.is_some() {
        base.house_down_argument = user.house_down_argument;
    }
    if user.house_up_argument.is_some() {
        base.house_up_argument = user.house_up_argument;
    }
    if user.sync_timecode.is_some() {
        base.sync_timecode = user.sync_timecode;
    }
    if user.timecode_expected_lag.is_some() {
        base.timecode_expected_lag = user.timecode_expected_lag;
    }
}

fn merge_render(base: &mut RenderConfig, user: RenderConfig) {
    if user.finish_snapshot.is_some() {
        base.finish_snapshot = user.finish_snapshot;
    }
    if user.batch_size.is_some() {
        base.batch_size = user.batch_size;
    }
    if user.send_delay_ms.is_some() {
        base.send_delay_ms = user.send_delay_ms;
    }
}
