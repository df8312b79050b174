use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Match-level configuration. Game-tree scalars (board count, blinds,
/// starting stack) are compile-time constants in the engine crate; everything
/// that varies per deployment lives here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub num_rounds: u32,
    /// Total thinking seconds each player gets for the whole match.
    pub starting_game_clock: f64,
    /// Seconds allowed for a player's build command.
    pub build_timeout: f64,
    /// Seconds allowed for the socket handshake; also the per-read timeout.
    pub connect_timeout: f64,
    /// Byte cap on each player's captured stdout/stderr log.
    pub player_log_size_limit: usize,
    pub enforce_game_clock: bool,
    pub player_1_name: String,
    pub player_1_path: String,
    pub player_2_name: String,
    pub player_2_path: String,
    /// Game log is written to `<game_log_filename>.txt`.
    pub game_log_filename: String,
    /// Fixed shuffle seed for reproducible matches; random when unset.
    pub seed: Option<u64>,
    /// Optional JSONL round-record path; no structured log when unset.
    pub round_log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_rounds: 500,
            starting_game_clock: 60.0,
            build_timeout: 10.0,
            connect_timeout: 10.0,
            player_log_size_limit: 524_288,
            enforce_game_clock: true,
            player_1_name: "A".into(),
            player_1_path: "./player_1".into(),
            player_2_name: "B".into(),
            player_2_path: "./player_2".into(),
            game_log_filename: "gamelog".into(),
            seed: None,
            round_log: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads the match configuration.
///
/// Precedence, lowest to highest: built-in defaults, the TOML file named by
/// `path` (or the `TRIBOARD_CONFIG` env var when `path` is `None`), then
/// individual env overrides (`TRIBOARD_SEED`, `TRIBOARD_NUM_ROUNDS`,
/// `TRIBOARD_GAME_CLOCK`, `TRIBOARD_ENFORCE_GAME_CLOCK`).
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    let file_path: Option<PathBuf> = match path {
        Some(p) => Some(p.to_path_buf()),
        None => std::env::var("TRIBOARD_CONFIG").ok().map(PathBuf::from),
    };
    if let Some(p) = file_path {
        let s = fs::read_to_string(p)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.num_rounds {
            cfg.num_rounds = v;
        }
        if let Some(v) = f.starting_game_clock {
            cfg.starting_game_clock = v;
        }
        if let Some(v) = f.build_timeout {
            cfg.build_timeout = v;
        }
        if let Some(v) = f.connect_timeout {
            cfg.connect_timeout = v;
        }
        if let Some(v) = f.player_log_size_limit {
            cfg.player_log_size_limit = v;
        }
        if let Some(v) = f.enforce_game_clock {
            cfg.enforce_game_clock = v;
        }
        if let Some(v) = f.player_1_name {
            cfg.player_1_name = v;
        }
        if let Some(v) = f.player_1_path {
            cfg.player_1_path = v;
        }
        if let Some(v) = f.player_2_name {
            cfg.player_2_name = v;
        }
        if let Some(v) = f.player_2_path {
            cfg.player_2_path = v;
        }
        if let Some(v) = f.game_log_filename {
            cfg.game_log_filename = v;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
        }
        if let Some(v) = f.round_log {
            cfg.round_log = Some(v);
        }
    }

    if let Ok(seed) = std::env::var("TRIBOARD_SEED") {
        if !seed.is_empty() {
            cfg.seed = Some(
                seed.parse()
                    .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
            );
        }
    }
    if let Ok(rounds) = std::env::var("TRIBOARD_NUM_ROUNDS") {
        if !rounds.is_empty() {
            cfg.num_rounds = rounds
                .parse()
                .map_err(|_| ConfigError::Invalid("Invalid round count".into()))?;
        }
    }
    if let Ok(clock) = std::env::var("TRIBOARD_GAME_CLOCK") {
        if !clock.is_empty() {
            cfg.starting_game_clock = clock
                .parse()
                .map_err(|_| ConfigError::Invalid("Invalid game clock".into()))?;
        }
    }
    if let Ok(enforce) = std::env::var("TRIBOARD_ENFORCE_GAME_CLOCK") {
        if !enforce.is_empty() {
            cfg.enforce_game_clock = parse_bool(&enforce)
                .ok_or_else(|| ConfigError::Invalid("Invalid enforce_game_clock".into()))?;
        }
    }

    validate(&cfg)?;
    Ok(cfg)
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    num_rounds: Option<u32>,
    #[serde(default)]
    starting_game_clock: Option<f64>,
    #[serde(default)]
    build_timeout: Option<f64>,
    #[serde(default)]
    connect_timeout: Option<f64>,
    #[serde(default)]
    player_log_size_limit: Option<usize>,
    #[serde(default)]
    enforce_game_clock: Option<bool>,
    #[serde(default)]
    player_1_name: Option<String>,
    #[serde(default)]
    player_1_path: Option<String>,
    #[serde(default)]
    player_2_name: Option<String>,
    #[serde(default)]
    player_2_path: Option<String>,
    #[serde(default)]
    game_log_filename: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    round_log: Option<String>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.num_rounds == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: num_rounds must be >=1".into(),
        ));
    }
    if cfg.starting_game_clock <= 0.0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: starting_game_clock must be >0".into(),
        ));
    }
    if cfg.build_timeout <= 0.0 || cfg.connect_timeout <= 0.0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: timeouts must be >0".into(),
        ));
    }
    if cfg.player_log_size_limit == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: player_log_size_limit must be >0".into(),
        ));
    }
    for (name, path) in [
        (&cfg.player_1_name, &cfg.player_1_path),
        (&cfg.player_2_name, &cfg.player_2_path),
    ] {
        if name.is_empty() || path.is_empty() {
            return Err(ConfigError::Invalid(
                "Invalid configuration: player names and paths must be set".into(),
            ));
        }
    }
    if cfg.game_log_filename.is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: game_log_filename must be set".into(),
        ));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
