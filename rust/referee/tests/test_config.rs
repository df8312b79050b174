use std::io::Write;

use serial_test::serial;
use triboard_referee::config::{self, Config};

const ENV_KEYS: [&str; 5] = [
    "TRIBOARD_CONFIG",
    "TRIBOARD_SEED",
    "TRIBOARD_NUM_ROUNDS",
    "TRIBOARD_GAME_CLOCK",
    "TRIBOARD_ENFORCE_GAME_CLOCK",
];

struct EnvGuard {
    restores: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn clean() -> Self {
        let restores = ENV_KEYS
            .iter()
            .map(|&key| {
                let previous = std::env::var(key).ok();
                std::env::remove_var(key);
                (key, previous)
            })
            .collect();
        EnvGuard { restores }
    }

    fn set(&self, key: &'static str, value: &str) {
        std::env::set_var(key, value);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.restores.iter().rev() {
            match previous {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("match.toml");
    let mut file = std::fs::File::create(&path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
    path
}

#[test]
#[serial]
fn defaults_apply_when_nothing_is_configured() {
    let _env = EnvGuard::clean();
    let cfg = config::load(None).expect("load defaults");
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.num_rounds, 500);
    assert_eq!(cfg.player_log_size_limit, 524_288);
    assert!(cfg.enforce_game_clock);
    assert!(cfg.seed.is_none());
}

#[test]
#[serial]
fn file_values_override_defaults() {
    let _env = EnvGuard::clean();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
num_rounds = 10
seed = 99
player_1_name = "alpha"
player_1_path = "./alpha"
round_log = "records.jsonl"
"#,
    );
    let cfg = config::load(Some(&path)).expect("load file");
    assert_eq!(cfg.num_rounds, 10);
    assert_eq!(cfg.seed, Some(99));
    assert_eq!(cfg.player_1_name, "alpha");
    assert_eq!(cfg.round_log.as_deref(), Some("records.jsonl"));
    // untouched fields keep their defaults
    assert_eq!(cfg.player_2_name, Config::default().player_2_name);
    assert_eq!(cfg.starting_game_clock, Config::default().starting_game_clock);
}

#[test]
#[serial]
fn config_file_can_come_from_the_environment() {
    let env = EnvGuard::clean();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "num_rounds = 25\n");
    env.set("TRIBOARD_CONFIG", path.to_str().expect("utf8 path"));
    let cfg = config::load(None).expect("load via env");
    assert_eq!(cfg.num_rounds, 25);
}

#[test]
#[serial]
fn env_overrides_beat_the_file() {
    let env = EnvGuard::clean();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "seed = 99\nnum_rounds = 10\n");
    env.set("TRIBOARD_SEED", "7");
    env.set("TRIBOARD_NUM_ROUNDS", "3");
    env.set("TRIBOARD_ENFORCE_GAME_CLOCK", "off");
    let cfg = config::load(Some(&path)).expect("load");
    assert_eq!(cfg.seed, Some(7));
    assert_eq!(cfg.num_rounds, 3);
    assert!(!cfg.enforce_game_clock);
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    let env = EnvGuard::clean();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "num_rounds = 0\n");
    assert!(config::load(Some(&path)).is_err());

    let env_path = write_config(&dir, "num_rounds = 5\n");
    env.set("TRIBOARD_SEED", "not-a-number");
    assert!(config::load(Some(&env_path)).is_err());
}

#[test]
#[serial]
fn malformed_toml_is_a_parse_error() {
    let _env = EnvGuard::clean();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "num_rounds = [\n");
    assert!(config::load(Some(&path)).is_err());
}
