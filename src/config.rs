use crate::types::*;
use chrono::Local;
use std::{
  env,
  fs,
  path::{Path, PathBuf},
};
use tracing::info;

pub const FIXTURE_PATH_VAR: &str = "KNOCKOUT_FIXTURE_PATH";
pub const LOG_DIR_VAR: &str = "KNOCKOUT_LOG_DIR";
pub const START_GAMEWEEK_VAR: &str = "KNOCKOUT_START_GAMEWEEK";
pub const PRETTY_VAR: &str = "KNOCKOUT_PRETTY";

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn default_fixture_path() -> PathBuf {
  repo_root().join("fixtures").join("office_league.json")
}

pub fn default_log_dir() -> PathBuf {
  repo_root().join("logs")
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn env_flag_true(key: &str) -> bool {
  env_default(key)
    .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
    .unwrap_or(false)
}

/// Fills whatever the caller left empty from the environment.
pub fn apply_env_defaults(mut config: KnockoutConfig) -> KnockoutConfig {
  if config.fixture_path.trim().is_empty() {
    if let Some(value) = env_default(FIXTURE_PATH_VAR) {
      config.fixture_path = value;
    }
  }
  if config.log_dir.trim().is_empty() {
    if let Some(value) = env_default(LOG_DIR_VAR) {
      config.log_dir = value;
    }
  }
  if config.start_gameweek.is_none() {
    config.start_gameweek = env_default(START_GAMEWEEK_VAR).and_then(|value| value.parse().ok());
  }
  if !config.pretty {
    config.pretty = env_flag_true(PRETTY_VAR);
  }
  config
}

pub fn fixture_path(config: &KnockoutConfig) -> PathBuf {
  if config.fixture_path.trim().is_empty() {
    default_fixture_path()
  } else {
    resolve_repo_path(config.fixture_path.trim())
  }
}

pub fn log_dir(config: &KnockoutConfig) -> PathBuf {
  if config.log_dir.trim().is_empty() {
    default_log_dir()
  } else {
    resolve_repo_path(config.log_dir.trim())
  }
}

pub fn load_fixture(path: &Path) -> Result<StandingsFixture, String> {
  if !path.is_file() {
    return Err(format!("Standings fixture not found at {}", path.display()));
  }
  let data = fs::read_to_string(path).map_err(|e| format!("read fixture {}: {e}", path.display()))?;
  let fixture = serde_json::from_str::<StandingsFixture>(&data)
    .map_err(|e| format!("parse fixture {}: {e}", path.display()))?;
  info!(
    "Loaded fixture \"{}\" with {} participants and {} score sheets",
    fixture.name,
    fixture.participants.len(),
    fixture.scores.len()
  );
  Ok(fixture)
}

/// Command line first, then environment, then the fixture, then gameweek 1.
pub fn start_gameweek(config: &KnockoutConfig, fixture: &StandingsFixture) -> u32 {
  config.start_gameweek.or(fixture.start_gameweek).unwrap_or(1)
}

/// Loads `.env` from the crate root without overriding variables already set.
/// Returns the keys it set so they can be logged once tracing is up.
pub fn load_env_file() -> Vec<String> {
  load_env_from(&repo_root().join(".env"))
}

pub fn load_env_from(env_path: &Path) -> Vec<String> {
  let Ok(contents) = fs::read_to_string(env_path) else {
    return Vec::new();
  };
  let mut applied = Vec::new();
  for (key, value) in contents.lines().filter_map(parse_env_line) {
    if env::var_os(&key).is_none() {
      env::set_var(&key, value);
      applied.push(key);
    }
  }
  applied
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let raw_value = raw_value.trim();
  let value = ['"', '\'']
    .iter()
    .find_map(|quote| raw_value.strip_prefix(*quote)?.strip_suffix(*quote))
    .unwrap_or_else(|| raw_value.split('#').next().unwrap_or("").trim_end());
  Some((key.to_string(), value.to_string()))
}

pub fn log_env_warnings(config: &KnockoutConfig) {
  let mut warnings = Vec::new();

  if let Some(raw) = env_default(START_GAMEWEEK_VAR) {
    if raw.parse::<u32>().is_err() {
      warnings.push(format!("{START_GAMEWEEK_VAR}={raw} is not a gameweek number and is ignored"));
    }
  }
  if let Some(gameweek) = config.start_gameweek {
    if gameweek == 0 || gameweek > LAST_GAMEWEEK {
      warnings.push(format!("Start gameweek {gameweek} is outside 1..={LAST_GAMEWEEK}"));
    }
  }
  if !fixture_path(config).is_file() {
    warnings.push(format!(
      "No standings fixture at {} (set {FIXTURE_PATH_VAR} or pass a path)",
      fixture_path(config).display()
    ));
  }

  for msg in warnings {
    tracing::warn!("{}", msg);
  }
}

pub fn timestamp() -> String {
  Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_env_line() {
    assert_eq!(parse_env_line("# comment"), None);
    assert_eq!(parse_env_line("   "), None);
    assert_eq!(parse_env_line("=value"), None);
    assert_eq!(parse_env_line("NO_EQUALS"), None);
    assert_eq!(
      parse_env_line("export KNOCKOUT_PRETTY=true"),
      Some(("KNOCKOUT_PRETTY".to_string(), "true".to_string()))
    );
    assert_eq!(
      parse_env_line("KNOCKOUT_LOG_DIR = \"/tmp/knockout logs\""),
      Some(("KNOCKOUT_LOG_DIR".to_string(), "/tmp/knockout logs".to_string()))
    );
    assert_eq!(
      parse_env_line("KNOCKOUT_START_GAMEWEEK=12 # first cup round"),
      Some(("KNOCKOUT_START_GAMEWEEK".to_string(), "12".to_string()))
    );
    assert_eq!(
      parse_env_line("NAME='#hash kept'"),
      Some(("NAME".to_string(), "#hash kept".to_string()))
    );
  }

  #[test]
  fn test_load_env_from_reports_only_new_keys() {
    let env_path = env::temp_dir().join(format!("fpl-knockout-{}.env", std::process::id()));
    fs::write(
      &env_path,
      "KNOCKOUT_TEST_ENV_FRESH=fresh\nKNOCKOUT_TEST_ENV_TAKEN=from file\n# KNOCKOUT_TEST_ENV_COMMENTED=1\n",
    )
    .unwrap();
    env::set_var("KNOCKOUT_TEST_ENV_TAKEN", "from shell");

    let applied = load_env_from(&env_path);
    fs::remove_file(&env_path).ok();

    assert_eq!(applied, vec!["KNOCKOUT_TEST_ENV_FRESH".to_string()]);
    assert_eq!(env_default("KNOCKOUT_TEST_ENV_FRESH").as_deref(), Some("fresh"));
    assert_eq!(env_default("KNOCKOUT_TEST_ENV_TAKEN").as_deref(), Some("from shell"));
    assert!(load_env_from(&env_path).is_empty());
  }

  #[test]
  fn test_start_gameweek_precedence() {
    let mut fixture = StandingsFixture::default();
    let mut config = KnockoutConfig::default();
    assert_eq!(start_gameweek(&config, &fixture), 1);
    fixture.start_gameweek = Some(16);
    assert_eq!(start_gameweek(&config, &fixture), 16);
    config.start_gameweek = Some(20);
    assert_eq!(start_gameweek(&config, &fixture), 20);
  }

  #[test]
  fn test_relative_paths_resolve_from_repo_root() {
    let config = KnockoutConfig {
      fixture_path: "fixtures/other.json".to_string(),
      log_dir: "/var/log/knockout".to_string(),
      ..KnockoutConfig::default()
    };
    assert_eq!(fixture_path(&config), repo_root().join("fixtures/other.json"));
    assert_eq!(log_dir(&config), PathBuf::from("/var/log/knockout"));
  }

  #[test]
  fn test_load_fixture() {
    let fixture = load_fixture(&default_fixture_path()).unwrap();
    assert_eq!(fixture.participants.len(), 6);
    assert_eq!(fixture.start_gameweek, Some(20));
    assert_eq!(fixture.scores.get(&20).and_then(|sheet| sheet.get(&4_301_117)), Some(&0));

    let missing = repo_root().join("fixtures").join("missing.json");
    assert!(load_fixture(&missing).unwrap_err().starts_with("Standings fixture not found"));
  }
}
