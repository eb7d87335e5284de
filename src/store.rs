use std::{
  env, fs,
  path::{Path, PathBuf},
};

use chrono::Local;
use tracing::info;

use crate::error::LeagueError;
use crate::types::{LeagueState, BRACKET_ROUNDS, SEASON_WEEKS, SWISS_ROUNDS, TEAM_COUNT};

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Default location of the persisted season. `LEAGUE_STORE_PATH`
/// overrides it for side-by-side test seasons.
pub fn league_store_path() -> PathBuf {
  if let Ok(raw) = env::var("LEAGUE_STORE_PATH") {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return PathBuf::from(trimmed);
    }
  }
  repo_root().join("league.json")
}

pub fn save_state(path: &Path, state: &LeagueState) -> Result<(), LeagueError> {
  let payload = serde_json::to_string_pretty(state)
    .map_err(|e| LeagueError::Store(format!("serialize season: {e}")))?;
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .map_err(|e| LeagueError::Store(format!("create {}: {e}", parent.display())))?;
  }
  fs::write(path, payload)
    .map_err(|e| LeagueError::Store(format!("write season {}: {e}", path.display())))
}

/// Reads the persisted season. A missing file is a fresh install, not
/// an error.
pub fn load_state(path: &Path) -> Result<Option<LeagueState>, LeagueError> {
  if !path.is_file() {
    return Ok(None);
  }
  let data = fs::read_to_string(path)
    .map_err(|e| LeagueError::Store(format!("read season {}: {e}", path.display())))?;
  let state = serde_json::from_str::<LeagueState>(&data)
    .map_err(|e| LeagueError::Store(format!("parse season {}: {e}", path.display())))?;
  Ok(Some(state))
}

/// Writes a timestamped copy of the season next to the live store.
/// Returns the backup path.
pub fn write_backup(dir: &Path, state: &LeagueState) -> Result<PathBuf, LeagueError> {
  let stamp = Local::now().format("%Y%m%d_%H%M%S");
  let path = dir.join(format!("league_backup_{stamp}.json"));
  save_state(&path, state)?;
  info!("Season backup written to {}", path.display());
  Ok(path)
}

/// Shape checks applied before a loaded or restored season is trusted.
/// Guards referential integrity, not scores: a season with a dangling
/// player-to-team reference would poison every standings pass.
pub fn validate_state(state: &LeagueState) -> Result<(), LeagueError> {
  if state.teams.len() != TEAM_COUNT {
    return Err(LeagueError::Integrity(format!(
      "Season must carry exactly {TEAM_COUNT} teams, found {}.",
      state.teams.len()
    )));
  }
  // SEASON_WEEKS + 1 is the completed-season resting state.
  if state.week == 0 || state.week > SEASON_WEEKS + 1 {
    return Err(LeagueError::Integrity(format!(
      "Week {} is outside the season.",
      state.week
    )));
  }
  if state.swiss_round > SWISS_ROUNDS {
    return Err(LeagueError::Integrity(format!(
      "Swiss round {} does not exist.",
      state.swiss_round
    )));
  }
  if state.bracket_rounds.len() > BRACKET_ROUNDS {
    return Err(LeagueError::Integrity(format!(
      "Bracket has {} rounds, expected at most {BRACKET_ROUNDS}.",
      state.bracket_rounds.len()
    )));
  }
  for player in &state.players {
    if state.team(&player.team).is_none() {
      return Err(LeagueError::Integrity(format!(
        "Player {} references unknown team {}.",
        player.name, player.team
      )));
    }
  }
  for team in &state.teams {
    for name in &team.players {
      if !state.players.iter().any(|p| p.name == *name) {
        return Err(LeagueError::Integrity(format!(
          "Team {} roster entry {} has no player record.",
          team.name, name
        )));
      }
    }
  }
  for open in &state.open_matches {
    for name in &open.teams {
      if state.team(name).is_none() {
        return Err(LeagueError::Integrity(format!(
          "Open match {} references unknown team {}.",
          open.id, name
        )));
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_state() -> LeagueState {
    let rosters = (1..=8)
      .map(|i| (format!("T{i}"), [format!("P{i}a"), format!("P{i}b")]))
      .collect();
    LeagueState::start(rosters).unwrap()
  }

  #[test]
  fn round_trips_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("league.json");
    let mut state = make_state();
    state.week = 7;
    state.teams[0].swiss.wins = 3;

    save_state(&path, &state).unwrap();
    let loaded = load_state(&path).unwrap().unwrap();
    assert_eq!(loaded.week, 7);
    assert_eq!(loaded.teams[0].swiss.wins, 3);
    assert_eq!(loaded.players.len(), 16);
  }

  #[test]
  fn missing_store_is_a_fresh_install() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_state(&dir.path().join("league.json"))
      .unwrap()
      .is_none());
  }

  #[test]
  fn corrupt_store_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("league.json");
    fs::write(&path, "not json").unwrap();
    assert!(load_state(&path).is_err());
  }

  #[test]
  fn backup_lands_in_the_requested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_backup(dir.path(), &make_state()).unwrap();
    assert!(path.starts_with(dir.path()));
    assert!(load_state(&path).unwrap().is_some());
  }

  #[test]
  fn completed_season_week_is_valid() {
    let mut state = make_state();
    state.week = SEASON_WEEKS + 1;
    assert!(validate_state(&state).is_ok());
    state.week = SEASON_WEEKS + 2;
    assert!(validate_state(&state).unwrap_err().is_integrity());
  }

  #[test]
  fn validation_rejects_dangling_references() {
    let mut state = make_state();
    state.players[3].team = "Nowhere".to_string();
    assert!(validate_state(&state).unwrap_err().is_integrity());

    let mut state = make_state();
    state.teams.pop();
    assert!(validate_state(&state).unwrap_err().is_integrity());

    assert!(validate_state(&make_state()).is_ok());
  }
}
