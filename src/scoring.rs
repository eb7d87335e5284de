use serde::{Deserialize, Serialize};

use crate::error::LeagueError;
use crate::types::{Phase, Team, MAX_GAME_SCORE, MIN_WINNING_SCORE, MIN_WIN_MARGIN};

/// A game is valid when both scores are non-negative, at most 99, one
/// side reached 11, and the margin is at least 2. Pure check, raw input
/// comes straight from the score form.
pub fn is_valid_score(score_a: i32, score_b: i32) -> bool {
  if score_a < 0 || score_b < 0 {
    return false;
  }
  if score_a > MAX_GAME_SCORE || score_b > MAX_GAME_SCORE {
    return false;
  }
  if score_a.max(score_b) < MIN_WINNING_SCORE {
    return false;
  }
  (score_a - score_b).abs() >= MIN_WIN_MARGIN
}

/// Submitted outcome of one match. Single-game matches carry one score
/// pair; best-of-3 matches carry the played games in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum MatchResult {
  Single { score_a: u8, score_b: u8 },
  BestOfThree { games: Vec<[u8; 2]> },
}

impl MatchResult {
  pub fn validate(&self) -> Result<(), LeagueError> {
    match self {
      MatchResult::Single { score_a, score_b } => {
        if !is_valid_score(*score_a as i32, *score_b as i32) {
          return Err(LeagueError::Validation(format!(
            "Invalid game score {score_a}-{score_b}."
          )));
        }
        Ok(())
      }
      MatchResult::BestOfThree { games } => {
        if games.len() < 2 || games.len() > 3 {
          return Err(LeagueError::Validation(
            "Best-of-3 needs two or three games.".to_string(),
          ));
        }
        for game in games {
          if !is_valid_score(game[0] as i32, game[1] as i32) {
            return Err(LeagueError::Validation(format!(
              "Invalid game score {}-{}.",
              game[0], game[1]
            )));
          }
        }
        let wins_a = games.iter().filter(|g| g[0] > g[1]).count();
        let wins_b = games.len() - wins_a;
        if wins_a.max(wins_b) != 2 {
          return Err(LeagueError::Validation(
            "Best-of-3 must be decided by exactly two game wins.".to_string(),
          ));
        }
        // A third game only exists when the first two split.
        if games.len() == 3 && (games[0][0] > games[0][1]) == (games[1][0] > games[1][1]) {
          return Err(LeagueError::Validation(
            "Best-of-3 third game submitted after the match was decided.".to_string(),
          ));
        }
        Ok(())
      }
    }
  }

  /// 0 when team A took the match, 1 for team B. Only meaningful on a
  /// result that passed `validate`.
  pub fn winner_index(&self) -> usize {
    match self {
      MatchResult::Single { score_a, score_b } => {
        if score_a > score_b {
          0
        } else {
          1
        }
      }
      MatchResult::BestOfThree { games } => {
        let wins_a = games.iter().filter(|g| g[0] > g[1]).count();
        if wins_a >= 2 {
          0
        } else {
          1
        }
      }
    }
  }

  /// Sum of per-game score deltas from team A's perspective.
  pub fn differential(&self) -> i32 {
    match self {
      MatchResult::Single { score_a, score_b } => *score_a as i32 - *score_b as i32,
      MatchResult::BestOfThree { games } => games
        .iter()
        .map(|g| g[0] as i32 - g[1] as i32)
        .sum(),
    }
  }

  /// Human-readable score line for the match UI, e.g. "11-7" or
  /// "11-7, 9-11, 11-8".
  pub fn summary(&self) -> String {
    match self {
      MatchResult::Single { score_a, score_b } => format!("{score_a}-{score_b}"),
      MatchResult::BestOfThree { games } => games
        .iter()
        .map(|g| format!("{}-{}", g[0], g[1]))
        .collect::<Vec<_>>()
        .join(", "),
    }
  }
}

/// Applies a match outcome to both teams' records for the given phase.
/// When `previous` holds an earlier submission of the same match, its
/// effect is subtracted first, so resubmitting a corrected score is
/// idempotent on wins, losses, and differential. Callers validate before
/// calling; this never fails partway.
pub fn apply_result(
  team_a: &mut Team,
  team_b: &mut Team,
  phase: Phase,
  result: &MatchResult,
  previous: Option<&MatchResult>,
) {
  if let Some(prev) = previous {
    shift_records(team_a, team_b, phase, prev, true);
  }
  shift_records(team_a, team_b, phase, result, false);
}

fn shift_records(
  team_a: &mut Team,
  team_b: &mut Team,
  phase: Phase,
  result: &MatchResult,
  undo: bool,
) {
  let winner_a = result.winner_index() == 0;
  let diff = result.differential();
  apply_side(team_a, phase, winner_a, diff, undo);
  apply_side(team_b, phase, !winner_a, -diff, undo);
}

fn apply_side(team: &mut Team, phase: Phase, won: bool, diff: i32, undo: bool) {
  let (wins, losses, pd) = match phase {
    Phase::Swiss => (
      &mut team.swiss.wins,
      &mut team.swiss.losses,
      &mut team.swiss.diff,
    ),
    Phase::Bracket => (
      &mut team.bracket.wins,
      &mut team.bracket.losses,
      &mut team.bracket.diff,
    ),
  };
  let bucket = if won { wins } else { losses };
  if undo {
    *bucket = bucket.saturating_sub(1);
    *pd -= diff;
  } else {
    *bucket += 1;
    *pd += diff;
  }
}

/// Pushes each team onto the other's weekly opponent list. The caller is
/// responsible for invoking this exactly once per match instance;
/// duplicate entries would corrupt Buchholz and rematch avoidance.
pub fn record_opponents(team_a: &mut Team, team_b: &mut Team) {
  let name_a = team_a.name.clone();
  team_a.swiss.opponents.push(team_b.name.clone());
  team_b.swiss.opponents.push(name_a);
}

// ── Placement point policy ─────────────────────────────────────────────

/// Points handed out per placement tier at week finalization. Tier 0 is
/// the 1st/2nd place match, tier 3 the 7th/8th.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
  pub base_points: [i32; 4],
  pub first_place_bonus: i32,
  pub loser_penalty: i32,
}

impl Default for ScoringConfig {
  fn default() -> Self {
    ScoringConfig {
      base_points: [10, 8, 6, 4],
      first_place_bonus: 5,
      loser_penalty: 2,
    }
  }
}

impl ScoringConfig {
  pub fn winner_points(&self, tier: usize) -> i32 {
    let bonus = if tier == 0 { self.first_place_bonus } else { 0 };
    self.base_points[tier] + bonus
  }

  pub fn loser_points(&self, tier: usize) -> i32 {
    self.base_points[tier] - self.loser_penalty
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_team(name: &str) -> Team {
    Team::new(name, [format!("{name} a"), format!("{name} b")])
  }

  #[test]
  fn score_validity_grid() {
    assert!(is_valid_score(11, 0));
    assert!(is_valid_score(11, 9));
    assert!(is_valid_score(15, 13));
    assert!(is_valid_score(99, 97));
    assert!(!is_valid_score(11, 10)); // margin too small
    assert!(!is_valid_score(10, 8)); // nobody reached 11
    assert!(!is_valid_score(-1, 11));
    assert!(!is_valid_score(100, 5));
    assert!(!is_valid_score(11, 11));
  }

  #[test]
  fn best_of_three_validation() {
    let ok = MatchResult::BestOfThree {
      games: vec![[11, 7], [9, 11], [11, 8]],
    };
    assert!(ok.validate().is_ok());
    assert_eq!(ok.winner_index(), 0);

    let sweep = MatchResult::BestOfThree {
      games: vec![[11, 7], [11, 3]],
    };
    assert!(sweep.validate().is_ok());

    let too_many = MatchResult::BestOfThree {
      games: vec![[11, 7], [11, 3], [11, 5]],
    };
    assert!(too_many.validate().is_err());

    let undecided = MatchResult::BestOfThree {
      games: vec![[11, 7], [7, 11]],
    };
    assert!(undecided.validate().is_err());

    let bad_game = MatchResult::BestOfThree {
      games: vec![[11, 10], [11, 3]],
    };
    assert!(bad_game.validate().is_err());
  }

  #[test]
  fn apply_updates_both_sides() {
    let mut a = make_team("A");
    let mut b = make_team("B");
    let result = MatchResult::Single {
      score_a: 11,
      score_b: 3,
    };
    apply_result(&mut a, &mut b, Phase::Swiss, &result, None);
    assert_eq!(a.swiss.wins, 1);
    assert_eq!(a.swiss.diff, 8);
    assert_eq!(b.swiss.losses, 1);
    assert_eq!(b.swiss.diff, -8);
    assert_eq!(b.swiss.wins, 0);
  }

  #[test]
  fn resubmission_replaces_prior_effect() {
    let mut a = make_team("A");
    let mut b = make_team("B");
    let first = MatchResult::Single {
      score_a: 11,
      score_b: 3,
    };
    let corrected = MatchResult::Single {
      score_a: 9,
      score_b: 11,
    };
    apply_result(&mut a, &mut b, Phase::Swiss, &first, None);
    apply_result(&mut a, &mut b, Phase::Swiss, &corrected, Some(&first));

    // Must match a world where only the corrected score was ever entered.
    let mut a2 = make_team("A");
    let mut b2 = make_team("B");
    apply_result(&mut a2, &mut b2, Phase::Swiss, &corrected, None);
    assert_eq!(a.swiss.wins, a2.swiss.wins);
    assert_eq!(a.swiss.losses, a2.swiss.losses);
    assert_eq!(a.swiss.diff, a2.swiss.diff);
    assert_eq!(b.swiss.wins, b2.swiss.wins);
    assert_eq!(b.swiss.losses, b2.swiss.losses);
    assert_eq!(b.swiss.diff, b2.swiss.diff);
  }

  #[test]
  fn best_of_three_differential_sums_games() {
    let result = MatchResult::BestOfThree {
      games: vec![[11, 7], [9, 11], [11, 8]],
    };
    assert_eq!(result.differential(), 4 - 2 + 3);
    assert_eq!(result.summary(), "11-7, 9-11, 11-8");
  }

  #[test]
  fn bracket_phase_touches_bracket_record_only() {
    let mut a = make_team("A");
    let mut b = make_team("B");
    let result = MatchResult::Single {
      score_a: 11,
      score_b: 6,
    };
    apply_result(&mut a, &mut b, Phase::Bracket, &result, None);
    assert_eq!(a.bracket.wins, 1);
    assert_eq!(a.swiss.wins, 0);
    assert_eq!(b.bracket.diff, -5);
  }

  #[test]
  fn default_point_table() {
    let config = ScoringConfig::default();
    assert_eq!(config.winner_points(0), 15);
    assert_eq!(config.loser_points(0), 8);
    assert_eq!(config.winner_points(1), 8);
    assert_eq!(config.loser_points(1), 6);
    assert_eq!(config.winner_points(2), 6);
    assert_eq!(config.loser_points(2), 4);
    assert_eq!(config.winner_points(3), 4);
    assert_eq!(config.loser_points(3), 2);
  }
}
