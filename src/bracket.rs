use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LeagueError;
use crate::scoring::ScoringConfig;
use crate::standings;
use crate::types::{LeagueState, TeamPair, SWISS_ROUNDS, TEAM_COUNT};

/// What happens when a bracket round's last match is reported. Owned by
/// the league aggregate for the round in flight, taken before it runs,
/// and executed from the deferred queue, never inside the submit path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundCompletion {
  SeedRoundTwo,
  SeedRoundThree,
  FinalizeWeek,
}

/// Seeds the placement bracket from the final Swiss standings: 1v8,
/// 4v5, 2v7, 3v6.
pub fn seed_round_one(state: &mut LeagueState) -> Result<Vec<TeamPair>, LeagueError> {
  if state.teams.len() != TEAM_COUNT {
    return Err(LeagueError::Integrity(format!(
      "Bracket needs exactly {TEAM_COUNT} teams, got {}.",
      state.teams.len()
    )));
  }
  if state.swiss_round < SWISS_ROUNDS {
    return Err(LeagueError::Validation(
      "Swiss phase is not complete.".to_string(),
    ));
  }
  if state.pending > 0 {
    return Err(LeagueError::Validation(format!(
      "Swiss round 4 still has {} unreported matches.",
      state.pending
    )));
  }
  if !state.bracket_rounds.is_empty() {
    return Err(LeagueError::Validation(
      "Bracket has already been seeded.".to_string(),
    ));
  }

  let seeds: Vec<String> = standings::sort_teams_by_swiss(&state.teams)
    .into_iter()
    .map(|team| team.name)
    .collect();
  let pairs = vec![
    [seeds[0].clone(), seeds[7].clone()],
    [seeds[3].clone(), seeds[4].clone()],
    [seeds[1].clone(), seeds[6].clone()],
    [seeds[2].clone(), seeds[5].clone()],
  ];
  state.bracket_rounds = vec![pairs.clone(), Vec::new(), Vec::new()];
  Ok(pairs)
}

/// Round 2 runs the winners and consolation halves in parallel: the
/// four round-1 winners pair off, and so do the four losers.
pub fn seed_round_two(state: &mut LeagueState) -> Result<Vec<TeamPair>, LeagueError> {
  let round_one = round_pairs(state, 0)?;
  let mut winners = Vec::with_capacity(4);
  let mut losers = Vec::with_capacity(4);
  for pair in &round_one {
    let (winner, loser) = pair_winner(state, pair)?;
    winners.push(winner);
    losers.push(loser);
  }
  let pairs = vec![
    [winners[0].clone(), winners[1].clone()],
    [winners[2].clone(), winners[3].clone()],
    [losers[0].clone(), losers[1].clone()],
    [losers[2].clone(), losers[3].clone()],
  ];
  state.bracket_rounds[1] = pairs.clone();
  Ok(pairs)
}

/// Round 3 fixes the placement tiers: index 0 plays for 1st/2nd down to
/// index 3 for 7th/8th.
pub fn seed_round_three(state: &mut LeagueState) -> Result<Vec<TeamPair>, LeagueError> {
  let round_two = round_pairs(state, 1)?;
  let mut winners = Vec::with_capacity(4);
  let mut losers = Vec::with_capacity(4);
  for pair in &round_two {
    let (winner, loser) = pair_winner(state, pair)?;
    winners.push(winner);
    losers.push(loser);
  }
  let pairs = vec![
    [winners[0].clone(), winners[1].clone()],
    [losers[0].clone(), losers[1].clone()],
    [winners[2].clone(), winners[3].clone()],
    [losers[2].clone(), losers[3].clone()],
  ];
  state.bracket_rounds[2] = pairs.clone();
  Ok(pairs)
}

fn round_pairs(state: &LeagueState, index: usize) -> Result<Vec<TeamPair>, LeagueError> {
  let pairs = state
    .bracket_rounds
    .get(index)
    .cloned()
    .unwrap_or_default();
  if pairs.len() != 4 {
    return Err(LeagueError::Integrity(format!(
      "Bracket round {} has {} pairs, expected 4.",
      index + 1,
      pairs.len()
    )));
  }
  Ok(pairs)
}

/// The team with the higher bracket-phase win count takes the pair.
/// Equal counts should not happen under the round rules; when they do,
/// the first slot wins, deterministically.
pub fn pair_winner(
  state: &LeagueState,
  pair: &TeamPair,
) -> Result<(String, String), LeagueError> {
  let team_a = state.team(&pair[0]).ok_or_else(|| {
    LeagueError::Integrity(format!("Bracket pair references unknown team {}.", pair[0]))
  })?;
  let team_b = state.team(&pair[1]).ok_or_else(|| {
    LeagueError::Integrity(format!("Bracket pair references unknown team {}.", pair[1]))
  })?;
  if team_b.bracket.wins > team_a.bracket.wins {
    Ok((pair[1].clone(), pair[0].clone()))
  } else {
    Ok((pair[0].clone(), pair[1].clone()))
  }
}

/// Awards placement points from the round-3 tiers into every player's
/// cumulative league record, folds in each team's bracket record, then
/// resets both phase blocks and rolls the state over to the next week.
pub fn finalize_week(
  state: &mut LeagueState,
  scoring: &ScoringConfig,
) -> Result<(), LeagueError> {
  let tiers = round_pairs(state, 2)?;
  for (tier, pair) in tiers.iter().enumerate() {
    let (winner, loser) = pair_winner(state, pair)?;
    award_team(state, &winner, scoring.winner_points(tier));
    award_team(state, &loser, scoring.loser_points(tier));
  }

  for team in &mut state.teams {
    team.reset_week();
  }
  state.week += 1;
  state.swiss_round = 0;
  state.bracket_rounds.clear();
  state.open_matches.clear();
  state.pending = 0;
  Ok(())
}

/// Adds `points` plus the team's bracket record to each rostered
/// player's cumulative league record. A roster name that no longer
/// resolves is skipped and logged; the rest of the award proceeds.
fn award_team(state: &mut LeagueState, team_name: &str, points: i32) {
  let Some(team) = state.team(team_name) else {
    warn!("Point award skipped: team {team_name} not found.");
    return;
  };
  let roster = team.players.clone();
  let record = team.bracket.clone();
  for player_name in &roster {
    match state.players.iter_mut().find(|p| p.name == *player_name) {
      Some(player) => {
        player.league.points += points;
        player.league.wins += record.wins;
        player.league.losses += record.losses;
        player.league.diff += record.diff;
      }
      None => {
        warn!("Point award skipped: player {player_name} on team {team_name} not found.");
      }
    }
  }
}
