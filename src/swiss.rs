use std::collections::BTreeMap;

use tracing::error;

use crate::error::LeagueError;
use crate::pairing::{pair_pool, PairingOutcome};
use crate::types::{LeagueState, MatchFormat, Phase, TeamPair, SEASON_WEEKS, SWISS_ROUNDS};

/// Starts the next Swiss round: partitions teams into win-loss pools,
/// pairs each pool, and registers the resulting matches. Blocked while
/// the current round still has unreported matches. Returns the new
/// match ids.
pub fn advance_round(state: &mut LeagueState) -> Result<Vec<u64>, LeagueError> {
  if state.week > SEASON_WEEKS {
    return Err(LeagueError::Validation(
      "Season is complete.".to_string(),
    ));
  }
  if state.pending > 0 {
    return Err(LeagueError::Validation(format!(
      "Current round still has {} unreported matches.",
      state.pending
    )));
  }
  if state.swiss_round >= SWISS_ROUNDS {
    return Err(LeagueError::Validation(
      "Swiss phase is already complete.".to_string(),
    ));
  }

  let next_round = state.swiss_round + 1;
  state.clear_done_matches();

  let planned = match next_round {
    1 | 2 => plan_record_pools(state)?,
    3 => plan_round_three(state)?,
    _ => plan_round_four(state)?,
  };

  let ids = planned
    .into_iter()
    .map(|(teams, format)| state.create_match(teams, Phase::Swiss, format))
    .collect();
  state.swiss_round = next_round;
  Ok(ids)
}

/// Teams grouped by exact (wins, losses) record, pool members in team
/// collection order.
fn pools(state: &LeagueState) -> BTreeMap<(u32, u32), Vec<usize>> {
  let mut pools: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::new();
  for (index, team) in state.teams.iter().enumerate() {
    pools
      .entry((team.swiss.wins, team.swiss.losses))
      .or_default()
      .push(index);
  }
  pools
}

fn pair_indices(
  state: &LeagueState,
  indices: &[usize],
  record: (u32, u32),
) -> Result<Vec<TeamPair>, LeagueError> {
  let pool: Vec<&crate::types::Team> = indices.iter().map(|i| &state.teams[*i]).collect();
  match pair_pool(&pool) {
    PairingOutcome::Complete(pairs) => Ok(pairs),
    PairingOutcome::NoValidPairing => {
      error!(
        "No rematch-free pairing exists for the {}-{} pool; round blocked.",
        record.0, record.1
      );
      Err(LeagueError::Integrity(format!(
        "No rematch-free pairing exists for the {}-{} pool.",
        record.0, record.1
      )))
    }
  }
}

/// Rounds 1 and 2: every pool pairs internally, single games.
fn plan_record_pools(state: &LeagueState) -> Result<Vec<(TeamPair, MatchFormat)>, LeagueError> {
  let mut planned = Vec::new();
  for (record, indices) in pools(state) {
    for pair in pair_indices(state, &indices, record)? {
      planned.push((pair, MatchFormat::Single));
    }
  }
  Ok(planned)
}

/// Round 3: the 2-0 and 0-2 pools play best-of-3, the 1-1 pool plays
/// single games and its members become the round-4 field. Two completed
/// rounds can produce no other record; anything else means the state is
/// corrupt and the round refuses to form.
fn plan_round_three(
  state: &mut LeagueState,
) -> Result<Vec<(TeamPair, MatchFormat)>, LeagueError> {
  let mut planned = Vec::new();
  let mut single_pool: Vec<usize> = Vec::new();
  for (record, indices) in pools(state) {
    let format = match record {
      (1, 1) => {
        single_pool.extend(indices.iter().copied());
        MatchFormat::Single
      }
      (2, 0) | (0, 2) => MatchFormat::BestOfThree,
      _ => {
        error!(
          "Round 3 found an impossible {}-{} pool; round blocked.",
          record.0, record.1
        );
        return Err(LeagueError::Integrity(format!(
          "Round 3 found an impossible {}-{} pool.",
          record.0, record.1
        )));
      }
    };
    for pair in pair_indices(state, &indices, record)? {
      planned.push((pair, format));
    }
  }
  for index in single_pool {
    state.teams[index].swiss.played_round3_single = true;
  }
  Ok(planned)
}

/// Round 4 is restricted to the round-3 single-game field: the 2-1
/// teams pair off, the 1-2 teams pair off, two single games total. Any
/// other population is an integrity error and produces no matches. The
/// eligibility marks are consumed either way.
fn plan_round_four(
  state: &mut LeagueState,
) -> Result<Vec<(TeamPair, MatchFormat)>, LeagueError> {
  let mut upper: Vec<String> = Vec::new();
  let mut lower: Vec<String> = Vec::new();
  let mut eligible = 0usize;
  for team in &mut state.teams {
    if !team.swiss.played_round3_single {
      continue;
    }
    team.swiss.played_round3_single = false;
    eligible += 1;
    match (team.swiss.wins, team.swiss.losses) {
      (2, 1) => upper.push(team.name.clone()),
      (1, 2) => lower.push(team.name.clone()),
      _ => {}
    }
  }

  if upper.len() != 2 || lower.len() != 2 {
    error!(
      "Round 4 population mismatch: {} eligible, {} upper, {} lower.",
      eligible,
      upper.len(),
      lower.len()
    );
    return Err(LeagueError::Integrity(format!(
      "Round 4 needs exactly two 2-1 and two 1-2 teams, got {} and {}.",
      upper.len(),
      lower.len()
    )));
  }

  Ok(vec![
    ([upper[0].clone(), upper[1].clone()], MatchFormat::Single),
    ([lower[0].clone(), lower[1].clone()], MatchFormat::Single),
  ])
}
