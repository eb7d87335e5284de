use std::collections::VecDeque;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::bracket::{self, RoundCompletion};
use crate::error::LeagueError;
use crate::scoring::{self, MatchResult, ScoringConfig};
use crate::standings;
use crate::store;
use crate::swiss;
use crate::types::{LeagueState, MatchFormat, Phase, Player, Team, PLAYERS_PER_TEAM};

/// Human-readable outcome handed back to the match UI after a
/// submission.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
  pub winner: String,
  pub loser: String,
  pub summary: String,
}

/// Root aggregate: owns the season state, the scoring policy, the
/// bracket completion registration for the round in flight, and the
/// deferred-task queue that stands in for the browser's microtask
/// queue. All mutation goes through here so every operation ends with a
/// store write.
pub struct League {
  state: LeagueState,
  scoring: ScoringConfig,
  store_path: Option<PathBuf>,
  bracket_completion: Option<RoundCompletion>,
  deferred: VecDeque<RoundCompletion>,
}

impl League {
  pub fn new(
    rosters: Vec<(String, [String; PLAYERS_PER_TEAM])>,
  ) -> Result<Self, LeagueError> {
    Ok(League::from_state(LeagueState::start(rosters)?))
  }

  pub fn from_state(state: LeagueState) -> Self {
    let bracket_completion = infer_bracket_completion(&state);
    League {
      state,
      scoring: ScoringConfig::default(),
      store_path: None,
      bracket_completion,
      deferred: VecDeque::new(),
    }
  }

  /// Loads the saved season from the store, if one exists.
  pub fn load(path: PathBuf) -> Result<Option<Self>, LeagueError> {
    let Some(state) = store::load_state(&path)? else {
      return Ok(None);
    };
    store::validate_state(&state)?;
    Ok(Some(League::from_state(state).with_store(path)))
  }

  pub fn with_store(mut self, path: PathBuf) -> Self {
    self.store_path = Some(path);
    self
  }

  pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
    self.scoring = scoring;
    self
  }

  // ── Read-only queries for the rendering collaborator ─────────────────

  pub fn state(&self) -> &LeagueState {
    &self.state
  }

  pub fn swiss_standings(&self) -> Vec<Team> {
    standings::sort_teams_by_swiss(&self.state.teams)
  }

  pub fn league_standings(&self) -> Vec<Player> {
    standings::sort_players_by_league(&self.state.players)
  }

  pub fn buchholz(&self, team_name: &str) -> u32 {
    self
      .state
      .team(team_name)
      .map(|team| standings::buchholz(team, &self.state.teams))
      .unwrap_or(0)
  }

  pub fn has_deferred_work(&self) -> bool {
    !self.deferred.is_empty()
  }

  // ── Round control ────────────────────────────────────────────────────

  /// Starts the next Swiss round. Swiss rounds never auto-chain; the
  /// operator advances explicitly once the pending count hits zero.
  pub fn advance_swiss_round(&mut self) -> Result<Vec<u64>, LeagueError> {
    let ids = swiss::advance_round(&mut self.state)?;
    self.save();
    Ok(ids)
  }

  /// Seeds the placement bracket from the Swiss standings and opens
  /// round 1. Later rounds are driven by match completion.
  pub fn start_bracket(&mut self) -> Result<Vec<u64>, LeagueError> {
    let pairs = bracket::seed_round_one(&mut self.state)?;
    let ids = self.open_bracket_round(pairs, RoundCompletion::SeedRoundTwo)?;
    self.save();
    Ok(ids)
  }

  /// Creates a bracket round's matches and registers its completion.
  /// An empty round would leave the completion unreachable (pending
  /// never moves off zero), so it is rejected before anything is
  /// registered.
  fn open_bracket_round(
    &mut self,
    pairs: Vec<crate::types::TeamPair>,
    completion: RoundCompletion,
  ) -> Result<Vec<u64>, LeagueError> {
    if pairs.is_empty() {
      return Err(LeagueError::Integrity(
        "Bracket round has no matches; completion not registered.".to_string(),
      ));
    }
    self.state.clear_done_matches();
    let ids = pairs
      .into_iter()
      .map(|pair| {
        self
          .state
          .create_match(pair, Phase::Bracket, MatchFormat::Single)
      })
      .collect();
    self.bracket_completion = Some(completion);
    Ok(ids)
  }

  // ── Match submission ─────────────────────────────────────────────────

  /// Records a match outcome. The first successful submission marks the
  /// match done and decrements pending; later submissions of the same
  /// match correct the score (undo + reapply) without touching pending
  /// or opponent history. When the last bracket match of a round lands,
  /// the registered completion is queued — not run — so it observes the
  /// fully saved state of this submission.
  pub fn submit_result(
    &mut self,
    match_id: u64,
    result: MatchResult,
  ) -> Result<MatchOutcome, LeagueError> {
    let open = self
      .state
      .open_match(match_id)
      .cloned()
      .ok_or_else(|| LeagueError::Validation("Match not found.".to_string()))?;

    let format_matches = matches!(
      (&open.format, &result),
      (MatchFormat::Single, MatchResult::Single { .. })
        | (MatchFormat::BestOfThree, MatchResult::BestOfThree { .. })
    );
    if !format_matches {
      return Err(LeagueError::Validation(
        "Submitted score does not match the match format.".to_string(),
      ));
    }
    result.validate()?;

    let index_a = self.state.team_index(&open.teams[0]).ok_or_else(|| {
      LeagueError::Integrity(format!("Match references unknown team {}.", open.teams[0]))
    })?;
    let index_b = self.state.team_index(&open.teams[1]).ok_or_else(|| {
      LeagueError::Integrity(format!("Match references unknown team {}.", open.teams[1]))
    })?;

    let record_opponents = open.phase == Phase::Swiss && !open.opponents_recorded;
    {
      let (team_a, team_b) = two_teams_mut(&mut self.state.teams, index_a, index_b);
      scoring::apply_result(team_a, team_b, open.phase, &result, open.last_result.as_ref());
      if record_opponents {
        scoring::record_opponents(team_a, team_b);
      }
    }

    let winner_index = result.winner_index();
    let outcome = MatchOutcome {
      winner: open.teams[winner_index].clone(),
      loser: open.teams[1 - winner_index].clone(),
      summary: result.summary(),
    };

    let first_submission = !open.done;
    if let Some(entry) = self.state.open_match_mut(match_id) {
      entry.done = true;
      entry.last_result = Some(result);
      if record_opponents {
        entry.opponents_recorded = true;
      }
    }
    if first_submission {
      self.state.pending = self.state.pending.saturating_sub(1);
    }

    self.save();

    if open.phase == Phase::Bracket && first_submission && self.state.pending == 0 {
      if let Some(completion) = self.bracket_completion.take() {
        self.deferred.push_back(completion);
      }
    }

    Ok(outcome)
  }

  /// Drains the deferred queue. The event loop calls this after the
  /// submit handler (and its save) returns, which is what guarantees a
  /// bracket completion never observes a half-applied submission.
  pub fn run_deferred(&mut self) -> Result<(), LeagueError> {
    while let Some(completion) = self.deferred.pop_front() {
      match completion {
        RoundCompletion::SeedRoundTwo => {
          let pairs = bracket::seed_round_two(&mut self.state)?;
          self.open_bracket_round(pairs, RoundCompletion::SeedRoundThree)?;
        }
        RoundCompletion::SeedRoundThree => {
          let pairs = bracket::seed_round_three(&mut self.state)?;
          self.open_bracket_round(pairs, RoundCompletion::FinalizeWeek)?;
        }
        RoundCompletion::FinalizeWeek => {
          bracket::finalize_week(&mut self.state, &self.scoring)?;
          info!("Week {} opened; standings updated.", self.state.week);
        }
      }
      self.save();
    }
    Ok(())
  }

  // ── Wholesale replacement ────────────────────────────────────────────

  /// Starts the season over with the current rosters.
  pub fn reset(&mut self) -> Result<(), LeagueError> {
    let rosters = self
      .state
      .teams
      .iter()
      .map(|team| (team.name.clone(), team.players.clone()))
      .collect();
    self.state = LeagueState::start(rosters)?;
    self.bracket_completion = None;
    self.deferred.clear();
    self.save();
    Ok(())
  }

  /// Replaces the season state wholesale from a backup.
  pub fn restore(&mut self, state: LeagueState) -> Result<(), LeagueError> {
    store::validate_state(&state)?;
    self.bracket_completion = infer_bracket_completion(&state);
    self.deferred.clear();
    self.state = state;
    self.save();
    Ok(())
  }

  /// Fire-and-forget store write after every mutating operation. A
  /// failing store degrades to an in-memory session.
  fn save(&self) {
    let Some(path) = &self.store_path else {
      return;
    };
    if let Err(err) = store::save_state(path, &self.state) {
      warn!("Persistence failed, continuing in memory: {err}");
    }
  }
}

fn two_teams_mut(teams: &mut [Team], index_a: usize, index_b: usize) -> (&mut Team, &mut Team) {
  if index_a < index_b {
    let (left, right) = teams.split_at_mut(index_b);
    (&mut left[index_a], &mut right[0])
  } else {
    let (left, right) = teams.split_at_mut(index_a);
    (&mut right[0], &mut left[index_b])
  }
}

/// Reconstructs the completion registration for a bracket round that was
/// in flight when the state was saved: the deepest populated round slot
/// tells us which completion was armed.
fn infer_bracket_completion(state: &LeagueState) -> Option<RoundCompletion> {
  if state.bracket_rounds.is_empty() || state.pending == 0 {
    return None;
  }
  let filled = state
    .bracket_rounds
    .iter()
    .filter(|round| !round.is_empty())
    .count();
  match filled {
    1 => Some(RoundCompletion::SeedRoundTwo),
    2 => Some(RoundCompletion::SeedRoundThree),
    _ => Some(RoundCompletion::FinalizeWeek),
  }
}
