use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::error::LeagueError;
use crate::scoring::MatchResult;

// ── Constants ──────────────────────────────────────────────────────────

pub const TEAM_COUNT: usize = 8;
pub const PLAYERS_PER_TEAM: usize = 2;
pub const SEASON_WEEKS: u32 = 15;
pub const SWISS_ROUNDS: u8 = 4;
pub const BRACKET_ROUNDS: usize = 3;
pub const MAX_GAME_SCORE: i32 = 99;
pub const MIN_WINNING_SCORE: i32 = 11;
pub const MIN_WIN_MARGIN: i32 = 2;

// ── Shared state type aliases ──────────────────────────────────────────

pub type SharedLeague = Arc<Mutex<crate::league::League>>;

// ── Phase & format flags ───────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Swiss,
    Bracket,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchFormat {
    Single,
    BestOfThree,
}

// ── Team & player records ──────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwissRecord {
    pub wins: u32,
    pub losses: u32,
    pub diff: i32,
    /// Opponent team names faced this week, one entry per completed match.
    /// Drives rematch avoidance and Buchholz.
    pub opponents: Vec<String>,
    /// Reserved for a future head-to-head tiebreak; nothing reads it yet.
    pub head_to_head: HashMap<String, i32>,
    /// Marks teams placed into the round-3 single-game pool; gates round-4
    /// eligibility and is cleared once round 4 has been formed.
    pub played_round3_single: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BracketRecord {
    pub wins: u32,
    pub losses: u32,
    pub diff: i32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueRecord {
    pub points: i32,
    pub wins: u32,
    pub losses: u32,
    pub diff: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    pub players: [String; PLAYERS_PER_TEAM],
    #[serde(default)]
    pub swiss: SwissRecord,
    #[serde(default)]
    pub bracket: BracketRecord,
}

impl Team {
    pub fn new(name: impl Into<String>, players: [String; PLAYERS_PER_TEAM]) -> Self {
        Team {
            name: name.into(),
            players,
            swiss: SwissRecord::default(),
            bracket: BracketRecord::default(),
        }
    }

    /// Clears both phase-scoped record blocks for the next week.
    pub fn reset_week(&mut self) {
        self.swiss = SwissRecord::default();
        self.bracket = BracketRecord::default();
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    /// Back-reference to the owning team, by name.
    pub team: String,
    #[serde(default)]
    pub league: LeagueRecord,
}

// ── Matches ────────────────────────────────────────────────────────────

pub type TeamPair = [String; 2];

/// A match handed out by a round controller, alive until its round is
/// torn down. Corrections re-submit against the same id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenMatch {
    pub id: u64,
    pub teams: TeamPair,
    pub phase: Phase,
    pub format: MatchFormat,
    /// Set on the first successful submission; the pending counter is
    /// only ever decremented once per match.
    pub done: bool,
    /// Opponent history is recorded exactly once per match, no matter how
    /// many times the score is corrected afterwards.
    pub opponents_recorded: bool,
    /// Undo baseline for resubmission.
    pub last_result: Option<MatchResult>,
}

// ── Season state (root aggregate) ──────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueState {
    /// 1..=15.
    pub week: u32,
    /// 0 = Swiss not started, 1..=4 = round in flight or finished.
    pub swiss_round: u8,
    /// Unsubmitted matches in the in-flight round; gates advancement.
    pub pending: u32,
    /// Three bracket round slots, populated progressively.
    pub bracket_rounds: Vec<Vec<TeamPair>>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub open_matches: Vec<OpenMatch>,
    pub next_match_id: u64,
}

impl Default for LeagueState {
    fn default() -> Self {
        LeagueState {
            week: 1,
            swiss_round: 0,
            pending: 0,
            bracket_rounds: Vec::new(),
            teams: Vec::new(),
            players: Vec::new(),
            open_matches: Vec::new(),
            next_match_id: 1,
        }
    }
}

impl LeagueState {
    /// Builds a fresh week-1 state from team rosters. Each roster entry is
    /// a team name plus its two player names.
    pub fn start(rosters: Vec<(String, [String; PLAYERS_PER_TEAM])>) -> Result<Self, LeagueError> {
        if rosters.len() != TEAM_COUNT {
            return Err(LeagueError::Validation(format!(
                "League needs exactly {TEAM_COUNT} teams, got {}.",
                rosters.len()
            )));
        }
        let mut state = LeagueState::default();
        for (name, players) in rosters {
            if state.teams.iter().any(|t| t.name == name) {
                return Err(LeagueError::Validation(format!(
                    "Duplicate team name: {name}."
                )));
            }
            for player in &players {
                if state.players.iter().any(|p| p.name == *player) {
                    return Err(LeagueError::Validation(format!(
                        "Duplicate player name: {player}."
                    )));
                }
                state.players.push(Player {
                    name: player.clone(),
                    team: name.clone(),
                    league: LeagueRecord::default(),
                });
            }
            state.teams.push(Team::new(name, players));
        }
        Ok(state)
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.name == name)
    }

    pub fn team_index(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.name == name)
    }

    pub fn open_match(&self, id: u64) -> Option<&OpenMatch> {
        self.open_matches.iter().find(|m| m.id == id)
    }

    pub fn open_match_mut(&mut self, id: u64) -> Option<&mut OpenMatch> {
        self.open_matches.iter_mut().find(|m| m.id == id)
    }

    /// Registers a new match for the current round and bumps the pending
    /// counter.
    pub fn create_match(&mut self, teams: TeamPair, phase: Phase, format: MatchFormat) -> u64 {
        let id = self.next_match_id;
        self.next_match_id += 1;
        self.open_matches.push(OpenMatch {
            id,
            teams,
            phase,
            format,
            done: false,
            opponents_recorded: false,
            last_result: None,
        });
        self.pending += 1;
        id
    }

    /// Drops completed matches; called when a round is torn down so stale
    /// ids can no longer be corrected.
    pub fn clear_done_matches(&mut self) {
        self.open_matches.retain(|m| !m.done);
    }

    /// True once week 15's bracket has been finalized. The week counter
    /// rests one past the last playable week; no further rounds start.
    pub fn season_complete(&self) -> bool {
        self.week > SEASON_WEEKS
    }
}
