use crate::standings;
use crate::types::{Player, Team};

/// Season leaderboard as CSV, one row per player in league order.
pub fn league_standings_csv(players: &[Player]) -> String {
  let mut out = String::from("rank,player,team,points,wins,losses,differential\n");
  for (rank, player) in standings::sort_players_by_league(players).iter().enumerate() {
    out.push_str(&format!(
      "{},{},{},{},{},{},{}\n",
      rank + 1,
      csv_field(&player.name),
      csv_field(&player.team),
      player.league.points,
      player.league.wins,
      player.league.losses,
      player.league.diff
    ));
  }
  out
}

/// Current-week Swiss table as CSV, one row per team in seed order.
pub fn swiss_standings_csv(teams: &[Team]) -> String {
  let mut out = String::from("seed,team,wins,losses,differential,buchholz\n");
  for (seed, team) in standings::sort_teams_by_swiss(teams).iter().enumerate() {
    out.push_str(&format!(
      "{},{},{},{},{},{}\n",
      seed + 1,
      csv_field(&team.name),
      team.swiss.wins,
      team.swiss.losses,
      team.swiss.diff,
      standings::buchholz(team, teams)
    ));
  }
  out
}

/// Quotes a field when it carries a delimiter, quote, or newline.
fn csv_field(raw: &str) -> String {
  if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
    format!("\"{}\"", raw.replace('"', "\"\""))
  } else {
    raw.to_string()
  }
}
