use std::cmp::Ordering;

use crate::types::{Player, Team};

/// Buchholz tiebreak: the sum of current Swiss win counts over every
/// opponent the team has faced this week. Opponent names that no longer
/// resolve contribute nothing.
pub fn buchholz(team: &Team, teams: &[Team]) -> u32 {
    team.swiss
        .opponents
        .iter()
        .filter_map(|name| teams.iter().find(|t| t.name == *name))
        .map(|opponent| opponent.swiss.wins)
        .sum()
}

/// Weekly Swiss ordering: wins desc, Buchholz desc, differential desc,
/// name asc. Total order for any input set.
pub fn compare_teams_by_swiss(a: &Team, b: &Team, teams: &[Team]) -> Ordering {
    let wins = b.swiss.wins.cmp(&a.swiss.wins);
    if wins != Ordering::Equal {
        return wins;
    }
    let tiebreak = buchholz(b, teams).cmp(&buchholz(a, teams));
    if tiebreak != Ordering::Equal {
        return tiebreak;
    }
    let diff = b.swiss.diff.cmp(&a.swiss.diff);
    if diff != Ordering::Equal {
        return diff;
    }
    a.name.cmp(&b.name)
}

/// Read-only sorted snapshot for the standings table and bracket seeding.
pub fn sort_teams_by_swiss(teams: &[Team]) -> Vec<Team> {
    let mut sorted = teams.to_vec();
    sorted.sort_by(|a, b| compare_teams_by_swiss(a, b, teams));
    sorted
}

/// Season-wide league ordering: points desc, wins desc, differential
/// desc, name asc.
pub fn compare_players_by_league(a: &Player, b: &Player) -> Ordering {
    let points = b.league.points.cmp(&a.league.points);
    if points != Ordering::Equal {
        return points;
    }
    let wins = b.league.wins.cmp(&a.league.wins);
    if wins != Ordering::Equal {
        return wins;
    }
    let diff = b.league.diff.cmp(&a.league.diff);
    if diff != Ordering::Equal {
        return diff;
    }
    a.name.cmp(&b.name)
}

pub fn sort_players_by_league(players: &[Player]) -> Vec<Player> {
    let mut sorted = players.to_vec();
    sorted.sort_by(compare_players_by_league);
    sorted
}
