use crate::types::{Team, TeamPair};

/// Result of pairing one win-loss pool. `Complete` always covers the
/// whole pool; when no rematch-free perfect matching exists the engine
/// says so instead of handing back a short list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairingOutcome {
  Complete(Vec<TeamPair>),
  NoValidPairing,
}

/// Pairs a pool of teams so that no pair has already played this week,
/// via backtracking search over the pool in its given order. Pools
/// smaller than two teams produce no pairs; odd pools can never be
/// covered and report `NoValidPairing`.
pub fn pair_pool(pool: &[&Team]) -> PairingOutcome {
  if pool.len() < 2 {
    return PairingOutcome::Complete(Vec::new());
  }
  if pool.len() % 2 != 0 {
    return PairingOutcome::NoValidPairing;
  }

  let mut paired = vec![false; pool.len()];
  let mut picks: Vec<(usize, usize)> = Vec::with_capacity(pool.len() / 2);
  if !backtrack(pool, &mut paired, &mut picks) {
    return PairingOutcome::NoValidPairing;
  }

  let pairs = picks
    .iter()
    .map(|(a, b)| [pool[*a].name.clone(), pool[*b].name.clone()])
    .collect();
  PairingOutcome::Complete(pairs)
}

fn backtrack(pool: &[&Team], paired: &mut [bool], picks: &mut Vec<(usize, usize)>) -> bool {
  let first = match paired.iter().position(|taken| !taken) {
    Some(index) => index,
    None => return true,
  };
  paired[first] = true;
  for candidate in (first + 1)..pool.len() {
    if paired[candidate] {
      continue;
    }
    if played_before(pool[first], pool[candidate]) {
      continue;
    }
    paired[candidate] = true;
    picks.push((first, candidate));
    if backtrack(pool, paired, picks) {
      return true;
    }
    picks.pop();
    paired[candidate] = false;
  }
  paired[first] = false;
  false
}

fn played_before(a: &Team, b: &Team) -> bool {
  a.swiss.opponents.iter().any(|name| *name == b.name)
    || b.swiss.opponents.iter().any(|name| *name == a.name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::Team;

  fn make_team(name: &str, opponents: &[&str]) -> Team {
    let mut team = Team::new(name, [format!("{name} a"), format!("{name} b")]);
    team.swiss.opponents = opponents.iter().map(|s| s.to_string()).collect();
    team
  }

  fn pairs_of(outcome: PairingOutcome) -> Vec<TeamPair> {
    match outcome {
      PairingOutcome::Complete(pairs) => pairs,
      PairingOutcome::NoValidPairing => panic!("expected a complete pairing"),
    }
  }

  #[test]
  fn empty_and_singleton_pools_produce_no_pairs() {
    assert_eq!(pair_pool(&[]), PairingOutcome::Complete(Vec::new()));
    let lone = make_team("A", &[]);
    assert_eq!(pair_pool(&[&lone]), PairingOutcome::Complete(Vec::new()));
  }

  #[test]
  fn fresh_pool_of_eight_covers_everyone() {
    let teams: Vec<Team> = (1..=8).map(|i| make_team(&format!("T{i}"), &[])).collect();
    let refs: Vec<&Team> = teams.iter().collect();
    let pairs = pairs_of(pair_pool(&refs));
    assert_eq!(pairs.len(), 4);
    let mut seen: Vec<&str> = pairs.iter().flatten().map(|s| s.as_str()).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 8);
  }

  #[test]
  fn never_pairs_prior_opponents() {
    let a = make_team("A", &["B"]);
    let b = make_team("B", &["A"]);
    let c = make_team("C", &[]);
    let d = make_team("D", &[]);
    let pairs = pairs_of(pair_pool(&[&a, &b, &c, &d]));
    for pair in &pairs {
      assert_ne!(pair, &["A".to_string(), "B".to_string()]);
      assert_ne!(pair, &["B".to_string(), "A".to_string()]);
    }
  }

  #[test]
  fn backtracks_out_of_a_greedy_dead_end() {
    // A-B is the first candidate pair, but taking it strands C and D,
    // who already played. The search has to undo A-B and cross-pair.
    let a = make_team("A", &[]);
    let b = make_team("B", &[]);
    let c = make_team("C", &["D"]);
    let d = make_team("D", &["C"]);
    let pairs = pairs_of(pair_pool(&[&a, &b, &c, &d]));
    assert_eq!(pairs.len(), 2);
    for pair in &pairs {
      assert!(!(pair.contains(&"C".to_string()) && pair.contains(&"D".to_string())));
    }
  }

  #[test]
  fn reports_when_no_rematch_free_matching_exists() {
    let a = make_team("A", &["B"]);
    let b = make_team("B", &["A"]);
    assert_eq!(pair_pool(&[&a, &b]), PairingOutcome::NoValidPairing);
  }

  #[test]
  fn odd_pool_is_rejected() {
    let a = make_team("A", &[]);
    let b = make_team("B", &[]);
    let c = make_team("C", &[]);
    assert_eq!(pair_pool(&[&a, &b, &c]), PairingOutcome::NoValidPairing);
  }
}
