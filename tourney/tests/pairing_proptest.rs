/// Property-based tests for pairing and rating using proptest
///
/// These tests play tournaments of random size with random results and
/// check the invariants every format must keep.
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use tourney::pairing::round_robin::schedule;
use tourney::rating::{Outcome, update_ratings};
use tourney::tournament::{
    ParticipantId, Slot, Tournament, TournamentConfig, TournamentStatus,
};

// Strategy to generate any match outcome
fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::AWins), Just(Outcome::BWins), Just(Outcome::Draw)]
}

// Strategy to generate a stream of results to replay
fn results_strategy() -> impl Strategy<Value = Vec<Outcome>> {
    prop::collection::vec(outcome_strategy(), 1..64)
}

fn started(config: TournamentConfig, ratings: &[f64]) -> Tournament {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let mut t = Tournament::new(config, at).unwrap();
    t.publish().unwrap();
    for (player, &rating) in ratings.iter().enumerate() {
        t.register(player as i64 + 1, rating, at).unwrap();
    }
    t.close_registration().unwrap();
    t.start(at).unwrap();
    t
}

/// Replay `results` cyclically until the tournament finishes, mapping
/// draws to `AWins` when the format forbids them
fn play_out(t: &mut Tournament, results: &[Outcome]) {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let draws = t.config.format.allows_draws();
    let mut feed = results.iter().cycle();
    while t.status == TournamentStatus::InProgress {
        let open: Vec<_> = t
            .current_round()
            .unwrap()
            .matches
            .iter()
            .filter(|m| !m.is_resolved())
            .map(|m| m.id)
            .collect();
        for id in open {
            let outcome = match feed.next() {
                Some(Outcome::Draw) if !draws => Outcome::AWins,
                Some(&outcome) => outcome,
                None => Outcome::AWins,
            };
            t.submit_result(id, outcome, at).unwrap();
        }
    }
}

fn total_rating(t: &Tournament) -> f64 {
    t.participants.iter().map(|p| p.current_rating).sum()
}

fn seed_total(t: &Tournament) -> f64 {
    t.participants.iter().map(|p| p.seed_rating).sum()
}

fn key(a: ParticipantId, b: ParticipantId) -> (ParticipantId, ParticipantId) {
    (a.min(b), a.max(b))
}

/// Exhaustive check for a perfect matching of `ids` without repeated pairs
fn rematch_free_exists(ids: &[ParticipantId], played: &HashSet<(ParticipantId, ParticipantId)>) -> bool {
    let Some((&first, rest)) = ids.split_first() else {
        return true;
    };
    (0..rest.len()).any(|i| {
        if played.contains(&key(first, rest[i])) {
            return false;
        }
        let remaining: Vec<ParticipantId> = rest
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &id)| id)
            .collect();
        rematch_free_exists(&remaining, played)
    })
}

proptest! {
    #[test]
    fn test_rating_update_is_zero_sum(
        a in 100.0f64..3000.0,
        b in 100.0f64..3000.0,
        outcome in outcome_strategy(),
        k in 1.0f64..64.0,
    ) {
        let (new_a, new_b) = update_ratings(a, b, outcome, k);
        prop_assert!((new_a + new_b - a - b).abs() < 1e-9);
        prop_assert!((new_a - a).abs() <= k);
    }

    #[test]
    fn test_round_robin_schedule_covers_every_pair_once(n in 2usize..18) {
        let ids: Vec<ParticipantId> = (0..n as u32).map(ParticipantId).collect();
        let rounds = schedule(&ids);
        let expected_rounds = if n % 2 == 0 { n - 1 } else { n };
        prop_assert_eq!(rounds.len(), expected_rounds);

        let mut seen = HashSet::new();
        for round in &rounds {
            let mut in_round = HashSet::new();
            for &(a, b) in round {
                prop_assert!(in_round.insert(a));
                if let Slot::Participant(b) = b {
                    prop_assert!(a < b);
                    prop_assert!(in_round.insert(b));
                    prop_assert!(seen.insert((a, b)), "pair {} v {} repeated", a, b);
                }
            }
            prop_assert_eq!(in_round.len(), n);
        }
        prop_assert_eq!(seen.len(), n * (n - 1) / 2);
    }

    #[test]
    fn test_single_elimination_invariants(
        ratings in prop::collection::vec(1000.0f64..2200.0, 2..24),
        results in results_strategy(),
    ) {
        let mut t = started(TournamentConfig::single_elimination("Cup"), &ratings);
        play_out(&mut t, &results);

        let matches: Vec<_> = t.rounds.iter().flat_map(|r| &r.matches).collect();
        let decisive = matches.iter().filter(|m| !m.is_bye()).count();
        prop_assert_eq!(decisive, ratings.len() - 1);

        let unbeaten: Vec<_> = t.participants.iter().filter(|p| p.losses == 0).collect();
        prop_assert_eq!(unbeaten.len(), 1);
        prop_assert!(t.participants.iter().all(|p| p.losses <= 1));
        prop_assert!((total_rating(&t) - seed_total(&t)).abs() < 1e-6);
    }

    #[test]
    fn test_double_elimination_invariants(
        ratings in prop::collection::vec(1000.0f64..2200.0, 2..20),
        results in results_strategy(),
    ) {
        let mut t = started(TournamentConfig::double_elimination("Major"), &ratings);
        play_out(&mut t, &results);

        prop_assert_eq!(t.status, TournamentStatus::Finished);
        prop_assert!(t.participants.iter().all(|p| p.losses <= 2));
        // Everyone but the champion is out with two losses, except the
        // grand final loser when no reset was played
        let eliminated = t.participants.iter().filter(|p| p.losses == 2).count();
        prop_assert!(eliminated >= ratings.len() - 2);
        prop_assert!((total_rating(&t) - seed_total(&t)).abs() < 1e-6);
    }

    #[test]
    fn test_swiss_invariants(
        ratings in prop::collection::vec(1000.0f64..2200.0, 2..20),
        rounds in 1u32..6,
        results in results_strategy(),
    ) {
        let mut t = started(TournamentConfig::swiss("Open", rounds), &ratings);
        play_out(&mut t, &results);

        prop_assert_eq!(t.rounds.len(), rounds as usize);
        for round in &t.rounds {
            let mut in_round = HashSet::new();
            for m in &round.matches {
                prop_assert!(in_round.insert(m.player_a));
                if let Some(b) = m.player_b.participant() {
                    prop_assert!(in_round.insert(b));
                }
            }
            prop_assert_eq!(in_round.len(), ratings.len());
        }

        let mut byes: HashMap<ParticipantId, u32> = HashMap::new();
        for m in t.rounds.iter().flat_map(|r| &r.matches).filter(|m| m.is_bye()) {
            *byes.entry(m.player_a).or_default() += 1;
        }
        if (rounds as usize) <= ratings.len() {
            prop_assert!(byes.values().all(|&b| b <= 1));
        }
        prop_assert!((total_rating(&t) - seed_total(&t)).abs() < 1e-6);
    }

    #[test]
    fn test_swiss_rematch_only_when_unavoidable(
        n in 6usize..=12,
        rounds in 2u32..=6,
        results in results_strategy(),
    ) {
        let rounds = rounds.min(n as u32 / 2);
        let ratings: Vec<f64> = (0..n).map(|i| 1500.0 + (i as f64 * 37.0) % 200.0).collect();
        let mut t = started(TournamentConfig::swiss("Open", rounds), &ratings);
        play_out(&mut t, &results);

        let mut played = HashSet::new();
        for round in &t.rounds {
            let pairs: Vec<_> = round
                .matches
                .iter()
                .filter_map(|m| m.player_b.participant().map(|b| key(m.player_a, b)))
                .collect();
            if pairs.iter().any(|pair| played.contains(pair)) {
                let ids: Vec<ParticipantId> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
                prop_assert!(
                    !rematch_free_exists(&ids, &played),
                    "round {} repeated a pairing although a fresh one existed",
                    round.number
                );
            }
            played.extend(pairs);
        }
    }

    #[test]
    fn test_round_robin_scores_sum(
        n in 2usize..12,
        results in results_strategy(),
    ) {
        let ratings = vec![1500.0; n];
        let mut t = started(TournamentConfig::round_robin("League"), &ratings);
        play_out(&mut t, &results);

        let decisive = t
            .rounds
            .iter()
            .flat_map(|r| &r.matches)
            .filter(|m| !m.is_bye())
            .count();
        prop_assert_eq!(decisive, n * (n - 1) / 2);

        // Default scoring hands out one point per decisive match plus one per bye
        let byes: u32 = t.participants.iter().map(|p| p.byes).sum();
        let points: f64 = t.participants.iter().map(|p| p.score).sum();
        prop_assert!((points - (decisive as f64 + f64::from(byes))).abs() < 1e-9);
    }
}
