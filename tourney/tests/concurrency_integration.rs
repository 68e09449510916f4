//! Concurrent access through the manager.
//!
//! Mutations on one tournament are serialised; different tournaments run in
//! parallel without observing each other.

use std::sync::Arc;

use tourney::rating::Outcome;
use tourney::store::{MemoryPlayerRegistry, MemoryTournamentRepository};
use tourney::tournament::{
    TournamentConfig, TournamentError, TournamentId, TournamentManager, TournamentStatus,
};

fn manager() -> TournamentManager {
    TournamentManager::new(
        Arc::new(MemoryTournamentRepository::new()),
        Arc::new(MemoryPlayerRegistry::new()),
    )
}

async fn started(mgr: &TournamentManager, config: TournamentConfig, players: i64) -> TournamentId {
    let id = mgr.create_tournament(config).await.unwrap();
    mgr.publish(id).await.unwrap();
    for player in 1..=players {
        mgr.register_participant(id, player).await.unwrap();
    }
    mgr.close_registration(id).await.unwrap();
    mgr.start_tournament(id).await.unwrap();
    id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_submissions_for_one_match() {
    let mgr = manager();
    let id = started(&mgr, TournamentConfig::round_robin("League"), 4).await;
    let t = mgr.get_tournament(id).await.unwrap();
    let target = t.current_round().unwrap().matches[0].id;

    let mut handles = Vec::new();
    for i in 0..16 {
        let mgr = mgr.clone();
        let outcome = if i % 2 == 0 { Outcome::AWins } else { Outcome::BWins };
        handles.push(tokio::spawn(async move {
            mgr.submit_result(id, target, outcome).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(TournamentError::DuplicateResult(m)) => assert_eq!(m, target),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(accepted, 1);

    let t = mgr.get_tournament(id).await.unwrap();
    assert_eq!(t.rating_log.len(), 2);
    let total: f64 = t.participants.iter().map(|p| p.current_rating).sum();
    assert!((total - 4.0 * 1500.0).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_results_in_one_round() {
    let mgr = manager();
    let id = started(&mgr, TournamentConfig::swiss("Open", 1), 16).await;
    let t = mgr.get_tournament(id).await.unwrap();
    let matches: Vec<_> = t.current_round().unwrap().matches.iter().map(|m| m.id).collect();
    assert_eq!(matches.len(), 8);

    let handles: Vec<_> = matches
        .into_iter()
        .map(|m| {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.submit_result(id, m, Outcome::AWins).await })
        })
        .collect();

    let mut completions = 0;
    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        if receipt.round_completed {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);

    let t = mgr.get_tournament(id).await.unwrap();
    assert_eq!(t.status, TournamentStatus::Finished);
    assert_eq!(t.rating_log.len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_tournaments_are_independent() {
    let mgr = manager();

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let mgr = mgr.clone();
            tokio::spawn(async move {
                let id = started(&mgr, TournamentConfig::single_elimination(format!("Cup {n}")), 8)
                    .await;
                loop {
                    let t = mgr.get_tournament(id).await.unwrap();
                    let Some(round) = t.current_round() else {
                        break;
                    };
                    for m in round.matches.iter().filter(|m| !m.is_resolved()) {
                        mgr.submit_result(id, m.id, Outcome::AWins).await.unwrap();
                    }
                }
                id
            })
        })
        .collect();

    for handle in handles {
        let id = handle.await.unwrap();
        let t = mgr.get_tournament(id).await.unwrap();
        assert_eq!(t.status, TournamentStatus::Finished);
        assert_eq!(t.participants.len(), 8);
        assert_eq!(t.rounds.iter().map(|r| r.matches.len()).sum::<usize>(), 7);
    }

    let finished = mgr
        .list_tournaments(Some(TournamentStatus::Finished))
        .await
        .unwrap();
    assert_eq!(finished.len(), 8);
}
