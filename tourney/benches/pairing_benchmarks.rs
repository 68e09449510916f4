use chrono::Utc;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tourney::{
    Outcome, Tournament, TournamentConfig, TournamentStatus,
    pairing::{round_robin::schedule, single_elimination::seed_order},
    rating::update_ratings,
    tournament::ParticipantId,
};

/// Helper to create a started tournament with N registered players
fn setup_tournament(config: TournamentConfig, n_players: usize) -> Tournament {
    let now = Utc::now();
    let mut t = Tournament::new(config, now).unwrap();
    t.publish().unwrap();
    for i in 0..n_players {
        t.register(i as i64 + 1, 1200.0 + (i as f64 * 37.0) % 800.0, now)
            .unwrap();
    }
    t.close_registration().unwrap();
    t.start(now).unwrap();
    t
}

/// Resolve every open match, alternating outcomes
fn play_out(t: &mut Tournament) {
    let now = Utc::now();
    let mut flip = false;
    while t.status == TournamentStatus::InProgress {
        let open: Vec<_> = t
            .current_round()
            .map(|r| r.matches.iter().filter(|m| !m.is_resolved()).map(|m| m.id).collect())
            .unwrap_or_default();
        for id in open {
            flip = !flip;
            let outcome = if flip { Outcome::AWins } else { Outcome::BWins };
            t.submit_result(id, outcome, now).unwrap();
        }
    }
}

/// Benchmark a single Elo update
fn bench_rating_update(c: &mut Criterion) {
    c.bench_function("rating_update", |b| {
        b.iter(|| update_ratings(black_box(1612.0), black_box(1488.0), Outcome::AWins, 32.0));
    });
}

/// Benchmark bracket seeding for different field sizes
fn bench_seed_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed_order");
    for size in [8, 64, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| seed_order(black_box(size)));
        });
    }
    group.finish();
}

/// Benchmark the full round robin schedule
fn bench_round_robin_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_robin_schedule");
    for n in [8, 32, 128] {
        let ids: Vec<ParticipantId> = (0..n).map(ParticipantId).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &ids, |b, ids| {
            b.iter(|| schedule(black_box(ids)));
        });
    }
    group.finish();
}

/// Benchmark starting a Swiss event (first round pairing)
fn bench_swiss_start(c: &mut Criterion) {
    let mut group = c.benchmark_group("swiss_start");
    for n in [16, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| setup_tournament(TournamentConfig::swiss("Bench", 7), black_box(n)));
        });
    }
    group.finish();
}

/// Benchmark playing whole events, including every pairing and rating step
fn bench_full_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_event");
    for (label, config) in [
        ("single_elimination", TournamentConfig::single_elimination("Bench")),
        ("double_elimination", TournamentConfig::double_elimination("Bench")),
        ("swiss", TournamentConfig::swiss("Bench", 7)),
        ("round_robin", TournamentConfig::round_robin("Bench")),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut t = setup_tournament(config.clone(), 32);
                play_out(&mut t);
                black_box(t.standings())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_rating_update,
    bench_seed_order,
    bench_round_robin_schedule,
    bench_swiss_start,
    bench_full_events
);
criterion_main!(benches);
