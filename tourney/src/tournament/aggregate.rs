//! Tournament aggregate.
//!
//! [`Tournament`] owns its participants, rounds, matches and rating log and
//! exposes every mutation as a synchronous method. Each method first checks
//! the transition table, then validates its input, and only then mutates.
//! Mutations that reach into the pairing strategy run on a snapshot and
//! roll back on error, so a failed call never leaves partial state behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{EntityKind, TournamentError, TournamentResult};
use super::models::{
    Match, MatchId, MatchResult, Participant, ParticipantId, PlayerId, RatingChangeKind,
    RatingRecord, Round, RoundStatus, ScoringRules, Slot, TournamentConfig, TournamentId,
    TournamentProgress, TournamentStatus, TournamentSummary,
};
use super::state::{self, TournamentAction};
use crate::pairing::{Pairing, PairingContext, PairingStrategy, RoundPlan};
use crate::rating::{Outcome, update_ratings};
use crate::standings::{Standing, compute_standings};

/// What a participant got out of one match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideResult {
    Win,
    Draw,
    Loss,
}

impl SideResult {
    const fn of(outcome: Outcome) -> (Self, Self) {
        match outcome {
            Outcome::AWins => (SideResult::Win, SideResult::Loss),
            Outcome::BWins => (SideResult::Loss, SideResult::Win),
            Outcome::Draw => (SideResult::Draw, SideResult::Draw),
        }
    }

    const fn points(self, scoring: &ScoringRules) -> f64 {
        match self {
            SideResult::Win => scoring.win,
            SideResult::Draw => scoring.draw,
            SideResult::Loss => scoring.loss,
        }
    }
}

fn tally(participant: &mut Participant, result: SideResult, scoring: &ScoringRules) {
    participant.score += result.points(scoring);
    match result {
        SideResult::Win => participant.wins += 1,
        SideResult::Draw => participant.draws += 1,
        SideResult::Loss => participant.losses += 1,
    }
}

fn untally(participant: &mut Participant, result: SideResult, scoring: &ScoringRules) {
    participant.score -= result.points(scoring);
    match result {
        SideResult::Win => participant.wins = participant.wins.saturating_sub(1),
        SideResult::Draw => participant.draws = participant.draws.saturating_sub(1),
        SideResult::Loss => participant.losses = participant.losses.saturating_sub(1),
    }
}

/// Outcome of a successful result submission or override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultReceipt {
    pub match_id: MatchId,
    pub outcome: Outcome,
    /// Rating records appended by this call, reversals first
    pub rating_changes: Vec<RatingRecord>,
    /// The match's round completed with this result
    pub round_completed: bool,
    /// Round opened as a consequence, if any
    pub opened_round: Option<u32>,
    /// Tournament status after the call
    pub status: TournamentStatus,
}

/// Tournament aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub config: TournamentConfig,
    pub status: TournamentStatus,
    /// Registration order; frozen once registration closes
    pub participants: Vec<Participant>,
    pub rounds: Vec<Round>,
    /// Append-only
    pub rating_log: Vec<RatingRecord>,
    next_match_id: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

impl Tournament {
    /// Create a tournament in `Draft`
    ///
    /// # Errors
    ///
    /// Returns the validation error of an inconsistent configuration.
    pub fn new(config: TournamentConfig, now: DateTime<Utc>) -> TournamentResult<Self> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            config,
            status: TournamentStatus::Draft,
            participants: Vec::new(),
            rounds: Vec::new(),
            rating_log: Vec::new(),
            next_match_id: 1,
            created_at: now,
            started_at: None,
            finished_at: None,
            cancelled_at: None,
            cancellation_reason: None,
        })
    }

    fn check(&self, action: TournamentAction) -> TournamentResult<TournamentStatus> {
        state::next_status(self.status, action).ok_or(TournamentError::InvalidTransition {
            status: self.status,
            action,
        })
    }

    fn atomically<T>(
        &mut self,
        apply: impl FnOnce(&mut Self) -> TournamentResult<T>,
    ) -> TournamentResult<T> {
        let snapshot = self.clone();
        let result = apply(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    fn deadline_passed(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.config
            .registration_deadline
            .filter(|deadline| now >= *deadline)
    }

    /// Open registration
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the tournament is a draft.
    pub fn publish(&mut self) -> TournamentResult<()> {
        self.status = self.check(TournamentAction::Publish)?;
        log::info!("Tournament {} open for registration", self.id);
        Ok(())
    }

    /// Register a player with the rating taken from the registry
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if registration is not open
    /// - `DeadlinePassed` once the registration deadline is reached
    /// - `AlreadyRegistered` for a duplicate registration
    /// - `TournamentFull` when the participant cap is reached
    pub fn register(
        &mut self,
        player_id: PlayerId,
        rating: f64,
        now: DateTime<Utc>,
    ) -> TournamentResult<ParticipantId> {
        self.check(TournamentAction::Register)?;
        if let Some(deadline) = self.deadline_passed(now) {
            return Err(TournamentError::DeadlinePassed(deadline));
        }
        if self.participant_by_player(player_id).is_some() {
            return Err(TournamentError::AlreadyRegistered(player_id));
        }
        if let Some(max) = self.config.max_participants
            && self.participants.len() >= max
        {
            return Err(TournamentError::TournamentFull(max));
        }

        let id = ParticipantId(self.participants.len() as u32);
        self.participants
            .push(Participant::new(id, player_id, rating, now));
        Ok(id)
    }

    /// Remove a player while registration is open
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if registration is not open, `UnknownEntity` if
    /// the player is not registered.
    pub fn withdraw(&mut self, player_id: PlayerId) -> TournamentResult<()> {
        self.check(TournamentAction::Withdraw)?;
        let index = self
            .participants
            .iter()
            .position(|p| p.player_id == player_id)
            .ok_or(TournamentError::UnknownEntity(EntityKind::Player(player_id)))?;

        self.participants.remove(index);
        // No matches exist yet, so ids can follow registration order again
        self.renumber();
        Ok(())
    }

    fn renumber(&mut self) {
        for (i, participant) in self.participants.iter_mut().enumerate() {
            participant.id = ParticipantId(i as u32);
        }
    }

    /// Close registration and freeze the participant list
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if registration is not open.
    pub fn close_registration(&mut self) -> TournamentResult<()> {
        self.status = self.check(TournamentAction::CloseRegistration)?;
        log::info!(
            "Tournament {} registration closed with {} participants",
            self.id,
            self.participants.len()
        );
        Ok(())
    }

    /// Close registration if the configured deadline has been reached
    ///
    /// Returns whether the tournament was closed.
    ///
    /// # Errors
    ///
    /// Never fails for an open tournament; other statuses are left alone.
    pub fn close_if_deadline_passed(&mut self, now: DateTime<Utc>) -> TournamentResult<bool> {
        if self.status != TournamentStatus::RegistrationOpen || self.deadline_passed(now).is_none()
        {
            return Ok(false);
        }
        self.close_registration()?;
        Ok(true)
    }

    /// Reopen a closed registration
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless registration is closed and the tournament
    /// has not started, `DeadlinePassed` once the deadline is reached.
    pub fn reopen_registration(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        let next = self.check(TournamentAction::ReopenRegistration)?;
        if let Some(deadline) = self.deadline_passed(now) {
            return Err(TournamentError::DeadlinePassed(deadline));
        }
        self.status = next;
        log::info!("Tournament {} registration reopened", self.id);
        Ok(())
    }

    /// Confirm that a registered player will play
    ///
    /// Checking in again keeps the first check-in time.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless registration is closed
    /// - `FormatConstraintViolation` if the tournament does not use check-in
    /// - `UnknownEntity` if the player is not registered
    pub fn check_in(
        &mut self,
        player_id: PlayerId,
        now: DateTime<Utc>,
    ) -> TournamentResult<ParticipantId> {
        self.check(TournamentAction::CheckIn)?;
        if !self.config.check_in_required {
            return Err(TournamentError::FormatConstraintViolation(
                "check-in is not enabled for this tournament".to_string(),
            ));
        }
        let tournament = self.id;
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.player_id == player_id)
            .ok_or(TournamentError::UnknownEntity(EntityKind::Player(player_id)))?;
        if participant.checked_in_at.is_none() {
            participant.checked_in_at = Some(now);
            log::debug!("Tournament {tournament}: player {player_id} checked in");
        }
        Ok(participant.id)
    }

    /// Participants who will take part once play starts
    fn entrant_count(&self) -> usize {
        if self.config.check_in_required {
            self.participants.iter().filter(|p| p.is_checked_in()).count()
        } else {
            self.participants.len()
        }
    }

    fn drop_no_shows(&mut self) {
        let registered = self.participants.len();
        self.participants.retain(Participant::is_checked_in);
        let dropped = registered - self.participants.len();
        if dropped > 0 {
            log::info!(
                "Tournament {}: dropped {dropped} participant(s) who did not check in",
                self.id
            );
            self.renumber();
        }
    }

    /// Start play and generate the first round, or the full schedule for
    /// round robin
    ///
    /// With check-in enabled, participants who did not check in are removed
    /// first.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless registration is closed,
    /// `InsufficientParticipants` below the configured minimum.
    pub fn start(&mut self, now: DateTime<Utc>) -> TournamentResult<()> {
        let next = self.check(TournamentAction::Start)?;
        let needed = self.config.min_participants.max(2);
        let current = self.entrant_count();
        if current < needed {
            return Err(TournamentError::InsufficientParticipants { needed, current });
        }

        self.atomically(|t| {
            if t.config.check_in_required {
                t.drop_no_shows();
            }
            let plans = t.pairing().initial_rounds(&t.context())?;
            t.status = next;
            t.started_at = Some(now);
            for plan in plans {
                t.install_round(plan);
            }
            log::info!(
                "Tournament {} started: {} participants, {} round(s) scheduled",
                t.id,
                t.participants.len(),
                t.rounds.len()
            );
            t.settle(now)?;
            Ok(())
        })
    }

    /// Record the result of a match in the open round
    ///
    /// Updates ratings (except for byes), scores and counters, then
    /// completes the round and generates the next one or finishes the
    /// tournament as needed.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is in progress
    /// - `UnknownEntity` for an unknown match
    /// - `DuplicateResult` if the match already has a result
    /// - `MatchNotInOpenRound` if the match belongs to another round
    /// - `FormatConstraintViolation` for a draw in an elimination format
    pub fn submit_result(
        &mut self,
        match_id: MatchId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> TournamentResult<ResultReceipt> {
        let located = self.locate(match_id);
        // Resubmitting into a finished event is still a duplicate
        if self.status == TournamentStatus::Finished
            && let Ok((r, i)) = located
            && self.rounds[r].matches[i].is_resolved()
        {
            return Err(TournamentError::DuplicateResult(match_id));
        }

        self.check(TournamentAction::SubmitResult)?;
        let (r, i) = located?;
        if self.rounds[r].matches[i].is_resolved() {
            return Err(TournamentError::DuplicateResult(match_id));
        }
        if self.rounds[r].status != RoundStatus::InProgress {
            return Err(TournamentError::MatchNotInOpenRound(match_id));
        }
        self.ensure_outcome_allowed(outcome)?;

        self.atomically(|t| {
            let rating_changes = t.apply_result(r, i, outcome, now, None);
            t.finish_receipt(match_id, outcome, rating_changes, r, now)
        })
    }

    /// Replace the recorded result of a match in the open round
    ///
    /// The rating effect of the previous result is compensated with
    /// `Reversal` records, never by editing the log.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is in progress
    /// - `UnknownEntity` for an unknown match
    /// - `MatchNotInOpenRound` if the match belongs to another round
    /// - `FormatConstraintViolation` for byes and for draws in elimination
    /// - `NoResultToOverride` if nothing was recorded yet
    pub fn override_result(
        &mut self,
        match_id: MatchId,
        outcome: Outcome,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> TournamentResult<ResultReceipt> {
        self.check(TournamentAction::OverrideResult)?;
        let (r, i) = self.locate(match_id)?;
        if self.rounds[r].status != RoundStatus::InProgress {
            return Err(TournamentError::MatchNotInOpenRound(match_id));
        }
        let current = &self.rounds[r].matches[i];
        if current.is_bye() {
            return Err(TournamentError::FormatConstraintViolation(
                "bye results cannot be overridden".to_string(),
            ));
        }
        let previous = current
            .outcome()
            .ok_or(TournamentError::NoResultToOverride(match_id))?;
        self.ensure_outcome_allowed(outcome)?;

        let reason = reason.into();
        log::warn!(
            "Tournament {}: overriding {match_id} from {previous} to {outcome} ({reason})",
            self.id
        );
        self.atomically(|t| {
            let mut rating_changes = t.reverse_result(r, i, previous, now);
            rating_changes.extend(t.apply_result(r, i, outcome, now, Some(reason)));
            t.finish_receipt(match_id, outcome, rating_changes, r, now)
        })
    }

    /// Cancel the tournament, voiding every unplayed match
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if the tournament already finished or was
    /// cancelled.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> TournamentResult<()> {
        self.status = self.check(TournamentAction::Cancel)?;
        for round in &mut self.rounds {
            if matches!(round.status, RoundStatus::Pending | RoundStatus::InProgress) {
                round.status = RoundStatus::Void;
                for m in round.matches.iter_mut().filter(|m| !m.is_resolved()) {
                    m.voided = true;
                }
            }
        }
        self.cancelled_at = Some(now);
        self.cancellation_reason = reason;
        log::info!("Tournament {} cancelled", self.id);
        Ok(())
    }

    /// Current standings, recomputed on every call
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        compute_standings(&self.participants)
    }

    /// Round currently accepting results
    #[must_use]
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds
            .iter()
            .find(|r| r.status == RoundStatus::InProgress)
    }

    #[must_use]
    pub fn find_match(&self, match_id: MatchId) -> Option<&Match> {
        self.rounds.iter().find_map(|r| r.find_match(match_id))
    }

    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id.index())
    }

    #[must_use]
    pub fn participant_by_player(&self, player_id: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.player_id == player_id)
    }

    /// Actions the lifecycle allows right now
    #[must_use]
    pub fn available_actions(&self) -> Vec<TournamentAction> {
        state::available_actions(self.status)
    }

    /// Rating records of one player, in log order
    pub fn rating_records_for(&self, player_id: PlayerId) -> impl Iterator<Item = &RatingRecord> {
        self.rating_log
            .iter()
            .filter(move |r| r.player_id == player_id)
    }

    #[must_use]
    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            id: self.id,
            name: self.config.name.clone(),
            format: self.config.format,
            status: self.status,
            participant_count: self.participants.len(),
            current_round: self.current_round().map(|r| r.number),
            created_at: self.created_at,
            finished_at: self.finished_at,
        }
    }

    /// Rounds, matches and eliminations so far
    #[must_use]
    pub fn progress(&self) -> TournamentProgress {
        let pairing = self.pairing();
        let total_rounds = pairing
            .expected_rounds(self.participants.len())
            .max(self.rounds.len() as u32);
        let completed_rounds = self
            .rounds
            .iter()
            .filter(|r| r.status == RoundStatus::Complete)
            .count() as u32;

        let ctx = self.context();
        let matches: Vec<&Match> = ctx.played_rounds().flat_map(|r| &r.matches).collect();
        let completed_matches = matches.iter().filter(|m| m.is_resolved()).count();

        let eliminated = pairing.elimination_losses().map_or(0, |limit| {
            self.participants
                .iter()
                .filter(|p| p.losses >= limit)
                .count()
        });

        let percent_complete = match self.status {
            TournamentStatus::Finished => 100.0,
            _ if total_rounds == 0 => 0.0,
            _ => (f64::from(completed_rounds) / f64::from(total_rounds) * 1000.0).round() / 10.0,
        };

        TournamentProgress {
            status: self.status,
            current_round: self.current_round().map(|r| r.number),
            completed_rounds,
            total_rounds,
            completed_matches,
            total_matches: matches.len(),
            active_participants: self.participants.len() - eliminated,
            eliminated_participants: eliminated,
            percent_complete,
        }
    }

    fn pairing(&self) -> Pairing {
        Pairing::for_config(&self.config)
    }

    fn context(&self) -> PairingContext<'_> {
        PairingContext::new(&self.participants, &self.rounds)
    }

    fn locate(&self, match_id: MatchId) -> TournamentResult<(usize, usize)> {
        self.rounds
            .iter()
            .enumerate()
            .find_map(|(r, round)| {
                round
                    .matches
                    .iter()
                    .position(|m| m.id == match_id)
                    .map(|i| (r, i))
            })
            .ok_or(TournamentError::UnknownEntity(EntityKind::Match(match_id)))
    }

    fn ensure_outcome_allowed(&self, outcome: Outcome) -> TournamentResult<()> {
        if outcome.is_draw() && !self.config.format.allows_draws() {
            return Err(TournamentError::FormatConstraintViolation(format!(
                "draws are not allowed in {}",
                self.config.format
            )));
        }
        Ok(())
    }

    fn install_round(&mut self, plan: RoundPlan) -> usize {
        let number = self.rounds.len() as u32 + 1;
        let matches = plan
            .matches
            .into_iter()
            .map(|planned| {
                let id = MatchId(self.next_match_id);
                self.next_match_id += 1;
                Match {
                    id,
                    round: number,
                    bracket: planned.bracket,
                    stage: planned.stage,
                    position: planned.position,
                    phase: planned.phase,
                    player_a: planned.player_a,
                    player_b: planned.player_b,
                    result: None,
                    voided: false,
                }
            })
            .collect();
        self.rounds.push(Round {
            number,
            status: RoundStatus::Pending,
            matches,
        });
        self.rounds.len() - 1
    }

    /// Open a pending round and hand out its byes
    fn open_round(&mut self, index: usize, now: DateTime<Utc>) -> u32 {
        let scoring = self.config.scoring;
        let round = &mut self.rounds[index];
        round.status = RoundStatus::InProgress;
        for m in round.matches.iter_mut().filter(|m| m.is_bye()) {
            m.result = Some(MatchResult {
                outcome: Outcome::AWins,
                recorded_at: now,
                override_reason: None,
            });
            let participant = &mut self.participants[m.player_a.index()];
            tally(participant, SideResult::Win, &scoring);
            participant.byes += 1;
        }
        log::debug!(
            "Tournament {} round {} open with {} matches",
            self.id,
            round.number,
            round.matches.len()
        );
        round.number
    }

    /// Complete finished rounds, open or generate the next, or finish
    ///
    /// Returns the number of the last round opened. Loops because a round
    /// made only of byes completes the moment it opens.
    fn settle(&mut self, now: DateTime<Utc>) -> TournamentResult<Option<u32>> {
        let mut opened = None;
        loop {
            if let Some(round) = self
                .rounds
                .iter_mut()
                .find(|r| r.status == RoundStatus::InProgress)
            {
                if !round.is_fully_resolved() {
                    return Ok(opened);
                }
                round.status = RoundStatus::Complete;
                log::info!("Tournament {} round {} complete", self.id, round.number);
            }

            if let Some(index) = self
                .rounds
                .iter()
                .position(|r| r.status == RoundStatus::Pending)
            {
                opened = Some(self.open_round(index, now));
                continue;
            }

            match self.pairing().next_round(&self.context())? {
                Some(plan) if !plan.is_empty() => {
                    let index = self.install_round(plan);
                    opened = Some(self.open_round(index, now));
                }
                _ => {
                    self.status = self.check(TournamentAction::Finish)?;
                    self.finished_at = Some(now);
                    log::info!("Tournament {} finished", self.id);
                    return Ok(opened);
                }
            }
        }
    }

    fn apply_result(
        &mut self,
        r: usize,
        i: usize,
        outcome: Outcome,
        now: DateTime<Utc>,
        override_reason: Option<String>,
    ) -> Vec<RatingRecord> {
        let scoring = self.config.scoring;
        let m = &mut self.rounds[r].matches[i];
        m.result = Some(MatchResult {
            outcome,
            recorded_at: now,
            override_reason,
        });
        let (match_id, a, b) = (m.id, m.player_a, m.player_b);
        let (side_a, side_b) = SideResult::of(outcome);

        let Slot::Participant(b) = b else {
            tally(&mut self.participants[a.index()], side_a, &scoring);
            return Vec::new();
        };

        let before_a = self.participants[a.index()].current_rating;
        let before_b = self.participants[b.index()].current_rating;
        let (after_a, after_b) = update_ratings(before_a, before_b, outcome, self.config.k_factor);

        let records = vec![
            self.record(a, match_id, before_a, after_a, RatingChangeKind::Result, now),
            self.record(b, match_id, before_b, after_b, RatingChangeKind::Result, now),
        ];
        for (id, side, rating) in [(a, side_a, after_a), (b, side_b, after_b)] {
            let participant = &mut self.participants[id.index()];
            participant.current_rating = rating;
            tally(participant, side, &scoring);
        }
        self.rating_log.extend(records.iter().cloned());
        records
    }

    fn reverse_result(
        &mut self,
        r: usize,
        i: usize,
        previous: Outcome,
        now: DateTime<Utc>,
    ) -> Vec<RatingRecord> {
        let scoring = self.config.scoring;
        let m = &self.rounds[r].matches[i];
        let (match_id, a) = (m.id, m.player_a);
        let Slot::Participant(b) = m.player_b else {
            return Vec::new();
        };
        let (side_a, side_b) = SideResult::of(previous);

        let mut records = Vec::with_capacity(2);
        for (id, side) in [(a, side_a), (b, side_b)] {
            let delta = self
                .rating_log
                .iter()
                .rev()
                .find(|rec| {
                    rec.match_id == match_id
                        && rec.participant_id == id
                        && rec.kind == RatingChangeKind::Result
                })
                .map_or(0.0, RatingRecord::delta);
            let before = self.participants[id.index()].current_rating;
            let after = before - delta;
            records.push(self.record(id, match_id, before, after, RatingChangeKind::Reversal, now));

            let participant = &mut self.participants[id.index()];
            participant.current_rating = after;
            untally(participant, side, &scoring);
        }
        self.rating_log.extend(records.iter().cloned());
        records
    }

    fn record(
        &self,
        participant: ParticipantId,
        match_id: MatchId,
        elo_before: f64,
        elo_after: f64,
        kind: RatingChangeKind,
        recorded_at: DateTime<Utc>,
    ) -> RatingRecord {
        RatingRecord {
            tournament_id: self.id,
            participant_id: participant,
            player_id: self.participants[participant.index()].player_id,
            match_id,
            elo_before,
            elo_after,
            kind,
            recorded_at,
        }
    }

    fn finish_receipt(
        &mut self,
        match_id: MatchId,
        outcome: Outcome,
        rating_changes: Vec<RatingRecord>,
        round_index: usize,
        now: DateTime<Utc>,
    ) -> TournamentResult<ResultReceipt> {
        let opened_round = self.settle(now)?;
        Ok(ResultReceipt {
            match_id,
            outcome,
            rating_changes,
            round_completed: self.rounds[round_index].status == RoundStatus::Complete,
            opened_round,
            status: self.status,
        })
    }
}
