//! Tournament lifecycle as an explicit transition table.
//!
//! Every mutation of a tournament is expressed as a [`TournamentAction`]. An
//! action is legal only if the table holds a row for the current status; the
//! row also names the resulting status. Self-loops cover mutations that do
//! not move the lifecycle (registering, submitting results).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::TournamentStatus;

/// Anything that may change a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentAction {
    Publish,
    Register,
    Withdraw,
    CloseRegistration,
    ReopenRegistration,
    CheckIn,
    Start,
    SubmitResult,
    OverrideResult,
    Finish,
    Cancel,
}

impl fmt::Display for TournamentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TournamentAction::Publish => "publish",
            TournamentAction::Register => "register",
            TournamentAction::Withdraw => "withdraw",
            TournamentAction::CloseRegistration => "close_registration",
            TournamentAction::ReopenRegistration => "reopen_registration",
            TournamentAction::CheckIn => "check_in",
            TournamentAction::Start => "start",
            TournamentAction::SubmitResult => "submit_result",
            TournamentAction::OverrideResult => "override_result",
            TournamentAction::Finish => "finish",
            TournamentAction::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// One legal move of the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TournamentStatus,
    pub action: TournamentAction,
    pub to: TournamentStatus,
    pub description: &'static str,
}

const fn row(
    from: TournamentStatus,
    action: TournamentAction,
    to: TournamentStatus,
    description: &'static str,
) -> Transition {
    Transition {
        from,
        action,
        to,
        description,
    }
}

use TournamentAction as A;
use TournamentStatus as S;

/// The complete lifecycle
pub const TRANSITIONS: &[Transition] = &[
    row(S::Draft, A::Publish, S::RegistrationOpen, "Open registration"),
    row(S::Draft, A::Cancel, S::Cancelled, "Cancel tournament"),
    row(S::RegistrationOpen, A::Register, S::RegistrationOpen, "Register a player"),
    row(S::RegistrationOpen, A::Withdraw, S::RegistrationOpen, "Withdraw a player"),
    row(
        S::RegistrationOpen,
        A::CloseRegistration,
        S::RegistrationClosed,
        "Close registration and freeze participants",
    ),
    row(S::RegistrationOpen, A::Cancel, S::Cancelled, "Cancel tournament"),
    row(
        S::RegistrationClosed,
        A::ReopenRegistration,
        S::RegistrationOpen,
        "Reopen registration before the deadline",
    ),
    row(S::RegistrationClosed, A::CheckIn, S::RegistrationClosed, "Confirm attendance"),
    row(S::RegistrationClosed, A::Start, S::InProgress, "Start the first round"),
    row(S::RegistrationClosed, A::Cancel, S::Cancelled, "Cancel tournament"),
    row(S::InProgress, A::SubmitResult, S::InProgress, "Record a match result"),
    row(S::InProgress, A::OverrideResult, S::InProgress, "Correct a recorded result"),
    row(S::InProgress, A::Finish, S::Finished, "Complete the tournament"),
    row(S::InProgress, A::Cancel, S::Cancelled, "Cancel tournament"),
];

fn lookup(status: TournamentStatus, action: TournamentAction) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == status && t.action == action)
}

/// Status reached by applying `action`, or `None` if the move is illegal
#[must_use]
pub fn next_status(status: TournamentStatus, action: TournamentAction) -> Option<TournamentStatus> {
    lookup(status, action).map(|t| t.to)
}

/// Actions legal from `status`, in table order
#[must_use]
pub fn available_actions(status: TournamentStatus) -> Vec<TournamentAction> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == status)
        .map(|t| t.action)
        .collect()
}

/// Human-readable description of a legal move
#[must_use]
pub fn describe(status: TournamentStatus, action: TournamentAction) -> Option<&'static str> {
    lookup(status, action).map(|t| t.description)
}
