// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use civdraft_domain::{DomainError, Role, Team};

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The role is not permitted to perform this mutation at all.
    RoleCannotAct {
        /// The acting role.
        role: Role,
        /// The attempted mutation.
        mutation: &'static str,
    },
    /// The current step belongs to a team the role does not control.
    NotYourTurn {
        /// The acting role.
        role: Role,
        /// The team that owns the current step.
        team: Team,
    },
    /// Both teams must be ready before drafting starts.
    DraftNotStarted,
    /// Every step has been resolved.
    DraftCompleted,
    /// The current step cannot be resolved by this mutation.
    WrongStepKind {
        /// The current step index.
        step_index: usize,
        /// The kind of step the mutation expects.
        expected: &'static str,
    },
    /// The item is not in the legal choice set for the current step.
    ItemUnavailable {
        /// The rejected item.
        item_id: String,
    },
    /// The team already submitted all of its hidden bans.
    HiddenBanQuotaReached {
        /// The team that is done.
        team: Team,
    },
    /// A state failed its structural check.
    MalformedState(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::RoleCannotAct { role, mutation } => {
                write!(f, "Role '{role}' cannot perform '{mutation}'")
            }
            Self::NotYourTurn { role, team } => {
                write!(f, "Role '{role}' cannot act for {team}")
            }
            Self::DraftNotStarted => write!(f, "Both teams must be ready before drafting"),
            Self::DraftCompleted => write!(f, "Draft is already completed"),
            Self::WrongStepKind {
                step_index,
                expected,
            } => {
                write!(f, "Step {step_index} is not a {expected} step")
            }
            Self::ItemUnavailable { item_id } => {
                write!(f, "'{item_id}' is not available for the current step")
            }
            Self::HiddenBanQuotaReached { team } => {
                write!(f, "{team} has already submitted all hidden bans")
            }
            Self::MalformedState(reason) => write!(f, "Malformed draft state: {reason}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
