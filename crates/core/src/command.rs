// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// A mutation represents client intent as data only.
///
/// Mutations are the only way to request a change to a stored draft. Each
/// variant carries exactly the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Mark the acting team as ready to start.
    MarkReady,
    /// Open the hidden ban phase at the current step.
    InitHiddenBanPhase,
    /// Submit one blind ban during a hidden ban phase.
    SubmitHiddenBan {
        /// The banned item.
        item_id: String,
    },
    /// Let the server choose for the current auto step.
    ResolveAutoStep,
    /// Resolve the current step with a chosen item.
    ApplyAction {
        /// The banned or picked item.
        item_id: String,
    },
    /// Restore the most recent state from history.
    Undo,
}

impl Mutation {
    /// Returns the wire name of this mutation.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MarkReady => "mark-ready",
            Self::InitHiddenBanPhase => "init-hidden-ban",
            Self::SubmitHiddenBan { .. } => "submit-hidden-ban",
            Self::ResolveAutoStep => "auto-resolve",
            Self::ApplyAction { .. } => "apply-action",
            Self::Undo => "undo",
        }
    }
}
