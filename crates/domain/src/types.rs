// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How bans restrict the two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BanMode {
    /// A ban removes the item for both teams.
    #[default]
    Global,
    /// A ban only restricts the opposing team.
    PerTeam,
}

impl BanMode {
    /// Returns the wire representation of this ban mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::PerTeam => "per-team",
        }
    }
}

impl FromStr for BanMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Self::Global),
            "per-team" => Ok(Self::PerTeam),
            _ => Err(DomainError::InvalidField {
                field: "banMode",
                reason: format!("expected 'global' or 'per-team', got '{s}'"),
            }),
        }
    }
}

/// Whether a step bans or picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftAction {
    Ban,
    Pick,
}

impl DraftAction {
    /// Returns the wire representation of this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ban => "ban",
            Self::Pick => "pick",
        }
    }
}

impl FromStr for DraftAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ban" => Ok(Self::Ban),
            "pick" => Ok(Self::Pick),
            _ => Err(format!("unknown action '{s}'")),
        }
    }
}

/// What kind of pool item a step selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftTarget {
    Civ,
    Map,
}

impl DraftTarget {
    /// Returns the wire representation of this target.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Civ => "civ",
            Self::Map => "map",
        }
    }
}

impl FromStr for DraftTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "civ" => Ok(Self::Civ),
            "map" => Ok(Self::Map),
            _ => Err(format!("unknown target '{s}'")),
        }
    }
}

/// One of the two drafting sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Team1,
    Team2,
}

impl Team {
    /// Returns the other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Team1 => Self::Team2,
            Self::Team2 => Self::Team1,
        }
    }

    /// Returns the wire representation of this team.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Team1 => "team1",
            Self::Team2 => "team2",
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team1" => Ok(Self::Team1),
            "team2" => Ok(Self::Team2),
            _ => Err(format!("unknown team '{s}'")),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// One scheduled ban or pick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStep {
    /// Ban or pick.
    pub action: DraftAction,
    /// Civilization or map.
    pub target: DraftTarget,
    /// The team that owns this step.
    pub team: Team,
    /// The player slot for per-player civ picks. `None` means a team-level step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_index: Option<u8>,
    /// The system resolves this step from the remaining pool.
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto: bool,
    /// This step belongs to a simultaneous blind-ban sub-phase.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

impl DraftStep {
    /// Creates a team-level step with no flags set.
    #[must_use]
    pub const fn new(action: DraftAction, target: DraftTarget, team: Team) -> Self {
        Self {
            action,
            target,
            team,
            player_index: None,
            auto: false,
            hidden: false,
        }
    }

    /// Assigns the step to a specific player slot.
    #[must_use]
    pub const fn for_player(mut self, player_index: u8) -> Self {
        self.player_index = Some(player_index);
        self
    }

    /// Marks the step as system-resolved.
    #[must_use]
    pub const fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    /// Marks the step as part of a hidden ban phase.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A player entry on a team roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub name: String,
}

impl PlayerSlot {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// An immutable, validated description of one drafting session.
///
/// Values of this type are produced by [`crate::validate_draft_config`]; code
/// that builds one by hand is responsible for upholding the same rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftConfig {
    pub name: String,
    pub team_size: u8,
    pub ban_mode: BanMode,
    pub allow_duplicate_picks: bool,
    pub civ_pool: Vec<String>,
    pub map_pool: Vec<String>,
    pub steps: Vec<DraftStep>,
    pub team1_name: String,
    pub team2_name: String,
    pub team1_players: Vec<PlayerSlot>,
    pub team2_players: Vec<PlayerSlot>,
}

impl DraftConfig {
    /// Returns the pool a target selects from.
    #[must_use]
    pub fn pool(&self, target: DraftTarget) -> &[String] {
        match target {
            DraftTarget::Civ => &self.civ_pool,
            DraftTarget::Map => &self.map_pool,
        }
    }

    /// Returns the display name of a team.
    #[must_use]
    pub fn team_name(&self, team: Team) -> &str {
        match team {
            Team::Team1 => &self.team1_name,
            Team::Team2 => &self.team2_name,
        }
    }

    /// Returns the roster of a team.
    #[must_use]
    pub fn players(&self, team: Team) -> &[PlayerSlot] {
        match team {
            Team::Team1 => &self.team1_players,
            Team::Team2 => &self.team2_players,
        }
    }
}

/// The role a client acts or views as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The host running the draft. May act for either team.
    Admin,
    /// A member of team 1.
    Team1,
    /// A member of team 2.
    Team2,
    /// A read-only viewer with no side.
    Spectator,
}

impl Role {
    /// Returns the team this role plays for, if any.
    #[must_use]
    pub const fn team(self) -> Option<Team> {
        match self {
            Self::Team1 => Some(Team::Team1),
            Self::Team2 => Some(Team::Team2),
            Self::Admin | Self::Spectator => None,
        }
    }

    /// Returns whether this role may take a turn that belongs to `team`.
    #[must_use]
    pub const fn controls(self, team: Team) -> bool {
        match self {
            Self::Admin => true,
            Self::Team1 => matches!(team, Team::Team1),
            Self::Team2 => matches!(team, Team::Team2),
            Self::Spectator => false,
        }
    }

    /// Returns the wire representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Team1 => "team1",
            Self::Team2 => "team2",
            Self::Spectator => "spectator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "team1" => Ok(Self::Team1),
            "team2" => Ok(Self::Team2),
            "spectator" => Ok(Self::Spectator),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}
