// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::catalog::{find_civilization, find_map};
use crate::error::DomainError;
use crate::types::{
    BanMode, DraftAction, DraftConfig, DraftStep, DraftTarget, PlayerSlot, Team,
};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Maximum length of the draft name, team names, and player names.
pub const MAX_NAME_LEN: usize = 200;
/// Maximum number of entries in either pool.
pub const MAX_POOL_SIZE: usize = 200;
/// Maximum number of steps in a draft.
pub const MAX_STEPS: usize = 100;
/// Largest supported team size.
pub const MAX_TEAM_SIZE: u8 = 4;

/// Validates an untrusted draft configuration.
///
/// Checks run in a fixed order and the first violation rejects the whole
/// configuration; nothing is partially accepted. After the per-field checks,
/// hidden-ban runs are checked for structure and the step sequence is checked
/// for worst-case satisfiability (see [`check_satisfiable`]).
///
/// # Arguments
///
/// * `raw` - The configuration as received from a client
///
/// # Returns
///
/// * `Ok(DraftConfig)` if every check passes
/// * `Err(DomainError)` describing the first violation
///
/// # Errors
///
/// Returns an error if:
/// - The input is not an object
/// - `name` is missing, not a string, or too long
/// - `teamSize` is not an integer in `1..=4`
/// - `banMode` or `allowDuplicatePicks` has the wrong type or value
/// - A pool is not an array, is too large, repeats an id, or names an unknown id
/// - `steps` is empty, too long, or contains a malformed step
/// - A roster does not have exactly `teamSize` entries of `{name: string}`
/// - A hidden run is malformed or some step could run out of choices
pub fn validate_draft_config(raw: &Value) -> Result<DraftConfig, DomainError> {
    let obj: &Map<String, Value> = raw.as_object().ok_or(DomainError::ConfigNotAnObject)?;

    let name: String = required_name(obj.get("name"), "name")?;
    let team_size: u8 = validate_team_size(obj.get("teamSize"))?;

    let ban_mode: BanMode = match optional(obj, "banMode") {
        None => BanMode::Global,
        Some(Value::String(mode)) => mode.parse()?,
        Some(_) => {
            return Err(DomainError::InvalidField {
                field: "banMode",
                reason: String::from("must be a string"),
            });
        }
    };

    let allow_duplicate_picks: bool =
        optional_bool(optional(obj, "allowDuplicatePicks"), "allowDuplicatePicks")?;

    let civ_pool: Vec<String> = validate_pool(obj.get("civPool"), "civPool", |id| {
        find_civilization(id).is_some()
    })?;
    let map_pool: Vec<String> =
        validate_pool(obj.get("mapPool"), "mapPool", |id| find_map(id).is_some())?;

    let steps: Vec<DraftStep> = validate_steps(obj.get("steps"), team_size)?;

    let team1_name: String = optional_name(optional(obj, "team1Name"), "team1Name", "Team 1")?;
    let team2_name: String = optional_name(optional(obj, "team2Name"), "team2Name", "Team 2")?;

    let team1_players: Vec<PlayerSlot> =
        validate_roster(obj.get("team1Players"), "team1Players", team_size)?;
    let team2_players: Vec<PlayerSlot> =
        validate_roster(obj.get("team2Players"), "team2Players", team_size)?;

    let config: DraftConfig = DraftConfig {
        name,
        team_size,
        ban_mode,
        allow_duplicate_picks,
        civ_pool,
        map_pool,
        steps,
        team1_name,
        team2_name,
        team1_players,
        team2_players,
    };

    validate_hidden_runs(&config.steps)?;
    check_satisfiable(&config)?;

    Ok(config)
}

/// Returns the length of the hidden-ban run starting at `start`.
///
/// A run is the contiguous sequence of hidden ban steps sharing the target of
/// the step at `start`. Returns 0 when `start` is out of range or the step
/// there is not a hidden ban.
#[must_use]
pub fn hidden_run_len(steps: &[DraftStep], start: usize) -> usize {
    let Some(first) = steps.get(start) else {
        return 0;
    };
    if !first.hidden || first.action != DraftAction::Ban {
        return 0;
    }

    steps[start..]
        .iter()
        .take_while(|s| s.hidden && s.action == DraftAction::Ban && s.target == first.target)
        .count()
}

/// Checks that no step can face an empty choice set.
///
/// The step sequence is replayed with worst-case exclusion counts: every
/// ban and pick the acting team can see is assumed to remove a distinct pool
/// entry. A step is satisfiable when its pool is strictly larger than that
/// count. Overlapping exclusions only make more items available, so a
/// configuration accepted here can never deadlock on an empty pool.
///
/// # Errors
///
/// Returns `DomainError::InvalidStep` if a step names a player slot outside
/// the roster limit, and `DomainError::UnsatisfiableStep` for the first step
/// whose pool could be exhausted.
pub fn check_satisfiable(config: &DraftConfig) -> Result<(), DomainError> {
    let steps: &[DraftStep] = &config.steps;
    if let Some(index) = steps
        .iter()
        .position(|s| s.player_index.is_some_and(|p| p >= MAX_TEAM_SIZE))
    {
        return Err(DomainError::InvalidStep {
            index,
            reason: format!("playerIndex must be below {MAX_TEAM_SIZE}"),
        });
    }
    let mut tally: Tally = Tally::default();
    let mut index: usize = 0;

    while index < steps.len() {
        let step: &DraftStep = &steps[index];
        let pool_size: usize = config.pool(step.target).len();

        if step.hidden {
            let run_len: usize = hidden_run_len(steps, index).max(1);
            let run: &[DraftStep] = &steps[index..index + run_len];
            let mut buffered: [usize; 2] = [0, 0];

            // Opponent buffers stay blind until the reveal, so only revealed
            // bans and the team's own buffer count against it.
            let revealed: usize = tally.picks_total(step.target) + tally.bans_total(step.target);
            for (offset, run_step) in run.iter().enumerate() {
                let slot: usize = team_slot(run_step.team);
                require_choice(index + offset, pool_size, revealed + buffered[slot])?;
                buffered[slot] += 1;
            }
            for run_step in run {
                tally.record(run_step);
            }

            index += run_len;
            continue;
        }

        let excluded: usize = match step.action {
            DraftAction::Ban => {
                tally.picks_total(step.target)
                    + tally.bans_visible_to_ban(config.ban_mode, step.target, step.team)
            }
            DraftAction::Pick => {
                tally.bans_visible_to_pick(config.ban_mode, step.target, step.team)
                    + tally.pick_exclusions(config, step)
            }
        };
        require_choice(index, pool_size, excluded)?;
        tally.record(step);
        index += 1;
    }

    Ok(())
}

/// Running counts of resolved steps, indexed by target and team.
#[derive(Debug, Default, Clone)]
struct Tally {
    bans: [[usize; 2]; 2],
    picks: [[usize; 2]; 2],
    player_civ_picks: [[usize; MAX_TEAM_SIZE as usize]; 2],
}

impl Tally {
    fn picks_total(&self, target: DraftTarget) -> usize {
        self.picks[target_slot(target)].iter().sum()
    }

    fn bans_total(&self, target: DraftTarget) -> usize {
        self.bans[target_slot(target)].iter().sum()
    }

    fn bans_visible_to_ban(&self, mode: BanMode, target: DraftTarget, team: Team) -> usize {
        match mode {
            BanMode::Global => self.bans_total(target),
            BanMode::PerTeam => self.bans[target_slot(target)][team_slot(team)],
        }
    }

    fn bans_visible_to_pick(&self, mode: BanMode, target: DraftTarget, team: Team) -> usize {
        match mode {
            BanMode::Global => self.bans_total(target),
            BanMode::PerTeam => self.bans[target_slot(target)][team_slot(team.opponent())],
        }
    }

    fn pick_exclusions(&self, config: &DraftConfig, step: &DraftStep) -> usize {
        match (step.target, step.player_index) {
            (DraftTarget::Map, _) => self.picks_total(DraftTarget::Map),
            (DraftTarget::Civ, Some(player)) if config.allow_duplicate_picks => {
                self.player_civ_picks[team_slot(step.team)][usize::from(player)]
            }
            (DraftTarget::Civ, _) => self.picks[target_slot(DraftTarget::Civ)][team_slot(step.team)],
        }
    }

    fn record(&mut self, step: &DraftStep) {
        let target: usize = target_slot(step.target);
        let team: usize = team_slot(step.team);
        match step.action {
            DraftAction::Ban => self.bans[target][team] += 1,
            DraftAction::Pick => {
                self.picks[target][team] += 1;
                if let (DraftTarget::Civ, Some(player)) = (step.target, step.player_index) {
                    self.player_civ_picks[team][usize::from(player)] += 1;
                }
            }
        }
    }
}

const fn target_slot(target: DraftTarget) -> usize {
    match target {
        DraftTarget::Civ => 0,
        DraftTarget::Map => 1,
    }
}

const fn team_slot(team: Team) -> usize {
    match team {
        Team::Team1 => 0,
        Team::Team2 => 1,
    }
}

fn require_choice(index: usize, pool_size: usize, excluded: usize) -> Result<(), DomainError> {
    if pool_size <= excluded {
        return Err(DomainError::UnsatisfiableStep {
            index,
            pool_size,
            excluded,
        });
    }
    Ok(())
}

/// Treats explicit `null` the same as an absent optional field.
fn optional<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn required_name(value: Option<&Value>, field: &'static str) -> Result<String, DomainError> {
    match value {
        Some(Value::String(s)) if s.chars().count() <= MAX_NAME_LEN => Ok(s.clone()),
        Some(Value::String(_)) => Err(DomainError::InvalidField {
            field,
            reason: format!("must be at most {MAX_NAME_LEN} characters"),
        }),
        _ => Err(DomainError::InvalidField {
            field,
            reason: String::from("must be a string"),
        }),
    }
}

fn optional_name(
    value: Option<&Value>,
    field: &'static str,
    default: &str,
) -> Result<String, DomainError> {
    match value {
        None => Ok(default.to_string()),
        Some(_) => required_name(value, field),
    }
}

fn optional_bool(value: Option<&Value>, field: &'static str) -> Result<bool, DomainError> {
    match value {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(DomainError::InvalidField {
            field,
            reason: String::from("must be a boolean"),
        }),
    }
}

fn validate_team_size(value: Option<&Value>) -> Result<u8, DomainError> {
    value
        .and_then(Value::as_u64)
        .and_then(|n| u8::try_from(n).ok())
        .filter(|n| (1..=MAX_TEAM_SIZE).contains(n))
        .ok_or_else(|| DomainError::InvalidField {
            field: "teamSize",
            reason: format!("must be an integer between 1 and {MAX_TEAM_SIZE}"),
        })
}

fn validate_pool(
    value: Option<&Value>,
    pool: &'static str,
    is_known: impl Fn(&str) -> bool,
) -> Result<Vec<String>, DomainError> {
    let entries: &Vec<Value> =
        value
            .and_then(Value::as_array)
            .ok_or_else(|| DomainError::InvalidField {
                field: pool,
                reason: String::from("must be an array"),
            })?;

    if entries.len() > MAX_POOL_SIZE {
        return Err(DomainError::InvalidField {
            field: pool,
            reason: format!("must have at most {MAX_POOL_SIZE} entries"),
        });
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());
    let mut ids: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let id: &str = entry.as_str().ok_or_else(|| DomainError::InvalidField {
            field: pool,
            reason: String::from("entries must be strings"),
        })?;
        if !is_known(id) {
            return Err(DomainError::UnknownPoolItem {
                pool,
                id: id.to_string(),
            });
        }
        if !seen.insert(id) {
            return Err(DomainError::DuplicatePoolItem {
                pool,
                id: id.to_string(),
            });
        }
        ids.push(id.to_string());
    }

    Ok(ids)
}

fn validate_steps(value: Option<&Value>, team_size: u8) -> Result<Vec<DraftStep>, DomainError> {
    let entries: &Vec<Value> =
        value
            .and_then(Value::as_array)
            .ok_or_else(|| DomainError::InvalidField {
                field: "steps",
                reason: String::from("must be an array"),
            })?;

    if entries.is_empty() || entries.len() > MAX_STEPS {
        return Err(DomainError::InvalidField {
            field: "steps",
            reason: format!("must have between 1 and {MAX_STEPS} entries"),
        });
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| validate_step(index, entry, team_size))
        .collect()
}

fn validate_step(index: usize, value: &Value, team_size: u8) -> Result<DraftStep, DomainError> {
    let invalid = |reason: String| DomainError::InvalidStep { index, reason };

    let obj: &Map<String, Value> = value
        .as_object()
        .ok_or_else(|| invalid(String::from("must be an object")))?;

    let action: DraftAction = enum_field(obj, "action").map_err(invalid)?;
    let target: DraftTarget = enum_field(obj, "target").map_err(invalid)?;
    let team: Team = enum_field(obj, "team").map_err(invalid)?;

    let player_index: Option<u8> = match optional(obj, "playerIndex") {
        None => None,
        Some(raw) => {
            let player: u8 = raw
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .filter(|n| *n < team_size)
                .ok_or_else(|| {
                    invalid(format!(
                        "playerIndex must be an integer in [0, {team_size})"
                    ))
                })?;
            if action != DraftAction::Pick || target != DraftTarget::Civ {
                return Err(invalid(String::from(
                    "playerIndex is only allowed on civ pick steps",
                )));
            }
            Some(player)
        }
    };

    let auto: bool = step_flag(obj, "auto").map_err(invalid)?;
    let hidden: bool = step_flag(obj, "hidden").map_err(invalid)?;

    if hidden && action != DraftAction::Ban {
        return Err(invalid(String::from("only ban steps may be hidden")));
    }
    if hidden && auto {
        return Err(invalid(String::from("a step cannot be both hidden and auto")));
    }

    Ok(DraftStep {
        action,
        target,
        team,
        player_index,
        auto,
        hidden,
    })
}

fn enum_field<T>(obj: &Map<String, Value>, field: &str) -> Result<T, String>
where
    T: std::str::FromStr<Err = String>,
{
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{field} must be a string"))?
        .parse()
}

fn step_flag(obj: &Map<String, Value>, field: &str) -> Result<bool, String> {
    match optional(obj, field) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(format!("{field} must be a boolean")),
    }
}

fn validate_hidden_runs(steps: &[DraftStep]) -> Result<(), DomainError> {
    let mut index: usize = 0;
    while index < steps.len() {
        let run_len: usize = hidden_run_len(steps, index);
        if run_len == 0 {
            index += 1;
            continue;
        }

        let run: &[DraftStep] = &steps[index..index + run_len];
        let has_team1: bool = run.iter().any(|s| s.team == Team::Team1);
        let has_team2: bool = run.iter().any(|s| s.team == Team::Team2);
        if !(has_team1 && has_team2) {
            return Err(DomainError::InvalidStep {
                index,
                reason: String::from("a hidden ban phase must include steps for both teams"),
            });
        }

        index += run_len;
    }
    Ok(())
}

fn validate_roster(
    value: Option<&Value>,
    field: &'static str,
    team_size: u8,
) -> Result<Vec<PlayerSlot>, DomainError> {
    let entries: &Vec<Value> =
        value
            .and_then(Value::as_array)
            .ok_or_else(|| DomainError::InvalidRoster {
                field,
                reason: String::from("must be an array"),
            })?;

    if entries.len() != usize::from(team_size) {
        return Err(DomainError::InvalidRoster {
            field,
            reason: format!(
                "expected exactly {team_size} players, got {}",
                entries.len()
            ),
        });
    }

    entries
        .iter()
        .map(|entry| {
            let name: &str = entry
                .get("name")
                .and_then(Value::as_str)
                .filter(|n| n.chars().count() <= MAX_NAME_LEN)
                .ok_or_else(|| DomainError::InvalidRoster {
                    field,
                    reason: format!(
                        "each player must be {{name: string}} of at most {MAX_NAME_LEN} characters"
                    ),
                })?;
            Ok(PlayerSlot::new(name))
        })
        .collect()
}
