//! Labor-policy rules.
//!
//! Every optional rule is a toggle plus an optional numeric value. Toggles
//! are resolved once, before model construction, into a [`ResolvedPolicy`]
//! whose `Option`s say exactly which constraint families the builder emits.

use super::workforce::InputError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Errors raised while turning policy toggles or solver limits into a model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Policy rule '{rule}' is enabled but has no value")]
    MissingRuleValue { rule: &'static str },

    #[error("Policy rule '{rule}' has invalid value {value}")]
    InvalidRuleValue { rule: &'static str, value: f64 },

    #[error("Solver parameter '{parameter}' has invalid value {value}")]
    InvalidSolverLimit { parameter: &'static str, value: f64 },
}

/// A single toggle-able rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub enabled: bool,
    pub value: Option<f64>,
}

impl PolicyRule {
    pub fn enabled(value: f64) -> Self {
        Self {
            enabled: true,
            value: Some(value),
        }
    }

    /// Enabled rule that carries no numeric value of its own
    pub fn switch_on() -> Self {
        Self {
            enabled: true,
            value: None,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Value of an enabled rule, `None` when disabled.
    ///
    /// An enabled rule without a usable value is a configuration error.
    fn required_value(&self, rule: &'static str) -> Result<Option<f64>, ConfigurationError> {
        if !self.enabled {
            return Ok(None);
        }
        match self.value {
            None => Err(ConfigurationError::MissingRuleValue { rule }),
            Some(v) if v.is_nan() => Err(ConfigurationError::MissingRuleValue { rule }),
            Some(v) if v.is_infinite() || v < 0.0 => {
                Err(ConfigurationError::InvalidRuleValue { rule, value: v })
            }
            Some(v) => Ok(Some(v)),
        }
    }

    /// Allowance-style rules contribute 0 when switched off
    fn allowance(&self, rule: &'static str) -> Result<f64, ConfigurationError> {
        Ok(self.required_value(rule)?.unwrap_or(0.0))
    }
}

/// All recognized scheduling rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyParameters {
    /// Qualified headcount required in every slot with positive demand
    pub special_qualification_per_slot: PolicyRule,
    /// Hours an employee may work on one day
    pub max_working_time_per_day: PolicyRule,
    /// Minimum shift length in hours, binding only on worked days
    pub min_working_time_per_day: PolicyRule,
    /// Cap weekly work at each employee's `max_hours_per_week`
    pub max_working_time_per_week: PolicyRule,
    pub overtime_per_week: PolicyRule,
    /// Require each employee's `min_hours_per_week`
    pub min_working_time_per_week: PolicyRule,
    pub shortfall_per_week: PolicyRule,
}

impl PolicyParameters {
    pub const SPECIAL_QUALIFICATION: &'static str = "demand_specialQualification_per_Slot";
    pub const MAX_PER_DAY: &'static str = "max_workingTime_per_Day";
    pub const MIN_PER_DAY: &'static str = "min_workingTime_per_Day";
    pub const MAX_PER_WEEK: &'static str = "max_employee_WorkingTime_per_Week";
    pub const OVERTIME: &'static str = "overtime_per_Week";
    pub const MIN_PER_WEEK: &'static str = "min_employee_WorkingTime_per_Week";
    pub const SHORTFALL: &'static str = "minusHours_per_Week";
    /// Per-employee daily caps are always enforced; this row is accepted but
    /// its toggle has no effect
    pub const EMPLOYEE_DAILY_CAP: &'static str = "max_employee_WorkingTime_per_Day";

    const ROW_NAMES: [&'static str; 7] = [
        Self::SPECIAL_QUALIFICATION,
        Self::MAX_PER_DAY,
        Self::MIN_PER_DAY,
        Self::MAX_PER_WEEK,
        Self::OVERTIME,
        Self::MIN_PER_WEEK,
        Self::SHORTFALL,
    ];

    /// Build the policy from a parameter table.
    ///
    /// Rows are `(name, to_consider, value)`. Every recognized rule must have
    /// a row; unknown names are rejected so typos do not silently disable a
    /// rule.
    pub fn from_rows<'a, I>(rows: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = (&'a str, bool, Option<f64>)>,
    {
        let mut policy = Self::default();
        let mut seen = [false; 7];
        let mut daily_cap_seen = false;

        for (name, enabled, value) in rows {
            if name == Self::EMPLOYEE_DAILY_CAP {
                if daily_cap_seen {
                    return Err(InputError::DuplicateParameter(name.to_string()));
                }
                daily_cap_seen = true;
                if !enabled {
                    warn!(rule = name, "Per-employee daily caps are always enforced");
                }
                continue;
            }
            let index = Self::ROW_NAMES
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| InputError::UnknownParameter(name.to_string()))?;
            if seen[index] {
                return Err(InputError::DuplicateParameter(name.to_string()));
            }
            seen[index] = true;
            *policy.rule_mut(index) = PolicyRule { enabled, value };
        }

        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(InputError::MissingParameter(Self::ROW_NAMES[missing]));
        }
        Ok(policy)
    }

    fn rule_mut(&mut self, index: usize) -> &mut PolicyRule {
        match index {
            0 => &mut self.special_qualification_per_slot,
            1 => &mut self.max_working_time_per_day,
            2 => &mut self.min_working_time_per_day,
            3 => &mut self.max_working_time_per_week,
            4 => &mut self.overtime_per_week,
            5 => &mut self.min_working_time_per_week,
            _ => &mut self.shortfall_per_week,
        }
    }

    /// Resolve toggles into the concrete rule set the model builder emits
    pub fn resolve(&self) -> Result<ResolvedPolicy, ConfigurationError> {
        let max_week_allowance = if self.max_working_time_per_week.enabled {
            Some(self.overtime_per_week.allowance(Self::OVERTIME)?)
        } else {
            None
        };
        let min_week_allowance = if self.min_working_time_per_week.enabled {
            Some(self.shortfall_per_week.allowance(Self::SHORTFALL)?)
        } else {
            None
        };

        Ok(ResolvedPolicy {
            special_qualification_per_slot: self
                .special_qualification_per_slot
                .required_value(Self::SPECIAL_QUALIFICATION)?,
            max_hours_per_day: self.max_working_time_per_day.required_value(Self::MAX_PER_DAY)?,
            min_hours_per_day: self.min_working_time_per_day.required_value(Self::MIN_PER_DAY)?,
            overtime_per_week: max_week_allowance,
            shortfall_per_week: min_week_allowance,
        })
    }
}

/// Policy with every toggle decided; `None` means the rule is absent from the model
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedPolicy {
    pub special_qualification_per_slot: Option<f64>,
    pub max_hours_per_day: Option<f64>,
    pub min_hours_per_day: Option<f64>,
    /// `Some(overtime)` when the weekly maximum applies
    pub overtime_per_week: Option<f64>,
    /// `Some(shortfall)` when the weekly minimum applies
    pub shortfall_per_week: Option<f64>,
}
