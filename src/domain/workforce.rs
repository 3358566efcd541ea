//! Workforce domain model: employees, the planning horizon and demand.
//!
//! Raw inputs are keyed by name the way the source tables are. They are
//! validated once into a [`WorkforceInstance`], which stores everything in
//! dense index order (`employee`, `day`, `slot`) for the model builder and
//! the decoder.

use super::policy::PolicyParameters;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Errors in the raw scheduling input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Enter at least 1 employee")]
    NoEmployees,

    #[error("Planning horizon has no days")]
    NoDays,

    #[error("Planning horizon has no slots")]
    NoSlots,

    #[error("Slot duration must be positive")]
    ZeroSlotDuration,

    #[error("Slot {index} does not start after its predecessor")]
    UnorderedSlots { index: usize },

    #[error("{nr_slots} slots of {slot_minutes} min from {first} run past midnight")]
    SlotsPastMidnight {
        first: NaiveTime,
        nr_slots: usize,
        slot_minutes: u32,
    },

    #[error("Employee '{0}' is listed more than once")]
    DuplicateEmployee(String),

    #[error("Day '{0}' is listed more than once")]
    DuplicateDay(String),

    #[error("No demand row for day '{0}'")]
    MissingDemand(String),

    #[error("Demand row for day '{day}' has {found} slots, expected {expected}")]
    DemandLength {
        day: String,
        expected: usize,
        found: usize,
    },

    #[error("Demand row for unknown day '{0}'")]
    UnknownDemandDay(String),

    #[error("Employee '{employee}' has no maximum hours for day '{day}'")]
    MissingDailyCap { employee: String, day: String },

    #[error("Employee '{employee}' has invalid {field}: {value}")]
    InvalidHours {
        employee: String,
        field: &'static str,
        value: f64,
    },

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Parameter '{0}' is listed more than once")]
    DuplicateParameter(String),

    #[error("Missing parameter row '{0}'")]
    MissingParameter(&'static str),
}

/// Employee attributes as loaded from the employee table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub has_special_qualification: bool,
    pub min_hours_per_week: f64,
    pub max_hours_per_week: f64,
    /// Cap per day name; 0 means the employee cannot work that day
    pub max_hours_per_day: BTreeMap<String, f64>,
}

impl Employee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_special_qualification: false,
            min_hours_per_week: 0.0,
            max_hours_per_week: 0.0,
            max_hours_per_day: BTreeMap::new(),
        }
    }

    pub fn with_special_qualification(mut self, qualified: bool) -> Self {
        self.has_special_qualification = qualified;
        self
    }

    pub fn with_weekly_hours(mut self, min: f64, max: f64) -> Self {
        self.min_hours_per_week = min;
        self.max_hours_per_week = max;
        self
    }

    pub fn with_daily_cap(mut self, day: impl Into<String>, hours: f64) -> Self {
        self.max_hours_per_day.insert(day.into(), hours);
        self
    }
}

/// One calendar day of the horizon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub name: String,
    pub date: NaiveDate,
}

impl Day {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
        }
    }
}

/// Ordered days, ordered slot start times and the slot length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub days: Vec<Day>,
    pub slot_starts: Vec<NaiveTime>,
    pub slot_minutes: u32,
}

impl Horizon {
    pub fn new(days: Vec<Day>, slot_starts: Vec<NaiveTime>, slot_minutes: u32) -> Self {
        Self {
            days,
            slot_starts,
            slot_minutes,
        }
    }

    /// `nr_slots` back-to-back slots starting at `first`
    ///
    /// Slot starts are times of day, so every start must fall before
    /// midnight. The last slot may still end on the following date.
    pub fn contiguous(
        days: Vec<Day>,
        first: NaiveTime,
        nr_slots: usize,
        slot_minutes: u32,
    ) -> Result<Self, InputError> {
        let past_midnight = || InputError::SlotsPastMidnight {
            first,
            nr_slots,
            slot_minutes,
        };
        let count = i32::try_from(nr_slots).map_err(|_| past_midnight())?;
        let step = Duration::minutes(i64::from(slot_minutes));

        let mut slot_starts = Vec::new();
        for s in 0..count {
            let offset = step.checked_mul(s).ok_or_else(past_midnight)?;
            let (start, wrapped) = first.overflowing_add_signed(offset);
            if wrapped != 0 {
                return Err(past_midnight());
            }
            slot_starts.push(start);
        }
        Ok(Self::new(days, slot_starts, slot_minutes))
    }

    pub fn nr_days(&self) -> usize {
        self.days.len()
    }

    pub fn nr_slots(&self) -> usize {
        self.slot_starts.len()
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    pub fn slots_per_hour(&self) -> f64 {
        60.0 / f64::from(self.slot_minutes)
    }

    /// Absolute start of slot `slot` on day `day`
    pub fn slot_start(&self, day: usize, slot: usize) -> NaiveDateTime {
        self.days[day].date.and_time(self.slot_starts[slot])
    }

    /// Absolute (exclusive) end of slot `slot` on day `day`
    pub fn slot_end(&self, day: usize, slot: usize) -> NaiveDateTime {
        self.slot_start(day, slot) + self.slot_duration()
    }

    fn validate(&self) -> Result<(), InputError> {
        if self.days.is_empty() {
            return Err(InputError::NoDays);
        }
        if self.slot_starts.is_empty() {
            return Err(InputError::NoSlots);
        }
        if self.slot_minutes == 0 {
            return Err(InputError::ZeroSlotDuration);
        }
        if let Some(index) = (1..self.slot_starts.len())
            .find(|&s| self.slot_starts[s] <= self.slot_starts[s - 1])
        {
            return Err(InputError::UnorderedSlots { index });
        }

        let mut names = HashSet::new();
        for day in &self.days {
            if !names.insert(day.name.as_str()) {
                return Err(InputError::DuplicateDay(day.name.clone()));
            }
        }
        Ok(())
    }
}

/// Required headcount per day name, one entry per slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    pub rows: BTreeMap<String, Vec<u32>>,
}

impl Demand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, day: impl Into<String>, headcount: Vec<u32>) -> Self {
        self.rows.insert(day.into(), headcount);
        self
    }
}

/// Validated, immutable scheduling input
#[derive(Debug, Clone)]
pub struct WorkforceInstance {
    employees: Vec<Employee>,
    horizon: Horizon,
    /// `[day][slot]`
    demand: Vec<Vec<u32>>,
    /// `[employee][day]`, hours
    daily_caps: Vec<Vec<f64>>,
    policy: PolicyParameters,
}

impl WorkforceInstance {
    pub fn new(
        employees: Vec<Employee>,
        horizon: Horizon,
        demand: Demand,
        policy: PolicyParameters,
    ) -> Result<Self, InputError> {
        if employees.is_empty() {
            return Err(InputError::NoEmployees);
        }
        horizon.validate()?;

        let mut names = HashSet::new();
        for employee in &employees {
            if !names.insert(employee.name.as_str()) {
                return Err(InputError::DuplicateEmployee(employee.name.clone()));
            }
            check_hours(employee, "min_hours_per_week", employee.min_hours_per_week)?;
            check_hours(employee, "max_hours_per_week", employee.max_hours_per_week)?;
        }

        if let Some(unknown) = demand
            .rows
            .keys()
            .find(|day| !horizon.days.iter().any(|d| &d.name == *day))
        {
            return Err(InputError::UnknownDemandDay(unknown.clone()));
        }

        let demand = horizon
            .days
            .iter()
            .map(|day| {
                let row = demand
                    .rows
                    .get(&day.name)
                    .ok_or_else(|| InputError::MissingDemand(day.name.clone()))?;
                if row.len() != horizon.nr_slots() {
                    return Err(InputError::DemandLength {
                        day: day.name.clone(),
                        expected: horizon.nr_slots(),
                        found: row.len(),
                    });
                }
                Ok(row.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let daily_caps = employees
            .iter()
            .map(|employee| {
                horizon
                    .days
                    .iter()
                    .map(|day| {
                        let hours = employee.max_hours_per_day.get(&day.name).copied().ok_or_else(
                            || InputError::MissingDailyCap {
                                employee: employee.name.clone(),
                                day: day.name.clone(),
                            },
                        )?;
                        check_hours(employee, "max_hours_per_day", hours)?;
                        Ok(hours)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            employees,
            horizon,
            demand,
            daily_caps,
            policy,
        })
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn days(&self) -> &[Day] {
        &self.horizon.days
    }

    pub fn policy(&self) -> &PolicyParameters {
        &self.policy
    }

    pub fn nr_employees(&self) -> usize {
        self.employees.len()
    }

    pub fn nr_days(&self) -> usize {
        self.horizon.nr_days()
    }

    pub fn nr_slots(&self) -> usize {
        self.horizon.nr_slots()
    }

    pub fn demand(&self, day: usize, slot: usize) -> u32 {
        self.demand[day][slot]
    }

    /// Maximum hours employee `employee` may work on day `day`
    pub fn daily_cap(&self, employee: usize, day: usize) -> f64 {
        self.daily_caps[employee][day]
    }

    /// Whether the slot needs qualified staff: the rule is on and the slot has demand
    pub fn requires_special_qualification(&self, day: usize, slot: usize) -> bool {
        self.policy.special_qualification_per_slot.enabled && self.demand(day, slot) > 0
    }

    /// Copy of this instance with a different policy
    pub fn with_policy(&self, policy: PolicyParameters) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }
}

fn check_hours(employee: &Employee, field: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InputError::InvalidHours {
            employee: employee.name.clone(),
            field,
            value,
        })
    }
}
