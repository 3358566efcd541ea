//! Decoding of a solved slot assignment into shift intervals.
//!
//! Per employee and day the decoder takes the last slot with `z = 1` as the
//! start of the block and the last slot with `x = 1` as its end. A day
//! without any worked slot is a day off, whatever `z` says.
//!
//! The decoder never repairs a solution. If the worked slots are split into
//! several blocks, or the start marker is not the first worked slot, the
//! assignment did not come from a valid solve and decoding fails.

use super::model_builder::ScheduleModel;
use super::models::Solution;
use super::value_objects::SolutionStatus;
use super::workforce::WorkforceInstance;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Solver values at or above this are read as 1
pub const ACTIVE_THRESHOLD: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("Assignment has {found} values per variable family, expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Solve status {0} carries no assignment")]
    NoAssignment(SolutionStatus),

    #[error("Shift of '{employee}' on '{day}' is not one contiguous block")]
    NonContiguousShift { employee: String, day: String },

    #[error("Shift of '{employee}' on '{day}' starts in slot {first_worked}, marked {marked:?}")]
    MisplacedShiftStart {
        employee: String,
        day: String,
        first_worked: usize,
        marked: Option<usize>,
    },
}

/// 0/1 values of every `x` and `z`, laid out `[employee][day][slot]`
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedAssignment {
    pub status: SolutionStatus,
    pub objective_value: Option<f64>,
    pub gap: Option<f64>,
    x: Vec<bool>,
    z: Vec<bool>,
}

impl SolvedAssignment {
    pub fn new(status: SolutionStatus, x: Vec<bool>, z: Vec<bool>) -> Self {
        Self {
            status,
            objective_value: None,
            gap: None,
            x,
            z,
        }
    }

    /// Read the `x` and `z` values of `model` out of a solver solution
    pub fn from_solution(model: &ScheduleModel, solution: &Solution) -> Result<Self, DecodeError> {
        if !solution.status.has_assignment() {
            return Err(DecodeError::NoAssignment(solution.status));
        }
        let values = &solution.variable_values;
        if values.len() != model.problem.num_variables() {
            return Err(DecodeError::ShapeMismatch {
                expected: model.problem.num_variables(),
                found: values.len(),
            });
        }
        let read = |ids: &[usize]| {
            ids.iter()
                .map(|&id| values[id] >= ACTIVE_THRESHOLD)
                .collect::<Vec<_>>()
        };

        Ok(Self {
            status: solution.status,
            objective_value: solution.objective_value,
            gap: solution.gap,
            x: read(model.x.ids()),
            z: read(model.z.ids()),
        })
    }

    pub fn x(&self) -> &[bool] {
        &self.x
    }

    pub fn z(&self) -> &[bool] {
        &self.z
    }
}

/// Half-open worked interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ShiftInterval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Shift of one employee on one day; `shift` is `None` on days off
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub employee: String,
    pub day: String,
    pub date: NaiveDate,
    pub shift: Option<ShiftInterval>,
}

impl ScheduleEntry {
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.shift.map(|s| s.start)
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.shift.map(|s| s.end)
    }

    pub fn is_off(&self) -> bool {
        self.shift.is_none()
    }
}

/// Decode `assignment` into one entry per (employee, day), employee-major
pub fn decode(
    assignment: &SolvedAssignment,
    instance: &WorkforceInstance,
) -> Result<Vec<ScheduleEntry>, DecodeError> {
    let nr_slots = instance.nr_slots();
    let expected = instance.nr_employees() * instance.nr_days() * nr_slots;
    for found in [assignment.x.len(), assignment.z.len()] {
        if found != expected {
            return Err(DecodeError::ShapeMismatch { expected, found });
        }
    }

    let horizon = instance.horizon();
    let mut entries = Vec::with_capacity(instance.nr_employees() * instance.nr_days());
    let mut offset = 0;

    for employee in instance.employees() {
        for (t, day) in instance.days().iter().enumerate() {
            let x = &assignment.x[offset..offset + nr_slots];
            let z = &assignment.z[offset..offset + nr_slots];
            offset += nr_slots;

            let shift = match worked_block(x, z) {
                Block::Off => None,
                Block::Worked { first, last } => Some(ShiftInterval {
                    start: horizon.slot_start(t, first),
                    end: horizon.slot_end(t, last),
                }),
                Block::Split => {
                    return Err(DecodeError::NonContiguousShift {
                        employee: employee.name.clone(),
                        day: day.name.clone(),
                    })
                }
                Block::Misplaced {
                    first_worked,
                    marked,
                } => {
                    return Err(DecodeError::MisplacedShiftStart {
                        employee: employee.name.clone(),
                        day: day.name.clone(),
                        first_worked,
                        marked,
                    })
                }
            };

            entries.push(ScheduleEntry {
                employee: employee.name.clone(),
                day: day.name.clone(),
                date: day.date,
                shift,
            });
        }
    }

    Ok(entries)
}

enum Block {
    Off,
    Worked { first: usize, last: usize },
    Split,
    Misplaced { first_worked: usize, marked: Option<usize> },
}

fn worked_block(x: &[bool], z: &[bool]) -> Block {
    let mut start = None;
    let mut end = None;
    let mut first_worked = None;
    let mut worked = 0;

    for s in 0..x.len() {
        if z[s] {
            start = Some(s);
        }
        if x[s] {
            end = Some(s);
            first_worked.get_or_insert(s);
            worked += 1;
        }
    }

    match (first_worked, end) {
        (Some(first), Some(last)) => {
            if last - first + 1 != worked {
                Block::Split
            } else if start != Some(first) {
                Block::Misplaced {
                    first_worked: first,
                    marked: start,
                }
            } else {
                Block::Worked { first, last }
            }
        }
        _ => Block::Off,
    }
}
