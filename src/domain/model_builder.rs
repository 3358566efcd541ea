//! Translation of a [`WorkforceInstance`] into a binary linear program.
//!
//! Two variable families are allocated per `(employee, day, slot)`:
//!
//! - `x`: the employee works the slot,
//! - `z`: the slot starts the employee's working block for that day.
//!
//! `z` is only bounded from below by the 0→1 transitions of `x`
//! (`z[s] >= x[s] - x[s-1]`). Together with at most one `z` per day this
//! admits exactly one contiguous block, or none. The inequality must stay
//! one-sided: `z` is never forced to 0.
//!
//! The objective minimizes the number of staffed slots.

use super::models::{
    Constraint, ObjectiveFunction, OptimizationProblem, VarId, Variable,
};
use super::policy::{ConfigurationError, ResolvedPolicy};
use super::value_objects::{ConstraintType, OptimizationType};
use super::workforce::WorkforceInstance;
use std::fmt;
use tracing::{debug, info};

/// Constraint families emitted by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintFamily {
    Demand,
    SpecialQualification,
    OneShiftStart,
    ShiftStart,
    MaxWorkingTimePerDay,
    MinWorkingTimePerDay,
    MaxWorkingTimePerWeek,
    MinWorkingTimePerWeek,
    EmployeeDailyCap,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 9] = [
        ConstraintFamily::Demand,
        ConstraintFamily::SpecialQualification,
        ConstraintFamily::OneShiftStart,
        ConstraintFamily::ShiftStart,
        ConstraintFamily::MaxWorkingTimePerDay,
        ConstraintFamily::MinWorkingTimePerDay,
        ConstraintFamily::MaxWorkingTimePerWeek,
        ConstraintFamily::MinWorkingTimePerWeek,
        ConstraintFamily::EmployeeDailyCap,
    ];

    /// Prefix of the diagnostic names of this family's constraints
    pub fn prefix(&self) -> &'static str {
        match self {
            ConstraintFamily::Demand => "demand",
            ConstraintFamily::SpecialQualification => "special_qualification",
            ConstraintFamily::OneShiftStart => "one_start",
            ConstraintFamily::ShiftStart => "sequential_shift",
            ConstraintFamily::MaxWorkingTimePerDay => "max_working_time_day",
            ConstraintFamily::MinWorkingTimePerDay => "min_working_time_day",
            ConstraintFamily::MaxWorkingTimePerWeek => "max_working_time_week",
            ConstraintFamily::MinWorkingTimePerWeek => "min_working_time_week",
            ConstraintFamily::EmployeeDailyCap => "max_hours_per_day",
        }
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Variable ids laid out as `[employee][day][slot]`
#[derive(Debug, Clone)]
pub struct VarGrid {
    nr_days: usize,
    nr_slots: usize,
    ids: Vec<VarId>,
}

impl VarGrid {
    pub fn get(&self, employee: usize, day: usize, slot: usize) -> VarId {
        self.ids[(employee * self.nr_days + day) * self.nr_slots + slot]
    }

    /// Ids of all slots of one employee-day, in slot order
    pub fn day(&self, employee: usize, day: usize) -> &[VarId] {
        let start = (employee * self.nr_days + day) * self.nr_slots;
        &self.ids[start..start + self.nr_slots]
    }

    /// Ids of all slots of one employee over the horizon
    pub fn week(&self, employee: usize) -> &[VarId] {
        let len = self.nr_days * self.nr_slots;
        &self.ids[employee * len..(employee + 1) * len]
    }

    /// All ids in `[employee][day][slot]` order
    pub fn ids(&self) -> &[VarId] {
        &self.ids
    }
}

/// The built program plus the index maps needed to read a solution back
#[derive(Debug, Clone)]
pub struct ScheduleModel {
    pub problem: OptimizationProblem,
    pub x: VarGrid,
    pub z: VarGrid,
    /// Family of each constraint, parallel to `problem.constraints`
    families: Vec<ConstraintFamily>,
}

impl ScheduleModel {
    pub fn family_of(&self, constraint: usize) -> ConstraintFamily {
        self.families[constraint]
    }

    pub fn constraints_in(
        &self,
        family: ConstraintFamily,
    ) -> impl Iterator<Item = &Constraint> + '_ {
        self.problem
            .constraints
            .iter()
            .zip(&self.families)
            .filter(move |(_, f)| **f == family)
            .map(|(c, _)| c)
    }

    pub fn count(&self, family: ConstraintFamily) -> usize {
        self.families.iter().filter(|f| **f == family).count()
    }
}

/// Build the scheduling model for `instance`
pub fn build(instance: &WorkforceInstance) -> Result<ScheduleModel, ConfigurationError> {
    let policy = instance.policy().resolve()?;
    let model = ModelBuilder::new(instance, policy).build();

    info!(
        variables = model.problem.num_variables(),
        constraints = model.problem.num_constraints(),
        "Built workforce scheduling model"
    );
    for family in ConstraintFamily::ALL {
        debug!(%family, count = model.count(family), "constraint family");
    }

    Ok(model)
}

struct ModelBuilder<'a> {
    instance: &'a WorkforceInstance,
    policy: ResolvedPolicy,
    problem: OptimizationProblem,
    families: Vec<ConstraintFamily>,
    slots_per_hour: f64,
}

impl<'a> ModelBuilder<'a> {
    fn new(instance: &'a WorkforceInstance, policy: ResolvedPolicy) -> Self {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(OptimizationType::Minimize))
            .with_name("Workforce_scheduling")
            .with_description(format!(
                "{} employees, {} days, {} slots per day",
                instance.nr_employees(),
                instance.nr_days(),
                instance.nr_slots()
            ));

        Self {
            instance,
            policy,
            problem,
            families: Vec::new(),
            slots_per_hour: instance.horizon().slots_per_hour(),
        }
    }

    fn build(mut self) -> ScheduleModel {
        let x = self.allocate("x");
        let z = self.allocate("z");

        self.problem.objective = ObjectiveFunction::new(OptimizationType::Minimize)
            .with_terms(x.ids.iter().map(|&id| (id, 1.0)).collect());

        self.add_demand_coverage(&x);
        if let Some(required) = self.policy.special_qualification_per_slot {
            self.add_special_qualification(&x, required);
        }
        self.add_one_shift_start(&z);
        self.add_shift_start_tracking(&x, &z);
        if let Some(hours) = self.policy.max_hours_per_day {
            self.add_max_working_time_per_day(&x, hours);
        }
        if let Some(hours) = self.policy.min_hours_per_day {
            self.add_min_working_time_per_day(&x, &z, hours);
        }
        if let Some(overtime) = self.policy.overtime_per_week {
            self.add_max_working_time_per_week(&x, overtime);
        }
        if let Some(shortfall) = self.policy.shortfall_per_week {
            self.add_min_working_time_per_week(&x, shortfall);
        }
        self.add_employee_daily_caps(&x);

        ScheduleModel {
            problem: self.problem,
            x,
            z,
            families: self.families,
        }
    }

    fn allocate(&mut self, family: &str) -> VarGrid {
        let instance = self.instance;
        let mut ids = Vec::with_capacity(
            instance.nr_employees() * instance.nr_days() * instance.nr_slots(),
        );
        for employee in instance.employees() {
            for day in instance.days() {
                for slot in 0..instance.nr_slots() {
                    let name = format!(
                        "{}_{}_{}_{}",
                        family,
                        employee.name,
                        day.name,
                        self.slot_label(slot)
                    );
                    ids.push(self.problem.add_variable(Variable::binary(name)));
                }
            }
        }
        VarGrid {
            nr_days: instance.nr_days(),
            nr_slots: instance.nr_slots(),
            ids,
        }
    }

    fn slot_label(&self, slot: usize) -> String {
        self.instance.horizon().slot_starts[slot]
            .format("%H:%M")
            .to_string()
    }

    fn push(&mut self, family: ConstraintFamily, constraint: Constraint, keys: &[&str]) {
        let mut name = String::from(family.prefix());
        for key in keys {
            name.push('_');
            name.push_str(key);
        }
        self.problem.add_constraint(constraint.with_name(name));
        self.families.push(family);
    }

    fn employee_name(&self, employee: usize) -> &'a str {
        &self.instance.employees()[employee].name
    }

    fn day_name(&self, day: usize) -> &'a str {
        &self.instance.days()[day].name
    }

    /// Σ_m x[m][t][s] >= demand[t][s]
    fn add_demand_coverage(&mut self, x: &VarGrid) {
        let instance = self.instance;
        for t in 0..instance.nr_days() {
            for s in 0..instance.nr_slots() {
                let terms = (0..instance.nr_employees())
                    .map(|m| (x.get(m, t, s), 1.0))
                    .collect();
                let demand = f64::from(instance.demand(t, s));
                let slot = self.slot_label(s);
                self.push(
                    ConstraintFamily::Demand,
                    Constraint::new(ConstraintType::GreaterThanOrEqual, terms, demand),
                    &[self.day_name(t), slot.as_str()],
                );
            }
        }
    }

    /// Σ_m q[m]·x[m][t][s] >= required, for slots with positive demand
    fn add_special_qualification(&mut self, x: &VarGrid, required: f64) {
        let instance = self.instance;
        let qualified: Vec<usize> = instance
            .employees()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.has_special_qualification)
            .map(|(m, _)| m)
            .collect();

        for t in 0..instance.nr_days() {
            for s in 0..instance.nr_slots() {
                if !instance.requires_special_qualification(t, s) {
                    continue;
                }
                let terms = qualified.iter().map(|&m| (x.get(m, t, s), 1.0)).collect();
                let slot = self.slot_label(s);
                self.push(
                    ConstraintFamily::SpecialQualification,
                    Constraint::new(ConstraintType::GreaterThanOrEqual, terms, required),
                    &[self.day_name(t), slot.as_str()],
                );
            }
        }
    }

    /// Σ_s z[m][t][s] <= 1
    fn add_one_shift_start(&mut self, z: &VarGrid) {
        let instance = self.instance;
        for m in 0..instance.nr_employees() {
            for t in 0..instance.nr_days() {
                let terms = z.day(m, t).iter().map(|&id| (id, 1.0)).collect();
                self.push(
                    ConstraintFamily::OneShiftStart,
                    Constraint::new(ConstraintType::LessThanOrEqual, terms, 1.0),
                    &[self.employee_name(m), self.day_name(t)],
                );
            }
        }
    }

    /// z[m][t][0] >= x[m][t][0] and z[m][t][s] >= x[m][t][s] - x[m][t][s-1]
    fn add_shift_start_tracking(&mut self, x: &VarGrid, z: &VarGrid) {
        let instance = self.instance;
        for m in 0..instance.nr_employees() {
            for t in 0..instance.nr_days() {
                for s in 0..instance.nr_slots() {
                    let mut terms = vec![(z.get(m, t, s), 1.0), (x.get(m, t, s), -1.0)];
                    if s > 0 {
                        terms.push((x.get(m, t, s - 1), 1.0));
                    }
                    let slot = self.slot_label(s);
                    self.push(
                        ConstraintFamily::ShiftStart,
                        Constraint::new(ConstraintType::GreaterThanOrEqual, terms, 0.0),
                        &[self.employee_name(m), self.day_name(t), slot.as_str()],
                    );
                }
            }
        }
    }

    /// Σ_s x[m][t][s] <= hours · slots_per_hour
    fn add_max_working_time_per_day(&mut self, x: &VarGrid, hours: f64) {
        let instance = self.instance;
        let bound = hours * self.slots_per_hour;
        for m in 0..instance.nr_employees() {
            for t in 0..instance.nr_days() {
                self.push(
                    ConstraintFamily::MaxWorkingTimePerDay,
                    Constraint::new(
                        ConstraintType::LessThanOrEqual,
                        unit_terms(x.day(m, t)),
                        bound,
                    ),
                    &[self.employee_name(m), self.day_name(t)],
                );
            }
        }
    }

    /// Σ_s x[m][t][s] >= hours · slots_per_hour · Σ_s z[m][t][s]
    ///
    /// The right side vanishes on days without a shift start, so the rule
    /// only binds on worked days.
    fn add_min_working_time_per_day(&mut self, x: &VarGrid, z: &VarGrid, hours: f64) {
        let instance = self.instance;
        let slots = hours * self.slots_per_hour;
        for m in 0..instance.nr_employees() {
            for t in 0..instance.nr_days() {
                let mut terms = unit_terms(x.day(m, t));
                terms.extend(z.day(m, t).iter().map(|&id| (id, -slots)));
                self.push(
                    ConstraintFamily::MinWorkingTimePerDay,
                    Constraint::new(ConstraintType::GreaterThanOrEqual, terms, 0.0),
                    &[self.employee_name(m), self.day_name(t)],
                );
            }
        }
    }

    /// Σ_{t,s} x[m][t][s] <= (max_hours_per_week + overtime) · slots_per_hour
    fn add_max_working_time_per_week(&mut self, x: &VarGrid, overtime: f64) {
        let instance = self.instance;
        for (m, employee) in instance.employees().iter().enumerate() {
            let bound = (employee.max_hours_per_week + overtime) * self.slots_per_hour;
            self.push(
                ConstraintFamily::MaxWorkingTimePerWeek,
                Constraint::new(ConstraintType::LessThanOrEqual, unit_terms(x.week(m)), bound),
                &[self.employee_name(m)],
            );
        }
    }

    /// Σ_{t,s} x[m][t][s] >= (min_hours_per_week - shortfall) · slots_per_hour
    fn add_min_working_time_per_week(&mut self, x: &VarGrid, shortfall: f64) {
        let instance = self.instance;
        for (m, employee) in instance.employees().iter().enumerate() {
            let bound = (employee.min_hours_per_week - shortfall) * self.slots_per_hour;
            self.push(
                ConstraintFamily::MinWorkingTimePerWeek,
                Constraint::new(ConstraintType::GreaterThanOrEqual, unit_terms(x.week(m)), bound),
                &[self.employee_name(m)],
            );
        }
    }

    /// Σ_s x[m][t][s] <= max_hours_per_day[m][t] · slots_per_hour
    fn add_employee_daily_caps(&mut self, x: &VarGrid) {
        let instance = self.instance;
        for m in 0..instance.nr_employees() {
            for t in 0..instance.nr_days() {
                let bound = instance.daily_cap(m, t) * self.slots_per_hour;
                self.push(
                    ConstraintFamily::EmployeeDailyCap,
                    Constraint::new(
                        ConstraintType::LessThanOrEqual,
                        unit_terms(x.day(m, t)),
                        bound,
                    ),
                    &[self.employee_name(m), self.day_name(t)],
                );
            }
        }
    }
}

fn unit_terms(ids: &[VarId]) -> Vec<(VarId, f64)> {
    ids.iter().map(|&id| (id, 1.0)).collect()
}
