use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use shiftopt::{
    decode, Day, Demand, Employee, Horizon, MicroLpSolver, PolicyParameters, PolicyRule,
    ScheduleOutcome, SchedulingService, SolutionStatus, SolverConfig, WorkforceInstance,
};

fn service() -> SchedulingService {
    SchedulingService::new(Arc::new(MicroLpSolver::new()))
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn monday() -> Day {
    Day::new("Mon", date(23))
}

fn tuesday() -> Day {
    Day::new("Tue", date(24))
}

fn employee(name: &str, days: &[&Day]) -> Employee {
    days.iter()
        .fold(Employee::new(name).with_weekly_hours(0.0, 40.0), |e, day| {
            e.with_daily_cap(day.name.clone(), 8.0)
        })
}

fn schedule(instance: &WorkforceInstance) -> ScheduleOutcome {
    service()
        .schedule(instance, &SolverConfig::default())
        .unwrap()
}

fn assert_objective(outcome: &ScheduleOutcome, expected: f64) {
    let objective = outcome.result().objective_value.unwrap();
    assert!(
        (objective - expected).abs() < 1e-6,
        "objective {objective}, expected {expected}"
    );
}

/// `x[employee][day][slot]` of a solved outcome
fn worked(
    outcome: &ScheduleOutcome,
    instance: &WorkforceInstance,
    m: usize,
    t: usize,
    s: usize,
) -> bool {
    let assignment = outcome.result().assignment.as_ref().unwrap();
    assignment.x()[(m * instance.nr_days() + t) * instance.nr_slots() + s]
}

fn assert_demand_covered(outcome: &ScheduleOutcome, instance: &WorkforceInstance) {
    for t in 0..instance.nr_days() {
        for s in 0..instance.nr_slots() {
            let staffed = (0..instance.nr_employees())
                .filter(|&m| worked(outcome, instance, m, t, s))
                .count() as u32;
            assert!(
                staffed >= instance.demand(t, s),
                "day {t} slot {s}: {staffed} < {}",
                instance.demand(t, s)
            );
        }
    }
}

fn assert_contiguous(outcome: &ScheduleOutcome, instance: &WorkforceInstance) {
    for m in 0..instance.nr_employees() {
        for t in 0..instance.nr_days() {
            let slots: Vec<usize> = (0..instance.nr_slots())
                .filter(|&s| worked(outcome, instance, m, t, s))
                .collect();
            if let (Some(first), Some(last)) = (slots.first(), slots.last()) {
                assert_eq!(last - first + 1, slots.len(), "employee {m} day {t}: {slots:?}");
            }
        }
    }
}

#[test]
fn test_single_employee_covers_demand_block() {
    let day = monday();
    let instance = WorkforceInstance::new(
        vec![employee("Alice", &[&day])],
        Horizon::contiguous(vec![day], time(8, 0), 3, 30).unwrap(),
        Demand::new().with_day("Mon", vec![1, 1, 0]),
        PolicyParameters::default(),
    )
    .unwrap();

    let outcome = schedule(&instance);

    assert_eq!(outcome.result().status, SolutionStatus::Optimal);
    assert_objective(&outcome, 2.0);
    let entries = outcome.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].start(), Some(date(23).and_time(time(8, 0))));
    assert_eq!(entries[0].end(), Some(date(23).and_time(time(9, 0))));
}

#[test]
fn test_generous_limits_keep_proven_optimum() {
    let day = monday();
    let instance = WorkforceInstance::new(
        vec![employee("Alice", &[&day])],
        Horizon::contiguous(vec![day], time(8, 0), 3, 30).unwrap(),
        Demand::new().with_day("Mon", vec![1, 1, 0]),
        PolicyParameters::default(),
    )
    .unwrap();
    let config = SolverConfig::default()
        .with_time_limit(60.0)
        .with_gap_tolerance(0.0);

    let outcome = service().schedule(&instance, &config).unwrap();

    assert_eq!(outcome.result().status, SolutionStatus::Optimal);
    assert_eq!(outcome.result().gap, Some(0.0));
    assert_objective(&outcome, 2.0);
}

#[test]
fn test_reported_gap_stays_within_tolerance() {
    let instance = staffed_week(PolicyParameters::default());
    let config = SolverConfig::default().with_gap_tolerance(0.05);

    let outcome = service().schedule(&instance, &config).unwrap();

    assert_eq!(outcome.result().status, SolutionStatus::Optimal);
    let gap = outcome.result().gap.unwrap();
    assert!((0.0..=0.05).contains(&gap), "gap {gap}");
    assert_demand_covered(&outcome, &instance);
}

#[test]
fn test_weekly_maximum_below_demand_is_infeasible() {
    let day = monday();
    let employees = ["Alice", "Bob"]
        .iter()
        .map(|name| employee(name, &[&day]).with_weekly_hours(0.0, 1.0))
        .collect();
    let policy = PolicyParameters {
        max_working_time_per_week: PolicyRule::switch_on(),
        ..Default::default()
    };
    let instance = WorkforceInstance::new(
        employees,
        Horizon::contiguous(vec![day], time(8, 0), 6, 30).unwrap(),
        Demand::new().with_day("Mon", vec![1; 6]),
        policy,
    )
    .unwrap();

    let outcome = schedule(&instance);

    assert!(outcome.is_infeasible());
    assert_eq!(outcome.result().status, SolutionStatus::Infeasible);
    assert!(outcome.entries().is_empty());
}

#[test]
fn test_zero_demand_leaves_everyone_off() {
    let (mon, tue) = (monday(), tuesday());
    let instance = WorkforceInstance::new(
        vec![employee("Alice", &[&mon, &tue]), employee("Bob", &[&mon, &tue])],
        Horizon::contiguous(vec![mon, tue], time(8, 0), 4, 30).unwrap(),
        Demand::new()
            .with_day("Mon", vec![0; 4])
            .with_day("Tue", vec![0; 4]),
        PolicyParameters::default(),
    )
    .unwrap();

    let outcome = schedule(&instance);

    assert_objective(&outcome, 0.0);
    assert_eq!(outcome.entries().len(), 4);
    assert!(outcome.entries().iter().all(|entry| entry.is_off()));
}

#[test]
fn test_daily_minimum_longer_than_day_is_infeasible() {
    let day = monday();
    let policy = PolicyParameters {
        min_working_time_per_day: PolicyRule::enabled(3.0),
        ..Default::default()
    };
    let instance = WorkforceInstance::new(
        vec![employee("Alice", &[&day])],
        Horizon::contiguous(vec![day], time(8, 0), 3, 30).unwrap(),
        Demand::new().with_day("Mon", vec![1, 0, 0]),
        policy,
    )
    .unwrap();

    assert!(schedule(&instance).is_infeasible());
}

#[test]
fn test_daily_minimum_does_not_bind_on_days_off() {
    let (mon, tue) = (monday(), tuesday());
    let policy = PolicyParameters {
        min_working_time_per_day: PolicyRule::enabled(1.5),
        ..Default::default()
    };
    let instance = WorkforceInstance::new(
        vec![employee("Alice", &[&mon, &tue])],
        Horizon::contiguous(vec![mon, tue], time(8, 0), 3, 30).unwrap(),
        Demand::new()
            .with_day("Mon", vec![1, 1, 1])
            .with_day("Tue", vec![0, 0, 0]),
        policy,
    )
    .unwrap();

    let outcome = schedule(&instance);

    assert_objective(&outcome, 3.0);
    let entries = outcome.entries();
    assert!(!entries[0].is_off());
    assert!(entries[1].is_off());
}

#[test]
fn test_daily_minimum_extends_short_shift() {
    let day = monday();
    let policy = PolicyParameters {
        min_working_time_per_day: PolicyRule::enabled(1.5),
        ..Default::default()
    };
    let instance = WorkforceInstance::new(
        vec![employee("Alice", &[&day])],
        Horizon::contiguous(vec![day], time(8, 0), 4, 30).unwrap(),
        Demand::new().with_day("Mon", vec![0, 1, 0, 0]),
        policy,
    )
    .unwrap();

    let outcome = schedule(&instance);

    assert_objective(&outcome, 3.0);
    let shift = outcome.entries()[0].shift.unwrap();
    assert_eq!(shift.duration(), chrono::Duration::minutes(90));
    assert_contiguous(&outcome, &instance);
}

fn staffed_week(policy: PolicyParameters) -> WorkforceInstance {
    let (mon, tue) = (monday(), tuesday());
    let employees = vec![
        employee("Alice", &[&mon, &tue]).with_special_qualification(true),
        employee("Bob", &[&mon, &tue]),
        employee("Carla", &[&mon]).with_daily_cap("Tue", 0.0),
    ];
    WorkforceInstance::new(
        employees,
        Horizon::contiguous(vec![mon, tue], time(8, 0), 6, 60).unwrap(),
        Demand::new()
            .with_day("Mon", vec![1, 2, 2, 1, 0, 1])
            .with_day("Tue", vec![0, 1, 1, 2, 1, 0]),
        policy,
    )
    .unwrap()
}

#[test]
fn test_solved_schedule_covers_demand_in_single_blocks() {
    let policy = PolicyParameters {
        max_working_time_per_day: PolicyRule::enabled(5.0),
        ..Default::default()
    };
    let instance = staffed_week(policy);
    let outcome = schedule(&instance);

    assert!(!outcome.is_infeasible());
    assert_demand_covered(&outcome, &instance);
    assert_contiguous(&outcome, &instance);
    // Carla cannot work Tuesday
    assert!(outcome.entries()[5].is_off());
    for entry in outcome.entries() {
        if let Some(shift) = entry.shift {
            assert!(shift.duration() <= chrono::Duration::hours(5));
        }
    }
}

#[test]
fn test_special_qualification_is_staffed() {
    let policy = PolicyParameters {
        special_qualification_per_slot: PolicyRule::enabled(1.0),
        ..Default::default()
    };
    let instance = staffed_week(policy);
    let outcome = schedule(&instance);

    assert!(!outcome.is_infeasible());
    for t in 0..instance.nr_days() {
        for s in 0..instance.nr_slots() {
            if instance.demand(t, s) > 0 {
                assert!(worked(&outcome, &instance, 0, t, s), "Alice off in day {t} slot {s}");
            }
        }
    }
}

#[test]
fn test_dropping_daily_maximum_keeps_instance_feasible() {
    let capped = staffed_week(PolicyParameters {
        max_working_time_per_day: PolicyRule::enabled(3.0),
        ..Default::default()
    });
    let relaxed = capped.with_policy(PolicyParameters::default());

    let capped_outcome = schedule(&capped);
    let relaxed_outcome = schedule(&relaxed);

    assert!(!capped_outcome.is_infeasible());
    assert!(!relaxed_outcome.is_infeasible());
    let capped_objective = capped_outcome.result().objective_value.unwrap();
    let relaxed_objective = relaxed_outcome.result().objective_value.unwrap();
    assert!(relaxed_objective <= capped_objective + 1e-6);
}

#[test]
fn test_decoding_is_repeatable() {
    let instance = staffed_week(PolicyParameters::default());
    let outcome = schedule(&instance);
    let assignment = outcome.result().assignment.as_ref().unwrap();

    let first = decode(assignment, &instance).unwrap();
    let second = decode(assignment, &instance).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, outcome.entries());
}

#[derive(Deserialize)]
struct ReferenceWeek {
    employees: Vec<Employee>,
    horizon: Horizon,
    demand: Demand,
    policy: PolicyParameters,
}

fn reference_week() -> WorkforceInstance {
    let raw = include_str!("fixtures/reference_week.json");
    let week: ReferenceWeek = serde_json::from_str(raw).unwrap();
    WorkforceInstance::new(week.employees, week.horizon, week.demand, week.policy).unwrap()
}

#[test]
fn test_reference_week() {
    let instance = reference_week();
    let outcome = schedule(&instance);

    assert!(!outcome.is_infeasible());
    assert_demand_covered(&outcome, &instance);
    assert_contiguous(&outcome, &instance);

    let total_demand: u32 = (0..instance.nr_days())
        .flat_map(|t| (0..instance.nr_slots()).map(move |s| (t, s)))
        .map(|(t, s)| instance.demand(t, s))
        .sum();
    let objective = outcome.result().objective_value.unwrap();
    assert!(objective >= f64::from(total_demand) - 1e-6);

    // Ben has no hours on Wednesday
    let ben_wednesday = outcome
        .entries()
        .iter()
        .find(|e| e.employee == "Ben" && e.day == "Wed")
        .unwrap();
    assert!(ben_wednesday.is_off());

    // every shift that happens lasts at least the daily minimum
    for entry in outcome.entries() {
        if let Some(shift) = entry.shift {
            assert!(shift.duration() >= chrono::Duration::hours(2));
        }
    }
}

#[test]
fn test_schedule_serializes_to_json() {
    let day = monday();
    let instance = WorkforceInstance::new(
        vec![employee("Alice", &[&day])],
        Horizon::contiguous(vec![day], time(8, 0), 2, 30).unwrap(),
        Demand::new().with_day("Mon", vec![1, 0]),
        PolicyParameters::default(),
    )
    .unwrap();
    let outcome = schedule(&instance);

    let json = serde_json::to_value(outcome.entries()).unwrap();
    assert_eq!(json[0]["employee"], "Alice");
    assert_eq!(json[0]["shift"]["start"], "2020-03-23T08:00:00");
    assert_eq!(json[0]["shift"]["end"], "2020-03-23T08:30:00");
}
