// Mappers: Convert between gRPC protobuf types and domain models
// This keeps protobuf dependencies isolated from business logic (Dependency Inversion)

use crate::application::scheduling_service::{ScheduleOutcome, SchedulingError};
use crate::domain::{
    models::SolverConfig,
    policy::PolicyParameters,
    schedule_decoder::ScheduleEntry,
    solver_service::SolverError,
    value_objects::{SolutionStatus, SolverBackend},
    workforce::{Day, Demand, Employee, Horizon, WorkforceInstance},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tonic::Status;

pub mod workforce_scheduler {
    tonic::include_proto!("workforce_scheduler");
}

use workforce_scheduler as proto;

const DATE_FORMAT: &str = "%Y-%m-%d";
const SLOT_FORMAT: &str = "%H:%M";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Convert protobuf Employee to domain Employee
pub fn proto_to_domain_employee(proto_employee: &proto::Employee) -> Employee {
    Employee {
        name: proto_employee.name.clone(),
        has_special_qualification: proto_employee.has_special_qualification,
        min_hours_per_week: proto_employee.min_hours_per_week,
        max_hours_per_week: proto_employee.max_hours_per_week,
        max_hours_per_day: proto_employee
            .max_hours_per_day
            .iter()
            .map(|(day, hours)| (day.clone(), *hours))
            .collect(),
    }
}

/// Convert protobuf Day to domain Day
pub fn proto_to_domain_day(proto_day: &proto::Day) -> std::result::Result<Day, Box<Status>> {
    let date = NaiveDate::parse_from_str(&proto_day.date, DATE_FORMAT).map_err(|e| {
        Box::new(Status::invalid_argument(format!(
            "Day '{}' has invalid date '{}': {}",
            proto_day.name, proto_day.date, e
        )))
    })?;
    Ok(Day::new(proto_day.name.clone(), date))
}

fn parse_slot(slot: &str) -> std::result::Result<NaiveTime, Box<Status>> {
    NaiveTime::parse_from_str(slot, SLOT_FORMAT).map_err(|e| {
        Box::new(Status::invalid_argument(format!(
            "Invalid slot start '{}': {}",
            slot, e
        )))
    })
}

/// Convert protobuf Demand rows to domain Demand
pub fn proto_to_domain_demand(
    rows: &[proto::DemandRow],
) -> std::result::Result<Demand, Box<Status>> {
    let mut demand = Demand::new();
    for row in rows {
        if demand.rows.contains_key(&row.day) {
            return Err(Box::new(Status::invalid_argument(format!(
                "Demand for day '{}' is listed more than once",
                row.day
            ))));
        }
        demand = demand.with_day(row.day.clone(), row.headcount.clone());
    }
    Ok(demand)
}

/// Convert protobuf SolverConfig to domain SolverConfig
pub fn proto_to_domain_config(proto_config: Option<&proto::SolverConfig>) -> SolverConfig {
    let Some(cfg) = proto_config else {
        return SolverConfig::default();
    };

    let backend = match proto::SolverBackend::try_from(cfg.backend) {
        Ok(proto::SolverBackend::Auto) => SolverBackend::Auto,
        Ok(proto::SolverBackend::Microlp) => SolverBackend::MicroLp,
        Ok(proto::SolverBackend::CoinCbc) => SolverBackend::CoinCbc,
        Ok(proto::SolverBackend::Highs) => SolverBackend::Highs,
        Err(_) => SolverBackend::Auto,
    };

    SolverConfig {
        backend,
        time_limit: cfg.time_limit_seconds,
        gap_tolerance: cfg.mip_gap,
        verbose: cfg.verbose,
    }
}

/// Convert a protobuf ScheduleRequest into a validated instance and solver configuration
pub fn proto_to_domain_request(
    request: proto::ScheduleRequest,
) -> std::result::Result<(WorkforceInstance, SolverConfig), Box<Status>> {
    let employees = request
        .employees
        .iter()
        .map(proto_to_domain_employee)
        .collect();

    let days = request
        .days
        .iter()
        .map(proto_to_domain_day)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let slot_starts = request
        .slot_starts
        .iter()
        .map(|s| parse_slot(s))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let demand = proto_to_domain_demand(&request.demand)?;

    let policy = PolicyParameters::from_rows(
        request
            .policy
            .iter()
            .map(|rule| (rule.name.as_str(), rule.enabled, rule.value)),
    )
    .map_err(|e| Box::new(Status::invalid_argument(e.to_string())))?;

    let horizon = Horizon::new(days, slot_starts, request.slot_minutes);
    let instance = WorkforceInstance::new(employees, horizon, demand, policy)
        .map_err(|e| Box::new(Status::invalid_argument(e.to_string())))?;

    let config = proto_to_domain_config(request.solver_config.as_ref());

    Ok((instance, config))
}

pub fn domain_to_proto_backend(backend: SolverBackend) -> proto::SolverBackend {
    match backend {
        SolverBackend::Auto => proto::SolverBackend::Auto,
        SolverBackend::MicroLp => proto::SolverBackend::Microlp,
        SolverBackend::CoinCbc => proto::SolverBackend::CoinCbc,
        SolverBackend::Highs => proto::SolverBackend::Highs,
    }
}

fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Convert domain ScheduleEntry to protobuf ScheduleEntry
pub fn domain_to_proto_entry(entry: &ScheduleEntry) -> proto::ScheduleEntry {
    proto::ScheduleEntry {
        employee: entry.employee.clone(),
        day: entry.day.clone(),
        date: entry.date.format(DATE_FORMAT).to_string(),
        start: entry.start().map(format_timestamp),
        end: entry.end().map(format_timestamp),
    }
}

/// Convert a domain ScheduleOutcome to protobuf ScheduleResponse
pub fn domain_to_proto_response(outcome: &ScheduleOutcome) -> proto::ScheduleResponse {
    let result = outcome.result();
    let status = match result.status {
        SolutionStatus::Optimal => proto::SolutionStatus::Optimal as i32,
        SolutionStatus::Feasible => proto::SolutionStatus::Feasible as i32,
        SolutionStatus::Infeasible => proto::SolutionStatus::Infeasible as i32,
        SolutionStatus::Error => proto::SolutionStatus::Error as i32,
    };

    proto::ScheduleResponse {
        status,
        objective_value: result.objective_value,
        gap: result.gap,
        message: result.message.clone(),
        entries: outcome.entries().iter().map(domain_to_proto_entry).collect(),
        statistics: Some(proto::SolverStatistics {
            solve_time_ms: result.statistics.solve_time_ms,
            num_variables: result.statistics.num_variables,
            num_constraints: result.statistics.num_constraints,
            solver_backend: result.solver.clone(),
        }),
    }
}

/// Map a pipeline failure onto a gRPC status
pub fn scheduling_error_to_status(error: SchedulingError) -> Status {
    let message = error.to_string();
    match error {
        SchedulingError::Input(_)
        | SchedulingError::Configuration(_)
        | SchedulingError::Solver(SolverError::InvalidProblem(_)) => {
            Status::invalid_argument(message)
        }
        SchedulingError::Solver(SolverError::SolverNotAvailable(_)) => {
            Status::unavailable(message)
        }
        _ => Status::internal(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::{ConfigurationError, PolicyParameters};

    fn rule(name: &str, enabled: bool, value: Option<f64>) -> proto::PolicyRule {
        proto::PolicyRule {
            name: name.to_string(),
            enabled,
            value,
        }
    }

    fn policy_table() -> Vec<proto::PolicyRule> {
        vec![
            rule(PolicyParameters::SPECIAL_QUALIFICATION, false, None),
            rule(PolicyParameters::MAX_PER_DAY, true, Some(8.0)),
            rule(PolicyParameters::MIN_PER_DAY, false, None),
            rule(PolicyParameters::MAX_PER_WEEK, false, None),
            rule(PolicyParameters::OVERTIME, false, None),
            rule(PolicyParameters::MIN_PER_WEEK, false, None),
            rule(PolicyParameters::SHORTFALL, false, None),
        ]
    }

    fn request() -> proto::ScheduleRequest {
        proto::ScheduleRequest {
            employees: vec![proto::Employee {
                name: "Alice".to_string(),
                has_special_qualification: true,
                min_hours_per_week: 0.0,
                max_hours_per_week: 40.0,
                max_hours_per_day: [("Mon".to_string(), 8.0)].into_iter().collect(),
            }],
            days: vec![proto::Day {
                name: "Mon".to_string(),
                date: "2020-03-23".to_string(),
            }],
            slot_starts: vec!["08:00".to_string(), "08:30".to_string()],
            slot_minutes: 30,
            demand: vec![proto::DemandRow {
                day: "Mon".to_string(),
                headcount: vec![1, 1],
            }],
            policy: policy_table(),
            solver_config: Some(proto::SolverConfig {
                backend: proto::SolverBackend::Microlp as i32,
                time_limit_seconds: Some(10.0),
                mip_gap: None,
                verbose: false,
            }),
        }
    }

    #[test]
    fn test_request_conversion() {
        let (instance, config) = proto_to_domain_request(request()).unwrap();

        assert_eq!(instance.nr_employees(), 1);
        assert_eq!(instance.nr_slots(), 2);
        assert_eq!(instance.demand(0, 1), 1);
        assert_eq!(instance.daily_cap(0, 0), 8.0);
        assert_eq!(config.backend, SolverBackend::MicroLp);
        assert_eq!(config.time_limit, Some(10.0));
    }

    #[test]
    fn test_bad_slot_time_is_invalid_argument() {
        let mut req = request();
        req.slot_starts[1] = "8.30".to_string();
        let status = proto_to_domain_request(req).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn test_duplicate_demand_row_is_rejected() {
        let mut req = request();
        req.demand.push(req.demand[0].clone());
        let status = proto_to_domain_request(req).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn test_missing_policy_row_is_rejected() {
        let mut req = request();
        req.policy.pop();
        let status = proto_to_domain_request(req).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        assert_eq!(proto_to_domain_config(None), SolverConfig::default());
    }

    #[test]
    fn test_error_codes() {
        let config = SchedulingError::Configuration(ConfigurationError::MissingRuleValue {
            rule: "max_workingTime_per_Day",
        });
        assert_eq!(
            scheduling_error_to_status(config).code(),
            tonic::Code::InvalidArgument
        );

        let unavailable =
            SchedulingError::Solver(SolverError::SolverNotAvailable("HiGHS".to_string()));
        assert_eq!(
            scheduling_error_to_status(unavailable).code(),
            tonic::Code::Unavailable
        );

        let failed = SchedulingError::Solver(SolverError::ExecutionFailed("crash".to_string()));
        assert_eq!(scheduling_error_to_status(failed).code(), tonic::Code::Internal);
    }
}
