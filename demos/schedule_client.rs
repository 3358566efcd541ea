// Example: one day at a small front desk
//
// Three employees, eight 1-hour slots from 08:00, and a lunchtime peak:
//
// Slot     | 08 | 09 | 10 | 11 | 12 | 13 | 14 | 15
// ---------|----|----|----|----|----|----|----|----
// Required |  1 |  1 |  2 |  2 |  2 |  1 |  1 |  0
//
// Every staffed slot needs one qualified employee, and nobody works
// less than 2 or more than 8 hours.
//
// Start the server first: cargo run --features server --bin shiftopt-server

use std::collections::HashMap;
use tonic::Request;

pub mod workforce_scheduler {
    tonic::include_proto!("workforce_scheduler");
}

use workforce_scheduler::{
    workforce_scheduler_client::WorkforceSchedulerClient, Day, DemandRow, Empty, Employee,
    PolicyRule, ScheduleRequest, SolutionStatus, SolverBackend, SolverConfig,
};

fn employee(name: &str, qualified: bool, daily_cap: f64) -> Employee {
    Employee {
        name: name.to_string(),
        has_special_qualification: qualified,
        min_hours_per_week: 0.0,
        max_hours_per_week: 40.0,
        max_hours_per_day: HashMap::from([("Mon".to_string(), daily_cap)]),
    }
}

fn rule(name: &str, enabled: bool, value: Option<f64>) -> PolicyRule {
    PolicyRule {
        name: name.to_string(),
        enabled,
        value,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = WorkforceSchedulerClient::connect("http://127.0.0.1:50051").await?;

    println!("=== Front Desk Shift Plan ===\n");

    let solvers = client
        .get_available_solvers(Request::new(Empty {}))
        .await?
        .into_inner()
        .solvers;
    println!("Solvers on the server:");
    for solver in &solvers {
        println!(
            "  - {} (time limit: {}, MIP gap: {})",
            solver.name, solver.supports_time_limit, solver.supports_mip_gap
        );
    }

    let request = ScheduleRequest {
        employees: vec![
            employee("Anna", true, 8.0),
            employee("Ben", false, 8.0),
            employee("Carla", true, 6.0),
        ],
        days: vec![Day {
            name: "Mon".to_string(),
            date: "2020-03-23".to_string(),
        }],
        slot_starts: (8..16).map(|h| format!("{:02}:00", h)).collect(),
        slot_minutes: 60,
        demand: vec![DemandRow {
            day: "Mon".to_string(),
            headcount: vec![1, 1, 2, 2, 2, 1, 1, 0],
        }],
        policy: vec![
            rule("demand_specialQualification_per_Slot", true, Some(1.0)),
            rule("max_workingTime_per_Day", true, Some(8.0)),
            rule("min_workingTime_per_Day", true, Some(2.0)),
            rule("max_employee_WorkingTime_per_Week", false, None),
            rule("overtime_per_Week", false, None),
            rule("min_employee_WorkingTime_per_Week", false, None),
            rule("minusHours_per_Week", false, None),
        ],
        solver_config: Some(SolverConfig {
            backend: SolverBackend::Auto as i32,
            time_limit_seconds: Some(30.0),
            mip_gap: Some(0.01),
            verbose: false,
        }),
    };

    println!("\nSolving...\n");
    let result = client.schedule(Request::new(request)).await?.into_inner();

    match SolutionStatus::try_from(result.status) {
        Ok(SolutionStatus::Optimal) | Ok(SolutionStatus::Feasible) => {
            println!("Shifts:");
            for entry in &result.entries {
                match (&entry.start, &entry.end) {
                    (Some(start), Some(end)) => {
                        println!("  {:6} {} {} -> {}", entry.employee, entry.day, start, end)
                    }
                    _ => println!("  {:6} {} off", entry.employee, entry.day),
                }
            }
            if let Some(objective) = result.objective_value {
                println!("\nStaffed slots: {:.0}", objective);
            }
        }
        Ok(SolutionStatus::Infeasible) => {
            println!("No schedule satisfies all rules: {}", result.message);
        }
        _ => {
            println!("Solver error: {}", result.message);
        }
    }

    if let Some(stats) = result.statistics {
        println!("\nSolver Statistics:");
        println!("  Solver:      {}", stats.solver_backend);
        println!("  Variables:   {}", stats.num_variables);
        println!("  Constraints: {}", stats.num_constraints);
        println!("  Solve Time:  {:.2} ms", stats.solve_time_ms);
    }

    Ok(())
}
