// Domain module: workforce model, LP model and the solver contract

pub mod model_builder;
pub mod models;
pub mod policy;
pub mod schedule_decoder;
pub mod solver_service;
pub mod value_objects;
pub mod workforce;

pub use model_builder::{build, ConstraintFamily, ScheduleModel, VarGrid};
pub use models::*;
pub use policy::*;
pub use schedule_decoder::{
    decode, DecodeError, ScheduleEntry, ShiftInterval, SolvedAssignment,
};
pub use solver_service::*;
pub use value_objects::*;
pub use workforce::*;
