//! Domain models for jql-to-plan
//!
//! Contains the plan-building logic without any I/O concerns.

mod id;
mod ticket;
mod plan;
mod builder;

pub use id::{IdAllocator, ProcessIds, SequentialIds};
pub use ticket::{effort_secs, Epic, EpicMap, Ticket, WORKING_DAY_SECS};
pub use plan::{Note, Prerequisite, Resource, ResourceKind, Scenario, Task, TaskKind, UserData};
pub use builder::{BuildOptions, Plan, PlanBuilder, UnresolvedDependency};
