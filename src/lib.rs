//! jql-to-plan - Turn Jira tickets into OmniPlan project plans
//!
//! Tickets (with assignee, effort, epic and dependency links) become a tree
//! of tasks with staff resources, optional epic groups and milestones, and
//! resolved prerequisites, written as an OmniPlan v2 XML package.

pub mod domain;
pub mod jira;
pub mod omniplan;
pub mod storage;
pub mod cli;

pub use domain::{BuildOptions, Plan, PlanBuilder, Scenario, Ticket};
