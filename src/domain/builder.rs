//! Plan graph builder
//!
//! Turns a flat list of tickets into a scenario: one project resource with a
//! staff resource per assignee, one leaf task per ticket, optional epic
//! groups with their "Done" milestones, an optional final "Done" milestone,
//! and resolved prerequisite edges.
//!
//! Building happens in two phases. Phase one allocates every identifier and
//! records which task each ticket key maps to. Phase two resolves dependency
//! keys against that lookup; keys outside the ticket set are dropped with a
//! warning rather than failing the build.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::id::IdAllocator;
use super::plan::{Prerequisite, Resource, Scenario, Task, UserData};
use super::ticket::{EpicMap, Ticket};

/// Switches controlling the shape of the plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Nest tickets under one group task per epic
    pub group_by_epic: bool,
    /// Add a final "Done" milestone after all other milestones
    pub milestone_done: bool,
}

/// A dependency key that matched no ticket in the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedDependency {
    pub ticket: String,
    pub dependency: String,
}

impl fmt::Display for UnresolvedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ticket {} depends on {}, but {} was not found in the ticket set",
            self.ticket, self.dependency, self.dependency
        )
    }
}

/// Result of a build
#[derive(Debug, Clone)]
pub struct Plan {
    pub scenario: Scenario,
    pub warnings: Vec<UnresolvedDependency>,
}

/// Builds scenarios from tickets
pub struct PlanBuilder<'a> {
    ids: &'a dyn IdAllocator,
    project_name: String,
    options: BuildOptions,
}

/// Tickets collected under one epic, in first-seen order
struct EpicBucket {
    key: String,
    children: Vec<String>,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(ids: &'a dyn IdAllocator, project_name: impl Into<String>) -> Self {
        Self {
            ids,
            project_name: project_name.into(),
            options: BuildOptions::default(),
        }
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn group_by_epic(mut self, enabled: bool) -> Self {
        self.options.group_by_epic = enabled;
        self
    }

    pub fn milestone_done(mut self, enabled: bool) -> Self {
        self.options.milestone_done = enabled;
        self
    }

    /// Builds the full plan
    pub fn build(&self, tickets: &[Ticket], epics: &EpicMap) -> Plan {
        let scenario_id = self.ids.next();
        let top_resource_id = self.ids.next();
        let top_task_id = self.ids.next();

        let staff = self.derive_resources(tickets);

        // Phase one: allocate every task
        let mut top_refs = Vec::new();
        let mut key_to_task = HashMap::new();
        let mut buckets: Vec<EpicBucket> = Vec::new();
        let mut bucket_index: HashMap<&str, usize> = HashMap::new();

        let mut leaves = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let task = self.leaf_task(ticket, &staff);
            key_to_task.insert(ticket.key.as_str(), task.id.clone());

            if self.options.group_by_epic && ticket.has_epic() {
                let idx = *bucket_index
                    .entry(ticket.epic_key.as_str())
                    .or_insert_with(|| {
                        buckets.push(EpicBucket {
                            key: ticket.epic_key.clone(),
                            children: Vec::new(),
                        });
                        buckets.len() - 1
                    });
                buckets[idx].children.push(task.id.clone());
            } else {
                top_refs.push(task.id.clone());
            }
            leaves.push(task);
        }

        let mut extra = Vec::new();
        let mut epic_milestones = Vec::new();
        if self.options.group_by_epic {
            for bucket in buckets {
                let (group, milestone) = self.epic_tasks(bucket, epics);
                top_refs.push(group.id.clone());
                top_refs.push(milestone.id.clone());
                epic_milestones.push(milestone.id.clone());
                extra.push(group);
                extra.push(milestone);
            }
        }

        if self.options.milestone_done {
            let prerequisites: Vec<Prerequisite> = if self.options.group_by_epic {
                epic_milestones.into_iter().map(Prerequisite::on).collect()
            } else {
                leaves
                    .iter()
                    .chain(extra.iter())
                    .filter(|t| t.is_milestone())
                    .map(|t| Prerequisite::on(t.id.clone()))
                    .collect()
            };

            if !prerequisites.is_empty() {
                let done = Task::milestone(self.ids.next(), "Done", prerequisites);
                top_refs.push(done.id.clone());
                extra.push(done);
            }
        }

        // Phase two: resolve dependency keys
        let mut warnings = Vec::new();
        for (ticket, task) in tickets.iter().zip(leaves.iter_mut()) {
            for dep in &ticket.dependency_keys {
                match key_to_task.get(dep.as_str()) {
                    Some(dep_id) => task.prerequisites.push(Prerequisite::on(dep_id.clone())),
                    None => {
                        tracing::warn!(
                            ticket = %ticket.key,
                            dependency = %dep,
                            "dependency not found in ticket set, skipping"
                        );
                        warnings.push(UnresolvedDependency {
                            ticket: ticket.key.clone(),
                            dependency: dep.clone(),
                        });
                    }
                }
            }
        }

        let root = Task::group(top_task_id.clone(), "", top_refs);
        let mut tasks = Vec::with_capacity(1 + leaves.len() + extra.len());
        tasks.push(root);
        tasks.extend(leaves);
        tasks.extend(extra);

        let mut project = Resource::project(top_resource_id.clone(), self.project_name.clone());
        project.children = staff.resources.iter().map(|r| r.id.clone()).collect();
        let mut resources = Vec::with_capacity(1 + staff.resources.len());
        resources.push(project);
        resources.extend(staff.resources);

        tracing::debug!(
            tasks = tasks.len(),
            resources = resources.len(),
            unresolved = warnings.len(),
            "plan built"
        );

        Plan {
            scenario: Scenario {
                id: scenario_id,
                top_resource: top_resource_id,
                top_task: top_task_id,
                resources,
                tasks,
            },
            warnings,
        }
    }

    /// One staff resource per distinct assignee, in first-appearance order
    fn derive_resources(&self, tickets: &[Ticket]) -> Staff {
        let mut staff = Staff::default();
        for ticket in tickets.iter().filter(|t| t.has_assignee()) {
            if !staff.by_name.contains_key(&ticket.assignee) {
                let resource = Resource::staff(self.ids.next(), ticket.assignee.clone());
                staff.by_name.insert(ticket.assignee.clone(), resource.id.clone());
                staff.resources.push(resource);
            }
        }
        staff
    }

    fn leaf_task(&self, ticket: &Ticket, staff: &Staff) -> Task {
        let mut task = Task::leaf(self.ids.next(), ticket.summary.clone(), ticket.effort_secs());
        task.user_data = UserData::jira(&ticket.key, &ticket.link, &ticket.status);
        if let Some(resource_id) = staff.by_name.get(&ticket.assignee) {
            task.assignments.push(resource_id.clone());
        }
        task
    }

    /// Group task for an epic plus the milestone that follows it
    fn epic_tasks(&self, bucket: EpicBucket, epics: &EpicMap) -> (Task, Task) {
        let (title, link, status) = match epics.get(&bucket.key) {
            Some(epic) => (epic.summary.as_str(), epic.link.as_str(), epic.status.as_str()),
            None => (bucket.key.as_str(), "", ""),
        };

        let mut group = Task::group(self.ids.next(), title, bucket.children);
        group.user_data = UserData::jira(&bucket.key, link, status);

        let milestone = Task::milestone(
            self.ids.next(),
            format!("{} Done", title),
            vec![Prerequisite::on(group.id.clone())],
        );

        (group, milestone)
    }
}

#[derive(Default)]
struct Staff {
    resources: Vec<Resource>,
    by_name: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::SequentialIds;
    use crate::domain::plan::{ResourceKind, TaskKind};
    use proptest::prelude::*;

    fn build(tickets: &[Ticket], epics: &EpicMap, options: BuildOptions) -> Plan {
        let ids = SequentialIds::new();
        PlanBuilder::new(&ids, "Test Project")
            .options(options)
            .build(tickets, epics)
    }

    fn grouped() -> BuildOptions {
        BuildOptions {
            group_by_epic: true,
            milestone_done: false,
        }
    }

    fn titles(scenario: &Scenario) -> Vec<&str> {
        scenario.tasks.iter().map(|t| t.title.as_str()).collect()
    }

    fn sample_tickets() -> Vec<Ticket> {
        vec![
            Ticket::new("TEST-1", "First Task")
                .with_assignee("Alice Smith")
                .with_effort_days(2.0),
            Ticket::new("TEST-2", "Second Task")
                .with_assignee("Bob Jones")
                .with_effort_days(5.0)
                .depends_on("TEST-1"),
            Ticket::new("TEST-3", "Third Task").with_assignee("Alice Smith"),
        ]
    }

    fn epic_map() -> EpicMap {
        let mut epics = EpicMap::new();
        epics.insert(
            "EPIC-1".to_string(),
            Ticket::new("EPIC-1", "Big Project Epic")
                .with_status("In Progress")
                .with_link("http://jira/EPIC-1"),
        );
        epics
    }

    #[test]
    fn one_leaf_per_ticket() {
        let tickets = sample_tickets();
        let plan = build(&tickets, &EpicMap::new(), BuildOptions::default());
        let scenario = &plan.scenario;

        // root + three leaves
        assert_eq!(scenario.tasks.len(), 4);
        for ticket in &tickets {
            let task = scenario.task_for_key(&ticket.key).unwrap();
            assert_eq!(task.kind, TaskKind::Leaf);
            assert_eq!(task.title, ticket.summary);
        }
        assert!(scenario.dangling_references().is_empty());
    }

    #[test]
    fn effort_is_converted_to_seconds() {
        let plan = build(&sample_tickets(), &EpicMap::new(), BuildOptions::default());
        let scenario = &plan.scenario;

        assert_eq!(scenario.task_for_key("TEST-1").unwrap().effort, Some(57_600));
        assert_eq!(scenario.task_for_key("TEST-2").unwrap().effort, Some(144_000));
        assert_eq!(scenario.task_for_key("TEST-3").unwrap().effort, Some(28_800));
    }

    #[test]
    fn assignees_share_one_resource() {
        let plan = build(&sample_tickets(), &EpicMap::new(), BuildOptions::default());
        let scenario = &plan.scenario;

        assert_eq!(scenario.resources.len(), 3);
        let project = scenario.project_resource().unwrap();
        assert_eq!(project.kind, ResourceKind::Project);
        assert_eq!(project.name, "Test Project");
        assert_eq!(project.children.len(), 2);

        let names: Vec<_> = scenario.resources[1..].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice Smith", "Bob Jones"]);
        assert!(scenario.resources[1..]
            .iter()
            .all(|r| r.kind == ResourceKind::Staff && r.children.is_empty()));

        let first = scenario.task_for_key("TEST-1").unwrap();
        let third = scenario.task_for_key("TEST-3").unwrap();
        assert_eq!(first.assignments, third.assignments);
        assert_eq!(first.assignments, vec![scenario.resources[1].id.clone()]);
    }

    #[test]
    fn unassigned_ticket_has_no_assignment() {
        let tickets = vec![Ticket::new("A", "Nobody's")];
        let plan = build(&tickets, &EpicMap::new(), BuildOptions::default());

        assert!(plan.scenario.task_for_key("A").unwrap().assignments.is_empty());
        assert_eq!(plan.scenario.resources.len(), 1);
    }

    #[test]
    fn dependency_resolves_to_task_id() {
        let tickets = vec![Ticket::new("A", "a"), Ticket::new("B", "b").depends_on("A")];
        let plan = build(&tickets, &EpicMap::new(), BuildOptions::default());
        let scenario = &plan.scenario;

        let a = scenario.task_for_key("A").unwrap();
        let b = scenario.task_for_key("B").unwrap();
        assert_eq!(b.prerequisites, vec![Prerequisite::on(a.id.clone())]);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn forward_dependency_resolves() {
        let tickets = vec![Ticket::new("A", "a").depends_on("B"), Ticket::new("B", "b")];
        let plan = build(&tickets, &EpicMap::new(), BuildOptions::default());
        let scenario = &plan.scenario;

        let b = scenario.task_for_key("B").unwrap();
        assert_eq!(
            scenario.task_for_key("A").unwrap().prerequisites,
            vec![Prerequisite::on(b.id.clone())]
        );
    }

    #[test]
    fn missing_dependency_is_dropped_with_warning() {
        let tickets = vec![
            Ticket::new("A", "a"),
            Ticket::new("B", "b").depends_on("Z").depends_on("A"),
        ];
        let plan = build(&tickets, &EpicMap::new(), BuildOptions::default());

        let b = plan.scenario.task_for_key("B").unwrap();
        assert_eq!(b.prerequisites.len(), 1);
        assert_eq!(
            plan.warnings,
            vec![UnresolvedDependency {
                ticket: "B".to_string(),
                dependency: "Z".to_string(),
            }]
        );
        assert!(plan.warnings[0].to_string().contains("depends on Z"));
        assert!(plan.scenario.dangling_references().is_empty());
    }

    #[test]
    fn empty_input_yields_valid_empty_plan() {
        let plan = build(
            &[],
            &EpicMap::new(),
            BuildOptions {
                group_by_epic: true,
                milestone_done: true,
            },
        );
        let scenario = &plan.scenario;

        assert_eq!(scenario.tasks.len(), 1);
        assert_eq!(scenario.resources.len(), 1);
        let root = scenario.root_task().unwrap();
        assert_eq!(root.kind, TaskKind::Group);
        assert!(root.children.is_empty());
        assert!(scenario.project_resource().unwrap().children.is_empty());
    }

    #[test]
    fn root_lists_top_level_tasks_without_grouping() {
        let tickets = vec![
            Ticket::new("A", "a").with_epic("EPIC-1"),
            Ticket::new("B", "b"),
        ];
        let plan = build(&tickets, &epic_map(), BuildOptions::default());
        let scenario = &plan.scenario;

        let root = scenario.root_task().unwrap();
        assert_eq!(scenario.tasks[0].id, root.id);
        let expected: Vec<_> = scenario.tasks[1..].iter().map(|t| t.id.clone()).collect();
        assert_eq!(root.children, expected);
        assert!(scenario.tasks.iter().all(|t| t.kind != TaskKind::Milestone));
    }

    #[test]
    fn epic_grouping_nests_tickets() {
        let tickets = vec![
            Ticket::new("TASK-1", "Task in Epic").with_epic("EPIC-1"),
            Ticket::new("TASK-2", "Task No Epic"),
        ];
        let plan = build(&tickets, &epic_map(), grouped());
        let scenario = &plan.scenario;

        assert_eq!(
            titles(scenario),
            vec!["", "Task in Epic", "Task No Epic", "Big Project Epic", "Big Project Epic Done"]
        );

        let group = scenario.task_for_key("EPIC-1").unwrap();
        let nested = scenario.task_for_key("TASK-1").unwrap();
        let loose = scenario.task_for_key("TASK-2").unwrap();
        assert_eq!(group.kind, TaskKind::Group);
        assert_eq!(group.children, vec![nested.id.clone()]);
        assert_eq!(group.user_data.get(UserData::JIRA_STATUS), Some("In Progress"));
        assert_eq!(group.user_data.get(UserData::JIRA_LINK), Some("http://jira/EPIC-1"));

        let milestone = &scenario.tasks[4];
        assert!(milestone.is_milestone());
        assert_eq!(milestone.prerequisites, vec![Prerequisite::on(group.id.clone())]);

        let root = scenario.root_task().unwrap();
        assert_eq!(
            root.children,
            vec![loose.id.clone(), group.id.clone(), milestone.id.clone()]
        );
        assert!(scenario.dangling_references().is_empty());
    }

    #[test]
    fn epics_follow_first_appearance_order() {
        let tickets = vec![
            Ticket::new("A", "a").with_epic("E-2"),
            Ticket::new("B", "b").with_epic("E-1"),
            Ticket::new("C", "c").with_epic("E-2"),
        ];
        let plan = build(&tickets, &EpicMap::new(), grouped());
        let scenario = &plan.scenario;

        let groups: Vec<_> = scenario
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Group && t.id != scenario.top_task)
            .collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].jira_key(), Some("E-2"));
        assert_eq!(groups[1].jira_key(), Some("E-1"));

        let a = scenario.task_for_key("A").unwrap();
        let c = scenario.task_for_key("C").unwrap();
        assert_eq!(groups[0].children, vec![a.id.clone(), c.id.clone()]);
    }

    #[test]
    fn unknown_epic_falls_back_to_key() {
        let tickets = vec![Ticket::new("A", "a").with_epic("EPIC-404")];
        let plan = build(&tickets, &EpicMap::new(), grouped());
        let scenario = &plan.scenario;

        let group = scenario.task_for_key("EPIC-404").unwrap();
        assert_eq!(group.title, "EPIC-404");
        assert_eq!(group.user_data.get(UserData::JIRA_LINK), Some(""));
        assert!(titles(scenario).contains(&"EPIC-404 Done"));
    }

    #[test]
    fn done_milestone_depends_on_epic_milestones() {
        let tickets = vec![
            Ticket::new("A", "a").with_epic("E-1"),
            Ticket::new("B", "b").with_epic("E-2"),
        ];
        let ids = SequentialIds::new();
        let plan = PlanBuilder::new(&ids, "Switches")
            .group_by_epic(true)
            .milestone_done(true)
            .build(&tickets, &EpicMap::new());
        let scenario = &plan.scenario;

        let epic_done: Vec<_> = scenario
            .tasks
            .iter()
            .filter(|t| t.is_milestone() && t.title.ends_with(" Done"))
            .map(|t| Prerequisite::on(t.id.clone()))
            .collect();
        assert_eq!(epic_done.len(), 2);

        let done: Vec<_> = scenario.tasks.iter().filter(|t| t.title == "Done").collect();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].prerequisites, epic_done);
        assert_eq!(scenario.tasks.last().unwrap().id, done[0].id);
        assert_eq!(scenario.root_task().unwrap().children.last(), Some(&done[0].id));
    }

    #[test]
    fn done_milestone_skipped_without_milestones() {
        let tickets = vec![Ticket::new("A", "a"), Ticket::new("B", "b").with_epic("E-1")];
        let plan = build(
            &tickets,
            &EpicMap::new(),
            BuildOptions {
                group_by_epic: false,
                milestone_done: true,
            },
        );

        assert!(plan.scenario.tasks.iter().all(|t| t.title != "Done"));
        assert_eq!(plan.scenario.tasks.len(), 3);
    }

    #[test]
    fn grouped_done_skipped_without_epics() {
        let tickets = vec![Ticket::new("A", "a")];
        let plan = build(
            &tickets,
            &EpicMap::new(),
            BuildOptions {
                group_by_epic: true,
                milestone_done: true,
            },
        );

        assert!(plan.scenario.tasks.iter().all(|t| !t.is_milestone()));
    }

    #[test]
    fn identifiers_are_unique() {
        let tickets = vec![
            Ticket::new("A", "a").with_assignee("X").with_epic("E"),
            Ticket::new("B", "b").with_assignee("Y"),
        ];
        let plan = build(
            &tickets,
            &EpicMap::new(),
            BuildOptions {
                group_by_epic: true,
                milestone_done: true,
            },
        );
        let scenario = &plan.scenario;

        let mut ids: Vec<&str> = scenario.tasks.iter().map(|t| t.id.as_str()).collect();
        ids.extend(scenario.resources.iter().map(|r| r.id.as_str()));
        ids.push(scenario.id.as_str());
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    proptest! {
        #[test]
        fn resource_count_matches_distinct_assignees(
            assignees in proptest::collection::vec(
                proptest::option::of(prop_oneof![Just("Ann"), Just("Ben"), Just("Cy")]),
                0..20,
            )
        ) {
            let tickets: Vec<Ticket> = assignees
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let ticket = Ticket::new(format!("T-{}", i), "work");
                    match a {
                        Some(name) => ticket.with_assignee(*name),
                        None => ticket,
                    }
                })
                .collect();

            let mut distinct: Vec<&str> = assignees.iter().flatten().copied().collect();
            distinct.sort_unstable();
            distinct.dedup();

            let plan = build(&tickets, &EpicMap::new(), BuildOptions::default());
            prop_assert_eq!(plan.scenario.resources.len(), 1 + distinct.len());
            prop_assert_eq!(plan.scenario.tasks.len(), 1 + tickets.len());
            prop_assert!(plan.scenario.dangling_references().is_empty());
        }
    }
}
