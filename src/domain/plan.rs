//! Plan document model
//!
//! These types mirror the elements of an OmniPlan scenario: resources,
//! tasks and the references between them. They are plain data; the
//! builder fills them in and the serializer writes them out.

use serde::Serialize;

/// Kind of resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    /// The single root resource owning all staff
    Project,
    /// A person derived from a ticket assignee
    Staff,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "Project",
            ResourceKind::Staff => "Staff",
        }
    }
}

/// A project resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
    pub children: Vec<String>,
}

impl Resource {
    pub fn project(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ResourceKind::Project,
            children: Vec::new(),
        }
    }

    pub fn staff(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ResourceKind::Staff,
            children: Vec::new(),
        }
    }
}

/// Kind of task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TaskKind {
    /// A plain unit of work
    #[default]
    Leaf,
    /// A container whose duration comes from its children
    Group,
    /// A zero-duration sequencing marker
    Milestone,
}

impl TaskKind {
    /// Value written to the `type` element; empty for leaf tasks
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Leaf => "",
            TaskKind::Group => "group",
            TaskKind::Milestone => "milestone",
        }
    }
}

/// A "must finish before" edge pointing at another task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prerequisite {
    pub task: String,
    pub kind: Option<String>,
}

impl Prerequisite {
    pub fn on(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            kind: None,
        }
    }
}

/// Ordered key/value annotations attached to a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserData(Vec<(String, String)>);

impl UserData {
    pub const JIRA_KEY: &'static str = "Jira Key";
    pub const JIRA_LINK: &'static str = "Jira Link";
    pub const JIRA_STATUS: &'static str = "Jira Status";

    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Annotations tracing a task back to its ticket
    pub fn jira(key: &str, link: &str, status: &str) -> Self {
        let mut data = Self::new();
        data.insert(Self::JIRA_KEY, key);
        data.insert(Self::JIRA_LINK, link);
        data.insert(Self::JIRA_STATUS, status);
        data
    }

    /// Appends an entry, keeping insertion order
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value recorded for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Rich-text note, one literal run per paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Note {
    pub paragraphs: Vec<String>,
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            paragraphs: vec![text.into()],
        }
    }
}

/// A plan task
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub kind: TaskKind,
    pub leveled_start: Option<String>,

    /// Effort in seconds; only set on leaf tasks
    pub effort: Option<u64>,

    pub recalculate: Option<String>,
    pub children: Vec<String>,
    pub user_data: UserData,
    pub prerequisites: Vec<Prerequisite>,
    pub assignments: Vec<String>,
    pub note: Option<Note>,
}

impl Task {
    pub const RECALCULATE_DURATION: &'static str = "duration";

    fn with_kind(id: String, title: String, kind: TaskKind) -> Self {
        Self {
            id,
            title,
            kind,
            recalculate: Some(Self::RECALCULATE_DURATION.to_string()),
            ..Default::default()
        }
    }

    pub fn leaf(id: impl Into<String>, title: impl Into<String>, effort: u64) -> Self {
        Self {
            effort: Some(effort),
            ..Self::with_kind(id.into(), title.into(), TaskKind::Leaf)
        }
    }

    pub fn group(id: impl Into<String>, title: impl Into<String>, children: Vec<String>) -> Self {
        Self {
            children,
            ..Self::with_kind(id.into(), title.into(), TaskKind::Group)
        }
    }

    pub fn milestone(
        id: impl Into<String>,
        title: impl Into<String>,
        prerequisites: Vec<Prerequisite>,
    ) -> Self {
        Self {
            prerequisites,
            ..Self::with_kind(id.into(), title.into(), TaskKind::Milestone)
        }
    }

    pub fn is_milestone(&self) -> bool {
        self.kind == TaskKind::Milestone
    }

    /// Ticket key recorded in the annotation block, if any
    pub fn jira_key(&self) -> Option<&str> {
        self.user_data.get(UserData::JIRA_KEY)
    }
}

/// A complete scenario ready for serialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub id: String,
    pub top_resource: String,
    pub top_task: String,

    /// Project resource first, then staff in creation order
    pub resources: Vec<Resource>,

    /// Root group first, then every other task
    pub tasks: Vec<Task>,
}

impl Scenario {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Finds the task annotated with the given ticket key
    pub fn task_for_key(&self, key: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.jira_key() == Some(key))
    }

    pub fn root_task(&self) -> Option<&Task> {
        self.task(&self.top_task)
    }

    pub fn project_resource(&self) -> Option<&Resource> {
        self.resource(&self.top_resource)
    }

    /// References that point at nothing in this scenario
    ///
    /// Checks child tasks, prerequisites, assignments and child resources.
    pub fn dangling_references(&self) -> Vec<String> {
        use std::collections::HashSet;

        let task_ids: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let resource_ids: HashSet<&str> = self.resources.iter().map(|r| r.id.as_str()).collect();

        let mut dangling = Vec::new();
        for task in &self.tasks {
            let task_refs = task
                .children
                .iter()
                .chain(task.prerequisites.iter().map(|p| &p.task));
            for r in task_refs {
                if !task_ids.contains(r.as_str()) {
                    dangling.push(r.clone());
                }
            }
            for r in &task.assignments {
                if !resource_ids.contains(r.as_str()) {
                    dangling.push(r.clone());
                }
            }
        }
        for resource in &self.resources {
            for r in &resource.children {
                if !resource_ids.contains(r.as_str()) {
                    dangling.push(r.clone());
                }
            }
        }
        dangling
    }
}
