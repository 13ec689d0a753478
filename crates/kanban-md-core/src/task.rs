use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: &[Priority] = &[Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Exact, case-sensitive match against the markdown spelling.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Workload {
    Easy,
    Normal,
    Hard,
    Extreme,
}

impl Workload {
    pub const ALL: &[Workload] = &[
        Workload::Easy,
        Workload::Normal,
        Workload::Hard,
        Workload::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Workload::Easy => "Easy",
            Workload::Normal => "Normal",
            Workload::Hard => "Hard",
            Workload::Extreme => "Extreme",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Easy" => Some(Workload::Easy),
            "Normal" => Some(Workload::Normal),
            "Hard" => Some(Workload::Hard),
            "Extreme" => Some(Workload::Extreme),
            _ => None,
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One checkbox entry of a task's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub text: String,
    pub completed: bool,
}

impl Step {
    pub fn new(text: impl Into<String>, completed: bool) -> Self {
        Self {
            text: text.into(),
            completed,
        }
    }

    pub fn checkbox(&self) -> &'static str {
        if self.completed {
            "[x]"
        } else {
            "[ ]"
        }
    }
}

/// A card on the board.
///
/// Every optional field maps to one property line in the markdown. `None`
/// means the line is absent; the generator also treats an empty string or an
/// empty list as absent, so removing a field means setting it to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload: Option<Workload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_expanded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
}

impl Task {
    /// A task with a fresh id and nothing else set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn has_detail_file(&self) -> bool {
        self.detail_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Steps that would be written, or an empty slice.
    pub fn step_list(&self) -> &[Step] {
        self.steps.as_deref().unwrap_or(&[])
    }
}

/// Caller-supplied task fields for add/edit operations.
///
/// Mirrors what an editing form submits: blank strings and empty lists are
/// normalized to absent when the draft is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub workload: Option<Workload>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub default_expanded: Option<bool>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Overwrite the draft-controlled fields of `task`, leaving id, updated,
    /// completed, milestone and detail path untouched.
    pub fn apply_to(self, task: &mut Task) {
        task.title = self.title;
        task.description = self.description.filter(|d| !d.trim().is_empty());
        task.tags = non_empty(
            self.tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        );
        task.priority = self.priority;
        task.workload = self.workload;
        task.default_expanded = self.default_expanded;
        task.steps = non_empty(self.steps);
        task.start_date = trimmed(self.start_date);
        task.due_date = trimmed(self.due_date);
    }

    pub fn into_task(self) -> Task {
        let mut task = Task::new(String::new());
        self.apply_to(&mut task);
        task
    }
}

/// Opaque short identifier for columns and tasks.
pub fn generate_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(9);
    id
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
