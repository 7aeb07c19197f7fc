use crate::state::Record;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TaskId = String;
pub type TagId = String;

/// Typed at the end of a task name to open the tag picker.
pub const TAG_TRIGGER: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

pub const STATUSES: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::Doing => "Doing",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
    /// Transient: a task mid-edit never reaches the persisted snapshot.
    #[serde(skip)]
    pub is_editing: bool,
    /// Transient: set until the first name commit.
    #[serde(skip)]
    pub is_new: bool,
}

impl Task {
    pub fn draft(status: TaskStatus) -> Self {
        Task {
            id: fresh_id("task"),
            name: String::new(),
            status,
            tag_ids: Vec::new(),
            is_editing: true,
            is_new: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub todo: Vec<Task>,
    #[serde(default)]
    pub doing: Vec<Task>,
    #[serde(default)]
    pub done: Vec<Task>,
}

impl BoardState {
    pub fn list(&self, status: TaskStatus) -> &Vec<Task> {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::Doing => &self.doing,
            TaskStatus::Done => &self.done,
        }
    }

    fn list_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::Doing => &mut self.doing,
            TaskStatus::Done => &mut self.done,
        }
    }

    pub fn find_task(&self, status: TaskStatus, id: &str) -> Option<usize> {
        self.list(status).iter().position(|t| t.id == id)
    }

    /// Which list holds `id`, searching all three.
    pub fn locate(&self, id: &str) -> Option<TaskStatus> {
        STATUSES
            .into_iter()
            .find(|status| self.find_task(*status, id).is_some())
    }

    /// Snapshot for the storage layer: tasks mid-edit are stripped.
    pub fn persistable(&self) -> BoardState {
        fn strip(tasks: &[Task]) -> Vec<Task> {
            tasks.iter().filter(|t| !t.is_editing).cloned().collect()
        }
        BoardState {
            todo: strip(&self.todo),
            doing: strip(&self.doing),
            done: strip(&self.done),
        }
    }
}

/// Shallow partial update over `BoardState`: present lists replace, absent
/// lists are left untouched.
#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    pub todo: Option<Vec<Task>>,
    pub doing: Option<Vec<Task>>,
    pub done: Option<Vec<Task>>,
}

impl BoardPatch {
    pub fn with(status: TaskStatus, tasks: Vec<Task>) -> Self {
        let mut patch = BoardPatch::default();
        patch.set(status, tasks);
        patch
    }

    pub fn set(&mut self, status: TaskStatus, tasks: Vec<Task>) -> &mut Self {
        match status {
            TaskStatus::Todo => self.todo = Some(tasks),
            TaskStatus::Doing => self.doing = Some(tasks),
            TaskStatus::Done => self.done = Some(tasks),
        }
        self
    }
}

impl Record for BoardState {
    type Patch = BoardPatch;
    type Key = TaskStatus;

    fn merge(&self, patch: BoardPatch) -> Self {
        let mut next = self.clone();
        if let Some(todo) = patch.todo {
            next.todo = todo;
        }
        if let Some(doing) = patch.doing {
            next.doing = doing;
        }
        if let Some(done) = patch.done {
            next.done = done;
        }
        next
    }

    fn clear(&mut self, key: TaskStatus) -> bool {
        let list = self.list_mut(key);
        if list.is_empty() {
            return false;
        }
        list.clear();
        true
    }
}

/// Session-unique id: short random alphanumeric suffix under a kind prefix.
pub fn fresh_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{}-{}", prefix, suffix)
}
