use crate::model::{BoardPatch, BoardState, TagId, Task, TaskId, TaskStatus, TAG_TRIGGER};
use crate::state::StateStore;
use crate::storage::{PersistenceBridge, TASKS_KEY};
use std::sync::Arc;

/// Emitted when typing in a task name should open the tag picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPickerRequest {
    pub status: TaskStatus,
    pub task_id: TaskId,
    /// Tags already on the task; the picker renders these checked and
    /// ignores clicks on them.
    pub checked_tag_ids: Vec<TagId>,
}

/// Three ordered status lists over a `StateStore`. Owns the task lifecycle
/// and keeps every id in at most one list; all operations are silent no-ops
/// when their target is missing.
///
/// Every committed mutation persists the editing-stripped snapshot under the
/// `tasks` key through a store subscriber, so no-ops never hit storage.
pub struct TaskBoard {
    store: StateStore<BoardState>,
}

impl TaskBoard {
    pub fn new(initial: BoardState, bridge: PersistenceBridge) -> Self {
        let mut store = StateStore::new(initial);
        store.subscribe(move |state: &BoardState| {
            bridge.save(TASKS_KEY, &state.persistable());
        });
        TaskBoard { store }
    }

    pub fn state(&self) -> &BoardState {
        self.store.state()
    }

    pub fn snapshot(&self) -> Arc<BoardState> {
        self.store.snapshot()
    }

    pub fn locate(&self, id: &str) -> Option<TaskStatus> {
        self.state().locate(id)
    }

    /// Appends an empty draft task and returns its id. The draft stays out
    /// of the persisted snapshot until its first name commit.
    pub fn add_task(&mut self, status: TaskStatus) -> TaskId {
        let mut list = self.state().list(status).clone();
        let task = Task::draft(status);
        let id = task.id.clone();
        list.push(task);
        self.store.update(BoardPatch::with(status, list));
        id
    }

    /// Reopens an existing task for editing. While editing, the task is
    /// excluded from the persisted snapshot.
    pub fn begin_edit(&mut self, status: TaskStatus, id: &str) {
        let Some(index) = self.state().find_task(status, id) else {
            return;
        };
        if self.state().list(status)[index].is_editing {
            return;
        }
        let mut list = self.state().list(status).clone();
        list[index].is_editing = true;
        self.store.update(BoardPatch::with(status, list));
    }

    /// Commits the edited name. Only applies to a task currently editing,
    /// which guards against blur events that straggle in after a removal or
    /// a previous commit.
    pub fn commit_task_name(&mut self, status: TaskStatus, id: &str, name: &str) {
        let Some(index) = self
            .state()
            .list(status)
            .iter()
            .position(|t| t.id == id && t.is_editing)
        else {
            return;
        };
        let mut list = self.state().list(status).clone();
        let task = &mut list[index];
        task.name = name.to_string();
        task.is_editing = false;
        task.is_new = false;
        self.store.update(BoardPatch::with(status, list));
    }

    pub fn remove_task(&mut self, status: TaskStatus, id: &str) {
        let Some(index) = self.state().find_task(status, id) else {
            return;
        };
        let mut list = self.state().list(status).clone();
        list.remove(index);
        self.store.update(BoardPatch::with(status, list));
    }

    /// Appends `tag_id` to the task's tags; already-attached ids are left
    /// alone, so attaching twice equals attaching once.
    pub fn attach_tag(&mut self, status: TaskStatus, task_id: &str, tag_id: &str) {
        let Some(index) = self.state().find_task(status, task_id) else {
            return;
        };
        if self.state().list(status)[index]
            .tag_ids
            .iter()
            .any(|id| id == tag_id)
        {
            return;
        }
        let mut list = self.state().list(status).clone();
        list[index].tag_ids.push(tag_id.to_string());
        self.store.update(BoardPatch::with(status, list));
    }

    pub fn detach_tag(&mut self, status: TaskStatus, task_id: &str, tag_id: &str) {
        let Some(index) = self.state().find_task(status, task_id) else {
            return;
        };
        let Some(tag_index) = self.state().list(status)[index]
            .tag_ids
            .iter()
            .position(|id| id == tag_id)
        else {
            return;
        };
        let mut list = self.state().list(status).clone();
        list[index].tag_ids.remove(tag_index);
        self.store.update(BoardPatch::with(status, list));
    }

    /// Removes from `from` and appends to `to` in one commit, reassigning
    /// the status. `from == to` sends the task to the end of its own list.
    pub fn move_task(&mut self, from: TaskStatus, to: TaskStatus, id: &str) {
        let Some(index) = self.state().find_task(from, id) else {
            return;
        };
        if from == to {
            let mut list = self.state().list(from).clone();
            let task = list.remove(index);
            list.push(task);
            self.store.update(BoardPatch::with(from, list));
            return;
        }
        let mut source = self.state().list(from).clone();
        let mut dest = self.state().list(to).clone();
        let mut task = source.remove(index);
        task.status = to;
        dest.push(task);
        let mut patch = BoardPatch::with(from, source);
        patch.set(to, dest);
        self.store.update(patch);
    }

    /// Lands a dragged task on `status`, appended with its status
    /// reassigned.
    pub(crate) fn append_task(&mut self, status: TaskStatus, mut task: Task) {
        let mut list = self.state().list(status).clone();
        task.status = status;
        list.push(task);
        self.store.update(BoardPatch::with(status, list));
    }

    /// Tag-picker trigger: the edited name just received input ending in
    /// the trigger character. Suppressed while a brand-new task is being
    /// named. Read-only.
    pub fn detect_tag_trigger(
        &self,
        status: TaskStatus,
        id: &str,
        input: &str,
    ) -> Option<TagPickerRequest> {
        let index = self.state().find_task(status, id)?;
        let task = &self.state().list(status)[index];
        if !task.is_editing || task.is_new {
            return None;
        }
        if !input.ends_with(TAG_TRIGGER) {
            return None;
        }
        Some(TagPickerRequest {
            status,
            task_id: task.id.clone(),
            checked_tag_ids: task.tag_ids.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::STATUSES;
    use crate::storage::MemoryStore;

    fn board() -> (TaskBoard, PersistenceBridge) {
        let bridge = PersistenceBridge::new(Arc::new(MemoryStore::new()));
        (TaskBoard::new(BoardState::default(), bridge.clone()), bridge)
    }

    fn committed_task(board: &mut TaskBoard, status: TaskStatus, name: &str) -> TaskId {
        let id = board.add_task(status);
        board.commit_task_name(status, &id, name);
        id
    }

    fn count_everywhere(board: &TaskBoard, id: &str) -> usize {
        STATUSES
            .iter()
            .map(|s| {
                board
                    .state()
                    .list(*s)
                    .iter()
                    .filter(|t| t.id == id)
                    .count()
            })
            .sum()
    }

    #[test]
    fn add_task_appends_an_editing_draft() {
        let (mut board, _bridge) = board();
        let id = board.add_task(TaskStatus::Todo);
        let task = &board.state().todo[0];
        assert_eq!(task.id, id);
        assert!(task.name.is_empty());
        assert!(task.is_editing);
        assert!(task.is_new);
    }

    #[test]
    fn commit_clears_transient_flags() {
        let (mut board, _bridge) = board();
        let id = board.add_task(TaskStatus::Todo);
        board.commit_task_name(TaskStatus::Todo, &id, "write report");
        let task = &board.state().todo[0];
        assert_eq!(task.name, "write report");
        assert!(!task.is_editing);
        assert!(!task.is_new);
    }

    #[test]
    fn stale_commit_after_removal_is_a_noop() {
        let (mut board, _bridge) = board();
        let id = board.add_task(TaskStatus::Todo);
        board.remove_task(TaskStatus::Todo, &id);
        let before = board.snapshot();
        board.commit_task_name(TaskStatus::Todo, &id, "ghost");
        assert!(Arc::ptr_eq(&before, &board.snapshot()));
    }

    #[test]
    fn double_commit_is_a_noop() {
        let (mut board, _bridge) = board();
        let id = board.add_task(TaskStatus::Todo);
        board.commit_task_name(TaskStatus::Todo, &id, "first");
        let before = board.snapshot();
        board.commit_task_name(TaskStatus::Todo, &id, "second");
        assert!(Arc::ptr_eq(&before, &board.snapshot()));
        assert_eq!(board.state().todo[0].name, "first");
    }

    #[test]
    fn begin_edit_then_commit_renames_existing_task() {
        let (mut board, _bridge) = board();
        let id = committed_task(&mut board, TaskStatus::Todo, "old name");
        board.commit_task_name(TaskStatus::Todo, &id, "ignored");
        assert_eq!(board.state().todo[0].name, "old name");
        board.begin_edit(TaskStatus::Todo, &id);
        assert!(board.state().todo[0].is_editing);
        board.commit_task_name(TaskStatus::Todo, &id, "new name");
        assert_eq!(board.state().todo[0].name, "new name");
    }

    #[test]
    fn remove_missing_task_keeps_snapshot_identity() {
        let (mut board, _bridge) = board();
        committed_task(&mut board, TaskStatus::Todo, "stay");
        let before = board.snapshot();
        board.remove_task(TaskStatus::Todo, "task-missing");
        board.remove_task(TaskStatus::Done, "task-missing");
        assert!(Arc::ptr_eq(&before, &board.snapshot()));
    }

    #[test]
    fn attach_tag_is_idempotent() {
        let (mut board, _bridge) = board();
        let id = committed_task(&mut board, TaskStatus::Doing, "tagged");
        board.attach_tag(TaskStatus::Doing, &id, "tag-a");
        board.attach_tag(TaskStatus::Doing, &id, "tag-a");
        assert_eq!(board.state().doing[0].tag_ids, vec!["tag-a".to_string()]);
    }

    #[test]
    fn detach_missing_tag_keeps_snapshot_identity() {
        let (mut board, _bridge) = board();
        let id = committed_task(&mut board, TaskStatus::Doing, "tagged");
        board.attach_tag(TaskStatus::Doing, &id, "tag-a");
        let before = board.snapshot();
        board.detach_tag(TaskStatus::Doing, &id, "tag-b");
        assert!(Arc::ptr_eq(&before, &board.snapshot()));
    }

    #[test]
    fn detach_removes_only_the_named_tag() {
        let (mut board, _bridge) = board();
        let id = committed_task(&mut board, TaskStatus::Doing, "tagged");
        board.attach_tag(TaskStatus::Doing, &id, "tag-a");
        board.attach_tag(TaskStatus::Doing, &id, "tag-b");
        board.detach_tag(TaskStatus::Doing, &id, "tag-a");
        assert_eq!(board.state().doing[0].tag_ids, vec!["tag-b".to_string()]);
    }

    #[test]
    fn move_task_reassigns_status_and_preserves_the_rest() {
        let (mut board, _bridge) = board();
        let id = committed_task(&mut board, TaskStatus::Todo, "carry me");
        board.attach_tag(TaskStatus::Todo, &id, "tag-a");
        board.move_task(TaskStatus::Todo, TaskStatus::Done, &id);
        assert!(board.state().todo.is_empty());
        let task = &board.state().done[0];
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.name, "carry me");
        assert_eq!(task.tag_ids, vec!["tag-a".to_string()]);
    }

    #[test]
    fn move_within_a_list_goes_to_the_end() {
        let (mut board, _bridge) = board();
        let first = committed_task(&mut board, TaskStatus::Todo, "first");
        let second = committed_task(&mut board, TaskStatus::Todo, "second");
        board.move_task(TaskStatus::Todo, TaskStatus::Todo, &first);
        let order: Vec<&str> = board.state().todo.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, [second.as_str(), first.as_str()]);
    }

    #[test]
    fn ids_stay_in_exactly_one_list_under_add_and_move() {
        let (mut board, _bridge) = board();
        let a = committed_task(&mut board, TaskStatus::Todo, "a");
        let b = committed_task(&mut board, TaskStatus::Doing, "b");
        board.move_task(TaskStatus::Todo, TaskStatus::Doing, &a);
        board.move_task(TaskStatus::Doing, TaskStatus::Done, &a);
        board.move_task(TaskStatus::Doing, TaskStatus::Doing, &b);
        board.move_task(TaskStatus::Done, TaskStatus::Todo, &a);
        assert_eq!(count_everywhere(&board, &a), 1);
        assert_eq!(count_everywhere(&board, &b), 1);
    }

    #[test]
    fn move_from_wrong_list_is_a_noop() {
        let (mut board, _bridge) = board();
        let id = committed_task(&mut board, TaskStatus::Todo, "anchored");
        let before = board.snapshot();
        board.move_task(TaskStatus::Doing, TaskStatus::Done, &id);
        assert!(Arc::ptr_eq(&before, &board.snapshot()));
    }

    #[test]
    fn persisted_snapshot_excludes_tasks_mid_edit() {
        let (mut board, bridge) = board();
        committed_task(&mut board, TaskStatus::Todo, "kept");
        board.add_task(TaskStatus::Todo);
        bridge.flush();
        let stored: BoardState = bridge.load(TASKS_KEY).expect("tasks blob present");
        assert_eq!(stored.todo.len(), 1);
        assert_eq!(stored.todo[0].name, "kept");
    }

    #[test]
    fn noop_operations_never_persist() {
        let bridge = PersistenceBridge::new(Arc::new(MemoryStore::new()));
        let mut board = TaskBoard::new(BoardState::default(), bridge.clone());
        board.remove_task(TaskStatus::Todo, "task-missing");
        board.detach_tag(TaskStatus::Done, "task-missing", "tag-a");
        bridge.flush();
        let stored: Option<BoardState> = bridge.load(TASKS_KEY);
        assert!(stored.is_none());
    }

    #[test]
    fn trigger_fires_only_while_editing_an_existing_task() {
        let (mut board, _bridge) = board();
        let id = committed_task(&mut board, TaskStatus::Todo, "groceries");
        board.attach_tag(TaskStatus::Todo, &id, "tag-a");
        assert!(board
            .detect_tag_trigger(TaskStatus::Todo, &id, "groceries#")
            .is_none());
        board.begin_edit(TaskStatus::Todo, &id);
        let request = board
            .detect_tag_trigger(TaskStatus::Todo, &id, "groceries#")
            .expect("picker request");
        assert_eq!(request.task_id, id);
        assert_eq!(request.checked_tag_ids, vec!["tag-a".to_string()]);
        assert!(board
            .detect_tag_trigger(TaskStatus::Todo, &id, "groceries")
            .is_none());
    }

    #[test]
    fn trigger_is_suppressed_for_new_tasks() {
        let (mut board, _bridge) = board();
        let id = board.add_task(TaskStatus::Todo);
        assert!(board
            .detect_tag_trigger(TaskStatus::Todo, &id, "name#")
            .is_none());
    }
}
