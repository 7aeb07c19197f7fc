use crate::board::{TagPickerRequest, TaskBoard};
use crate::drag::{Deferred, DragProtocol, TickQueue};
use crate::model::{BoardState, TagId, TaskId, TaskStatus};
use crate::storage::{PersistenceBridge, TASKS_KEY};
use crate::tags::TagRegistry;

/// Input events the surrounding UI feeds into the core, stripped of any
/// widget detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    CreateTask { status: TaskStatus },
    BeginEdit { status: TaskStatus, id: TaskId },
    /// The name field changed while editing; may open the tag picker.
    NameInput { status: TaskStatus, id: TaskId, value: String },
    CommitName { status: TaskStatus, id: TaskId, value: String },
    RemoveTask { status: TaskStatus, id: TaskId },
    /// Picker events carry no status; the session locates the task.
    TagPicked { task_id: TaskId, tag_id: TagId },
    TagDetached { task_id: TaskId, tag_id: TagId },
    CreateTag { name: String },
    RenameTag { id: TagId, name: String },
    RemoveTag { id: TagId },
    DragStart { status: TaskStatus, id: TaskId },
    DragEnd,
    Drop { status: TaskStatus },
}

/// Outward signals the UI is expected to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiSignal {
    ShowTagPicker(TagPickerRequest),
}

/// Composition root for one board session: owns the task board, the tag
/// registry, the drag protocol, and the deferred-op queue. There is exactly
/// one mutator; every event is handled synchronously except the drag-removal
/// tick, which the driver delivers via `tick()`.
pub struct PopupSession {
    pub board: TaskBoard,
    pub tags: TagRegistry,
    drag: DragProtocol,
    queue: TickQueue,
}

impl PopupSession {
    /// Loads both persisted blobs, falling back to empty state when either
    /// is absent or unreadable.
    pub fn open(bridge: PersistenceBridge) -> Self {
        let initial: BoardState = bridge.load(TASKS_KEY).unwrap_or_default();
        let tags = TagRegistry::load(bridge.clone());
        let board = TaskBoard::new(initial, bridge);
        PopupSession {
            board,
            tags,
            drag: DragProtocol::new(),
            queue: TickQueue::new(),
        }
    }

    pub fn handle(&mut self, event: UiEvent) -> Option<UiSignal> {
        match event {
            UiEvent::CreateTask { status } => {
                self.board.add_task(status);
            }
            UiEvent::BeginEdit { status, id } => {
                self.board.begin_edit(status, &id);
            }
            UiEvent::NameInput { status, id, value } => {
                if let Some(request) = self.board.detect_tag_trigger(status, &id, &value) {
                    return Some(UiSignal::ShowTagPicker(request));
                }
            }
            UiEvent::CommitName { status, id, value } => {
                self.board.commit_task_name(status, &id, &value);
            }
            UiEvent::RemoveTask { status, id } => {
                self.board.remove_task(status, &id);
            }
            UiEvent::TagPicked { task_id, tag_id } => {
                if let Some(status) = self.board.locate(&task_id) {
                    self.board.attach_tag(status, &task_id, &tag_id);
                }
            }
            UiEvent::TagDetached { task_id, tag_id } => {
                if let Some(status) = self.board.locate(&task_id) {
                    self.board.detach_tag(status, &task_id, &tag_id);
                }
            }
            UiEvent::CreateTag { name } => {
                self.tags.create(&name);
            }
            UiEvent::RenameTag { id, name } => {
                self.tags.rename(&id, &name);
            }
            UiEvent::RemoveTag { id } => {
                self.tags.remove(&id);
            }
            UiEvent::DragStart { status, id } => {
                self.drag
                    .drag_start(&self.board, &mut self.queue, status, &id);
            }
            UiEvent::DragEnd => {
                self.drag.drag_end();
            }
            UiEvent::Drop { status } => {
                self.drag.drop_on(&mut self.board, status);
            }
        }
        None
    }

    /// One scheduler tick: applies every deferred operation.
    pub fn tick(&mut self) {
        for op in self.queue.drain() {
            match op {
                Deferred::RemoveTask { status, id } => self.board.remove_task(status, &id),
            }
        }
    }

    /// Scripted pointer gesture: pick up, tick, drop, release. The tick in
    /// the middle mirrors the real-gesture ordering guarantee.
    pub fn drag_task(&mut self, from: TaskStatus, to: TaskStatus, id: &str) {
        self.handle(UiEvent::DragStart {
            status: from,
            id: id.to_string(),
        });
        self.tick();
        self.handle(UiEvent::Drop { status: to });
        self.handle(UiEvent::DragEnd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn session() -> PopupSession {
        let bridge = PersistenceBridge::new(Arc::new(MemoryStore::new()));
        PopupSession::open(bridge)
    }

    fn committed_task(session: &mut PopupSession, status: TaskStatus, name: &str) -> TaskId {
        let id = session.board.add_task(status);
        session.handle(UiEvent::CommitName {
            status,
            id: id.clone(),
            value: name.to_string(),
        });
        id
    }

    #[test]
    fn name_input_with_trigger_opens_the_picker() {
        let mut session = session();
        let id = committed_task(&mut session, TaskStatus::Todo, "groceries");
        session.handle(UiEvent::BeginEdit {
            status: TaskStatus::Todo,
            id: id.clone(),
        });
        let signal = session.handle(UiEvent::NameInput {
            status: TaskStatus::Todo,
            id: id.clone(),
            value: "groceries#".into(),
        });
        match signal {
            Some(UiSignal::ShowTagPicker(request)) => assert_eq!(request.task_id, id),
            other => panic!("expected picker signal, got {:?}", other),
        }
    }

    #[test]
    fn picker_events_locate_the_task_without_a_status() {
        let mut session = session();
        let tag_id = session.tags.create("urgent").expect("tag created");
        let id = committed_task(&mut session, TaskStatus::Doing, "tagged");
        session.handle(UiEvent::TagPicked {
            task_id: id.clone(),
            tag_id: tag_id.clone(),
        });
        assert_eq!(session.board.state().doing[0].tag_ids, vec![tag_id.clone()]);
        session.handle(UiEvent::TagDetached {
            task_id: id,
            tag_id,
        });
        assert!(session.board.state().doing[0].tag_ids.is_empty());
    }

    #[test]
    fn picker_event_for_missing_task_is_a_noop() {
        let mut session = session();
        let tag_id = session.tags.create("urgent").expect("tag created");
        session.handle(UiEvent::TagPicked {
            task_id: "task-missing".into(),
            tag_id,
        });
        assert!(session.board.state().todo.is_empty());
    }

    #[test]
    fn scripted_drag_round_trips_between_lists() {
        let mut session = session();
        let id = committed_task(&mut session, TaskStatus::Todo, "Write spec");
        session.drag_task(TaskStatus::Todo, TaskStatus::Doing, &id);
        assert!(session.board.state().todo.is_empty());
        assert_eq!(session.board.state().doing[0].id, id);
        assert_eq!(session.board.state().doing[0].status, TaskStatus::Doing);
    }

    #[test]
    fn tag_registry_events_round_trip() {
        let mut session = session();
        session.handle(UiEvent::CreateTag {
            name: "urgent".into(),
        });
        let id = session.tags.list()[0].id.clone();
        session.handle(UiEvent::RenameTag {
            id: id.clone(),
            name: "now".into(),
        });
        assert_eq!(session.tags.lookup(&id).map(|t| t.name.as_str()), Some("now"));
        session.handle(UiEvent::RemoveTag { id });
        assert!(session.tags.list().is_empty());
    }
}
