use crate::board::TaskBoard;
use crate::model::{Task, TaskId, TaskStatus};
use std::collections::VecDeque;

/// Work postponed to the next tick of the driving loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    RemoveTask { status: TaskStatus, id: TaskId },
}

/// Explicit deferred-op queue. The session drains it between input events;
/// under a real pointer gesture the drain always lands between pick-up and
/// drop.
#[derive(Default)]
pub struct TickQueue {
    pending: VecDeque<Deferred>,
}

impl TickQueue {
    pub fn new() -> Self {
        TickQueue::default()
    }

    pub fn schedule(&mut self, op: Deferred) {
        self.pending.push_back(op);
    }

    pub fn drain(&mut self) -> Vec<Deferred> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

enum DragState {
    Idle,
    PickedUp { task: Task },
}

/// Moves a task between lists in two phases: pick-up snapshots the task by
/// value and schedules its removal from the source list; drop appends the
/// held copy to the destination. A drag that ends without a drop loses the
/// task (the removal has already been scheduled and nothing restores it).
///
/// Assumes serialized single-pointer gestures; a second pick-up before
/// drag-end is not defended against.
pub struct DragProtocol {
    state: DragState,
}

impl DragProtocol {
    pub fn new() -> Self {
        DragProtocol {
            state: DragState::Idle,
        }
    }

    pub fn held(&self) -> Option<&Task> {
        match &self.state {
            DragState::Idle => None,
            DragState::PickedUp { task } => Some(task),
        }
    }

    /// Pick-up: no-op when the task is not in the source list. The source
    /// removal is deferred onto `queue`, never applied synchronously, so the
    /// in-flight gesture is not disturbed by an immediate re-render.
    pub fn drag_start(
        &mut self,
        board: &TaskBoard,
        queue: &mut TickQueue,
        status: TaskStatus,
        id: &str,
    ) {
        let Some(index) = board.state().find_task(status, id) else {
            return;
        };
        let task = board.state().list(status)[index].clone();
        self.state = DragState::PickedUp { task };
        queue.schedule(Deferred::RemoveTask {
            status,
            id: id.to_string(),
        });
    }

    /// Drop: appends a copy of the held task with its status reassigned.
    /// A drop with nothing held is a no-op. The held task survives until
    /// drag-end, which native gestures always deliver.
    pub fn drop_on(&self, board: &mut TaskBoard, to: TaskStatus) {
        let DragState::PickedUp { task } = &self.state else {
            return;
        };
        board.append_task(to, task.clone());
    }

    /// Back to idle whether or not a drop occurred.
    pub fn drag_end(&mut self) {
        self.state = DragState::Idle;
    }
}

impl Default for DragProtocol {
    fn default() -> Self {
        DragProtocol::new()
    }
}
