use std::sync::Arc;

/// A state record that absorbs shallow partial updates.
///
/// `merge` is last-write-wins per field and must leave `self` untouched;
/// `clear` empties one keyed slot and reports whether anything changed.
pub trait Record: Clone {
    type Patch;
    type Key: Copy;

    fn merge(&self, patch: Self::Patch) -> Self;
    fn clear(&mut self, key: Self::Key) -> bool;
}

pub enum Mutation<R: Record> {
    /// Replace wholesale; `None` restores the initial state.
    Reset(Option<R>),
    Delete(Vec<R::Key>),
    Update(R::Patch),
}

/// Container over a `Record`. Every committing mutation produces a fresh
/// `Arc` snapshot, so consumers can detect change with `Arc::ptr_eq`; a
/// `Delete` that touches nothing hands back the current snapshot unchanged
/// and skips subscriber notification.
pub struct StateStore<R: Record> {
    initial: R,
    current: Arc<R>,
    subscribers: Vec<Box<dyn Fn(&R)>>,
}

impl<R: Record> StateStore<R> {
    pub fn new(initial: R) -> Self {
        StateStore {
            current: Arc::new(initial.clone()),
            initial,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &R {
        &self.current
    }

    pub fn snapshot(&self) -> Arc<R> {
        Arc::clone(&self.current)
    }

    /// Runs `subscriber` after every committed mutation.
    pub fn subscribe(&mut self, subscriber: impl Fn(&R) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn apply(&mut self, mutation: Mutation<R>) -> Arc<R> {
        match mutation {
            Mutation::Reset(next) => {
                let next = next.unwrap_or_else(|| self.initial.clone());
                self.commit(next)
            }
            Mutation::Delete(keys) => {
                let mut next = (*self.current).clone();
                let mut changed = false;
                for key in keys {
                    changed |= next.clear(key);
                }
                if !changed {
                    return self.snapshot();
                }
                self.commit(next)
            }
            Mutation::Update(patch) => {
                let next = self.current.merge(patch);
                self.commit(next)
            }
        }
    }

    pub fn update(&mut self, patch: R::Patch) -> Arc<R> {
        self.apply(Mutation::Update(patch))
    }

    /// Like `update`, invoking `on_committed` with the new state
    /// synchronously after subscribers have run.
    pub fn update_with(&mut self, patch: R::Patch, on_committed: impl FnOnce(&R)) -> Arc<R> {
        let snapshot = self.apply(Mutation::Update(patch));
        on_committed(&snapshot);
        snapshot
    }

    pub fn reset(&mut self, next: Option<R>) -> Arc<R> {
        self.apply(Mutation::Reset(next))
    }

    pub fn delete(&mut self, keys: &[R::Key]) -> Arc<R> {
        self.apply(Mutation::Delete(keys.to_vec()))
    }

    fn commit(&mut self, next: R) -> Arc<R> {
        self.current = Arc::new(next);
        for subscriber in &self.subscribers {
            subscriber(&self.current);
        }
        Arc::clone(&self.current)
    }
}
