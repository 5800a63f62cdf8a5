use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable};

use crate::state::OperationKind;

#[derive(Default)]
struct Registrations {
    next_id: u64,
    handles: HashMap<OperationKind, (u64, AbortHandle)>,
}

/// Abort handles for in-flight write actions, one slot per operation kind.
///
/// Nothing cancels automatically. `cancel` only stops the local wait: a
/// transaction the wallet already broadcast still lands on chain.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Rc<RefCell<Registrations>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `task` to completion unless `cancel(kind)` is called first.
    /// Returns `false` if it was cancelled.
    pub async fn run<F: Future<Output = ()>>(&self, kind: OperationKind, task: F) -> bool {
        let (handle, registration) = AbortHandle::new_pair();
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.handles.insert(kind, (id, handle));
            id
        };
        let outcome = Abortable::new(task, registration).await;
        // A later run of the same kind may own the slot by now.
        let mut inner = self.inner.borrow_mut();
        if inner.handles.get(&kind).is_some_and(|(owner, _)| *owner == id) {
            inner.handles.remove(&kind);
        }
        outcome.is_ok()
    }

    pub fn is_running(&self, kind: OperationKind) -> bool {
        self.inner.borrow().handles.contains_key(&kind)
    }

    /// Abort the task registered under `kind`. Returns `false` if none was running.
    pub fn cancel(&self, kind: OperationKind) -> bool {
        match self.inner.borrow_mut().handles.remove(&kind) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}
