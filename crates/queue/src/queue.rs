use std::sync::Arc;

use crate::claim::ClaimView;
use crate::recorder::StatusRecorder;
use crate::repository::MessageTaskRepository;
use crate::store::TaskStore;
use crate::visibility::VisibilityGate;

/// The four queue components wired to one shared repository handle.
pub struct MessageTaskQueue<S: ?Sized> {
    tasks: TaskStore<S>,
    visibility: VisibilityGate<S>,
    claims: ClaimView<S>,
    recorder: StatusRecorder<S>,
}

impl<S: ?Sized> Clone for MessageTaskQueue<S> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            visibility: self.visibility.clone(),
            claims: self.claims.clone(),
            recorder: self.recorder.clone(),
        }
    }
}

impl<S: MessageTaskRepository + ?Sized> MessageTaskQueue<S> {
    pub fn new(repo: Arc<S>) -> Self {
        Self {
            tasks: TaskStore::new(repo.clone()),
            visibility: VisibilityGate::new(repo.clone()),
            claims: ClaimView::new(repo.clone()),
            recorder: StatusRecorder::new(repo),
        }
    }

    pub fn tasks(&self) -> &TaskStore<S> {
        &self.tasks
    }

    pub fn visibility(&self) -> &VisibilityGate<S> {
        &self.visibility
    }

    pub fn claims(&self) -> &ClaimView<S> {
        &self.claims
    }

    pub fn recorder(&self) -> &StatusRecorder<S> {
        &self.recorder
    }
}
