use std::sync::Arc;

use courier_common::types::NewMessageTask;

use crate::memory::MemoryTaskRepository;
use crate::queue::MessageTaskQueue;

pub(crate) fn new_task(subject: &str, is_priority: bool) -> NewMessageTask {
    NewMessageTask {
        recipient_id: 7,
        instance_id: 3,
        user: "ops".to_string(),
        subject: subject.to_string(),
        body: format!("{} body", subject),
        is_priority,
    }
}

pub(crate) fn memory_queue() -> (Arc<MemoryTaskRepository>, MessageTaskQueue<MemoryTaskRepository>) {
    let repo = Arc::new(MemoryTaskRepository::new());
    let queue = MessageTaskQueue::new(repo.clone());
    (repo, queue)
}
