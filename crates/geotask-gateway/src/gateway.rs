/*
[INPUT]:  Task CRUD operations requested by views
[OUTPUT]: TaskGateway trait and its HTTP implementation
[POS]:    Gateway seam - decouples views from the transport
[UPDATE]: When the task contract gains or loses operations
*/

use async_trait::async_trait;

use crate::http::{GeotaskClient, Result};
use crate::types::{NewTask, Task, TaskId, TaskUpdate};

/// Remote task store
///
/// Every call is a single round-trip: no retries, no batching and no
/// conflict detection. Callers trust the returned record as final state.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>>;

    async fn get_by_id(&self, id: TaskId) -> Result<Task>;

    async fn create(&self, task: NewTask) -> Result<Task>;

    /// Only the fields present in `update` change
    async fn update(&self, id: TaskId, update: TaskUpdate) -> Result<Task>;

    async fn delete(&self, id: TaskId) -> Result<()>;
}

#[async_trait]
impl TaskGateway for GeotaskClient {
    async fn list(&self) -> Result<Vec<Task>> {
        self.list_tasks().await
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Task> {
        self.get_task(id).await
    }

    async fn create(&self, task: NewTask) -> Result<Task> {
        self.create_task(&task).await
    }

    async fn update(&self, id: TaskId, update: TaskUpdate) -> Result<Task> {
        self.update_task(id, &update).await
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        self.delete_task(id).await
    }
}
