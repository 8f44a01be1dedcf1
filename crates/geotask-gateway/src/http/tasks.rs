/*
[INPUT]:  Task ids, create payloads and partial updates
[OUTPUT]: Task records returned by the backend
[POS]:    HTTP layer - task CRUD endpoints
[UPDATE]: When adding new task endpoints or changing payload format
*/

use crate::http::{GeotaskClient, Result};
use crate::types::{MessageResponse, NewTask, Task, TaskId, TaskListResponse, TaskUpdate};
use reqwest::Method;

const TASKS_ENDPOINT: &str = "api/tasks";

fn task_endpoint(id: TaskId) -> String {
    format!("{TASKS_ENDPOINT}/{id}")
}

impl GeotaskClient {
    /// List all tasks
    ///
    /// GET /api/tasks
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let builder = self.request(Method::GET, TASKS_ENDPOINT)?;
        let response: TaskListResponse = self.send_json(builder).await?;
        tracing::debug!(count = response.tasks.len(), "tasks listed");
        Ok(response.tasks)
    }

    /// Fetch a single task
    ///
    /// GET /api/tasks/{id}
    pub async fn get_task(&self, id: TaskId) -> Result<Task> {
        let builder = self.request(Method::GET, &task_endpoint(id))?;
        self.send_json(builder).await.map_err(|err| err.for_task(id))
    }

    /// Create a task
    ///
    /// POST /api/tasks
    pub async fn create_task(&self, task: &NewTask) -> Result<Task> {
        let builder = self.request(Method::POST, TASKS_ENDPOINT)?.json(task);
        let created: Task = self.send_json(builder).await?;
        tracing::info!(task_id = created.id, "task created");
        Ok(created)
    }

    /// Apply a partial update
    ///
    /// PUT /api/tasks/{id}
    pub async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task> {
        let builder = self.request(Method::PUT, &task_endpoint(id))?.json(update);
        let updated: Task = self
            .send_json(builder)
            .await
            .map_err(|err| err.for_task(id))?;
        tracing::info!(task_id = updated.id, "task updated");
        Ok(updated)
    }

    /// Delete a task; the response body is not relied upon
    ///
    /// DELETE /api/tasks/{id}
    pub async fn delete_task(&self, id: TaskId) -> Result<()> {
        let builder = self.request(Method::DELETE, &task_endpoint(id))?;
        let response = self.send(builder).await.map_err(|err| err.for_task(id))?;
        let body = response.text().await.unwrap_or_default();
        if let Ok(MessageResponse {
            message: Some(message),
        }) = serde_json::from_str::<MessageResponse>(&body)
        {
            tracing::debug!(task_id = id, %message, "delete acknowledged");
        }
        tracing::info!(task_id = id, "task deleted");
        Ok(())
    }
}
