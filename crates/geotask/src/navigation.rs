/*
[INPUT]:  View transitions and user-facing notifications
[OUTPUT]: Route values between list and form, transient toast queue
[POS]:    Navigation/toast glue shared by the views and the TUI runtime
[UPDATE]: When adding views or notification levels
*/

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use geotask_gateway::{Task, TaskId};

/// How the task form was opened
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(Task),
}

impl FormMode {
    /// Edit mode only when a task is handed over
    pub fn from_task(task: Option<Task>) -> Self {
        match task {
            Some(task) => FormMode::Edit(task),
            None => FormMode::Create,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit(_))
    }

    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            FormMode::Edit(task) => Some(task.id),
            FormMode::Create => None,
        }
    }
}

/// Marker handed back to the list after a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListReturn {
    /// Millisecond timestamp that forces a reload
    pub refresh: i64,
    /// Task to select once the list is loaded
    pub highlight: Option<TaskId>,
}

impl ListReturn {
    pub fn now(highlight: Option<TaskId>) -> Self {
        Self {
            refresh: chrono::Utc::now().timestamp_millis(),
            highlight,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    TaskList(Option<ListReturn>),
    TaskForm(FormMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub expires_at: Instant,
}

/// Transient notifications, shown one at a time in arrival order
#[derive(Debug)]
pub struct Toasts {
    queue: VecDeque<Toast>,
    duration: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            duration,
        }
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?level, %message, "toast");
        // The display window starts when a toast reaches the front
        let now = Instant::now();
        let expires_at = match self.queue.back() {
            Some(last) => last.expires_at.max(now) + self.duration,
            None => now + self.duration,
        };
        self.queue.push_back(Toast {
            level,
            message,
            expires_at,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Warning, message);
    }

    pub fn danger(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Danger, message);
    }

    /// Drop expired toasts
    pub fn prune(&mut self, now: Instant) {
        while self.queue.front().is_some_and(|toast| toast.expires_at <= now) {
            self.queue.pop_front();
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.queue.front()
    }

    pub fn last(&self) -> Option<&Toast> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
