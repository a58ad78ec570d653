//! In-process registry for fire-and-forget import tasks.
//!
//! The core import stays synchronous; the HTTP shell registers a task here,
//! spawns the run, and lets callers poll the snapshot. The registry is an
//! injected, clonable value rather than process-wide state so tests can run
//! isolated instances. Entries are evicted one hour after creation, swept
//! opportunistically on access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ImportReport;

/// How long a finished task stays visible to pollers.
const TASK_TTL_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Pollable snapshot of one background import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: Uuid,
    pub status: TaskState,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ImportReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<Mutex<HashMap<Uuid, TaskSnapshot>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending task and return its id.
    pub fn create(&self) -> Uuid {
        let task_id = Uuid::new_v4();
        let snapshot = TaskSnapshot {
            task_id,
            status: TaskState::Pending,
            progress: 0,
            result: None,
            error: None,
            logs: Vec::new(),
            created_at: Utc::now(),
        };

        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        Self::evict_expired(&mut tasks);
        tasks.insert(task_id, snapshot);
        tracing::info!("Registered import task {}", task_id);
        task_id
    }

    pub fn mark_running(&self, task_id: Uuid, log: &str) {
        self.update(task_id, |t| {
            t.status = TaskState::Running;
            t.progress = 1;
            t.logs.push(timestamped(log));
        });
    }

    pub fn mark_completed(&self, task_id: Uuid, report: ImportReport) {
        self.update(task_id, |t| {
            t.status = TaskState::Completed;
            t.progress = 100;
            t.logs.push(timestamped(&format!(
                "Import completed: {} test cases created, {} errors",
                report.created,
                report.errors.len()
            )));
            t.result = Some(report);
        });
    }

    pub fn mark_failed(&self, task_id: Uuid, error: &str) {
        self.update(task_id, |t| {
            t.status = TaskState::Failed;
            t.logs.push(timestamped(&format!("Import failed: {}", error)));
            t.error = Some(error.to_string());
        });
    }

    pub fn get(&self, task_id: Uuid) -> Option<TaskSnapshot> {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        Self::evict_expired(&mut tasks);
        tasks.get(&task_id).cloned()
    }

    fn update(&self, task_id: Uuid, apply: impl FnOnce(&mut TaskSnapshot)) {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        match tasks.get_mut(&task_id) {
            Some(snapshot) => apply(snapshot),
            None => tracing::warn!("Update for unknown task {}", task_id),
        }
    }

    fn evict_expired(tasks: &mut HashMap<Uuid, TaskSnapshot>) {
        let cutoff = Utc::now() - Duration::hours(TASK_TTL_HOURS);
        tasks.retain(|_, t| t.created_at > cutoff);
    }
}

fn timestamped(log: &str) -> String {
    format!("[{}] {}", Utc::now().format("%H:%M:%S"), log)
}
