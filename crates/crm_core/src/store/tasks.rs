//! Follow-up task use-cases.

use super::{CrmStore, EntityKind, StoreError, StoreResult};
use crate::model::task::{Task, TaskStatus};
use crate::model::validation::require_text;
use crate::persistence::{Slot, SlotStore};
use chrono::NaiveDateTime;
use log::{debug, info};

impl<S: SlotStore> CrmStore<S> {
    /// Schedules a pending task.
    ///
    /// # Errors
    /// - `Validation` when `title` is blank.
    /// - `NotFound` when `client_id` is unknown.
    pub fn add_task(
        &mut self,
        client_id: &str,
        title: &str,
        due_at: NaiveDateTime,
    ) -> StoreResult<Task> {
        let title = require_text("title", title)?;
        self.require_client(client_id)?;

        let id = self
            .ids
            .tasks
            .next_id(|candidate| self.tasks.iter().any(|task| task.id == candidate));
        let task = Task {
            id,
            client_id: client_id.to_string(),
            title,
            due_at,
            status: TaskStatus::Pending,
        };

        self.tasks.push(task.clone());
        let _ = self.persist(Slot::Tasks);
        info!(
            "event=task_add module=store status=ok task_id={} client_id={client_id}",
            task.id
        );
        Ok(task)
    }

    /// Flips a task between pending and done.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    pub fn toggle_task(&mut self, id: &str) -> StoreResult<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Task, id))?;
        task.status = task.status.toggled();
        let updated = task.clone();

        let _ = self.persist(Slot::Tasks);
        info!(
            "event=task_toggle module=store status=ok task_id={id} state={:?}",
            updated.status
        );
        Ok(updated)
    }

    /// Deletes a task; returns whether one was removed.
    pub fn remove_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            debug!("event=task_remove module=store status=noop task_id={id}");
            return false;
        }
        let _ = self.persist(Slot::Tasks);
        info!("event=task_remove module=store status=ok task_id={id}");
        true
    }
}
