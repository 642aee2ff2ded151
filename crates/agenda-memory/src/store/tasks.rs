//! Task row CRUD — the task-store contract.

use super::{Store, DT_FORMAT};
use agenda_core::{
    error::AgendaError,
    task::{Task, TaskDraft, TaskPatch, TaskStatus},
    timefmt,
    traits::TaskStore,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Row tuple: (id, owner_id, title, scheduled_date, location, participants, status, created_at).
type TaskRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
);

fn parse_dt(s: &str, column: &str) -> Result<NaiveDateTime, AgendaError> {
    NaiveDateTime::parse_from_str(s, DT_FORMAT)
        .map_err(|e| AgendaError::Memory(format!("bad {column} value '{s}': {e}")))
}

fn row_to_task(row: TaskRow) -> Result<Task, AgendaError> {
    let (id, owner_id, title, scheduled_date, location, participants, status, created_at) = row;
    let status = TaskStatus::parse(&status)
        .ok_or_else(|| AgendaError::Memory(format!("unknown task status '{status}'")))?;
    let participants: Vec<String> = serde_json::from_str(&participants)
        .map_err(|e| AgendaError::Memory(format!("bad participants json: {e}")))?;
    Ok(Task {
        id,
        owner_id,
        title,
        scheduled_date: parse_dt(&scheduled_date, "scheduled_date")?,
        location,
        participants,
        status,
        created_at: parse_dt(&created_at, "created_at")?,
    })
}

const TASK_COLUMNS: &str =
    "id, owner_id, title, scheduled_date, location, participants, status, created_at";

#[async_trait]
impl TaskStore for Store {
    async fn create(&self, draft: &TaskDraft) -> Result<Task, AgendaError> {
        let id = Uuid::new_v4().to_string();
        let created_at = timefmt::now();
        let participants = serde_json::to_string(&draft.participants)?;

        sqlx::query(
            "INSERT INTO tasks (id, owner_id, title, scheduled_date, location, participants, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)",
        )
        .bind(&id)
        .bind(&draft.owner_id)
        .bind(&draft.title)
        .bind(draft.scheduled_date.format(DT_FORMAT).to_string())
        .bind(&draft.location)
        .bind(&participants)
        .bind(created_at.format(DT_FORMAT).to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AgendaError::Memory(format!("create task failed: {e}")))?;

        self.get_by_id(&id, &draft.owner_id)
            .await?
            .ok_or_else(|| AgendaError::Memory("created task vanished".to_string()))
    }

    async fn update(
        &self,
        id: &str,
        owner_id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, AgendaError> {
        if patch.is_empty() {
            return self
                .get_by_id(id, owner_id)
                .await?
                .ok_or_else(|| AgendaError::NotFound(id.to_string()));
        }

        let mut sets = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(title) = &patch.title {
            sets.push("title = ?");
            values.push(title.clone());
        }
        if let Some(when) = patch.scheduled_date {
            sets.push("scheduled_date = ?");
            values.push(when.format(DT_FORMAT).to_string());
        }
        if let Some(location) = &patch.location {
            sets.push("location = ?");
            values.push(location.clone());
        }
        if let Some(participants) = &patch.participants {
            sets.push("participants = ?");
            values.push(serde_json::to_string(participants)?);
        }

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ? AND owner_id = ?",
            sets.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for v in &values {
            query = query.bind(v);
        }
        query = query.bind(id).bind(owner_id);

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| AgendaError::Memory(format!("update task failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AgendaError::NotFound(id.to_string()));
        }

        self.get_by_id(id, owner_id)
            .await?
            .ok_or_else(|| AgendaError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), AgendaError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AgendaError::Memory(format!("delete task failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AgendaError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Task>, AgendaError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ? ORDER BY scheduled_date ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AgendaError::Memory(format!("list tasks failed: {e}")))?;

        rows.into_iter().map(row_to_task).collect()
    }

    async fn get_by_id(&self, id: &str, owner_id: &str) -> Result<Option<Task>, AgendaError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND owner_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AgendaError::Memory(format!("get task failed: {e}")))?;

        row.map(row_to_task).transpose()
    }
}
