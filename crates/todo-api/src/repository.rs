use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use uuid::Uuid;

use todo_domain::{Priority, Todo, TodoError};

/// Durable storage for todo records. Implementations hide the query
/// mechanics of the backing store; not-found conditions are reported as
/// `TodoError::NotFound` so callers never inspect driver errors.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, todo: &Todo) -> Result<(), TodoError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Todo, TodoError>;
    /// Returns one page of non-deleted rows ordered by `created_at`
    /// descending, plus the total count independent of the paging window.
    async fn get_all(&self, page: i64, per_page: i64) -> Result<(Vec<Todo>, i64), TodoError>;
    async fn update(&self, todo: &Todo) -> Result<(), TodoError>;
    async fn delete(&self, id: Uuid) -> Result<(), TodoError>;
    /// Flips `completed` in a single store-side expression so that two
    /// concurrent toggles never lose an update.
    async fn toggle(&self, id: Uuid) -> Result<(), TodoError>;
}

/// SQLite-backed repository over a shared connection pool.
#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn create(&self, todo: &Todo) -> Result<(), TodoError> {
        sqlx::query(
            "INSERT INTO todos (id, title, description, completed, priority, due_date, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(todo.id.to_string())
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(todo.priority.as_str())
        .bind(todo.due_date.map(fmt_ts))
        .bind(fmt_ts(todo.created_at))
        .bind(fmt_ts(todo.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| store_err("create", e))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Todo, TodoError> {
        let row: Option<TodoRow> = sqlx::query_as(
            "SELECT id, title, description, completed, priority, due_date, created_at, updated_at, deleted_at \
             FROM todos WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_err("get_by_id", e))?;

        row.ok_or(TodoError::NotFound)?.into_todo()
    }

    async fn get_all(&self, page: i64, per_page: i64) -> Result<(Vec<Todo>, i64), TodoError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM todos WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| store_err("count", e))?;

        let offset = (page - 1) * per_page;
        let rows: Vec<TodoRow> = sqlx::query_as(
            "SELECT id, title, description, completed, priority, due_date, created_at, updated_at, deleted_at \
             FROM todos WHERE deleted_at IS NULL \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_err("get_all", e))?;

        let todos = rows
            .into_iter()
            .map(TodoRow::into_todo)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((todos, total))
    }

    async fn update(&self, todo: &Todo) -> Result<(), TodoError> {
        let result = sqlx::query(
            "UPDATE todos SET title = ?, description = ?, completed = ?, priority = ?, due_date = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(todo.priority.as_str())
        .bind(todo.due_date.map(fmt_ts))
        .bind(fmt_ts(todo.updated_at))
        .bind(todo.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| store_err("update", e))?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), TodoError> {
        let result =
            sqlx::query("UPDATE todos SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(fmt_ts(Utc::now()))
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| store_err("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound);
        }
        Ok(())
    }

    async fn toggle(&self, id: Uuid) -> Result<(), TodoError> {
        // Single atomic negation at the store; no read-then-write window.
        let result = sqlx::query(
            "UPDATE todos SET completed = NOT completed, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(fmt_ts(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| store_err("toggle", e))?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound);
        }
        Ok(())
    }
}

/// Raw row shape. SQLite stores ids, priorities and timestamps as TEXT;
/// the conversion into the domain type is the only place that parsing
/// can fail, and it fails as a store error.
#[derive(Debug, FromRow)]
struct TodoRow {
    id: String,
    title: String,
    description: String,
    completed: bool,
    priority: String,
    due_date: Option<String>,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TodoRow {
    fn into_todo(self) -> Result<Todo, TodoError> {
        Ok(Todo {
            id: Uuid::parse_str(&self.id)
                .map_err(|e| TodoError::Store(format!("bad id in store: {e}")))?,
            title: self.title,
            description: self.description,
            completed: self.completed,
            priority: self
                .priority
                .parse::<Priority>()
                .map_err(TodoError::Store)?,
            due_date: self.due_date.as_deref().map(parse_ts).transpose()?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
            deleted_at: self.deleted_at.as_deref().map(parse_ts).transpose()?,
        })
    }
}

/// Fixed-width RFC 3339 in UTC, so lexicographic order in the store
/// matches chronological order.
fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, TodoError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TodoError::Store(format!("bad timestamp in store: {e}")))
}

fn store_err(op: &str, err: sqlx::Error) -> TodoError {
    match err {
        sqlx::Error::RowNotFound => TodoError::NotFound,
        sqlx::Error::PoolTimedOut => TodoError::Timeout,
        other => {
            tracing::error!(operation = op, error = %other, "store operation failed");
            TodoError::Store(format!("{op}: {other}"))
        }
    }
}
