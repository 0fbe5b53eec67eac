use std::sync::Arc;
use uuid::Uuid;

use todo_domain::{
    CreateTodoRequest, Meta, Todo, TodoError, TodoListResponse, TodoResponse, UpdateTodoRequest,
};

use crate::repository::TodoRepository;

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

/// Business rules between the HTTP surface and the repository: creation
/// defaults, partial-update semantics and pagination normalization.
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, req: CreateTodoRequest) -> Result<TodoResponse, TodoError> {
        let todo = Todo::new(req);
        self.repo.create(&todo).await?;
        Ok(TodoResponse::from(&todo))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TodoResponse, TodoError> {
        let todo = self.repo.get_by_id(id).await?;
        Ok(TodoResponse::from(&todo))
    }

    /// Out-of-range paging input is clamped rather than rejected: page
    /// floors at 1 and per_page outside [1,100] resets to 20.
    pub async fn get_all(&self, page: i64, per_page: i64) -> Result<TodoListResponse, TodoError> {
        let page = page.max(1);
        let per_page = if (1..=MAX_PER_PAGE).contains(&per_page) {
            per_page
        } else {
            DEFAULT_PER_PAGE
        };

        let (todos, total) = self.repo.get_all(page, per_page).await?;
        let data = todos.iter().map(TodoResponse::from).collect();

        Ok(TodoListResponse {
            data,
            meta: Meta::compute(total, page, per_page),
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateTodoRequest,
    ) -> Result<TodoResponse, TodoError> {
        let mut todo = self.repo.get_by_id(id).await?;
        todo.apply_update(req);
        self.repo.update(&todo).await?;
        Ok(TodoResponse::from(&todo))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), TodoError> {
        self.repo.delete(id).await
    }

    /// The store flips the flag atomically; the record is then re-read to
    /// return its current state. The write/read pair itself is not
    /// transactional, so a concurrent mutation may show through in the
    /// returned record.
    pub async fn toggle(&self, id: Uuid) -> Result<TodoResponse, TodoError> {
        self.repo.toggle(id).await?;
        let todo = self.repo.get_by_id(id).await?;
        Ok(TodoResponse::from(&todo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use todo_domain::Priority;

    /// Mutex-over-HashMap store, enough to exercise the service rules
    /// without a database.
    #[derive(Default)]
    struct InMemoryTodoRepository {
        todos: Mutex<HashMap<Uuid, Todo>>,
    }

    #[async_trait]
    impl TodoRepository for InMemoryTodoRepository {
        async fn create(&self, todo: &Todo) -> Result<(), TodoError> {
            self.todos.lock().unwrap().insert(todo.id, todo.clone());
            Ok(())
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Todo, TodoError> {
            self.todos
                .lock()
                .unwrap()
                .get(&id)
                .filter(|t| t.deleted_at.is_none())
                .cloned()
                .ok_or(TodoError::NotFound)
        }

        async fn get_all(&self, page: i64, per_page: i64) -> Result<(Vec<Todo>, i64), TodoError> {
            let map = self.todos.lock().unwrap();
            let mut live: Vec<Todo> = map
                .values()
                .filter(|t| t.deleted_at.is_none())
                .cloned()
                .collect();
            live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = live.len() as i64;
            let start = ((page - 1) * per_page) as usize;
            let todos = live
                .into_iter()
                .skip(start)
                .take(per_page as usize)
                .collect();
            Ok((todos, total))
        }

        async fn update(&self, todo: &Todo) -> Result<(), TodoError> {
            let mut map = self.todos.lock().unwrap();
            match map.get(&todo.id) {
                Some(existing) if existing.deleted_at.is_none() => {
                    map.insert(todo.id, todo.clone());
                    Ok(())
                }
                _ => Err(TodoError::NotFound),
            }
        }

        async fn delete(&self, id: Uuid) -> Result<(), TodoError> {
            let mut map = self.todos.lock().unwrap();
            match map.get_mut(&id) {
                Some(t) if t.deleted_at.is_none() => {
                    t.deleted_at = Some(Utc::now());
                    Ok(())
                }
                _ => Err(TodoError::NotFound),
            }
        }

        async fn toggle(&self, id: Uuid) -> Result<(), TodoError> {
            let mut map = self.todos.lock().unwrap();
            match map.get_mut(&id) {
                Some(t) if t.deleted_at.is_none() => {
                    t.completed = !t.completed;
                    t.updated_at = Utc::now();
                    Ok(())
                }
                _ => Err(TodoError::NotFound),
            }
        }
    }

    fn service() -> TodoService {
        TodoService::new(Arc::new(InMemoryTodoRepository::default()))
    }

    fn create_req(title: &str) -> CreateTodoRequest {
        serde_json::from_value(serde_json::json!({ "title": title })).unwrap()
    }

    #[tokio::test]
    async fn create_applies_defaults_and_round_trips() {
        let svc = service();
        let created = svc.create(create_req("Buy milk")).await.unwrap();
        assert!(!created.completed);
        assert_eq!(created.priority, Priority::Medium);

        let fetched = svc.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let svc = service();
        let created = svc
            .create(
                serde_json::from_value(serde_json::json!({
                    "title": "Original",
                    "description": "keep",
                    "priority": "urgent"
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let updated = svc
            .update(
                created.id,
                UpdateTodoRequest {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "keep");
        assert_eq!(updated.priority, Priority::Urgent);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_missing_todo_is_not_found() {
        let svc = service();
        let err = svc
            .update(Uuid::new_v4(), UpdateTodoRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::NotFound));
    }

    #[tokio::test]
    async fn toggle_is_involutive() {
        let svc = service();
        let created = svc.create(create_req("flip me")).await.unwrap();

        let once = svc.toggle(created.id).await.unwrap();
        assert!(once.completed);
        let twice = svc.toggle(created.id).await.unwrap();
        assert!(!twice.completed);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = service();
        let created = svc.create(create_req("doomed")).await.unwrap();

        svc.delete(created.id).await.unwrap();
        assert!(matches!(
            svc.get_by_id(created.id).await.unwrap_err(),
            TodoError::NotFound
        ));
        // Second delete fails the same way instead of crashing.
        assert!(matches!(
            svc.delete(created.id).await.unwrap_err(),
            TodoError::NotFound
        ));
    }

    #[tokio::test]
    async fn pagination_normalizes_out_of_range_input() {
        let svc = service();
        for i in 0..3 {
            svc.create(create_req(&format!("todo {i}"))).await.unwrap();
        }

        let list = svc.get_all(0, 0).await.unwrap();
        assert_eq!(list.meta.page, 1);
        assert_eq!(list.meta.per_page, 20);

        let list = svc.get_all(-5, 150).await.unwrap();
        assert_eq!(list.meta.page, 1);
        assert_eq!(list.meta.per_page, 20);
        assert_eq!(list.meta.total, 3);
        assert_eq!(list.meta.total_pages, 1);
    }

    #[tokio::test]
    async fn pagination_meta_reflects_window() {
        let svc = service();
        for i in 0..5 {
            svc.create(create_req(&format!("todo {i}"))).await.unwrap();
        }

        let page1 = svc.get_all(1, 2).await.unwrap();
        assert_eq!(page1.data.len(), 2);
        assert_eq!(page1.meta.total, 5);
        assert_eq!(page1.meta.total_pages, 3);
        assert!(page1.meta.has_next);
        assert!(!page1.meta.has_previous);

        let page3 = svc.get_all(3, 2).await.unwrap();
        assert_eq!(page3.data.len(), 1);
        assert!(!page3.meta.has_next);
        assert!(page3.meta.has_previous);
    }

    #[tokio::test]
    async fn deleted_todos_are_excluded_from_lists() {
        let svc = service();
        let a = svc.create(create_req("a")).await.unwrap();
        svc.create(create_req("b")).await.unwrap();

        svc.delete(a.id).await.unwrap();
        let list = svc.get_all(1, 20).await.unwrap();
        assert_eq!(list.meta.total, 1);
        assert!(list.data.iter().all(|t| t.id != a.id));
    }
}
