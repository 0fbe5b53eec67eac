pub mod errors;
pub mod todo;

pub use errors::TodoError;
pub use todo::{
    CreateTodoRequest, Meta, Priority, Todo, TodoListResponse, TodoResponse, UpdateTodoRequest,
};
