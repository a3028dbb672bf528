pub mod response;
pub mod task;
pub mod user;

pub use response::ApiResponse;
pub use task::{NewTask, StatusRef, Task, TaskInput, TaskPatch, TaskStatus, TaskView};
pub use user::{NewUser, User, UserView};
