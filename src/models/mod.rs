pub mod forms;
pub mod post;
pub mod user;
