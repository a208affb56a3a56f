pub mod repo;
pub mod repo_types;

pub use repo::CreateUserError;
pub use repo_types::{NewUser, User, UserRole};
