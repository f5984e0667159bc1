//! User records and the account management flows that mutate them.

pub mod manager;
pub mod models;

pub use manager::AccountManager;
pub use models::{NewUser, Role, UnknownRole, User, UserId, UserResponse, UserUpdate};
