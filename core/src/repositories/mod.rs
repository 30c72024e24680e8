//! Repository interfaces and their in-process implementations.

pub mod user;

pub use user::{InMemoryUserRepository, UserRepository};
