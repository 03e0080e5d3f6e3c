pub mod cart_repository;
pub mod catalog;
pub mod session_registry;
pub mod user_repository;
