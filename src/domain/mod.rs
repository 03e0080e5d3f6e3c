pub mod cart;
pub mod catalog;
pub mod error;
pub mod repository;
pub mod user;
pub mod validation;
