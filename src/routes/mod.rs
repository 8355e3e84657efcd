pub mod admin;
pub mod auth;
pub mod employee;
pub mod exam;
pub mod health;
