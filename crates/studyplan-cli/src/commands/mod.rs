pub mod auth;
pub mod config;
pub mod course;
pub mod duration;
pub mod plan;
