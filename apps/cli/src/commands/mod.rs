//! Command implementations for the CareSphere CLI.

pub mod auth;
pub mod links;
pub mod request;
pub mod route;
pub mod status;
