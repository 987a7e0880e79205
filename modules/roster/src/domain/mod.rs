pub mod credentials;
pub mod error;
pub mod groups;
pub mod members;
pub mod repo;
pub mod service;
