pub mod config;
pub mod controller;
pub mod keys;
pub mod status;
pub mod ticker;
pub mod transition;
pub mod unlock;
