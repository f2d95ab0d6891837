pub mod attendance;
pub mod calc;
pub mod config;
pub mod db;
pub mod deadline;
pub mod error;
pub mod http;
pub mod model;
pub mod reports;
pub mod roster;
