pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod machine;
pub mod manager;
pub mod registrant;
pub mod registry;
pub mod state;
