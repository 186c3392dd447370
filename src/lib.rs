pub mod api;
pub mod assistant;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod icons;
pub mod llm;
