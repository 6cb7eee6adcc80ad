pub mod cli;
pub mod config;
pub mod core;
pub mod exit;
pub mod photos;
pub mod report;
pub mod sheet;
pub mod ui;
