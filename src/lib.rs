pub mod chembl;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod export;
pub mod output;
pub mod records;
pub mod table;
pub mod tui;
