pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod linker;
pub mod metadata;
pub mod navigation;
pub mod output;
pub mod page;
pub mod publications;
pub mod registry;
pub mod runtime;
pub mod switcher;
pub mod table;
pub mod tui;
