// The binary in main.rs drives the terminal; everything it needs lives here so
// integration tests and benchmarks can reach it via `mathquiz::*`.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod session;
pub mod store;
pub mod ui;
