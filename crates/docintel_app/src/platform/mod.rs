pub mod app;
pub mod effects;
pub mod persistence;
pub mod shell;
pub mod ui;
