mod app;
mod clipboard;
mod effects;
mod error;
mod persistence;
mod ui;

pub use app::run_app;
pub use error::AppError;
