//! ketoday - keto meal plan and daily tracker
//!
//! Builds a multi-week ketogenic plan from localized template days, tracks
//! meals, water, extras, exercise and the weekly cheat meal per day, and talks
//! to a remote AI endpoint for generated meals, workouts and reviews.

pub mod ai;
pub mod calories;
pub mod config;
pub mod db;
pub mod metrics;
pub mod plan;
pub mod progress;
pub mod store;
pub mod templates;
pub mod tracker;
pub mod tui;

pub use db::Database;
pub use store::Store;
pub use tracker::{DaySummary, Tracker};
