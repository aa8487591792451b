//! Personal time tracking dashboard. Sessions are logged from the terminal or planned ahead in a
//! weekly planner, and get rolled up into category totals, weekly goal progress, streaks, a
//! yearly heatmap and period comparisons.
//!

pub mod cli;
pub mod dashboard;
pub mod engine;
pub mod export;
pub mod storage;
pub mod utils;
