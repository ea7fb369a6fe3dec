pub mod dto;
pub mod services;

pub use dto::{Dashboard, DailySummary, Goals, MacroProgress, Preset};
pub use services::{progress, GoalTracker};
