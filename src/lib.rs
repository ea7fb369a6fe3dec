//! Client core for the nutrition coach: a meal cart, goal tracking and a
//! chat log whose actions are performed by the remote coach.

use time::macros::format_description;
use time::Date;

pub mod auth;
pub mod backend;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod flight;
pub mod goals;
pub mod meals;
pub mod nutrition;

pub use auth::AuthSession;
pub use backend::{HttpBackend, NutritionBackend};
pub use error::{CoreError, CoreResult};

/// `YYYY-MM-DD`, the date format every endpoint uses.
pub fn iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

pub fn parse_iso_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).ok()
}
