pub mod cart;
pub mod dto;
pub mod services;

pub use cart::{Cart, CartEntry, CartEvent};
pub use dto::{LogMealRequest, MealItem};
pub use services::submit_meal;
