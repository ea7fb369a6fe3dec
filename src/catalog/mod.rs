pub mod dto;
pub mod services;

pub use dto::{CatalogItem, FoodCreated, NewFood};
pub use services::{create_food, estimate_food, Catalog};
