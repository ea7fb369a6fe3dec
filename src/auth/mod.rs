pub mod dto;
pub mod services;

pub use dto::{AuthResponse, Credentials, PublicUser};
pub use services::{login, register, AuthSession};
