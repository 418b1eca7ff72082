pub mod domain;
pub mod dto;
pub mod error;

pub use domain::*;
pub use dto::*;
pub use error::PhoneError;
