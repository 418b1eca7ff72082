pub mod phone;

pub use phone::{is_japan_e164, normalize_japan_phone, normalize_japan_phone_value, E164Phone};
