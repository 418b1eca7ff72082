use crate::error::PhoneError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const COUNTRY_CODE: &str = "81";
const E164_PREFIX: &str = "+81";
const MIN_NATIONAL_DIGITS: usize = 9;
const MAX_NATIONAL_DIGITS: usize = 10;

/// A Japanese phone number in E.164 form: `+81` followed by 9 or 10 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct E164Phone(String);

impl E164Phone {
    /// Accepts only values that are already in canonical form.
    pub fn new(raw: &str) -> Result<Self, PhoneError> {
        if !is_japan_e164(raw) {
            return Err(PhoneError::InvalidNumber);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The subscriber digits after `+81`.
    pub fn national_digits(&self) -> &str {
        &self.0[E164_PREFIX.len()..]
    }
}

impl fmt::Display for E164Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for E164Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for E164Phone {
    type Err = PhoneError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        normalize_japan_phone(value)
    }
}

impl TryFrom<String> for E164Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if !is_japan_e164(&value) {
            return Err(PhoneError::InvalidNumber);
        }
        Ok(Self(value))
    }
}

impl From<E164Phone> for String {
    fn from(phone: E164Phone) -> Self {
        phone.0
    }
}

pub fn is_japan_e164(value: &str) -> bool {
    match value.strip_prefix(E164_PREFIX) {
        Some(rest) => {
            (MIN_NATIONAL_DIGITS..=MAX_NATIONAL_DIGITS).contains(&rest.len())
                && rest.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Entry point for untyped payloads; anything but a JSON string is rejected.
pub fn normalize_japan_phone_value(value: &Value) -> Result<E164Phone, PhoneError> {
    match value {
        Value::String(raw) => normalize_japan_phone(raw),
        _ => Err(PhoneError::Invalid),
    }
}

pub fn normalize_japan_phone(raw: &str) -> Result<E164Phone, PhoneError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PhoneError::Required);
    }

    // Letters are reported before anything is stripped.
    if trimmed.chars().any(|ch| ch.is_ascii_alphabetic()) {
        return Err(PhoneError::ContainsLetters);
    }

    let compact: String = trimmed
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '+')
        .collect();
    if compact.is_empty() {
        return Err(PhoneError::Invalid);
    }

    let has_plus = compact.starts_with('+');
    let plus_count = compact.matches('+').count();
    if plus_count > 1 || (plus_count == 1 && !has_plus) {
        return Err(PhoneError::InvalidFormat);
    }

    let digits: String = compact.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(PhoneError::Invalid);
    }

    let candidate = if has_plus {
        let national = digits
            .strip_prefix(COUNTRY_CODE)
            .ok_or(PhoneError::NotJapan)?;
        let national = national.strip_prefix('0').unwrap_or(national);
        format!("{E164_PREFIX}{national}")
    } else if let Some(national) = digits.strip_prefix('0') {
        format!("{E164_PREFIX}{national}")
    } else if digits.starts_with(COUNTRY_CODE) {
        // Taken as already carrying the country code, even when it could be
        // a local number that happens to start with 81.
        format!("+{digits}")
    } else {
        return Err(PhoneError::UnknownPrefix);
    };

    E164Phone::try_from(candidate)
}
