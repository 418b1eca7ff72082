use crate::domain::E164Phone;
use crate::error::PhoneError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire shape of a normalization result: `{ok: true, e164}` or
/// `{ok: false, error, kind}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneCheck {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e164: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl PhoneCheck {
    pub fn success(phone: &E164Phone) -> Self {
        Self {
            ok: true,
            e164: Some(phone.as_str().to_string()),
            error: None,
            kind: None,
        }
    }

    pub fn failure(err: PhoneError) -> Self {
        Self {
            ok: false,
            e164: None,
            error: Some(err.to_string()),
            kind: Some(err.kind().to_string()),
        }
    }
}

impl From<Result<E164Phone, PhoneError>> for PhoneCheck {
    fn from(result: Result<E164Phone, PhoneError>) -> Self {
        match result {
            Ok(phone) => Self::success(&phone),
            Err(err) => Self::failure(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemDto {
    pub line: usize,
    pub input: Value,
    #[serde(flatten)]
    pub check: PhoneCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReportDto {
    pub items: Vec<BatchItemDto>,
    pub ok: usize,
    pub failed: usize,
}
