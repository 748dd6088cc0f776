//! Subscriber phone number and amount validation

use std::fmt::Display;

use serde::Serialize;

pub const COUNTRY_CODE: &str = "237";
const LOCAL_MOBILE_PREFIX: char = '6';
const LOCAL_LEN: usize = 9;
const INTERNATIONAL_LEN: usize = 12;

/// Mobile money number in international form, e.g. `237670123456`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strictly positive amount in XAF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount(u64);

impl Amount {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidPhone(String),
    InvalidAmount(String),
}

impl std::error::Error for ValidationError {}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPhone(input) => write!(
                f,
                "invalid phone number format {input:?}: expected 6XXXXXXXX or {COUNTRY_CODE}6XXXXXXXX"
            ),
            Self::InvalidAmount(input) => {
                write!(f, "amount must be a positive integer, got {input:?}")
            }
        }
    }
}

/// Normalizes a local (9 digit, starting with 6) or international number.
///
/// Whitespace anywhere in the input is ignored. Carrier prefixes are not
/// checked here, the gateway rejects unknown operators itself.
pub fn parse_phone(input: &str) -> Result<PhoneNumber, ValidationError> {
    let mut phone: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if phone.len() == LOCAL_LEN && phone.starts_with(LOCAL_MOBILE_PREFIX) {
        phone.insert_str(0, COUNTRY_CODE);
    }

    let valid = phone.starts_with(COUNTRY_CODE)
        && phone.len() == INTERNATIONAL_LEN
        && phone.bytes().all(|b| b.is_ascii_digit());
    if !valid {
        return Err(ValidationError::InvalidPhone(input.to_string()));
    }
    Ok(PhoneNumber(phone))
}

pub fn parse_amount(input: &str) -> Result<Amount, ValidationError> {
    match input.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Amount(value)),
        _ => Err(ValidationError::InvalidAmount(input.to_string())),
    }
}
