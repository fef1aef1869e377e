//! MSISDN normalisation.
//!
//! Every phone number is stored and looked up in `+<country><subscriber>`
//! form. Accepted inputs:
//! - `+254 700-000-000` (separators are stripped)
//! - `00254700000000` (international prefix)
//! - `254700000000` (country code without `+`)
//! - `0700000000` (trunk prefix, default country code applied)
//! - `+254 0700000000` (trunk prefix kept after the country code)
//!
//! Numbers in the default country must have exactly `subscriber_length`
//! digits after the country code, so one subscriber has one key.

use crate::error::{IdentityError, Result};

/// E.164 allows at most 15 digits; shorter than 8 is never a full number
const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 15;

pub fn normalize_msisdn(
    raw: &str,
    default_country_code: &str,
    subscriber_length: usize,
) -> Result<String> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    if compact.is_empty() {
        return Err(IdentityError::PhoneNormalization("empty phone number".to_string()));
    }

    let digits = if let Some(rest) = compact.strip_prefix('+') {
        rest.to_string()
    } else if let Some(rest) = compact.strip_prefix("00") {
        rest.to_string()
    } else if let Some(rest) = compact.strip_prefix('0') {
        format!("{default_country_code}{rest}")
    } else if compact.starts_with(default_country_code) {
        compact.clone()
    } else {
        return Err(IdentityError::PhoneNormalization(format!(
            "{} has no country code",
            logger_redacted::redact_phone(raw)
        )));
    };

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(IdentityError::PhoneNormalization(
            "phone number may only contain digits".to_string(),
        ));
    }
    if digits.starts_with('0') {
        return Err(IdentityError::PhoneNormalization(
            "country code cannot start with 0".to_string(),
        ));
    }

    // Country codes are prefix-free, so this only matches the default country
    let digits = match digits.strip_prefix(default_country_code) {
        Some(subscriber) => {
            let subscriber = subscriber.strip_prefix('0').unwrap_or(subscriber);
            if subscriber.len() != subscriber_length {
                return Err(IdentityError::PhoneNormalization(format!(
                    "expected {subscriber_length} digits after +{default_country_code}, got {}",
                    subscriber.len()
                )));
            }
            format!("{default_country_code}{subscriber}")
        }
        None => digits,
    };

    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return Err(IdentityError::PhoneNormalization(format!(
            "expected {MIN_DIGITS}-{MAX_DIGITS} digits, got {}",
            digits.len()
        )));
    }

    Ok(format!("+{digits}"))
}
