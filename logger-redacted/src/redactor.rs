use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    static ref MSISDN_REGEX: Regex = Regex::new(r"\+?\b\d{7,15}\b").unwrap();
}

/// Number of leading and trailing digits left visible in a masked MSISDN
const PHONE_VISIBLE_DIGITS: usize = 3;

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl From<&crate::LoggerConfig> for RedactionConfig {
    fn from(config: &crate::LoggerConfig) -> Self {
        Self {
            redact_emails: config.redaction_enabled,
            redact_phones: config.redaction_enabled,
            hash_for_correlation: config.hash_for_correlation,
            custom_patterns: Vec::new(),
        }
    }
}

/// PII redactor for structured log fields and free-text log messages
#[derive(Debug, Clone)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    /// Render a phone number for a log field
    pub fn phone(&self, phone: &str) -> String {
        if !self.config.redact_phones {
            phone.to_string()
        } else if self.config.hash_for_correlation {
            format!("PHONE[{}]", hash_value(phone))
        } else {
            redact_phone(phone)
        }
    }

    /// Render an email address for a log field
    pub fn email(&self, email: &str) -> String {
        if !self.config.redact_emails {
            email.to_string()
        } else if self.config.hash_for_correlation {
            format!("EMAIL[{}]", hash_value(email))
        } else {
            redact_email(email)
        }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = EMAIL_REGEX
                .replace_all(&result, |caps: &regex::Captures| self.email(&caps[0]))
                .to_string();
        }

        if self.config.redact_phones {
            result = MSISDN_REGEX
                .replace_all(&result, |caps: &regex::Captures| self.phone(&caps[0]))
                .to_string();
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }
}

/// Mask a phone number, keeping the country prefix and the last digits.
pub fn redact_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= PHONE_VISIBLE_DIGITS * 2 {
        return "***".to_string();
    }

    let masked = digits.len() - PHONE_VISIBLE_DIGITS * 2;
    let mut out = String::with_capacity(digits.len() + 1);
    if phone.trim_start().starts_with('+') {
        out.push('+');
    }
    out.extend(digits.iter().take(PHONE_VISIBLE_DIGITS));
    out.extend(std::iter::repeat('*').take(masked));
    out.extend(digits.iter().skip(PHONE_VISIBLE_DIGITS + masked));
    out
}

/// Mask an email address down to the first character of each side.
pub fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let l = local.chars().next().map(String::from).unwrap_or_default();
            let d = domain.chars().next().map(String::from).unwrap_or_default();
            format!("{l}***@{d}***")
        }
        None => "***@***".to_string(),
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    // First 8 bytes are enough for correlation
    general_purpose::STANDARD.encode(digest.get(..8).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_masking() {
        assert_eq!(redact_phone("+254700000123"), "+254******123");
        assert_eq!(redact_phone("0700000123"), "070****123");
        assert_eq!(redact_phone("12345"), "***");
    }

    #[test]
    fn test_email_masking() {
        assert_eq!(redact_email("john.doe@example.com"), "j***@e***");
        assert_eq!(redact_email("nonsense"), "***@***");
    }

    #[test]
    fn test_free_text_redaction() {
        let redactor = PiiRedactor::new(RedactionConfig::default());

        let text = "Welcome SMS to +254700000123 and mail to john.doe@example.com";
        let redacted = redactor.redact(text);
        assert!(redacted.contains("+254******123"));
        assert!(redacted.contains("j***@e***"));
        assert!(!redacted.contains("john.doe"));
    }

    #[test]
    fn test_hash_for_correlation_is_stable() {
        let redactor = PiiRedactor::new(RedactionConfig {
            hash_for_correlation: true,
            ..Default::default()
        });

        let a = redactor.redact("call +254700000123");
        let b = redactor.redact("call +254700000123");
        assert_eq!(a, b);
        assert!(a.contains("PHONE["));
    }

    #[test]
    fn test_field_redaction_follows_logger_config() {
        let masked = PiiRedactor::new(RedactionConfig::from(&crate::LoggerConfig::default()));
        assert_eq!(masked.phone("+254700000123"), "+254******123");
        assert_eq!(masked.email("john.doe@example.com"), "j***@e***");

        let plain = PiiRedactor::new(RedactionConfig::from(&crate::LoggerConfig {
            redaction_enabled: false,
            ..Default::default()
        }));
        assert_eq!(plain.phone("+254700000123"), "+254700000123");
        assert_eq!(plain.email("john.doe@example.com"), "john.doe@example.com");

        let hashed = PiiRedactor::new(RedactionConfig::from(&crate::LoggerConfig {
            hash_for_correlation: true,
            ..Default::default()
        }));
        let phone = hashed.phone("+254700000123");
        assert!(phone.starts_with("PHONE["));
        assert_eq!(phone, hashed.phone("+254700000123"));
        assert!(!phone.contains("700000"));
        assert!(hashed.email("john.doe@example.com").starts_with("EMAIL["));
    }

    #[test]
    fn test_custom_pattern() {
        let redactor = PiiRedactor::new(RedactionConfig {
            custom_patterns: vec![(Regex::new(r"\bMRN\d+").unwrap(), "MRN[REDACTED]".to_string())],
            ..Default::default()
        });
        assert_eq!(redactor.redact("record MRN123456"), "record MRN[REDACTED]");
    }
}
