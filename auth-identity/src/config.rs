use crate::error::Result;
use crate::phone::normalize_msisdn;
use crypto::kdf::{Pbkdf2Params, MIN_SALT_LENGTH};
use logger_redacted::{LoggerConfig, LoggerError};
use serde::{Deserialize, Serialize};

/// Lowest PBKDF2 iteration count accepted by [`IdentityConfig::validate`]
pub const MIN_PIN_HASH_ITERATIONS: u32 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Exact number of digits a PIN must have
    #[serde(default = "default_pin_length")]
    pub pin_length: usize,

    /// PBKDF2-HMAC-SHA256 iterations used to derive stored PIN hashes
    #[serde(default = "default_pin_hash_iterations")]
    pub pin_hash_iterations: u32,

    /// Salt length in bytes for new PIN records
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,

    /// Country calling code applied to local numbers such as `07...`
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Digits after the default country code once any trunk `0` is removed
    #[serde(default = "default_subscriber_length")]
    pub subscriber_length: usize,

    /// Welcome SMS sent to new administrators; `{first_name}` and `{pin}` are substituted
    #[serde(default = "default_admin_welcome_sms")]
    pub admin_welcome_sms_template: String,

    #[serde(default = "default_admin_welcome_email_subject")]
    pub admin_welcome_email_subject: String,

    /// Welcome email body; same placeholders as the SMS template
    #[serde(default = "default_admin_welcome_email")]
    pub admin_welcome_email_template: String,

    /// Enables the purge path used by end-to-end test suites. Never on in production.
    #[serde(default)]
    pub allow_test_purge: bool,

    #[serde(default)]
    pub logging: LoggerConfig,
}

fn default_pin_length() -> usize {
    4
}

fn default_pin_hash_iterations() -> u32 {
    100_000
}

fn default_salt_length() -> usize {
    32
}

fn default_country_code() -> String {
    "254".to_string()
}

fn default_subscriber_length() -> usize {
    9
}

fn default_admin_welcome_sms() -> String {
    "Hi {first_name}, your RustCare admin account is ready. Use the one-time PIN {pin} to sign in and set your own PIN.".to_string()
}

fn default_admin_welcome_email_subject() -> String {
    "Welcome to RustCare Admin".to_string()
}

fn default_admin_welcome_email() -> String {
    "Hello {first_name},\n\nAn administrator account has been created for you. Sign in with the one-time PIN {pin}; you will be asked to choose a new PIN on first use.\n\nRustCare".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            pin_length: default_pin_length(),
            pin_hash_iterations: default_pin_hash_iterations(),
            salt_length: default_salt_length(),
            default_country_code: default_country_code(),
            subscriber_length: default_subscriber_length(),
            admin_welcome_sms_template: default_admin_welcome_sms(),
            admin_welcome_email_subject: default_admin_welcome_email_subject(),
            admin_welcome_email_template: default_admin_welcome_email(),
            allow_test_purge: false,
            logging: LoggerConfig::default(),
        }
    }
}

impl IdentityConfig {
    /// Load configuration from an optional file plus `IDENTITY__*` environment variables.
    ///
    /// Environment values override the file, e.g. `IDENTITY__PIN_LENGTH=6`.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("IDENTITY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: IdentityConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: IdentityConfig = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(4..=12).contains(&self.pin_length) {
            anyhow::bail!("pin_length must be between 4 and 12, got {}", self.pin_length);
        }
        if self.pin_hash_iterations < MIN_PIN_HASH_ITERATIONS {
            anyhow::bail!(
                "pin_hash_iterations must be at least {}, got {}",
                MIN_PIN_HASH_ITERATIONS,
                self.pin_hash_iterations
            );
        }
        if self.salt_length < MIN_SALT_LENGTH {
            anyhow::bail!("salt_length must be at least {} bytes", MIN_SALT_LENGTH);
        }
        let cc = &self.default_country_code;
        if cc.is_empty() || cc.len() > 3 || !cc.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("default_country_code must be 1-3 digits, got {:?}", cc);
        }
        if !(4..=12).contains(&self.subscriber_length) {
            anyhow::bail!(
                "subscriber_length must be between 4 and 12, got {}",
                self.subscriber_length
            );
        }
        Ok(())
    }

    pub fn pbkdf2_params(&self) -> Pbkdf2Params {
        Pbkdf2Params {
            iterations: self.pin_hash_iterations,
            salt_length: self.salt_length,
        }
    }

    /// Normalise a phone number against the configured country rules
    pub fn normalize_phone(&self, raw: &str) -> Result<String> {
        normalize_msisdn(raw, &self.default_country_code, self.subscriber_length)
    }

    /// Install the global tracing subscriber described by `logging`
    pub fn init_logging(&self) -> std::result::Result<(), LoggerError> {
        logger_redacted::init_logging(&self.logging)
    }

    /// Render one of the admin welcome templates
    pub fn render_welcome(template: &str, first_name: &str, pin: &str) -> String {
        template.replace("{first_name}", first_name).replace("{pin}", pin)
    }
}
