use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular consumer account
    Consumer,
    /// Internal staff / administrator
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioData {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
}

impl BioData {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    /// Auth identity this profile is bound to
    pub uid: String,
    /// Normalised MSISDN, unique across profiles
    pub primary_phone: String,
    pub primary_email: Option<String>,
    pub bio_data: BioData,
    pub role: UserRole,
    pub permissions: BTreeSet<String>,
    pub role_ids: Vec<String>,
    pub suspended: bool,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Stored PIN credential. Never holds the raw PIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub hashed_pin: String,
    pub salt: String,
    /// PBKDF2 iterations the hash was derived with; verification reuses them
    pub iterations: u32,
    /// System-issued one-time PIN that must be changed on first use
    pub is_temporary: bool,
    /// False once a newer record supersedes this one
    pub valid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationSettings {
    pub profile_id: Uuid,
    pub allow_whatsapp: bool,
    pub allow_text_sms: bool,
    pub allow_push: bool,
    pub allow_email: bool,
}

impl CommunicationSettings {
    /// Every channel enabled, as at account creation
    pub fn all_enabled(profile_id: Uuid) -> Self {
        Self {
            profile_id,
            allow_whatsapp: true,
            allow_text_sms: true,
            allow_push: true,
            allow_email: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierProfile {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub supplier_name: String,
    pub is_organisation_verified: bool,
    pub has_been_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: Uuid,
    pub profile_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub uid: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentials {
    pub uid: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub permissions: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationAction {
    pub title: String,
    pub route: String,
    pub required_permission: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct CreateAccountInput {
    pub phone: String,
    pub otp: String,
    pub pin: String,
    pub bio_data: BioData,
    pub email: Option<String>,
    pub role_ids: Option<Vec<String>>,
}

impl fmt::Debug for CreateAccountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAccountInput")
            .field("phone", &logger_redacted::redact_phone(&self.phone))
            .field("otp", &"[REDACTED]")
            .field("pin", &"[REDACTED]")
            .field("bio_data", &self.bio_data)
            .field("role_ids", &self.role_ids)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub profile: UserProfile,
    pub communication_settings: CommunicationSettings,
    pub credentials: AuthCredentials,
    pub roles: Vec<Role>,
    pub navigation: Vec<NavigationAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAdminInput {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub profile: UserProfile,
    /// Current credential is a pending one-time PIN
    pub resend_pin: bool,
}

/// Result of a PIN reset or change; carries the stored hash, never the raw PIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinUpdate {
    pub profile_id: Uuid,
    pub hashed_pin: String,
}

/// Successful PIN verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinCheck {
    pub profile_id: Uuid,
    /// The PIN used was system-issued and must be changed
    pub is_temporary: bool,
}

/// A freshly issued temporary PIN, kept in memory only long enough to notify the user
pub struct TemporaryPin {
    pub profile_id: Uuid,
    pub pin: Zeroizing<String>,
}

impl fmt::Debug for TemporaryPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryPin")
            .field("profile_id", &self.profile_id)
            .field("pin", &"[REDACTED]")
            .finish()
    }
}
