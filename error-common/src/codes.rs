// Standardized error codes for the RustCare Engine

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod lookup {
    pub const RESOURCE_NOT_FOUND: &str = "LOOKUP_1501";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const ACCOUNT_SUSPENDED: &str = "AUTH_2004";
}

pub mod authorization {
    pub const ACCESS_DENIED: &str = "AUTHZ_3001";
    pub const INSUFFICIENT_PERMISSIONS: &str = "AUTHZ_3002";
}

pub mod database {
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const CONSTRAINT_VIOLATION: &str = "DB_4003";
}

pub mod upstream {
    pub const OTP_PROVIDER: &str = "UPSTREAM_5001";
    pub const NOTIFICATION_PROVIDER: &str = "UPSTREAM_5002";
}

pub mod system {
    pub const REQUEST_CANCELLED: &str = "SYSTEM_9001";
    pub const INTERNAL: &str = "SYSTEM_9999";
}
