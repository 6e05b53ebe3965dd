// Stable error codes returned in HTTP error bodies and process exits.
// Codes are never reused once published.

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_IDENTIFIER: &str = "VALIDATION_1003";
}

pub mod backend {
    pub const UNAVAILABLE: &str = "BACKEND_2001";
    pub const REQUEST_FAILED: &str = "BACKEND_2002";
    pub const MALFORMED_RESPONSE: &str = "BACKEND_2003";
}

pub mod config {
    pub const INVALID_SETTINGS: &str = "CONFIG_4001";
}

pub mod server {
    pub const NOT_IMPLEMENTED: &str = "SERVER_5001";
    pub const INTERNAL: &str = "SERVER_5003";
    pub const STARTUP_FAILED: &str = "SERVER_5004";
}
