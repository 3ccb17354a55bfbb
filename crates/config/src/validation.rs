use std::net::SocketAddr;

use crate::ConfigResult;

/// Trait for configuration validation
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// General validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// Validate that an interval lies within 1..=86400 seconds
    pub fn validate_interval_seconds(seconds: u64, field_name: &str) -> ConfigResult<()> {
        if seconds == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if seconds > 86_400 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be less than or equal to 86400"
            )));
        }
        Ok(())
    }

    /// Validate that a value is one of the allowed options
    pub fn validate_one_of(value: &str, allowed: &[&str], field_name: &str) -> ConfigResult<()> {
        if !allowed.contains(&value) {
            return Err(crate::ConfigError::Validation(format!(
                "Invalid {field_name}: {value}. Valid options: {allowed:?}"
            )));
        }
        Ok(())
    }

    /// Validate that a bind address parses as host:port
    pub fn validate_socket_addr(value: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(value, field_name)?;
        value.parse::<SocketAddr>().map_err(|e| {
            crate::ConfigError::Validation(format!("{field_name} is not a valid address: {e}"))
        })?;
        Ok(())
    }
}
