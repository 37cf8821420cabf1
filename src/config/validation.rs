//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs
//! - Validate value ranges (timeouts > 0, cache sizes)
//! - Check cross-section requirements (Alist rules need an Alist section)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::strm::StrmKind;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid URL ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("strm.extension: '{0}' must be non-empty and start with '.'")]
    InvalidExtension(String),

    #[error("strm.rules[{index}].prefix: '{prefix}' must be non-empty and start with '/'")]
    InvalidPrefix { index: usize, prefix: String },

    #[error("strm.rules[{0}]: alist_strm rule is enabled but [alist] is not configured")]
    MissingAlist(usize),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("admin.api_key must not be empty when admin is enabled")]
    EmptyAdminKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);

    match Url::parse(&config.origin.url) {
        Ok(url) if url.scheme() != "http" => errors.push(ValidationError::InvalidUrl {
            field: "origin.url",
            value: config.origin.url.clone(),
            reason: "only http origins are supported".to_string(),
        }),
        Ok(url) if url.host_str().is_none() => errors.push(ValidationError::InvalidUrl {
            field: "origin.url",
            value: config.origin.url.clone(),
            reason: "missing host".to_string(),
        }),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field: "origin.url",
            value: config.origin.url.clone(),
            reason: e.to_string(),
        }),
    }

    let extension = &config.strm.extension;
    if extension.len() < 2 || !extension.starts_with('.') {
        errors.push(ValidationError::InvalidExtension(extension.clone()));
    }

    for (index, rule) in config.strm.rules.iter().enumerate() {
        if !rule.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                index,
                prefix: rule.prefix.clone(),
            });
        }
        if rule.enabled && rule.kind == StrmKind::AlistStrm && config.alist.is_none() {
            errors.push(ValidationError::MissingAlist(index));
        }
    }

    if let Some(alist) = &config.alist {
        if let Err(e) = Url::parse(&alist.url) {
            errors.push(ValidationError::InvalidUrl {
                field: "alist.url",
                value: alist.url.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.metadata_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.metadata_secs"));
    }

    if (config.cache.image || config.cache.subtitle) && config.cache.max_entries == 0 {
        errors.push(ValidationError::Zero("cache.max_entries"));
    }

    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if config.admin.enabled {
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::EmptyAdminKey);
        }
        check_address("admin.bind_address", &config.admin.bind_address, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{AlistConfig, StrmRuleConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_alist_rule_requires_alist_section() {
        let mut config = GatewayConfig::default();
        config.strm.rules.push(StrmRuleConfig {
            prefix: "/strm/alist/".into(),
            kind: StrmKind::AlistStrm,
            enabled: true,
        });
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MissingAlist(0)])
        );

        config.alist = Some(AlistConfig::default());
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_disabled_alist_rule_is_fine() {
        let mut config = GatewayConfig::default();
        config.strm.rules.push(StrmRuleConfig {
            prefix: "/strm/alist/".into(),
            kind: StrmKind::AlistStrm,
            enabled: false,
        });
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.origin.url = "https://secure.example".into();
        config.strm.rules.push(StrmRuleConfig {
            prefix: "strm/".into(),
            kind: StrmKind::HttpStrm,
            enabled: true,
        });
        config.timeouts.metadata_secs = 0;
        config.admin.enabled = true;
        config.admin.api_key.clear();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero("timeouts.metadata_secs")));
        assert!(errors.contains(&ValidationError::EmptyAdminKey));
    }
}
