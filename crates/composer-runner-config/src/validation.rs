use crate::error::ConfigError;
use crate::model::Config;

const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                value: "must be greater than 0".to_string(),
            });
        }

        validate_installer_url(&self.installer.url)?;

        if let Some(digest) = &self.installer.sha384
            && (digest.len() != 96 || !digest.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(ConfigError::InvalidValue {
                key: "installer_sha384".to_string(),
                value: "must be 96 hexadecimal characters".to_string(),
            });
        }

        Ok(())
    }
}

/// HTTPS everywhere; plain HTTP is tolerated only for a loopback mirror.
fn validate_installer_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |value: &str| ConfigError::InvalidValue {
        key: "installer_url".to_string(),
        value: value.to_string(),
    };

    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| invalid("must be an absolute URL"))?;

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(invalid("is missing a host"));
    }

    match scheme.to_ascii_lowercase().as_str() {
        "https" => Ok(()),
        "http" if LOOPBACK_HOSTS.contains(&host_of(authority)) => Ok(()),
        "http" => Err(invalid("plain http is only allowed for loopback hosts")),
        _ => Err(invalid("must use https")),
    }
}

fn host_of(authority: &str) -> &str {
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    if authority.starts_with('[') {
        // IPv6 literal keeps its brackets
        return authority
            .find(']')
            .map_or(authority, |end| &authority[..=end]);
    }
    authority.split(':').next().unwrap_or(authority)
}
