use std::collections::BTreeMap;
use std::path::Path;

use crate::model::Config;

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "(unset)".to_string(), |p| p.display().to_string())
}

impl Config {
    /// Effective configuration as `key -> (value, source)`, sorted by key
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();
        let mut add = |key: &str, value: String| {
            let source = self.source_of(key).to_string();
            config.insert(key.to_string(), (value, source));
        };

        add("timeout_secs", self.runner.timeout_secs.to_string());
        add("search_ancestors", self.runner.search_ancestors.to_string());
        add("temp_dir", display_path(self.runner.temp_dir.as_deref()));
        add("working_dir", display_path(self.runner.working_dir.as_deref()));
        add("php_binary", display_path(self.php.binary.as_deref()));
        add("php_ini", display_path(self.php.ini.as_deref()));
        add("installer_url", self.installer.url.clone());
        add(
            "installer_sha384",
            self.installer
                .sha384
                .clone()
                .unwrap_or_else(|| "(unset)".to_string()),
        );

        config
    }
}

#[cfg(test)]
mod tests {
    use crate::model::ConfigSource;

    use super::*;

    #[test]
    fn test_effective_config_lists_every_key_with_source() {
        let mut config = Config::default();
        config.runner.timeout_secs = 60;
        config
            .source_attribution
            .insert("timeout_secs".to_string(), ConfigSource::Cli);

        let effective = config.effective_config();
        assert_eq!(effective.len(), 8);
        assert_eq!(
            effective["timeout_secs"],
            ("60".to_string(), "cli".to_string())
        );
        assert_eq!(
            effective["php_binary"],
            ("(unset)".to_string(), "default".to_string())
        );
        assert_eq!(
            effective["installer_url"].0,
            "https://getcomposer.org/installer"
        );
    }
}
