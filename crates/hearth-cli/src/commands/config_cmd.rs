//! `hearth config` -- display resolved configuration.
//!
//! # Examples
//!
//! ```text
//! hearth config show
//! hearth config show --toml
//! hearth config section context
//! ```

use hearth_types::config::HearthConfig;

/// Render the configuration as pretty JSON or TOML.
pub fn render(config: &HearthConfig, as_toml: bool) -> anyhow::Result<String> {
    if as_toml {
        Ok(toml::to_string_pretty(config)?)
    } else {
        Ok(serde_json::to_string_pretty(config)?)
    }
}

/// Display the resolved configuration.
pub fn config_show(config: &HearthConfig, as_toml: bool) {
    match render(config, as_toml) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: failed to serialize config: {e}"),
    }
}

/// Display one configuration section.
pub fn config_section(config: &HearthConfig, section: &str) {
    let value = serde_json::to_value(config).unwrap_or_default();
    match value.get(section) {
        Some(v) => match serde_json::to_string_pretty(v) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: failed to serialize section: {e}"),
        },
        None => {
            let available: Vec<&str> = value
                .as_object()
                .map(|m| m.keys().map(|k| k.as_str()).collect())
                .unwrap_or_default();
            eprintln!("error: unknown section '{section}'");
            eprintln!("available sections: {}", available.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_and_toml_render() {
        let config = HearthConfig::default();
        let json = render(&config, false).unwrap();
        assert!(json.contains("\"history_window\": 50"));
        let toml = render(&config, true).unwrap();
        assert!(toml.contains("[context]"));
        assert!(toml.contains("history_window = 50"));
    }

    #[test]
    fn rendered_toml_loads_back() {
        let config = HearthConfig::default();
        let toml = render(&config, true).unwrap();
        let parsed = HearthConfig::parse(&toml, std::path::Path::new("c.toml")).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn config_section_does_not_panic() {
        let config = HearthConfig::default();
        config_section(&config, "classifier");
        config_section(&config, "nope");
    }
}
