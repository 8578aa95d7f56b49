use crate::application::binding_service::OutputFormat;
use crate::domain::number_format::{DecimalFormat, Locale};
use crate::domain::series::{SamplePolicy, TREND_LINE_COLOR};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct BindingConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_decimal_pattern")]
    pub decimal_pattern: String,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub sample_policy: SamplePolicy,
    #[serde(default = "default_trend_line_color")]
    pub trend_line_color: String,
    #[serde(default)]
    pub output: OutputFormat,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_decimal_pattern() -> String {
    "#.####".to_string()
}

fn default_trend_line_color() -> String {
    TREND_LINE_COLOR.to_string()
}

impl BindingConfig {
    pub fn decimal_format(&self) -> anyhow::Result<DecimalFormat> {
        Ok(DecimalFormat::parse(&self.decimal_pattern)?)
    }
}

/// Load `config/binding.{toml,...}` if present, then `BINDING_*` environment overrides.
pub fn load_binding_config() -> anyhow::Result<BindingConfig> {
    load_binding_config_from("config/binding")
}

pub fn load_binding_config_from(name: &str) -> anyhow::Result<BindingConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(false))
        .add_source(config::Environment::with_prefix("BINDING"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = load_binding_config_from("config/does-not-exist").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.decimal_pattern, "#.####");
        assert_eq!(config.locale, Locale::English);
        assert_eq!(config.sample_policy, SamplePolicy::Skip);
        assert_eq!(config.trend_line_color, "#999999");
        assert_eq!(config.output, OutputFormat::Table);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binding.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "data_dir = \"/srv/datasets\"\ndecimal_pattern = \"0.00\"\nlocale = \"nb\"\nsample_policy = \"fail-fast\"\ntrend_line_color = \"#6a6a6a\"\noutput = \"chart\""
        )
        .unwrap();

        let name = dir.path().join("binding");
        let config = load_binding_config_from(name.to_str().unwrap()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/datasets"));
        assert_eq!(config.locale, Locale::Norwegian);
        assert_eq!(config.sample_policy, SamplePolicy::FailFast);
        assert_eq!(config.trend_line_color, "#6a6a6a");
        assert_eq!(config.output, OutputFormat::Chart);
        assert_eq!(config.decimal_format().unwrap().max_fraction_digits(), 2);
    }
}
