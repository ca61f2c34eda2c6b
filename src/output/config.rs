use std::env;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

static FORCED_FORMAT: OnceLock<OutputFormat> = OnceLock::new();

/// Pin the format for the rest of the process (the `--json` flag). First call wins.
pub fn force_format(format: OutputFormat) {
    let _ = FORCED_FORMAT.set(format);
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let env_format = env::var("RECIPES_OUTPUT_FORMAT").ok();
        let pretty = env::var("RECIPES_OUTPUT_PRETTY").ok();
        Self::resolve(FORCED_FORMAT.get().copied(), env_format.as_deref(), pretty.as_deref())
    }

    fn resolve(forced: Option<OutputFormat>, format: Option<&str>, pretty: Option<&str>) -> Self {
        let format = forced.unwrap_or(match format {
            Some(f) if f.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        });
        let pretty = matches!(pretty, Some(v) if v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"));
        OutputConfig { format, pretty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_text() {
        let cfg = OutputConfig::resolve(None, None, None);
        assert_eq!(cfg, OutputConfig { format: OutputFormat::Text, pretty: false });
    }

    #[test]
    fn reads_format_and_pretty() {
        let cfg = OutputConfig::resolve(None, Some("JSON"), Some("yes"));
        assert_eq!(cfg, OutputConfig { format: OutputFormat::Json, pretty: true });
        assert_eq!(OutputConfig::resolve(None, Some("xml"), Some("0")).format, OutputFormat::Text);
    }

    #[test]
    fn forced_format_wins() {
        let cfg = OutputConfig::resolve(Some(OutputFormat::Json), Some("text"), None);
        assert_eq!(cfg.format, OutputFormat::Json);
    }
}
