use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::render::RenderFormat;

pub const CONFIG_ENV: &str =
  "ERRAND_CONFIG";

pub const KEYS: [&str; 5] = [
  "message.duration_ms",
  "remote.latency_ms",
  "data.seed",
  "render.format",
  "render.color"
];

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct Config {
  pub message_duration: Duration,
  pub remote_latency:   Duration,
  pub seed_demo_tasks:  bool,
  pub render_format:    RenderFormat,
  pub color:            bool,
  pub loaded_file:      Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      message_duration: Duration::from_millis(2750),
      remote_latency:   Duration::from_millis(300),
      seed_demo_tasks:  true,
      render_format:    RenderFormat::Text,
      color:            true,
      loaded_file:      None
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
  message: MessageSection,
  remote:  RemoteSection,
  data:    DataSection,
  render:  RenderSection
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MessageSection {
  duration_ms: Option<u64>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RemoteSection {
  latency_ms: Option<u64>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DataSection {
  seed: Option<bool>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RenderSection {
  format: Option<RenderFormat>,
  color:  Option<bool>
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let path = resolve_config_path(
      config_override
    );
    let Some(path) = path else {
      warn!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg =
      Self::from_toml_str(&text)
        .with_context(|| {
          format!(
            "invalid config file {}",
            path.display()
          )
        })?;
    cfg.loaded_file = Some(path);
    Ok(cfg)
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let file: ConfigFile =
      toml::from_str(text)?;
    let mut cfg = Self::default();

    if let Some(ms) =
      file.message.duration_ms
    {
      cfg.message_duration =
        Duration::from_millis(ms);
    }
    if let Some(ms) =
      file.remote.latency_ms
    {
      cfg.remote_latency =
        Duration::from_millis(ms);
    }
    if let Some(seed) = file.data.seed {
      cfg.seed_demo_tasks = seed;
    }
    if let Some(format) =
      file.render.format
    {
      cfg.render_format = format;
    }
    if let Some(color) =
      file.render.color
    {
      cfg.color = color;
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.set(&key, &v)?;
    }
    Ok(())
  }

  pub fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    match key {
      | "message.duration_ms" => {
        self.message_duration =
          Duration::from_millis(
            parse_millis(key, value)?
          );
      }
      | "remote.latency_ms" => {
        self.remote_latency =
          Duration::from_millis(
            parse_millis(key, value)?
          );
      }
      | "data.seed" => {
        self.seed_demo_tasks =
          parse_bool(key, value)?;
      }
      | "render.format" => {
        self.render_format =
          value.parse()?;
      }
      | "render.color" => {
        self.color =
          parse_bool(key, value)?;
      }
      | other => {
        return Err(anyhow!(
          "unknown config key: \
           {other} (known: {})",
          KEYS.join(", ")
        ));
      }
    }
    Ok(())
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) =
    std::env::var(CONFIG_ENV)
  {
    if env_path == "/dev/null" {
      return None;
    }
    return Some(PathBuf::from(
      env_path
    ));
  }

  let candidate = dirs::config_dir()?
    .join("errand")
    .join("config.toml");
  candidate
    .exists()
    .then_some(candidate)
}

fn parse_millis(
  key: &str,
  value: &str
) -> anyhow::Result<u64> {
  value.trim().parse().with_context(
    || {
      format!(
        "{key} expects milliseconds, \
         got {value:?}"
      )
    }
  )
}

fn parse_bool(
  key: &str,
  value: &str
) -> anyhow::Result<bool> {
  match value
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Ok(true),
    | "0" | "n" | "no" | "off"
    | "false" => Ok(false),
    | _ => {
      Err(anyhow!(
        "{key} expects a boolean, got \
         {value:?}"
      ))
    }
  }
}
