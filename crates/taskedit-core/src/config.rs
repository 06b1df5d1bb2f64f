use std::collections::HashMap;
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
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::dialog::DialogSettings;

const DEFAULTS: [(&str, &str); 6] = [
  ("api.base_url", "http://localhost:1337/api"),
  ("api.resource", "tasks"),
  ("api.timeout", "30"),
  ("cache.tag", "tasks"),
  ("toast.success.life", "3000"),
  ("toast.failure.life", "6000")
];

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

/// Where the records API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
  pub base_url: String,
  pub resource: String,
  pub timeout:  Duration
}

impl ApiSettings {
  /// `{base_url}/{resource}` without
  /// doubled slashes.
  pub fn resource_url(&self) -> String {
    format!(
      "{}/{}",
      self.base_url.trim_end_matches('/'),
      self.resource.trim_matches('/')
    )
  }

  pub fn record_url(
    &self,
    id: u64
  ) -> String {
    format!("{}/{id}", self.resource_url())
  }
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:1337/api"
        .to_string(),
      resource: "tasks".to_string(),
      timeout:  Duration::from_secs(30)
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::defaults()
  }
}

impl Config {
  pub fn defaults() -> Self {
    Config {
      map:          DEFAULTS
        .iter()
        .map(|(k, v)| {
          (k.to_string(), v.to_string())
        })
        .collect(),
      loaded_files: vec![]
    }
  }

  /// Defaults, then the rc file if one
  /// resolves.
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::defaults();

    let rc = resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading taskeditrc");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no taskeditrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
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
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_u64(
    &self,
    key: &str
  ) -> anyhow::Result<Option<u64>> {
    self
      .map
      .get(key)
      .map(|raw| {
        raw.trim().parse::<u64>().with_context(
          || {
            format!(
              "config key {key} must be \
               a non-negative integer, \
               got {raw:?}"
            )
          }
        )
      })
      .transpose()
  }

  pub fn api_settings(
    &self
  ) -> anyhow::Result<ApiSettings> {
    let defaults = ApiSettings::default();
    let base_url = self
      .get("api.base_url")
      .filter(|v| !v.trim().is_empty())
      .unwrap_or(defaults.base_url);
    let resource = self
      .get("api.resource")
      .filter(|v| !v.trim().is_empty())
      .unwrap_or(defaults.resource);
    let timeout = self
      .get_u64("api.timeout")?
      .map(Duration::from_secs)
      .unwrap_or(defaults.timeout);

    Ok(ApiSettings {
      base_url,
      resource,
      timeout
    })
  }

  pub fn dialog_settings(
    &self
  ) -> anyhow::Result<DialogSettings> {
    let defaults = DialogSettings::default();
    let cache_tag = self
      .get("cache.tag")
      .filter(|v| !v.trim().is_empty())
      .unwrap_or(defaults.cache_tag);
    let success_life = self
      .get_u64("toast.success.life")?
      .map(Duration::from_millis)
      .unwrap_or(defaults.success_life);
    let failure_life = self
      .get_u64("toast.failure.life")?
      .map(Duration::from_millis)
      .unwrap_or(defaults.failure_life);

    Ok(DialogSettings {
      cache_tag,
      success_life,
      failure_life
    })
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let line = raw_line
        .split_once('#')
        .map_or(raw_line, |(before, _)| {
          before
        })
        .trim();
      if line.is_empty() {
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      if key.is_empty() {
        return Err(anyhow!(
          "empty key at {}:{}",
          path.display(),
          line_num + 1
        ));
      }
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("TASKEDITRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(rc_env)));
  }

  let Some(home) = dirs::home_dir() else {
    debug!("no home directory; skipping ~/.taskeditrc");
    return Ok(None);
  };
  let candidate = home.join(".taskeditrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::{
    ApiSettings,
    Config
  };

  #[test]
  fn defaults_cover_every_setting() {
    let cfg = Config::defaults();
    let api =
      cfg.api_settings().expect("api");
    assert_eq!(api, ApiSettings::default());
    assert_eq!(
      api.record_url(7),
      "http://localhost:1337/api/tasks/7"
    );

    let dialog = cfg
      .dialog_settings()
      .expect("dialog");
    assert_eq!(dialog.cache_tag, "tasks");
    assert_eq!(
      dialog.failure_life,
      Duration::from_millis(6000)
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([
      (
        "rc.api.base_url".to_string(),
        "https://records.example/api/"
          .to_string()
      ),
      (
        "api.resource".to_string(),
        "/jobs/".to_string()
      )
    ]);
    let api =
      cfg.api_settings().expect("api");
    assert_eq!(
      api.resource_url(),
      "https://records.example/api/jobs"
    );
  }

  #[test]
  fn rejects_non_numeric_lifetimes() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "toast.success.life".to_string(),
      "soon".to_string()
    )]);
    assert!(cfg.dialog_settings().is_err());
  }
}
