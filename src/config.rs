//! Loading trainer configuration (prompts + optional problem bank) from TOML,
//! plus the environment-driven daily schedule.
//!
//! See `TrainerConfig`, `Prompts` and `Schedule` for expected schema.

use serde::Deserialize;
use tracing::{error, info, warn};

pub const DEFAULT_DAILY_HOUR: u32 = 9;
pub const DEFAULT_DAILY_MINUTE: u32 = 0;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TrainerConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub problems: Vec<ProblemCfg>,
}

/// Problem entry accepted in TOML configuration. Validated by the catalog at load time.
#[derive(Clone, Debug, Deserialize)]
pub struct ProblemCfg {
  #[serde(default)] pub id: Option<String>,
  pub alg: String,
  pub prompt: String,
  #[serde(default)] pub input: Vec<i64>,
  #[serde(default)] pub target: Option<i64>,
}

/// Prompts used by the OpenAI client.
/// Templates use `{key}` placeholders filled by `util::fill_template`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub approach_system: String,
  pub approach_user_template: String,
  pub explain_system: String,
  pub explain_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      approach_system: "You are an expert algorithms tutor. Judge the student's one-line approach for the problem. Return ONLY JSON: keys: approach_ok (true/false), feedback (short), detailed (optional).".into(),
      approach_user_template: "Problem: {prompt}\nInput: {input}\n{target_line}Expected: {expected}\nStudent answer: {answer}\nApproach: {approach}".into(),
      explain_system: "You are an expert algorithms tutor. Explain the optimal approach in at most 5 short lines. Plain text only.".into(),
      explain_user_template: "Problem: {prompt}\nInput: {input}\n{target_line}Expected answer: {expected}\nExplain how to get it.".into(),
    }
  }
}

/// Local time of the daily problem push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
  pub hour: u32,
  pub minute: u32,
}

impl Default for Schedule {
  fn default() -> Self {
    Self { hour: DEFAULT_DAILY_HOUR, minute: DEFAULT_DAILY_MINUTE }
  }
}

impl Schedule {
  /// Read DAILY_HOUR / DAILY_MINUTE; invalid values fall back to defaults.
  pub fn from_env() -> Self {
    let hour = std::env::var("DAILY_HOUR").ok();
    let minute = std::env::var("DAILY_MINUTE").ok();
    Self::from_values(hour.as_deref(), minute.as_deref())
  }

  pub fn from_values(hour: Option<&str>, minute: Option<&str>) -> Self {
    Self {
      hour: parse_bounded("DAILY_HOUR", hour, 23, DEFAULT_DAILY_HOUR),
      minute: parse_bounded("DAILY_MINUTE", minute, 59, DEFAULT_DAILY_MINUTE),
    }
  }
}

fn parse_bounded(name: &str, raw: Option<&str>, max: u32, default: u32) -> u32 {
  let Some(raw) = raw else { return default };
  match raw.trim().parse::<u32>() {
    Ok(v) if v <= max => v,
    _ => {
      warn!(target: "algo_trainer", var = name, value = raw, default, "Invalid schedule value; using default");
      default
    }
  }
}

/// Attempt to load `TrainerConfig` from TRAINER_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_trainer_config_from_env() -> Option<TrainerConfig> {
  let path = std::env::var("TRAINER_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_trainer_config(&s) {
      Ok(cfg) => {
        info!(target: "algo_trainer", %path, problems = cfg.problems.len(), "Loaded trainer config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "algo_trainer", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "algo_trainer", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_trainer_config(s: &str) -> Result<TrainerConfig, toml::de::Error> {
  toml::from_str::<TrainerConfig>(s)
}
