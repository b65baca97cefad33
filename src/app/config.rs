use std::env;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Result};
use log::warn;

pub const SALARY_VAR: &str = "PAYDAY_SALARY";
pub const HOURS_VAR: &str = "PAYDAY_HOURS";
pub const INPUT_STYLE_VAR: &str = "PAYDAY_INPUT_STYLE";
pub const TICK_MS_VAR: &str = "PAYDAY_TICK_MS";

pub struct Config {
    pub title: String,
    pub salary: String,
    pub hours: String,
    pub input_style: InputStyle,
    pub tick: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Payday motivator".to_owned(),
            salary: "25000".to_owned(),
            hours: "08:00-17:00".to_owned(),
            input_style: InputStyle::default(),
            tick: Duration::from_secs(1),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Applies overrides found by `lookup` on top of the defaults; bad values are logged and skipped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(salary) = lookup(SALARY_VAR) {
            cfg.salary = salary;
        }
        if let Some(hours) = lookup(HOURS_VAR) {
            cfg.hours = hours;
        }
        if let Some(style) = lookup(INPUT_STYLE_VAR) {
            match style.parse() {
                Ok(style) => cfg.input_style = style,
                Err(e) => warn!("ignoring {INPUT_STYLE_VAR}: {e}"),
            }
        }
        if let Some(tick) = lookup(TICK_MS_VAR) {
            match tick.parse::<u64>() {
                Ok(ms) if ms > 0 => cfg.tick = Duration::from_millis(ms),
                _ => warn!("ignoring {TICK_MS_VAR}: {tick:?} is not a positive number of milliseconds"),
            }
        }

        cfg
    }
}

/// How the salary and working hours are collected.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputStyle {
    /// Form inside the main window, result shown as rich text.
    #[default]
    Form,
    /// Modal dialog, result shown as a plain label.
    Dialog,
}

impl FromStr for InputStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "form" => Ok(InputStyle::Form),
            "dialog" => Ok(InputStyle::Dialog),
            other => bail!("unknown input style {other:?}, expected \"form\" or \"dialog\""),
        }
    }
}

impl Display for InputStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputStyle::Form => write!(f, "form"),
            InputStyle::Dialog => write!(f, "dialog"),
        }
    }
}
