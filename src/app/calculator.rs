use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use rust_decimal::Decimal;
use time::Time;

pub const AVERAGE_WORKING_DAYS_PER_MONTH: i64 = 22;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct TimeEntry {
    pub hours: u8,
    pub minutes: u8,
}

impl TimeEntry {
    fn minutes_of_day(&self) -> i64 {
        i64::from(self.hours) * 60 + i64::from(self.minutes)
    }
}

/// Daily window during which income accrues, `from` inclusive, `to` exclusive.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct WorkingHours {
    pub from: TimeEntry,
    pub to: TimeEntry,
}

impl WorkingHours {
    /// Unset or unparseable working hours.
    pub const EMPTY: WorkingHours = WorkingHours {
        from: TimeEntry {
            hours: 0,
            minutes: 0,
        },
        to: TimeEntry {
            hours: 0,
            minutes: 0,
        },
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn total_working_hours(&self) -> Decimal {
        let hours = Decimal::from(i64::from(self.to.hours) - i64::from(self.from.hours));
        let minutes = Decimal::from(i64::from(self.to.minutes) - i64::from(self.from.minutes));

        hours + minutes / Decimal::new(60, 0)
    }

    pub fn total_working_seconds(&self) -> i64 {
        (self.to.minutes_of_day() - self.from.minutes_of_day()) * 60
    }
}

impl FromStr for WorkingHours {
    type Err = anyhow::Error;

    /// Accepts exactly `HH:MM-HH:MM`, the hour tens digit in 0-2 and the minute tens digit in 0-5.
    fn from_str(raw: &str) -> Result<Self> {
        let mismatch = || anyhow!("working hours must look like HH:MM-HH:MM, got {raw:?}");

        let (from, to) = raw.split_once('-').ok_or_else(mismatch)?;
        let from = parse_time_entry(from).ok_or_else(mismatch)?;
        let to = parse_time_entry(to).ok_or_else(mismatch)?;

        Ok(Self { from, to })
    }
}

impl Display for WorkingHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.from.hours, self.from.minutes, self.to.hours, self.to.minutes
        )
    }
}

fn parse_time_entry(raw: &str) -> Option<TimeEntry> {
    let (hours, minutes) = raw.split_once(':')?;

    Some(TimeEntry {
        hours: two_digits(hours, 2)?,
        minutes: two_digits(minutes, 5)?,
    })
}

fn two_digits(raw: &str, max_tens: u8) -> Option<u8> {
    match raw.as_bytes() {
        &[tens @ b'0'..=b'9', ones @ b'0'..=b'9'] if tens - b'0' <= max_tens => {
            Some((tens - b'0') * 10 + (ones - b'0'))
        }
        _ => None,
    }
}

/// Parses working hours, falling back to [`WorkingHours::EMPTY`] on any mismatch.
pub fn parse_working_hours(raw: &str) -> WorkingHours {
    raw.parse().unwrap_or(WorkingHours::EMPTY)
}

pub fn force_to_int(value: &str) -> i64 {
    value.parse().unwrap_or(0)
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Salary {
    pub yearly: i64,
    pub monthly: Decimal,
    pub daily: Decimal,
    pub hourly: Decimal,
    pub secondly: Decimal,
}

pub fn calculate_income(yearly: i64, hours: &WorkingHours) -> Result<Salary> {
    let total_hours = hours.total_working_hours();
    if total_hours <= Decimal::ZERO {
        bail!("working hours must end after they start: {hours}")
    }

    let monthly = Decimal::from(yearly) / Decimal::new(12, 0);
    let daily = monthly / Decimal::from(AVERAGE_WORKING_DAYS_PER_MONTH);
    let hourly = daily / total_hours;
    let secondly = hourly / Decimal::new(3600, 0);

    Ok(Salary {
        yearly,
        monthly,
        daily,
        hourly,
        secondly,
    })
}

/// Money earned by `now`, zero before the window opens and capped at the full day once it closes.
pub fn earned_today(salary: &Salary, hours: &WorkingHours, now: Time) -> Decimal {
    let hour = i64::from(now.hour());
    if hour < i64::from(hours.from.hours) {
        return Decimal::ZERO;
    }

    let total = hours.total_working_seconds();
    let worked = if hour >= i64::from(hours.to.hours) {
        total
    } else {
        let now_seconds = hour * 3600 + i64::from(now.minute()) * 60 + i64::from(now.second());
        let elapsed = now_seconds - hours.from.minutes_of_day() * 60;
        elapsed.max(0)
    };

    Decimal::from(worked) * salary.secondly
}
