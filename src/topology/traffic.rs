// ABOUTME: Traffic shifting policy for blue/green cutover.
// ABOUTME: Parses CodeDeploy predefined config names and expands them into a shift schedule.

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const CODEDEPLOY_PREFIX: &str = "CodeDeployDefault.ECS";

/// How traffic moves from the blue to the green target group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficShift {
    AllAtOnce,
    /// Shift `percent` of traffic at the start and again after every interval.
    Linear { percent: u8, every: Duration },
    /// Shift `percent` first, then the remainder once `after` has elapsed.
    Canary { percent: u8, after: Duration },
}

impl Default for TrafficShift {
    fn default() -> Self {
        TrafficShift::Linear {
            percent: 10,
            every: Duration::from_secs(60),
        }
    }
}

/// Cumulative share of production traffic on green at a point in the rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftStep {
    #[serde(with = "humantime_serde")]
    pub at: Duration,
    pub percent: u8,
}

impl TrafficShift {
    pub fn linear(percent: u8, every_minutes: u64) -> Result<Self, String> {
        let shift = TrafficShift::Linear {
            percent,
            every: Duration::from_secs(every_minutes * 60),
        };
        shift.check().map(|_| shift)
    }

    pub fn canary(percent: u8, after_minutes: u64) -> Result<Self, String> {
        let shift = TrafficShift::Canary {
            percent,
            after: Duration::from_secs(after_minutes * 60),
        };
        shift.check().map(|_| shift)
    }

    /// Check percent and interval bounds.
    pub fn check(&self) -> Result<(), String> {
        let (percent, interval) = match *self {
            TrafficShift::AllAtOnce => return Ok(()),
            TrafficShift::Linear { percent, every } => (percent, every),
            TrafficShift::Canary { percent, after } => (percent, after),
        };

        if !(1..=99).contains(&percent) {
            return Err(format!("percent must be between 1 and 99, got {percent}"));
        }
        if interval.is_zero() || interval.as_secs() % 60 != 0 || interval.subsec_nanos() != 0 {
            return Err(format!(
                "interval must be a positive whole number of minutes, got {}s",
                interval.as_secs_f64()
            ));
        }
        Ok(())
    }

    /// Cumulative traffic on green at each shift, ending at 100.
    pub fn schedule(&self) -> Vec<ShiftStep> {
        match *self {
            TrafficShift::AllAtOnce => vec![ShiftStep {
                at: Duration::ZERO,
                percent: 100,
            }],
            TrafficShift::Linear { percent, every } => {
                let percent = percent.max(1);
                let mut steps = Vec::new();
                let mut shifted: u8 = 0;
                let mut at = Duration::ZERO;
                while shifted < 100 {
                    shifted = shifted.saturating_add(percent).min(100);
                    steps.push(ShiftStep {
                        at,
                        percent: shifted,
                    });
                    at += every;
                }
                steps
            }
            TrafficShift::Canary { percent, after } => vec![
                ShiftStep {
                    at: Duration::ZERO,
                    percent,
                },
                ShiftStep {
                    at: after,
                    percent: 100,
                },
            ],
        }
    }

    /// Time from the first shift until all traffic is on green.
    pub fn total_duration(&self) -> Duration {
        self.schedule()
            .last()
            .map(|s| s.at)
            .unwrap_or(Duration::ZERO)
    }
}

impl FromStr for TrafficShift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let shift = if s.contains('_') || s.chars().all(|c| !c.is_ascii_lowercase()) {
            parse_constant_name(s)
        } else {
            parse_codedeploy_name(s.strip_prefix(CODEDEPLOY_PREFIX).unwrap_or(s))
        }
        .ok_or_else(|| format!("unknown traffic shift policy: {s}"))?;

        shift
            .check()
            .map(|_| shift)
            .map_err(|reason| format!("{s}: {reason}"))
    }
}

/// `AllAtOnce`, `Linear10PercentEvery1Minutes`, `Canary10Percent5Minutes`.
fn parse_codedeploy_name(s: &str) -> Option<TrafficShift> {
    if s == "AllAtOnce" {
        return Some(TrafficShift::AllAtOnce);
    }
    if let Some(rest) = s.strip_prefix("Linear") {
        let (percent, rest) = take_number(rest)?;
        let (minutes, rest) = take_number(rest.strip_prefix("PercentEvery")?)?;
        return minutes_suffix(rest).then(|| linear_unchecked(percent, minutes))?;
    }
    if let Some(rest) = s.strip_prefix("Canary") {
        let (percent, rest) = take_number(rest)?;
        let (minutes, rest) = take_number(rest.strip_prefix("Percent")?)?;
        return minutes_suffix(rest).then(|| canary_unchecked(percent, minutes))?;
    }
    None
}

/// `ALL_AT_ONCE`, `LINEAR_10PERCENT_EVERY_1MINUTES`, `CANARY_10PERCENT_5MINUTES`.
fn parse_constant_name(s: &str) -> Option<TrafficShift> {
    let parts: Vec<&str> = s.split('_').collect();
    match parts.as_slice() {
        ["ALL", "AT", "ONCE"] => Some(TrafficShift::AllAtOnce),
        ["LINEAR", percent, "EVERY", minutes] => {
            let (percent, rest) = take_number(percent)?;
            let (minutes, tail) = take_number(minutes)?;
            (rest == "PERCENT" && matches!(tail, "MINUTE" | "MINUTES"))
                .then(|| linear_unchecked(percent, minutes))?
        }
        ["CANARY", percent, minutes] => {
            let (percent, rest) = take_number(percent)?;
            let (minutes, tail) = take_number(minutes)?;
            (rest == "PERCENT" && matches!(tail, "MINUTE" | "MINUTES"))
                .then(|| canary_unchecked(percent, minutes))?
        }
        _ => None,
    }
}

fn take_number(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

fn minutes_suffix(s: &str) -> bool {
    matches!(s, "Minute" | "Minutes")
}

fn linear_unchecked(percent: u64, minutes: u64) -> Option<TrafficShift> {
    Some(TrafficShift::Linear {
        percent: u8::try_from(percent).ok()?,
        every: Duration::from_secs(minutes.checked_mul(60)?),
    })
}

fn canary_unchecked(percent: u64, minutes: u64) -> Option<TrafficShift> {
    Some(TrafficShift::Canary {
        percent: u8::try_from(percent).ok()?,
        after: Duration::from_secs(minutes.checked_mul(60)?),
    })
}

impl fmt::Display for TrafficShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficShift::AllAtOnce => write!(f, "{CODEDEPLOY_PREFIX}AllAtOnce"),
            TrafficShift::Linear { percent, every } => write!(
                f,
                "{CODEDEPLOY_PREFIX}Linear{}PercentEvery{}Minutes",
                percent,
                every.as_secs() / 60
            ),
            TrafficShift::Canary { percent, after } => write!(
                f,
                "{CODEDEPLOY_PREFIX}Canary{}Percent{}Minutes",
                percent,
                after.as_secs() / 60
            ),
        }
    }
}

impl Serialize for TrafficShift {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TrafficShift {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
