//! Decides from the feed's relative timestamp ("3 horas", "2 dias",
//! "12 de março às 14:00") whether the last post can hold today's menu.
//!
//! Unit vocabulary is the Portuguese one the feed renders; singular and plural
//! forms are treated alike, so "1 dia" is open and "2 dia" is closed. Weeks,
//! months and years are always closed, and so is any unit not listed here.

use crate::config::settings::FreshnessConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
    Other,
}

impl TimeUnit {
    fn parse(raw: &str) -> Self {
        match raw.trim_end_matches('.').to_lowercase().as_str() {
            "s" | "seg" | "segundo" | "segundos" | "m" | "min" | "mins" | "minuto" | "minutos" => {
                Self::Minutes
            }
            "h" | "hora" | "horas" => Self::Hours,
            "d" | "dia" | "dias" => Self::Days,
            "sem" | "semana" | "semanas" => Self::Weeks,
            "mês" | "mes" | "meses" => Self::Months,
            "a" | "ano" | "anos" => Self::Years,
            _ => Self::Other,
        }
    }
}

/// Splits a compact stamp such as "5h" or "2d" into amount and unit.
fn split_compact(token: &str) -> Option<(&str, &str)> {
    let at = token.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = token.split_at(at);
    (!amount.is_empty()).then_some((amount, unit))
}

pub struct FreshnessClassifier {
    policy: FreshnessConfig,
}

impl FreshnessClassifier {
    pub fn new(policy: FreshnessConfig) -> Self {
        Self { policy }
    }

    /// `None` when there is no timestamp to judge; callers treat that as a
    /// failure rather than guessing.
    pub fn classify(&self, stamp: &str) -> Option<Freshness> {
        let tokens: Vec<&str> = stamp.split_whitespace().collect();

        let (amount, unit) = match tokens.as_slice() {
            [] => return None,
            [single] => match split_compact(single) {
                Some(parts) => parts,
                None => return Some(Freshness::Closed),
            },
            [amount, unit] => (*amount, *unit),
            // calendar format, e.g. "12 de março às 14:00"
            _ => return Some(Freshness::Closed),
        };

        let Ok(amount) = amount.parse::<u32>() else {
            return Some(Freshness::Closed);
        };

        let closed = match TimeUnit::parse(unit) {
            TimeUnit::Days => amount >= self.policy.closed_after_days,
            TimeUnit::Hours => amount >= self.policy.closed_after_hours,
            TimeUnit::Minutes => false,
            TimeUnit::Weeks | TimeUnit::Months | TimeUnit::Years | TimeUnit::Other => true,
        };

        Some(if closed {
            Freshness::Closed
        } else {
            Freshness::Open
        })
    }
}

impl Default for FreshnessClassifier {
    fn default() -> Self {
        Self::new(FreshnessConfig::default())
    }
}
