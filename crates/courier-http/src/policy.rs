use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Which response statuses count as success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuccessPolicy {
    Exact(u16),
    AnyOf(Vec<u16>),
    /// Inclusive bounds.
    Range(u16, u16),
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        Self::Exact(200)
    }
}

impl SuccessPolicy {
    pub fn accepts(&self, status: u16) -> bool {
        match self {
            Self::Exact(code) => *code == status,
            Self::AnyOf(codes) => codes.contains(&status),
            Self::Range(lo, hi) => (*lo..=*hi).contains(&status),
        }
    }
}

impl fmt::Display for SuccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(code) => write!(f, "{code}"),
            Self::AnyOf(codes) => {
                let joined = codes
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                f.write_str(&joined)
            }
            Self::Range(lo, hi) => write!(f, "{lo}-{hi}"),
        }
    }
}

impl FromStr for SuccessPolicy {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            key: "success_status",
            value: raw.to_string(),
        };
        let value = raw.trim();

        if let Some(class) = value.strip_suffix("xx").or_else(|| value.strip_suffix("XX")) {
            let digit: u16 = class.parse().map_err(|_| invalid())?;
            if !(1..=5).contains(&digit) {
                return Err(invalid());
            }
            return Ok(Self::Range(digit * 100, digit * 100 + 99));
        }

        if let Some((lo, hi)) = value.split_once('-') {
            let lo = parse_status(lo).ok_or_else(invalid)?;
            let hi = parse_status(hi).ok_or_else(invalid)?;
            if lo > hi {
                return Err(invalid());
            }
            return Ok(Self::Range(lo, hi));
        }

        if value.contains(',') {
            let codes = value
                .split(',')
                .map(|part| parse_status(part).ok_or_else(invalid))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::AnyOf(codes));
        }

        parse_status(value).map(Self::Exact).ok_or_else(invalid)
    }
}

fn parse_status(raw: &str) -> Option<u16> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|code| (100..=599).contains(code))
}
