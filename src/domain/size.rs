// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte-size quantities such as `512k` or `10m`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Error returned when a string is not a valid size quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid size quantity '{input}': {reason}")]
pub struct SizeParseError {
    input: String,
    reason: &'static str,
}

/// A size in bytes, written in property files as a number with an optional
/// unit suffix.
///
/// The suffix is one of `b`, `k`, `m` or `g` (case-insensitive, binary
/// multiples). A bare number is a count of bytes.
///
/// # Examples
///
/// ```
/// use hexprops::domain::SizeQuantity;
///
/// let size: SizeQuantity = "512k".parse().unwrap();
/// assert_eq!(size.bytes(), 512 * 1024);
/// assert_eq!(size.to_string(), "512k");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SizeQuantity {
    bytes: u64,
}

impl SizeQuantity {
    /// Creates a quantity from a byte count.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Creates a quantity from a count of kilobytes.
    pub const fn from_kilobytes(kilobytes: u64) -> Self {
        Self {
            bytes: kilobytes.saturating_mul(KIB),
        }
    }

    /// Creates a quantity from a count of megabytes.
    pub const fn from_megabytes(megabytes: u64) -> Self {
        Self {
            bytes: megabytes.saturating_mul(MIB),
        }
    }

    /// Returns the size in bytes.
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Returns the size in whole kilobytes, rounding down.
    pub const fn kilobytes(&self) -> u64 {
        self.bytes / KIB
    }

    /// Returns the size in whole megabytes, rounding down.
    pub const fn megabytes(&self) -> u64 {
        self.bytes / MIB
    }
}

impl FromStr for SizeQuantity {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| SizeParseError {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        if number.is_empty() {
            return Err(err("missing number"));
        }

        let multiplier = match unit.to_ascii_lowercase().as_str() {
            "" | "b" => 1,
            "k" => KIB,
            "m" => MIB,
            "g" => GIB,
            _ => return Err(err("unknown unit, expected one of b, k, m, g")),
        };

        let count: u64 = number.parse().map_err(|_| err("number out of range"))?;
        let bytes = count
            .checked_mul(multiplier)
            .ok_or_else(|| err("size overflows 64 bits"))?;

        Ok(Self { bytes })
    }
}

impl fmt::Display for SizeQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bytes;
        if b != 0 && b % GIB == 0 {
            write!(f, "{}g", b / GIB)
        } else if b != 0 && b % MIB == 0 {
            write!(f, "{}m", b / MIB)
        } else if b != 0 && b % KIB == 0 {
            write!(f, "{}k", b / KIB)
        } else {
            write!(f, "{}b", b)
        }
    }
}
