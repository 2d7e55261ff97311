//! Reduction methods.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StitchError;

/// How overlapping contributions to one cell are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StitchMethod {
    /// Largest contribution.
    #[default]
    Max,
    /// Smallest contribution.
    Min,
    /// Arithmetic mean of all contributions.
    Mean,
}

impl StitchMethod {
    /// Lower-case name, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Mean => "mean",
        }
    }
}

impl fmt::Display for StitchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StitchMethod {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            "mean" => Ok(Self::Mean),
            other => Err(StitchError::UnknownMethod {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for m in [StitchMethod::Max, StitchMethod::Min, StitchMethod::Mean] {
            assert_eq!(m.as_str().parse::<StitchMethod>().unwrap(), m);
        }
        assert!(matches!(
            "median".parse::<StitchMethod>(),
            Err(StitchError::UnknownMethod { .. })
        ));
    }
}
