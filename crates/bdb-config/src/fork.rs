use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Protocol versions whose entity layouts differ.
///
/// Declaration order is activation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkName {
    Phase0,
    Altair,
    Bellatrix,
}

impl ForkName {
    /// Every known fork in activation order.
    pub const ALL: [ForkName; 3] = [ForkName::Phase0, ForkName::Altair, ForkName::Bellatrix];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phase0 => "phase0",
            Self::Altair => "altair",
            Self::Bellatrix => "bellatrix",
        }
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phase0" => Ok(Self::Phase0),
            "altair" => Ok(Self::Altair),
            "bellatrix" => Ok(Self::Bellatrix),
            other => Err(format!("unknown fork: {other}")),
        }
    }
}
