use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Travel mode understood by the routing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Costing {
    Pedestrian,
    Bicycle,
    Auto,
}

impl Costing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pedestrian => "pedestrian",
            Self::Bicycle => "bicycle",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for Costing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("\"{0}\" is not a valid costing. Choices are pedestrian, bicycle, auto")]
pub struct UnknownCosting(pub String);

impl FromStr for Costing {
    type Err = UnknownCosting;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pedestrian" => Ok(Self::Pedestrian),
            "bicycle" => Ok(Self::Bicycle),
            "auto" => Ok(Self::Auto),
            other => Err(UnknownCosting(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        for costing in [Costing::Pedestrian, Costing::Bicycle, Costing::Auto] {
            assert_eq!(costing.to_string().parse::<Costing>().unwrap(), costing);
        }
        assert!("car".parse::<Costing>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Costing::Bicycle).unwrap();
        assert_eq!(json, "\"bicycle\"");
    }
}
