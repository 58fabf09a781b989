//! Per-shot variance overrides.

use std::fmt;

use serde::Serialize;

use crate::unit::ULength;

/// How a shot's error budget was specified, overriding the default model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum VarianceOverride {
    /// `?`: the shot is floated (given effectively infinite variance)
    Floated,
    /// `*`: the whole traverse containing the shot is floated
    FloatedTraverse,
    /// A length to use in place of the shot length when computing variance
    LengthOverride(ULength),
    /// `R<length>`: an explicit RMS error
    RmsError(ULength),
}

impl fmt::Display for VarianceOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floated => f.write_str("?"),
            Self::FloatedTraverse => f.write_str("*"),
            Self::LengthOverride(length) => write!(f, "{}", length),
            Self::RmsError(error) => write!(f, "R{}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::LengthUnit;

    #[test]
    fn test_display() {
        assert_eq!(VarianceOverride::Floated.to_string(), "?");
        assert_eq!(VarianceOverride::FloatedTraverse.to_string(), "*");
        let length = ULength::new(2.5, LengthUnit::Feet);
        assert_eq!(VarianceOverride::LengthOverride(length).to_string(), "2.5f");
        assert_eq!(VarianceOverride::RmsError(length).to_string(), "R2.5f");
    }
}
