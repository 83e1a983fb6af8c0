use core::{fmt, str::FromStr};

use crate::Error;

/// How the body of a new identifier is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationMethod {
    /// The numeric id of the identity row.
    Increment,
    /// The current local time as `yyyyMMddHHmmss`.
    Timestamp,
}

impl GenerationMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Increment, Self::Timestamp]
            .into_iter()
            .find(|m| s.trim().eq_ignore_ascii_case(m.as_str()))
            .ok_or_else(|| Error::configuration(format!("unknown generation method '{s}'")))
    }
}

/// Immutable settings of a [`crate::UrnGenerator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub method: GenerationMethod,
    /// Append the URN:NBN check digit.
    pub checksum: bool,
    /// Workflow process the generator runs for; only used in log output.
    pub process_id: i64,
}

impl GeneratorConfig {
    pub fn new(method: GenerationMethod) -> Self {
        Self {
            method,
            checksum: false,
            process_id: -1,
        }
    }

    pub fn with_checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_process_id(mut self, process_id: i64) -> Self {
        self.process_id = process_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("increment".parse::<GenerationMethod>().unwrap(), GenerationMethod::Increment);
        assert_eq!("TimeStamp".parse::<GenerationMethod>().unwrap(), GenerationMethod::Timestamp);
        assert_eq!(GenerationMethod::Timestamp.to_string(), "timestamp");
    }

    #[test]
    fn unknown_method_is_a_configuration_error() {
        let err = "uuid".parse::<GenerationMethod>().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!("".parse::<GenerationMethod>().is_err());
    }
}
