use core::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChecksumError {
    EmptyInput,
    UnsupportedCharacter { character: char, index: usize },
    ZeroDivisor,
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "URN string is empty"),
            Self::UnsupportedCharacter { character, index } => write!(
                f,
                "character '{character}' at index {index} can not be mapped in the checksum calculation"
            ),
            Self::ZeroDivisor => write!(f, "last checksum digit is zero"),
        }
    }
}

impl core::error::Error for ChecksumError {}
