use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// The fuzzers whose corpora can be read and written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fuzzer {
    /// Tagged, Haskell-escaped call objects.
    Echidna,
    /// ABI-decoded, untagged call objects.
    #[default]
    Medusa,
}

impl Fuzzer {
    /// Lowercase identifier, as used in config files and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Echidna => "echidna",
            Self::Medusa => "medusa",
        }
    }

    /// Display name, used in generated contract and file names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Echidna => "Echidna",
            Self::Medusa => "Medusa",
        }
    }

    /// The other fuzzer, i.e. the conversion target.
    pub const fn other(self) -> Self {
        match self {
            Self::Echidna => Self::Medusa,
            Self::Medusa => Self::Echidna,
        }
    }
}

impl fmt::Display for Fuzzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("the requested fuzzer `{0}` is not supported, supported fuzzers: echidna, medusa")]
pub struct UnsupportedFuzzer(pub String);

impl FromStr for Fuzzer {
    type Err = UnsupportedFuzzer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echidna" => Ok(Self::Echidna),
            "medusa" => Ok(Self::Medusa),
            _ => Err(UnsupportedFuzzer(s.to_string())),
        }
    }
}

impl Serialize for Fuzzer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Fuzzer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
