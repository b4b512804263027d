//! Config extraction errors.

use figment::providers::{Format, Json, Toml};
use std::{collections::HashSet, error::Error, fmt};

/// Represents a failed attempt to extract a config section from a `Figment`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfigError {
    /// error thrown when extracting the section
    pub(crate) error: figment::Error,
}

impl ExtractConfigError {
    /// Wraps the figment error
    pub fn new(error: figment::Error) -> Self {
        Self { error }
    }
}

impl fmt::Display for ExtractConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut unique_errors = Vec::with_capacity(self.error.count());
        let mut unique = HashSet::with_capacity(self.error.count());
        for err in self.error.clone() {
            let err = SectionError::from(err);
            if unique.insert(err.to_string()) {
                unique_errors.push(err);
            }
        }
        writeln!(f, "failed to extract fuzz-utils config:")?;
        for err in unique_errors {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error for ExtractConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Error::source(&self.error)
    }
}

/// A single figment error, labelled with the provider it came from.
#[derive(Clone, Debug, PartialEq)]
enum SectionError {
    File(figment::Error),
    Other(figment::Error),
}

impl From<figment::Error> for SectionError {
    fn from(err: figment::Error) -> Self {
        let from_file = err
            .metadata
            .as_ref()
            .is_some_and(|meta| meta.name.contains(Json::NAME) || meta.name.contains(Toml::NAME));
        if from_file { Self::File(err) } else { Self::Other(err) }
    }
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, err) = match self {
            Self::File(err) => ("config file error: ", err),
            Self::Other(err) => ("config error: ", err),
        };
        f.write_str(prefix)?;
        write!(f, "{err}")?;
        if !err.path.is_empty() {
            write!(f, " for setting `{}`", err.path.join("."))?;
        }
        Ok(())
    }
}
