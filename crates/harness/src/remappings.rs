use crate::HarnessError;
use regex::Regex;
use std::{path::Path, sync::LazyLock};

static PROPERTIES_RE: LazyLock<Regex> = LazyLock::new(|| library_re("properties"));
static OPENZEPPELIN_RE: LazyLock<Regex> = LazyLock::new(|| library_re("openzeppelin-contracts"));
static SOLMATE_RE: LazyLock<Regex> = LazyLock::new(|| library_re("solmate"));

fn library_re(library: &str) -> Regex {
    Regex::new(&format!(r"(\S+)=lib/{}/(\S*)", regex::escape(library))).unwrap()
}

/// Import prefixes of the libraries generated contracts depend on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Remappings {
    /// Prefix of `crytic/properties` imports, e.g. `properties/`.
    pub properties: String,
    pub openzeppelin: Option<String>,
    pub solmate: Option<String>,
}

impl Remappings {
    pub const FILE_NAME: &'static str = "remappings.txt";

    /// Reads `remappings.txt` from the project root.
    pub fn load(root: &Path) -> Result<Self, HarnessError> {
        let path = root.join(Self::FILE_NAME);
        if !path.is_file() {
            return Err(HarnessError::MissingRemappings(root.to_path_buf()));
        }
        let contents = std::fs::read_to_string(&path)
            .map_err(|source| HarnessError::Io { path: path.clone(), source })?;
        let remappings = Self::parse(&contents)?;
        debug!(?remappings, "found remappings");
        Ok(remappings)
    }

    /// Finds the library remappings. `crytic/properties` is required.
    pub fn parse(contents: &str) -> Result<Self, HarnessError> {
        Ok(Self {
            properties: find(&PROPERTIES_RE, contents, "contracts/")
                .ok_or(HarnessError::PropertiesNotInstalled)?,
            openzeppelin: find(&OPENZEPPELIN_RE, contents, "contracts/"),
            solmate: find(&SOLMATE_RE, contents, "src/"),
        })
    }
}

/// Import prefix of the first remapping that points into the library itself rather than into one
/// of its nested dependencies.
///
/// A remapping to the library's source directory is used as is; anything else is completed with
/// that directory, so `@crytic/=lib/properties/` yields `@crytic/contracts/`.
fn find(re: &Regex, contents: &str, source_dir: &str) -> Option<String> {
    re.captures_iter(contents)
        .map(|captures| (captures[1].to_string(), captures[2].to_string()))
        .find(|(_, path)| !path.contains("lib/"))
        .map(|(alias, path)| {
            if path == source_dir { alias } else { format!("{alias}{path}{source_dir}") }
        })
}
