use crate::{AbiError, ContractInterface, SignatureProvider};
use alloy_json_abi::JsonAbi;
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Contract interfaces read from compiled artifacts.
///
/// Accepts a Foundry project root (its `out/` directory is used), an artifacts directory, a
/// single artifact file, or a bare ABI JSON array.
#[derive(Clone, Debug, Default)]
pub struct ArtifactProvider {
    contracts: Vec<ContractInterface>,
}

impl ArtifactProvider {
    pub fn new(contracts: Vec<ContractInterface>) -> Self {
        Self { contracts }
    }

    /// Loads every artifact under `path`, in file name order.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AbiError> {
        let path = path.as_ref();
        if path.is_file() {
            let contract = read_artifact(path)?
                .ok_or_else(|| AbiError::NoArtifacts(path.to_path_buf()))?;
            return Ok(Self::new(vec![contract]));
        }

        let root = artifacts_dir(path);
        let mut contracts = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != "build-info");
        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            match read_artifact(entry.path()) {
                Ok(Some(contract)) => contracts.push(contract),
                Ok(None) => {}
                Err(err) => debug!(?err, path = %entry.path().display(), "skipping artifact"),
            }
        }

        if contracts.is_empty() {
            return Err(AbiError::NoArtifacts(root));
        }
        trace!(count = contracts.len(), root = %root.display(), "loaded artifacts");
        Ok(Self::new(contracts))
    }

    pub fn contracts(&self) -> &[ContractInterface] {
        &self.contracts
    }

    /// The only deployable project contract, if there is exactly one.
    ///
    /// Library sources (`lib/`), tests and scripts are not considered.
    pub fn sole_contract(&self) -> Option<&ContractInterface> {
        let mut candidates = self.contracts.iter().filter(|c| c.deployable && is_project_source(c));
        let first = candidates.next()?;
        candidates.next().is_none().then_some(first)
    }
}

impl SignatureProvider for ArtifactProvider {
    fn contract(&self, name: &str) -> Result<&ContractInterface, AbiError> {
        self.contracts
            .iter()
            .find(|contract| contract.name == name)
            .ok_or_else(|| AbiError::ContractNotFound(name.to_string()))
    }
}

fn artifacts_dir(path: &Path) -> PathBuf {
    let out = path.join("out");
    if out.is_dir() { out } else { path.to_path_buf() }
}

fn is_project_source(contract: &ContractInterface) -> bool {
    let Some(source) = &contract.source else { return true };
    let source = source.to_string_lossy();
    !(source.starts_with("lib/")
        || source.contains("forge-std")
        || source.ends_with(".t.sol")
        || source.ends_with(".s.sol"))
}

/// Reads one artifact. Returns `None` for JSON files that are not artifacts.
fn read_artifact(path: &Path) -> Result<Option<ContractInterface>, AbiError> {
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let file_name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
    if !is_json || file_name.ends_with(".metadata.json") {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|source| AbiError::Io { path: path.to_path_buf(), source })?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|source| AbiError::Json { path: path.to_path_buf(), source })?;
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

    let (abi, name, source, deployable) = match value {
        Value::Array(_) => (value, stem, None, true),
        Value::Object(mut object) => {
            let Some(abi) = object.remove("abi") else { return Ok(None) };
            let name = object
                .get("contractName")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(stem);
            let value = Value::Object(object);
            (abi, name, source_path(&value), has_bytecode(&value))
        }
        _ => return Ok(None),
    };

    let abi: JsonAbi = serde_json::from_value(abi)
        .map_err(|source| AbiError::Json { path: path.to_path_buf(), source })?;
    Ok(Some(ContractInterface { name, source, deployable, abi }))
}

/// Foundry records the source under `metadata.settings.compilationTarget` and `ast.absolutePath`,
/// Hardhat under `sourceName`.
fn source_path(artifact: &Value) -> Option<PathBuf> {
    artifact
        .pointer("/metadata/settings/compilationTarget")
        .and_then(Value::as_object)
        .and_then(|targets| targets.keys().next().cloned())
        .or_else(|| artifact.pointer("/ast/absolutePath").and_then(Value::as_str).map(Into::into))
        .or_else(|| artifact.get("sourceName").and_then(Value::as_str).map(Into::into))
        .map(PathBuf::from)
}

fn has_bytecode(artifact: &Value) -> bool {
    let code = artifact
        .pointer("/bytecode/object")
        .or_else(|| artifact.get("bytecode"))
        .and_then(Value::as_str);
    match code {
        Some(code) => !code.is_empty() && code != "0x",
        None => true,
    }
}
