//! Corpus conversion between Echidna and Medusa.

use crate::{
    DecodeError, Decoder,
    diagnostics::Diagnostics,
    layout,
    render::{ConvertOptions, convert_sequence},
    wire::{EncodeSettings, WireFormat, parse_address, wire_format},
};
use eyre::{Context, Result};
use fuzz_utils_abi::SignatureProvider;
use fuzz_utils_config::ConvertConfig;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A converted corpus, not yet written to disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvertedCorpus {
    /// Output path and contents of every converted sequence, in input order.
    pub files: Vec<(PathBuf, String)>,
    pub skipped: usize,
}

impl ConvertedCorpus {
    pub fn write(&self) -> Result<()> {
        for (path, contents) in &self.files {
            layout::write_file(path, contents)?;
        }
        Ok(())
    }
}

/// Re-encodes every sequence of a corpus in the other fuzzer's format.
pub struct CorpusConverter<'a> {
    config: &'a ConvertConfig,
    provider: &'a dyn SignatureProvider,
}

impl<'a> CorpusConverter<'a> {
    pub fn new(config: &'a ConvertConfig, provider: &'a dyn SignatureProvider) -> Self {
        Self { config, provider }
    }

    /// The conversion settings, with addresses parsed.
    pub fn options(&self) -> Result<ConvertOptions> {
        let config = self.config;
        let address = |value: &str, setting: &str| {
            parse_address(value).ok_or_else(|| eyre::eyre!("invalid {setting} address `{value}`"))
        };
        Ok(ConvertOptions {
            target_address: config
                .target_address
                .as_deref()
                .map(|target| address(target, "target"))
                .transpose()?,
            deployer: address(&config.deployer, "deployer")?,
            deployer_nonce: config.deployer_nonce,
            settings: EncodeSettings {
                gas_fee_cap: config.gas_fee_cap.clone(),
                gas_tip_cap: config.gas_tip_cap.clone(),
            },
        })
    }

    pub fn convert(&self, diagnostics: &mut dyn Diagnostics) -> Result<ConvertedCorpus> {
        let config = self.config;
        let target = &config.target_contract;
        self.provider.contract(target).wrap_err("cannot convert without the target contract")?;
        let options = self.options()?;
        let from = wire_format(config.fuzzer);
        let to = wire_format(config.fuzzer.other());
        let decoder = Decoder::new(from, self.provider, target);
        let output_dir = config.output_dir();

        let mut converted = ConvertedCorpus::default();
        for dir in layout::corpus_dirs(config.fuzzer) {
            let Some(out_dir) = layout::converted_dir(config.fuzzer, dir) else { continue };
            for path in layout::list_files(&config.corpus_dir.join(dir))? {
                let result = layout::read_sequence(&path).and_then(|calls| {
                    self.convert_file(&decoder, to, &calls, &options)
                        .wrap_err_with(|| format!("failed to convert {}", path.display()))
                });
                match result {
                    Ok(Some(contents)) => {
                        let out = output_path(&output_dir.join(out_dir), &path, to);
                        trace!(from = %path.display(), to = %out.display(), "converted sequence");
                        converted.files.push((out, contents));
                    }
                    Ok(None) => debug!(path = %path.display(), "nothing left to convert"),
                    Err(err) => {
                        diagnostics.file_skipped(&path, &err);
                        converted.skipped += 1;
                    }
                }
            }
        }
        Ok(converted)
    }

    /// Converts one sequence. `None` when no call survives the conversion.
    fn convert_file(
        &self,
        decoder: &Decoder<'_>,
        to: &dyn WireFormat,
        calls: &[Value],
        options: &ConvertOptions,
    ) -> Result<Option<String>> {
        let decoded = calls
            .iter()
            .map(|raw| decoder.decode_raw(raw))
            .collect::<Result<Vec<_>, DecodeError>>()?;
        let sequence = convert_sequence(decoded, to, options)?;
        if sequence.is_empty() {
            return Ok(None);
        }
        Ok(Some(to.to_file_string(&sequence)?))
    }
}

fn output_path(dir: &Path, input: &Path, to: &dyn WireFormat) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    dir.join(format!("{stem}.{}", to.file_extension()))
}
