use crate::*;
use fuzz_utils_config::{ConvertConfig, Fuzzer, GenerateConfig};
use fuzz_utils_corpus::{CollectedDiagnostics, CorpusConverter, TestGenerator};
use serde_json::json;
use std::fs;

fn echidna_corpus(root: &Path) {
    let reproducers = root.join("reproducers");
    fs::create_dir_all(&reproducers).unwrap();
    let mut transfer = echidna_call("", json!([]));
    transfer["value"] = json!("0x64");
    let sequence = json!([
        echidna_call("pokeMany", json!([echidna_uint_array(8, &["1", "2"])])),
        transfer,
        echidna_call("poke", json!([echidna_uint(8, "3")])),
    ]);
    fs::write(reproducers.join("a.txt"), sequence.to_string()).unwrap();
    fs::write(reproducers.join("b.txt"), "not a corpus file").unwrap();
    let unknown = json!([echidna_call("gone", json!([]))]);
    fs::write(reproducers.join("c.txt"), unknown.to_string()).unwrap();
}

fn config(corpus: &Path, tests: &Path) -> GenerateConfig {
    GenerateConfig {
        target_contract: TARGET.into(),
        corpus_dir: corpus.to_path_buf(),
        fuzzer: Fuzzer::Echidna,
        tests_dir: tests.to_path_buf(),
        inheritance_path: "../src/Target.sol".into(),
        ..Default::default()
    }
}

#[test]
fn generates_foundry_test_contract() {
    let corpus = tempfile::tempdir().unwrap();
    let tests = tempfile::tempdir().unwrap();
    echidna_corpus(corpus.path());
    let provider = provider();
    let config = config(corpus.path(), tests.path());

    let mut diagnostics = CollectedDiagnostics::default();
    let generated = TestGenerator::new(&config, &provider).generate(&mut diagnostics).unwrap();
    assert_eq!((generated.tests, generated.skipped), (1, 2));
    assert_eq!(diagnostics.skipped.len(), 2);
    assert_eq!(generated.path, tests.path().join("Target_Echidna_Test.t.sol"));

    let source = &generated.source;
    assert!(source.starts_with("// SPDX-License-Identifier: UNLICENSED\npragma solidity ^0.8.13;"));
    assert!(source.contains("import \"../src/Target.sol\";"));
    assert!(source.contains("contract Target_Echidna_Test is Test {"));
    assert!(source.contains("    function test_auto_poke_0() public {\n        bool success;\n"));
    assert!(source.contains("        uint8[] memory dynArr_0 = new uint8[](2);\n"));
    assert!(source.contains("        target.poke(3);\n"));

    generated.write().unwrap();
    assert_eq!(fs::read_to_string(&generated.path).unwrap(), *source);
}

#[test]
fn generation_is_idempotent() {
    let corpus = tempfile::tempdir().unwrap();
    let tests = tempfile::tempdir().unwrap();
    echidna_corpus(corpus.path());
    let provider = provider();
    let config = config(corpus.path(), tests.path());
    let generator = TestGenerator::new(&config, &provider);

    generator.generate(&mut CollectedDiagnostics::default()).unwrap().write().unwrap();
    let path = tests.path().join("Target_Echidna_Test.t.sol");
    let first = fs::read(&path).unwrap();
    generator.generate(&mut CollectedDiagnostics::default()).unwrap().write().unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);
}

#[test]
fn converted_corpus_generates_the_same_calls() {
    let root = tempfile::tempdir().unwrap();
    let echidna = root.path().join("echidna");
    echidna_corpus(&echidna);
    let provider = provider();

    let convert = ConvertConfig {
        target_contract: TARGET.into(),
        corpus_dir: echidna.clone(),
        fuzzer: Fuzzer::Echidna,
        ..Default::default()
    };
    let mut diagnostics = CollectedDiagnostics::default();
    let converted = CorpusConverter::new(&convert, &provider).convert(&mut diagnostics).unwrap();
    assert_eq!((converted.files.len(), converted.skipped), (1, 2));
    converted.write().unwrap();

    let medusa = root.path().join("echidna-medusa");
    assert!(medusa.join("test_results/a.json").is_file());
    let tests = root.path().join("test");
    let config = GenerateConfig { fuzzer: Fuzzer::Medusa, ..config(&medusa, &tests) };
    let generated = TestGenerator::new(&config, &provider)
        .generate(&mut CollectedDiagnostics::default())
        .unwrap();
    assert_eq!(generated.tests, 1);
    assert!(generated.source.contains("contract Target_Medusa_Test is Test {"));
    assert!(generated.source.contains("dynArr_0[1] = uint8(2);"));
    assert!(generated.source.contains("payable(address(target)).call{value: 100}(\"\");"));
    assert!(generated.source.contains("target.poke(3);"));
}
