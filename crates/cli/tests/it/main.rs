use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

const VAULT: &str = r#"{
    "contractName": "Vault",
    "abi": [
        {"type": "function", "name": "deposit", "stateMutability": "payable", "inputs": [], "outputs": []},
        {"type": "function", "name": "withdraw", "stateMutability": "nonpayable",
         "inputs": [{"name": "amount", "type": "uint256", "internalType": "uint256"}], "outputs": []}
    ],
    "bytecode": {"object": "0x6080"},
    "metadata": {"settings": {"compilationTarget": {"src/Vault.sol": "Vault"}}}
}"#;

const WITHDRAW: &str = r#"[{
    "call": {"tag": "SolCall", "contents": ["withdraw", [{"tag": "AbiUInt", "contents": [256, "5"]}]]},
    "delay": ["0x0", "0x0"],
    "dst": "0x00a329c0648769a73afac7f9381e08fb43dbea72",
    "gas": 12500000,
    "gasprice": "0x0",
    "src": "0x0000000000000000000000000000000000010000",
    "value": "0x0"
}]"#;

fn fuzz_utils(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fuzz-utils"))
        .current_dir(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn project(root: &Path) {
    fs::create_dir_all(root.join("out/Vault.sol")).unwrap();
    fs::write(root.join("out/Vault.sol/Vault.json"), VAULT).unwrap();
    fs::create_dir_all(root.join("corpus/reproducers")).unwrap();
    fs::write(root.join("corpus/reproducers/1.txt"), WITHDRAW).unwrap();
}

#[test]
fn init_writes_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = fuzz_utils(dir.path(), &["init"]);
    assert!(output.status.success(), "{output:?}");

    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("fuzz-utils.json")).unwrap())
            .unwrap();
    assert_eq!(config["generate"]["fuzzer"], "medusa");
    assert_eq!(config["template"]["name"], "DefaultHarness");
    assert_eq!(config["modify-corpus"]["historyDir"], ".fuzz_utils");

    let output = fuzz_utils(dir.path(), &["init"]);
    assert!(!output.status.success());
}

#[test]
fn generate_derives_the_target() {
    let dir = tempfile::tempdir().unwrap();
    project(dir.path());
    let output = fuzz_utils(dir.path(), &["generate", ".", "-d", "corpus", "-f", "echidna"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let source = fs::read_to_string(dir.path().join("test/Vault_Echidna_Test.t.sol")).unwrap();
    assert!(source.contains("import \"../src/Vault.sol\";"), "{source}");
    assert!(source.contains("function test_auto_withdraw_0() public {"));
    assert!(source.contains("target.withdraw(5);"));
}

#[test]
fn config_file_settings_apply() {
    let dir = tempfile::tempdir().unwrap();
    project(dir.path());
    fs::write(
        dir.path().join("fuzz-utils.json"),
        r#"{"generate": {"fuzzer": "echidna", "corpusDir": "corpus", "testsDir": "test/unit"}}"#,
    )
    .unwrap();
    let output = fuzz_utils(dir.path(), &["generate", "-c", "Vault"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("test/unit/Vault_Echidna_Test.t.sol").is_file());
}

#[test]
fn missing_contract_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    project(dir.path());
    let output =
        fuzz_utils(dir.path(), &["generate", "-c", "Nope", "-d", "corpus", "-f", "echidna"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not find contract `Nope` in the compiled artifacts"), "{stderr}");
    assert!(stderr.contains("Hint: compile the project with `forge build`"), "{stderr}");
}

#[test]
fn convert_writes_medusa_corpus() {
    let dir = tempfile::tempdir().unwrap();
    project(dir.path());
    let output = fuzz_utils(dir.path(), &["convert", ".", "-d", "corpus", "-f", "echidna", "-v"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("converting corpus"), "{stderr}");

    let converted = dir.path().join("corpus-medusa/test_results/1.json");
    let sequence: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(converted).unwrap()).unwrap();
    assert_eq!(sequence[0]["call"]["dataAbiValues"]["inputValues"], serde_json::json!(["5"]));
}
