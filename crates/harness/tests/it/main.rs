use fuzz_utils_abi::ArtifactProvider;
use fuzz_utils_config::{HarnessMode, TemplateConfig};
use fuzz_utils_harness::{HarnessGenerator, Remappings};
use std::{fs, path::Path};

const VAULT: &str = r#"{
    "abi": [
        {"type": "function", "name": "deposit", "stateMutability": "payable", "inputs": [], "outputs": []},
        {"type": "function", "name": "withdraw", "stateMutability": "nonpayable",
         "inputs": [{"name": "amount", "type": "uint256", "internalType": "uint256"}], "outputs": []},
        {"type": "function", "name": "setOwners", "stateMutability": "nonpayable",
         "inputs": [{"name": "", "type": "address[]", "internalType": "address[]"}], "outputs": []}
    ],
    "bytecode": {"object": "0x6080"},
    "metadata": {"settings": {"compilationTarget": {"src/Vault.sol": "Vault"}}}
}"#;

fn project(root: &Path) {
    fs::create_dir_all(root.join("out/Vault.sol")).unwrap();
    fs::write(root.join("out/Vault.sol/Vault.json"), VAULT).unwrap();
    fs::write(
        root.join("remappings.txt"),
        "forge-std/=lib/forge-std/src/\n@crytic/properties/=lib/properties/\n",
    )
    .unwrap();
}

#[test]
fn scaffolds_actor_harness_in_project() {
    let root = tempfile::tempdir().unwrap();
    project(root.path());

    let provider = ArtifactProvider::load(root.path()).unwrap();
    let remappings = Remappings::load(root.path()).unwrap();
    let config = TemplateConfig {
        mode: HarnessMode::Actor,
        targets: vec!["Vault".into()],
        output_dir: root.path().join("test/fuzzing"),
        attacks: vec!["Donation".into()],
        ..Default::default()
    };
    let harness = HarnessGenerator::new(&config, &provider, remappings).generate().unwrap();
    harness.write().unwrap();

    let dir = root.path().join("test/fuzzing");
    let source = fs::read_to_string(dir.join("DefaultHarness.sol")).unwrap();
    assert!(source.contains("import \"@crytic/properties/contracts/util/PropertiesHelper.sol\";"));
    assert!(source.contains("import \"src/Vault.sol\";"));
    assert!(source.contains("contract DefaultHarness is PropertiesAsserts {"));
    assert!(source.contains(
        "function default_vault_setOwners(uint256 actorIndex, address[] memory arg0) public {"
    ));
    assert!(source.contains("selectedActor.vault_setOwners(arg0);"));

    let actor = fs::read_to_string(dir.join("actors/ActorDefault.sol")).unwrap();
    assert!(actor.contains("function vault_setOwners(address[] memory arg0) public {"));
    assert!(actor.contains("    receive() external payable {}\n}\n"));

    let attack = fs::read_to_string(dir.join("attacks/DonationAttack.sol")).unwrap();
    assert!(attack.contains("contract DonationAttack is PropertiesAsserts {"));
}

#[test]
fn requires_properties_remapping() {
    let root = tempfile::tempdir().unwrap();
    project(root.path());
    fs::write(root.path().join("remappings.txt"), "forge-std/=lib/forge-std/src/\n").unwrap();
    let err = Remappings::load(root.path()).unwrap_err();
    assert!(err.to_string().contains("forge install crytic/properties"), "{err}");
}
