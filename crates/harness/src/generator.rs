use crate::{
    Attack, HarnessError, Remappings,
    solidity::{
        INDENT, PREFACE, Wrapper, import_path, section, slash_path, state_changing, variable_name,
    },
};
use eyre::{Context, Result};
use fuzz_utils_abi::{ContractInterface, SignatureProvider};
use fuzz_utils_config::{ActorConfig, HarnessMode, TemplateConfig};
use itertools::Itertools;
use std::{fmt::Write, path::PathBuf};

/// Default Echidna and Medusa senders, pranked in `prank` mode.
pub const SENDERS: [&str; 3] = ["0x10000", "0x20000", "0x30000"];

/// The generated contracts, not yet written to disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedHarness {
    /// `(path, source)` of the harness, its actors and attacks. The harness comes first.
    pub files: Vec<(PathBuf, String)>,
}

impl GeneratedHarness {
    pub fn write(&self) -> Result<()> {
        for (path, source) in &self.files {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, source)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

/// A contract the harness deploys and wraps.
struct Target<'a> {
    contract: &'a ContractInterface,
    variable: String,
    wrappers: Vec<Wrapper>,
}

/// A group of identical actor contracts.
struct Actor<'a> {
    config: &'a ActorConfig,
    /// `Actor<Name>`
    contract: String,
    /// Storage array of the deployed instances.
    variable: String,
    /// Indices into the harness targets.
    targets: Vec<usize>,
    /// Per target, the wrappers the actor exposes.
    wrappers: Vec<Vec<Wrapper>>,
}

/// Scaffolds a fuzzing harness for the configured targets.
pub struct HarnessGenerator<'a> {
    config: &'a TemplateConfig,
    provider: &'a dyn SignatureProvider,
    remappings: Remappings,
}

impl<'a> HarnessGenerator<'a> {
    pub fn new(
        config: &'a TemplateConfig,
        provider: &'a dyn SignatureProvider,
        remappings: Remappings,
    ) -> Self {
        Self { config, provider, remappings }
    }

    pub fn generate(&self) -> Result<GeneratedHarness, HarnessError> {
        let targets = self.targets()?;
        let actors = match self.config.mode {
            HarnessMode::Actor => self.actors(&targets)?,
            HarnessMode::Simple | HarnessMode::Prank => Vec::new(),
        };
        let attacks: Vec<_> =
            self.config.attacks.iter().map(|name| Attack::from_name(name)).try_collect()?;

        let dir = &self.config.output_dir;
        let harness = self.render_harness(&targets, &actors, &attacks);
        let mut files = vec![(dir.join(format!("{}.sol", self.config.name)), harness)];
        for actor in &actors {
            files.push((
                dir.join("actors").join(format!("{}.sol", actor.contract)),
                self.render_actor(actor, &targets),
            ));
        }
        for attack in &attacks {
            files.push((
                dir.join("attacks").join(format!("{}.sol", attack.contract_name())),
                attack.render(&self.remappings.properties),
            ));
        }
        debug!(files = files.len(), mode = ?self.config.mode, "generated harness");
        Ok(GeneratedHarness { files })
    }

    fn targets(&self) -> Result<Vec<Target<'a>>, HarnessError> {
        if self.config.targets.is_empty() {
            return Err(HarnessError::NoTargets);
        }
        self.config
            .targets
            .iter()
            .unique()
            .map(|name| -> Result<_, HarnessError> {
                let contract = self.provider.contract(name)?;
                if !contract.deployable {
                    return Err(HarnessError::NotDeployable(name.clone()));
                }
                let wrappers = state_changing(contract)?;
                if wrappers.is_empty() {
                    warn!(contract = %name, "target has no state-changing functions");
                }
                Ok(Target { contract, variable: variable_name(name), wrappers })
            })
            .collect()
    }

    fn actors(&self, targets: &[Target<'_>]) -> Result<Vec<Actor<'a>>, HarnessError> {
        self.config
            .actors
            .iter()
            .map(|config| -> Result<_, HarnessError> {
                if config.number == 0 {
                    return Err(HarnessError::NoActors(config.name.clone()));
                }
                let filters = &config.filters;
                if !filters.only_modifiers.is_empty() || !filters.only_external_calls.is_empty() {
                    warn!(
                        actor = %config.name,
                        "`onlyModifiers` and `onlyExternalCalls` need source analysis, ignoring them"
                    );
                }

                let indices: Vec<usize> = if config.targets.is_empty() {
                    (0..targets.len()).collect()
                } else {
                    config
                        .targets
                        .iter()
                        .unique()
                        .map(|name| {
                            targets.iter().position(|t| t.contract.name == *name).ok_or_else(|| {
                                HarnessError::UnknownActorTarget {
                                    actor: config.name.clone(),
                                    target: name.clone(),
                                }
                            })
                        })
                        .try_collect()?
                };
                let wrappers = indices
                    .iter()
                    .map(|&index| {
                        targets[index]
                            .wrappers
                            .iter()
                            .filter(|w| !filters.only_payable || w.function.is_payable())
                            .cloned()
                            .collect()
                    })
                    .collect();
                Ok(Actor {
                    config,
                    contract: format!("Actor{}", config.name),
                    variable: format!("{}Actors", variable_name(&config.name).trim_end_matches('_')),
                    targets: indices,
                    wrappers,
                })
            })
            .collect()
    }

    fn render_harness(
        &self,
        targets: &[Target<'_>],
        actors: &[Actor<'_>],
        attacks: &[Attack],
    ) -> String {
        let name = &self.config.name;
        let path = slash_path(&self.config.output_dir.join(format!("{name}.sol")));
        let properties = &self.remappings.properties;

        let mut out = format!(
            "{PREFACE}
///
/// -- [ Running the fuzzers ]
///    * The below commands contain example values which you can modify based
///    on your needs. For further information on the configuration options
///    please reference the fuzzer documentation *
///    Echidna: echidna {path} --contract {name} --test-mode assertion --test-limit 100000 --corpus-dir echidna-corpora/corpus-{name}
///    Medusa: medusa fuzz --target {path} --assertion-mode --test-limit 100000 --deployment-order \"{name}\" --corpus-dir medusa-corpora/corpus-{name}
///    Foundry: forge test --match-contract {name}
/// --------------------------------------------------------------------

import \"{properties}util/PropertiesHelper.sol\";
import \"{properties}util/Hevm.sol\";
"
        );
        let imports = targets
            .iter()
            .map(|target| import_path(target.contract))
            .chain(actors.iter().map(|actor| format!("./actors/{}.sol", actor.contract)))
            .chain(attacks.iter().map(|attack| format!("./attacks/{}.sol", attack.contract_name())))
            .unique();
        for import in imports {
            let _ = writeln!(out, "import \"{import}\";");
        }

        let _ = writeln!(out, "\ncontract {name} is PropertiesAsserts {{");
        for target in targets {
            let _ = writeln!(out, "{INDENT}{} {};", target.contract.name, target.variable);
        }
        match self.config.mode {
            HarnessMode::Prank => {
                let _ = writeln!(out, "{INDENT}address[] senders;");
            }
            HarnessMode::Actor => {
                for actor in actors {
                    let _ = writeln!(out, "{INDENT}{}[] {};", actor.contract, actor.variable);
                }
            }
            HarnessMode::Simple => {}
        }
        for attack in attacks {
            let _ = writeln!(out, "{INDENT}{} {};", attack.contract_name(), attack_variable(*attack));
        }

        out.push_str(&self.render_constructor(targets, actors, attacks));

        for target in targets {
            if target.wrappers.is_empty() || self.config.mode == HarnessMode::Actor {
                continue;
            }
            let _ = write!(out, "\n{}", section(&format!("{} functions", target.contract.name)));
            for wrapper in &target.wrappers {
                out.push_str(&self.render_target_wrapper(target, wrapper));
            }
        }
        for actor in actors {
            let _ = write!(out, "\n{}", section(&format!("{} functions", actor.contract)));
            for (index, wrappers) in actor.targets.iter().zip(&actor.wrappers) {
                let target = &targets[*index];
                for wrapper in wrappers {
                    out.push_str(&render_actor_wrapper(actor, target, wrapper));
                }
            }
        }
        for attack in attacks {
            let _ = write!(out, "\n{}", section(&format!("{} functions", attack.contract_name())));
            out.push_str(&attack.render_wrappers(&attack_variable(*attack)));
        }
        out.push_str("}\n");
        out
    }

    fn render_constructor(
        &self,
        targets: &[Target<'_>],
        actors: &[Actor<'_>],
        attacks: &[Attack],
    ) -> String {
        let mut out = format!("\n{INDENT}constructor() {{\n");
        for target in targets {
            let contract = &target.contract.name;
            match target.contract.abi.constructor.as_ref().filter(|c| !c.inputs.is_empty()) {
                Some(constructor) => {
                    warn!(%contract, "constructor takes arguments, it has to be deployed by hand");
                    let types = constructor.inputs.iter().map(|input| input.selector_type()).join(", ");
                    let _ = writeln!(
                        out,
                        "{INDENT}{INDENT}// `{contract}` takes constructor arguments ({types}), deploy it here"
                    );
                }
                None => {
                    let _ = writeln!(out, "{INDENT}{INDENT}{} = new {contract}();", target.variable);
                }
            }
        }
        if self.config.mode == HarnessMode::Prank {
            for sender in SENDERS {
                let _ = writeln!(out, "{INDENT}{INDENT}senders.push(address({sender}));");
            }
        }
        for actor in actors {
            let args = actor
                .targets
                .iter()
                .map(|&index| format!("address({})", targets[index].variable))
                .join(", ");
            let _ = write!(
                out,
                "{INDENT}{INDENT}for (uint256 i; i < {}; i++) {{\n\
                 {INDENT}{INDENT}{INDENT}{}.push(new {}({args}));\n\
                 {INDENT}{INDENT}}}\n",
                actor.config.number, actor.variable, actor.contract
            );
        }
        for attack in attacks {
            let variable = attack_variable(*attack);
            let tokens: Vec<_> = targets.iter().filter(|t| is_token(t.contract)).collect();
            let _ = writeln!(
                out,
                "{INDENT}{INDENT}address[] memory {variable}Targets = new address[]({});",
                targets.len()
            );
            for (index, target) in targets.iter().enumerate() {
                let _ = writeln!(out, "{INDENT}{INDENT}{variable}Targets[{index}] = address({});", target.variable);
            }
            let _ = writeln!(
                out,
                "{INDENT}{INDENT}address[] memory {variable}Tokens = new address[]({});",
                tokens.len()
            );
            for (index, token) in tokens.iter().enumerate() {
                let _ = writeln!(out, "{INDENT}{INDENT}{variable}Tokens[{index}] = address({});", token.variable);
            }
            let _ = writeln!(
                out,
                "{INDENT}{INDENT}{variable} = new {}({variable}Targets, {variable}Tokens);",
                attack.contract_name()
            );
        }
        let _ = writeln!(out, "{INDENT}}}");
        out
    }

    fn render_target_wrapper(&self, target: &Target<'_>, wrapper: &Wrapper) -> String {
        let function = &wrapper.function.name;
        let call = wrapper.call(&target.variable, function);
        match self.config.mode {
            HarnessMode::Prank => {
                let params = std::iter::once("uint256 senderIndex".to_string())
                    .chain(wrapper.params.iter().cloned())
                    .join(", ");
                format!(
                    "\n{INDENT}function {}_{function}({params}) public{} {{\n\
                     {INDENT}{INDENT}address sender = senders[clampBetween(senderIndex, 0, senders.length - 1)];\n\
                     {INDENT}{INDENT}hevm.prank(sender);\n\
                     {INDENT}{INDENT}{call};\n\
                     {INDENT}}}\n",
                    target.variable,
                    wrapper.mutability()
                )
            }
            HarnessMode::Simple | HarnessMode::Actor => format!(
                "\n{INDENT}function {}_{function}({}) public{} {{\n\
                 {INDENT}{INDENT}{call};\n\
                 {INDENT}}}\n",
                target.variable,
                wrapper.params.join(", "),
                wrapper.mutability()
            ),
        }
    }

    fn render_actor(&self, actor: &Actor<'_>, targets: &[Target<'_>]) -> String {
        let mut out = format!(
            "{PREFACE}\n\nimport \"{}util/PropertiesHelper.sol\";\n",
            self.remappings.properties
        );
        let actor_targets: Vec<_> = actor.targets.iter().map(|&index| &targets[index]).collect();
        for import in actor_targets.iter().map(|target| import_path(target.contract)).unique() {
            let _ = writeln!(out, "import \"{import}\";");
        }

        let _ = writeln!(out, "\ncontract {} is PropertiesAsserts {{", actor.contract);
        for target in &actor_targets {
            let _ = writeln!(out, "{INDENT}{} {};", target.contract.name, target.variable);
        }
        let params =
            actor_targets.iter().map(|target| format!("address _{}", target.variable)).join(", ");
        let _ = writeln!(out, "\n{INDENT}constructor({params}) {{");
        for target in &actor_targets {
            let _ = writeln!(
                out,
                "{INDENT}{INDENT}{variable} = {}(_{variable});",
                target.contract.name,
                variable = target.variable
            );
        }
        let _ = writeln!(out, "{INDENT}}}");

        for (target, wrappers) in actor_targets.iter().zip(&actor.wrappers) {
            for wrapper in wrappers {
                let function = &wrapper.function.name;
                let _ = write!(
                    out,
                    "\n{INDENT}function {}_{function}({}) public{} {{\n\
                     {INDENT}{INDENT}{};\n\
                     {INDENT}}}\n",
                    target.variable,
                    wrapper.params.join(", "),
                    wrapper.mutability(),
                    wrapper.call(&target.variable, function)
                );
            }
        }
        let _ = write!(out, "\n{INDENT}receive() external payable {{}}\n}}\n");
        out
    }
}

/// Harness function routing a call through one actor of the group.
fn render_actor_wrapper(actor: &Actor<'_>, target: &Target<'_>, wrapper: &Wrapper) -> String {
    let function = &wrapper.function.name;
    let params = std::iter::once("uint256 actorIndex".to_string())
        .chain(wrapper.params.iter().cloned())
        .join(", ");
    let group = actor.variable.trim_end_matches("Actors");
    format!(
        "\n{INDENT}function {group}_{}_{function}({params}) public{} {{\n\
         {INDENT}{INDENT}{contract} selectedActor = {variable}[clampBetween(actorIndex, 0, {variable}.length - 1)];\n\
         {INDENT}{INDENT}{};\n\
         {INDENT}}}\n",
        target.variable,
        wrapper.mutability(),
        wrapper.call("selectedActor", &format!("{}_{function}", target.variable)),
        contract = actor.contract,
        variable = actor.variable,
    )
}

fn attack_variable(attack: Attack) -> String {
    variable_name(attack.contract_name())
}

/// Targets exposing an ERC20 `transfer` are donated as tokens.
fn is_token(contract: &ContractInterface) -> bool {
    contract.abi.functions().any(|f| f.signature() == "transfer(address,uint256)")
        && contract.has_function("balanceOf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_abi::JsonAbi;
    use fuzz_utils_abi::ArtifactProvider;
    use fuzz_utils_config::ActorFilters;

    fn provider() -> ArtifactProvider {
        let vault = JsonAbi::parse([
            "function deposit() payable",
            "function withdraw(uint256 amount)",
            "function total() view returns (uint256)",
        ])
        .unwrap();
        let token = JsonAbi::parse([
            "constructor(uint256 supply)",
            "function transfer(address to, uint256 amount) returns (bool)",
            "function balanceOf(address owner) view returns (uint256)",
        ])
        .unwrap();
        let mut interface = ContractInterface::new("IVault", JsonAbi::default());
        interface.deployable = false;
        ArtifactProvider::new(vec![
            ContractInterface::new("Vault", vault).with_source("src/Vault.sol"),
            ContractInterface::new("Token", token).with_source("src/tokens/Token.sol"),
            interface,
        ])
    }

    fn remappings() -> Remappings {
        Remappings { properties: "properties/".into(), openzeppelin: None, solmate: None }
    }

    fn config(mode: HarnessMode, targets: &[&str]) -> TemplateConfig {
        TemplateConfig {
            name: "VaultHarness".into(),
            mode,
            targets: targets.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn generate(config: &TemplateConfig) -> GeneratedHarness {
        HarnessGenerator::new(config, &provider(), remappings()).generate().unwrap()
    }

    #[test]
    fn simple_harness() {
        let harness = generate(&config(HarnessMode::Simple, &["Vault"]));
        assert_eq!(harness.files.len(), 1);
        let (path, source) = &harness.files[0];
        assert_eq!(path, &PathBuf::from("./test/fuzzing/VaultHarness.sol"));

        let expected = format!(
            r#"{PREFACE}
///
/// -- [ Running the fuzzers ]
///    * The below commands contain example values which you can modify based
///    on your needs. For further information on the configuration options
///    please reference the fuzzer documentation *
///    Echidna: echidna test/fuzzing/VaultHarness.sol --contract VaultHarness --test-mode assertion --test-limit 100000 --corpus-dir echidna-corpora/corpus-VaultHarness
///    Medusa: medusa fuzz --target test/fuzzing/VaultHarness.sol --assertion-mode --test-limit 100000 --deployment-order "VaultHarness" --corpus-dir medusa-corpora/corpus-VaultHarness
///    Foundry: forge test --match-contract VaultHarness
/// --------------------------------------------------------------------

import "properties/util/PropertiesHelper.sol";
import "properties/util/Hevm.sol";
import "src/Vault.sol";

contract VaultHarness is PropertiesAsserts {{
    Vault vault;

    constructor() {{
        vault = new Vault();
    }}

    // -------------------------------------
    // Vault functions
    // -------------------------------------

    function vault_deposit() public payable {{
        vault.deposit{{value: msg.value}}();
    }}

    function vault_withdraw(uint256 amount) public {{
        vault.withdraw(amount);
    }}
}}
"#
        );
        similar_asserts::assert_eq!(source, &expected);
    }

    #[test]
    fn prank_harness_selects_a_sender() {
        let harness = generate(&config(HarnessMode::Prank, &["Vault"]));
        let source = &harness.files[0].1;
        assert!(source.contains("    address[] senders;\n"));
        assert!(source.contains("        senders.push(address(0x10000));\n"));
        assert!(source.contains(
            "    function vault_withdraw(uint256 senderIndex, uint256 amount) public {\n        \
             address sender = senders[clampBetween(senderIndex, 0, senders.length - 1)];\n        \
             hevm.prank(sender);\n        \
             vault.withdraw(amount);\n    }\n"
        ));
    }

    #[test]
    fn actor_harness_routes_through_actors() {
        let mut config = config(HarnessMode::Actor, &["Vault", "Token"]);
        config.actors = vec![
            ActorConfig { name: "Depositor".into(), targets: vec!["Vault".into()], number: 2, ..Default::default() },
            ActorConfig {
                name: "Payer".into(),
                filters: ActorFilters { only_payable: true, ..Default::default() },
                ..Default::default()
            },
        ];
        let harness = generate(&config);
        let paths: Vec<_> = harness.files.iter().map(|(path, _)| slash_path(path)).collect();
        assert_eq!(
            paths,
            [
                "test/fuzzing/VaultHarness.sol",
                "test/fuzzing/actors/ActorDepositor.sol",
                "test/fuzzing/actors/ActorPayer.sol",
            ]
        );

        let harness_source = &harness.files[0].1;
        assert!(harness_source.contains("import \"./actors/ActorDepositor.sol\";\n"));
        assert!(harness_source.contains("    ActorDepositor[] depositorActors;\n"));
        assert!(harness_source.contains(
            "        for (uint256 i; i < 2; i++) {\n            \
             depositorActors.push(new ActorDepositor(address(vault)));\n        }\n"
        ));
        assert!(harness_source.contains(
            "payerActors.push(new ActorPayer(address(vault), address(token)));"
        ));
        assert!(harness_source.contains(
            "    function depositor_vault_withdraw(uint256 actorIndex, uint256 amount) public {\n        \
             ActorDepositor selectedActor = depositorActors[clampBetween(actorIndex, 0, depositorActors.length - 1)];\n        \
             selectedActor.vault_withdraw(amount);\n    }\n"
        ));
        assert!(harness_source.contains(
            "selectedActor.vault_deposit{value: msg.value}();"
        ));
        // targets are only reachable through the actors
        assert!(!harness_source.contains("function vault_withdraw("));
        // the payable filter drops every non-payable function
        assert!(!harness_source.contains("function payer_vault_withdraw("));
        assert!(!harness_source.contains("function payer_token_transfer("));

        let actor = &harness.files[1].1;
        assert!(actor.contains("contract ActorDepositor is PropertiesAsserts {\n    Vault vault;\n"));
        assert!(actor.contains("    constructor(address _vault) {\n        vault = Vault(_vault);\n    }\n"));
        assert!(actor.contains(
            "    function vault_deposit() public payable {\n        vault.deposit{value: msg.value}();\n    }\n"
        ));
        assert!(!actor.contains("total"));
    }

    #[test]
    fn donation_attack_is_deployed_with_targets_and_tokens() {
        let mut config = config(HarnessMode::Simple, &["Vault", "Token"]);
        config.attacks = vec!["Donation".into()];
        let harness = generate(&config);
        assert_eq!(harness.files.len(), 2);
        assert_eq!(slash_path(&harness.files[1].0), "test/fuzzing/attacks/DonationAttack.sol");

        let source = &harness.files[0].1;
        assert!(source.contains("import \"src/tokens/Token.sol\";\n"));
        assert!(source.contains("import \"./attacks/DonationAttack.sol\";\n"));
        assert!(source.contains("// `Token` takes constructor arguments (uint256), deploy it here"));
        assert!(source.contains("donationAttackTargets[1] = address(token);"));
        assert!(source.contains("donationAttackTokens[0] = address(token);"));
        assert!(source.contains(
            "donationAttack = new DonationAttack(donationAttackTargets, donationAttackTokens);"
        ));
        assert!(source.contains("function donationAttack_donateETH(uint256 targetIndex) public payable {"));
    }

    #[test]
    fn rejects_invalid_configurations() {
        let provider = provider();
        let check = |config: &TemplateConfig| {
            HarnessGenerator::new(config, &provider, remappings()).generate().unwrap_err().to_string()
        };

        assert_eq!(check(&config(HarnessMode::Simple, &[])), "no target contracts to wrap");
        assert_eq!(
            check(&config(HarnessMode::Simple, &["Missing"])),
            "could not find contract `Missing` in the compiled artifacts"
        );
        assert_eq!(
            check(&config(HarnessMode::Simple, &["IVault"])),
            "`IVault` has no bytecode and cannot be deployed by the harness"
        );

        let mut attack = config(HarnessMode::Simple, &["Vault"]);
        attack.attacks = vec!["Flashloan".into()];
        assert_eq!(check(&attack), "unknown attack `Flashloan`, available attacks: Donation");

        let mut actors = config(HarnessMode::Actor, &["Vault"]);
        actors.actors[0].targets = vec!["Token".into()];
        assert_eq!(
            check(&actors),
            "actor `Default` targets `Token`, which is not one of the harness targets"
        );
        actors.actors[0].targets.clear();
        actors.actors[0].number = 0;
        assert_eq!(check(&actors), "actor `Default` must be deployed at least once");
    }
}
