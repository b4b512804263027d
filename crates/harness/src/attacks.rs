use crate::{
    HarnessError,
    solidity::{INDENT, PREFACE},
};
use std::fmt::Write;

/// A ready-made attack contract the harness can deploy next to the targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attack {
    /// Sends ETH and tokens to the targets without going through their functions.
    Donation,
}

impl Attack {
    pub fn from_name(name: &str) -> Result<Self, HarnessError> {
        match name {
            "Donation" => Ok(Self::Donation),
            _ => Err(HarnessError::UnknownAttack(name.to_string())),
        }
    }

    pub fn contract_name(self) -> &'static str {
        match self {
            Self::Donation => "DonationAttack",
        }
    }

    /// `(name, parameters, arguments, payable)` of every entry point the harness forwards to.
    pub fn entry_points(self) -> &'static [(&'static str, &'static str, &'static str, bool)] {
        match self {
            Self::Donation => &[
                ("donateETH", "uint256 targetIndex", "targetIndex", true),
                ("selfdestructDonation", "uint256 targetIndex", "targetIndex", true),
                (
                    "tokenDonation",
                    "uint256 targetIndex, uint256 tokenIndex, uint256 amount",
                    "targetIndex, tokenIndex, amount",
                    false,
                ),
            ],
        }
    }

    /// Source of the attack contract.
    pub fn render(self, properties: &str) -> String {
        match self {
            Self::Donation => donation(properties),
        }
    }

    /// Harness functions forwarding to the deployed attack in `variable`.
    pub fn render_wrappers(self, variable: &str) -> String {
        let mut out = String::new();
        for (name, params, args, payable) in self.entry_points() {
            let (mutability, value) =
                if *payable { (" payable", "{value: msg.value}") } else { ("", "") };
            let _ = write!(
                out,
                "\n{INDENT}function {variable}_{name}({params}) public{mutability} {{\n\
                 {INDENT}{INDENT}{variable}.{name}{value}({args});\n\
                 {INDENT}}}\n"
            );
        }
        out
    }
}

fn donation(properties: &str) -> String {
    format!(
        r#"{PREFACE}

import "{properties}util/PropertiesHelper.sol";

contract SelfDestructor {{
    address owner;

    constructor() payable {{
        owner = msg.sender;
    }}

    modifier onlyOwner() {{
        require(msg.sender == owner, "Not owner!");
        _;
    }}

    function detonate(address payable to) public onlyOwner {{
        require(address(this).balance > 0, "Not enough ETH balance!");
        selfdestruct(to);
    }}

    receive() external payable {{}}

    fallback() external payable {{}}
}}

interface IERC20 {{
    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed owner, address indexed spender, uint256 value);

    function totalSupply() external view returns (uint256);
    function balanceOf(address account) external view returns (uint256);
    function transfer(address to, uint256 value) external returns (bool);
    function allowance(address owner, address spender) external view returns (uint256);
    function approve(address spender, uint256 value) external returns (bool);
    function transferFrom(address from, address to, uint256 value) external returns (bool);
}}

contract DonationAttack is PropertiesAsserts {{
    address[] targets;
    IERC20[] tokens;

    constructor(address[] memory _targets, address[] memory _tokens) payable {{
        targets = _targets;
        for (uint256 i; i < _tokens.length; i++) {{
            tokens.push(IERC20(_tokens[i]));
        }}
    }}

    function donateETH(uint256 targetIndex) public payable {{
        require(msg.value > 0, "No value provided");
        address target = targets[clampBetween(targetIndex, 0, targets.length - 1)];
        (bool success,) = payable(target).call{{value: msg.value}}("");
        require(success, "Failed to donate ETH via a receive/fallback function.");
    }}

    function selfdestructDonation(uint256 targetIndex) public payable {{
        require(msg.value > 0, "No value provided");
        address target = targets[clampBetween(targetIndex, 0, targets.length - 1)];
        SelfDestructor bomb = new SelfDestructor{{value: msg.value}}();
        bomb.detonate(payable(target));
    }}

    function tokenDonation(uint256 targetIndex, uint256 tokenIndex, uint256 amount) public {{
        address target = targets[clampBetween(targetIndex, 0, targets.length - 1)];
        IERC20 token = tokens[clampBetween(tokenIndex, 0, tokens.length - 1)];
        token.transfer(target, amount);
    }}
}}
"#
    )
}
