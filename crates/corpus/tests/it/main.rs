use fuzz_utils_abi::ArtifactProvider;
use serde_json::{Value, json};
use std::path::Path;

mod generate;
mod properties;
mod scenarios;

pub const TARGET: &str = "Target";
pub const SENDER: &str = "0x0000000000000000000000000000000000010000";
pub const DEPLOYED_AT: &str = "0x00a329c0648769a73afac7f9381e08fb43dbea72";

pub fn provider() -> ArtifactProvider {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/Target.json");
    ArtifactProvider::load(path).unwrap()
}

/// An Echidna call object with no delay and no value.
pub fn echidna_call(function: &str, params: Value) -> Value {
    json!({
        "call": {"tag": "SolCall", "contents": [function, params]},
        "delay": ["0x0", "0x0"],
        "dst": DEPLOYED_AT,
        "gas": 12500000,
        "gasprice": "0x0",
        "src": SENDER,
        "value": "0x0",
    })
}

/// A Medusa call object with decoded input values.
pub fn medusa_call(signature: &str, inputs: Value) -> Value {
    json!({
        "call": {
            "from": SENDER,
            "to": DEPLOYED_AT,
            "nonce": 0,
            "value": "0x0",
            "gasLimit": 12500000,
            "gasPrice": "0x1",
            "gasFeeCap": "0x0",
            "gasTipCap": "0x0",
            "data": "0x",
            "dataAbiValues": {"methodSignature": signature, "inputValues": inputs},
            "AccessList": null,
            "SkipAccountChecks": false,
        },
        "blockNumberDelay": 0,
        "blockTimestampDelay": 0,
    })
}

pub fn echidna_uint(bits: usize, value: &str) -> Value {
    json!({"tag": "AbiUInt", "contents": [bits, value]})
}

pub fn echidna_uint_array(bits: usize, values: &[&str]) -> Value {
    let items: Vec<_> = values.iter().map(|value| echidna_uint(bits, value)).collect();
    json!({
        "tag": "AbiArrayDynamic",
        "contents": [{"tag": "AbiUIntType", "contents": bits}, items],
    })
}

/// A dynamic array of `uint<bits>[]`, i.e. `uint<bits>[][]`.
pub fn echidna_nested_uint_array(bits: usize, rows: &[&[&str]]) -> Value {
    let items: Vec<_> = rows.iter().map(|row| echidna_uint_array(bits, row)).collect();
    json!({
        "tag": "AbiArrayDynamic",
        "contents": [
            {"tag": "AbiArrayDynamicType", "contents": {"tag": "AbiUIntType", "contents": bits}},
            items,
        ],
    })
}
