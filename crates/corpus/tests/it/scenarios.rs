use crate::*;
use alloy_primitives::U256;
use fuzz_utils_corpus::{
    Action, Decoder, SequenceContext, ValueNode,
    render::{ConvertOptions, RenderOptions, convert_sequence, render_call},
    wire::{Echidna, Medusa, WireFormat, parse_address},
};
use serde_json::json;

fn render(decoder: &Decoder<'_>, raw: &Value) -> String {
    let call = decoder.decode_raw(raw).unwrap();
    let mut ctx = SequenceContext::new();
    render_call(&call, &mut ctx, RenderOptions::default()).unwrap().0
}

#[test]
fn empty_call_advances_time_and_blocks() {
    let provider = provider();
    let decoder = Decoder::new(&Echidna, &provider, TARGET);
    let mut raw = echidna_call("", json!([]));
    raw["call"] = json!({"tag": "NoCall"});
    raw["delay"] = json!(["0x05", "0x02"]);

    let statements = render(&decoder, &raw);
    let lines: Vec<_> = statements.lines().map(str::trim).collect();
    assert_eq!(lines, ["vm.warp(block.timestamp + 5);", "vm.roll(block.number + 2);"]);
}

#[test]
fn unnamed_call_with_value_is_a_transfer() {
    let provider = provider();
    let decoder = Decoder::new(&Echidna, &provider, TARGET);
    let mut raw = echidna_call("", json!([]));
    raw["value"] = json!("0x64");

    let statements = render(&decoder, &raw);
    assert!(statements.contains("payable(address(target)).call{value: 100}(\"\");"), "{statements}");
    assert!(statements.contains("require(success, \"Low level call failed.\");"));
    assert!(!statements.contains("target."), "{statements}");
}

#[test]
fn integers_are_cast_inside_arrays_only() {
    let provider = provider();
    let decoder = Decoder::new(&Echidna, &provider, TARGET);

    let top = render(&decoder, &echidna_call("poke", json!([echidna_uint(8, "42")])));
    assert!(top.contains("target.poke(42);"), "{top}");

    let nested = render(&decoder, &echidna_call("pokeMany", json!([echidna_uint_array(8, &["42"])])));
    assert!(nested.contains("dynArr_0[0] = uint8(42);"), "{nested}");
    assert!(nested.contains("target.pokeMany(dynArr_0);"), "{nested}");
}

#[test]
fn struct_from_keyed_payload() {
    let provider = provider();
    let decoder = Decoder::new(&Medusa, &provider, TARGET);
    let raw = medusa_call(
        "setPoint((uint256,address))",
        json!([{"a": "7", "b": "0x0000000000000000000000000000000000000001"}]),
    );

    let statements = render(&decoder, &raw);
    assert!(
        statements
            .contains("target.setPoint(Target.Point(7, 0x0000000000000000000000000000000000000001));"),
        "{statements}"
    );
}

#[test]
fn dynamic_array_survives_conversion_both_ways() {
    let provider = provider();
    let original = echidna_uint_array(256, &["1", "2", "3"]);
    let nested = echidna_nested_uint_array(256, &[&["4"], &[]]);
    let raw = echidna_call("pokeNested", json!([original, nested]));

    let options = ConvertOptions {
        target_address: None,
        deployer: parse_address("0x30000").unwrap(),
        deployer_nonce: 1,
        settings: Default::default(),
    };

    // Echidna to Medusa
    let decoded = Decoder::new(&Echidna, &provider, TARGET).decode_raw(&raw).unwrap();
    let Action::Invoke(invocation) = &decoded.action else { panic!("{decoded:?}") };
    let uint = |value: u64| ValueNode::Uint { value: U256::from(value), bits: 256 };
    assert_eq!(invocation.args[0], ValueNode::Array(vec![uint(1), uint(2), uint(3)]));
    let medusa = convert_sequence(vec![decoded], &Medusa, &options).unwrap();
    let inputs = &medusa[0]["call"]["dataAbiValues"]["inputValues"];
    assert_eq!(inputs[0], json!(["1", "2", "3"]));
    assert_eq!(inputs[1], json!([["4"], []]));
    assert_eq!(medusa[0]["call"]["to"], DEPLOYED_AT);

    // and back
    let decoded = Decoder::new(&Medusa, &provider, TARGET).decode_raw(&medusa[0]).unwrap();
    let echidna = convert_sequence(vec![decoded], &Echidna, &options).unwrap();
    assert_eq!(echidna[0]["call"], raw["call"]);
    assert_eq!(Echidna.parse_call(&echidna[0]).unwrap(), Echidna.parse_call(&raw).unwrap());
}
