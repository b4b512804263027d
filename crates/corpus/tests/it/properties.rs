use crate::*;
use fuzz_utils_corpus::{
    Decoder, SequenceContext,
    codec::{decode_escaped, encode_escaped},
    render::{RenderOptions, render_call},
    wire::Echidna,
};
use alloy_primitives::hex;
use serde_json::json;

#[test]
fn escaped_strings_round_trip() {
    let samples: &[&[u8]] = &[
        b"",
        b"plain ascii with \"quotes\" and \\ backslash",
        b"\x00\x01\x02\x7f",
        // `\SO` followed by `H` must not read back as `\SOH`
        b"\x0eH",
        // a numeric escape followed by a digit
        b"\x80123\xff9",
        b"\t\n\r\x0b\x0c\x07\x08 \x1b[0m",
    ];
    for bytes in samples {
        let escaped = encode_escaped(bytes);
        assert_eq!(decode_escaped(&escaped, true), hex::encode(bytes), "{escaped}");
    }
}

#[test]
fn dynamic_array_declarations_precede_use() {
    let provider = provider();
    let decoder = Decoder::new(&Echidna, &provider, TARGET);
    let nested = json!({
        "tag": "AbiArrayDynamic",
        "contents": [
            {"tag": "AbiArrayDynamicType", "contents": {"tag": "AbiUIntType", "contents": 256}},
            [echidna_uint_array(256, &["4"]), echidna_uint_array(256, &["5", "6"])],
        ],
    });
    let raw = echidna_call("pokeNested", json!([echidna_uint_array(256, &["1", "2", "3"]), nested]));
    let call = decoder.decode_raw(&raw).unwrap();
    let mut ctx = SequenceContext::new();
    let (statements, _) = render_call(&call, &mut ctx, RenderOptions::default()).unwrap();
    let lines: Vec<_> = statements.lines().map(str::trim).collect();

    let position = |needle: &str| {
        lines.iter().position(|line| line.starts_with(needle)).unwrap_or_else(|| {
            panic!("`{needle}` not found in\n{statements}");
        })
    };
    let call_line = position("target.pokeNested(");
    for (name, len) in [("dynArr_0", 3), ("dynArr_1", 1), ("dynArr_2", 2), ("dynArr_3", 2)] {
        let declaration = lines
            .iter()
            .position(|line| line.contains(&format!("memory {name} = new")))
            .unwrap();
        let assignments: Vec<_> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.starts_with(&format!("{name}[")))
            .map(|(index, _)| index)
            .collect();
        assert_eq!(assignments.len(), len, "{name}");
        assert!(assignments.iter().all(|index| declaration < *index && *index < call_line));
    }

    // inner arrays are declared before the outer array that holds them
    assert!(position("uint256[] memory dynArr_2") < position("uint256[][] memory dynArr_3"));
    assert_eq!(lines[call_line], "target.pokeNested(dynArr_0, dynArr_3);");
}

#[test]
fn array_names_are_unique_across_calls() {
    let provider = provider();
    let decoder = Decoder::new(&Echidna, &provider, TARGET);
    let raw = echidna_call("pokeMany", json!([echidna_uint_array(8, &["1"])]));
    let mut ctx = SequenceContext::new();

    let mut names = Vec::new();
    for _ in 0..3 {
        let call = decoder.decode_raw(&raw).unwrap();
        let (statements, _) = render_call(&call, &mut ctx, RenderOptions::default()).unwrap();
        let line = statements.lines().find(|line| line.contains("target.pokeMany(")).unwrap();
        names.push(line.trim().to_string());
    }
    assert_eq!(
        names,
        ["target.pokeMany(dynArr_0);", "target.pokeMany(dynArr_1);", "target.pokeMany(dynArr_2);"]
    );
}

#[test]
fn elementary_literals_match_their_types() {
    let provider = provider();
    let decoder = Decoder::new(&Echidna, &provider, TARGET);
    let raw = echidna_call(
        "setLabel",
        json!([
            {"tag": "AbiString", "contents": "\"hi\\n\""},
            {"tag": "AbiBytesDynamic", "contents": "\"\\NUL\\255\""},
        ]),
    );
    let call = decoder.decode_raw(&raw).unwrap();
    let (statements, _) =
        render_call(&call, &mut SequenceContext::new(), RenderOptions::default()).unwrap();
    assert!(statements.contains("target.setLabel(string(hex\"68690a\"), hex\"00ff\");"), "{statements}");
}
