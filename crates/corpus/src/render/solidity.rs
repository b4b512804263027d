//! Foundry test source for decoded call sequences.

use crate::{Action, DecodeError, DecodedCall, SequenceContext, ValueNode, codec::unicode_escape};
use alloy_primitives::{U256, hex};
use fuzz_utils_abi::TypeNode;
use std::fmt::Write;

/// Indentation of statements inside a test function.
const INDENT: &str = "        ";

/// Knobs of the generated source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Call functions with named arguments, `target.f({a: 1, b: 2})`.
    pub named_inputs: bool,
    /// Write ASCII strings as `unicode"..."` literals instead of hex.
    pub unicode_strings: bool,
}

/// Renders call arguments as Solidity expressions.
///
/// Returns the statements that have to run before the call, which declare and fill dynamic memory
/// arrays, together with one expression per value. Integer literals are only cast to their width
/// when `is_nested`, at the top level the function signature determines it.
pub fn render_params<'t>(
    values: &[ValueNode],
    types: impl IntoIterator<Item = &'t TypeNode>,
    is_nested: bool,
    ctx: &mut SequenceContext,
    options: RenderOptions,
) -> Result<(String, Vec<String>), DecodeError> {
    let mut declarations = String::new();
    let literals = values
        .iter()
        .zip(types)
        .map(|(value, ty)| render_value(value, ty, is_nested, ctx, options, &mut declarations))
        .collect::<Result<_, _>>()?;
    Ok((declarations, literals))
}

fn render_value(
    value: &ValueNode,
    ty: &TypeNode,
    is_nested: bool,
    ctx: &mut SequenceContext,
    options: RenderOptions,
    declarations: &mut String,
) -> Result<String, DecodeError> {
    Ok(match value {
        ValueNode::Bool(b) => b.to_string(),
        ValueNode::Uint { value, bits } if is_nested => format!("uint{bits}({value})"),
        ValueNode::Int { value, bits } if is_nested => format!("int{bits}({value})"),
        ValueNode::Uint { value, .. } => value.to_string(),
        ValueNode::Int { value, .. } => value.to_string(),
        ValueNode::Address(address) => address.to_checksum(None),
        ValueNode::FixedBytes(bytes) => format!("bytes{}(hex\"{}\")", bytes.len(), hex::encode(bytes)),
        ValueNode::Bytes(bytes) if is_nested => format!("bytes(hex\"{}\")", hex::encode(bytes)),
        ValueNode::Bytes(bytes) => format!("hex\"{}\"", hex::encode(bytes)),
        ValueNode::String(bytes) if options.unicode_strings && bytes.is_ascii() => {
            format!("string(unicode\"{}\")", unicode_escape(bytes))
        }
        ValueNode::String(bytes) => format!("string(hex\"{}\")", hex::encode(bytes)),
        ValueNode::FixedArray(items) => {
            let element = element_type(ty)?;
            let items = items
                .iter()
                .map(|item| render_value(item, element, true, ctx, options, declarations))
                .collect::<Result<Vec<_>, _>>()?;
            format!("[{}]", items.join(", "))
        }
        ValueNode::Array(items) => {
            let element = element_type(ty)?;
            let items = items
                .iter()
                .map(|item| render_value(item, element, true, ctx, options, declarations))
                .collect::<Result<Vec<_>, _>>()?;
            let name = ctx.next_array_name();
            let _ = writeln!(
                declarations,
                "{INDENT}{element}[] memory {name} = new {element}[]({});",
                items.len()
            );
            for (index, item) in items.iter().enumerate() {
                let _ = writeln!(declarations, "{INDENT}{name}[{index}] = {item};");
            }
            name
        }
        ValueNode::Struct { name, fields } => {
            if name.is_empty() {
                return Err(DecodeError::AnonymousTuple);
            }
            let types = match ty {
                TypeNode::Struct { fields, .. } => fields.as_slice(),
                _ => return Err(DecodeError::malformed(ty, "value is a struct")),
            };
            let literals = fields
                .iter()
                .zip(types)
                .map(|((_, value), (_, ty))| render_value(value, ty, false, ctx, options, declarations))
                .collect::<Result<Vec<_>, _>>()?;
            format!("{name}({})", literals.join(", "))
        }
        ValueNode::Enum { name, value } => format!("{name}({value})"),
    })
}

fn element_type(ty: &TypeNode) -> Result<&TypeNode, DecodeError> {
    ty.element().ok_or_else(|| DecodeError::malformed(ty, "value is an array"))
}

/// Renders one call as test statements.
///
/// Returns the statements and the called function's name, which is empty for transfers and empty
/// calls.
pub fn render_call(
    call: &DecodedCall,
    ctx: &mut SequenceContext,
    options: RenderOptions,
) -> Result<(String, String), DecodeError> {
    let meta = &call.meta;
    let mut out = String::new();
    let delay = |out: &mut String| {
        let _ = writeln!(out, "{INDENT}vm.warp(block.timestamp + {});", meta.time_delay);
        let _ = writeln!(out, "{INDENT}vm.roll(block.number + {});", meta.block_delay);
    };
    let sender = meta.sender.to_checksum(None);

    match &call.action {
        Action::NoCall => delay(&mut out),
        Action::Transfer => {
            ctx.mark_low_level_call();
            if meta.has_delay() {
                delay(&mut out);
            }
            let _ = writeln!(out, "{INDENT}vm.prank({sender});");
            let _ = writeln!(
                out,
                "{INDENT}(success, ) = payable(address(target)).call{{value: {}}}(\"\");",
                meta.value
            );
            let _ = writeln!(out, "{INDENT}require(success, \"Low level call failed.\");");
        }
        Action::Invoke(invocation) => {
            let function = &invocation.function;
            let (declarations, literals) =
                render_params(&invocation.args, function.input_types(), false, ctx, options)?;
            out.push_str(&declarations);
            if meta.has_delay() {
                delay(&mut out);
            }

            let named = options.named_inputs
                && !literals.is_empty()
                && function.inputs.iter().all(|(name, _)| !name.is_empty());
            let args = if named {
                let pairs: Vec<_> = function
                    .inputs
                    .iter()
                    .zip(&literals)
                    .map(|((name, _), literal)| format!("{name}: {literal}"))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            } else {
                literals.join(", ")
            };

            // non-payable functions revert when called with value
            let value = if function.is_payable() { meta.value } else { U256::ZERO };
            let _ = writeln!(out, "{INDENT}vm.prank({sender});");
            if value.is_zero() {
                let _ = writeln!(out, "{INDENT}target.{}({args});", function.name);
            } else {
                let _ = writeln!(out, "{INDENT}target.{}{{value: {value}}}({args});", function.name);
            }
        }
    }
    Ok((out, call.function_name().to_string()))
}

/// Wraps the statements of one sequence into a test function.
pub fn render_test(
    last_function: &str,
    index: usize,
    source: &str,
    statements: &[String],
    ctx: &SequenceContext,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "    // Reproduces {source}");
    let _ = writeln!(out, "    function test_auto_{last_function}_{index}() public {{");
    if ctx.uses_low_level_call() {
        let _ = writeln!(out, "{INDENT}bool success;");
    }
    for statement in statements {
        out.push_str(statement);
    }
    out.push_str("    }\n");
    out
}

/// Wraps test functions into a Foundry test contract deploying `target`.
pub fn render_contract(target: &str, fuzzer: &str, import: &str, tests: &[String]) -> String {
    let mut out = format!(
        "// SPDX-License-Identifier: UNLICENSED
pragma solidity ^0.8.13;

import \"forge-std/Test.sol\";
import \"forge-std/console2.sol\";
import \"{import}\";

contract {target}_{fuzzer}_Test is Test {{
    {target} target;

    function setUp() public {{
        target = new {target}();
    }}
"
    );
    for test in tests {
        out.push('\n');
        out.push_str(test);
    }
    out.push_str("}\n");
    out
}
