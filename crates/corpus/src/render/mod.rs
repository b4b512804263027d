//! Output of decoded sequences: Foundry tests and the other fuzzer's corpus format.

mod convert;
pub use convert::{ConvertOptions, convert_sequence};

mod solidity;
pub use solidity::{RenderOptions, render_call, render_contract, render_params, render_test};
