//! hdlregs --- Generate VHDL, C, Rust and JSON register map artifacts from a register map defined
//! in TOML.

// Export full API at crate root
pub use api::*;

mod api;
mod codegen;
mod error;
mod frontend;
mod model;
mod util;
