//! Register map of the `caesar` module, generated from `regs/caesar.toml` at build time
#![no_std]

/// Registers, fields and constants of the `caesar` module
pub mod caesar {
    include!(concat!(env!("OUT_DIR"), "/caesar_regs.rs"));
}

/// The generated C header for the `caesar` module
pub const C_HEADER: &str = include_str!(concat!(env!("OUT_DIR"), "/caesar_regs.h"));
