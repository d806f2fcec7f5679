//! Encodes information about the registers, fields and constants of a module. This information
//! can be used to generate code.

mod constant;
mod field;
mod mode;
mod register;
mod register_array;
mod register_list;

// Anything that's part of the public API of the submodules is also part of the public API of model
pub use constant::*;
pub use field::*;
pub use mode::*;
pub use register::*;
pub use register_array::*;
pub use register_list::*;

use crate::error::ModelError;
use lazy_static::lazy_static;
use regex::Regex;

/// Width of every register in bits
pub const DATA_WIDTH: u32 = 32;

/// Number of registers that fit into the 32-bit byte address space of the register bus
pub const MAX_NUM_REGISTERS: usize = 1 << 30;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap();
}

/// Check that `name` can be used as an identifier in all generated languages
///
/// # Arguments
///
/// * `kind` - what is being named, e.g., "register", for error messages
/// * `name` - the name to check
pub(crate) fn validate_name(kind: &'static str, name: &str) -> Result<(), ModelError> {
    if NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ModelError::InvalidName {
            kind,
            name: name.to_owned(),
        })
    }
}

#[test]
fn names_are_validated() {
    assert!(validate_name("register", "conf").is_ok());
    assert!(validate_name("register", "Conf_2").is_ok());
    assert!(validate_name("register", "_conf").is_err());
    assert!(validate_name("register", "2conf").is_err());
    assert!(validate_name("register", "con-f").is_err());
    assert!(validate_name("register", "").is_err());
}
