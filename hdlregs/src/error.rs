use std::{io, path};

use thiserror::Error;

/// Violation of a register map invariant
#[derive(Error, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum ModelError {
    #[error("invalid {kind} name \"{name}\": a name must start with a letter and may only contain letters, digits and underscores")]
    InvalidName { kind: &'static str, name: String },
    #[error("invalid register mode \"{0}\"")]
    InvalidMode(String),
    #[error("duplicate register name \"{0}\"")]
    DuplicateName(String),
    #[error("duplicate constant name \"{0}\"")]
    DuplicateConstantName(String),
    #[error("duplicate field name \"{field}\" in register \"{register}\"")]
    DuplicateFieldName { register: String, field: String },
    #[error("maximum width exceeded for register \"{register}\": field \"{field}\" would end at bit {end} but registers are 32 bits wide")]
    FieldWidthOverflow {
        register: String,
        field: String,
        end: u32,
    },
    #[error("invalid width {width} for field \"{field}\", must be between 1 and 32")]
    InvalidFieldWidth { field: String, width: i64 },
    #[error("invalid default value \"{value}\" for bit \"{field}\", must be \"0\" or \"1\"")]
    InvalidBitDefault { field: String, value: String },
    #[error("invalid default value \"{value}\" for bit vector \"{field}\", must be {width} characters of '0' or '1'")]
    InvalidBitVectorDefault {
        field: String,
        value: String,
        width: u32,
    },
    #[error("fixed point field \"{field}\" with bit indices {max_bit_index} downto {min_bit_index} does not fit width {width}")]
    FixedPointWidthMismatch {
        field: String,
        width: u32,
        max_bit_index: i32,
        min_bit_index: i32,
    },
    #[error("invalid range for integer \"{field}\": min {min} is greater than max {max}")]
    InvalidIntegerRange { field: String, min: i64, max: i64 },
    #[error("default value {default} for integer \"{field}\" is outside of range {min}..={max}")]
    IntegerDefaultOutOfRange {
        field: String,
        default: i64,
        min: i64,
        max: i64,
    },
    #[error("integer \"{field}\" requires {width} bits which does not fit a register")]
    IntegerTooWide { field: String, width: u32 },
    #[error("value {value} is not valid for field \"{field}\"")]
    FieldValueOutOfRange { field: String, value: String },
    #[error("field \"{field}\" expects {expected} value")]
    FieldValueKind {
        field: String,
        expected: &'static str,
    },
    #[error("register \"{register}\" has no field \"{field}\"")]
    FieldNotFound { register: String, field: String },
    #[error("invalid length {length} for register array \"{array}\", must be between 1 and {}", crate::model::MAX_NUM_REGISTERS)]
    InvalidArrayLength { array: String, length: i64 },
    #[error("array index {index} out of bounds for register array \"{array}\" of length {length}")]
    ArrayIndexOutOfBounds {
        array: String,
        index: usize,
        length: usize,
    },
    #[error("register \"{0}\" does not fit into the 32-bit address space")]
    AddressSpaceExceeded(String),
    #[error("could not find register \"{0}\"")]
    RegisterNotFound(String),
    #[error("could not find register array \"{0}\"")]
    RegisterArrayNotFound(String),
    #[error("could not find constant \"{0}\"")]
    ConstantNotFound(String),
    #[error("constant \"{0}\" is not a finite number")]
    NonFiniteConstant(String),
    #[error("invalid unsigned literal \"{value}\" for constant \"{constant}\", expected a 0b or 0x prefixed value of at most 64 bits")]
    InvalidUnsignedLiteral { constant: String, value: String },
}

/// Error that happened while interpreting the contents of a register TOML file
#[derive(Error, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum TomlParseError {
    #[error("TOML syntax error:\n{0}")]
    Syntax(String),
    #[error("error while parsing {item}: unknown key \"{key}\"")]
    UnknownKey { item: String, key: String },
    #[error("{item} does not have the required \"{key}\" property")]
    MissingKey { item: String, key: String },
    #[error("\"{key}\" of {item} must be {expected}")]
    InvalidType {
        item: String,
        key: String,
        expected: &'static str,
    },
    #[error("overloading register \"{0}\": one can not change \"mode\" from default")]
    ModeOverride(String),
    #[error("constant \"{0}\": may not set \"data_type\" for non-string constant")]
    DataTypeOnNonString(String),
    #[error("constant \"{constant}\": invalid data type \"{data_type}\"")]
    InvalidDataType { constant: String, data_type: String },
    #[error("duplicate name \"{0}\"")]
    DuplicateName(String),
    #[error("error while parsing {item}: {source}")]
    Model { item: String, source: ModelError },
}

/// A [`TomlParseError`] tagged with the file it originates from
#[derive(Error, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[error("{fname}: {err}")]
pub struct ParseFileError {
    pub(crate) fname: String,
    pub(crate) err: TomlParseError,
}

impl ParseFileError {
    pub fn kind(&self) -> &TomlParseError {
        &self.err
    }
}

impl TomlParseError {
    pub(crate) fn with_fname(self, fname: String) -> ParseFileError {
        ParseFileError { fname, err: self }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("requested TOML file does not exist: {0}")]
    FileNotFound(path::PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseFileError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("cannot generate {kind}: name \"{name}\" would be defined more than once")]
    NameCollision { kind: &'static str, name: String },
}
