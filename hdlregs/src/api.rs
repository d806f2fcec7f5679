//! Exposes functionality supported by this crate
mod error;

use std::path;

use crate::{codegen, frontend::toml_parser, util};
use log::info;
use strum::{EnumIter, IntoStaticStr};

pub use crate::{
    codegen::{
        CHeaderGenerator, CodeGenerator, GenerateOutcome, GeneratedInfo, JsonGenerator,
        RustGenerator, VhdlGenerator, VERSION,
    },
    error::{Error, ModelError, ParseFileError, TomlParseError},
    frontend::toml_parser::from_toml_str,
    model::{
        Bit, BitVector, Constant, ConstantValue, Field, FieldType, FieldValue, Integer, Mode,
        Register, RegisterArray, RegisterField, RegisterList, RegisterObject, UnsignedVector,
        DATA_WIDTH, MAX_NUM_REGISTERS,
    },
};
pub use error::{ApiError, NotImplementedError};

/// A source file for register map metadata
///
/// Only TOML files are currently supported.
#[derive(Clone, Debug)]
pub struct ModelSource {
    path: path::PathBuf,
    module_name: Option<String>,
}

impl ModelSource {
    pub fn new(path: path::PathBuf) -> Self {
        Self {
            path,
            module_name: None,
        }
    }

    /// Use `module_name` instead of deriving the module name from the file name
    #[must_use]
    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    pub fn path(&self) -> &path::Path {
        &self.path
    }

    /// Name of the module that the registers belong to
    ///
    /// Derived from the file name unless set explicitly, e.g., "caesar" for `regs_caesar.toml`.
    pub fn module_name(&self) -> Option<String> {
        self.module_name
            .clone()
            .or_else(|| util::module_name_from_path(&self.path))
    }
}

/// An artifact that can be generated from a register list
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Target {
    /// VHDL package, `<name>_regs_pkg.vhd`
    Vhdl,
    /// C header, `<name>_regs.h`
    CHeader,
    /// Rust module, `<name>_regs.rs`
    Rust,
    /// JSON dump, `<name>_regs.json`
    Json,
}

impl Target {
    pub fn generator<'a>(self, register_list: &'a RegisterList) -> Box<dyn CodeGenerator + 'a> {
        match self {
            Self::Vhdl => Box::new(VhdlGenerator::new(register_list)),
            Self::CHeader => Box::new(CHeaderGenerator::new(register_list)),
            Self::Rust => Box::new(RustGenerator::new(register_list)),
            Self::Json => Box::new(JsonGenerator::new(register_list)),
        }
    }
}

/// Parse the register list defined by `source`
///
/// # Errors
///
/// - the source is not a TOML file
/// - the module name cannot be derived from the file name
/// - the file does not exist, cannot be read or is not a valid register map
pub fn parse(source: &ModelSource) -> Result<RegisterList, ApiError> {
    parse_with_defaults(source, &[])
}

/// Parse the register list defined by `source`, starting out with `default_registers`
///
/// The source may add fields to default registers and change their description, but not their
/// mode.
///
/// # Errors
///
/// - see [`parse`]
pub fn parse_with_defaults(
    source: &ModelSource,
    default_registers: &[Register],
) -> Result<RegisterList, ApiError> {
    if source.path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
        return Err(NotImplementedError::UnsupportedSourceFormat(source.path.clone()).into());
    }
    let module_name = source
        .module_name()
        .ok_or_else(|| ApiError::UnknownModuleName(source.path.clone()))?;

    let register_list = toml_parser::from_toml(&module_name, &source.path, default_registers)?;
    info!(
        "Parsed {} registers for module \"{module_name}\" from {}.",
        register_list.num_registers(),
        source.path.display()
    );
    Ok(register_list)
}

/// Generate the complete artifact for `target` as a string
///
/// # Errors
///
/// - the register list cannot be expressed in the target language, e.g., two names map onto the
///   same Rust identifier
pub fn generate(register_list: &RegisterList, target: Target) -> Result<String, ApiError> {
    Ok(target.generator(register_list).generate()?)
}

/// Write the artifact for `target` into `output_dir`, unless an up to date file exists already
///
/// # Errors
///
/// - the register list cannot be expressed in the target language
/// - `output_dir` cannot be created or the file cannot be written
pub fn create(
    register_list: &RegisterList,
    target: Target,
    output_dir: &path::Path,
) -> Result<GenerateOutcome, ApiError> {
    Ok(codegen::create(
        target.generator(register_list).as_ref(),
        output_dir,
    )?)
}

/// Decode `value` into the values of the fields of a register
///
/// # Arguments
///
/// * `register_name` - name of the register
/// * `array` - name of the enclosing register array and the array element index, if any
/// * `value` - the register value
///
/// # Errors
///
/// - the register does not exist or the array index is out of bounds
/// - a field holds a value that is not allowed for it
pub fn decode_register_value(
    register_list: &RegisterList,
    register_name: &str,
    array: Option<(&str, usize)>,
    value: u32,
) -> Result<Vec<(String, FieldValue)>, ApiError> {
    let (register, _) = register_list.resolve_register(register_name, array)?;
    Ok(register
        .field_values(value)?
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect())
}

/// Encode a register value from field values, other fields take their default value
///
/// # Errors
///
/// - the register or a field does not exist, or the array index is out of bounds
/// - a value does not fit its field
pub fn encode_register_value(
    register_list: &RegisterList,
    register_name: &str,
    array: Option<(&str, usize)>,
    field_values: &[(&str, FieldValue)],
) -> Result<u32, ApiError> {
    let (register, _) = register_list.resolve_register(register_name, array)?;
    Ok(register.value_from_fields(field_values)?)
}
