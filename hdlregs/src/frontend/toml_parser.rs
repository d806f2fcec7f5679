//! Parse a register map from a TOML file
//!
//! The file may contain three top-level tables, processed in this order: `constant`, `register`
//! and `register_array`. Entries of each table are processed in file order, which decides the
//! register indices.

use std::path;

use crate::{
    error::{Error, ModelError, TomlParseError},
    model::{
        ConstantValue, FieldType, Mode, Register, RegisterList, UnsignedVector, DATA_WIDTH,
    },
};
use fs_err as fs;
use log::{debug, warn};
use toml::{Table, Value};

const RECOGNIZED_CONSTANT_ITEMS: &[&str] = &["value", "description", "data_type"];
const RECOGNIZED_REGISTER_ITEMS: &[&str] = &["mode", "description", "bit", "bit_vector", "integer"];
const RECOGNIZED_REGISTER_ARRAY_ITEMS: &[&str] = &["array_length", "description", "register"];
const RECOGNIZED_BIT_ITEMS: &[&str] = &["description", "default_value"];
const RECOGNIZED_BIT_VECTOR_ITEMS: &[&str] = &["description", "width", "default_value"];
const RECOGNIZED_INTEGER_ITEMS: &[&str] =
    &["description", "min_value", "max_value", "default_value"];

/// Read and parse a TOML file without interpreting its contents
pub(crate) fn load_toml_file(toml_file: &path::Path) -> Result<Table, Error> {
    if !toml_file.exists() {
        return Err(Error::FileNotFound(toml_file.to_owned()));
    }
    let raw_toml = fs::read_to_string(toml_file)?;
    parse_table(&raw_toml).map_err(|err| err.with_fname(toml_file.display().to_string()).into())
}

fn parse_table(raw_toml: &str) -> Result<Table, TomlParseError> {
    toml::from_str::<Table>(raw_toml).map_err(|err| TomlParseError::Syntax(err.to_string()))
}

/// Parse a register TOML file
///
/// # Arguments
///
/// * `module_name` - name of the module that these registers belong to
/// * `toml_file` - path to the TOML file
/// * `default_registers` - registers that every register list starts out with
pub fn from_toml(
    module_name: &str,
    toml_file: &path::Path,
    default_registers: &[Register],
) -> Result<RegisterList, Error> {
    let table = load_toml_file(toml_file)?;
    let fname = toml_file.display().to_string();
    let register_list = RegisterList::with_default_registers(
        module_name,
        Some(toml_file.to_owned()),
        default_registers,
    )?;
    let register_list = RegisterParser::new(register_list)
        .parse(&table)
        .map_err(|err| err.with_fname(fname))?;
    debug!(
        "parsed {} registers and {} constants from {}",
        register_list.num_registers(),
        register_list.constants().len(),
        toml_file.display()
    );
    Ok(register_list)
}

/// Parse register TOML data that does not originate from a file
pub fn from_toml_str(
    module_name: &str,
    raw_toml: &str,
    default_registers: &[Register],
) -> Result<RegisterList, Error> {
    const FNAME: &str = "<string>";
    let table = parse_table(raw_toml).map_err(|err| err.with_fname(FNAME.to_owned()))?;
    let register_list =
        RegisterList::with_default_registers(module_name, None, default_registers)?;
    Ok(RegisterParser::new(register_list)
        .parse(&table)
        .map_err(|err| err.with_fname(FNAME.to_owned()))?)
}

fn check_keys(items: &Table, item: &str, recognized: &[&str]) -> Result<(), TomlParseError> {
    match items.keys().find(|key| !recognized.contains(&key.as_str())) {
        Some(key) => Err(TomlParseError::UnknownKey {
            item: item.to_owned(),
            key: key.clone(),
        }),
        None => Ok(()),
    }
}

fn missing(item: &str, key: &str) -> TomlParseError {
    TomlParseError::MissingKey {
        item: item.to_owned(),
        key: key.to_owned(),
    }
}

fn invalid_type(item: &str, key: &str, expected: &'static str) -> TomlParseError {
    TomlParseError::InvalidType {
        item: item.to_owned(),
        key: key.to_owned(),
        expected,
    }
}

fn model_err(item: &str) -> impl FnOnce(ModelError) -> TomlParseError + '_ {
    move |source| match source {
        ModelError::DuplicateName(name) => TomlParseError::DuplicateName(name),
        source => TomlParseError::Model {
            item: item.to_owned(),
            source,
        },
    }
}

fn as_table<'a>(value: &'a Value, item: &str, key: &str) -> Result<&'a Table, TomlParseError> {
    value.as_table().ok_or_else(|| invalid_type(item, key, "a table"))
}

fn get_str<'a>(items: &'a Table, item: &str, key: &str) -> Result<Option<&'a str>, TomlParseError> {
    items
        .get(key)
        .map(|v| v.as_str().ok_or_else(|| invalid_type(item, key, "a string")))
        .transpose()
}

fn get_integer(items: &Table, item: &str, key: &str) -> Result<Option<i64>, TomlParseError> {
    items
        .get(key)
        .map(|v| v.as_integer().ok_or_else(|| invalid_type(item, key, "an integer")))
        .transpose()
}

/// Iterate the entries of the sub-table `key`, requiring every entry to be a table as well
fn sub_tables<'a>(
    items: &'a Table,
    item: &str,
    key: &str,
) -> Result<Vec<(&'a str, &'a Table)>, TomlParseError> {
    let Some(value) = items.get(key) else {
        return Ok(vec![]);
    };
    as_table(value, item, key)?
        .iter()
        .map(|(name, value)| Ok((name.as_str(), as_table(value, item, name)?)))
        .collect()
}

fn parse_mode(items: &Table, item: &str) -> Result<Option<Mode>, TomlParseError> {
    get_str(items, item, "mode")?
        .map(|mode| mode.parse::<Mode>().map_err(model_err(item)))
        .transpose()
}

struct RegisterParser {
    register_list: RegisterList,
    default_register_names: Vec<String>,
}

impl RegisterParser {
    fn new(register_list: RegisterList) -> Self {
        let default_register_names = register_list
            .iterate_registers()
            .map(|(reg, _)| reg.name().to_owned())
            .collect();
        Self {
            register_list,
            default_register_names,
        }
    }

    fn parse(mut self, register_data: &Table) -> Result<RegisterList, TomlParseError> {
        for key in register_data.keys() {
            if !["constant", "register", "register_array"].contains(&key.as_str()) {
                warn!("ignoring unknown top level item \"{key}\"");
            }
        }

        for (name, items) in sub_tables(register_data, "register map", "constant")? {
            self.parse_constant(name, items)?;
        }
        for (name, items) in sub_tables(register_data, "register map", "register")? {
            self.parse_plain_register(name, items)?;
        }
        for (name, items) in sub_tables(register_data, "register map", "register_array")? {
            self.parse_register_array(name, items)?;
        }

        Ok(self.register_list)
    }

    fn parse_constant(&mut self, name: &str, items: &Table) -> Result<(), TomlParseError> {
        let item = format!("constant \"{name}\"");
        let value = items.get("value").ok_or_else(|| missing(&item, "value"))?;
        check_keys(items, &item, RECOGNIZED_CONSTANT_ITEMS)?;
        let description = get_str(items, &item, "description")?.unwrap_or_default();
        let data_type = get_str(items, &item, "data_type")?;

        let value = match (value, data_type) {
            (Value::String(s), None) => ConstantValue::String(s.clone()),
            (Value::String(s), Some("unsigned")) => UnsignedVector::from_literal(s)
                .map(ConstantValue::UnsignedVector)
                .ok_or_else(|| {
                    model_err(&item)(ModelError::InvalidUnsignedLiteral {
                        constant: name.to_owned(),
                        value: s.clone(),
                    })
                })?,
            (Value::String(_), Some(data_type)) => {
                return Err(TomlParseError::InvalidDataType {
                    constant: name.to_owned(),
                    data_type: data_type.to_owned(),
                })
            }
            (_, Some(_)) => return Err(TomlParseError::DataTypeOnNonString(name.to_owned())),
            (Value::Integer(i), None) => ConstantValue::Integer(*i),
            (Value::Boolean(b), None) => ConstantValue::Boolean(*b),
            (Value::Float(f), None) => ConstantValue::Float(*f),
            (_, None) => {
                return Err(invalid_type(
                    &item,
                    "value",
                    "an integer, float, boolean or string",
                ))
            }
        };

        self.register_list
            .add_constant(name, value, description)
            .map_err(model_err(&item))?;
        Ok(())
    }

    fn parse_plain_register(&mut self, name: &str, items: &Table) -> Result<(), TomlParseError> {
        let item = format!("register \"{name}\"");
        check_keys(items, &item, RECOGNIZED_REGISTER_ITEMS)?;
        let description = get_str(items, &item, "description")?;

        let register = if self.default_register_names.iter().any(|n| n == name) {
            // Default registers can be updated with a custom description and the fields used in
            // this module, but the mode is fixed
            if items.contains_key("mode") {
                return Err(TomlParseError::ModeOverride(name.to_owned()));
            }
            let register = self
                .register_list
                .get_register_mut(name)
                .map_err(model_err(&item))?;
            register.description = description.unwrap_or_default().to_owned();
            register
        } else {
            let mode = parse_mode(items, &item)?.ok_or_else(|| missing(&item, "mode"))?;
            self.register_list
                .append_register(name, mode, description.unwrap_or_default())
                .map_err(model_err(&item))?
        };

        parse_fields(register, items)
    }

    fn parse_register_array(&mut self, name: &str, items: &Table) -> Result<(), TomlParseError> {
        let item = format!("register array \"{name}\"");
        let length =
            get_integer(items, &item, "array_length")?.ok_or_else(|| missing(&item, "array_length"))?;
        check_keys(items, &item, RECOGNIZED_REGISTER_ARRAY_ITEMS)?;
        if !items.contains_key("register") {
            return Err(missing(&item, "register"));
        }
        let description = get_str(items, &item, "description")?.unwrap_or_default();

        let length = usize::try_from(length)
            .map_err(|_| ModelError::InvalidArrayLength {
                array: name.to_owned(),
                length,
            })
            .map_err(model_err(&item))?;
        let register_array = self
            .register_list
            .append_register_array(name, length, description)
            .map_err(model_err(&item))?;

        for (register_name, register_items) in sub_tables(items, &item, "register")? {
            let register_item = format!("register \"{register_name}\" within array \"{name}\"");
            let mode = parse_mode(register_items, &register_item)?
                .ok_or_else(|| missing(&register_item, "mode"))?;
            check_keys(register_items, &register_item, RECOGNIZED_REGISTER_ITEMS)?;
            let description =
                get_str(register_items, &register_item, "description")?.unwrap_or_default();

            let register = register_array
                .append_register(register_name, mode, description)
                .map_err(model_err(&register_item))?;
            parse_fields(register, register_items)?;
        }

        Ok(())
    }
}

/// Parse the `bit`, `bit_vector` and `integer` tables of a register
fn parse_fields(register: &mut Register, items: &Table) -> Result<(), TomlParseError> {
    let register_item = format!("register \"{}\"", register.name());

    for (field_name, field_items) in sub_tables(items, &register_item, "bit")? {
        let item = format!("field \"{field_name}\" in register \"{}\"", register.name());
        check_keys(field_items, &item, RECOGNIZED_BIT_ITEMS)?;
        let description = get_str(field_items, &item, "description")?.unwrap_or_default();
        let default_value = get_str(field_items, &item, "default_value")?.unwrap_or("0");

        register
            .append_bit(field_name, description, default_value)
            .map_err(model_err(&item))?;
    }

    for (field_name, field_items) in sub_tables(items, &register_item, "bit_vector")? {
        let item = format!("field \"{field_name}\" in register \"{}\"", register.name());
        let width = get_integer(field_items, &item, "width")?.ok_or_else(|| missing(&item, "width"))?;
        check_keys(field_items, &item, RECOGNIZED_BIT_VECTOR_ITEMS)?;
        let width = u32::try_from(width)
            .ok()
            .filter(|width| (1..=DATA_WIDTH).contains(width))
            .ok_or_else(|| ModelError::InvalidFieldWidth {
                field: field_name.to_owned(),
                width,
            })
            .map_err(model_err(&item))?;
        let description = get_str(field_items, &item, "description")?.unwrap_or_default();
        let zeros = "0".repeat(width as usize);
        let default_value = get_str(field_items, &item, "default_value")?.unwrap_or(&zeros);

        register
            .append_bit_vector(
                field_name,
                description,
                width,
                default_value,
                FieldType::Unsigned,
            )
            .map_err(model_err(&item))?;
    }

    for (field_name, field_items) in sub_tables(items, &register_item, "integer")? {
        let item = format!("field \"{field_name}\" in register \"{}\"", register.name());
        let max_value =
            get_integer(field_items, &item, "max_value")?.ok_or_else(|| missing(&item, "max_value"))?;
        check_keys(field_items, &item, RECOGNIZED_INTEGER_ITEMS)?;
        let description = get_str(field_items, &item, "description")?.unwrap_or_default();
        let min_value = get_integer(field_items, &item, "min_value")?.unwrap_or(0);
        let default_value = get_integer(field_items, &item, "default_value")?.unwrap_or(min_value);

        register
            .append_integer(field_name, description, min_value, max_value, default_value)
            .map_err(model_err(&item))?;
    }

    Ok(())
}
