//! VHDL package with register indices, field ranges, the register map and constants

use crate::{
    codegen::{float_literal, CodeGenerator},
    model::{ConstantValue, Register, RegisterArray, RegisterList, RegisterObject, DATA_WIDTH},
};
use indoc::formatdoc;
use itertools::Itertools;

pub struct VhdlGenerator<'a> {
    register_list: &'a RegisterList,
}

impl<'a> VhdlGenerator<'a> {
    pub fn new(register_list: &'a RegisterList) -> Self {
        Self { register_list }
    }

    fn module_name(&self) -> &str {
        self.register_list.name()
    }

    fn register_name(&self, register: &Register, register_array: Option<&RegisterArray>) -> String {
        match register_array {
            None => format!("{}_{}", self.module_name(), register.name()),
            Some(array) => format!("{}_{}_{}", self.module_name(), array.name(), register.name()),
        }
    }

    fn register_function_signature(&self, register: &Register, array: &RegisterArray) -> String {
        format!(
            "function {}(array_index : natural) return natural",
            self.register_name(register, Some(array))
        )
    }

    fn array_length_constant_name(&self, array: &RegisterArray) -> String {
        format!("{}_{}_array_length", self.module_name(), array.name())
    }

    fn arrays(&self) -> impl Iterator<Item = &RegisterArray> {
        self.register_list
            .register_objects()
            .iter()
            .filter_map(|obj| match obj {
                RegisterObject::Array(array) => Some(array),
                RegisterObject::Register(_) => None,
            })
    }

    fn register_indices(&self) -> String {
        let vhdl = self
            .register_list
            .iterate_registers()
            .map(|(register, array)| match array {
                None => format!(
                    "  constant {} : natural := {};\n",
                    self.register_name(register, None),
                    register.index()
                ),
                Some(array) => format!("  {};\n", self.register_function_signature(register, array)),
            })
            .collect::<String>();
        with_blank_line(vhdl)
    }

    fn array_constants(&self) -> String {
        let vhdl = self
            .arrays()
            .map(|array| {
                format!(
                    "  constant {} : natural := {};\n",
                    self.array_length_constant_name(array),
                    array.length()
                )
            })
            .collect::<String>();
        with_blank_line(vhdl)
    }

    fn register_map(&self) -> String {
        let Some(last) = self.register_list.register_objects().last() else {
            // Constants without registers are allowed
            return String::new();
        };
        let name = self.module_name();
        formatdoc! {"
            {indent}-- Declare register map constants here, but define them in body.
            {indent}-- This is done so that functions have been elaborated when they are called.
            {indent}subtype {name}_reg_range is natural range 0 to {last_index};
            {indent}constant {name}_reg_map : reg_definition_vec_t({name}_reg_range);

            {indent}subtype {name}_regs_t is reg_vec_t({name}_reg_range);
            {indent}constant {name}_regs_init : {name}_regs_t;

            {indent}subtype {name}_reg_was_accessed_t is std_logic_vector({name}_reg_range);

            ",
            indent = "  ",
            last_index = last.index(),
        }
    }

    fn register_map_body(&self) -> String {
        if self.register_list.register_objects().is_empty() {
            return String::new();
        }
        let name = self.module_name();

        let mut definitions = vec![];
        let mut default_values = vec![];
        let mut push = |idx: String, register: &Register| {
            let opening = format!("{} => ", definitions.len());
            definitions.push(format!(
                "{opening}(idx => {idx}, reg_type => {})",
                register.mode().as_str()
            ));
            default_values.push(format!(
                "{opening}std_logic_vector(to_signed({}, {DATA_WIDTH}))",
                // Reinterpret as signed so that values with the top bit set fit the integer range
                register.default_value() as i32
            ));
        };
        for obj in self.register_list.register_objects() {
            match obj {
                RegisterObject::Register(register) => push(self.register_name(register, None), register),
                RegisterObject::Array(array) => {
                    for array_index in 0..array.length() {
                        for register in array.registers() {
                            let idx = format!(
                                "{}({array_index})",
                                self.register_name(register, Some(array))
                            );
                            push(idx, register);
                        }
                    }
                }
            }
        }

        let separator = ",\n    ";
        formatdoc! {"
            {indent}constant {name}_reg_map : reg_definition_vec_t({name}_reg_range) := (
            {indent}  {definitions}
            {indent});

            {indent}constant {name}_regs_init : {name}_regs_t := (
            {indent}  {default_values}
            {indent});

            ",
            indent = "  ",
            definitions = definitions.join(separator),
            default_values = default_values.join(separator),
        }
    }

    fn register_fields(&self) -> String {
        let mut vhdl = String::new();
        for (register, array) in self.register_list.iterate_registers() {
            for field in register.fields() {
                let name = format!("{}_{}", self.register_name(register, array), field.name());
                if field.width() == 1 {
                    vhdl += &format!("  constant {name} : natural := {};\n", field.base_index());
                } else {
                    vhdl += &formatdoc! {"
                        {indent}subtype {name} is natural range {msb} downto {lsb};
                        {indent}constant {name}_width : positive := {width};
                        ",
                        indent = "  ",
                        msb = field.base_index() + field.width() - 1,
                        lsb = field.base_index(),
                        width = field.width(),
                    };
                }
            }
            if !register.fields().is_empty() {
                vhdl.push('\n');
            }
        }
        vhdl
    }

    fn constants(&self) -> String {
        let vhdl = self
            .register_list
            .constants()
            .iter()
            .map(|constant| {
                let (vhdl_type, value) = match constant.value() {
                    ConstantValue::Integer(v) => ("integer".to_owned(), v.to_string()),
                    ConstantValue::Boolean(v) => ("boolean".to_owned(), v.to_string()),
                    ConstantValue::Float(v) => ("real".to_owned(), float_literal(*v)),
                    ConstantValue::String(v) => {
                        ("string".to_owned(), format!("\"{}\"", v.replace('"', "\"\"")))
                    }
                    ConstantValue::UnsignedVector(v) => (
                        format!("unsigned({} downto 0)", v.width() - 1),
                        format!("\"{}\"", v.to_binary_string()),
                    ),
                };
                format!(
                    "  constant {}_constant_{} : {vhdl_type} := {value};\n",
                    self.module_name(),
                    constant.name()
                )
            })
            .collect::<String>();
        with_blank_line(vhdl)
    }

    fn array_index_functions(&self) -> String {
        self.arrays()
            .flat_map(|array| {
                let num_registers = array.registers().len();
                let array_length = self.array_length_constant_name(array);
                array.registers().iter().map(move |register| {
                    formatdoc! {r#"
                        {indent}{signature} is
                        {indent}begin
                        {indent}  assert array_index < {array_length}
                        {indent}    report "Array index out of bounds: " & natural'image(array_index)
                        {indent}    severity failure;
                        {indent}  return {base_index} + array_index * {num_registers} + {index};
                        {indent}end function;

                        "#,
                        indent = "  ",
                        signature = self.register_function_signature(register, array),
                        base_index = array.base_index(),
                        index = register.index(),
                    }
                })
            })
            .join("")
    }
}

/// Separate a non-empty section from the next one
fn with_blank_line(mut vhdl: String) -> String {
    if !vhdl.is_empty() {
        vhdl.push('\n');
    }
    vhdl
}

impl CodeGenerator for VhdlGenerator<'_> {
    fn kind(&self) -> &'static str {
        "VHDL package"
    }

    fn file_name(&self) -> String {
        format!("{}_regs_pkg.vhd", self.module_name())
    }

    fn register_list(&self) -> &RegisterList {
        self.register_list
    }

    fn comment_prefix(&self) -> &'static str {
        "-- "
    }

    fn body(&self) -> String {
        let pkg_name = format!("{}_regs_pkg", self.module_name());
        format!(
            "library ieee;\n\
             use ieee.std_logic_1164.all;\n\
             use ieee.numeric_std.all;\n\
             \n\
             library reg_file;\n\
             use reg_file.reg_file_pkg.all;\n\
             \n\
             \n\
             package {pkg_name} is\n\
             \n\
             {}{}{}{}{}\
             end package;\n\
             \n\
             package body {pkg_name} is\n\
             \n\
             {}{}\
             end package body;\n",
            self.register_indices(),
            self.array_constants(),
            self.register_map(),
            self.register_fields(),
            self.constants(),
            self.array_index_functions(),
            self.register_map_body(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mode, UnsignedVector};

    fn example_list() -> RegisterList {
        let mut list = RegisterList::new("caesar", None).unwrap();
        let conf = list
            .append_register("conf", Mode::ReadWrite, "")
            .unwrap();
        conf.append_bit("enable", "", "1").unwrap();
        conf.append_integer("level", "", 0, 10, 4).unwrap();
        list.append_register("status", Mode::Read, "").unwrap();
        let array = list.append_register_array("channels", 3, "").unwrap();
        array
            .append_register("gain", Mode::ReadWrite, "")
            .unwrap()
            .append_bit_vector("value", "", 32, &"1".repeat(32), Default::default())
            .unwrap();
        array.append_register("count", Mode::Read, "").unwrap();
        list.add_constant("data_width", ConstantValue::Integer(24), "")
            .unwrap();
        list
    }

    #[test]
    fn register_indices_and_functions() {
        let list = example_list();
        let vhdl = VhdlGenerator::new(&list).body();
        assert!(vhdl.contains("package caesar_regs_pkg is\n"));
        assert!(vhdl.contains("  constant caesar_conf : natural := 0;\n"));
        assert!(vhdl.contains("  constant caesar_status : natural := 1;\n"));
        assert!(vhdl.contains(
            "  function caesar_channels_gain(array_index : natural) return natural;\n"
        ));
        assert!(vhdl.contains("  constant caesar_channels_array_length : natural := 3;\n"));
        assert!(vhdl.contains("    return 2 + array_index * 2 + 1;\n"));
        assert!(vhdl.contains("    assert array_index < caesar_channels_array_length\n"));
    }

    #[test]
    fn register_map() {
        let list = example_list();
        let vhdl = VhdlGenerator::new(&list).body();
        assert!(vhdl.contains("  subtype caesar_reg_range is natural range 0 to 7;\n"));
        assert!(vhdl.contains("    0 => (idx => caesar_conf, reg_type => r_w),\n"));
        assert!(vhdl.contains("    7 => (idx => caesar_channels_count(2), reg_type => r)\n"));
        // enable = 1, level = 4 at bit 1
        assert!(vhdl.contains("    0 => std_logic_vector(to_signed(9, 32)),\n"));
        assert!(vhdl.contains("    2 => std_logic_vector(to_signed(-1, 32)),\n"));
    }

    #[test]
    fn fields_and_constants() {
        let list = example_list();
        let vhdl = VhdlGenerator::new(&list).body();
        assert!(vhdl.contains("  constant caesar_conf_enable : natural := 0;\n"));
        assert!(vhdl.contains("  subtype caesar_conf_level is natural range 4 downto 1;\n"));
        assert!(vhdl.contains("  constant caesar_conf_level_width : positive := 4;\n"));
        assert!(vhdl.contains("  subtype caesar_channels_gain_value is natural range 31 downto 0;\n"));
        assert!(vhdl.contains("  constant caesar_constant_data_width : integer := 24;\n"));
    }

    #[test]
    fn constant_types() {
        let mut list = RegisterList::new("caesar", None).unwrap();
        list.add_constant("enabled", ConstantValue::Boolean(true), "")
            .unwrap();
        list.add_constant("ratio", ConstantValue::Float(2.0), "")
            .unwrap();
        list.add_constant("name", ConstantValue::String("say \"hi\"".to_owned()), "")
            .unwrap();
        let bits = UnsignedVector::from_literal("0b0101").unwrap();
        list.add_constant("bits", ConstantValue::UnsignedVector(bits), "")
            .unwrap();

        let vhdl = VhdlGenerator::new(&list).body();
        assert!(vhdl.contains("  constant caesar_constant_enabled : boolean := true;\n"));
        assert!(vhdl.contains("  constant caesar_constant_ratio : real := 2.0;\n"));
        assert!(vhdl.contains("  constant caesar_constant_name : string := \"say \"\"hi\"\"\";\n"));
        assert!(vhdl.contains(
            "  constant caesar_constant_bits : unsigned(3 downto 0) := \"0101\";\n"
        ));
        // No registers, no register map
        assert!(!vhdl.contains("reg_range"));
        assert!(vhdl.ends_with("package body caesar_regs_pkg is\n\nend package body;\n"));
    }

    #[test]
    fn header_uses_vhdl_comments() {
        let list = example_list();
        let generator = VhdlGenerator::new(&list);
        assert_eq!(generator.file_name(), "caesar_regs_pkg.vhd");
        let vhdl = generator.generate().unwrap();
        assert!(vhdl.starts_with("-- This file is automatically generated by hdlregs"));
        assert!(vhdl.contains("\n\nlibrary ieee;\n"));
    }
}
