//! C header with register indices, addresses, field masks and a struct matching the register map

use crate::{
    codegen::{description_comment, float_literal, CodeGenerator},
    model::{ConstantValue, Register, RegisterArray, RegisterList, RegisterObject},
};
use indoc::formatdoc;

pub struct CHeaderGenerator<'a> {
    register_list: &'a RegisterList,
}

impl<'a> CHeaderGenerator<'a> {
    pub fn new(register_list: &'a RegisterList) -> Self {
        Self { register_list }
    }

    fn module_name(&self) -> &str {
        self.register_list.name()
    }

    /// Prefix of every definition, e.g., "CAESAR"
    fn prefix(&self) -> String {
        self.module_name().to_uppercase()
    }

    fn register_define_name(&self, register: &Register, array: Option<&RegisterArray>) -> String {
        match array {
            None => format!("{}_{}", self.prefix(), register.name().to_uppercase()),
            Some(array) => format!(
                "{}_{}_{}",
                self.prefix(),
                array.name().to_uppercase(),
                register.name().to_uppercase()
            ),
        }
    }

    fn array_struct_name(&self, array: &RegisterArray) -> String {
        format!("{}_{}_t", self.module_name(), array.name())
    }

    fn struct_member(register: &Register) -> String {
        format!(
            "  // Mode \"{}\".\n  uint32_t {};\n",
            register.mode().as_str(),
            register.name()
        )
    }

    fn register_struct(&self) -> String {
        let objects = self.register_list.register_objects();
        if objects.is_empty() {
            return String::new();
        }

        let mut array_structs = String::new();
        let mut members = String::new();
        for obj in objects {
            match obj {
                RegisterObject::Register(register) => members += &Self::struct_member(register),
                RegisterObject::Array(array) => {
                    let struct_name = self.array_struct_name(array);
                    let array_members =
                        array.registers().iter().map(Self::struct_member).collect::<String>();
                    array_structs += &formatdoc! {"
                        // Type for the \"{array}\" register array.
                        typedef struct {struct_name}
                        {{
                        {array_members}\
                        }} {struct_name};

                        ",
                        array = array.name(),
                    };
                    members += &format!("  {struct_name} {}[{}];\n", array.name(), array.length());
                }
            }
        }

        let regs_t = format!("{}_regs_t", self.module_name());
        formatdoc! {"
            {array_structs}\
            // Type for this register map.
            typedef struct {regs_t}
            {{
            {members}\
            }} {regs_t};

            "
        }
    }

    fn register_defines(&self, register: &Register, array: Option<&RegisterArray>) -> String {
        let name = self.register_define_name(register, array);
        let mut c = match array {
            None => format!("// Register \"{}\"", register.name()),
            Some(array) => format!(
                "// Register \"{}\" within the \"{}\" register array",
                register.name(),
                array.name()
            ),
        };
        c += &format!(". Mode \"{}\".\n", register.mode().as_str());
        c += &description_comment("// ", &register.description);

        match array {
            None => {
                c += &format!("#define {name}_INDEX ({}u)\n", register.index());
                c += &format!("#define {name}_ADDR (4u * {name}_INDEX)\n");
            }
            Some(array) => {
                c += &format!(
                    "#define {name}_INDEX(array_index) ({}u + (array_index) * {}u + {}u)\n",
                    array.base_index(),
                    array.registers().len(),
                    register.index()
                );
                c += &format!("#define {name}_ADDR(array_index) (4u * {name}_INDEX(array_index))\n");
            }
        }
        c += &format!(
            "#define {name}_DEFAULT_VALUE ({:#010x}u)\n",
            register.default_value()
        );

        for field in register.fields() {
            let field_name = format!("{name}_{}", field.name().to_uppercase());
            c += &format!("\n// {} \"{}\".\n", capitalize(field.kind_str()), field.name());
            c += &description_comment("// ", field.description());
            c += &formatdoc! {"
                #define {field_name}_SHIFT ({shift}u)
                #define {field_name}_MASK ({mask:#x}u << {shift}u)
                #define {field_name}_MASK_INVERSE (~{field_name}_MASK)
                ",
                shift = field.base_index(),
                mask = field.mask() >> field.base_index(),
            };
        }
        c + "\n"
    }

    fn all_register_defines(&self) -> String {
        let mut c = String::new();
        for obj in self.register_list.register_objects() {
            match obj {
                RegisterObject::Register(register) => c += &self.register_defines(register, None),
                RegisterObject::Array(array) => {
                    let array_name = format!("{}_{}", self.prefix(), array.name().to_uppercase());
                    c += &format!("// Register array \"{}\".\n", array.name());
                    c += &description_comment("// ", &array.description);
                    c += &format!(
                        "#define {array_name}_ARRAY_LENGTH ({}u)\n\n",
                        array.length()
                    );
                    for register in array.registers() {
                        c += &self.register_defines(register, Some(array));
                    }
                }
            }
        }
        c
    }

    fn constants(&self) -> String {
        let mut c = String::new();
        for constant in self.register_list.constants() {
            let value = match constant.value() {
                ConstantValue::Integer(v) => v.to_string(),
                ConstantValue::Boolean(v) => v.to_string(),
                ConstantValue::Float(v) => float_literal(*v),
                ConstantValue::String(v) => format!("\"{}\"", escape_c_string(v)),
                ConstantValue::UnsignedVector(v) if v.width() > 32 => format!("{:#x}ull", v.value()),
                ConstantValue::UnsignedVector(v) => format!("{:#x}u", v.value()),
            };
            c += &format!("// Value of register constant \"{}\".\n", constant.name());
            c += &description_comment("// ", &constant.description);
            c += &format!(
                "#define {}_{} ({value})\n\n",
                self.prefix(),
                constant.name().to_uppercase()
            );
        }
        c
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn escape_c_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\\' => "\\\\".to_owned(),
            '"' => "\\\"".to_owned(),
            '\n' => "\\n".to_owned(),
            '\t' => "\\t".to_owned(),
            c => c.to_string(),
        })
        .collect()
}

impl CodeGenerator for CHeaderGenerator<'_> {
    fn kind(&self) -> &'static str {
        "C header"
    }

    fn file_name(&self) -> String {
        format!("{}_regs.h", self.module_name())
    }

    fn register_list(&self) -> &RegisterList {
        self.register_list
    }

    fn body(&self) -> String {
        let guard = format!("{}_REGS_H", self.prefix());
        formatdoc! {"
            #ifndef {guard}
            #define {guard}

            #include <stdbool.h>
            #include <stdint.h>

            // Number of registers within this register map.
            #define {prefix}_NUM_REGS ({num_regs}u)

            {register_struct}\
            {register_defines}\
            {constants}\
            #endif // {guard}
            ",
            prefix = self.prefix(),
            num_regs = self.register_list.num_registers(),
            register_struct = self.register_struct(),
            register_defines = self.all_register_defines(),
            constants = self.constants(),
        }
    }
}
