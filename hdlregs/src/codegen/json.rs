//! Machine readable dump of a register list

use crate::{
    codegen::{CodeGenerator, GeneratedInfo},
    model::{ConstantValue, Field, Register, RegisterList, RegisterObject},
};
use json::{object, JsonValue};

pub struct JsonGenerator<'a> {
    register_list: &'a RegisterList,
}

fn field_to_json(field: &Field) -> JsonValue {
    let mut obj = object! {
        "type" => field.kind_str(),
        "name" => field.name(),
        "description" => field.description(),
        "base_index" => field.base_index(),
        "width" => field.width(),
        "default_value" => field.default_value_str(),
    };
    if let Field::Integer(integer) = field {
        obj["min_value"] = integer.min_value().into();
        obj["max_value"] = integer.max_value().into();
    }
    obj
}

fn register_to_json(register: &Register) -> JsonValue {
    object! {
        "name" => register.name(),
        "index" => register.index(),
        "mode" => register.mode().as_str(),
        "description" => register.description.as_str(),
        "default_value" => register.default_value(),
        "fields" => JsonValue::Array(register.fields().iter().map(field_to_json).collect()),
    }
}

fn constant_value_to_json(value: &ConstantValue) -> JsonValue {
    match value {
        ConstantValue::Integer(v) => (*v).into(),
        ConstantValue::Boolean(v) => (*v).into(),
        ConstantValue::Float(v) => (*v).into(),
        ConstantValue::String(v) => v.as_str().into(),
        // Not representable as a JSON number in general
        ConstantValue::UnsignedVector(v) => format!("0b{}", v.to_binary_string()).into(),
    }
}

impl<'a> JsonGenerator<'a> {
    pub fn new(register_list: &'a RegisterList) -> Self {
        Self { register_list }
    }

    fn to_json(&self) -> JsonValue {
        let register_objects = self
            .register_list
            .register_objects()
            .iter()
            .map(|obj| match obj {
                RegisterObject::Register(register) => {
                    let mut obj = register_to_json(register);
                    obj["type"] = "register".into();
                    obj["address"] = register.address().into();
                    obj
                }
                RegisterObject::Array(array) => object! {
                    "type" => "register_array",
                    "name" => array.name(),
                    "base_index" => array.base_index(),
                    "length" => array.length(),
                    "description" => array.description.as_str(),
                    "registers" => JsonValue::Array(array.registers().iter().map(register_to_json).collect()),
                },
            })
            .collect();
        let constants = self
            .register_list
            .constants()
            .iter()
            .map(|constant| {
                object! {
                    "name" => constant.name(),
                    "type" => constant.value().type_str(),
                    "value" => constant_value_to_json(constant.value()),
                    "description" => constant.description.as_str(),
                }
            })
            .collect();

        object! {
            "name" => self.register_list.name(),
            "num_registers" => self.register_list.num_registers(),
            "register_objects" => JsonValue::Array(register_objects),
            "constants" => JsonValue::Array(constants),
        }
    }
}

impl CodeGenerator for JsonGenerator<'_> {
    fn kind(&self) -> &'static str {
        "JSON register map"
    }

    fn file_name(&self) -> String {
        format!("{}_regs.json", self.register_list.name())
    }

    fn register_list(&self) -> &RegisterList {
        self.register_list
    }

    fn body(&self) -> String {
        self.to_json().pretty(2)
    }

    /// JSON has no comments, so the generated info goes into the document itself
    fn render(&self, info: &GeneratedInfo, _body: &str) -> String {
        let mut doc = self.to_json();
        doc["generated_info"] =
            JsonValue::Array(info.lines().into_iter().map(JsonValue::from).collect());
        doc.pretty(2) + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mode;

    fn example_list() -> RegisterList {
        let mut list = RegisterList::new("caesar", None).unwrap();
        let conf = list
            .append_register("conf", Mode::ReadWrite, "Configuration")
            .unwrap();
        conf.append_bit("enable", "", "1").unwrap();
        conf.append_integer("offset", "", -4, 3, -1).unwrap();
        let array = list.append_register_array("channels", 2, "").unwrap();
        array.append_register("gain", Mode::Write, "").unwrap();
        list.add_constant("ratio", ConstantValue::Float(0.5), "")
            .unwrap();
        list
    }

    #[test]
    fn register_list_as_json() {
        let list = example_list();
        let doc = json::parse(&JsonGenerator::new(&list).body()).unwrap();
        assert_eq!(doc["name"], "caesar");
        assert_eq!(doc["num_registers"], 3);

        let conf = &doc["register_objects"][0];
        assert_eq!(conf["type"], "register");
        assert_eq!(conf["mode"], "r_w");
        assert_eq!(conf["address"], 0);
        assert_eq!(conf["default_value"], 0b1111);
        assert_eq!(conf["fields"][1]["type"], "integer");
        assert_eq!(conf["fields"][1]["min_value"], -4);
        assert_eq!(conf["fields"][1]["default_value"], "-1");

        let channels = &doc["register_objects"][1];
        assert_eq!(channels["type"], "register_array");
        assert_eq!(channels["base_index"], 1);
        assert_eq!(channels["registers"][0]["mode"], "w");

        assert_eq!(doc["constants"][0]["type"], "float");
        assert_eq!(doc["constants"][0]["value"], 0.5);
        assert!(doc["generated_info"].is_null());
    }

    #[test]
    fn generated_info_is_embedded() {
        let list = example_list();
        let doc = json::parse(&JsonGenerator::new(&list).generate().unwrap()).unwrap();
        assert_eq!(doc["generated_info"].len(), 3);
        assert!(doc["generated_info"][2]
            .as_str()
            .unwrap()
            .starts_with("Register hash "));
    }
}
