//! `Register` is the main primitive of the register map. It represents all available metadata
//! for a given register and its fields.

use crate::{
    error::ModelError,
    model::{
        field::{Bit, BitVector, Field, FieldType, FieldValue, Integer, RegisterField},
        validate_name, Mode, DATA_WIDTH,
    },
};

/// Represents a single 32-bit register accessed over the register bus
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    pub(crate) name: String,
    /// Index of the register within its register list, or within one element of its register
    /// array
    pub(crate) index: usize,
    pub(crate) mode: Mode,
    pub description: String,
    pub(crate) fields: Vec<Field>,
}

impl Register {
    /// # Errors
    ///
    /// - `name` is not a valid identifier
    pub fn new(name: &str, index: usize, mode: Mode, description: &str) -> Result<Self, ModelError> {
        validate_name("register", name)?;
        Ok(Self {
            name: name.to_owned(),
            index,
            mode,
            description: description.to_owned(),
            fields: vec![],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    /// Byte address of the register, relative to the register list base address
    ///
    /// Only meaningful for plain registers. Registers in arrays have an address per array element,
    /// see [`crate::RegisterArray::register_index`].
    pub const fn address(&self) -> usize {
        4 * self.index
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get_field(&self, name: &str) -> Result<&Field, ModelError> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| ModelError::FieldNotFound {
                register: self.name.clone(),
                field: name.to_owned(),
            })
    }

    pub const fn is_bus_readable(&self) -> bool {
        self.mode.is_bus_readable()
    }

    pub const fn is_bus_writeable(&self) -> bool {
        self.mode.is_bus_writeable()
    }

    /// Index of the first bit that is not occupied by a field
    fn next_base_index(&self) -> u32 {
        self.fields
            .last()
            .map_or(0, |field| field.base_index() + field.width())
    }

    /// Check that a field named `name` of `width` bits can be appended
    fn check_new_field(&self, name: &str, width: u32) -> Result<u32, ModelError> {
        validate_name("field", name)?;
        if self.fields.iter().any(|field| field.name() == name) {
            return Err(ModelError::DuplicateFieldName {
                register: self.name.clone(),
                field: name.to_owned(),
            });
        }
        if !(1..=DATA_WIDTH).contains(&width) {
            return Err(ModelError::InvalidFieldWidth {
                field: name.to_owned(),
                width: width.into(),
            });
        }
        let base_index = self.next_base_index();
        let end = base_index + width;
        if end > DATA_WIDTH {
            return Err(ModelError::FieldWidthOverflow {
                register: self.name.clone(),
                field: name.to_owned(),
                end,
            });
        }
        Ok(base_index)
    }

    fn push_field(&mut self, field: Field) -> &Field {
        let index = self.fields.len();
        self.fields.push(field);
        &self.fields[index]
    }

    /// Append a bit field after the existing fields
    ///
    /// # Errors
    ///
    /// - invalid or duplicate name
    /// - register is already full
    /// - `default_value` is not "0" or "1"
    pub fn append_bit(
        &mut self,
        name: &str,
        description: &str,
        default_value: &str,
    ) -> Result<&Field, ModelError> {
        let base_index = self.check_new_field(name, 1)?;
        let bit = Bit::new(name, base_index, description, default_value)?;
        Ok(self.push_field(Field::Bit(bit)))
    }

    /// Append a bit vector field after the existing fields
    ///
    /// # Errors
    ///
    /// - invalid or duplicate name
    /// - the field does not fit into the register
    /// - invalid default value or field type, see [`BitVector::new`]
    pub fn append_bit_vector(
        &mut self,
        name: &str,
        description: &str,
        width: u32,
        default_value: &str,
        field_type: FieldType,
    ) -> Result<&Field, ModelError> {
        let base_index = self.check_new_field(name, width)?;
        let bit_vector =
            BitVector::new(name, base_index, description, width, default_value, field_type)?;
        Ok(self.push_field(Field::BitVector(bit_vector)))
    }

    /// Append an integer field after the existing fields
    ///
    /// # Errors
    ///
    /// - invalid or duplicate name
    /// - invalid range or default, see [`Integer::new`]
    /// - the field does not fit into the register
    pub fn append_integer(
        &mut self,
        name: &str,
        description: &str,
        min_value: i64,
        max_value: i64,
        default_value: i64,
    ) -> Result<&Field, ModelError> {
        // Width is derived from the range, so construct first and check the fit afterwards
        let integer = Integer::new(name, 0, description, min_value, max_value, default_value)?;
        let base_index = self.check_new_field(name, integer.width())?;
        let integer = Integer::new(
            name,
            base_index,
            description,
            min_value,
            max_value,
            default_value,
        )?;
        Ok(self.push_field(Field::Integer(integer)))
    }

    /// Register value after reset, composed of the default values of all fields
    pub fn default_value(&self) -> u32 {
        self.fields
            .iter()
            .map(|field| field.default_value_uint() << field.base_index())
            .fold(0, |acc, bits| acc | bits)
    }

    /// Decode every field from `register_value`
    ///
    /// # Errors
    ///
    /// - a field decodes into a value that is not allowed for it
    pub fn field_values(&self, register_value: u32) -> Result<Vec<(&str, FieldValue)>, ModelError> {
        self.fields
            .iter()
            .map(|field| Ok::<_, ModelError>((field.name(), field.get_value(register_value)?)))
            .collect()
    }

    /// Encode a register value from field values
    ///
    /// Fields that are not listed in `values` take their default value.
    ///
    /// # Errors
    ///
    /// - a listed field does not exist in this register
    /// - a value does not fit its field
    pub fn value_from_fields(&self, values: &[(&str, FieldValue)]) -> Result<u32, ModelError> {
        for (name, _) in values {
            self.get_field(name)?;
        }
        self.fields.iter().try_fold(0, |acc, field| {
            let bits = match values.iter().find(|(name, _)| *name == field.name()) {
                Some((_, value)) => field.set_value(*value)?,
                None => field.default_value_uint() << field.base_index(),
            };
            Ok::<u32, ModelError>(acc | bits)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_register() -> Register {
        let mut reg = Register::new("conf", 0, Mode::ReadWrite, "Configuration").unwrap();
        reg.append_bit("enable", "", "1").unwrap();
        reg.append_bit_vector("level", "", 3, "101", FieldType::Unsigned)
            .unwrap();
        reg.append_integer("offset", "", -4, 3, -1).unwrap();
        reg
    }

    #[test]
    fn fields_are_placed_back_to_back() {
        let reg = example_register();
        let placement = reg
            .fields()
            .iter()
            .map(|f| (f.name(), f.base_index(), f.width()))
            .collect::<Vec<_>>();
        assert_eq!(
            placement,
            vec![("enable", 0, 1), ("level", 1, 3), ("offset", 4, 3)]
        );
    }

    #[test]
    fn default_value_combines_fields() {
        // offset = -1 -> 0b111 at bit 4, level = 0b101 at bit 1, enable = 1
        assert_eq!(example_register().default_value(), 0b111_101_1);
    }

    #[test]
    fn width_overflow() {
        let mut reg = Register::new("full", 0, Mode::Read, "").unwrap();
        reg.append_bit_vector("a", "", 31, &"0".repeat(31), FieldType::Unsigned)
            .unwrap();
        reg.append_bit("b", "", "0").unwrap();
        assert_eq!(
            reg.append_bit("c", "", "0").unwrap_err(),
            ModelError::FieldWidthOverflow {
                register: "full".to_owned(),
                field: "c".to_owned(),
                end: 33,
            }
        );
        assert!(reg.append_integer("d", "", 0, 1, 0).is_err());
    }

    #[test]
    fn huge_bit_vector_width_is_rejected() {
        let mut reg = Register::new("conf", 0, Mode::ReadWrite, "").unwrap();
        reg.append_bit("a", "", "0").unwrap();
        assert_eq!(
            reg.append_bit_vector("b", "", u32::MAX, "0", FieldType::Unsigned)
                .unwrap_err(),
            ModelError::InvalidFieldWidth {
                field: "b".to_owned(),
                width: u32::MAX.into(),
            }
        );
        assert!(matches!(
            reg.append_bit_vector("c", "", 0, "", FieldType::Unsigned),
            Err(ModelError::InvalidFieldWidth { width: 0, .. })
        ));
        assert_eq!(reg.fields().len(), 1);
    }

    #[test]
    fn duplicate_field_name() {
        let mut reg = example_register();
        assert!(matches!(
            reg.append_bit("enable", "", "0"),
            Err(ModelError::DuplicateFieldName { .. })
        ));
    }

    #[test]
    fn decode_and_encode() {
        let reg = example_register();
        let values = reg.field_values(0b010_110_0).unwrap();
        assert_eq!(
            values,
            vec![
                ("enable", FieldValue::Unsigned(0)),
                ("level", FieldValue::Unsigned(0b110)),
                ("offset", FieldValue::Signed(2)),
            ]
        );

        let value = reg
            .value_from_fields(&[("level", FieldValue::Unsigned(0b110))])
            .unwrap();
        assert_eq!(value, 0b111_110_1);
        assert!(reg
            .value_from_fields(&[("nope", FieldValue::Unsigned(0))])
            .is_err());
    }

    #[test]
    fn invalid_names() {
        assert!(Register::new("0conf", 0, Mode::Read, "").is_err());
        let mut reg = example_register();
        assert!(reg.append_bit("bad name", "", "0").is_err());
    }
}
