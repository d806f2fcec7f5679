use std::{iter, path};

use crate::{
    error::ModelError,
    model::{
        validate_name, Constant, ConstantValue, Mode, Register, RegisterArray, MAX_NUM_REGISTERS,
    },
};
use itertools::Either;

/// Either a plain register or a register array
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterObject {
    Register(Register),
    Array(RegisterArray),
}

impl RegisterObject {
    pub fn name(&self) -> &str {
        match self {
            Self::Register(reg) => reg.name(),
            Self::Array(array) => array.name(),
        }
    }

    /// The last index occupied by this object
    pub fn index(&self) -> usize {
        match self {
            Self::Register(reg) => reg.index(),
            Self::Array(array) => array.index(),
        }
    }

    /// Number of register indices occupied by this object
    pub fn num_registers(&self) -> usize {
        match self {
            Self::Register(_) => 1,
            Self::Array(array) => array.num_registers(),
        }
    }

    /// The index following the last index occupied by this object
    fn end_index(&self) -> usize {
        match self {
            Self::Register(reg) => reg.index() + 1,
            Self::Array(array) => array.base_index() + array.num_registers(),
        }
    }
}

/// The registers and constants of one module
#[derive(Clone, Debug, PartialEq)]
pub struct RegisterList {
    name: String,
    source_definition_file: Option<path::PathBuf>,
    register_objects: Vec<RegisterObject>,
    constants: Vec<Constant>,
}

impl RegisterList {
    /// # Errors
    ///
    /// - `name` is not a valid identifier
    pub fn new(
        name: &str,
        source_definition_file: Option<path::PathBuf>,
    ) -> Result<Self, ModelError> {
        validate_name("module", name)?;
        Ok(Self {
            name: name.to_owned(),
            source_definition_file,
            register_objects: vec![],
            constants: vec![],
        })
    }

    /// Create a register list that starts out with a copy of `default_registers`
    ///
    /// Default registers keep the indices they were created with.
    ///
    /// # Errors
    ///
    /// - `name` is not a valid identifier
    /// - two default registers share a name
    pub fn with_default_registers(
        name: &str,
        source_definition_file: Option<path::PathBuf>,
        default_registers: &[Register],
    ) -> Result<Self, ModelError> {
        let mut list = Self::new(name, source_definition_file)?;
        for register in default_registers {
            list.check_name_free(register.name())?;
            list.register_objects
                .push(RegisterObject::Register(register.clone()));
        }
        Ok(list)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_definition_file(&self) -> Option<&path::Path> {
        self.source_definition_file.as_deref()
    }

    pub fn register_objects(&self) -> &[RegisterObject] {
        &self.register_objects
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    fn check_name_free(&self, name: &str) -> Result<(), ModelError> {
        if self.register_objects.iter().any(|obj| obj.name() == name) {
            return Err(ModelError::DuplicateName(name.to_owned()));
        }
        Ok(())
    }

    /// Index to use for the next register object
    fn next_index(&self) -> usize {
        self.register_objects
            .last()
            .map_or(0, RegisterObject::end_index)
    }

    /// Total number of register indices occupied, including every element of register arrays
    pub fn num_registers(&self) -> usize {
        self.next_index()
    }

    /// # Errors
    ///
    /// - invalid or duplicate name
    pub fn append_register(
        &mut self,
        name: &str,
        mode: Mode,
        description: &str,
    ) -> Result<&mut Register, ModelError> {
        self.check_name_free(name)?;
        if self.next_index() >= MAX_NUM_REGISTERS {
            return Err(ModelError::AddressSpaceExceeded(name.to_owned()));
        }
        let register = Register::new(name, self.next_index(), mode, description)?;
        self.register_objects
            .push(RegisterObject::Register(register));
        match self.register_objects.last_mut() {
            Some(RegisterObject::Register(reg)) => Ok(reg),
            _ => unreachable!("register was pushed on previous line"),
        }
    }

    /// # Errors
    ///
    /// - invalid or duplicate name
    /// - `length` is zero
    pub fn append_register_array(
        &mut self,
        name: &str,
        length: usize,
        description: &str,
    ) -> Result<&mut RegisterArray, ModelError> {
        self.check_name_free(name)?;
        let array = RegisterArray::new(name, self.next_index(), length, description)?;
        self.register_objects.push(RegisterObject::Array(array));
        match self.register_objects.last_mut() {
            Some(RegisterObject::Array(array)) => Ok(array),
            _ => unreachable!("register array was pushed on previous line"),
        }
    }

    /// # Errors
    ///
    /// - invalid or duplicate name
    /// - invalid value, see [`Constant::new`]
    pub fn add_constant(
        &mut self,
        name: &str,
        value: ConstantValue,
        description: &str,
    ) -> Result<&Constant, ModelError> {
        if self.constants.iter().any(|c| c.name() == name) {
            return Err(ModelError::DuplicateConstantName(name.to_owned()));
        }
        let index = self.constants.len();
        self.constants.push(Constant::new(name, value, description)?);
        Ok(&self.constants[index])
    }

    /// Get a plain register, i.e., one that is not part of an array
    pub fn get_register(&self, name: &str) -> Result<&Register, ModelError> {
        self.register_objects
            .iter()
            .find_map(|obj| match obj {
                RegisterObject::Register(reg) if reg.name() == name => Some(reg),
                _ => None,
            })
            .ok_or_else(|| ModelError::RegisterNotFound(name.to_owned()))
    }

    pub fn get_register_mut(&mut self, name: &str) -> Result<&mut Register, ModelError> {
        self.register_objects
            .iter_mut()
            .find_map(|obj| match obj {
                RegisterObject::Register(reg) if reg.name() == name => Some(reg),
                _ => None,
            })
            .ok_or_else(|| ModelError::RegisterNotFound(name.to_owned()))
    }

    pub fn get_register_array(&self, name: &str) -> Result<&RegisterArray, ModelError> {
        self.register_objects
            .iter()
            .find_map(|obj| match obj {
                RegisterObject::Array(array) if array.name() == name => Some(array),
                _ => None,
            })
            .ok_or_else(|| ModelError::RegisterArrayNotFound(name.to_owned()))
    }

    pub fn get_constant(&self, name: &str) -> Result<&Constant, ModelError> {
        self.constants
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ModelError::ConstantNotFound(name.to_owned()))
    }

    /// Resolve a register, plain or within an array element
    ///
    /// # Arguments
    ///
    /// * `register_name` - name of the register
    /// * `array` - name of the enclosing register array and the array element index, if any
    pub fn resolve_register(
        &self,
        register_name: &str,
        array: Option<(&str, usize)>,
    ) -> Result<(&Register, usize), ModelError> {
        match array {
            None => {
                let register = self.get_register(register_name)?;
                Ok((register, register.index()))
            }
            Some((array_name, array_index)) => {
                let array = self.get_register_array(array_name)?;
                let register = array.get_register(register_name)?;
                Ok((register, array.register_index(register, array_index)?))
            }
        }
    }

    /// Index of a register, plain or within an array element
    ///
    /// # Errors
    ///
    /// - the register or register array does not exist
    /// - the array index is out of bounds
    pub fn get_register_index(
        &self,
        register_name: &str,
        array: Option<(&str, usize)>,
    ) -> Result<usize, ModelError> {
        self.resolve_register(register_name, array)
            .map(|(_, index)| index)
    }

    /// Every register in order, paired with the register array it belongs to, if any
    pub fn iterate_registers(&self) -> impl Iterator<Item = (&Register, Option<&RegisterArray>)> {
        self.register_objects.iter().flat_map(|obj| match obj {
            RegisterObject::Register(reg) => Either::Left(iter::once((reg, None))),
            RegisterObject::Array(array) => Either::Right(
                array
                    .registers()
                    .iter()
                    .map(move |reg| (reg, Some(array))),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_list() -> RegisterList {
        let mut list = RegisterList::new("caesar", None).unwrap();
        list.append_register("conf", Mode::ReadWrite, "").unwrap();
        list.append_register("status", Mode::Read, "").unwrap();
        let array = list.append_register_array("dummies", 3, "").unwrap();
        array.append_register("first", Mode::ReadWrite, "").unwrap();
        array.append_register("second", Mode::Read, "").unwrap();
        list.append_register("irq", Mode::ReadWritePulse, "").unwrap();
        list
    }

    #[test]
    fn indices_follow_previous_objects() {
        let list = example_list();
        assert_eq!(list.get_register("conf").unwrap().index(), 0);
        assert_eq!(list.get_register("status").unwrap().index(), 1);
        assert_eq!(list.get_register_array("dummies").unwrap().base_index(), 2);
        assert_eq!(list.get_register("irq").unwrap().index(), 8);
        assert_eq!(list.num_registers(), 9);
    }

    #[test]
    fn register_index_lookup() {
        let list = example_list();
        assert_eq!(list.get_register_index("status", None).unwrap(), 1);
        assert_eq!(
            list.get_register_index("second", Some(("dummies", 2)))
                .unwrap(),
            7
        );
        assert!(list
            .get_register_index("second", Some(("dummies", 3)))
            .is_err());
        assert_eq!(
            list.get_register_index("first", None),
            Err(ModelError::RegisterNotFound("first".to_owned()))
        );
    }

    #[test]
    fn registers_past_the_address_space_are_rejected() {
        let mut list = RegisterList::new("caesar", None).unwrap();
        list.append_register("conf", Mode::ReadWrite, "").unwrap();
        let array = list
            .append_register_array("all", MAX_NUM_REGISTERS - 1, "")
            .unwrap();
        array.append_register("first", Mode::Read, "").unwrap();
        assert_eq!(list.num_registers(), MAX_NUM_REGISTERS);
        assert_eq!(
            list.append_register("status", Mode::Read, "").unwrap_err(),
            ModelError::AddressSpaceExceeded("status".to_owned())
        );
    }

    #[test]
    fn names_are_unique() {
        let mut list = example_list();
        assert_eq!(
            list.append_register("dummies", Mode::Read, "").unwrap_err(),
            ModelError::DuplicateName("dummies".to_owned())
        );
        assert!(list.append_register_array("conf", 1, "").is_err());

        list.add_constant("width", ConstantValue::Integer(8), "")
            .unwrap();
        // Constants live in their own namespace
        list.add_constant("conf", ConstantValue::Boolean(true), "")
            .unwrap();
        assert!(list
            .add_constant("width", ConstantValue::Integer(9), "")
            .is_err());
        assert_eq!(
            list.get_constant("width").unwrap().value(),
            &ConstantValue::Integer(8)
        );
    }

    #[test]
    fn iterate_registers_in_order() {
        let list = example_list();
        let names = list
            .iterate_registers()
            .map(|(reg, array)| match array {
                Some(array) => format!("{}.{}", array.name(), reg.name()),
                None => reg.name().to_owned(),
            })
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["conf", "status", "dummies.first", "dummies.second", "irq"]
        );
    }

    #[test]
    fn default_registers_are_copied() {
        let mut defaults = RegisterList::new("defaults", None).unwrap();
        defaults
            .append_register("config", Mode::ReadWrite, "")
            .unwrap();
        defaults.append_register("irq", Mode::Read, "").unwrap();
        let defaults = defaults
            .iterate_registers()
            .map(|(reg, _)| reg.clone())
            .collect::<Vec<_>>();

        let mut list = RegisterList::with_default_registers("m", None, &defaults).unwrap();
        list.get_register_mut("config")
            .unwrap()
            .append_bit("enable", "", "0")
            .unwrap();
        let reg = list.append_register("data", Mode::Write, "").unwrap();
        assert_eq!(reg.index(), 2);
        assert!(defaults[0].fields().is_empty());
    }

    #[test]
    fn empty_list() {
        let list = RegisterList::new("empty", None).unwrap();
        assert_eq!(list.num_registers(), 0);
        assert_eq!(list.iterate_registers().count(), 0);
    }
}
