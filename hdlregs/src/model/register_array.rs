use crate::{
    error::ModelError,
    model::{validate_name, Mode, Register, MAX_NUM_REGISTERS},
};

/// A group of registers that is repeated `length` times
///
/// The registers of one array element are placed back to back, and the elements likewise. E.g.,
/// an array of length 3 with registers `a` and `b` starting at index 5 occupies indices 5..=10 as
/// `a[0], b[0], a[1], b[1], a[2], b[2]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterArray {
    name: String,
    base_index: usize,
    length: usize,
    pub description: String,
    registers: Vec<Register>,
}

impl RegisterArray {
    /// # Errors
    ///
    /// - `name` is not a valid identifier
    /// - `length` is zero or exceeds [`MAX_NUM_REGISTERS`]
    pub fn new(
        name: &str,
        base_index: usize,
        length: usize,
        description: &str,
    ) -> Result<Self, ModelError> {
        validate_name("register array", name)?;
        if !(1..=MAX_NUM_REGISTERS).contains(&length) {
            return Err(ModelError::InvalidArrayLength {
                array: name.to_owned(),
                length: i64::try_from(length).unwrap_or(i64::MAX),
            });
        }
        Ok(Self {
            name: name.to_owned(),
            base_index,
            length,
            description: description.to_owned(),
            registers: vec![],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn base_index(&self) -> usize {
        self.base_index
    }

    pub const fn length(&self) -> usize {
        self.length
    }

    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    pub fn get_register(&self, name: &str) -> Result<&Register, ModelError> {
        self.registers
            .iter()
            .find(|reg| reg.name() == name)
            .ok_or_else(|| ModelError::RegisterNotFound(format!("{}.{name}", self.name)))
    }

    /// Append a register to each element of the array
    ///
    /// # Errors
    ///
    /// - invalid or duplicate name
    /// - the array would no longer fit into the address space
    pub fn append_register(
        &mut self,
        name: &str,
        mode: Mode,
        description: &str,
    ) -> Result<&mut Register, ModelError> {
        if self.registers.iter().any(|reg| reg.name() == name) {
            return Err(ModelError::DuplicateName(format!("{}.{name}", self.name)));
        }
        let end_index = (self.registers.len() + 1)
            .checked_mul(self.length)
            .and_then(|num_registers| num_registers.checked_add(self.base_index));
        match end_index {
            Some(end_index) if end_index <= MAX_NUM_REGISTERS => {}
            _ => return Err(ModelError::AddressSpaceExceeded(format!("{}.{name}", self.name))),
        }
        let register = Register::new(name, self.registers.len(), mode, description)?;
        let index = self.registers.len();
        self.registers.push(register);
        Ok(&mut self.registers[index])
    }

    /// The last index occupied by this array
    ///
    /// An array without registers occupies no indices. In that case the index preceding
    /// `base_index` is reported, saturating at zero.
    pub fn index(&self) -> usize {
        (self.base_index + self.length * self.registers.len()).saturating_sub(1)
    }

    /// Number of register indices occupied by this array
    pub fn num_registers(&self) -> usize {
        self.length * self.registers.len()
    }

    /// Index of the first register of array element `array_index`
    ///
    /// # Errors
    ///
    /// - `array_index` is out of bounds
    pub fn start_index(&self, array_index: usize) -> Result<usize, ModelError> {
        if array_index >= self.length {
            return Err(ModelError::ArrayIndexOutOfBounds {
                array: self.name.clone(),
                index: array_index,
                length: self.length,
            });
        }
        Ok(self.base_index + array_index * self.registers.len())
    }

    /// Index of `register` in array element `array_index`
    ///
    /// # Errors
    ///
    /// - `array_index` is out of bounds
    pub fn register_index(
        &self,
        register: &Register,
        array_index: usize,
    ) -> Result<usize, ModelError> {
        Ok(self.start_index(array_index)? + register.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_array() -> RegisterArray {
        let mut array = RegisterArray::new("dummies", 5, 3, "").unwrap();
        array.append_register("first", Mode::ReadWrite, "").unwrap();
        array.append_register("second", Mode::Read, "").unwrap();
        array
    }

    #[test]
    fn indices() {
        let array = example_array();
        assert_eq!(array.index(), 10);
        assert_eq!(array.num_registers(), 6);
        assert_eq!(array.start_index(0).unwrap(), 5);
        assert_eq!(array.start_index(2).unwrap(), 9);

        let second = array.get_register("second").unwrap();
        assert_eq!(second.index(), 1);
        assert_eq!(array.register_index(second, 1).unwrap(), 8);
    }

    #[test]
    fn array_index_out_of_bounds() {
        let array = example_array();
        assert_eq!(
            array.start_index(3),
            Err(ModelError::ArrayIndexOutOfBounds {
                array: "dummies".to_owned(),
                index: 3,
                length: 3,
            })
        );
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(matches!(
            RegisterArray::new("empty", 0, 0, ""),
            Err(ModelError::InvalidArrayLength { .. })
        ));
    }

    #[test]
    fn length_is_bounded_by_address_space() {
        assert!(matches!(
            RegisterArray::new("huge", 0, MAX_NUM_REGISTERS + 1, ""),
            Err(ModelError::InvalidArrayLength { .. })
        ));
        assert!(matches!(
            RegisterArray::new("huge", 0, usize::MAX, ""),
            Err(ModelError::InvalidArrayLength { length: i64::MAX, .. })
        ));

        let mut array = RegisterArray::new("big", 2, MAX_NUM_REGISTERS / 2, "").unwrap();
        array.append_register("first", Mode::ReadWrite, "").unwrap();
        assert_eq!(
            array.append_register("second", Mode::ReadWrite, ""),
            Err(ModelError::AddressSpaceExceeded("big.second".to_owned()))
        );
        assert_eq!(array.registers().len(), 1);
        assert_eq!(array.num_registers(), MAX_NUM_REGISTERS / 2);
    }

    #[test]
    fn duplicate_register_in_array() {
        let mut array = example_array();
        assert!(array.append_register("first", Mode::Write, "").is_err());
    }
}
