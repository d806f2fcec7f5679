use std::fmt;

use crate::{error::ModelError, model::validate_name};

/// An unsigned bit vector constant, e.g., `0b0101` or `0xff`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedVector {
    value: u64,
    width: u32,
}

impl UnsignedVector {
    /// Parse a `0b` or `0x` prefixed literal. Underscores are allowed as separators.
    ///
    /// The width is the number of binary digits for binary literals and four times the number of
    /// hexadecimal digits for hexadecimal literals.
    pub fn from_literal(literal: &str) -> Option<Self> {
        let lower = literal.to_lowercase();
        let (radix, bits_per_digit, digits) = if let Some(d) = lower.strip_prefix("0b") {
            (2, 1, d)
        } else if let Some(d) = lower.strip_prefix("0x") {
            (16, 4, d)
        } else {
            return None;
        };
        let digits = digits.replace('_', "");
        if !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        let width = bits_per_digit * u32::try_from(digits.len()).ok()?;
        if width == 0 || width > 64 {
            return None;
        }
        let value = u64::from_str_radix(&digits, radix).ok()?;
        Some(Self { value, width })
    }

    pub const fn value(&self) -> u64 {
        self.value
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The value as a string of '0' and '1', most significant bit first
    pub fn to_binary_string(&self) -> String {
        format!("{:0width$b}", self.value, width = self.width as usize)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Integer(i64),
    Boolean(bool),
    Float(f64),
    String(String),
    UnsignedVector(UnsignedVector),
}

impl ConstantValue {
    /// E.g., "integer"
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::UnsignedVector(_) => "unsigned",
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::UnsignedVector(v) => write!(f, "0b{}", v.to_binary_string()),
        }
    }
}

/// A named constant shipped with the register map
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    name: String,
    value: ConstantValue,
    pub description: String,
}

impl Constant {
    /// # Errors
    ///
    /// - `name` is not a valid identifier
    /// - `value` is a float that is infinite or NaN
    pub fn new(name: &str, value: ConstantValue, description: &str) -> Result<Self, ModelError> {
        validate_name("constant", name)?;
        if let ConstantValue::Float(f) = value {
            if !f.is_finite() {
                return Err(ModelError::NonFiniteConstant(name.to_owned()));
            }
        }
        Ok(Self {
            name: name.to_owned(),
            value,
            description: description.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn value(&self) -> &ConstantValue {
        &self.value
    }
}
