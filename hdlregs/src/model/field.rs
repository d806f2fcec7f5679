//! Register fields: bits, bit vectors and integers
//!
//! A field occupies a contiguous range of bits within its register. The bit range is fixed upon
//! construction, since the base index of each field depends on the widths of the fields placed
//! before it.

use std::{fmt, ops};

use crate::{error::ModelError, model::DATA_WIDTH};

/// Value of a single field, decoded from or to be encoded into a register value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue {
    Unsigned(u64),
    Signed(i64),
    /// Value of a fixed point field
    Real(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
        }
    }
}

/// Common behavior of all field kinds
pub trait RegisterField {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// The index within the register for the lowest bit of this field
    fn base_index(&self) -> u32;

    /// The number of bits this field occupies
    fn width(&self) -> u32;

    /// The default value formatted the way it shall appear in documentation
    fn default_value_str(&self) -> String;

    /// The default value as raw, unshifted bits
    fn default_value_uint(&self) -> u32;

    /// Convert raw, unshifted field bits into a typed value
    ///
    /// # Errors
    ///
    /// - the bits decode into a value that is not allowed for this field
    fn from_raw(&self, raw: u32) -> Result<FieldValue, ModelError>;

    /// Convert a typed value into raw, unshifted field bits
    ///
    /// # Errors
    ///
    /// - the value is of the wrong kind or does not fit the field
    fn to_raw(&self, value: FieldValue) -> Result<u32, ModelError>;

    /// The bits this field occupies, e.g., "3" or "7:4"
    fn range_str(&self) -> String {
        if self.width() == 1 {
            format!("{}", self.base_index())
        } else {
            format!(
                "{}:{}",
                self.base_index() + self.width() - 1,
                self.base_index()
            )
        }
    }

    /// Mask selecting the bits of this field within the register
    fn mask(&self) -> u32 {
        mask_at_base(self.width()) << self.base_index()
    }

    /// Get the value of this field from the value of the register it belongs to
    ///
    /// # Errors
    ///
    /// - the field bits decode into a value that is not allowed for this field
    fn get_value(&self, register_value: u32) -> Result<FieldValue, ModelError> {
        self.from_raw((register_value & self.mask()) >> self.base_index())
    }

    /// Get the register value with this field set to `value` and all other bits set to zero
    ///
    /// # Errors
    ///
    /// - the value is of the wrong kind or does not fit the field
    fn set_value(&self, value: FieldValue) -> Result<u32, ModelError> {
        let raw = self.to_raw(value)?;
        if raw > mask_at_base(self.width()) {
            return Err(out_of_range(self.name(), value));
        }
        Ok(raw << self.base_index())
    }
}

/// Mask with the lowest `width` bits set
pub(crate) fn mask_at_base(width: u32) -> u32 {
    debug_assert!((1..=DATA_WIDTH).contains(&width));
    u32::MAX >> (DATA_WIDTH - width)
}

/// Interpret the lowest `width` bits of `raw` as a two's complement number
fn to_signed(raw: u32, width: u32) -> i64 {
    let raw = i64::from(raw);
    if raw & (1 << (width - 1)) != 0 {
        raw - (1 << width)
    } else {
        raw
    }
}

fn to_twos_complement(value: i64, width: u32) -> u32 {
    (value as u32) & mask_at_base(width)
}

fn bit_length(value: u64) -> u32 {
    64 - value.leading_zeros()
}

fn out_of_range(field: &str, value: FieldValue) -> ModelError {
    ModelError::FieldValueOutOfRange {
        field: field.to_owned(),
        value: value.to_string(),
    }
}

/// Accept any integer-valued [`FieldValue`]
fn as_integer(field: &str, value: FieldValue) -> Result<i64, ModelError> {
    match value {
        FieldValue::Signed(v) => Ok(v),
        FieldValue::Unsigned(v) => i64::try_from(v).map_err(|_| out_of_range(field, value)),
        FieldValue::Real(_) => Err(ModelError::FieldValueKind {
            field: field.to_owned(),
            expected: "an integer",
        }),
    }
}

/// A single bit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bit {
    name: String,
    base_index: u32,
    description: String,
    default_value: bool,
}

impl Bit {
    /// # Errors
    ///
    /// - `default_value` is not "0" or "1"
    pub fn new(
        name: &str,
        base_index: u32,
        description: &str,
        default_value: &str,
    ) -> Result<Self, ModelError> {
        let default_value = match default_value {
            "0" => false,
            "1" => true,
            other => {
                return Err(ModelError::InvalidBitDefault {
                    field: name.to_owned(),
                    value: other.to_owned(),
                })
            }
        };
        Ok(Self {
            name: name.to_owned(),
            base_index,
            description: description.to_owned(),
            default_value,
        })
    }
}

impl RegisterField for Bit {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn base_index(&self) -> u32 {
        self.base_index
    }

    fn width(&self) -> u32 {
        1
    }

    fn default_value_str(&self) -> String {
        let s = if self.default_value { "1" } else { "0" };
        s.to_owned()
    }

    fn default_value_uint(&self) -> u32 {
        u32::from(self.default_value)
    }

    fn from_raw(&self, raw: u32) -> Result<FieldValue, ModelError> {
        Ok(FieldValue::Unsigned(u64::from(raw)))
    }

    fn to_raw(&self, value: FieldValue) -> Result<u32, ModelError> {
        match as_integer(&self.name, value)? {
            v @ (0 | 1) => Ok(v as u32),
            _ => Err(out_of_range(&self.name, value)),
        }
    }
}

/// Interpretation of the bits of a [`BitVector`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldType {
    #[default]
    Unsigned,
    /// Two's complement
    Signed,
    /// Unsigned fixed point number with bits `max_bit_index downto min_bit_index`
    UnsignedFixedPoint {
        max_bit_index: i32,
        min_bit_index: i32,
    },
    /// Two's complement fixed point number with bits `max_bit_index downto min_bit_index`
    SignedFixedPoint {
        max_bit_index: i32,
        min_bit_index: i32,
    },
}

impl FieldType {
    fn check_width(&self, field: &str, width: u32) -> Result<(), ModelError> {
        match *self {
            Self::Unsigned | Self::Signed => Ok(()),
            Self::UnsignedFixedPoint {
                max_bit_index,
                min_bit_index,
            }
            | Self::SignedFixedPoint {
                max_bit_index,
                min_bit_index,
            } => {
                if i64::from(max_bit_index) - i64::from(min_bit_index) + 1 == i64::from(width) {
                    Ok(())
                } else {
                    Err(ModelError::FixedPointWidthMismatch {
                        field: field.to_owned(),
                        width,
                        max_bit_index,
                        min_bit_index,
                    })
                }
            }
        }
    }

    const fn is_signed(&self) -> bool {
        matches!(self, Self::Signed | Self::SignedFixedPoint { .. })
    }

    /// Weight of the least significant bit
    fn lsb_weight(&self) -> f64 {
        match *self {
            Self::Unsigned | Self::Signed => 1.0,
            Self::UnsignedFixedPoint { min_bit_index, .. }
            | Self::SignedFixedPoint { min_bit_index, .. } => 2f64.powi(min_bit_index),
        }
    }
}

/// A vector of bits, optionally interpreted as a signed or fixed point number
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVector {
    name: String,
    base_index: u32,
    description: String,
    width: u32,
    default_value: String,
    default_bits: u32,
    field_type: FieldType,
}

impl BitVector {
    /// # Errors
    ///
    /// - `width` is not within 1..=32
    /// - `default_value` is not a string of `width` '0' or '1' characters
    /// - `field_type` is a fixed point type whose bit indices do not match `width`
    pub fn new(
        name: &str,
        base_index: u32,
        description: &str,
        width: u32,
        default_value: &str,
        field_type: FieldType,
    ) -> Result<Self, ModelError> {
        if !(1..=DATA_WIDTH).contains(&width) {
            return Err(ModelError::InvalidFieldWidth {
                field: name.to_owned(),
                width: i64::from(width),
            });
        }
        let is_binary = default_value.chars().all(|c| c == '0' || c == '1');
        if !is_binary || default_value.len() != width as usize {
            return Err(ModelError::InvalidBitVectorDefault {
                field: name.to_owned(),
                value: default_value.to_owned(),
                width,
            });
        }
        let default_bits = u32::from_str_radix(default_value, 2).map_err(|_| {
            ModelError::InvalidBitVectorDefault {
                field: name.to_owned(),
                value: default_value.to_owned(),
                width,
            }
        })?;
        field_type.check_width(name, width)?;

        Ok(Self {
            name: name.to_owned(),
            base_index,
            description: description.to_owned(),
            width,
            default_value: default_value.to_owned(),
            default_bits,
            field_type,
        })
    }

    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    fn integer_range(&self) -> (i64, i64) {
        if self.field_type.is_signed() {
            (-(1 << (self.width - 1)), (1 << (self.width - 1)) - 1)
        } else {
            (0, i64::from(mask_at_base(self.width)))
        }
    }
}

impl RegisterField for BitVector {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn base_index(&self) -> u32 {
        self.base_index
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn default_value_str(&self) -> String {
        format!("0b{}", self.default_value)
    }

    fn default_value_uint(&self) -> u32 {
        self.default_bits
    }

    fn from_raw(&self, raw: u32) -> Result<FieldValue, ModelError> {
        let integer = if self.field_type.is_signed() {
            to_signed(raw, self.width)
        } else {
            i64::from(raw)
        };
        Ok(match self.field_type {
            FieldType::Unsigned => FieldValue::Unsigned(u64::from(raw)),
            FieldType::Signed => FieldValue::Signed(integer),
            FieldType::UnsignedFixedPoint { .. } | FieldType::SignedFixedPoint { .. } => {
                FieldValue::Real(integer as f64 * self.field_type.lsb_weight())
            }
        })
    }

    fn to_raw(&self, value: FieldValue) -> Result<u32, ModelError> {
        let integer = match self.field_type {
            FieldType::Unsigned | FieldType::Signed => as_integer(&self.name, value)?,
            FieldType::UnsignedFixedPoint { .. } | FieldType::SignedFixedPoint { .. } => {
                let real = match value {
                    FieldValue::Real(v) => v,
                    FieldValue::Signed(v) => v as f64,
                    FieldValue::Unsigned(v) => v as f64,
                };
                let steps = (real / self.field_type.lsb_weight()).round();
                if !steps.is_finite() || steps.abs() > f64::from(u32::MAX) {
                    return Err(out_of_range(&self.name, value));
                }
                steps as i64
            }
        };
        let (min, max) = self.integer_range();
        if !(min..=max).contains(&integer) {
            return Err(out_of_range(&self.name, value));
        }
        Ok(to_twos_complement(integer, self.width))
    }
}

/// An integer with a bounded range, signed when the range includes negative numbers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Integer {
    name: String,
    base_index: u32,
    description: String,
    min_value: i64,
    max_value: i64,
    default_value: i64,
    width: u32,
}

impl Integer {
    /// # Errors
    ///
    /// - `min_value` is greater than `max_value`
    /// - `default_value` is outside of the range
    /// - the range requires more bits than a register holds
    pub fn new(
        name: &str,
        base_index: u32,
        description: &str,
        min_value: i64,
        max_value: i64,
        default_value: i64,
    ) -> Result<Self, ModelError> {
        if min_value > max_value {
            return Err(ModelError::InvalidIntegerRange {
                field: name.to_owned(),
                min: min_value,
                max: max_value,
            });
        }
        if !(min_value..=max_value).contains(&default_value) {
            return Err(ModelError::IntegerDefaultOutOfRange {
                field: name.to_owned(),
                default: default_value,
                min: min_value,
                max: max_value,
            });
        }

        let positive_bits = bit_length(max_value.max(0) as u64);
        let width = if min_value >= 0 {
            positive_bits.max(1)
        } else {
            // Magnitude of the most negative value minus one, cannot overflow
            let negative_bits = bit_length((-(min_value + 1)) as u64);
            1 + negative_bits.max(positive_bits)
        };
        if width > DATA_WIDTH {
            return Err(ModelError::IntegerTooWide {
                field: name.to_owned(),
                width,
            });
        }

        Ok(Self {
            name: name.to_owned(),
            base_index,
            description: description.to_owned(),
            min_value,
            max_value,
            default_value,
            width,
        })
    }

    pub const fn min_value(&self) -> i64 {
        self.min_value
    }

    pub const fn max_value(&self) -> i64 {
        self.max_value
    }

    pub const fn default_value(&self) -> i64 {
        self.default_value
    }

    pub const fn is_signed(&self) -> bool {
        self.min_value < 0
    }
}

impl RegisterField for Integer {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn base_index(&self) -> u32 {
        self.base_index
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn default_value_str(&self) -> String {
        self.default_value.to_string()
    }

    fn default_value_uint(&self) -> u32 {
        to_twos_complement(self.default_value, self.width)
    }

    fn from_raw(&self, raw: u32) -> Result<FieldValue, ModelError> {
        let value = if self.is_signed() {
            to_signed(raw, self.width)
        } else {
            i64::from(raw)
        };
        if !(self.min_value..=self.max_value).contains(&value) {
            return Err(out_of_range(&self.name, FieldValue::Signed(value)));
        }
        Ok(FieldValue::Signed(value))
    }

    fn to_raw(&self, value: FieldValue) -> Result<u32, ModelError> {
        let integer = as_integer(&self.name, value)?;
        if !(self.min_value..=self.max_value).contains(&integer) {
            return Err(out_of_range(&self.name, value));
        }
        Ok(to_twos_complement(integer, self.width))
    }
}

/// Any field that can be placed into a register
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Bit(Bit),
    BitVector(BitVector),
    Integer(Integer),
}

impl Field {
    /// E.g., "bit vector"
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Bit(_) => "bit",
            Self::BitVector(_) => "bit vector",
            Self::Integer(_) => "integer",
        }
    }
}

impl ops::Deref for Field {
    type Target = dyn RegisterField;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Bit(f) => f,
            Self::BitVector(f) => f,
            Self::Integer(f) => f,
        }
    }
}
