//! Checks the register map artifacts generated for `regs/caesar.toml`

use regs_selftest::{caesar, C_HEADER};

/// Combine the default values of all fields into a register value
fn defaults_from_fields(fields: &[(u32, u32)]) -> u32 {
    fields
        .iter()
        .fold(0, |acc, (default_value, shift)| acc | (default_value << shift))
}

#[test]
fn test_registers() {
    assert_eq!(caesar::NUM_REGS, 11);

    assert_eq!(caesar::config::INDEX, 0);
    assert_eq!(caesar::status::INDEX, 1);
    assert_eq!(caesar::command::INDEX, 2);
    assert_eq!(caesar::irq_status::INDEX, 3);
    assert_eq!(caesar::address::INDEX, 4);
    assert_eq!(caesar::address::ADDR, 16);

    assert_eq!(caesar::config::MODE, "r_w");
    assert_eq!(caesar::status::MODE, "r");
    assert_eq!(caesar::command::MODE, "wpulse");
    assert_eq!(caesar::irq_status::MODE, "r_wpulse");
    assert_eq!(caesar::address::MODE, "w");
}

#[test]
fn field_shifts_and_masks() {
    use caesar::config::*;

    assert_eq!(plain_bit_a::SHIFT, 0);
    assert_eq!(plain_bit_a::MASK, 0b1);
    assert_eq!(plain_bit_b::SHIFT, 1);
    assert_eq!(plain_bit_b::MASK, 0b10);
    assert_eq!(plain_bit_vector::SHIFT, 2);
    assert_eq!(plain_bit_vector::WIDTH, 4);
    assert_eq!(plain_bit_vector::MASK, 0b11_1100);
    assert_eq!(signed_integer::SHIFT, 6);
    // Range -10..=10 needs a sign bit and four magnitude bits
    assert_eq!(signed_integer::WIDTH, 5);
    assert_eq!(signed_integer::MASK, 0x7c0);

    // Fields do not overlap
    let masks = [
        plain_bit_a::MASK,
        plain_bit_b::MASK,
        plain_bit_vector::MASK,
        signed_integer::MASK,
    ];
    assert_eq!(
        masks.iter().fold(0, |acc, m| acc | m),
        masks.iter().sum::<u32>()
    );

    assert_eq!(caesar::address::value::WIDTH, 12);
    assert_eq!(caesar::address::value::MASK, 0xfff);
}

#[test]
fn default_values() {
    use caesar::config::*;

    assert_eq!(plain_bit_a::DEFAULT_VALUE, 0);
    assert_eq!(plain_bit_b::DEFAULT_VALUE, 1);
    assert_eq!(plain_bit_vector::DEFAULT_VALUE, 0b0011);
    // -3 as five bit two's complement
    assert_eq!(signed_integer::DEFAULT_VALUE, 0b11101);
    assert_eq!(DEFAULT_VALUE, 0x74e);
    assert_eq!(
        DEFAULT_VALUE,
        defaults_from_fields(&[
            (plain_bit_a::DEFAULT_VALUE, plain_bit_a::SHIFT),
            (plain_bit_b::DEFAULT_VALUE, plain_bit_b::SHIFT),
            (plain_bit_vector::DEFAULT_VALUE, plain_bit_vector::SHIFT),
            (signed_integer::DEFAULT_VALUE, signed_integer::SHIFT),
        ])
    );

    assert_eq!(caesar::status::DEFAULT_VALUE, 0);
    assert_eq!(caesar::command::start::DEFAULT_VALUE, 0);
    assert_eq!(caesar::address::DEFAULT_VALUE, 1024);
}

#[test]
fn register_array() {
    use caesar::base_addresses::*;

    assert_eq!(ARRAY_LENGTH, 3);
    assert_eq!(BASE_INDEX, 5);
    assert_eq!(REGISTERS_PER_ELEMENT, 2);

    assert_eq!(read_address::index(0), 5);
    assert_eq!(settings::index(0), 6);
    assert_eq!(read_address::index(1), 7);
    assert_eq!(settings::index(2), 10);
    assert_eq!(read_address::addr(1), 28);
    assert_eq!(settings::addr(2), 40);
    assert_eq!(settings::index(ARRAY_LENGTH - 1) + 1, caesar::NUM_REGS);

    assert_eq!(read_address::address::WIDTH, 28);
    assert_eq!(read_address::address::MASK, 0x0fff_ffff);
    assert_eq!(read_address::DEFAULT_VALUE, 8);

    // Bits are placed before bit vectors
    assert_eq!(settings::enable::SHIFT, 0);
    assert_eq!(settings::direction::SHIFT, 1);
    assert_eq!(settings::direction::MASK, 0b110);
    assert_eq!(settings::DEFAULT_VALUE, 0b011);
}

#[test]
#[should_panic(expected = "array index out of bounds")]
fn register_array_index_out_of_bounds() {
    let array_index = caesar::base_addresses::ARRAY_LENGTH;
    caesar::base_addresses::read_address::index(array_index);
}

#[test]
fn constants() {
    use caesar::constants::*;

    assert_eq!(DATA_WIDTH, 24);
    assert_eq!(DECREMENT, -8);
    assert!(ENABLED);
    assert_eq!(RATE, 3.5);
    assert_eq!(BASE_ADDRESS, 0x8000_0000);
    assert_eq!(NAME, "caesar");
}

#[test]
fn c_header_generated_info() {
    assert!(C_HEADER.starts_with("// This file is automatically generated by hdlregs version "));
    assert!(C_HEADER.contains(" from file caesar.toml.\n"));
    assert!(C_HEADER.contains("#ifndef CAESAR_REGS_H\n#define CAESAR_REGS_H\n"));
    assert!(C_HEADER.contains("#include <stdbool.h>\n#include <stdint.h>\n"));
    assert!(C_HEADER.trim_end().ends_with("#endif // CAESAR_REGS_H"));
}

#[test]
fn c_header_registers() {
    for line in [
        "#define CAESAR_NUM_REGS (11u)",
        "#define CAESAR_CONFIG_INDEX (0u)",
        "#define CAESAR_CONFIG_ADDR (4u * CAESAR_CONFIG_INDEX)",
        "#define CAESAR_CONFIG_DEFAULT_VALUE (0x0000074eu)",
        "#define CAESAR_ADDRESS_INDEX (4u)",
        "#define CAESAR_ADDRESS_DEFAULT_VALUE (0x00000400u)",
        "#define CAESAR_CONFIG_PLAIN_BIT_B_SHIFT (1u)",
        "#define CAESAR_CONFIG_PLAIN_BIT_B_MASK (0x1u << 1u)",
        "#define CAESAR_CONFIG_PLAIN_BIT_VECTOR_MASK (0xfu << 2u)",
        "#define CAESAR_CONFIG_SIGNED_INTEGER_SHIFT (6u)",
        "#define CAESAR_CONFIG_SIGNED_INTEGER_MASK (0x1fu << 6u)",
        "#define CAESAR_CONFIG_SIGNED_INTEGER_MASK_INVERSE (~CAESAR_CONFIG_SIGNED_INTEGER_MASK)",
        "#define CAESAR_BASE_ADDRESSES_ARRAY_LENGTH (3u)",
        "#define CAESAR_BASE_ADDRESSES_READ_ADDRESS_INDEX(array_index) (5u + (array_index) * 2u + 0u)",
        "#define CAESAR_BASE_ADDRESSES_SETTINGS_INDEX(array_index) (5u + (array_index) * 2u + 1u)",
        "#define CAESAR_BASE_ADDRESSES_SETTINGS_ADDR(array_index) (4u * CAESAR_BASE_ADDRESSES_SETTINGS_INDEX(array_index))",
        "#define CAESAR_BASE_ADDRESSES_SETTINGS_DIRECTION_MASK (0x3u << 1u)",
    ] {
        assert!(
            C_HEADER.lines().any(|l| l == line),
            "missing line in C header: {line}"
        );
    }
}

#[test]
fn c_header_struct_layout() {
    let struct_start = C_HEADER
        .find("typedef struct caesar_regs_t")
        .expect("register map struct");
    let layout = &C_HEADER[struct_start..];
    let members = [
        "  uint32_t config;",
        "  uint32_t status;",
        "  uint32_t command;",
        "  uint32_t irq_status;",
        "  uint32_t address;",
        "  caesar_base_addresses_t base_addresses[3];",
    ];
    let positions = members
        .iter()
        .map(|m| layout.find(m).unwrap_or_else(|| panic!("missing member {m}")))
        .collect::<Vec<_>>();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let array_struct = C_HEADER
        .find("typedef struct caesar_base_addresses_t")
        .expect("register array struct");
    assert!(array_struct < struct_start);
}

#[test]
fn c_header_constants() {
    for line in [
        "#define CAESAR_DATA_WIDTH (24)",
        "#define CAESAR_DECREMENT (-8)",
        "#define CAESAR_ENABLED (true)",
        "#define CAESAR_RATE (3.5)",
        "#define CAESAR_BASE_ADDRESS (0x80000000u)",
        "#define CAESAR_NAME (\"caesar\")",
        "// Width of the data path.",
    ] {
        assert!(
            C_HEADER.lines().any(|l| l == line),
            "missing line in C header: {line}"
        );
    }
}
