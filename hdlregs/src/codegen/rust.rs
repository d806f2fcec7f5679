//! Rust module with one submodule per register, register array and field
//!
//! The module is meant to be pulled in with `include!`, so it may not contain inner attributes.

use std::iter;

use crate::{
    codegen::CodeGenerator,
    error::Error,
    model::{ConstantValue, Field, Register, RegisterArray, RegisterList, RegisterObject},
};
use itertools::Itertools;
use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{format_ident, quote};

const STRICT_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
    "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Identifier for `name`, escaping Rust keywords
fn ident(name: &str) -> Ident {
    match name {
        // Cannot be raw identifiers
        "self" | "Self" | "super" | "crate" => format_ident!("{}_", name),
        _ if STRICT_KEYWORDS.contains(&name) => Ident::new_raw(name, Span::call_site()),
        _ => format_ident!("{}", name),
    }
}

/// Module holding the constants of the register list, next to the register modules
const CONSTANTS_MODULE: &str = "constants";

/// Fail on the first identifier in `idents` that occurs more than once
fn check_unique(kind: &'static str, idents: impl Iterator<Item = Ident>) -> Result<(), Error> {
    match idents.map(|ident| ident.to_string()).duplicates().next() {
        Some(name) => Err(Error::NameCollision { kind, name }),
        None => Ok(()),
    }
}

fn constant_ident(name: &str) -> Ident {
    ident(&name.to_uppercase())
}

fn doc_attr(description: &str) -> TokenStream {
    if description.is_empty() {
        quote!()
    } else {
        quote!(#[doc = #description])
    }
}

pub struct RustGenerator<'a> {
    register_list: &'a RegisterList,
}

impl<'a> RustGenerator<'a> {
    pub fn new(register_list: &'a RegisterList) -> Self {
        Self { register_list }
    }

    fn gen_field(field: &Field) -> TokenStream {
        let doc = doc_attr(field.description());
        let name = ident(field.name());
        let shift = Literal::u32_unsuffixed(field.base_index());
        let width = Literal::u32_unsuffixed(field.width());
        let mask = Literal::u32_unsuffixed(field.mask());
        let default_value = Literal::u32_unsuffixed(field.default_value_uint());
        let kind_doc = format!("{} at bits {}", field.kind_str(), field.range_str());
        quote! {
            #doc
            #[doc = #kind_doc]
            #[allow(non_snake_case)]
            pub mod #name {
                /// Index of the lowest bit of the field
                pub const SHIFT: u32 = #shift;
                pub const WIDTH: u32 = #width;
                /// Field bits within the register value
                pub const MASK: u32 = #mask;
                /// Raw, unshifted value after reset
                pub const DEFAULT_VALUE: u32 = #default_value;
            }
        }
    }

    /// Constants shared by plain registers and registers within arrays
    fn gen_register_common(register: &Register) -> TokenStream {
        let mode = register.mode().as_str();
        let default_value = Literal::u32_unsuffixed(register.default_value());
        let fields = register.fields().iter().map(Self::gen_field);
        quote! {
            pub const MODE: &str = #mode;
            /// Register value after reset
            pub const DEFAULT_VALUE: u32 = #default_value;

            #(#fields)*
        }
    }

    fn gen_register(register: &Register) -> TokenStream {
        let doc = doc_attr(&register.description);
        let name = ident(register.name());
        let index = Literal::usize_unsuffixed(register.index());
        let addr = Literal::usize_unsuffixed(register.address());
        let common = Self::gen_register_common(register);
        quote! {
            #doc
            #[allow(non_snake_case)]
            pub mod #name {
                pub const INDEX: usize = #index;
                /// Byte address relative to the register map base address
                pub const ADDR: usize = #addr;
                #common
            }
        }
    }

    fn gen_array_register(register: &Register) -> TokenStream {
        let doc = doc_attr(&register.description);
        let name = ident(register.name());
        let index_in_array = Literal::usize_unsuffixed(register.index());
        let common = Self::gen_register_common(register);
        quote! {
            #doc
            #[allow(non_snake_case)]
            pub mod #name {
                /// Index of the register within one array element
                pub const INDEX_IN_ARRAY: usize = #index_in_array;

                /// Register index in array element `array_index`
                pub const fn index(array_index: usize) -> usize {
                    assert!(array_index < super::ARRAY_LENGTH, "array index out of bounds");
                    super::BASE_INDEX + array_index * super::REGISTERS_PER_ELEMENT + INDEX_IN_ARRAY
                }

                /// Byte address in array element `array_index`
                pub const fn addr(array_index: usize) -> usize {
                    4 * index(array_index)
                }

                #common
            }
        }
    }

    fn gen_register_array(array: &RegisterArray) -> TokenStream {
        let doc = doc_attr(&array.description);
        let name = ident(array.name());
        let length = Literal::usize_unsuffixed(array.length());
        let base_index = Literal::usize_unsuffixed(array.base_index());
        let registers_per_element = Literal::usize_unsuffixed(array.registers().len());
        let registers = array.registers().iter().map(Self::gen_array_register);
        quote! {
            #doc
            #[allow(non_snake_case)]
            pub mod #name {
                /// Number of array elements
                pub const ARRAY_LENGTH: usize = #length;
                /// Index of the first register of the first array element
                pub const BASE_INDEX: usize = #base_index;
                pub const REGISTERS_PER_ELEMENT: usize = #registers_per_element;

                #(#registers)*
            }
        }
    }

    fn gen_constants(&self) -> TokenStream {
        let constants = self.register_list.constants().iter().map(|constant| {
            let doc = doc_attr(&constant.description);
            let name = constant_ident(constant.name());
            let (ty, value) = match constant.value() {
                ConstantValue::Integer(v) => (quote!(i64), Literal::i64_unsuffixed(*v)),
                ConstantValue::Boolean(v) => {
                    let value = if *v { quote!(true) } else { quote!(false) };
                    return quote! {
                        #doc
                        pub const #name: bool = #value;
                    };
                }
                ConstantValue::Float(v) => (quote!(f64), Literal::f64_unsuffixed(*v)),
                ConstantValue::String(v) => (quote!(&str), Literal::string(v)),
                ConstantValue::UnsignedVector(v) if v.width() > 32 => {
                    (quote!(u64), Literal::u64_unsuffixed(v.value()))
                }
                ConstantValue::UnsignedVector(v) => {
                    (quote!(u32), Literal::u64_unsuffixed(v.value()))
                }
            };
            quote! {
                #doc
                pub const #name: #ty = #value;
            }
        });
        let module = format_ident!("{}", CONSTANTS_MODULE);
        quote! {
            /// Constants of the register map
            pub mod #module {
                #(#constants)*
            }
        }
    }
}

impl CodeGenerator for RustGenerator<'_> {
    fn kind(&self) -> &'static str {
        "Rust module"
    }

    fn file_name(&self) -> String {
        format!("{}_regs.rs", self.register_list.name())
    }

    fn register_list(&self) -> &RegisterList {
        self.register_list
    }

    /// Register, register array and field names map onto module names and constant names onto
    /// upper case constants, so these must not collide after escaping
    fn validate(&self) -> Result<(), Error> {
        let kind = self.kind();
        let list = self.register_list;
        check_unique(
            kind,
            list.register_objects()
                .iter()
                .map(|obj| ident(obj.name()))
                .chain(iter::once(format_ident!("{}", CONSTANTS_MODULE))),
        )?;
        for obj in list.register_objects() {
            if let RegisterObject::Array(array) = obj {
                check_unique(kind, array.registers().iter().map(|reg| ident(reg.name())))?;
            }
        }
        for (register, _) in list.iterate_registers() {
            check_unique(kind, register.fields().iter().map(|field| ident(field.name())))?;
        }
        check_unique(
            kind,
            list.constants()
                .iter()
                .map(|constant| constant_ident(constant.name())),
        )
    }

    fn body(&self) -> String {
        let mod_doc = format!(
            "Registers and constants of the \"{}\" register map",
            self.register_list.name()
        );
        let num_regs = Literal::usize_unsuffixed(self.register_list.num_registers());
        let register_objects = self
            .register_list
            .register_objects()
            .iter()
            .map(|obj| match obj {
                RegisterObject::Register(register) => Self::gen_register(register),
                RegisterObject::Array(array) => Self::gen_register_array(array),
            });
        let constants = self.gen_constants();

        // Inner doc comments are not allowed in included files, so the module documentation is
        // attached to a dummy item instead
        quote! {
            #[doc = #mod_doc]
            const _DOC: () = ();

            /// Number of registers within this register map
            pub const NUM_REGS: usize = #num_regs;

            #(#register_objects)*

            #constants
        }
        .to_string()
            + "\n"
    }
}
