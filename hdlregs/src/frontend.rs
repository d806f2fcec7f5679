//! Parsers for register map source formats

pub(crate) mod toml_parser;
