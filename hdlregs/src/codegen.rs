//! Generate code and data artifacts from a [`RegisterList`]
//!
//! Every artifact starts with a few lines of generated info, the last of which is a hash of the
//! artifact body. [`create`] uses the hash to avoid rewriting files that are already up to date,
//! which keeps incremental HDL and C builds from recompiling needlessly.

mod c_header;
mod json;
mod rust;
mod vhdl;

pub use self::{
    c_header::CHeaderGenerator, json::JsonGenerator, rust::RustGenerator, vhdl::VhdlGenerator,
};

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    path,
};

use crate::{error::Error, model::RegisterList};
use fs_err as fs;
use itertools::Itertools;
use log::{debug, info};

/// Version of this generator, part of the generated info and the register hash
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common interface of the artifact generators
pub trait CodeGenerator {
    /// Human readable name of the artifact, e.g., "VHDL package"
    fn kind(&self) -> &'static str;

    /// Name of the output file, e.g., "caesar_regs.h"
    fn file_name(&self) -> String;

    fn register_list(&self) -> &RegisterList;

    /// Prefix of a single line comment in the target language
    fn comment_prefix(&self) -> &'static str {
        "// "
    }

    /// Check that the register list can be expressed in the target language
    ///
    /// # Errors
    ///
    /// - names that are distinct in the register list map onto the same identifier
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }

    /// The artifact without the generated info header
    fn body(&self) -> String;

    /// The complete artifact
    fn render(&self, info: &GeneratedInfo, body: &str) -> String {
        let header = info
            .lines()
            .iter()
            .map(|line| format!("{}{line}\n", self.comment_prefix()))
            .collect::<String>();
        format!("{header}\n{body}")
    }

    /// Generate the complete artifact as a string
    ///
    /// # Errors
    ///
    /// - see [`CodeGenerator::validate`]
    fn generate(&self) -> Result<String, Error> {
        self.validate()?;
        let body = self.body();
        let info = GeneratedInfo::new(self.register_list(), &body);
        Ok(self.render(&info, &body))
    }
}

/// Information about how and from what an artifact was generated
#[derive(Clone, Debug)]
pub struct GeneratedInfo {
    timestamp: String,
    source_file: Option<String>,
    hash: u64,
}

impl GeneratedInfo {
    pub fn new(register_list: &RegisterList, body: &str) -> Self {
        let source_file = register_list.source_definition_file().map(|p| {
            p.file_name()
                .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned())
        });
        Self {
            timestamp: chrono::Utc::now()
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            source_file,
            hash: register_hash(body),
        }
    }

    /// The line that identifies the contents of an artifact
    pub fn hash_line(&self) -> String {
        format!("Register hash {:016x}.", self.hash)
    }

    pub fn lines(&self) -> Vec<String> {
        let generated = match &self.source_file {
            Some(file) => format!("Generated {} from file {file}.", self.timestamp),
            None => format!("Generated {}.", self.timestamp),
        };
        vec![
            format!("This file is automatically generated by hdlregs version {VERSION}."),
            generated,
            self.hash_line(),
        ]
    }
}

fn register_hash(body: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    VERSION.hash(&mut hasher);
    body.hash(&mut hasher);
    hasher.finish()
}

/// Result of [`create`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub path: path::PathBuf,
    /// False if the file was already up to date and left untouched
    pub written: bool,
}

/// Write the artifact of `generator` into `output_dir`
///
/// The file is not rewritten if it already holds an artifact with the same register hash.
///
/// # Errors
///
/// - the register list cannot be expressed in the target language
/// - `output_dir` cannot be created or the file cannot be written
pub fn create(
    generator: &dyn CodeGenerator,
    output_dir: &path::Path,
) -> Result<GenerateOutcome, Error> {
    generator.validate()?;
    let path = output_dir.join(generator.file_name());
    let body = generator.body();
    let info = GeneratedInfo::new(generator.register_list(), &body);

    if path.exists() {
        match fs::read_to_string(&path) {
            Ok(existing) if existing.contains(&info.hash_line()) => {
                info!(
                    "{} is up to date, skipping {}",
                    path.display(),
                    generator.kind()
                );
                return Ok(GenerateOutcome {
                    path,
                    written: false,
                });
            }
            Ok(_) => debug!("{} has changed, regenerating", path.display()),
            Err(err) => debug!("could not read {}, regenerating: {err}", path.display()),
        }
    }

    fs::create_dir_all(output_dir)?;
    fs::write(&path, generator.render(&info, &body))?;
    info!("wrote {} to {}", generator.kind(), path.display());
    Ok(GenerateOutcome {
        path,
        written: true,
    })
}

/// Format a finite float so that it reads as a real number in VHDL and C, e.g., "1.0" or "1.5e-7"
pub(crate) fn float_literal(value: f64) -> String {
    let s = format!("{value:?}");
    match s.split_once('e') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => format!("{mantissa}.0e{exponent}"),
        _ => s,
    }
}

/// Comment lines for a possibly multi-line description, nothing for an empty description
pub(crate) fn description_comment(prefix: &str, description: &str) -> String {
    description
        .lines()
        .map(|line| format!("{prefix}{line}").trim_end().to_owned() + "\n")
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mode;

    struct PlainText(RegisterList);

    impl CodeGenerator for PlainText {
        fn kind(&self) -> &'static str {
            "plain text"
        }

        fn file_name(&self) -> String {
            format!("{}.txt", self.0.name())
        }

        fn comment_prefix(&self) -> &'static str {
            "# "
        }

        fn register_list(&self) -> &RegisterList {
            &self.0
        }

        fn body(&self) -> String {
            self.0
                .iterate_registers()
                .map(|(reg, _)| format!("{}\n", reg.name()))
                .collect()
        }
    }

    fn generator() -> PlainText {
        let mut list =
            RegisterList::new("caesar", Some(path::PathBuf::from("/tmp/regs_caesar.toml")))
                .unwrap();
        list.append_register("conf", Mode::ReadWrite, "").unwrap();
        PlainText(list)
    }

    #[test]
    fn generated_info_lines() {
        let generator = generator();
        let output = generator.generate().unwrap();
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[0],
            format!("# This file is automatically generated by hdlregs version {VERSION}.")
        );
        assert!(lines[1].starts_with("# Generated "));
        assert!(lines[1].ends_with(" from file regs_caesar.toml."));
        assert!(lines[2].starts_with("# Register hash "));
        assert_eq!(lines[2].len(), "# Register hash .".len() + 16);
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "conf");
    }

    #[test]
    fn hash_follows_body() {
        let generator = generator();
        let a = GeneratedInfo::new(generator.register_list(), "a");
        let b = GeneratedInfo::new(generator.register_list(), "b");
        assert_ne!(a.hash_line(), b.hash_line());
        assert_eq!(
            a.hash_line(),
            GeneratedInfo::new(generator.register_list(), "a").hash_line()
        );
    }

    #[test]
    fn create_skips_up_to_date_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested");
        let mut generator = generator();

        let first = create(&generator, &out_dir).unwrap();
        assert!(first.written);
        assert_eq!(first.path, out_dir.join("caesar.txt"));

        let second = create(&generator, &out_dir).unwrap();
        assert!(!second.written);

        generator.0
            .append_register("status", Mode::Read, "")
            .unwrap();
        let third = create(&generator, &out_dir).unwrap();
        assert!(third.written);
        let content = fs::read_to_string(&third.path).unwrap();
        assert!(content.ends_with("conf\nstatus\n"));
    }

    #[test]
    fn float_literals() {
        assert_eq!(float_literal(2.5), "2.5");
        assert_eq!(float_literal(3.0), "3.0");
        assert_eq!(float_literal(-0.25), "-0.25");
        assert_eq!(float_literal(1e-7), "1.0e-7");
        assert_eq!(float_literal(1.5e300), "1.5e300");
    }

    #[test]
    fn description_comments() {
        assert_eq!(description_comment("-- ", ""), "");
        assert_eq!(
            description_comment("// ", "First line.\n\nThird line."),
            "// First line.\n//\n// Third line.\n"
        );
    }
}
