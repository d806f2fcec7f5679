use std::{env, ops, path};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use hdlregs::RegisterField;

#[derive(Parser)]
#[command(version, about, long_about = None, author = clap::crate_authors!(), subcommand_required = true)]
struct Cli {
    /// TOML source file for the register map
    #[arg(long, required = true)]
    toml: String,

    /// Name of the module that the registers belong to
    ///
    /// Defaults to the file name without extension and without a `regs_` prefix or `_regs`
    /// suffix.
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Parse the register map without generating anything
    Check,
    /// List all registers of the register map
    Ls {
        #[arg(long, default_value = "index")]
        sorting: Sorting,
        /// Only list register names
        #[arg(long, action = clap::ArgAction::SetTrue)]
        no_index: bool,
    },
    /// Generate an artifact from the register map
    Gen {
        #[arg(short = 't', long, required = true)]
        target: Target,
        /// Write the artifact into this directory instead of printing it
        ///
        /// An existing file is left untouched if the register map has not changed.
        #[arg(short = 'o', long)]
        out_dir: Option<path::PathBuf>,
    },
    /// Decode a register value into field values
    Decode {
        /// Register array that the register belongs to
        #[arg(long, requires = "array_index")]
        array: Option<String>,
        /// Array element that the register belongs to
        #[arg(long, requires = "array")]
        array_index: Option<usize>,
        register: String,
        /// Register value, decimal or hexadecimal with a `0x` prefix
        #[arg(value_parser = clap_num::maybe_hex::<u32>)]
        value: u32,
    },
}

#[derive(Clone, Copy)]
enum Sorting {
    Index,
    Alpha,
}

impl ValueEnum for Sorting {
    fn value_variants<'a>() -> &'a [Self] {
        &[Sorting::Index, Sorting::Alpha]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self {
            Sorting::Index => Some(PossibleValue::new("index")),
            Sorting::Alpha => Some(PossibleValue::new("alpha")),
        }
    }
}

#[derive(Clone, Copy)]
struct Target(hdlregs::Target);

impl ops::Deref for Target {
    type Target = hdlregs::Target;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ValueEnum for Target {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self(hdlregs::Target::Vhdl),
            Self(hdlregs::Target::CHeader),
            Self(hdlregs::Target::Rust),
            Self(hdlregs::Target::Json),
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        use clap::builder::PossibleValue;
        match self.0 {
            hdlregs::Target::Vhdl => Some(PossibleValue::new("vhdl")),
            hdlregs::Target::CHeader => Some(PossibleValue::new("c")),
            hdlregs::Target::Rust => Some(PossibleValue::new("rust")),
            hdlregs::Target::Json => Some(PossibleValue::new("json")),
        }
    }
}

fn string_to_path(s: &str) -> anyhow::Result<path::PathBuf> {
    let path = env::current_dir()
        .context("cannot access current working dir")?
        .join(s);
    if !path.is_file() {
        return Err(anyhow!("file does not exist: {}", path.display()));
    }
    // Canonicalize paths for clear output
    path.canonicalize()
        .with_context(|| format!("cannot resolve path {}", path.display()))
}

fn get_source(cli: &Cli) -> anyhow::Result<hdlregs::ModelSource> {
    let source = hdlregs::ModelSource::new(string_to_path(&cli.toml)?);
    Ok(match &cli.name {
        Some(name) => source.with_module_name(name),
        None => source,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let source = get_source(&cli)?;
    let register_list = hdlregs::parse(&source)
        .with_context(|| format!("could not parse {}", source.path().display()))?;

    if let Some(cmd) = &cli.command {
        match cmd {
            Command::Check => println!(
                "hdlregs: module \"{}\" with {} registers and {} constants parsed successfully",
                register_list.name(),
                register_list.num_registers(),
                register_list.constants().len()
            ),
            Command::Ls { sorting, no_index } => ls(&register_list, *sorting, *no_index),
            Command::Gen { target, out_dir } => generate(&register_list, **target, out_dir.as_deref())?,
            Command::Decode {
                array,
                array_index,
                register,
                value,
            } => {
                let array = array.as_deref().zip(*array_index);
                decode(&register_list, register, array, *value)?;
            }
        }
    } else {
        println!("Nothing to do. Please issue a subcommand.")
    }

    Ok(())
}

fn ls(register_list: &hdlregs::RegisterList, sorting: Sorting, no_index: bool) {
    let mut rows = register_list
        .iterate_registers()
        .map(|(register, array)| match array {
            None => (
                register.name().to_owned(),
                register.index().to_string(),
                register.mode(),
            ),
            Some(array) => {
                let first = array.register_index(register, 0);
                let last = array.register_index(register, array.length() - 1);
                let index = match (first, last) {
                    (Ok(first), Ok(last)) if first != last => format!("{first}..={last}"),
                    (Ok(first), _) => first.to_string(),
                    (Err(_), _) => "?".to_owned(),
                };
                (
                    format!("{}[{}].{}", array.name(), array.length(), register.name()),
                    index,
                    register.mode(),
                )
            }
        })
        .collect::<Vec<_>>();
    if rows.is_empty() {
        println!("hdlregs: no registers found in input");
        return;
    }
    match sorting {
        Sorting::Index => { /* do nothing */ }
        Sorting::Alpha => rows.sort_by(|a, b| a.0.cmp(&b.0)),
    };
    let longest_name = rows.iter().map(|(name, _, _)| name.len()).max().unwrap_or(0);
    let longest_index = rows.iter().map(|(_, index, _)| index.len()).max().unwrap_or(0);
    for (name, index, mode) in rows {
        if no_index {
            println!("{name}");
        } else {
            println!(
                "{index: >longest_index$} {name: <longest_name$} {: <7} {}",
                mode.as_str(),
                mode.description()
            );
        }
    }
}

fn generate(
    register_list: &hdlregs::RegisterList,
    target: hdlregs::Target,
    out_dir: Option<&path::Path>,
) -> anyhow::Result<()> {
    match out_dir {
        Some(out_dir) => {
            let outcome = hdlregs::create(register_list, target, out_dir)
                .with_context(|| format!("could not generate into {}", out_dir.display()))?;
            if outcome.written {
                println!("hdlregs: wrote {}", outcome.path.display());
            } else {
                println!("hdlregs: {} is up to date", outcome.path.display());
            }
        }
        None => print!("{}", hdlregs::generate(register_list, target)?),
    }
    Ok(())
}

fn decode(
    register_list: &hdlregs::RegisterList,
    register_name: &str,
    array: Option<(&str, usize)>,
    value: u32,
) -> anyhow::Result<()> {
    let (register, index) = register_list.resolve_register(register_name, array)?;
    println!(
        "hdlregs: register \"{register_name}\" at index {index}, address {:#06x}, value {value:#010x}",
        4 * index
    );
    let values = hdlregs::decode_register_value(register_list, register_name, array, value)?;
    let longest = values.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for ((name, value), field) in values.iter().zip(register.fields()) {
        println!("{name: <longest$} [{}] {value}", field.range_str());
    }
    Ok(())
}
