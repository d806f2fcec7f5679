//! Generates the `caesar` register map artifacts into `OUT_DIR`

mod logger;
mod util;

use std::{env, path};

use anyhow::Context;
use log::{warn, LevelFilter};

/// Register map source, relative to the package root
const REGS_TOML: &str = "regs/caesar.toml";

fn env_path(var: &str) -> anyhow::Result<path::PathBuf> {
    env::var(var)
        .map(path::PathBuf::from)
        .with_context(|| format!("{var} is not set"))
}

pub fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed={REGS_TOML}");
    println!("cargo:rerun-if-changed=build");

    // Install a logger to print useful messages into `cargo:warning={}`
    logger::init(LevelFilter::Warn).context("could not install build logger")?;

    let toml_file = env_path("CARGO_MANIFEST_DIR")?.join(REGS_TOML);
    let out_dir = env_path("OUT_DIR")?;

    let source = hdlregs::ModelSource::new(toml_file).with_module_name("caesar");
    let register_list = hdlregs::parse(&source)
        .with_context(|| format!("could not parse {}", source.path().display()))?;

    for target in [hdlregs::Target::Rust, hdlregs::Target::CHeader] {
        let outcome = hdlregs::create(&register_list, target, &out_dir)
            .with_context(|| format!("could not generate {target:?} into {}", out_dir.display()))?;
        if target == hdlregs::Target::Rust && outcome.written {
            // Unformatted output still compiles
            if let Err(err) = util::rustfmt_file(&outcome.path) {
                warn!("could not format {}: {err}", outcome.path.display());
            }
        }
    }

    Ok(())
}
