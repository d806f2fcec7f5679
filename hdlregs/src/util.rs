//! Helpers for dealing with register source files

use std::path;

/// Derive a module name from the name of a register source file
///
/// The file stem is used with a `regs_` prefix or a `_regs` suffix removed, e.g.,
/// `regs_caesar.toml` and `caesar_regs.toml` both give "caesar".
pub(crate) fn module_name_from_path(path: &path::Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem
        .strip_prefix("regs_")
        .or_else(|| stem.strip_suffix("_regs"))
        .unwrap_or(stem);
    (!name.is_empty()).then(|| name.to_owned())
}

#[test]
fn module_name_from_file_name() {
    let name = |p: &str| module_name_from_path(path::Path::new(p));
    assert_eq!(name("regs/regs_caesar.toml").as_deref(), Some("caesar"));
    assert_eq!(name("caesar_regs.toml").as_deref(), Some("caesar"));
    assert_eq!(name("/a/b/caesar.toml").as_deref(), Some("caesar"));
    assert_eq!(name("regs_.toml"), None);
}
