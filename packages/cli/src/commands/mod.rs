pub mod check;
pub mod export;
pub mod import;
pub mod init;

pub use check::{check, CheckArgs};
pub use export::{export, ExportArgs};
pub use import::{import, ImportArgs};
pub use init::{init, InitArgs};

use std::path::{Path, PathBuf};

/// Resolve a user-supplied path against the working directory
pub(crate) fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Write to `out` when given, else stdout
pub(crate) fn write_output(cwd: &Path, out: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            let out = resolve(cwd, out);
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&out, content)?;
            tracing::debug!("wrote {}", out.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
