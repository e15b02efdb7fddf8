//! Full module resolution, used when the cheaper strategies find nothing
//!
//! Two resolvers share one trait: a compiler-aware one that understands the
//! alias table and TypeScript extensions, and a runtime one that follows the
//! `require.resolve` algorithm. Both answer with an absolute file path.

mod node;
mod typescript;

pub use node::NodeModuleResolver;
pub use typescript::TypeScriptModuleResolver;

use camino::{Utf8Path, Utf8PathBuf};
use locus_core::error::LocusResult;
use locus_core::fs::FileSystem;

/// Resolves a specifier to the absolute path of the module it loads
pub trait ModuleResolver: Send + Sync {
    /// Resolve `specifier` as imported from the absolute `importing_file`
    fn resolve(&self, specifier: &str, importing_file: &Utf8Path) -> LocusResult<Utf8PathBuf>;
}

/// `path` itself if it is a file, else the first `path + ext` that is
fn probe_file(fs: &dyn FileSystem, path: &Utf8Path, extensions: &[&str]) -> Option<Utf8PathBuf> {
    if fs.is_file(path) {
        return Some(path.to_path_buf());
    }

    probe_extensions(fs, path.as_str(), extensions)
}

/// First `stem + ext` that is a file
fn probe_extensions(fs: &dyn FileSystem, stem: &str, extensions: &[&str]) -> Option<Utf8PathBuf> {
    extensions
        .iter()
        .map(|ext| Utf8PathBuf::from(format!("{}{}", stem, ext)))
        .find(|candidate| fs.is_file(candidate))
}

/// Split a bare specifier into package name and optional subpath
fn split_specifier(specifier: &str) -> (&str, Option<&str>) {
    let name = crate::external::parse_package_name(specifier);
    let subpath = specifier[name.len()..]
        .strip_prefix('/')
        .filter(|rest| !rest.is_empty());
    (name, subpath)
}

/// Directory the importing file lives in
fn importing_dir(importing_file: &Utf8Path) -> &Utf8Path {
    importing_file.parent().unwrap_or(Utf8Path::new("/"))
}
