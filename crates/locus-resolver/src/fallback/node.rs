//! Runtime (`require.resolve`) module resolution

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use locus_core::error::{LocusError, LocusResult};
use locus_core::utils::{is_relative_specifier, normalize_utf8};
use tracing::trace;

use super::{importing_dir, probe_extensions, probe_file, split_specifier, ModuleResolver};
use crate::descriptor::DescriptorCache;

/// Extensions `require` appends to a bare file path
pub const NODE_EXTENSIONS: &[&str] = &[".js", ".json", ".node"];

/// Conditions honoured in a package's root `exports` entry
const REQUIRE_CONDITIONS: &[&str] = &["require", "node", "default"];

/// The CommonJS resolution algorithm over installed-dependency directories
pub struct NodeModuleResolver {
    descriptors: Arc<DescriptorCache>,
    installed_dir: String,
}

impl NodeModuleResolver {
    /// Create a resolver for the given installed-dependency directory name
    pub fn new(descriptors: Arc<DescriptorCache>, installed_dir: impl Into<String>) -> Self {
        Self {
            descriptors,
            installed_dir: installed_dir.into(),
        }
    }

    fn load_as_file(&self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        probe_file(self.descriptors.file_system().as_ref(), path, NODE_EXTENSIONS)
    }

    fn load_index(&self, dir: &Utf8Path) -> Option<Utf8PathBuf> {
        probe_extensions(
            self.descriptors.file_system().as_ref(),
            dir.join("index").as_str(),
            NODE_EXTENSIONS,
        )
    }

    fn load_as_directory(&self, dir: &Utf8Path) -> Option<Utf8PathBuf> {
        if let Some(main) = self
            .descriptors
            .in_directory(dir)
            .and_then(|descriptor| descriptor.main.clone())
        {
            let main_path = normalize_utf8(&dir.join(main));
            if let Some(found) = self.load_as_file(&main_path).or_else(|| self.load_index(&main_path)) {
                return Some(found);
            }
        }

        self.load_index(dir)
    }

    fn load_file_or_directory(&self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        self.load_as_file(path).or_else(|| self.load_as_directory(path))
    }

    /// Walk `<ancestor>/node_modules` directories from `from_dir` upward
    fn load_installed(&self, specifier: &str, from_dir: &Utf8Path) -> LocusResult<Utf8PathBuf> {
        let fs = self.descriptors.file_system();
        let (package_name, subpath) = split_specifier(specifier);

        for dir in from_dir.ancestors() {
            // Never look for node_modules/node_modules
            if dir.file_name() == Some(self.installed_dir.as_str()) {
                continue;
            }
            let installed = dir.join(&self.installed_dir);
            if !fs.is_dir(&installed) {
                continue;
            }

            let package_dir = installed.join(package_name);
            if subpath.is_none() {
                if let Some(descriptor) = self.descriptors.in_directory(&package_dir) {
                    if descriptor.exports.is_some() {
                        // An `exports` map is authoritative for the package root
                        return descriptor
                            .root_export(REQUIRE_CONDITIONS)
                            .map(|target| normalize_utf8(&package_dir.join(target)))
                            .filter(|target| fs.is_file(target))
                            .ok_or_else(|| LocusError::PackageNotFound {
                                name: package_name.to_string(),
                                from: from_dir.to_string(),
                            });
                    }
                }
            }

            if let Some(found) = self.load_file_or_directory(&installed.join(specifier)) {
                trace!("'{}' found under {}", specifier, installed);
                return Ok(found);
            }
        }

        Err(LocusError::ModuleNotFound {
            specifier: specifier.to_string(),
        })
    }
}

impl ModuleResolver for NodeModuleResolver {
    fn resolve(&self, specifier: &str, importing_file: &Utf8Path) -> LocusResult<Utf8PathBuf> {
        let from_dir = importing_dir(importing_file);

        if is_relative_specifier(specifier) || Utf8Path::new(specifier).is_absolute() {
            return self
                .load_file_or_directory(&normalize_utf8(&from_dir.join(specifier)))
                .ok_or_else(|| LocusError::ModuleNotFound {
                    specifier: specifier.to_string(),
                });
        }

        self.load_installed(specifier, from_dir)
    }
}
