//! Compiler-aware module resolution

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use locus_config::tsconfig::CompilerConfig;
use locus_core::error::{LocusError, LocusResult};
use locus_core::utils::{is_relative_specifier, normalize_utf8};
use tracing::trace;

use super::{importing_dir, probe_extensions, split_specifier, ModuleResolver};
use crate::descriptor::DescriptorCache;

/// Extensions probed for an extensionless module path, in order
pub const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts", ".js", ".jsx", ".mjs", ".cjs", ".json"];

/// Source extensions a `.js`-style import may stand in for
const JS_TO_TS: &[(&str, &[&str])] = &[
    (".js", &[".ts", ".tsx", ".d.ts"]),
    (".jsx", &[".tsx", ".d.ts"]),
    (".mjs", &[".mts", ".d.mts"]),
    (".cjs", &[".cts", ".d.cts"]),
];

/// Node-style resolution with the compiler's alias table and base URL
pub struct TypeScriptModuleResolver {
    descriptors: Arc<DescriptorCache>,
    config: Arc<CompilerConfig>,
    installed_dir: String,
}

impl TypeScriptModuleResolver {
    /// Create a resolver for an effective compiler configuration
    pub fn new(
        descriptors: Arc<DescriptorCache>,
        config: Arc<CompilerConfig>,
        installed_dir: impl Into<String>,
    ) -> Self {
        Self {
            descriptors,
            config,
            installed_dir: installed_dir.into(),
        }
    }

    /// Try the alias whose fixed prefix is longest, as the compiler does
    fn resolve_path_mapping(&self, specifier: &str) -> Option<Utf8PathBuf> {
        let mut best: Option<(usize, &str, &Vec<String>)> = None;

        for (pattern, targets) in &self.config.paths {
            let Some((score, captured)) = match_pattern(pattern, specifier) else {
                continue;
            };
            if best.map_or(true, |(best_score, _, _)| score > best_score) {
                best = Some((score, captured, targets));
            }
        }

        let (_, captured, targets) = best?;
        targets.iter().find_map(|target| {
            let substituted = target.replacen('*', captured, 1);
            let candidate = normalize_utf8(&self.config.paths_base.join(substituted));
            trace!("Trying alias target {}", candidate);
            self.load_file_or_directory(&candidate)
        })
    }

    fn resolve_base_url(&self, specifier: &str) -> Option<Utf8PathBuf> {
        let base_url = self.config.base_url.as_ref()?;
        self.load_file_or_directory(&normalize_utf8(&base_url.join(specifier)))
    }

    fn resolve_installed(&self, specifier: &str, from_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        let fs = self.descriptors.file_system();
        let (package_name, subpath) = split_specifier(specifier);
        let types_package = types_package_name(package_name);

        from_dir.ancestors().find_map(|dir| {
            let installed = dir.join(&self.installed_dir);
            if !fs.is_dir(&installed) {
                return None;
            }

            self.load_file_or_directory(&installed.join(specifier)).or_else(|| {
                let mut types_dir = installed.join(&types_package);
                if let Some(subpath) = subpath {
                    types_dir.push(subpath);
                }
                self.load_file_or_directory(&types_dir)
            })
        })
    }

    fn load_file_or_directory(&self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        self.load_file(path).or_else(|| self.load_directory(path))
    }

    fn load_file(&self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        let fs = self.descriptors.file_system().as_ref();

        if has_module_extension(path) {
            // `./util.js` may refer to `./util.ts`
            for (js_ext, ts_exts) in JS_TO_TS {
                if let Some(stem) = path.as_str().strip_suffix(js_ext) {
                    if let Some(found) = probe_extensions(fs, stem, ts_exts) {
                        return Some(found);
                    }
                }
            }
            if fs.is_file(path) {
                return Some(path.to_path_buf());
            }
        }

        probe_extensions(fs, path.as_str(), TS_EXTENSIONS)
    }

    fn load_directory(&self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        let fs = self.descriptors.file_system();
        if !fs.is_dir(path) {
            return None;
        }

        if let Some(descriptor) = self.descriptors.in_directory(path) {
            let entries = [descriptor.types_entry(), descriptor.main.as_deref()];
            for entry in entries.into_iter().flatten() {
                let entry_path = normalize_utf8(&path.join(entry));
                if let Some(found) = self.load_file(&entry_path).or_else(|| self.load_index(&entry_path)) {
                    return Some(found);
                }
            }
        }

        self.load_index(path)
    }

    fn load_index(&self, dir: &Utf8Path) -> Option<Utf8PathBuf> {
        probe_extensions(
            self.descriptors.file_system().as_ref(),
            dir.join("index").as_str(),
            TS_EXTENSIONS,
        )
    }
}

impl ModuleResolver for TypeScriptModuleResolver {
    fn resolve(&self, specifier: &str, importing_file: &Utf8Path) -> LocusResult<Utf8PathBuf> {
        let from_dir = importing_dir(importing_file);

        let found = if is_relative_specifier(specifier) || Utf8Path::new(specifier).is_absolute() {
            self.load_file_or_directory(&normalize_utf8(&from_dir.join(specifier)))
        } else {
            self.resolve_path_mapping(specifier)
                .or_else(|| self.resolve_base_url(specifier))
                .or_else(|| self.resolve_installed(specifier, from_dir))
        };

        found.ok_or_else(|| LocusError::ModuleNotFound {
            specifier: specifier.to_string(),
        })
    }
}

/// Prefix length and captured text when `pattern` matches `specifier`
///
/// Exact patterns score above any wildcard.
fn match_pattern<'a>(pattern: &str, specifier: &'a str) -> Option<(usize, &'a str)> {
    match pattern.split_once('*') {
        None => (pattern == specifier).then_some((usize::MAX, "")),
        Some((prefix, suffix)) => {
            if specifier.len() < prefix.len() + suffix.len()
                || !specifier.starts_with(prefix)
                || !specifier.ends_with(suffix)
            {
                return None;
            }
            Some((prefix.len(), &specifier[prefix.len()..specifier.len() - suffix.len()]))
        },
    }
}

/// `@types` package holding declarations for `package_name`
fn types_package_name(package_name: &str) -> String {
    let stripped = package_name.strip_prefix('@').unwrap_or(package_name);
    format!("@types/{}", stripped.replace('/', "__"))
}

fn has_module_extension(path: &Utf8Path) -> bool {
    TS_EXTENSIONS
        .iter()
        .chain([".mts", ".cts"].iter())
        .any(|ext| path.as_str().ends_with(ext))
}
