//! Path utilities for workspace-relative and absolute paths.
//!
//! Workspace-relative paths are handled as forward-slash strings so lookups
//! behave the same on every platform. Absolute paths go through camino.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Normalize a workspace-relative path to forward slashes, resolving `.` and `..`
///
/// Duplicate separators and trailing slashes are dropped. `..` that would
/// climb above the start is kept, so callers can detect escaping paths. An
/// empty result is `"."`.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut components: Vec<&str> = Vec::new();

    for component in unified.split('/') {
        match component {
            "" | "." => {},
            ".." => match components.last() {
                Some(&last) if last != ".." => {
                    components.pop();
                },
                _ if absolute => {},
                _ => components.push(".."),
            },
            other => components.push(other),
        }
    }

    let joined = components.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Directory portion of a forward-slash path (`"."` when there is none)
pub fn dirname(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => normalized[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Join `rel` onto `base` and normalize the result
pub fn join_path(base: &str, rel: &str) -> String {
    if base.is_empty() || base == "." {
        normalize_path(rel)
    } else {
        normalize_path(&format!("{}/{}", base, rel))
    }
}

/// Check whether any segment of `path` equals `segment`
pub fn has_segment(path: &str, segment: &str) -> bool {
    path.split(['/', '\\']).any(|part| part == segment)
}

/// Check whether a normalized relative path climbs out of its root
pub fn escapes_root(normalized: &str) -> bool {
    normalized == ".." || normalized.starts_with("../")
}

/// Check if a module specifier is syntactically relative
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Lexically normalize an absolute (or relative) path by resolving . and ..
pub fn normalize_utf8(path: &Utf8Path) -> Utf8PathBuf {
    let mut components: Vec<Utf8Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {
                // Skip current directory
            },
            Utf8Component::ParentDir => match components.last() {
                Some(Utf8Component::Normal(_)) => {
                    components.pop();
                },
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {},
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }

    components.iter().collect()
}

/// Express `path` relative to `base` as a forward-slash string
///
/// Returns `None` when no relative form exists (e.g. different drives).
pub fn relative_to(base: &Utf8Path, path: &Utf8Path) -> Option<String> {
    let diff = pathdiff::diff_utf8_paths(normalize_utf8(path), normalize_utf8(base))?;
    Some(normalize_path(diff.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./src/../lib/./file.ts"), "lib/file.ts");
        assert_eq!(normalize_path("apps\\app1\\src"), "apps/app1/src");
        assert_eq!(normalize_path("libs//shared/"), "libs/shared");
        assert_eq!(normalize_path(""), ".");
        assert_eq!(normalize_path("./"), ".");
        assert_eq!(normalize_path("../outside/x"), "../outside/x");
        assert_eq!(normalize_path("a/../../b"), "../b");
        assert_eq!(normalize_path("/ws/a/../b"), "/ws/b");
        assert_eq!(normalize_path("/.."), "/");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("apps/app1/src/main"), "apps/app1/src");
        assert_eq!(dirname("main.ts"), ".");
        assert_eq!(dirname("/main.ts"), "/");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("apps/app1/src", "../lib/util"), "apps/app1/lib/util");
        assert_eq!(join_path("apps/app1/src", "../../lib/util"), "apps/lib/util");
        assert_eq!(join_path(".", "./libs/a"), "libs/a");
        assert_eq!(join_path("", "libs/a"), "libs/a");
    }

    #[test]
    fn test_segments_and_specifiers() {
        assert!(has_segment("node_modules/foo/index.js", "node_modules"));
        assert!(has_segment("libs/a/node_modules/foo", "node_modules"));
        assert!(!has_segment("libs/my_node_modules/foo", "node_modules"));

        assert!(escapes_root(".."));
        assert!(escapes_root("../x"));
        assert!(!escapes_root("..x"));

        assert!(is_relative_specifier("./a"));
        assert!(is_relative_specifier("../a"));
        assert!(is_relative_specifier("."));
        assert!(!is_relative_specifier(".prettierrc"));
        assert!(!is_relative_specifier("@org/a"));
    }

    #[test]
    fn test_relative_to() {
        let base = Utf8Path::new("/ws");
        assert_eq!(
            relative_to(base, Utf8Path::new("/ws/libs/a/src/index.ts")).as_deref(),
            Some("libs/a/src/index.ts")
        );
        assert_eq!(relative_to(base, Utf8Path::new("/ws")).as_deref(), Some("."));
        assert_eq!(
            relative_to(base, Utf8Path::new("/other/x.ts")).as_deref(),
            Some("../other/x.ts")
        );
    }

    #[test]
    fn test_normalize_utf8() {
        assert_eq!(
            normalize_utf8(Utf8Path::new("/ws/apps/app1/src/../../lib/./x")),
            Utf8PathBuf::from("/ws/apps/lib/x")
        );
        assert_eq!(normalize_utf8(Utf8Path::new("/..")), Utf8PathBuf::from("/"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(path in "[a-z./]{0,24}") {
            let once = normalize_path(&path);
            prop_assert_eq!(normalize_path(&once), once.clone());
            prop_assert!(!once.ends_with('/') || once == "/");
        }
    }
}
