//! Runtime builtin module detection

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::external::parse_package_name;

/// Builtin module names of the Node.js runtime
const NODE_BUILTINS: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Modules that only exist under the `node:` scheme
const PREFIX_ONLY_BUILTINS: &[&str] = &["node:sea", "node:sqlite", "node:test"];

static BUILTIN_SET: Lazy<HashSet<String>> = Lazy::new(|| {
    NODE_BUILTINS
        .iter()
        .flat_map(|name| [name.to_string(), format!("node:{}", name)])
        .chain(PREFIX_ONLY_BUILTINS.iter().map(|name| name.to_string()))
        .collect()
});

/// Builtin module table, optionally extended by settings
#[derive(Debug, Clone, Default)]
pub struct BuiltinModules {
    extra: HashSet<String>,
}

impl BuiltinModules {
    /// Runtime builtins plus `extra` names
    pub fn new(extra: impl IntoIterator<Item = String>) -> Self {
        Self {
            extra: extra.into_iter().collect(),
        }
    }

    /// Check whether `specifier` names a builtin module or one of its subpaths
    ///
    /// `fs`, `node:fs` and `fs/promises` all count as builtin.
    pub fn is_builtin(&self, specifier: &str) -> bool {
        let name = parse_package_name(specifier);
        [specifier, name]
            .iter()
            .any(|candidate| BUILTIN_SET.contains(*candidate) || self.extra.contains(*candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_prefixed_names() {
        let builtins = BuiltinModules::default();

        assert!(builtins.is_builtin("fs"));
        assert!(builtins.is_builtin("node:fs"));
        assert!(builtins.is_builtin("fs/promises"));
        assert!(builtins.is_builtin("node:fs/promises"));
        assert!(builtins.is_builtin("worker_threads"));
    }

    #[test]
    fn test_prefix_only_modules() {
        let builtins = BuiltinModules::default();

        assert!(builtins.is_builtin("node:test"));
        assert!(builtins.is_builtin("node:test/reporters"));
        assert!(builtins.is_builtin("node:sqlite"));
        assert!(!builtins.is_builtin("test"));
        assert!(!builtins.is_builtin("sqlite"));
    }

    #[test]
    fn test_packages_are_not_builtin() {
        let builtins = BuiltinModules::default();

        assert!(!builtins.is_builtin("left-pad"));
        assert!(!builtins.is_builtin("@types/node"));
        assert!(!builtins.is_builtin("fs-extra"));
        assert!(!builtins.is_builtin("./fs"));
    }

    #[test]
    fn test_extra_builtins() {
        let builtins = BuiltinModules::new(vec!["electron".to_string()]);

        assert!(builtins.is_builtin("electron"));
        assert!(builtins.is_builtin("electron/main"));
        assert!(builtins.is_builtin("path"));
    }
}
