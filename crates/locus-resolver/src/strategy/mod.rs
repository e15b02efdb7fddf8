//! Resolution strategies and their fixed priority order

use std::fmt;

use serde::Serialize;

/// One way of mapping a specifier to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// `./x` and `../x`, joined against the importing file
    Relative,
    /// Compiler path aliases
    PathMapping,
    /// Runtime builtin modules; always a terminal no-match
    Builtin,
    /// Installed package matched to an external node
    External,
    /// Compiler-aware module resolution
    LanguageFallback,
    /// Package name declared by a workspace project
    WorkspacePackage,
    /// `require.resolve`-style module resolution
    RuntimeFallback,
}

/// Strategies in the order they are tried; the first success wins
pub const STRATEGY_ORDER: [StrategyKind; 7] = [
    StrategyKind::Relative,
    StrategyKind::PathMapping,
    StrategyKind::Builtin,
    StrategyKind::External,
    StrategyKind::LanguageFallback,
    StrategyKind::WorkspacePackage,
    StrategyKind::RuntimeFallback,
];

impl StrategyKind {
    /// Stable name used in logs and traces
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Relative => "relative",
            StrategyKind::PathMapping => "path-mapping",
            StrategyKind::Builtin => "builtin",
            StrategyKind::External => "external",
            StrategyKind::LanguageFallback => "language-fallback",
            StrategyKind::WorkspacePackage => "workspace-package",
            StrategyKind::RuntimeFallback => "runtime-fallback",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Resolved to a node id; stop
    Resolved(String),
    /// Definitely no match; stop without trying later strategies
    Rejected,
    /// Not applicable or nothing found; try the next strategy
    Skipped,
}

impl Attempt {
    /// Whether resolution stops at this attempt
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Attempt::Skipped)
    }

    /// `Resolved` for `Some`, `Skipped` for `None`
    pub fn from_option(id: Option<String>) -> Self {
        id.map_or(Attempt::Skipped, Attempt::Resolved)
    }
}
