//! Language Identification
//!
//! Language classification is a pure function of file extension — no content
//! sniffing, no AST parsing. Unknown extensions classify as `None` and the
//! owning file is skipped by the scanner.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A recognized programming (or markup/config) language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    /// Rust
    Rust,
    /// Python
    Python,
    /// JavaScript (including JSX)
    JavaScript,
    /// TypeScript (including TSX)
    TypeScript,
    /// Java
    Java,
    /// C and C++
    Cpp,
    /// Go
    Go,
    /// Ruby
    Ruby,
    /// Markdown
    Markdown,
    /// JSON
    Json,
    /// YAML
    Yaml,
    /// TOML
    Toml,
}

impl LanguageId {
    /// Every recognized language.
    #[must_use]
    pub fn all() -> &'static [LanguageId] {
        &[
            LanguageId::Rust,
            LanguageId::Python,
            LanguageId::JavaScript,
            LanguageId::TypeScript,
            LanguageId::Java,
            LanguageId::Cpp,
            LanguageId::Go,
            LanguageId::Ruby,
            LanguageId::Markdown,
            LanguageId::Json,
            LanguageId::Yaml,
            LanguageId::Toml,
        ]
    }

    /// The canonical lowercase name, as stored in `IndexedFile.language`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LanguageId::Rust => "rust",
            LanguageId::Python => "python",
            LanguageId::JavaScript => "javascript",
            LanguageId::TypeScript => "typescript",
            LanguageId::Java => "java",
            LanguageId::Cpp => "cpp",
            LanguageId::Go => "go",
            LanguageId::Ruby => "ruby",
            LanguageId::Markdown => "markdown",
            LanguageId::Json => "json",
            LanguageId::Yaml => "yaml",
            LanguageId::Toml => "toml",
        }
    }

    /// File extensions (without the leading dot) classified as this language.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            LanguageId::Rust => &["rs"],
            LanguageId::Python => &["py", "pyi", "pyw"],
            LanguageId::JavaScript => &["js", "mjs", "cjs", "jsx"],
            LanguageId::TypeScript => &["ts", "mts", "cts", "tsx"],
            LanguageId::Java => &["java"],
            LanguageId::Cpp => &["c", "h", "cpp", "cc", "cxx", "hpp", "hxx"],
            LanguageId::Go => &["go"],
            LanguageId::Ruby => &["rb"],
            LanguageId::Markdown => &["md", "markdown"],
            LanguageId::Json => &["json"],
            LanguageId::Yaml => &["yaml", "yml"],
            LanguageId::Toml => &["toml"],
        }
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Extension -> language lookup table, built once and reused by the scanner.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    by_extension: std::collections::HashMap<&'static str, LanguageId>,
}

impl LanguageRegistry {
    /// Build the registry from [`LanguageId::all`].
    #[must_use]
    pub fn new() -> Self {
        let mut by_extension = std::collections::HashMap::new();
        for lang in LanguageId::all() {
            for ext in lang.extensions() {
                by_extension.insert(*ext, *lang);
            }
        }
        Self { by_extension }
    }

    /// Classify `path` by its extension. Returns `None` for an unrecognized
    /// or missing extension — the caller skips the file.
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<LanguageId> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension.get(ext.as_str()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_extensions() {
        let registry = LanguageRegistry::new();
        assert_eq!(
            registry.classify(Path::new("src/main.rs")),
            Some(LanguageId::Rust)
        );
        assert_eq!(
            registry.classify(Path::new("app.test.tsx")),
            Some(LanguageId::TypeScript)
        );
    }

    #[test]
    fn skips_unknown_extensions() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.classify(Path::new("image.png")), None);
        assert_eq!(registry.classify(Path::new("README")), None);
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        let registry = LanguageRegistry::new();
        assert_eq!(
            registry.classify(Path::new("Main.RS")),
            Some(LanguageId::Rust)
        );
    }
}
