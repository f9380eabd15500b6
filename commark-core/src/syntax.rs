//! Per-language comment syntax and the registry that serves it

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Block comment delimiters. Both tokens are always present together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSyntax {
    pub start: String,
    pub end: String,
}

/// How one language writes comments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentSyntax {
    /// Token that opens a line comment, e.g. `//`.
    pub line: String,
    /// Optional block delimiter pair, e.g. `/*` and `*/`.
    pub block: Option<BlockSyntax>,
}

impl CommentSyntax {
    pub fn line_only(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            block: None,
        }
    }

    pub fn with_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: line.into(),
            block: Some(BlockSyntax {
                start: block_start.into(),
                end: block_end.into(),
            }),
        }
    }
}

/// Registry of comment syntaxes keyed by language id.
///
/// An explicit value with an explicit [`refresh`](Self::refresh); there is no
/// ambient cache. `refresh` rebuilds the builtin table and re-reads the user
/// table file, replacing the previous contents wholesale.
#[derive(Clone, Debug)]
pub struct SyntaxRegistry {
    table: HashMap<String, CommentSyntax>,
    user_table: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct SyntaxTableFile {
    #[serde(default)]
    languages: HashMap<String, SyntaxEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SyntaxEntry {
    line: String,
    block_start: Option<String>,
    block_end: Option<String>,
}

impl SyntaxRegistry {
    /// Registry with the builtin language table only.
    pub fn builtin() -> Self {
        Self {
            table: builtin_table(),
            user_table: None,
        }
    }

    /// Registry with the builtin table plus entries merged from a TOML file:
    ///
    /// ```toml
    /// [languages.mylang]
    /// line = "#"
    /// block-start = "#["
    /// block-end = "]#"
    /// ```
    pub fn with_user_table(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let mut registry = Self {
            table: HashMap::new(),
            user_table: Some(path.into()),
        };
        registry.refresh()?;
        Ok(registry)
    }

    /// Rebuild the table from its sources.
    pub fn refresh(&mut self) -> anyhow::Result<()> {
        let mut table = builtin_table();
        if let Some(path) = &self.user_table {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read syntax table: {}", path.display()))?;
            let file: SyntaxTableFile = toml::from_str(&content)
                .with_context(|| format!("Failed to parse syntax table: {}", path.display()))?;
            for (id, entry) in file.languages {
                let syntax = match (entry.block_start, entry.block_end) {
                    (Some(start), Some(end)) => CommentSyntax::with_block(entry.line, start, end),
                    (None, None) => CommentSyntax::line_only(entry.line),
                    _ => bail!("language {id}: block-start and block-end must be set together"),
                };
                table.insert(id, syntax);
            }
        }
        self.table = table;
        Ok(())
    }

    pub fn insert(&mut self, id: impl Into<String>, syntax: CommentSyntax) {
        self.table.insert(id.into(), syntax);
    }

    pub fn lookup(&self, language: &str) -> Result<&CommentSyntax> {
        self.table
            .get(language)
            .ok_or_else(|| Error::UnknownLanguage(language.to_string()))
    }
}

fn builtin_table() -> HashMap<String, CommentSyntax> {
    let mut table = HashMap::new();
    let c_style = CommentSyntax::with_block("//", "/*", "*/");
    for id in [
        "rust",
        "c",
        "cpp",
        "csharp",
        "java",
        "javascript",
        "typescript",
        "go",
        "swift",
        "kotlin",
        "scala",
    ] {
        table.insert(id.to_string(), c_style.clone());
    }
    for id in [
        "python",
        "shellscript",
        "ruby",
        "perl",
        "r",
        "yaml",
        "toml",
        "makefile",
        "elixir",
    ] {
        table.insert(id.to_string(), CommentSyntax::line_only("#"));
    }
    table.insert("lua".to_string(), CommentSyntax::with_block("--", "--[[", "]]"));
    table.insert("sql".to_string(), CommentSyntax::with_block("--", "/*", "*/"));
    table.insert("haskell".to_string(), CommentSyntax::with_block("--", "{-", "-}"));
    table
}

/// Language id for a file extension, when one of the builtin languages
/// claims it.
pub fn language_for_extension(extension: &str) -> Option<&'static str> {
    Some(match extension {
        "rs" => "rust",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "java" => "java",
        "js" | "mjs" => "javascript",
        "ts" => "typescript",
        "go" => "go",
        "swift" => "swift",
        "kt" => "kotlin",
        "scala" => "scala",
        "py" => "python",
        "sh" | "bash" => "shellscript",
        "rb" => "ruby",
        "pl" => "perl",
        "r" => "r",
        "yml" | "yaml" => "yaml",
        "toml" => "toml",
        "ex" | "exs" => "elixir",
        "lua" => "lua",
        "sql" => "sql",
        "hs" => "haskell",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_lookup_builtin() {
        let registry = SyntaxRegistry::builtin();
        let rust = registry.lookup("rust").unwrap();
        assert_eq!(rust.line, "//");
        assert_eq!(
            rust.block,
            Some(BlockSyntax {
                start: "/*".to_string(),
                end: "*/".to_string()
            })
        );
        let python = registry.lookup("python").unwrap();
        assert_eq!(python.line, "#");
        assert_eq!(python.block, None);
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = SyntaxRegistry::builtin();
        let err = registry.lookup("klingon").unwrap_err();
        assert_eq!(err, Error::UnknownLanguage("klingon".to_string()));
    }

    #[test]
    fn test_insert_overrides() {
        let mut registry = SyntaxRegistry::builtin();
        registry.insert("rust", CommentSyntax::line_only(";"));
        assert_eq!(registry.lookup("rust").unwrap().line, ";");
    }

    #[test]
    fn test_user_table_merge() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "[languages.pascal]\nline = \"//\"\nblock-start = \"(*\"\nblock-end = \"*)\"\n\n[languages.python]\nline = \";\"\n"
        )?;

        let registry = SyntaxRegistry::with_user_table(file.path())?;
        assert_eq!(registry.lookup("pascal")?.block.as_ref().unwrap().start, "(*");
        // User entries shadow builtins.
        assert_eq!(registry.lookup("python")?.line, ";");
        // Untouched builtins survive the merge.
        assert_eq!(registry.lookup("rust")?.line, "//");
        Ok(())
    }

    #[test]
    fn test_user_table_rejects_half_block() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[languages.odd]\nline = \"//\"\nblock-start = \"(*\"\n")?;
        assert!(SyntaxRegistry::with_user_table(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_refresh_rereads_sources() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[languages.one]\nline = \"%\"\n")?;
        file.flush()?;

        let mut registry = SyntaxRegistry::with_user_table(file.path())?;
        assert!(registry.lookup("one").is_ok());

        writeln!(file, "[languages.two]\nline = \"%%\"\n")?;
        file.flush()?;
        registry.refresh()?;
        assert!(registry.lookup("two").is_ok());
        Ok(())
    }

    #[test]
    fn test_language_for_extension() {
        assert_eq!(language_for_extension("rs"), Some("rust"));
        assert_eq!(language_for_extension("py"), Some("python"));
        assert_eq!(language_for_extension("zz"), None);
    }
}
