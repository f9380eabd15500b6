//! commark - extract literate comments from source files as markdown

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use commark_core::{
    compose_groups, compose_segments, find_segments, group_comments, syntax, Config, DocumentMap,
    SegmentKind, Snapshot, SyntaxRegistry,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Extract literate comments from source files as markdown
#[derive(Parser, Debug)]
#[command(name = "commark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a source file as one composed markdown document
    Render {
        /// Path to the source file
        file: PathBuf,
        /// Language id override (inferred from the extension by default)
        #[arg(long)]
        language: Option<String>,
        /// Scanning strategy
        #[arg(long, value_enum, default_value = "comments")]
        mode: Mode,
        /// Write output here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the regions a scan detects, one per line
    List {
        /// Path to the source file
        file: PathBuf,
        /// Language id override (inferred from the extension by default)
        #[arg(long)]
        language: Option<String>,
        /// Scanning strategy
        #[arg(long, value_enum, default_value = "comments")]
        mode: Mode,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Group comments found via the language's comment syntax
    Comments,
    /// Partition the file along markdown fence tokens
    Fences,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Render {
            file,
            language,
            mode,
            out,
        } => render(&config, &file, language.as_deref(), mode, out.as_deref()),
        Command::List {
            file,
            language,
            mode,
        } => list(&config, &file, language.as_deref(), mode),
    }
}

fn load_map(file: &Path) -> Result<DocumentMap> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read source file: {}", file.display()))?;
    DocumentMap::new(Snapshot::new(&text), None).context("Failed to build document map")
}

fn build_registry(config: &Config) -> Result<SyntaxRegistry> {
    match &config.syntax_table {
        Some(path) => SyntaxRegistry::with_user_table(path),
        None => Ok(SyntaxRegistry::builtin()),
    }
}

fn resolve_language(file: &Path, explicit: Option<&str>, config: &Config) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            file.extension()
                .and_then(|ext| ext.to_str())
                .and_then(syntax::language_for_extension)
                .map(str::to_string)
        })
        .unwrap_or_else(|| config.render.default_language.clone())
}

fn render(
    config: &Config,
    file: &Path,
    language: Option<&str>,
    mode: Mode,
    out: Option<&Path>,
) -> Result<()> {
    let map = load_map(file)?;
    let language = resolve_language(file, language, config);
    let base = file
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", file.display()))?
        .parent()
        .map(Path::to_path_buf);
    log::debug!("rendering {} as {language} in {mode:?} mode", file.display());

    let output = match mode {
        Mode::Comments => {
            let registry = build_registry(config)?;
            let comment_syntax = registry.lookup(&language)?;
            let groups = group_comments(&map, comment_syntax)?;
            log::debug!("found {} comment groups", groups.len());
            compose_groups(&map, &groups, &language, base.as_deref())?
        }
        Mode::Fences => {
            let tokens = config.parsing.fence_tokens();
            let segments = find_segments(&map, &tokens)?;
            log::debug!("found {} segments", segments.len());
            compose_segments(&map, &segments, &language, base.as_deref())?
        }
    };

    match out {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => print!("{output}"),
    }
    Ok(())
}

fn list(config: &Config, file: &Path, language: Option<&str>, mode: Mode) -> Result<()> {
    let map = load_map(file)?;
    match mode {
        Mode::Comments => {
            let language = resolve_language(file, language, config);
            let registry = build_registry(config)?;
            let comment_syntax = registry.lookup(&language)?;
            for (index, group) in group_comments(&map, comment_syntax)?.iter().enumerate() {
                println!(
                    "group {index}: {} span(s) at {}",
                    group.spans().len(),
                    group.range()
                );
            }
        }
        Mode::Fences => {
            let tokens = config.parsing.fence_tokens();
            for segment in find_segments(&map, &tokens)? {
                let kind = match segment.kind {
                    SegmentKind::Prose => "prose",
                    SegmentKind::Verbatim => "verbatim",
                };
                println!("{kind} at {}", segment.range);
            }
        }
    }
    Ok(())
}
