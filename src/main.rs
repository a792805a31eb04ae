//! treewalk - walk a directory tree and print what was visited.
//!
//! Usage:
//!   treewalk [PATH]                    Preorder listing of PATH
//!   treewalk --postorder [PATH]        Directories after their contents
//!   treewalk --exclude '*.log' [PATH]  Skip matching entries (prunes directories)
//!   treewalk --limit 100 [PATH]        Stop after 100 events
//!   treewalk --help                    Show help

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use treewalk_scan::{
    CancellationToken, CanonicalNormalizer, DirectoryWalker, FileVisitDetails, PatternFilter,
    RelativePath, TraversalOrder, VisitEvent, Visitor, WalkConfig, WalkSummary, MAX_VISIT_DEPTH,
};

#[derive(Parser)]
#[command(
    name = "treewalk",
    version,
    about = "Walk a directory tree and print every entry",
    long_about = "treewalk visits every file and directory below PATH exactly once, \
                  following symbolic links and skipping link cycles.\n\n\
                  Set RUST_LOG=treewalk=debug to see what the walker is doing."
)]
struct Cli {
    /// Directory to walk (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Report directories after their contents
    #[arg(short, long)]
    postorder: bool,

    /// Only report files matching this glob (repeatable)
    #[arg(short, long)]
    include: Vec<String>,

    /// Skip entries matching this glob; directories are pruned (repeatable)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Skip entries whose name starts with a dot
    #[arg(long)]
    no_hidden: bool,

    /// Stop after this many events
    #[arg(short = 'n', long)]
    limit: Option<u64>,

    /// Maximum nesting of directories, root included
    #[arg(short = 'd', long, default_value_t = MAX_VISIT_DEPTH)]
    max_depth: usize,

    /// Relative path to prepend to every reported path
    #[arg(long)]
    prefix: Option<String>,

    /// Visit siblings in listing order instead of sorting by name
    #[arg(long)]
    unsorted: bool,

    /// Resolve symbolic links in PATH before walking
    #[arg(long)]
    canonical: bool,

    /// Show size and modification time
    #[arg(short, long)]
    long: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints each event as it arrives.
struct PrintVisitor<W: Write> {
    out: W,
    format: OutputFormat,
    long: bool,
    limit: Option<u64>,
    printed: u64,
    error: Option<std::io::Error>,
}

impl<W: Write> PrintVisitor<W> {
    fn new(out: W, format: OutputFormat, long: bool, limit: Option<u64>) -> Self {
        Self {
            out,
            format,
            long,
            limit,
            printed: 0,
            error: None,
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.printed >= limit)
    }

    fn print(&mut self, details: &FileVisitDetails, event: VisitEvent) {
        if self.error.is_some() {
            return;
        }
        if self.limit_reached() {
            details.stop_visiting();
            return;
        }
        if let Err(err) = self.write_event(details, &event) {
            // Most likely a closed pipe; nothing more can be printed.
            self.error = Some(err);
            details.stop_visiting();
            return;
        }

        self.printed += 1;
        if self.limit_reached() {
            details.stop_visiting();
        }
    }

    fn write_event(
        &mut self,
        details: &FileVisitDetails,
        event: &VisitEvent,
    ) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
                writeln!(self.out, "{line}")
            }
            OutputFormat::Text => {
                let marker = match event {
                    VisitEvent::Dir(_) => 'd',
                    VisitEvent::File(_) => 'f',
                };
                if self.long {
                    let modified = details
                        .file()
                        .modified_at()
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    writeln!(
                        self.out,
                        "{marker} {:>12} {modified} {}",
                        details.size(),
                        event.path()
                    )
                } else {
                    writeln!(self.out, "{marker} {}", event.path())
                }
            }
        }
    }
}

impl<W: Write> Visitor for PrintVisitor<W> {
    fn visit_dir(&mut self, details: &FileVisitDetails) {
        self.print(details, VisitEvent::Dir(details.path_string().into()));
    }

    fn visit_file(&mut self, details: &FileVisitDetails) {
        self.print(details, VisitEvent::File(details.path_string().into()));
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();

    let config = WalkConfig::builder()
        .root(cli.path.clone())
        .order(if cli.postorder {
            TraversalOrder::Postorder
        } else {
            TraversalOrder::Preorder
        })
        .max_depth(cli.max_depth)
        .sort_entries(!cli.unsorted)
        .root_prefix(
            cli.prefix
                .as_deref()
                .map(|p| RelativePath::parse(false, p))
                .unwrap_or_default(),
        )
        .build()
        .context("Invalid options")?;

    let filter = PatternFilter::new(cli.include.as_slice(), cli.exclude.as_slice())
        .context("Invalid pattern")?
        .include_hidden(!cli.no_hidden);

    let stdout = std::io::stdout();
    let mut visitor = PrintVisitor::new(stdout.lock(), cli.format, cli.long, cli.limit);

    let token = walk_token(cli.limit);
    let walker = DirectoryWalker::new(config);
    let summary = if cli.canonical {
        walker
            .with_normalizer(CanonicalNormalizer)
            .walk(&mut visitor, &filter, &token)
    } else {
        walker.walk(&mut visitor, &filter, &token)
    }
    .with_context(|| format!("Failed to walk {}", cli.path.display()))?;

    visitor.out.flush().ok();
    tracing::debug!(target: "treewalk", printed = visitor.printed, "output complete");
    if let Some(err) = visitor.error {
        if err.kind() != std::io::ErrorKind::BrokenPipe {
            return Err(err).context("Failed to write output");
        }
        return Ok(());
    }

    if matches!(cli.format, OutputFormat::Text) {
        print_summary(&summary);
    }

    Ok(())
}

/// A token that is already cancelled when nothing may be printed.
fn walk_token(limit: Option<u64>) -> CancellationToken {
    let token = CancellationToken::new();
    if limit == Some(0) {
        token.cancel();
    }
    token
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &WalkSummary) {
    eprintln!();
    eprintln!(
        "{} directories, {} files",
        summary.dirs_visited, summary.files_visited
    );
    if summary.entries_filtered > 0 {
        eprintln!("{} entries filtered", summary.entries_filtered);
    }
    if summary.links_skipped > 0 {
        eprintln!("{} unresolvable links skipped", summary.links_skipped);
    }
    if summary.cancelled {
        eprintln!("stopped early");
    }
    eprintln!("Walked in {:.2}s", summary.elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use treewalk_scan::AllowAll;

    /// `root/{a/(f1.txt), b.txt}`
    fn create_small_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::write(temp.path().join("a/f1.txt"), "f1").unwrap();
        fs::write(temp.path().join("b.txt"), "b").unwrap();
        temp
    }

    fn print_tree(root: &std::path::Path, limit: Option<u64>) -> (String, WalkSummary) {
        let mut visitor = PrintVisitor::new(Vec::new(), OutputFormat::Text, false, limit);
        let summary = DirectoryWalker::new(WalkConfig::new(root))
            .walk(&mut visitor, &AllowAll, &walk_token(limit))
            .unwrap();
        (String::from_utf8(visitor.out).unwrap(), summary)
    }

    #[test]
    fn test_no_limit_prints_everything() {
        let temp = create_small_tree();
        let (output, summary) = print_tree(temp.path(), None);
        assert_eq!(output, "d a\nf a/f1.txt\nf b.txt\n");
        assert!(!summary.cancelled);
    }

    #[test]
    fn test_limit_stops_after_n_events() {
        let temp = create_small_tree();
        let (output, summary) = print_tree(temp.path(), Some(2));
        assert_eq!(output, "d a\nf a/f1.txt\n");
        assert!(summary.cancelled);
    }

    #[test]
    fn test_zero_limit_prints_nothing() {
        let temp = create_small_tree();
        let (output, summary) = print_tree(temp.path(), Some(0));
        assert!(output.is_empty());
        assert!(summary.cancelled);
        assert_eq!(summary.total_visited(), 0);
    }

    #[test]
    fn test_json_lines() {
        let temp = create_small_tree();
        let mut visitor = PrintVisitor::new(Vec::new(), OutputFormat::Json, false, Some(1));
        DirectoryWalker::new(WalkConfig::new(temp.path()))
            .walk(&mut visitor, &AllowAll, &walk_token(Some(1)))
            .unwrap();
        let output = String::from_utf8(visitor.out).unwrap();
        assert_eq!(output.trim_end(), r#"{"kind":"dir","path":"a"}"#);
    }
}
