//! Unified diff analysis
//!
//! Classifies the files touched by a diff by category and operation and
//! counts added/removed lines. The suffix lists live in a [`CategoryTable`]
//! so callers can extend them without touching the parser.

use std::fmt::Write as _;

/// Category of a changed file, derived from its path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileCategory {
    Doc,
    Code,
    Config,
    Build,
    Script,
    Test,
}

impl FileCategory {
    /// Label used in the analysis block
    pub fn label(&self) -> &'static str {
        match self {
            FileCategory::Doc => "Documentation",
            FileCategory::Code => "Code",
            FileCategory::Config => "Config",
            FileCategory::Build => "Build",
            FileCategory::Script => "Script",
            FileCategory::Test => "Test",
        }
    }

    /// Order of categories in the rendered analysis
    pub fn all() -> &'static [FileCategory] {
        &[
            FileCategory::Doc,
            FileCategory::Code,
            FileCategory::Build,
            FileCategory::Script,
            FileCategory::Config,
            FileCategory::Test,
        ]
    }
}

/// What happened to a file in the diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Added,
    Modified,
    Deleted,
}

/// Suffix lists used to categorize paths
///
/// Build names are matched against the end of the path, so both
/// `Makefile` and `src/Makefile` resolve to [`FileCategory::Build`].
#[derive(Debug, Clone)]
pub struct CategoryTable {
    pub doc: Vec<String>,
    pub code: Vec<String>,
    pub config: Vec<String>,
    pub build: Vec<String>,
    pub script: Vec<String>,
    /// Path fragments that turn a code file into a test file
    pub test_markers: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            doc: owned(&[".md", ".txt", ".rst", ".adoc"]),
            code: owned(&[
                ".go", ".js", ".ts", ".jsx", ".tsx", ".py", ".java", ".c", ".cpp", ".h", ".hpp",
                ".rs", ".kt", ".kts", ".swift", ".rb", ".cs", ".php", ".scala",
            ]),
            config: owned(&[".json", ".yaml", ".yml", ".toml", ".ini", ".config", ".env"]),
            build: owned(&[
                "Makefile",
                ".mk",
                "CMakeLists.txt",
                ".bazel",
                "Cargo.toml",
                "Cargo.lock",
                "go.mod",
                "go.sum",
                "package.json",
                "build.gradle",
                "build.gradle.kts",
                "Dockerfile",
            ]),
            script: owned(&[".sh", ".bash", ".zsh", ".fish", ".bat", ".ps1"]),
            test_markers: owned(&["_test.", ".test.", ".spec.", "tests/"]),
        }
    }
}

impl CategoryTable {
    /// Categorize a path, or `None` when no suffix matches
    ///
    /// Build names are checked before config and doc suffixes so that
    /// `Cargo.toml` and `CMakeLists.txt` count as build files.
    pub fn categorize(&self, path: &str) -> Option<FileCategory> {
        let matches = |suffixes: &[String]| suffixes.iter().any(|s| path.ends_with(s.as_str()));

        if matches(&self.build) {
            return Some(FileCategory::Build);
        }
        if matches(&self.code) {
            if self.test_markers.iter().any(|m| path.contains(m.as_str())) {
                return Some(FileCategory::Test);
            }
            return Some(FileCategory::Code);
        }
        if matches(&self.doc) {
            return Some(FileCategory::Doc);
        }
        if matches(&self.config) {
            return Some(FileCategory::Config);
        }
        if matches(&self.script) {
            return Some(FileCategory::Script);
        }
        None
    }
}

/// A single file touched by the diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub category: Option<FileCategory>,
    pub operation: FileOperation,
}

/// Result of analyzing a unified diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffAnalysis {
    /// Changed files in order of first appearance
    pub files: Vec<ChangedFile>,
    /// Lines starting with `+`, excluding `+++` headers
    pub additions: usize,
    /// Lines starting with `-`, excluding `---` headers
    pub deletions: usize,
}

impl DiffAnalysis {
    /// Number of distinct changed files
    pub fn changed(&self) -> usize {
        self.files.len()
    }

    fn count(&self, op: FileOperation) -> usize {
        self.files.iter().filter(|f| f.operation == op).count()
    }

    pub fn added(&self) -> usize {
        self.count(FileOperation::Added)
    }

    pub fn modified(&self) -> usize {
        self.count(FileOperation::Modified)
    }

    pub fn deleted(&self) -> usize {
        self.count(FileOperation::Deleted)
    }

    /// Paths in the given category
    pub fn paths_in(&self, category: FileCategory) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| f.category == Some(category))
            .map(|f| f.path.as_str())
            .collect()
    }

    /// Paths with the given operation
    pub fn paths_with(&self, op: FileOperation) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| f.operation == op)
            .map(|f| f.path.as_str())
            .collect()
    }

    /// Render the analysis block embedded in commit-suggestion prompts
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "- Total files changed: {} ({} added, {} modified, {} deleted)",
            self.changed(),
            self.added(),
            self.modified(),
            self.deleted()
        );
        let _ = writeln!(out, "- Lines: +{}, -{}", self.additions, self.deletions);
        out.push('\n');

        for category in FileCategory::all() {
            let paths = self.paths_in(*category);
            if !paths.is_empty() {
                let _ = writeln!(out, "{} files: {}", category.label(), paths.join(", "));
            }
        }

        out.push_str("\nFile operations:\n");
        for (label, op) in [
            ("Added", FileOperation::Added),
            ("Modified", FileOperation::Modified),
            ("Deleted", FileOperation::Deleted),
        ] {
            let paths = self.paths_with(op);
            if !paths.is_empty() {
                let _ = writeln!(out, "{}: {}", label, paths.join(", "));
            }
        }

        out
    }
}

/// Analyze a unified diff with the default category table
pub fn analyze_diff(diff: &str) -> DiffAnalysis {
    analyze_diff_with(diff, &CategoryTable::default())
}

/// Analyze a unified diff with a custom category table
///
/// Never fails: text without `diff --git` headers yields an empty analysis.
pub fn analyze_diff_with(diff: &str, table: &CategoryTable) -> DiffAnalysis {
    let mut analysis = DiffAnalysis::default();
    let mut current: Option<usize> = None;

    for line in diff.lines() {
        if line.starts_with("diff --git") {
            current = parse_header_path(line).map(|path| {
                match analysis.files.iter().position(|f| f.path == path) {
                    Some(idx) => idx,
                    None => {
                        analysis.files.push(ChangedFile {
                            category: table.categorize(&path),
                            path,
                            operation: FileOperation::Modified,
                        });
                        analysis.files.len() - 1
                    }
                }
            });
            continue;
        }

        let Some(idx) = current else {
            continue;
        };

        if line.starts_with("new file mode") {
            analysis.files[idx].operation = FileOperation::Added;
        } else if line.starts_with("deleted file mode") {
            analysis.files[idx].operation = FileOperation::Deleted;
        }

        if line.starts_with('+') && !line.starts_with("+++") {
            analysis.additions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            analysis.deletions += 1;
        }
    }

    analysis
}

/// Extract the path from a `diff --git a/<path> b/<path>` header
///
/// Paths may contain spaces; both halves of the header name the same file
/// unless it was renamed, in which case the old path is returned.
fn parse_header_path(line: &str) -> Option<String> {
    let rest = line.strip_prefix("diff --git ")?.trim_end();

    let path = match rest.strip_prefix("a/") {
        Some(after_a) => {
            // Identical halves: "a/X b/X" has X of length (len - 5) / 2
            let half = rest.len().checked_sub(5).map(|n| n / 2);
            match half {
                Some(n) if rest.len() == 5 + 2 * n
                    && rest.get(2..2 + n) == rest.get(5 + n..)
                    && rest.get(2 + n..5 + n) == Some(" b/") =>
                {
                    &after_a[..n]
                }
                _ => after_a.split(" b/").next().unwrap_or(after_a),
            }
        }
        None => rest.split_whitespace().next().unwrap_or(""),
    };

    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Size-bounded diffs for prompts
// ─────────────────────────────────────────────────────────────────────────────

/// One file's slice of a unified diff
struct DiffSection<'a> {
    path: String,
    text: &'a str,
    additions: usize,
    deletions: usize,
    is_binary: bool,
}

fn split_sections(diff: &str) -> Vec<DiffSection<'_>> {
    let mut starts: Vec<usize> = Vec::new();
    let mut offset = 0;
    for line in diff.split_inclusive('\n') {
        if line.starts_with("diff --git") {
            starts.push(offset);
        }
        offset += line.len();
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(diff.len());
            let text = &diff[start..end];
            let mut section = DiffSection {
                path: text
                    .lines()
                    .next()
                    .and_then(parse_header_path)
                    .unwrap_or_default(),
                text,
                additions: 0,
                deletions: 0,
                is_binary: false,
            };
            for line in text.lines() {
                if line.starts_with("Binary files") || line.contains("GIT binary patch") {
                    section.is_binary = true;
                } else if line.starts_with('+') && !line.starts_with("+++") {
                    section.additions += 1;
                } else if line.starts_with('-') && !line.starts_with("---") {
                    section.deletions += 1;
                }
            }
            section
        })
        .collect()
}

/// Bound a diff to `max_chars`, keeping whole files and summarizing the rest
pub fn smart_truncate_diff(diff: &str, max_chars: usize) -> String {
    if diff.len() <= max_chars {
        return diff.to_string();
    }

    let sections = split_sections(diff);
    if sections.is_empty() {
        return truncate_lines(diff, max_chars);
    }

    const SUMMARY_HEADER: &str = "\n--- FILES SUMMARIZED (diff too large) ---\n";
    const CHARS_PER_SUMMARY: usize = 60;

    let mut result = String::new();
    let mut summarized: Vec<&DiffSection<'_>> = Vec::new();

    for (idx, section) in sections.iter().enumerate() {
        let remaining = sections.len() - idx;
        let reserve = SUMMARY_HEADER.len() + remaining * CHARS_PER_SUMMARY;
        let available = max_chars.saturating_sub(result.len() + reserve);

        if section.text.len() <= available {
            result.push_str(section.text);
        } else {
            summarized.push(section);
        }
    }

    if !summarized.is_empty() {
        result.push_str(SUMMARY_HEADER);
        for section in summarized {
            if section.is_binary {
                let _ = writeln!(result, "{} (binary file)", section.path);
            } else {
                let _ = writeln!(
                    result,
                    "{} (+{}/-{} lines)",
                    section.path, section.additions, section.deletions
                );
            }
        }
    }

    result
}

/// Line-based truncation for text without file headers
fn truncate_lines(text: &str, max_chars: usize) -> String {
    let mut result = String::new();
    for line in text.lines() {
        if result.len() + line.len() + 1 > max_chars {
            result.push_str("... (diff truncated)");
            break;
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}
