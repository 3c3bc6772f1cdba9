//! Bounded excerpts of source files for prompts
//!
//! Large files are cut down to a fixed line budget. Go, JavaScript/TypeScript
//! and Rust get a structural pass (imports, a couple of type declarations and
//! the shortest functions); everything else, or a structural pass that finds
//! too little, goes through a head/middle/tail sampler.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of content lines in an excerpt
pub const MAX_LINES: usize = 50;

/// A structural excerpt shorter than this falls back to sampling
const MIN_STRUCTURED_LINES: usize = 5;

const EXTRACTED_NOTE: &str = "// NOTE: Large file - showing extracted portions only";
const SAMPLED_NOTE: &str = "// NOTE: Large file - showing sample only";

static FILE_REF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{file:\s*([^}\n]*[^}\s])\s*\}").expect("Invalid file reference pattern"));

// Go
static GO_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^type\s+\w+\s+struct\s*\{").expect("Invalid Go type pattern"));
static GO_FUNC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^func\s").expect("Invalid Go func pattern"));

// JavaScript / TypeScript
static JS_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(import\s|(const|let|var)\s+.*=\s*require\()").expect("Invalid JS import pattern")
});
static JS_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(export\s+)?(default\s+)?(abstract\s+)?class\s+\w+")
        .expect("Invalid JS class pattern")
});
static JS_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(export\s+)?(default\s+)?(async\s+)?(function\*?\s|(const|let)\s+\w+\s*=\s*(async\s+)?(function|\([^)]*\)\s*(:\s*[^=]+)?=>))",
    )
    .expect("Invalid JS function pattern")
});

// Rust
static RS_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(pub(\([^)]*\))?\s+)?(struct|enum)\s+\w+").expect("Invalid Rust type pattern")
});
static RS_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(pub(\([^)]*\))?\s+)?(const\s+)?(async\s+)?(unsafe\s+)?fn\s+\w+")
        .expect("Invalid Rust fn pattern")
});

/// Language families with a structural extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    Go,
    JavaScript,
    Rust,
}

impl Language {
    fn detect(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?;
        match ext {
            "go" => Some(Language::Go),
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" => Some(Language::JavaScript),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    /// How many aggregate types to keep
    fn type_limit(&self) -> usize {
        match self {
            Language::JavaScript => 1,
            Language::Go | Language::Rust => 2,
        }
    }

    fn type_label(&self) -> &'static str {
        match self {
            Language::Go => "struct definitions",
            Language::JavaScript => "class definitions",
            Language::Rust => "type definitions",
        }
    }
}

/// Trim file content to at most [`MAX_LINES`] lines of excerpt
///
/// Content already within budget is returned unchanged.
pub fn trim_content(content: &str, path: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= MAX_LINES {
        return content.to_string();
    }

    if let Some(lang) = Language::detect(path) {
        if let Some(excerpt) = extract_structure(&lines, lang) {
            return excerpt;
        }
    }

    sample_lines(&lines)
}

// ─────────────────────────────────────────────────────────────────────────────
// Structural extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Inclusive line range of a block
#[derive(Debug, Clone, Copy)]
struct Block {
    start: usize,
    end: usize,
}

impl Block {
    fn len(&self) -> usize {
        self.end - self.start + 1
    }

    fn render<'a>(&self, lines: &[&'a str]) -> Vec<&'a str> {
        lines[self.start..=self.end].to_vec()
    }
}

fn extract_structure(lines: &[&str], lang: Language) -> Option<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut used = 0;

    if let Some(imports) = find_imports(lines, lang) {
        if imports.len() <= MAX_LINES / 4 {
            used += imports.len();
            sections.push(format!(
                "// Package imports\n{}",
                imports.render(lines).join("\n")
            ));
        }
    }

    let types = find_blocks(lines, |l| match lang {
        Language::Go => GO_TYPE.is_match(l),
        Language::JavaScript => JS_TYPE.is_match(l),
        Language::Rust => RS_TYPE.is_match(l),
    });
    let mut kept_types = Vec::new();
    for block in types.iter().take(lang.type_limit()) {
        if used + block.len() <= MAX_LINES {
            used += block.len();
            kept_types.push(block.render(lines).join("\n"));
        }
    }
    if !kept_types.is_empty() {
        let mut section = format!(
            "// Sample {}\n{}",
            lang.type_label(),
            kept_types.join("\n\n")
        );
        if types.len() > kept_types.len() {
            section.push_str(&format!(
                "\n// ... and {} more {} ...",
                types.len() - kept_types.len(),
                lang.type_label()
            ));
        }
        sections.push(section);
    }

    let mut funcs = find_blocks(lines, |l| match lang {
        Language::Go => GO_FUNC.is_match(l),
        Language::JavaScript => JS_FUNC.is_match(l),
        Language::Rust => RS_FUNC.is_match(l),
    });
    let total_funcs = funcs.len();
    funcs.sort_by_key(|b| b.len());
    let mut kept_funcs = Vec::new();
    for block in funcs {
        if kept_funcs.len() == 3 {
            break;
        }
        if used + block.len() <= MAX_LINES {
            used += block.len();
            kept_funcs.push(block);
        }
    }
    // Keep source order for the chosen functions
    kept_funcs.sort_by_key(|b| b.start);
    if !kept_funcs.is_empty() {
        let rendered: Vec<String> = kept_funcs
            .iter()
            .map(|b| b.render(lines).join("\n"))
            .collect();
        let mut section = format!("// Sample functions\n{}", rendered.join("\n\n"));
        if total_funcs > kept_funcs.len() {
            section.push_str(&format!(
                "\n// ... and {} more functions ...",
                total_funcs - kept_funcs.len()
            ));
        }
        sections.push(section);
    }

    if used < MIN_STRUCTURED_LINES {
        return None;
    }

    Some(format!("{}\n\n{}", EXTRACTED_NOTE, sections.join("\n\n")))
}

/// Locate the import block at the top of the file
fn find_imports(lines: &[&str], lang: Language) -> Option<Block> {
    match lang {
        Language::Go => {
            let start = lines.iter().position(|l| l.starts_with("import"))?;
            if lines[start].trim_end().ends_with('(') {
                let end = lines[start..]
                    .iter()
                    .position(|l| l.trim() == ")")
                    .map(|offset| start + offset)?;
                Some(Block { start, end })
            } else {
                Some(Block { start, end: start })
            }
        }
        Language::JavaScript => contiguous_run(lines, |l| JS_IMPORT.is_match(l)),
        Language::Rust => contiguous_run(lines, |l| l.starts_with("use ") || l.starts_with("pub use ")),
    }
}

/// First run of matching lines, allowing blank lines and continuation lines between them
fn contiguous_run(lines: &[&str], is_match: impl Fn(&str) -> bool) -> Option<Block> {
    let start = lines.iter().position(|l| is_match(l))?;
    let mut end = start;
    for (idx, line) in lines.iter().enumerate().skip(start + 1) {
        let trimmed = line.trim();
        if is_match(line) || (!trimmed.is_empty() && line.starts_with(char::is_whitespace)) {
            end = idx;
        } else if trimmed.is_empty() || trimmed.starts_with('}') {
            if trimmed.starts_with('}') {
                end = idx;
            }
            continue;
        } else {
            break;
        }
    }
    Some(Block { start, end })
}

/// Find brace-delimited blocks whose first line matches
fn find_blocks(lines: &[&str], is_start: impl Fn(&str) -> bool) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        if is_start(lines[idx]) {
            if let Some(end) = block_end(lines, idx) {
                blocks.push(Block { start: idx, end });
                idx = end + 1;
                continue;
            }
        }
        idx += 1;
    }
    blocks
}

/// Index of the line closing the block opened at `start`
///
/// Declarations without a body (`struct Unit;`) end on their own line.
fn block_end(lines: &[&str], start: usize) -> Option<usize> {
    let mut depth: i64 = 0;
    let mut opened = false;
    for (idx, line) in lines.iter().enumerate().skip(start) {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if opened && depth <= 0 {
            return Some(idx);
        }
        if !opened && line.trim_end().ends_with(';') {
            return Some(idx);
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// General sampler
// ─────────────────────────────────────────────────────────────────────────────

fn sample_lines(lines: &[&str]) -> String {
    let total = lines.len();
    let head = (MAX_LINES / 4).min(total);
    let middle = MAX_LINES / 2;
    let footer = MAX_LINES - head - middle;

    let mut out = vec![SAMPLED_NOTE.to_string(), "// Beginning of file:".to_string()];
    out.extend(lines[..head].iter().map(|l| l.to_string()));

    if total > head + footer + 10 {
        let mid_start = (total / 2).saturating_sub(middle / 2).max(head);
        let mid_end = (mid_start + middle).min(total.saturating_sub(footer));
        if mid_end > mid_start {
            out.push(String::new());
            out.push("// Middle portion of file:".to_string());
            out.extend(lines[mid_start..mid_end].iter().map(|l| l.to_string()));
        }
    }

    if total > head + 10 {
        out.push(String::new());
        out.push("// End of file:".to_string());
        out.extend(lines[total - footer..].iter().map(|l| l.to_string()));
    }

    out.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// File references
// ─────────────────────────────────────────────────────────────────────────────

/// Render a referenced file as a fenced Markdown block
pub fn render_file_reference(path: &str, content: &str) -> String {
    let lang = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let trimmed = trim_content(content, path);

    let header = if trimmed == content {
        format!("// File: {}", path)
    } else {
        format!("// File: {} (extracted relevant portion)", path)
    };

    format!(
        "Reference to file `{}`\n\n```{}\n{}\n\n{}\n```",
        path,
        lang,
        header,
        trimmed.trim_end()
    )
}

/// Replace every `{file:<path>}` placeholder with the referenced content
///
/// Placeholders without content are left as a plain code span.
pub fn expand_file_references(body: &str, refs: &BTreeMap<String, String>) -> String {
    FILE_REF_PATTERN
        .replace_all(body, |caps: &regex::Captures| {
            let path = &caps[1];
            match refs.get(path) {
                Some(content) => render_file_reference(path, content),
                None => format!("`{}`", path),
            }
        })
        .into_owned()
}

/// Paths referenced through `{file:<path>}` placeholders, in order
pub fn referenced_paths(body: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for caps in FILE_REF_PATTERN.captures_iter(body) {
        let path = caps[1].to_string();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (1..=n)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_short_content_unchanged() {
        let content = numbered(MAX_LINES);
        assert_eq!(trim_content(&content, "notes.txt"), content);
        assert_eq!(trim_content("fn main() {}\n", "main.rs"), "fn main() {}\n");
    }

    #[test]
    fn test_sampler_sections() {
        let content = numbered(200);
        let out = trim_content(&content, "data.csv");
        assert!(out.starts_with(SAMPLED_NOTE));
        assert!(out.contains("// Beginning of file:\nline 1\n"));
        assert!(out.contains("// Middle portion of file:"));
        assert!(out.contains("line 100"));
        assert!(out.contains("// End of file:"));
        assert!(out.ends_with("line 200"));
        assert!(!out.contains("line 60\n"));
    }

    #[test]
    fn test_sampler_stays_within_budget() {
        let content = numbered(500);
        let out = trim_content(&content, "big.log");
        let content_lines = out.lines().filter(|l| l.starts_with("line ")).count();
        assert!(content_lines <= MAX_LINES);
    }

    #[test]
    fn test_go_structure() {
        let mut src = String::from("package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\n");
        src.push_str("type Config struct {\n\tName string\n}\n\n");
        src.push_str("func short() {\n\tfmt.Println(\"hi\")\n}\n\n");
        src.push_str("func long() {\n");
        for i in 0..60 {
            src.push_str(&format!("\tos.Getenv(\"V{}\")\n", i));
        }
        src.push_str("}\n");

        let out = trim_content(&src, "main.go");
        assert!(out.starts_with(EXTRACTED_NOTE));
        assert!(out.contains("// Package imports\nimport ("));
        assert!(out.contains("// Sample struct definitions\ntype Config struct {"));
        assert!(out.contains("func short() {"));
        assert!(!out.contains("func long() {"));
        assert!(out.contains("// ... and 1 more functions ..."));
    }

    #[test]
    fn test_rust_structure() {
        let mut src = String::from("use std::fmt;\nuse std::io;\n\n");
        src.push_str("pub struct Unit;\n\npub enum Mode {\n    A,\n    B,\n}\n\n");
        src.push_str("pub fn tiny() -> u8 {\n    1\n}\n\n");
        for i in 0..10 {
            src.push_str(&format!("fn filler{}() {{\n    let _ = {};\n    let _ = 0;\n}}\n\n", i, i));
        }

        let out = trim_content(&src, "src/lib.rs");
        assert!(out.starts_with(EXTRACTED_NOTE));
        assert!(out.contains("use std::fmt;"));
        assert!(out.contains("pub struct Unit;"));
        assert!(out.contains("pub enum Mode {"));
        assert!(out.contains("pub fn tiny() -> u8 {"));
    }

    #[test]
    fn test_structured_language_without_structure_falls_back() {
        let content = numbered(120);
        let out = trim_content(&content, "script.ts");
        assert!(out.starts_with(SAMPLED_NOTE));
    }

    #[test]
    fn test_expand_file_references() {
        let mut refs = BTreeMap::new();
        refs.insert("src/a.rs".to_string(), "fn a() {}".to_string());
        let body = "See {file:src/a.rs} and {file:missing.go}.";
        let out = expand_file_references(body, &refs);
        assert!(out.contains("Reference to file `src/a.rs`"));
        assert!(out.contains("```rs\n// File: src/a.rs\n\nfn a() {}\n```"));
        assert!(out.contains("`missing.go`"));
        assert!(!out.contains("{file:"));
    }

    #[test]
    fn test_file_reference_with_spaces() {
        let mut refs = BTreeMap::new();
        refs.insert("docs/my notes.md".to_string(), "hello".to_string());
        let out = expand_file_references("See {file:docs/my notes.md}", &refs);
        assert!(out.contains("Reference to file `docs/my notes.md`"));
        assert_eq!(referenced_paths("{file: a b.go }"), vec!["a b.go"]);
    }

    #[test]
    fn test_referenced_paths() {
        let body = "{file:a.go} then {file:b.rs} then {file:a.go}";
        assert_eq!(referenced_paths(body), vec!["a.go", "b.rs"]);
    }
}
