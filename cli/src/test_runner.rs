use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use codegen::{ScopeResolver, Warning, persist, run_pass_with};
use vispi::{BlockTree, Loader};

const FIXTURE_SUFFIX: &str = ".test.vispi";
const DELIMITER: &str = "---";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning must concern the block with this id.
    #[serde(default)]
    pub node: Option<String>,

    /// If set, the block's id must sit on this 1-based line of the workspace body.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    #[serde(default)]
    pub description: Option<String>,

    /// Put definitions first. Defaults to true.
    #[serde(default = "default_canonicalize")]
    pub canonicalize: bool,

    /// Expected generated text (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Expected process names, in definition order.
    #[serde(default)]
    pub expect_processes: Option<Vec<String>>,

    #[serde(default)]
    pub expect_load_error: bool,

    /// When present (even empty), the warning count and each warning are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

fn default_canonicalize() -> bool {
    true
}

/// One fixture file: TOML front matter between `---` lines, then the JSON workspace.
struct Fixture {
    config: TestConfig,
    workspace: String,
}

impl Fixture {
    fn read(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {}", e))?;
        Self::parse(&content).map_err(|e| format!("frontmatter error: {}", e))
    }

    fn parse(content: &str) -> Result<Self, String> {
        let mut lines = content.trim_start_matches('\u{feff}').lines();
        if lines.next().map(str::trim_end) != Some(DELIMITER) {
            return Err(format!("missing opening {} delimiter", DELIMITER));
        }

        let mut front = String::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line.trim_end() == DELIMITER {
                closed = true;
                break;
            }
            front.push_str(line);
            front.push('\n');
        }
        if !closed {
            return Err(format!("missing closing {} delimiter", DELIMITER));
        }

        let config = toml::from_str(&front).map_err(|e| format!("TOML parse error: {}", e))?;
        let workspace = lines.collect::<Vec<_>>().join("\n");
        Ok(Fixture { config, workspace })
    }

    fn label(&self, path: &Path) -> String {
        self.config
            .description
            .clone()
            .unwrap_or_else(|| file_label(path))
    }

    /// Load, restore, run one pass and compare. `Err` carries the mismatch.
    fn check(&self) -> Result<(), String> {
        let config = &self.config;
        let loaded = Loader::new(self.workspace.clone(), 0).load();

        if config.expect_load_error {
            return match loaded {
                Err(_) => Ok(()),
                Ok(_) => Err("expected load error, but loading succeeded".into()),
            };
        }
        let tree = loaded.map_err(|errors| {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            format!("unexpected load error: {}", messages.join("; "))
        })?;

        let mut scopes = ScopeResolver::new();
        persist::restore(&self.workspace, &mut scopes)
            .map_err(|e| format!("unreadable saved state: {}", e))?;
        let generation = run_pass_with(&tree, &mut scopes, config.canonicalize);

        if let Some(expected) = &config.expect_output {
            let (expected, actual) = (expected.trim(), generation.text.trim());
            if expected != actual {
                return Err(format!(
                    "output mismatch\n  expected: {}\n  actual:   {}",
                    expected, actual
                ));
            }
        }

        if let Some(expected) = &config.expect_processes {
            let actual = scopes.process_names();
            if actual != *expected {
                return Err(format!(
                    "process mismatch\n  expected: [{}]\n  actual:   [{}]",
                    expected.join(", "),
                    actual.join(", ")
                ));
            }
        }

        match &config.expect_warnings {
            Some(expected) => self.check_warnings(&tree, &generation.warnings, expected),
            None => Ok(()),
        }
    }

    fn check_warnings(
        &self,
        tree: &BlockTree,
        warnings: &[Warning],
        expected: &[ExpectedWarning],
    ) -> Result<(), String> {
        if warnings.len() != expected.len() {
            let listed = if warnings.is_empty() {
                "    (none)".to_string()
            } else {
                warnings
                    .iter()
                    .map(|w| format!("  - {} ({})", w, w.node))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            return Err(format!(
                "expected {} warning(s), got {}\n  actual warnings:\n{}",
                expected.len(),
                warnings.len(),
                listed
            ));
        }

        for (index, (warning, expected)) in warnings.iter().zip(expected).enumerate() {
            let message = warning.to_string();
            if !message.contains(&expected.contains) {
                return Err(format!(
                    "warning[{}]: expected message containing \"{}\", got: {}",
                    index, expected.contains, message
                ));
            }

            if let Some(node) = &expected.node {
                if *node != warning.node {
                    return Err(format!(
                        "warning[{}]: expected on block '{}', but it concerns '{}'",
                        index, node, warning.node
                    ));
                }
            }

            if let Some(line) = expected.line {
                let span = tree.find(&warning.node).and_then(|n| tree.span(n));
                let Some(span) = span else {
                    return Err(format!(
                        "warning[{}]: expected on line {}, but block '{}' has no span",
                        index, line, warning.node
                    ));
                };
                let actual = line_of(&self.workspace, span.start);
                if actual != line {
                    return Err(format!(
                        "warning[{}]: expected on line {}, but block is on line {}",
                        index, line, actual
                    ));
                }
            }
        }
        Ok(())
    }
}

/// 1-based line holding the byte at `offset`.
fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "?".to_string())
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// Fixture files grouped by their folder relative to the suite root.
/// Files directly in the root belong to the "" category.
struct Suite {
    categories: BTreeMap<String, Vec<PathBuf>>,
}

impl Suite {
    fn discover(root: &Path) -> Self {
        let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for path in entries.flatten().map(|entry| entry.path()) {
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let is_fixture = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(FIXTURE_SUFFIX));
                if !is_fixture {
                    continue;
                }
                let category = dir
                    .strip_prefix(root)
                    .map(|rel| rel.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                categories.entry(category).or_default().push(path);
            }
        }
        for files in categories.values_mut() {
            files.sort();
        }
        Suite { categories }
    }

    fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Restrict to the requested categories and their subfolders. Unknown
    /// requests are reported and skipped.
    fn select(self, requested: &[String]) -> Self {
        if requested.is_empty() {
            return self;
        }
        let available: Vec<&str> = self.categories.keys().map(|k| category_label(k)).collect();
        for request in requested {
            let request = request.trim_matches('/');
            if !self.categories.keys().any(|cat| in_category(cat, request)) {
                eprintln!(
                    "warning: category '{}' not found (available: {})",
                    request,
                    available.join(", ")
                );
            }
        }
        let categories = self
            .categories
            .into_iter()
            .filter(|(cat, _)| {
                requested
                    .iter()
                    .any(|request| in_category(cat, request.trim_matches('/')))
            })
            .collect();
        Suite { categories }
    }
}

fn in_category(category: &str, request: &str) -> bool {
    category == request
        || category
            .strip_prefix(request)
            .is_some_and(|rest| rest.starts_with('/'))
}

struct Reporter {
    no_color: bool,
    passed: usize,
    failures: Vec<(PathBuf, String)>,
}

impl Reporter {
    fn new(no_color: bool) -> Self {
        Reporter {
            no_color,
            passed: 0,
            failures: Vec::new(),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn header(&self, category: &str) {
        eprintln!();
        eprintln!("{}", self.paint(category_label(category), "1"));
    }

    fn run(&mut self, path: &Path) {
        let (label, outcome) = match Fixture::read(path) {
            Ok(fixture) => (fixture.label(path), fixture.check()),
            Err(reason) => (file_label(path), Err(reason)),
        };
        match outcome {
            Ok(()) => {
                self.passed += 1;
                eprintln!("  {}  {}", self.paint("PASS", "32"), label);
            }
            Err(reason) => {
                eprintln!("  {}  {}", self.paint("FAIL", "31"), label);
                self.failures.push((path.to_path_buf(), reason));
            }
        }
    }

    /// Print failures and the summary line; returns the process exit code.
    fn finish(self) -> i32 {
        if !self.failures.is_empty() {
            eprintln!();
            eprintln!("failures:");
            for (path, reason) in &self.failures {
                eprintln!();
                eprintln!("  --- {} ---", path.display());
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }

        eprintln!();
        let failed = self.failures.len();
        if failed == 0 {
            eprintln!("test result: {}. {} passed, 0 failed", self.paint("ok", "32"), self.passed);
            0
        } else {
            eprintln!(
                "test result: {}. {} passed, {} failed (of {})",
                self.paint("FAILED", "31"),
                self.passed,
                failed,
                self.passed + failed
            );
            1
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let suite = Suite::discover(path);
    if suite.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &suite.categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

/// Run every fixture under `path`, or the single fixture `path` names,
/// optionally limited to `categories`. Returns the exit code.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let mut reporter = Reporter::new(no_color);
    if path.is_file() {
        reporter.run(path);
        return reporter.finish();
    }

    let suite = Suite::discover(path);
    if suite.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return 1;
    }
    let suite = suite.select(categories);
    if suite.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    for (category, files) in &suite.categories {
        reporter.header(category);
        for file in files {
            reporter.run(file);
        }
    }
    reporter.finish()
}
