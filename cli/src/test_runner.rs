use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use codespan_reporting::term::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use serde::Deserialize;
use tracing::warn;

use screenplay::Analysis;
use screenplay::parser::Notice;

pub const FIXTURE_SUFFIX: &str = ".test.fountain";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedNotice {
    /// Notice kind as displayed, e.g. `orphaned-metadata`.
    pub kind: String,

    /// If set, the notice must point at this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedPanel {
    pub title: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub act: Option<String>,
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub sequence: Option<String>,
    /// Number of blocks in the panel's own stream.
    #[serde(default)]
    pub blocks: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Block types of the preview stream, in order. Entries may carry a
    /// style tag as `type.class`.
    #[serde(default)]
    pub expect_blocks: Option<Vec<String>>,

    /// Speaking characters in first-seen order.
    #[serde(default)]
    pub expect_characters: Option<Vec<String>>,

    /// Dialogue line count per character.
    #[serde(default)]
    pub expect_counts: Option<BTreeMap<String, usize>>,

    /// Storyboard panels, in order. Only the keys given are compared.
    #[serde(default)]
    pub expect_panels: Option<Vec<ExpectedPanel>>,

    /// Title page `Title` field, or `""` when no title page is expected.
    #[serde(default)]
    pub expect_title: Option<String>,

    /// Notices from both views. If present (even empty), count and kinds are checked.
    #[serde(default)]
    pub expect_notices: Option<Vec<ExpectedNotice>>,
}

/// Split a fixture into its TOML frontmatter and the screenplay source.
fn split_fixture(content: &str) -> Result<(&str, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let body = content
        .strip_prefix("---")
        .and_then(strip_newline)
        .ok_or("fixture must open with a `---` line")?;
    let end = body
        .find("\n---")
        .ok_or("frontmatter is never closed by `---`")?;
    let rest = &body[end + 4..];
    Ok((
        body[..end].trim_end_matches('\r'),
        strip_newline(rest).unwrap_or(rest),
    ))
}

fn strip_newline(text: &str) -> Option<&str> {
    text.strip_prefix("\r\n").or_else(|| text.strip_prefix('\n'))
}

/// Name shown for a fixture: its description, else the file stem.
fn fixture_name(path: &Path, config: Option<&TestConfig>) -> String {
    if let Some(description) = config.and_then(|c| c.description.as_deref()) {
        return description.to_string();
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.strip_suffix(FIXTURE_SUFFIX).unwrap_or(name))
        .unwrap_or("?")
        .to_string()
}

/// Load, parse and check one fixture file.
fn run_fixture(path: &Path) -> (String, Result<(), String>) {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return (fixture_name(path, None), Err(format!("cannot read file: {e}"))),
    };
    let parsed = split_fixture(&content).and_then(|(frontmatter, source)| {
        toml::from_str::<TestConfig>(frontmatter)
            .map(|config| (config, source))
            .map_err(|e| format!("invalid frontmatter: {e}"))
    });
    let (config, source) = match parsed {
        Ok(pair) => pair,
        Err(reason) => return (fixture_name(path, None), Err(reason)),
    };

    let analysis = screenplay::analyze(source);
    let outcome = match check_fixture(&config, source, &analysis) {
        Some(reason) => Err(reason),
        None => Ok(()),
    };
    (fixture_name(path, Some(&config)), outcome)
}

/// Compare an analysis against the fixture's expectations. Returns
/// `Some(reason)` on the first mismatch.
fn check_fixture(config: &TestConfig, source: &str, analysis: &Analysis) -> Option<String> {
    if screenplay::analyze(source) != *analysis {
        return Some("parsing the same source twice gave different results".into());
    }

    let screenplay = &analysis.screenplay;

    if let Some(expected) = &config.expect_blocks {
        let actual: Vec<String> = screenplay
            .blocks
            .iter()
            .zip(expected.iter().map(|e| e.contains('.')).chain(std::iter::repeat(false)))
            .map(|(block, with_class)| match (&block.class_name, with_class) {
                (Some(class_name), true) => format!("{}.{}", block.kind, class_name),
                _ => block.kind.to_string(),
            })
            .collect();
        if actual != *expected {
            return Some(format!(
                "block mismatch\n  expected: [{}]\n  actual:   [{}]",
                expected.join(", "),
                actual.join(", ")
            ));
        }
    }

    if let Some(expected) = &config.expect_characters {
        let actual = screenplay.characters.names();
        if actual != expected.as_slice() {
            return Some(format!(
                "character mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            ));
        }
    }

    if let Some(expected) = &config.expect_counts {
        let actual = screenplay.characters.counts();
        if actual != expected {
            return Some(format!(
                "line count mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            ));
        }
    }

    if let Some(expected) = &config.expect_title {
        let actual = screenplay
            .title_page
            .as_ref()
            .and_then(|page| page.get("title"))
            .map(|value| value.lines().join(" "))
            .unwrap_or_default();
        if actual != *expected {
            return Some(format!(
                "title mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            ));
        }
    }

    if let Some(expected) = &config.expect_panels {
        if let Some(reason) = check_panels(analysis, expected) {
            return Some(reason);
        }
    }

    if let Some(expected) = &config.expect_notices {
        let notices: Vec<&Notice> = screenplay
            .notices
            .iter()
            .chain(analysis.storyboard.notices.iter())
            .collect();
        if let Some(reason) = check_notices(&notices, expected) {
            return Some(reason);
        }
    }

    None
}

fn check_panels(analysis: &Analysis, expected: &[ExpectedPanel]) -> Option<String> {
    let panels = &analysis.storyboard.panels;
    if panels.len() != expected.len() {
        let titles: Vec<&str> = panels.iter().map(|p| p.title.as_str()).collect();
        return Some(format!(
            "expected {} panel(s), got {}: {:?}",
            expected.len(),
            panels.len(),
            titles
        ));
    }

    for (i, (actual, expected)) in panels.iter().zip(expected).enumerate() {
        if actual.title != expected.title {
            return Some(format!(
                "panel[{}]: expected title {:?}, got {:?}",
                i, expected.title, actual.title
            ));
        }
        let fields = [
            ("duration", expected.duration.map(|d| d.to_string()), actual.duration.map(|d| d.to_string())),
            ("image", expected.image.clone(), actual.image_url.clone()),
            ("audio", expected.audio.clone(), actual.audio_url.clone()),
            ("act", expected.act.clone(), actual.nesting.act.clone()),
            ("scene", expected.scene.clone(), actual.nesting.scene.clone()),
            ("sequence", expected.sequence.clone(), actual.nesting.sequence.clone()),
            ("blocks", expected.blocks.map(|n| n.to_string()), Some(actual.blocks.len().to_string())),
        ];
        for (name, want, got) in fields {
            if want.is_some() && want != got {
                return Some(format!(
                    "panel[{}] {:?}: expected {} {:?}, got {:?}",
                    i, actual.title, name, want, got
                ));
            }
        }
    }
    None
}

fn check_notices(actual: &[&Notice], expected: &[ExpectedNotice]) -> Option<String> {
    if actual.len() != expected.len() {
        let actual_msgs: Vec<String> = actual
            .iter()
            .map(|n| format!("  - [{}] line {}: {}", n.kind, n.line + 1, n.message))
            .collect();
        return Some(format!(
            "expected {} notice(s), got {}\n  actual notices:\n{}",
            expected.len(),
            actual.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected.iter()).enumerate() {
        let kind = actual.kind.to_string();
        if kind != expected.kind {
            return Some(format!(
                "notice[{}]: expected kind \"{}\", got: {}",
                i, expected.kind, kind
            ));
        }

        if let Some(expected_line) = expected.line {
            if actual.line + 1 != expected_line {
                return Some(format!(
                    "notice[{}]: expected on line {}, but it is on line {}",
                    i,
                    expected_line,
                    actual.line + 1
                ));
            }
        }
    }

    None
}

/// Fixture files under one path, grouped by the folder they sit in relative
/// to that path. Files at the top level are in the `""` category.
struct Suite {
    categories: BTreeMap<String, Vec<PathBuf>>,
}

impl Suite {
    fn load(path: &Path) -> Suite {
        let mut suite = Suite {
            categories: BTreeMap::new(),
        };
        if path.is_file() {
            suite.categories.insert(String::new(), vec![path.to_path_buf()]);
        } else {
            suite.walk(path, path);
            suite.categories.values_mut().for_each(|files| files.sort());
        }
        suite
    }

    fn walk(&mut self, root: &Path, dir: &Path) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                self.walk(root, &path);
                continue;
            }
            let is_fixture = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(FIXTURE_SUFFIX));
            if !is_fixture {
                continue;
            }
            let category = dir
                .strip_prefix(root)
                .map(|rel| {
                    rel.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_default();
            self.categories.entry(category).or_default().push(path);
        }
    }

    /// Keep only the requested categories and their subcategories. An empty
    /// request keeps everything.
    fn only(self, requested: &[String]) -> Suite {
        if requested.is_empty() {
            return self;
        }
        let wanted: Vec<&str> = requested.iter().map(|r| r.trim_matches('/')).collect();
        for name in &wanted {
            if !self.categories.keys().any(|cat| in_category(cat, name)) {
                warn!(category = %name, available = %self.names().join(", "), "unknown fixture category");
            }
        }
        let categories = self
            .categories
            .into_iter()
            .filter(|(cat, _)| wanted.iter().any(|name| in_category(cat, name)))
            .collect();
        Suite { categories }
    }

    fn names(&self) -> Vec<&str> {
        self.categories.keys().map(|cat| display_category(cat)).collect()
    }
}

fn in_category(category: &str, name: &str) -> bool {
    category == name
        || category
            .strip_prefix(name)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn display_category(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// Print the categories found under `path`.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let suite = Suite::load(path);
    if suite.categories.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &suite.categories {
        eprintln!("  {} ({} tests)", display_category(category), files.len());
    }
}

/// Streams PASS/FAIL lines to stderr and keeps the failure details for the
/// summary.
struct Report {
    out: StandardStream,
    passed: usize,
    failures: Vec<(PathBuf, String)>,
}

impl Report {
    fn new(color: ColorChoice) -> Report {
        Report {
            out: StandardStream::stderr(color),
            passed: 0,
            failures: Vec::new(),
        }
    }

    fn paint(&mut self, text: &str, spec: &ColorSpec) -> io::Result<()> {
        self.out.set_color(spec)?;
        write!(self.out, "{text}")?;
        self.out.reset()
    }

    fn category(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out)?;
        self.paint(display_category(name), ColorSpec::new().set_bold(true))?;
        writeln!(self.out)
    }

    fn record(&mut self, path: &Path, name: &str, outcome: Result<(), String>) -> io::Result<()> {
        write!(self.out, "  ")?;
        match outcome {
            Ok(()) => {
                self.passed += 1;
                self.paint("PASS", &green())?;
            }
            Err(reason) => {
                self.failures.push((path.to_path_buf(), reason));
                self.paint("FAIL", &red())?;
            }
        }
        writeln!(self.out, "  {name}")
    }

    /// Print failure details and the summary line; returns the exit code.
    fn finish(mut self) -> io::Result<i32> {
        if !self.failures.is_empty() {
            writeln!(self.out, "\nfailures:")?;
            for (path, reason) in &self.failures {
                writeln!(self.out, "\n  {}:", path.display())?;
                for line in reason.lines() {
                    writeln!(self.out, "    {line}")?;
                }
            }
        }

        let failed = self.failures.len();
        write!(self.out, "\ntest result: ")?;
        if failed == 0 {
            self.paint("ok", &green())?;
            writeln!(self.out, ". {} passed, 0 failed", self.passed)?;
            Ok(0)
        } else {
            self.paint("FAILED", &red())?;
            writeln!(
                self.out,
                ". {} passed, {} failed (of {})",
                self.passed,
                failed,
                self.passed + failed
            )?;
            Ok(1)
        }
    }
}

fn green() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Green));
    spec
}

fn red() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red));
    spec
}

/// Run every fixture under `path` (or the single fixture `path`), limited to
/// `categories` when any are given. Exit code 1 when anything fails.
pub fn run_tests(path: &Path, color: ColorChoice, categories: &[String]) -> io::Result<i32> {
    let suite = Suite::load(path);
    if suite.categories.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return Ok(1);
    }
    let suite = suite.only(categories);
    if suite.categories.is_empty() {
        eprintln!("no matching categories found");
        return Ok(1);
    }

    let mut report = Report::new(color);
    for (category, files) in &suite.categories {
        if !path.is_file() {
            report.category(category)?;
        }
        for file in files {
            let (name, outcome) = run_fixture(file);
            report.record(file, &name, outcome)?;
        }
    }
    report.finish()
}
