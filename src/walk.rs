use crate::errors::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Supported language for file discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Java,
    Python,
    Go,
    Rust,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Java, Language::Python, Language::Go, Language::Rust];
}

impl Language {
    /// File extensions for this language.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::Java => &["java"],
            Language::Python => &["py"],
            Language::Go => &["go"],
            Language::Rust => &["rs"],
        }
    }

    /// Default exclude patterns for this language.
    pub fn default_excludes(&self) -> Vec<String> {
        match self {
            Language::Go => vec!["*_test.go".to_string()],
            Language::Java | Language::Python | Language::Rust => vec![],
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "java" => Ok(Language::Java),
            "python" | "py" => Ok(Language::Python),
            "go" => Ok(Language::Go),
            "rust" | "rs" => Ok(Language::Rust),
            _ => Err(format!("unsupported language: {s}")),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Java => write!(f, "java"),
            Language::Python => write!(f, "python"),
            Language::Go => write!(f, "go"),
            Language::Rust => write!(f, "rust"),
        }
    }
}

/// Path filter for one analysis: the language's extensions plus the
/// include/exclude globs. Globs are matched against the path relative to the
/// analysis root, and excludes also against the bare file name.
#[derive(Debug)]
pub struct FileFilter {
    extensions: &'static [&'static str],
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl FileFilter {
    /// Language default excludes (e.g. `*_test.go`) are added unless
    /// `include_tests` is set.
    pub fn new(
        lang: Language,
        include_patterns: &[String],
        exclude_patterns: &[String],
        include_tests: bool,
    ) -> Result<Self> {
        let mut excludes = exclude_patterns.to_vec();
        if !include_tests {
            excludes.extend(lang.default_excludes());
        }

        let include = if include_patterns.is_empty() {
            None
        } else {
            Some(glob_set(include_patterns)?)
        };

        Ok(Self {
            extensions: lang.extensions(),
            include,
            exclude: glob_set(&excludes)?,
        })
    }

    pub fn accepts(&self, relative: &Path) -> bool {
        let ext_match = relative
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext));
        if !ext_match || self.exclude.is_match(relative) {
            return false;
        }
        if let Some(fname) = relative.file_name() {
            if self.exclude.is_match(Path::new(fname)) {
                return false;
            }
        }
        self.include
            .as_ref()
            .map_or(true, |include| include.is_match(relative))
    }
}

fn glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Source files under `root` accepted by a [`FileFilter`] for `lang`.
/// `.gitignore` is honoured and the result is sorted.
pub fn discover_files(
    root: &Path,
    lang: Language,
    include_patterns: &[String],
    exclude_patterns: &[String],
    include_tests: bool,
) -> Result<Vec<PathBuf>> {
    let filter = FileFilter::new(lang, include_patterns, exclude_patterns, include_tests)?;

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if filter.accepts(relative) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Auto-detect language by counting file extensions. Ties go to the
/// language listed first in [`Language::ALL`].
pub fn detect_language(root: &Path) -> Option<Language> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build();

    let mut counts = [0usize; Language::ALL.len()];

    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if let Some(idx) = Language::ALL
            .iter()
            .position(|lang| lang.extensions().contains(&ext))
        {
            counts[idx] += 1;
        }
    }

    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return None;
    }
    counts
        .iter()
        .position(|&c| c == max)
        .map(|idx| Language::ALL[idx])
}
