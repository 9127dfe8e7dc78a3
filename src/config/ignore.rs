use std::path::{Path, PathBuf};

pub const IGNORE_FILE: &str = ".tallyignore";

/// Patterns loaded from the nearest `.tallyignore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreFile {
    pub path: PathBuf,
    pub patterns: Vec<String>,
}

/// Find `.tallyignore` by walking up from the given directory.
pub fn load_ignore_file(start: &Path) -> Option<IgnoreFile> {
    let mut dir = start.to_path_buf();
    loop {
        let path = dir.join(IGNORE_FILE);
        if path.is_file() {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    return Some(IgnoreFile {
                        patterns: parse_ignore_patterns(&content),
                        path,
                    })
                }
                Err(e) => tracing::warn!("could not read {}: {e}", path.display()),
            }
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Gitignore-style lines: blanks and `#` comments are skipped, and a
/// trailing `/` matches everything below the directory.
fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| match l.strip_suffix('/') {
            Some(dir) => format!("{dir}/**"),
            None => l.to_string(),
        })
        .collect()
}
