use std::path::{Path, PathBuf};

/// Resolve the skills root folder.
/// Priority:
///   1) env SKILLS_ROOT (with `~` expansion)
///   2) repo-relative: ./skills
///
/// Always yields a path value; the directory may not exist on disk and
/// existence is checked only by the callers that read it.
pub fn skills_root() -> PathBuf {
    if let Ok(p) = std::env::var("SKILLS_ROOT") {
        let p = p.trim();
        if !p.is_empty() {
            return resolve(&expand_home(p));
        }
    }
    resolve(&cwd().join("skills"))
}

fn cwd() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn expand_home(p: &str) -> PathBuf {
    if p == "~" {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home);
        }
    } else if let Some(rest) = p.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(p)
}

// Canonicalize when the path exists; otherwise fall back to a lexical
// absolute form so downstream existence checks still have a usable value.
fn resolve(p: &Path) -> PathBuf {
    std::fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            cwd().join(p)
        }
    })
}
