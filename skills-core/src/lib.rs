use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod path_resolver;
pub use path_resolver::skills_root;

/// Marker file whose presence defines a skill directory.
pub const SKILL_FILE: &str = "SKILL.md";

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SkillEntry {
    pub name: String,
    pub path: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct SkillList {
    pub skills: Vec<SkillEntry>,
    pub root: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct SkillContent {
    pub name: String,
    pub path: String,
    pub content: String,
}

/// Outcome of a by-name lookup. Not-found is a normal value, not an error;
/// I/O failures (unreadable or non-UTF-8 sentinel file) stay on the
/// `io::Error` path so callers can report them distinctly.
#[derive(Debug)]
pub enum SkillLookup {
    Found(SkillContent),
    NotFound {
        name: String,
        root: PathBuf,
        checked: PathBuf,
    },
}

#[derive(Serialize, Debug, Clone)]
pub struct SearchHit {
    pub name: String,
    pub path: String,
    pub snippet: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

// ============ Discovery ============

/// All skill directories under `root`: the parent of every file named
/// exactly `SKILL.md`, sorted ascending by full path string so listings are
/// reproducible regardless of filesystem iteration order. A missing root
/// yields an empty list, never an error.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == SKILL_FILE)
        .filter_map(|e| e.path().parent().map(Path::to_path_buf))
        .collect();
    dirs.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    dirs
}

/// A skill's name is the last segment of its directory.
pub fn skill_name(dir: &Path) -> String {
    dir.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Path of the sentinel file inside `dir`. No I/O.
pub fn skill_file(dir: &Path) -> PathBuf {
    dir.join(SKILL_FILE)
}

// ============ Query operations ============

pub fn list_skills(root: &Path) -> SkillList {
    let cwd = std::env::current_dir().ok();
    let skills = discover(root)
        .into_iter()
        .map(|d| {
            // show paths relative to the working directory when possible
            let shown = cwd
                .as_deref()
                .and_then(|c| d.strip_prefix(c).ok())
                .unwrap_or(&d);
            SkillEntry {
                name: skill_name(&d),
                path: shown.to_string_lossy().into_owned(),
            }
        })
        .collect();
    SkillList {
        skills,
        root: root.to_string_lossy().into_owned(),
    }
}

pub fn get_skill(root: &Path, name: &str) -> io::Result<SkillLookup> {
    // Fast path: the directory sits right under the root.
    let mut target = root.join(name);
    let mut file = skill_file(&target);

    if !file.exists() {
        // Fall back to a full scan for a nested directory with the same name.
        for d in discover(root) {
            if skill_name(&d) == name {
                target = d;
                file = skill_file(&target);
                break;
            }
        }
    }

    if !file.exists() {
        return Ok(SkillLookup::NotFound {
            name: name.to_string(),
            root: root.to_path_buf(),
            checked: file,
        });
    }

    let content = fs::read_to_string(&file)?;
    Ok(SkillLookup::Found(SkillContent {
        name: name.to_string(),
        path: target.to_string_lossy().into_owned(),
        content,
    }))
}

pub fn search_skills(root: &Path, query: &str, limit: usize) -> io::Result<SearchResults> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Ok(SearchResults {
            results: Vec::new(),
            root: None,
        });
    }

    let mut results = Vec::new();
    for d in discover(root) {
        let text = fs::read_to_string(skill_file(&d))?;
        if let Some(snippet) = snippet_around(&text, &q) {
            results.push(SearchHit {
                name: skill_name(&d),
                path: d.to_string_lossy().into_owned(),
                snippet,
            });
            if results.len() >= limit {
                break;
            }
        }
    }
    Ok(SearchResults {
        results,
        root: Some(root.to_string_lossy().into_owned()),
    })
}

/// First case-insensitive occurrence of `needle` (already lowercased) in
/// `text`: 80 chars of context before the match start through 200 chars
/// after it, clamped to the text, newlines flattened to spaces.
fn snippet_around(text: &str, needle: &str) -> Option<String> {
    // Lowercasing can change byte length, so record where each original char
    // lands in the lowered string and map the match back to a char index.
    let mut lowered = String::with_capacity(text.len());
    let mut starts: Vec<usize> = Vec::new();
    for ch in text.chars() {
        starts.push(lowered.len());
        for lc in ch.to_lowercase() {
            lowered.push(lc);
        }
    }
    let hit = lowered.find(needle)?;
    let at = starts.partition_point(|&b| b <= hit) - 1;

    let begin = at.saturating_sub(80);
    let end = (at + 200).min(starts.len());
    let snippet: String = text.chars().skip(begin).take(end - begin).collect();
    Some(snippet.replace('\n', " "))
}
