use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use skills_core::{
    get_skill, list_skills, search_skills, skills_root, SkillLookup, DEFAULT_SEARCH_LIMIT,
};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(
    name = "skills-cli",
    about = "Inspect SKILL.md documents under the skills root",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List skills discovered under the skills root
    List,
    /// Print the SKILL.md content of one skill
    Get {
        /// Skill directory name
        name: String,
    },
    /// Full-text search across SKILL.md files
    Search {
        /// Query string
        query: String,
        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

struct CommandOutput {
    text: String,
    code: i32,
}

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

fn run_command(command: Commands, root: &Path) -> Result<CommandOutput> {
    Ok(match command {
        Commands::List => CommandOutput {
            text: pretty(&list_skills(root))?,
            code: 0,
        },
        Commands::Get { name } => match get_skill(root, &name)? {
            SkillLookup::Found(skill) => CommandOutput {
                text: skill.content,
                code: 0,
            },
            SkillLookup::NotFound { name, root, checked } => CommandOutput {
                text: format!(
                    "skill '{}' not found under {} (expected {})\n",
                    name,
                    root.display(),
                    checked.display()
                ),
                code: 1,
            },
        },
        Commands::Search { query, limit } => CommandOutput {
            text: pretty(&search_skills(root, &query, limit)?)?,
            code: 0,
        },
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let out = run_command(cli.command, &skills_root())?;
    if out.code == 0 {
        print!("{}", out.text);
    } else {
        eprint!("{}", out.text);
        std::process::exit(out.code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn add_skill(root: &Path, rel: &str, content: &str) -> PathBuf {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("SKILL.md"), content).unwrap();
        dir
    }

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        add_skill(tmp.path(), "a", "Alpha text");
        add_skill(tmp.path(), "b", "Beta mentions keyword here");
        tmp
    }

    // The CLI renders exactly what the server serves for the same tree.
    #[test]
    fn list_matches_core_results() {
        let tmp = tree();
        let out = run_command(Commands::List, tmp.path()).unwrap();
        assert_eq!(out.code, 0);
        assert_eq!(out.text, pretty(&list_skills(tmp.path())).unwrap());
        let parsed: serde_json::Value = serde_json::from_str(&out.text).unwrap();
        assert_eq!(parsed["skills"][0]["name"], "a");
        assert_eq!(parsed["skills"][1]["name"], "b");
    }

    #[test]
    fn get_prints_raw_content() {
        let tmp = tree();
        let out = run_command(
            Commands::Get {
                name: "b".to_string(),
            },
            tmp.path(),
        )
        .unwrap();
        assert_eq!(out.code, 0);
        assert_eq!(out.text, "Beta mentions keyword here");
    }

    #[test]
    fn get_missing_skill_exits_nonzero() {
        let tmp = tree();
        let out = run_command(
            Commands::Get {
                name: "missing".to_string(),
            },
            tmp.path(),
        )
        .unwrap();
        assert_eq!(out.code, 1);
        assert!(out.text.contains("'missing' not found"));
    }

    #[test]
    fn search_matches_core_results() {
        let tmp = tree();
        let out = run_command(
            Commands::Search {
                query: "KEYWORD".to_string(),
                limit: 10,
            },
            tmp.path(),
        )
        .unwrap();
        assert_eq!(out.code, 0);
        assert_eq!(
            out.text,
            pretty(&search_skills(tmp.path(), "KEYWORD", 10).unwrap()).unwrap()
        );
        let parsed: serde_json::Value = serde_json::from_str(&out.text).unwrap();
        assert_eq!(parsed["results"][0]["name"], "b");
        assert!(parsed["results"][0]["snippet"]
            .as_str()
            .unwrap()
            .contains("keyword"));
    }
}
