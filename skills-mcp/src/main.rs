use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::json;
use skills_core::{
    get_skill, list_skills, search_skills, skills_root, SkillLookup, DEFAULT_SEARCH_LIMIT,
};
use std::io::{BufRead, BufReader, Write};

// ============ stdio framing ============

fn dbg_enabled() -> bool {
    std::env::var("SKILLS_MCP_DEBUG").ok().as_deref() == Some("1")
}

// stdout carries the protocol; diagnostics go to stderr only
fn dbg_log(msg: &str) {
    if dbg_enabled() {
        eprintln!("[skills-mcp] {}", msg);
    }
}

#[derive(Deserialize)]
struct Request {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    method: String,
    #[serde(default)]
    params: serde_json::Value,
}

/// Message pump: one JSON-RPC request per non-blank input line, one response
/// line per request, flushed before the next read. Per-line faults produce
/// error envelopes and the loop continues; only end-of-input stops it.
fn serve(input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        // A read fault (e.g. non-UTF-8 bytes on stdin) ends the loop: there
        // is no line to answer, and the stream position is unrecoverable.
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let resp = match serde_json::from_str::<serde_json::Value>(line) {
            Ok(msg) => match serde_json::from_value::<Request>(msg) {
                Ok(req) => handle_request(req),
                Err(e) => json!({
                    "jsonrpc": "2.0",
                    "id": null,
                    "error": {"code": -32603, "message": format!("Internal error: {}", e)}
                }),
            },
            Err(e) => json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": -32700, "message": format!("Parse error: {}", e)}
            }),
        };
        writeln!(output, "{}", serde_json::to_string(&resp)?)?;
        output.flush()?;
    }
    Ok(())
}

// ============ Dispatch ============

fn handle_request(req: Request) -> serde_json::Value {
    dbg_log(&format!("[recv] method={} id={}", req.method, req.id));
    match req.method.as_str() {
        "initialize" => handle_initialize(req.id),
        "tools/list" => handle_tools_list(req.id),
        "tools/call" => handle_call(req.id, &req.params),
        other => json!({
            "jsonrpc": "2.0",
            "id": req.id,
            "error": {"code": -32601, "message": format!("Method '{}' not found", other)}
        }),
    }
}

fn handle_initialize(id: serde_json::Value) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "protocolVersion": "2024-11-05",
            "capabilities": { "tools": {} },
            "serverInfo": { "name": "skills-mcp", "version": env!("CARGO_PKG_VERSION") }
        }
    })
}

fn tools_list() -> Vec<serde_json::Value> {
    vec![
        tool(
            "list_skills",
            "List available skills discovered under skills root",
            json!({"type":"object","properties":{},"required":[]}),
        ),
        tool(
            "get_skill",
            "Get the full SKILL.md content by skill directory name",
            json!({"type":"object","properties":{
                "name":{"type":"string","description":"The skill name to retrieve"}
            },"required":["name"]}),
        ),
        tool(
            "search_skills",
            "Simple full-text search across SKILL.md files",
            json!({"type":"object","properties":{
                "query":{"type":"string","description":"Search query"},
                "limit":{"type":"integer","description":"Maximum number of results","default":10}
            },"required":["query"]}),
        ),
    ]
}

fn tool(name: &str, description: &str, input_schema: serde_json::Value) -> serde_json::Value {
    json!({"name": name, "description": description, "inputSchema": input_schema})
}

fn handle_tools_list(id: serde_json::Value) -> serde_json::Value {
    json!({"jsonrpc":"2.0","id":id,"result":{"tools": tools_list()}})
}

fn handle_call(id: serde_json::Value, params: &serde_json::Value) -> serde_json::Value {
    let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
    let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
    let outcome = match name {
        "list_skills" => run_list(),
        "get_skill" => run_get(&args),
        "search_skills" => run_search(&args),
        _ => {
            return json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": -32601, "message": format!("Tool '{}' not found", name)}
            })
        }
    };
    match outcome {
        Ok(result) => {
            let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string());
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "content": [{"type": "text", "text": text}] }
            })
        }
        Err(e) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32603, "message": format!("Internal error: {}", e)}
        }),
    }
}

// ============ Tool handlers ============

// The root is re-resolved on every call so SKILLS_ROOT changes take effect
// without a restart.

fn run_list() -> Result<serde_json::Value> {
    Ok(serde_json::to_value(list_skills(&skills_root()))?)
}

fn run_get(args: &serde_json::Value) -> Result<serde_json::Value> {
    let name = args
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("missing required argument: name"))?;
    let root = skills_root();
    match get_skill(&root, name)? {
        SkillLookup::Found(skill) => Ok(serde_json::to_value(skill)?),
        SkillLookup::NotFound { name, root, checked } => Ok(json!({
            "error": "SKILL_NOT_FOUND",
            "name": name,
            "message": format!(
                "Skill '{}' not found under {}. Expected: {}",
                name,
                root.display(),
                checked.display()
            ),
        })),
    }
}

fn run_search(args: &serde_json::Value) -> Result<serde_json::Value> {
    let query = args
        .get("query")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("missing required argument: query"))?;
    let limit = args
        .get("limit")
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_SEARCH_LIMIT as u64) as usize;
    Ok(serde_json::to_value(search_skills(
        &skills_root(),
        query,
        limit,
    )?)?)
}

fn main() -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(BufReader::new(stdin.lock()), stdout.lock())
}
