use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use serde_json::Value;

const TODO: &str = "\
pick 1111111 Add model
fixup 2222222 Tidy model
pick 3333333 Add host

# Rebase 0000000..3333333 onto 0000000 (3 commands)
";

struct Fixture {
    dir: tempfile::TempDir,
    todo: PathBuf,
    config: PathBuf,
}

fn fixture(todo_text: &str) -> Result<Fixture> {
    let dir = tempfile::tempdir().context("create tempdir")?;
    let todo = dir.path().join("git-rebase-todo");
    fs::write(&todo, todo_text)?;
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"lookup_authors": false}"#)?;
    Ok(Fixture { dir, todo, config })
}

fn replan(config: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_replan"));
    cmd.arg("--config").arg(config).args(args);
    cmd.env_remove("REPLAN_LOG");
    cmd
}

fn run_replan(config: &Path, args: &[&str]) -> Result<String> {
    let out = replan(config, args)
        .output()
        .with_context(|| format!("run replan {:?}", args))?;
    if !out.status.success() {
        anyhow::bail!(
            "replan {:?} failed (status {:?})\nstdout:\n{}\nstderr:\n{}",
            args,
            out.status,
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
}

#[test]
fn help_lists_subcommands() -> Result<()> {
    let f = fixture(TODO)?;
    let help = run_replan(&f.config, &["--help"])?;
    assert!(help.contains("Usage: replan"));
    assert!(help.contains("edit"));
    assert!(help.contains("serve"));
    assert!(help.contains("show"));
    Ok(())
}

#[test]
fn show_prints_display_order_with_flags() -> Result<()> {
    let f = fixture(TODO)?;
    let todo = f.todo.to_string_lossy().to_string();

    let text = run_replan(&f.config, &["show", &todo])?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "pick    3333333 Add host",
            "fixup   2222222 Tidy model  [squashing]",
            "pick    1111111 Add model  [oldest,target]",
            "onto    0000000",
        ]
    );

    let asc = run_replan(&f.config, &["show", &todo, "--ascending"])?;
    assert!(asc.starts_with("onto    0000000"));

    let json: Value = serde_json::from_str(&run_replan(&f.config, &["show", &todo, "--json"])?)?;
    assert_eq!(json["ascending"], false);
    let rows = json["rows"].as_array().context("rows array")?;
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1]["action"], "fixup");
    assert_eq!(rows[1]["isSquashing"], true);
    assert_eq!(rows[3]["isBase"], true);
    Ok(())
}

#[test]
fn unopenable_log_file_is_reported_on_stderr() -> Result<()> {
    let f = fixture(TODO)?;
    let todo = f.todo.to_string_lossy().to_string();
    let blocker = f.dir.path().join("blocker");
    fs::write(&blocker, "")?;
    let log = blocker.join("replan.log");

    let out = replan(&f.config, &["--log-file", &log.to_string_lossy(), "show", &todo])
        .output()
        .context("run replan show")?;
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("cannot open log file"), "stderr: {}", stderr);
    assert!(String::from_utf8_lossy(&out.stdout).contains("3333333 Add host"));
    Ok(())
}

#[test]
fn show_reports_read_only_plans() -> Result<()> {
    let f = fixture("label onto\npick 1111111 A\nmerge -C 2222222 topic\n")?;
    let todo = f.todo.to_string_lossy().to_string();
    let json: Value = serde_json::from_str(&run_replan(&f.config, &["show", &todo, "--json"])?)?;
    assert!(json["readOnly"].is_string());
    Ok(())
}

#[test]
fn serve_speaks_json_lines_and_writes_the_todo() -> Result<()> {
    let f = fixture(TODO)?;
    let todo = f.todo.to_string_lossy().to_string();

    let mut child = replan(&f.config, &["serve", &todo])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn replan serve")?;

    let input = [
        r#"{"kind":"request","id":1,"request":{"type":"Bootstrap"}}"#,
        "not json",
        r#"{"kind":"command","command":{"type":"MoveEntry","id":"3333333","to":0}}"#,
        r#"{"kind":"command","command":{"type":"ChangeEntry","id":"1111111","action":"drop"}}"#,
        r#"{"kind":"request","id":2,"request":{"type":"Command","command":{"type":"Start"}}}"#,
    ];
    {
        let mut stdin = child.stdin.take().context("stdin")?;
        for line in input {
            writeln!(stdin, "{}", line)?;
        }
    }
    let out = child.wait_with_output().context("wait for serve")?;
    assert!(out.status.success());

    let messages: Vec<Value> = String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;

    assert_eq!(messages[0]["kind"], "response");
    assert_eq!(messages[0]["id"], 1);
    assert_eq!(messages[0]["response"]["type"], "State");

    let last = messages.last().context("no output")?;
    assert_eq!(last["id"], 2);
    assert_eq!(last["response"]["status"], "started");

    let pushes = messages
        .iter()
        .filter(|m| m["notification"]["type"] == "DidChange")
        .count();
    assert_eq!(pushes, 3);

    assert_eq!(
        fs::read_to_string(&f.todo)?,
        "pick 3333333 Add host\ndrop 1111111 Add model\nfixup 2222222 Tidy model\n"
    );
    drop(f.dir);
    Ok(())
}
