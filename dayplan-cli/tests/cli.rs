#[allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ─── helpers ───────────────────────────────────────────────────────

struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("create tempdir");
        let env = Self { dir };
        env.write("config.toml", "[day]\ntimezone = \"UTC\"\n");
        env
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let p = self.dir.path().join(name);
        fs::write(&p, content).expect("write fixture");
        p
    }

    fn write_json(&self, name: &str, v: &Value) -> PathBuf {
        self.write(name, &serde_json::to_string_pretty(v).unwrap())
    }

    fn cmd(&self) -> Command {
        self.cmd_with_config(&self.dir.path().join("config.toml"))
    }

    fn cmd_with_config(&self, config: &Path) -> Command {
        let mut cmd = Command::cargo_bin("dayplan").expect("binary");
        cmd.env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(config);
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).output().expect("run");
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("parse JSON failed: {e}\nstdout: {stdout}"))
    }
}

fn three_tasks() -> Value {
    json!([
        {"id": "A", "name": "Alpha", "priority": "P1", "duration_minutes": 30, "auto_schedule": true},
        {"id": "B", "name": "Bravo", "priority": "P2", "duration_minutes": 45, "auto_schedule": true},
        {"id": "C", "name": "Charlie", "priority": "P3", "duration_minutes": 20, "auto_schedule": true},
        {"id": "E", "name": "Echo", "priority": "P1", "duration_minutes": 10}
    ])
}

fn one_hour_block() -> Value {
    json!([{"start": "2026-10-17T09:00:00Z", "end": "2026-10-17T10:00:00Z", "kind": "any"}])
}

// ─── plan ──────────────────────────────────────────────────────────

#[test]
fn plan_json_packs_first_fit() {
    let env = TestEnv::new();
    let tasks = env.write_json("tasks.json", &three_tasks());
    let blocks = env.write_json("blocks.json", &one_hour_block());

    let v = env.run_json(&[
        "plan",
        "--tasks",
        tasks.to_str().unwrap(),
        "--blocks",
        blocks.to_str().unwrap(),
        "--date",
        "2026-10-17",
        "--json",
    ]);

    assert_eq!(v["day"], "2026-10-17");
    assert_eq!(v["assignments"][0]["task_id"], "A");
    assert_eq!(v["assignments"][0]["start"], "2026-10-17T09:00:00Z");
    assert_eq!(v["assignments"][1]["task_id"], "C");
    assert_eq!(v["assignments"][1]["end"], "2026-10-17T09:50:00Z");
    assert_eq!(v["unscheduled"][0]["id"], "B");
    assert_eq!(v["ineligible"][0]["task"]["id"], "E");
    assert_eq!(v["ineligible"][0]["reasons"][0], "auto-schedule disabled");
}

#[test]
fn plan_ignore_auto_flag_admits_gated_task() {
    let env = TestEnv::new();
    let tasks = env.write_json("tasks.json", &three_tasks());
    let blocks = env.write_json("blocks.json", &one_hour_block());

    let v = env.run_json(&[
        "plan",
        "--tasks",
        tasks.to_str().unwrap(),
        "--blocks",
        blocks.to_str().unwrap(),
        "--date",
        "2026-10-17",
        "--ignore-auto",
        "--json",
    ]);

    let ids: Vec<_> = v["assignments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["task_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["A", "E", "C"]);
    assert!(v["ineligible"].as_array().unwrap().is_empty());
}

#[test]
fn plan_text_uses_day_template() {
    let env = TestEnv::new();
    let tasks = env.write_json("tasks.json", &three_tasks());

    env.cmd()
        .args(["plan", "--tasks", tasks.to_str().unwrap(), "--date", "2026-10-17"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Plan for 2026-10-17"))
        .stdout(predicate::str::contains("09:00-09:30  Alpha"))
        .stdout(predicate::str::contains("Echo [E]: auto-schedule disabled"));
}

#[test]
fn plan_patches_mark_scheduled_and_note_misfits() {
    let env = TestEnv::new();
    let tasks = env.write_json("tasks.json", &three_tasks());
    let blocks = env.write_json("blocks.json", &one_hour_block());

    let v = env.run_json(&[
        "plan",
        "--tasks",
        tasks.to_str().unwrap(),
        "--blocks",
        blocks.to_str().unwrap(),
        "--date",
        "2026-10-17",
        "--patches",
    ]);

    let patches = v.as_array().unwrap();
    assert_eq!(patches.len(), 3);
    assert_eq!(patches[0]["task_id"], "A");
    assert_eq!(patches[0]["fields"]["Status"], "Scheduled");
    assert_eq!(patches[0]["fields"]["Scheduled Start"], "2026-10-17T09:00:00+00:00");
    assert_eq!(patches[2]["task_id"], "B");
    assert_eq!(patches[2]["fields"]["Notes"], "Did not fit today");
}

#[test]
fn plan_rejects_inverted_block() {
    let env = TestEnv::new();
    let tasks = env.write_json("tasks.json", &three_tasks());
    let blocks = env.write_json(
        "blocks.json",
        &json!([{"start": "2026-10-17T10:00:00Z", "end": "2026-10-17T09:00:00Z"}]),
    );

    env.cmd()
        .args([
            "plan",
            "--tasks",
            tasks.to_str().unwrap(),
            "--blocks",
            blocks.to_str().unwrap(),
            "--date",
            "2026-10-17",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("block 0 is empty or inverted"));
}

#[test]
fn plan_missing_tasks_file_fails() {
    let env = TestEnv::new();
    env.cmd()
        .args(["plan", "--tasks", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}

// ─── fill-today ────────────────────────────────────────────────────

#[test]
fn fill_today_reads_store_export_shape() {
    let env = TestEnv::new();
    let export = json!({"records": [
        {"id": "t1", "fields": {"Name": "Standup notes", "Status": "Today", "Project": "CRM Dashboard"}},
        {"id": "w1", "fields": {"Name": "Pipeline review", "Priority": "P2-High", "Project": "Stem Sales"}},
        {"id": "h1", "fields": {"Name": "Run", "Priority": "P2-High", "Project": "Health"}},
        {"id": "c1", "fields": {"Name": "Wire up sync", "Priority": "P2-High", "Project": "Command Center"}}
    ]});
    let tasks = env.write_json("export.json", &export);

    let v = env.run_json(&["fill-today", "--tasks", tasks.to_str().unwrap(), "--json"]);

    assert_eq!(v["already_today"], 1);
    assert_eq!(v["target"], 3);
    let picks = v["picks"].as_array().unwrap();
    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0]["task"]["id"], "w1");
    assert_eq!(picks[0]["rule"], "round_robin");
    assert_eq!(picks[0]["desired"], "Work");
    assert_eq!(picks[1]["task"]["id"], "h1");
}

#[test]
fn fill_today_text_prints_focus_summary() {
    let env = TestEnv::new();
    let export = json!([
        {"id": "w1", "name": "Pipeline review", "priority": "P1-Critical", "project": "Stem Sales"},
        {"id": "h1", "name": "Run", "priority": "P2-High", "project": "Health"}
    ]);
    let tasks = env.write_json("tasks.json", &export);

    env.cmd()
        .args(["fill-today", "--tasks", tasks.to_str().unwrap(), "--target", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P1 first"))
        .stdout(predicate::str::contains("Today's focus: 1 Work • 1 Personal"));
}

// ─── blocks / config ───────────────────────────────────────────────

#[test]
fn blocks_json_follows_template() {
    let env = TestEnv::new();
    let v = env.run_json(&["blocks", "--date", "2026-10-17", "--json"]);
    let blocks = v.as_array().unwrap();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[0]["start"], "2026-10-17T09:00:00Z");
    assert_eq!(blocks[0]["kind"], "deep_work");
    assert_eq!(blocks[3]["end"], "2026-10-17T17:00:00Z");
}

#[test]
fn config_init_then_show() {
    let env = TestEnv::new();
    let path = env.dir.path().join("fresh.toml");

    env.cmd_with_config(&path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    assert!(path.exists());

    env.cmd_with_config(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timezone = \"America/Chicago\""))
        .stdout(predicate::str::contains("chunk_ceiling_minutes = 90"));
}

#[test]
fn bad_config_is_reported() {
    let env = TestEnv::new();
    env.write("config.toml", "[scheduler]\nchunk_ceiling_minutes = 0\n");
    env.cmd()
        .args(["blocks", "--date", "2026-10-17"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk_ceiling_minutes"));
}
