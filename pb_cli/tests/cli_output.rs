use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

const PROFILE: &str = "\
#RuneLite configuration
rsprofile.rsprofile.H1.type=STANDARD
rsprofile.rsprofile.H1.displayName=PlayerA
personalbest.rsprofile.H1.araxxor=123.4
personalbest.rsprofile.H1.zulrah=72.0
rsprofile.rsprofile.G2.type=GRID_MASTER
rsprofile.rsprofile.G2.displayName=PlayerA
personalbest.rsprofile.G2.nex=180
";

fn norm_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("pbsync_cli_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn read_grid(path: &Path) -> Vec<Vec<String>> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn parse_prints_named_accounts_as_json() {
    let exe = env!("CARGO_BIN_EXE_pbsync");
    let dir = scratch_dir("parse");
    let input = dir.join("$rsprofile--1.properties");
    fs::write(&input, PROFILE).unwrap();

    let out = Command::new(exe)
        .args(["parse", input.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 2);
    assert_eq!(v[0]["rsn"], "PlayerA");
    assert_eq!(v[0]["boss_data"][0]["boss"], "araxxor");
    assert_eq!(v[0]["boss_data"][0]["fastest"], 123);
    assert_eq!(v[0]["boss_data"][1]["boss"], "zulrah");
    assert_eq!(v[0]["boss_data"][1]["fastest"], 72);
}

#[test]
fn parse_with_mode_writes_keyed_map() {
    let exe = env!("CARGO_BIN_EXE_pbsync");
    let dir = scratch_dir("parse_mode");
    let input = dir.join("$rsprofile--1.properties");
    let output = dir.join("out.json");
    fs::write(&input, PROFILE).unwrap();

    let out = Command::new(exe)
        .args([
            "parse",
            input.to_str().unwrap(),
            "--mode",
            "GRID_MASTER",
            "-o",
            output.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(v["PlayerA"][0]["boss"], "nex");
    assert_eq!(v["PlayerA"][0]["fastest"], 180);
}

#[test]
fn parse_missing_input_is_reported() {
    let exe = env!("CARGO_BIN_EXE_pbsync");
    let dir = scratch_dir("parse_missing");
    let missing = dir.join("nope.properties");

    let out = Command::new(exe)
        .args(["parse", missing.to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&out.stderr));
    assert!(stderr.contains("Error: parse failed: "));
    assert!(stderr.contains("Caused by:"));
    assert!(stderr.contains("E2001: failed to read profile:"));
}

#[test]
fn parse_warns_when_profile_has_no_personal_bests() {
    let exe = env!("CARGO_BIN_EXE_pbsync");
    let dir = scratch_dir("parse_empty");
    let input = dir.join("$rsprofile--1.properties");
    fs::write(&input, "rsprofile.rsprofile.H1.displayName=PlayerA\n").unwrap();

    let out = Command::new(exe)
        .args(["parse", input.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(out.status.success());
    assert_eq!(norm_newlines(&String::from_utf8_lossy(&out.stdout)).trim(), "[]");
    let stderr = norm_newlines(&String::from_utf8_lossy(&out.stderr));
    assert!(stderr.contains("no boss personal bests found"));
}

#[test]
fn sync_creates_sheet_and_is_idempotent() {
    let exe = env!("CARGO_BIN_EXE_pbsync");
    let dir = scratch_dir("sync");
    let input = dir.join("$rsprofile--1.properties");
    let store = dir.join("sheet.json");
    fs::write(&input, PROFILE).unwrap();

    let args = [
        "sync",
        input.to_str().unwrap(),
        "--sender",
        "alice#1",
        "--store",
        store.to_str().unwrap(),
    ];

    let first = Command::new(exe).args(args).output().unwrap();
    assert!(first.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&first.stdout));
    assert!(stdout.contains("PlayerA: improved 2 boss time(s)"));
    assert!(stdout.contains("PlayerA: improved 1 boss time(s)"));
    assert!(stdout.contains("2 account(s) updated, 0 failed, 3 boss time(s) improved"));

    let grid = read_grid(&store);
    assert_eq!(grid[0], vec!["Discord Name", "RSN", "araxxor", "zulrah", "nex"]);
    assert_eq!(grid[1], vec!["alice#1", "PlayerA", "123", "72", "180"]);

    let second = Command::new(exe).args(args).output().unwrap();
    assert!(second.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&second.stdout));
    assert!(stdout.contains("0 boss time(s) improved"));
    assert_eq!(read_grid(&store).len(), grid.len());
}

#[test]
fn sync_single_falls_back_to_sender_name() {
    let exe = env!("CARGO_BIN_EXE_pbsync");
    let dir = scratch_dir("sync_single");
    let input = dir.join("$rsprofile--1.properties");
    let store = dir.join("sheet.json");
    fs::write(
        &input,
        "rsprofile.rsprofile.H1.type=STANDARD\npersonalbest.rsprofile.H1.vorkath=95.5\n",
    )
    .unwrap();

    let out = Command::new(exe)
        .args([
            "sync",
            input.to_str().unwrap(),
            "--sender",
            "alice",
            "--store",
            store.to_str().unwrap(),
            "--single",
            "--verbose",
        ])
        .output()
        .unwrap();

    assert!(out.status.success());
    let grid = read_grid(&store);
    assert_eq!(grid[1], vec!["alice", "alice", "96"]);
    let stderr = norm_newlines(&String::from_utf8_lossy(&out.stderr));
    assert!(stderr.contains("sheet \"BestTimes\" saved to"));
}

#[test]
fn sync_without_personal_bests_is_nothing_to_do() {
    let exe = env!("CARGO_BIN_EXE_pbsync");
    let dir = scratch_dir("sync_empty");
    let input = dir.join("$rsprofile--1.properties");
    let store = dir.join("sheet.json");
    fs::write(&input, "rsprofile.rsprofile.H1.displayName=PlayerA\n").unwrap();

    let out = Command::new(exe)
        .args([
            "sync",
            input.to_str().unwrap(),
            "--sender",
            "alice",
            "--store",
            store.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("No boss personal bests found"));
    assert!(!store.exists());
}

#[test]
fn sync_reports_column_limit_as_failure() {
    let exe = env!("CARGO_BIN_EXE_pbsync");
    let dir = scratch_dir("sync_limit");
    let input = dir.join("$rsprofile--1.properties");
    let store = dir.join("sheet.json");
    let layout = dir.join("layout.json");
    fs::write(&input, PROFILE).unwrap();
    fs::write(&layout, r#"{"last_column":"C"}"#).unwrap();

    let out = Command::new(exe)
        .args([
            "sync",
            input.to_str().unwrap(),
            "--sender",
            "alice",
            "--store",
            store.to_str().unwrap(),
            "--layout",
            layout.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let stdout = norm_newlines(&String::from_utf8_lossy(&out.stdout));
    assert!(stdout.contains("PlayerA: failed: table needs 4 columns"));
    let stderr = norm_newlines(&String::from_utf8_lossy(&out.stderr));
    assert!(stderr.contains("account(s) were not fully synced"));
}

#[test]
fn help_mentions_subcommands() {
    let exe = env!("CARGO_BIN_EXE_pbsync");

    let output = Command::new(exe).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("parse"));
    assert!(stdout.contains("sync"));
}
