use apk_recon_android::fixtures::{sample_manifest, ApkBuilder, DexBuilder};
use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::path::PathBuf;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn apk(&self, name: &str, builder: ApkBuilder) -> PathBuf {
        let path = self.dir.path().join(name);
        builder.write_to(&path).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("apk-recon").unwrap();
        cmd.current_dir(self.dir.path()).env_remove("RUST_LOG");
        cmd
    }
}

fn animation_apk() -> ApkBuilder {
    ApkBuilder::new()
        .manifest(sample_manifest(
            "com.example.stickfigure",
            &[(".SplashActivity", false), (".EditorActivity", true), ("SettingsActivity", false)],
        ))
        .file("assets/figures/default.stk", b"stick".to_vec())
        .file("res/drawable/icon.png", vec![0x89, 0x50])
        .file(
            "classes.dex",
            DexBuilder::new()
                .string("CREATE TABLE animFrames(_id INTEGER PRIMARY KEY, idx INTEGER)")
                .string("CREATE TABLE users(id)")
                .string("onion_skin_alpha")
                .string("https://example.com")
                .class("Lcom/example/app/AnimatorUtil;")
                .class("Lcom/example/app/net/Http;")
                .build(),
        )
}

#[test]
fn missing_argument_prints_usage() {
    Workspace::new()
        .cmd()
        .assert()
        .code(2)
        .stdout("usage: apk-recon <path_to_apk>\n");
}

#[test]
fn full_report() {
    let ws = Workspace::new();
    let apk = ws.apk("app.apk", animation_apk());

    ws.cmd()
        .arg(&apk)
        .assert()
        .success()
        .stdout(contains(format!("[+] Loading APK: {}", apk.display())))
        .stdout(contains("\n[=] APK Info\nPackage: com.example.stickfigure\n"))
        .stdout(contains("Version: 2.1.0 (42)\n"))
        .stdout(contains("MinSDK: 21  TargetSDK: 34\n"))
        .stdout(contains("- com.example.stickfigure.SplashActivity\n"))
        .stdout(contains("* com.example.stickfigure.EditorActivity  [MAIN]\n"))
        .stdout(contains("- com.example.stickfigure.SettingsActivity\n"))
        .stdout(contains("package=\"com.example.stickfigure\""))
        .stdout(contains("[=] Assets dir entries\n- assets/figures/default.stk\n"))
        .stdout(contains("- Lcom/example/app/AnimatorUtil;\n"))
        .stdout(contains("Http;").not())
        .stdout(contains("- onion_skin_alpha\n"))
        .stdout(contains(
            "[=] Possible SQL schema (CREATE TABLE ...)\n\
             - CREATE TABLE animFrames(_id INTEGER PRIMARY KEY, idx INTEGER)\n",
        ))
        .stdout(contains("CREATE TABLE users").not());
}

#[test]
fn exactly_one_main_marker() {
    let ws = Workspace::new();
    let apk = ws.apk("app.apk", animation_apk());

    let output = ws.cmd().arg(&apk).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("[MAIN]").count(), 1);
}

#[test]
fn no_assets_prints_none() {
    let ws = Workspace::new();
    let apk = ws.apk(
        "bare.apk",
        ApkBuilder::new()
            .manifest(sample_manifest("com.example.bare", &[]))
            .file("res/raw/assets_readme.txt", b"not an asset".to_vec()),
    );

    ws.cmd()
        .arg(&apk)
        .assert()
        .success()
        .stdout(contains("[=] Assets dir entries\n(none)\n"))
        .stdout(contains("[=] Suspected animation-related classes\n(none)\n"));
}

#[test]
fn corrupt_manifest_still_reports() {
    let ws = Workspace::new();
    let apk = ws.apk(
        "broken.apk",
        ApkBuilder::new()
            .manifest(vec![0x03, 0x00, 0x08, 0x00, 0xff, 0xff, 0x00, 0x00])
            .file("assets/a.bin", vec![1])
            .file("classes.dex", DexBuilder::new().class("LSkeleton;").build()),
    );

    ws.cmd()
        .arg(&apk)
        .assert()
        .success()
        .stdout(contains("<manifest decode error: "))
        .stdout(contains("Package: None\n"))
        .stdout(contains("- assets/a.bin\n"))
        .stdout(contains("- LSkeleton;\n"));
}

#[test]
fn missing_manifest() {
    let ws = Workspace::new();
    let apk = ws.apk("nomanifest.apk", ApkBuilder::new().file("classes.dex", DexBuilder::new().build()));

    ws.cmd()
        .arg(&apk)
        .assert()
        .success()
        .stdout(contains("<no manifest xml>\n"));
}

#[test]
fn multidex_is_scanned() {
    let ws = Workspace::new();
    let apk = ws.apk(
        "multi.apk",
        ApkBuilder::new()
            .manifest(sample_manifest("com.example.multi", &[]))
            .file("classes.dex", DexBuilder::new().class("Lcom/example/Main;").build())
            .file(
                "classes2.dex",
                DexBuilder::new()
                    .string("keyframe_interval")
                    .class("Lcom/example/TimelineView;")
                    .build(),
            ),
    );

    ws.cmd()
        .arg(&apk)
        .assert()
        .success()
        .stdout(contains("- Lcom/example/TimelineView;\n"))
        .stdout(contains("- keyframe_interval\n"));
}

#[test]
fn json_output() {
    let ws = Workspace::new();
    let apk = ws.apk("app.apk", animation_apk());

    let output = ws.cmd().arg("--json").arg(&apk).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["package"]["package"], "com.example.stickfigure");
    assert_eq!(report["manifest"]["status"], "decoded");
    assert_eq!(report["assets"][0], "assets/figures/default.stk");
    assert_eq!(
        report["schema"][0],
        "CREATE TABLE animFrames(_id INTEGER PRIMARY KEY, idx INTEGER)"
    );
}

#[test]
fn quiet_hides_loading_line() {
    let ws = Workspace::new();
    let apk = ws.apk("app.apk", animation_apk());

    ws.cmd()
        .arg("--quiet")
        .arg(&apk)
        .assert()
        .success()
        .stdout(contains("[+] Loading APK").not())
        .stdout(contains("[=] APK Info"));
}

#[test]
fn missing_apk_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("does-not-exist.apk")
        .assert()
        .code(1)
        .stderr(contains("does-not-exist.apk"));
}

#[test]
fn non_zip_fails() {
    let ws = Workspace::new();
    let path = ws.dir.path().join("plain.apk");
    std::fs::write(&path, "definitely not a zip").unwrap();

    ws.cmd().arg(&path).assert().code(1);
}

#[test]
fn config_overrides_keywords() {
    let ws = Workspace::new();
    let apk = ws.apk("app.apk", animation_apk());
    std::fs::write(
        ws.dir.path().join(".apk-recon.toml"),
        "[scan]\nclass_hints = [\"http\"]\nstring_hints = [\"example.com\"]\n",
    )
    .unwrap();

    ws.cmd()
        .arg(&apk)
        .assert()
        .success()
        .stdout(contains("- Lcom/example/app/net/Http;\n"))
        .stdout(contains("AnimatorUtil").not())
        .stdout(contains("- https://example.com\n"))
        // schema hints keep their defaults
        .stdout(contains("- CREATE TABLE animFrames"));
}

#[test]
fn invalid_config_exits_with_config_code() {
    let ws = Workspace::new();
    let apk = ws.apk("app.apk", animation_apk());
    let config = ws.dir.path().join("bad.toml");
    std::fs::write(&config, "[scan\nclass_hints = 3").unwrap();

    ws.cmd().arg("--config").arg(&config).arg(&apk).assert().code(3);
}

#[test]
fn explicit_missing_config_exits_with_config_code() {
    let ws = Workspace::new();
    let apk = ws.apk("app.apk", animation_apk());

    ws.cmd()
        .args(["--config", "nope.toml"])
        .arg(&apk)
        .assert()
        .code(3);
}

#[test]
fn json_error_report() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--json", "gone.apk"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(contains("\"code_str\": \"E2001\""))
        .stderr(contains("\"category\": \"IO\""));
}
