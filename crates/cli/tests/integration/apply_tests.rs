use predicates::prelude::*;

use super::common::{TestEnv, json_stdout};

#[test]
fn apply_creates_user_js_in_default_profile() {
  let env = TestEnv::new();
  let input = env.write_file("proposed.js", "user_pref(\"gfx.webrender.all\", true);\n");

  env
    .cmd()
    .arg("apply")
    .arg(&input)
    .assert()
    .success()
    .stdout(predicate::str::contains("apply succeeded"));

  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"gfx.webrender.all\", true);\n"));
  assert!(!env.backup(1).exists());
}

#[test]
fn apply_reads_stdin() {
  let env = TestEnv::new();
  env
    .cmd()
    .args(["apply", "-"])
    .write_stdin("user_pref(\"layout.frame_rate\", 144);\n")
    .assert()
    .success();

  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"layout.frame_rate\", 144);\n"));
}

#[test]
fn apply_backs_up_previous_file() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"gfx.webrender.all\", true);\n");
  let input = env.write_file("proposed.js", "user_pref(\"gfx.webrender.all\", false);\n");

  let output = env.cmd().arg("apply").arg(&input).args(["-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json = json_stdout(&output);
  assert_eq!(json["accepted"], true);
  assert_eq!(json["backup_generation_created"], 1);
  assert_eq!(
    std::fs::read_to_string(env.backup(1)).unwrap(),
    "user_pref(\"gfx.webrender.all\", true);\n"
  );
}

#[test]
fn apply_skip_backup_leaves_no_history() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");
  let input = env.write_file("proposed.js", "user_pref(\"a.b\", 2);\n");

  env.cmd().arg("apply").arg(&input).arg("--skip-backup").assert().success();

  assert!(!env.backup(1).exists());
  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"a.b\", 2);\n"));
}

#[test]
fn invalid_file_is_rejected_with_nonzero_exit() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", true);\n");
  let input = env.write_file("broken.js", "pref(\"a.b\", true\n");

  env
    .cmd()
    .arg("apply")
    .arg(&input)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("validation-failed"))
    .stderr(predicate::str::contains("line 1:"));

  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"a.b\", true);\n"));
  assert!(!env.backup(1).exists());
}

#[test]
fn running_browser_blocks_apply() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", true);\n");
  let input = env.write_file("proposed.js", "user_pref(\"a.b\", false);\n");

  // the probe sees the prefguard process itself
  let output = env
    .cmd()
    .env("PREFGUARD_PROCESS_NAMES", "prefguard")
    .arg("apply")
    .arg(&input)
    .args(["-o", "json"])
    .output()
    .unwrap();

  assert_eq!(output.status.code(), Some(2));
  let json = json_stdout(&output);
  assert_eq!(json["accepted"], false);
  assert_eq!(json["reason"], "application-running");
  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"a.b\", true);\n"));
  assert!(!env.backup(1).exists());
}

#[test]
fn missing_installation_is_rejected() {
  let env = TestEnv::without_firefox();
  let input = env.write_file("proposed.js", "user_pref(\"a.b\", 1);\n");

  env
    .cmd()
    .arg("apply")
    .arg(&input)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("profile-unresolved"))
    .stderr(predicate::str::contains("no browser installation found"));
}

#[test]
fn backup_depth_flag_bounds_history() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 0);\n");

  for n in 1..=4 {
    let input = env.write_file("proposed.js", &format!("user_pref(\"a.b\", {n});\n"));
    env
      .cmd()
      .args(["--backup-depth", "2", "apply"])
      .arg(&input)
      .assert()
      .success();
  }

  assert!(env.backup(1).exists());
  assert!(env.backup(2).exists());
  assert!(!env.backup(3).exists());
  assert_eq!(std::fs::read_to_string(env.backup(1)).unwrap(), "user_pref(\"a.b\", 3);\n");
}

#[test]
fn diff_shows_changes_without_writing() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", true);\nuser_pref(\"c.d\", 1);\n");
  let input = env.write_file("proposed.js", "user_pref(\"a.b\", false);\nuser_pref(\"c.d\", 1);\n");

  env
    .cmd()
    .arg("diff")
    .arg(&input)
    .assert()
    .success()
    .stdout(predicate::str::contains("-user_pref(\"a.b\", true);"))
    .stdout(predicate::str::contains("+user_pref(\"a.b\", false);"));

  assert_eq!(
    env.read_target().as_deref(),
    Some("user_pref(\"a.b\", true);\nuser_pref(\"c.d\", 1);\n")
  );
}

#[test]
fn diff_json_reports_summary() {
  let env = TestEnv::new();
  let input = env.write_file("proposed.js", "user_pref(\"a.b\", 1);\nuser_pref(\"c.d\", 2);\n");

  let output = env.cmd().arg("diff").arg(&input).args(["-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json = json_stdout(&output);
  assert_eq!(json["target_exists"], false);
  assert_eq!(json["summary"]["added"], 2);
  assert_eq!(json["hunks"][0]["kind"], "added");
}

#[test]
fn validate_reports_denied_values() {
  let env = TestEnv::new();
  let input = env.write_file("proposed.js", "user_pref(\"xpinstall.signatures.required\", false);\n");

  env
    .cmd()
    .arg("validate")
    .arg(&input)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("xpinstall.signatures.required"));
}

#[test]
fn validate_works_without_installation() {
  let env = TestEnv::without_firefox();
  env
    .cmd()
    .args(["validate", "-"])
    .write_stdin("user_pref(\"gfx.webrender.all\", true);\n")
    .assert()
    .success()
    .stdout(predicate::str::contains("Valid: 1 statement(s)"));
}

#[test]
fn current_shows_template_when_absent() {
  let env = TestEnv::new();
  env
    .cmd()
    .arg("current")
    .assert()
    .success()
    .stdout(predicate::str::contains("No user.js yet"))
    .stdout(predicate::str::contains("user_pref(\"gfx.webrender.all\", true);"));
}

#[test]
fn current_json_includes_text() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");

  let output = env.cmd().args(["current", "-o", "json"]).output().unwrap();
  let json = json_stdout(&output);
  assert_eq!(json["state"], "existing");
  assert_eq!(json["text"], "user_pref(\"a.b\", 1);\n");
  assert_eq!(json["statement_count"], 1);
}

#[test]
fn profile_reports_install_default() {
  let env = TestEnv::new();
  let output = env.cmd().args(["profile", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json = json_stdout(&output);
  assert_eq!(json["source"], "install");
  assert_eq!(json["profile_relative_path"], "Profiles/t3st.default-release");
  assert_eq!(json["profile_name"], "default-release");
}
