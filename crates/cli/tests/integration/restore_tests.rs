use predicates::prelude::*;

use super::common::{TestEnv, json_stdout};

fn apply(env: &TestEnv, content: &str) {
  let input = env.write_file("proposed.js", content);
  env.cmd().arg("apply").arg(&input).assert().success();
}

#[test]
fn restore_requires_force_when_not_interactive() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");
  apply(&env, "user_pref(\"a.b\", 2);\n");

  env
    .cmd()
    .arg("restore")
    .assert()
    .failure()
    .stderr(predicate::str::contains("--force"));

  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"a.b\", 2);\n"));
}

#[test]
fn restore_brings_back_newest_backup() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");
  apply(&env, "user_pref(\"a.b\", 2);\n");

  env
    .cmd()
    .args(["restore", "--force"])
    .assert()
    .success()
    .stdout(predicate::str::contains("restore succeeded"));

  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"a.b\", 1);\n"));
  // the replaced content is kept so the restore can be undone
  assert_eq!(
    std::fs::read_to_string(env.backup(1)).unwrap(),
    "user_pref(\"a.b\", 2);\n"
  );
}

#[test]
fn restore_specific_generation() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");
  apply(&env, "user_pref(\"a.b\", 2);\n");
  apply(&env, "user_pref(\"a.b\", 3);\n");

  env.cmd().args(["restore", "2", "--force"]).assert().success();
  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"a.b\", 1);\n"));
}

#[test]
fn restore_missing_generation_is_rejected() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");

  let output = env.cmd().args(["restore", "3", "--force", "-o", "json"]).output().unwrap();
  assert_eq!(output.status.code(), Some(2));
  assert_eq!(json_stdout(&output)["reason"], "backup-not-found");
  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"a.b\", 1);\n"));
}

#[test]
fn reset_removes_user_js_and_keeps_backup() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");

  env.cmd().args(["reset", "--force"]).assert().success();

  assert!(env.read_target().is_none());
  assert_eq!(std::fs::read_to_string(env.backup(1)).unwrap(), "user_pref(\"a.b\", 1);\n");
}

#[test]
fn reset_is_blocked_while_browser_runs() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");

  env
    .cmd()
    .env("PREFGUARD_PROCESS_NAMES", "prefguard")
    .args(["reset", "--force"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("application-running"));

  assert!(env.read_target().is_some());
}

#[test]
fn recovery_lists_generations_and_actions() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");
  apply(&env, "user_pref(\"a.b\", 2);\n");
  apply(&env, "user_pref(\"a.b\", 3);\n");

  env
    .cmd()
    .arg("recovery")
    .assert()
    .success()
    .stdout(predicate::str::contains("prefguard restore 2"))
    .stdout(predicate::str::contains("prefguard reset --force"));

  let output = env.cmd().args(["recovery", "-o", "json"]).output().unwrap();
  let json = json_stdout(&output);
  assert_eq!(json["has_backups"], true);
  assert_eq!(json["generations"].as_array().unwrap().len(), 2);
  assert_eq!(json["actions"][0]["action"], "restore-latest");
}

#[test]
fn restore_keeps_bytes_that_are_not_utf8() {
  let env = TestEnv::new();
  let original = b"// r\xe9glages\nuser_pref(\"a.b\", 1);\n".to_vec();
  std::fs::write(&env.target, &original).unwrap();
  apply(&env, "user_pref(\"a.b\", 2);\n");

  env.cmd().args(["restore", "--force"]).assert().success();

  assert_eq!(std::fs::read(&env.target).unwrap(), original);
}
