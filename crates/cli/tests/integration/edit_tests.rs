use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn set_rewrites_value_in_place() {
  let env = TestEnv::new();
  env.write_target("// tuned\nuser_pref(\"layout.frame_rate\", 60);\nuser_pref(\"gfx.webrender.all\", true);\n");

  env.cmd().args(["set", "layout.frame_rate", "144"]).assert().success();

  assert_eq!(
    env.read_target().as_deref(),
    Some("// tuned\nuser_pref(\"layout.frame_rate\", 144);\nuser_pref(\"gfx.webrender.all\", true);\n")
  );
  assert!(env.backup(1).exists());
}

#[test]
fn set_appends_new_key() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");

  env
    .cmd()
    .args(["set", "general.useragent.locale", "\"en-US\""])
    .assert()
    .success();

  assert_eq!(
    env.read_target().as_deref(),
    Some("user_pref(\"a.b\", 1);\nuser_pref(\"general.useragent.locale\", \"en-US\");\n")
  );
}

#[test]
fn set_rejects_bad_literal() {
  let env = TestEnv::new();
  env
    .cmd()
    .args(["set", "a.b", "maybe"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid value"));
  assert!(env.read_target().is_none());
}

#[test]
fn set_denied_value_is_rejected() {
  let env = TestEnv::new();
  env
    .cmd()
    .args(["set", "xpinstall.signatures.required", "false"])
    .assert()
    .code(2);
  assert!(env.read_target().is_none());
}

#[test]
fn unset_removes_key() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\nuser_pref(\"c.d\", 2);\n");

  env.cmd().args(["unset", "a.b"]).assert().success();

  assert_eq!(env.read_target().as_deref(), Some("user_pref(\"c.d\", 2);\n"));
}

#[test]
fn unset_missing_key_changes_nothing() {
  let env = TestEnv::new();
  env.write_target("user_pref(\"a.b\", 1);\n");

  env
    .cmd()
    .args(["unset", "x.y"])
    .assert()
    .success()
    .stdout(predicate::str::contains("is not set"));

  assert!(!env.backup(1).exists());
}

#[test]
fn set_keeps_crlf_line_endings() {
  let env = TestEnv::new();
  env.write_target("// tuned\r\nuser_pref(\"a.b\", 1);\r\nuser_pref(\"c.d\", 2);\r\n");

  env.cmd().args(["set", "a.b", "5"]).assert().success();

  assert_eq!(
    env.read_target().as_deref(),
    Some("// tuned\r\nuser_pref(\"a.b\", 5);\r\nuser_pref(\"c.d\", 2);\r\n")
  );
}

#[test]
fn set_refuses_non_utf8_user_js() {
  let env = TestEnv::new();
  let original = b"// caf\xe9\nuser_pref(\"a.b\", 1);\n".to_vec();
  std::fs::write(&env.target, &original).unwrap();

  env
    .cmd()
    .args(["set", "a.b", "2"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("storage-failed"))
    .stderr(predicate::str::contains("UTF-8"));

  assert_eq!(std::fs::read(&env.target).unwrap(), original);
  assert!(!env.backup(1).exists());
}
