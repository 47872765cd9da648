use prefguard_lib::{ApplyOptions, RejectReason};

use super::common::Profile;

#[test]
fn first_apply_creates_target_without_backup() {
  let profile = Profile::new();
  let engine = profile.controller(5);

  let result = engine.apply("pref(\"a.b\", true);", ApplyOptions::default()).unwrap();

  assert!(result.accepted);
  assert_eq!(result.backup_generation_created, None);
  assert_eq!(profile.read_target().as_deref(), Some("pref(\"a.b\", true);"));
  assert_eq!(profile.backup_count(), 0);
}

#[test]
fn changing_a_value_keeps_the_old_one_in_generation_one() {
  let profile = Profile::new();
  profile.write_target("pref(\"a.b\", true);\n");
  let engine = profile.controller(5);

  let result = engine.apply("pref(\"a.b\", false);\n", ApplyOptions::default()).unwrap();

  assert!(result.accepted);
  assert_eq!(result.backup_generation_created, Some(1));
  assert_eq!(
    engine.backups().restore(&profile.target, 1).unwrap().as_deref(),
    Some(&b"pref(\"a.b\", true);\n"[..])
  );
}

#[test]
fn running_browser_leaves_profile_byte_identical() {
  let profile = Profile::new();
  profile.write_target("pref(\"a.b\", true);\n");
  let before = profile.files();
  profile.probe.set_running(true);

  let result = profile
    .controller(5)
    .apply("pref(\"a.b\", false);\n", ApplyOptions::default())
    .unwrap();

  assert!(!result.accepted);
  assert_eq!(result.reason, Some(RejectReason::ApplicationRunning));
  assert_eq!(result.backup_generation_created, None);
  assert_eq!(profile.files(), before);
}

#[test]
fn unbalanced_statement_is_rejected_before_backup() {
  let profile = Profile::new();
  profile.write_target("pref(\"a.b\", true);\n");
  let before = profile.files();
  let engine = profile.controller(5);

  let validation = engine.validate("pref(\"a.b\", true");
  assert!(!validation.valid);
  assert!(validation.error_detail.is_some());

  let result = engine.apply("pref(\"a.b\", true", ApplyOptions::default()).unwrap();
  assert_eq!(result.reason, Some(RejectReason::ValidationFailed));
  assert_eq!(profile.files(), before);
}

#[test]
fn denied_preference_is_rejected() {
  let profile = Profile::new();
  let result = profile
    .controller(5)
    .apply("user_pref(\"xpinstall.signatures.required\", false);\n", ApplyOptions::default())
    .unwrap();

  assert_eq!(result.reason, Some(RejectReason::ValidationFailed));
  assert!(profile.read_target().is_none());
}

#[test]
fn storage_failure_changes_neither_target_nor_history() {
  let profile = Profile::new();
  let engine = profile.controller(3);
  profile.write_target("pref(\"a.b\", 1);\n");
  engine.apply("pref(\"a.b\", 2);\n", ApplyOptions::default()).unwrap();

  // a directory squatting on a slot the next rotation needs
  std::fs::create_dir(engine.backups().path_for(&profile.target, 2).unwrap()).unwrap();
  let before = profile.files();

  let applied = engine.apply("pref(\"a.b\", 3);\n", ApplyOptions::default()).unwrap();
  assert_eq!(applied.reason, Some(RejectReason::StorageFailed));
  assert_eq!(profile.files(), before);

  let restored = engine.restore(None).unwrap();
  assert_eq!(restored.reason, Some(RejectReason::StorageFailed));
  assert_eq!(profile.files(), before);

  let reset = engine.reset().unwrap();
  assert_eq!(reset.reason, Some(RejectReason::StorageFailed));
  assert_eq!(profile.files(), before);
  assert_eq!(profile.read_target().as_deref(), Some("pref(\"a.b\", 2);\n"));
}

#[test]
fn restore_round_trips_latin1_bytes() {
  let profile = Profile::new();
  let engine = profile.controller(3);
  let original = b"// r\xe9glages\npref(\"a.b\", 1);\n".to_vec();
  std::fs::write(&profile.target, &original).unwrap();

  engine.apply("pref(\"a.b\", 2);\n", ApplyOptions::default()).unwrap();
  assert!(engine.restore(Some(1)).unwrap().accepted);

  assert_eq!(std::fs::read(&profile.target).unwrap(), original);
}
