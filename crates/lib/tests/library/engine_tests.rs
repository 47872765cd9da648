use prefguard_lib::{ApplyOptions, CurrentConfig, RejectReason};

use super::common::Profile;

fn version(n: usize) -> String {
  format!("user_pref(\"browser.sessionstore.interval\", {});\n", 15000 + n)
}

#[test]
fn history_is_bounded_by_depth() {
  let profile = Profile::new();
  let engine = profile.controller(3);

  for n in 0..6 {
    let result = engine.apply(&version(n), ApplyOptions::default()).unwrap();
    assert!(result.accepted, "{:?}", result.detail);
  }

  let generations = engine.backups().list(&profile.target).unwrap();
  assert_eq!(generations.iter().map(|g| g.index).collect::<Vec<_>>(), vec![1, 2, 3]);
  assert_eq!(engine.backups().restore(&profile.target, 1).unwrap(), Some(version(4).into_bytes()));
  assert_eq!(engine.backups().restore(&profile.target, 3).unwrap(), Some(version(2).into_bytes()));
}

#[test]
fn each_accepted_apply_adds_exactly_one_generation() {
  let profile = Profile::new();
  let engine = profile.controller(5);
  profile.write_target(&version(0));

  for n in 1..=3 {
    engine.apply(&version(n), ApplyOptions::default()).unwrap();
    assert_eq!(profile.backup_count(), n);
    assert_eq!(profile.read_target(), Some(version(n)));
  }
}

#[test]
fn restore_then_diff_is_empty() {
  let profile = Profile::new();
  let engine = profile.controller(5);
  profile.write_target(&version(0));
  engine.apply(&version(1), ApplyOptions::default()).unwrap();
  engine.apply(&version(2), ApplyOptions::default()).unwrap();

  let restored = engine.restore(Some(2)).unwrap();
  assert!(restored.accepted);

  let preview = engine.diff(&version(0)).unwrap();
  assert!(preview.summary.is_empty(), "{:?}", preview.hunks);
  assert!(preview.target_exists);
}

#[test]
fn validate_has_no_side_effects() {
  let profile = Profile::new();
  profile.write_target(&version(0));
  let before = profile.files();
  let engine = profile.controller(5);

  let a = engine.validate("user_pref(\"a.b\", 1);\nbroken(\n");
  let b = engine.validate("user_pref(\"a.b\", 1);\nbroken(\n");

  assert_eq!(a, b);
  assert_eq!(profile.files(), before);
}

#[test]
fn guard_blocks_restore_and_reset() {
  let profile = Profile::new();
  let engine = profile.controller(5);
  profile.write_target(&version(0));
  engine.apply(&version(1), ApplyOptions::default()).unwrap();
  let before = profile.files();

  profile.probe.set_running(true);
  assert_eq!(engine.restore(None).unwrap().reason, Some(RejectReason::ApplicationRunning));
  assert_eq!(engine.reset().unwrap().reason, Some(RejectReason::ApplicationRunning));
  assert_eq!(profile.files(), before);
}

#[test]
fn reset_then_restore_brings_content_back() {
  let profile = Profile::new();
  let engine = profile.controller(5);
  profile.write_target(&version(7));

  assert!(engine.reset().unwrap().accepted);
  assert!(matches!(engine.current().unwrap(), CurrentConfig::NotCreated { .. }));

  let options = engine.recovery_options().unwrap();
  assert!(options.has_backups);
  assert!(!options.target_exists);

  assert!(engine.restore(None).unwrap().accepted);
  assert_eq!(profile.read_target(), Some(version(7)));
}

#[test]
fn current_reflects_disk() {
  let profile = Profile::new();
  let engine = profile.controller(5);
  profile.write_target(&version(3));

  match engine.current().unwrap() {
    CurrentConfig::Existing { path, text, .. } => {
      assert_eq!(path, profile.target);
      assert_eq!(text, version(3));
    }
    other => panic!("unexpected state: {other:?}"),
  }
}
