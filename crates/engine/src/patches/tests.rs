use std::fs;

use pretty_assertions::assert_eq;

use super::*;

const FIRST: PatchReg = PatchReg {
	name: "010_first",
	uid: "uid-first",
	apply: |dirs| fs::write(dirs.io_dir().join("first"), "done").is_ok(),
};
const BROKEN: PatchReg = PatchReg {
	name: "020_broken",
	uid: "uid-broken",
	apply: |_| false,
};

fn prepared() -> (tempfile::TempDir, AppDirs, PatchesManager) {
	let dir = tempfile::tempdir().unwrap();
	let dirs = AppDirs::new(dir.path());
	dirs.create().unwrap();
	let manager = PatchesManager::new(dirs.patches_history_file());
	(dir, dirs, manager)
}

#[test]
fn applied_patches_are_recorded_and_not_rerun() {
	let (_dir, dirs, mut manager) = prepared();
	manager.register_patch(FIRST).unwrap();

	assert!(manager.apply_patch("010_first", &dirs).unwrap());
	assert!(dirs.io_dir().join("first").is_file());
	assert_eq!(manager.history().unwrap().into_iter().collect::<Vec<_>>(), ["uid-first"]);

	fs::remove_file(dirs.io_dir().join("first")).unwrap();
	assert!(!manager.apply_patch("010_first", &dirs).unwrap());
	assert!(!dirs.io_dir().join("first").exists());
}

#[test]
fn failing_patch_is_reported_and_left_out_of_history() {
	let (_dir, dirs, mut manager) = prepared();
	manager.register_patch(BROKEN).unwrap();
	manager.register_patch(FIRST).unwrap();
	assert_eq!(manager.list_patches(), ["010_first", "020_broken"]);

	let report = manager.apply_patches(&dirs).unwrap();
	assert_eq!(report.applied, ["010_first"]);
	assert_eq!(report.failed, ["020_broken"]);
	assert!(!manager.history().unwrap().contains("uid-broken"));

	let report = manager.apply_patches(&dirs).unwrap();
	assert_eq!(report.skipped, ["010_first"]);
	assert_eq!(report.failed, ["020_broken"]);
	assert!(matches!(manager.apply_patch("020_broken", &dirs), Err(PatchError::Apply(_))));
}

#[test]
fn registration_rejects_duplicates() {
	let (_dir, _dirs, mut manager) = prepared();
	manager.register_patch(FIRST).unwrap();
	assert!(matches!(manager.register_patch(FIRST), Err(PatchError::Registered(_))));
	let twin = PatchReg { name: "030_twin", ..FIRST };
	assert!(matches!(manager.register_patch(twin), Err(PatchError::DuplicateUid { .. })));
	assert!(manager.is_patch_registered("010_first"));
	assert!(!manager.is_patch_registered("030_twin"));
	assert_eq!(manager.get_patch_from_uid("uid-first").map(|patch| patch.name), Some("010_first"));
	assert!(matches!(manager.apply_patch("030_twin", &AppDirs::new("unused")), Err(PatchError::Missing(_))));
}

#[test]
fn submitted_patches_are_collected() {
	let (_dir, dirs, mut manager) = prepared();
	assert!(manager.register_patches().unwrap() >= 1);
	assert!(manager.is_patch_registered("001_dummy"));
	let report = manager.apply_patches(&dirs).unwrap();
	assert!(report.applied.contains(&"001_dummy".to_owned()));
	assert!(fs::read_to_string(manager.history_file()).unwrap().lines().any(|line| line == "845d7ca6fca3888b0293eb982fa51ddf"));
}
