use std::fs;

use umbra_components::{Category, ComponentProfile, activation_order};

use super::*;

#[test]
fn builtin_manifests_parse_and_order() {
	let profiles: std::collections::BTreeMap<String, ComponentProfile> = BUILTIN_MANIFESTS
		.iter()
		.map(|(name, manifest)| {
			let profile = ComponentProfile::parse(manifest, Path::new(name)).unwrap();
			assert_eq!(profile.name, *name);
			assert_eq!(profile.interface, *name);
			assert_eq!(profile.category, Category::Ui);
			(profile.name.clone(), profile)
		})
		.collect();

	let order = activation_order(&profiles).unwrap();
	assert_eq!(
		order,
		[
			"factory.preferences_manager",
			"factory.script_editor",
			"factory.components_manager_ui",
			"addons.tcp_server",
			"addons.tcp_client",
		]
	);
}

#[test]
fn every_builtin_has_a_registered_factory() {
	let factories = registered_factories();
	for (name, _) in BUILTIN_MANIFESTS {
		assert!(factories.contains(name), "{name}");
	}
}

#[test]
fn install_keeps_user_edits() {
	let dir = tempfile::tempdir().unwrap();
	assert_eq!(install_builtin_components(dir.path()).unwrap(), BUILTIN_MANIFESTS.len());

	let edited = dir.path().join("addons.tcp_client").join(MANIFEST_FILE);
	let text = fs::read_to_string(&edited).unwrap().replace("1.0.0", "1.1.0");
	fs::write(&edited, &text).unwrap();

	assert_eq!(install_builtin_components(dir.path()).unwrap(), 0);
	assert_eq!(fs::read_to_string(&edited).unwrap(), text);
}

#[test]
fn component_actions_live_under_the_component_category() {
	assert_eq!(
		component_action("factory.script_editor", "Evaluate Selection"),
		"Actions|Umbra|Components|factory.script_editor|Evaluate Selection"
	);
}

fn noop() -> Slot {
	Rc::new(|| {})
}

#[test]
fn failed_registration_rolls_back_earlier_actions() {
	let mut registry = ActionsRegistry::new();
	let taken = component_action("addons.tcp_server", "Stop TCP Server");
	let blocker = noop();
	registry.register_action(&taken, None, Some(&blocker)).unwrap();

	let mut owned = OwnedActions::default();
	let first = component_action("addons.tcp_server", "Start TCP Server");
	let entries: Vec<(String, Option<&str>, Slot)> = vec![(first.clone(), None, noop()), (taken.clone(), None, noop())];
	assert!(owned.register_all(&mut registry, entries).is_err());
	assert!(!registry.is_action_registered(&first));
	assert!(owned.paths.is_empty());

	registry.unregister_action(&taken).unwrap();
	let entries: Vec<(String, Option<&str>, Slot)> = vec![(first.clone(), None, noop()), (taken.clone(), None, noop())];
	owned.register_all(&mut registry, entries).unwrap();
	assert!(registry.is_action_registered(&first));
	assert!(registry.is_action_registered(&taken));
	owned.unregister(&mut registry);
	assert!(registry.is_empty());
}
