use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use umbra_components::{
	Capabilities, Category, Component, ComponentError, ComponentManager, ComponentProfile, ComponentState, FactoryRegistry, HookResult,
	MANIFEST_FILE, handle,
};
use umbra_settings::{SETTINGS_SECTION, SettingsStore};

struct Recorder {
	name: String,
	events: Rc<RefCell<Vec<String>>>,
}

impl Component<()> for Recorder {
	fn capabilities(&self) -> Capabilities {
		Capabilities::DEFAULT
	}

	fn activate(&mut self, _: &()) -> HookResult {
		self.events.borrow_mut().push(self.name.clone());
		Ok(())
	}

	fn deactivate(&mut self) -> HookResult {
		Ok(())
	}
}

fn write_manifest(root: &Path, name: &str, rank: i64, requires: &[&str]) {
	let dir = root.join(name);
	fs::create_dir_all(&dir).unwrap();
	let requires = requires.iter().map(|req| format!("\"{req}\"")).collect::<Vec<_>>().join(", ");
	let manifest = format!(
		"name = \"{name}\"\ntitle = \"Component {name}\"\ncategory = \"default\"\nrank = {rank}\nversion = \"1.0.0\"\nrequires = [{requires}]\ninterface = \"Recorder\"\nauthor = \"Umbra\"\n"
	);
	fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
}

fn manager(root: &Path, settings: Arc<SettingsStore>, events: &Rc<RefCell<Vec<String>>>) -> ComponentManager<()> {
	let mut factories = FactoryRegistry::new();
	let events = events.clone();
	factories.register("Recorder", move |profile: &ComponentProfile| {
		Ok(handle(Recorder {
			name: profile.name.clone(),
			events: events.clone(),
		}))
	});
	let mut manager = ComponentManager::new(vec![root.to_path_buf()], settings, factories);
	manager.register_components().unwrap();
	assert!(manager.instantiate_components(|_| {}).is_empty());
	manager
}

fn abc_tree() -> tempfile::TempDir {
	let root = tempfile::tempdir().unwrap();
	write_manifest(root.path(), "A", 0, &[]);
	write_manifest(root.path(), "B", 20, &["A"]);
	write_manifest(root.path(), "C", 10, &["A"]);
	root
}

#[test]
fn discovered_components_activate_by_rank_within_level() {
	let root = abc_tree();
	let events = Rc::default();
	let mut manager = manager(root.path(), Arc::new(SettingsStore::in_memory()), &events);

	let profile = manager.profile("B").unwrap();
	assert_eq!(profile.title, "Component B");
	assert_eq!(profile.category, Category::Default);
	assert_eq!(profile.path, root.path().join("B"));

	manager.activate_components(&(), &[]).unwrap();
	assert_eq!(*events.borrow(), vec!["A", "C", "B"]);
}

#[test]
fn deactivation_survives_a_restart() {
	let root = abc_tree();
	let data = tempfile::tempdir().unwrap();
	let settings_path = data.path().join("settings").join("Default.toml");
	fs::create_dir_all(settings_path.parent().unwrap()).unwrap();

	{
		let settings = Arc::new(SettingsStore::open(&settings_path).unwrap());
		let events = Rc::default();
		let mut manager = manager(root.path(), settings.clone(), &events);
		manager.activate_components(&(), &[]).unwrap();
		manager.deactivate_component("B").unwrap();
		manager.teardown();
		settings.sync().unwrap();
	}

	let settings = Arc::new(SettingsStore::open(&settings_path).unwrap());
	assert_eq!(settings.get_key(SETTINGS_SECTION, "deactivatedComponents").to_text().as_deref(), Some("B"));

	let events = Rc::default();
	let mut manager = manager(root.path(), settings, &events);
	let report = manager.activate_components(&(), &[]).unwrap();
	assert_eq!(report.activated, vec!["A", "C"]);
	assert_eq!(*events.borrow(), vec!["A", "C"]);
	assert_eq!(manager.state("B"), Some(ComponentState::Instantiated));
}

#[test]
fn cyclic_manifests_are_rejected_at_registration() {
	let root = tempfile::tempdir().unwrap();
	write_manifest(root.path(), "x", 0, &["y"]);
	write_manifest(root.path(), "y", 0, &["x"]);

	let mut manager: ComponentManager<()> =
		ComponentManager::new(vec![root.path().to_path_buf()], Arc::new(SettingsStore::in_memory()), FactoryRegistry::new());
	assert!(matches!(manager.register_components(), Err(ComponentError::Cycle(_))));
	assert!(manager.list_components().is_empty());
}

#[test]
fn malformed_manifest_is_an_error() {
	let root = tempfile::tempdir().unwrap();
	let dir = root.path().join("broken");
	fs::create_dir_all(&dir).unwrap();
	fs::write(dir.join(MANIFEST_FILE), "name = [").unwrap();

	let mut manager: ComponentManager<()> =
		ComponentManager::new(vec![root.path().to_path_buf()], Arc::new(SettingsStore::in_memory()), FactoryRegistry::new());
	assert!(matches!(manager.register_components(), Err(ComponentError::Manifest { .. })));
}

#[test]
fn reload_rereads_the_manifest() {
	let root = abc_tree();
	let events = Rc::default();
	let mut manager = manager(root.path(), Arc::new(SettingsStore::in_memory()), &events);
	manager.activate_components(&(), &[]).unwrap();

	write_manifest(root.path(), "C", 10, &["A"]);
	let manifest = root.path().join("C").join(MANIFEST_FILE);
	let updated = fs::read_to_string(&manifest).unwrap().replace("1.0.0", "1.1.0");
	fs::write(&manifest, updated).unwrap();

	manager.reload_component("C", &()).unwrap();
	assert_eq!(manager.profile("C").unwrap().version, "1.1.0");
	assert_eq!(manager.state("C"), Some(ComponentState::Running));
}
