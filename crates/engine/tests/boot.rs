use std::cell::{Cell, RefCell};
use std::fs;
use std::io::Write;
use std::net::TcpStream;
use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use umbra_components::{Capabilities, Component, ComponentProfile, ComponentState, HookResult, MANIFEST_FILE, handle};
use umbra_engine::{
	Engine, EngineContext, EngineError, EngineOptions, NoSplash, PATCHES_HISTORY_FILE, ScriptEditor, TcpClientComponent,
	TcpServerComponent, registered_factories,
};
use umbra_layout::HeadlessWindow;
use umbra_settings::{LAYOUTS_SECTION, SETTINGS_SECTION, SettingsStore};

const BUILTINS: [&str; 5] = [
	"factory.preferences_manager",
	"factory.script_editor",
	"factory.components_manager_ui",
	"addons.tcp_server",
	"addons.tcp_client",
];

/// Pre-writes server settings so tests never bind the well-known port.
fn seed_settings(root: &Path, autostart: bool) {
	let settings = SettingsStore::open(root.join("settings").join("Default.toml")).unwrap();
	settings.set_key("tcpServer", "port", 0_i64);
	settings.set_key("tcpServer", "address", "127.0.0.1");
	settings.set_key("tcpServer", "autostart", autostart);
	settings.sync().unwrap();
}

fn options(root: &Path) -> EngineOptions {
	EngineOptions {
		user_data_dir: Some(root.to_path_buf()),
		install_logging: false,
		..EngineOptions::default()
	}
}

fn boot(root: &Path) -> Engine {
	Engine::boot(options(root), Box::new(HeadlessWindow::new()), Box::new(NoSplash)).unwrap()
}

fn tick_until(engine: &mut Engine, done: impl Fn(&Engine) -> bool) {
	let deadline = Instant::now() + Duration::from_secs(5);
	while !done(engine) && Instant::now() < deadline {
		thread::sleep(Duration::from_millis(10));
		engine.tick(Duration::from_millis(125));
	}
}

#[test]
fn boot_prepares_tree_and_activates_builtins() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);
	let mut engine = boot(dir.path());

	for sub in ["settings", "logging", "components", "io", "patches"] {
		assert!(dir.path().join(sub).is_dir(), "{sub} missing");
	}
	let history = fs::read_to_string(dir.path().join("patches").join(PATCHES_HISTORY_FILE)).unwrap();
	assert_eq!(history.lines().collect::<Vec<_>>(), ["845d7ca6fca3888b0293eb982fa51ddf"]);
	for name in BUILTINS {
		assert!(dir.path().join("components").join(name).join(MANIFEST_FILE).is_file());
	}
	{
		let manager = engine.shared().components().unwrap();
		assert_eq!(manager.list_components(), BUILTINS);
		for name in BUILTINS {
			assert_eq!(manager.state(name), Some(ComponentState::Running), "{name}");
		}
	}
	assert_eq!(
		engine.shared().window().dock_widgets(),
		["Components_Manager_Ui", "Preferences_Manager", "Script_Editor"]
	);
	assert!(engine.shared().has_request_handler());

	engine.shutdown().unwrap();
	assert!(matches!(engine.shutdown(), Err(EngineError::ShutDown)));
	assert!(dir.path().join("settings").join("Default.toml").is_file());
}

#[test]
fn tcp_request_is_evaluated_by_the_script_editor() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), true);
	let mut engine = boot(dir.path());
	let directory = engine.shared().directory().clone();

	let address = directory
		.with::<TcpServerComponent, _>("addons.tcp_server", |server| server.local_addr())
		.flatten()
		.expect("server listening");
	let mut stream = TcpStream::connect(address).unwrap();
	stream.write_all(b"Actions|Umbra|Engine|Quit<!RE>").unwrap();
	drop(stream);

	tick_until(&mut engine, Engine::quit_requested);
	assert!(engine.quit_requested());
	let console = directory.with::<ScriptEditor, _>("factory.script_editor", |editor| editor.console()).unwrap();
	assert_eq!(console.len(), 1);
	assert_eq!(console[0].code, "Actions|Umbra|Engine|Quit");
	assert!(console[0].outcome.is_ok());

	engine.shutdown().unwrap();
	assert!(!directory.with::<TcpServerComponent, _>("addons.tcp_server", |server| server.is_online()).unwrap_or(false));
}

#[test]
fn tcp_client_reaches_the_local_server() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), true);
	let mut engine = boot(dir.path());
	let directory = engine.shared().directory().clone();

	let port = directory
		.with::<TcpServerComponent, _>("addons.tcp_server", |server| server.local_addr())
		.flatten()
		.expect("server listening")
		.port();
	let sent = directory
		.with::<TcpClientComponent, _>("addons.tcp_client", |client| {
			client.set_address("127.0.0.1");
			client.set_port(i64::from(port)).unwrap();
			client.send_code("Actions|Umbra|Engine|Quit")
		})
		.unwrap();
	assert!(sent);
	assert_eq!(engine.shared().settings().get_key("tcpClient", "port").to_int(), Some(i64::from(port)));

	let delivered = |engine: &Engine| {
		engine
			.shared()
			.notifications()
			.list_notifications()
			.iter()
			.any(|message| message.contains("Code sent"))
	};
	tick_until(&mut engine, |engine| engine.quit_requested() && delivered(engine));
	assert!(engine.quit_requested());
	assert!(delivered(&engine));
	engine.shutdown().unwrap();
}

#[test]
fn user_deactivation_survives_restart() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);

	let mut engine = boot(dir.path());
	engine.shared().components().unwrap().deactivate_component("addons.tcp_client").unwrap();
	engine.shutdown().unwrap();
	drop(engine);

	let mut engine = boot(dir.path());
	{
		let manager = engine.shared().components().unwrap();
		assert!(!manager.is_active("addons.tcp_client"));
		assert!(manager.is_active("factory.script_editor"));
		assert_eq!(manager.deactivated_components(), ["addons.tcp_client"]);
	}
	let stored = engine.shared().settings().get_key(SETTINGS_SECTION, "deactivatedComponents").to_text();
	assert_eq!(stored.as_deref(), Some("addons.tcp_client"));
	engine.shutdown().unwrap();
}

#[test]
fn startup_layout_is_restored_on_next_boot() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);

	let mut engine = boot(dir.path());
	engine.shared().window().hide_widget("Script_Editor");
	engine.shutdown().unwrap();
	drop(engine);

	let mut engine = boot(dir.path());
	assert!(engine.shared().settings().key_exists(LAYOUTS_SECTION, "startup_windowState"));
	assert!(!engine.shared().window().is_widget_visible("Script_Editor"));
	assert!(engine.shared().window().is_widget_visible("Preferences_Manager"));
	engine.shutdown().unwrap();
}

#[test]
fn layout_shortcuts_store_and_restore() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);
	let mut engine = boot(dir.path());

	assert!(engine.trigger_shortcut("Ctrl+1").unwrap());
	assert!(engine.shared().layouts().has_snapshot("one"));

	engine.shared().window().hide_widget("Script_Editor");
	assert!(engine.trigger_shortcut("1").unwrap());
	assert!(engine.shared().window().is_widget_visible("Script_Editor"));
	assert_eq!(engine.shared().layouts().current_layout(), Some("one"));
	engine.shutdown().unwrap();
}

#[test]
fn tick_drains_registered_notifications_and_layout_events() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);
	let mut engine = boot(dir.path());

	assert!(engine.trigger_shortcut("Ctrl+1").unwrap());
	engine.tick(Duration::from_millis(25));
	assert!(engine.shared().notifications().take_registered().is_empty());
	assert!(engine.shared().layouts().take_events().is_empty());
	assert!(!engine.shared().notifications().notifications().is_empty());
	engine.shutdown().unwrap();
}

#[test]
fn script_editor_follows_its_file_on_disk() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);
	let mut engine = boot(dir.path());
	let directory = engine.shared().directory().clone();
	let script = dir.path().join("io").join("script.txt");
	fs::write(&script, "Actions|Umbra|Engine|Quit").unwrap();

	directory
		.with::<ScriptEditor, _>("factory.script_editor", |editor| editor.load_file(&script))
		.unwrap()
		.unwrap();
	assert!(engine.shared().is_path_watched(&script));

	fs::write(&script, "# edited elsewhere").unwrap();
	let text = |engine: &Engine| {
		engine
			.shared()
			.directory()
			.with::<ScriptEditor, _>("factory.script_editor", |editor| editor.text())
			.unwrap_or_default()
	};
	tick_until(&mut engine, |engine| text(engine) == "# edited elsewhere");
	assert_eq!(text(&engine), "# edited elsewhere");

	fs::remove_file(&script).unwrap();
	let removed = |engine: &Engine| {
		engine
			.shared()
			.notifications()
			.notifications()
			.iter()
			.any(|notification| notification.message.contains("removed from disk"))
	};
	tick_until(&mut engine, removed);
	assert!(removed(&engine));
	assert!(!engine.shared().is_path_watched(&script));

	engine.shutdown().unwrap();
	assert!(engine.shared().watched_paths().is_empty());
}

#[test]
fn quit_shortcut_requests_shutdown() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);
	let mut engine = boot(dir.path());

	assert!(!engine.quit_requested());
	assert!(engine.trigger_shortcut("Ctrl+Q").unwrap());
	assert!(engine.quit_requested());
	assert!(engine.trigger_action("Actions|Umbra|Engine|Quit").unwrap());
	engine.shutdown().unwrap();
}

#[test]
fn script_editor_evaluates_selection() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);
	let mut engine = boot(dir.path());
	let directory = engine.shared().directory().clone();

	let evaluated = directory
		.with::<ScriptEditor, _>("factory.script_editor", |editor| {
			editor.set_text("# comment\nActions|Umbra|Engine|Quit\nActions|Umbra|Engine|Missing");
			assert!(editor.select(10..35));
			assert_eq!(editor.selected_text(), "Actions|Umbra|Engine|Quit");
			let selection = editor.evaluate_selection();
			let script = editor.evaluate_script();
			(selection, script, editor.console())
		})
		.unwrap();
	assert!(evaluated.0);
	assert!(!evaluated.1);
	assert_eq!(evaluated.2.len(), 2);
	assert!(evaluated.2[1].outcome.as_ref().is_err_and(|error| error.contains("Missing")));
	assert!(engine.quit_requested());
	engine.shutdown().unwrap();
}

struct Gate {
	allow: Rc<Cell<bool>>,
	log: Rc<RefCell<Vec<&'static str>>>,
}

impl Component<EngineContext> for Gate {
	fn capabilities(&self) -> Capabilities {
		Capabilities::DEFAULT | Capabilities::ON_CLOSE
	}

	fn activate(&mut self, _context: &EngineContext) -> HookResult {
		self.log.borrow_mut().push("activate");
		Ok(())
	}

	fn deactivate(&mut self) -> HookResult {
		self.log.borrow_mut().push("deactivate");
		Ok(())
	}

	fn initialize(&mut self) -> HookResult {
		self.log.borrow_mut().push("initialize");
		Ok(())
	}

	fn uninitialize(&mut self) -> HookResult {
		self.log.borrow_mut().push("uninitialize");
		Ok(())
	}

	fn on_close(&mut self) -> bool {
		self.log.borrow_mut().push("on_close");
		self.allow.get()
	}
}

#[test]
fn close_veto_blocks_shutdown_until_released() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);
	let extra = dir.path().join("extra").join("gate");
	fs::create_dir_all(&extra).unwrap();
	fs::write(extra.join(MANIFEST_FILE), "name = \"tests.gate\"\ninterface = \"tests.gate\"\n").unwrap();

	let allow = Rc::new(Cell::new(false));
	let log = Rc::new(RefCell::new(Vec::new()));
	let mut factories = registered_factories();
	{
		let (allow, log) = (Rc::clone(&allow), Rc::clone(&log));
		factories.register("tests.gate", move |_profile: &ComponentProfile| {
			Ok(handle(Gate {
				allow: Rc::clone(&allow),
				log: Rc::clone(&log),
			}))
		});
	}
	let options = EngineOptions {
		component_paths: vec![dir.path().join("extra")],
		..options(dir.path())
	};
	let mut engine = Engine::boot_with_factories(options, Box::new(HeadlessWindow::new()), Box::new(NoSplash), factories).unwrap();
	assert_eq!(*log.borrow(), ["activate", "initialize"]);

	let vetoed = engine.shutdown();
	assert!(matches!(vetoed, Err(EngineError::ShutdownVetoed(ref name)) if name == "tests.gate"));
	assert!(engine.shared().components().unwrap().is_active("tests.gate"));

	allow.set(true);
	engine.shutdown().unwrap();
	assert_eq!(*log.borrow(), ["activate", "initialize", "on_close", "on_close", "uninitialize", "deactivate"]);
	assert!(!engine.shared().components().unwrap().is_active("tests.gate"));
}

#[test]
fn logging_sinks_write_a_session_file() {
	let dir = tempfile::tempdir().unwrap();
	seed_settings(dir.path(), false);
	let options = EngineOptions {
		install_logging: true,
		log_to_stdout: false,
		..options(dir.path())
	};
	let mut engine = Engine::boot(options, Box::new(HeadlessWindow::new()), Box::new(NoSplash)).unwrap();

	let logging = engine.shared().logging().cloned().expect("sinks installed");
	assert!(logging.buffer().lines().iter().any(|line| line.contains("engine.ready")));
	let file = logging.file().map(Path::to_path_buf).expect("session file");
	assert_eq!(file, dir.path().join("logging").join("umbra_1.log"));
	engine.shutdown().unwrap();
	assert!(fs::read_to_string(file).unwrap().contains("engine.shutdown.done"));
}
