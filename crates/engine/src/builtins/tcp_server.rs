//! Request bus server exposed as a component.

use std::cell::RefCell;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;

use umbra_actions::Slot;
use umbra_bus::{BusError, DEFAULT_PORT, ServerConfig, TcpServer, primary_address, validate_port};
use umbra_components::{Capabilities, Component, ComponentError, ComponentHandle, ComponentProfile, HookResult, handle};
use umbra_settings::SettingsStore;

use super::{ComponentFactoryReg, OwnedActions, PreferencesManager, bound, component_action, preferences_manager};
use crate::EngineContext;

pub(crate) const NAME: &str = "addons.tcp_server";
pub(crate) const MANIFEST: &str = r#"name = "addons.tcp_server"
title = "TCP Server"
category = "ui"
rank = 40
version = "1.0.0"
requires = ["factory.preferences_manager"]
interface = "addons.tcp_server"
description = "Listens for framed requests and queues them for the script editor."
"#;

/// Settings section of the server.
pub const SETTINGS_SECTION: &str = "tcpServer";
const PREFERENCES_SECTION: &str = "TCP Server";

inventory::submit! {
	ComponentFactoryReg { interface: NAME, build }
}

fn build(_profile: &ComponentProfile) -> Result<ComponentHandle<EngineContext>, ComponentError> {
	Ok(handle(TcpServerComponent::default()))
}

type SharedServer = Rc<RefCell<Option<TcpServer>>>;

/// Owns a [`TcpServer`] configured from the `tcpServer` settings section.
#[derive(Default)]
pub struct TcpServerComponent {
	context: Option<EngineContext>,
	actions: OwnedActions,
	server: SharedServer,
	autostart: bool,
}

impl TcpServerComponent {
	/// Starts listening; false if already online or binding failed.
	pub fn start_server(&self) -> bool {
		self.context.as_ref().is_some_and(|context| start(&self.server, context))
	}

	/// Stops listening; false if offline.
	pub fn stop_server(&self) -> bool {
		self.context.as_ref().is_some_and(|context| stop(&self.server, context))
	}

	/// Whether the accept loop is running.
	pub fn is_online(&self) -> bool {
		self.server.borrow().as_ref().is_some_and(TcpServer::is_online)
	}

	/// Bound address while online.
	pub fn local_addr(&self) -> Option<SocketAddr> {
		self.server.borrow().as_ref().and_then(TcpServer::local_addr)
	}

	/// Validates and persists a port; applies on the next start.
	pub fn set_port(&self, port: i64) -> Result<u16, BusError> {
		let port = validate_port(port)?;
		self.update(|settings, config| {
			settings.set_key(SETTINGS_SECTION, "port", port);
			config.port = port;
		});
		Ok(port)
	}

	/// Persists the bind address; applies on the next start.
	pub fn set_address(&self, address: IpAddr) {
		self.update(|settings, config| {
			settings.set_key(SETTINGS_SECTION, "address", address.to_string());
			config.address = address;
		});
	}

	/// Persists the autostart preference.
	pub fn set_autostart(&mut self, autostart: bool) {
		self.autostart = autostart;
		if let Ok(shared) = bound(self.context.as_ref()) {
			shared.settings().set_key(SETTINGS_SECTION, "autostart", autostart);
		}
	}

	fn update(&self, apply: impl FnOnce(&SettingsStore, &mut ServerConfig)) {
		let Ok(shared) = bound(self.context.as_ref()) else {
			return;
		};
		let mut server = self.server.borrow_mut();
		let mut config = server.as_ref().map(|server| server.config().clone()).unwrap_or_default();
		apply(shared.settings(), &mut config);
		if let Some(server) = server.as_mut() {
			server.set_config(config);
		}
	}
}

/// Reads the section, seeding missing keys with defaults.
fn load_config(settings: &SettingsStore) -> (ServerConfig, bool) {
	if !settings.key_exists(SETTINGS_SECTION, "port") {
		settings.set_key(SETTINGS_SECTION, "port", DEFAULT_PORT);
	}
	if !settings.key_exists(SETTINGS_SECTION, "address") {
		settings.set_key(SETTINGS_SECTION, "address", primary_address().to_string());
	}
	if !settings.key_exists(SETTINGS_SECTION, "autostart") {
		settings.set_key(SETTINGS_SECTION, "autostart", true);
	}

	let mut config = ServerConfig::default();
	let port = settings.get_key(SETTINGS_SECTION, "port").to_int().unwrap_or(i64::from(DEFAULT_PORT));
	match validate_port(port) {
		Ok(port) => config.port = port,
		Err(error) => tracing::warn!(%error, "tcp_server.settings.port"),
	}
	let address = settings.get_key(SETTINGS_SECTION, "address").to_text().unwrap_or_default();
	match address.parse::<IpAddr>() {
		Ok(address) => config.address = address,
		Err(error) => tracing::warn!(address, %error, "tcp_server.settings.address"),
	}
	let autostart = settings.get_key(SETTINGS_SECTION, "autostart").to_bool().unwrap_or(true);
	(config, autostart)
}

fn start(server: &RefCell<Option<TcpServer>>, context: &EngineContext) -> bool {
	let Ok(shared) = context.shared() else {
		return false;
	};
	let mut guard = server.borrow_mut();
	let Some(server) = guard.as_mut() else {
		return false;
	};
	if server.is_online() {
		drop(guard);
		shared.warnify("TCP Server is already online!");
		return false;
	}
	let started = server.start();
	drop(guard);
	match started {
		Ok(address) => {
			shared.notify(format!("TCP Server has started with '{address}' address!"));
			true
		}
		Err(error) => {
			shared.warnify(format!("TCP Server failed to start: {error}"));
			false
		}
	}
}

fn stop(server: &RefCell<Option<TcpServer>>, context: &EngineContext) -> bool {
	let Ok(shared) = context.shared() else {
		return false;
	};
	let stopped = server.borrow_mut().as_mut().is_some_and(|server| server.stop(false));
	if stopped {
		shared.notify("TCP Server has stopped!");
	} else {
		shared.warnify("TCP Server is not online!");
	}
	stopped
}

impl Component<EngineContext> for TcpServerComponent {
	fn capabilities(&self) -> Capabilities {
		Capabilities::UI | Capabilities::ON_STARTUP | Capabilities::ON_CLOSE
	}

	fn activate(&mut self, context: &EngineContext) -> HookResult {
		let shared = context.shared()?;
		let (config, autostart) = load_config(shared.settings());
		tracing::debug!(address = %config.address, port = config.port, autostart, "tcp_server.configured");
		*self.server.borrow_mut() = Some(TcpServer::new(config, shared.requests().clone()));
		self.autostart = autostart;
		self.context = Some(context.clone());
		Ok(())
	}

	fn deactivate(&mut self) -> HookResult {
		if let Some(mut server) = self.server.borrow_mut().take() {
			server.stop(false);
		}
		self.context = None;
		Ok(())
	}

	fn add_widget(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		shared
			.directory()
			.with::<PreferencesManager, _>(preferences_manager::NAME, |preferences| preferences.add_section(PREFERENCES_SECTION));
		Ok(())
	}

	fn remove_widget(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		shared
			.directory()
			.with::<PreferencesManager, _>(preferences_manager::NAME, |preferences| preferences.remove_section(PREFERENCES_SECTION));
		Ok(())
	}

	fn initialize_ui(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		let context = self.context.clone().ok_or_else(|| ComponentError::failed("component is not activated"))?;
		let mut registry = shared.actions();
		let (server, start_context) = (Rc::clone(&self.server), context.clone());
		let start_slot: Slot = Rc::new(move || {
			start(&server, &start_context);
		});
		let server = Rc::clone(&self.server);
		let stop_slot: Slot = Rc::new(move || {
			stop(&server, &context);
		});
		self.actions.register_all(
			&mut registry,
			vec![
				(component_action(NAME, "Start TCP Server"), None, start_slot),
				(component_action(NAME, "Stop TCP Server"), None, stop_slot),
			],
		)
	}

	fn uninitialize_ui(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		self.actions.unregister(&mut shared.actions());
		Ok(())
	}

	fn on_startup(&mut self) -> HookResult {
		if self.autostart && !self.is_online() {
			self.start_server();
		}
		Ok(())
	}

	fn on_close(&mut self) -> bool {
		if self.is_online()
			&& let Some(server) = self.server.borrow_mut().as_mut()
		{
			server.stop(false);
			tracing::info!("tcp_server.stopped_on_close");
		}
		true
	}
}
