//! Sends script editor content to a remote request bus.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use umbra_actions::Slot;
use umbra_bus::{ClientConfig, DEFAULT_FILE_COMMAND, DEFAULT_PORT, REQUEST_END, TcpClient, validate_port};
use umbra_components::{Capabilities, Component, ComponentError, ComponentHandle, ComponentProfile, HookResult, handle};
use umbra_settings::{SettingsStore, TaggedValue};
use umbra_worker::TaskClass;

use super::{ComponentFactoryReg, OwnedActions, PreferencesManager, ScriptEditor, bound, component_action, preferences_manager, script_editor};
use crate::{EngineContext, Notice};

pub(crate) const NAME: &str = "addons.tcp_client";
pub(crate) const MANIFEST: &str = r#"name = "addons.tcp_client"
title = "TCP Client"
category = "ui"
rank = 50
version = "1.0.0"
requires = ["factory.preferences_manager", "factory.script_editor"]
interface = "addons.tcp_client"
description = "Sends the script editor selection or file to a remote request bus."
"#;

/// Settings section of the client.
pub const SETTINGS_SECTION: &str = "tcpClient";
const PREFERENCES_SECTION: &str = "TCP Client";

inventory::submit! {
	ComponentFactoryReg { interface: NAME, build }
}

fn build(_profile: &ComponentProfile) -> Result<ComponentHandle<EngineContext>, ComponentError> {
	Ok(handle(TcpClientComponent::default()))
}

/// Owns a [`TcpClient`] configured from the `tcpClient` settings section.
#[derive(Default)]
pub struct TcpClientComponent {
	context: Option<EngineContext>,
	actions: OwnedActions,
	client: Rc<RefCell<TcpClient>>,
}

impl TcpClientComponent {
	/// Current client configuration.
	pub fn config(&self) -> ClientConfig {
		self.client.borrow().config().clone()
	}

	/// Persists and applies the remote address.
	pub fn set_address(&self, address: &str) {
		self.update(|settings, config| {
			settings.set_key(SETTINGS_SECTION, "address", address);
			config.address = address.to_owned();
		});
	}

	/// Validates, persists and applies the remote port.
	pub fn set_port(&self, port: i64) -> Result<u16, umbra_bus::BusError> {
		let port = validate_port(port)?;
		self.update(|settings, config| {
			settings.set_key(SETTINGS_SECTION, "port", port);
			config.port = port;
		});
		Ok(port)
	}

	/// Persists and applies the file command template.
	pub fn set_file_command(&self, template: &str) {
		self.update(|settings, config| {
			settings.set_key(SETTINGS_SECTION, "fileCommand", template);
			config.file_command = template.to_owned();
		});
	}

	/// Persists and applies the connection terminator, escapes included.
	pub fn set_connection_end(&self, terminator: &str) {
		self.update(|settings, config| {
			settings.set_key(SETTINGS_SECTION, "connectionEnd", terminator);
			config.connection_end = terminator.to_owned();
		});
	}

	/// Sends the script editor selection on a worker thread.
	pub fn send_selection(&self) -> bool {
		self.context.as_ref().is_some_and(|context| send_selection(&self.client, context))
	}

	/// Sends a load command for the script editor file on a worker thread.
	pub fn send_file(&self) -> bool {
		self.context.as_ref().is_some_and(|context| send_file(&self.client, context))
	}

	/// Sends arbitrary code on a worker thread.
	pub fn send_code(&self, code: &str) -> bool {
		self.context.as_ref().is_some_and(|context| dispatch(&self.client, context, Payload::Code(code.to_owned())))
	}

	fn update(&self, apply: impl FnOnce(&SettingsStore, &mut ClientConfig)) {
		if let Ok(shared) = bound(self.context.as_ref()) {
			apply(shared.settings(), self.client.borrow_mut().config_mut());
		}
	}
}

/// Reads the section, seeding missing keys with defaults.
fn load_config(settings: &SettingsStore) -> ClientConfig {
	let defaults = ClientConfig::default();
	let seeds: [(&str, TaggedValue); 4] = [
		("address", defaults.address.clone().into()),
		("port", DEFAULT_PORT.into()),
		("fileCommand", DEFAULT_FILE_COMMAND.into()),
		("connectionEnd", REQUEST_END.into()),
	];
	for (key, value) in seeds {
		if !settings.key_exists(SETTINGS_SECTION, key) {
			settings.set_key(SETTINGS_SECTION, key, value);
		}
	}

	let text = |key: &str, fallback: &str| settings.get_key(SETTINGS_SECTION, key).to_text().unwrap_or_else(|| fallback.to_owned());
	let port = settings.get_key(SETTINGS_SECTION, "port").to_int().unwrap_or(i64::from(DEFAULT_PORT));
	ClientConfig {
		address: text("address", &defaults.address),
		port: validate_port(port).unwrap_or_else(|error| {
			tracing::warn!(%error, "tcp_client.settings.port");
			DEFAULT_PORT
		}),
		file_command: text("fileCommand", DEFAULT_FILE_COMMAND),
		connection_end: text("connectionEnd", REQUEST_END),
		..defaults
	}
}

enum Payload {
	Code(String),
	Selection(String),
	File(PathBuf),
}

fn send_selection(client: &RefCell<TcpClient>, context: &EngineContext) -> bool {
	let Ok(shared) = context.shared() else {
		return false;
	};
	let selection = shared
		.directory()
		.with::<ScriptEditor, _>(script_editor::NAME, |editor| editor.selected_text())
		.unwrap_or_default();
	if selection.trim().is_empty() {
		shared.warnify("No selection to send!");
		return false;
	}
	dispatch(client, context, Payload::Selection(selection))
}

fn send_file(client: &RefCell<TcpClient>, context: &EngineContext) -> bool {
	let Ok(shared) = context.shared() else {
		return false;
	};
	let file = shared.directory().with::<ScriptEditor, _>(script_editor::NAME, |editor| editor.file()).flatten();
	let Some(file) = file else {
		shared.warnify("Script editor has no file to send!");
		return false;
	};
	dispatch(client, context, Payload::File(file))
}

/// Sends on a network worker; the outcome comes back as a [`Notice`].
fn dispatch(client: &RefCell<TcpClient>, context: &EngineContext, payload: Payload) -> bool {
	let Ok(shared) = context.shared() else {
		return false;
	};
	let client = client.borrow().clone();
	let notices = shared.notices().clone();
	let spawned = shared.workers().spawn(TaskClass::Network, "umbra-tcp-client", move |_cancel| {
		let endpoint = format!("{}:{}", client.config().address, client.config().port);
		let notice = match payload {
			Payload::Code(code) => client.send(&code).map(|()| Notice::info(format!("Code sent to '{endpoint}'!"))),
			Payload::Selection(selection) => client.send_selection(&selection).map(|sent| {
				if sent {
					Notice::info(format!("Selection sent to '{endpoint}'!"))
				} else {
					Notice::warning("No selection to send!")
				}
			}),
			Payload::File(path) => client
				.send_file(&path)
				.map(|()| Notice::info(format!("'{}' file sent to '{endpoint}'!", path.display()))),
		}
		.unwrap_or_else(|error| Notice::warning(format!("TCP Client failed to send to '{endpoint}': {error}")));
		if notices.send(notice).is_err() {
			tracing::debug!("tcp_client.notice_dropped");
		}
	});
	match spawned {
		Ok(id) => {
			tracing::debug!(?id, "tcp_client.dispatched");
			true
		}
		Err(error) => {
			shared.warnify(format!("TCP Client could not start a worker: {error}"));
			false
		}
	}
}

impl Component<EngineContext> for TcpClientComponent {
	fn capabilities(&self) -> Capabilities {
		Capabilities::UI
	}

	fn activate(&mut self, context: &EngineContext) -> HookResult {
		let shared = context.shared()?;
		*self.client.borrow_mut() = TcpClient::new(load_config(shared.settings()));
		self.context = Some(context.clone());
		Ok(())
	}

	fn deactivate(&mut self) -> HookResult {
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
		let (client, selection_context) = (Rc::clone(&self.client), context.clone());
		let selection_slot: Slot = Rc::new(move || {
			send_selection(&client, &selection_context);
		});
		let client = Rc::clone(&self.client);
		let file_slot: Slot = Rc::new(move || {
			send_file(&client, &context);
		});
		self.actions.register_all(
			&mut registry,
			vec![
				(component_action(NAME, "Send Selection To Server"), Some("Ctrl+Alt+Shift+E"), selection_slot),
				(component_action(NAME, "Send Current File To Server"), Some("Ctrl+Alt+Shift+X"), file_slot),
			],
		)
	}

	fn uninitialize_ui(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		self.actions.unregister(&mut shared.actions());
		Ok(())
	}
}
