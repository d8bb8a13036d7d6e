//! Script editor with an evaluation console.
//!
//! The editor owns the request handler while its ui is initialized, so every
//! request drained from the bus is evaluated here on the UI thread. The
//! evaluator is pluggable; [`ActionEvaluator`] treats each line as an action
//! path.
//!
//! The loaded file is watched: external edits reload the buffer and a
//! removed file is reported.

use std::cell::RefCell;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use umbra_actions::Slot;
use umbra_bus::Request;
use umbra_components::{Capabilities, Component, ComponentError, ComponentHandle, ComponentProfile, HookResult, handle};
use umbra_layout::DockArea;
use umbra_worker::{FsEvent, FsEventKind};

use super::{ComponentFactoryReg, OwnedActions, bound, component_action};
use crate::{EngineContext, FsListener};

pub(crate) const NAME: &str = "factory.script_editor";
pub(crate) const MANIFEST: &str = r#"name = "factory.script_editor"
title = "Script Editor"
category = "ui"
rank = 30
version = "1.0.0"
interface = "factory.script_editor"
description = "Edits scripts and evaluates code received from the editor or the request bus."
"#;

/// Dock widget of the editor.
pub const WIDGET: &str = "Script_Editor";

inventory::submit! {
	ComponentFactoryReg { interface: NAME, build }
}

fn build(_profile: &ComponentProfile) -> Result<ComponentHandle<EngineContext>, ComponentError> {
	Ok(handle(ScriptEditor::default()))
}

/// Outcome of evaluating one piece of code: output text or an error message.
pub type Evaluation = Result<String, String>;

/// Executes code on behalf of the editor.
pub trait Evaluator {
	/// Evaluates `code`; the engine is reachable through `context`.
	fn evaluate(&mut self, code: &str, context: &EngineContext) -> Evaluation;
}

/// Triggers one action per non-blank line; lines starting with `#` are skipped.
#[derive(Debug, Default)]
pub struct ActionEvaluator;

impl Evaluator for ActionEvaluator {
	fn evaluate(&mut self, code: &str, context: &EngineContext) -> Evaluation {
		let shared = context.shared().map_err(|error| error.to_string())?;
		let mut output = Vec::new();
		for line in code.lines().map(str::trim).filter(|line| !line.is_empty() && !line.starts_with('#')) {
			let action = shared.actions().get_action(line).map_err(|error| error.to_string())?;
			if !action.trigger() {
				return Err(format!("'{}' action has no live slot", action.path()));
			}
			output.push(format!("triggered {}", action.path()));
		}
		Ok(output.join("\n"))
	}
}

/// One evaluation recorded in the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
	/// Code as evaluated.
	pub code: String,
	/// What the evaluator returned.
	pub outcome: Evaluation,
}

#[derive(Default)]
struct EditorState {
	text: String,
	selection: Option<Range<usize>>,
	file: Option<PathBuf>,
	console: Vec<ConsoleEntry>,
}

/// The script editor component.
pub struct ScriptEditor {
	context: Option<EngineContext>,
	actions: OwnedActions,
	state: Rc<RefCell<EditorState>>,
	evaluator: Rc<RefCell<Box<dyn Evaluator>>>,
	fs_listener: Option<FsListener>,
}

impl Default for ScriptEditor {
	fn default() -> Self {
		Self {
			context: None,
			actions: OwnedActions::default(),
			state: Rc::default(),
			evaluator: Rc::new(RefCell::new(Box::new(ActionEvaluator))),
			fs_listener: None,
		}
	}
}

impl ScriptEditor {
	/// Swaps the evaluator.
	pub fn set_evaluator(&self, evaluator: Box<dyn Evaluator>) {
		*self.evaluator.borrow_mut() = evaluator;
	}

	/// Buffer content.
	pub fn text(&self) -> String {
		self.state.borrow().text.clone()
	}

	/// Replaces the buffer and clears the selection.
	pub fn set_text(&self, text: impl Into<String>) {
		let mut state = self.state.borrow_mut();
		state.text = text.into();
		state.selection = None;
	}

	/// Selects a byte range of the buffer; false if out of bounds or not on
	/// character boundaries.
	pub fn select(&self, range: Range<usize>) -> bool {
		let mut state = self.state.borrow_mut();
		if state.text.get(range.clone()).is_none() {
			return false;
		}
		state.selection = Some(range);
		true
	}

	/// Selected text; empty without a selection.
	pub fn selected_text(&self) -> String {
		let state = self.state.borrow();
		state
			.selection
			.clone()
			.and_then(|range| state.text.get(range))
			.unwrap_or_default()
			.to_owned()
	}

	/// Loads `path` into the buffer and watches it for external changes.
	///
	/// The stored file is the canonical path when the watcher accepted it.
	pub fn load_file(&self, path: &Path) -> std::io::Result<()> {
		let text = fs::read_to_string(path)?;
		let previous = self.file();
		let file = match self.context.as_ref().map(EngineContext::shared) {
			Some(Ok(shared)) => {
				if let Some(previous) = previous
					&& let Err(error) = shared.unwatch_path(&previous)
				{
					tracing::debug!(path = %previous.display(), %error, "script_editor.unwatch_failed");
				}
				shared.watch_path(path).unwrap_or_else(|error| {
					tracing::debug!(path = %path.display(), %error, "script_editor.watch_failed");
					path.to_path_buf()
				})
			}
			_ => path.to_path_buf(),
		};

		let mut state = self.state.borrow_mut();
		state.text = text;
		state.selection = None;
		state.file = Some(file);
		tracing::info!(path = %path.display(), "script_editor.loaded");
		Ok(())
	}

	/// Writes the buffer to the current file.
	pub fn save_file(&self) -> std::io::Result<bool> {
		let state = self.state.borrow();
		let Some(path) = state.file.as_deref() else {
			return Ok(false);
		};
		fs::write(path, &state.text)?;
		Ok(true)
	}

	/// File backing the buffer.
	pub fn file(&self) -> Option<PathBuf> {
		self.state.borrow().file.clone()
	}

	/// Evaluation history, oldest first.
	pub fn console(&self) -> Vec<ConsoleEntry> {
		self.state.borrow().console.clone()
	}

	/// Evaluates `code`; false if blank or the evaluation failed.
	pub fn evaluate_code(&self, code: &str) -> bool {
		self.context
			.as_ref()
			.is_some_and(|context| evaluate(&self.state, &self.evaluator, context, code))
	}

	/// Evaluates the selection.
	pub fn evaluate_selection(&self) -> bool {
		self.evaluate_code(&self.selected_text())
	}

	/// Evaluates the whole buffer.
	pub fn evaluate_script(&self) -> bool {
		self.evaluate_code(&self.text())
	}
}

fn on_file_event(state: &RefCell<EditorState>, context: &EngineContext, event: &FsEvent) {
	if state.borrow().file.as_deref() != Some(event.path.as_path()) {
		return;
	}
	let Ok(shared) = context.shared() else {
		return;
	};
	let path = event.path.display();
	match event.kind {
		FsEventKind::Changed => match fs::read_to_string(&event.path) {
			Ok(text) if text != state.borrow().text => {
				let mut editor = state.borrow_mut();
				editor.text = text;
				editor.selection = None;
				drop(editor);
				tracing::info!(%path, "script_editor.reloaded");
				shared.notify(format!("'{path}' file has been reloaded!"));
			}
			Ok(_) => {}
			Err(error) => tracing::warn!(%path, %error, "script_editor.reload_failed"),
		},
		FsEventKind::Invalidated => {
			tracing::warn!(%path, "script_editor.file_invalidated");
			shared.warnify(format!("'{path}' file has been removed from disk!"));
		}
	}
}

fn evaluate(state: &RefCell<EditorState>, evaluator: &RefCell<Box<dyn Evaluator>>, context: &EngineContext, code: &str) -> bool {
	if code.trim().is_empty() {
		return false;
	}
	let outcome = match evaluator.try_borrow_mut() {
		Ok(mut evaluator) => evaluator.evaluate(code, context),
		Err(_) => Err("evaluator is busy".to_owned()),
	};
	match &outcome {
		Ok(_) => tracing::debug!(bytes = code.len(), "script_editor.evaluated"),
		Err(error) => {
			tracing::warn!(%error, "script_editor.evaluation_failed");
			if let Ok(shared) = context.shared() {
				shared.warnify(format!("Evaluation failed: {error}"));
			}
		}
	}
	let succeeded = outcome.is_ok();
	state.borrow_mut().console.push(ConsoleEntry {
		code: code.to_owned(),
		outcome,
	});
	succeeded
}

impl Component<EngineContext> for ScriptEditor {
	fn capabilities(&self) -> Capabilities {
		Capabilities::UI
	}

	fn activate(&mut self, context: &EngineContext) -> HookResult {
		self.context = Some(context.clone());
		Ok(())
	}

	fn deactivate(&mut self) -> HookResult {
		self.context = None;
		Ok(())
	}

	fn add_widget(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		shared.window().add_dock_widget(WIDGET, DockArea::Bottom);
		Ok(())
	}

	fn remove_widget(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		shared.window().remove_dock_widget(WIDGET);
		Ok(())
	}

	fn initialize_ui(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		let context = self.context.clone().ok_or_else(|| ComponentError::failed("component is not activated"))?;

		let mut registry = shared.actions();
		let selection_slot: Slot = {
			let (state, evaluator, context) = (Rc::clone(&self.state), Rc::clone(&self.evaluator), context.clone());
			Rc::new(move || {
				let code = {
					let state = state.borrow();
					state.selection.clone().and_then(|range| state.text.get(range)).unwrap_or_default().to_owned()
				};
				evaluate(&state, &evaluator, &context, &code);
			})
		};
		let script_slot: Slot = {
			let (state, evaluator, context) = (Rc::clone(&self.state), Rc::clone(&self.evaluator), context.clone());
			Rc::new(move || {
				let code = state.borrow().text.clone();
				evaluate(&state, &evaluator, &context, &code);
			})
		};
		self.actions.register_all(
			&mut registry,
			vec![
				(component_action(NAME, "Evaluate Selection"), Some("Ctrl+Return"), selection_slot),
				(component_action(NAME, "Evaluate Script"), Some("Ctrl+Shift+Return"), script_slot),
			],
		)?;
		drop(registry);

		let listener: FsListener = {
			let (state, context) = (Rc::clone(&self.state), context.clone());
			Rc::new(move |event: &FsEvent| on_file_event(&state, &context, event))
		};
		shared.add_fs_listener(&listener);
		self.fs_listener = Some(listener);

		let (state, evaluator) = (Rc::clone(&self.state), Rc::clone(&self.evaluator));
		shared.set_request_handler(Some(Rc::new(move |request: &Request| {
			tracing::debug!(peer = ?request.peer, "script_editor.request");
			evaluate(&state, &evaluator, &context, &request.payload);
		})));
		Ok(())
	}

	fn uninitialize_ui(&mut self) -> HookResult {
		let shared = bound(self.context.as_ref())?;
		shared.set_request_handler(None);
		self.actions.unregister(&mut shared.actions());
		self.fs_listener = None;
		if let Some(file) = self.file()
			&& shared.is_path_watched(&file)
			&& let Err(error) = shared.unwatch_path(&file)
		{
			tracing::debug!(path = %file.display(), %error, "script_editor.unwatch_failed");
		}
		Ok(())
	}
}
