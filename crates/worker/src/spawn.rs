use crate::TaskClass;

/// Spawns a named OS thread tagged with `class`.
///
/// The thread inherits the caller's tracing dispatcher, so events from
/// workers reach the same sinks as the spawning thread even when those sinks
/// were installed as a scoped default.
pub fn spawn_named_thread<F, R>(class: TaskClass, name: impl Into<String>, f: F) -> std::io::Result<std::thread::JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let name = name.into();
	let dispatch = tracing::dispatcher::get_default(Clone::clone);
	tracing::trace!(worker_class = class.as_str(), thread = %name, "worker.spawn_named_thread");
	std::thread::Builder::new()
		.name(name)
		.spawn(move || tracing::dispatcher::with_default(&dispatch, f))
}
