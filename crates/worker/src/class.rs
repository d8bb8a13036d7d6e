/// Execution classes used for worker naming and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Socket servers and their per-connection handlers.
	Network,
	/// Blocking filesystem work such as searches.
	IoBlocking,
	/// CPU-heavy work executed off the UI thread.
	CpuBlocking,
	/// Anything else that may be delayed or cancelled freely.
	Background,
}

impl TaskClass {
	/// Stable lowercase name used in log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Network => "network",
			Self::IoBlocking => "io_blocking",
			Self::CpuBlocking => "cpu_blocking",
			Self::Background => "background",
		}
	}
}
