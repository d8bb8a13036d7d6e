//! Headless Umbra host: boots the engine, feeds stdin lines to the request
//! queue and ticks until the quit action fires.

mod cli;

use std::io::BufRead;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use umbra_bus::{Request, RequestSender};
use umbra_engine::{ENGINE_ACTIONS, Engine, EngineError, LogSplash, NoSplash, Splash, VERSION};
use umbra_layout::HeadlessWindow;
use umbra_worker::{TaskClass, spawn_named_thread};

const FRAME: Duration = Duration::from_millis(25);

fn main() -> ExitCode {
	let cli = Cli::parse();
	if cli.about {
		println!("Umbra - {VERSION} | Application framework host.");
		return ExitCode::SUCCESS;
	}
	match run(&cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(error) => {
			eprintln!("umbra: {error:#}");
			ExitCode::FAILURE
		}
	}
}

fn run(cli: &Cli) -> anyhow::Result<()> {
	let splash: Box<dyn Splash> = if cli.hide_splash { Box::new(NoSplash) } else { Box::new(LogSplash::default()) };
	let mut engine = Engine::boot(cli.engine_options(), Box::new(HeadlessWindow::new()), splash).context("initialization failed")?;
	forward_stdin(engine.shared().requests().clone()).context("cannot read stdin")?;

	let mut last = Instant::now();
	loop {
		std::thread::sleep(FRAME);
		let now = Instant::now();
		engine.tick(now - last);
		last = now;

		if !engine.quit_requested() {
			continue;
		}
		match engine.shutdown() {
			Ok(()) => return Ok(()),
			Err(EngineError::ShutdownVetoed(component)) => {
				tracing::warn!(%component, "umbra.shutdown_vetoed");
			}
			Err(error) => return Err(error).context("shutdown failed"),
		}
	}
}

/// Queues every stdin line as a local request; end of input quits.
fn forward_stdin(requests: RequestSender) -> std::io::Result<()> {
	spawn_named_thread(TaskClass::IoBlocking, "umbra-stdin", move || {
		for line in std::io::stdin().lock().lines() {
			let Ok(line) = line else {
				break;
			};
			if !line.trim().is_empty() && !requests.try_put(Request::local(line)) {
				tracing::warn!("umbra.stdin.request_dropped");
			}
		}
		if !requests.put_blocking(Request::local(format!("{ENGINE_ACTIONS}|Quit"))) {
			tracing::warn!("umbra.stdin.quit_undelivered");
		}
	})?;
	Ok(())
}
