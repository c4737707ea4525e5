mod builtin;
mod config;
mod eval;
mod expand;
mod global;
mod job;
mod parser;
mod redirect;
mod signal;
mod types;

use std::io::{self, BufRead, Write};
use std::process;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use builtin::Flow;
use config::Config;

fn init_logging() {
	let filter = EnvFilter::try_from_env(config::LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.init();
}

fn shell_fail(msg: &str) -> ! {
	error!("{}", msg);
	let _ = writeln!(io::stderr(), "minish: {}", msg);
	process::exit(1)
}

fn main() {
	init_logging();
	let config = Config::from_env();
	if let Err(e) = signal::install_shell_handlers() {
		shell_fail(&format!("cannot install signal handlers: {}", e));
	}
	let mut state = global::State::new(config);
	debug!(pid = %state.pid, "started");

	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let mut stdin_locked = stdin.lock();
	loop {
		for done in state.job_set.reap() {
			let _ = writeln!(stdout, "{}", done);
		}
		let _ = stdout.write_all(state.config.prompt.as_bytes());
		let _ = stdout.flush();

		let mut line: Vec<u8> = vec![];
		match stdin_locked.read_until(b'\n', &mut line) {
			Ok(0) => { break; },
			Ok(_) => {},
			Err(ref e) if e.kind() == io::ErrorKind::Interrupted => { continue; },
			Err(e) => {
				error!(error = %e, "reading input failed");
				break;
			},
		}
		let line = String::from_utf8_lossy(&line);
		match eval::eval_line(&mut state, &line, &mut stdout) {
			Ok(Flow::Continue) => {},
			Ok(Flow::Exit) => { break; },
			Err(e) => shell_fail(&e.to_string()),
		}
	}

	builtin::terminate_children(state);
	process::exit(0)
}
