use std::convert::Infallible;
use std::ffi::{self, CString};
use std::io::{self, Write};

use nix::errno::Errno;
use nix::unistd::{self, ForkResult, Pid};
use thiserror::Error;
use tracing::{debug, warn};

use crate::builtin::{self, Flow};
use crate::expand;
use crate::global;
use crate::job::{self, Termination};
use crate::parser;
use crate::redirect::{self, RedirectError};
use crate::signal;
use crate::types::*;

/// Failures inside a forked child. They end the child with status 1 and are
/// only visible to the shell through the wait status.
#[derive(Debug, Error)]
enum ExecError {
	#[error(transparent)]
	Redirect(#[from] RedirectError),
	#[error("cannot restore signal dispositions: {0}")]
	Signal(#[source] nix::Error),
	#[error("{0}")]
	Nul(#[from] ffi::NulError),
	#[error("{name}: {reason}")]
	Exec { name: String, reason: String },
}

impl ExecError {
	fn exec(name: &str, errno: Errno) -> ExecError {
		let reason = match errno {
			Errno::ENOENT => "no such file or directory".to_string(),
			e => e.desc().to_lowercase(),
		};
		ExecError::Exec { name: name.to_string(), reason }
	}
}

#[derive(Debug, Error)]
pub enum LaunchError {
	#[error("fork failed: {0}")]
	Fork(#[source] nix::Error),
	#[error("cannot block SIGQUIT: {0}")]
	Mask(#[source] nix::Error),
	#[error("waiting for pid {pid} failed: {source}")]
	Wait { pid: Pid, #[source] source: nix::Error },
}

impl LaunchError {
	/// Only a failed fork takes the shell down.
	pub fn is_fatal(&self) -> bool {
		matches!(*self, LaunchError::Fork(_))
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EvalResult {
	Done(Termination),
	Background(Pid),
}

fn do_exec_command(command: &Command, redirects: &[Redirect], foreground: bool) -> Result<Infallible, ExecError> {
	signal::prepare_child(foreground).map_err(ExecError::Signal)?;
	redirect::apply(redirects)?;
	let argv = command.argv().map(CString::new).collect::<Result<Vec<CString>, ffi::NulError>>()?;
	unistd::execvp(argv[0].as_c_str(), &argv).map_err(|e| ExecError::exec(&command.name, e))
}

fn exec_command(command: &Command, redirects: &[Redirect], foreground: bool) -> ! {
	let e = match do_exec_command(command, redirects, foreground) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	let _ = writeln!(io::stderr(), "{}", e);
	let _ = io::stdout().flush();
	unsafe { libc::_exit(1) }
}

/// Forks and execs an external command. Foreground children are waited for
/// and recorded as the last status; background children are only counted.
pub fn launch(state: &mut global::State, command: &Command) -> Result<EvalResult, LaunchError> {
	let foreground_only = signal::foreground_only();
	let background = command.is_background && !foreground_only;
	let redirects = redirect::resolve(command, background, &state.config);
	let _ = io::stdout().flush();

	signal::hold_quit().map_err(LaunchError::Mask)?;
	let forked = unsafe { unistd::fork() };
	if !matches!(forked, Ok(ForkResult::Child)) {
		let _ = signal::release_quit();
	}
	match forked.map_err(LaunchError::Fork)? {
		ForkResult::Child => exec_command(command, &redirects, !background),
		ForkResult::Parent { child } => {
			debug!(pid = %child, name = %command.name, background, foreground_only, "forked");
			if background {
				state.job_set.push(child);
				return Ok(EvalResult::Background(child));
			}
			let termination = job::wait_foreground(child).map_err(|source| LaunchError::Wait { pid: child, source })?;
			state.last_status = termination;
			Ok(EvalResult::Done(termination))
		},
	}
}

/// Runs one input line to completion (or to the background). Everything
/// short of a failed fork is reported and leaves the shell running.
pub fn eval_line(state: &mut global::State, line: &str, out: &mut dyn Write) -> Result<Flow, LaunchError> {
	let tokens = match parser::tokenize(line, &state.config) {
		Ok(Some(tokens)) => tokens,
		Ok(None) => { return Ok(Flow::Continue); },
		Err(e) => {
			let _ = writeln!(io::stderr(), "minish: {}", e);
			return Ok(Flow::Continue);
		},
	};
	let tokens = expand::expand_tokens(tokens, &state.pid);
	let command = match parser::parse(tokens) {
		Ok(command) => command,
		Err(e) => {
			let _ = writeln!(io::stderr(), "minish: {}", e);
			return Ok(Flow::Continue);
		},
	};
	debug!(?command, "parsed");

	if let Some(func) = builtin::match_builtin(&command.name) {
		return match func(state, &command, out) {
			Ok(flow) => Ok(flow),
			Err(e) => {
				let _ = writeln!(io::stderr(), "{}: {}", command.name, e);
				Ok(Flow::Continue)
			},
		};
	}

	match launch(state, &command) {
		Ok(EvalResult::Background(pid)) => {
			let _ = writeln!(out, "background pid is {}", pid);
		},
		Ok(EvalResult::Done(t @ Termination::Signaled(_))) => {
			let _ = writeln!(out, "{}", t);
		},
		Ok(EvalResult::Done(_)) => {},
		Err(e) if !e.is_fatal() => {
			warn!(error = %e, "launch failed");
			let _ = writeln!(io::stderr(), "minish: {}", e);
		},
		Err(e) => { return Err(e); },
	}
	let _ = out.flush();
	Ok(Flow::Continue)
}
