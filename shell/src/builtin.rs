use std::env;
use std::io::{self, Write};

use nix::sys::signal::{self, Signal};
use nix::unistd::{self, Pid};
use thiserror::Error;
use tracing::debug;

use crate::global;
use crate::types::Command;

#[derive(Debug, Error)]
pub enum BuiltinError {
	#[error("HOME is not set")]
	NoHome,
	#[error("{path}: {source}")]
	ChangeDir { path: String, #[source] source: nix::Error },
	#[error(transparent)]
	Io(#[from] io::Error),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow { Continue, Exit }

pub type Builtin = fn(&mut global::State, &Command, &mut dyn Write) -> Result<Flow, BuiltinError>;

pub fn builtin_cd(_: &mut global::State, command: &Command, _: &mut dyn Write) -> Result<Flow, BuiltinError> {
	let path = match command.arguments.first() {
		Some(dir) => dir.clone(),
		None => env::var("HOME").map_err(|_| BuiltinError::NoHome)?,
	};
	unistd::chdir(path.as_str()).map_err(|source| BuiltinError::ChangeDir { path: path.clone(), source })?;
	debug!(%path, "changed directory");
	Ok(Flow::Continue)
}

pub fn builtin_status(state: &mut global::State, _: &Command, out: &mut dyn Write) -> Result<Flow, BuiltinError> {
	writeln!(out, "{}", state.last_status)?;
	out.flush()?;
	Ok(Flow::Continue)
}

pub fn builtin_exit(_: &mut global::State, _: &Command, _: &mut dyn Write) -> Result<Flow, BuiltinError> {
	Ok(Flow::Exit)
}

pub fn match_builtin(name: &str) -> Option<Builtin> {
	match name {
		"cd" => Some(builtin_cd),
		"status" => Some(builtin_status),
		"exit" => Some(builtin_exit),
		_ => None,
	}
}

/// Sends `SIGQUIT` to our whole process group. The shell itself ignores it;
/// every child has it at its default disposition.
pub fn terminate_children(state: global::State) {
	debug!(outstanding = state.job_set.len(), "terminating process group");
	drop(state);
	let _ = signal::kill(Pid::from_raw(0), Signal::SIGQUIT);
}
