use std::fmt;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, trace, warn};

/// How a child went away, as reported by `status` and the reaper.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Termination {
	Exited(i32),
	Signaled(i32),
}

impl Default for Termination {
	fn default() -> Termination {
		Termination::Exited(0)
	}
}

impl fmt::Display for Termination {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Termination::Exited(code) => write!(f, "exit value {}", code),
			Termination::Signaled(sig) => write!(f, "terminated by signal {}", sig),
		}
	}
}

pub trait WaitStatusExt {
	fn termination(self) -> Option<Termination>;
}

impl WaitStatusExt for WaitStatus {
	fn termination(self) -> Option<Termination> {
		match self {
			WaitStatus::Exited(_, code) => Some(Termination::Exited(code)),
			WaitStatus::Signaled(_, sig, _) => Some(Termination::Signaled(sig as i32)),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Completion {
	pub pid: Pid,
	pub termination: Termination,
}

impl fmt::Display for Completion {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "background pid {} is done: {}", self.pid, self.termination)
	}
}

/// Background children are owned by the kernel until reaped; the shell only
/// counts them.
#[derive(Debug, Default)]
pub struct JobSet {
	outstanding: usize,
}

impl JobSet {
	pub fn new() -> JobSet {
		JobSet::default()
	}

	pub fn len(&self) -> usize {
		self.outstanding
	}

	pub fn is_empty(&self) -> bool {
		self.outstanding == 0
	}

	pub fn push(&mut self, pid: Pid) {
		self.outstanding += 1;
		debug!(%pid, outstanding = self.outstanding, "tracking background child");
	}

	/// Collects every finished child without blocking. Does nothing at all
	/// while no background child is outstanding.
	pub fn reap(&mut self) -> Vec<Completion> {
		let mut done = vec![];
		if self.is_empty() {
			return done;
		}
		loop {
			match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
				Ok(WaitStatus::StillAlive) => { break; },
				Ok(status) => {
					trace!(?status, "reaped");
					if let (Some(pid), Some(termination)) = (status.pid(), status.termination()) {
						self.outstanding = self.outstanding.saturating_sub(1);
						done.push(Completion { pid, termination });
					}
				},
				Err(Errno::EINTR) => { continue; },
				Err(Errno::ECHILD) => {
					self.outstanding = 0;
					break;
				},
				Err(e) => {
					warn!(error = %e, "waitpid failed while reaping");
					break;
				},
			}
		}
		done
	}
}

/// Blocks until `pid` terminates. A wait interrupted by `SIGTSTP` resumes.
pub fn wait_foreground(pid: Pid) -> nix::Result<Termination> {
	loop {
		match waitpid(pid, None) {
			Ok(status) => {
				trace!(?status, "foreground wait");
				if let Some(termination) = status.termination() {
					return Ok(termination);
				}
			},
			Err(Errno::EINTR) => { continue; },
			Err(e) => { return Err(e); },
		}
	}
}
