use nix::unistd;

use crate::config::Config;
use crate::job::{JobSet, Termination};

pub struct State {
	pub config: Config,
	pub pid: String,
	pub job_set: JobSet,
	pub last_status: Termination,
}

impl State {
	pub fn new(config: Config) -> State {
		State::with_pid(config, unistd::getpid().to_string())
	}

	pub fn with_pid(config: Config, pid: String) -> State {
		State {
			config,
			pid,
			job_set: JobSet::new(),
			last_status: Termination::default(),
		}
	}
}
