use std::os::unix::io::RawFd;

use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd;
use thiserror::Error;
use tracing::trace;

use crate::config::Config;
use crate::types::*;

#[derive(Debug, Error)]
pub enum RedirectError {
	#[error("cannot open {path} for {direction}")]
	Open { path: String, direction: &'static str, #[source] source: nix::Error },
	#[error("cannot redirect {direction}: {source}")]
	Dup { direction: &'static str, #[source] source: nix::Error },
}

fn standard_fd(typ: RedirectType) -> RawFd {
	match typ {
		RedirectType::Input => libc::STDIN_FILENO,
		RedirectType::Output => libc::STDOUT_FILENO,
	}
}

/// Effective redirections for a command. Explicit targets always win; a
/// command that really goes to the background gets the discard target for
/// whatever it left unspecified.
pub fn resolve(command: &Command, background: bool, config: &Config) -> Vec<Redirect> {
	let slots = [(&command.input, RedirectType::Input), (&command.output, RedirectType::Output)];
	slots.iter()
		.filter_map(|&(explicit, typ)| match *explicit {
			Some(ref r) => Some(r.clone()),
			None if background => Some(Redirect { target: config.discard_path.to_string(), typ }),
			None => None,
		})
		.collect()
}

fn open_target(redirect: &Redirect) -> Result<RawFd, RedirectError> {
	let (flags, mode) = match redirect.typ {
		RedirectType::Input => (OFlag::O_RDONLY, Mode::empty()),
		RedirectType::Output => (OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, Mode::from_bits_truncate(0o644)),
	};
	fcntl::open(redirect.target.as_str(), flags, mode).map_err(|source| RedirectError::Open {
		path: redirect.target.clone(),
		direction: redirect.typ.direction(),
		source,
	})
}

fn copy_fd(src: RawFd, dst: RawFd, direction: &'static str) -> Result<(), RedirectError> {
	if src != dst {
		unistd::dup2(src, dst).map_err(|source| RedirectError::Dup { direction, source })?;
		let _ = unistd::close(src);
	}
	Ok(())
}

/// Child side only: every failure here ends the child, never the shell.
pub fn apply(redirects: &[Redirect]) -> Result<(), RedirectError> {
	for redirect in redirects {
		let fd = open_target(redirect)?;
		trace!(path = %redirect.target, fd, "redirecting {}", redirect.typ.direction());
		copy_fd(fd, standard_fd(redirect.typ), redirect.typ.direction())?;
	}
	Ok(())
}
