use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

const ENTER_MESSAGE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n: ";
const EXIT_MESSAGE: &[u8] = b"\nExiting foreground-only mode\n: ";

// The only state touched from handler context.
static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigtstp(_: libc::c_int) {
	let was_on = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
	let msg = if was_on { EXIT_MESSAGE } else { ENTER_MESSAGE };
	unsafe {
		libc::write(libc::STDOUT_FILENO, msg.as_ptr() as *const libc::c_void, msg.len());
	}
}

pub fn foreground_only() -> bool {
	FOREGROUND_ONLY.load(Ordering::SeqCst)
}

fn set_handler(sig: Signal, handler: SigHandler, flags: SaFlags) -> nix::Result<()> {
	let action = SigAction::new(handler, flags, SigSet::empty());
	unsafe { signal::sigaction(sig, &action) }?;
	Ok(())
}

/// Shell process: interactive interrupts are ignored and `SIGTSTP` toggles
/// foreground-only mode.
pub fn install_shell_handlers() -> nix::Result<()> {
	set_handler(Signal::SIGINT, SigHandler::SigIgn, SaFlags::SA_RESTART)?;
	set_handler(Signal::SIGQUIT, SigHandler::SigIgn, SaFlags::SA_RESTART)?;
	set_handler(Signal::SIGTSTP, SigHandler::Handler(handle_sigtstp), SaFlags::SA_RESTART)
}

fn quit_set() -> SigSet {
	let mut set = SigSet::empty();
	set.add(Signal::SIGQUIT);
	set
}

/// Held across `fork` so a group-wide `SIGQUIT` sent before the child has
/// restored its disposition stays pending instead of being ignored.
pub fn hold_quit() -> nix::Result<()> {
	quit_set().thread_block()
}

pub fn release_quit() -> nix::Result<()> {
	quit_set().thread_unblock()
}

/// Forked child, before exec. Only a foreground child gets `SIGINT` back.
/// `SIGPIPE` is ignored by the Rust runtime and would survive exec.
pub fn prepare_child(foreground: bool) -> nix::Result<()> {
	if foreground {
		set_handler(Signal::SIGINT, SigHandler::SigDfl, SaFlags::empty())?;
	}
	set_handler(Signal::SIGPIPE, SigHandler::SigDfl, SaFlags::empty())?;
	set_handler(Signal::SIGTSTP, SigHandler::SigIgn, SaFlags::empty())?;
	set_handler(Signal::SIGQUIT, SigHandler::SigDfl, SaFlags::SA_RESTART)?;
	release_quit()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sigtstp_toggles_mode() {
		let before = foreground_only();
		handle_sigtstp(libc::SIGTSTP);
		assert_eq!(foreground_only(), !before);
		handle_sigtstp(libc::SIGTSTP);
		assert_eq!(foreground_only(), before);
	}

	#[test]
	fn quit_mask_round_trip() {
		hold_quit().unwrap();
		let mask = SigSet::thread_get_mask().unwrap();
		assert!(mask.contains(Signal::SIGQUIT));
		release_quit().unwrap();
		let mask = SigSet::thread_get_mask().unwrap();
		assert!(!mask.contains(Signal::SIGQUIT));
	}
}
