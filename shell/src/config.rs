use std::env;

use tracing::warn;

pub const LOG_ENV: &str = "MINISH_LOG";
const MAX_ARGS_ENV: &str = "MINISH_MAX_ARGS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub prompt: &'static str,
	pub max_args: usize,
	pub max_line: usize,
	pub discard_path: &'static str,
}

impl Default for Config {
	fn default() -> Config {
		Config {
			prompt: ": ",
			max_args: 512,
			max_line: 2048,
			discard_path: "/dev/null",
		}
	}
}

impl Config {
	pub fn from_env() -> Config {
		Config::from_lookup(|key| env::var(key).ok())
	}

	fn from_lookup<F>(lookup: F) -> Config where F: Fn(&str) -> Option<String> {
		let mut config = Config::default();
		if let Some(raw) = lookup(MAX_ARGS_ENV) {
			match raw.trim().parse::<usize>() {
				Ok(n) if n > 0 => config.max_args = n,
				_ => warn!(value = %raw, default = config.max_args, "ignoring invalid {}", MAX_ARGS_ENV),
			}
		}
		config
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = Config::from_lookup(|_| None);
		assert_eq!(config, Config::default());
		assert_eq!(config.prompt, ": ");
		assert_eq!(config.max_args, 512);
	}

	#[test]
	fn max_args_override() {
		let config = Config::from_lookup(|k| if k == MAX_ARGS_ENV { Some("8".to_string()) } else { None });
		assert_eq!(config.max_args, 8);
	}

	#[test]
	fn invalid_override_falls_back() {
		for raw in &["zero", "0", "-3", ""] {
			let config = Config::from_lookup(|_| Some(raw.to_string()));
			assert_eq!(config.max_args, 512, "{:?}", raw);
		}
	}
}
