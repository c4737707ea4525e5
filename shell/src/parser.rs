use thiserror::Error;

use crate::config::Config;
use crate::types::*;

const BACKGROUND_MARKER: &str = "&";
const MARKERS: [&str; 3] = ["<", ">", BACKGROUND_MARKER];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
	#[error("line is longer than {max} bytes")]
	LineTooLong { max: usize },
	#[error("too many arguments (limit is {max})")]
	TooManyArguments { max: usize },
	#[error("missing file name after '{marker}'")]
	MissingTarget { marker: &'static str },
	#[error("no command before '{marker}'")]
	EmptyCommand { marker: String },
	#[error("empty command")]
	NoTokens,
}

pub type ParseResult<T> = Result<T, ParseError>;

fn is_marker(token: &str) -> bool {
	MARKERS.contains(&token)
}

fn is_comment(token: &str) -> bool {
	token.starts_with('#')
}

/// Splits a line on whitespace. Blank lines and comments yield `None`.
pub fn tokenize(line: &str, config: &Config) -> ParseResult<Option<Vec<String>>> {
	let line = line.trim_end_matches(['\n', '\r']);
	if line.len() > config.max_line {
		return Err(ParseError::LineTooLong { max: config.max_line });
	}
	let tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
	match tokens.first() {
		None => return Ok(None),
		Some(first) if is_comment(first) => return Ok(None),
		Some(_) => {},
	}
	if tokens.len() > config.max_args {
		return Err(ParseError::TooManyArguments { max: config.max_args });
	}
	Ok(Some(tokens))
}

struct Parser {
	tokens: Vec<String>,
}

impl Parser {
	fn position(&self, marker: &str) -> Option<usize> {
		self.tokens.iter().position(|t| t == marker)
	}

	fn end_of_arguments(&self) -> usize {
		MARKERS.iter()
			.filter_map(|m| self.position(m))
			.min()
			.unwrap_or(self.tokens.len())
	}

	fn parse_redirect(&self, typ: RedirectType) -> ParseResult<Option<Redirect>> {
		let i = match self.position(typ.marker()) {
			Some(i) => i,
			None => { return Ok(None); },
		};
		match self.tokens.get(i + 1) {
			Some(target) if !is_marker(target) => Ok(Some(Redirect { target: target.clone(), typ })),
			_ => Err(ParseError::MissingTarget { marker: typ.marker() }),
		}
	}

	fn parse_command(mut self) -> ParseResult<Command> {
		let input = self.parse_redirect(RedirectType::Input)?;
		let output = self.parse_redirect(RedirectType::Output)?;
		let is_background = self.tokens.last().map(String::as_str) == Some(BACKGROUND_MARKER);

		let end = self.end_of_arguments();
		if end == 0 {
			return Err(ParseError::EmptyCommand { marker: self.tokens[0].clone() });
		}
		self.tokens.truncate(end);
		let mut arguments = self.tokens;
		let name = arguments.remove(0);

		Ok(Command { name, arguments, input, output, is_background })
	}
}

/// Builds a command from already expanded tokens. The earliest marker ends
/// the argument list; `&` only requests the background when it is last.
pub fn parse(tokens: Vec<String>) -> ParseResult<Command> {
	if tokens.is_empty() {
		return Err(ParseError::NoTokens);
	}
	Parser { tokens }.parse_command()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn words(line: &str) -> Vec<String> {
		line.split_whitespace().map(String::from).collect()
	}

	fn redirect(target: &str, typ: RedirectType) -> Option<Redirect> {
		Some(Redirect { target: target.to_string(), typ })
	}

	#[test]
	fn plain_command() {
		let cmd = parse(words("echo hi there")).unwrap();
		assert_eq!(cmd.name, "echo");
		assert_eq!(cmd.arguments, vec!["hi", "there"]);
		assert_eq!(cmd.input, None);
		assert_eq!(cmd.output, None);
		assert!(!cmd.is_background);
	}

	#[test]
	fn output_redirect_is_not_an_argument() {
		let cmd = parse(words("ls > out.txt")).unwrap();
		assert_eq!(cmd.name, "ls");
		assert!(cmd.arguments.is_empty());
		assert_eq!(cmd.output, redirect("out.txt", RedirectType::Output));
	}

	#[test]
	fn earliest_marker_ends_arguments() {
		let cmd = parse(words("wc -l > out < in &")).unwrap();
		assert_eq!(cmd.argv().collect::<Vec<_>>(), vec!["wc", "-l"]);
		assert_eq!(cmd.input, redirect("in", RedirectType::Input));
		assert_eq!(cmd.output, redirect("out", RedirectType::Output));
		assert!(cmd.is_background);
	}

	#[test]
	fn ampersand_only_counts_when_last() {
		let cmd = parse(words("echo a & b")).unwrap();
		assert_eq!(cmd.arguments, vec!["a"]);
		assert!(!cmd.is_background);

		let cmd = parse(words("sleep 5 &")).unwrap();
		assert_eq!(cmd.arguments, vec!["5"]);
		assert!(cmd.is_background);
	}

	#[test]
	fn ampersand_glued_to_a_word_is_an_argument() {
		let cmd = parse(words("echo a&")).unwrap();
		assert_eq!(cmd.arguments, vec!["a&"]);
		assert!(!cmd.is_background);
	}

	#[test]
	fn missing_target() {
		assert_eq!(parse(words("cat <")), Err(ParseError::MissingTarget { marker: "<" }));
		assert_eq!(parse(words("ls > &")), Err(ParseError::MissingTarget { marker: ">" }));
	}

	#[test]
	fn no_tokens() {
		assert_eq!(parse(vec![]), Err(ParseError::NoTokens));
	}

	#[test]
	fn marker_first() {
		assert_eq!(parse(words("> out")), Err(ParseError::EmptyCommand { marker: ">".to_string() }));
	}

	#[test]
	fn tokenize_skips_blank_and_comment_lines() {
		let config = Config::default();
		assert_eq!(tokenize("\n", &config), Ok(None));
		assert_eq!(tokenize("   \t \n", &config), Ok(None));
		assert_eq!(tokenize("# echo nothing\n", &config), Ok(None));
		assert_eq!(tokenize("#\n", &config), Ok(None));
		assert_eq!(tokenize("echo # not a comment\n", &config), Ok(Some(words("echo # not a comment"))));
	}

	#[test]
	fn tokenize_limits() {
		let config = Config { max_args: 3, max_line: 16, ..Config::default() };
		assert_eq!(tokenize("a b c\n", &config), Ok(Some(words("a b c"))));
		assert_eq!(tokenize("a b c d\n", &config), Err(ParseError::TooManyArguments { max: 3 }));
		assert_eq!(tokenize("echo 0123456789abcdef\n", &config), Err(ParseError::LineTooLong { max: 16 }));
	}
}
