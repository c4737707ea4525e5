#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectType { Input, Output }

impl RedirectType {
	pub fn marker(self) -> &'static str {
		match self {
			RedirectType::Input => "<",
			RedirectType::Output => ">",
		}
	}

	pub fn direction(self) -> &'static str {
		match self {
			RedirectType::Input => "input",
			RedirectType::Output => "output",
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Redirect {
	pub target: String,
	pub typ: RedirectType,
}

/// One input line after expansion, split into the program's argv and the
/// shell syntax that surrounded it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Command {
	pub name: String,
	pub arguments: Vec<String>,
	pub input: Option<Redirect>,
	pub output: Option<Redirect>,
	pub is_background: bool,
}

impl Command {
	pub fn argv(&self) -> impl Iterator<Item = &str> {
		std::iter::once(self.name.as_str()).chain(self.arguments.iter().map(|s| s.as_str()))
	}
}
