const PID_VARIABLE: &str = "$$";

/// Replaces every `$$` in `token`, scanning left to right, with `pid`.
pub fn expand_pid(token: &str, pid: &str) -> String {
	token.replace(PID_VARIABLE, pid)
}

pub fn expand_tokens(tokens: Vec<String>, pid: &str) -> Vec<String> {
	tokens.into_iter()
		.map(|t| if t.contains(PID_VARIABLE) { expand_pid(&t, pid) } else { t })
		.collect()
}
