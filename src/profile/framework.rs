/*!
 * Framework Rewrites
 * Unwrap interpreter and wrapper invocations into the command they run
 */

use super::types::RewriteRule;
use std::path::Path;

impl RewriteRule {
    /// Rewrite `cmd_line` (run from `cwd`) into the wrapped command line
    ///
    /// The program token of the result is absolute whenever `cwd` is known.
    pub fn apply(&self, cmd_line: &str, cwd: &str) -> Result<String, String> {
        let tokens: Vec<&str> = cmd_line.split_whitespace().collect();
        if tokens.is_empty() {
            return Err("empty command line".to_string());
        }

        let start = match self {
            RewriteRule::FirstNonFlagArgument => tokens
                .iter()
                .skip(1)
                .position(|t| !t.starts_with('-'))
                .map(|i| i + 1)
                .ok_or_else(|| format!("no positional argument in {:?}", cmd_line))?,
            RewriteRule::Argument(0) => {
                return Err("argument 0 is the wrapper itself".to_string());
            }
            RewriteRule::Argument(n) => {
                if *n >= tokens.len() {
                    return Err(format!(
                        "argument {} requested but only {} present",
                        n,
                        tokens.len() - 1
                    ));
                }
                *n
            }
        };

        let program = absolutize(tokens[start], cwd);
        let mut rewritten = program;
        for arg in &tokens[start + 1..] {
            rewritten.push(' ');
            rewritten.push_str(arg);
        }
        Ok(rewritten)
    }
}

/// Program path from the first token of a command line
pub fn program_of(cmd_line: &str) -> &str {
    cmd_line.split_whitespace().next().unwrap_or("")
}

fn absolutize(program: &str, cwd: &str) -> String {
    let path = Path::new(program);
    if path.is_absolute() || cwd.is_empty() {
        return program.to_string();
    }
    Path::new(cwd).join(path).to_string_lossy().into_owned()
}
