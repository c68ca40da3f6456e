//! Interactive lexer REPL for the CLI frontend.
//!
//! Reads lines, lexes each one, and prints every token it produced.

use std::io::{self, BufRead, Write};

use crate::dsl::Lexer;
use crate::error::Result;
use crate::REPL_FILE;

/// Prompt printed before each line.
pub const PROMPT: &str = "booleang> ";

/// Print the tokens of one line of input.
pub fn echo_tokens<W: Write>(line: &str, output: &mut W) -> Result<()> {
    for token in Lexer::new(line, REPL_FILE) {
        writeln!(output, "{}", token)?;
    }
    Ok(())
}

/// Run the REPL until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(mut input: R, output: &mut W) -> Result<()> {
    let mut line = String::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        if line.trim() == "quit" {
            writeln!(output, "quit")?;
            break;
        }

        echo_tokens(&line, output)?;
    }

    Ok(())
}

/// Run the REPL on stdin and stdout.
pub fn run_stdio() -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run(stdin.lock(), &mut stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_tokens() {
        let mut out = Vec::new();
        echo_tokens("a -> b;", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "[repl 1:1-1:1] identifier `a`\n\
             [repl 1:3-1:4] -> `->`\n\
             [repl 1:6-1:6] identifier `b`\n\
             [repl 1:7-1:7] ; `;`\n"
        );
    }

    #[test]
    fn test_run_stops_at_quit() {
        let input = "clock\nquit\nnever lexed\n".as_bytes();
        let mut out = Vec::new();
        run(input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("clock `clock`"));
        assert!(text.ends_with("booleang> quit\n"));
        assert!(!text.contains("never"));
    }
}
