//! Minimal pipeline parser.
//!
//! Turns one command line into the [`Pipeline`] structure the rest of the
//! kernel consumes read-only. The grammar is deliberately small: words,
//! `|` between stages, at most one `<` and one `>` per pipeline, and a
//! trailing `&`. No quoting, globbing, or expansion.

use crate::error::{ShellError, ShellResult};

/// One command within a pipeline: the command token plus its argument
/// vector (`argv[0]` is the command itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub cmd: String,
    pub argv: Vec<String>,
}

impl Stage {
    fn new(argv: Vec<String>) -> Self {
        Self {
            cmd: argv[0].clone(),
            argv,
        }
    }
}

/// A parsed command line: stages wired left to right, optional
/// redirections for the pipeline's ends, and a background flag.
///
/// Immutable once produced; the executor and builtins never mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
    pub infile: Option<String>,
    pub outfile: Option<String>,
    pub background: bool,
}

impl Pipeline {
    /// Number of stages, and therefore of processes a job will own.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Word(String),
    Pipe,
    RedirectIn,
    RedirectOut,
    Background,
}

fn flush_word(word: &mut String, tokens: &mut Vec<Token>) {
    if !word.is_empty() {
        tokens.push(Token::Word(std::mem::take(word)));
    }
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for ch in line.chars() {
        match ch {
            '|' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(Token::Pipe);
            }
            '<' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(Token::RedirectIn);
            }
            '>' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(Token::RedirectOut);
            }
            '&' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(Token::Background);
            }
            c if c.is_whitespace() => flush_word(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush_word(&mut word, &mut tokens);

    tokens
}

/// Parse one command line into a [`Pipeline`].
///
/// Returns [`ShellError::InvalidSyntax`] for an empty stage, a redirection
/// without a target, a duplicate redirection, or `&` anywhere but the end.
pub fn parse_cmdline(line: &str) -> ShellResult<Pipeline> {
    let mut tokens = tokenize(line).into_iter().peekable();
    let mut pipeline = Pipeline::default();
    let mut current: Vec<String> = Vec::new();

    while let Some(token) = tokens.next() {
        match token {
            Token::Word(word) => current.push(word),
            Token::Pipe => {
                if current.is_empty() {
                    return Err(ShellError::InvalidSyntax);
                }
                pipeline.stages.push(Stage::new(std::mem::take(&mut current)));
            }
            Token::RedirectIn => {
                if pipeline.infile.is_some() {
                    return Err(ShellError::InvalidSyntax);
                }
                match tokens.next() {
                    Some(Token::Word(path)) => pipeline.infile = Some(path),
                    _ => return Err(ShellError::InvalidSyntax),
                }
            }
            Token::RedirectOut => {
                if pipeline.outfile.is_some() {
                    return Err(ShellError::InvalidSyntax);
                }
                match tokens.next() {
                    Some(Token::Word(path)) => pipeline.outfile = Some(path),
                    _ => return Err(ShellError::InvalidSyntax),
                }
            }
            Token::Background => {
                // Only allowed as the very last token.
                if tokens.peek().is_some() {
                    return Err(ShellError::InvalidSyntax);
                }
                pipeline.background = true;
            }
        }
    }

    if current.is_empty() {
        return Err(ShellError::InvalidSyntax);
    }
    pipeline.stages.push(Stage::new(current));

    Ok(pipeline)
}
