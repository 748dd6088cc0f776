use std::{
    fmt::Display,
    io::{self, BufRead, Write},
};

/// Empty answers tolerated for a single question before giving up
pub const MAX_EMPTY_ANSWERS: usize = 5;

#[derive(Debug)]
pub enum PromptError {
    Io(io::Error),
    /// Input was closed before an answer was given
    Closed,
    TooManyEmptyAnswers { question: String },
}

impl From<io::Error> for PromptError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl std::error::Error for PromptError {}

impl Display for PromptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read input: {e}"),
            Self::Closed => f.write_str("input closed before an answer was given"),
            Self::TooManyEmptyAnswers { question } => write!(
                f,
                "no answer to {question:?} after {MAX_EMPTY_ANSWERS} empty attempts"
            ),
        }
    }
}

/// Line-oriented question/answer over any reader and writer
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks until a non-empty answer is given. The answer is trimmed but
    /// otherwise not validated.
    pub fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        let mut line = String::new();
        for _ in 0..MAX_EMPTY_ANSWERS {
            write!(self.output, "{question}")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(PromptError::Closed);
            }
            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
        Err(PromptError::TooManyEmptyAnswers {
            question: question.trim().to_string(),
        })
    }
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}
