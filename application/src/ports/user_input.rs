//! User input port
//!
//! [`UserInputPort`] is an **input port**: the presentation layer reads the
//! next line from the terminal (or any other source) and hands it to the
//! session loop.

/// One read from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// A line of text, untrimmed
    Line(String),
    /// The input stream is closed (EOF or interrupt at the prompt)
    EndOfInput,
}

/// Source of user turns.
///
/// Reading may block; implementations run on the session's own task.
pub trait UserInputPort: Send {
    fn read_input(&mut self) -> UserInput;
}

/// Replays a fixed list of lines, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: std::collections::VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl UserInputPort for ScriptedInput {
    fn read_input(&mut self) -> UserInput {
        match self.lines.pop_front() {
            Some(line) => UserInput::Line(line),
            None => UserInput::EndOfInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_input_ends() {
        let mut input = ScriptedInput::new(["hello", "quit"]);
        assert_eq!(input.read_input(), UserInput::Line("hello".to_string()));
        assert_eq!(input.read_input(), UserInput::Line("quit".to_string()));
        assert_eq!(input.read_input(), UserInput::EndOfInput);
        assert_eq!(input.read_input(), UserInput::EndOfInput);
    }
}
