use crate::error_handling::*;
use crate::evaluating::*;
use crate::parsing::*;
use crate::scanning::*;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Notation of an input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    infix,
    postfix,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::infix => write!(f, "infix"),
            Mode::postfix => write!(f, "postfix"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    evaluate(Mode),
    quit,
}

impl FromStr for Command {
    type Err = CalcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "infix" => Ok(Command::evaluate(Mode::infix)),
            "postfix" => Ok(Command::evaluate(Mode::postfix)),
            "quit" => Ok(Command::quit),
            _ => Err(CalcError::unknown_command(s.into())),
        }
    }
}

/// Outcome of evaluating one line.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    postfix: Vec<Token>,
    results: Vec<f64>,
}

impl Evaluation {
    pub fn postfix(&self) -> &[Token] {
        &self.postfix
    }

    /// Values left on the stack, most recent first.
    pub fn results(&self) -> &[f64] {
        &self.results
    }

    /// The result of a well formed expression, which leaves exactly one value.
    pub fn value(&self) -> Option<f64> {
        match self.results.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    pub fn render_postfix(&self) -> String {
        let tokens: Vec<String> = self.postfix.iter().map(Token::to_string).collect();
        tokens.join(" ")
    }
}

/// One interactive session. The session owns its token source; every line
/// gets a fresh operator stack and value stack.
pub struct Calculator<S> {
    source: S,
}

impl<S: TokenSource> Calculator<S> {
    pub fn new(source: S) -> Self {
        Self{source}
    }

    /// Reads a prompt line naming what to do next. Blank lines are skipped
    /// and the end of input means quit.
    pub fn read_command(&mut self) -> Result<Command> {
        loop {
            let token = self.source.next()?;
            match token.kind() {
                TokenKind::end_of_file => return Ok(Command::quit),
                TokenKind::end_of_line => continue,
                _ => {},
            }
            skip_line(&mut self.source)?;
            return token.text()?.parse();
        }
    }

    /// Converts the next line from infix to postfix and evaluates it.
    pub fn infix(&mut self) -> Result<Evaluation> {
        let postfix = convert(&mut self.source)?;
        let results = evaluate(&postfix)?;
        Ok(Evaluation{postfix: postfix.into(), results})
    }

    /// Evaluates the next line as written.
    pub fn postfix(&mut self) -> Result<Evaluation> {
        let mut postfix = VecDeque::new();
        let results = evaluate_or_read(&mut postfix, &mut self.source)?;
        Ok(Evaluation{postfix: postfix.into(), results})
    }

    pub fn run(&mut self, mode: Mode) -> Result<Evaluation> {
        match mode {
            Mode::infix => self.infix(),
            Mode::postfix => self.postfix(),
        }
    }

    /// Checks that nothing but blank lines remains in the source.
    pub fn expect_end(&mut self) -> Result<()> {
        loop {
            let token = self.source.next()?;
            match token.kind() {
                TokenKind::end_of_file => return Ok(()),
                TokenKind::end_of_line => continue,
                _ => return Err(CalcError::did_not_expect(token.location().clone(), token.to_string())),
            }
        }
    }
}

/// Evaluates a single line of infix text.
pub fn evaluate_infix(text: &str) -> Result<Evaluation> {
    evaluate_text(text, Mode::infix)
}

/// Evaluates a single line of postfix text.
pub fn evaluate_postfix(text: &str) -> Result<Evaluation> {
    evaluate_text(text, Mode::postfix)
}

fn evaluate_text(text: &str, mode: Mode) -> Result<Evaluation> {
    let mut calculator = Calculator::new(Scanner::from_string(text));
    let evaluation = calculator.run(mode)?;
    calculator.expect_end()?;
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_infix() {
        let evaluation = evaluate_infix("(3 + 4) * 2").unwrap();
        assert_eq!(evaluation.render_postfix(), "3 4 + 2 *");
        assert_eq!(evaluation.value(), Some(14.0));

        assert_eq!(evaluate_infix("3 + 4 * 2").unwrap().value(), Some(11.0));
        assert_eq!(evaluate_infix("8 - 3 - 2").unwrap().value(), Some(3.0));
        assert_eq!(evaluate_infix("2 ^ 3 ^ 2").unwrap().value(), Some(512.0));
        assert_eq!(evaluate_infix("1.5E2 * 2").unwrap().value(), Some(300.0));
    }

    #[test]
    fn evaluates_postfix() {
        let evaluation = evaluate_postfix("3 4 + 2 *").unwrap();
        assert_eq!(evaluation.results(), &[14.0]);
        assert_eq!(evaluation.postfix().len(), 5);

        let evaluation = evaluate_postfix("1 2").unwrap();
        assert_eq!(evaluation.results(), &[2.0, 1.0]);
        assert_eq!(evaluation.value(), None);
    }

    #[test]
    fn malformed_input_is_reported() {
        assert_eq!(evaluate_infix("3 + 4)").unwrap_err().class(), ErrorClass::structural);
        assert_eq!(evaluate_infix("\"abc").unwrap_err().class(), ErrorClass::lexical);
        assert_eq!(evaluate_infix("3 +").unwrap_err().class(), ErrorClass::structural);
    }

    #[test]
    fn same_input_gives_same_result() {
        let input = "(1.5 + 2) / 4 - 3 * 2";
        let first = evaluate_infix(input).unwrap();
        let second = evaluate_infix(input).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.value(), Some(-5.125));
    }

    #[test]
    fn runs_a_session() {
        let input = "infix\n1 + 2\n\npostfix\n5 1 -\nquit\n";
        let mut calculator = Calculator::new(Scanner::from_string(input));

        assert_eq!(calculator.read_command().unwrap(), Command::evaluate(Mode::infix));
        assert_eq!(calculator.run(Mode::infix).unwrap().value(), Some(3.0));
        assert_eq!(calculator.read_command().unwrap(), Command::evaluate(Mode::postfix));
        assert_eq!(calculator.run(Mode::postfix).unwrap().value(), Some(4.0));
        assert_eq!(calculator.read_command().unwrap(), Command::quit);
        assert_eq!(calculator.read_command().unwrap(), Command::quit);
    }

    #[test]
    fn session_continues_after_errors() {
        let input = "prefix\ninfix\n(1 + 2))\ninfix\n4 * 4\n";
        let mut calculator = Calculator::new(Scanner::from_string(input));

        assert!(matches!(calculator.read_command(), Err(CalcError::unknown_command(_))));
        assert_eq!(calculator.read_command().unwrap(), Command::evaluate(Mode::infix));
        assert!(calculator.infix().is_err());
        assert_eq!(calculator.read_command().unwrap(), Command::evaluate(Mode::infix));
        assert_eq!(calculator.infix().unwrap().value(), Some(16.0));
        assert!(matches!(calculator.infix(), Err(CalcError::abrupt_end)));
    }

    #[test]
    fn text_must_be_a_single_line() {
        match evaluate_infix("1 + 1\n2") {
            Err(CalcError::did_not_expect(location, text)) => {
                assert_eq!((location.line, location.character, text.as_str()), (2, 1, "2"));
            },
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(evaluate_postfix("1 1 +\n\n+"), Err(CalcError::did_not_expect(..))));
        assert_eq!(evaluate_postfix("1 1 +\n\n").unwrap().value(), Some(2.0));
    }

    #[test]
    fn mode_words_round_trip() {
        for mode in [Mode::infix, Mode::postfix] {
            assert_eq!(mode.to_string().parse::<Command>().unwrap(), Command::evaluate(mode));
        }
    }
}
