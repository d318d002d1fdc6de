use crate::error_handling::*;
use crate::scanning::*;
use log::{debug, trace};
use std::collections::VecDeque;

pub enum BinaryOperator {
    addition,
    subtraction,
    multiplication,
    division,
    exponentiation,
}

impl BinaryOperator {
    pub fn call(&self, left: f64, right: f64) -> f64 {
        use BinaryOperator::*;

        match self {
            addition => left + right,
            subtraction => left - right,
            multiplication => left * right,
            division => left / right,
            exponentiation => left.powf(right),
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        use BinaryOperator::*;
        match symbol {
            "+" => Some(addition),
            "-" => Some(subtraction),
            "*" => Some(multiplication),
            "/" => Some(division),
            "^" => Some(exponentiation),
            _ => None,
        }
    }
}

/// Reads the tokens of one line, as written, up to its end of line.
pub fn read_postfix<S: TokenSource + ?Sized>(source: &mut S) -> Result<VecDeque<Token>> {
    let mut expression = VecDeque::new();
    loop {
        let token = source.next()?;
        match token.kind() {
            TokenKind::end_of_line => return Ok(expression),
            TokenKind::end_of_file => return Err(CalcError::abrupt_end),
            _ => expression.push_back(token),
        }
    }
}

/// Evaluates a postfix expression. Every value left on the stack is
/// returned, most recently pushed first.
pub fn evaluate(expression: &VecDeque<Token>) -> Result<Vec<f64>> {
    let mut slots = Vec::<f64>::new();
    for token in expression {
        match token.kind() {
            TokenKind::number(value) => slots.push(*value),

            TokenKind::symbol(symbol) => {
                let operator = BinaryOperator::from_symbol(symbol)
                    .ok_or_else(|| CalcError::invalid_operator(token.location().clone(), symbol.clone()))?;
                let missing = || CalcError::missing_operand(token.location().clone(), symbol.clone());
                let right = slots.pop().ok_or_else(missing)?;
                let left = slots.pop().ok_or_else(missing)?;
                let result = operator.call(left, right);
                trace!("{left} {symbol} {right} = {result}");
                slots.push(result);
            },

            _ => return Err(CalcError::did_not_expect(token.location().clone(), token.to_string())),
        }
    }
    slots.reverse();
    debug!("results: {slots:?}");
    Ok(slots)
}

/// Evaluates `expression`. When it is empty it is first filled with a postfix
/// line read straight from `source`.
pub fn evaluate_or_read<S: TokenSource + ?Sized>(
    expression: &mut VecDeque<Token>,
    source: &mut S,
) -> Result<Vec<f64>> {
    if expression.is_empty() {
        *expression = read_postfix(source)?;
    }
    evaluate(expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> Result<Vec<f64>> {
        evaluate_or_read(&mut VecDeque::new(), &mut Scanner::from_string(input))
    }

    #[test]
    fn second_popped_is_the_left_operand() {
        assert_eq!(run("8 3 - 2 -").unwrap(), vec![3.0]);
        assert_eq!(run("1 4 /").unwrap(), vec![0.25]);
        assert_eq!(run("2 10 ^").unwrap(), vec![1024.0]);
    }

    #[test]
    fn reports_every_residual_value() {
        assert_eq!(run("1 2 3 +").unwrap(), vec![5.0, 1.0]);
        assert_eq!(run("3 -4").unwrap(), vec![-4.0, 3.0]);
        assert_eq!(run("").unwrap_err().class(), ErrorClass::input);
        assert!(run("\n").unwrap().is_empty());
    }

    #[test]
    fn division_by_zero_is_not_an_error() {
        assert_eq!(run("1 0 /").unwrap(), vec![f64::INFINITY]);
        assert!(run("0 0 /").unwrap()[0].is_nan());
        assert_eq!(run("1 0 / 1 +").unwrap(), vec![f64::INFINITY]);
    }

    #[test]
    fn too_few_operands() {
        let error = run("3 +").unwrap_err();
        assert!(matches!(error, CalcError::missing_operand(_, ref symbol) if symbol == "+"));
        assert!(matches!(run("*"), Err(CalcError::missing_operand(..))));
    }

    #[test]
    fn rejects_non_arithmetic_tokens() {
        assert!(matches!(run("1 2 %"), Err(CalcError::invalid_operator(..))));
        assert!(matches!(run("1 2 max"), Err(CalcError::invalid_operator(..))));
        assert!(matches!(run("1 true +"), Err(CalcError::did_not_expect(..))));
        assert!(matches!(run("\"x\""), Err(CalcError::did_not_expect(..))));
    }

    #[test]
    fn evaluates_a_given_expression_without_reading() {
        let mut expression = read_postfix(&mut Scanner::from_string("6 7 *")).unwrap();
        let mut unused = Scanner::from_string("1 +");
        assert_eq!(evaluate_or_read(&mut expression, &mut unused).unwrap(), vec![42.0]);
        assert_eq!(expression.len(), 3);
        assert_eq!(unused.next().unwrap().number().unwrap(), 1.0);
    }
}
