use crate::error_handling::*;
use crate::scanning::*;
use log::trace;
use std::collections::VecDeque;

/// Binding strength of an operator symbol. Unknown symbols bind loosest.
pub fn precedence(token: &Token) -> i32 {
    match token.kind() {
        TokenKind::symbol(symbol) => match symbol.as_str() {
            "+" | "-" => 2,
            "*" | "/" => 3,
            "^" => 4,
            _ => 0,
        },
        _ => 0,
    }
}

pub fn is_right_associative(token: &Token) -> bool {
    token.is_symbol("^")
}

pub enum StackNode {
    operator(Token),
    paren(SourceLocation),
}

/// Operator stack and output queue of the shunting-yard algorithm.
pub struct Yard {
    expression: VecDeque<Token>,
    stack: Vec<StackNode>,
}

impl Yard {
    pub fn new() -> Self {
        Self{expression: VecDeque::new(), stack: Vec::new()}
    }

    fn add_operand(&mut self, token: Token) {
        trace!("output {token}");
        self.expression.push_back(token);
    }

    fn pop_higher_operator(&mut self, incoming: &Token) -> Option<Token> {
        let top = match self.stack.last() {
            Some(StackNode::operator(top)) => top,
            _ => return None,
        };

        let outranks = precedence(top) > precedence(incoming)
            || (precedence(top) == precedence(incoming) && !is_right_associative(incoming));
        if !outranks {
            return None;
        }

        match self.stack.pop() {
            Some(StackNode::operator(operator)) => Some(operator),
            _ => None,
        }
    }

    fn add_operator(&mut self, token: Token) {
        while let Some(operator) = self.pop_higher_operator(&token) {
            self.add_operand(operator);
        }
        trace!("push {token}");
        self.stack.push(StackNode::operator(token));
    }

    fn add_left_paren(&mut self, token: Token) {
        self.stack.push(StackNode::paren(token.location().clone()));
    }

    fn add_right_paren(&mut self, token: Token) -> Result<()> {
        while let Some(stack_node) = self.stack.pop() {
            match stack_node {
                StackNode::paren(_) => return Ok(()),
                StackNode::operator(operator) => self.add_operand(operator),
            }
        }
        Err(CalcError::could_not_find(token.location().clone(), "("))
    }

    /// Feeds one infix token through the yard.
    pub fn push(&mut self, token: Token) -> Result<()> {
        match token.kind() {
            TokenKind::symbol(symbol) if symbol == "(" => self.add_left_paren(token),
            TokenKind::symbol(symbol) if symbol == ")" => self.add_right_paren(token)?,
            TokenKind::symbol(_) => self.add_operator(token),
            TokenKind::end_of_line | TokenKind::end_of_file => {
                return Err(CalcError::did_not_expect(token.location().clone(), token.to_string()));
            },
            _ => self.add_operand(token),
        }
        Ok(())
    }

    /// Unloads the remaining operators, top first, and returns the postfix
    /// expression.
    pub fn finish(mut self) -> Result<VecDeque<Token>> {
        while let Some(stack_node) = self.stack.pop() {
            match stack_node {
                StackNode::paren(location) => return Err(CalcError::could_not_find(location, ")")),
                StackNode::operator(operator) => self.add_operand(operator),
            }
        }
        Ok(self.expression)
    }
}

impl Default for Yard {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts the infix tokens of one line, up to its end of line, into
/// postfix order. After an unbalanced `)` the rest of the line is skipped.
pub fn convert<S: TokenSource + ?Sized>(source: &mut S) -> Result<VecDeque<Token>> {
    let mut yard = Yard::new();
    loop {
        let token = source.next()?;
        match token.kind() {
            TokenKind::end_of_line => break,
            TokenKind::end_of_file => return Err(CalcError::abrupt_end),
            _ => {},
        }
        if let Err(error) = yard.push(token) {
            skip_line(source)?;
            return Err(error);
        }
    }
    yard.finish()
}
