use crate::token::TokenKind;
use std::fmt::{Display, Formatter};
use strum_macros;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Identifier(String),
    Assign(AssignExpression),
    IndexAssign(IndexAssignExpression),
    Call(CallExpression),
    Interrogate(Box<Expression>),
    Binary(InfixExpression),
    Logical(LogicalExpression),
    /// Numeric negation, written as a prefix `expend`.
    Unary(Box<Expression>),
    Array(ArrayLiteral),
    Index(IndexExpression),
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{}", lit),
            Self::Identifier(name) => write!(f, "{}", name),
            Self::Assign(expr) => write!(f, "{}", expr),
            Self::IndexAssign(expr) => write!(f, "{}", expr),
            Self::Call(expr) => write!(f, "{}", expr),
            Self::Interrogate(prompt) => write!(f, "(interrogate {})", prompt),
            Self::Binary(expr) => write!(f, "{}", expr),
            Self::Logical(expr) => write!(f, "{}", expr),
            Self::Unary(right) => write!(f, "(expend {})", right),
            Self::Array(expr) => write!(f, "{}", expr),
            Self::Index(expr) => write!(f, "{}", expr),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Operator {
    #[strum(to_string = "reinforce")]
    Reinforce,
    #[strum(to_string = "expend")]
    Expend,
    #[strum(to_string = "amplify")]
    Amplify,
    #[strum(to_string = "decimate")]
    Decimate,
    #[strum(to_string = "outranks")]
    Outranks,
    #[strum(to_string = "outranks or holds")]
    OutranksOrHolds,
    #[strum(to_string = "is outranked by")]
    IsOutrankedBy,
    #[strum(to_string = "is outranked or held by")]
    IsOutrankedOrHeldBy,
    #[strum(to_string = "is equal to")]
    IsEqualTo,
    #[strum(to_string = "is not equal to")]
    IsNotEqualTo,
}

impl Operator {
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Reinforce => Self::Reinforce,
            TokenKind::Expend => Self::Expend,
            TokenKind::Amplify => Self::Amplify,
            TokenKind::Decimate => Self::Decimate,
            TokenKind::Outranks => Self::Outranks,
            TokenKind::OutranksOrHolds => Self::OutranksOrHolds,
            TokenKind::IsOutrankedBy => Self::IsOutrankedBy,
            TokenKind::IsOutrankedOrHeldBy => Self::IsOutrankedOrHeldBy,
            TokenKind::IsEqualTo => Self::IsEqualTo,
            TokenKind::IsNotEqualTo => Self::IsNotEqualTo,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum LogicalOperator {
    #[strum(to_string = "and also")]
    AndAlso,
    #[strum(to_string = "or else")]
    OrElse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: Operator,
    pub right: Box<Expression>,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    pub left: Box<Expression>,
    pub operator: LogicalOperator,
    pub right: Box<Expression>,
}

impl Display for LogicalExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpression {
    pub name: String,
    pub value: Box<Expression>,
}

impl Display for AssignExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexAssignExpression {
    pub target: Box<Expression>,
    pub index: Box<Expression>,
    pub value: Box<Expression>,
}

impl Display for IndexAssignExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}[{}] = {}", self.target, self.index, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub function: String,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "execute {}", self.function)?;
        if !self.arguments.is_empty() {
            let argument_names: Vec<String> =
                self.arguments.iter().map(Expression::to_string).collect();
            write!(f, " with {}", argument_names.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let element_names: Vec<String> = self.elements.iter().map(Expression::to_string).collect();

        write!(f, "[{}]", element_names.join(", "))
    }
}

impl From<Vec<Expression>> for ArrayLiteral {
    fn from(elements: Vec<Expression>) -> Self {
        Self { elements }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}
