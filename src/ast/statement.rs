use super::Expression;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Shout(Expression),
    Enlist(EnlistStatement),
    Mission(Rc<MissionStatement>),
    Report(Expression),
    Recon(ReconStatement),
    While(WhileStatement),
    ForEach(ForEachStatement),
    Expr(Expression),
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Shout(expr) => write!(f, "shout {}", expr),
            Self::Enlist(stmt) => write!(f, "{}", stmt),
            Self::Mission(stmt) => write!(f, "{}", stmt),
            Self::Report(expr) => write!(f, "report {}", expr),
            Self::Recon(stmt) => write!(f, "{}secure.", stmt),
            Self::While(stmt) => write!(f, "{}", stmt),
            Self::ForEach(stmt) => write!(f, "{}", stmt),
            Self::Expr(expr) => write!(f, "{}", expr),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        for stmt in self.statements.iter() {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl From<Vec<Statement>> for BlockStatement {
    fn from(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnlistStatement {
    pub name: String,
    pub initializer: Expression,
}

impl Display for EnlistStatement {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "enlist {} = {}", self.name, self.initializer)
    }
}

/// A function declaration. Held behind `Rc` so mission values can share it.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionStatement {
    pub name: String,
    pub params: Vec<String>,
    pub body: BlockStatement,
}

impl Display for MissionStatement {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "mission {}", self.name)?;
        if !self.params.is_empty() {
            write!(f, " with {}", self.params.join(", "))?;
        }
        write!(f, ":\n{}retreat.", self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconStatement {
    pub condition: Expression,
    pub consequence: BlockStatement,
    pub alternative: Option<Alternative>,
}

/// Everything after a recon's first branch. One `secure.` closes the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Alternative {
    ElseRecon(Box<ReconStatement>),
    Fallback(BlockStatement),
}

impl Display for ReconStatement {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "recon {}:\n{}", self.condition, self.consequence)?;
        match &self.alternative {
            Some(Alternative::ElseRecon(next)) => write!(f, "else {}", next),
            Some(Alternative::Fallback(block)) => write!(f, "fallback position:\n{}", block),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: BlockStatement,
}

impl Display for WhileStatement {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "while under siege {}:\n{}break siege.",
            self.condition, self.body
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStatement {
    pub variable: String,
    pub iterable: Expression,
    pub body: BlockStatement,
}

impl Display for ForEachStatement {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "patrol through {} in {}:\n{}end patrol.",
            self.variable, self.iterable, self.body
        )
    }
}
