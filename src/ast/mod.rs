mod expression;
mod statement;
pub use expression::*;
pub use statement::*;

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Statement>,
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        for stmt in self.body.iter() {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_display() {
        let program = Program {
            body: vec![
                Statement::Enlist(EnlistStatement {
                    name: "soldiers".to_owned(),
                    initializer: Expression::Binary(InfixExpression {
                        left: Box::new(Expression::Literal(Literal::Number(100.0))),
                        operator: Operator::Reinforce,
                        right: Box::new(Expression::Identifier("reserves".to_owned())),
                    }),
                }),
                Statement::Mission(Rc::new(MissionStatement {
                    name: "salute".to_owned(),
                    params: vec!["rank".to_owned()],
                    body: BlockStatement {
                        statements: vec![Statement::Shout(Expression::Identifier(
                            "rank".to_owned(),
                        ))],
                    },
                })),
            ],
        };

        assert_eq!(
            format!("{}", program),
            "enlist soldiers = (100 reinforce reserves)\nmission salute with rank:\nshout rank\nretreat.\n"
        );
    }
}
