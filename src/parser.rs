use crate::ast::{
    Alternative, ArrayLiteral, AssignExpression, BlockStatement, CallExpression, EnlistStatement,
    Expression, ForEachStatement, IndexAssignExpression, IndexExpression, InfixExpression,
    Literal, LogicalExpression, LogicalOperator, MissionStatement, Operator, Program,
    ReconStatement, Statement, WhileStatement,
};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenKind, TokenType};
use custom_error::custom_error;
use std::rc::Rc;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub ParseError{message: String, line: usize, column: usize} = "{message} at line {line}, column {column}"
}

pub type Result<T> = std::result::Result<T, ParseError>;

static END_OF_INPUT: Token = Token {
    kind: TokenKind::Eof,
    line: 0,
    column: 0,
};

pub fn parse(tokens: &[Token]) -> Result<Program> {
    Parser::new(tokens).parse_program()
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse_program(mut self) -> Result<Program> {
        let mut program = Program::default();

        while !self.cur_token().is(TokenType::Eof) {
            program.body.push(self.parse_statement()?);
        }

        tracing::debug!(statements = program.body.len(), "parsed program");
        Ok(program)
    }

    fn cur_token(&self) -> &'a Token {
        self.tokens.get(self.current).unwrap_or(&END_OF_INPUT)
    }

    fn next_token(&mut self) -> &'a Token {
        let token = self.cur_token();
        if !token.is(TokenType::Eof) {
            self.current += 1;
        }
        token
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.cur_token().is(token_type)
    }

    fn check_any(&self, token_types: &[TokenType]) -> bool {
        token_types.iter().any(|t| self.check(*t))
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: TokenType, message: &str) -> Result<&'a Token> {
        if self.check(expected) {
            Ok(self.next_token())
        } else {
            Err(self.error_at(self.cur_token(), message))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<String> {
        match &self.expect(TokenType::Identifier, message)?.kind {
            TokenKind::Identifier(name) => Ok(name.clone()),
            _ => Err(self.error_at(self.cur_token(), message)),
        }
    }

    fn error_at(&self, token: &Token, message: &str) -> ParseError {
        ParseError {
            message: format!("{}, found '{}'", message, token),
            line: token.line,
            column: token.column,
        }
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.cur_token().token_type() {
            TokenType::Shout => {
                self.next_token();
                Ok(Statement::Shout(self.parse_expression()?))
            }
            TokenType::Enlist => self.parse_enlist_statement().map(Statement::Enlist),
            TokenType::Mission => self
                .parse_mission_statement()
                .map(|stmt| Statement::Mission(Rc::new(stmt))),
            TokenType::Report => {
                self.next_token();
                Ok(Statement::Report(self.parse_expression()?))
            }
            TokenType::Recon => {
                self.next_token();
                self.parse_recon_statement(true).map(Statement::Recon)
            }
            TokenType::WhileUnderSiege => self.parse_while_statement().map(Statement::While),
            TokenType::PatrolThrough => self.parse_for_each_statement().map(Statement::ForEach),
            _ => Ok(Statement::Expr(self.parse_expression()?)),
        }
    }

    fn parse_enlist_statement(&mut self) -> Result<EnlistStatement> {
        self.next_token();
        let name = self.expect_identifier("expected variable name after 'enlist'")?;
        self.expect(TokenType::Assign, "expected '=' after variable name")?;
        let initializer = self.parse_expression()?;

        Ok(EnlistStatement { name, initializer })
    }

    fn parse_mission_statement(&mut self) -> Result<MissionStatement> {
        self.next_token();
        let name = self.expect_identifier("expected mission name")?;

        let mut params = vec![];
        if self.match_token(TokenType::With) && !self.check(TokenType::Colon) {
            loop {
                params.push(self.expect_identifier("expected parameter name")?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenType::Colon, "expected ':' before mission body")?;
        let body = self.parse_block(&[TokenType::Retreat])?;
        self.expect(TokenType::Retreat, "expected 'retreat.' after mission body")?;
        self.expect(TokenType::Period, "expected '.' after 'retreat'")?;

        Ok(MissionStatement { name, params, body })
    }

    /// Parses a recon branch after its leading keyword. Only the outermost
    /// call consumes the `secure.` that closes the whole chain.
    fn parse_recon_statement(&mut self, consume_secure: bool) -> Result<ReconStatement> {
        let condition = self.parse_expression()?;
        self.expect(TokenType::Colon, "expected ':' after recon condition")?;
        let consequence = self.parse_block(&[
            TokenType::Secure,
            TokenType::ElseRecon,
            TokenType::FallbackPosition,
        ])?;

        let alternative = if self.match_token(TokenType::ElseRecon) {
            Some(Alternative::ElseRecon(Box::new(
                self.parse_recon_statement(false)?,
            )))
        } else if self.match_token(TokenType::FallbackPosition) {
            self.expect(TokenType::Colon, "expected ':' after 'fallback position'")?;
            Some(Alternative::Fallback(self.parse_block(&[TokenType::Secure])?))
        } else {
            None
        };

        if consume_secure {
            self.expect(TokenType::Secure, "expected 'secure.' after recon block")?;
            self.expect(TokenType::Period, "expected '.' after 'secure'")?;
        }

        Ok(ReconStatement {
            condition,
            consequence,
            alternative,
        })
    }

    fn parse_while_statement(&mut self) -> Result<WhileStatement> {
        self.next_token();
        let condition = self.parse_expression()?;
        self.expect(
            TokenType::Colon,
            "expected ':' after 'while under siege' condition",
        )?;
        let body = self.parse_block(&[TokenType::BreakSiege])?;
        self.expect(TokenType::BreakSiege, "expected 'break siege.' after loop body")?;
        self.expect(TokenType::Period, "expected '.' after 'break siege'")?;

        Ok(WhileStatement { condition, body })
    }

    fn parse_for_each_statement(&mut self) -> Result<ForEachStatement> {
        self.next_token();
        let variable = self.expect_identifier("expected variable name after 'patrol through'")?;
        self.expect(TokenType::In, "expected 'in' after patrol variable")?;
        let iterable = self.parse_expression()?;
        self.expect(TokenType::Colon, "expected ':' after patrol expression")?;
        let body = self.parse_block(&[TokenType::EndPatrol])?;
        self.expect(TokenType::EndPatrol, "expected 'end patrol.' after patrol body")?;
        self.expect(TokenType::Period, "expected '.' after 'end patrol'")?;

        Ok(ForEachStatement {
            variable,
            iterable,
            body,
        })
    }

    /// Statements up to (not including) one of `terminators` or end of input.
    fn parse_block(&mut self, terminators: &[TokenType]) -> Result<BlockStatement> {
        let mut statements = vec![];
        while !self.check_any(terminators) && !self.check(TokenType::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(statements.into())
    }

    pub fn parse_expression(&mut self) -> Result<Expression> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    fn parse_assignment(&mut self) -> Result<Expression> {
        let target = self.parse_or()?;

        if !self.check(TokenType::Assign) {
            return Ok(target);
        }
        let equals = self.next_token();
        let value = Box::new(self.parse_assignment()?);

        match target {
            Expression::Identifier(name) => Ok(Expression::Assign(AssignExpression { name, value })),
            Expression::Index(IndexExpression { left, index }) => {
                Ok(Expression::IndexAssign(IndexAssignExpression {
                    target: left,
                    index,
                    value,
                }))
            }
            _ => Err(self.error_at(equals, "invalid assignment target")),
        }
    }

    fn parse_or(&mut self) -> Result<Expression> {
        self.parse_logical(TokenType::OrElse, LogicalOperator::OrElse, Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        self.parse_logical(
            TokenType::AndAlso,
            LogicalOperator::AndAlso,
            Self::parse_equality,
        )
    }

    fn parse_logical(
        &mut self,
        token_type: TokenType,
        operator: LogicalOperator,
        next: fn(&mut Self) -> Result<Expression>,
    ) -> Result<Expression> {
        let mut left = next(self)?;
        while self.match_token(token_type) {
            let right = next(self)?;
            left = Expression::Logical(LogicalExpression {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        self.parse_binary(
            &[TokenType::IsEqualTo, TokenType::IsNotEqualTo],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        self.parse_binary(
            &[
                TokenType::Outranks,
                TokenType::OutranksOrHolds,
                TokenType::IsOutrankedBy,
                TokenType::IsOutrankedOrHeldBy,
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expression> {
        self.parse_binary(
            &[TokenType::Reinforce, TokenType::Expend],
            Self::parse_factor,
        )
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        self.parse_binary(
            &[TokenType::Amplify, TokenType::Decimate],
            Self::parse_unary,
        )
    }

    /// One left-associative precedence level.
    fn parse_binary(
        &mut self,
        operators: &[TokenType],
        next: fn(&mut Self) -> Result<Expression>,
    ) -> Result<Expression> {
        let mut left = next(self)?;

        while self.check_any(operators) {
            let token = self.next_token();
            let operator = match Operator::from_token(&token.kind) {
                Some(operator) => operator,
                None => return Err(self.error_at(token, "expected operator")),
            };
            let right = next(self)?;
            left = Expression::Binary(InfixExpression {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        if self.match_token(TokenType::Expend) {
            return Ok(Expression::Unary(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let token = self.cur_token();
        let expr = match &token.kind {
            TokenKind::Number(n) => {
                self.next_token();
                Expression::Literal(Literal::Number(*n))
            }
            TokenKind::String(s) => {
                self.next_token();
                Expression::Literal(Literal::String(s.clone()))
            }
            TokenKind::Identifier(name) => {
                self.next_token();
                Expression::Identifier(name.clone())
            }
            TokenKind::LBracket => {
                self.next_token();
                Expression::Array(self.parse_array_literal()?)
            }
            TokenKind::Execute => {
                self.next_token();
                Expression::Call(self.parse_call_expression()?)
            }
            TokenKind::Interrogate => {
                self.next_token();
                return Ok(Expression::Interrogate(Box::new(self.parse_expression()?)));
            }
            _ => return Err(self.error_at(token, "expected expression")),
        };

        self.parse_postfix(expr)
    }

    fn parse_array_literal(&mut self) -> Result<ArrayLiteral> {
        let elements = if self.check(TokenType::RBracket) {
            vec![]
        } else {
            self.parse_expression_list()?
        };
        self.expect(TokenType::RBracket, "expected ']' after array elements")?;
        Ok(elements.into())
    }

    fn parse_call_expression(&mut self) -> Result<CallExpression> {
        let function = self.expect_identifier("expected mission name after 'execute'")?;
        let arguments = if self.match_token(TokenType::With) {
            self.parse_expression_list()?
        } else {
            vec![]
        };
        Ok(CallExpression {
            function,
            arguments,
        })
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut list = vec![self.parse_expression()?];
        while self.match_token(TokenType::Comma) {
            list.push(self.parse_expression()?);
        }
        Ok(list)
    }

    fn parse_postfix(&mut self, mut expr: Expression) -> Result<Expression> {
        while self.match_token(TokenType::LBracket) {
            let index = self.parse_expression()?;
            self.expect(TokenType::RBracket, "expected ']' after array index")?;
            expr = Expression::Index(IndexExpression {
                left: Box::new(expr),
                index: Box::new(index),
            });
        }
        Ok(expr)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn parse_input(input: &str) -> Program {
        parse(&tokenize(input).expect("Lex errors found")).expect("Parse errors found")
    }

    fn parse_err(input: &str) -> ParseError {
        parse(&tokenize(input).expect("Lex errors found")).unwrap_err()
    }

    fn ident(name: &str) -> Box<Expression> {
        Box::new(Expression::Identifier(name.to_owned()))
    }

    fn number(n: f64) -> Box<Expression> {
        Box::new(Expression::Literal(Literal::Number(n)))
    }

    #[test]
    fn test_enlist_statements() {
        let program = parse_input(
            "
enlist x = 5
enlist y = 10
enlist foobar = 838383
",
        );

        assert_eq!(program.body.len(), 3);

        let cases = [("x", 5.0), ("y", 10.0), ("foobar", 838383.0)];

        for (stmt, (name, value)) in program.body.iter().zip(cases.iter()) {
            assert_eq!(
                stmt,
                &Statement::Enlist(EnlistStatement {
                    name: (*name).to_owned(),
                    initializer: *number(*value),
                })
            );
        }
    }

    #[test]
    fn test_operator_precedence() {
        let cases = vec![
            ("expend a amplify b", "((expend a) amplify b)"),
            ("a reinforce b expend c", "((a reinforce b) expend c)"),
            ("a amplify b decimate c", "((a amplify b) decimate c)"),
            ("a reinforce b amplify c", "(a reinforce (b amplify c))"),
            (
                "a reinforce b outranks c expend d",
                "((a reinforce b) outranks (c expend d))",
            ),
            (
                "a outranks b is equal to c is outranked by d",
                "((a outranks b) is equal to (c is outranked by d))",
            ),
            (
                "a or else b and also c",
                "(a or else (b and also c))",
            ),
            (
                "a is not equal to b and also c outranks or holds d",
                "((a is not equal to b) and also (c outranks or holds d))",
            ),
            ("x = y = 3", "x = y = 3"),
            ("grid[1][2]", "((grid[1])[2])"),
            ("grid[1][2] = 0", "(grid[1])[2] = 0"),
            (
                "execute add with 1, 2 amplify 3",
                "execute add with 1, (2 amplify 3)",
            ),
            ("[1, \"two\", [3]]", "[1, \"two\", [3]]"),
            ("interrogate \"name? \"", "(interrogate \"name? \")"),
            ("expend expend 4", "(expend (expend 4))"),
        ];

        for (input, expected) in cases.into_iter() {
            let program = parse_input(input);
            assert_eq!(program.body.len(), 1, "input: {}", input);
            assert_eq!(program.body[0].to_string(), expected);
        }
    }

    #[test]
    fn test_mission_statement() {
        let program = parse_input(
            "mission add with a, b:
    report a reinforce b
retreat.
mission noop:
retreat.",
        );

        assert_eq!(
            program.body[0],
            Statement::Mission(Rc::new(MissionStatement {
                name: "add".to_owned(),
                params: vec!["a".to_owned(), "b".to_owned()],
                body: vec![Statement::Report(Expression::Binary(InfixExpression {
                    left: ident("a"),
                    operator: Operator::Reinforce,
                    right: ident("b"),
                }))]
                .into(),
            }))
        );
        assert_eq!(
            program.body[1],
            Statement::Mission(Rc::new(MissionStatement {
                name: "noop".to_owned(),
                params: vec![],
                body: BlockStatement::default(),
            }))
        );
    }

    #[test]
    fn test_recon_chain_single_secure() {
        let program = parse_input(
            "recon a:
    shout 1
else recon b:
    shout 2
else recon c:
    shout 3
fallback position:
    shout 4
secure.
shout 5",
        );

        assert_eq!(program.body.len(), 2);

        let shout = |n: f64| -> BlockStatement { vec![Statement::Shout(*number(n))].into() };
        let expected = Statement::Recon(ReconStatement {
            condition: *ident("a"),
            consequence: shout(1.0),
            alternative: Some(Alternative::ElseRecon(Box::new(ReconStatement {
                condition: *ident("b"),
                consequence: shout(2.0),
                alternative: Some(Alternative::ElseRecon(Box::new(ReconStatement {
                    condition: *ident("c"),
                    consequence: shout(3.0),
                    alternative: Some(Alternative::Fallback(shout(4.0))),
                }))),
            }))),
        });
        assert_eq!(program.body[0], expected);
        assert_eq!(program.body[1], Statement::Shout(*number(5.0)));
    }

    #[test]
    fn test_loops() {
        let program = parse_input(
            "while under siege countdown outranks 0:
    countdown = countdown expend 1
break siege.
patrol through unit in squad:
    shout unit
end patrol.",
        );

        assert_eq!(
            program.body[0],
            Statement::While(WhileStatement {
                condition: Expression::Binary(InfixExpression {
                    left: ident("countdown"),
                    operator: Operator::Outranks,
                    right: number(0.0),
                }),
                body: vec![Statement::Expr(Expression::Assign(AssignExpression {
                    name: "countdown".to_owned(),
                    value: Box::new(Expression::Binary(InfixExpression {
                        left: ident("countdown"),
                        operator: Operator::Expend,
                        right: number(1.0),
                    })),
                }))]
                .into(),
            })
        );
        assert_eq!(
            program.body[1],
            Statement::ForEach(ForEachStatement {
                variable: "unit".to_owned(),
                iterable: *ident("squad"),
                body: vec![Statement::Shout(*ident("unit"))].into(),
            })
        );
    }

    #[test]
    fn test_parse_is_repeatable() {
        let tokens = tokenize(
            "enlist squad = [\"Alpha\", \"Bravo\"]
mission roll with s:
    patrol through u in s:
        recon u is equal to \"Bravo\": report u secure.
    end patrol.
retreat.
shout execute roll with squad",
        )
        .expect("Lex errors found");

        let first = parse(&tokens).expect("Parse errors found");
        let second = parse(&tokens).expect("Parse errors found");
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_errors() {
        let cases = vec![
            (
                "5 = 3",
                "invalid assignment target, found '='",
                1,
                3,
            ),
            (
                "enlist = 3",
                "expected variable name after 'enlist', found '='",
                1,
                8,
            ),
            (
                "recon x: shout 1",
                "expected 'secure.' after recon block, found 'end of input'",
                1,
                17,
            ),
            (
                "mission m:\n  shout 1\nretreat",
                "expected '.' after 'retreat', found 'end of input'",
                3,
                8,
            ),
            ("shout ]", "expected expression, found ']'", 1, 7),
            (
                "patrol through u squad: end patrol.",
                "expected 'in' after patrol variable, found 'squad'",
                1,
                18,
            ),
        ];

        for (input, message, line, column) in cases.into_iter() {
            let err = parse_err(input);
            assert_eq!(
                err,
                ParseError {
                    message: message.to_owned(),
                    line,
                    column,
                },
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_tokens_without_eof() {
        let tokens = vec![
            Token::new(TokenKind::Shout, 1, 1),
            Token::new(TokenKind::Number(1.0), 1, 7),
        ];
        let program = parse(&tokens).expect("Parse errors found");
        assert_eq!(program.body, vec![Statement::Shout(*number(1.0))]);
    }
}
