use crate::ast::{
    self, Alternative, BlockStatement, Expression, ForEachStatement, LogicalOperator, Program,
    ReconStatement, Statement, WhileStatement,
};
use crate::builtins::expect_position;
use crate::environment::{Environment, ScopeId};
use crate::stack::ensure_sufficient_stack;
use crate::value::*;
use std::io::Write;
use std::rc::Rc;


/// Nested mission calls allowed before a run fails with `CallDepthExceeded`.
pub const MAX_CALL_DEPTH: usize = 1000;

/// How a statement finished. `report` travels up as a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Completed,
    Report(Value),
}

/// Runs `program` against a fresh global scope seeded with `host_functions`.
pub fn interpret(
    program: &Program,
    host_functions: HostFunctions,
    output: &mut dyn Write,
) -> Result<()> {
    Interpreter::new(host_functions, output).run(program)
}

pub struct Interpreter<'w> {
    env: Environment,
    current: ScopeId,
    depth: usize,
    output: &'w mut dyn Write,
}

impl<'w> Interpreter<'w> {
    pub fn new(host_functions: HostFunctions, output: &'w mut dyn Write) -> Self {
        let mut env = Environment::new();
        let global = env.global();
        for (name, function) in host_functions.into_iter() {
            env.define(global, &name, function.into());
        }
        Self {
            env,
            current: global,
            depth: 0,
            output,
        }
    }

    pub fn run(&mut self, program: &Program) -> Result<()> {
        tracing::debug!(statements = program.body.len(), "interpreting program");
        match self.execute_statements(&program.body)? {
            Flow::Completed => {
                tracing::debug!(live_scopes = self.env.live_scopes(), "run finished");
                Ok(())
            }
            Flow::Report(_) => Err(RuntimeError::ReportOutsideMission),
        }
    }

    fn execute_statements(&mut self, statements: &[Statement]) -> Result<Flow> {
        for stmt in statements.iter() {
            if let flow @ Flow::Report(_) = self.execute(stmt)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Completed)
    }

    /// Runs `statements` in `scope`, then restores the previous scope and
    /// pops `scope` however the block exits.
    fn execute_block(&mut self, statements: &[Statement], scope: ScopeId) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.current, scope);
        let result = self.execute_statements(statements);
        self.current = previous;
        self.env.pop(scope);
        result
    }

    fn execute_scoped(&mut self, block: &BlockStatement) -> Result<Flow> {
        let scope = self.env.push(self.current);
        self.execute_block(&block.statements, scope)
    }

    fn execute(&mut self, stmt: &Statement) -> Result<Flow> {
        match stmt {
            Statement::Shout(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value).map_err(|e| RuntimeError::Output {
                    message: e.to_string(),
                })?;
            }
            Statement::Enlist(stmt) => {
                let value = self.evaluate(&stmt.initializer)?;
                self.env.define(self.current, &stmt.name, value);
            }
            Statement::Mission(declaration) => {
                self.env.capture(self.current);
                let mission = MissionFunction {
                    declaration: Rc::clone(declaration),
                    closure: self.current,
                };
                self.env
                    .define(self.current, &declaration.name, Function::Mission(mission).into());
            }
            Statement::Report(expr) => return Ok(Flow::Report(self.evaluate(expr)?)),
            Statement::Recon(stmt) => return self.execute_recon(stmt),
            Statement::While(stmt) => return self.execute_while(stmt),
            Statement::ForEach(stmt) => return self.execute_for_each(stmt),
            Statement::Expr(expr) => {
                self.evaluate(expr)?;
            }
        }
        Ok(Flow::Completed)
    }

    fn execute_recon(&mut self, recon: &ReconStatement) -> Result<Flow> {
        if self.evaluate(&recon.condition)?.truth_value() {
            return self.execute_scoped(&recon.consequence);
        }
        match &recon.alternative {
            Some(Alternative::ElseRecon(next)) => self.execute_recon(next),
            Some(Alternative::Fallback(block)) => self.execute_scoped(block),
            None => Ok(Flow::Completed),
        }
    }

    fn execute_while(&mut self, stmt: &WhileStatement) -> Result<Flow> {
        while self.evaluate(&stmt.condition)?.truth_value() {
            if let flow @ Flow::Report(_) = self.execute_scoped(&stmt.body)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Completed)
    }

    fn execute_for_each(&mut self, stmt: &ForEachStatement) -> Result<Flow> {
        let array = match self.evaluate(&stmt.iterable)? {
            Value::Array(array) => array,
            obj => {
                return Err(RuntimeError::NotIterable {
                    type_name: obj.type_name(),
                })
            }
        };
        // elements added or removed by the body are not visited
        let snapshot: Vec<Value> = array.borrow().clone();

        for element in snapshot.into_iter() {
            let scope = self.env.push(self.current);
            self.env.define(scope, &stmt.variable, element);
            if let flow @ Flow::Report(_) = self.execute_block(&stmt.body.statements, scope)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Completed)
    }

    fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        ensure_sufficient_stack(|| self.evaluate_expression(expr))
    }

    fn evaluate_expression(&mut self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Literal(ast::Literal::Number(n)) => Ok(Value::Number(*n)),
            Expression::Literal(ast::Literal::String(s)) => Ok(Value::String(s.clone())),
            Expression::Identifier(name) => self.env.get(self.current, name),
            Expression::Assign(assign) => {
                let value = self.evaluate(&assign.value)?;
                self.env.assign(self.current, &assign.name, value)
            }
            Expression::IndexAssign(assign) => {
                let target = self.evaluate(&assign.target)?;
                let index = self.evaluate(&assign.index)?;
                let value = self.evaluate(&assign.value)?;
                eval_index_assignment(target, index, value)
            }
            Expression::Call(call) => {
                let callee = self.env.get(self.current, &call.function)?;
                let args = self.evaluate_expressions(&call.arguments)?;
                self.call_function(&call.function, callee, args)
            }
            Expression::Interrogate(prompt) => {
                let prompt = self.evaluate(prompt)?;
                match self.env.get(self.current, "interrogate")? {
                    Value::Function(Function::Host(host)) => host.call(vec![prompt]),
                    obj => Err(RuntimeError::NotNative {
                        name: "interrogate".to_owned(),
                        type_name: obj.type_name(),
                    }),
                }
            }
            Expression::Binary(infix) => {
                let left = self.evaluate(&infix.left)?;
                let right = self.evaluate(&infix.right)?;
                eval_infix_expression(infix.operator, left, right)
            }
            Expression::Logical(logical) => {
                let left = self.evaluate(&logical.left)?;
                let decided = match logical.operator {
                    LogicalOperator::AndAlso => !left.truth_value(),
                    LogicalOperator::OrElse => left.truth_value(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(&logical.right)
                }
            }
            Expression::Unary(right) => match self.evaluate(right)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                obj => Err(RuntimeError::UnsupportedNegation {
                    type_name: obj.type_name(),
                }),
            },
            Expression::Array(array) => Ok(self.evaluate_expressions(&array.elements)?.into()),
            Expression::Index(index) => {
                let left = self.evaluate(&index.left)?;
                let index = self.evaluate(&index.index)?;
                eval_index_expression(left, index)
            }
        }
    }

    fn evaluate_expressions(&mut self, exprs: &[Expression]) -> Result<Vec<Value>> {
        exprs.iter().map(|expr| self.evaluate(expr)).collect()
    }

    fn call_function(&mut self, name: &str, callee: Value, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Function(Function::Mission(mission)) => self.call_mission(&mission, args),
            Value::Function(Function::Host(host)) => {
                tracing::trace!(name = %host.name, args = args.len(), "host call");
                host.call(args)
            }
            obj => Err(RuntimeError::NotAFunction {
                name: name.to_owned(),
                type_name: obj.type_name(),
            }),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(mission = %mission.declaration.name))]
    fn call_mission(&mut self, mission: &MissionFunction, args: Vec<Value>) -> Result<Value> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
            });
        }
        self.depth += 1;
        let result = self.run_mission(mission, args);
        self.depth -= 1;
        result
    }

    fn run_mission(&mut self, mission: &MissionFunction, args: Vec<Value>) -> Result<Value> {
        let declaration = Rc::clone(&mission.declaration);
        let scope = self.env.push(mission.closure);

        // missing arguments bind to null, extras are dropped
        let mut args = args.into_iter();
        for param in declaration.params.iter() {
            self.env.define(scope, param, args.next().unwrap_or_default());
        }

        match self.execute_block(&declaration.body.statements, scope)? {
            Flow::Report(value) => Ok(value),
            Flow::Completed => Ok(Value::Null),
        }
    }
}

fn eval_infix_expression(operator: ast::Operator, left: Value, right: Value) -> Result<Value> {
    use ast::Operator::*;
    match (operator, &left, &right) {
        (IsEqualTo, _, _) => Ok((left == right).into()),
        (IsNotEqualTo, _, _) => Ok((left != right).into()),
        (_, Value::Number(x), Value::Number(y)) => Ok(eval_number_infix_expression(operator, *x, *y)),
        (Reinforce, Value::String(_), _) | (Reinforce, _, Value::String(_)) => {
            Ok(format!("{}{}", left, right).into())
        }
        (_, Value::String(x), Value::String(y)) => eval_string_comparison(operator, x, y)
            .map(Value::from)
            .ok_or(RuntimeError::UnsupportedOperands {
                left: left.type_name(),
                operator,
                right: right.type_name(),
            }),
        _ => Err(RuntimeError::UnsupportedOperands {
            left: left.type_name(),
            operator,
            right: right.type_name(),
        }),
    }
}

fn eval_number_infix_expression(operator: ast::Operator, left: f64, right: f64) -> Value {
    use ast::Operator::*;
    match operator {
        Reinforce => Value::Number(left + right),
        Expend => Value::Number(left - right),
        Amplify => Value::Number(left * right),
        Decimate => Value::Number(left / right),
        Outranks => (left > right).into(),
        OutranksOrHolds => (left >= right).into(),
        IsOutrankedBy => (left < right).into(),
        IsOutrankedOrHeldBy => (left <= right).into(),
        IsEqualTo => (left == right).into(),
        IsNotEqualTo => (left != right).into(),
    }
}

fn eval_string_comparison(operator: ast::Operator, left: &str, right: &str) -> Option<bool> {
    use ast::Operator::*;
    match operator {
        Outranks => Some(left > right),
        OutranksOrHolds => Some(left >= right),
        IsOutrankedBy => Some(left < right),
        IsOutrankedOrHeldBy => Some(left <= right),
        _ => None,
    }
}

fn expect_indexable(value: Value) -> Result<Array> {
    match value {
        Value::Array(array) => Ok(array),
        obj => Err(RuntimeError::NotIndexable {
            type_name: obj.type_name(),
        }),
    }
}

fn eval_index_expression(left: Value, index: Value) -> Result<Value> {
    let array = expect_indexable(left)?;
    let elements = array.borrow();
    let position = expect_position(&index, elements.len())?;
    let element = elements[position].clone();
    Ok(element)
}

fn eval_index_assignment(target: Value, index: Value, value: Value) -> Result<Value> {
    let array = expect_indexable(target)?;
    let mut elements = array.borrow_mut();
    let position = expect_position(&index, elements.len())?;
    elements[position] = value.clone();
    Ok(value)
}
