use super::{Result, Value};
use crate::ast::MissionStatement;
use crate::environment::ScopeId;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

/// Host functions the evaluator is seeded with, keyed by name.
pub type HostFunctions = HashMap<String, HostFunction>;

#[derive(Debug, Clone)]
pub enum Function {
    Mission(MissionFunction),
    Host(HostFunction),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Self::Mission(mission) => &mission.declaration.name,
            Self::Host(host) => &host.name,
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mission(a), Self::Mission(b)) => {
                Rc::ptr_eq(&a.declaration, &b.declaration) && a.closure == b.closure
            }
            (Self::Host(a), Self::Host(b)) => {
                Rc::as_ptr(&a.callable) as *const () == Rc::as_ptr(&b.callable) as *const ()
            }
            _ => false,
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Mission(mission) => write!(f, "<mission {}>", mission.declaration.name),
            Self::Host(host) => write!(f, "<native mission {}>", host.name),
        }
    }
}

/// A user-defined mission closed over the scope it was declared in.
#[derive(Debug, Clone)]
pub struct MissionFunction {
    pub declaration: Rc<MissionStatement>,
    pub closure: ScopeId,
}

type Callable = dyn Fn(Vec<Value>) -> Result<Value>;

#[derive(Clone)]
pub struct HostFunction {
    pub name: String,
    callable: Rc<Callable>,
}

impl HostFunction {
    pub fn new<F>(name: &str, callable: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + 'static,
    {
        Self {
            name: name.to_owned(),
            callable: Rc::new(callable),
        }
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        (self.callable)(args)
    }
}

impl Debug for HostFunction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "HostFunction({})", self.name)
    }
}
