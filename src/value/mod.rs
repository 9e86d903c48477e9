use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

mod function;
pub use function::{Function, HostFunction, HostFunctions, MissionFunction};

mod runtime_error;
pub use runtime_error::{ErrorKind, RuntimeError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Arrays are shared: every holder sees in-place mutation.
pub type Array = Rc<RefCell<Vec<Value>>>;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Array(Array),
    Function(Function),
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.write_nested(f, &mut vec![])
    }
}

impl Value {
    /// `open` holds the arrays currently being printed; meeting one again
    /// prints `[...]` instead of recursing forever.
    fn write_nested(
        &self,
        f: &mut Formatter,
        open: &mut Vec<*const RefCell<Vec<Value>>>,
    ) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => write!(f, "null"),
            Self::Array(a) => {
                let ptr = Rc::as_ptr(a);
                if open.contains(&ptr) {
                    return write!(f, "[...]");
                }
                open.push(ptr);
                write!(f, "[")?;
                for (i, element) in a.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    crate::stack::ensure_sufficient_stack(|| element.write_nested(f, open))?;
                }
                open.pop();
                write!(f, "]")
            }
            Self::Function(func) => write!(f, "{}", func),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        // no negative zero
        "0".to_owned()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // exponent form always carries a sign: 1e+21, 1.5e-7
        let formatted = format!("{:e}", n);
        match formatted.find('e') {
            Some(at) if !formatted[at + 1..].starts_with('-') => {
                format!("{}e+{}", &formatted[..at], &formatted[at + 1..])
            }
            _ => formatted,
        }
    } else {
        n.to_string()
    }
}

/// Numbers, strings, booleans and null compare by value; arrays and
/// functions by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        s.to_owned().into()
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(a)))
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Self::Function(f)
    }
}

impl From<HostFunction> for Value {
    fn from(f: HostFunction) -> Self {
        Self::Function(Function::Host(f))
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "NUMBER",
            Self::String(_) => "STRING",
            Self::Boolean(_) => "BOOLEAN",
            Self::Null => "NULL",
            Self::Array(_) => "ARRAY",
            Self::Function(Function::Mission(_)) => "MISSION",
            Self::Function(Function::Host(_)) => "NATIVE_MISSION",
        }
    }

    pub fn truth_value(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Null => false,
            _ => true,
        }
    }
}
