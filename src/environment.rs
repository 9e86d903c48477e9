use crate::value::{Result, RuntimeError, Value};
use std::collections::HashMap;

/// Index of a scope record in the environment arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct Scope {
    store: HashMap<String, Value>,
    enclosing: Option<ScopeId>,
    // referenced by a mission value, so never reclaimed
    captured: bool,
}

/// Arena of lexical scopes. Scope 0 is the global scope. Popped slots are
/// kept on a free list and handed out again by `push`.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    free: Vec<usize>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            scopes: vec![Scope::default()],
            free: vec![],
        }
    }
}

impl Environment {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Opens a new scope nested in `enclosing`.
    pub fn push(&mut self, enclosing: ScopeId) -> ScopeId {
        let scope = Scope {
            enclosing: Some(enclosing),
            ..Default::default()
        };
        let id = match self.free.pop() {
            Some(index) => {
                self.scopes[index] = scope;
                ScopeId(index)
            }
            None => {
                self.scopes.push(scope);
                ScopeId(self.scopes.len() - 1)
            }
        };
        tracing::trace!(scope = id.0, enclosing = enclosing.0, "push scope");
        id
    }

    /// Finishes a scope. Its slot is reused unless a mission captured it;
    /// captured scopes live for the rest of the run.
    pub fn pop(&mut self, id: ScopeId) {
        if id == self.global() {
            return;
        }
        let scope = &mut self.scopes[id.0];
        if !scope.captured {
            // release the bindings
            *scope = Scope::default();
            self.free.push(id.0);
        }
        tracing::trace!(scope = id.0, live = self.live_scopes(), "pop scope");
    }

    /// Pins `id` and every scope enclosing it for the rest of the run.
    pub fn capture(&mut self, id: ScopeId) {
        let mut next = Some(id);
        while let Some(ScopeId(index)) = next {
            let scope = &mut self.scopes[index];
            if scope.captured {
                break;
            }
            scope.captured = true;
            next = scope.enclosing;
        }
    }

    pub fn define(&mut self, scope: ScopeId, name: &str, val: Value) {
        self.scopes[scope.0].store.insert(name.to_owned(), val);
    }

    pub fn get(&self, scope: ScopeId, name: &str) -> Result<Value> {
        let mut next = Some(scope);
        while let Some(ScopeId(index)) = next {
            let scope = &self.scopes[index];
            if let Some(val) = scope.store.get(name) {
                return Ok(val.clone());
            }
            next = scope.enclosing;
        }
        Err(RuntimeError::UndefinedVariable {
            name: name.to_owned(),
        })
    }

    pub fn assign(&mut self, scope: ScopeId, name: &str, val: Value) -> Result<Value> {
        let mut next = Some(scope);
        while let Some(ScopeId(index)) = next {
            let scope = &mut self.scopes[index];
            if let Some(slot) = scope.store.get_mut(name) {
                *slot = val.clone();
                return Ok(val);
            }
            next = scope.enclosing;
        }
        Err(RuntimeError::UndefinedVariable {
            name: name.to_owned(),
        })
    }

    /// Number of scopes in use, excluding free slots.
    pub fn live_scopes(&self) -> usize {
        self.scopes.len() - self.free.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shadowing_leaves_outer_binding() {
        let mut env = Environment::new();
        let global = env.global();
        env.define(global, "rank", Value::from("private"));

        let inner = env.push(global);
        env.define(inner, "rank", Value::from("general"));
        assert_eq!(env.get(inner, "rank"), Ok(Value::from("general")));
        env.pop(inner);

        assert_eq!(env.get(global, "rank"), Ok(Value::from("private")));
    }

    #[test]
    fn test_assign_walks_outward() {
        let mut env = Environment::new();
        let global = env.global();
        env.define(global, "ammo", Value::from(10.0));

        let block = env.push(global);
        let nested = env.push(block);
        assert_eq!(
            env.assign(nested, "ammo", Value::from(9.0)),
            Ok(Value::from(9.0))
        );
        assert_eq!(env.get(global, "ammo"), Ok(Value::from(9.0)));
    }

    #[test]
    fn test_assign_never_creates() {
        let mut env = Environment::new();
        let global = env.global();
        let err = env.assign(global, "ghost", Value::Null).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UndefinedVariable {
                name: "ghost".to_owned()
            }
        );
        assert!(env.get(global, "ghost").is_err());
    }

    #[test]
    fn test_pop_reclaims_uncaptured_scopes() {
        let mut env = Environment::new();
        let global = env.global();

        let block = env.push(global);
        let nested = env.push(block);
        assert_eq!(env.live_scopes(), 3);

        env.pop(nested);
        env.pop(block);
        assert_eq!(env.live_scopes(), 1);
    }

    #[test]
    fn test_captured_scope_survives_pop() {
        let mut env = Environment::new();
        let global = env.global();

        let block = env.push(global);
        env.define(block, "secret", Value::from(7.0));
        let nested = env.push(block);
        env.capture(nested);
        env.pop(nested);
        env.pop(block);

        assert_eq!(env.live_scopes(), 3);
        assert_eq!(env.get(nested, "secret"), Ok(Value::from(7.0)));

        // scopes opened afterwards are still reclaimed
        let later = env.push(global);
        env.pop(later);
        assert_eq!(env.live_scopes(), 3);
    }

    #[test]
    fn test_slots_below_a_captured_scope_are_reused() {
        let mut env = Environment::new();
        let global = env.global();

        for _ in 0..100 {
            let call = env.push(global);
            let block = env.push(call);
            env.capture(block);
            env.pop(block);
            env.pop(call);

            let iteration = env.push(global);
            let nested = env.push(iteration);
            env.pop(nested);
            env.pop(iteration);
        }

        // only the captured pairs remain
        assert_eq!(env.live_scopes(), 201);
    }

    #[test]
    fn test_reused_slot_starts_empty() {
        let mut env = Environment::new();
        let global = env.global();

        let first = env.push(global);
        env.define(first, "stale", Value::from(1.0));
        env.pop(first);

        let second = env.push(global);
        assert_eq!(second, first);
        assert!(env.get(second, "stale").is_err());
    }
}
