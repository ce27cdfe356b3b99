use super::value::Value;
use compact_str::{CompactString, ToCompactString};
use std::collections::HashMap;

const HANDLE_MSG: &str = "Scope handles are only issued by this environment and stay live while reachable.";

/// Stable handle to one scope of an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeRef(u32);

#[derive(Debug, Default)]
struct Scope {
    values: HashMap<CompactString, Value>,
    parent: Option<ScopeRef>,
}

/// Arena of chained scopes.
///
/// Scopes refer to their parent by [`ScopeRef`] rather than by pointer, so
/// closures that capture their own defining scope never form reference cycles.
/// The global scope is created with the environment, has no parent, and is never
/// replaced or collected.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Option<Scope>>,
    free: Vec<ScopeRef>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Some(Scope::default())],
            free: Vec::new(),
        }
    }

    pub fn global(&self) -> ScopeRef {
        ScopeRef(0)
    }

    pub fn new_scope(&mut self, parent: ScopeRef) -> ScopeRef {
        let scope = Scope {
            values: HashMap::new(),
            parent: Some(parent),
        };
        match self.free.pop() {
            Some(handle) => {
                self.scopes[handle.0 as usize] = Some(scope);
                handle
            }
            None => {
                self.scopes.push(Some(scope));
                ScopeRef((self.scopes.len() - 1) as u32)
            }
        }
    }

    fn get(&self, scope: ScopeRef) -> Option<&Scope> {
        self.scopes.get(scope.0 as usize)?.as_ref()
    }

    /// Looks `name` up starting at `scope` and walking outwards.
    pub fn access(&self, scope: ScopeRef, name: &str) -> Option<Value> {
        let mut current = Some(scope);
        while let Some(handle) = current {
            let scope = self.get(handle)?;
            if let Some(value) = scope.values.get(name) {
                return Some(value.clone());
            }
            current = scope.parent;
        }
        None
    }

    /// Binds `name` in exactly `scope`, shadowing any outer binding.
    pub fn declare(&mut self, scope: ScopeRef, name: &str, value: Value) {
        let scope = self
            .scopes
            .get_mut(scope.0 as usize)
            .and_then(Option::as_mut)
            .expect(HANDLE_MSG);
        scope.values.insert(name.to_compact_string(), value);
    }

    /// The bindings held directly by `scope`, sorted by name.
    pub fn bindings(&self, scope: ScopeRef) -> Vec<(CompactString, Value)> {
        let mut bindings: Vec<_> = self
            .get(scope)
            .map(|scope| {
                scope
                    .values
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        bindings.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        bindings
    }

    pub fn live_scopes(&self) -> usize {
        self.scopes.iter().filter(|scope| scope.is_some()).count()
    }

    /// Frees every scope that cannot be reached from the global scope, following
    /// parent links and the scopes captured by reachable closures. Returns the
    /// number of scopes freed.
    pub fn collect_garbage(&mut self) -> usize {
        let mut marked = vec![false; self.scopes.len()];
        let mut pending = vec![self.global()];
        let mut captured = Vec::new();

        while let Some(handle) = pending.pop() {
            let index = handle.0 as usize;
            if marked[index] {
                continue;
            }
            marked[index] = true;
            let Some(scope) = self.get(handle) else {
                continue;
            };
            if let Some(parent) = scope.parent {
                pending.push(parent);
            }
            for value in scope.values.values() {
                value.captured_scopes(&mut captured);
            }
            pending.append(&mut captured);
        }

        let mut freed = 0;
        for (index, is_marked) in marked.into_iter().enumerate() {
            if !is_marked && self.scopes[index].take().is_some() {
                self.free.push(ScopeRef(index as u32));
                freed += 1;
            }
        }
        tracing::trace!(freed, live = self.live_scopes(), "collected scopes");
        freed
    }
}
