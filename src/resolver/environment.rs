use crate::resolver::BindingId;
use drop_bomb::DropBomb;
use std::collections::HashMap;

struct Binding {
    id: BindingId,
    defined: bool,
    used: bool,
    exempt_from_unused_check: bool,
    line: u64,
}

struct Scope {
    bindings: HashMap<String, Binding>,
}

impl Scope {
    fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }
}

pub enum Lookup {
    Global(BindingId),
    Local {
        binding_id: BindingId,
        scope_index: usize,
    },
}

impl Lookup {
    pub fn binding_id(&self) -> BindingId {
        match self {
            Lookup::Global(id) => *id,
            Lookup::Local { binding_id, .. } => *binding_id,
        }
    }
}

pub enum GetResult {
    Found(Lookup),
    /// The name exists in the innermost scope that declares it, but that
    /// scope's declaration hasn't finished resolving yet — `var a = a;`.
    UninitializedSelfReference,
    Miss,
}

/// The resolve-time scope stack. Variables declared at the outermost level
/// (`scopes` empty) live in `global` and are never popped; every nested
/// `{ }`, function body, or method body pushes a scope that's torn down
/// (with an unused-variable sweep) when that construct finishes resolving.
pub struct Environment {
    global: Scope,
    scopes: Vec<Scope>,
    cursor: u64,
}

#[must_use = "scopes must be explicitly closed"]
pub struct ScopeGuard(DropBomb, pub usize);

/// `BindingId::Predetermined(0..NATIVE_GLOBAL_NAMES.len())` are reserved for
/// the native functions the interpreter seeds into its bindings map before
/// running any user code. Keeping the ids fixed means the interpreter never
/// has to learn them back out of a resolved tree.
pub const NATIVE_GLOBAL_NAMES: [&str; 3] = ["clock", "input", "randint"];

impl Environment {
    pub fn new() -> Self {
        let mut global = Scope::new();
        for (i, name) in NATIVE_GLOBAL_NAMES.iter().enumerate() {
            global.bindings.insert(
                name.to_string(),
                Binding {
                    id: BindingId::Predetermined(i as u64),
                    defined: true,
                    used: true,
                    exempt_from_unused_check: true,
                    line: 0,
                },
            );
        }
        Self {
            global,
            scopes: vec![],
            cursor: NATIVE_GLOBAL_NAMES.len() as u64,
        }
    }

    pub fn enter_scope(&mut self) -> ScopeGuard {
        self.scopes.push(Scope::new());
        ScopeGuard(DropBomb::new("forgot to close a resolver scope"), self.scopes.len() - 1)
    }

    /// Returns the names (and declaration line) of local bindings that were
    /// declared but never read in the scope being closed (params/`this`/
    /// `super` excluded).
    pub fn exit_scope(&mut self, mut guard: ScopeGuard) -> Vec<(String, u64)> {
        guard.0.defuse();
        let scope = self.scopes.pop().expect("resolver scope stack underflow");
        scope
            .bindings
            .into_iter()
            .filter(|(_, b)| !b.used && !b.exempt_from_unused_check)
            .map(|(name, b)| (name, b.line))
            .collect()
    }

    /// Index the *next* scope pushed by `enter_scope` would receive. Used to
    /// mark where a function's own scope chain begins, for closure capture
    /// attribution.
    pub fn next_scope_index(&self) -> usize {
        self.scopes.len()
    }

    fn next_id(&mut self, in_function: bool) -> BindingId {
        let n = self.cursor;
        self.cursor += 1;
        if in_function {
            BindingId::FunctionLocal(n)
        } else {
            BindingId::Predetermined(n)
        }
    }

    /// Always returns a fresh id (even when it reports a duplicate-name
    /// error) so the caller can keep building a resolved node regardless.
    pub fn declare(
        &mut self,
        name: &str,
        line: u64,
        in_function: bool,
        exempt_from_unused_check: bool,
    ) -> (BindingId, Option<String>) {
        let id = self.next_id(in_function);
        let binding = Binding {
            id,
            defined: false,
            used: false,
            exempt_from_unused_check,
            line,
        };
        if let Some(scope) = self.scopes.last_mut() {
            if scope.bindings.contains_key(name) {
                return (id, Some(format!("Already a variable named '{name}' in this scope.")));
            }
            scope.bindings.insert(name.to_string(), binding);
        } else {
            self.global.bindings.insert(name.to_string(), binding);
        }
        (id, None)
    }

    pub fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            if let Some(b) = scope.bindings.get_mut(name) {
                b.defined = true;
                return;
            }
        }
        if let Some(b) = self.global.bindings.get_mut(name) {
            b.defined = true;
        }
    }

    pub fn get(&mut self, name: &str) -> GetResult {
        for (index, scope) in self.scopes.iter_mut().enumerate().rev() {
            if let Some(b) = scope.bindings.get_mut(name) {
                if !b.defined {
                    return GetResult::UninitializedSelfReference;
                }
                b.used = true;
                return GetResult::Found(Lookup::Local {
                    binding_id: b.id,
                    scope_index: index,
                });
            }
        }
        if let Some(b) = self.global.bindings.get_mut(name) {
            b.used = true;
            return GetResult::Found(Lookup::Global(b.id));
        }
        GetResult::Miss
    }

    /// Assignment resolves the same way a read does, except there is no
    /// "reading your own initialiser" special case.
    pub fn assign(&mut self, name: &str) -> Option<Lookup> {
        for (index, scope) in self.scopes.iter_mut().enumerate().rev() {
            if let Some(b) = scope.bindings.get_mut(name) {
                b.used = true;
                return Some(Lookup::Local {
                    binding_id: b.id,
                    scope_index: index,
                });
            }
        }
        if let Some(b) = self.global.bindings.get_mut(name) {
            b.used = true;
            return Some(Lookup::Global(b.id));
        }
        None
    }

    /// A miss resolves to a process-wide global: declared lazily the first
    /// time it's referenced, so forward references (mutually recursive
    /// top-level functions, REPL lines defining things out of order) work.
    pub fn declare_implicit_global(&mut self, name: &str) -> BindingId {
        let id = self.next_id(false);
        self.global.bindings.insert(
            name.to_string(),
            Binding {
                id,
                defined: true,
                used: true,
                exempt_from_unused_check: true,
                line: 0,
            },
        );
        id
    }
}
