use std::collections::HashMap;

/// What a source identifier resolves to within a unit.
#[derive(Debug, Clone)]
pub enum Binding {
    Variable { resolved: String },
    Function { resolved: String, arity: usize },
}

impl Binding {
    pub fn resolved(&self) -> &str {
        match self {
            Binding::Variable { resolved } | Binding::Function { resolved, .. } => resolved,
        }
    }
}

#[derive(Default)]
struct Scope {
    bindings: HashMap<String, Vec<Binding>>,
}

/// The scope frames of a single compilation unit.
///
/// A frame is pushed for every `let` body and popped wholesale when the
/// body ends, restoring whatever it shadowed. Shadowing declarations are
/// given a fresh resolved name minted from a counter owned by this unit,
/// so sibling frames can neither collide nor release a rename that
/// belongs to another frame. Enclosing units have their own stacks and
/// are invisible here: functions do not capture.
pub struct ScopeStack {
    frames: Vec<Scope>,
    renamed: u32,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Scope::default()],
            renamed: 0,
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Scope::default());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    fn is_visible(&self, name: &str) -> bool {
        self.frames
            .iter()
            .any(|scope| scope.bindings.contains_key(name))
    }

    fn mint(&mut self, name: &str) -> String {
        if self.is_visible(name) {
            self.renamed += 1;
            format!("{name}#{}", self.renamed)
        } else {
            name.to_string()
        }
    }

    fn bind(&mut self, name: &str, binding: Binding) {
        let scope = self
            .frames
            .last_mut()
            .expect("a unit always owns at least its root frame");

        scope
            .bindings
            .entry(name.to_string())
            .or_default()
            .push(binding);
    }

    pub fn declare_variable(&mut self, name: &str) -> String {
        let resolved = self.mint(name);
        self.bind(
            name,
            Binding::Variable {
                resolved: resolved.clone(),
            },
        );

        resolved
    }

    pub fn declare_function(&mut self, name: &str, arity: usize) -> String {
        let resolved = self.mint(name);
        self.bind(
            name,
            Binding::Function {
                resolved: resolved.clone(),
                arity,
            },
        );

        resolved
    }

    /// Innermost binding for `name`, walking outward through this unit's
    /// frames. The most recent declaration in a frame wins.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name).and_then(|stack| stack.last()))
    }
}
