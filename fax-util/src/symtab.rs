//! A lexically scoped symbol table, generic over what it maps names to.
//!
//! Every pass that needs scoping — the type checker binding names to
//! [`Type`](crate)s, the IR generator binding names to IR variables — uses
//! the same frame-stack shape. Lookup walks outward through parent frames;
//! insertion only ever shadows within the current (innermost) frame, which
//! is what makes `var x = 1; { var x = 2; }` not clobber the outer `x`.

use rustc_hash::FxHashMap;

/// One lexical scope frame.
struct Frame<V> {
    bindings: FxHashMap<String, V>,
}

impl<V> Frame<V> {
    fn new() -> Self {
        Self {
            bindings: FxHashMap::default(),
        }
    }
}

/// A stack of [`Frame`]s, one per enclosing lexical scope.
///
/// The root frame (index 0) is created by [`SymbolTable::new`] and is never
/// popped; it is where built-ins (`print_int`, the arithmetic operator
/// names) are seeded by the passes that need them.
pub struct SymbolTable<V> {
    frames: Vec<Frame<V>>,
}

impl<V> SymbolTable<V> {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new()],
        }
    }

    /// Opens a new child scope. Must be paired with [`SymbolTable::pop_scope`].
    pub fn push_scope(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Closes the innermost scope, discarding its bindings.
    ///
    /// Panics if called without a matching `push_scope` — popping the root
    /// frame would make the table unusable for every later lookup in the
    /// same pass, so this is treated as a compiler bug rather than a user
    /// error.
    pub fn pop_scope(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the root scope");
        self.frames.pop();
    }

    /// Binds `name` in the current (innermost) scope, returning the
    /// previous value if `name` was already bound *in this frame only*.
    /// A binding in an outer frame is shadowed, not reported.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        self.frames
            .last_mut()
            .expect("root scope always present")
            .bindings
            .insert(name.into(), value)
    }

    /// True if `name` is already bound in the current (innermost) frame —
    /// used to reject redeclaration within one block, per the type
    /// checker's declaration rule.
    pub fn is_bound_locally(&self, name: &str) -> bool {
        self.frames
            .last()
            .expect("root scope always present")
            .bindings
            .contains_key(name)
    }

    /// Looks up `name`, walking from the innermost frame outward.
    pub fn lookup(&self, name: &str) -> Option<&V> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl<V> Default for SymbolTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_is_local_only() {
        let mut tab: SymbolTable<i32> = SymbolTable::new();
        tab.insert("x", 1);
        tab.push_scope();
        assert_eq!(tab.lookup("x"), Some(&1));
        tab.insert("x", 2);
        assert_eq!(tab.lookup("x"), Some(&2));
        tab.pop_scope();
        assert_eq!(tab.lookup("x"), Some(&1));
    }

    #[test]
    fn local_redeclaration_is_detectable() {
        let mut tab: SymbolTable<i32> = SymbolTable::new();
        tab.insert("x", 1);
        assert!(tab.is_bound_locally("x"));
        tab.push_scope();
        assert!(!tab.is_bound_locally("x"));
    }

    #[test]
    fn undefined_name_is_none() {
        let tab: SymbolTable<i32> = SymbolTable::new();
        assert_eq!(tab.lookup("missing"), None);
    }
}
