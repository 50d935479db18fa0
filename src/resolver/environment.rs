//! A lexically-scoped name-to-string environment.
//!
//! Implemented as a stack of scopes rather than a borrowed parent-pointer
//! tree: each request resolution pushes one scope before resolving its own
//! directives and pops it afterward, so the stack only ever grows and
//! shrinks by one at the request boundary, never branches, and there is no
//! need for the general tree shape a parent pointer would buy.

use std::collections::HashMap;

/// A stack of nested scopes, innermost last.
pub struct Environment {
    scopes: Vec<HashMap<String, String>>,
}

impl Environment {
    /// A fresh environment holding just the root (global) scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Pushes a new, empty innermost scope.
    pub fn push_child(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope. Never called more times than
    /// [`Environment::push_child`] — the resolver always pairs the two
    /// around a single request's resolution.
    pub fn pop_child(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the root scope");
    }

    /// Binds `key` to `value` in the innermost scope. Fails (returns
    /// `false`, leaving the environment unchanged) if `key` is already
    /// bound in *that* scope — shadowing an outer scope's binding is fine,
    /// redefining within the same scope is not.
    pub fn define(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        let top = self.scopes.last_mut().expect("scope stack is never empty");
        if top.contains_key(&key) {
            return false;
        }
        top.insert(key, value.into());
        true
    }

    /// Looks up `key`, searching from the innermost scope outward. Returns
    /// the innermost binding found.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(key))
            .map(|s| s.as_str())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_sees_parent_bindings() {
        let mut env = Environment::new();
        env.define("base", "https://x");
        env.push_child();
        assert_eq!(env.get("base"), Some("https://x"));
        env.pop_child();
    }

    #[test]
    fn child_can_shadow_parent() {
        let mut env = Environment::new();
        env.define("id", "1");
        env.push_child();
        assert!(env.define("id", "2"));
        assert_eq!(env.get("id"), Some("2"));
        env.pop_child();
        assert_eq!(env.get("id"), Some("1"));
    }

    #[test]
    fn redefining_in_same_scope_fails() {
        let mut env = Environment::new();
        assert!(env.define("id", "1"));
        assert!(!env.define("id", "2"));
        assert_eq!(env.get("id"), Some("1"));
    }

    #[test]
    fn undefined_key_is_none() {
        let env = Environment::new();
        assert_eq!(env.get("missing"), None);
    }

    #[test]
    fn grandchild_walks_the_full_chain() {
        let mut env = Environment::new();
        env.define("a", "1");
        env.push_child();
        env.define("b", "2");
        env.push_child();
        assert_eq!(env.get("a"), Some("1"));
        assert_eq!(env.get("b"), Some("2"));
        assert_eq!(env.get("c"), None);
        env.pop_child();
        env.pop_child();
    }
}
