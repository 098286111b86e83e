//! Stack-of-scopes symbol table for passes that walk the tree.
//!
//! The bottom (global) scope always exists. [`SymbolTable::add`] only checks
//! the current scope for duplicates, so inner scopes may shadow outer ones.
//! [`SymbolTable::scope`] and [`SymbolTable::with_scope`] open a scope that is
//! closed again on every exit path: normal return, `?`, or unwinding.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::diagnostics::{CoolAstError, Result};

#[derive(Debug, Clone)]
pub struct SymbolTable<V> {
    scopes: Vec<HashMap<String, V>>,
}

impl<V> Default for SymbolTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SymbolTable<V> {
    /// A table holding only the empty global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Number of scopes above the global one.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn current_scope(&self) -> &HashMap<String, V> {
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_scope_mut(&mut self) -> &mut HashMap<String, V> {
        let top = self.scopes.len() - 1;
        &mut self.scopes[top]
    }

    /// Binds `name` in the current scope.
    pub fn add(&mut self, name: impl Into<String>, value: V) -> Result<()> {
        let name = name.into();
        let scope = self.current_scope_mut();
        if scope.contains_key(&name) {
            return Err(CoolAstError::DuplicateSymbol { name });
        }
        scope.insert(name, value);
        Ok(())
    }

    /// Nearest binding of `name`, searching outward from the current scope.
    pub fn find(&self, name: &str) -> Option<&V> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Removes `name` from the current scope and returns its value.
    pub fn remove(&mut self, name: &str) -> Result<V> {
        self.current_scope_mut()
            .remove(name)
            .ok_or_else(|| CoolAstError::MissingSymbol {
                name: name.to_string(),
            })
    }

    /// Binding of `name` in the current scope only.
    pub fn check_scope(&self, name: &str) -> Option<&V> {
        self.current_scope().get(name)
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
        trace!(depth = self.depth(), "enter scope");
    }

    /// Discards the current scope. The global scope cannot be left.
    pub fn leave_scope(&mut self) -> Result<()> {
        if self.scopes.len() == 1 {
            return Err(CoolAstError::ScopeUnderflow);
        }
        self.scopes.pop();
        trace!(depth = self.depth(), "leave scope");
        Ok(())
    }

    /// Enters a scope that is left when the returned guard drops.
    pub fn scope(&mut self) -> ScopeGuard<'_, V> {
        let base = self.scopes.len();
        self.enter_scope();
        ScopeGuard { table: self, base }
    }

    /// Runs `f` inside a fresh scope.
    pub fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = self.scope();
        f(&mut *guard)
    }
}

/// A scope opened by [`SymbolTable::scope`].
///
/// On drop the table is cut back to the scopes that existed before the guard
/// was created, including any scopes entered but not left while it was alive.
pub struct ScopeGuard<'t, V> {
    table: &'t mut SymbolTable<V>,
    base: usize,
}

impl<V> Deref for ScopeGuard<'_, V> {
    type Target = SymbolTable<V>;

    fn deref(&self) -> &Self::Target {
        self.table
    }
}

impl<V> DerefMut for ScopeGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.table
    }
}

impl<V> Drop for ScopeGuard<'_, V> {
    fn drop(&mut self) {
        self.table.scopes.truncate(self.base);
        trace!(depth = self.table.depth(), "scope guard released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;

    #[test]
    fn test_shadowing_and_restore() {
        let mut table = SymbolTable::new();
        table.add("x", 1).unwrap();
        table.enter_scope();
        table.add("x", 2).unwrap();
        assert_eq!(table.find("x"), Some(&2));
        table.leave_scope().unwrap();
        assert_eq!(table.find("x"), Some(&1));
    }

    #[test]
    fn test_duplicate_keeps_original() {
        let mut table = SymbolTable::new();
        table.add("x", 1).unwrap();
        let err = table.add("x", 9).unwrap_err();
        assert!(matches!(err, CoolAstError::DuplicateSymbol { ref name } if name == "x"));
        assert_eq!(table.find("x"), Some(&1));
    }

    #[test]
    fn test_check_scope_ignores_outer_scopes() {
        let mut table = SymbolTable::new();
        table.add("x", "outer").unwrap();
        table.enter_scope();
        assert_eq!(table.check_scope("x"), None);
        assert_eq!(table.find("x"), Some(&"outer"));
    }

    #[test]
    fn test_remove_only_touches_current_scope() {
        let mut table = SymbolTable::new();
        table.add("x", 1).unwrap();
        table.enter_scope();
        let err = table.remove("x").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Symbol);
        table.leave_scope().unwrap();
        assert_eq!(table.remove("x").unwrap(), 1);
        assert_eq!(table.find("x"), None);
    }

    #[test]
    fn test_global_scope_cannot_be_left() {
        let mut table: SymbolTable<()> = SymbolTable::new();
        assert!(matches!(table.leave_scope(), Err(CoolAstError::ScopeUnderflow)));
        assert_eq!(table.depth(), 0);
    }

    #[test]
    fn test_guard_closes_scope() {
        let mut table = SymbolTable::new();
        {
            let mut scope = table.scope();
            scope.add("y", 1).unwrap();
            scope.enter_scope();
            assert_eq!(scope.depth(), 2);
        }
        assert_eq!(table.depth(), 0);
        assert_eq!(table.find("y"), None);
    }

    #[test]
    fn test_with_scope_restores_after_error() {
        let mut table = SymbolTable::new();
        let result: Result<()> = table.with_scope(|t| {
            t.add("a", 1)?;
            t.add("a", 2)?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(table.depth(), 0);
    }
}
