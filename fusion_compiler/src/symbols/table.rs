//! Scope tree and symbol entries
//!
//! Scopes live in an arena indexed by [`ScopeId`]. Scope 0 is the root
//! ("global"); every other scope records its parent id and the name of the
//! function that owns it.

use super::error::{SymbolError, SymbolResult};
use crate::config::compile_time::symbols::*;
use crate::utils::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type ScopeId = usize;

pub const GLOBAL_SCOPE: ScopeId = 0;
pub const GLOBAL_SCOPE_NAME: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolCategory {
    Variable,
    Parameter,
    Function,
}

impl SymbolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolCategory::Variable => "variable",
            SymbolCategory::Parameter => "parameter",
            SymbolCategory::Function => "function",
        }
    }
}

impl fmt::Display for SymbolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: String,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.param_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub category: SymbolCategory,
    pub declared_type: Option<String>,
    /// Ordered parameters; functions only
    pub parameters: Vec<Parameter>,
    /// Functions only
    pub return_type: Option<String>,
    pub position: Option<Position>,
}

impl SymbolEntry {
    pub fn variable(name: &str, declared_type: &str) -> Self {
        Self {
            name: name.to_string(),
            category: SymbolCategory::Variable,
            declared_type: Some(declared_type.to_string()),
            parameters: Vec::new(),
            return_type: None,
            position: None,
        }
    }

    pub fn parameter(name: &str, declared_type: &str) -> Self {
        Self {
            category: SymbolCategory::Parameter,
            ..Self::variable(name, declared_type)
        }
    }

    pub fn function(name: &str, parameters: Vec<Parameter>, return_type: &str) -> Self {
        Self {
            name: name.to_string(),
            category: SymbolCategory::Function,
            declared_type: None,
            parameters,
            return_type: Some(return_type.to_string()),
            position: None,
        }
    }

    pub fn at(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    /// Parameters rendered as `a: int, b: float`
    pub fn parameter_list(&self) -> String {
        self.parameters
            .iter()
            .map(Parameter::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    pub id: ScopeId,
    pub name: String,
    /// Function that introduced this scope; `None` for the root
    pub owner: Option<String>,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    entries: Vec<SymbolEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Scope {
    fn new(id: ScopeId, name: &str, owner: Option<String>, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            name: name.to_string(),
            owner,
            parent,
            children: Vec::new(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Entries in first-declaration order
    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.index.get(name).and_then(|slot| self.entries.get(*slot))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One flattened row of the symbol table, ready for tabular export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolRow {
    pub symbol: String,
    pub category: String,
    #[serde(rename = "type")]
    pub symbol_type: String,
    pub scope: String,
    pub parameters: String,
    pub return_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(GLOBAL_SCOPE, GLOBAL_SCOPE_NAME, None, None)],
        }
    }

    pub fn root(&self) -> &Scope {
        &self.scopes[GLOBAL_SCOPE]
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Open a child scope of `parent` owned by function `owner`
    pub fn create_scope(&mut self, parent: ScopeId, owner: &str) -> SymbolResult<ScopeId> {
        if parent >= self.scopes.len() {
            return Err(SymbolError::UnknownScope { scope: parent });
        }
        if self.scopes.len() >= MAX_SCOPES {
            return Err(SymbolError::ScopeLimitExceeded);
        }

        let id = self.scopes.len();
        self.scopes
            .push(Scope::new(id, owner, Some(owner.to_string()), Some(parent)));
        self.scopes[parent].children.push(id);
        Ok(id)
    }

    /// Insert into `scope`, returning the entry it replaced.
    /// A replaced entry keeps its original position in the scope.
    pub fn insert(
        &mut self,
        scope: ScopeId,
        entry: SymbolEntry,
    ) -> SymbolResult<Option<SymbolEntry>> {
        let target = self
            .scopes
            .get_mut(scope)
            .ok_or(SymbolError::UnknownScope { scope })?;

        if let Some(slot) = target.index.get(&entry.name).copied() {
            let previous = std::mem::replace(&mut target.entries[slot], entry);
            return Ok(Some(previous));
        }

        if target.entries.len() >= MAX_SYMBOLS_PER_SCOPE {
            return Err(SymbolError::SymbolLimitExceeded {
                scope: target.name.clone(),
            });
        }

        target.index.insert(entry.name.clone(), target.entries.len());
        target.entries.push(entry);
        Ok(None)
    }

    /// Resolve `name` from `scope` outwards through its ancestors
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &SymbolEntry)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scopes.get(id)?;
            if let Some(entry) = s.get(name) {
                return Some((id, entry));
            }
            current = s.parent;
        }
        None
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&SymbolEntry> {
        self.scopes.get(scope).and_then(|s| s.get(name))
    }

    /// Most recently created scope owned by function `name`
    pub fn function_scope(&self, name: &str) -> Option<&Scope> {
        self.scopes
            .iter()
            .rev()
            .find(|s| s.owner.as_deref() == Some(name))
    }

    pub fn symbol_count(&self) -> usize {
        self.scopes.iter().map(Scope::len).sum()
    }

    /// Scope ids in pre-order from the root
    pub fn scope_order(&self) -> Vec<ScopeId> {
        let mut order = Vec::with_capacity(self.scopes.len());
        let mut stack = vec![GLOBAL_SCOPE];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(scope) = self.scopes.get(id) {
                stack.extend(scope.children.iter().rev());
            }
        }
        order
    }

    /// Flatten every scope into export rows, scopes in pre-order
    pub fn rows(&self) -> Vec<SymbolRow> {
        self.scope_order()
            .into_iter()
            .filter_map(|id| self.scopes.get(id))
            .flat_map(|scope| {
                scope.entries.iter().map(move |entry| SymbolRow {
                    symbol: entry.name.clone(),
                    category: entry.category.as_str().to_string(),
                    symbol_type: entry.declared_type.clone().unwrap_or_default(),
                    scope: scope.name.clone(),
                    parameters: entry.parameter_list(),
                    return_type: entry.return_type.clone().unwrap_or_default(),
                })
            })
            .collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_root_scope() {
        let table = SymbolTable::new();
        assert_eq!(table.root().name, "global");
        assert!(table.root().parent.is_none());
        assert_eq!(table.symbol_count(), 0);
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut table = SymbolTable::new();
        table.insert(GLOBAL_SCOPE, SymbolEntry::variable("x", "int")).unwrap();
        table.insert(GLOBAL_SCOPE, SymbolEntry::variable("y", "bool")).unwrap();
        let previous = table
            .insert(GLOBAL_SCOPE, SymbolEntry::variable("x", "float"))
            .unwrap();

        assert_eq!(previous.unwrap().declared_type.as_deref(), Some("int"));
        let names: Vec<&str> = table.root().entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(
            table.lookup_local(GLOBAL_SCOPE, "x").unwrap().declared_type.as_deref(),
            Some("float")
        );
    }

    #[test]
    fn test_lookup_walks_ancestors_and_shadows() {
        let mut table = SymbolTable::new();
        table
            .insert(GLOBAL_SCOPE, SymbolEntry::function("f", vec![], "void"))
            .unwrap();
        table.insert(GLOBAL_SCOPE, SymbolEntry::variable("x", "int")).unwrap();
        let f = table.create_scope(GLOBAL_SCOPE, "f").unwrap();
        table.insert(f, SymbolEntry::variable("x", "text")).unwrap();

        let (found_in, entry) = table.lookup(f, "x").unwrap();
        assert_eq!(found_in, f);
        assert_eq!(entry.declared_type.as_deref(), Some("text"));

        let (found_in, _) = table.lookup(f, "f").unwrap();
        assert_eq!(found_in, GLOBAL_SCOPE);
        assert!(table.lookup_local(f, "f").is_none());
        assert!(table.lookup(f, "missing").is_none());
    }

    #[test]
    fn test_scopes_are_tagged_with_owner() {
        let mut table = SymbolTable::new();
        let a = table.create_scope(GLOBAL_SCOPE, "a").unwrap();
        let b = table.create_scope(GLOBAL_SCOPE, "b").unwrap();
        let a2 = table.create_scope(GLOBAL_SCOPE, "a").unwrap();

        assert_eq!(table.scope(b).unwrap().owner.as_deref(), Some("b"));
        assert_eq!(table.function_scope("a").unwrap().id, a2);
        assert_ne!(a, a2);
        assert_eq!(table.root().children, vec![a, b, a2]);
    }

    #[test]
    fn test_unknown_scope() {
        let mut table = SymbolTable::new();
        assert_matches!(
            table.insert(9, SymbolEntry::variable("x", "int")),
            Err(SymbolError::UnknownScope { scope: 9 })
        );
        assert_matches!(
            table.create_scope(9, "f"),
            Err(SymbolError::UnknownScope { .. })
        );
    }

    #[test]
    fn test_rows_follow_scope_preorder() {
        let mut table = SymbolTable::new();
        table
            .insert(
                GLOBAL_SCOPE,
                SymbolEntry::function(
                    "suma",
                    vec![
                        Parameter { name: "a".into(), param_type: "int".into() },
                        Parameter { name: "b".into(), param_type: "int".into() },
                    ],
                    "int",
                ),
            )
            .unwrap();
        let suma = table.create_scope(GLOBAL_SCOPE, "suma").unwrap();
        table.insert(suma, SymbolEntry::parameter("a", "int")).unwrap();

        let rows = table.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "suma");
        assert_eq!(rows[0].parameters, "a: int, b: int");
        assert_eq!(rows[0].return_type, "int");
        assert_eq!(rows[0].scope, "global");
        assert_eq!(rows[1].category, "parameter");
        assert_eq!(rows[1].scope, "suma");
        assert_eq!(rows[1].symbol_type, "int");
    }
}
