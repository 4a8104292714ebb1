//! Builds the scope tree from a FusionCod parse tree
//!
//! The walker knows the shape of the FusionCod grammar: a PROGRAM chain of
//! FUNCTIONs, each with a BLOCK whose STATEMENTS chain may nest further BLOCKs
//! under if/elif/else, while and for. Chains are walked iteratively; only
//! nested blocks recurse, bounded by MAX_TREE_WALK_DEPTH.

use super::error::{SymbolError, SymbolResult, SymbolWarning};
use super::table::{Parameter, ScopeId, SymbolEntry, SymbolTable, GLOBAL_SCOPE};
use crate::config::compile_time::symbols::*;
use crate::config::runtime::SymbolPreferences;
use crate::syntax::{NodeId, ParseNode, ParseTree};
use crate::{log_debug, log_warning};

/// Grammar symbols the walker navigates by
mod shape {
    pub const PROGRAM: &str = "PROGRAM";
    pub const FUNCTION: &str = "FUNCTION";
    pub const FUNCTION_KIND: &str = "FUNCTION_KIND";
    pub const MAIN: &str = "main";
    pub const ID: &str = "id";
    pub const PARAMS: &str = "PARAMS";
    pub const PARAM: &str = "PARAM";
    pub const MORE_PARAMS: &str = "MORE_PARAMS";
    pub const RETURN_TYPE: &str = "RETURN_TYPE";
    pub const TYPE: &str = "TYPE";
    pub const BLOCK: &str = "BLOCK";
    pub const STATEMENTS: &str = "STATEMENTS";
    pub const STATEMENT: &str = "STATEMENT";
    pub const ASSIGNMENT: &str = "ASSIGNMENT";
    pub const TYPE_EXT: &str = "TYPE_EXT";
    pub const ELSE_PART: &str = "ELSE_PART";
    pub const IF: &str = "if";
    pub const ELIF: &str = "elif";
    pub const ELSE: &str = "else";
    pub const WHILE: &str = "while";
    pub const FOR: &str = "for";
}

pub const ENTRY_FUNCTION: &str = "main";
pub const DEFAULT_RETURN_TYPE: &str = "void";

#[derive(Debug, Clone)]
pub struct SymbolBuildResult {
    pub table: SymbolTable,
    pub warnings: Vec<SymbolWarning>,
}

pub struct SymbolTableBuilder<'t> {
    tree: &'t ParseTree,
    table: SymbolTable,
    warnings: Vec<SymbolWarning>,
    preferences: SymbolPreferences,
}

impl<'t> SymbolTableBuilder<'t> {
    pub fn new(tree: &'t ParseTree) -> Self {
        Self::with_preferences(tree, SymbolPreferences::default())
    }

    pub fn with_preferences(tree: &'t ParseTree, preferences: SymbolPreferences) -> Self {
        Self {
            tree,
            table: SymbolTable::new(),
            warnings: Vec::new(),
            preferences,
        }
    }

    /// Walk the tree and return the populated table
    pub fn build(mut self) -> SymbolResult<SymbolBuildResult> {
        let tree = self.tree;
        let mut program = Some(tree.root());
        while let Some(node) = program {
            if let Some(function) = tree.child_by_symbol(node.id, shape::FUNCTION) {
                self.declare_function(function)?;
            }
            program = tree.child_by_symbol(node.id, shape::PROGRAM);
        }

        Ok(SymbolBuildResult {
            table: self.table,
            warnings: self.warnings,
        })
    }

    fn declare_function(&mut self, function: &ParseNode) -> SymbolResult<()> {
        let tree = self.tree;
        let kind = self.required(function.id, shape::FUNCTION_KIND)?;

        let (name, position, parameters, return_type) =
            if let Some(main) = tree.child_by_symbol(kind.id, shape::MAIN) {
                (
                    ENTRY_FUNCTION.to_string(),
                    main.position(),
                    Vec::new(),
                    DEFAULT_RETURN_TYPE.to_string(),
                )
            } else {
                let id = self.required(kind.id, shape::ID)?;
                let name = id.value_text();
                let parameters = self.collect_parameters(kind.id, &name)?;
                let return_type = tree
                    .child_by_symbol(kind.id, shape::RETURN_TYPE)
                    .and_then(|rt| tree.child_by_symbol(rt.id, shape::TYPE))
                    .map(|ty| self.type_name(ty))
                    .unwrap_or_else(|| DEFAULT_RETURN_TYPE.to_string());
                (name, id.position(), parameters, return_type)
            };

        log_debug!("Declaring function",
            "name" => name.as_str(),
            "parameters" => parameters.len(),
            "return_type" => return_type.as_str()
        );

        self.declare(
            GLOBAL_SCOPE,
            SymbolEntry::function(&name, parameters.clone(), &return_type).at(position),
        )?;

        let scope = self.table.create_scope(GLOBAL_SCOPE, &name)?;
        for parameter in &parameters {
            self.declare(
                scope,
                SymbolEntry::parameter(&parameter.name, &parameter.param_type).at(position),
            )?;
        }

        let block = self.required(kind.id, shape::BLOCK)?;
        self.walk_block(block, scope, 1)
    }

    /// PARAMS -> PARAM MORE_PARAMS, MORE_PARAMS -> comma PARAM MORE_PARAMS
    fn collect_parameters(&self, kind: NodeId, function: &str) -> SymbolResult<Vec<Parameter>> {
        let mut parameters = Vec::new();
        let mut list = self.tree.child_by_symbol(kind, shape::PARAMS);

        while let Some(node) = list {
            if let Some(param) = self.tree.child_by_symbol(node.id, shape::PARAM) {
                let id = self.required(param.id, shape::ID)?;
                let ty = self.required(param.id, shape::TYPE)?;
                parameters.push(Parameter {
                    name: id.value_text(),
                    param_type: self.type_name(ty),
                });
                if parameters.len() > MAX_PARAMETERS_PER_FUNCTION {
                    return Err(SymbolError::ParameterLimitExceeded {
                        function: function.to_string(),
                        count: parameters.len(),
                    });
                }
            }
            list = self.tree.child_by_symbol(node.id, shape::MORE_PARAMS);
        }

        Ok(parameters)
    }

    fn walk_block(&mut self, block: &ParseNode, scope: ScopeId, depth: usize) -> SymbolResult<()> {
        if depth > MAX_TREE_WALK_DEPTH {
            return Err(SymbolError::WalkDepthExceeded);
        }

        let mut statements = self.tree.child_by_symbol(block.id, shape::STATEMENTS);
        while let Some(node) = statements {
            if let Some(statement) = self.tree.child_by_symbol(node.id, shape::STATEMENT) {
                self.walk_statement(statement, scope, depth)?;
            }
            statements = self.tree.child_by_symbol(node.id, shape::STATEMENTS);
        }
        Ok(())
    }

    fn walk_statement(
        &mut self,
        statement: &ParseNode,
        scope: ScopeId,
        depth: usize,
    ) -> SymbolResult<()> {
        let tree = self.tree;
        let Some(head) = tree.children(statement.id).next() else {
            return Err(SymbolError::malformed(statement.id, "empty STATEMENT"));
        };

        match head.symbol.as_str() {
            shape::ASSIGNMENT => self.declare_if_typed(head, scope),
            shape::WHILE => self.walk_block(self.required(statement.id, shape::BLOCK)?, scope, depth + 1),
            shape::FOR => {
                for assignment in tree
                    .children(statement.id)
                    .filter(|c| c.symbol == shape::ASSIGNMENT)
                {
                    self.declare_if_typed(assignment, scope)?;
                }
                self.walk_block(self.required(statement.id, shape::BLOCK)?, scope, depth + 1)
            }
            shape::IF => {
                self.walk_block(self.required(statement.id, shape::BLOCK)?, scope, depth + 1)?;

                let mut else_part = tree.child_by_symbol(statement.id, shape::ELSE_PART);
                while let Some(part) = else_part {
                    let branch = tree.children(part.id).next().map(|c| c.symbol.as_str());
                    if matches!(branch, Some(shape::ELIF) | Some(shape::ELSE)) {
                        self.walk_block(self.required(part.id, shape::BLOCK)?, scope, depth + 1)?;
                    }
                    else_part = tree.child_by_symbol(part.id, shape::ELSE_PART);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// ASSIGNMENT -> id TYPE_EXT assign EXPR; only a TYPE under TYPE_EXT declares
    fn declare_if_typed(&mut self, assignment: &ParseNode, scope: ScopeId) -> SymbolResult<()> {
        let id = self.required(assignment.id, shape::ID)?;
        let type_ext = self.required(assignment.id, shape::TYPE_EXT)?;

        match self.tree.child_by_symbol(type_ext.id, shape::TYPE) {
            Some(ty) => {
                let entry =
                    SymbolEntry::variable(&id.value_text(), &self.type_name(ty)).at(id.position());
                self.declare(scope, entry)
            }
            None => Ok(()),
        }
    }

    fn declare(&mut self, scope: ScopeId, entry: SymbolEntry) -> SymbolResult<()> {
        let name = entry.name.clone();
        let new_type = entry.declared_type.clone().or_else(|| entry.return_type.clone());
        let position = entry.position;

        if let Some(previous) = self.table.insert(scope, entry)? {
            let scope_name = self
                .table
                .scope(scope)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            let warning = SymbolWarning::Redeclaration {
                name,
                scope: scope_name,
                previous_type: previous.declared_type.or(previous.return_type),
                new_type,
                position,
            };

            if self.preferences.warn_on_redeclaration {
                match warning.span() {
                    Some(span) => {
                        log_warning!(code = warning.code(), &warning.to_string(), span = span);
                    }
                    None => {
                        log_warning!(code = warning.code(), &warning.to_string());
                    }
                }
            }
            self.warnings.push(warning);
        }
        Ok(())
    }

    /// TYPE -> t_int | t_float | ...; the matched lexeme is the type name
    fn type_name(&self, ty: &ParseNode) -> String {
        self.tree
            .children(ty.id)
            .next()
            .map(|terminal| {
                let text = terminal.value_text();
                if text.is_empty() {
                    terminal.symbol.trim_start_matches("t_").to_string()
                } else {
                    text
                }
            })
            .unwrap_or_default()
    }

    fn required(&self, parent: NodeId, symbol: &str) -> SymbolResult<&'t ParseNode> {
        let tree: &'t ParseTree = self.tree;
        tree.child_by_symbol(parent, symbol).ok_or_else(|| {
            SymbolError::malformed(parent, &format!("missing {} child", symbol))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarTable;
    use crate::lexical;
    use crate::symbols::SymbolCategory;
    use crate::syntax::PredictiveParser;
    use assert_matches::assert_matches;

    fn build(source: &str) -> SymbolBuildResult {
        let grammar = GrammarTable::default_grammar().unwrap();
        let lexed = lexical::tokenize(source).unwrap();
        assert!(lexed.is_clean(), "lexical errors: {:?}", lexed.errors);
        let outcome = PredictiveParser::new(&grammar).parse(&lexed.with_end_marker());
        assert!(outcome.success, "syntax errors: {:?}", outcome.errors);
        SymbolTableBuilder::new(&outcome.tree.unwrap()).build().unwrap()
    }

    #[test]
    fn test_entry_function_end_to_end() {
        let result = build("fn main() {\n  x int = 5;\n  show(x);\n}\n");
        let table = &result.table;

        assert_eq!(table.root().len(), 1);
        let main = table.root().get("main").unwrap();
        assert_eq!(main.category, SymbolCategory::Function);
        assert!(main.parameters.is_empty());
        assert_eq!(main.return_type.as_deref(), Some("void"));

        let scope = table.function_scope("main").unwrap();
        assert_eq!(scope.len(), 1);
        let x = scope.get("x").unwrap();
        assert_eq!(x.category, SymbolCategory::Variable);
        assert_eq!(x.declared_type.as_deref(), Some("int"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_two_functions_have_separate_scopes() {
        let result = build(
            r#"
fn doble(n int) int {
    r int = n * 2;
    return r;
}

fn main() {
    y float = 1.5;
}
"#,
        );
        let table = &result.table;

        assert_eq!(table.root().len(), 2);
        assert_eq!(table.root().children.len(), 2);

        let doble = table.function_scope("doble").unwrap();
        let main = table.function_scope("main").unwrap();
        assert!(doble.get("r").is_some());
        assert!(main.get("r").is_none());
        assert!(table.root().get("r").is_none());
        assert!(doble.get("y").is_none());
        assert_eq!(doble.parent, Some(GLOBAL_SCOPE));
    }

    #[test]
    fn test_parameters_and_return_type() {
        let result = build("fn f(a int, b text, c bool) float { return 1.0; }");
        let f = result.table.root().get("f").unwrap();

        let params: Vec<String> = f.parameters.iter().map(|p| p.to_string()).collect();
        assert_eq!(params, vec!["a: int", "b: text", "c: bool"]);
        assert_eq!(f.return_type.as_deref(), Some("float"));

        let scope = result.table.function_scope("f").unwrap();
        let names: Vec<&str> = scope.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(scope
            .entries()
            .iter()
            .all(|e| e.category == SymbolCategory::Parameter));
    }

    #[test]
    fn test_missing_return_type_defaults_to_void() {
        let result = build("fn g() { stop; }");
        let g = result.table.root().get("g").unwrap();
        assert_eq!(g.return_type.as_deref(), Some("void"));
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let result = build("fn main() {\n  x int = 1;\n  x float = 2.5;\n}");
        let scope = result.table.function_scope("main").unwrap();

        assert_eq!(scope.len(), 1);
        assert_eq!(scope.get("x").unwrap().declared_type.as_deref(), Some("float"));
        assert_eq!(result.warnings.len(), 1);
        assert_matches!(
            &result.warnings[0],
            SymbolWarning::Redeclaration { name, previous_type: Some(p), new_type: Some(n), .. }
                if name == "x" && p == "int" && n == "float"
        );
    }

    #[test]
    fn test_plain_reassignment_declares_nothing() {
        let result = build("fn main() {\n  x int = 1;\n  x = 2;\n}");
        let scope = result.table.function_scope("main").unwrap();
        assert_eq!(scope.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_nested_blocks_declare_into_function_scope() {
        let result = build(
            r#"
fn main() {
    n int = 3;
    if (n > 1) {
        a int = 1;
    } elif (n == 1) {
        b text = "uno";
    } else {
        c bool = false;
    }
    while (n > 0) {
        d float = 0.5;
        n = n - 1;
    }
    for (i int = 0; i < 3; i = i + 1) {
        e int = i;
    }
}
"#,
        );
        let scope = result.table.function_scope("main").unwrap();
        let names: Vec<&str> = scope.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["n", "a", "b", "c", "d", "i", "e"]);
        assert_eq!(result.table.scopes().len(), 2);
    }

    #[test]
    fn test_function_redeclaration_gets_fresh_scope() {
        let result = build("fn f() { a int = 1; }\nfn f() int { b int = 2; return b; }");
        let table = &result.table;

        assert_eq!(table.root().len(), 1);
        assert_eq!(table.root().children.len(), 2);
        assert_eq!(table.root().get("f").unwrap().return_type.as_deref(), Some("int"));
        assert!(table.function_scope("f").unwrap().get("b").is_some());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_empty_program() {
        let result = build("");
        assert_eq!(result.table.symbol_count(), 0);
        assert_eq!(result.table.scopes().len(), 1);
    }
}
