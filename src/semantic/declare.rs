//! Declaration pass: collects classes, fields, methods, parameters and
//! locals into a fresh symbol table.

use log::debug;

use crate::frontend::ast::*;
use crate::semantic::symbol_table::{ClassEntry, SymbolTable};
use crate::semantic::MAIN_METHOD;
use crate::types::Type;
use crate::utils::{SemaResult, SemanticError, Span};

/// Where a variable declaration lands
#[derive(Debug, Clone, Copy)]
enum Owner<'n> {
    /// Field of a class
    Class(&'n str),
    /// Local of a method
    Method { class: &'n str, method: &'n str },
}

/// Map a written type to its static type. Class names are placeholders
/// here; their existence is checked by the type checker.
pub fn type_of(ty: &TypeExpr) -> Type {
    match ty {
        TypeExpr::Int(_) => Type::Int,
        TypeExpr::Boolean(_) => Type::Boolean,
        TypeExpr::IntArray(_) => Type::IntArray,
        TypeExpr::Named(ident) => Type::class(ident.name.clone()),
    }
}

/// First traversal over the program
pub struct DeclarationPass {
    table: SymbolTable,
}

impl DeclarationPass {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
        }
    }

    /// Collect every declaration of `program`
    pub fn run(mut self, program: &Program) -> SemaResult<SymbolTable> {
        debug!("declaration pass over {} classes", program.classes.len() + 1);

        self.declare_main(&program.main)?;
        for class in &program.classes {
            self.declare_class(class)?;
        }

        debug!("declaration pass done");
        Ok(self.table)
    }

    fn declare_main(&mut self, main: &MainClass) -> SemaResult<()> {
        let name = main.name.name.as_str();
        debug!("declaring main class {}", name);

        let class = self.table.declare_class(name, None, main.name.span)?;
        let method = class.declare_method(MAIN_METHOD, Type::Void, main.span)?;
        method.declare_param(&main.args.name, Type::StringArray, main.args.span)?;

        let owner = Owner::Method {
            class: name,
            method: MAIN_METHOD,
        };
        for var in &main.vars {
            self.declare_var(owner, var)?;
        }
        Ok(())
    }

    fn declare_class(&mut self, decl: &ClassDecl) -> SemaResult<()> {
        let name = decl.name.name.as_str();

        if self.table.contains_class(name) {
            return Err(SemanticError::DuplicateClass {
                name: name.to_string(),
                span: decl.name.span,
            });
        }

        if let Some(parent) = &decl.parent {
            let parent_entry =
                self.table
                    .get_class(&parent.name)
                    .ok_or_else(|| SemanticError::UnknownParent {
                        class: name.to_string(),
                        parent: parent.name.clone(),
                        span: parent.span,
                    })?;
            if let Some(grandparent) = &parent_entry.parent {
                return Err(SemanticError::MultipleInheritance {
                    class: name.to_string(),
                    parent: parent.name.clone(),
                    grandparent: grandparent.clone(),
                    span: parent.span,
                });
            }
        }

        debug!("declaring class {} (parent {:?})", name, decl.parent.as_ref().map(|p| &p.name));
        let parent = decl.parent.as_ref().map(|p| p.name.as_str());
        self.table.declare_class(name, parent, decl.name.span)?;

        for field in &decl.fields {
            self.declare_var(Owner::Class(name), field)?;
        }
        for method in &decl.methods {
            self.declare_method(name, method)?;
        }
        Ok(())
    }

    fn declare_method(&mut self, class_name: &str, decl: &MethodDecl) -> SemaResult<()> {
        let name = decl.name.name.as_str();
        debug!("declaring method {}.{}", class_name, name);

        let class = self.class_mut(class_name, decl.span)?;
        let method = class.declare_method(name, type_of(&decl.ret_type), decl.name.span)?;
        for param in &decl.params {
            method.declare_param(&param.name.name, type_of(&param.ty), param.name.span)?;
        }

        let owner = Owner::Method {
            class: class_name,
            method: name,
        };
        for var in &decl.vars {
            self.declare_var(owner, var)?;
        }
        Ok(())
    }

    /// Fields go to the class, locals to the method in scope
    fn declare_var(&mut self, owner: Owner<'_>, var: &VarDecl) -> SemaResult<()> {
        let ty = type_of(&var.ty);
        let name = var.name.name.as_str();
        let span = var.name.span;

        match owner {
            Owner::Class(class) => self.class_mut(class, span)?.declare_field(name, ty, span),
            Owner::Method { class, method } => self
                .class_mut(class, span)?
                .method_mut(method)
                .ok_or_else(|| SemanticError::UnresolvedIdentifier {
                    name: method.to_string(),
                    span,
                })?
                .declare_local(name, ty, span),
        }
    }

    fn class_mut(&mut self, name: &str, span: Span) -> SemaResult<&mut ClassEntry> {
        self.table
            .get_class_mut(name)
            .ok_or_else(|| SemanticError::UnknownClass {
                name: name.to_string(),
                span,
            })
    }
}

impl Default for DeclarationPass {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_source;
    use pretty_assertions::assert_eq;

    const MAIN: &str = "class Main { public static void main(String[] args) { int n; n = 0; } }";

    fn declare(source: &str) -> SemaResult<SymbolTable> {
        let program = parse_source(&format!("{}\n{}", MAIN, source), 0).unwrap();
        DeclarationPass::new().run(&program)
    }

    #[test]
    fn test_main_class_is_synthesized() {
        let table = declare("").unwrap();
        let main = table.get_class("Main").unwrap();
        assert_eq!(main.parent, None);
        let method = main.method("main").unwrap();
        assert_eq!(method.return_type, Type::Void);
        assert_eq!(method.params, vec![("args".to_string(), Type::StringArray)]);
        assert_eq!(method.locals, vec![("n".to_string(), Type::Int)]);
    }

    #[test]
    fn test_collects_members_in_order() {
        let table = declare(
            "class A { int a; boolean b; A c; \
             public int f(int x, A y) { int[] z; B w; return x; } \
             public boolean g() { return true; } }",
        )
        .unwrap();
        let a = table.get_class("A").unwrap();
        assert_eq!(
            a.fields,
            vec![
                ("a".to_string(), Type::Int),
                ("b".to_string(), Type::Boolean),
                ("c".to_string(), Type::class("A")),
            ]
        );
        let f = a.method("f").unwrap();
        assert_eq!(f.return_type, Type::Int);
        assert_eq!(
            f.params,
            vec![("x".to_string(), Type::Int), ("y".to_string(), Type::class("A"))]
        );
        // undeclared class names are placeholders at this stage
        assert_eq!(
            f.locals,
            vec![("z".to_string(), Type::IntArray), ("w".to_string(), Type::class("B"))]
        );
        let names: Vec<_> = a.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g"]);
    }

    #[test]
    fn test_duplicate_class() {
        let err = declare("class A { } class A { }").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateClass { ref name, .. } if name == "A"));
    }

    #[test]
    fn test_duplicate_of_main_class() {
        let err = declare("class Main { }").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateClass { .. }));
    }

    #[test]
    fn test_parent_must_be_declared_first() {
        let err = declare("class B extends A { } class A { }").unwrap_err();
        assert!(matches!(err, SemanticError::UnknownParent { ref parent, .. } if parent == "A"));
    }

    #[test]
    fn test_self_extension_is_unknown_parent() {
        let err = declare("class A extends A { }").unwrap_err();
        assert!(matches!(err, SemanticError::UnknownParent { .. }));
    }

    #[test]
    fn test_inheritance_depth_is_one() {
        let err = declare("class A { } class B extends A { } class C extends B { }").unwrap_err();
        assert!(matches!(
            err,
            SemanticError::MultipleInheritance { ref class, ref parent, ref grandparent, .. }
                if class == "C" && parent == "B" && grandparent == "A"
        ));
    }

    #[test]
    fn test_siblings_may_share_a_parent() {
        let table = declare("class A { } class B extends A { } class C extends A { }").unwrap();
        assert_eq!(table.get_class("C").unwrap().parent.as_deref(), Some("A"));
    }

    #[test]
    fn test_duplicate_field() {
        let err = declare("class A { int x; boolean x; }").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateVariable { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_duplicate_local() {
        let err = declare("class A { public int f() { int x; int x; return 0; } }").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateVariable { .. }));
    }

    #[test]
    fn test_duplicate_main_local() {
        let program = parse_source(
            "class Main { public static void main(String[] a) { int x; boolean x; } }",
            0,
        )
        .unwrap();
        let err = DeclarationPass::new().run(&program).unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateVariable { .. }));
    }

    #[test]
    fn test_local_may_shadow_field_and_param() {
        let table = declare("class A { int x; public int f(int x) { int x; return x; } }").unwrap();
        let f = table.get_class("A").unwrap().method("f").unwrap();
        assert_eq!(f.param("x"), Some(&Type::Int));
        assert_eq!(f.local("x"), Some(&Type::Int));
    }

    #[test]
    fn test_duplicate_method() {
        let err = declare("class A { public int f() { return 0; } public boolean f() { return true; } }")
            .unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateMethod { ref name, .. } if name == "f"));
    }

    #[test]
    fn test_field_and_method_may_share_name() {
        assert!(declare("class A { int f; public int f() { return 0; } }").is_ok());
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = declare("class A { public int f(int a, boolean a) { return 0; } }").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateParameter { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_same_method_name_in_different_classes() {
        assert!(declare(
            "class A { public int f() { return 0; } } class B extends A { public int f() { return 1; } }"
        )
        .is_ok());
    }

    #[test]
    fn test_idempotent() {
        let source = format!(
            "{}\nclass A {{ int a; public int f(int x) {{ int y; return x; }} }} \
             class B extends A {{ boolean b; public A g() {{ return this; }} }}",
            MAIN
        );
        let program = parse_source(&source, 0).unwrap();
        let first = DeclarationPass::new().run(&program).unwrap();
        let second = DeclarationPass::new().run(&program).unwrap();
        assert_eq!(first, second);
    }
}
