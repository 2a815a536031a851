//! Type-check pass over a program whose declarations are already collected.

use log::{debug, trace};

use crate::frontend::ast::*;
use crate::semantic::symbol_table::{ClassEntry, MethodEntry, PendingCall, Scope, SymbolTable};
use crate::semantic::MAIN_METHOD;
use crate::types::Type;
use crate::utils::{ArrayAssignPart, OperandMismatch, SemaResult, SemanticError, Span};

/// Second traversal; reads the table, never writes it
pub struct TypeChecker<'t> {
    table: &'t SymbolTable,
}

impl<'t> TypeChecker<'t> {
    pub fn new(table: &'t SymbolTable) -> Self {
        Self { table }
    }

    pub fn check_program(&self, program: &Program) -> SemaResult<()> {
        debug!("type-check pass over {} classes", program.classes.len() + 1);

        self.check_main(&program.main)?;
        for class in &program.classes {
            self.check_class(class)?;
        }

        debug!("type-check pass done");
        Ok(())
    }

    // ==================== Declarations ====================

    fn check_main(&self, main: &MainClass) -> SemaResult<()> {
        let class = self.table.lookup_class(&main.name.name, main.name.span)?;
        let method = self.method_of(class, MAIN_METHOD, main.span)?;
        debug!("checking {}.{}", class.name, MAIN_METHOD);

        let scope = Scope::root().enter_class(class).enter_method(method);
        for var in &main.vars {
            self.check_var_type(scope, &var.ty)?;
        }
        for stmt in &main.body {
            self.check_stmt(scope, stmt)?;
        }
        Ok(())
    }

    fn check_class(&self, decl: &ClassDecl) -> SemaResult<()> {
        let class = self.table.lookup_class(&decl.name.name, decl.name.span)?;
        debug!("checking class {}", class.name);

        let scope = Scope::root().enter_class(class);
        for field in &decl.fields {
            self.check_var_type(scope, &field.ty)?;
        }
        for method in &decl.methods {
            self.check_method(scope, class, method)?;
        }
        Ok(())
    }

    fn check_method(
        &self,
        scope: Scope<'t>,
        class: &'t ClassEntry,
        decl: &MethodDecl,
    ) -> SemaResult<()> {
        let method = self.method_of(class, &decl.name.name, decl.name.span)?;
        debug!("checking method {}.{}", class.name, method.name);

        let scope = scope.enter_method(method);
        for var in &decl.vars {
            self.check_var_type(scope, &var.ty)?;
        }
        for stmt in &decl.body {
            self.check_stmt(scope, stmt)?;
        }

        let found = self.check_expr(scope, &decl.ret)?;
        if !found.is_assignable_to(&method.return_type, self.table) {
            return Err(SemanticError::ReturnTypeMismatch {
                method: format!("{}.{}", class.name, method.name),
                expected: method.return_type.clone(),
                found,
                span: decl.ret.span(),
            });
        }
        Ok(())
    }

    /// The class name of a field or local type is resolved like any
    /// other identifier in the enclosing scope
    fn check_var_type(&self, scope: Scope<'t>, ty: &TypeExpr) -> SemaResult<()> {
        if let TypeExpr::Named(ident) = ty {
            scope.resolve(self.table, &ident.name, ident.span)?;
        }
        Ok(())
    }

    fn method_of(&self, class: &'t ClassEntry, name: &str, span: Span) -> SemaResult<&'t MethodEntry> {
        class
            .method(name)
            .ok_or_else(|| SemanticError::UnresolvedIdentifier {
                name: name.to_string(),
                span,
            })
    }

    // ==================== Statements ====================

    fn check_stmt(&self, scope: Scope<'t>, stmt: &Stmt) -> SemaResult<()> {
        match stmt {
            Stmt::Block { stmts, .. } => {
                for stmt in stmts {
                    self.check_stmt(scope, stmt)?;
                }
                Ok(())
            }
            Stmt::Assign { target, value, span } => {
                self.check_assign(scope, target, value, *span).map(|_| ())
            }
            Stmt::ArrayAssign {
                target,
                index,
                value,
                ..
            } => self.check_array_assign(scope, target, index, value),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_condition(scope, "if", cond)?;
                self.check_stmt(scope, then_branch)?;
                self.check_stmt(scope, else_branch)
            }
            Stmt::While { cond, body, .. } => {
                self.check_condition(scope, "while", cond)?;
                self.check_stmt(scope, body)
            }
            Stmt::Print { value, .. } => self.check_expr(scope, value).map(|_| ()),
        }
    }

    /// Returns the type of the assigned variable
    fn check_assign(
        &self,
        scope: Scope<'t>,
        target: &Ident,
        value: &Expr,
        span: Span,
    ) -> SemaResult<Type> {
        let expected = scope.resolve(self.table, &target.name, target.span)?;
        let found = self.check_expr(scope, value)?;
        if !found.is_assignable_to(&expected, self.table) {
            return Err(SemanticError::AssignmentTypeMismatch {
                name: target.name.clone(),
                expected,
                found,
                span,
            });
        }
        Ok(expected)
    }

    fn check_array_assign(
        &self,
        scope: Scope<'t>,
        target: &Ident,
        index: &Expr,
        value: &Expr,
    ) -> SemaResult<()> {
        let target_ty = scope.resolve(self.table, &target.name, target.span)?;
        let index_ty = self.check_expr(scope, index)?;
        let value_ty = self.check_expr(scope, value)?;

        let parts = [
            (ArrayAssignPart::Target, Type::IntArray, target_ty, target.span),
            (ArrayAssignPart::Index, Type::Int, index_ty, index.span()),
            (ArrayAssignPart::Value, Type::Int, value_ty, value.span()),
        ];
        for (part, expected, found, span) in parts {
            if found != expected {
                return Err(SemanticError::ArrayAssignmentTypeMismatch {
                    part,
                    expected,
                    found,
                    span,
                });
            }
        }
        Ok(())
    }

    fn check_condition(&self, scope: Scope<'t>, construct: &'static str, cond: &Expr) -> SemaResult<()> {
        let found = self.check_expr(scope, cond)?;
        if found != Type::Boolean {
            return Err(SemanticError::ConditionNotBoolean {
                construct,
                found,
                span: cond.span(),
            });
        }
        Ok(())
    }

    // ==================== Expressions ====================

    pub fn check_expr(&self, scope: Scope<'t>, expr: &Expr) -> SemaResult<Type> {
        match expr {
            Expr::Literal(Literal::Int(..)) => Ok(Type::Int),
            Expr::Literal(Literal::Bool(..)) => Ok(Type::Boolean),
            Expr::Ident(ident) => scope.resolve(self.table, &ident.name, ident.span),
            Expr::This(span) => scope.class().map(ClassEntry::ty).ok_or_else(|| {
                SemanticError::UnresolvedIdentifier {
                    name: "this".to_string(),
                    span: *span,
                }
            }),
            Expr::Not { expr, .. } => {
                let found = self.check_expr(scope, expr)?;
                expect_operand(OperandMismatch::NotBoolean, &Type::Boolean, found, expr.span())?;
                Ok(Type::Boolean)
            }
            Expr::Binary {
                left, op, right, ..
            } => self.check_binary(scope, left, *op, right),
            Expr::Index { array, index, .. } => {
                let array_ty = self.check_expr(scope, array)?;
                let index_ty = self.check_expr(scope, index)?;
                expect_operand(OperandMismatch::IndexNotArray, &Type::IntArray, array_ty, array.span())?;
                expect_operand(OperandMismatch::IndexNotInt, &Type::Int, index_ty, index.span())?;
                Ok(Type::Int)
            }
            Expr::Length { array, .. } => {
                let found = self.check_expr(scope, array)?;
                expect_operand(OperandMismatch::LengthNotArray, &Type::IntArray, found, array.span())?;
                Ok(Type::Int)
            }
            Expr::NewArray { size, .. } => {
                let found = self.check_expr(scope, size)?;
                expect_operand(OperandMismatch::SizeNotInt, &Type::Int, found, size.span())?;
                Ok(Type::IntArray)
            }
            Expr::NewObject { class, .. } => {
                let entry = self.table.lookup_class(&class.name, class.span)?;
                Ok(entry.ty())
            }
            Expr::Paren { expr, .. } => self.check_expr(scope, expr),
            Expr::MessageSend {
                receiver,
                method,
                args,
                span,
            } => self.check_message_send(scope, receiver, method, args, *span),
        }
    }

    fn check_binary(&self, scope: Scope<'t>, left: &Expr, op: BinOp, right: &Expr) -> SemaResult<Type> {
        let left_ty = self.check_expr(scope, left)?;
        let right_ty = self.check_expr(scope, right)?;

        let (kind, operand, result) = match op {
            BinOp::And => (OperandMismatch::AndBoolean, Type::Boolean, Type::Boolean),
            BinOp::Lt => (OperandMismatch::CompareInt, Type::Int, Type::Boolean),
            BinOp::Add | BinOp::Sub | BinOp::Mul => {
                (OperandMismatch::ArithmeticInt, Type::Int, Type::Int)
            }
        };

        expect_operand(kind, &operand, left_ty, left.span())?;
        expect_operand(kind, &operand, right_ty, right.span())?;
        Ok(result)
    }

    fn check_message_send(
        &self,
        scope: Scope<'t>,
        receiver: &Expr,
        method: &Ident,
        args: &[Expr],
        span: Span,
    ) -> SemaResult<Type> {
        let receiver_ty = self.check_expr(scope, receiver)?;
        let class = receiver_ty
            .class_name()
            .and_then(|name| self.table.get_class(name))
            .ok_or_else(|| SemanticError::UnknownClass {
                name: receiver_ty.to_string(),
                span: receiver.span(),
            })?;

        // own methods only; inherited methods are not looked up
        let target = self.method_of(class, &method.name, method.span)?;
        trace!("call {}.{} with {} args", class.name, target.name, args.len());

        let mut call = PendingCall::new(target);
        for arg in args {
            let expected = call.next_param(args.len(), arg.span())?;
            let found = self.check_expr(scope, arg)?;
            if !found.is_assignable_to(expected, self.table) {
                return Err(SemanticError::ArgumentTypeMismatch {
                    method: format!("{}.{}", class.name, target.name),
                    position: call.position(),
                    expected: expected.clone(),
                    found,
                    span: arg.span(),
                });
            }
        }
        call.finish(span)?;

        Ok(target.return_type.clone())
    }
}

fn expect_operand(kind: OperandMismatch, expected: &Type, found: Type, span: Span) -> SemaResult<()> {
    if &found != expected {
        return Err(SemanticError::OperandTypeMismatch { kind, found, span });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_source;
    use crate::semantic::declare;
    use pretty_assertions::assert_eq;

    /// Wrap statements in a main class next to the given classes
    fn run(main_body: &str, classes: &str) -> SemaResult<()> {
        let source = format!(
            "class Main {{ public static void main(String[] args) {{ {} }} }}\n{}",
            main_body, classes
        );
        let program = parse_source(&source, 0).unwrap();
        let table = declare(&program)?;
        TypeChecker::new(&table).check_program(&program)
    }

    fn run_classes(classes: &str) -> SemaResult<()> {
        run("", classes)
    }

    /// Check `expr` as the body of `int f(...)`-style probe returning `ret`
    fn probe(ret: &str, decls: &str, expr: &str) -> SemaResult<()> {
        run_classes(&format!(
            "class P {{ public {} f() {{ {} return {}; }} }}",
            ret, decls, expr
        ))
    }

    #[test]
    fn test_well_typed_program() {
        let result = run(
            "System.out.println(new Fac().compute(10));",
            "class Fac { \
               public int compute(int n) { int r; \
                 if (n < 1) r = 1; else r = n * (this.compute(n - 1)); \
                 return r; } }",
        );
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_literals_and_operators() {
        assert!(probe("int", "", "1 + 2").is_ok());
        assert!(probe("boolean", "", "1 < 2").is_ok());
        assert!(probe("boolean", "", "true && false").is_ok());
        assert!(probe("boolean", "", "!true").is_ok());
        assert!(probe("int", "int[] a;", "a[0]").is_ok());
        assert!(probe("int", "int[] a;", "a.length").is_ok());
        assert!(probe("int[]", "", "new int[5]").is_ok());
        assert!(probe("P", "", "this").is_ok());
        assert!(probe("P", "", "new P()").is_ok());
        assert!(probe("int", "", "(3)").is_ok());
    }

    #[test]
    fn test_operand_mismatches() {
        let cases = [
            ("boolean", "", "!1", OperandMismatch::NotBoolean),
            ("boolean", "", "true && 1", OperandMismatch::AndBoolean),
            ("boolean", "", "true < 1", OperandMismatch::CompareInt),
            ("int", "", "1 + true", OperandMismatch::ArithmeticInt),
            ("int", "", "1 * false", OperandMismatch::ArithmeticInt),
            ("int", "int x;", "x[0]", OperandMismatch::IndexNotArray),
            ("int", "int[] a;", "a[true]", OperandMismatch::IndexNotInt),
            ("int", "boolean b;", "b.length", OperandMismatch::LengthNotArray),
            ("int[]", "", "new int[true]", OperandMismatch::SizeNotInt),
        ];
        for (ret, decls, expr, expected) in cases {
            let err = probe(ret, decls, expr).unwrap_err();
            match err {
                SemanticError::OperandTypeMismatch { kind, .. } => assert_eq!(kind, expected, "{}", expr),
                other => panic!("{}: unexpected {:?}", expr, other),
            }
        }
    }

    #[test]
    fn test_left_operand_error_wins() {
        let err = probe("int", "", "missing + true").unwrap_err();
        assert!(matches!(err, SemanticError::UnresolvedIdentifier { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_while_condition_must_be_boolean() {
        let err = run("while (1) { }", "").unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ConditionNotBoolean { construct: "while", found: Type::Int, .. }
        ));
    }

    #[test]
    fn test_if_condition_must_be_boolean() {
        let err = run("if (new int[1]) { } else { }", "").unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ConditionNotBoolean { construct: "if", found: Type::IntArray, .. }
        ));
    }

    #[test]
    fn test_branches_are_checked() {
        let err = run("if (true) { } else { System.out.println(nope); }", "").unwrap_err();
        assert!(matches!(err, SemanticError::UnresolvedIdentifier { .. }));
    }

    #[test]
    fn test_print_accepts_any_type() {
        assert!(run("System.out.println(true);", "").is_ok());
        assert!(run("System.out.println(new int[3]);", "").is_ok());
    }

    #[test]
    fn test_assignment_compatibility() {
        let classes = "class A { } class B extends A { } \
                       class T { public int f() { A a; B b; a = new B(); return 0; } }";
        assert!(run_classes(classes).is_ok());

        let err = run_classes(
            "class A { } class B extends A { } \
             class T { public int f() { A a; B b; b = new A(); return 0; } }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::AssignmentTypeMismatch { ref name, .. } if name == "b"
        ));
    }

    #[test]
    fn test_assignment_to_main_local() {
        assert!(run("", "").is_ok());
        let source = "class Main { public static void main(String[] a) { int x; x = true; } }";
        let program = parse_source(source, 0).unwrap();
        let table = declare(&program).unwrap();
        let err = TypeChecker::new(&table).check_program(&program).unwrap_err();
        assert!(matches!(err, SemanticError::AssignmentTypeMismatch { found: Type::Boolean, .. }));
    }

    #[test]
    fn test_unrelated_class_not_assignable() {
        let err = run_classes(
            "class A { } class B extends A { } \
             class T { public A f() { return new T(); } }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ReturnTypeMismatch { .. }));

        // the relation is directional
        let err = run_classes(
            "class A { } class B extends A { } \
             class T { public B f() { return new A(); } }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ReturnTypeMismatch { .. }));
    }

    #[test]
    fn test_array_assignment_parts() {
        let ok = run_classes(
            "class T { public int f() { int[] a; a = new int[2]; a[0] = 1; return a[0]; } }",
        );
        assert!(ok.is_ok(), "{:?}", ok);

        let cases = [
            ("int a;", "a[0] = 1;", ArrayAssignPart::Target),
            ("int[] a;", "a[true] = 1;", ArrayAssignPart::Index),
            ("int[] a;", "a[0] = false;", ArrayAssignPart::Value),
        ];
        for (decl, stmt, expected) in cases {
            let err = run_classes(&format!(
                "class T {{ public int f() {{ {} {} return 0; }} }}",
                decl, stmt
            ))
            .unwrap_err();
            match err {
                SemanticError::ArrayAssignmentTypeMismatch { part, .. } => assert_eq!(part, expected),
                other => panic!("{}: unexpected {:?}", stmt, other),
            }
        }
    }

    #[test]
    fn test_argument_type_mismatch_position() {
        let err = run_classes(
            "class O { public int m(int a, int b) { return a; } } \
             class T { public int f() { O obj; obj = new O(); return obj.m(1, true); } }",
        )
        .unwrap_err();
        match err {
            SemanticError::ArgumentTypeMismatch {
                method,
                position,
                expected,
                found,
                ..
            } => {
                assert_eq!(method, "O.m");
                assert_eq!(position, 2);
                assert_eq!(expected, Type::Int);
                assert_eq!(found, Type::Boolean);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_argument_counts() {
        let class = "class O { public int m(int a) { return a; } }";
        let too_many = run_classes(&format!(
            "{} class T {{ public int f() {{ return new O().m(1, 2); }} }}",
            class
        ))
        .unwrap_err();
        assert!(matches!(
            too_many,
            SemanticError::ArgumentCountMismatch { expected: 1, got: 2, .. }
        ));

        let too_few = run_classes(&format!(
            "{} class T {{ public int f() {{ return new O().m(); }} }}",
            class
        ))
        .unwrap_err();
        assert!(matches!(
            too_few,
            SemanticError::ArgumentCountMismatch { expected: 1, got: 0, .. }
        ));
    }

    #[test]
    fn test_excess_argument_is_not_evaluated() {
        // the count check fires before the extra argument is resolved
        let err = run_classes(
            "class O { public int m() { return 0; } } \
             class T { public int f() { return new O().m(undefined); } }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::ArgumentCountMismatch { .. }));
    }

    #[test]
    fn test_subclass_argument_accepted() {
        let result = run_classes(
            "class A { } class B extends A { } \
             class O { public int m(A a) { return 0; } } \
             class T { public int f() { return new O().m(new B()); } }",
        );
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_nested_calls_have_independent_arguments() {
        let result = run_classes(
            "class O { public int m(int a, boolean b) { return a; } \
                       public int k(boolean c) { return 1; } } \
             class T { public int f() { O o; o = new O(); return o.m(o.k(true), false); } }",
        );
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_receiver_must_be_declared_class() {
        let err = probe("int", "int x;", "x.m()").unwrap_err();
        assert!(matches!(err, SemanticError::UnknownClass { ref name, .. } if name == "int"));
    }

    #[test]
    fn test_inherited_method_not_found_on_subclass() {
        let err = run_classes(
            "class A { public int m() { return 0; } } class B extends A { } \
             class T { public int f() { return new B().m(); } }",
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::UnresolvedIdentifier { ref name, .. } if name == "m"));
    }

    #[test]
    fn test_return_type_mismatch() {
        let err = run_classes("class A { public boolean f() { return 1; } }").unwrap_err();
        match err {
            SemanticError::ReturnTypeMismatch {
                method,
                expected,
                found,
                ..
            } => {
                assert_eq!(method, "A.f");
                assert_eq!(expected, Type::Boolean);
                assert_eq!(found, Type::Int);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_subclass_return_accepted() {
        let result = run_classes(
            "class A { } class B extends A { public A f() { return new B(); } }",
        );
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_param_shadows_field() {
        let result = run_classes("class A { boolean x; public int f(int x) { return x + 1; } }");
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_parent_field_visible() {
        let result = run_classes(
            "class A { int count; } class B extends A { public int f() { count = 3; return count; } }",
        );
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_unresolved_identifier() {
        let err = probe("int", "", "y").unwrap_err();
        assert!(matches!(err, SemanticError::UnresolvedIdentifier { ref name, .. } if name == "y"));
    }

    #[test]
    fn test_new_of_unknown_class() {
        let err = probe("int", "", "new Ghost().f()").unwrap_err();
        assert!(matches!(err, SemanticError::UnknownClass { ref name, .. } if name == "Ghost"));
    }

    #[test]
    fn test_variable_types_are_resolved() {
        let field = run_classes("class A { Ghost g; }").unwrap_err();
        assert!(matches!(field, SemanticError::UnresolvedIdentifier { ref name, .. } if name == "Ghost"));

        let local = run_classes("class A { public int f() { Ghost g; return 0; } }").unwrap_err();
        assert!(matches!(local, SemanticError::UnresolvedIdentifier { ref name, .. } if name == "Ghost"));

        let main_local = run("Ghost g;", "").unwrap_err();
        assert!(matches!(main_local, SemanticError::UnresolvedIdentifier { .. }));
    }

    #[test]
    fn test_signature_types_are_not_resolved() {
        let param = run_classes("class A { public int f(Ghost g) { return 0; } }");
        assert!(param.is_ok(), "{:?}", param);

        let echo = run_classes("class A { public Ghost f(Ghost g) { return g; } }");
        assert!(echo.is_ok(), "{:?}", echo);

        // the returned value must still fit the written type
        let ret = run_classes("class A { public Ghost f() { return 0; } }");
        assert!(matches!(ret, Err(SemanticError::ReturnTypeMismatch { .. })));
    }

    #[test]
    fn test_forward_class_reference() {
        let result = run_classes(
            "class A { B other; public B get() { return other; } } class B { }",
        );
        assert!(result.is_ok(), "{:?}", result);
    }
}
