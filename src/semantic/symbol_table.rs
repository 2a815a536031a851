//! Symbol table for classes, fields and methods, plus the scope context
//! carried through a traversal.

use std::collections::HashMap;
use std::fmt;

use log::trace;

use crate::types::Type;
use crate::utils::{SemaResult, SemanticError, Span};

// ==================== Entries ====================

/// Declared shape of one method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry {
    pub name: String,
    pub return_type: Type,
    /// Parameters in declaration order
    pub params: Vec<(String, Type)>,
    /// Local variables in declaration order
    pub locals: Vec<(String, Type)>,
}

impl MethodEntry {
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn declare_param(&mut self, name: &str, ty: Type, span: Span) -> SemaResult<()> {
        if self.param(name).is_some() {
            return Err(SemanticError::DuplicateParameter {
                method: self.name.clone(),
                name: name.to_string(),
                span,
            });
        }
        self.params.push((name.to_string(), ty));
        Ok(())
    }

    /// Append a local variable
    pub fn declare_local(&mut self, name: &str, ty: Type, span: Span) -> SemaResult<()> {
        if self.local(name).is_some() {
            return Err(SemanticError::DuplicateVariable {
                name: name.to_string(),
                span,
            });
        }
        self.locals.push((name.to_string(), ty));
        Ok(())
    }

    pub fn param(&self, name: &str) -> Option<&Type> {
        lookup(&self.params, name)
    }

    pub fn local(&self, name: &str) -> Option<&Type> {
        lookup(&self.locals, name)
    }

    /// Parameter types in declaration order
    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params.iter().map(|(_, ty)| ty)
    }
}

/// Declared shape of one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub name: String,
    pub parent: Option<String>,
    /// Fields in declaration order
    pub fields: Vec<(String, Type)>,
    /// Methods in declaration order
    pub methods: Vec<MethodEntry>,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            name: name.into(),
            parent,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Append a field
    pub fn declare_field(&mut self, name: &str, ty: Type, span: Span) -> SemaResult<()> {
        if self.field(name).is_some() {
            return Err(SemanticError::DuplicateVariable {
                name: name.to_string(),
                span,
            });
        }
        self.fields.push((name.to_string(), ty));
        Ok(())
    }

    /// Append a method and return it for parameter/local collection
    pub fn declare_method(
        &mut self,
        name: &str,
        return_type: Type,
        span: Span,
    ) -> SemaResult<&mut MethodEntry> {
        if self.method(name).is_some() {
            return Err(SemanticError::DuplicateMethod {
                class: self.name.clone(),
                name: name.to_string(),
                span,
            });
        }
        self.methods.push(MethodEntry::new(name, return_type));
        let last = self.methods.len() - 1;
        Ok(&mut self.methods[last])
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        lookup(&self.fields, name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut MethodEntry> {
        self.methods.iter_mut().find(|m| m.name == name)
    }

    /// Own type of this class
    pub fn ty(&self) -> Type {
        Type::class(self.name.clone())
    }
}

fn lookup<'a>(entries: &'a [(String, Type)], name: &str) -> Option<&'a Type> {
    entries.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
}

// ==================== Symbol Table ====================

/// Every class of a program, keyed by name, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    classes: Vec<ClassEntry>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new class
    pub fn declare_class(
        &mut self,
        name: &str,
        parent: Option<&str>,
        span: Span,
    ) -> SemaResult<&mut ClassEntry> {
        if self.index.contains_key(name) {
            return Err(SemanticError::DuplicateClass {
                name: name.to_string(),
                span,
            });
        }
        let id = self.classes.len();
        self.classes
            .push(ClassEntry::new(name, parent.map(str::to_string)));
        self.index.insert(name.to_string(), id);
        Ok(&mut self.classes[id])
    }

    /// Look up a class, failing with `UnknownClass`
    pub fn lookup_class(&self, name: &str, span: Span) -> SemaResult<&ClassEntry> {
        self.get_class(name).ok_or_else(|| SemanticError::UnknownClass {
            name: name.to_string(),
            span,
        })
    }

    pub fn get_class(&self, name: &str) -> Option<&ClassEntry> {
        self.index.get(name).map(|&id| &self.classes[id])
    }

    pub fn get_class_mut(&mut self, name: &str) -> Option<&mut ClassEntry> {
        match self.index.get(name) {
            Some(&id) => Some(&mut self.classes[id]),
            None => None,
        }
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The declared parent of `class`, if any
    pub fn parent_of(&self, class: &ClassEntry) -> Option<&ClassEntry> {
        class.parent.as_deref().and_then(|p| self.get_class(p))
    }

    /// All classes in declaration order
    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol table:")?;
        for class in &self.classes {
            match &class.parent {
                Some(parent) => writeln!(f, "class {} extends {}", class.name, parent)?,
                None => writeln!(f, "class {}", class.name)?,
            }
            for (name, ty) in &class.fields {
                writeln!(f, "    field {}: {}", name, ty)?;
            }
            for method in &class.methods {
                let params: Vec<String> = method
                    .params
                    .iter()
                    .map(|(name, ty)| format!("{} {}", ty, name))
                    .collect();
                writeln!(f, "    method {} {}({})", method.return_type, method.name, params.join(", "))?;
                for (name, ty) in &method.locals {
                    writeln!(f, "        local {}: {}", name, ty)?;
                }
            }
        }
        Ok(())
    }
}

// ==================== Scope Context ====================

/// Where a traversal currently is. Passed down by value; entering a class or
/// method yields a new scope for the nested walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    class: Option<&'a ClassEntry>,
    method: Option<&'a MethodEntry>,
}

impl<'a> Scope<'a> {
    /// Scope outside of any class
    pub fn root() -> Self {
        Self::default()
    }

    pub fn enter_class(self, class: &'a ClassEntry) -> Self {
        Self {
            class: Some(class),
            method: None,
        }
    }

    pub fn enter_method(self, method: &'a MethodEntry) -> Self {
        Self {
            class: self.class,
            method: Some(method),
        }
    }

    pub fn class(&self) -> Option<&'a ClassEntry> {
        self.class
    }

    pub fn method(&self) -> Option<&'a MethodEntry> {
        self.method
    }

    /// Resolve a bare identifier to its type.
    ///
    /// Order: method parameters, method locals, class names, own fields, own
    /// methods, then the parent's fields and methods. A method name resolves
    /// to a class reference named after itself. Outside any class the name is
    /// taken verbatim as a class reference.
    pub fn resolve(&self, table: &SymbolTable, name: &str, span: Span) -> SemaResult<Type> {
        let Some(class) = self.class else {
            return Ok(Type::class(name));
        };

        if let Some(method) = self.method {
            if let Some(ty) = method.param(name).or_else(|| method.local(name)) {
                trace!("resolved {} as variable of {}.{}", name, class.name, method.name);
                return Ok(ty.clone());
            }
        }

        if table.contains_class(name) {
            return Ok(Type::class(name));
        }

        if let Some(found) = Self::resolve_member(class, name) {
            trace!("resolved {} as member of {}", name, class.name);
            return Ok(found);
        }

        if let Some(parent) = table.parent_of(class) {
            if let Some(found) = Self::resolve_member(parent, name) {
                trace!("resolved {} as member of parent {}", name, parent.name);
                return Ok(found);
            }
        }

        Err(SemanticError::UnresolvedIdentifier {
            name: name.to_string(),
            span,
        })
    }

    fn resolve_member(class: &ClassEntry, name: &str) -> Option<Type> {
        if let Some(ty) = class.field(name) {
            return Some(ty.clone());
        }
        class.method(name).map(|m| Type::class(m.name.clone()))
    }
}

// ==================== Pending Call ====================

/// Expected parameter list and cursor for one in-flight message send.
/// Each call builds its own, so nested calls in an argument list never
/// share state.
#[derive(Debug)]
pub struct PendingCall<'a> {
    method: &'a MethodEntry,
    index: usize,
}

impl<'a> PendingCall<'a> {
    pub fn new(method: &'a MethodEntry) -> Self {
        Self { method, index: 0 }
    }

    /// Take the parameter the next argument must match
    pub fn next_param(&mut self, got: usize, span: Span) -> SemaResult<&'a Type> {
        let method = self.method;
        match method.params.get(self.index) {
            Some((_, ty)) => {
                self.index += 1;
                Ok(ty)
            }
            None => Err(SemanticError::ArgumentCountMismatch {
                method: method.name.clone(),
                expected: method.params.len(),
                got,
                span,
            }),
        }
    }

    /// 1-based position of the argument last taken
    pub fn position(&self) -> usize {
        self.index
    }

    /// Verify that every parameter received an argument
    pub fn finish(self, span: Span) -> SemaResult<()> {
        if self.index < self.method.params.len() {
            return Err(SemanticError::ArgumentCountMismatch {
                method: self.method.name.clone(),
                expected: self.method.params.len(),
                got: self.index,
                span,
            });
        }
        Ok(())
    }
}
