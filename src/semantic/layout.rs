//! Object layout: field and method slot offsets per class

use std::fmt;

use crate::semantic::symbol_table::{ClassEntry, SymbolTable};
use crate::types::type_system::POINTER_SIZE;

/// Offsets of a class's own fields and methods, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayout {
    pub class: String,
    pub field_offsets: Vec<(String, usize)>,
    pub method_offsets: Vec<(String, usize)>,
}

impl ClassLayout {
    /// Lay out `class`, starting after its parent's own fields and methods
    pub fn compute(table: &SymbolTable, class: &ClassEntry) -> Self {
        let (mut field_offset, mut method_offset) = match table.parent_of(class) {
            Some(parent) => (fields_size(parent), methods_size(parent)),
            None => (0, 0),
        };

        let field_offsets = class
            .fields
            .iter()
            .map(|(name, ty)| {
                let offset = field_offset;
                field_offset += ty.size_of();
                (name.clone(), offset)
            })
            .collect();

        let method_offsets = class
            .methods
            .iter()
            .map(|method| {
                let offset = method_offset;
                method_offset += POINTER_SIZE;
                (method.name.clone(), offset)
            })
            .collect();

        Self {
            class: class.name.clone(),
            field_offsets,
            method_offsets,
        }
    }

    pub fn field_offset(&self, name: &str) -> Option<usize> {
        self.field_offsets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, offset)| *offset)
    }

    pub fn method_offset(&self, name: &str) -> Option<usize> {
        self.method_offsets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, offset)| *offset)
    }
}

/// Bytes taken by the class's own fields
pub fn fields_size(class: &ClassEntry) -> usize {
    class.fields.iter().map(|(_, ty)| ty.size_of()).sum()
}

/// Bytes taken by the class's own method slots
pub fn methods_size(class: &ClassEntry) -> usize {
    class.methods.len() * POINTER_SIZE
}

/// Layout of the named class
pub fn layout_of(table: &SymbolTable, name: &str) -> Option<ClassLayout> {
    table
        .get_class(name)
        .map(|class| ClassLayout::compute(table, class))
}

/// Layouts of every class in declaration order
pub fn layouts(table: &SymbolTable) -> Vec<ClassLayout> {
    table
        .classes()
        .map(|class| ClassLayout::compute(table, class))
        .collect()
}

impl fmt::Display for ClassLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-----------Class {}-----------", self.class)?;
        writeln!(f, "--Variables---")?;
        for (name, offset) in &self.field_offsets {
            writeln!(f, "{}.{}:{}", self.class, name, offset)?;
        }
        writeln!(f, "---Methods---")?;
        for (name, offset) in &self.method_offsets {
            writeln!(f, "{}.{}:{}", self.class, name, offset)?;
        }
        Ok(())
    }
}
