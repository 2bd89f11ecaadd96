//! Domain entities: core data structures

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::error::DomainError;

/// A named cell (structure) of a layout library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub name: String,
}

impl Cell {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// In-memory inventory of a loaded layout: the library name plus its cells
/// in file order.
///
/// Cell names are unique within a library; insertion order is preserved
/// because it is what `list_cells` prints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellLibrary {
    name: String,
    cells: Vec<Cell>,
    index: HashMap<String, usize>,
}

impl CellLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a cell, rejecting duplicate names.
    pub fn push(&mut self, cell: Cell) -> Result<(), DomainError> {
        if self.index.contains_key(&cell.name) {
            return Err(DomainError::DuplicateCell(cell.name));
        }
        self.index.insert(cell.name.clone(), self.cells.len());
        self.cells.push(cell);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&Cell> {
        self.index.get(name).map(|&i| &self.cells[i])
    }

    /// Cell names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.name.as_str())
    }
}

/// File-level metadata from the probe phase of a load.
///
/// Both units are in meters, e.g. a user unit of 1e-6 and a database unit
/// of 1e-9 for a micron-gridded design.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMeta {
    pub user_unit: f64,
    pub db_unit: f64,
}

impl LayoutMeta {
    pub fn new(user_unit: f64, db_unit: f64) -> Result<Self, DomainError> {
        let valid = |u: f64| u.is_finite() && u > 0.0;
        if !valid(user_unit) || !valid(db_unit) {
            return Err(DomainError::InvalidUnits { user_unit, db_unit });
        }
        Ok(Self { user_unit, db_unit })
    }
}

/// One planned subprocess run: program plus argument vector.
///
/// Execution always passes the vector straight to the OS; the space-joined
/// form produced by `Display` exists only for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Expected exporter output for a given input file: the input path with the
/// artifact suffix appended (not an extension replacement).
pub fn artifact_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
