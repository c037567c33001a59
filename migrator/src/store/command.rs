use crate::common::Value;
use std::fmt::{Display, Formatter};

/// Data type of a table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    Timestamp,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Real => write!(f, "real"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Definition of one table column: name, data type, and uniqueness.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub unique: bool,
}

impl ColumnDef {
    /// Creates a non-unique column definition.
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        ColumnDef {
            name: name.to_string(),
            column_type,
            unique: false,
        }
    }

    /// Creates a unique column definition.
    pub fn unique(name: &str, column_type: ColumnType) -> Self {
        ColumnDef {
            name: name.to_string(),
            column_type,
            unique: true,
        }
    }
}

/// A row filter, the parameter position of `Select`, `Update` and `Delete`.
///
/// Conditions compare one named column against a bound [Value]. Values of
/// different types never match an ordering condition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// The column value equals the bound value.
    Eq(String, Value),
    /// The column value differs from the bound value.
    Ne(String, Value),
    /// The column value is strictly less than the bound value.
    Lt(String, Value),
    /// The column value is strictly greater than the bound value.
    Gt(String, Value),
}

impl Condition {
    /// Shorthand for an equality condition.
    pub fn eq<V: Into<Value>>(column: &str, value: V) -> Self {
        Condition::Eq(column.to_string(), value.into())
    }

    /// The column this condition addresses.
    pub fn column(&self) -> &str {
        match self {
            Condition::Eq(column, _)
            | Condition::Ne(column, _)
            | Condition::Lt(column, _)
            | Condition::Gt(column, _) => column,
        }
    }

    /// Evaluates this condition against one cell value.
    pub fn matches(&self, cell: &Value) -> bool {
        match self {
            Condition::Eq(_, bound) => cell == bound,
            Condition::Ne(_, bound) => cell != bound,
            Condition::Lt(_, bound) => {
                matches!(compare_values(cell, bound), Some(std::cmp::Ordering::Less))
            }
            Condition::Gt(_, bound) => {
                matches!(compare_values(cell, bound), Some(std::cmp::Ordering::Greater))
            }
        }
    }
}

/// Orders two values of the same variant; `None` when they are incomparable.
fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::Real(x), Value::Real(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// One parameterized store command.
///
/// # Purpose
/// The typed stand-in for a textual SQL statement plus its bound parameters.
/// A store executes commands one at a time, either auto-committed or inside
/// a transaction, and answers each with a [ResultSet] or an error.
///
/// # Variants
/// - `CreateTable`: creates a table from column definitions
/// - `DropTable`: removes a table and all its rows
/// - `AddColumn`: appends a column, backfilling existing rows with a default
/// - `Insert`: appends one row, given one value per column in definition order
/// - `Update`: assigns values to named columns on every row matching the filter
/// - `Delete`: removes every row matching the filter
/// - `Select`: reads the named columns (or all) of every row matching the
///   filter, up to an optional limit
#[derive(Clone, Debug)]
pub enum Command {
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
    },
    DropTable {
        table: String,
    },
    AddColumn {
        table: String,
        column: ColumnDef,
        default: Option<Value>,
    },
    Insert {
        table: String,
        values: Vec<Value>,
    },
    Update {
        table: String,
        assignments: Vec<(String, Value)>,
        filter: Option<Condition>,
    },
    Delete {
        table: String,
        filter: Option<Condition>,
    },
    Select {
        table: String,
        columns: Option<Vec<String>>,
        filter: Option<Condition>,
        limit: Option<usize>,
    },
}

impl Command {
    /// The table this command addresses.
    pub fn table(&self) -> &str {
        match self {
            Command::CreateTable { table, .. }
            | Command::DropTable { table }
            | Command::AddColumn { table, .. }
            | Command::Insert { table, .. }
            | Command::Update { table, .. }
            | Command::Delete { table, .. }
            | Command::Select { table, .. } => table,
        }
    }
}

/// One row of a [ResultSet].
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    /// Returns the value at the given column position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The answer to one store command: column names plus value rows.
///
/// Write commands answer with an empty set carrying only the affected row
/// count; read commands answer with the selected columns and rows.
#[derive(Clone, Debug, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
    rows_affected: usize,
}

impl ResultSet {
    /// Creates a result set for a read command.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        ResultSet {
            columns,
            rows,
            rows_affected: 0,
        }
    }

    /// Creates an empty result set for a write command.
    pub fn with_affected(rows_affected: usize) -> Self {
        ResultSet {
            columns: Vec::new(),
            rows: Vec::new(),
            rows_affected,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows_affected(&self) -> usize {
        self.rows_affected
    }

    /// Returns the position of a named column in this result set.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the value at the given row and named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}
