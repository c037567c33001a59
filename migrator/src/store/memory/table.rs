use crate::common::Value;
use crate::errors::{ErrorKind, MigratorError, MigratorResult};
use crate::store::{ColumnDef, ColumnType, Condition, ResultSet, Row};

/// One in-memory table: column definitions plus value rows.
///
/// Enforces the command semantics a SQL backend would: column arity and type
/// checks, unique-column constraints, and named-column resolution. Null is
/// accepted in any column and is exempt from uniqueness.
#[derive(Clone, Debug)]
pub(super) struct Table {
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub(super) fn new(columns: Vec<ColumnDef>) -> MigratorResult<Self> {
        if columns.is_empty() {
            return Err(MigratorError::new(
                "a table requires at least one column",
                ErrorKind::InvalidArgument,
            ));
        }
        for (index, column) in columns.iter().enumerate() {
            if columns[..index].iter().any(|c| c.name == column.name) {
                return Err(MigratorError::new(
                    &format!("duplicate column name `{}`", column.name),
                    ErrorKind::InvalidArgument,
                ));
            }
        }
        Ok(Table {
            columns,
            rows: Vec::new(),
        })
    }

    pub(super) fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_index(&self, name: &str) -> MigratorResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| {
                MigratorError::new(
                    &format!("no such column: {}", name),
                    ErrorKind::ColumnNotFound,
                )
            })
    }

    fn check_value(column: &ColumnDef, value: &Value) -> MigratorResult<()> {
        let matches = match column.column_type {
            ColumnType::Integer => matches!(value, Value::Null | Value::Integer(_)),
            ColumnType::Real => matches!(value, Value::Null | Value::Real(_)),
            ColumnType::Text => matches!(value, Value::Null | Value::Text(_)),
            ColumnType::Boolean => matches!(value, Value::Null | Value::Boolean(_)),
            ColumnType::Timestamp => matches!(value, Value::Null | Value::Timestamp(_)),
        };
        if !matches {
            return Err(MigratorError::new(
                &format!(
                    "column `{}` expects {}, got {}",
                    column.name,
                    column.column_type,
                    value.type_name()
                ),
                ErrorKind::InvalidDataType,
            ));
        }
        Ok(())
    }

    /// Verifies every unique column holds pairwise distinct non-null values.
    fn check_unique(columns: &[ColumnDef], rows: &[Vec<Value>]) -> MigratorResult<()> {
        for (index, column) in columns.iter().enumerate() {
            if !column.unique {
                continue;
            }
            for (a, row_a) in rows.iter().enumerate() {
                if row_a[index].is_null() {
                    continue;
                }
                if rows[..a].iter().any(|row_b| row_b[index] == row_a[index]) {
                    return Err(MigratorError::new(
                        &format!(
                            "unique constraint violated on column `{}` (value {})",
                            column.name, row_a[index]
                        ),
                        ErrorKind::UniqueConstraintViolation,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Resolves a filter against this table's columns; `None` matches all rows.
    fn matching_rows(&self, filter: Option<&Condition>) -> MigratorResult<Vec<usize>> {
        let Some(condition) = filter else {
            return Ok((0..self.rows.len()).collect());
        };
        let index = self.column_index(condition.column())?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| condition.matches(&row[index]))
            .map(|(i, _)| i)
            .collect())
    }

    pub(super) fn insert(&mut self, values: &[Value]) -> MigratorResult<usize> {
        if values.len() != self.columns.len() {
            return Err(MigratorError::new(
                &format!(
                    "table expects {} values, got {}",
                    self.columns.len(),
                    values.len()
                ),
                ErrorKind::InvalidDataType,
            ));
        }
        for (column, value) in self.columns.iter().zip(values) {
            Self::check_value(column, value)?;
        }
        self.rows.push(values.to_vec());
        if let Err(e) = Self::check_unique(&self.columns, &self.rows) {
            self.rows.pop();
            return Err(e);
        }
        Ok(1)
    }

    pub(super) fn update(
        &mut self,
        assignments: &[(String, Value)],
        filter: Option<&Condition>,
    ) -> MigratorResult<usize> {
        let mut resolved = Vec::with_capacity(assignments.len());
        for (name, value) in assignments {
            let index = self.column_index(name)?;
            Self::check_value(&self.columns[index], value)?;
            resolved.push((index, value.clone()));
        }
        let targets = self.matching_rows(filter)?;

        let mut updated = self.rows.clone();
        for &row_index in &targets {
            for (column_index, value) in &resolved {
                updated[row_index][*column_index] = value.clone();
            }
        }
        Self::check_unique(&self.columns, &updated)?;
        self.rows = updated;
        Ok(targets.len())
    }

    pub(super) fn delete(&mut self, filter: Option<&Condition>) -> MigratorResult<usize> {
        let targets = self.matching_rows(filter)?;
        let mut index = 0usize;
        self.rows.retain(|_| {
            let keep = !targets.contains(&index);
            index += 1;
            keep
        });
        Ok(targets.len())
    }

    pub(super) fn add_column(
        &mut self,
        column: ColumnDef,
        default: Option<Value>,
    ) -> MigratorResult<usize> {
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(MigratorError::new(
                &format!("duplicate column name `{}`", column.name),
                ErrorKind::InvalidArgument,
            ));
        }
        let fill = default.unwrap_or(Value::Null);
        Self::check_value(&column, &fill)?;
        if column.unique && !fill.is_null() && self.rows.len() > 1 {
            return Err(MigratorError::new(
                &format!(
                    "unique constraint violated on column `{}` (value {})",
                    column.name, fill
                ),
                ErrorKind::UniqueConstraintViolation,
            ));
        }
        self.columns.push(column);
        for row in &mut self.rows {
            row.push(fill.clone());
        }
        Ok(self.rows.len())
    }

    pub(super) fn select(
        &self,
        columns: Option<&[String]>,
        filter: Option<&Condition>,
        limit: Option<usize>,
    ) -> MigratorResult<ResultSet> {
        let projection: Vec<usize> = match columns {
            Some(names) => names
                .iter()
                .map(|name| self.column_index(name))
                .collect::<MigratorResult<_>>()?,
            None => (0..self.columns.len()).collect(),
        };
        let names: Vec<String> = projection
            .iter()
            .map(|&i| self.columns[i].name.clone())
            .collect();

        let mut targets = self.matching_rows(filter)?;
        if let Some(limit) = limit {
            targets.truncate(limit);
        }
        let rows = targets
            .iter()
            .map(|&row_index| {
                Row::new(
                    projection
                        .iter()
                        .map(|&column_index| self.rows[row_index][column_index].clone())
                        .collect(),
                )
            })
            .collect();
        Ok(ResultSet::new(names, rows))
    }
}
