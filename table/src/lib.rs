use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{0}' already exists")]
    DuplicateColumn(String),
    #[error("column '{0}' has {1} rows, expected {2}")]
    RowCountMismatch(String, usize, usize),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("column '{0}' is not categorical")]
    NotCategorical(String),
    #[error("column '{0}' holds non-integer value '{1}'")]
    NonIntegerValue(String, String),
    #[error("tables have different column layouts")]
    LayoutMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Column {
    Categorical(Vec<String>),
    Numeric(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(values) => values.len(),
            Column::Numeric(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Column::Categorical(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }
}

/// Tabular measurements: one row per entity, insertion-ordered named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataTable {
    columns: Vec<(String, Column)>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, col)| col.len()).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn categorical_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, col)| col.is_categorical())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn numeric_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, col)| col.is_numeric())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(col_name, _)| col_name == name)
            .map(|(_, col)| col)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn push_column(&mut self, name: &str, column: Column) -> Result<(), TableError> {
        if self.has_column(name) {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(TableError::RowCountMismatch(
                name.to_string(),
                column.len(),
                self.n_rows(),
            ));
        }
        self.columns.push((name.to_string(), column));
        Ok(())
    }

    /// Replaces a numeric column, or appends it when absent.
    pub fn set_numeric(&mut self, name: &str, values: Vec<f64>) -> Result<(), TableError> {
        if !self.columns.is_empty() && values.len() != self.n_rows() {
            return Err(TableError::RowCountMismatch(
                name.to_string(),
                values.len(),
                self.n_rows(),
            ));
        }
        for (col_name, col) in &mut self.columns {
            if col_name == name {
                *col = Column::Numeric(values);
                return Ok(());
            }
        }
        self.columns.push((name.to_string(), Column::Numeric(values)));
        Ok(())
    }

    /// Replaces a categorical column, or appends it when absent.
    pub fn set_categorical(&mut self, name: &str, values: Vec<String>) -> Result<(), TableError> {
        if !self.columns.is_empty() && values.len() != self.n_rows() {
            return Err(TableError::RowCountMismatch(
                name.to_string(),
                values.len(),
                self.n_rows(),
            ));
        }
        for (col_name, col) in &mut self.columns {
            if col_name == name {
                *col = Column::Categorical(values);
                return Ok(());
            }
        }
        self.columns
            .push((name.to_string(), Column::Categorical(values)));
        Ok(())
    }

    pub fn categorical_values(&self, name: &str) -> Result<&[String], TableError> {
        match self.column(name) {
            Some(Column::Categorical(values)) => Ok(values),
            Some(_) => Err(TableError::NotCategorical(name.to_string())),
            None => Err(TableError::UnknownColumn(name.to_string())),
        }
    }

    pub fn numeric_values(&self, name: &str) -> Result<&[f64], TableError> {
        match self.column(name) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(_) => Err(TableError::NotNumeric(name.to_string())),
            None => Err(TableError::UnknownColumn(name.to_string())),
        }
    }

    /// Entity identifiers: a categorical column of non-negative integers, or a
    /// numeric column of integral non-negative values.
    pub fn integer_values(&self, name: &str) -> Result<Vec<u64>, TableError> {
        match self.column(name) {
            Some(Column::Categorical(values)) => values
                .iter()
                .map(|value| {
                    value.trim().parse::<u64>().map_err(|_| {
                        TableError::NonIntegerValue(name.to_string(), value.clone())
                    })
                })
                .collect(),
            Some(Column::Numeric(values)) => values
                .iter()
                .map(|value| {
                    if value.fract() == 0.0 && *value >= 0.0 {
                        Ok(*value as u64)
                    } else {
                        Err(TableError::NonIntegerValue(
                            name.to_string(),
                            value.to_string(),
                        ))
                    }
                })
                .collect(),
            None => Err(TableError::UnknownColumn(name.to_string())),
        }
    }

    /// Clones the named columns into a new table, in the order given.
    pub fn select(&self, names: &[String]) -> Result<DataTable, TableError> {
        let mut selected = DataTable::new();
        for name in names {
            let column = self
                .column(name)
                .ok_or_else(|| TableError::UnknownColumn(name.clone()))?;
            selected.push_column(name, column.clone())?;
        }
        Ok(selected)
    }

    /// Row-major matrix of the named numeric columns.
    pub fn feature_matrix(&self, names: &[String]) -> Result<Array2<f64>, TableError> {
        let rows = self.n_rows();
        let mut matrix = Array2::zeros((rows, names.len()));
        for (j, name) in names.iter().enumerate() {
            let values = self.numeric_values(name)?;
            for (i, value) in values.iter().enumerate() {
                matrix[[i, j]] = *value;
            }
        }
        Ok(matrix)
    }

    /// Appends another table's rows. Both tables must share the same column
    /// names, order and kinds.
    pub fn concat_rows(&mut self, other: &DataTable) -> Result<(), TableError> {
        if self.columns.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        if self.n_cols() != other.n_cols() {
            return Err(TableError::LayoutMismatch);
        }
        for ((name, col), (other_name, other_col)) in
            self.columns.iter_mut().zip(other.columns.iter())
        {
            if name != other_name {
                return Err(TableError::LayoutMismatch);
            }
            match (col, other_col) {
                (Column::Categorical(values), Column::Categorical(other_values)) => {
                    values.extend(other_values.iter().cloned());
                }
                (Column::Numeric(values), Column::Numeric(other_values)) => {
                    values.extend(other_values.iter().copied());
                }
                _ => return Err(TableError::LayoutMismatch),
            }
        }
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let data = fs::read(path)?;
        let table = serde_json::from_slice(&data)?;
        Ok(table)
    }

    pub fn write_csv<W: Write>(&self, writer: &mut W, separator: &str) -> Result<(), TableError> {
        let header = self.column_names().join(separator);
        writeln!(writer, "{header}")?;
        for row in 0..self.n_rows() {
            let mut values = Vec::with_capacity(self.n_cols());
            for (_, column) in &self.columns {
                match column {
                    Column::Categorical(col) => values.push(col[row].clone()),
                    Column::Numeric(col) => values.push(col[row].to_string()),
                }
            }
            writeln!(writer, "{}", values.join(separator))?;
        }
        Ok(())
    }
}
