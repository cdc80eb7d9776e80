use std::fmt;

use crate::error::ConfigError;

/// Rendering target for a run. The set is closed: anything else is rejected
/// while the config is resolved, before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Pipe,
    Pdf,
}

impl OutputFormat {
    /// Extension substituted for the `{ext}` placeholder.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Pipe => "txt",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Pipe => "pipe",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "pipe" => Ok(OutputFormat::Pipe),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Where the artifact ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    Local,
    Sftp,
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMethod::Local => f.write_str("local"),
            DeliveryMethod::Sftp => f.write_str("sftp"),
        }
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(DeliveryMethod::Local),
            "sftp" => Ok(DeliveryMethod::Sftp),
            _ => Err(ConfigError::UnknownDelivery(s.to_string())),
        }
    }
}

/// A single cell as returned by the database driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            // Whole floats keep a trailing ".0" so they stay distinguishable
            // from integer columns in the output.
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{x:.1}")
            }
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => {
                f.write_str("\\x")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Columns and rows of one query, in the order the database produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must be aligned with `columns`.
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row/column mismatch");
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Every row rendered to display strings, column-aligned.
    pub fn text_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
    }
}

/// Rendered output of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Text(String),
    Binary(Vec<u8>),
}

impl Artifact {
    /// Raw bytes to write; text is UTF-8 encoded.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Artifact::Text(s) => s.as_bytes(),
            Artifact::Binary(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Text(_) => "text",
            Artifact::Binary(_) => "binary",
        }
    }
}

/// Outcome of a delivery attempt, used for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success: bool,
    pub filename: String,
}

impl DeliveryResult {
    pub fn ok(filename: impl Into<String>) -> Self {
        Self {
            success: true,
            filename: filename.into(),
        }
    }

    pub fn failed(filename: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: filename.into(),
        }
    }
}
