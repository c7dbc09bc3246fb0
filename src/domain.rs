use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

static TARGET_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^CHEMBL\d+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetChemblId(String);

impl TargetChemblId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetChemblId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TargetChemblId {
    type Err = ExplorerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        if !TARGET_ID_RE.is_match(&normalized) {
            return Err(ExplorerError::InvalidTargetId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandardType {
    #[serde(rename = "IC50")]
    Ic50,
}

impl StandardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardType::Ic50 => "IC50",
        }
    }
}

impl fmt::Display for StandardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Columns picked for export, in the order they were picked.
///
/// An empty selection means "every column".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection(Vec<String>);

impl ColumnSelection {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut picked: Vec<String> = Vec::new();
        for column in columns {
            let column: String = column.into();
            let column = column.trim();
            if column.is_empty() || picked.iter().any(|existing| existing == column) {
                continue;
            }
            picked.push(column.to_string());
        }
        Self(picked)
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|picked| picked == column)
    }

    /// Adds the column at the end, or removes it if it was already picked.
    pub fn toggled(&self, column: &str) -> Self {
        if self.contains(column) {
            Self(
                self.0
                    .iter()
                    .filter(|picked| picked.as_str() != column)
                    .cloned()
                    .collect(),
            )
        } else {
            let mut next = self.0.clone();
            next.push(column.to_string());
            Self(next)
        }
    }
}

impl FromStr for ColumnSelection {
    type Err = ExplorerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(value.split(',')))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Html,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}
