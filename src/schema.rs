//! Ladder-logic description returned by the model.
//!
//! Field names follow the camelCase JSON the model is asked to produce. Parsing goes through
//! [`LogicResponse::from_json`], which also checks the rules serde alone cannot express.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::constants::{COIL_COLUMN, GRID_COLUMNS};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("response is not valid logic JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("variable #{index} has an empty address")]
    EmptyAddress { index: usize },
    #[error("variable #{index} ({address}) has an empty symbol")]
    EmptySymbol { index: usize, address: String },
    #[error("rung '{rung}' element #{element} is at column {column}, outside the 0-10 ladder grid")]
    ColumnOutOfRange {
        rung: String,
        element: usize,
        column: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub id: String,
    pub address: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub comment: String,
}

/// Graphical symbols the M221 ladder editor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    NormalContact,
    NegatedContact,
    Coil,
    Line,
    Timer,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::NormalContact => "NormalContact",
            ElementKind::NegatedContact => "NegatedContact",
            ElementKind::Coil => "Coil",
            ElementKind::Line => "Line",
            ElementKind::Timer => "Timer",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid edges an element is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connection {
    #[serde(rename = "Left, Right", alias = "Left,Right")]
    LeftRight,
    #[serde(rename = "Left")]
    Left,
    #[serde(rename = "Down, Left, Right", alias = "Down,Left,Right")]
    DownLeftRight,
    #[serde(rename = "Up, Left", alias = "Up,Left")]
    UpLeft,
    #[serde(rename = "None")]
    None,
}

impl Connection {
    pub fn as_str(self) -> &'static str {
        match self {
            Connection::LeftRight => "Left, Right",
            Connection::Left => "Left",
            Connection::DownLeftRight => "Down, Left, Right",
            Connection::UpLeft => "Up, Left",
            Connection::None => "None",
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub descriptor: String,
    #[serde(default)]
    pub symbol: String,
    pub row: u32,
    pub column: u32,
    pub connection: Connection,
}

impl LadderElement {
    /// Coils belong in the rightmost grid column.
    pub fn is_misplaced_coil(&self) -> bool {
        self.kind == ElementKind::Coil && self.column != COIL_COLUMN
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rung {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    pub elements: Vec<LadderElement>,
    pub instruction_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicResponse {
    pub description: String,
    pub variables: Vec<Variable>,
    pub rungs: Vec<Rung>,
    /// Flattened IL, only used for the quick preview.
    pub instruction_list: String,
    pub ladder_logic_steps: Vec<String>,
}

impl LogicResponse {
    /// Parses and validates a model response.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let response: LogicResponse = serde_json::from_str(text)?;
        response.validate()?;
        Ok(response)
    }

    /// Checks the invariants serde does not enforce.
    ///
    /// Duplicate addresses and coils off the last column are tolerated but logged.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for (index, variable) in self.variables.iter().enumerate() {
            if variable.address.trim().is_empty() {
                return Err(SchemaError::EmptyAddress { index });
            }
            if variable.symbol.trim().is_empty() {
                return Err(SchemaError::EmptySymbol {
                    index,
                    address: variable.address.clone(),
                });
            }
            if !seen.insert(variable.address.as_str()) {
                warn!(address = %variable.address, "Duplicate variable address in response");
            }
        }

        for rung in &self.rungs {
            for (element, el) in rung.elements.iter().enumerate() {
                if el.column >= GRID_COLUMNS {
                    return Err(SchemaError::ColumnOutOfRange {
                        rung: rung.name.clone(),
                        element,
                        column: el.column,
                    });
                }
                if el.is_misplaced_coil() {
                    warn!(rung = %rung.name, column = el.column, "Coil is not in the last grid column");
                }
            }
        }
        Ok(())
    }

    /// All rung instruction lines, one per line, for pasting into the IL editor.
    pub fn joined_instruction_lines(&self) -> String {
        self.rungs
            .iter()
            .flat_map(|rung| rung.instruction_lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
