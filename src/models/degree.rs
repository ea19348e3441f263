//! Degree records scraped from the registry results table.

use std::fmt;

/// Columns every degree table on the portal carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DegreeColumn {
    Title,
    Institution,
    Kind,
    RecognizedBy,
    RegistrationNumber,
    RegistrationDate,
    FieldOfKnowledge,
    Remarks,
}

impl DegreeColumn {
    /// All columns in the order the portal displays them.
    pub const ALL: [DegreeColumn; 8] = [
        DegreeColumn::Title,
        DegreeColumn::Institution,
        DegreeColumn::Kind,
        DegreeColumn::RecognizedBy,
        DegreeColumn::RegistrationNumber,
        DegreeColumn::RegistrationDate,
        DegreeColumn::FieldOfKnowledge,
        DegreeColumn::Remarks,
    ];

    /// Header text as rendered by the portal.
    pub fn header(&self) -> &'static str {
        match self {
            DegreeColumn::Title => "Título",
            DegreeColumn::Institution => "Institución de Educación Superior",
            DegreeColumn::Kind => "Tipo",
            DegreeColumn::RecognizedBy => "Reconocido Por",
            DegreeColumn::RegistrationNumber => "Número de Registro",
            DegreeColumn::RegistrationDate => "Fecha de Registro",
            DegreeColumn::FieldOfKnowledge => "Área o Campo de Conocimiento",
            DegreeColumn::Remarks => "Observación",
        }
    }
}

impl fmt::Display for DegreeColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One body row of a degree table.
///
/// Cells are kept exactly as found (trimmed), alongside the headers of the
/// table they came from. A malformed row simply has fewer cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeRecord {
    headers: Vec<String>,
    cells: Vec<String>,
}

impl DegreeRecord {
    pub fn new(headers: Vec<String>, cells: Vec<String>) -> Self {
        Self { headers, cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell under `column`, located by header text rather than position.
    pub fn get(&self, column: DegreeColumn) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == column.header())?;
        self.cells.get(idx).map(String::as_str)
    }
}
