//! # `remates-sheets`: Listing Input and Report Output
//!
//! This crate owns both spreadsheet ends of the pipeline: loading the
//! uploaded listing (whose header row sits at an unpredictable depth) and
//! writing the consolidated report workbook to an in-memory buffer.

use calamine::{open_workbook_auto, Data, Reader};
use remates::listado::HEADER_MARKER;
use remates::{Annotation, Extraction, Ficha, ListingTable};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Header of the column holding the extraction text in the report.
pub const COL_DETALLES: &str = "Detalles Extraídos";

/// Headers for the annotation columns appended when AI annotation ran.
pub const COLS_FICHA: [&str; 8] = [
    "Radicado",
    "Juzgado",
    "Avalúo",
    "Postura",
    "Matrícula",
    "Dirección",
    "Riesgo",
    "Score",
];

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Failed to read the workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("The workbook does not contain any worksheets")]
    NoWorksheet,
    #[error("No row containing the header marker '{HEADER_MARKER}' was found")]
    HeaderNotFound,
    #[error("Failed to write the report workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("Mismatched row count: {0} results for {1} rows")]
    Misaligned(usize, usize),
}

// --- Input Loading ---

/// Loads the uploaded listing from an xlsx file.
///
/// The sheet is scanned for the row containing the [`HEADER_MARKER`] cell;
/// that row becomes the header and everything below it the data. Rows above
/// the marker (logos, titles, blank padding) are discarded.
pub fn cargar_listado(path: impl AsRef<Path>) -> Result<ListingTable, SheetError> {
    let path = path.as_ref();
    info!("Loading listing from: {}", path.display());

    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SheetError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let rows: Vec<&[Data]> = range.rows().collect();
    let header_idx = rows
        .iter()
        .position(|row| row.iter().any(|cell| cell_to_string(cell) == HEADER_MARKER))
        .ok_or(SheetError::HeaderNotFound)?;

    let headers: Vec<String> = rows[header_idx].iter().map(cell_to_string).collect();
    let data: Vec<Vec<String>> = rows[header_idx + 1..]
        .iter()
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
            // Short rows still get one cell per header column.
            cells.resize(headers.len(), String::new());
            cells
        })
        .collect();

    info!(
        "Loaded {} listing rows below header row {}",
        data.len(),
        header_idx
    );
    Ok(ListingTable::new(headers, data))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

// --- Report Writing ---

/// Writes the consolidated report to an in-memory xlsx buffer: the filtered
/// listing, one `Detalles Extraídos` column, and — when annotations are
/// present — the eight ficha columns aligned by position.
pub fn exportar_reporte(
    filtrado: &ListingTable,
    detalles: &[Extraction],
    fichas: Option<&[Annotation]>,
) -> Result<Vec<u8>, SheetError> {
    if detalles.len() != filtrado.len() {
        return Err(SheetError::Misaligned(detalles.len(), filtrado.len()));
    }
    if let Some(fichas) = fichas {
        if fichas.len() != filtrado.len() {
            return Err(SheetError::Misaligned(fichas.len(), filtrado.len()));
        }
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    // Header row: original columns, the extraction column, then the ficha
    // columns when annotation ran.
    let mut col: u16 = 0;
    for header in &filtrado.headers {
        worksheet.write_string_with_format(0, col, header, &header_format)?;
        col += 1;
    }
    let detalles_col = col;
    worksheet.write_string_with_format(0, detalles_col, COL_DETALLES, &header_format)?;
    if fichas.is_some() {
        for (offset, header) in COLS_FICHA.iter().enumerate() {
            worksheet.write_string_with_format(
                0,
                detalles_col + 1 + offset as u16,
                *header,
                &header_format,
            )?;
        }
    }

    for (i, row) in filtrado.rows.iter().enumerate() {
        let fila = (i + 1) as u32;
        for (j, value) in row.iter().enumerate() {
            worksheet.write_string(fila, j as u16, value)?;
        }
        worksheet.write_string(fila, detalles_col, detalles[i].as_cell())?;

        if let Some(fichas) = fichas {
            if let Some(ficha) = fichas[i].as_ficha() {
                escribir_ficha(worksheet, fila, detalles_col + 1, ficha)?;
            }
            // `Vacia` entries leave their cells empty rather than shifting
            // the remaining rows.
        }
    }

    info!("Report written: {} data rows", filtrado.len());
    Ok(workbook.save_to_buffer()?)
}

fn escribir_ficha(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    fila: u32,
    base: u16,
    ficha: &Ficha,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    if let Some(radicado) = &ficha.radicado {
        worksheet.write_string(fila, base, radicado)?;
    }
    if let Some(juzgado) = &ficha.juzgado {
        worksheet.write_string(fila, base + 1, juzgado)?;
    }
    if let Some(avaluo) = ficha.avaluo {
        worksheet.write_number(fila, base + 2, avaluo)?;
    }
    if let Some(postura) = ficha.postura {
        worksheet.write_number(fila, base + 3, postura)?;
    }
    if let Some(matricula) = &ficha.matricula {
        worksheet.write_string(fila, base + 4, matricula)?;
    }
    if let Some(direccion) = &ficha.direccion {
        worksheet.write_string(fila, base + 5, direccion)?;
    }
    if let Some(riesgo) = &ficha.riesgo {
        worksheet.write_string(fila, base + 6, riesgo)?;
    }
    if let Some(score) = ficha.score {
        worksheet.write_number(fila, base + 7, score)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_to_string_drops_float_artifacts() {
        assert_eq!(cell_to_string(&Data::Float(1001.0)), "1001");
        assert_eq!(cell_to_string(&Data::Float(10.5)), "10.5");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("  Bogotá ".to_string())), "Bogotá");
    }

    #[test]
    fn misaligned_results_are_rejected() {
        let tabla = ListingTable::new(vec!["CÓDIGO".to_string()], vec![vec!["1".to_string()]]);
        let result = exportar_reporte(&tabla, &[], None);
        assert!(matches!(result, Err(SheetError::Misaligned(0, 1))));
    }
}
