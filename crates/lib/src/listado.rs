//! # Listing Table
//!
//! In-memory representation of the uploaded auction listing. The column set
//! is not fixed by the program; it is whatever the header row of the
//! spreadsheet declares. Only three columns are given meaning: the lookup
//! code and the two geography columns used for filtering.

/// The cell value that identifies the header row inside the raw worksheet.
pub const HEADER_MARKER: &str = "CÓDIGO";
/// Column holding the lookup code for each listing.
pub const COL_CODIGO: &str = "CÓDIGO";
/// Geography columns the filter operates on.
pub const COL_DEPARTAMENTO: &str = "Departamento";
pub const COL_CIUDAD: &str = "Ciudad";

/// A loaded listing: one header row plus string-valued data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ListingTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if the header row declares it.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value by row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Distinct non-empty values of a column, in first-seen order. This is
    /// what a caller presents as the available filter choices.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let Some(col) = self.column_index(column) else {
            return Vec::new();
        };
        let mut values: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(value) = row.get(col) {
                if !value.is_empty() && !values.iter().any(|v| v == value) {
                    values.push(value.clone());
                }
            }
        }
        values
    }

    /// Applies the equality-set filters and the index range, producing the
    /// subset of rows to process. The output never exceeds the input and
    /// the range is clamped to the table bounds.
    pub fn filter(&self, filtro: &ListadoFilter) -> ListingTable {
        let dep_col = self.column_index(COL_DEPARTAMENTO);
        let ciudad_col = self.column_index(COL_CIUDAD);

        let retained: Vec<Vec<String>> = self
            .rows
            .iter()
            .filter(|row| {
                matches_set(row, dep_col, &filtro.departamentos)
                    && matches_set(row, ciudad_col, &filtro.ciudades)
            })
            .cloned()
            .collect();

        let rows = match filtro.rango {
            Some((desde, hasta)) => {
                let desde = desde.min(retained.len());
                let hasta = hasta.clamp(desde, retained.len());
                retained[desde..hasta].to_vec()
            }
            None => retained,
        };

        ListingTable {
            headers: self.headers.clone(),
            rows,
        }
    }
}

/// Row filter: empty sets mean "no constraint", the range applies after the
/// equality filters.
#[derive(Debug, Clone, Default)]
pub struct ListadoFilter {
    pub departamentos: Vec<String>,
    pub ciudades: Vec<String>,
    /// Half-open row range `[desde, hasta)` over the filtered rows.
    pub rango: Option<(usize, usize)>,
}

fn matches_set(row: &[String], col: Option<usize>, values: &[String]) -> bool {
    if values.is_empty() {
        return true;
    }
    match col.and_then(|c| row.get(c)) {
        Some(cell) => values.iter().any(|v| v == cell),
        None => false,
    }
}

/// Derives the lookup code from the raw cell value, stripping the trailing
/// `.0` artifact spreadsheets leave on numeric codes.
pub fn lookup_code(raw: &str) -> String {
    let code = raw.trim();
    code.strip_suffix(".0").unwrap_or(code).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabla() -> ListingTable {
        ListingTable::new(
            vec![
                COL_CODIGO.to_string(),
                COL_DEPARTAMENTO.to_string(),
                COL_CIUDAD.to_string(),
            ],
            vec![
                vec!["1001.0".into(), "Antioquia".into(), "Medellín".into()],
                vec!["1002.0".into(), "Antioquia".into(), "Envigado".into()],
                vec!["1003.0".into(), "Cundinamarca".into(), "Bogotá".into()],
                vec!["1004.0".into(), "Valle del Cauca".into(), "Cali".into()],
                vec!["1005.0".into(), "Antioquia".into(), "Medellín".into()],
            ],
        )
    }

    #[test]
    fn filter_never_grows_and_satisfies_predicates() {
        let tabla = tabla();
        let filtro = ListadoFilter {
            departamentos: vec!["Antioquia".to_string()],
            ciudades: vec!["Medellín".to_string()],
            rango: None,
        };
        let filtrado = tabla.filter(&filtro);
        assert!(filtrado.len() <= tabla.len());
        assert_eq!(filtrado.len(), 2);
        for i in 0..filtrado.len() {
            assert_eq!(filtrado.cell(i, COL_DEPARTAMENTO), Some("Antioquia"));
            assert_eq!(filtrado.cell(i, COL_CIUDAD), Some("Medellín"));
        }
    }

    #[test]
    fn empty_filter_sets_retain_everything() {
        let tabla = tabla();
        let filtrado = tabla.filter(&ListadoFilter::default());
        assert_eq!(filtrado.rows, tabla.rows);
    }

    #[test]
    fn range_applies_after_equality_filters() {
        let tabla = tabla();
        let filtro = ListadoFilter {
            departamentos: vec!["Antioquia".to_string()],
            ciudades: Vec::new(),
            rango: Some((1, 3)),
        };
        let filtrado = tabla.filter(&filtro);
        assert_eq!(filtrado.len(), 2);
        assert_eq!(filtrado.cell(0, COL_CODIGO), Some("1002.0"));
        assert_eq!(filtrado.cell(1, COL_CODIGO), Some("1005.0"));
    }

    #[test]
    fn range_is_clamped_to_table_bounds() {
        let tabla = tabla();
        let filtro = ListadoFilter {
            rango: Some((3, 50)),
            ..Default::default()
        };
        assert_eq!(tabla.filter(&filtro).len(), 2);

        let invertido = ListadoFilter {
            rango: Some((4, 2)),
            ..Default::default()
        };
        assert_eq!(tabla.filter(&invertido).len(), 0);
    }

    #[test]
    fn unique_values_preserve_first_seen_order() {
        let tabla = tabla();
        assert_eq!(
            tabla.unique_values(COL_DEPARTAMENTO),
            vec!["Antioquia", "Cundinamarca", "Valle del Cauca"]
        );
    }

    #[test]
    fn lookup_code_strips_trailing_float_artifact() {
        assert_eq!(lookup_code("1001.0"), "1001");
        assert_eq!(lookup_code(" 1001.0 "), "1001");
        assert_eq!(lookup_code("1001"), "1001");
        // Only a trailing artifact is stripped.
        assert_eq!(lookup_code("10.01"), "10.01");
    }
}
