//! # `remates-pdf`: Dossier Generation
//!
//! Builds the dossier PDF entirely in memory: one A4 page per structured
//! annotation, with a title band carrying the case reference and a plain
//! body listing court, address, appraisal value and the risk text.
//! Non-structured entries (fetch failures) are skipped without shifting the
//! page order of the rest.

use printpdf::{
    BuiltinFont, Color, Layer, LinePoint, Mm, Op, PaintMode, ParsedFont, PdfDocument, PdfPage,
    PdfSaveOptions, Point, Polygon, PolygonRing, Pt, Rgb, TextItem, TextMatrix,
    TextRenderingMode, WindingOrder,
};
use remates::{Annotation, Ficha};
use thiserror::Error;
use tracing::info;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 15.0;
const LINE_HEIGHT: f32 = 6.0;
/// Rough character budget per body line for the 10 pt font.
const WRAP_WIDTH: usize = 95;

#[derive(Error, Debug)]
pub enum DossierError {
    #[error("Failed to parse the built-in font '{0}'")]
    Font(&'static str),
}

/// The structured entries of an annotation sequence, order preserved.
/// `Vacia` entries (fetch failures) produce no page.
pub fn fichas(entries: &[Annotation]) -> Vec<&Ficha> {
    entries.iter().filter_map(Annotation::as_ficha).collect()
}

/// Formats an appraisal value as pesos with thousands separators. A missing
/// value renders as `$0`.
pub fn formatear_pesos(valor: Option<f64>) -> String {
    let entero = valor.unwrap_or(0.0).round() as i64;
    let digits = entero.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if entero < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Generates the dossier: one page per structured annotation.
pub fn generar_dossier(entries: &[Annotation]) -> Result<Vec<u8>, DossierError> {
    let mut doc = PdfDocument::new("Dossier Remates");
    let layer_id = doc.add_layer(&Layer::new("Layer 1"));

    let regular = add_builtin(&mut doc, BuiltinFont::Helvetica, "Helvetica")?;
    let bold = add_builtin(&mut doc, BuiltinFont::HelveticaBold, "Helvetica-Bold")?;

    let seleccionadas = fichas(entries);
    for ficha in &seleccionadas {
        render_ficha(&mut doc, &layer_id, &regular, &bold, ficha);
    }

    info!(
        "Dossier built: {} pages from {} annotation entries",
        seleccionadas.len(),
        entries.len()
    );

    let mut warnings = Vec::new();
    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}

fn add_builtin(
    doc: &mut PdfDocument,
    font: BuiltinFont,
    name: &'static str,
) -> Result<printpdf::FontId, DossierError> {
    let bytes = font.get_subset_font().bytes;
    let parsed =
        ParsedFont::from_bytes(&bytes, 0, &mut Vec::new()).ok_or(DossierError::Font(name))?;
    Ok(doc.add_font(&parsed))
}

fn render_ficha(
    doc: &mut PdfDocument,
    layer_id: &printpdf::LayerInternalId,
    regular: &printpdf::FontId,
    bold: &printpdf::FontId,
    ficha: &Ficha,
) {
    let radicado = ficha.radicado.as_deref().unwrap_or("N/A");
    let juzgado = ficha.juzgado.as_deref().unwrap_or("N/A");
    let direccion = ficha.direccion.as_deref().unwrap_or("N/A");
    let riesgo = ficha.riesgo.as_deref().unwrap_or("N/A");

    let mut body: Vec<String> = Vec::new();
    body.push(format!("Juzgado: {juzgado}"));
    body.push(format!("Dirección: {direccion}"));
    body.push(format!("Avalúo: {}", formatear_pesos(ficha.avaluo)));
    if let Some(postura) = ficha.postura {
        body.push(format!("Postura mínima: {}", formatear_pesos(Some(postura))));
    }
    if let Some(matricula) = &ficha.matricula {
        body.push(format!("Matrícula: {matricula}"));
    }
    if let Some(score) = ficha.score {
        body.push(format!("Score: {score}"));
    }
    body.push(String::new());
    body.extend(wrap_line(&format!("RIESGO: {riesgo}"), WRAP_WIDTH));

    let mut ops = vec![Op::BeginLayer {
        layer_id: layer_id.clone(),
    }];
    title_band(&mut ops, bold, radicado);

    // Body text, black, 10 pt, flowing down from below the band. Overflow
    // continues on an extra page without a band.
    ops.push(Op::SetFillColor {
        col: Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)),
    });
    let mut y = 255.0;
    for line in body {
        if y < MARGIN {
            ops.push(Op::EndLayer {
                layer_id: layer_id.clone(),
            });
            push_page(doc, ops);
            ops = vec![Op::BeginLayer {
                layer_id: layer_id.clone(),
            }];
            y = PAGE_HEIGHT.0 - MARGIN - LINE_HEIGHT;
        }
        if !line.is_empty() {
            text_at(&mut ops, regular, 10.0, MARGIN, y, &line);
        }
        y -= LINE_HEIGHT;
    }

    ops.push(Op::EndLayer {
        layer_id: layer_id.clone(),
    });
    push_page(doc, ops);
}

fn push_page(doc: &mut PdfDocument, ops: Vec<Op>) {
    let mut page = PdfPage::new(PAGE_WIDTH, PAGE_HEIGHT, vec![]);
    page.ops = ops;
    doc.pages.push(page);
}

/// Filled band across the page top with the white bold case reference.
fn title_band(ops: &mut Vec<Op>, bold: &printpdf::FontId, radicado: &str) {
    let top = 282.0;
    let bottom = 268.0;
    ops.push(Op::SetFillColor {
        col: Color::Rgb(Rgb::new(31.0 / 255.0, 73.0 / 255.0, 125.0 / 255.0, None)),
    });
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![PolygonRing {
                points: vec![
                    band_point(MARGIN, bottom),
                    band_point(PAGE_WIDTH.0 - MARGIN, bottom),
                    band_point(PAGE_WIDTH.0 - MARGIN, top),
                    band_point(MARGIN, top),
                ],
            }],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        },
    });
    ops.push(Op::SetFillColor {
        col: Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)),
    });
    text_at(ops, bold, 14.0, MARGIN + 5.0, bottom + 4.5, &format!("FICHA: {radicado}"));
}

fn band_point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point::new(Mm(x), Mm(y)),
        bezier: false,
    }
}

fn text_at(ops: &mut Vec<Op>, font: &printpdf::FontId, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Op::SetFontSize {
        size: Pt(size),
        font: font.clone(),
    });
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextMatrix {
        matrix: TextMatrix::Translate(Mm(x).into(), Mm(y).into()),
    });
    ops.push(Op::SetTextRenderingMode {
        mode: TextRenderingMode::Fill,
    });
    ops.push(Op::WriteText {
        items: vec![TextItem::Text(text.to_string())],
        font: font.clone(),
    });
    ops.push(Op::EndTextSection);
}

/// Greedy word wrap for the risk paragraph.
fn wrap_line(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
