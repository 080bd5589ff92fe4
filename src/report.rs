use chrono::{Local, NaiveDate, NaiveDateTime};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::domain::Reading;
use crate::error::Error;

pub const REPORT_FILENAME: &str = "data-suhu-kelembapan.pdf";
pub const REPORT_TITLE: &str = "Data Suhu dan Kelembapan";

const TABLE_HEADER: [&str; 3] = ["Waktu", "Suhu (°C)", "Kelembapan (%)"];
const NO_DATA_MESSAGE: &str = "No data available within the selected date range.";

/// Parses a raw export date field down to its calendar date.
fn parse_report_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map(|datetime| datetime.date())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Clamps the two raw date fields to `00:00:00.000`..`23:59:59.999` of their
/// calendar dates. A missing or unparsable field yields no usable range, which
/// in turn leaves the export empty.
pub fn clamp_range(start: Option<&str>, end: Option<&str>) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = parse_report_date(start)?.and_hms_milli_opt(0, 0, 0, 0)?;
    let end = parse_report_date(end)?.and_hms_milli_opt(23, 59, 59, 999)?;
    Some((start, end))
}

/// The export's own inclusive date filter over the in-memory rows.
///
/// This is computed independently of the filter used for the on-screen query,
/// so the exported rows can disagree with what is displayed. That discrepancy
/// is inherited behavior and is kept as-is.
pub fn surviving_rows<'a>(
    readings: &'a [Reading],
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<&'a Reading> {
    match clamp_range(start, end) {
        Some((start, end)) => readings
            .iter()
            .filter(|reading| {
                let local = reading.created_at.with_timezone(&Local).naive_local();
                local >= start && local <= end
            })
            .collect(),
        None => Vec::new(),
    }
}

/// One table line per surviving reading: local datetime, suhu, kelembapan.
pub fn table_rows(readings: &[&Reading]) -> Vec<[String; 3]> {
    readings
        .iter()
        .map(|reading| {
            [
                reading
                    .created_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                reading.suhu.to_string(),
                reading.kelembapan.to_string(),
            ]
        })
        .collect()
}

/// Renders the export for the given rows and raw date fields.
pub fn render(readings: &[Reading], start: Option<&str>, end: Option<&str>) -> Result<Vec<u8>, Error> {
    let rows = table_rows(&surviving_rows(readings, start, end));

    let (doc, first_page, first_layer) =
        PdfDocument::new(REPORT_TITLE, Mm(210.0), Mm(297.0), "table");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(to_report_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(to_report_error)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    layer.use_text(REPORT_TITLE, 14.0, Mm(10.0), Mm(283.0), &bold);

    if rows.is_empty() {
        layer.use_text(NO_DATA_MESSAGE, 11.0, Mm(10.0), Mm(273.0), &regular);
    } else {
        let columns = [10.0, 95.0, 145.0];
        let mut y = 271.0;
        let mut header_pending = true;

        for cells in &rows {
            if y < 20.0 {
                let (page, layer_index) = doc.add_page(Mm(210.0), Mm(297.0), "table");
                layer = doc.get_page(page).get_layer(layer_index);
                y = 283.0;
                header_pending = true;
            }

            if header_pending {
                for (text, x) in TABLE_HEADER.iter().zip(columns) {
                    layer.use_text(*text, 11.0, Mm(x), Mm(y), &bold);
                }
                y -= 8.0;
                header_pending = false;
            }

            for (text, x) in cells.iter().zip(columns) {
                layer.use_text(text.clone(), 10.0, Mm(x), Mm(y), &regular);
            }
            y -= 7.0;
        }
    }

    doc.save_to_bytes().map_err(to_report_error)
}

fn to_report_error(error: impl std::fmt::Display) -> Error {
    Error::Report(error.to_string())
}
