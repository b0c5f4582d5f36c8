// src/export.rs
use rust_xlsxwriter::Workbook;

use crate::error::RenderError;
use crate::models::PollOption;
use crate::poll::sort_by_votes;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn export_filename(poll_id: i64) -> String {
    format!("results_poll{poll_id}.xlsx")
}

/// `(option title, votes)` rows, most voted first.
pub fn result_rows(mut options: Vec<PollOption>) -> Vec<(String, i64)> {
    sort_by_votes(&mut options);
    options
        .into_iter()
        .map(|o| (o.option_title, o.votes_count))
        .collect()
}

/// Writes the rows into a single `Results` worksheet and returns the xlsx bytes.
pub fn render_xlsx(rows: &[(String, i64)]) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Results")?;

    for (row, (title, votes)) in (0u32..).zip(rows) {
        sheet.write_string(row, 0, title)?;
        sheet.write_number(row, 1, *votes as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}
