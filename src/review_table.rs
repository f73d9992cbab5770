// review_table.rs
use chrono::{DateTime, Local};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::user_interaction::print_insight_level_2;

pub const PRODUCT_COLUMN: &str = "PRODUCT";
pub const SUMMARY_COLUMN: &str = "SUMMARY";
pub const SENTIMENT_COLUMN: &str = "Sentiment";

/// Sentinel offered at the top of the product filter menu.
pub const ALL_PRODUCTS: &str = "All Products";

/// Only the first few reviews are kept per session; the classifier bills
/// per request, so the dashboard works on a small head of the file.
pub const DATASET_ROW_LIMIT: usize = 10;

const MAX_CELL_WIDTH: usize = 45;

#[derive(Debug, Clone, Default)]
pub struct ReviewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReviewTable {
    pub fn from_csv(path: &Path) -> Result<ReviewTable, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        ReviewTable::from_csv_str(&contents)
    }

    pub fn from_csv_str(contents: &str) -> Result<ReviewTable, Box<dyn Error>> {
        let mut records = parse_csv_records(contents);

        if records.is_empty() {
            return Err("CSV has no header row".into());
        }

        let headers = records.remove(0);
        let width = headers.len();

        // Normalize ragged rows to the header width
        let rows = records
            .into_iter()
            .map(|mut record| {
                record.resize(width, String::new());
                record
            })
            .collect();

        Ok(ReviewTable { headers, rows })
    }

    pub fn has_data(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Keeps only the first `n` rows.
    pub fn head(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Distinct values of a column in first-seen order.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let mut seen = Vec::new();
        if let Some(index) = self.column_index(column) {
            for row in &self.rows {
                let value = &row[index];
                if !seen.contains(value) {
                    seen.push(value.clone());
                }
            }
        }
        seen
    }

    pub fn column_values(&self, column: &str) -> Vec<String> {
        match self.column_index(column) {
            Some(index) => self.rows.iter().map(|row| row[index].clone()).collect(),
            None => Vec::new(),
        }
    }

    /// Rows whose PRODUCT equals the selection. The "All Products" sentinel
    /// passes everything through unchanged.
    pub fn filtered_for_product(&self, product: &str) -> ReviewTable {
        if product == ALL_PRODUCTS {
            return self.clone();
        }

        let rows = match self.column_index(PRODUCT_COLUMN) {
            Some(index) => self
                .rows
                .iter()
                .filter(|row| row[index] == product)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        ReviewTable {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// Appends a column, or overwrites it if the header already exists.
    /// Values shorter than the table are padded with empty strings.
    pub fn set_column(&mut self, column: &str, mut values: Vec<String>) {
        values.resize(self.rows.len(), String::new());

        match self.column_index(column) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.headers.push(column.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Frequency of each value of a column, in first-seen order.
    pub fn value_counts(&self, column: &str) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        if let Some(index) = self.column_index(column) {
            for row in &self.rows {
                let value = &row[index];
                match counts.iter_mut().find(|(v, _)| v == value) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((value.clone(), 1)),
                }
            }
        }
        counts
    }

    pub fn print_table(&self) {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell_max = self
                    .rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .max()
                    .unwrap_or(0);
                header.chars().count().max(cell_max).min(MAX_CELL_WIDTH)
            })
            .collect();

        let header_line = render_row(&self.headers, &widths);
        println!("{}", header_line);
        println!("{}", "-".repeat(header_line.chars().count()));

        for row in &self.rows {
            println!("{}", render_row(row, &widths));
        }
        println!("Total rows: {}", self.rows.len());
    }
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (cell, &width) in cells.iter().zip(widths) {
        let clipped: String = cell.chars().take(width).collect();
        line.push('|');
        line.push_str(&format!("{:<width$} ", clipped, width = width));
    }
    line.push('|');
    line
}

/// Minimal CSV record parser: quoted fields, embedded commas and newlines,
/// doubled quotes as escapes, CRLF line endings.
fn parse_csv_records(contents: &str) -> Vec<Vec<String>> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = contents.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }

    // Last record without a trailing newline
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records.retain(|r| !(r.len() == 1 && r[0].trim().is_empty()));
    records
}

pub fn get_dataset_path() -> PathBuf {
    PathBuf::from("data").join("customer_reviews.csv")
}

/// Loads the reviews dataset from its fixed path, keeping only the first
/// DATASET_ROW_LIMIT rows. Errors leave any previously loaded session
/// state untouched, since the caller only swaps state in on Ok.
pub fn load_reviews_dataset() -> Result<ReviewTable, Box<dyn Error>> {
    let path = get_dataset_path();

    if !path.is_file() {
        return Err(format!(
            "Dataset not found at {}. Please check the file path.",
            path.display()
        )
        .into());
    }

    let mut table = ReviewTable::from_csv(&path)?;

    for column in [PRODUCT_COLUMN, SUMMARY_COLUMN] {
        if table.column_index(column).is_none() {
            return Err(format!("Dataset is missing the {} column.", column).into());
        }
    }

    table.head(DATASET_ROW_LIMIT);

    if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
        let modified: DateTime<Local> = modified.into();
        print_insight_level_2(&format!(
            "{} (last modified {})",
            path.display(),
            modified.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ReviewTable {
        let csv = "\
ID,PRODUCT,SUMMARY
1,Widget,Great value
2,Gadget,Broke in a week
3,Widget,Does the job
";
        ReviewTable::from_csv_str(csv).unwrap()
    }

    #[test]
    fn parses_quoted_fields_with_commas_and_newlines() {
        let csv = "PRODUCT,SUMMARY\nWidget,\"Loved it, truly\nwould buy again\"\nGadget,\"He said \"\"meh\"\"\"\r\n";
        let table = ReviewTable::from_csv_str(csv).unwrap();

        assert_eq!(table.headers, vec!["PRODUCT", "SUMMARY"]);
        assert_eq!(table.rows[0][1], "Loved it, truly\nwould buy again");
        assert_eq!(table.rows[1][1], "He said \"meh\"");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(ReviewTable::from_csv_str("").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = ReviewTable::from_csv(Path::new("data/definitely_not_here.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn ragged_rows_are_padded_to_header_width() {
        let table = ReviewTable::from_csv_str("A,B,C\n1,2\n").unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn all_products_sentinel_returns_every_row() {
        let table = sample_table();
        let filtered = table.filtered_for_product(ALL_PRODUCTS);
        assert_eq!(filtered.rows, table.rows);
    }

    #[test]
    fn product_filter_returns_only_matching_rows() {
        let table = sample_table();
        let filtered = table.filtered_for_product("Widget");

        assert_eq!(filtered.rows.len(), 2);
        let index = filtered.column_index(PRODUCT_COLUMN).unwrap();
        assert!(filtered.rows.iter().all(|row| row[index] == "Widget"));
    }

    #[test]
    fn unique_values_keep_first_seen_order() {
        let table = sample_table();
        assert_eq!(table.unique_values(PRODUCT_COLUMN), vec!["Widget", "Gadget"]);
    }

    #[test]
    fn head_truncates_rows() {
        let mut table = sample_table();
        table.head(2);
        assert_eq!(table.rows.len(), 2);

        // A larger n is a no-op
        table.head(50);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn set_column_appends_then_overwrites() {
        let mut table = sample_table();

        table.set_column(
            SENTIMENT_COLUMN,
            vec!["Positive".into(), "Negative".into(), "Neutral".into()],
        );
        assert_eq!(table.headers.last().unwrap(), SENTIMENT_COLUMN);
        assert_eq!(table.column_values(SENTIMENT_COLUMN)[1], "Negative");

        table.set_column(
            SENTIMENT_COLUMN,
            vec!["Neutral".into(), "Neutral".into(), "Neutral".into()],
        );
        assert_eq!(table.headers.len(), 4);
        assert_eq!(
            table.column_values(SENTIMENT_COLUMN),
            vec!["Neutral", "Neutral", "Neutral"]
        );
    }

    #[test]
    fn value_counts_tally_in_first_seen_order() {
        let table = sample_table();
        assert_eq!(
            table.value_counts(PRODUCT_COLUMN),
            vec![("Widget".to_string(), 2), ("Gadget".to_string(), 1)]
        );
    }
}
