//! Reads expense rows from CSV text.
//!
//! Each line holds four comma separated fields, `date,description,amount,category`,
//! any of which may be quoted.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use time::Date;

use crate::{
    Error,
    category::Category,
    expense::{DATE_FORMAT, ExpenseForm},
    money::Cents,
};

const DATE_COLUMN: usize = 0;
const DESCRIPTION_COLUMN: usize = 1;
const AMOUNT_COLUMN: usize = 2;
const CATEGORY_COLUMN: usize = 3;
const COLUMN_COUNT: usize = 4;

/// Why a CSV row was not imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An identical expense is already stored.
    Duplicate,
    /// The category column does not name a known category.
    InvalidCategory,
    /// The row has the wrong number of columns, or a bad date, amount or description.
    InvalidData,
}

/// One non-blank row read from the CSV data.
#[derive(Debug, PartialEq)]
pub enum CsvRow {
    /// A row whose fields passed the column checks.
    Expense(ExpenseForm),
    /// A row that should be skipped.
    Skip(SkipReason),
}

/// Iterate over the rows of `reader`.
///
/// Blank lines are left out. Rows that cannot be decoded (e.g., invalid UTF-8)
/// are reported as [SkipReason::InvalidData].
///
/// # Errors
/// Yields an [Error::ReadError] if `reader` fails, after which the caller
/// should stop reading.
pub fn read_rows<R: Read>(reader: R, today: Date) -> impl Iterator<Item = Result<CsvRow, Error>> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
        .into_records()
        .filter_map(move |maybe_record| match maybe_record {
            Ok(record) if is_blank(&record) => None,
            Ok(record) => Some(Ok(classify_record(&record, today))),
            Err(error) if error.is_io_error() => Some(Err(Error::ReadError(error.to_string()))),
            Err(error) => {
                tracing::debug!("Could not decode CSV row: {error}");
                Some(Ok(CsvRow::Skip(SkipReason::InvalidData)))
            }
        })
}

/// A line with nothing but whitespace. Lines of empty fields such as `,,,` are rows.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}

/// Check the column count, category, date and amount of a record, in that order.
///
/// The first failing check decides the [SkipReason].
fn classify_record(record: &StringRecord, today: Date) -> CsvRow {
    if record.len() != COLUMN_COUNT {
        tracing::debug!("Skipping row with {} columns: {record:?}", record.len());
        return CsvRow::Skip(SkipReason::InvalidData);
    }

    let category = &record[CATEGORY_COLUMN];
    if category.parse::<Category>().is_err() {
        tracing::debug!("Skipping row with unknown category {category:?}");
        return CsvRow::Skip(SkipReason::InvalidCategory);
    }

    let date = &record[DATE_COLUMN];
    match Date::parse(date, DATE_FORMAT) {
        Ok(date) if date <= today => {}
        _ => {
            tracing::debug!("Skipping row with invalid date {date:?}");
            return CsvRow::Skip(SkipReason::InvalidData);
        }
    }

    let amount = &record[AMOUNT_COLUMN];
    match Cents::parse(amount) {
        Ok(cents) if cents > Cents::ZERO => {}
        _ => {
            tracing::debug!("Skipping row with invalid amount {amount:?}");
            return CsvRow::Skip(SkipReason::InvalidData);
        }
    }

    CsvRow::Expense(ExpenseForm {
        date: date.to_owned(),
        category: category.to_owned(),
        amount: amount.to_owned(),
        description: record[DESCRIPTION_COLUMN].to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{Error, expense::ExpenseForm};

    use super::{CsvRow, SkipReason, read_rows};

    fn rows(text: &str) -> Vec<CsvRow> {
        read_rows(text.as_bytes(), date!(2024 - 06 - 30))
            .collect::<Result<_, Error>>()
            .unwrap()
    }

    fn form(date: &str, description: &str, amount: &str, category: &str) -> CsvRow {
        CsvRow::Expense(ExpenseForm {
            date: date.to_owned(),
            category: category.to_owned(),
            amount: amount.to_owned(),
            description: description.to_owned(),
        })
    }

    #[test]
    fn reads_plain_and_quoted_rows() {
        let got = rows(
            "2024-01-05,Lunch,12.50,food\n\
             2024-01-10,\"Bus, return\",3,transport\n",
        );

        assert_eq!(
            got,
            vec![
                form("2024-01-05", "Lunch", "12.50", "food"),
                form("2024-01-10", "Bus, return", "3", "transport"),
            ]
        );
    }

    #[test]
    fn skips_blank_lines_without_counting_them() {
        let got = rows("\n2024-01-05,Lunch,12.50,food\n\n   \n2024-01-06,Tea,2,food\n\n");

        assert_eq!(got.len(), 2);
    }

    #[test]
    fn empty_fields_are_a_row_not_a_blank_line() {
        let got = rows(",,,\n , , , \n");

        assert_eq!(
            got,
            vec![
                CsvRow::Skip(SkipReason::InvalidCategory),
                CsvRow::Skip(SkipReason::InvalidCategory),
            ]
        );
    }

    #[test]
    fn trims_fields() {
        let got = rows("2024-01-05 , Lunch ,12.50 , food \r\n");

        assert_eq!(got, vec![form("2024-01-05", "Lunch", "12.50", "food")]);
    }

    #[test]
    fn wrong_column_count_is_invalid_data() {
        let got = rows("2024-01-05,Lunch,12.50\n2024-01-05,Lunch,12.50,food,extra\n");

        assert_eq!(
            got,
            vec![
                CsvRow::Skip(SkipReason::InvalidData),
                CsvRow::Skip(SkipReason::InvalidData),
            ]
        );
    }

    #[test]
    fn unknown_category_is_checked_before_date_and_amount() {
        let got = rows("not-a-date,Lunch,abc,groceries\n");

        assert_eq!(got, vec![CsvRow::Skip(SkipReason::InvalidCategory)]);
    }

    #[test]
    fn bad_or_future_dates_are_invalid_data() {
        let got = rows(
            "05/01/2024,Lunch,12.50,food\n\
             2024-07-01,Lunch,12.50,food\n\
             2024-06-30,Lunch,12.50,food\n",
        );

        assert_eq!(
            got,
            vec![
                CsvRow::Skip(SkipReason::InvalidData),
                CsvRow::Skip(SkipReason::InvalidData),
                form("2024-06-30", "Lunch", "12.50", "food"),
            ]
        );
    }

    #[test]
    fn non_positive_or_non_numeric_amounts_are_invalid_data() {
        let got = rows(
            "2024-01-05,Lunch,0,food\n\
             2024-01-05,Lunch,-3,food\n\
             2024-01-05,Lunch,twelve,food\n",
        );

        assert!(
            got.iter()
                .all(|row| *row == CsvRow::Skip(SkipReason::InvalidData)),
            "{got:?}"
        );
    }

    #[test]
    fn invalid_utf8_row_is_invalid_data() {
        let mut bytes = b"2024-01-05,Lunch,12.50,food\n2024-01-05,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",1,food\n2024-01-06,Tea,2,food\n");

        let got: Vec<_> = read_rows(bytes.as_slice(), date!(2024 - 06 - 30))
            .collect::<Result<_, Error>>()
            .unwrap();

        assert_eq!(
            got,
            vec![
                form("2024-01-05", "Lunch", "12.50", "food"),
                CsvRow::Skip(SkipReason::InvalidData),
                form("2024-01-06", "Tea", "2", "food"),
            ]
        );
    }
}
