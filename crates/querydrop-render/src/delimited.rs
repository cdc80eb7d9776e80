//! Comma- and pipe-delimited text output.
//!
//! Quoting is minimal (only fields containing the delimiter, a quote or a
//! line break are quoted) and records end with a bare `\n`.

use querydrop_core::ResultSet;

use crate::error::{RenderError, Result};

pub const COMMA: u8 = b',';
pub const PIPE: u8 = b'|';

pub fn to_delimited(set: &ResultSet, include_header: bool, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    if include_header {
        writer.write_record(&set.columns)?;
    }
    for row in set.text_rows() {
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RenderError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use querydrop_core::Value;

    fn sample() -> ResultSet {
        let mut set = ResultSet::new(vec!["id".into(), "name".into(), "note".into()]);
        set.push_row(vec![
            Value::Int(1),
            Value::Text("Ada".into()),
            Value::Text("says \"hi\"".into()),
        ]);
        set.push_row(vec![Value::Int(2), Value::Text("Grace, R.".into()), Value::Null]);
        set.push_row(vec![
            Value::Int(3),
            Value::Text("Linus".into()),
            Value::Text("two\nlines".into()),
        ]);
        set
    }

    #[test]
    fn csv_round_trips_with_header() {
        let set = sample();
        let text = to_delimited(&set, true, COMMA).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, set.columns);
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows, set.text_rows().collect::<Vec<_>>());
    }

    #[test]
    fn csv_round_trips_without_header() {
        let set = sample();
        let text = to_delimited(&set, false, COMMA).unwrap();
        assert!(text.starts_with("1,Ada,"));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes());
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows, set.text_rows().collect::<Vec<_>>());
    }

    #[test]
    fn quoting_is_minimal() {
        let text = to_delimited(&sample(), true, COMMA).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,name,note");
        assert_eq!(lines[1], "1,Ada,\"says \"\"hi\"\"\"");
        assert_eq!(lines[2], "2,\"Grace, R.\",");
    }

    #[test]
    fn pipe_matches_csv_with_delimiter_swapped() {
        let mut set = ResultSet::new(vec!["a".into(), "b".into()]);
        set.push_row(vec![Value::Text("x y".into()), Value::Float(1.5)]);
        set.push_row(vec![Value::Null, Value::Bool(true)]);

        let csv_text = to_delimited(&set, true, COMMA).unwrap();
        let pipe_text = to_delimited(&set, true, PIPE).unwrap();
        assert_eq!(pipe_text, csv_text.replace(',', "|"));
        assert_eq!(pipe_text, "a|b\nx y|1.5\n|true\n");
    }

    #[test]
    fn empty_set_with_header_is_single_line() {
        let set = ResultSet::new(vec!["id".into(), "name".into()]);
        let text = to_delimited(&set, true, COMMA).unwrap();
        assert_eq!(text, "id,name\n");
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn empty_set_without_header_is_empty() {
        let set = ResultSet::new(vec!["id".into()]);
        assert_eq!(to_delimited(&set, false, COMMA).unwrap(), "");
    }
}
