//! Maps heterogeneous sheet/CSV columns onto [`ParticipantRecord`].

use std::collections::HashMap;

use super::model::ParticipantRecord;

const FIRST_NAME: &[&str] = &["First Name", "Vorname"];
const LAST_NAME: &[&str] = &["Last Name", "Nachname"];
const COMBINED_NAME: &[&str] = &["Name"];
const MOBILE: &[&str] = &["Phone Number", "Mobile"];
const COUNTRY: &[&str] = &["Country of Origin", "Country"];
const TYPE: &[&str] = &["Exchange Type", "Type"];
const EMAIL: &[&str] = &["E-Mail-Adresse", "Email Address", "Email"];

/// A header row plus data rows of string cells, as delivered by a sheet or CSV source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// First line is the header, the rest are rows. An empty list is an empty table.
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let header = values.remove(0);
        Self { header, rows: values }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }
}

fn header_key(name: &str) -> String {
    name.trim().to_lowercase()
}

struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(header: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (idx, name) in header.iter().enumerate() {
            positions.entry(header_key(name)).or_insert(idx);
        }
        Self { positions }
    }

    fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.positions.get(&header_key(alias)).copied())
    }
}

fn cell(row: &[String], column: Option<usize>) -> String {
    column
        .and_then(|idx| row.get(idx))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Normalizes a raw table into participant records, one per input row.
///
/// Rows shorter than the header read as empty strings for the missing cells.
/// Every copied cell is trimmed of surrounding whitespace. The name is
/// `first + " " + last`, trimmed. Only when neither name part exists as a column is a
/// combined `Name` column taken (trimmed, otherwise as-is).
pub fn normalize(table: &RawTable) -> Vec<ParticipantRecord> {
    if table.header.is_empty() {
        return Vec::new();
    }

    let columns = ColumnIndex::new(&table.header);
    let first = columns.find(FIRST_NAME);
    let last = columns.find(LAST_NAME);
    let combined = match (first, last) {
        (None, None) => columns.find(COMBINED_NAME),
        _ => None,
    };
    let mobile = columns.find(MOBILE);
    let country = columns.find(COUNTRY);
    let participant_type = columns.find(TYPE);
    let email = columns.find(EMAIL);

    table
        .rows
        .iter()
        .map(|row| {
            let name = match combined {
                Some(idx) => cell(row, Some(idx)),
                None => format!("{} {}", cell(row, first), cell(row, last))
                    .trim()
                    .to_string(),
            };
            ParticipantRecord {
                name,
                mobile: cell(row, mobile),
                country: cell(row, country),
                participant_type: cell(row, participant_type),
                email: cell(row, email),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_google_form_export() {
        let table = RawTable::new(
            strings(&["First Name", "Last Name", "Exchange Type"]),
            vec![strings(&["Max", "Mustermann", "ERASMUS"])],
        );

        let records = normalize(&table);
        assert_eq!(
            records,
            vec![ParticipantRecord::new("Max Mustermann", "", "", "ERASMUS", "")]
        );
    }

    #[test]
    fn test_copied_cells_are_trimmed() {
        let table = RawTable::new(
            strings(&["First Name", "Last Name", "Country", "Email"]),
            vec![strings(&[" Lea ", "Lang  ", "  Brazil", " lea@example.org\t"])],
        );

        let records = normalize(&table);
        assert_eq!(
            records,
            vec![ParticipantRecord::new("Lea Lang", "", "Brazil", "", "lea@example.org")]
        );
    }

    #[test]
    fn test_aliases_are_case_and_whitespace_insensitive() {
        let table = RawTable::new(
            strings(&[" first name ", "LAST NAME", "phone number", "Country", "type", "E-MAIL-ADRESSE"]),
            vec![strings(&["Ana", "Lopez", "+34 600", "Spain", "Tutor", "ana@example.org"])],
        );

        let records = normalize(&table);
        assert_eq!(records[0].name, "Ana Lopez");
        assert_eq!(records[0].mobile, "+34 600");
        assert_eq!(records[0].country, "Spain");
        assert_eq!(records[0].participant_type, "Tutor");
        assert_eq!(records[0].email, "ana@example.org");
    }

    #[test]
    fn test_first_alias_wins() {
        let table = RawTable::new(
            strings(&["First Name", "Mobile", "Phone Number"]),
            vec![strings(&["Li", "111", "222"])],
        );

        assert_eq!(normalize(&table)[0].mobile, "222");
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let table = RawTable::new(
            strings(&["First Name", "Last Name", "Country of Origin", "Email"]),
            vec![strings(&["Jo"]), strings(&["Kim", "Lee", "Korea"])],
        );

        let records = normalize(&table);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ParticipantRecord::new("Jo", "", "", "", ""));
        assert_eq!(records[1].country, "Korea");
        assert_eq!(records[1].email, "");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(&RawTable::default()).is_empty());
        assert!(normalize(&RawTable::from_values(Vec::new())).is_empty());
    }

    #[test]
    fn test_header_only() {
        let table = RawTable::from_values(vec![strings(&["First Name", "Last Name"])]);
        assert!(normalize(&table).is_empty());
    }

    #[test]
    fn test_combined_name_only_without_name_parts() {
        let table = RawTable::new(
            strings(&["Name", "Mobile", "Country", "Type", "Email"]),
            vec![strings(&["Grace O Connor", "1", "Ireland", "OTHER", "g@x.ie"])],
        );
        assert_eq!(normalize(&table)[0].name, "Grace O Connor");

        let table = RawTable::new(
            strings(&["Name", "Last Name"]),
            vec![strings(&["ignored", "Solo"])],
        );
        assert_eq!(normalize(&table)[0].name, "Solo");
    }

    #[test]
    fn test_row_count_is_preserved() {
        let table = RawTable::new(
            strings(&["First Name"]),
            vec![strings(&[]), strings(&[""]), strings(&["A"])],
        );
        assert_eq!(normalize(&table).len(), 3);
    }
}
