use csv::ReaderBuilder;

use crate::error::{MonitorError, Result};

/// Untyped CSV content: named columns of raw cell text, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    names: Vec<String>,
    columns: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse CSV text with a header row
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let names = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        if names.is_empty() || names.iter().all(|n| n.is_empty()) {
            return Err(MonitorError::InvalidFormat(
                "CSV has no header row".to_string(),
            ));
        }

        let mut columns = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record?;
            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                column.push(cell.to_string());
            }
        }

        Ok(Self { names, columns })
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Columns as `(name, cells)` pairs in file order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.names
            .iter()
            .map(|n| n.as_str())
            .zip(self.columns.iter().map(|c| c.as_slice()))
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn num_columns(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv() {
        let text = "datetime,a,b\n2023-07-15 00:00:00,1.5,NA\n2023-07-15 01:00:00,NA,2\n";
        let table = RawTable::from_csv(text).unwrap();

        assert_eq!(table.column_names(), &["datetime", "a", "b"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("a").unwrap(), &["1.5", "NA"]);
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let text = "a,b\n1,2\n3\n";
        assert!(matches!(
            RawTable::from_csv(text),
            Err(MonitorError::Csv(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(RawTable::from_csv("").is_err());
    }

    #[test]
    fn test_quoted_cells() {
        let text = "deviceDeploymentID,locationName\nx_1,\"Portland, OR\"\n";
        let table = RawTable::from_csv(text).unwrap();
        assert_eq!(table.column("locationName").unwrap(), &["Portland, OR"]);
    }
}
