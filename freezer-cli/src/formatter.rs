// Output formatting utilities for CLI commands.
// Provides unified formatting for different output formats (table, JSON, YAML, CSV).

use anyhow::{Result, anyhow};
use serde::Serialize;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Parse output format from string.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: table, json, yaml",
                s
            )),
        }
    }
}

/// Format data as JSON string.
pub fn format_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).map_err(|e| anyhow!("JSON serialization failed: {}", e))
}

/// Format data as YAML string.
pub fn format_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).map_err(|e| anyhow!("YAML serialization failed: {}", e))
}

/// Format records as CSV with a header row taken from the field names.
pub fn format_csv<T: Serialize>(records: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| anyhow!("CSV serialization failed: {}", e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("CSV serialization failed: {}", e))?;
    String::from_utf8(bytes).map_err(|e| anyhow!("CSV output is not UTF-8: {}", e))
}

/// Print data in the specified format to the provided writer.
///
/// For table format, uses the provided `table_printer` function.
/// For JSON/YAML, serializes the data and writes to the writer.
pub fn print_output<T, W, F>(
    writer: &mut W,
    data: &T,
    format: OutputFormat,
    table_printer: F,
) -> Result<()>
where
    T: Serialize,
    W: std::io::Write,
    F: FnOnce(&mut W, &T) -> Result<()>,
{
    match format {
        OutputFormat::Table => {
            table_printer(writer, data)?;
            Ok(())
        }
        OutputFormat::Json => {
            let json = format_json(data)?;
            writeln!(writer, "{}", json)?;
            Ok(())
        }
        OutputFormat::Yaml => {
            let yaml = format_yaml(data)?;
            writeln!(writer, "{}", yaml)?;
            Ok(())
        }
    }
}

/// Format time consistently.
///
/// Uses the format: `YYYY-MM-DD HH:MM:SS TZ` (e.g., `2026-01-22 15:04:05 UTC`)
pub fn format_time<T: chrono::TimeZone>(t: &chrono::DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    t.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

/// Create a standard table with freezer styling.
pub fn create_table<T: Tabled>(data: impl IntoIterator<Item = T>) -> Table {
    let mut table = Table::new(data);
    table.with(Style::sharp());
    table
}

/// Create a table from pre-rendered rows; the first row is the header.
pub fn create_grid(rows: Vec<Vec<String>>) -> Table {
    let mut builder = Builder::default();
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::sharp());
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn data() -> Vec<TestData> {
        vec![
            TestData {
                name: "foo".into(),
                value: 1,
            },
            TestData {
                name: "bar".into(),
                value: 2,
            },
        ]
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(
            OutputFormat::from_str("table").unwrap(),
            OutputFormat::Table
        );
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("yaml").unwrap(), OutputFormat::Yaml);
    }

    #[test]
    fn test_output_format_from_str_invalid() {
        let result = OutputFormat::from_str("csv");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown format"));
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&data()).unwrap();
        let parsed: Vec<TestData> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data());
    }

    #[test]
    fn test_format_yaml() {
        let yaml = format_yaml(&data()).unwrap();
        let parsed: Vec<TestData> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, data());
    }

    #[test]
    fn test_format_csv_has_header() {
        let csv = format_csv(&data()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["name,value", "foo,1", "bar,2"]);
    }

    #[test]
    fn test_format_empty_vec() {
        let data: Vec<TestData> = vec![];
        assert_eq!(format_json(&data).unwrap(), "[]");
        assert_eq!(format_csv(&data).unwrap(), "");
    }

    #[test]
    fn test_print_output_writer() {
        let data = TestData {
            name: "writer_test".into(),
            value: 123,
        };
        let mut buffer = Vec::new();

        print_output(&mut buffer, &data, OutputFormat::Json, |_, _| Ok(())).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("writer_test"));
        assert!(output.contains("123"));
    }

    #[test]
    fn test_create_grid_renders_cells() {
        let table = create_grid(vec![
            vec!["".into(), "1".into(), "2".into()],
            vec!["A".into(), "S-1".into(), "-".into()],
        ])
        .to_string();
        assert!(table.contains("S-1"));
    }
}
