use super::Rgb;
use crate::error::Result;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const COLOR_ID_COLUMN: &str = "ColorId";
pub const STRUCT_NAME_COLUMN: &str = "StructName";
pub const RGB_COLUMN: &str = "RGB";

/// A feature value as reported by the extractor
///
/// Most features are real numbers; diagnostics such as hashes, versions
/// and spacing tuples are kept as text.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Real(f64),
    Text(String),
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Real(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Text(s.to_string())
    }
}

impl From<serde_json::Value> for FeatureValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Number(n) => match n.as_f64() {
                Some(v) => FeatureValue::Real(v),
                None => FeatureValue::Text(n.to_string()),
            },
            Value::String(s) => FeatureValue::Text(s),
            Value::Null => FeatureValue::Text(String::new()),
            Value::Bool(b) => FeatureValue::Text(if b { "True" } else { "False" }.to_string()),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .into_iter()
                    .map(|item| FeatureValue::from(item).to_string())
                    .collect();
                FeatureValue::Text(format!("({})", parts.join(", ")))
            }
            Value::Object(_) => FeatureValue::Text(value.to_string()),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Real(v) => write!(f, "{:?}", v),
            FeatureValue::Text(s) => f.write_str(s),
        }
    }
}

/// Features extracted for one region of one patient
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub color_id: i32,
    pub struct_name: String,
    pub rgb: Rgb,
    /// Feature name and value, in extractor order
    pub features: Vec<(String, FeatureValue)>,
}

impl FeatureRecord {
    /// Looks up a feature by name
    pub fn feature(&self, name: &str) -> Option<&FeatureValue> {
        self.features
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// The per-patient feature table written to `stats/features.csv`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    pub records: Vec<FeatureRecord>,
}

impl FeatureTable {
    pub fn new(records: Vec<FeatureRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column header: identity columns, then feature names in order of
    /// first appearance across records
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![
            COLOR_ID_COLUMN.to_string(),
            STRUCT_NAME_COLUMN.to_string(),
            RGB_COLUMN.to_string(),
        ];
        let mut seen = HashSet::new();
        for record in &self.records {
            for (name, _) in &record.features {
                if seen.insert(name.as_str()) {
                    columns.push(name.clone());
                }
            }
        }
        columns
    }

    /// Writes the table as CSV
    ///
    /// Features a record lacks are left as empty cells.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let columns = self.columns();
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&columns)?;

        for record in &self.records {
            let mut row = vec![
                record.color_id.to_string(),
                record.struct_name.clone(),
                record.rgb.to_string(),
            ];
            row.extend(
                columns[3..]
                    .iter()
                    .map(|name| record.feature(name).map(|v| v.to_string()).unwrap_or_default()),
            );
            csv.write_record(&row)?;
        }

        csv.flush()?;
        Ok(())
    }

    /// Writes the table to `path`, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.write_csv(fs::File::create(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i32, name: &str, features: &[(&str, FeatureValue)]) -> FeatureRecord {
        FeatureRecord {
            color_id: id,
            struct_name: name.to_string(),
            rgb: Rgb::new(1, 2, 3),
            features: features
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_columns_follow_first_appearance() {
        let table = FeatureTable::new(vec![
            record(17, "Left-Hippocampus", &[("original_b", 1.0.into())]),
            record(
                53,
                "Right-Hippocampus",
                &[("original_a", 2.0.into()), ("original_b", 3.0.into())],
            ),
        ]);

        assert_eq!(
            table.columns(),
            vec!["ColorId", "StructName", "RGB", "original_b", "original_a"]
        );
    }

    #[test]
    fn test_csv_leaves_missing_features_empty() {
        let table = FeatureTable::new(vec![
            record(17, "Left-Hippocampus", &[("original_x", 0.5.into())]),
            record(53, "Right-Hippocampus", &[("original_y", "(1, 1, 1)".into())]),
        ]);

        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ColorId,StructName,RGB,original_x,original_y");
        assert_eq!(lines[1], "17,Left-Hippocampus,[1 2 3],0.5,");
        assert_eq!(lines[2], "53,Right-Hippocampus,[1 2 3],,\"(1, 1, 1)\"");
    }

    #[test]
    fn test_json_values_convert() {
        assert_eq!(FeatureValue::from(json!(1.5)), FeatureValue::Real(1.5));
        assert_eq!(FeatureValue::from(json!(3)), FeatureValue::Real(3.0));
        assert_eq!(
            FeatureValue::from(json!("abc123")),
            FeatureValue::Text("abc123".to_string())
        );
        assert_eq!(
            FeatureValue::from(json!([1.0, 1.0, 1.25])).to_string(),
            "(1.0, 1.0, 1.25)"
        );
        assert_eq!(FeatureValue::from(json!(null)).to_string(), "");
    }

    #[test]
    fn test_save_creates_stats_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("patient").join("stats").join("features.csv");

        FeatureTable::new(vec![record(10, "Left-Thalamus", &[])])
            .save(&path)
            .unwrap();
        assert!(path.is_file());
    }
}
