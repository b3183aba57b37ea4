//! Bot import and export in JSON and CSV.
//!
//! JSON export writes the store's bot shape; JSON import only reads `name`
//! and `personality` from each entry, so exports from another registry can
//! be imported as fresh bots. CSV uses one row per bot with a column per
//! factor code.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use persona_types::bot::Bot;
use persona_types::error::RegistryError;
use persona_types::personality::{Factor, Personality, Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFormat {
    Json,
    Csv,
}

impl TransferFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for TransferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferFormat::Json => write!(f, "json"),
            TransferFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for TransferFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(TransferFormat::Json),
            "csv" => Ok(TransferFormat::Csv),
            other => Err(format!("invalid format: '{other}' (expected json or csv)")),
        }
    }
}

/// A validated entry ready to become a new bot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportedBot {
    pub name: String,
    pub personality: Personality,
}

impl ImportedBot {
    pub fn new(name: impl Into<String>, personality: Personality) -> Self {
        Self {
            name: name.into(),
            personality,
        }
    }
}

fn csv_header() -> Vec<&'static str> {
    std::iter::once("name")
        .chain(Factor::ALL.into_iter().map(Factor::code))
        .collect()
}

/// Render bots in the given format.
pub fn export(bots: &[Bot], format: TransferFormat) -> Result<String, RegistryError> {
    match format {
        TransferFormat::Json => serde_json::to_string_pretty(bots)
            .map_err(|e| RegistryError::WriteError(format!("failed to encode JSON: {e}"))),
        TransferFormat::Csv => export_csv(bots),
    }
}

fn export_csv(bots: &[Bot]) -> Result<String, RegistryError> {
    let write_err = |e: csv::Error| RegistryError::WriteError(format!("failed to encode CSV: {e}"));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(csv_header()).map_err(write_err)?;
    for bot in bots {
        let mut row = Vec::with_capacity(Factor::COUNT + 1);
        row.push(bot.name.clone());
        row.extend(bot.personality.iter().map(|(_, score)| score.to_string()));
        writer.write_record(&row).map_err(write_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RegistryError::WriteError(format!("failed to flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| RegistryError::WriteError(e.to_string()))
}

/// Parse and validate an import document. Nothing is returned unless every
/// entry is valid.
pub fn import(text: &str, format: TransferFormat) -> Result<Vec<ImportedBot>, RegistryError> {
    let entries = match format {
        TransferFormat::Json => serde_json::from_str::<Vec<ImportedBot>>(text)
            .map_err(|e| RegistryError::InvalidImport(format!("invalid JSON: {e}")))?,
        TransferFormat::Csv => import_csv(text)?,
    };

    for (index, entry) in entries.iter().enumerate() {
        if !entry.name.chars().any(char::is_alphanumeric) {
            return Err(RegistryError::InvalidImport(format!(
                "entry {}: name '{}' has no alphanumeric characters",
                index + 1,
                entry.name
            )));
        }
    }
    Ok(entries)
}

fn import_csv(text: &str) -> Result<Vec<ImportedBot>, RegistryError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| RegistryError::InvalidImport(format!("unreadable CSV header: {e}")))?
        .clone();
    let expected = csv_header();
    if headers.iter().ne(expected.iter().copied()) {
        return Err(RegistryError::InvalidImport(format!(
            "CSV header must be '{}'",
            expected.join(",")
        )));
    }

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| RegistryError::InvalidImport(format!("bad CSV row: {e}")))?;
        let line = record.position().map_or(0, |p| p.line());

        let name = record.get(0).unwrap_or_default().to_string();
        let mut personality = Personality::neutral();
        for (column, factor) in Factor::ALL.into_iter().enumerate() {
            let cell = record.get(column + 1).unwrap_or_default();
            let score = cell
                .parse::<i64>()
                .ok()
                .and_then(|v| Score::new(v).ok())
                .ok_or_else(|| {
                    RegistryError::InvalidImport(format!(
                        "line {line}: factor {factor} value '{cell}' is not an integer in 1..=10"
                    ))
                })?;
            personality.set(factor, score);
        }
        entries.push(ImportedBot::new(name, personality));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use persona_types::bot::BotId;

    fn bot(name: &str, personality: Personality) -> Bot {
        let now = Utc::now();
        Bot {
            id: BotId::new(),
            slug: persona_types::bot::slugify(name),
            name: name.to_string(),
            personality,
            created_at: now,
            updated_at: now,
        }
    }

    const HEADER: &str = "name,A,B,C,E,F,G,H,I,L,M,N,O,Q1,Q2,Q3,Q4";

    #[test]
    fn test_format_parse_and_from_path() {
        assert_eq!("JSON".parse::<TransferFormat>().unwrap(), TransferFormat::Json);
        assert!("xml".parse::<TransferFormat>().is_err());
        assert_eq!(
            TransferFormat::from_path(Path::new("bots.csv")),
            Some(TransferFormat::Csv)
        );
        assert_eq!(TransferFormat::from_path(Path::new("bots")), None);
    }

    #[test]
    fn test_csv_export_layout() {
        let mut p = Personality::neutral();
        p.set(Factor::A, Score::new(9).unwrap());
        let out = export(&[bot("Aria, the Bold", p)], TransferFormat::Csv).unwrap();

        let mut lines = out.lines();
        assert_eq!(lines.next().unwrap(), HEADER);
        assert_eq!(
            lines.next().unwrap(),
            "\"Aria, the Bold\",9,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5"
        );
    }

    #[test]
    fn test_csv_export_then_import_preserves_profiles() {
        let mut p = Personality::neutral();
        p.set(Factor::Q4, Score::new(1).unwrap());
        let bots = [bot("Aria", p), bot("Moss", Personality::neutral())];

        let text = export(&bots, TransferFormat::Csv).unwrap();
        let imported = import(&text, TransferFormat::Csv).unwrap();
        assert_eq!(
            imported,
            vec![ImportedBot::new("Aria", p), ImportedBot::new("Moss", Personality::neutral())]
        );
    }

    #[test]
    fn test_csv_import_rejects_out_of_range_cell() {
        let text = format!("{HEADER}\nAria,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,11\n");
        let err = import(&text, TransferFormat::Csv).unwrap_err();
        match err {
            RegistryError::InvalidImport(msg) => {
                assert!(msg.contains("line 2"), "{msg}");
                assert!(msg.contains("Q4"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_csv_import_rejects_wrong_header() {
        let text = "name,A,B\nAria,5,5\n";
        assert!(matches!(
            import(text, TransferFormat::Csv),
            Err(RegistryError::InvalidImport(_))
        ));
    }

    #[test]
    fn test_csv_import_rejects_short_row() {
        let text = format!("{HEADER}\nAria,5,5\n");
        assert!(import(&text, TransferFormat::Csv).is_err());
    }

    #[test]
    fn test_json_import_ignores_ids() {
        let original = bot("Aria", Personality::neutral());
        let text = export(std::slice::from_ref(&original), TransferFormat::Json).unwrap();
        let imported = import(&text, TransferFormat::Json).unwrap();
        assert_eq!(imported, vec![ImportedBot::new("Aria", Personality::neutral())]);
    }

    #[test]
    fn test_json_import_rejects_missing_factor() {
        let text = r#"[{"name": "Aria", "personality": {"A": 5}}]"#;
        assert!(matches!(
            import(text, TransferFormat::Json),
            Err(RegistryError::InvalidImport(_))
        ));
    }

    #[test]
    fn test_import_rejects_blank_name() {
        let text = format!("{HEADER}\n  ,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5,5\n");
        assert!(matches!(
            import(&text, TransferFormat::Csv),
            Err(RegistryError::InvalidImport(_))
        ));
    }
}
