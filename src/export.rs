//! CSV export of a subject's flashcards.

use anyhow::{Context, Result};

use crate::models::FlashCard;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Writes a `Card,Definition` header followed by one row per card.
pub fn flashcards_to_csv(flashcards: &[FlashCard]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Card", "Definition"])
        .context("Failed to write CSV header")?;

    for flashcard in flashcards {
        writer
            .write_record([flashcard.card.as_str(), flashcard.definition.as_str()])
            .with_context(|| format!("Failed to write flashcard {} to CSV", flashcard.id))?;
    }

    writer.into_inner().context("Failed to flush CSV export")
}

/// Download name for a subject, e.g. `flashcards_subject_Cell_Biology.csv`.
pub fn export_file_name(subject_name: &str) -> String {
    let safe: String = subject_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    format!("flashcards_subject_{}.csv", safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(id: i32, card: &str, definition: &str) -> FlashCard {
        FlashCard {
            id,
            subject_id: 1,
            card: card.to_string(),
            definition: definition.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let bytes = flashcards_to_csv(&[
            card(1, "Mitosis", "Cell division"),
            card(2, "Osmosis", "Diffusion of water"),
        ])
        .unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Card,Definition\nMitosis,Cell division\nOsmosis,Diffusion of water\n"
        );
    }

    #[test]
    fn test_csv_quotes_fields_with_separators() {
        let bytes = flashcards_to_csv(&[card(1, "ATP, ADP", "The \"energy\" currency\nof the cell")]).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Card,Definition\n\"ATP, ADP\",\"The \"\"energy\"\" currency\nof the cell\"\n"
        );
    }

    #[test]
    fn test_csv_keeps_utf8() {
        let bytes = flashcards_to_csv(&[card(1, "細胞分裂", "Zellteilung")]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Card,Definition\n細胞分裂,Zellteilung\n");
    }

    #[test]
    fn test_export_file_name_is_header_safe() {
        assert_eq!(export_file_name("Biology"), "flashcards_subject_Biology.csv");
        assert_eq!(export_file_name("Cell \"Bio\"/101"), "flashcards_subject_Cell__Bio__101.csv");
        assert_eq!(export_file_name("生物"), "flashcards_subject___.csv");
    }
}
