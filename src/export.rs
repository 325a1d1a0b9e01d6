use serde::Serialize;

use crate::{error::QuizError, models::quiz::ExportRow};

/// File name offered to clients for the results download.
pub const RESULTS_FILE_NAME: &str = "quiz_results.csv";

#[derive(Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Question")]
    question: &'a str,
    #[serde(rename = "Your Answer")]
    your_answer: &'a str,
    #[serde(rename = "Correct Answer")]
    correct_answer: &'a str,
    #[serde(rename = "Correct?")]
    correct: &'static str,
}

impl<'a> From<&'a ExportRow> for CsvRecord<'a> {
    fn from(row: &'a ExportRow) -> Self {
        Self {
            question: &row.question,
            your_answer: &row.your_answer,
            correct_answer: &row.correct_answer,
            correct: if row.is_correct { "✅" } else { "❌" },
        }
    }
}

pub fn results_to_csv(rows: &[ExportRow]) -> Result<String, QuizError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(["Question", "Your Answer", "Correct Answer", "Correct?"])?;
    }
    for row in rows {
        writer.serialize(CsvRecord::from(row))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| QuizError::Io(error.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
