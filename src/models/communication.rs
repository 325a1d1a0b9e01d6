use serde::{Deserialize, Serialize};

use super::quiz::{ExportRow, WrongAnswer};
use crate::session::{AnswerOutcome, RenderDirective};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    Submit {
        selected_option: String,
        /// Text of the question being answered; a mismatch means the answer is stale.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question: Option<String>,
    },
    TimeoutCheck {},
    Restart {},
    DownloadResults {},
    Heartbeat {},
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(
    tag = "response",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Response {
    Question {
        question_number: usize,
        total: usize,
        question: String,
        options: Vec<String>,
        remaining_seconds: u64,
    },
    Timer {
        remaining_seconds: u64,
    },
    AnswerResult {
        correct: bool,
        timed_out: bool,
        correct_answer: String,
    },
    Complete {
        score: usize,
        total: usize,
        wrong_answers: Vec<WrongAnswer>,
        export_rows: Vec<ExportRow>,
    },
    ResultsCsv {
        file_name: String,
        csv: String,
    },
    Error {
        error_text: String,
    },
}

impl Response {
    pub fn error(text: impl Into<String>) -> Self {
        Response::Error {
            error_text: text.into(),
        }
    }
}

impl From<RenderDirective> for Response {
    fn from(directive: RenderDirective) -> Self {
        match directive {
            RenderDirective::Question {
                question_number,
                total,
                question,
                remaining_seconds,
            } => Response::Question {
                question_number,
                total,
                question: question.text,
                options: question.options.to_vec(),
                remaining_seconds,
            },
            RenderDirective::Complete {
                score,
                total,
                wrong_answers,
                export_rows,
            } => Response::Complete {
                score,
                total,
                wrong_answers,
                export_rows,
            },
        }
    }
}

impl From<AnswerOutcome> for Response {
    fn from(outcome: AnswerOutcome) -> Self {
        Response::AnswerResult {
            correct: outcome.correct,
            timed_out: outcome.timed_out,
            correct_answer: outcome.correct_answer,
        }
    }
}
