use std::{collections::HashSet, fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Text recorded as the user's answer when the timer ran out.
pub const NO_ANSWER: &str = "No answer (time expired)";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    pub options: [String; 4],
    pub correct_answer: String,
}

impl Question {
    pub fn new(text: &str, options: [&str; 4], correct_answer: &str) -> Self {
        Self {
            text: text.to_string(),
            options: options.map(str::to_string),
            correct_answer: correct_answer.to_string(),
        }
    }

    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }
}

/// On-disk question pack.
#[derive(Serialize, Deserialize, Debug)]
pub struct Pack {
    pub name: String,
    pub questions: Vec<Question>,
}

/// A validated, immutable set of questions shared by every session.
#[derive(Clone, Debug)]
pub struct QuestionBank {
    name: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::InvalidPack("pack has no questions".to_string()));
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if question.text.trim().is_empty() {
                return Err(QuizError::InvalidPack("question text is empty".to_string()));
            }
            if !question.options.contains(&question.correct_answer) {
                return Err(QuizError::InvalidPack(format!(
                    "correct answer \"{}\" is not an option of \"{}\"",
                    question.correct_answer, question.text
                )));
            }
            if question.options.iter().any(|option| option == NO_ANSWER) {
                return Err(QuizError::InvalidPack(format!(
                    "\"{}\" uses the reserved option \"{}\"",
                    question.text, NO_ANSWER
                )));
            }
            if !seen.insert(question.text.as_str()) {
                return Err(QuizError::InvalidPack(format!(
                    "duplicate question \"{}\"",
                    question.text
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            questions,
        })
    }

    /// Skips validation so tests can build banks `new` would refuse.
    #[cfg(test)]
    pub(crate) fn unvalidated(name: &str, questions: Vec<Question>) -> Self {
        Self {
            name: name.to_string(),
            questions,
        }
    }

    pub fn from_pack(pack: Pack) -> Result<Self, QuizError> {
        Self::new(pack.name, pack.questions)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let data = fs::read_to_string(path.as_ref())?;
        let pack: Pack = serde_json::from_str(&data)?;
        let bank = Self::from_pack(pack)?;
        info!(
            "Loaded pack \"{}\" with {} questions from {}",
            bank.name,
            bank.len(),
            path.as_ref().display()
        );
        Ok(bank)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            name: "Python basics".to_string(),
            questions: python_questions(),
        }
    }
}

/// A question answered incorrectly, in the order it happened.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WrongAnswer {
    pub question: String,
    pub your_answer: String,
    pub correct_answer: String,
}

/// One line of the exported results.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub question: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

fn python_questions() -> Vec<Question> {
    vec![
        Question::new(
            "What is the correct file extension for Python files?",
            [".pyth", ".pt", ".py", ".pyt"],
            ".py",
        ),
        Question::new(
            "Which keyword is used to create a function in Python?",
            ["func", "def", "function", "define"],
            "def",
        ),
        Question::new(
            "How do you insert comments in Python code?",
            ["// comment", "/* comment */", "# comment", "-- comment"],
            "# comment",
        ),
        Question::new(
            "What will `print(2 ** 3)` output?",
            ["6", "8", "9", "5"],
            "8",
        ),
        Question::new(
            "What data type is the result of `3 / 2` in Python 3?",
            ["int", "float", "str", "bool"],
            "float",
        ),
        Question::new(
            "How do you start a for loop in Python?",
            [
                "for(i=0;i<5;i++)",
                "foreach i in range(5)",
                "for i in range(5):",
                "loop i from 1 to 5",
            ],
            "for i in range(5):",
        ),
        Question::new(
            "Which of the following is a valid variable name in Python?",
            ["2value", "value_2", "value-2", "value 2"],
            "value_2",
        ),
        Question::new(
            "What does the `len()` function do?",
            [
                "Returns the length",
                "Converts to int",
                "Returns type",
                "Prints output",
            ],
            "Returns the length",
        ),
        Question::new(
            "What is the output of `bool([])`?",
            ["True", "False", "None", "Error"],
            "False",
        ),
        Question::new(
            "What keyword is used to define a class in Python?",
            ["define", "struct", "class", "object"],
            "class",
        ),
    ]
}
