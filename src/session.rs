//! Quiz session controller.
//!
//! A [`SessionState`] is owned by exactly one caller and threaded through
//! [`handle_event`] once per user interaction. The controller never reads the
//! clock or a global random source: every call receives the sampled `now` and
//! the generator to pick questions with.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{seq::SliceRandom, Rng};

use crate::models::quiz::{ExportRow, Question, QuestionBank, WrongAnswer, NO_ANSWER};

/// Time allowed for each question.
pub const TIMER_DURATION_SECS: i64 = 10;

/// What the user did with the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Selected(String),
    /// The timer ran out before anything was submitted.
    NoAnswer,
}

/// Feedback about the answer that was just evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub timed_out: bool,
    pub correct_answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    Submit { selected_option: String },
    TimeoutCheck,
    Restart,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderDirective {
    Question {
        question_number: usize,
        total: usize,
        question: Question,
        remaining_seconds: u64,
    },
    Complete {
        score: usize,
        total: usize,
        wrong_answers: Vec<WrongAnswer>,
        export_rows: Vec<ExportRow>,
    },
}

/// Result of feeding one event into the controller.
#[derive(Debug)]
pub struct Transition {
    pub state: SessionState,
    pub directive: RenderDirective,
    pub outcome: Option<AnswerOutcome>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ActiveQuestion {
    index: usize,
    started_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct SessionState {
    bank: Arc<QuestionBank>,
    asked: Vec<usize>,
    score: usize,
    wrong_answers: Vec<WrongAnswer>,
    current: Option<ActiveQuestion>,
}

impl SessionState {
    /// Starts a fresh attempt with a question already picked.
    pub fn new<R: Rng + ?Sized>(bank: Arc<QuestionBank>, now: DateTime<Utc>, rng: &mut R) -> Self {
        let mut state = Self {
            bank,
            asked: Vec::new(),
            score: 0,
            wrong_answers: Vec::new(),
            current: None,
        };
        state.pick_next_question(now, rng);
        state
    }

    /// Discards this attempt and starts over on the same bank.
    pub fn restart<R: Rng + ?Sized>(self, now: DateTime<Utc>, rng: &mut R) -> Self {
        Self::new(self.bank, now, rng)
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn wrong_answers(&self) -> &[WrongAnswer] {
        &self.wrong_answers
    }

    /// Questions already answered, in the order they were shown.
    pub fn asked_questions(&self) -> impl Iterator<Item = &Question> + '_ {
        self.asked.iter().filter_map(|&index| self.bank.get(index))
    }

    pub fn asked_count(&self) -> usize {
        self.asked.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.and_then(|active| self.bank.get(active.index))
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.current
            .map(|active| active.started_at + Duration::seconds(TIMER_DURATION_SECS))
    }

    pub fn is_complete(&self) -> bool {
        self.asked.len() == self.bank.len()
    }

    /// Picks a random question that has not been asked yet and restarts the timer.
    ///
    /// # Panics
    ///
    /// Panics if every question has already been asked. Callers gate on
    /// [`SessionState::is_complete`] first.
    pub fn pick_next_question<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) {
        let remaining: Vec<usize> = (0..self.bank.len())
            .filter(|index| !self.asked.contains(index))
            .collect();
        let index = match remaining.choose(rng) {
            Some(&index) => index,
            None => panic!("no unasked questions left in the bank"),
        };
        self.current = Some(ActiveQuestion {
            index,
            started_at: now,
        });
    }

    /// Scores the current question and moves on to the next one.
    ///
    /// Returns `None` when no question is active, i.e. the session is complete.
    pub fn evaluate_answer<R: Rng + ?Sized>(
        &mut self,
        answer: Answer,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<AnswerOutcome> {
        let active = self.current.take()?;
        let question = self.bank.get(active.index)?.clone();

        let (correct, timed_out, your_answer) = match answer {
            Answer::Selected(option) => (question.is_correct(&option), false, option),
            Answer::NoAnswer => (false, true, NO_ANSWER.to_string()),
        };

        if correct {
            self.score += 1;
        } else {
            self.wrong_answers.push(WrongAnswer {
                question: question.text.clone(),
                your_answer,
                correct_answer: question.correct_answer.clone(),
            });
        }
        self.asked.push(active.index);

        if !self.is_complete() {
            self.pick_next_question(now, rng);
        }

        Some(AnswerOutcome {
            correct,
            timed_out,
            correct_answer: question.correct_answer,
        })
    }

    /// Whole seconds left on the current question, `None` when nothing is active.
    pub fn tick(&self, now: DateTime<Utc>) -> Option<u64> {
        let active = self.current?;
        let elapsed = (now - active.started_at).num_seconds().max(0);
        Some((TIMER_DURATION_SECS - elapsed).max(0) as u64)
    }

    /// Builds one row per asked question, in bank order.
    ///
    /// Questions without a wrong-answer entry were answered correctly; every
    /// other row is incorrect whatever its answer text. On a complete session
    /// this covers the whole bank.
    pub fn export_results(&self) -> Vec<ExportRow> {
        self.bank
            .questions()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.asked.contains(index))
            .map(|(_, question)| {
                let wrong = self
                    .wrong_answers
                    .iter()
                    .find(|wrong| wrong.question == question.text);
                ExportRow {
                    question: question.text.clone(),
                    is_correct: wrong.is_none(),
                    your_answer: wrong
                        .map(|wrong| wrong.your_answer.clone())
                        .unwrap_or_else(|| question.correct_answer.clone()),
                    correct_answer: question.correct_answer.clone(),
                }
            })
            .collect()
    }

    pub fn directive(&self, now: DateTime<Utc>) -> RenderDirective {
        match (self.current_question(), self.tick(now)) {
            (Some(question), Some(remaining_seconds)) => RenderDirective::Question {
                question_number: self.asked.len() + 1,
                total: self.bank.len(),
                question: question.clone(),
                remaining_seconds,
            },
            _ => RenderDirective::Complete {
                score: self.score,
                total: self.bank.len(),
                wrong_answers: self.wrong_answers.clone(),
                export_rows: self.export_results(),
            },
        }
    }
}

/// Applies one user interaction to the session.
pub fn handle_event<R: Rng + ?Sized>(
    mut state: SessionState,
    event: QuizEvent,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Transition {
    let outcome = match event {
        QuizEvent::Submit { selected_option } => {
            state.evaluate_answer(Answer::Selected(selected_option), now, rng)
        }
        QuizEvent::TimeoutCheck => match state.tick(now) {
            Some(0) => state.evaluate_answer(Answer::NoAnswer, now, rng),
            _ => None,
        },
        QuizEvent::Restart => {
            state = state.restart(now, rng);
            None
        }
    };

    let directive = state.directive(now);
    Transition {
        state,
        directive,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn new_session(seed: u64) -> (SessionState, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = SessionState::new(Arc::new(QuestionBank::default()), start(), &mut rng);
        (state, rng)
    }

    fn current_correct(state: &SessionState) -> String {
        state.current_question().unwrap().correct_answer.clone()
    }

    fn asked_texts(state: &SessionState) -> Vec<String> {
        state.asked_questions().map(|q| q.text.clone()).collect()
    }

    #[test]
    fn new_session_starts_empty_with_a_question() {
        let (state, _) = new_session(1);
        assert_eq!(state.score(), 0);
        assert_eq!(state.asked_count(), 0);
        assert!(state.wrong_answers().is_empty());
        assert!(state.current_question().is_some());
        assert_eq!(
            state.deadline(),
            Some(start() + Duration::seconds(TIMER_DURATION_SECS))
        );
    }

    #[test]
    fn all_correct_answers_score_full_marks() {
        let (mut state, mut rng) = new_session(7);
        let now = start();

        for _ in 0..10 {
            let answer = current_correct(&state);
            let outcome = state
                .evaluate_answer(Answer::Selected(answer), now, &mut rng)
                .unwrap();
            assert!(outcome.correct);
        }

        assert!(state.is_complete());
        assert_eq!(state.score(), 10);
        assert!(state.wrong_answers().is_empty());
        assert!(state.current_question().is_none());
    }

    #[test]
    fn wrong_answer_is_logged() {
        let (mut state, mut rng) = new_session(3);
        let question = state.current_question().unwrap().clone();

        let outcome = state
            .evaluate_answer(Answer::Selected("X".to_string()), start(), &mut rng)
            .unwrap();

        assert!(!outcome.correct);
        assert!(!outcome.timed_out);
        assert_eq!(state.score(), 0);
        assert_eq!(
            state.wrong_answers(),
            &[WrongAnswer {
                question: question.text.clone(),
                your_answer: "X".to_string(),
                correct_answer: question.correct_answer.clone(),
            }]
        );
    }

    #[test]
    fn invariants_hold_after_every_answer() {
        let (mut state, mut rng) = new_session(11);
        let now = start();

        for round in 0..10 {
            let before = state.asked_count();
            let current = state.current_question().unwrap().text.clone();
            assert!(!asked_texts(&state).contains(&current));

            let answer = if round % 3 == 0 {
                Answer::NoAnswer
            } else if round % 2 == 0 {
                Answer::Selected("nope".to_string())
            } else {
                Answer::Selected(current_correct(&state))
            };
            state.evaluate_answer(answer, now, &mut rng);

            assert_eq!(state.asked_count(), before + 1);
            let unique: HashSet<_> = asked_texts(&state).into_iter().collect();
            assert_eq!(unique.len(), state.asked_count());
            assert_eq!(
                state.score(),
                state.asked_count() - state.wrong_answers().len()
            );
            assert_eq!(state.is_complete(), state.asked_count() == 10);
        }

        assert!(state.current_question().is_none());
    }

    #[test]
    fn picking_ten_times_exhausts_the_bank_without_repeats() {
        let (mut state, mut rng) = new_session(5);
        let mut seen = HashSet::new();

        for _ in 0..10 {
            let text = state.current_question().unwrap().text.clone();
            assert!(seen.insert(text));
            state.evaluate_answer(Answer::NoAnswer, start(), &mut rng);
        }

        assert_eq!(seen.len(), 10);
        assert!(state.is_complete());
    }

    #[test]
    #[should_panic(expected = "no unasked questions")]
    fn picking_from_an_empty_pool_panics() {
        let (mut state, mut rng) = new_session(5);
        while !state.is_complete() {
            state.evaluate_answer(Answer::NoAnswer, start(), &mut rng);
        }
        state.pick_next_question(start(), &mut rng);
    }

    #[test]
    fn evaluating_a_complete_session_does_nothing() {
        let (mut state, mut rng) = new_session(2);
        while !state.is_complete() {
            state.evaluate_answer(Answer::NoAnswer, start(), &mut rng);
        }
        assert!(state
            .evaluate_answer(Answer::Selected("def".to_string()), start(), &mut rng)
            .is_none());
        assert_eq!(state.asked_count(), 10);
    }

    #[test]
    fn tick_counts_down_and_stops_at_zero() {
        let (state, _) = new_session(9);
        assert_eq!(state.tick(start()), Some(10));
        assert_eq!(state.tick(start() + Duration::milliseconds(3_900)), Some(7));
        assert_eq!(state.tick(start() + Duration::seconds(10)), Some(0));
        assert_eq!(state.tick(start() + Duration::seconds(25)), Some(0));
    }

    #[test]
    fn timeout_check_auto_submits_with_no_answer() {
        let (state, mut rng) = new_session(4);
        let question = state.current_question().unwrap().clone();

        let early = handle_event(
            state,
            QuizEvent::TimeoutCheck,
            start() + Duration::seconds(9),
            &mut rng,
        );
        assert!(early.outcome.is_none());
        assert_eq!(early.state.asked_count(), 0);

        let expired = handle_event(
            early.state,
            QuizEvent::TimeoutCheck,
            start() + Duration::seconds(10),
            &mut rng,
        );
        let outcome = expired.outcome.unwrap();
        assert!(outcome.timed_out);
        assert!(!outcome.correct);
        assert_eq!(
            expired.state.wrong_answers()[0],
            WrongAnswer {
                question: question.text,
                your_answer: NO_ANSWER.to_string(),
                correct_answer: question.correct_answer,
            }
        );
    }

    #[test]
    fn next_question_gets_a_fresh_deadline() {
        let (state, mut rng) = new_session(8);
        let later = start() + Duration::seconds(6);
        let answer = current_correct(&state);

        let transition = handle_event(
            state,
            QuizEvent::Submit {
                selected_option: answer,
            },
            later,
            &mut rng,
        );

        assert_eq!(transition.state.tick(later), Some(10));
        match transition.directive {
            RenderDirective::Question {
                question_number,
                remaining_seconds,
                ..
            } => {
                assert_eq!(question_number, 2);
                assert_eq!(remaining_seconds, 10);
            }
            other => panic!("expected a question, got {other:?}"),
        }
    }

    #[test]
    fn export_has_one_row_per_bank_question_in_bank_order() {
        let (mut state, mut rng) = new_session(12);
        let mut round = 0;
        while !state.is_complete() {
            let answer = if round % 2 == 0 {
                Answer::Selected(current_correct(&state))
            } else {
                Answer::Selected("wrong".to_string())
            };
            state.evaluate_answer(answer, start(), &mut rng);
            round += 1;
        }

        let rows = state.export_results();
        assert_eq!(rows.len(), 10);
        for (row, question) in rows.iter().zip(state.bank().questions()) {
            assert_eq!(row.question, question.text);
            assert_eq!(row.is_correct, row.your_answer == row.correct_answer);
        }
        assert_eq!(rows.iter().filter(|row| row.is_correct).count(), 5);
    }

    #[test]
    fn timeout_never_exports_as_correct() {
        let question = Question::new("Timed out?", ["a", "b", "c", NO_ANSWER], NO_ANSWER);
        let bank = Arc::new(QuestionBank::unvalidated("sentinel", vec![question]));
        let mut rng = StdRng::seed_from_u64(1);
        let state = SessionState::new(bank, start(), &mut rng);

        let transition = handle_event(
            state,
            QuizEvent::TimeoutCheck,
            start() + Duration::seconds(TIMER_DURATION_SECS),
            &mut rng,
        );

        assert_eq!(transition.outcome.map(|outcome| outcome.correct), Some(false));
        assert_eq!(transition.state.score(), 0);
        let rows = transition.state.export_results();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_correct);
    }

    #[test]
    fn complete_directive_reports_score() {
        let (mut state, mut rng) = new_session(6);
        while !state.is_complete() {
            let answer = current_correct(&state);
            state.evaluate_answer(Answer::Selected(answer), start(), &mut rng);
        }

        let transition = handle_event(state, QuizEvent::TimeoutCheck, start(), &mut rng);
        assert!(transition.outcome.is_none());
        match transition.directive {
            RenderDirective::Complete {
                score,
                total,
                wrong_answers,
                export_rows,
            } => {
                assert_eq!((score, total), (10, 10));
                assert!(wrong_answers.is_empty());
                assert!(export_rows.iter().all(|row| row.is_correct));
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn restart_resets_everything() {
        let (mut state, mut rng) = new_session(10);
        for _ in 0..4 {
            state.evaluate_answer(Answer::Selected("X".to_string()), start(), &mut rng);
        }

        let later = start() + Duration::minutes(2);
        let transition = handle_event(state, QuizEvent::Restart, later, &mut rng);
        let state = transition.state;

        assert_eq!(state.score(), 0);
        assert_eq!(state.asked_count(), 0);
        assert!(state.wrong_answers().is_empty());
        assert!(state.current_question().is_some());
        assert_eq!(state.tick(later), Some(10));
    }
}
