use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::Rng;

use crate::{
    export::{results_to_csv, RESULTS_FILE_NAME},
    models::communication::{Command, Response},
    session::{handle_event, QuizEvent, RenderDirective, SessionState, Transition},
};

/// Applies a client command to the session and returns the replies to send, in order.
pub fn execute_command<R: Rng + ?Sized>(
    command: Command,
    session: SessionState,
    now: DateTime<Utc>,
    rng: &mut R,
) -> (SessionState, Vec<Response>) {
    match command {
        Command::Submit {
            selected_option,
            question,
        } => {
            if session.is_complete() {
                warn!("Answer submitted after the quiz finished");
                return (session, vec![Response::error("Quiz is already complete")]);
            }
            let current = session.current_question().map(|current| current.text.as_str());
            if let Some(question) = question.filter(|question| Some(question.as_str()) != current) {
                warn!("Answer for \"{}\" arrived after the question changed", question);
                return (
                    session,
                    vec![Response::error("Answer is for a question that is no longer current")],
                );
            }
            info!("Answer submitted: {}", &selected_option);
            let transition = handle_event(session, QuizEvent::Submit { selected_option }, now, rng);
            transition_responses(transition)
        }
        Command::TimeoutCheck {} => execute_tick(session, now, rng),
        Command::Restart {} => {
            info!("Restarting quiz");
            let transition = handle_event(session, QuizEvent::Restart, now, rng);
            transition_responses(transition)
        }
        Command::DownloadResults {} => {
            if !session.is_complete() {
                return (session, vec![Response::error("Quiz is not finished yet")]);
            }
            let response = match results_to_csv(&session.export_results()) {
                Ok(csv) => Response::ResultsCsv {
                    file_name: RESULTS_FILE_NAME.to_string(),
                    csv,
                },
                Err(error) => {
                    warn!("Results export failed: {}", error);
                    Response::error(error.to_string())
                }
            };
            (session, vec![response])
        }
        Command::Heartbeat {} => {
            info!("Heartbeat");
            (session, Vec::new())
        }
    }
}

/// Timer tick from the connection loop. Silent once the quiz is over.
pub fn execute_tick<R: Rng + ?Sized>(
    session: SessionState,
    now: DateTime<Utc>,
    rng: &mut R,
) -> (SessionState, Vec<Response>) {
    if session.is_complete() {
        return (session, Vec::new());
    }

    let transition = handle_event(session, QuizEvent::TimeoutCheck, now, rng);
    if transition.outcome.is_some() {
        info!("Time's up, auto-submitting the question");
        return transition_responses(transition);
    }

    match transition.directive {
        RenderDirective::Question {
            remaining_seconds, ..
        } => (
            transition.state,
            vec![Response::Timer { remaining_seconds }],
        ),
        directive => (transition.state, vec![directive.into()]),
    }
}

fn transition_responses(transition: Transition) -> (SessionState, Vec<Response>) {
    let mut responses = Vec::with_capacity(2);
    if let Some(outcome) = transition.outcome {
        responses.push(outcome.into());
    }
    if let RenderDirective::Complete { score, total, .. } = &transition.directive {
        info!("Quiz finished: {}/{}", score, total);
    }
    responses.push(transition.directive.into());
    (transition.state, responses)
}
