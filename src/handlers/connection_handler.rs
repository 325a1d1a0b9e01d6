use crate::{
    error::QuizError,
    handlers::command_handler::{execute_command, execute_tick},
    helpers::{encode_response, parse_command},
    models::{communication::Response, quiz::QuestionBank},
    session::SessionState,
};
use chrono::Utc;
use futures_timer::Delay;
use futures_util::{future, Sink, SinkExt, StreamExt};
use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpStream;
use tungstenite::Message;
use uuid::Uuid;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

enum Wake {
    Frame(Option<Result<Message, tungstenite::Error>>),
    Tick,
}

pub async fn handle_connection(bank: Arc<QuestionBank>, raw_stream: TcpStream, addr: SocketAddr) {
    info!("Incoming TCP connection from: {}", &addr);

    let ws_stream = match tokio_tungstenite::accept_async(raw_stream).await {
        Ok(stream) => stream,
        Err(error) => {
            warn!("Handshake with {} error: {}", addr, error);
            return;
        }
    };

    let session_id = Uuid::new_v4().to_string();
    info!("WebSocket connection established: {} ({})", &addr, &session_id);

    match run_session(bank, ws_stream, &session_id).await {
        Ok(()) => info!("{} disconnected ({})", &addr, &session_id),
        Err(error) => warn!("Session {} with {} ended: {}", &session_id, &addr, error),
    }
}

async fn run_session<S>(
    bank: Arc<QuestionBank>,
    ws_stream: S,
    session_id: &str,
) -> Result<(), QuizError>
where
    S: futures_util::Stream<Item = Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin,
{
    let (mut outgoing, mut incoming) = ws_stream.split();
    let mut rng = StdRng::from_entropy();

    let mut session = SessionState::new(bank, Utc::now(), &mut rng);
    send_all(&mut outgoing, vec![session.directive(Utc::now()).into()]).await?;

    let mut ticker = Delay::new(TICK_INTERVAL);
    loop {
        let wake = match future::select(incoming.next(), &mut ticker).await {
            future::Either::Left((frame, _)) => Wake::Frame(frame),
            future::Either::Right(_) => Wake::Tick,
        };

        let responses = match wake {
            Wake::Tick => {
                ticker.reset(TICK_INTERVAL);
                let (next, responses) = execute_tick(session, Utc::now(), &mut rng);
                session = next;
                responses
            }
            Wake::Frame(None) => return Ok(()),
            Wake::Frame(Some(Err(error))) => return Err(error.into()),
            Wake::Frame(Some(Ok(msg))) => {
                if msg.is_close() {
                    return Ok(());
                }
                if !msg.is_text() {
                    continue;
                }
                match parse_command(&msg) {
                    Ok(command) => {
                        info!("Command from {}: {:?}", session_id, &command);
                        let (next, responses) =
                            execute_command(command, session, Utc::now(), &mut rng);
                        session = next;
                        responses
                    }
                    Err(error) => {
                        warn!("Error parsing command from {}: {}", session_id, error);
                        vec![Response::error(error.to_string())]
                    }
                }
            }
        };

        send_all(&mut outgoing, responses).await?;
    }
}

async fn send_all<W>(outgoing: &mut W, responses: Vec<Response>) -> Result<(), QuizError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    for response in responses {
        outgoing.send(encode_response(&response)?).await?;
    }
    Ok(())
}
