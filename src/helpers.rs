use tungstenite::Message;

use crate::models::communication::{Command, Response};

pub fn parse_command(msg: &Message) -> Result<Command, serde_json::Error> {
    serde_json::from_str(msg.to_text().unwrap_or_default())
}

pub fn encode_response(response: &Response) -> Result<Message, serde_json::Error> {
    Ok(Message::Text(serde_json::to_string(response)?))
}
