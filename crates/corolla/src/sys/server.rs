use crate::config::MenuStructure;
use crate::events::{AppEvent, MenuSource, Navigation, Reply};
use crate::menu::ErrorCode;
use async_channel::Sender;
use hyprwarp::wm::Point;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::net::unix::OwnedWriteHalf;

pub const SOCKET_PATH: &str = "/tmp/corolla.sock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum Verb {
    Show,
    Edit,
    ShowJson,
    Motion,
    Release,
    HoverCenter,
    HoverParent,
    HoverChild,
    SelectChild,
    SelectParent,
    Cancel,
    Hide,
}

#[derive(Debug, Clone)]
pub enum Command {
    Show { menu: String, edit_mode: bool },
    ShowJson(Box<MenuStructure>),
    Motion(Point),
    Release(u32),
    Navigate(Navigation),
    Cancel,
    Hide,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(Verb),
    #[error("invalid argument '{1}' for '{0}'")]
    InvalidArgument(Verb, String),
    #[error("invalid menu json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<ProtocolError> for ErrorCode {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::InvalidJson(e) => ErrorCode::InvalidJson(e.to_string()),
            other => ErrorCode::UnknownError(other.to_string()),
        }
    }
}

fn number<T: FromStr>(verb: Verb, arg: Option<&str>) -> Result<T, ProtocolError> {
    let arg = arg.ok_or(ProtocolError::MissingArgument(verb))?;
    arg.parse()
        .map_err(|_| ProtocolError::InvalidArgument(verb, arg.to_string()))
}

fn coordinate(verb: Verb, arg: Option<&str>) -> Result<f64, ProtocolError> {
    let value: f64 = number(verb, arg)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProtocolError::InvalidArgument(verb, value.to_string()))
    }
}

/// Parses one line of the socket protocol: a verb followed by its arguments.
pub fn parse_line(line: &str) -> Result<Command, ProtocolError> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    if head.is_empty() {
        return Err(ProtocolError::Empty);
    }

    let verb =
        Verb::from_str(head).map_err(|_| ProtocolError::UnknownCommand(head.to_string()))?;
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    let command = match verb {
        Verb::Show | Verb::Edit => {
            if rest.is_empty() {
                return Err(ProtocolError::MissingArgument(verb));
            }
            Command::Show {
                menu: rest.to_string(),
                edit_mode: verb == Verb::Edit,
            }
        }
        Verb::ShowJson => {
            if rest.is_empty() {
                return Err(ProtocolError::MissingArgument(verb));
            }
            Command::ShowJson(Box::new(serde_json::from_str(rest)?))
        }
        Verb::Motion => {
            let x = coordinate(verb, args.next())?;
            let y = coordinate(verb, args.next())?;
            Command::Motion(Point::new(x, y))
        }
        Verb::Release => Command::Release(number(verb, args.next())?),
        Verb::HoverCenter => Command::Navigate(Navigation::HoverCenter),
        Verb::HoverParent => Command::Navigate(Navigation::HoverParent),
        Verb::HoverChild => Command::Navigate(Navigation::HoverChild(number(verb, args.next())?)),
        Verb::SelectChild => {
            Command::Navigate(Navigation::SelectChild(number(verb, args.next())?))
        }
        Verb::SelectParent => Command::Navigate(Navigation::SelectParent),
        Verb::Cancel => Command::Cancel,
        Verb::Hide => Command::Hide,
    };

    Ok(command)
}

impl Command {
    fn into_event(self, reply: &Sender<Reply>) -> AppEvent {
        match self {
            Command::Show { menu, edit_mode } => AppEvent::Show {
                source: MenuSource::Named(menu),
                edit_mode,
                reply: reply.clone(),
            },
            Command::ShowJson(structure) => AppEvent::Show {
                source: MenuSource::Inline(structure),
                edit_mode: false,
                reply: reply.clone(),
            },
            Command::Motion(point) => AppEvent::CursorMove(point),
            Command::Release(button) => AppEvent::Click(button),
            Command::Navigate(navigation) => AppEvent::Navigate(navigation),
            Command::Cancel => AppEvent::Cancel,
            Command::Hide => AppEvent::Hide,
        }
    }
}

async fn write_replies(mut writer: OwnedWriteHalf, replies: async_channel::Receiver<Reply>) {
    while let Ok(reply) = replies.recv().await {
        let mut line = match serde_json::to_string(&reply) {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to encode reply: {}", e);
                continue;
            }
        };
        line.push('\n');

        if let Err(e) = writer.write_all(line.as_bytes()).await {
            log::debug!("Client went away: {}", e);
            break;
        }
    }
}

pub async fn run_server(tx: Sender<AppEvent>) {
    if fs_err::metadata(SOCKET_PATH).is_ok() {
        let _ = fs_err::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let (reader, writer) = stream.into_split();
                    let (reply_tx, reply_rx) = async_channel::unbounded();
                    tokio::spawn(write_replies(writer, reply_rx));

                    let mut lines = BufReader::new(reader).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        if line.trim().is_empty() {
                            continue;
                        }

                        match parse_line(&line) {
                            Ok(command) => {
                                if tx.send(command.into_event(&reply_tx)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                log::warn!("Rejected command '{}': {}", line.trim(), e);
                                let error = ErrorCode::from(e);
                                let _ = reply_tx.try_send(Reply::Error {
                                    code: error.code(),
                                    message: error.to_string(),
                                });
                            }
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
