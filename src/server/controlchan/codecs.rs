//! Tokio codec for the control channel: command lines in, replies out.

use super::command::Command;
use super::error::{ControlChanError, ControlChanErrorKind};
use super::line_parser;
use crate::options::PARAM_MAX;
use crate::server::reply::Reply;
use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::{Decoder, Encoder};

// Room for the verb, separating spaces and the line terminator on top of the
// parameter cap.
const LINE_MAX: usize = PARAM_MAX + 16;

// FtpCodec implements tokio's `Decoder` and `Encoder` traits for the control
// channel, decoding FTP commands and encoding their replies.
pub(crate) struct FtpCodec {
    // Stored index of the next index to examine for a '\n' character. This is
    // used to optimize searching. For example, if `decode` was called with
    // `abc`, it would hold `3`, because that is the next index to examine.
    // The next time `decode` is called with `abcde\n`, we will only look at
    // `de\n` before returning.
    next_index: usize,
}

impl FtpCodec {
    pub fn new() -> Self {
        FtpCodec { next_index: 0 }
    }
}

impl Decoder for FtpCodec {
    type Item = Command;
    type Error = ControlChanError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Command>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            Ok(Some(line_parser::parse(&line)?))
        } else if buf.len() > LINE_MAX {
            Err(ControlChanErrorKind::LineTooLong.into())
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buffer = vec![];
        match reply {
            Reply::None => {
                return Ok(());
            }
            Reply::CodeAndMsg { code, msg } => {
                if msg.is_empty() {
                    writeln!(buffer, "{}\r", code as u32)?;
                } else {
                    writeln!(buffer, "{} {}\r", code as u32, msg)?;
                }
            }
            Reply::MultiLine { code, mut lines } => {
                // The last line carries the reply code again.
                let last_line = lines.pop().unwrap_or_default();

                // Continuation lines starting with a digit must be indented.
                for it in lines.iter_mut() {
                    if it.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                        it.insert(0, ' ');
                    }
                }
                if lines.is_empty() {
                    writeln!(buffer, "{} {}\r", code as u32, last_line)?;
                } else {
                    write!(buffer, "{}-{}\r\n{} {}\r\n", code as u32, lines.join("\r\n"), code as u32, last_line)?;
                }
            }
        }
        buf.extend(&buffer);
        Ok(())
    }
}
