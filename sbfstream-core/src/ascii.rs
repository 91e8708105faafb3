//! Classifiers for the ASCII side-channel
//!
//! Each classifier receives the buffer starting at the frame's `$` (or, for
//! prompts, the window ending at `>`) and looks for its terminator within a
//! bounded window. A frame that cannot complete within its limit is
//! rejected so that a lost terminator never stalls the stream.

use crate::constants::{
    COMMAND_REPLY_PREFIX, CRLF, DISPLAY_PREFIX, DISPLAY_TERMINATOR, EVENT_PREFIX,
    INFO_BLOCK_PREFIX, INVALID_FRAME_SKIP, PROMPT_LENGTH,
};
use crate::error::SbfError;
use crate::prompt::Prompt;
use crate::types::{FrameKind, ParseOutcome};
use memchr::memmem;

/// Classify a prompt candidate: `window` holds at most [`PROMPT_LENGTH`]
/// bytes and ends with `>`
///
/// The window is always consumed, matched or not.
pub fn classify_prompt(window: &[u8]) -> ParseOutcome {
    ParseOutcome::Consumed {
        size: window.len(),
        body: 0..window.len(),
        kind: FrameKind::CommandPrompt {
            prompt: Prompt::parse(window),
        },
    }
}

/// Classify a `$R` command reply, terminated by CRLF followed by a prompt
pub fn classify_command_reply(data: &[u8], max_size: usize) -> ParseOutcome {
    let window = bounded(data, max_size);
    let start = COMMAND_REPLY_PREFIX.len();

    match find_prompt_terminator(window, start) {
        Some(end) => ParseOutcome::Consumed {
            size: swallow_crlf(data, end.end),
            body: start..end.crlf,
            kind: FrameKind::AsciiCommandReply { prompt: end.prompt },
        },
        None => wait_or_reject(data.len(), max_size, "asciiCommandReply"),
    }
}

/// Classify a `$TD` display dump, terminated by `\r\n####>\r\n`
pub fn classify_display(data: &[u8], max_size: usize) -> ParseOutcome {
    let window = bounded(data, max_size);
    let prefix = DISPLAY_PREFIX.len();

    match memmem::find(window, DISPLAY_TERMINATOR) {
        Some(pos) => {
            // the line break right after $TD is not part of the text
            let start = if pos >= prefix + CRLF.len() && data[prefix..].starts_with(CRLF) {
                prefix + CRLF.len()
            } else {
                prefix.min(pos)
            };

            ParseOutcome::Consumed {
                size: pos + DISPLAY_TERMINATOR.len(),
                body: start..pos,
                kind: FrameKind::AsciiDisplay,
            }
        }
        None => wait_or_reject(data.len(), max_size, "asciiDisplay"),
    }
}

/// Classify a `$TE` event line, terminated by CRLF
pub fn classify_event(data: &[u8], max_size: usize) -> ParseOutcome {
    let window = bounded(data, max_size);
    let start = EVENT_PREFIX.len();

    match window.get(start..).and_then(|w| memmem::find(w, CRLF)) {
        Some(rel) => ParseOutcome::Consumed {
            size: start + rel + CRLF.len(),
            body: start..start + rel,
            kind: FrameKind::Event,
        },
        None => wait_or_reject(data.len(), max_size, "event"),
    }
}

/// Classify a `$-- BLOCK i / n` formatted information block
///
/// The header line must end within `header_limit` bytes; the block itself
/// ends like a command reply, with CRLF and a prompt.
pub fn classify_info_block(data: &[u8], max_size: usize, header_limit: usize) -> ParseOutcome {
    let head = bounded(data, header_limit);

    let eol = match memmem::find(head, CRLF) {
        Some(eol) => eol,
        None if data.len() < header_limit => return ParseOutcome::NeedMoreData,
        None => return reject(SbfError::MalformedInfoBlockHeader),
    };

    let (index, count) = match parse_info_header(&data[..eol]) {
        Some(header) => header,
        None => return reject(SbfError::MalformedInfoBlockHeader),
    };

    let window = bounded(data, max_size);
    match find_prompt_terminator(window, eol) {
        Some(end) => ParseOutcome::Consumed {
            size: swallow_crlf(data, end.end),
            body: (eol + CRLF.len()).min(end.crlf)..end.crlf,
            kind: FrameKind::FormattedInfoBlock {
                index,
                count,
                prompt: end.prompt,
            },
        },
        None => wait_or_reject(data.len(), max_size, "formattedInfoBlock"),
    }
}

/// Location of a CRLF + prompt terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PromptTerminator {
    /// Offset of the CRLF preceding the prompt
    crlf: usize,
    /// Offset just past the prompt
    end: usize,
    prompt: Prompt,
}

/// Find the first CRLF at or after `from` that is followed by a complete prompt
fn find_prompt_terminator(window: &[u8], from: usize) -> Option<PromptTerminator> {
    let mut search = from;

    while search < window.len() {
        let crlf = search + memmem::find(&window[search..], CRLF)?;
        let start = crlf + CRLF.len();
        let end = start + PROMPT_LENGTH;

        if end <= window.len() {
            if let Some(prompt) = Prompt::parse_terminator(&window[start..end]) {
                return Some(PromptTerminator { crlf, end, prompt });
            }
        }

        search = start;
    }

    None
}

/// Parse `$-- BLOCK <index> / <count>` at the very start of `line`
fn parse_info_header(line: &[u8]) -> Option<(u32, u32)> {
    let rest = line.strip_prefix(INFO_BLOCK_PREFIX)?;
    let rest = rest.strip_prefix(b" BLOCK ")?;
    let (index, rest) = leading_number(rest)?;
    let rest = rest.strip_prefix(b" / ")?;
    let (count, _) = leading_number(rest)?;
    Some((index, count))
}

fn leading_number(s: &[u8]) -> Option<(u32, &[u8])> {
    let digits = s.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let value = core::str::from_utf8(&s[..digits]).ok()?.parse().ok()?;
    Some((value, &s[digits..]))
}

/// Swallow a CRLF directly after `end` when it is already buffered
fn swallow_crlf(data: &[u8], end: usize) -> usize {
    if data[end..].starts_with(CRLF) {
        end + CRLF.len()
    } else {
        end
    }
}

fn bounded(data: &[u8], limit: usize) -> &[u8] {
    &data[..data.len().min(limit)]
}

fn wait_or_reject(available: usize, max_size: usize, kind: &'static str) -> ParseOutcome {
    if available < max_size {
        ParseOutcome::NeedMoreData
    } else {
        reject(SbfError::FrameTooLarge {
            kind,
            max: max_size,
        })
    }
}

fn reject(reason: SbfError) -> ParseOutcome {
    ParseOutcome::Invalid {
        reason,
        skip: INVALID_FRAME_SKIP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumed(outcome: ParseOutcome) -> (usize, core::ops::Range<usize>, FrameKind) {
        match outcome {
            ParseOutcome::Consumed { size, body, kind } => (size, body, kind),
            other => panic!("expected Consumed, got {:?}", other),
        }
    }

    #[test]
    fn test_prompt_window() {
        let (size, _, kind) = consumed(classify_prompt(b"COM1>"));
        assert_eq!(size, 5);
        assert_eq!(
            kind,
            FrameKind::CommandPrompt {
                prompt: Some(Prompt::Com(1))
            }
        );

        // unmatched windows are still removed
        let (size, _, kind) = consumed(classify_prompt(b"ab>"));
        assert_eq!(size, 3);
        assert_eq!(kind, FrameKind::CommandPrompt { prompt: None });
    }

    #[test]
    fn test_command_reply() {
        let data = b"$R: setDataInOut, COM1, , SBF\r\n  DataInOut, COM1, CMD, SBF\r\nCOM1>\r\nrest";
        let (size, body, kind) = consumed(classify_command_reply(data, 4096));

        assert_eq!(&data[body], b": setDataInOut, COM1, , SBF\r\n  DataInOut, COM1, CMD, SBF");
        assert_eq!(&data[size..], b"rest");
        assert_eq!(
            kind,
            FrameKind::AsciiCommandReply {
                prompt: Prompt::Com(1)
            }
        );
    }

    #[test]
    fn test_command_reply_special_terminators() {
        let data = b"$R: exeResetReceiver\r\nSTOP>";
        let (size, _, kind) = consumed(classify_command_reply(data, 4096));
        assert_eq!(size, data.len());
        assert_eq!(kind, FrameKind::AsciiCommandReply { prompt: Prompt::Stop });
    }

    #[test]
    fn test_command_reply_waits_for_partial_prompt() {
        assert_eq!(
            classify_command_reply(b"$R: getReceiverCapabilities\r\nCOM", 4096),
            ParseOutcome::NeedMoreData
        );
        // a line that merely looks prompt-like is skipped over
        assert_eq!(
            classify_command_reply(b"$R: x\r\nCOMX>\r\n", 4096),
            ParseOutcome::NeedMoreData
        );
    }

    #[test]
    fn test_command_reply_too_large() {
        let mut data = b"$R: ".to_vec();
        data.extend(std::iter::repeat(b'x').take(100));
        match classify_command_reply(&data, 64) {
            ParseOutcome::Invalid { reason, skip } => {
                assert_eq!(skip, 2);
                assert!(matches!(reason, SbfError::FrameTooLarge { max: 64, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let data = b"$TD\r\nCH SVID  C/N0\r\n 1  G01  45\r\n####>\r\n";
        let (size, body, kind) = consumed(classify_display(data, 16384));
        assert_eq!(size, data.len());
        assert_eq!(&data[body], b"CH SVID  C/N0\r\n 1  G01  45");
        assert_eq!(kind, FrameKind::AsciiDisplay);
    }

    #[test]
    fn test_empty_display() {
        let data = b"$TD\r\n####>\r\n";
        let (size, body, _) = consumed(classify_display(data, 16384));
        assert_eq!(size, data.len());
        assert!(body.is_empty());
    }

    #[test]
    fn test_event() {
        let data = b"$TE ResetReceiver hot\r\n$@";
        let (size, body, kind) = consumed(classify_event(data, 256));
        assert_eq!(size, data.len() - 2);
        assert_eq!(&data[body], b" ResetReceiver hot");
        assert_eq!(kind, FrameKind::Event);
    }

    #[test]
    fn test_event_bounded_lookahead() {
        let mut data = b"$TE".to_vec();
        data.extend(std::iter::repeat(b'a').take(200));
        assert_eq!(classify_event(&data, 256), ParseOutcome::NeedMoreData);

        data.extend(std::iter::repeat(b'a').take(100));
        assert!(matches!(
            classify_event(&data, 256),
            ParseOutcome::Invalid { skip: 2, .. }
        ));
    }

    #[test]
    fn test_event_terminator_past_limit() {
        // CRLF exists, but only beyond the limit
        let mut data = b"$TE".to_vec();
        data.extend(std::iter::repeat(b'a').take(20));
        data.extend_from_slice(b"\r\n");
        assert!(matches!(
            classify_event(&data, 10),
            ParseOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn test_info_block() {
        let data = b"$-- BLOCK 1 / 2\r\nIdentification: PolaRx5\r\nSerial: 3021\r\n---->";
        let (size, body, kind) = consumed(classify_info_block(data, 4096, 30));
        assert_eq!(size, data.len());
        assert_eq!(&data[body], b"Identification: PolaRx5\r\nSerial: 3021");
        assert_eq!(
            kind,
            FrameKind::FormattedInfoBlock {
                index: 1,
                count: 2,
                prompt: Prompt::Continuation
            }
        );
    }

    #[test]
    fn test_info_block_bad_header() {
        assert!(matches!(
            classify_info_block(b"$-- BLOCKS\r\nCOM1>", 4096, 30),
            ParseOutcome::Invalid {
                reason: SbfError::MalformedInfoBlockHeader,
                skip: 2
            }
        ));
        assert!(matches!(
            classify_info_block(b"$-- xx BLOCK 1 / 2\r\nCOM1>", 4096, 30),
            ParseOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn test_info_block_header_pending() {
        assert_eq!(
            classify_info_block(b"$-- BLOCK 1 /", 4096, 30),
            ParseOutcome::NeedMoreData
        );
        let long = [b'$', b'-', b'-'].iter().chain([b' '; 40].iter()).copied().collect::<Vec<_>>();
        assert!(matches!(
            classify_info_block(&long, 4096, 30),
            ParseOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn test_parse_info_header() {
        assert_eq!(parse_info_header(b"$-- BLOCK 12 / 40"), Some((12, 40)));
        assert_eq!(parse_info_header(b"$-- BLOCK / 40"), None);
        assert_eq!(parse_info_header(b"$--BLOCK 1 / 2"), None);
    }
}
