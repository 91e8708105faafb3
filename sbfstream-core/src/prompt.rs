//! Receiver prompt recognition
//!
//! The receiver ends every command reply with the prompt of the port the
//! command arrived on (`COM1>`, `USB2>`, `IP10>`, ...). A bare prompt shows
//! up on its own when an empty line is sent.

use crate::constants::PROMPT_LENGTH;
use core::fmt;

/// A recognized 5-byte prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    /// `COM<d>>`
    Com(u8),
    /// `USB<d>>`
    Usb(u8),
    /// `OTG<d>>`
    Otg(u8),
    /// `IP<dd>>`
    Ip(u8),
    /// `BT<dd>>`
    Bt(u8),
    /// `STOP>`, sent when the receiver halts
    Stop,
    /// `---->`, reply continues in another block
    Continuation,
    /// `####>`, end of a display dump
    DisplayEnd,
}

impl Prompt {
    /// Match a port prompt against exactly [`PROMPT_LENGTH`] bytes
    pub fn parse(window: &[u8]) -> Option<Prompt> {
        if window.len() != PROMPT_LENGTH || window[PROMPT_LENGTH - 1] != b'>' {
            return None;
        }

        match &window[..PROMPT_LENGTH - 1] {
            [b'C', b'O', b'M', d] => digit(*d).map(Prompt::Com),
            [b'U', b'S', b'B', d] => digit(*d).map(Prompt::Usb),
            [b'O', b'T', b'G', d] => digit(*d).map(Prompt::Otg),
            [b'I', b'P', hi, lo] => two_digits(*hi, *lo).map(Prompt::Ip),
            [b'B', b'T', hi, lo] => two_digits(*hi, *lo).map(Prompt::Bt),
            _ => None,
        }
    }

    /// Match anything that may end a command reply or information block
    pub fn parse_terminator(window: &[u8]) -> Option<Prompt> {
        match window {
            b"STOP>" => Some(Prompt::Stop),
            b"---->" => Some(Prompt::Continuation),
            b"####>" => Some(Prompt::DisplayEnd),
            _ => Prompt::parse(window),
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::Com(n) => write!(f, "COM{}>", n),
            Prompt::Usb(n) => write!(f, "USB{}>", n),
            Prompt::Otg(n) => write!(f, "OTG{}>", n),
            Prompt::Ip(n) => write!(f, "IP{:02}>", n),
            Prompt::Bt(n) => write!(f, "BT{:02}>", n),
            Prompt::Stop => f.write_str("STOP>"),
            Prompt::Continuation => f.write_str("---->"),
            Prompt::DisplayEnd => f.write_str("####>"),
        }
    }
}

fn digit(b: u8) -> Option<u8> {
    b.is_ascii_digit().then(|| b - b'0')
}

fn two_digits(hi: u8, lo: u8) -> Option<u8> {
    Some(digit(hi)? * 10 + digit(lo)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_prompts() {
        assert_eq!(Prompt::parse(b"COM1>"), Some(Prompt::Com(1)));
        assert_eq!(Prompt::parse(b"USB2>"), Some(Prompt::Usb(2)));
        assert_eq!(Prompt::parse(b"OTG1>"), Some(Prompt::Otg(1)));
        assert_eq!(Prompt::parse(b"IP10>"), Some(Prompt::Ip(10)));
        assert_eq!(Prompt::parse(b"BT01>"), Some(Prompt::Bt(1)));
    }

    #[test]
    fn test_rejects_near_misses() {
        assert_eq!(Prompt::parse(b"COMX>"), None);
        assert_eq!(Prompt::parse(b"IP1>>"), None);
        assert_eq!(Prompt::parse(b"com1>"), None);
        assert_eq!(Prompt::parse(b"COM1"), None);
        assert_eq!(Prompt::parse(b"xCOM1>"), None);
        // special terminators are not standalone prompts
        assert_eq!(Prompt::parse(b"STOP>"), None);
    }

    #[test]
    fn test_terminators() {
        assert_eq!(Prompt::parse_terminator(b"STOP>"), Some(Prompt::Stop));
        assert_eq!(Prompt::parse_terminator(b"---->"), Some(Prompt::Continuation));
        assert_eq!(Prompt::parse_terminator(b"####>"), Some(Prompt::DisplayEnd));
        assert_eq!(Prompt::parse_terminator(b"COM3>"), Some(Prompt::Com(3)));
    }

    #[test]
    fn test_display_round_trips() {
        for raw in [&b"COM1>"[..], b"IP05>", b"BT12>", b"STOP>"] {
            let prompt = Prompt::parse_terminator(raw).unwrap();
            assert_eq!(prompt.to_string().as_bytes(), raw);
        }
    }
}
