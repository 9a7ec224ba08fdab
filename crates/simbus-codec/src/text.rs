/// Substitute for characters with no single-byte ASCII representation.
const SUBSTITUTE: u8 = b'?';

/// Encode outbound command text as ASCII bytes, one byte per character.
///
/// Characters outside the ASCII range are substituted rather than
/// rejected — command tokens are expected to be ASCII already, so this
/// only affects unexpected caller input. Lossy, never an error.
pub fn encode_command_ascii(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { SUBSTITUTE })
        .collect()
}

/// True if the text is empty or all-whitespace.
///
/// Blank commands are filtered at enqueue and never reach the wire.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
