//! Interactive confirmation before deleting.

use std::io::{self, BufRead, Write};

use bytesize::ByteSize;

/// The only answer accepted as consent.
pub const CONFIRM_WORD: &str = "yes";

/// The user's answer to the deletion prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The user typed `yes`.
    Confirmed,
    /// Any other answer.
    Declined,
    /// Input ended before an answer was given.
    NoInput,
}

/// Ask the user to approve deleting `count` files totalling `size` bytes.
///
/// Only `yes` (any case, surrounding whitespace ignored) confirms.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails.
pub fn confirm_deletion(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    count: usize,
    size: u64,
) -> io::Result<Confirmation> {
    write!(
        output,
        "Permanently delete {} file(s) ({})? Type '{}' to confirm: ",
        count,
        ByteSize::b(size),
        CONFIRM_WORD
    )?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        log::debug!("No answer on input, treating as refusal");
        return Ok(Confirmation::NoInput);
    }

    let answer = answer.trim();
    let confirmation = if answer.eq_ignore_ascii_case(CONFIRM_WORD) {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    };
    log::debug!("Confirmation answer {:?} -> {:?}", answer, confirmation);
    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(answer: &str) -> (Confirmation, String) {
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let mut output = Vec::new();
        let confirmation = confirm_deletion(&mut input, &mut output, 3, 2048).unwrap();
        (confirmation, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_yes_confirms() {
        assert_eq!(ask("yes\n").0, Confirmation::Confirmed);
        assert_eq!(ask("  YES  \n").0, Confirmation::Confirmed);
        assert_eq!(ask("Yes").0, Confirmation::Confirmed);
    }

    #[test]
    fn test_other_answers_refuse() {
        for answer in ["y\n", "no\n", "\n", "yes please\n"] {
            let (confirmation, _) = ask(answer);
            assert_eq!(confirmation, Confirmation::Declined, "{answer:?}");
        }
    }

    #[test]
    fn test_eof_refuses() {
        let (confirmation, _) = ask("");
        assert_eq!(confirmation, Confirmation::NoInput);
    }

    #[test]
    fn test_prompt_mentions_count_and_size() {
        let (_, prompt) = ask("no\n");
        assert!(prompt.contains("3 file(s)"));
        assert!(prompt.contains("'yes'"));
    }
}
