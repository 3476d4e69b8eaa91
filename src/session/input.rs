use crate::error::{QuizError, QuizResult};

/// Keypad capacity for typed answers.
pub const MAX_ENTRY_DIGITS: usize = 20;

pub const MSG_TOO_LONG: &str = "The answer's obviously smaller than that.";
pub const MSG_EMPTY: &str = "Please enter a number.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKey {
    Digit(u8),
    Delete,
    Clear,
    Confirm,
}

impl EntryKey {
    pub fn from_char(ch: char) -> Option<Self> {
        ch.to_digit(10).map(|d| EntryKey::Digit(d as u8))
    }
}

/// Digits typed so far in free-entry mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerBuffer {
    digits: String,
}

impl AnswerBuffer {
    pub fn push_digit(&mut self, digit: u8) -> QuizResult<()> {
        if digit > 9 {
            return Err(QuizError::InputRejected(format!("{digit} is not a digit")));
        }
        if self.digits.len() >= MAX_ENTRY_DIGITS {
            return Err(QuizError::InputRejected(MSG_TOO_LONG.to_string()));
        }
        let ch = (b'0' + digit) as char;
        if self.digits == "0" {
            self.digits.clear();
        }
        self.digits.push(ch);
        Ok(())
    }

    pub fn delete(&mut self) {
        self.digits.pop();
    }

    /// Keypad "Clear" leaves a single zero, not an empty buffer.
    pub fn clear(&mut self) {
        self.digits = "0".to_string();
    }

    pub fn reset(&mut self) {
        self.digits.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn value(&self) -> QuizResult<i128> {
        if self.digits.is_empty() {
            return Err(QuizError::InputRejected(MSG_EMPTY.to_string()));
        }
        self.digits
            .parse::<i128>()
            .map_err(|_| QuizError::InputRejected(MSG_EMPTY.to_string()))
    }
}
