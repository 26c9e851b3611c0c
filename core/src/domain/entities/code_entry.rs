//! Secret entry buffers: fixed digit slots for one-time codes and a single
//! text field for passwords and recovery codes.

use serde::Serialize;

use super::channel::Channel;

/// Fixed-length sequence of single-digit slots with an active slot index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeEntry {
    slots: Vec<Option<char>>,
    active_slot: usize,
}

impl CodeEntry {
    pub fn new(code_length: usize) -> Self {
        Self {
            slots: vec![None; code_length],
            active_slot: 0,
        }
    }

    pub fn code_length(&self) -> usize {
        self.slots.len()
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Put a digit into `slot` and move focus to the next slot.
    ///
    /// Non-digits and out-of-range slots are ignored; returns whether the
    /// digit was accepted.
    pub fn input_digit(&mut self, slot: usize, ch: char) -> bool {
        if slot >= self.slots.len() || !ch.is_ascii_digit() {
            return false;
        }
        self.slots[slot] = Some(ch);
        if slot + 1 < self.slots.len() {
            self.active_slot = slot + 1;
        } else {
            self.active_slot = slot;
        }
        true
    }

    /// Put a digit into the active slot
    pub fn type_digit(&mut self, ch: char) -> bool {
        self.input_digit(self.active_slot, ch)
    }

    /// Clear a filled slot, or move focus back when the slot is already empty
    pub fn backspace(&mut self, slot: usize) {
        if slot >= self.slots.len() {
            return;
        }
        if self.slots[slot].is_some() {
            self.slots[slot] = None;
            self.active_slot = slot;
        } else if slot > 0 {
            self.active_slot = slot - 1;
        }
    }

    /// Fill slots from the start with the digits found in `text`.
    ///
    /// Non-digit characters are stripped first and digits beyond the code
    /// length are discarded. Returns the number of slots written.
    pub fn paste(&mut self, text: &str) -> usize {
        let digits: Vec<char> = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(self.slots.len())
            .collect();
        if digits.is_empty() {
            return 0;
        }
        for (slot, digit) in digits.iter().enumerate() {
            self.slots[slot] = Some(*digit);
        }
        self.active_slot = digits.len().min(self.slots.len() - 1);
        digits.len()
    }

    /// Concatenation of the filled slots
    pub fn assembled(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.active_slot = 0;
    }
}

/// Input buffer for the active channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretEntry {
    Digits(CodeEntry),
    Text(String),
}

impl SecretEntry {
    /// Empty buffer matching the channel's input style
    pub fn for_channel(channel: Channel, code_length: usize) -> Self {
        if channel.uses_digit_code() {
            SecretEntry::Digits(CodeEntry::new(code_length))
        } else {
            SecretEntry::Text(String::new())
        }
    }

    /// Secret to hand to the verifier for `channel`
    pub fn assembled(&self, channel: Channel) -> String {
        match self {
            SecretEntry::Digits(entry) => entry.assembled(),
            SecretEntry::Text(value) if channel == Channel::RecoveryCode => {
                normalize_recovery_code(value)
            }
            SecretEntry::Text(value) => value.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SecretEntry::Digits(entry) => entry.filled() == 0,
            SecretEntry::Text(value) => value.is_empty(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            SecretEntry::Digits(entry) => entry.clear(),
            SecretEntry::Text(value) => value.clear(),
        }
    }
}

/// Canonical recovery code: upper-case, no whitespace, only `[A-Z0-9-]`
pub fn normalize_recovery_code(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}
