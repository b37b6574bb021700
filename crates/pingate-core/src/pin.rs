//! PIN value types
//!
//! Digits live in zeroizing memory and are wiped when dropped. Neither type
//! prints its digits through `Debug`.

use std::fmt;

use zeroize::Zeroizing;

/// Number of digits in a PIN
pub const PIN_LENGTH: usize = 6;

/// A complete candidate or validated PIN
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(Zeroizing<String>);

impl Pin {
    /// Build a PIN from a string, accepting only ASCII digits
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(Self(Zeroizing::new(s.to_string())))
    }

    /// The digits as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the PIN has no digits
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pin(<{} digits>)", self.0.len())
    }
}

/// Digits entered so far, bounded to [`PIN_LENGTH`]
#[derive(Default)]
pub struct PinBuffer {
    digits: Zeroizing<String>,
}

impl PinBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a digit. Returns false if the buffer is full or `c` is not a digit.
    pub fn push(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() || self.is_full() {
            return false;
        }
        self.digits.push(c);
        true
    }

    /// Remove the last digit. Returns false if the buffer was empty.
    pub fn pop(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    /// Drop all digits
    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.digits.len() >= PIN_LENGTH
    }

    /// Copy the buffer out as a candidate PIN (None when empty)
    pub fn to_pin(&self) -> Option<Pin> {
        Pin::parse(&self.digits)
    }
}

impl fmt::Debug for PinBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinBuffer")
            .field("len", &self.digits.len())
            .finish()
    }
}
