use std::fmt;

// The password a client offered via PASS. The secret never leaves this type:
// there is no byte accessor, Debug prints a fixed mask, and the comparison
// against the configured credential lives here. The comparison folds over
// every byte instead of bailing at the first mismatch, so reply timing says
// nothing about how much of a guess was right.
#[derive(PartialEq, Eq, Clone)]
pub(crate) struct Password {
    bytes: Vec<u8>,
}

impl Password {
    pub fn new(bytes: Vec<u8>) -> Self {
        Password { bytes }
    }

    // True when the offered password matches the configured one.
    pub fn matches(&self, expected: &str) -> bool {
        let expected = expected.as_bytes();
        let diff = self
            .bytes
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (offered, wanted)| acc | (offered ^ wanted));
        self.bytes.len() == expected.len() && diff == 0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn offered(s: &str) -> Password {
        Password::new(s.as_bytes().to_vec())
    }

    #[test]
    fn matches_the_configured_credential() {
        assert!(offered("supersecret").matches("supersecret"));
    }

    #[test]
    fn rejects_wrong_guesses_and_prefixes() {
        assert!(!offered("supersecreT").matches("supersecret"));
        assert!(!offered("super").matches("supersecret"));
        assert!(!offered("supersecret1").matches("supersecret"));
        assert!(!offered("").matches("supersecret"));
        assert!(offered("").matches(""));
    }

    #[test]
    fn debug_never_shows_the_secret() {
        assert_eq!(format!("{:?}", offered("supersecret")), "Password(****)");
    }
}
