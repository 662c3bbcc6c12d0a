use std::io::{self, IsTerminal, Write};

use zeroize::Zeroizing;

use crate::core::errors::{Result, TresorError};
use crate::core::traits::passphrase::PassphrasePrompt;

/// Reads secrets from the controlling terminal with echo disabled.
///
/// Prompts go to stderr so stdout stays reserved for payload data.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }

    /// Read one secret after printing `label` on stderr.
    pub fn prompt_secret(label: &str) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(TresorError::PassphraseUnavailable {
                reason: "stdin is not a terminal".into(),
            });
        }

        let mut stderr = io::stderr();
        write!(stderr, "{label}")?;
        stderr.flush()?;

        let entered = rpassword::read_password();
        writeln!(stderr)?;

        let entered = entered.map_err(|e| TresorError::PassphraseUnavailable {
            reason: format!("failed to read from terminal: {e}"),
        })?;
        Ok(Zeroizing::new(entered.into_bytes()))
    }

    /// Read a secret twice and repeat until both entries match.
    ///
    /// `on_mismatch` runs before every retry.
    pub fn read_confirmed<M>(label: &str, on_mismatch: M) -> Result<Zeroizing<Vec<u8>>>
    where
        M: FnMut(),
    {
        read_confirmed_with(Self::prompt_secret, label, on_mismatch)
    }
}

impl PassphrasePrompt for TerminalPrompt {
    fn passphrase(&self, key_id: &str) -> Result<Zeroizing<Vec<u8>>> {
        Self::prompt_secret(&format!("Enter password for key {key_id}: "))
    }
}

/// Double-entry loop behind [`TerminalPrompt::read_confirmed`].
///
/// There is no attempt limit; read errors end the loop.
pub fn read_confirmed_with<F, M>(
    mut read: F,
    label: &str,
    mut on_mismatch: M,
) -> Result<Zeroizing<Vec<u8>>>
where
    F: FnMut(&str) -> Result<Zeroizing<Vec<u8>>>,
    M: FnMut(),
{
    loop {
        let first = read(label)?;
        let second = read("Confirm: ")?;
        if first == second {
            return Ok(first);
        }
        on_mismatch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn scripted(entries: &[&str]) -> impl FnMut(&str) -> Result<Zeroizing<Vec<u8>>> {
        let mut queue: VecDeque<Vec<u8>> = entries.iter().map(|e| e.as_bytes().to_vec()).collect();
        move |_label| {
            queue
                .pop_front()
                .map(Zeroizing::new)
                .ok_or_else(|| TresorError::PassphraseUnavailable {
                    reason: "script exhausted".into(),
                })
        }
    }

    #[test]
    fn matching_entries_accepted_first_time() {
        let mut mismatches = 0;
        let secret =
            read_confirmed_with(scripted(&["s3cret", "s3cret"]), "Secret: ", || mismatches += 1)
                .unwrap();
        assert_eq!(secret.as_slice(), b"s3cret");
        assert_eq!(mismatches, 0);
    }

    #[test]
    fn mismatch_retries_until_match() {
        let mut mismatches = 0;
        let secret = read_confirmed_with(
            scripted(&["one", "two", "three", "four", "five", "five"]),
            "Secret: ",
            || mismatches += 1,
        )
        .unwrap();
        assert_eq!(secret.as_slice(), b"five");
        assert_eq!(mismatches, 2);
    }

    #[test]
    fn read_error_stops_loop() {
        let result = read_confirmed_with(scripted(&["one", "two", "three"]), "Secret: ", || {});
        assert!(matches!(
            result,
            Err(TresorError::PassphraseUnavailable { .. })
        ));
    }

    #[test]
    fn labels_are_passed_through() {
        let mut seen = Vec::new();
        let read = |label: &str| {
            seen.push(label.to_string());
            Ok(Zeroizing::new(b"x".to_vec()))
        };
        read_confirmed_with(read, "Payload: ", || {}).unwrap();
        assert_eq!(seen, vec!["Payload: ".to_string(), "Confirm: ".to_string()]);
    }
}
