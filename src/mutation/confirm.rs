//! Interactive confirmation and the pause before destructive writes.

use std::time::Duration;

use tokio::io::{
    AsyncBufRead,
    AsyncBufReadExt,
    BufReader,
};

use super::MutationError;

/// What must happen before a destructive write proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Pause between the backup and the write; Ctrl-C aborts.
    pub delay: Duration,
    /// Skips the interactive `yes` prompt. The delay still applies.
    pub assume_yes: bool,
}

impl Confirmation {
    #[must_use]
    pub const fn new(delay_secs: u64, assume_yes: bool) -> Self {
        Self { delay: Duration::from_secs(delay_secs), assume_yes }
    }

    /// Asks for `yes` on stdin unless `assume_yes` is set.
    pub async fn ask(&self, summary: &str) -> Result<(), MutationError> {
        tracing::warn!("{summary}");
        if self.assume_yes {
            return Ok(());
        }
        self.ask_with(BufReader::new(tokio::io::stdin())).await
    }

    async fn ask_with<R: AsyncBufRead + Unpin>(&self, mut reader: R) -> Result<(), MutationError> {
        tracing::warn!("Type 'yes' to continue, anything else aborts");
        let mut answer = String::new();
        reader.read_line(&mut answer).await.map_err(MutationError::Prompt)?;
        if answer.trim() == "yes" { Ok(()) } else { Err(MutationError::Declined) }
    }

    /// Waits out the confirmation delay.
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        tracing::warn!(
            "Writing in {} second(s); press Ctrl-C to abort",
            self.delay.as_secs()
        );
        tokio::time::sleep(self.delay).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::yes("yes\n", true)]
    #[case::padded("  yes  \n", true)]
    #[case::capitalized("Yes\n", false)]
    #[case::no("no\n", false)]
    #[case::eof("", false)]
    fn prompt_answers(#[case] input: &str, #[case] accepted: bool) {
        let confirmation = Confirmation::new(0, false);

        let result = tokio_test::block_on(confirmation.ask_with(input.as_bytes()));

        assert_eq!(result.is_ok(), accepted);
    }

    #[rstest]
    fn assume_yes_skips_prompt() {
        let confirmation = Confirmation::new(0, true);

        assert!(tokio_test::block_on(confirmation.ask("remove 3 keys")).is_ok());
    }

    #[rstest]
    fn waits_for_the_delay() {
        let confirmation = Confirmation { delay: Duration::from_millis(20), assume_yes: true };
        let started = std::time::Instant::now();

        tokio_test::block_on(confirmation.wait());

        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
