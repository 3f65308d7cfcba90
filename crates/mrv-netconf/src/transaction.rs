//! Candidate-datastore transaction helper.
//!
//! Applies an ordered list of config fragments as one logical
//! transaction: for each fragment, leftover candidate state is
//! discarded, the fragment is staged with validation, and the
//! candidate is committed. The first failure stops the sequence;
//! fragments already committed stay committed, and repairing the
//! remainder is the caller's concern.

use async_trait::async_trait;

use crate::error::NetconfResult;

/// The candidate-datastore operations a transaction needs.
///
/// [`crate::Session`] is the production implementation; tests provide
/// fakes to observe or reject the RPC sequence.
#[async_trait]
pub trait ConfigDatastore {
    /// Drops any uncommitted candidate state.
    async fn discard_changes(&mut self) -> NetconfResult<()>;

    /// Stages a `<config>` document against the candidate datastore.
    async fn edit_config(&mut self, config: &str) -> NetconfResult<()>;

    /// Commits the candidate datastore.
    async fn commit(&mut self) -> NetconfResult<()>;
}

/// Applies fragments in order, one discard/stage/commit cycle each.
pub async fn apply_transaction<D>(datastore: &mut D, fragments: &[&str]) -> NetconfResult<()>
where
    D: ConfigDatastore + Send,
{
    for fragment in fragments {
        datastore.discard_changes().await?;
        datastore.edit_config(fragment).await?;
        datastore.commit().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetconfError;

    /// Records every RPC; optionally rejects commits like a device
    /// refusing a config change.
    #[derive(Default)]
    struct FakeDatastore {
        calls: Vec<String>,
        reject_commits: bool,
    }

    #[async_trait]
    impl ConfigDatastore for FakeDatastore {
        async fn discard_changes(&mut self) -> NetconfResult<()> {
            self.calls.push("discard".to_string());
            Ok(())
        }

        async fn edit_config(&mut self, config: &str) -> NetconfResult<()> {
            self.calls.push(format!("edit {}", config));
            Ok(())
        }

        async fn commit(&mut self) -> NetconfResult<()> {
            self.calls.push("commit".to_string());
            if self.reject_commits {
                Err(NetconfError::rpc("access-denied"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_discard_stage_commit_per_fragment() {
        let mut fake = FakeDatastore::default();
        apply_transaction(&mut fake, &["<config>a</config>", "<config>b</config>"])
            .await
            .unwrap();

        assert_eq!(
            fake.calls,
            vec![
                "discard",
                "edit <config>a</config>",
                "commit",
                "discard",
                "edit <config>b</config>",
                "commit",
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_commit_stops_transaction() {
        let mut fake = FakeDatastore {
            reject_commits: true,
            ..Default::default()
        };
        let result =
            apply_transaction(&mut fake, &["<config>a</config>", "<config>b</config>"]).await;

        assert!(matches!(result, Err(NetconfError::Rpc { .. })));
        // The second fragment was never staged.
        assert_eq!(fake.calls, vec!["discard", "edit <config>a</config>", "commit"]);
    }

    #[tokio::test]
    async fn test_empty_transaction_is_ok() {
        let mut fake = FakeDatastore::default();
        apply_transaction(&mut fake, &[]).await.unwrap();
        assert!(fake.calls.is_empty());
    }
}
