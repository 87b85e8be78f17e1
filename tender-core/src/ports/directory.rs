use crate::models::{Participant, SupplierId};

/// Lookup of supplier profiles, owned by the (external) profile management.
pub trait ParticipantDirectory: super::Repository {
    /// The participants for `supplier_ids`; unknown ids are skipped.
    fn participants(
        &self,
        supplier_ids: &[SupplierId],
    ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send;
}
