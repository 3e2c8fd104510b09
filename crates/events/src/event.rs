use chrono::{DateTime, Utc};

/// Something that happened to a ledger entity, as told to subscribers.
///
/// Implementors are plain values: cloning one and sending it to several
/// subscribers must be safe, and two equal values describe the same fact.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, `<crate>.<subject>.<what happened>` (e.g. "approvals.approval.decided").
    fn event_type(&self) -> &'static str;

    /// Payload schema version, bumped when fields change meaning.
    fn version(&self) -> u32;

    /// Business time of the fact, not the time it was delivered.
    fn occurred_at(&self) -> DateTime<Utc>;
}
