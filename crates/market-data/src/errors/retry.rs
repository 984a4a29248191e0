/// Classification for retry policy.
///
/// Used by the [`Retrier`](crate::retry::Retrier) to pick the backoff shape
/// for a failed gateway call.
///
/// | Class | Delay before next attempt |
/// |-------|---------------------------|
/// | `InternalFault` | `base * 2^attempt` plus a random jitter |
/// | `Transient` | `base * 2^attempt` |
///
/// Every class is retried until the attempt budget is spent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The remote service reported an internal fault.
    ///
    /// These tend to arrive in bursts when the gateway is overloaded, so the
    /// delay is widened by a random jitter to keep callers from retrying in
    /// lockstep.
    InternalFault,

    /// Any other failure, including transport errors and responses that did
    /// not have the expected shape.
    Transient,
}
