/// Classification of a per-asset fetch failure.
///
/// Used by the polling scheduler to decide what happens to the rest of the
/// cycle after one asset fails.
///
/// # Behavior Summary
///
/// | Class | Keep iterating assets? | Lengthen next cycle delay? |
/// |-------|------------------------|----------------------------|
/// | `Continue` | Yes | No |
/// | `BackOff` | No (end the cycle) | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// Log the failure and move on to the next asset.
    ///
    /// Used for HTTP errors other than 429, malformed payloads and transport
    /// failures. One asset's failure never aborts the cycle.
    Continue,

    /// The provider is rate limiting us.
    ///
    /// Stop calling it for the rest of this cycle and wait the back-off
    /// interval before the next one.
    BackOff,
}
