use crate::EngineState;

/// Availability probe for the caller's health endpoint. Decisions never
/// depend on this; it only reports whether the audit trail is durable.
pub async fn storage_healthy(state: &EngineState) -> bool {
    state.gateway.check_store().await
}
