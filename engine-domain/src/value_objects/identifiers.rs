// Identifier value objects

/// Wallet addresses arrive in mixed case; ledger keys are the lowercased form.
pub fn normalize_user_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Device fingerprints and network addresses are opaque tokens; only
/// surrounding whitespace is stripped.
pub fn normalize_token(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_fold_case() {
        assert_eq!(normalize_user_id("  0xAbC123 "), "0xabc123");
    }

    #[test]
    fn tokens_keep_case() {
        assert_eq!(normalize_token(" Fp-X9 "), "Fp-X9");
    }
}
