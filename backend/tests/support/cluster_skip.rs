//! `SKIP_TEST_CLUSTER` policy for suites that need embedded PostgreSQL.

/// True when `SKIP_TEST_CLUSTER` is `1`, `true` or `yes` (any case).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Print a skip marker and return `None` when skipping is allowed; panic
/// otherwise so broken CI clusters are not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Run a cluster setup step, turning a panic into an error string.
///
/// `pg-embed-setup-unpriv` panics rather than erroring when its `pg_worker`
/// helper binary is missing, which would otherwise bypass the skip policy.
pub fn catch_setup_panic<T>(
    setup: impl FnOnce() -> Result<T, String>,
) -> Result<T, String> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(setup))
        .unwrap_or_else(|payload| Err(format!("setup panicked: {}", panic_reason(&*payload))))
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_panics_become_errors() {
        let result = catch_setup_panic::<()>(|| panic!("pg_worker binary was not found"));
        let error = result.expect_err("panic should be caught");
        assert!(error.contains("pg_worker binary was not found"), "{error}");
    }

    #[test]
    fn formatted_panics_keep_their_message() {
        let result = catch_setup_panic::<()>(|| panic!("attempt {} failed", 3));
        assert_eq!(
            result.expect_err("panic should be caught"),
            "setup panicked: attempt 3 failed"
        );
    }

    #[test]
    fn successful_setup_passes_through() {
        assert_eq!(catch_setup_panic(|| Ok::<_, String>(7)), Ok(7));
    }
}
