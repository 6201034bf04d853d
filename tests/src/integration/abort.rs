//! # Contract Breach Scenarios
//!
//! An engine that completes with a malformed result, an unknown tag, or the
//! same tag twice must bring the process down rather than hand a caller
//! someone else's data. Each scenario re-runs this test binary filtered to
//! itself with `LEDGER_ABORT_PROBE` set; the child drives the faulty engine
//! and the parent checks how it died.

/// Set in the child process.
pub const PROBE_ENV: &str = "LEDGER_ABORT_PROBE";

#[cfg(all(test, unix))]
mod tests {
    use super::PROBE_ENV;
    use crate::fixtures::{self, Fault, Faulty};
    use ledger_bridge::Client;
    use ledger_types::Operation;
    use std::os::unix::process::ExitStatusExt;
    use std::process::Command;

    const SIGABRT: i32 = 6;

    fn in_child() -> bool {
        std::env::var_os(PROBE_ENV).is_some()
    }

    /// Drive one request through the faulty engine. Never returns normally.
    fn provoke(fault: Fault) {
        let client = Client::with_engine(
            fixtures::engine::<Faulty>(),
            fixtures::config(fault.cluster_id()),
        )
        .unwrap();
        let outcome = client.echo(Operation::LookupAccounts, &[1u128, 2]);
        // Joins the engine threads, so a breach after the reply still lands.
        client.shutdown();
        panic!("bridge survived {fault:?}: {outcome:?}");
    }

    fn assert_aborts(test_name: &str) {
        let exe = std::env::current_exe().unwrap();
        let output = Command::new(exe)
            .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
            .env(PROBE_ENV, "1")
            .output()
            .unwrap();

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(
            output.status.signal(),
            Some(SIGABRT),
            "child exited with {:?}, stderr:\n{stderr}",
            output.status
        );
        assert!(stderr.contains("protocol violation"), "stderr:\n{stderr}");
    }

    #[test]
    fn test_truncated_result_aborts() {
        if in_child() {
            return provoke(Fault::TruncatedResult);
        }
        assert_aborts("integration::abort::tests::test_truncated_result_aborts");
    }

    #[test]
    fn test_unknown_tag_aborts() {
        if in_child() {
            return provoke(Fault::UnknownTag);
        }
        assert_aborts("integration::abort::tests::test_unknown_tag_aborts");
    }

    #[test]
    fn test_double_completion_aborts() {
        if in_child() {
            return provoke(Fault::DoubleCompletion);
        }
        assert_aborts("integration::abort::tests::test_double_completion_aborts");
    }
}
