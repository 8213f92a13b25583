//! Concurrent aggregation tests
//!
//! The two aggregation steps only read, so an orchestrator is allowed to run
//! them at the same time. These tests verify that the store's per-operation
//! read-only connections actually permit that, and that no operation leaves
//! a handle behind that would block the next step.
//!
//! Run with: cargo test --test concurrent_aggregation_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use ledgerflow_core::config::PipelineConfig;
use ledgerflow_core::PipelineContext;

/// Iterations per aggregation thread
const ITERATIONS_PER_THREAD: usize = 10;

/// Workspace with ingested and transformed data, ready for aggregation
fn prepare_workspace(temp_dir: &TempDir) -> Arc<PipelineContext> {
    let data_dir = temp_dir.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(
        data_dir.join("accounts.csv"),
        "account_number,account_name\n1000,Cash\n2000,Revenue\n",
    )
    .unwrap();

    let mut journal = String::from("transaction_id,transaction_date,account_number,amount\n");
    for i in 0..50 {
        journal.push_str(&format!("TXN-{:03},2024-01-15,1000,{}.00\n", i, i + 1));
        journal.push_str(&format!("TXN-{:03},2024-01-15,2000,-{}.00\n", i, i + 1));
    }
    std::fs::write(data_dir.join("journal_entries.csv"), journal).unwrap();

    let ctx = PipelineContext::with_config(PipelineConfig::defaults(temp_dir.path())).unwrap();
    ctx.ingest_service.ingest().unwrap();
    ctx.transform_service.transform().unwrap();
    Arc::new(ctx)
}

/// Both aggregations run simultaneously without tripping over each other
#[test]
fn test_aggregations_run_concurrently() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = prepare_workspace(&temp_dir);

    let barrier = Arc::new(Barrier::new(2));
    let error_count = Arc::new(AtomicUsize::new(0));

    let audit_handle = {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        let error_count = Arc::clone(&error_count);

        thread::spawn(move || {
            barrier.wait();
            for i in 0..ITERATIONS_PER_THREAD {
                match ctx.audit_service.imbalanced_transactions() {
                    Ok(result) => assert_eq!(result.row_count, 0),
                    Err(e) => {
                        eprintln!("Audit thread: error at iteration {}: {}", i, e);
                        error_count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        })
    };

    let summary_handle = {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        let error_count = Arc::clone(&error_count);

        thread::spawn(move || {
            barrier.wait();
            for i in 0..ITERATIONS_PER_THREAD {
                match ctx.summary_service.account_balances() {
                    Ok(result) => assert_eq!(result.row_count, 2),
                    Err(e) => {
                        eprintln!("Summary thread: error at iteration {}: {}", i, e);
                        error_count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        })
    };

    audit_handle.join().unwrap();
    summary_handle.join().unwrap();

    let errors = error_count.load(Ordering::SeqCst);
    println!("\n=== Concurrent Aggregation Results ===");
    println!("Errors: {}", errors);
    assert_eq!(errors, 0, "read-only aggregations must not conflict");
}

/// Several readers at once, mixing aggregations with status and ad-hoc SQL
#[test]
fn test_many_concurrent_readers() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = prepare_workspace(&temp_dir);

    let reader_count = 4;
    let barrier = Arc::new(Barrier::new(reader_count));
    let error_count = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..reader_count)
        .map(|thread_id| {
            let ctx = Arc::clone(&ctx);
            let barrier = Arc::clone(&barrier);
            let error_count = Arc::clone(&error_count);

            thread::spawn(move || {
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    let result = match thread_id % 3 {
                        0 => ctx.audit_service.imbalanced_transactions().map(|_| ()),
                        1 => ctx.summary_service.account_balances().map(|_| ()),
                        _ => ctx
                            .query_service
                            .execute("SELECT COUNT(*) FROM journal_entries")
                            .map(|_| ()),
                    };
                    if let Err(e) = result {
                        eprintln!("Reader {}: error at iteration {}: {}", thread_id, i, e);
                        error_count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(error_count.load(Ordering::SeqCst), 0);
}

/// Every operation drops its connection on return, so a full write step can
/// always follow a read step
#[test]
fn test_steps_release_connections_between_calls() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = prepare_workspace(&temp_dir);

    // Read, write, read, write: each call opens and drops its own handle
    ctx.audit_service.imbalanced_transactions().unwrap();
    ctx.ingest_service.ingest().unwrap();
    ctx.summary_service.account_balances().unwrap();
    ctx.transform_service.transform().unwrap();
    ctx.status_service.get_status().unwrap();
    ctx.ingest_service.ingest().unwrap();
}
