use std::sync::Arc;

use chainbook_ledger::{Ledger, LedgerReader, LedgerWriter};

#[test]
fn concurrent_writers_keep_blocks_full_and_linked() {
    let ledger = Arc::new(Ledger::new("concurrent"));
    let writers = 8;
    let per_writer = 25;

    std::thread::scope(|scope| {
        for w in 0..writers {
            let ledger = Arc::clone(&ledger);
            scope.spawn(move || {
                let sender = format!("writer-{w}");
                for i in 0..per_writer {
                    ledger
                        .add_transaction(&sender, "sink", i as f64)
                        .expect("valid transfer");
                }
            });
        }
    });

    let total = writers * per_writer;
    assert_eq!(ledger.transaction_count().unwrap(), total);
    // Rollover happens on overflow, so the 200th transfer fills the 20th block.
    assert_eq!(ledger.number_of_blocks().unwrap(), 20);
    assert_eq!(ledger.current_block().unwrap().size(), 10);

    let committed = ledger.committed_blocks().unwrap();
    assert!(committed.iter().all(|b| b.size() == 10));

    let report = ledger.validate().unwrap();
    assert!(report.is_valid(), "{:?}", report.violations);
    ledger.verify().unwrap();
}

#[test]
fn readers_never_observe_a_partial_commit() {
    let ledger = Arc::new(Ledger::new("readers"));

    std::thread::scope(|scope| {
        let writer = Arc::clone(&ledger);
        scope.spawn(move || {
            for i in 0..300 {
                writer.add_transaction("a", "b", i as f64).unwrap();
            }
        });

        for _ in 0..4 {
            let reader = Arc::clone(&ledger);
            scope.spawn(move || {
                for _ in 0..50 {
                    let snapshot = reader.snapshot().unwrap();
                    let sealed = snapshot.committed.iter().all(|b| {
                        b.is_committed() && b.size() == 10 && b.block_hash().is_some()
                    });
                    assert!(sealed);
                    assert_eq!(
                        snapshot.current.sequence_id(),
                        snapshot.committed.len() as u64
                    );
                    assert_eq!(
                        snapshot.current.previous_hash(),
                        snapshot.committed.last().and_then(|b| b.block_hash())
                    );
                }
            });
        }
    });

    // 300 transfers: 29 full committed blocks and a full open block.
    assert_eq!(ledger.number_of_blocks().unwrap(), 30);
    assert_eq!(ledger.current_block().unwrap().size(), 10);
}
