//! Two-level chunking
//!
//! Pure functions of the input size and two ceiling constants, no I/O.
//!
//! Level 1 flattens operation units into transaction units of at most K
//! records' operations each. K is tuned below the ledger's hard
//! per-transaction limit, leaving headroom for the two fee-control
//! instructions the submission engine prepends. Level 2 chunks the ordered
//! transaction units into submission groups of at most M units, M bounded by
//! the multisig program's per-batch capacity.
//!
//! Operation units are never reordered and never split: concatenating all
//! transaction units' instructions, in order, reproduces the original
//! per-record operation order.

use crate::types::{OperationUnit, PipelineError, SubmissionGroup, TransactionUnit};

/// Group operation units into submission groups
///
/// # Arguments
/// * `operations` - one unit per input record, in input order
/// * `records_per_transaction` - K, records whose operations share a
///   transaction
/// * `transactions_per_batch` - M, transaction units per multisig batch
///
/// # Returns
/// * `Ok(groups)` where `groups.len() == ceil(ceil(N/K) / M)`; empty input
///   yields zero groups
/// * `Err` if either ceiling is zero: an operation unit is indivisible, so
///   a zero ceiling can never be satisfied
pub fn plan_groups(
    operations: Vec<OperationUnit>,
    records_per_transaction: usize,
    transactions_per_batch: usize,
) -> Result<Vec<SubmissionGroup>, PipelineError> {
    if records_per_transaction == 0 {
        return Err(PipelineError::Config(
            "records_per_transaction must be at least 1; operation units cannot be split".into(),
        ));
    }
    if transactions_per_batch == 0 {
        return Err(PipelineError::Config(
            "transactions_per_batch must be at least 1".into(),
        ));
    }

    let units = chunk_into_units(operations, records_per_transaction);
    Ok(chunk_into_groups(units, transactions_per_batch))
}

/// Level 1: flatten at most `k` records' operations into each unit
fn chunk_into_units(operations: Vec<OperationUnit>, k: usize) -> Vec<TransactionUnit> {
    let mut units = Vec::with_capacity(operations.len().div_ceil(k));
    let mut iter = operations.into_iter().peekable();
    while iter.peek().is_some() {
        let mut instructions = Vec::new();
        let mut record_count = 0;
        for op in iter.by_ref().take(k) {
            instructions.extend(op.instructions);
            record_count += 1;
        }
        units.push(TransactionUnit {
            instructions,
            record_count,
        });
    }
    units
}

/// Level 2: at most `m` units per group, order preserved
fn chunk_into_groups(units: Vec<TransactionUnit>, m: usize) -> Vec<SubmissionGroup> {
    let mut groups = Vec::with_capacity(units.len().div_ceil(m));
    let mut iter = units.into_iter().peekable();
    while iter.peek().is_some() {
        groups.push(SubmissionGroup {
            units: iter.by_ref().take(m).collect(),
        });
    }
    groups
}
