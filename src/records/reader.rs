//! CSV record reader
//!
//! Reads the payout list with headers `token_address, receiver, amount` and
//! validates the addresses once, up front. The input is finite and fully
//! materialized; the pipeline has no streaming requirement.

use crate::types::TransferRecord;
use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::{path::Path, str::FromStr};
use tracing::info;

/// Raw CSV row before address validation
#[derive(Debug, Deserialize)]
struct RawRecord {
    token_address: String,
    receiver: String,
    amount: String,
}

/// Read and validate all records from a CSV file
///
/// # Arguments
/// * `path` - path to the CSV file
///
/// # Returns
/// * `Ok(records)` in file order; an empty file yields an empty list
/// * `Err` if the file is unreadable, a row is malformed, or an address
///   does not parse; bad input aborts before any network activity
pub fn read_records(path: &Path) -> Result<Vec<TransferRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open records file {}", path.display()))?;

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<RawRecord>().enumerate() {
        let raw = row.with_context(|| format!("malformed record on line {}", line + 2))?;
        records.push(TransferRecord {
            token: Pubkey::from_str(&raw.token_address)
                .with_context(|| format!("bad token address on line {}", line + 2))?,
            receiver: Pubkey::from_str(&raw.receiver)
                .with_context(|| format!("bad receiver address on line {}", line + 2))?,
            amount: raw.amount,
        });
    }
    info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_records_in_file_order() {
        let token = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let file = write_csv(&format!(
            "token_address,receiver,amount\n{token},{a},1.5\n{token},{b},\"2,000\"\n"
        ));

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].receiver, a);
        assert_eq!(records[0].amount, "1.5");
        assert_eq!(records[1].amount, "2,000");
    }

    #[test]
    fn test_bad_address_aborts_with_line_number() {
        let file = write_csv("token_address,receiver,amount\nnot-a-key,also-bad,1\n");
        let err = read_records(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_header_only_file_is_empty_not_an_error() {
        let file = write_csv("token_address,receiver,amount\n");
        assert!(read_records(file.path()).unwrap().is_empty());
    }
}
