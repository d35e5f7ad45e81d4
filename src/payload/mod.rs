//! Payload Generation Module
//!
//! Turns one `TransferRecord` into its ordered `OperationUnit`:
//! - `amount`: exact decimal-string → base-unit conversion
//! - `generator`: instruction generation (idempotent account creation,
//!   decimals-checked transfer)

mod amount;
mod generator;
#[cfg(test)]
mod tests;

pub use amount::to_base_units;
pub use generator::PayloadGenerator;
