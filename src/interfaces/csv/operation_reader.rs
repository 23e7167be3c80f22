use crate::domain::operation::{Operation, OperationKind};
use crate::domain::wallet::WalletId;
use crate::error::{Result, WalletError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Create,
    Deposit,
    Withdraw,
}

/// One row of a batch file: `op,wallet,amount`. Create rows carry no amount.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub op: RecordKind,
    pub wallet: WalletId,
    pub amount: Option<Decimal>,
}

/// A shaped request ready for the wallet service.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum WalletCommand {
    Create(WalletId),
    Apply(Operation),
}

impl OperationRecord {
    /// Shapes the raw row into a service command, validating the amount.
    pub fn into_command(self) -> Result<WalletCommand> {
        match self.op {
            RecordKind::Create => Ok(WalletCommand::Create(self.wallet)),
            RecordKind::Deposit | RecordKind::Withdraw => {
                let amount = self
                    .amount
                    .ok_or(WalletError::MissingAmount(self.wallet))?;
                let kind = match self.op {
                    RecordKind::Deposit => OperationKind::Deposit,
                    _ => OperationKind::Withdraw,
                };
                Ok(WalletCommand::Apply(Operation::new(
                    self.wallet,
                    kind,
                    amount,
                )?))
            }
        }
    }
}

/// Reads operation rows from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<OperationRecord>`,
/// trimming whitespace and tolerating short rows so that `create` lines may
/// omit the amount column.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g. File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes records, so
    /// large batch files stream without loading into memory.
    pub fn records(self) -> impl Iterator<Item = Result<OperationRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(WalletError::from))
    }
}
