use crate::domain::wallet::WalletView;
use crate::error::Result;
use std::io::Write;

/// Writes final wallet balances as `wallet,balance` CSV.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_views(&mut self, views: impl IntoIterator<Item = WalletView>) -> Result<()> {
        for view in views {
            self.writer.serialize(view)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
