use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn write_ops_csv(path: &Path, rows: &[(&str, &str, &str)]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["op", "wallet", "amount"])?;
    for (op, wallet, amount) in rows {
        wtr.write_record([*op, *wallet, *amount])?;
    }

    wtr.flush()?;
    Ok(())
}
