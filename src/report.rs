use std::io::Write;

use crate::Ledger;

/// Writes the totals of every account as CSV
///
/// One row per account, in ledger order, with the columns
/// `code,owner,deposits,withdrawals,total_deposited,total_withdrawn,balance`.
pub fn write_summary_csv<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for account in ledger {
        writer.serialize(account)?;
    }

    // an empty ledger still gets its header row
    if ledger.is_empty() {
        writer.write_record(HEADER)?;
    }

    writer.flush()?;
    Ok(())
}

const HEADER: [&str; 7] = [
    "code",
    "owner",
    "deposits",
    "withdrawals",
    "total_deposited",
    "total_withdrawn",
    "balance",
];
