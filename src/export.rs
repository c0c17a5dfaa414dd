use std::io;

use crate::models::MouRecord;

pub fn write_csv<W: io::Write>(records: &[MouRecord], out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
