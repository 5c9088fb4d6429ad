use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Header written by [`generate_mock_data`]
pub const MOCK_HEADER: &str = "id,name,status";

/// Write `rows` synthetic records `100+i,User_i,active` to `path`
///
/// Parent directories are created as needed and an existing file is replaced.
pub fn generate_mock_data<P: AsRef<Path>>(path: P, rows: usize) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut output = BufWriter::new(File::create(path)?);
    write_mock_data(&mut output, rows)?;
    output.flush()?;

    info!("Successfully generated {} rows in {}", rows, path.display());
    Ok(())
}

/// Stream mock records to any writer
pub fn write_mock_data<W: Write>(output: &mut W, rows: usize) -> io::Result<()> {
    writeln!(output, "{}", MOCK_HEADER)?;
    for i in 1..=rows {
        writeln!(output, "{},User_{},active", 100 + i, i)?;
    }
    Ok(())
}
