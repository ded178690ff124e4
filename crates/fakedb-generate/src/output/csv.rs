use crate::directive::TableData;
use crate::errors::GenerationError;
use crate::output::Formatter;

/// Header row followed by one record per generated row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_table(&self, table: &TableData) -> Result<String, GenerationError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(&table.columns)?;
        for row in table.rows() {
            let record: Vec<String> = row.iter().map(|value| value.to_csv()).collect();
            writer.write_record(&record)?;
        }

        writer.flush()?;
        let bytes = writer.into_inner().map_err(|err| err.into_error())?;
        String::from_utf8(bytes).map_err(|err| {
            GenerationError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
        })
    }
}
