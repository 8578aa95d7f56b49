// CSV export - semicolon separated, locale-invariant numbers
use crate::application::table_export::series_label;
use crate::domain::collection::SeriesCollection;
use crate::domain::data_point::{DataPoint, ValueSlot};
use crate::domain::number_format::{DecimalFormat, Locale};
use anyhow::{Context, Result};

pub const CSV_DELIMITER: u8 = b';';

#[derive(Debug, Clone)]
pub struct CsvExporter {
    format: DecimalFormat,
}

impl CsvExporter {
    pub fn new(format: DecimalFormat) -> Self {
        Self { format }
    }

    /// One record per time marker; series with bounds get extra columns.
    pub fn export(&self, collection: &SeriesCollection<'_>) -> Result<String> {
        let columns: Vec<(usize, Vec<ValueSlot>)> = collection
            .series()
            .iter()
            .enumerate()
            .filter(|(_, series)| !series.is_trend_line())
            .map(|(column, series)| {
                let mut slots = vec![ValueSlot::Main];
                if series.has_low_high() {
                    slots.extend([ValueSlot::Low, ValueSlot::High]);
                }
                if series.has_min_max() {
                    slots.extend([ValueSlot::Min, ValueSlot::Max]);
                }
                (column, slots)
            })
            .collect();

        let mut writer = csv::WriterBuilder::new()
            .delimiter(CSV_DELIMITER)
            .from_writer(Vec::new());

        let mut header = vec!["time".to_string()];
        for (column, slots) in &columns {
            let label = series_label(collection.series()[*column]);
            for slot in slots {
                header.push(match slot {
                    ValueSlot::Main => label.clone(),
                    ValueSlot::Low => format!("{} low", label),
                    ValueSlot::High => format!("{} high", label),
                    ValueSlot::Min => format!("{} min", label),
                    ValueSlot::Max => format!("{} max", label),
                });
            }
        }
        writer.write_record(&header).context("Failed to write CSV header")?;

        for marker in collection.time_markers() {
            let row = collection.data_points_for_time_marker(marker).unwrap_or_default();
            let mut record = vec![marker.to_string()];
            for (column, slots) in &columns {
                let point = row.get(*column).copied().flatten();
                for slot in slots {
                    let cell = match point {
                        Some(point) if slot_present(point, *slot) => {
                            point.get_formatted_in(*slot, &self.format, Locale::English)
                        }
                        _ => String::new(),
                    };
                    record.push(cell);
                }
            }
            writer
                .write_record(&record)
                .with_context(|| format!("Failed to write CSV record for {}", marker))?;
        }

        let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }
}

fn slot_present(point: &DataPoint, slot: ValueSlot) -> bool {
    match slot {
        ValueSlot::Main => true,
        ValueSlot::Low | ValueSlot::High => point.has_low_high(),
        ValueSlot::Min | ValueSlot::Max => point.has_min_max(),
    }
}
