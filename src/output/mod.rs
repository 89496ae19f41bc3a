//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod json;
pub mod progress;
pub mod table;

pub use json::PageMeta;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;

    /// Format and print data to stdout
    fn print(&self, format: OutputFormat) -> Result<()> {
        let output = self.format(format)?;
        println!("{}", output);
        Ok(())
    }
}

impl<T: Tabled + Serialize> Formattable for [T] {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty | OutputFormat::Table => Ok(table::format_table(self)),
            OutputFormat::Json => Ok(json::format_json(self)?),
        }
    }
}

impl<T: Tabled + Serialize> Formattable for Vec<T> {
    fn format(&self, format: OutputFormat) -> Result<String> {
        self.as_slice().format(format)
    }
}

/// A page of rows with its position in the full listing.
pub struct PagedRows<'a, T> {
    pub rows: &'a [T],
    pub meta: PageMeta,
}

impl<T: Tabled + Serialize> Formattable for PagedRows<'_, T> {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json_paged(self.rows, self.meta.clone())?),
            OutputFormat::Table => Ok(table::format_table(self.rows)),
            OutputFormat::Pretty => {
                let mut out = table::format_table(self.rows);
                if !self.rows.is_empty() {
                    out.push('\n');
                    out.push_str(&self.meta.footer());
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        #[tabled(rename = "NAME")]
        name: String,
    }

    #[test]
    fn test_vec_formats_by_mode() {
        let rows = vec![Row {
            name: "orders".into(),
        }];
        assert!(rows.format(OutputFormat::Table).unwrap().contains("NAME"));
        assert!(rows.format(OutputFormat::Json).unwrap().contains("\"name\": \"orders\""));
    }

    #[test]
    fn test_pretty_adds_page_footer() {
        let rows = vec![Row {
            name: "orders".into(),
        }];
        let paged = PagedRows {
            rows: &rows,
            meta: PageMeta {
                page: 1,
                page_size: 1,
                total_items: 3,
                total_pages: 3,
                from_cache: true,
            },
        };

        let pretty = paged.format(OutputFormat::Pretty).unwrap();
        assert!(pretty.contains("Page 1 of 3 (3 total, cached)"));

        let table = paged.format(OutputFormat::Table).unwrap();
        assert!(!table.contains("Page 1"));

        let json = paged.format(OutputFormat::Json).unwrap();
        assert!(json.contains("\"totalItems\": 3"));
    }
}
