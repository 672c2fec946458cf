//! Diagnostic capability table of registered formats.

use std::fmt;

/// Which operations a format supports for one target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCapabilities {
    pub format: String,
    pub parse: bool,
    pub serialize: bool,
    pub read: bool,
    pub write: bool,
    pub identify: bool,
}

impl FormatCapabilities {
    fn cells(&self) -> [&str; 6] {
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
        [
            self.format.as_str(),
            yes_no(self.parse),
            yes_no(self.serialize),
            yes_no(self.read),
            yes_no(self.write),
            yes_no(self.identify),
        ]
    }
}

/// Text rendering of [`FormatCapabilities`] rows, right-aligned per column.
///
/// Renders as an empty string when there are no rows.
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    rows: Vec<FormatCapabilities>,
}

impl FormatTable {
    const HEADER: [&'static str; 6] = [
        "Format",
        "Parse",
        "Serialize",
        "Read",
        "Write",
        "Auto-identify",
    ];

    pub fn new(rows: Vec<FormatCapabilities>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[FormatCapabilities] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for FormatTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return Ok(());
        }

        let cells: Vec<[&str; 6]> = self.rows.iter().map(FormatCapabilities::cells).collect();
        let mut widths = Self::HEADER.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let write_row = |f: &mut fmt::Formatter<'_>, row: &[&str; 6]| -> fmt::Result {
            let line: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{:>width$}", cell, width = width))
                .collect();
            writeln!(f, "{}", line.join(" "))
        };

        write_row(f, &Self::HEADER)?;
        let rule = widths.map(|w| "-".repeat(w)).join(" ");
        writeln!(f, "{}", rule)?;
        for row in &cells {
            write_row(f, row)?;
        }
        Ok(())
    }
}
