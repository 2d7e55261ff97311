//! Process-wide, install-once statistics table.
//!
//! Library code takes tables explicitly; this slot exists for binaries
//! that load statistics once at startup and hand them to many workers.

use std::sync::OnceLock;

use crate::error::NormError;
use crate::table::NormTable;

static TABLE: OnceLock<NormTable> = OnceLock::new();

/// Install the process-wide table.
///
/// The table is validated first. A second call fails with
/// [`NormError::AlreadyInstalled`] and leaves the first table in place.
pub fn install(table: NormTable) -> Result<&'static NormTable, NormError> {
    table.validate()?;
    let mut fresh = false;
    let installed = TABLE.get_or_init(|| {
        fresh = true;
        table
    });
    if fresh {
        Ok(installed)
    } else {
        Err(NormError::AlreadyInstalled)
    }
}

/// The installed table, if any.
pub fn installed() -> Option<&'static NormTable> {
    TABLE.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_core::NormStats;

    // The only test in this crate that touches the static.
    #[test]
    fn install_once() {
        let mut first = NormTable::new();
        first.insert("Temperature [C]", NormStats::new(10.0, 1.0)).unwrap();
        let got = install(first.clone()).unwrap();
        assert_eq!(got, &first);

        let mut second = NormTable::new();
        second.insert("Temperature [C]", NormStats::new(99.0, 1.0)).unwrap();
        assert_eq!(install(second), Err(NormError::AlreadyInstalled));
        assert_eq!(installed(), Some(&first));
    }
}
