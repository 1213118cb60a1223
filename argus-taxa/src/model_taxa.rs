//! Model taxonomy file parsing
//!
//! The classifier ships a taxonomy file with one output class per line in
//! `label: taxon_id` form. The ids feed the startup ancestry bulk load.

use argus_core::{ArgusResult, TaxonId};
use std::path::Path;
use tracing::debug;

/// Read the taxon ids listed in a model taxonomy file. Lines without a
/// parseable id are skipped.
pub fn read_model_taxon_ids(path: &Path) -> ArgusResult<Vec<TaxonId>> {
    let contents = std::fs::read_to_string(path)?;
    let ids: Vec<TaxonId> = contents
        .lines()
        .filter_map(|line| {
            let (_, id_part) = line.split_once(':')?;
            id_part.trim().parse::<u32>().ok().map(TaxonId)
        })
        .collect();
    debug!(count = ids.len(), path = %path.display(), "read model taxon ids");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_model_taxon_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 Danaus plexippus: 48662").unwrap();
        writeln!(file, "1 Apis mellifera: 47219").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "malformed line without id").unwrap();
        writeln!(file, "2 Sciurus vulgaris: 46005").unwrap();

        let ids = read_model_taxon_ids(file.path()).unwrap();
        assert_eq!(ids, vec![TaxonId(48662), TaxonId(47219), TaxonId(46005)]);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let result = read_model_taxon_ids(Path::new("/nonexistent/taxa.txt"));
        assert!(matches!(
            result.unwrap_err(),
            argus_core::ArgusError::Io(_)
        ));
    }
}
