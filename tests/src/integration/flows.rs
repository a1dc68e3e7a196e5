//! # End-to-End Flows
//!
//! Salt file on disk, dataset file on disk, bulk insert, report on disk,
//! then the report is parsed back and compared with the live estimators.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use spatial_bloom_filter::{
        save_report, CheckSummary, CsvRecordSource, FileSaltStore, ReportMode, SaltPolicy,
        SbfConfigBuilder, SbfError, SpatialBloomFilter, DEFAULT_DELIMITER,
    };
    use tempfile::TempDir;

    use crate::integration::ParsedReport;

    const PRECISION: usize = 6;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Write an `area,element` dataset with `per_area[a - 1]` elements in area `a`
    fn write_dataset(dir: &TempDir, per_area: &[usize]) -> std::path::PathBuf {
        let path = dir.path().join("dataset.csv");
        let mut file = fs::File::create(&path).unwrap();
        for (i, count) in per_area.iter().enumerate() {
            for j in 0..*count {
                writeln!(file, "{},{:.4}#{:.4}", i + 1, 51.0 + j as f64 * 1e-3, -8.0 - i as f64).unwrap();
            }
        }
        path
    }

    fn build(dir: &TempDir, per_area: &[usize]) -> SpatialBloomFilter {
        let config = SbfConfigBuilder::new()
            .bit_mapping(12)
            .hash_family(["md5", "sha1", "sha256"])
            .num_areas(per_area.len() as u32)
            .salt_path(dir.path().join("hash_salt/hash_salt"))
            .salt_policy(SaltPolicy::CreateIfMissing)
            .build()
            .unwrap();
        let mut filter = SpatialBloomFilter::from_config(&config).unwrap();

        let dataset = write_dataset(dir, per_area);
        let mut source = CsvRecordSource::from_path(&dataset, DEFAULT_DELIMITER).unwrap();
        let summary = filter.insert_from_source(&mut source).unwrap();
        assert_eq!(summary.inserted, per_area.iter().sum::<usize>());
        assert_eq!(summary.out_of_order, 0, "Fixture dataset is ascending");
        filter
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[test]
    fn test_report_round_trip_matches_estimators() {
        let dir = tempfile::tempdir().unwrap();
        let filter = build(&dir, &[120, 80, 40]);
        let report_path = dir.path().join("report.csv");

        save_report(&filter, &report_path, ReportMode::Statistics, PRECISION).unwrap();
        let parsed = ParsedReport::parse(fs::File::open(&report_path).unwrap()).unwrap();

        let tolerance = 10f64.powi(-(PRECISION as i32));
        let stats = filter.statistics();
        assert_eq!(parsed.metadata["Hash family"], "md5,sha1,sha256");
        assert_eq!(parsed.integer("Number of cells"), Some(4096));
        assert_eq!(parsed.integer("Members"), Some(240));
        assert_eq!(parsed.integer("Collisions"), Some(filter.collisions()));
        assert!((parsed.real("Sparsity").unwrap() - stats.filter_sparsity()).abs() <= tolerance);
        assert!((parsed.real("Fpp").unwrap() - stats.filter_fpp()).abs() <= tolerance);
        assert!(
            (parsed.real("A-priori safeness probability").unwrap() - stats.apriori_safeness()).abs()
                <= tolerance
        );

        assert_eq!(parsed.rows.len(), 3, "One row per area");
        for area in 1..=3u16 {
            assert_eq!(
                parsed.area_value(area, "Members"),
                Some(filter.area_members(area) as f64)
            );
            assert_eq!(
                parsed.area_value(area, "Cells"),
                Some(filter.area_cells(area) as f64)
            );
            let isep = parsed.area_value(area, "Isep").unwrap();
            assert!((isep - stats.area_isep(area)).abs() <= tolerance);
            let emersion = parsed.area_value(area, "Emersion").unwrap();
            assert!((emersion - stats.area_emersion(area)).abs() <= tolerance);
        }
    }

    #[test]
    fn test_cells_report_sums_to_area_cells() {
        let dir = tempfile::tempdir().unwrap();
        let filter = build(&dir, &[30, 30]);
        let path = dir.path().join("cells.csv");

        save_report(&filter, &path, ReportMode::Cells, PRECISION).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let cells: Vec<u16> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(cells.len(), filter.num_cells());
        for area in 1..=2u16 {
            let counted = cells.iter().filter(|&&c| c == area).count() as u64;
            assert_eq!(counted, filter.area_cells(area));
        }
    }

    #[test]
    fn test_paired_check_dataset_verifies_every_member() {
        let dir = tempfile::tempdir().unwrap();
        let filter = build(&dir, &[25, 25, 25]);

        // Insertion data doubles as `expected_area,element` verification data
        let dataset = dir.path().join("dataset.csv");
        let mut source = CsvRecordSource::from_path(&dataset, DEFAULT_DELIMITER).unwrap();
        let summary = filter.check_from_source(&mut source).unwrap();

        match summary {
            CheckSummary::Verification {
                correct,
                incorrect,
                mismatches,
            } => {
                assert_eq!(correct.iter().chain(&incorrect).sum::<u64>(), 75);
                assert_eq!(incorrect[3], 0, "The last area is never overwritten");
                for mismatch in &mismatches {
                    assert!(mismatch.found > mismatch.expected, "Members only drift upwards");
                }
            }
            other => panic!("Expected a verification summary, got {:?}", other),
        }
    }

    #[test]
    fn test_second_filter_reuses_persisted_salts() {
        let dir = tempfile::tempdir().unwrap();
        let first = build(&dir, &[10, 10]);

        let salts = FileSaltStore::load(&dir.path().join("hash_salt/hash_salt"), 3).unwrap();
        assert_eq!(salts.len(), 3);
        assert!(salts.iter().all(|s| s.len() == 128), "Default salt length");

        let second = build(&dir, &[10, 10]);
        assert_eq!(first.cells(), second.cells(), "Same salts and data give the same cells");
    }

    #[test]
    fn test_malformed_dataset_leaves_filter_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut filter = build(&dir, &[5, 5]);
        let before = filter.cells();

        let bad = dir.path().join("bad.csv");
        fs::write(&bad, "1,fresh-a\n2,fresh-b\nnot-a-number,fresh-c\n").unwrap();
        let mut source = CsvRecordSource::from_path(&bad, DEFAULT_DELIMITER).unwrap();

        let result = filter.insert_from_source(&mut source);
        assert!(matches!(result, Err(SbfError::MalformedInput { line: 3, .. })));
        assert_eq!(filter.cells(), before);
        assert_eq!(filter.members(), 10);
    }
}
