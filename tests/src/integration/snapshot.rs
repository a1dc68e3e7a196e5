//! # Snapshot Flows
//!
//! A populated filter is stored to disk without its salts and restored
//! against the same salt file.

#[cfg(test)]
mod tests {
    use std::fs;

    use spatial_bloom_filter::{
        ConfigError, FileSaltStore, FilterSnapshot, SaltPolicy, SbfConfig, SbfConfigBuilder,
        SbfError, SpatialBloomFilter, StaticSalts,
    };

    fn config(dir: &tempfile::TempDir, areas: u32) -> SbfConfig {
        SbfConfigBuilder::new()
            .bit_mapping(10)
            .hash_family(["sha224", "md4", "sha512"])
            .num_areas(areas)
            .salt_path(dir.path().join("hash_salt"))
            .salt_policy(SaltPolicy::CreateIfMissing)
            .build()
            .unwrap()
    }

    #[test]
    fn test_snapshot_file_restores_identical_answers() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, 300);
        let mut filter = SpatialBloomFilter::from_config(&config).unwrap();
        for i in 0..300u16 {
            filter.insert(format!("cell-{}", i).as_bytes(), i + 1).unwrap();
        }
        assert_eq!(filter.cell_size(), 2, "More than 255 areas need wide cells");

        let path = dir.path().join("filter.bin");
        fs::write(&path, filter.snapshot().to_bytes().unwrap()).unwrap();

        let snapshot = FilterSnapshot::from_bytes(&fs::read(&path).unwrap()).unwrap();
        let restored =
            SpatialBloomFilter::restore(snapshot, &FileSaltStore::from_config(&config)).unwrap();

        assert_eq!(restored.cells(), filter.cells());
        assert_eq!(restored.members(), 300);
        for i in 0..300u16 {
            let element = format!("cell-{}", i);
            assert_eq!(
                restored.check(element.as_bytes()),
                filter.check(element.as_bytes())
            );
            assert!(restored.check_area(element.as_bytes()) >= i + 1);
        }
        assert_eq!(
            restored.statistics().snapshot(),
            filter.statistics().snapshot(),
            "Estimators depend only on cells and counters"
        );
    }

    #[test]
    fn test_restore_requires_salts() {
        let dir = tempfile::tempdir().unwrap();
        let filter = SpatialBloomFilter::new(&config(&dir, 4), &StaticSalts::generated(3, 16)).unwrap();

        let missing = FileSaltStore::new(dir.path().join("absent"), 16, SaltPolicy::RequireExisting);
        let result = SpatialBloomFilter::restore(filter.snapshot(), &missing);
        assert!(matches!(
            result,
            Err(SbfError::Configuration(ConfigError::SaltFileMissing(_)))
        ));
    }

    #[test]
    fn test_restored_filter_keeps_accepting_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let salts = StaticSalts::generated(3, 32);
        let mut filter = SpatialBloomFilter::new(&config(&dir, 2), &salts).unwrap();
        filter.insert(b"first", 1).unwrap();

        let mut restored = SpatialBloomFilter::restore(filter.snapshot(), &salts).unwrap();
        restored.insert(b"second", 2).unwrap();

        assert_eq!(restored.members(), 2);
        assert_eq!(restored.area_members(2), 1);
        assert_eq!(restored.check_area(b"second"), 2);
        assert_ne!(restored.check_area(b"first"), 0);
    }
}
