//! # Two-Area Disambiguation
//!
//! A 16-cell filter with two inserted points, plus a larger filter probed
//! with unrelated strings to bound its false positive rate.

#[cfg(test)]
mod tests {
    use spatial_bloom_filter::{SbfConfigBuilder, SpatialBloomFilter, StaticSalts};

    fn filter(bits: u32, areas: u32) -> SpatialBloomFilter {
        let config = SbfConfigBuilder::new()
            .bit_mapping(bits)
            .hash_family(["md5", "sha1", "sha256"])
            .num_areas(areas)
            .build()
            .unwrap();
        SpatialBloomFilter::new(&config, &StaticSalts::generated(3, 64)).unwrap()
    }

    #[test]
    fn test_min_over_hashes_separates_areas() {
        let mut filter = filter(4, 4);
        assert_eq!(filter.num_cells(), 16);

        filter.insert(b"51.89#-8.48", 1).unwrap();
        filter.insert(b"51.90#-8.50", 2).unwrap();
        assert_eq!(filter.members(), 2);

        assert_eq!(filter.check_area(b"51.90#-8.50"), 2, "Highest area is never overwritten");

        let first = filter.check(b"51.89#-8.48");
        let second: Vec<usize> = filter.check(b"51.90#-8.50").indices().collect();
        match first.area() {
            1 => assert!(first.probes().iter().any(|p| p.area == 1)),
            2 => assert!(
                first.indices().all(|i| second.contains(&i)),
                "Area 1 only reads as 2 when every index was overwritten"
            ),
            other => panic!("Unexpected area {}", other),
        }
    }

    #[test]
    fn test_unrelated_elements_rarely_match() {
        let mut filter = filter(14, 2);
        for i in 0..300 {
            let area = if i < 150 { 1 } else { 2 };
            filter.insert(format!("member-{}", i).as_bytes(), area).unwrap();
        }

        let probes = 2_000;
        let false_positives = (0..probes)
            .filter(|i| filter.check_area(format!("unrelated-{}", i).as_bytes()) != 0)
            .count();
        let rate = false_positives as f64 / probes as f64;
        let fpp = filter.statistics().filter_fpp();

        assert!(fpp < 0.001, "Filter is sparse: fpp = {}", fpp);
        assert!(rate < 0.01, "Observed false positive rate {} too high", rate);
    }
}
