//! # Spatial Bloom Filter Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs       # Salt file -> dataset -> report, re-parsed
//!     ├── snapshot.rs    # Store, restore and re-check a populated filter
//!     └── two_areas.rs   # Small filter disambiguating two areas
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sbf-tests
//! cargo test -p sbf-tests integration::flows::
//! ```

pub mod integration;
