//! Unit tests for the TIFF container engine

pub mod test_utils;

mod constants_tests;
mod geokeys_tests;
mod reader_tests;
mod types_tests;
