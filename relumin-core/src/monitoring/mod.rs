//! Monitoring reports
//!
//! Parsers for the loosely structured `INFO` and `CLUSTER INFO` replies.

pub mod info;

pub use info::{
    InfoReport, TIMESTAMP_KEY, parse_cluster_info_result, parse_colon_separated,
    parse_info_result,
};
