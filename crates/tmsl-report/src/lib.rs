//! Report generation over best-practice analysis results.
//!
//! Turns an [`Analysis`](tmsl_bpa::Analysis) into either a grouped view for
//! interactive display ([`group_violations`]) or a serializable report
//! document ([`BpaReport`]) in one of three shapes.

pub mod group;
pub mod report;

pub use group::{GroupBy, GroupedViolations, ViolationGroup, group_violations};
pub use report::{BpaReport, ReportFormat};
