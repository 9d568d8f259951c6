//! HTTP Adapter
//!
//! SubmissionGatewayのreqwest実装

pub mod reqwest_gateway;
