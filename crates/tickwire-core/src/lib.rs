//! Core contracts for tickwire.
//!
//! This crate contains:
//! - Canonical domain entities and validation
//! - The unified DAO error taxonomy
//! - The HTTP transport seam and its blocking implementation
//! - The REST status DAO

pub mod domain;
pub mod error;
pub mod http;
pub mod status_dao;

pub use domain::{GeoPoint, Quote, StatusPost, Ticker};
pub use error::{DaoError, ValidationError};
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use status_dao::StatusDao;
