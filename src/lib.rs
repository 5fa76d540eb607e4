//! Clinic Contact API Library
//!
//! Core functionality for the clinic's contact endpoint: lead validation,
//! fan-out to the GHL CRM and the spreadsheet backup webhook, and the
//! attribution-capture model feeding the submission payload.
//!
//! # Modules
//!
//! - `attribution`: session-scoped capture of UTM/click-id parameters.
//! - `backup`: fire-and-forget spreadsheet backup writer.
//! - `config`: configuration management.
//! - `crm`: GHL CRM API client.
//! - `crm_fields`: static custom-field and pipeline lookup tables.
//! - `errors`: error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: request, response, and CRM payload models.

pub mod attribution;
pub mod backup;
pub mod config;
pub mod crm;
pub mod crm_fields;
pub mod errors;
pub mod handlers;
pub mod models;
