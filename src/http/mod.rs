//! HTTP client module
//!
//! Transport adapter toward the tuner device.
//!
//! # Features
//!
//! - **Fixed request**: POST `/cgi-bin/tuner.cgi` with the form the device expects
//! - **Basic auth**: per-request credentials
//! - **Bounded**: one attempt, always under the configured timeout
//! - **Classified failures**: timeout, connection, non-200 status

mod client;

pub use client::{
    Credentials, DeviceClient, DeviceClientConfig, DeviceTarget, PayloadSource, TUNER_CGI_PATH,
    TUNER_FORM,
};
