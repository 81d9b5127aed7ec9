//! CDP adapter for the automation target.
//!
//! Attaches to an *existing* Chrome/Chromium started with
//! `--remote-debugging-port` and drives an already-open page; promptloop never
//! launches a browser or navigates anywhere. The websocket endpoint is
//! discovered through `GET /json/version`, the page is matched by URL
//! substring, and all interaction goes through dispatched input events so the
//! target app sees trusted-looking activity.

pub mod cdp;

pub use cdp::CdpTarget;
