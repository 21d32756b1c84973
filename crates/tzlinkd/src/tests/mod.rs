//! Test suites for the tzlink daemon.

pub(crate) mod support;
