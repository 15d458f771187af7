//! Well-known notification discriminator constants.
//!
//! The `TYPE_*` values travel in the `type` key of every push payload's
//! structured data; client apps switch on them to decide which screen to
//! open. They must stay in sync with the mobile and web clients.

/// An individual report's status changed; sent to the reporter.
pub const TYPE_REPORT_STATUS: &str = "report_status";

/// A responder was dispatched to a report.
pub const TYPE_DISPATCH: &str = "dispatch";

/// A new broadcast announcement was published.
pub const TYPE_ANNOUNCEMENT: &str = "announcement";

/// Wire label selecting the responder-dispatch template for a status change.
pub const RECIPIENT_KIND_RESPONDER_DISPATCH: &str = "responder-dispatch";

/// Wire label for the default (reporter) recipient of a status change.
pub const RECIPIENT_KIND_REPORTER: &str = "reporter";
