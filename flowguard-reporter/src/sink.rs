use flowguard_core::{LogEvent, ReportPayload};

/// Where the cycle hands off its results. Both calls return immediately;
/// delivery happens in the background and failures never reach the caller.
pub trait ReportSink: Send + Sync {
    fn submit_report(&self, payload: ReportPayload);

    fn submit_log(&self, event: LogEvent);
}
