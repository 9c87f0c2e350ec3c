use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("kbase.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("kbase.client.request_errors");
pub(crate) static CLIENT_UNAUTHORIZED: Counter = Counter::new("kbase.client.unauthorized");

pub(crate) static LOGINS: Counter = Counter::new("kbase.session.logins");
pub(crate) static LOGIN_FAILURES: Counter = Counter::new("kbase.session.login_failures");

pub(crate) static SENDS: Counter = Counter::new("kbase.conversation.sends");
pub(crate) static SEND_FAILURES: Counter = Counter::new("kbase.conversation.send_failures");

pub(crate) static UPLOADS: Counter = Counter::new("kbase.attachment.uploads");
pub(crate) static UPLOAD_FAILURES: Counter = Counter::new("kbase.attachment.upload_failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_UNAUTHORIZED);

    collector.register_counter(&LOGINS);
    collector.register_counter(&LOGIN_FAILURES);

    collector.register_counter(&SENDS);
    collector.register_counter(&SEND_FAILURES);

    collector.register_counter(&UPLOADS);
    collector.register_counter(&UPLOAD_FAILURES);
}
