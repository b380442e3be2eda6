//! Server configuration.

use lapin::Connection;
use warren_log::TaggedLog;

/// Suffix appended to queue names when test mode is on, isolating
/// concurrent test runs from production consumers.
const TEST_QUEUE_SUFFIX: &str = "_test";

/// Resolves the final queue name from a base name and the test-mode flag.
pub fn queue_name(base: &str, test_mode: bool) -> String {
    if test_mode {
        format!("{base}{TEST_QUEUE_SUFFIX}")
    } else {
        base.to_string()
    }
}

/// Everything an [`RpcServer`](crate::RpcServer) needs besides its queue
/// name and method table.
///
/// The connection is shared; each server constructed from it opens its own
/// channel. `request_context` controls whether the envelope being dispatched
/// is bound into task-scoped storage (see [`crate::current_request`]) for
/// the duration of each dispatch.
pub struct ServerConfig {
    pub connection: Connection,
    pub logger: TaggedLog,
    pub request_context: bool,
    pub test_mode: bool,
}

impl ServerConfig {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            logger: TaggedLog::default(),
            request_context: false,
            test_mode: false,
        }
    }

    pub fn with_logger(mut self, logger: TaggedLog) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_request_context(mut self, enabled: bool) -> Self {
        self.request_context = enabled;
        self
    }

    pub fn with_test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }
}
