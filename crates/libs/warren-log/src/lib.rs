//! Tag-scoped logging over the [`log`] facade.
//!
//! A [`TaggedLog`] carries a fixed, ordered set of tags and prefixes every
//! line it emits with them (`[server] [queue=rpc] message`), so related lines
//! can be filtered together. [`TaggedLog::tagged`] layers additional tags for
//! a narrower scope — an RPC server uses this to stamp every line produced
//! while handling one message with that message's queue and correlation id.
//!
//! The wrapper never owns a sink; whatever `log` backend the embedding
//! process installs (`env_logger`, syslog, ...) receives the rendered lines.

use log::Level;

/// A logger wrapper that applies a persistent tag set to every call.
#[derive(Clone, Debug, Default)]
pub struct TaggedLog {
    tags: Vec<String>,
}

impl TaggedLog {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a child logger carrying this logger's tags plus `tags`,
    /// in that order. The parent is unaffected.
    pub fn tagged<I, S>(&self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut layered = self.tags.clone();
        layered.extend(tags.into_iter().map(Into::into));
        Self { tags: layered }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn trace(&self, message: impl std::fmt::Display) {
        self.emit(Level::Trace, message);
    }

    pub fn debug(&self, message: impl std::fmt::Display) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&self, message: impl std::fmt::Display) {
        self.emit(Level::Info, message);
    }

    pub fn warn(&self, message: impl std::fmt::Display) {
        self.emit(Level::Warn, message);
    }

    pub fn error(&self, message: impl std::fmt::Display) {
        self.emit(Level::Error, message);
    }

    /// Renders `message` with the tag prefix, without emitting it.
    pub fn render(&self, message: impl std::fmt::Display) -> String {
        if self.tags.is_empty() {
            return message.to_string();
        }
        let mut line = String::new();
        for tag in &self.tags {
            line.push('[');
            line.push_str(tag);
            line.push_str("] ");
        }
        line.push_str(&message.to_string());
        line
    }

    fn emit(&self, level: Level, message: impl std::fmt::Display) {
        log::log!(level, "{}", self.render(message));
    }
}
