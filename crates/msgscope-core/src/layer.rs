use std::fmt::{self, Write as _};
use std::sync::{Arc, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use msgscope_types::{Provenance, Severity};

use crate::engine::Console;

/// A `tracing_subscriber::Layer` that dispatches every event into a [`Console`].
///
/// ERROR events carrying `fatal = true` are dispatched as Fatal.
#[derive(Clone)]
pub struct ConsoleLayer {
    console: Arc<OnceLock<Arc<Console>>>,
}

impl ConsoleLayer {
    pub fn new(console: Arc<Console>) -> Self {
        Self {
            console: Arc::new(OnceLock::from(console)),
        }
    }

    /// A layer with no console yet. Call [`ConsoleLayer::bind`] before the
    /// first event; otherwise that event warns on stderr and starts a console
    /// with default settings that is kept for the rest of the process.
    pub fn unbound() -> Self {
        Self {
            console: Arc::new(OnceLock::new()),
        }
    }

    /// Attach the console events go to. Hands the console back if the layer
    /// already has one (bound earlier or fallen back to defaults).
    pub fn bind(&self, console: Arc<Console>) -> Result<(), Arc<Console>> {
        self.console.set(console)
    }

    pub fn is_bound(&self) -> bool {
        self.console.get().is_some()
    }

    /// The console events are dispatched to
    pub fn console(&self) -> &Arc<Console> {
        self.console.get_or_init(|| {
            // Not through tracing: this runs inside the subscriber
            eprintln!("msgscope: console layer used before a console was configured, using defaults");
            Console::fallback()
        })
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();

        let mut fields = EventFields::default();
        event.record(&mut fields);

        let severity = match *meta.level() {
            Level::TRACE | Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Info,
            Level::WARN => Severity::Warning,
            Level::ERROR if fields.fatal => Severity::Fatal,
            Level::ERROR => Severity::Critical,
        };

        let provenance = Provenance::new(meta.file().unwrap_or("<unknown>"), meta.line().unwrap_or(0))
            .with_function(meta.module_path().unwrap_or_default())
            .with_category(meta.target());

        self.console().record(severity, provenance, fields.into_body());
    }
}

/// Collects the message and remaining fields of one event
#[derive(Default)]
struct EventFields {
    message: String,
    rest: String,
    fatal: bool,
}

impl EventFields {
    fn into_body(self) -> String {
        let mut body = self.message;
        body.push_str(&self.rest);
        body
    }
}

impl Visit for EventFields {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "fatal" {
            self.fatal = value;
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.rest, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.rest, " {}={:?}", field.name(), value);
        }
    }
}
