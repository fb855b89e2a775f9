use std::{
    fmt,
    sync::{Arc, Mutex},
};

use tracing::{
    field::{Field, Visit},
    span::{Attributes, Id, Record},
    subscriber::DefaultGuard,
    Event, Subscriber,
};
use tracing_subscriber::{layer::Context, prelude::*, registry::LookupSpan, Layer};

/// Records every span and event field seen on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    fields: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    /// Installs the capture as this thread's subscriber until the guard drops.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(capture.clone()),
        );
        (capture, guard)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.fields.lock().unwrap().iter().any(|f| f.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.lock().unwrap().is_empty()
    }
}

struct Collect<'a>(&'a mut Vec<String>);

impl Visit for Collect<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push(format!("{}={:?}", field.name(), value));
    }
}

impl<S> Layer<S> for LogCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut fields = self.fields.lock().unwrap();
        fields.push(format!("span {}", attrs.metadata().name()));
        attrs.record(&mut Collect(&mut *fields));
    }

    fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        values.record(&mut Collect(&mut *self.fields.lock().unwrap()));
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        event.record(&mut Collect(&mut *self.fields.lock().unwrap()));
    }
}
