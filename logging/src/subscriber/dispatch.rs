// The Layer that turns tracing events into LogEvents and hands them to the
// appenders chosen by the routing table.

use crate::encoders::EventFormatter;
use crate::model::LogEvent;
use crate::subscriber::{routing::Routing, visitor::LogEventFieldVisitor};
use std::io::Write;
use tracing::{Event, Metadata, Subscriber};
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{
  layer::{Context, Layer},
  registry::LookupSpan,
};

/// One configured output: its encoder and the non-blocking writer feeding
/// its background worker.
pub(crate) struct Appender {
  pub(crate) name: String,
  pub(crate) formatter: Box<dyn EventFormatter>,
  pub(crate) writer: NonBlocking,
}

/// The campus logging layer. Build one with
/// [`build_layer`](crate::build_layer).
pub struct DispatchLayer {
  appenders: Vec<Appender>,
  routing: Routing,
}

impl DispatchLayer {
  pub(crate) fn new(appenders: Vec<Appender>, routing: Routing) -> Self {
    Self { appenders, routing }
  }

  pub fn appender_names(&self) -> Vec<&str> {
    self.appenders.iter().map(|a| a.name.as_str()).collect()
  }

  fn build_log_event<S>(&self, event: &Event<'_>, ctx: &Context<'_, S>) -> LogEvent
  where
    S: Subscriber + for<'span> LookupSpan<'span>,
  {
    let metadata = event.metadata();
    let mut log_event = LogEvent::new(*metadata.level(), metadata.target(), metadata.name(), None);

    let mut visitor = LogEventFieldVisitor::new(&mut log_event);
    event.record(&mut visitor);

    if let Some(span) = ctx.event_span(event) {
      log_event.span = Some(span.name().to_string());
    }
    log_event.thread_name = std::thread::current().name().map(str::to_string);
    log_event
  }
}

impl<S> Layer<S> for DispatchLayer
where
  S: Subscriber + for<'span> LookupSpan<'span>,
{
  fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
    metadata.is_span() || !self.routing.route(metadata.target(), metadata.level()).is_empty()
  }

  fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
    let metadata = event.metadata();
    let targets = self.routing.route(metadata.target(), metadata.level());
    if targets.is_empty() {
      return;
    }

    let log_event = self.build_log_event(event, &ctx);
    for index in targets {
      let Some(appender) = self.appenders.get(index) else {
        continue;
      };
      match appender.formatter.format_event(&log_event) {
        Ok(bytes) => {
          let mut writer = appender.writer.clone();
          if let Err(e) = writer.write_all(&bytes) {
            eprintln!("[campus_logging] appender '{}' write failed: {}", appender.name, e);
          }
        }
        Err(e) => {
          eprintln!("[campus_logging] appender '{}' could not format event: {}", appender.name, e);
        }
      }
    }
  }
}
