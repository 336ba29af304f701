pub(crate) mod dispatch;
pub(crate) mod routing;
pub(crate) mod visitor;

use crate::config::processed::{AppenderInternal, AppenderKind, LoggingConfig, Rotation};
use crate::encoders::new_event_formatter;
use crate::error::{Error, Result};
use dispatch::{Appender, DispatchLayer};
use routing::Routing;
use std::fs::{self, OpenOptions};
use std::io;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{self, RollingFileAppender};

fn open_writer(appender: &AppenderInternal) -> Result<(NonBlocking, WorkerGuard)> {
  let pair = match &appender.kind {
    AppenderKind::Console { stderr: false } => tracing_appender::non_blocking(io::stdout()),
    AppenderKind::Console { stderr: true } => tracing_appender::non_blocking(io::stderr()),
    AppenderKind::File { path } => {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
      }
      let file = OpenOptions::new().create(true).append(true).open(path)?;
      tracing_appender::non_blocking(file)
    }
    AppenderKind::RollingFile {
      directory,
      file_name_prefix,
      rotation,
    } => {
      fs::create_dir_all(directory)?;
      let rotation = match rotation {
        Rotation::Minutely => rolling::Rotation::MINUTELY,
        Rotation::Hourly => rolling::Rotation::HOURLY,
        Rotation::Daily => rolling::Rotation::DAILY,
        Rotation::Never => rolling::Rotation::NEVER,
      };
      let roller = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name_prefix.as_str())
        .build(directory)
        .map_err(|e| Error::Init(format!("appender '{}': {}", appender.name, e)))?;
      tracing_appender::non_blocking(roller)
    }
  };
  Ok(pair)
}

/// Opens every appender of `config` and builds the dispatch layer.
///
/// The returned guards flush their writers when dropped; keep them alive for
/// as long as the layer is in use.
pub fn build_layer(config: &LoggingConfig) -> Result<(DispatchLayer, Vec<WorkerGuard>)> {
  let mut appenders = Vec::with_capacity(config.appenders.len());
  let mut guards = Vec::with_capacity(config.appenders.len());
  for appender in &config.appenders {
    let (writer, guard) = open_writer(appender)?;
    appenders.push(Appender {
      name: appender.name.clone(),
      formatter: new_event_formatter(&appender.encoder),
      writer,
    });
    guards.push(guard);
  }
  let routing = Routing::new(config.loggers.clone(), config.root.clone());
  Ok((DispatchLayer::new(appenders, routing), guards))
}
