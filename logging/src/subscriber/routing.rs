use crate::config::processed::LoggerInternal;
use tracing::Level;

/// Decides which appenders receive an event, log4j style.
///
/// The most specific logger whose target prefixes the event target sets the
/// level. The event then goes to that logger's appenders and, while loggers
/// are additive, to the appenders of every less specific match and finally
/// the root.
pub(crate) struct Routing {
  // Most specific first.
  loggers: Vec<LoggerInternal>,
  root: LoggerInternal,
}

fn target_matches(prefix: &str, target: &str) -> bool {
  target == prefix
    || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

impl Routing {
  pub(crate) fn new(loggers: Vec<LoggerInternal>, root: LoggerInternal) -> Self {
    Self { loggers, root }
  }

  /// Appender indices for an event, without duplicates.
  pub(crate) fn route(&self, target: &str, level: &Level) -> Vec<usize> {
    let mut matching = self
      .loggers
      .iter()
      .filter(|logger| target_matches(&logger.target, target))
      .peekable();

    let threshold = matching.peek().map_or(self.root.level, |logger| logger.level);
    if *level > threshold {
      return Vec::new();
    }

    let mut appenders = Vec::new();
    let mut reached_root = true;
    for logger in matching {
      appenders.extend_from_slice(&logger.appenders);
      if !logger.additive {
        reached_root = false;
        break;
      }
    }
    if reached_root {
      appenders.extend_from_slice(&self.root.appenders);
    }
    appenders.sort_unstable();
    appenders.dedup();
    appenders
  }
}
