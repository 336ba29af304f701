use super::{util, EventFormatter};
use crate::error::Result;
use crate::model::LogEvent;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

// Either a conversion specifier (`%-5p`, `%d{%H:%M}`) or an escaped `%%`.
static PATTERN_REGEX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?P<specifier>%(?P<padding>-?\d+)?(?P<converter>[a-zA-Z])(?:\{(?P<options>[^}]+)\})?)|(?P<escaped>%%)")
    .expect("pattern regex is valid")
});

#[derive(Debug)]
enum Segment {
  Literal(String),
  Specifier(PatternSpecifier),
}

/// A parsed conversion specifier such as `%-5p`.
#[derive(Debug)]
struct PatternSpecifier {
  converter: char,
  padding: Option<i32>,
  options: Option<String>,
}

/// Formats events with a log4j-style pattern.
///
/// | specifier | output |
/// |-----------|--------|
/// | `%d`, `%d{fmt}` | timestamp, RFC 3339 or `strftime` format |
/// | `%p`, `%l` | level |
/// | `%t` | target |
/// | `%m` | message |
/// | `%s` | current span name |
/// | `%T` | thread name |
/// | `%X`, `%X{key}` | all fields, or one field |
/// | `%n` | newline |
///
/// A numeric width pads right-aligned, a negative one left-aligned.
pub struct PatternFormatter {
  segments: Vec<Segment>,
}

impl PatternFormatter {
  pub fn new(pattern_string: &str) -> Self {
    Self {
      segments: Self::parse(pattern_string),
    }
  }

  fn parse(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last_end = 0;

    for caps in PATTERN_REGEX.captures_iter(pattern) {
      let Some(mat) = caps.get(0) else {
        continue;
      };
      if mat.start() > last_end {
        segments.push(Segment::Literal(pattern[last_end..mat.start()].to_string()));
      }

      if caps.name("specifier").is_some() {
        let converter = caps
          .name("converter")
          .and_then(|m| m.as_str().chars().next());
        if let Some(converter) = converter {
          segments.push(Segment::Specifier(PatternSpecifier {
            converter,
            padding: caps.name("padding").and_then(|m| m.as_str().parse().ok()),
            options: caps.name("options").map(|m| m.as_str().to_string()),
          }));
        }
      } else if caps.name("escaped").is_some() {
        segments.push(Segment::Literal("%".to_string()));
      }

      last_end = mat.end();
    }

    if last_end < pattern.len() {
      segments.push(Segment::Literal(pattern[last_end..].to_string()));
    }
    segments
  }

  fn format_specifier(&self, buf: &mut String, spec: &PatternSpecifier, event: &LogEvent) {
    if spec.converter == 'n' {
      buf.push('\n');
      return;
    }

    // Padding needs the finished content, so padded specifiers render into a
    // scratch buffer first.
    let mut content = String::new();
    let target_buf: &mut String = if spec.padding.is_some() { &mut content } else { buf };

    match spec.converter {
      'd' => match &spec.options {
        Some(format_str) => util::write_timestamp_with_format(target_buf, &event.timestamp, format_str),
        None => util::write_timestamp(target_buf, &event.timestamp),
      },
      'p' | 'l' => {
        let _ = write!(target_buf, "{}", event.level);
      }
      't' => target_buf.push_str(&event.target),
      'm' => {
        if let Some(msg) = &event.message {
          target_buf.push_str(msg);
        }
      }
      's' => {
        if let Some(span) = &event.span {
          target_buf.push_str(span);
        }
      }
      'T' => {
        if let Some(name) = &event.thread_name {
          target_buf.push_str(name);
        }
      }
      'X' => match &spec.options {
        Some(field_name) => {
          if let Some(value) = event.fields.get(field_name) {
            let _ = write!(target_buf, "{value}");
          }
        }
        None => {
          if !event.fields.is_empty() {
            let mut keys: Vec<_> = event.fields.keys().collect();
            keys.sort();
            let rendered: Vec<String> = keys
              .into_iter()
              .map(|key| format!("{}={}", key, event.fields[key]))
              .collect();
            let _ = write!(target_buf, "{{{}}}", rendered.join(", "));
          }
        }
      },
      _ => {}
    }

    if let Some(padding) = spec.padding {
      apply_padding(buf, &content, padding);
    }
  }
}

fn apply_padding(buf: &mut String, content: &str, padding: i32) {
  let width = padding.unsigned_abs() as usize;
  if padding > 0 {
    let _ = write!(buf, "{content:>width$}");
  } else {
    let _ = write!(buf, "{content:<width$}");
  }
}

impl EventFormatter for PatternFormatter {
  fn format_event(&self, event: &LogEvent) -> Result<Vec<u8>> {
    let mut output = String::with_capacity(256);
    for segment in &self.segments {
      match segment {
        Segment::Literal(text) => output.push_str(text),
        Segment::Specifier(spec) => self.format_specifier(&mut output, spec, event),
      }
    }
    if !output.ends_with('\n') {
      output.push('\n');
    }
    Ok(output.into_bytes())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::LogValue;
  use chrono::{TimeZone, Utc};
  use tracing::Level;

  fn gate_event() -> LogEvent {
    let mut event = LogEvent::new(
      Level::WARN,
      "campus::gate",
      "event",
      Some("admin validation denied".to_string()),
    );
    event.timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    event.thread_name = Some("worker-1".to_string());
    event.fields.insert("user_id".into(), LogValue::String("u-1".into()));
    event.fields.insert("failed".into(), LogValue::Int(2));
    event
  }

  fn render(pattern: &str, event: &LogEvent) -> String {
    String::from_utf8(PatternFormatter::new(pattern).format_event(event).unwrap()).unwrap()
  }

  #[test]
  fn default_style_pattern() {
    assert_eq!(
      render("[%d] %p %t - %m%n", &gate_event()),
      "[2024-03-01T09:30:00.000Z] WARN campus::gate - admin validation denied\n"
    );
  }

  #[test]
  fn custom_date_and_padding() {
    assert_eq!(
      render("%d{%H:%M} [%-5p] [%8T]", &gate_event()),
      "09:30 [WARN ] [worker-1]\n"
    );
    assert_eq!(render("%6p|", &gate_event()), "  WARN|\n");
  }

  #[test]
  fn fields_render_sorted_or_by_key() {
    assert_eq!(render("%X", &gate_event()), "{failed=2, user_id=u-1}\n");
    assert_eq!(render("%X{user_id} %X{absent}", &gate_event()), "u-1 \n");
  }

  #[test]
  fn escaped_percent_and_segments() {
    assert_eq!(render("100%% %p", &gate_event()), "100% WARN\n");
    let formatter = PatternFormatter::new("LITERAL %-10p AND %m");
    assert_eq!(formatter.segments.len(), 4);
    assert!(
      matches!(&formatter.segments[1], Segment::Specifier(spec) if spec.converter == 'p' && spec.padding == Some(-10))
    );
  }
}
