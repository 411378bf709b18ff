use std::time::{Duration, Instant};

/// Holds back the latest search text until input has been quiet for the
/// configured interval.
#[derive(Debug, Clone)]
pub struct Debouncer {
  interval: Duration,
  pending: Option<(String, Instant)>,
}

impl Debouncer {
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      pending: None,
    }
  }

  /// Schedule `text`, replacing anything pending.
  ///
  /// With a zero interval the text is returned for immediate use.
  pub fn schedule(&mut self, text: String, now: Instant) -> Option<String> {
    if self.interval.is_zero() {
      self.pending = None;
      return Some(text);
    }
    self.pending = Some((text, now + self.interval));
    None
  }

  /// Take the pending text once its deadline has passed
  pub fn poll(&mut self, now: Instant) -> Option<String> {
    match &self.pending {
      Some((_, due)) if *due <= now => self.pending.take().map(|(text, _)| text),
      _ => None,
    }
  }

  pub fn cancel(&mut self) {
    self.pending = None;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fires_after_quiet_interval() {
    let mut d = Debouncer::new(Duration::from_millis(150));
    let t0 = Instant::now();

    assert_eq!(d.schedule("a".into(), t0), None);
    assert_eq!(d.schedule("ab".into(), t0 + Duration::from_millis(100)), None);
    // first deadline would have passed, but the second keystroke moved it
    assert_eq!(d.poll(t0 + Duration::from_millis(200)), None);
    assert_eq!(
      d.poll(t0 + Duration::from_millis(250)),
      Some("ab".to_string())
    );
    // taken once
    assert_eq!(d.poll(t0 + Duration::from_millis(300)), None);
  }

  #[test]
  fn test_zero_interval_is_immediate() {
    let mut d = Debouncer::new(Duration::ZERO);
    let now = Instant::now();
    assert_eq!(d.schedule("x".into(), now), Some("x".to_string()));
    assert_eq!(d.poll(now), None);
  }

  #[test]
  fn test_cancel_drops_pending_text() {
    let mut d = Debouncer::new(Duration::from_secs(10));
    let now = Instant::now();
    d.schedule("abc".into(), now);
    d.cancel();
    assert_eq!(d.poll(now + Duration::from_secs(20)), None);
  }
}
