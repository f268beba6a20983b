use jiff::{SignedDuration, Span, SpanRelativeTo};

/// Accepts `"1.5s"`, `"500ms"`, `"PT2M"`, `"2 minutes"` or a plain number
/// of seconds.
pub fn parse_duration(input: &str) -> Result<SignedDuration, String> {
    if let Ok(duration) = input.parse::<SignedDuration>() {
        return Ok(duration);
    }

    if let Ok(duration) = input
        .parse::<Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Ok(duration);
    }

    if let Ok(seconds) = input.parse::<f64>()
        && seconds >= 0.0
        && let Ok(duration) = SignedDuration::try_from_secs_f64(seconds)
    {
        return Ok(duration);
    }

    Err(format!("invalid duration: {input}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("2s"), Ok(SignedDuration::from_secs(2)));
        assert_eq!(parse_duration("500ms"), Ok(SignedDuration::from_millis(500)));
        assert_eq!(parse_duration("PT1M"), Ok(SignedDuration::from_secs(60)));
        assert_eq!(parse_duration("0.25"), Ok(SignedDuration::from_millis(250)));
        assert!(parse_duration("-3").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
