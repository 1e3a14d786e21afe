use std::io::BufRead;

use thiserror::Error;

/// One recorded measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEvent {
    pub now_ms: u64,
    pub sample: u32,
    /// Set when the recorder saw a reset (path change, reconfiguration...).
    pub forced: bool,
}

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("line {line}: timestamp {now_ms} is earlier than previous {previous_ms}")]
    NonMonotonic {
        line: usize,
        now_ms: u64,
        previous_ms: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a single trace line. Returns `Ok(None)` for blank lines and comments.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<TraceEvent>, TraceError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let parse_err = |reason: String| TraceError::Parse {
        line: line_no,
        reason,
    };

    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let now_ms = fields
        .next()
        .ok_or_else(|| parse_err("missing timestamp".into()))?;
    let now_ms: u64 = now_ms
        .parse()
        .map_err(|e| parse_err(format!("bad timestamp {now_ms:?}: {e}")))?;
    let sample = fields
        .next()
        .ok_or_else(|| parse_err("missing sample".into()))?;
    let sample: u32 = sample
        .parse()
        .map_err(|e| parse_err(format!("bad sample {sample:?}: {e}")))?;
    let forced = match fields.next() {
        None => false,
        Some("force") => true,
        Some(other) => return Err(parse_err(format!("unknown flag {other:?}"))),
    };
    if let Some(extra) = fields.next() {
        return Err(parse_err(format!("trailing field {extra:?}")));
    }

    Ok(Some(TraceEvent {
        now_ms,
        sample,
        forced,
    }))
}

/// Reads a whole trace, rejecting timestamps that go backwards.
pub fn read_trace(reader: impl BufRead) -> Result<Vec<TraceEvent>, TraceError> {
    let mut events: Vec<TraceEvent> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let Some(event) = parse_line(line_no, &line?)? else {
            continue;
        };
        if let Some(previous) = events.last() {
            if event.now_ms < previous.now_ms {
                return Err(TraceError::NonMonotonic {
                    line: line_no,
                    now_ms: event.now_ms,
                    previous_ms: previous.now_ms,
                });
            }
        }
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_forced_lines() {
        assert_eq!(
            parse_line(1, "100 2500").unwrap(),
            Some(TraceEvent {
                now_ms: 100,
                sample: 2500,
                forced: false
            })
        );
        assert_eq!(
            parse_line(2, " 200, 80 ,force").unwrap(),
            Some(TraceEvent {
                now_ms: 200,
                sample: 80,
                forced: true
            })
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line(1, "").unwrap(), None);
        assert_eq!(parse_line(2, "   ").unwrap(), None);
        assert_eq!(parse_line(3, "# now_ms sample").unwrap(), None);
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_line(7, "100 lots").unwrap_err();
        assert!(matches!(err, TraceError::Parse { line: 7, .. }));
        assert!(err.to_string().starts_with("line 7:"));

        assert!(matches!(
            parse_line(3, "100").unwrap_err(),
            TraceError::Parse { line: 3, .. }
        ));
        assert!(matches!(
            parse_line(4, "100 5 reset").unwrap_err(),
            TraceError::Parse { line: 4, .. }
        ));
        assert!(matches!(
            parse_line(5, "100 5 force 6").unwrap_err(),
            TraceError::Parse { line: 5, .. }
        ));
    }

    #[test]
    fn rejects_negative_sample() {
        assert!(parse_line(1, "100 -5").is_err());
    }

    #[test]
    fn reads_whole_trace() {
        let input = "# header\n0 100\n\n500 40\n2600,40\n2700 90 force\n";
        let events = read_trace(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[2].now_ms, 2600);
        assert!(events[3].forced);
    }

    #[test]
    fn rejects_backwards_timestamps() {
        let input = "0 100\n500 40\n400 40\n";
        match read_trace(input.as_bytes()) {
            Err(TraceError::NonMonotonic {
                line,
                now_ms,
                previous_ms,
            }) => {
                assert_eq!(line, 3);
                assert_eq!(now_ms, 400);
                assert_eq!(previous_ms, 500);
            }
            other => panic!("expected NonMonotonic, got {other:?}"),
        }
    }

    #[test]
    fn equal_timestamps_are_fine() {
        let events = read_trace("10 1\n10 2\n".as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
    }
}
