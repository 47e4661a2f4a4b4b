//! Line-delimited JSON frames.
//!
//! Each non-blank line is one [`Frame`]:
//!
//! ```json
//! {"timestampMs": 1200, "hands": [[{"x": 0.5, "y": 0.9}, ...21 points]]}
//! ```
//!
//! `z` is optional on every point and `hands` may be omitted for an empty
//! frame. A line that fails to parse (bad JSON or invalid UTF-8) is reported
//! as a per-frame error. Read errors are per-frame too, until
//! [`MAX_CONSECUTIVE_READ_ERRORS`] in a row end the stream.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::{Result, SignaError};
use crate::pose::Frame;
use crate::source::PoseSource;

/// Read failures in a row after which the stream is treated as ended.
pub const MAX_CONSECUTIVE_READ_ERRORS: u32 = 3;

pub struct JsonLinesSource {
    path: Option<PathBuf>,
    reader: Option<Box<dyn BufRead + Send>>,
    line_no: usize,
    buf: Vec<u8>,
    read_errors: u32,
    ended: bool,
}

impl JsonLinesSource {
    /// Read frames from a file. The file is opened by [`PoseSource::open`].
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            reader: None,
            line_no: 0,
            buf: Vec::new(),
            read_errors: 0,
            ended: false,
        }
    }

    /// Read frames from an already-open stream (e.g. stdin).
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            path: None,
            reader: Some(Box::new(BufReader::new(reader))),
            line_no: 0,
            buf: Vec::new(),
            read_errors: 0,
            ended: false,
        }
    }

    /// Lines consumed so far, blank lines included.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

impl PoseSource for JsonLinesSource {
    fn open(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }
        let Some(path) = self.path.as_ref() else {
            return Err(SignaError::PoseSource("no input configured".into()));
        };
        let file = File::open(path).map_err(|e| {
            SignaError::PoseSource(format!("cannot open {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), "reading pose frames");
        self.reader = Some(Box::new(BufReader::new(file)));
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.ended {
            return Ok(None);
        }
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| SignaError::PoseSource("source not opened".into()))?;

        loop {
            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    debug!(lines = self.line_no, "pose stream ended");
                    self.ended = true;
                    return Ok(None);
                }
                Ok(_) => self.read_errors = 0,
                Err(e) => {
                    self.read_errors += 1;
                    if self.read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        warn!(errors = self.read_errors, "pose stream unreadable, ending: {e}");
                        self.ended = true;
                        return Ok(None);
                    }
                    return Err(e.into());
                }
            }
            self.line_no += 1;

            let line = std::str::from_utf8(&self.buf)
                .map_err(|e| SignaError::PoseDecode(format!("line {}: {e}", self.line_no)))?
                .trim();
            if line.is_empty() {
                continue;
            }
            return serde_json::from_str::<Frame>(line)
                .map(Some)
                .map_err(|e| SignaError::PoseDecode(format!("line {}: {e}", self.line_no)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::synth;
    use std::io::Cursor;

    fn frame_line(ts: u64, hands: usize) -> String {
        let frame = Frame::with_hands(Some(ts), vec![synth::space_pose(); hands]);
        serde_json::to_string(&frame).expect("serialize frame")
    }

    #[test]
    fn reads_frames_and_skips_blank_lines() {
        let input = format!("{}\n\n   \n{}\n", frame_line(0, 1), frame_line(33, 2));
        let mut source = JsonLinesSource::from_reader(Cursor::new(input));
        source.open().expect("open");

        let first = source.next_frame().expect("frame").expect("some");
        assert_eq!(first.timestamp_ms, Some(0));
        assert_eq!(first.hands.len(), 1);

        let second = source.next_frame().expect("frame").expect("some");
        assert_eq!(second.timestamp_ms, Some(33));
        assert_eq!(second.hands.len(), 2);

        assert!(source.next_frame().expect("eof").is_none());
        assert_eq!(source.lines_read(), 4);
    }

    #[test]
    fn malformed_line_is_a_frame_error_not_the_end() {
        let input = format!("{{\"hands\": [[]]}}\nnot json\n{}\n", frame_line(5, 0));
        let mut source = JsonLinesSource::from_reader(Cursor::new(input));

        let err = source.next_frame().expect_err("wrong landmark count");
        assert!(matches!(err, SignaError::PoseDecode(ref m) if m.starts_with("line 1")));
        let err = source.next_frame().expect_err("not json");
        assert!(matches!(err, SignaError::PoseDecode(ref m) if m.starts_with("line 2")));

        let frame = source.next_frame().expect("frame").expect("some");
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn frame_without_hands_field_is_empty() {
        let mut source = JsonLinesSource::from_reader(Cursor::new("{\"timestampMs\": 7}\n"));
        let frame = source.next_frame().expect("frame").expect("some");
        assert_eq!(frame, Frame::empty(Some(7)));
    }

    #[test]
    fn invalid_utf8_line_keeps_line_numbers() {
        let mut input = b"\xff\xfe\n".to_vec();
        input.extend_from_slice(b"not json\n");
        input.extend_from_slice(frame_line(9, 1).as_bytes());
        let mut source = JsonLinesSource::from_reader(Cursor::new(input));

        let err = source.next_frame().expect_err("invalid utf-8");
        assert!(matches!(err, SignaError::PoseDecode(ref m) if m.starts_with("line 1")));
        let err = source.next_frame().expect_err("not json");
        assert!(matches!(err, SignaError::PoseDecode(ref m) if m.starts_with("line 2")));
        let frame = source.next_frame().expect("frame").expect("some");
        assert_eq!(frame.timestamp_ms, Some(9));
        assert_eq!(source.lines_read(), 3);
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device gone"))
        }
    }

    #[test]
    fn repeated_read_errors_end_the_stream() {
        let mut source = JsonLinesSource::from_reader(BrokenReader);
        for _ in 1..MAX_CONSECUTIVE_READ_ERRORS {
            assert!(matches!(source.next_frame(), Err(SignaError::Io(_))));
        }
        assert!(source.next_frame().expect("ended").is_none());
        assert!(source.next_frame().expect("still ended").is_none());
        assert_eq!(source.lines_read(), 0);
    }

    #[test]
    fn missing_file_fails_open() {
        let mut source = JsonLinesSource::from_path("/nonexistent/signa/frames.jsonl");
        assert!(matches!(source.open(), Err(SignaError::PoseSource(_))));
    }
}
