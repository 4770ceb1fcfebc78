//! OCR collaborator adapters.
//!
//! An engine turns a cropped sub-image into an hOCR fragment in the crop's
//! own coordinates. Every call is bounded by a time budget; a timeout is a
//! recoverable per-region failure.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Interval between exit checks while an engine process runs.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One recognition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrRequest {
    /// Image to recognize
    pub image: PathBuf,
    /// Page segmentation mode; `None` uses the engine default
    pub page_seg_mode: Option<u32>,
    /// Time budget for this call
    pub timeout: Duration,
}

impl OcrRequest {
    /// A request using the engine's default page segmentation.
    pub fn new(image: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            image: image.into(),
            page_seg_mode: None,
            timeout,
        }
    }

    /// Set the page segmentation mode.
    pub fn with_page_seg_mode(mut self, psm: u32) -> Self {
        self.page_seg_mode = Some(psm);
        self
    }
}

/// Produces hOCR markup for an image.
pub trait OcrEngine: Send + Sync {
    /// Recognize the request's image and return its hOCR document.
    fn recognize(&self, request: &OcrRequest) -> Result<String>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Runs the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl TesseractEngine {
    /// Create an engine running `binary` with `language` models.
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    fn command(&self, request: &OcrRequest) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(&request.image).arg("stdout").arg("-l").arg(&self.language);
        if let Some(psm) = request.page_seg_mode {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd.arg("hocr");
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, request: &OcrRequest) -> Result<String> {
        let mut child = self
            .command(request)
            .spawn()
            .map_err(|e| Error::Ocr(format!("failed to run {}: {}", self.binary.display(), e)))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_timeout(&mut child, request.timeout, &request.image)?;
        let stdout = join_output(stdout);
        let stderr = join_output(stderr);

        if !status.success() {
            return Err(Error::Ocr(format!(
                "{} exited with {} on {}: {}",
                self.binary.display(),
                status,
                request.image.display(),
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

/// Read a pipe to its end on a helper thread so the child never blocks on a
/// full pipe while it is being polled.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_output(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    image: &Path,
) -> Result<std::process::ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait()? {
            Some(status) => return Ok(status),
            None => {
                if start.elapsed() > timeout {
                    log::warn!("OCR of {} timed out after {:?}, killing", image.display(), timeout);
                    let _ = child.kill();
                    // reap
                    let _ = child.wait();
                    return Err(Error::OcrTimeout {
                        seconds: timeout.as_secs(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let engine = TesseractEngine::new("tesseract", "deu");
        let request = OcrRequest::new("crop.png", Duration::from_secs(5)).with_page_seg_mode(6);
        let cmd = engine.command(&request);
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["crop.png", "stdout", "-l", "deu", "--psm", "6", "hocr"]);
    }

    #[test]
    fn test_default_psm_is_omitted() {
        let engine = TesseractEngine::default();
        let request = OcrRequest::new("page.png", Duration::from_secs(5));
        let args: Vec<String> = engine
            .command(&request)
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(!args.iter().any(|a| a == "--psm"));
        assert_eq!(args.last().map(String::as_str), Some("hocr"));
    }

    #[test]
    fn test_missing_binary_is_recoverable() {
        let engine = TesseractEngine::new("/nonexistent/tesseract", "eng");
        let err = engine
            .recognize(&OcrRequest::new("crop.png", Duration::from_secs(1)))
            .unwrap_err();
        assert!(matches!(err, Error::Ocr(_)));
        assert!(err.is_recoverable());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_process() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let start = Instant::now();
        let err = wait_with_timeout(&mut child, Duration::from_millis(100), Path::new("x")).unwrap_err();
        assert!(matches!(err, Error::OcrTimeout { seconds: 0 }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
