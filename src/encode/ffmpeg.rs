use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};

use crate::encode::sink::{SinkConfig, VideoSink};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{QrfeedError, QrfeedResult};
use crate::render::frame::Frame;

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Executable to spawn; `ffmpeg` resolves through `PATH`.
    pub ffmpeg: PathBuf,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    written: u64,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            written: 0,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn build_command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Input: raw packed 8-bit frames in the renderer's channel order.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            cfg.pixel_order.ffmpeg_pix_fmt(),
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            &cfg.codec.encoder,
        ]);
        if let Some(tag) = cfg.codec.fourcc.as_deref() {
            cmd.args(["-tag:v", tag]);
        }
        cmd.args(["-pix_fmt", &cfg.codec.pix_fmt]);
        if cfg.codec.bitexact {
            cmd.args([
                "-threads",
                "1",
                "-fflags",
                "+bitexact",
                "-flags:v",
                "+bitexact",
                "-map_metadata",
                "-1",
            ]);
        }
        cmd.args(["-f", &cfg.codec.container]);
        cmd.arg(&self.opts.out_path);
        cmd
    }

    /// Close stdin, reap the child and collect everything it wrote to stderr.
    fn reap(&mut self) -> QrfeedResult<(ExitStatus, String)> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| QrfeedError::validation("ffmpeg sink not opened"))?;

        let status = child
            .wait()
            .map_err(|e| QrfeedError::sink_io("failed to wait for ffmpeg to finish", e))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| QrfeedError::validation("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| QrfeedError::sink_io("ffmpeg stderr read failed", e))?,
            None => Vec::new(),
        };
        let stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_owned();
        Ok((status, stderr))
    }
}

impl VideoSink for FfmpegSink {
    fn open(&mut self, cfg: SinkConfig) -> QrfeedResult<()> {
        if self.child.is_some() {
            return Err(QrfeedError::validation("ffmpeg sink is already open"));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(QrfeedError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(QrfeedError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(QrfeedError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let mut child = self
            .build_command(&cfg)
            .spawn()
            .map_err(|e| QrfeedError::sink_io("failed to spawn ffmpeg (is it on PATH?)", e))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| QrfeedError::validation("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| QrfeedError::validation("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            path = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = %cfg.fps,
            encoder = %cfg.codec.encoder,
            "spawned ffmpeg"
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> QrfeedResult<FrameIndex> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| QrfeedError::validation("ffmpeg sink not opened"))?;
        cfg.check_frame(frame)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(QrfeedError::validation("ffmpeg sink is already finalized"));
        };
        if let Err(e) = stdin.write_all(&frame.data) {
            // A broken pipe means ffmpeg already quit; its stderr says why.
            let (status, stderr) = self.reap()?;
            let source = if stderr.is_empty() {
                e
            } else {
                std::io::Error::new(e.kind(), format!("{e}; ffmpeg stderr: {stderr}"))
            };
            return Err(QrfeedError::sink_io(
                format!(
                    "failed to write frame {} to ffmpeg stdin (ffmpeg exited with status {status})",
                    self.written
                ),
                source,
            ));
        }

        let idx = FrameIndex(self.written);
        self.written += 1;
        Ok(idx)
    }

    fn close(&mut self) -> QrfeedResult<()> {
        let (status, stderr) = self.reap()?;
        if !status.success() {
            return Err(QrfeedError::sink_io(
                format!("ffmpeg exited with status {status}"),
                std::io::Error::other(stderr),
            ));
        }

        tracing::debug!(frames = self.written, "ffmpeg finalized output");
        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        tracing::warn!(
            path = %self.opts.out_path.display(),
            frames = self.written,
            "ffmpeg sink dropped without close; output is incomplete"
        );
        drop(self.stdin.take());
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> QrfeedResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            QrfeedError::sink_io(
                format!("failed to create output directory '{}'", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn command_streams_bgr24_at_configured_rate() {
        let sink = FfmpegSink::new(FfmpegSinkOpts::new("out/game.avi"));
        let cfg = SinkConfig::from_pipeline(&PipelineConfig::default());
        let args = args_of(&sink.build_command(&cfg));
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pix_fmt bgr24 -s 154x154 -r 30/1 -i pipe:0"));
        assert!(joined.contains("-c:v mpeg4 -tag:v XVID -pix_fmt yuv420p"));
        assert!(joined.contains("+bitexact"));
        assert_eq!(args.first().map(String::as_str), Some("-y"));
        assert_eq!(args.last().map(String::as_str), Some("out/game.avi"));
        assert_eq!(sink.build_command(&cfg).get_program(), "ffmpeg");
    }

    #[test]
    fn command_runs_configured_executable() {
        let mut opts = FfmpegSinkOpts::new("x.avi");
        opts.ffmpeg = PathBuf::from("/opt/ffmpeg/bin/ffmpeg");
        let sink = FfmpegSink::new(opts);
        let cfg = SinkConfig::from_pipeline(&PipelineConfig::default());
        assert_eq!(
            sink.build_command(&cfg).get_program(),
            "/opt/ffmpeg/bin/ffmpeg"
        );
    }

    #[test]
    fn command_omits_optional_flags() {
        let mut opts = FfmpegSinkOpts::new("x.mp4");
        opts.overwrite = false;
        let sink = FfmpegSink::new(opts);
        let mut cfg = SinkConfig::from_pipeline(&PipelineConfig::default());
        cfg.codec.fourcc = None;
        cfg.codec.bitexact = false;
        let args = args_of(&sink.build_command(&cfg));
        assert_eq!(args[0], "-n");
        assert!(!args.iter().any(|a| a == "-tag:v"));
        assert!(!args.iter().any(|a| a.contains("bitexact")));
    }

    #[test]
    fn write_before_open_fails() {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("never.avi"));
        let frame = Frame {
            width: 154,
            height: 154,
            order: crate::render::frame::PixelOrder::Bgr,
            data: vec![0; 154 * 154 * 3],
        };
        assert!(sink.write(&frame).is_err());
        assert!(sink.close().is_err());
    }
}
