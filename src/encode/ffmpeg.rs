use std::io::{Read, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::thread::JoinHandle;

use crate::encode::sink::{ChunkReceiver, EncoderConfig, MediaEncoder};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

/// Size of each stdout read forwarded as one chunk.
const STDOUT_CHUNK_BYTES: usize = 64 * 1024;

/// Options for [`WebmEncoder`].
#[derive(Clone, Debug)]
pub struct WebmEncoderOpts {
    /// VP9 constant quality (0..=63, lower is better).
    pub crf: u8,
    /// libvpx `-cpu-used` speed preset.
    pub cpu_used: u8,
    /// Opus bitrate in kbit/s.
    pub audio_kbps: u32,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Default for WebmEncoderOpts {
    fn default() -> Self {
        Self {
            crf: 32,
            cpu_used: 8,
            audio_kbps: 128,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

type DrainHandle = JoinHandle<std::io::Result<Vec<u8>>>;

/// Encoder that spawns the system `ffmpeg`, streams raw frames to stdin and forwards the WebM
/// (VP9 video, Opus audio) written to stdout as chunks.
pub struct WebmEncoder {
    opts: WebmEncoderOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_reader: Option<JoinHandle<std::io::Result<u64>>>,
    stderr_drain: Option<DrainHandle>,

    scratch: Vec<u8>,
    cfg: Option<EncoderConfig>,
    last_idx: Option<FrameIndex>,
}

impl std::fmt::Debug for WebmEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebmEncoder")
            .field("opts", &self.opts)
            .field("running", &self.child.is_some())
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl Default for WebmEncoder {
    fn default() -> Self {
        Self::new(WebmEncoderOpts::default())
    }
}

impl WebmEncoder {
    pub fn new(opts: WebmEncoderOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_reader: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn command(&self, cfg: &EncoderConfig) -> StudioResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, flattened to opaque in push_frame.
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(StudioError::validation(
                    "audio sample_rate and channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path);
        }

        // yuv420p needs even dimensions; pad odd sizes by one pixel.
        cmd.args([
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-c:v",
            "libvpx-vp9",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            "0",
            "-crf",
            &self.opts.crf.min(63).to_string(),
            "-deadline",
            "realtime",
            "-cpu-used",
            &self.opts.cpu_used.to_string(),
            "-row-mt",
            "1",
        ]);
        if cfg.audio.is_some() {
            cmd.args([
                "-c:a",
                "libopus",
                "-b:a",
                &format!("{}k", self.opts.audio_kbps),
                "-shortest",
            ]);
        } else {
            cmd.arg("-an");
        }
        cmd.args(["-f", "webm", "pipe:1"]);
        Ok(cmd)
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill()
                && e.kind() != std::io::ErrorKind::InvalidInput
            {
                tracing::warn!(error = %e, "failed to kill ffmpeg");
            }
            let _ = child.wait();
        }
        // Both pipes are closed now, so the reader threads terminate.
        if let Some(h) = self.stdout_reader.take() {
            let _ = h.join();
        }
        if let Some(h) = self.stderr_drain.take() {
            let _ = h.join();
        }
    }
}

impl MediaEncoder for WebmEncoder {
    fn start(&mut self, cfg: EncoderConfig) -> StudioResult<ChunkReceiver> {
        if self.child.is_some() {
            return Err(StudioError::encode("webm encoder already started"));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(StudioError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(StudioError::validation(
                "webm encoder width/height must be non-zero",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(StudioError::encode(
                "ffmpeg is required for WebM encoding, but was not found on PATH",
            ));
        }

        let mut child = self.command(&cfg)?.spawn().map_err(|e| {
            StudioError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (Some(stdin), Some(mut stdout), Some(mut stderr)) = (stdin, stdout, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(StudioError::encode("failed to open ffmpeg pipes (unexpected)"));
        };

        let (tx, rx) = mpsc::channel();
        let stdout_reader = std::thread::spawn(move || {
            let mut total = 0u64;
            let mut buf = vec![0u8; STDOUT_CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(total);
                }
                total += n as u64;
                // A dropped receiver still needs the pipe drained so ffmpeg never blocks.
                let _ = tx.send(buf[..n].to_vec());
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            audio = cfg.audio.is_some(),
            "spawned ffmpeg webm encoder"
        );
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_reader = Some(stdout_reader);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(rx)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StudioResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StudioError::encode("webm encoder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(StudioError::encode(
                "webm encoder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(StudioError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(StudioError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StudioError::encode("webm encoder is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            StudioError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn finish(&mut self) -> StudioResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| StudioError::encode("webm encoder not started"))?;

        let status = child.wait().map_err(|e| {
            StudioError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let written = match self.stdout_reader.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StudioError::encode("ffmpeg stdout reader thread panicked"))?
                .map_err(|e| StudioError::encode(format!("ffmpeg stdout read failed: {e}")))?,
            None => 0,
        };
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StudioError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| StudioError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(StudioError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::debug!(bytes = written, "ffmpeg webm encoder finished");
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        self.kill_child();
        self.cfg = None;
    }
}

impl Drop for WebmEncoder {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.kill_child();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg_rgba: [u8; 4]) -> StudioResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(StudioError::validation(
            "flatten_premul_over_bg expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StudioResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
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
