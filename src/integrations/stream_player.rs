use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

const SHUTDOWN_WAIT: Duration = Duration::from_millis(500);
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Local playback of the live preview stream. At most one stream is
/// attached at a time.
pub trait StreamPlayer: Send {
    /// Loads `url`, tearing down any stream attached before.
    fn attach(&mut self, url: &str) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn set_volume(&mut self, percent: u8) -> Result<()>;
    fn detach(&mut self) -> Result<()>;
    fn attached_url(&self) -> Option<&str>;
}

pub fn volume_percent_to_vlc_scale(value: u8) -> u16 {
    // VLC's RC volume uses a 0-512 scale with 256 as nominal 100%.
    ((u16::from(value.min(100)) * 256) + 50) / 100
}

pub struct VlcStreamPlayer {
    program: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    url: Option<String>,
}

impl VlcStreamPlayer {
    pub fn new() -> Self {
        Self::new_with_program("vlc")
    }

    pub fn new_with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: None,
            stdin: None,
            url: None,
        }
    }

    // Live feed: no seeking, no keyboard or mouse control, no overlays.
    const ARGS: [&'static str; 8] = [
        "--intf",
        "rc",
        "--rc-fake-tty",
        "--quiet",
        "--no-keyboard-events",
        "--no-mouse-events",
        "--no-video-title-show",
        "--no-osd",
    ];

    fn spawn(&mut self) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(Self::ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    anyhow!(
                        "failed to start preview player: '{}' not found on PATH; install VLC or set [preview] player",
                        self.program
                    )
                } else {
                    anyhow!(
                        "failed to start preview player '{} {}': {err}",
                        self.program,
                        Self::ARGS.join(" ")
                    )
                }
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("failed to capture preview player stdin"))?;
        self.stdin = Some(stdin);
        self.child = Some(child);
        Ok(())
    }

    fn child_is_running(&mut self) -> Result<bool> {
        if let Some(child) = self.child.as_mut() {
            if child
                .try_wait()
                .context("failed checking preview player status")?
                .is_none()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn send_command(&mut self, command: &str) -> Result<()> {
        if !self.child_is_running()? {
            return Err(anyhow!("preview player is not running"));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("preview player command channel unavailable"))?;

        stdin
            .write_all(format!("{command}\n").as_bytes())
            .with_context(|| {
                format!("failed writing '{command}' to preview player; it may have exited")
            })?;
        stdin
            .flush()
            .context("failed flushing preview player command stream")?;
        Ok(())
    }

    fn validate_stream_url(url: &str) -> Result<&str> {
        if url.is_empty() || url.trim() != url || url.chars().any(|ch| ch.is_ascii_control()) {
            return Err(anyhow!(
                "invalid stream URL characters detected; remove control characters and leading/trailing whitespace"
            ));
        }
        Ok(url)
    }
}

impl Default for VlcStreamPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamPlayer for VlcStreamPlayer {
    fn attach(&mut self, url: &str) -> Result<()> {
        let validated = Self::validate_stream_url(url)?.to_string();
        self.detach()?;
        self.spawn()?;
        self.send_command(&format!("enqueue {validated}"))?;
        debug!(url = %validated, "preview stream attached");
        self.url = Some(validated);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.send_command("play")
    }

    fn set_volume(&mut self, percent: u8) -> Result<()> {
        self.send_command(&format!("volume {}", volume_percent_to_vlc_scale(percent)))
    }

    fn detach(&mut self) -> Result<()> {
        self.url = None;
        if self.child.is_none() {
            return Ok(());
        }

        let _ = self.send_command("quit");
        let deadline = Instant::now() + SHUTDOWN_WAIT;
        if let Some(child) = self.child.as_mut() {
            loop {
                if child
                    .try_wait()
                    .context("failed waiting for preview player exit")?
                    .is_some()
                {
                    break;
                }
                if Instant::now() >= deadline {
                    child.kill().context("failed to force-kill preview player")?;
                    let _ = child.wait();
                    break;
                }
                thread::sleep(SHUTDOWN_POLL);
            }
        }

        self.stdin = None;
        self.child = None;
        debug!("preview stream detached");
        Ok(())
    }

    fn attached_url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl Drop for VlcStreamPlayer {
    fn drop(&mut self) {
        let _ = self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_player_binary_returns_actionable_error() {
        let mut player = VlcStreamPlayer::new_with_program("definitely-not-vlc-binary");
        let err = player
            .attach("http://127.0.0.1:5000/hls/index.m3u8")
            .expect_err("attach should fail when the binary is missing");
        assert!(err.to_string().contains("not found on PATH"));
        assert_eq!(player.attached_url(), None);
    }

    #[test]
    fn detach_without_process_is_noop() {
        let mut player = VlcStreamPlayer::new();
        player.detach().expect("detach without process");
        assert_eq!(player.attached_url(), None);
    }

    #[test]
    fn reject_stream_url_with_control_characters() {
        let err = VlcStreamPlayer::validate_stream_url("http://a\nb")
            .expect_err("newline should be rejected");
        assert!(err
            .to_string()
            .contains("invalid stream URL characters detected"));
    }

    #[test]
    fn volume_scale_maps_percent_to_vlc_units() {
        assert_eq!(volume_percent_to_vlc_scale(0), 0);
        assert_eq!(volume_percent_to_vlc_scale(50), 128);
        assert_eq!(volume_percent_to_vlc_scale(100), 256);
        assert_eq!(volume_percent_to_vlc_scale(250), 256);
    }
}
