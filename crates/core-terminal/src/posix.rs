//! Raw-mode parser over the process's stdin.
//!
//! Raw mode here turns off canonical input, echo and signal keys but keeps
//! output post-processing, so a written `\n` still returns the carriage.

use std::io;
use std::mem::MaybeUninit;
use std::os::fd::RawFd;
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};
use core_events::{MAX_READ_BYTES, WinSize};
use crossterm::terminal::size;
use tracing::{debug, trace};

use crate::ConsoleParser;

pub struct PosixParser {
    fd: RawFd,
    // Terminal settings saved by `setup`; `Some` while raw mode is active.
    original: Mutex<Option<libc::termios>>,
}

fn get_termios(fd: RawFd) -> io::Result<libc::termios> {
    let mut t = MaybeUninit::<libc::termios>::uninit();
    if unsafe { libc::tcgetattr(fd, t.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { t.assume_init() })
}

fn set_termios(fd: RawFd, t: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, t) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn make_raw(mut t: libc::termios) -> libc::termios {
    t.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON);
    t.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG | libc::ECHONL);
    t.c_cflag &= !(libc::CSIZE | libc::PARENB);
    t.c_cflag |= libc::CS8;
    t.c_cc[libc::VMIN] = 1;
    t.c_cc[libc::VTIME] = 0;
    t
}

impl Default for PosixParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PosixParser {
    pub fn new() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
            original: Mutex::new(None),
        }
    }

    fn poll_ready(&self) -> io::Result<bool> {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, 0)
        };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        Ok(ready > 0)
    }
}

impl ConsoleParser for PosixParser {
    fn setup(&self) -> Result<()> {
        let mut original = self
            .original
            .lock()
            .map_err(|_| anyhow!("terminal state lock poisoned"))?;
        if original.is_none() {
            let saved = get_termios(self.fd)?;
            set_termios(self.fd, &make_raw(saved))?;
            *original = Some(saved);
            debug!(target: "terminal", "raw_mode_enter");
        }
        Ok(())
    }

    fn tear_down(&self) -> Result<()> {
        let mut original = self
            .original
            .lock()
            .map_err(|_| anyhow!("terminal state lock poisoned"))?;
        if let Some(saved) = original.take() {
            set_termios(self.fd, &saved)?;
            debug!(target: "terminal", "raw_mode_leave");
        }
        Ok(())
    }

    fn get_win_size(&self) -> Result<WinSize> {
        let (cols, rows) = size()?;
        Ok(WinSize::new(rows, cols))
    }

    fn read(&self) -> Result<Vec<u8>> {
        if !self.poll_ready()? {
            return Ok(Vec::new());
        }
        let mut buf = [0u8; MAX_READ_BYTES];
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(Vec::new()),
                _ => Err(err.into()),
            };
        }
        if n == 0 {
            bail!("stdin closed");
        }
        #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
        let chunk = buf[..n as usize].to_vec();
        trace!(target: "terminal", len = chunk.len(), "read");
        Ok(chunk)
    }
}

impl Drop for PosixParser {
    fn drop(&mut self) {
        let _ = self.tear_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed() -> libc::termios {
        unsafe { MaybeUninit::<libc::termios>::zeroed().assume_init() }
    }

    #[test]
    fn raw_flags_keep_output_processing() {
        let mut t = zeroed();
        t.c_iflag = libc::ICRNL | libc::IXON;
        t.c_oflag = libc::OPOST;
        t.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG;
        let raw = make_raw(t);
        assert_eq!(raw.c_iflag & (libc::ICRNL | libc::IXON), 0);
        assert_eq!(raw.c_lflag & (libc::ECHO | libc::ICANON | libc::ISIG), 0);
        assert_eq!(raw.c_oflag & libc::OPOST, libc::OPOST);
        assert_eq!(raw.c_cflag & libc::CS8, libc::CS8);
        assert_eq!(raw.c_cc[libc::VMIN], 1);
    }

    #[test]
    fn tear_down_without_setup_is_noop() {
        let p = PosixParser::new();
        assert!(p.tear_down().is_ok());
        assert!(p.tear_down().is_ok());
    }
}
