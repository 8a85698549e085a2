use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::StreamTransport;

/// Factory default baud rate of XBee modules.
pub const DEFAULT_BAUD: u32 = 9600;

/// Serial line settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Line speed in bits per second.
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { baud: DEFAULT_BAUD }
    }
}

/// A tty device opened non-blocking in raw 8N1 mode.
pub struct SerialPort;

impl SerialPort {
    /// Open `path` with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<StreamTransport<File>> {
        Self::open_with_config(path, SerialConfig::default())
    }

    /// Open `path` and configure raw mode at the requested baud rate.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: SerialConfig,
    ) -> Result<StreamTransport<File>> {
        let path = path.as_ref().to_path_buf();
        let speed = baud_constant(config.baud)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        configure_raw(&file, speed).map_err(|source| TransportError::Open {
            path: path.clone(),
            source,
        })?;

        info!(?path, baud = config.baud, "opened serial device");
        Ok(StreamTransport::new(file))
    }
}

fn configure_raw(file: &File, speed: libc::speed_t) -> std::io::Result<()> {
    let fd = file.as_raw_fd();

    // SAFETY: `termios` is plain data; it is fully initialised by tcgetattr
    // before any field is read.
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open descriptor owned by `file` and `tio` is a valid
    // writable termios struct for the duration of every call below.
    unsafe {
        if libc::tcgetattr(fd, &mut tio) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        libc::cfmakeraw(&mut tio);
        tio.c_cflag |= libc::CLOCAL | libc::CREAD;
        // VMIN must stay 1: with 0 an idle tty reads 0 bytes (EOF) instead of
        // EAGAIN, even under O_NONBLOCK.
        tio.c_cc[libc::VMIN] = 1;
        tio.c_cc[libc::VTIME] = 0;
        if libc::cfsetispeed(&mut tio, speed) != 0 || libc::cfsetospeed(&mut tio, speed) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::tcsetattr(fd, libc::TCSANOW, &tio) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        libc::tcflush(fd, libc::TCIOFLUSH);
    }

    debug!(fd, "serial line set to raw mode");
    Ok(())
}

fn baud_constant(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        other => return Err(TransportError::UnsupportedBaud(other)),
    };
    Ok(speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xbee_baud_rates_are_supported() {
        for baud in [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200] {
            assert!(baud_constant(baud).is_ok(), "{baud} should map");
        }
    }

    #[test]
    fn odd_baud_rate_rejected() {
        let err = baud_constant(12345).unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedBaud(12345)));
    }

    #[test]
    fn open_missing_device_reports_path() {
        let path = std::env::temp_dir().join(format!(
            "xbeeprims-missing-tty-{}",
            std::process::id()
        ));
        let err = SerialPort::open(&path).unwrap_err();
        match err {
            TransportError::Open { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn regular_file_is_not_a_tty() {
        let path = std::env::temp_dir().join(format!(
            "xbeeprims-not-a-tty-{}",
            std::process::id()
        ));
        std::fs::write(&path, b"").unwrap();
        let err = SerialPort::open(&path).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
        let _ = std::fs::remove_file(&path);
    }

    /// Open a pseudo-terminal and return the master side plus the slave path.
    fn open_pty() -> (File, std::path::PathBuf) {
        use std::ffi::CStr;
        use std::os::fd::FromRawFd;
        use std::os::unix::ffi::OsStrExt;

        // SAFETY: plain libc calls on a descriptor we own; `ptsname` returns a
        // NUL-terminated string that is copied before any further pty call.
        unsafe {
            let fd = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
            assert!(fd >= 0, "posix_openpt failed");
            assert_eq!(libc::grantpt(fd), 0);
            assert_eq!(libc::unlockpt(fd), 0);
            let name = libc::ptsname(fd);
            assert!(!name.is_null(), "ptsname failed");
            let path = std::ffi::OsStr::from_bytes(CStr::from_ptr(name).to_bytes()).into();
            (File::from_raw_fd(fd), path)
        }
    }

    #[test]
    fn idle_line_reads_nothing_instead_of_closing() {
        use crate::traits::ByteTransport;

        let (_master, slave) = open_pty();
        let mut port = SerialPort::open(&slave).unwrap();

        for _ in 0..3 {
            assert!(matches!(port.read_byte(), Ok(None)));
        }
    }

    #[test]
    fn bytes_from_the_line_arrive_after_idle_reads() {
        use std::io::Write;

        use crate::traits::ByteTransport;

        let (mut master, slave) = open_pty();
        let mut port = SerialPort::open(&slave).unwrap();
        assert!(matches!(port.read_byte(), Ok(None)));

        master.write_all(&[0x7E, 0x00]).unwrap();
        master.flush().unwrap();

        let mut received = Vec::new();
        for _ in 0..200 {
            match port.read_byte().unwrap() {
                Some(byte) => received.push(byte),
                None if received.len() == 2 => break,
                None => std::thread::sleep(std::time::Duration::from_millis(5)),
            }
        }
        assert_eq!(received, vec![0x7E, 0x00]);
    }

    #[test]
    fn default_config_is_factory_baud() {
        assert_eq!(SerialConfig::default().baud, DEFAULT_BAUD);
    }
}
