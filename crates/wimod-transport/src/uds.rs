use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::LinkStream;

/// Unix domain socket endpoint for byte links.
///
/// Real modules sit behind a serial port, but a pty bridge (`socat`) or the
/// bundled module emulator expose the same byte stream on a socket path.
pub struct UnixLinkListener {
    listener: UnixListener,
    path: PathBuf,
    /// Device and inode of the socket file this listener created.
    created_inode: (u64, u64),
}

impl UnixLinkListener {
    /// Maximum socket path length (`sockaddr_un.sun_path`).
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen on a filesystem-path socket.
    ///
    /// A stale socket at `path` is removed first; any other kind of file is
    /// left alone and reported as a bind error.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let len = path.as_os_str().len();
        if len >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len,
                max: Self::MAX_PATH_LEN,
            });
        }

        let bind_err = |source: std::io::Error| TransportError::Bind {
            path: path.clone(),
            source,
        };

        if let Ok(metadata) = std::fs::symlink_metadata(&path) {
            if !metadata.file_type().is_socket() {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "existing path is not a unix socket",
                )));
            }
            debug!(?path, "removing stale socket");
            std::fs::remove_file(&path).map_err(bind_err)?;
        }

        let listener = UnixListener::bind(&path).map_err(bind_err)?;
        let created = std::fs::symlink_metadata(&path).map_err(bind_err)?;

        info!(?path, "listening for link connections");

        Ok(Self {
            listener,
            created_inode: (created.dev(), created.ino()),
            path,
        })
    }

    /// Accept an incoming link (blocking).
    pub fn accept(&self) -> Result<LinkStream> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(path = ?self.path, "accepted link connection");
        Ok(LinkStream::from_unix(stream))
    }

    /// Connect to a listening socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<LinkStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|source| TransportError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "connected to link socket");
        Ok(LinkStream::from_unix(stream))
    }

    /// The path this listener is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UnixLinkListener {
    fn drop(&mut self) {
        let (dev, ino) = self.created_inode;
        match std::fs::symlink_metadata(&self.path) {
            Ok(metadata)
                if metadata.file_type().is_socket()
                    && metadata.dev() == dev
                    && metadata.ino() == ino =>
            {
                debug!(path = ?self.path, "removing socket file");
                let _ = std::fs::remove_file(&self.path);
            }
            Ok(_) => debug!(path = ?self.path, "socket path replaced; skipping cleanup"),
            Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wimod-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bind_accept_connect() {
        let dir = temp_dir("uds-accept");
        let sock_path = dir.join("link.sock");

        let listener = UnixLinkListener::bind(&sock_path).unwrap();
        assert!(sock_path.exists());

        let path_clone = sock_path.clone();
        let handle = std::thread::spawn(move || {
            let mut host = UnixLinkListener::connect(&path_clone).unwrap();
            host.write_all(&[0xC0, 0x01, 0x01, 0x16, 0x07, 0xC0]).unwrap();
        });

        let mut module = listener.accept().unwrap();
        let mut buf = [0u8; 6];
        module.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xC0, 0x01, 0x01, 0x16, 0x07, 0xC0]);

        handle.join().unwrap();

        drop(listener);
        assert!(!sock_path.exists(), "socket file should be removed on drop");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn path_too_long() {
        let long_path = "/tmp/".to_string() + &"w".repeat(200) + ".sock";
        let result = UnixLinkListener::bind(&long_path);
        assert!(matches!(result, Err(TransportError::PathTooLong { .. })));
    }

    #[test]
    fn bind_refuses_regular_file() {
        let dir = temp_dir("uds-regular");
        let sock_path = dir.join("not-a-socket");
        std::fs::write(&sock_path, b"data").unwrap();

        let result = UnixLinkListener::bind(&sock_path);
        assert!(matches!(result, Err(TransportError::Bind { .. })));
        assert!(sock_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bind_replaces_stale_socket() {
        let dir = temp_dir("uds-stale");
        let sock_path = dir.join("stale.sock");

        let first = UnixListener::bind(&sock_path).unwrap();
        drop(first);
        assert!(sock_path.exists());

        let listener = UnixLinkListener::bind(&sock_path).unwrap();
        assert_eq!(listener.path(), sock_path.as_path());

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn drop_spares_replaced_socket_path() {
        let dir = temp_dir("uds-replaced");
        let sock_path = dir.join("link.sock");

        let listener = UnixLinkListener::bind(&sock_path).unwrap();
        std::fs::remove_file(&sock_path).unwrap();
        std::fs::write(&sock_path, b"someone else").unwrap();

        drop(listener);
        assert_eq!(std::fs::read(&sock_path).unwrap(), b"someone else");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn connect_to_missing_socket_fails() {
        let result = UnixLinkListener::connect("/tmp/wimod-definitely-missing.sock");
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }
}
