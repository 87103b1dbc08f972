use std::error;
use std::fmt;
use std::io;
use std::os::raw::c_int;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    pub(crate) fn service_err<S: Into<String>>(msg: S) -> Self {
        Self {
            kind: ErrorKind::ServiceError,
            msg: msg.into(),
        }
    }

    pub(crate) fn os_err<S: Into<String>>(errno: i32, msg: S) -> Self {
        Self {
            kind: ErrorKind::OsError(errno),
            msg: msg.into(),
        }
    }

    // Captures `errno` of the syscall that just failed.
    pub(crate) fn last_os_err<S: Into<String>>(msg: S) -> Self {
        let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
        Self::os_err(errno, msg)
    }

    pub(crate) fn to_err<T>(self) -> Result<T> {
        Err(self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::ServiceError => write!(f, "port service error: {}.", self.msg),
            ErrorKind::OsError(errno) => write!(
                f,
                "os error (error number {}: {}): {}.",
                errno,
                errno_str(*errno),
                self.msg
            ),
        }
    }
}

impl error::Error for Error {}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    ServiceError,
    OsError(c_int),
}

fn errno_str(errno: i32) -> &'static str {
    match errno {
        libc::EPERM => "operation not permitted",
        libc::ENODEV => "no such device",
        libc::ENXIO => "no such device or address",
        libc::ENOTSUP => "operation not supported",
        libc::EBUSY => "device or resource busy",
        libc::EINVAL => "invalid argument",
        libc::ENOMEM => "out of memory",
        libc::EACCES => "permission denied",
        _ => "unknown error number",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_errno_description() {
        let err = Error::os_err(libc::EPERM, "fail to open packet socket");
        assert_eq!(err.kind(), ErrorKind::OsError(libc::EPERM));
        assert_eq!(
            err.to_string(),
            "os error (error number 1: operation not permitted): fail to open packet socket."
        );

        let err = Error::service_err("rx queue is in use");
        assert_eq!(err.kind(), ErrorKind::ServiceError);
        assert_eq!(err.msg(), "rx queue is in use");
        assert_eq!(err.to_string(), "port service error: rx queue is in use.");
    }

    #[test]
    fn unknown_errno() {
        let err = Error::os_err(9999, "boom");
        assert!(err.to_string().contains("unknown error number"));
    }
}
