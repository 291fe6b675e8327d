//! Alert channel — the pollable wakeup bridge from worker threads to a
//! poll-based main loop.
//!
//! On Linux this is an eventfd created with `EFD_NONBLOCK | EFD_CLOEXEC`;
//! on other unix it is a nonblocking pipe pair. Either way the readable
//! end can be registered with select/poll/epoll, and writes coalesce:
//! any number of `notify()` calls before the consumer drains produce one
//! readable condition.
//!
//! The channel carries no data. It only means "go look at the reply
//! queue"; the consumer drains the logical queue, not the byte stream.

use std::io;
use std::os::unix::io::RawFd;

use workqueue_core::error::{QueueError, QueueResult};
use workqueue_core::notifier::Notifier;

pub struct AlertChannel {
    read_fd: RawFd,
    write_fd: RawFd,
}

#[inline]
fn last_errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        fn create_pair() -> QueueResult<(RawFd, RawFd)> {
            let fd = unsafe { libc::eventfd(0, libc::EFD_NONBLOCK | libc::EFD_CLOEXEC) };
            if fd < 0 {
                return Err(QueueError::AlertSetup(last_errno()));
            }
            // One fd serves both ends.
            Ok((fd, fd))
        }

        /// One wakeup token: bump the eventfd counter by 1.
        fn write_token(fd: RawFd) -> Result<(), i32> {
            let val: u64 = 1;
            loop {
                let ret = unsafe {
                    libc::write(
                        fd,
                        &val as *const u64 as *const libc::c_void,
                        std::mem::size_of::<u64>(),
                    )
                };
                if ret >= 0 {
                    return Ok(());
                }
                let errno = last_errno();
                if errno != libc::EINTR {
                    return Err(errno);
                }
            }
        }
    } else {
        fn set_nonblock_cloexec(fd: RawFd) -> QueueResult<()> {
            unsafe {
                let flags = libc::fcntl(fd, libc::F_GETFL);
                if flags < 0 || libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
                    return Err(QueueError::AlertSetup(last_errno()));
                }
                if libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) < 0 {
                    return Err(QueueError::AlertSetup(last_errno()));
                }
            }
            Ok(())
        }

        fn create_pair() -> QueueResult<(RawFd, RawFd)> {
            let mut fds = [0 as libc::c_int; 2];
            if unsafe { libc::pipe(fds.as_mut_ptr()) } < 0 {
                return Err(QueueError::AlertSetup(last_errno()));
            }
            set_nonblock_cloexec(fds[0])?;
            set_nonblock_cloexec(fds[1])?;
            Ok((fds[0], fds[1]))
        }

        /// One wakeup token: a single byte down the pipe.
        fn write_token(fd: RawFd) -> Result<(), i32> {
            let byte = 1u8;
            loop {
                let ret = unsafe {
                    libc::write(fd, &byte as *const u8 as *const libc::c_void, 1)
                };
                if ret >= 0 {
                    return Ok(());
                }
                let errno = last_errno();
                if errno != libc::EINTR {
                    return Err(errno);
                }
            }
        }
    }
}

impl AlertChannel {
    /// Create the platform's alert channel.
    pub fn new() -> QueueResult<Self> {
        let (read_fd, write_fd) = create_pair()?;
        Ok(AlertChannel { read_fd, write_fd })
    }

    /// The readable end, for registration with the main loop's poller.
    ///
    /// Level-triggered in the sense the consumer needs: the fd stays
    /// readable until `drain()` runs, and every post-drain `notify()`
    /// makes it readable again.
    #[inline]
    pub fn read_fd(&self) -> RawFd {
        self.read_fd
    }

    /// Discard all pending wakeup tokens.
    ///
    /// Safe to call when none are pending. Errors other than
    /// would-block are swallowed: the worst case is a spurious wakeup,
    /// which the consumer tolerates anyway.
    pub fn drain(&self) {
        let mut buf = [0u8; 64];
        loop {
            let ret = unsafe {
                libc::read(
                    self.read_fd,
                    buf.as_mut_ptr() as *mut libc::c_void,
                    buf.len(),
                )
            };
            if ret > 0 {
                continue;
            }
            if ret < 0 && last_errno() == libc::EINTR {
                continue;
            }
            break;
        }
    }

    /// Block up to `timeout_ms` for the readable end to become ready.
    ///
    /// Convenience for programs without their own poll loop (demos,
    /// tests). Returns true if the fd is readable. -1 blocks forever.
    pub fn wait_readable(&self, timeout_ms: i32) -> QueueResult<bool> {
        let mut pfd = libc::pollfd {
            fd: self.read_fd,
            events: libc::POLLIN,
            revents: 0,
        };
        loop {
            let n = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if n < 0 {
                let errno = last_errno();
                if errno == libc::EINTR {
                    continue;
                }
                return Err(QueueError::Os(errno));
            }
            return Ok(n > 0 && (pfd.revents & libc::POLLIN) != 0);
        }
    }
}

impl Notifier for AlertChannel {
    fn notify(&self) -> QueueResult<()> {
        match write_token(self.write_fd) {
            Ok(()) => Ok(()),
            // Full counter/buffer means a wakeup is already pending.
            Err(errno) if errno == libc::EAGAIN || errno == libc::EWOULDBLOCK => Ok(()),
            Err(errno) => Err(QueueError::AlertWrite(errno)),
        }
    }
}

impl Drop for AlertChannel {
    fn drop(&mut self) {
        unsafe {
            if self.read_fd >= 0 {
                libc::close(self.read_fd);
            }
            if self.write_fd >= 0 && self.write_fd != self.read_fd {
                libc::close(self.write_fd);
            }
        }
        self.read_fd = -1;
        self.write_fd = -1;
    }
}
