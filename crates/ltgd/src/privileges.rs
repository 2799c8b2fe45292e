//! Privilege drop for daemons started as root.
//!
//! The target user and group are resolved from the user database before
//! the daemon detaches, so a typo in the config fails on the terminal
//! instead of in the log file. The actual drop happens after the PID file
//! is acquired and before the listener binds, so no request is ever served
//! with elevated rights.

use nix::unistd::{Group, User};
use std::io;
use thiserror::Error;
use tracing::{info, warn};

/// Whether the process currently holds root privileges.
pub fn running_as_root() -> bool {
    (unsafe { libc::geteuid() }) == 0
}

/// Resolved unprivileged identity the daemon switches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetIdentity {
    uid: libc::uid_t,
    gid: libc::gid_t,
    user: String,
    group: String,
}

impl TargetIdentity {
    /// Looks up `user` and `group` in the system user database.
    pub fn resolve(user: &str, group: &str) -> Result<Self, PrivilegeError> {
        let user_entry = User::from_name(user)
            .map_err(|e| PrivilegeError::Lookup {
                what: "user",
                name: user.to_string(),
                source: e,
            })?
            .ok_or_else(|| PrivilegeError::UnknownUser {
                name: user.to_string(),
            })?;

        let group_entry = Group::from_name(group)
            .map_err(|e| PrivilegeError::Lookup {
                what: "group",
                name: group.to_string(),
                source: e,
            })?
            .ok_or_else(|| PrivilegeError::UnknownGroup {
                name: group.to_string(),
            })?;

        Ok(Self {
            uid: user_entry.uid.as_raw(),
            gid: group_entry.gid.as_raw(),
            user: user.to_string(),
            group: group.to_string(),
        })
    }

    /// Numeric user id of the target identity.
    pub fn uid(&self) -> libc::uid_t {
        self.uid
    }

    /// Numeric group id of the target identity.
    pub fn gid(&self) -> libc::gid_t {
        self.gid
    }

    /// Switches the process to this identity.
    ///
    /// When not running as root there is nothing to drop; a warning is
    /// logged and the call succeeds so unprivileged development runs work.
    pub fn drop_privileges(&self) -> Result<(), PrivilegeError> {
        if !running_as_root() {
            warn!(
                user = %self.user,
                group = %self.group,
                "Not running as root, skipping privilege drop"
            );
            return Ok(());
        }

        // Group first: dropping the user id first would forfeit the right
        // to change groups.
        if unsafe { libc::setgid(self.gid) } != 0 {
            return Err(PrivilegeError::SetGid {
                gid: self.gid,
                source: io::Error::last_os_error(),
            });
        }
        if unsafe { libc::setuid(self.uid) } != 0 {
            return Err(PrivilegeError::SetUid {
                uid: self.uid,
                source: io::Error::last_os_error(),
            });
        }

        info!(
            user = %self.user,
            uid = self.uid,
            group = %self.group,
            gid = self.gid,
            "Dropped privileges"
        );
        Ok(())
    }
}

/// Errors resolving or switching to the target identity.
#[derive(Debug, Error)]
pub enum PrivilegeError {
    #[error("Unknown user '{name}'")]
    UnknownUser { name: String },

    #[error("Unknown group '{name}'")]
    UnknownGroup { name: String },

    #[error("Failed to look up {what} '{name}': {source}")]
    Lookup {
        what: &'static str,
        name: String,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("setgid({gid}) failed: {source}")]
    SetGid {
        gid: libc::gid_t,
        #[source]
        source: io::Error,
    },

    #[error("setuid({uid}) failed: {source}")]
    SetUid {
        uid: libc::uid_t,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "linux")]
    fn test_resolve_root_identity() {
        let identity = TargetIdentity::resolve("root", "root").unwrap();
        assert_eq!(identity.uid(), 0);
        assert_eq!(identity.gid(), 0);
    }

    #[test]
    fn test_resolve_unknown_user() {
        let err = TargetIdentity::resolve("no-such-user-zz", "root").unwrap_err();
        assert_eq!(err.to_string(), "Unknown user 'no-such-user-zz'");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_resolve_unknown_group() {
        let err = TargetIdentity::resolve("root", "no-such-group-zz").unwrap_err();
        assert_eq!(err.to_string(), "Unknown group 'no-such-group-zz'");
    }

    #[test]
    fn test_drop_is_noop_without_root() {
        if running_as_root() {
            // Actually switching identities would break the test process.
            return;
        }
        let identity = TargetIdentity {
            uid: 1,
            gid: 1,
            user: "daemon".to_string(),
            group: "daemon".to_string(),
        };
        assert!(identity.drop_privileges().is_ok());
    }
}
