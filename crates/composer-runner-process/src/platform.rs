use std::process::{Child, Command};

/// Put the child in its own process group so a timeout can take down the
/// interpreter together with anything it spawned.
pub(crate) fn isolate_process_group(command: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    #[cfg(not(unix))]
    {
        let _ = command;
    }
}

/// Kill the child (and on Unix its whole process group), then reap it.
pub(crate) fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Ok(pid) = i32::try_from(child.id()) {
            if let Err(err) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                tracing::debug!(pid, error = %err, "killpg failed, falling back to kill");
            }
        }
    }

    let _ = child.kill();
    let _ = child.wait();
}
