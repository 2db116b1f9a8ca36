//! Restarting the launcher after structural settings changes.
//!
//! Long-lived launcher state (device profile, icon cache) is only built at
//! process start, so "restart" means: arm a deferred relaunch of the home
//! entry point, then exit.

use crate::component::ComponentName;
use anyhow::{Context as _, Result};
use std::process::Command;
use std::time::Duration;

pub const RESTART_REQUEST_CODE: i32 = 41;
pub const RELAUNCH_DELAY: Duration = Duration::from_millis(1);
pub const RELAUNCH_DELAY_ARG: &str = "--relaunch-delay-ms";
pub const RELAUNCH_TARGET_ARG: &str = "--relaunch-target";

/// Session-wide "restart on exit" flag. It can be raised, never lowered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartFlag {
    requested: bool,
}

impl RestartFlag {
    pub fn preset(requested: bool) -> Self {
        Self { requested }
    }

    pub fn request(&mut self) {
        self.requested = true;
    }

    pub fn is_set(&self) -> bool {
        self.requested
    }
}

/// One-shot deferred activation of the home entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartIntent {
    pub target: ComponentName,
    pub clear_task: bool,
    pub delay: Duration,
    pub request_code: i32,
}

impl RestartIntent {
    pub fn home(target: ComponentName) -> Self {
        Self {
            target,
            clear_task: true,
            delay: RELAUNCH_DELAY,
            request_code: RESTART_REQUEST_CODE,
        }
    }
}

/// Platform side of a restart.
pub trait Relauncher {
    fn schedule(&self, intent: &RestartIntent) -> Result<()>;

    /// Ends the current process. Test doubles return instead.
    fn terminate(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartOutcome {
    NotRequired,
    Scheduled(RestartIntent),
    /// Relaunch could not be armed; the process was terminated anyway.
    ScheduleFailed(RestartIntent),
}

pub struct RestartScheduler<R> {
    relauncher: R,
    home: ComponentName,
}

impl<R: Relauncher> RestartScheduler<R> {
    pub fn new(relauncher: R, home: ComponentName) -> Self {
        Self { relauncher, home }
    }

    pub fn relauncher(&self) -> &R {
        &self.relauncher
    }

    /// Called once at session teardown with the final flag.
    pub fn on_teardown(&self, restart_required: bool) -> RestartOutcome {
        if !restart_required {
            return RestartOutcome::NotRequired;
        }

        let intent = RestartIntent::home(self.home.clone());
        let outcome = match self.relauncher.schedule(&intent) {
            Ok(()) => {
                crate::debug_log!(
                    "[restart] relaunch of {} armed in {:?}",
                    intent.target,
                    intent.delay
                );
                RestartOutcome::Scheduled(intent)
            }
            Err(err) => {
                crate::debug_log!("[restart] relaunch not armed, exiting anyway: {:#}", err);
                RestartOutcome::ScheduleFailed(intent)
            }
        };
        self.relauncher.terminate();
        outcome
    }
}

/// Relaunches by spawning this executable again, then exiting.
#[derive(Debug, Default)]
pub struct ProcessRelauncher;

impl Relauncher for ProcessRelauncher {
    fn schedule(&self, intent: &RestartIntent) -> Result<()> {
        let exe = std::env::current_exe().context("failed to locate current executable")?;
        Command::new(&exe)
            .arg(RELAUNCH_DELAY_ARG)
            .arg(intent.delay.as_millis().to_string())
            .arg(RELAUNCH_TARGET_ARG)
            .arg(intent.target.flatten_to_string())
            .spawn()
            .with_context(|| format!("failed to spawn {}", exe.display()))?;
        Ok(())
    }

    fn terminate(&self) {
        std::process::exit(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Recording {
        fail: bool,
        scheduled: RefCell<Vec<RestartIntent>>,
        terminated: Cell<u32>,
    }

    impl Relauncher for Recording {
        fn schedule(&self, intent: &RestartIntent) -> Result<()> {
            if self.fail {
                return Err(anyhow!("alarm service unavailable"));
            }
            self.scheduled.borrow_mut().push(intent.clone());
            Ok(())
        }

        fn terminate(&self) {
            self.terminated.set(self.terminated.get() + 1);
        }
    }

    fn home() -> ComponentName {
        ComponentName::new("com.android.launcher3", "com.android.launcher3.Launcher")
    }

    #[test]
    fn flag_never_goes_back_down() {
        let mut flag = RestartFlag::default();
        assert!(!flag.is_set());
        flag.request();
        flag.request();
        assert!(flag.is_set());
        assert!(RestartFlag::preset(true).is_set());
    }

    #[test]
    fn no_restart_is_a_no_op() {
        let scheduler = RestartScheduler::new(Recording::default(), home());
        assert_eq!(scheduler.on_teardown(false), RestartOutcome::NotRequired);
        assert!(scheduler.relauncher().scheduled.borrow().is_empty());
        assert_eq!(scheduler.relauncher().terminated.get(), 0);
    }

    #[test]
    fn restart_targets_home_with_clear_task() {
        let scheduler = RestartScheduler::new(Recording::default(), home());
        let outcome = scheduler.on_teardown(true);

        let expected = RestartIntent {
            target: home(),
            clear_task: true,
            delay: Duration::from_millis(1),
            request_code: 41,
        };
        assert_eq!(outcome, RestartOutcome::Scheduled(expected.clone()));
        assert_eq!(*scheduler.relauncher().scheduled.borrow(), vec![expected]);
        assert_eq!(scheduler.relauncher().terminated.get(), 1);
    }

    #[test]
    fn failed_scheduling_still_terminates() {
        let scheduler = RestartScheduler::new(
            Recording {
                fail: true,
                ..Recording::default()
            },
            home(),
        );
        assert!(matches!(
            scheduler.on_teardown(true),
            RestartOutcome::ScheduleFailed(_)
        ));
        assert_eq!(scheduler.relauncher().terminated.get(), 1);
    }
}
