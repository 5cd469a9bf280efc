//! Scoped CPU-affinity and scheduling-priority elevation.
//!
//! Thread migration and preemption both land inside timed windows, so the
//! sampler pins itself to one logical CPU and asks for a higher priority
//! while it measures. All of it is advisory: acquisition failures are
//! reported on stderr and ignored, and whatever was changed is restored when
//! the guard drops, including when the operation under test panics.

use std::marker::PhantomData;

/// RAII guard over the process-wide scheduling state.
///
/// Holds the prior affinity mask and priority values and restores them on
/// drop. `!Send`, since it must be dropped on the thread it pinned.
pub struct SchedGuard {
    #[cfg(target_os = "linux")]
    previous_mask: Option<libc::cpu_set_t>,
    #[cfg(target_os = "linux")]
    previous_nice: Option<i32>,

    #[cfg(windows)]
    previous_affinity: Option<usize>,
    #[cfg(windows)]
    previous_thread_priority: Option<i32>,
    #[cfg(windows)]
    previous_priority_class: Option<u32>,

    _not_send: PhantomData<*const ()>,
}

impl SchedGuard {
    /// Pin the calling thread to its current CPU and raise its priority,
    /// best-effort.
    pub fn acquire() -> Self {
        let mut guard = Self {
            #[cfg(target_os = "linux")]
            previous_mask: None,
            #[cfg(target_os = "linux")]
            previous_nice: None,

            #[cfg(windows)]
            previous_affinity: None,
            #[cfg(windows)]
            previous_thread_priority: None,
            #[cfg(windows)]
            previous_priority_class: None,

            _not_send: PhantomData,
        };

        #[cfg(target_os = "linux")]
        guard.acquire_linux();

        #[cfg(windows)]
        guard.acquire_windows();

        guard
    }

    #[cfg(target_os = "linux")]
    fn acquire_linux(&mut self) {
        use std::mem::MaybeUninit;

        unsafe {
            let mut original = MaybeUninit::<libc::cpu_set_t>::uninit();
            let got = libc::sched_getaffinity(
                0,
                std::mem::size_of::<libc::cpu_set_t>(),
                original.as_mut_ptr(),
            );

            if got == 0 {
                let cpu = libc::sched_getcpu();
                if cpu >= 0 {
                    let mut pinned: libc::cpu_set_t = std::mem::zeroed();
                    libc::CPU_ZERO(&mut pinned);
                    libc::CPU_SET(cpu as usize, &mut pinned);

                    if libc::sched_setaffinity(
                        0,
                        std::mem::size_of::<libc::cpu_set_t>(),
                        &pinned,
                    ) == 0
                    {
                        self.previous_mask = Some(original.assume_init());
                    } else {
                        eprintln!(
                            "⚠️ Warning: could not pin to CPU {}: {}",
                            cpu,
                            std::io::Error::last_os_error()
                        );
                    }
                }
            } else {
                eprintln!(
                    "⚠️ Warning: could not read CPU affinity: {}",
                    std::io::Error::last_os_error()
                );
            }

            // Raising priority means lowering the nice value, which normally
            // needs privileges. Failure here is the expected case.
            let previous_nice = libc::getpriority(libc::PRIO_PROCESS as _, 0);
            if libc::setpriority(libc::PRIO_PROCESS as _, 0, -20) == 0 {
                self.previous_nice = Some(previous_nice);
            }
        }
    }

    #[cfg(windows)]
    fn acquire_windows(&mut self) {
        use windows_sys::Win32::System::Threading::{
            GetCurrentProcess, GetCurrentProcessorNumber, GetCurrentThread, GetPriorityClass,
            GetThreadPriority, SetPriorityClass, SetThreadAffinityMask, SetThreadPriority,
            HIGH_PRIORITY_CLASS, THREAD_PRIORITY_HIGHEST,
        };

        unsafe {
            let thread = GetCurrentThread();
            let process = GetCurrentProcess();

            let mask = 1usize << (GetCurrentProcessorNumber() as usize);
            let previous = SetThreadAffinityMask(thread, mask);
            if previous != 0 {
                self.previous_affinity = Some(previous);
            } else {
                eprintln!(
                    "⚠️ Warning: could not set thread affinity: {}",
                    std::io::Error::last_os_error()
                );
            }

            let previous_priority = GetThreadPriority(thread);
            if SetThreadPriority(thread, THREAD_PRIORITY_HIGHEST) != 0 {
                self.previous_thread_priority = Some(previous_priority);
            }

            let previous_class = GetPriorityClass(process);
            if previous_class != 0 && SetPriorityClass(process, HIGH_PRIORITY_CLASS) != 0 {
                self.previous_priority_class = Some(previous_class);
            }
        }
    }
}

impl Drop for SchedGuard {
    fn drop(&mut self) {
        #[cfg(target_os = "linux")]
        unsafe {
            if let Some(mask) = self.previous_mask.take() {
                if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mask) != 0 {
                    eprintln!(
                        "⚠️ Warning: could not restore CPU affinity: {}",
                        std::io::Error::last_os_error()
                    );
                }
            }
            if let Some(nice) = self.previous_nice.take() {
                let _ = libc::setpriority(libc::PRIO_PROCESS as _, 0, nice);
            }
        }

        #[cfg(windows)]
        unsafe {
            use windows_sys::Win32::System::Threading::{
                GetCurrentProcess, GetCurrentThread, SetPriorityClass, SetThreadAffinityMask,
                SetThreadPriority,
            };

            if let Some(mask) = self.previous_affinity.take() {
                if SetThreadAffinityMask(GetCurrentThread(), mask) == 0 {
                    eprintln!(
                        "⚠️ Warning: could not restore thread affinity: {}",
                        std::io::Error::last_os_error()
                    );
                }
            }
            if let Some(priority) = self.previous_thread_priority.take() {
                let _ = SetThreadPriority(GetCurrentThread(), priority);
            }
            if let Some(class) = self.previous_priority_class.take() {
                let _ = SetPriorityClass(GetCurrentProcess(), class);
            }
        }
    }
}
