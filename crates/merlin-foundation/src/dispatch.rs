//! Cause-based trap dispatch.
//!
//! The dispatcher decides what a trap means, how the interrupted program
//! continues and which device side effects happen on the way. It reads the
//! trap control state through [`TrapCsrs`] and touches devices only through
//! the [`Console`] it is handed.

use crate::cause::TrapCause;
use crate::config::{Resume, TrapConfig};
use crate::console::Console;
use crate::csr::{TrapCsrs, TrapInfo};
use crate::device::{DeviceRegisters, WordMemory};
use crate::wstr;

/// How the trap path must end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Return through the trampoline.
    Resume,
    /// The halt register was written; never return.
    Halted,
    /// Unrecoverable trap; never return and stay silent.
    Idle,
}

/// Occurrence numbers for external interrupts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptCounter {
    next: u32,
}

impl InterruptCounter {
    pub const fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    /// Number of the occurrence being handled; advances the counter.
    #[inline]
    pub fn next_occurrence(&mut self) -> u32 {
        let count = self.next;
        self.next = count.wrapping_add(1);
        count
    }

    #[inline]
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// Program-facing reports for the two expected trap kinds.
///
/// The defaults print the standard trap reports. Overriding a hook replaces
/// the report only; resume, acknowledge and halt policy stay with the
/// dispatcher.
pub trait TrapHooks {
    fn service_call<D: DeviceRegisters, M: WordMemory>(
        &mut self,
        console: &Console<D, M>,
        trap: &TrapInfo,
    ) {
        report_service_call(console, trap);
    }

    fn external_interrupt<D: DeviceRegisters, M: WordMemory>(
        &mut self,
        console: &Console<D, M>,
        trap: &TrapInfo,
        count: u32,
    ) {
        report_external_interrupt(console, trap, count);
    }
}

/// The default hooks.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reporter;

impl TrapHooks for Reporter {}

pub fn report_service_call<D: DeviceRegisters, M: WordMemory>(
    console: &Console<D, M>,
    trap: &TrapInfo,
) {
    console.write_str(wstr!("<\nECALL (mepc="));
    console.write_hex(trap.epc);
    console.write_str(wstr!(", mtval="));
    console.write_hex(trap.tval);
    console.write_str(wstr!(")\n>"));
}

pub fn report_external_interrupt<D: DeviceRegisters, M: WordMemory>(
    console: &Console<D, M>,
    trap: &TrapInfo,
    count: u32,
) {
    console.write_str(wstr!("<\nExternal Interrupt! (epc="));
    console.write_hex(trap.epc);
    console.write_str(wstr!(", mtval="));
    console.write_hex(trap.tval);
    console.write_str(wstr!(", count="));
    console.write_hex(count);
    console.write_str(wstr!(")\n>"));
}

pub fn report_fault<D: DeviceRegisters, M: WordMemory>(console: &Console<D, M>, trap: &TrapInfo) {
    console.write_str(wstr!("<\nException!!! (cause="));
    console.write_hex(trap.cause);
    console.write_str(wstr!(", epc="));
    console.write_hex(trap.epc);
    console.write_str(wstr!(", mtval="));
    console.write_hex(trap.tval);
    console.write_str(wstr!(")\n"));
}

pub struct Dispatcher<H> {
    config: TrapConfig,
    interrupts: InterruptCounter,
    hooks: H,
}

impl<H> Dispatcher<H> {
    pub const fn new(config: TrapConfig, hooks: H) -> Self {
        Self {
            interrupts: InterruptCounter::starting_at(config.first_count),
            config,
            hooks,
        }
    }

    pub fn config(&self) -> &TrapConfig {
        &self.config
    }

    pub fn interrupts(&self) -> &InterruptCounter {
        &self.interrupts
    }
}

impl<H: TrapHooks> Dispatcher<H> {
    pub fn dispatch<C, D, M>(&mut self, csrs: &mut C, console: &Console<D, M>) -> Disposition
    where
        C: TrapCsrs + ?Sized,
        D: DeviceRegisters,
        M: WordMemory,
    {
        let trap = TrapInfo::latch(csrs);
        let cause = TrapCause::decode(trap.cause);
        debug::writeln!(
            "[TRAP] {:?} (mcause={:#010x} mepc={:#010x} mtval={:#010x})",
            cause,
            trap.cause,
            trap.epc,
            trap.tval
        );

        match cause {
            TrapCause::ServiceCall => {
                self.hooks.service_call(console, &trap);
                resume(csrs, &trap, self.config.service_call);
                Disposition::Resume
            }
            TrapCause::ExternalInterrupt => {
                let count = self.interrupts.next_occurrence();
                self.hooks.external_interrupt(console, &trap, count);
                resume(csrs, &trap, self.config.external_interrupt);
                console.devices().acknowledge_interrupt();

                if count >= self.config.interrupt_limit {
                    debug::writeln!("[TRAP] interrupt limit reached, halting");
                    console.devices().halt(self.config.halt_code);
                    Disposition::Halted
                } else {
                    Disposition::Resume
                }
            }
            TrapCause::Fault(_) => {
                report_fault(console, &trap);
                Disposition::Idle
            }
        }
    }
}

#[inline]
fn resume<C: TrapCsrs + ?Sized>(csrs: &mut C, trap: &TrapInfo, policy: Resume) {
    if let Resume::Next = policy {
        csrs.set_resume_address(policy.apply(trap.epc));
    }
}
