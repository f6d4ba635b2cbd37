//! Executable model of the hart side of the trap path.
//!
//! [`Hart::take_trap`] performs the same steps as the trampoline, in the same
//! order, on a modelled register file and trap stack, and lays the saved
//! registers out through [`TrapFrame`]'s real field offsets. Host tests use it
//! to check what the naked code cannot show on the build machine.

use foundation::csr::MSTATUS_MIE;
use foundation::{BootConfig, Disposition, TrapCsrs};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::regs::{Reg, SaveSet};
use crate::trap::{TrapFrame, FRAME_SIZE};

/// Address the trampoline's `call` leaves in `ra` while the handler runs.
pub const HANDLER_RETURN: u32 = 0x0000_0F00;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapExit {
    /// `mret` executed; the program continues at `pc`.
    Resumed,
    /// The handler never returned.
    Parked(Disposition),
}

pub struct Hart {
    x: [u32; 32],
    pub pc: u32,
    pub mscratch: u32,
    pub mepc: u32,
    pub mcause: u32,
    pub mtval: u32,
    /// `mstatus.MIE`
    pub interrupts_enabled: bool,
    /// `mstatus.MPIE`
    pub interrupts_were_enabled: bool,
    trap_stack_top: u32,
    /// Memory just below the trap stack top, where the frame lands.
    frame: TrapFrame,
    save_set: SaveSet,
    parked: Option<Disposition>,
    in_trap: bool,
}

impl Hart {
    /// State at `main` after the reset entry ran with `config`.
    pub fn booted(config: &BootConfig, save_set: SaveSet) -> Self {
        let mut x = [0; 32];
        x[Reg::Sp.index()] = config.stack_top;
        Self {
            x,
            pc: 0,
            mscratch: config.trap_stack_top,
            mepc: 0,
            mcause: 0,
            mtval: 0,
            interrupts_enabled: config.mstatus & MSTATUS_MIE != 0,
            interrupts_were_enabled: false,
            trap_stack_top: config.trap_stack_top,
            frame: TrapFrame::default(),
            save_set,
            parked: None,
            in_trap: false,
        }
    }

    #[inline]
    pub fn reg(&self, reg: Reg) -> u32 {
        self.x[reg.index()]
    }

    #[inline]
    pub fn set_reg(&mut self, reg: Reg, value: u32) {
        self.x[reg.index()] = value;
    }

    pub fn registers(&self) -> [u32; 32] {
        self.x
    }

    pub fn frame(&self) -> &TrapFrame {
        &self.frame
    }

    pub fn frame_address(&self) -> u32 {
        self.trap_stack_top - FRAME_SIZE as u32
    }

    pub fn parked(&self) -> Option<Disposition> {
        self.parked
    }

    pub fn on_trap_stack(&self) -> bool {
        let sp = self.reg(Reg::Sp);
        sp <= self.trap_stack_top && sp >= self.frame_address()
    }

    /// Exactly one of `sp` and `mscratch` holds the trap stack pointer.
    pub fn stacks_complementary(&self) -> bool {
        if self.in_trap {
            self.on_trap_stack() && self.mscratch == self.frame.sp
        } else {
            !self.on_trap_stack() && self.mscratch == self.trap_stack_top
        }
    }

    /// Fill every register but `x0` and `sp` from `seed`.
    pub fn scramble(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for reg in Reg::ALL {
            if reg != Reg::Sp {
                self.set_reg(reg, rng.next_u32());
            }
        }
    }

    /// What any compiled handler may do: overwrite the caller-saved registers.
    pub fn clobber_caller_saved(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for reg in Reg::ALL {
            if reg.is_caller_saved() {
                self.set_reg(reg, rng.next_u32());
            }
        }
    }

    /// Take a trap at the current `pc` and run `handler` as `trap_handler`.
    pub fn take_trap<F>(&mut self, cause: u32, tval: u32, handler: F) -> TrapExit
    where
        F: FnOnce(&mut Hart) -> Disposition,
    {
        if let Some(disposition) = self.parked {
            return TrapExit::Parked(disposition);
        }
        assert!(!self.in_trap, "trap taken inside the trap handler");

        // Hardware entry.
        self.mepc = self.pc;
        self.mcause = cause;
        self.mtval = tval;
        self.interrupts_were_enabled = self.interrupts_enabled;
        self.interrupts_enabled = false;

        // csrrw sp, mscratch, sp
        self.swap_stacks();
        self.in_trap = true;
        // addi sp, sp, -FRAME_SIZE
        let sp = self.reg(Reg::Sp).wrapping_sub(FRAME_SIZE as u32);
        self.set_reg(Reg::Sp, sp);
        assert_eq!(sp, self.frame_address());

        for &reg in self.save_set.registers() {
            let value = self.reg(reg);
            self.frame.set(reg, value);
        }
        // csrr t0, mscratch; sw t0, sp-slot
        let interrupted_sp = self.mscratch;
        self.set_reg(Reg::T0, interrupted_sp);
        self.frame.sp = self.reg(Reg::T0);

        // mv a0, sp; call trap_handler
        self.set_reg(Reg::A0, sp);
        self.set_reg(Reg::Ra, HANDLER_RETURN);
        let disposition = handler(self);
        if disposition != Disposition::Resume {
            self.parked = Some(disposition);
            return TrapExit::Parked(disposition);
        }

        for &reg in self.save_set.registers() {
            let value = self.frame.get(reg);
            self.set_reg(reg, value);
        }
        // addi sp, sp, FRAME_SIZE; csrrw sp, mscratch, sp
        self.set_reg(Reg::Sp, sp.wrapping_add(FRAME_SIZE as u32));
        self.swap_stacks();
        self.in_trap = false;

        // mret
        self.pc = self.mepc;
        self.interrupts_enabled = self.interrupts_were_enabled;
        self.interrupts_were_enabled = true;
        TrapExit::Resumed
    }

    fn swap_stacks(&mut self) {
        let sp = self.reg(Reg::Sp);
        let scratch = self.mscratch;
        self.set_reg(Reg::Sp, scratch);
        self.mscratch = sp;
    }
}

impl TrapCsrs for Hart {
    fn cause(&self) -> u32 {
        self.mcause
    }

    fn resume_address(&self) -> u32 {
        self.mepc
    }

    fn set_resume_address(&mut self, addr: u32) {
        self.mepc = addr;
    }

    fn trap_value(&self) -> u32 {
        self.mtval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::csr::{CAUSE_MACHINE_ECALL, CAUSE_MACHINE_EXTERNAL};
    use foundation::testing::{DeviceWrite, RecordingDevices};
    use foundation::{Console, DirectMemory, Dispatcher, Reporter, TrapConfig};

    const SAVE_SETS: [SaveSet; 2] = [SaveSet::Full, SaveSet::CallerSaved];

    fn console() -> Console<RecordingDevices, DirectMemory> {
        Console::new(RecordingDevices::new(), unsafe { DirectMemory::new() })
    }

    fn hart(save_set: SaveSet, seed: u64) -> Hart {
        let mut hart = Hart::booted(&BootConfig::MERLIN, save_set);
        hart.scramble(seed);
        hart.pc = 0x0000_0240;
        hart
    }

    #[test]
    fn test_boot_state() {
        let hart = Hart::booted(&BootConfig::MERLIN, SaveSet::Full);
        assert_eq!(hart.reg(Reg::Sp), 0x8000);
        assert_eq!(hart.mscratch, 0x1_0000);
        assert!(hart.interrupts_enabled);
        assert!(hart.stacks_complementary());
    }

    #[test]
    fn test_round_trip_restores_register_file() {
        for save_set in SAVE_SETS {
            for seed in 0..16 {
                let mut hart = hart(save_set, seed);
                let before = hart.registers();

                let exit = hart.take_trap(CAUSE_MACHINE_EXTERNAL, 0, |hart| {
                    hart.clobber_caller_saved(seed ^ 0x5A5A);
                    Disposition::Resume
                });

                assert_eq!(exit, TrapExit::Resumed);
                assert_eq!(hart.registers(), before, "{save_set:?}, seed {seed}");
                assert_eq!(hart.pc, 0x0000_0240);
                assert!(hart.interrupts_enabled);
            }
        }
    }

    #[test]
    fn test_full_save_survives_any_clobber() {
        let mut hart = hart(SaveSet::Full, 7);
        let before = hart.registers();

        hart.take_trap(CAUSE_MACHINE_EXTERNAL, 0, |hart| {
            let sp = hart.reg(Reg::Sp);
            hart.scramble(99);
            hart.set_reg(Reg::Sp, sp);
            Disposition::Resume
        });
        assert_eq!(hart.registers(), before);
    }

    #[test]
    fn test_handler_sees_saved_frame() {
        for save_set in SAVE_SETS {
            let mut hart = hart(save_set, 3);
            let before = hart.registers();

            hart.take_trap(CAUSE_MACHINE_ECALL, 0, |hart| {
                assert_eq!(hart.reg(Reg::A0), hart.frame_address());
                assert_eq!(hart.frame().sp, before[Reg::Sp.index()]);
                for &reg in save_set.registers() {
                    assert_eq!(hart.frame().get(reg), before[reg.index()], "{reg:?}");
                }
                assert!(!hart.interrupts_enabled);
                Disposition::Resume
            });
        }
    }

    #[test]
    fn test_stacks_complementary_throughout() {
        for save_set in SAVE_SETS {
            let mut hart = hart(save_set, 11);
            assert!(hart.stacks_complementary());

            hart.take_trap(CAUSE_MACHINE_EXTERNAL, 0, |hart| {
                assert!(hart.on_trap_stack());
                assert!(hart.stacks_complementary());
                Disposition::Resume
            });

            assert!(hart.stacks_complementary());
            assert_eq!(hart.reg(Reg::Sp), 0x8000);
            assert_eq!(hart.mscratch, 0x1_0000);
        }
    }

    #[test]
    fn test_service_call_resumes_after_ecall() {
        let mut dispatcher = Dispatcher::new(TrapConfig::MERLIN, Reporter);
        let console = console();
        let mut hart = hart(SaveSet::ACTIVE, 5);
        let before = hart.registers();

        let exit = hart.take_trap(CAUSE_MACHINE_ECALL, 0, |hart| {
            dispatcher.dispatch(hart, &console)
        });

        assert_eq!(exit, TrapExit::Resumed);
        assert_eq!(hart.pc, 0x0000_0244);
        assert_eq!(hart.registers(), before);
    }

    #[test]
    fn test_interrupt_resumes_at_same_instruction() {
        let mut dispatcher = Dispatcher::new(TrapConfig::MERLIN, Reporter);
        let console = console();
        let mut hart = hart(SaveSet::ACTIVE, 6);

        hart.take_trap(CAUSE_MACHINE_EXTERNAL, 0, |hart| {
            dispatcher.dispatch(hart, &console)
        });

        assert_eq!(hart.pc, 0x0000_0240);
        assert_eq!(console.devices().acknowledgements(), 1);
    }

    #[test]
    fn test_interrupt_limit_parks_after_single_halt() {
        let mut dispatcher = Dispatcher::new(TrapConfig::MERLIN, Reporter);
        let console = console();
        let mut hart = hart(SaveSet::ACTIVE, 8);

        for n in 1..=20 {
            let exit = hart.take_trap(CAUSE_MACHINE_EXTERNAL, 0, |hart| {
                dispatcher.dispatch(hart, &console)
            });
            if n < 20 {
                assert_eq!(exit, TrapExit::Resumed, "interrupt {n}");
            } else {
                assert_eq!(exit, TrapExit::Parked(Disposition::Halted));
            }
        }

        let writes = console.devices().writes().len();
        // Later interrupts never reach the handler.
        let exit = hart.take_trap(CAUSE_MACHINE_EXTERNAL, 0, |_| {
            panic!("handler ran on a parked hart")
        });
        assert_eq!(exit, TrapExit::Parked(Disposition::Halted));
        assert_eq!(console.devices().writes().len(), writes);
        assert_eq!(console.devices().halts(), 1);
    }

    #[test]
    fn test_fault_parks_silently() {
        let mut dispatcher = Dispatcher::new(TrapConfig::MERLIN, Reporter);
        let console = console();
        let mut hart = hart(SaveSet::ACTIVE, 9);
        hart.pc = 0x0000_0128;

        // Illegal instruction.
        let exit = hart.take_trap(2, 0x0000_0073, |hart| dispatcher.dispatch(hart, &console));
        assert_eq!(exit, TrapExit::Parked(Disposition::Idle));
        assert_eq!(hart.parked(), Some(Disposition::Idle));
        assert_eq!(hart.mepc, 0x0000_0128);

        let text = console.devices().console_text();
        assert!(text.contains("cause=00000002"));
        assert!(text.contains("epc=00000128"));
        assert!(text.contains("mtval=00000073"));

        let writes = console.devices().writes();
        hart.take_trap(CAUSE_MACHINE_EXTERNAL, 0, |hart| {
            dispatcher.dispatch(hart, &console)
        });
        assert_eq!(console.devices().writes(), writes);
        assert!(!writes.contains(&DeviceWrite::Halt(0)));
    }
}
