use arch_riscv::{park, MachineCsrs, TrapFrame};
use foundation::utils::GlobalCell;
use foundation::{Dispatcher, Disposition, TrapConfig};

use super::console;

const CONFIG: TrapConfig = TrapConfig::MERLIN;
const _: () = assert!(CONFIG.validate().is_ok());

cfg_if::cfg_if! {
    if #[cfg(feature = "program-hooks")] {
        use foundation::{Console, DeviceRegisters, TrapHooks, TrapInfo, WordMemory};

        extern "C" {
            fn merlin_service_call(epc: u32, tval: u32);
            fn merlin_external_interrupt(epc: u32, tval: u32, count: u32);
        }

        /// Reports come from the program's own hooks.
        struct Hooks;

        impl TrapHooks for Hooks {
            fn service_call<D: DeviceRegisters, M: WordMemory>(
                &mut self,
                _console: &Console<D, M>,
                trap: &TrapInfo,
            ) {
                unsafe { merlin_service_call(trap.epc, trap.tval) }
            }

            fn external_interrupt<D: DeviceRegisters, M: WordMemory>(
                &mut self,
                _console: &Console<D, M>,
                trap: &TrapInfo,
                count: u32,
            ) {
                unsafe { merlin_external_interrupt(trap.epc, trap.tval, count) }
            }
        }

        const HOOKS: Hooks = Hooks;
    } else {
        type Hooks = foundation::Reporter;

        const HOOKS: Hooks = foundation::Reporter;
    }
}

/// The interrupt counter lives here; only `trap_handler` touches it.
static DISPATCHER: GlobalCell<Dispatcher<Hooks>> = GlobalCell::new(Dispatcher::new(CONFIG, HOOKS));

/// # Safety
/// Only called by the trap trampoline, with `frame` pointing at the saved
/// register file on the trap stack.
#[no_mangle]
pub unsafe extern "C" fn trap_handler(frame: *mut TrapFrame) {
    debug::writeln!("[TRAP] frame at {:p}", frame);

    let mut csrs = unsafe { MachineCsrs::new() };
    let console = console();
    match DISPATCHER.with_mut(|dispatcher| dispatcher.dispatch(&mut csrs, &console)) {
        Disposition::Resume => {}
        Disposition::Halted | Disposition::Idle => park(),
    }
}
