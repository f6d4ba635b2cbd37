//! Recording doubles for the device registers, word memory and CSRs.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::csr::TrapCsrs;
use crate::device::{DeviceRegisters, WordMemory};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceWrite {
    Console(u8),
    Acknowledge,
    Halt(u32),
}

/// Logs every device store in program order.
#[derive(Debug, Default)]
pub struct RecordingDevices {
    writes: RefCell<Vec<DeviceWrite>>,
}

impl RecordingDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<DeviceWrite> {
        self.writes.borrow().clone()
    }

    pub fn clear(&self) {
        self.writes.borrow_mut().clear();
    }

    pub fn console_bytes(&self) -> Vec<u8> {
        self.writes
            .borrow()
            .iter()
            .filter_map(|w| match w {
                DeviceWrite::Console(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn console_text(&self) -> String {
        String::from_utf8_lossy(&self.console_bytes()).into_owned()
    }

    pub fn acknowledgements(&self) -> usize {
        self.count(|w| *w == DeviceWrite::Acknowledge)
    }

    pub fn halts(&self) -> usize {
        self.count(|w| matches!(w, DeviceWrite::Halt(_)))
    }

    fn count(&self, pred: impl Fn(&DeviceWrite) -> bool) -> usize {
        self.writes.borrow().iter().filter(|w| pred(w)).count()
    }
}

impl DeviceRegisters for RecordingDevices {
    fn write_console(&self, byte: u8) {
        self.writes.borrow_mut().push(DeviceWrite::Console(byte));
    }

    fn acknowledge_interrupt(&self) {
        self.writes.borrow_mut().push(DeviceWrite::Acknowledge);
    }

    fn halt(&self, code: u32) {
        self.writes.borrow_mut().push(DeviceWrite::Halt(code));
    }
}

/// A word-addressed memory image starting at `base`. Loads are counted and
/// must be aligned and in range.
#[derive(Debug)]
pub struct ImageMemory {
    base: usize,
    words: Vec<u32>,
    loaded: RefCell<Vec<usize>>,
}

impl ImageMemory {
    pub fn new(base: usize, len_words: usize) -> Self {
        assert_eq!(base & 0x3, 0, "image base must be word aligned");
        Self {
            base,
            words: vec![0; len_words],
            loaded: RefCell::new(Vec::new()),
        }
    }

    pub fn fill(&mut self, byte: u8) {
        let word = u32::from_le_bytes([byte; 4]);
        self.words.iter_mut().for_each(|w| *w = word);
    }

    /// Byte-wise store into the image, little-endian within each word.
    pub fn write_bytes(&mut self, addr: usize, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let offset = addr + i - self.base;
            let shift = (offset & 0x3) * 8;
            let word = &mut self.words[offset / 4];
            *word = (*word & !(0xff << shift)) | (u32::from(byte) << shift);
        }
    }

    pub fn loads(&self) -> usize {
        self.loaded.borrow().len()
    }

    pub fn loaded_addresses(&self) -> Vec<usize> {
        self.loaded.borrow().clone()
    }
}

impl WordMemory for ImageMemory {
    fn load_word(&self, addr: usize) -> u32 {
        assert_eq!(addr & 0x3, 0, "unaligned word load at {addr:#x}");
        self.loaded.borrow_mut().push(addr);
        self.words[(addr - self.base) / 4]
    }
}

/// Latched trap state with a count of `mepc` writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockCsrs {
    pub mcause: u32,
    pub mepc: u32,
    pub mtval: u32,
    pub mepc_writes: usize,
}

impl MockCsrs {
    pub fn new(mcause: u32, mepc: u32, mtval: u32) -> Self {
        Self {
            mcause,
            mepc,
            mtval,
            mepc_writes: 0,
        }
    }
}

impl TrapCsrs for MockCsrs {
    fn cause(&self) -> u32 {
        self.mcause
    }

    fn resume_address(&self) -> u32 {
        self.mepc
    }

    fn set_resume_address(&mut self, addr: u32) {
        self.mepc = addr;
        self.mepc_writes += 1;
    }

    fn trap_value(&self) -> u32 {
        self.mtval
    }
}
