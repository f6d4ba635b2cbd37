//! Console driver for the testbench's byte-wide output register.
//!
//! Strings are read with aligned word loads and unpacked byte by byte
//! (little-endian: byte 0 is the least significant byte of its word), so the
//! driver works on memories that only serve whole words.

use core::fmt;

use crate::device::{DeviceRegisters, WordMemory};

pub struct Console<D, M> {
    devices: D,
    memory: M,
}

impl<D, M> Console<D, M> {
    pub const fn new(devices: D, memory: M) -> Self {
        Self { devices, memory }
    }

    #[inline]
    pub fn devices(&self) -> &D {
        &self.devices
    }

    #[inline]
    pub fn memory(&self) -> &M {
        &self.memory
    }
}

impl<D: DeviceRegisters, M: WordMemory> Console<D, M> {
    #[inline]
    pub fn put(&self, byte: u8) {
        self.devices.write_console(byte);
    }

    /// Exactly eight uppercase hex digits, most significant nibble first.
    pub fn write_hex(&self, value: u32) {
        for shift in (0..8).rev().map(|nibble| nibble * 4) {
            self.put(hex_digit(((value >> shift) & 0xf) as u8));
        }
    }

    /// Emit the NUL-terminated byte string at `addr`, without the terminator.
    ///
    /// A word is loaded on entry and then again each time the byte address
    /// returns to a word boundary.
    pub fn write_bytes(&self, addr: usize) {
        let mut addr = addr;
        let mut word = self.memory.load_word(addr & !0x3);
        loop {
            let byte = (word >> ((addr & 0x3) * 8)) as u8;
            if byte == 0 {
                return;
            }
            self.put(byte);

            addr = addr.wrapping_add(1);
            if addr & 0x3 == 0 {
                word = self.memory.load_word(addr);
            }
        }
    }

    #[inline]
    pub fn write_str<const N: usize>(&self, s: &WordStr<N>) {
        self.write_bytes(s.addr());
    }
}

#[inline]
const fn hex_digit(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        _ => b'A' + nibble - 10,
    }
}

/// A NUL-terminated string laid out for whole-word reads: 4-byte aligned and
/// zero-padded to a multiple of 4 bytes.
#[repr(C, align(4))]
pub struct WordStr<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> WordStr<N> {
    pub const fn new(text: &str) -> Self {
        let src = text.as_bytes();
        assert!(N % 4 == 0, "WordStr length must be a multiple of 4");
        assert!(src.len() < N, "WordStr has no room for the terminator");

        let mut bytes = [0u8; N];
        let mut i = 0;
        while i < src.len() {
            assert!(src[i] != 0, "WordStr text contains a NUL byte");
            bytes[i] = src[i];
            i += 1;
        }
        Self { bytes }
    }

    #[inline]
    pub fn addr(&self) -> usize {
        self.bytes.as_ptr() as usize
    }

    /// The text, without terminator or padding.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.bytes.iter().position(|&b| b == 0).unwrap_or(N);
        &self.bytes[..len]
    }
}

/// Storage size of a [`WordStr`] holding `len` bytes of text.
pub const fn padded_len(len: usize) -> usize {
    (len / 4 + 1) * 4
}

/// `&'static WordStr` from a string literal.
#[macro_export]
macro_rules! wstr {
    ($text:expr) => {{
        const TEXT: &str = $text;
        static WORDS: $crate::console::WordStr<{ $crate::console::padded_len(TEXT.len()) }> =
            $crate::console::WordStr::new(TEXT);
        &WORDS
    }};
}

/// `core::fmt` output straight to the console register, one store per byte.
pub struct ConsoleWriter<D>(pub D);

impl<D: DeviceRegisters> fmt::Write for ConsoleWriter<D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.0.write_console(byte);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DeviceWrite, ImageMemory, RecordingDevices};
    use alloc::vec::Vec;
    use core::fmt::Write;

    const BASE: usize = 0x2000;

    fn console_with(text: &[u8], offset: usize) -> (Console<RecordingDevices, ImageMemory>, usize) {
        let mut memory = ImageMemory::new(BASE, 8);
        // Surround the string with garbage so over-reads would show up.
        memory.fill(0xA5);
        let addr = BASE + offset;
        memory.write_bytes(addr, text);
        memory.write_bytes(addr + text.len(), &[0]);
        (Console::new(RecordingDevices::new(), memory), addr)
    }

    #[test]
    fn test_write_hex() {
        let console = Console::new(RecordingDevices::new(), ImageMemory::new(BASE, 1));
        console.write_hex(0x027A7FE4);
        assert_eq!(console.devices().console_text(), "027A7FE4");
    }

    #[test]
    fn test_write_hex_digits() {
        let console = Console::new(RecordingDevices::new(), ImageMemory::new(BASE, 1));
        for value in [0, 0xFFFF_FFFF, 0x8000_0001, 0x0123_4567, 0x89AB_CDEF] {
            console.devices().clear();
            console.write_hex(value);

            let text = console.devices().console_text();
            assert_eq!(text.len(), 8);
            assert!(text.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
            assert_eq!(u32::from_str_radix(&text, 16), Ok(value));
        }
    }

    #[test]
    fn test_write_bytes_every_alignment() {
        let source = b"Merlin!!";
        for offset in 0..4 {
            for len in [0, 1, 3, 4, 5, 8] {
                let (console, addr) = console_with(&source[..len], offset);
                console.write_bytes(addr);
                assert_eq!(
                    console.devices().console_bytes(),
                    &source[..len],
                    "offset {offset}, length {len}"
                );
            }
        }
    }

    #[test]
    fn test_write_bytes_empty_loads_one_word() {
        for offset in 0..4 {
            let (console, addr) = console_with(b"", offset);
            console.write_bytes(addr);
            assert_eq!(console.memory().loads(), 1);
            assert!(console.devices().writes().is_empty());
        }
    }

    #[test]
    fn test_write_bytes_reloads_on_word_boundary() {
        // Starts at offset 3: one byte from the first word, four from the
        // second, the terminator in the third.
        let (console, addr) = console_with(b"abcde", 3);
        console.write_bytes(addr);
        assert_eq!(console.memory().loads(), 3);
        assert_eq!(
            console.memory().loaded_addresses(),
            [BASE, BASE + 4, BASE + 8]
        );
    }

    #[test]
    fn test_word_str_layout() {
        let s: &WordStr<8> = &WordStr::new("abcd");
        assert_eq!(s.addr() % 4, 0);
        assert_eq!(s.as_bytes(), b"abcd");
        assert_eq!(padded_len(0), 4);
        assert_eq!(padded_len(3), 4);
        assert_eq!(padded_len(4), 8);
    }

    #[test]
    fn test_write_str_through_direct_memory() {
        let console = Console::new(RecordingDevices::new(), unsafe {
            crate::device::DirectMemory::new()
        });
        console.write_str(crate::wstr!("Hello World!\n"));
        assert_eq!(console.devices().console_text(), "Hello World!\n");
    }

    #[test]
    fn test_console_writer() {
        let devices = RecordingDevices::new();
        let mut out = ConsoleWriter(&devices);
        write!(out, "count={}", 3).unwrap();
        let expected: Vec<DeviceWrite> = b"count=3".iter().map(|&b| DeviceWrite::Console(b)).collect();
        assert_eq!(devices.writes(), expected);
    }
}
