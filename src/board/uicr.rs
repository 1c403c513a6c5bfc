//! UICR as the settings option region.
//!
//! The nRF52840 UICR can only be erased as a block (`ERASEUICR`), which also
//! clears the reset-pin, access-port protection, NFC pin and regulator
//! configuration. [`WORDS`] lists every register in the block so a save
//! restores all of them. The thresholds sit in `CUSTOMER[0]` and
//! `CUSTOMER[1]`.
//!
//! Holding the `NVMC` singleton guarantees nothing else drives the
//! controller.

use embassy_nrf::pac;
use embassy_nrf::pac::nvmc::vals::Wen;
use embassy_nrf::pac::uicr::regs;
use embassy_nrf::peripherals::NVMC;
use thermofan::storage::OptionRegion;

const CUSTOMER_WORDS: usize = 32;
const NRFFW_WORDS: usize = 13;
const NRFHW_WORDS: usize = 12;
const WORD_COUNT: usize = CUSTOMER_WORDS + NRFFW_WORDS + NRFHW_WORDS + 6;

/// One 32-bit UICR register.
#[derive(Clone, Copy)]
enum Word {
    Customer(usize),
    Nrffw(usize),
    Nrfhw(usize),
    PselReset(usize),
    Approtect,
    NfcPins,
    DebugCtrl,
    Regout0,
}

const WORDS: [Word; WORD_COUNT] = words();

const fn words() -> [Word; WORD_COUNT] {
    let mut table = [Word::Approtect; WORD_COUNT];
    let mut i = 0;
    while i < CUSTOMER_WORDS {
        table[i] = Word::Customer(i);
        i += 1;
    }
    let mut n = 0;
    while n < NRFFW_WORDS {
        table[i] = Word::Nrffw(n);
        i += 1;
        n += 1;
    }
    n = 0;
    while n < NRFHW_WORDS {
        table[i] = Word::Nrfhw(n);
        i += 1;
        n += 1;
    }
    table[i] = Word::PselReset(0);
    table[i + 1] = Word::PselReset(1);
    table[i + 2] = Word::Approtect;
    table[i + 3] = Word::NfcPins;
    table[i + 4] = Word::DebugCtrl;
    table[i + 5] = Word::Regout0;
    table
}

impl Word {
    fn read(self) -> u32 {
        let uicr = pac::UICR;
        match self {
            Word::Customer(n) => uicr.customer(n).read(),
            Word::Nrffw(n) => uicr.nrffw(n).read(),
            Word::Nrfhw(n) => uicr.nrfhw(n).read(),
            Word::PselReset(n) => uicr.pselreset(n).read().0,
            Word::Approtect => uicr.approtect().read().0,
            Word::NfcPins => uicr.nfcpins().read().0,
            Word::DebugCtrl => uicr.debugctrl().read().0,
            Word::Regout0 => uicr.regout0().read().0,
        }
    }

    fn write(self, value: u32) {
        let uicr = pac::UICR;
        match self {
            Word::Customer(n) => uicr.customer(n).write_value(value),
            Word::Nrffw(n) => uicr.nrffw(n).write_value(value),
            Word::Nrfhw(n) => uicr.nrfhw(n).write_value(value),
            Word::PselReset(n) => uicr.pselreset(n).write_value(regs::Pselreset(value)),
            Word::Approtect => uicr.approtect().write_value(regs::Approtect(value)),
            Word::NfcPins => uicr.nfcpins().write_value(regs::Nfcpins(value)),
            Word::DebugCtrl => uicr.debugctrl().write_value(regs::Debugctrl(value)),
            Word::Regout0 => uicr.regout0().write_value(regs::Regout0(value)),
        }
    }
}

pub struct Uicr {
    _nvmc: NVMC,
}

impl Uicr {
    pub fn new(nvmc: NVMC) -> Self {
        Self { _nvmc: nvmc }
    }

    fn set_mode(&mut self, mode: Wen) {
        pac::NVMC.config().write(|w| w.set_wen(mode));
    }
}

impl OptionRegion for Uicr {
    const WORDS: usize = WORD_COUNT;
    const TEMPERATURE1_WORD: usize = 0;
    const TEMPERATURE2_WORD: usize = 1;

    fn read_word(&self, index: usize) -> u32 {
        WORDS.get(index).map_or(u32::MAX, |word| word.read())
    }

    fn unlock(&mut self) {
        self.set_mode(Wen::EEN);
    }

    fn start_erase(&mut self) {
        pac::NVMC
            .eraseuicr()
            .write_value(pac::nvmc::regs::Eraseuicr(1));
    }

    fn enable_programming(&mut self) {
        self.set_mode(Wen::WEN);
    }

    fn write_word(&mut self, index: usize, value: u32) {
        // Erased words already read as all ones.
        if value == u32::MAX {
            return;
        }
        if let Some(word) = WORDS.get(index) {
            word.write(value);
        }
    }

    fn is_busy(&self) -> bool {
        !pac::NVMC.ready().read().ready()
    }

    fn lock(&mut self) {
        self.set_mode(Wen::REN);
    }
}
