//! Persistent storage for the fan thresholds.
//!
//! Each threshold lives in the low half of one word of a small option-byte
//! region (UICR on the nRF52840), stored as the value byte followed by its
//! complement so an erased word is never mistaken for a setting.
//!
//! The region can only be erased as a whole, and erasing also clears the
//! protection and pin configuration words that share it, so every save
//! rewrites the complete region from a known-good image. The image is taken
//! once at construction and replaced only after a verified save, so a save
//! that dies after the erase is repaired by the next one:
//!
//! 1. patch the two threshold bytes into the image,
//! 2. unlock, erase, wait for the busy flag,
//! 3. program every word, waiting after each one,
//! 4. lock, then read back and compare.
//!
//! Every wait is bounded; a controller that never reports ready yields
//! [`StorageError::Timeout`] instead of hanging the control loop.

use crate::error::StorageError;
use crate::settings::Settings;
use heapless::Vec;

/// Largest option region a [`SettingsStore`] can snapshot.
pub const MAX_OPTION_WORDS: usize = 64;

/// Polled interface to an erase-before-write option region.
pub trait OptionRegion {
    /// Number of words that an erase clears.
    const WORDS: usize;
    /// Word holding the first threshold.
    const TEMPERATURE1_WORD: usize;
    /// Word holding the second threshold.
    const TEMPERATURE2_WORD: usize;

    fn read_word(&self, index: usize) -> u32;

    /// Allow erase and program operations.
    fn unlock(&mut self);

    /// Begin erasing the whole region.
    fn start_erase(&mut self);

    /// Switch the controller from erase to program mode.
    fn enable_programming(&mut self);

    /// Begin programming one word.
    fn write_word(&mut self, index: usize, value: u32);

    /// `true` while an erase or program cycle is running.
    fn is_busy(&self) -> bool;

    /// Leave program mode and lock the region.
    fn lock(&mut self);
}

/// Loads and saves [`Settings`] through an [`OptionRegion`].
pub struct SettingsStore<R> {
    region: R,
    max_busy_polls: u32,
    /// Last contents known to be intact on the region.
    image: Vec<u32, MAX_OPTION_WORDS>,
}

impl<R: OptionRegion> SettingsStore<R> {
    const FITS: () = assert!(R::WORDS <= MAX_OPTION_WORDS);

    pub fn new(region: R, max_busy_polls: u32) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        let image = (0..R::WORDS).map(|i| region.read_word(i)).collect();
        Self {
            region,
            max_busy_polls,
            image,
        }
    }

    /// Read the thresholds. A never-written or corrupt word yields the
    /// default value. Units always come back as Fahrenheit.
    pub fn load(&self) -> Settings {
        let defaults = Settings::default();
        Settings::new(
            self.read_threshold(R::TEMPERATURE1_WORD, defaults.temperature1),
            self.read_threshold(R::TEMPERATURE2_WORD, defaults.temperature2),
        )
    }

    /// Rewrite the region with the thresholds from `settings`, keeping every
    /// other word as it was when the store was created.
    pub fn save(&mut self, settings: &Settings) -> Result<(), StorageError> {
        let image = self.patched(settings);

        self.region.unlock();
        let programmed = self.erase_and_program(&image);
        self.region.lock();
        programmed?;

        self.verify(&image)?;
        self.image = image;
        Ok(())
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut R {
        &mut self.region
    }

    fn read_threshold(&self, index: usize, default: u8) -> u8 {
        decode(self.region.read_word(index)).unwrap_or(default)
    }

    /// Known-good image with the threshold bytes replaced.
    fn patched(&self, settings: &Settings) -> Vec<u32, MAX_OPTION_WORDS> {
        let mut image = self.image.clone();
        if let Some(word) = image.get_mut(R::TEMPERATURE1_WORD) {
            *word = encode(*word, settings.temperature1);
        }
        if let Some(word) = image.get_mut(R::TEMPERATURE2_WORD) {
            *word = encode(*word, settings.temperature2);
        }
        image
    }

    fn erase_and_program(&mut self, image: &[u32]) -> Result<(), StorageError> {
        self.region.start_erase();
        self.wait_ready()?;

        self.region.enable_programming();
        for (index, &word) in image.iter().enumerate() {
            self.region.write_word(index, word);
            self.wait_ready()?;
        }
        Ok(())
    }

    fn wait_ready(&self) -> Result<(), StorageError> {
        for _ in 0..self.max_busy_polls {
            if !self.region.is_busy() {
                return Ok(());
            }
        }
        Err(StorageError::Timeout)
    }

    fn verify(&self, image: &[u32]) -> Result<(), StorageError> {
        match (0..image.len()).find(|&i| self.region.read_word(i) != image[i]) {
            Some(word) => Err(StorageError::Verify { word }),
            None => Ok(()),
        }
    }
}

/// Place `value` and its complement in the low half of `word`.
fn encode(word: u32, value: u8) -> u32 {
    (word & !0xFFFF) | (u32::from(!value) << 8) | u32::from(value)
}

fn decode(word: u32) -> Option<u8> {
    let value = word as u8;
    let check = (word >> 8) as u8;
    (check == !value).then_some(value)
}
