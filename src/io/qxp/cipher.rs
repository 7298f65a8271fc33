//! Rolling XOR ciphers protecting object headers.
//!
//! Stored values are XORed with an evolving 16-bit seed. The seed changes
//! after every object in an order fixed by the record grammar, so decoding
//! must replay each object in sequence.
//!
//! 3.x documents use [`AdditiveCipher`]; 4.x documents use
//! [`RotatingCipher`], whose increment also evolves.

/// Common decode operation of both cipher variants.
pub trait Cipher {
    fn seed(&self) -> u16;

    fn apply_u16(&self, value: u16) -> u16 {
        value ^ self.seed()
    }

    fn apply_u8(&self, value: u8) -> u8 {
        (self.apply_u16(value as u16) & 0xff) as u8
    }
}

/// Seed advances by a constant increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdditiveCipher {
    seed: u16,
    increment: u16,
}

impl AdditiveCipher {
    pub fn new(seed: u16, increment: u16) -> Self {
        AdditiveCipher { seed, increment }
    }

    /// Step past one object.
    pub fn advance(&mut self) {
        self.seed = self.seed.wrapping_add(self.increment);
    }
}

impl Cipher for AdditiveCipher {
    fn seed(&self) -> u16 {
        self.seed
    }
}

/// Seed and increment both evolve through [`bitscan_rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotatingCipher {
    seed: u16,
    increment: u16,
}

impl RotatingCipher {
    pub fn new(seed: u16, increment: u16) -> Self {
        RotatingCipher { seed, increment }
    }

    pub fn increment(&self) -> u16 {
        self.increment
    }

    /// Step past an object whose decoded content index is `block`.
    pub fn advance(&mut self, block: u16) {
        self.seed = self.seed.wrapping_add(self.increment);
        self.increment = bitscan_rotate(self.increment, (block & 0xf) as u32);
    }

    /// Step between a page header and its first object.
    pub fn advance_reverse(&mut self) {
        self.seed = self.seed.wrapping_add(0xffff - self.increment);
    }

    /// Step after decoding an object's content type.
    pub fn advance_shift(&mut self, count: u16) {
        self.seed = bitscan_rotate(self.seed, (count & 0xf) as u32);
    }
}

impl Cipher for RotatingCipher {
    fn seed(&self) -> u16 {
        self.seed
    }
}

/// OR `value` with the high mask left after shifting out up to `shift`
/// trailing zero bits, limited to `mask`.
fn fill(value: u32, shift: u32, mask: u32) -> u32 {
    let mut r = shift;
    let mut v = value;
    while v & 1 == 0 && r > 0 {
        v >>= 1;
        r -= 1;
    }
    let s = shift - r;
    let m = ((0xffff >> s) << s) & 0xffff;
    (value | m) & mask
}

/// Rotate `value` right by `count` bits (`count < 16`), with the bits
/// wrapped into the top replaced by their [`fill`]ed form. `count == 0`
/// is the identity.
pub fn bitscan_rotate(value: u16, count: u32) -> u16 {
    if count == 0 {
        return value;
    }
    let value = value as u32;
    let mask = 0xffff >> (16 - count);
    let high = (fill((value & mask) | (value >> 15), count, mask) << (16 - count)) & 0xffff;
    (high | (value >> count)) as u16
}
