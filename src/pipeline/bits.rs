/// Split a byte stream into `bits_per_slot`-wide groups, MSB first.
/// A trailing partial group is zero-padded on its low end.
pub fn pack(bytes: &[u8], bits_per_slot: u8) -> Vec<u8> {
    assert!((1..=8).contains(&bits_per_slot), "slot width must be 1..=8 bits");
    let width = bits_per_slot as usize;
    let total_bits = bytes.len() * 8;
    let mut slots = Vec::with_capacity(total_bits.div_ceil(width));

    let mut bit_ptr = 0;
    while bit_ptr < total_bits {
        let mut value = 0u8;
        let mut read = 0;
        while read < width && bit_ptr < total_bits {
            let bit = (bytes[bit_ptr / 8] >> (7 - bit_ptr % 8)) & 1;
            value = (value << 1) | bit;
            bit_ptr += 1;
            read += 1;
        }
        // Stream ran out mid-slot
        value <<= width - read;
        slots.push(value);
    }

    slots
}

/// Reassemble bytes from slot values, reading `bits_per_slot` low bits of each
/// slot MSB first and stopping after `total_bits`. A trailing partial byte is
/// left-aligned.
pub fn unpack(slots: &[u8], bits_per_slot: u8, total_bits: usize) -> Vec<u8> {
    assert!((1..=8).contains(&bits_per_slot), "slot width must be 1..=8 bits");
    let mut bytes = Vec::with_capacity(total_bits.div_ceil(8));
    let mut current = 0u8;
    let mut filled = 0;
    let mut collected = 0;

    'slots: for &slot in slots {
        for shift in (0..bits_per_slot).rev() {
            if collected == total_bits {
                break 'slots;
            }
            current = (current << 1) | ((slot >> shift) & 1);
            filled += 1;
            collected += 1;
            if filled == 8 {
                bytes.push(current);
                current = 0;
                filled = 0;
            }
        }
    }

    if filled > 0 {
        bytes.push(current << (8 - filled));
    }

    bytes
}

/// Number of slots needed to carry `byte_len` bytes
pub fn slots_for(byte_len: usize, bits_per_slot: u8) -> usize {
    (byte_len * 8).div_ceil(bits_per_slot as usize)
}
