//! Utilities.

/// Returns ceiling log2.
pub const fn clog2(value: usize) -> usize {
    if value == 0 {
        0
    } else {
        (::std::mem::size_of::<usize>() * 8) - (value - 1).leading_zeros() as usize
    }
}

/// Returns bit-represented value of an integer, LSB first.
pub fn usize_to_bitvec(n: usize, value: usize) -> Vec<bool> {
    assert!(n >= clog2(value + 1), "Width ({}) is too small to be converted from the value '{}'", n, value);
    let size_of_usize = ::std::mem::size_of::<usize>();
    (0..n).map(|i| if i >= size_of_usize * 8 { false } else { (value & (1 << i)) != 0 }).collect::<Vec<_>>()
}

/// Returns the integer represented by the bits, LSB first.
pub fn bitvec_to_usize(bits: &[bool]) -> usize {
    bits.iter().enumerate().fold(0, |acc, (i, bit)| if *bit { acc | (1 << i) } else { acc })
}

/// Renders the value as a binary string of `width` digits, MSB first.
pub fn to_binary_string(value: usize, width: usize) -> String {
    if width == 0 {
        String::new()
    } else {
        format!("{:0width$b}", value, width = width)
    }
}

/// Indents every line in the string.
pub fn indent(str: String, indent: usize) -> String {
    str.lines().map(|l| format!("{}{}", " ".repeat(indent), l)).collect::<Vec<_>>().join("\n")
}
