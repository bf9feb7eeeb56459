use super::bitstream::BitStream;
use super::error::{QRError, QRResult};
use super::metadata::{ECLevel, Version};

// Mode
//------------------------------------------------------------------------------

// The discriminant doubles as the 4-bit mode indicator
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
}

impl Mode {
    #[inline]
    fn numeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Numeric.contains(char), "Invalid numeric data: {char}");
        (char - b'0') as u16
    }

    #[inline]
    fn alphanumeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Alphanumeric.contains(char), "Invalid alphanumeric data: {char}");
        match char {
            b'0'..=b'9' => (char - b'0') as u16,
            b'A'..=b'Z' => (char - b'A' + 10) as u16,
            b' ' => 36,
            b'$' => 37,
            b'%' => 38,
            b'*' => 39,
            b'+' => 40,
            b'-' => 41,
            b'.' => 42,
            b'/' => 43,
            b':' => 44,
            _ => unreachable!("Invalid alphanumeric {char}"),
        }
    }

    pub fn encode_chunk(&self, data: &[u8]) -> u16 {
        let len = data.len();
        match self {
            Self::Numeric => {
                debug_assert!(len <= 3, "Data is too long for numeric chunk: {len}");
                data.iter().fold(0_u16, |n, b| n * 10 + Self::numeric_digit(*b))
            }
            Self::Alphanumeric => {
                debug_assert!(len <= 2, "Data is too long for alphanumeric chunk: {len}");
                data.iter().fold(0_u16, |n, b| n * 45 + Self::alphanumeric_digit(*b))
            }
            Self::Byte => {
                debug_assert!(len == 1, "Data is too long for byte chunk: {len}");
                data[0] as u16
            }
            Self::Kanji => unreachable!("Kanji chunks are not encodable"),
        }
    }

    pub fn contains(&self, byte: u8) -> bool {
        match self {
            Self::Numeric => byte.is_ascii_digit(),
            Self::Alphanumeric => {
                matches!(byte, b'0'..=b'9' | b'A'..=b'Z' | b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':')
            }
            Self::Byte => true,
            Self::Kanji => false,
        }
    }
}


// Version and level selection
//------------------------------------------------------------------------------

// Strongest error recovery first
static LEVEL_PREFERENCE: [ECLevel; 4] = [ECLevel::H, ECLevel::Q, ECLevel::M, ECLevel::L];

pub fn select_version_and_level(
    len: usize,
    mode: Mode,
    version: Option<Version>,
    ec_level: Option<ECLevel>,
) -> QRResult<(Version, ECLevel)> {
    match (version, ec_level) {
        (Some(v), Some(e)) => {
            if v.char_capacity(e, mode) >= len {
                Ok((v, e))
            } else {
                Err(QRError::PayloadTooLarge)
            }
        }
        (None, Some(e)) => smallest_fitting_version(len, mode, e)
            .map(|v| (v, e))
            .ok_or(QRError::VersionUnavailable),
        (Some(v), None) => LEVEL_PREFERENCE
            .iter()
            .find(|e| v.char_capacity(**e, mode) >= len)
            .map(|&e| (v, e))
            .ok_or(QRError::LevelUnavailable),
        (None, None) => LEVEL_PREFERENCE
            .iter()
            .find_map(|&e| smallest_fitting_version(len, mode, e).map(|v| (v, e)))
            .ok_or(QRError::VersionUnavailable),
    }
}

fn smallest_fitting_version(len: usize, mode: Mode, ec_level: ECLevel) -> Option<Version> {
    (1..=40).map(Version::new).find(|v| v.char_capacity(ec_level, mode) >= len)
}


// Encoder
//------------------------------------------------------------------------------

pub fn encode(data: &[u8], mode: Mode, version: Version, ec_level: ECLevel) -> QRResult<BitStream> {
    if mode == Mode::Kanji {
        return Err(QRError::NotImplemented);
    }
    if !data.iter().all(|b| mode.contains(*b)) {
        return Err(QRError::ModeViolation);
    }
    debug_assert!(
        data.len() <= version.char_capacity(ec_level, mode),
        "Payload of {} chars exceeds capacity of version {} level {ec_level:?}",
        data.len(),
        *version,
    );

    let mut out = BitStream::new(version.data_bit_capacity(ec_level));
    push_header(mode, data.len(), version, &mut out);
    match mode {
        Mode::Numeric => push_numeric_data(data, &mut out),
        Mode::Alphanumeric => push_alphanumeric_data(data, &mut out),
        Mode::Byte => push_byte_data(data, &mut out),
        Mode::Kanji => unreachable!(),
    }
    push_terminator(&mut out);
    pad_remaining_capacity(&mut out);
    Ok(out)
}

fn push_header(mode: Mode, char_count: usize, version: Version, out: &mut BitStream) {
    out.push_bits(mode as u8, 4);
    let len_bits = version.char_count_bits(mode);
    debug_assert!(
        char_count < (1 << len_bits),
        "Char count exceeds bit length: Char count {char_count}, Char count bits {len_bits}"
    );
    out.push_bits(char_count as u16, len_bits);
}

fn push_numeric_data(data: &[u8], out: &mut BitStream) {
    for chunk in data.chunks(3) {
        let len = (chunk.len() * 10 + 2) / 3;
        out.push_bits(Mode::Numeric.encode_chunk(chunk), len);
    }
}

fn push_alphanumeric_data(data: &[u8], out: &mut BitStream) {
    for chunk in data.chunks(2) {
        let len = (chunk.len() * 11 + 1) / 2;
        out.push_bits(Mode::Alphanumeric.encode_chunk(chunk), len);
    }
}

fn push_byte_data(data: &[u8], out: &mut BitStream) {
    for b in data {
        out.push_bits(*b, 8);
    }
}

// Up to 4 zero bits, bounded by the remaining capacity
fn push_terminator(out: &mut BitStream) {
    let remaining = out.capacity() - out.len();
    if remaining > 0 {
        out.push_bits(0u8, remaining.min(4));
    }
}

fn pad_remaining_capacity(out: &mut BitStream) {
    push_padding_bits(out);
    push_padding_codewords(out);
}

fn push_padding_bits(out: &mut BitStream) {
    let offset = out.len() & 7;
    if offset > 0 {
        out.push_bits(0u8, 8 - offset);
    }
}

fn push_padding_codewords(out: &mut BitStream) {
    debug_assert!(
        out.len() & 7 == 0,
        "Bit offset should be zero before padding codewords: {}",
        out.len() & 7
    );

    let remaining_codewords = (out.capacity() - out.len()) >> 3;
    PADDING_CODEWORDS.iter().copied().cycle().take(remaining_codewords).for_each(|pc| {
        out.push_bits(pc, 8);
    });
}

#[cfg(test)]
mod encode_tests {
    use super::{
        encode, push_alphanumeric_data, push_byte_data, push_header, push_numeric_data,
        push_padding_bits, push_padding_codewords, push_terminator, select_version_and_level, Mode,
        PADDING_CODEWORDS,
    };
    use crate::common::bitstream::BitStream;
    use crate::common::error::QRError;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_push_header_v1() {
        let version = Version::new(1);
        let bit_capacity = version.data_bit_capacity(ECLevel::L);
        let exp_vecs: [&[u8]; 3] = [
            &[0b00011111, 0b11111100],
            &[0b00101111, 0b11111000],
            &[0b01001111, 0b11110000],
        ];
        let modes = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte];
        let char_counts: [usize; 3] = [1023, 511, 255];
        for ((mode, cc), exp_vec) in modes.iter().zip(char_counts.iter()).zip(exp_vecs.iter()) {
            let mut bs = BitStream::new(bit_capacity);
            push_header(*mode, *cc, version, &mut bs);
            assert_eq!(&bs.data()[..exp_vec.len()], *exp_vec);
        }
    }

    #[test]
    fn test_push_header_v27() {
        let version = Version::new(27);
        let bit_capacity = version.data_bit_capacity(ECLevel::L);
        let exp_vecs: [&[u8]; 3] = [
            &[0b00011111, 0b11111111, 0b11000000],
            &[0b00101111, 0b11111111, 0b10000000],
            &[0b01001111, 0b11111111, 0b11110000],
        ];
        let modes = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte];
        let char_counts: [usize; 3] = [16383, 8191, 65535];
        for ((mode, cc), exp_vec) in modes.iter().zip(char_counts.iter()).zip(exp_vecs.iter()) {
            let mut bs = BitStream::new(bit_capacity);
            push_header(*mode, *cc, version, &mut bs);
            assert_eq!(&bs.data()[..exp_vec.len()], *exp_vec);
        }
    }

    #[test]
    fn test_push_numeric_data() {
        let mut bs = BitStream::new(152);
        push_numeric_data("01234567".as_bytes(), &mut bs);
        assert_eq!(&bs.data()[..4], [0b00000011, 0b00010101, 0b10011000, 0b01100000]);
        let mut bs = BitStream::new(152);
        push_numeric_data("8".as_bytes(), &mut bs);
        assert_eq!(bs.data()[0], 0b10000000);
    }

    #[test]
    fn test_push_alphanumeric_data() {
        let mut bs = BitStream::new(152);
        push_alphanumeric_data("AC-42".as_bytes(), &mut bs);
        assert_eq!(&bs.data()[..4], [0b00111001, 0b11011100, 0b11100100, 0b00100000])
    }

    #[test]
    fn test_push_byte_data() {
        let mut bs = BitStream::new(152);
        push_byte_data("a".as_bytes(), &mut bs);
        assert_eq!(bs.data()[0], 0b01100001)
    }

    #[test]
    fn test_push_terminator() {
        let mut bs = BitStream::new(152);
        bs.push_bits(0b1, 1);
        push_terminator(&mut bs);
        assert_eq!(bs.len(), 5);
        for _ in 0..18 {
            bs.push_bits(0b11111111, 8);
        }
        bs.push_bits(0b111, 3);
        push_terminator(&mut bs);
        assert_eq!(bs.len(), 152);
    }

    #[test]
    fn test_push_padding_bits() {
        let mut bs = BitStream::new(152);
        bs.push_bits(0b1, 1);
        push_padding_bits(&mut bs);
        assert_eq!(bs.data()[0], 0b10000000);
        assert_eq!(bs.len() & 7, 0);
    }

    #[test]
    fn test_push_padding_codewords() {
        let mut bs = BitStream::new(152);
        bs.push_bits(0b1, 1);
        push_padding_bits(&mut bs);
        push_padding_codewords(&mut bs);
        let mut output = vec![0b10000000];
        output.extend(PADDING_CODEWORDS.iter().cycle().take(18));
        assert_eq!(bs.data(), output);
    }

    #[test]
    fn test_encode_byte_url() {
        let data = b"https://github.com/caozhanhao/qrcode.mbt";
        let (version, ec_level) = select_version_and_level(data.len(), Mode::Byte, None, None).unwrap();
        assert_eq!((version, ec_level), (Version::new(5), ECLevel::H));
        let encoded = encode(data, Mode::Byte, version, ec_level).unwrap();
        assert_eq!(
            encoded.data(),
            [
                66, 134, 135, 71, 71, 7, 51, 162, 242, 246, 118, 151, 70, 135, 86, 34, 230, 54,
                246, 210, 246, 54, 22, 247, 166, 134, 22, 230, 134, 22, 242, 247, 23, 38, 54, 246,
                70, 82, 230, 214, 39, 64, 236, 17, 236, 17
            ]
        );
    }

    #[test]
    fn test_encode_numeric() {
        let data = b"444233509987";
        let (version, ec_level) =
            select_version_and_level(data.len(), Mode::Numeric, None, None).unwrap();
        assert_eq!((version, ec_level), (Version::new(1), ECLevel::H));
        let encoded = encode(data, Mode::Numeric, version, ec_level).unwrap();
        assert_eq!(encoded.data(), [16, 49, 188, 58, 95, 223, 108, 0, 236]);
    }

    #[test]
    fn test_encode_full_capacity_has_no_terminator_room() {
        let version = Version::new(1);
        let data = [b'7'; 17];
        let encoded = encode(&data, Mode::Numeric, version, ECLevel::H).unwrap();
        assert_eq!(encoded.len(), version.data_bit_capacity(ECLevel::H));
    }

    #[test]
    fn test_encode_rejects_foreign_chars() {
        let version = Version::new(1);
        let res = encode(b"12a4", Mode::Numeric, version, ECLevel::L);
        assert_eq!(res, Err(QRError::ModeViolation));
        let res = encode(b"lowercase", Mode::Alphanumeric, version, ECLevel::L);
        assert_eq!(res, Err(QRError::ModeViolation));
    }

    #[test]
    fn test_encode_rejects_kanji() {
        let res = encode(b"\x93\x5f", Mode::Kanji, Version::new(1), ECLevel::L);
        assert_eq!(res, Err(QRError::NotImplemented));
    }
}

// Global constants
//------------------------------------------------------------------------------

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];
