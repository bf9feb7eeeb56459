use std::sync::OnceLock;

// GF(256) arithmetic tables
//------------------------------------------------------------------------------

pub const MAX_EC_SIZE: usize = 30;

// Primitive polynomial for the QR galois field
const PRIMITIVE: u16 = 0x11d;

struct GfTables {
    log: [u8; 256],
    exp: [u8; 255],
}

static GF_TABLES: OnceLock<GfTables> = OnceLock::new();

fn gf_tables() -> &'static GfTables {
    GF_TABLES.get_or_init(|| {
        let mut log = [0u8; 256];
        let mut exp = [0u8; 255];
        let mut x: u16 = 1;
        for i in 0..255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE;
            }
        }
        GfTables { log, exp }
    })
}

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let gf = gf_tables();
    let mut log_sum = gf.log[a as usize] as usize + gf.log[b as usize] as usize;
    if log_sum >= 255 {
        log_sum -= 255;
    }
    gf.exp[log_sum]
}

// Generator polynomials
//------------------------------------------------------------------------------

static GENERATOR_POLYNOMIALS: OnceLock<Vec<Vec<u8>>> = OnceLock::new();

// Coefficients after the leading term of prod (x - a^i), in exponent form,
// indexed by ec codeword count
fn generator_polynomial(ec_size: usize) -> &'static [u8] {
    debug_assert!(0 < ec_size && ec_size <= MAX_EC_SIZE, "Invalid ec size: {ec_size}");

    let polys = GENERATOR_POLYNOMIALS.get_or_init(|| {
        let gf = gf_tables();
        let mut polys = Vec::with_capacity(MAX_EC_SIZE + 1);
        polys.push(vec![]);
        // Coefficients in descending degree order, leading term first
        let mut poly = vec![1u8];
        for i in 0..MAX_EC_SIZE {
            let root = gf.exp[i];
            let mut next = vec![0u8; poly.len() + 1];
            for (j, &coeff) in poly.iter().enumerate() {
                next[j] ^= coeff;
                next[j + 1] ^= gf_mul(coeff, root);
            }
            poly = next;
            polys.push(poly[1..].iter().map(|&c| gf.log[c as usize]).collect());
        }
        polys
    });
    &polys[ec_size]
}

// Error correction codeword generator
//------------------------------------------------------------------------------

// Performs polynomial long division of the data polynomial by the generator
// polynomial; the remainder coefficients are the ec codewords
pub fn ecc(block: &[u8], ec_size: usize) -> Vec<u8> {
    let len = block.len();
    let gen_poly = generator_polynomial(ec_size);
    let gf = gf_tables();

    let mut res = block.to_vec();
    res.resize(len + ec_size, 0);

    for i in 0..len {
        let lead_coeff = res[i] as usize;
        if lead_coeff == 0 {
            continue;
        }

        let log_lead_coeff = gf.log[lead_coeff] as usize;
        for (u, v) in res[i + 1..].iter_mut().zip(gen_poly.iter()) {
            let mut log_sum = *v as usize + log_lead_coeff;
            if log_sum >= 255 {
                log_sum -= 255;
            }
            *u ^= gf.exp[log_sum];
        }
    }

    res.split_off(len)
}

#[cfg(test)]
mod ec_tests {
    use super::{ecc, generator_polynomial, gf_mul, gf_tables, MAX_EC_SIZE};

    #[test]
    fn test_gf_tables() {
        let gf = gf_tables();
        assert_eq!(gf.exp[0], 1);
        assert_eq!(gf.exp[1], 2);
        assert_eq!(gf.exp[8], 29);
        assert_eq!(gf.log[29], 8);
        for i in 1..=255usize {
            assert_eq!(gf.exp[gf.log[i] as usize] as usize, i);
        }
    }

    #[test]
    fn test_generator_polynomials() {
        assert_eq!(generator_polynomial(7), [87, 229, 146, 149, 238, 102, 21]);
        assert_eq!(generator_polynomial(10), [251, 67, 46, 61, 118, 70, 64, 94, 32, 45]);
    }

    #[test]
    fn test_poly_mod_1() {
        let res = ecc(b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11", 10);
        assert_eq!(&*res, b"\xc4#'w\xeb\xd7\xe7\xe2]\x17");
    }

    #[test]
    fn test_poly_mod_2() {
        let res = ecc(b" [\x0bx\xd1r\xdcMC@\xec\x11\xec", 13);
        assert_eq!(&*res, b"\xa8H\x16R\xd96\x9c\x00.\x0f\xb4z\x10");
    }

    #[test]
    fn test_poly_mod_3() {
        let res = ecc(b"CUF\x86W&U\xc2w2\x06\x12\x06g&", 18);
        assert_eq!(&*res, b"\xd5\xc7\x0b-s\xf7\xf1\xdf\xe5\xf8\x9au\x9aoV\xa1o'");
    }

    #[test]
    fn test_ecc_one_h_block() {
        let res = ecc(&[32, 65, 205, 69, 41, 220, 46, 128, 236], 17);
        assert_eq!(
            res,
            [42, 159, 74, 221, 244, 169, 239, 150, 138, 70, 237, 85, 224, 96, 74, 219, 61]
        );
    }

    // The full codeword polynomial must vanish at every generator root
    #[test]
    fn test_ecc_roots() {
        let gf = gf_tables();
        let data = b"the quick brown fox jumps over the lazy dog";
        for ec_size in 1..=MAX_EC_SIZE {
            let mut codeword = data.to_vec();
            codeword.extend(ecc(data, ec_size));
            for i in 0..ec_size {
                let root = gf.exp[i];
                let eval = codeword.iter().fold(0u8, |acc, &c| gf_mul(acc, root) ^ c);
                assert_eq!(eval, 0, "ec_size {ec_size}, root alpha^{i}");
            }
        }
    }
}
