mod matrix;

pub use matrix::{Module, QRCode};

use std::ops::Deref;

use log::debug;

use crate::common::{
    codec::{encode, select_version_and_level, Mode},
    ec::ecc,
    error::{QRError, QRResult},
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};

pub struct QRBuilder<'a> {
    data: &'a [u8],
    version: Option<Version>,
    ec_level: Option<ECLevel>,
    mode: Mode,
    mask: Option<MaskPattern>,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, version: None, ec_level: None, mode: Mode::Byte, mask: None }
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = Some(ec_level);
        self
    }

    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }
}

impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QRCode> {
        if self.data.is_empty() {
            return Err(QRError::EmptyData);
        }

        let (version, ec_level) =
            select_version_and_level(self.data.len(), self.mode, self.version, self.ec_level)?;
        debug!(
            "Encoding {} bytes as {:?} at version {} level {ec_level:?}",
            self.data.len(),
            self.mode,
            *version
        );

        let encoded = encode(self.data, self.mode, version, ec_level)?;

        let (data_blocks, ecc_blocks) = Self::compute_ecc(encoded.data(), version, ec_level);
        let mut payload = Vec::with_capacity(version.total_codewords(ec_level));
        payload.extend(Self::interleave(&data_blocks));
        payload.extend(Self::interleave(&ecc_blocks));
        debug_assert!(
            payload.len() == version.total_codewords(ec_level),
            "Interleaved payload length {} doesn't match total codewords {}",
            payload.len(),
            version.total_codewords(ec_level)
        );

        let mut qr = QRCode::new(version, ec_level, self.mode);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(&payload);

        let mask = match self.mask {
            Some(m) => {
                qr.apply_mask(m);
                m
            }
            None => apply_best_mask(&mut qr),
        };
        debug!("Mask {} applied, {} dark modules", *mask, qr.count_dark_modules());

        Ok(qr)
    }

    fn compute_ecc(data: &[u8], version: Version, ec_level: ECLevel) -> (Vec<&[u8]>, Vec<Vec<u8>>) {
        let data_blocks = Self::blockify(data, version, ec_level);

        let ecc_size_per_block = version.ecc_per_block(ec_level);
        let ecc_blocks =
            data_blocks.iter().map(|b| ecc(b, ecc_size_per_block)).collect::<Vec<_>>();

        (data_blocks, ecc_blocks)
    }

    fn blockify(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<&[u8]> {
        let (block1_size, block1_count, block2_size, block2_count) =
            version.data_codewords_per_block(ec_level);

        let total_blocks = block1_count + block2_count;
        let total_block1_size = block1_size * block1_count;
        let total_size = total_block1_size + block2_size * block2_count;

        debug_assert!(
            total_size == data.len(),
            "Data len doesn't match total size of blocks: Data len {}, Total block size {}",
            data.len(),
            total_size
        );

        let mut data_blocks = Vec::with_capacity(total_blocks);
        data_blocks.extend(data[..total_block1_size].chunks(block1_size));
        if block2_size > 0 {
            data_blocks.extend(data[total_block1_size..].chunks(block2_size));
        }
        data_blocks
    }

    // Takes column i across all blocks, skipping blocks shorter than i
    fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
        let max_block_size = blocks.iter().map(|b| b.len()).max().expect("Blocks is empty");
        let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
        let mut res = Vec::with_capacity(total_size);
        for i in 0..max_block_size {
            for b in blocks {
                if i < b.len() {
                    res.push(b[i]);
                }
            }
        }
        res
    }
}
