//! `OFPT_VENDOR`: the top-level vendor-extension message.

use crate::error::{CodecError, Result};

/// A vendor-defined message, identified by a registered vendor id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorMsg {
    /// Vendor identifier.
    pub vendor: u32,
    /// Vendor-defined body octets.
    pub data: Vec<u8>,
}

impl VendorMsg {
    /// Fixed-body length (excluding the trailing vendor-defined data): 4 octets.
    pub const FIXED_LEN: usize = 4;

    /// Total body length.
    pub fn len(&self) -> u16 {
        Self::FIXED_LEN as u16 + self.data.len() as u16
    }

    /// Marshal the message body.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() as usize);
        out.extend_from_slice(&self.vendor.to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse the message body. `body_len` bounds the trailing data.
    pub fn unmarshal(data: &[u8], body_len: usize) -> Result<Self> {
        if data.len() < Self::FIXED_LEN || body_len < Self::FIXED_LEN {
            return Err(CodecError::Truncated { what: "vendor", need: Self::FIXED_LEN, got: data.len() });
        }
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let vendor = u32::from_be_bytes(data[0..4].try_into().expect("length checked"));
        Ok(Self { vendor, data: data[Self::FIXED_LEN..body_len.min(data.len())].to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let vendor = VendorMsg { vendor: 0x0000_2320, data: vec![1, 2, 3, 4] };
        let body = vendor.marshal();
        let decoded = VendorMsg::unmarshal(&body, body.len()).unwrap();
        assert_eq!(decoded, vendor);
    }
}
