use super::layout;

/// Byte emission into a fixed-size ArtDMX packet buffer.
///
/// All ranges come from `layout`; two-byte ranges must be exactly two bytes
/// wide.
pub struct ArtNetWriter {
    packet: [u8; layout::PACKET_LEN],
}

impl ArtNetWriter {
    pub fn new() -> Self {
        Self {
            packet: [0u8; layout::PACKET_LEN],
        }
    }

    pub fn write_signature(&mut self) {
        self.packet[..layout::ARTNET_ID.len()].copy_from_slice(layout::ARTNET_ID);
    }

    pub fn write_u16_le(&mut self, range: std::ops::Range<usize>, value: u16) {
        self.packet[range].copy_from_slice(&value.to_le_bytes());
    }

    pub fn write_u16_be(&mut self, range: std::ops::Range<usize>, value: u16) {
        self.packet[range].copy_from_slice(&value.to_be_bytes());
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) {
        self.packet[offset] = value;
    }

    pub fn write_slots(&mut self, slots: &[u8; layout::DMX_MAX_SLOTS]) {
        self.packet[layout::DMX_DATA_OFFSET..].copy_from_slice(slots);
    }

    pub fn finish(self) -> Vec<u8> {
        self.packet.to_vec()
    }
}

impl Default for ArtNetWriter {
    fn default() -> Self {
        Self::new()
    }
}
