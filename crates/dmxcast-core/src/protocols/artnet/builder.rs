use super::layout;
use super::writer::ArtNetWriter;

/// Build one ArtDMX packet from a channel payload.
///
/// Pure and deterministic: the payload is normalized to exactly
/// [`layout::DMX_MAX_SLOTS`] bytes (zero-padded when shorter, truncated when
/// longer) and the result is always [`layout::PACKET_LEN`] bytes.
///
/// # Examples
/// ```
/// use dmxcast_core::protocols::artnet::build_artdmx_packet;
///
/// let packet = build_artdmx_packet(&[200, 10], 1, 0, 0);
/// assert_eq!(packet.len(), 530);
/// assert_eq!(&packet[0..8], b"Art-Net\0");
/// assert_eq!(packet[18], 200);
/// ```
pub fn build_artdmx_packet(payload: &[u8], universe: u16, sequence: u8, physical: u8) -> Vec<u8> {
    let mut slots = [0u8; layout::DMX_MAX_SLOTS];
    let take = payload.len().min(layout::DMX_MAX_SLOTS);
    slots[..take].copy_from_slice(&payload[..take]);

    let mut writer = ArtNetWriter::new();
    writer.write_signature();
    writer.write_u16_le(layout::OP_CODE_RANGE, layout::ARTDMX_OPCODE);
    writer.write_u16_be(layout::PROTOCOL_VERSION_RANGE, layout::PROTOCOL_VERSION);
    writer.write_u8(layout::SEQUENCE_OFFSET, sequence);
    writer.write_u8(layout::PHYSICAL_OFFSET, physical);
    writer.write_u16_le(layout::UNIVERSE_RANGE, universe);
    writer.write_u16_be(layout::LENGTH_RANGE, layout::DMX_MAX_SLOTS as u16);
    writer.write_slots(&slots);
    writer.finish()
}
