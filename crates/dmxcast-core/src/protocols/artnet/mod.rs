//! Art-Net protocol encoding.
//!
//! The builder emits ArtDMX packets with the exact fixed layout: an 18-byte
//! header followed by exactly 512 slot bytes, so every packet is 530 bytes
//! regardless of input length. Shorter payloads are zero-padded and longer
//! ones truncated; normalization is silent by design of the wire format.
//!
//! Byte offsets live in `layout`, emission conventions in `writer`.
//!
//! Version française (résumé):
//! Le module encode Art-Net/ArtDMX avec la disposition fixe (en-tête de 18
//! octets + 512 octets de données, soit 530 octets par paquet). Les charges
//! plus courtes sont complétées de zéros, les plus longues tronquées. Les
//! positions sont dans `layout`, les conventions dans `writer`.

pub mod builder;
pub mod layout;
pub mod writer;

pub use builder::build_artdmx_packet;
