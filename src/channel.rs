//! Carrier channel contract and the end-to-end flows built on it.
//!
//! The pixel-level hiding algorithm lives outside this crate. Anything that
//! can embed a text payload into an image and extract it again can be plugged
//! in through `CarrierChannel`; this module only guarantees that what crosses
//! that boundary is base64 text produced by `PayloadCodec`.

use std::path::{Path, PathBuf};

use crate::codec::PayloadCodec;
use crate::crypto::CipherBox;
use crate::error::SteglockError;

/// An image steganography backend.
///
/// Implementations must satisfy `extract(embed(img, t)) == t` for any payload
/// within their capacity, and report capacity or format problems as
/// `SteglockError::Carrier`.
pub trait CarrierChannel {
    /// Hide `payload` in `source`, writing the stego image to `dest`.
    fn embed(&self, source: &Path, payload: &str, dest: &Path) -> Result<(), SteglockError>;

    /// Recover the payload hidden in `stego`.
    fn extract(&self, stego: &Path) -> Result<String, SteglockError>;
}

/// Encrypt `message` and hide it in `source`, producing the stego image at
/// `dest`. Returns `dest` for convenience.
pub fn conceal<C: CarrierChannel + ?Sized>(
    channel: &C,
    cipher: &CipherBox,
    message: &[u8],
    source: &Path,
    dest: &Path,
) -> Result<PathBuf, SteglockError> {
    let payload = PayloadCodec::pack_with(cipher, message)?;
    channel.embed(source, &payload, dest)?;
    tracing::info!(
        source = %source.display(),
        dest = %dest.display(),
        payload_len = payload.len(),
        "message concealed"
    );
    Ok(dest.to_path_buf())
}

/// Extract the payload hidden in `stego` and decrypt it.
pub fn reveal<C: CarrierChannel + ?Sized>(
    channel: &C,
    cipher: &CipherBox,
    stego: &Path,
) -> Result<Vec<u8>, SteglockError> {
    let payload = channel.extract(stego)?;
    let message = PayloadCodec::unpack_with(cipher, &payload)?;
    tracing::info!(stego = %stego.display(), "message revealed");
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Keeps payloads in a map keyed by destination path.
    #[derive(Default)]
    struct MapChannel {
        images: RefCell<HashMap<PathBuf, String>>,
    }

    impl CarrierChannel for MapChannel {
        fn embed(&self, _source: &Path, payload: &str, dest: &Path) -> Result<(), SteglockError> {
            self.images
                .borrow_mut()
                .insert(dest.to_path_buf(), payload.to_string());
            Ok(())
        }

        fn extract(&self, stego: &Path) -> Result<String, SteglockError> {
            self.images
                .borrow()
                .get(stego)
                .cloned()
                .ok_or_else(|| SteglockError::Carrier("no payload".into()))
        }
    }

    #[test]
    fn test_conceal_reveal() {
        let channel = MapChannel::default();
        let cipher = CipherBox::from_slice(&[4u8; 16]).unwrap();
        let dest = conceal(
            &channel,
            &cipher,
            b"rendezvous",
            Path::new("cover.png"),
            Path::new("stego.png"),
        )
        .unwrap();

        // Only base64 text reaches the channel.
        let hidden = channel.images.borrow()[&dest].clone();
        assert!(!hidden.contains("rendezvous"));

        assert_eq!(reveal(&channel, &cipher, &dest).unwrap(), b"rendezvous");
    }

    #[test]
    fn test_carrier_errors_pass_through() {
        let channel = MapChannel::default();
        let cipher = CipherBox::from_slice(&[4u8; 16]).unwrap();
        assert!(matches!(
            reveal(&channel, &cipher, Path::new("missing.png")),
            Err(SteglockError::Carrier(_))
        ));
    }
}
