//! End-to-end container tests across both strategies and formats.

use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use stegovault::codec;
use stegovault::error::Error;
use stegovault::format::{Encoding, Header};
use stegovault::pixel::capacity;
use stegovault::pixel::{ByteSource, DirectReader, DirectWriter};
use stegovault::strategy::{generated, EncodingKind};

fn carrier(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            ((x * 19 + y * 5) % 256) as u8,
            ((x * 7 + y * 13) % 256) as u8,
            ((x * 3 + y * 29) % 256) as u8,
            255,
        ])
    })
}

fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Legacy layout: "ST" | size (8 LE) | name (64, NUL-padded) | flag | digest (16).
fn legacy_container(name: &str, flag: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"ST");
    bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    let mut name_field = [0u8; 64];
    name_field[..name.len()].copy_from_slice(name.as_bytes());
    bytes.extend_from_slice(&name_field);
    bytes.push(flag);
    bytes.extend_from_slice(&[0xAB; 16]);
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn test_generated_roundtrip_matrix() {
    let payloads: Vec<Vec<u8>> = vec![
        vec![],
        b"x".to_vec(),
        b"hello world".to_vec(),
        (0..10_000).map(|i| (i % 256) as u8).collect(),
    ];

    for payload in &payloads {
        for filename in ["a.txt", "文件名.bin", "no-extension"] {
            for password in [None, Some("s3cret")] {
                let image = codec::encode(payload, filename, password).unwrap();
                let decoded = codec::decode(&image, password).unwrap();

                assert_eq!(&decoded.data, payload);
                assert_eq!(decoded.filename, filename);
                assert_eq!(decoded.content_hash, sha256(payload));
            }
        }
    }
}

#[test]
fn test_lsb_roundtrip_matrix() {
    let payload: Vec<u8> = (0..1_500).map(|i| (i * 11 % 256) as u8).collect();
    let base = carrier(128, 128);

    for depth in [1u8, 3, 8] {
        for password in [None, Some("pw")] {
            let image =
                codec::encode_into_carrier(&payload, "data.bin", &base, depth, password).unwrap();
            let decoded = codec::decode(&image, password).unwrap();

            assert_eq!(decoded.data, payload);
            assert_eq!(decoded.content_hash, sha256(&payload));
        }
    }
}

#[test]
fn test_hello_world_scenario() {
    // header 2+8+4+5 = 19 pre-hash bytes, 1 padding byte, 32 hash bytes: 52
    // total; with 11 payload bytes that is 63 bytes, 21 pixels, a 5x5 image
    let header = Header::new(Encoding::Direct, 11, "a.txt", false, sha256(b"hello world")).unwrap();
    assert_eq!(header.len(), 52);

    let image = codec::encode(b"hello world", "a.txt", None).unwrap();
    assert_eq!(image.dimensions(), (5, 5));
}

#[test]
fn test_one_pixel_carrier_rejected() {
    // 3 bits of capacity at depth 1: no header fits
    let result = codec::encode_into_carrier(b"x", "f", &carrier(1, 1), 1, None);
    assert!(matches!(result, Err(Error::InsufficientCapacity { .. })));
}

#[test]
fn test_capacity_boundary_at_depth_8() {
    let base = carrier(16, 16);
    let max = capacity::max_capacity_bytes(16, 16);
    let header_len = Header::new(Encoding::Lsb, 0, "f", false, [0u8; 32])
        .unwrap()
        .len();

    // a payload that exactly fills the carrier minus its header fits
    let payload = vec![0xA7u8; (max - header_len) as usize];
    let image = codec::encode_into_carrier(&payload, "f", &base, 8, None).unwrap();
    assert_eq!(codec::decode(&image, None).unwrap().data, payload);

    // one more byte does not
    let payload = vec![0xA7u8; (max - header_len + 1) as usize];
    let result = codec::encode_into_carrier(&payload, "f", &base, 8, None);
    assert!(matches!(result, Err(Error::InsufficientCapacity { .. })));
}

#[test]
fn test_tamper_detection_across_payload_region() {
    let payload = b"every payload bit is covered by the content hash";
    let image = codec::encode(payload, "t.bin", None).unwrap();
    let header_len = Header::new(
        Encoding::Direct,
        payload.len() as u64,
        "t.bin",
        false,
        sha256(payload),
    )
    .unwrap()
    .len();

    // flip one bit at the first, a middle and the last payload byte
    for (pos, bit) in [(0u64, 0u8), (10, 3), (payload.len() as u64 - 1, 7)] {
        let mut tampered = image.clone();
        let offset = header_len + pos;
        let mut byte = [0u8; 1];
        DirectReader::new(&tampered).read_at(offset, &mut byte).unwrap();
        DirectWriter::new(&mut tampered)
            .write_at(offset, &[byte[0] ^ (1 << bit)])
            .unwrap();

        let result = codec::decode(&tampered, None);
        assert!(
            matches!(result, Err(Error::HashMismatch)),
            "flipped bit {bit} at payload byte {pos} went undetected"
        );
    }
}

#[test]
fn test_wrong_password_is_never_silent() {
    let payload = b"plaintext that must stay hidden";
    let image = codec::encode(payload, "s", Some("correct")).unwrap();

    for wrong in ["wrong", "", "correcT"] {
        match codec::decode(&image, Some(wrong)) {
            Err(Error::DecryptionFailed) | Err(Error::HashMismatch) => {}
            Ok(decoded) => assert_ne!(decoded.data, payload),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}

#[test]
fn test_legacy_container_roundtrip() {
    let payload = b"legacy payload bytes";
    let bytes = legacy_container("old-name.dat", 0, payload);

    let image = generated::embed(&bytes).unwrap();
    let decoded = codec::decode(&image, None).unwrap();

    assert_eq!(decoded.filename, "old-name.dat");
    assert_eq!(decoded.data, payload);
    // the stale legacy digest is ignored; the reported hash is recomputed
    assert_eq!(decoded.content_hash, sha256(payload));

    let info = codec::peek_metadata(&image).unwrap();
    assert_eq!(info.encoding, EncodingKind::Legacy);
    assert_eq!(info.payload_len, payload.len() as u64);
    assert!(!info.encrypted);
}

#[test]
fn test_legacy_encrypted_flag_rejected() {
    let bytes = legacy_container("f", 1, b"data");
    let image = generated::embed(&bytes).unwrap();

    let result = codec::decode(&image, None);
    assert!(matches!(result, Err(Error::UnsupportedEncryption)));
}

#[test]
fn test_plain_image_is_not_a_container() {
    let result = codec::decode(&carrier(32, 32), None);
    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
}

#[test]
fn test_depth_one_carrier_barely_changes() {
    let base = carrier(64, 64);
    let image = codec::encode_into_carrier(b"subtle", "s", &base, 1, None).unwrap();

    for (before, after) in base.pixels().zip(image.pixels()) {
        for ch in 0..3 {
            assert!(before.0[ch].abs_diff(after.0[ch]) <= 1);
        }
        assert_eq!(before.0[3], after.0[3]);
    }
}

#[test]
fn test_peek_matches_decode() {
    let image =
        codec::encode_into_carrier(b"abcdef", "meta.bin", &carrier(64, 64), 2, Some("k")).unwrap();

    let info = codec::peek_metadata(&image).unwrap();
    assert_eq!(info.filename, "meta.bin");
    assert!(info.encrypted);
    assert_eq!(info.encoding, EncodingKind::Lsb { depth: 2 });

    let decoded = codec::decode(&image, Some("k")).unwrap();
    assert_eq!(decoded.filename, info.filename);
}

#[test]
fn test_filename_at_limit_roundtrips() {
    let name = "n".repeat(255);
    let image = codec::encode(b"data", &name, None).unwrap();
    assert_eq!(codec::decode(&image, None).unwrap().filename, name);

    let too_long = "n".repeat(256);
    assert!(matches!(
        codec::encode(b"data", &too_long, None),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_container_survives_png_roundtrip() {
    let payload: Vec<u8> = (0..300).map(|i| (i % 256) as u8).collect();
    let image = codec::encode_into_carrier(&payload, "p.bin", &carrier(48, 48), 1, None).unwrap();

    let mut png = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    let reloaded = image::load_from_memory(&png).unwrap().to_rgba8();

    let decoded = codec::decode(&reloaded, None).unwrap();
    assert_eq!(decoded.data, payload);
    assert_eq!(decoded.filename, "p.bin");
}

#[test]
fn test_direct_capacity_is_three_bytes_per_pixel() {
    let image = codec::encode(b"abc", "f", None).unwrap();
    let reader = DirectReader::new(&image);
    assert_eq!(
        reader.capacity(),
        image.width() as u64 * image.height() as u64 * 3
    );
}
