//! Byte builders for synthetic controller blobs.

#![allow(dead_code)]

pub fn be32(value: u32) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn bef32(value: f32) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn wide(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut out = be32(units.len() as u32);
    for unit in units {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

pub fn frame(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend(be32(payload.len() as u32));
    out.extend_from_slice(payload);
    out
}

pub fn list(tag: &[u8; 4], entries: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = be32(entries.len() as u32);
    for entry in entries {
        payload.extend_from_slice(entry);
    }
    frame(tag, &payload)
}

/// Settings payload with the given identity fields and everything else zero.
pub fn settings(controller_type: u32, interaction_mode: u32, deck_scope: u32) -> Vec<u8> {
    let mut out = be32(0);
    out.extend(be32(controller_type));
    out.extend(be32(interaction_mode));
    out.extend(be32(deck_scope));
    for _ in 0..3 {
        out.extend(be32(0));
    }
    out.extend(bef32(0.0));
    out.extend(bef32(0.0));
    out.extend(be32(0));
    out.extend(be32(0));
    out.extend(bef32(0.0));
    out.extend(wide(""));
    for _ in 0..7 {
        out.extend(be32(0));
    }
    out
}

/// 40-byte OUT tail with the given LED MIDI range.
pub fn output_tail(led_min_midi: u32, led_max_midi: u32, resolution: u32) -> Vec<u8> {
    let mut out = bef32(0.25);
    out.extend(be32(0));
    out.extend(bef32(1.0));
    out.extend(be32(led_min_midi));
    out.extend(be32(led_max_midi));
    out.extend(be32(0));
    out.extend(be32(0));
    out.extend(be32(1));
    out.extend(be32(resolution));
    out.extend(be32(0));
    out
}

pub fn mapping(binding_id: u32, mapping_type: u32, controller_id: u32, settings: &[u8]) -> Vec<u8> {
    let mut payload = be32(binding_id);
    payload.extend(be32(mapping_type));
    payload.extend(be32(controller_id));
    payload.extend(frame(b"CMAD", settings));
    frame(b"CMAI", &payload)
}

pub fn binding(id: u32, name: &str) -> Vec<u8> {
    let mut payload = be32(id);
    payload.extend(wide(name));
    frame(b"DCBM", &payload)
}

pub fn device(name: &str, data_children: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = wide(name);
    payload.extend(frame(b"DDAT", &data_children.concat()));
    frame(b"DEVI", &payload)
}

/// One device "Pad" targeting deck A with one CC binding and one IN mapping.
pub fn pad_blob() -> Vec<u8> {
    let container = frame(
        b"DDCB",
        &[
            list(b"DCBM", &[binding(5, "Ch01.CC.010")]),
            list(b"CMAS", &[mapping(5, 0, 42, &settings(1, 3, 0xFFFF_FFFF))]),
        ]
        .concat(),
    );
    device("Pad", &[frame(b"DDIF", &be32(1)), container])
}
