#![allow(dead_code)]

use std::path::Path;

use auto_asset_tool::{DefaultPaths, Invocation, Paths};

fn varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

fn bytes_field(field: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = varint(u64::from(field) << 3 | 2);
    out.extend(varint(payload.len() as u64));
    out.extend_from_slice(payload);
    out
}

/// Encodes a `product.db` with one install of `product_code` at `version`.
pub fn product_db(product_code: &str, version: &str) -> Vec<u8> {
    let base_state = bytes_field(7, version.as_bytes());
    let cached_state = bytes_field(1, &base_state);
    let install = [
        bytes_field(1, b"hs_beta"),
        bytes_field(2, product_code.as_bytes()),
        bytes_field(4, &cached_state),
    ]
    .concat();
    bytes_field(1, &install)
}

/// Defaults rooted in `root` instead of the real application data directory.
pub fn paths_in(root: &Path) -> Paths {
    let data = root.join("data");
    Paths::new(DefaultPaths {
        output: data.join("Game Data"),
        dbf: None,
        agent: root.join("product.db"),
        cache: data.join("auto-asset-tool-cache.json"),
        data,
    })
}

/// Writes a fake bundle and an agent database reporting `version`.
pub fn invocation_in(root: &Path, version: &str) -> Invocation {
    let dbf_path = root.join("dbf.unity3d");
    let agent_path = root.join("product.db");
    std::fs::write(&dbf_path, b"UnityFS bundle contents").unwrap();
    std::fs::write(&agent_path, product_db("hsb", version)).unwrap();

    Invocation {
        dbf_path,
        output: root.join("out"),
        agent_path,
        force: false,
    }
}
